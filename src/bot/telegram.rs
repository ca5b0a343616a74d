//! Telegram transport and long-polling loop on top of `teloxide`.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use teloxide::Bot;
use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
use teloxide::dptree;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::payloads::{AnswerCallbackQuerySetters, EditMessageTextSetters, SendMessageSetters};
use teloxide::requests::Requester;
use teloxide::types::{
    AllowedUpdate, CallbackQuery, ChatId, Message, MessageId, ParseMode, ReplyMarkup, Update,
};
use teloxide::update_listeners::Polling;
use tracing::{error, info};

use super::ChatTransport;
use super::dispatcher::ChatHandler;

/// Extra time allowed on top of the long-poll timeout before the HTTP request
/// itself is abandoned.
const REQUEST_SLACK: Duration = Duration::from_secs(10);

/// Build a bot whose HTTP client outlives one long-poll round.
pub fn connect(token: &str, poll_timeout: Duration) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(poll_timeout + REQUEST_SLACK)
        .build()?;
    Ok(Bot::with_client(token, client))
}

/// [`ChatTransport`] backed by the Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<ReplyMarkup>,
        parse_mode: Option<ParseMode>,
    ) -> Result<()> {
        let mut request = self.bot.send_message(chat_id, text);
        if let Some(markup) = markup {
            request = request.reply_markup(markup);
        }
        if let Some(mode) = parse_mode {
            request = request.parse_mode(mode);
        }
        request.await?;
        Ok(())
    }

    async fn answer_callback(
        &self,
        query: &CallbackQuery,
        text: &str,
        show_alert: bool,
    ) -> Result<()> {
        let mut request = self.bot.answer_callback_query(query.id.clone());
        if !text.is_empty() {
            request = request.text(text);
        }
        request.show_alert(show_alert).await?;
        Ok(())
    }

    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()> {
        let mut request = self.bot.edit_message_text(chat_id, message_id, text);
        if let Some(mode) = parse_mode {
            request = request.parse_mode(mode);
        }
        request.await?;
        Ok(())
    }
}

async fn on_message(handler: Arc<ChatHandler>, msg: Message) -> Result<()> {
    if let Err(e) = handler.handle_message(&msg).await {
        error!(chat_id = msg.chat.id.0, "Failed to handle message: {:#}", e);
    }
    Ok(())
}

async fn on_callback(handler: Arc<ChatHandler>, query: CallbackQuery) -> Result<()> {
    if let Err(e) = handler.handle_callback(&query).await {
        error!(data = ?query.data, "Failed to handle callback: {:#}", e);
    }
    Ok(())
}

/// Poll for updates and dispatch them until Ctrl-C.
///
/// Updates of one chat are handled in arrival order, so a user's dialog steps
/// never race each other. Handler failures are logged and skipped; the
/// listener backs off on its own when `getUpdates` fails.
pub async fn run_polling(bot: Bot, handler: Arc<ChatHandler>, poll_timeout: Duration) {
    let schema = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    let listener = Polling::builder(bot.clone())
        .timeout(poll_timeout)
        .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
        .build();

    info!("Bot polling started");

    Dispatcher::builder(bot, schema)
        .dependencies(dptree::deps![handler])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("Polling failed"),
        )
        .await;

    info!("Bot polling stopped");
}
