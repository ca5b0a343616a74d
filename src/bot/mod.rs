//! Chat interface: update handling, guided task creation, Telegram transport.

pub mod dispatcher;
pub mod keyboards;
pub mod session;
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::types::{CallbackQuery, ChatId, MessageId, ParseMode, ReplyMarkup};

pub use dispatcher::ChatHandler;
pub use session::{ConversationState, InMemorySessionStore, SessionKey, SessionStore};
pub use telegram::{TelegramTransport, connect, run_polling};

/// Outbound side of the chat connection.
///
/// The handler only talks to the chat service through this trait, so tests
/// can substitute a recording implementation.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a new message to a chat.
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<ReplyMarkup>,
        parse_mode: Option<ParseMode>,
    ) -> Result<()>;

    /// Acknowledge a callback query, optionally as a modal alert.
    async fn answer_callback(&self, query: &CallbackQuery, text: &str, show_alert: bool)
    -> Result<()>;

    /// Replace the text of a previously sent message.
    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()>;
}
