//! Routes incoming chat messages and callbacks to handlers.
//!
//! Menu buttons and `/start` are honoured in any conversation state; other
//! text is fed to the guided task creation dialog:
//!
//! ```text
//! Idle --"new task"--> AwaitingTitle --text--> AwaitingDescription --text--> Idle (task saved)
//! ```

use anyhow::Result;
use std::sync::Arc;
use teloxide::types::{CallbackQuery, ChatId, Message, ParseMode, User};
use tracing::{debug, info, warn};

use super::ChatTransport;
use super::keyboards::{
    BUTTON_NEW_TASK, BUTTON_STATS, BUTTON_TASKS, DONE_PREFIX, main_menu, mark_done_button,
};
use super::session::{ConversationState, SessionKey, SessionStore};
use crate::db::Database;
use crate::format;
use crate::types::{NewTask, TaskFilter, TaskId, UserId};

/// Actions reachable from the main menu at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Start,
    ListTasks,
    Statistics,
    NewTask,
}

impl MenuAction {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if is_start_command(text) {
            return Some(MenuAction::Start);
        }
        match text {
            BUTTON_TASKS | "Vazifalar" => Some(MenuAction::ListTasks),
            BUTTON_STATS | "Statistika" => Some(MenuAction::Statistics),
            BUTTON_NEW_TASK | "Yangi vazifa" => Some(MenuAction::NewTask),
            _ => None,
        }
    }
}

/// Matches `/start`, `/start@SomeBot` and `/start <payload>`.
fn is_start_command(text: &str) -> bool {
    let Some(command) = text.split_whitespace().next() else {
        return false;
    };
    command.split('@').next() == Some("/start")
}

/// Extract the task id from `done_<id>` callback data.
///
/// `None` means the data is not a mark-done callback at all; `Some(None)` means
/// it is one but the id is malformed.
pub fn parse_done_callback(data: &str) -> Option<Option<TaskId>> {
    data.strip_prefix(DONE_PREFIX)
        .map(|raw| raw.parse::<TaskId>().ok())
}

/// Owner id stored for tasks created by `user`.
fn owner_id(user: &User) -> UserId {
    // Telegram user ids fit in 52 bits
    user.id.0 as UserId
}

/// Chat message and callback handler.
pub struct ChatHandler {
    db: Database,
    transport: Arc<dyn ChatTransport>,
    sessions: Arc<dyn SessionStore>,
}

impl ChatHandler {
    pub fn new(
        db: Database,
        transport: Arc<dyn ChatTransport>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            db,
            transport,
            sessions,
        }
    }

    /// Handle one incoming message end to end.
    pub async fn handle_message(&self, message: &Message) -> Result<()> {
        let chat_id = message.chat.id;
        let Some(user) = message.from.as_ref() else {
            debug!(chat_id = chat_id.0, "Ignoring message without sender");
            return Ok(());
        };
        let user_id = owner_id(user);
        let key = SessionKey::new(chat_id.0, user_id);
        let Some(text) = message.text() else {
            debug!(chat_id = chat_id.0, user_id, "Ignoring non-text message");
            return Ok(());
        };

        if let Some(action) = MenuAction::parse(text) {
            debug!(chat_id = chat_id.0, user_id, ?action, "Menu action");
            return match action {
                MenuAction::Start => self.start(chat_id, user).await,
                MenuAction::ListTasks => self.list_tasks(chat_id, user_id).await,
                MenuAction::Statistics => self.statistics(chat_id).await,
                MenuAction::NewTask => self.begin_new_task(key).await,
            };
        }

        match self.sessions.get(key) {
            Some(ConversationState::AwaitingTitle) => self.receive_title(key, text).await,
            Some(ConversationState::AwaitingDescription { title }) => {
                self.receive_description(key, title, text).await
            }
            None => {
                self.transport
                    .send_message(chat_id, format::USE_MENU, Some(main_menu()), None)
                    .await
            }
        }
    }

    async fn start(&self, chat_id: ChatId, user: &User) -> Result<()> {
        self.transport
            .send_message(
                chat_id,
                &format::greeting(&user.full_name()),
                Some(main_menu()),
                None,
            )
            .await
    }

    async fn statistics(&self, chat_id: ChatId) -> Result<()> {
        let stats = self
            .db
            .call(|db| db.get_stats(&TaskFilter::default()))
            .await?;
        self.transport
            .send_message(
                chat_id,
                &format::stats_message(&stats),
                None,
                Some(ParseMode::Html),
            )
            .await
    }

    async fn list_tasks(&self, chat_id: ChatId, user_id: UserId) -> Result<()> {
        let tasks = self
            .db
            .call(move |db| db.list_tasks(&TaskFilter::owned_by(user_id)))
            .await?;

        if tasks.is_empty() {
            return self
                .transport
                .send_message(chat_id, format::NO_TASKS, None, None)
                .await;
        }

        // One bad card must not hide the rest of the list
        for task in &tasks {
            let markup = (!task.completed).then(|| mark_done_button(task.id));
            if let Err(e) = self
                .transport
                .send_message(
                    chat_id,
                    &format::task_card(task),
                    markup,
                    Some(ParseMode::Html),
                )
                .await
            {
                warn!(
                    task_id = task.id,
                    chat_id = chat_id.0,
                    "Failed to send task card: {:#}",
                    e
                );
            }
        }
        Ok(())
    }

    async fn begin_new_task(&self, key: SessionKey) -> Result<()> {
        self.sessions.set(key, ConversationState::AwaitingTitle);
        self.transport
            .send_message(ChatId(key.chat_id), format::ASK_TITLE, None, None)
            .await
    }

    async fn receive_title(&self, key: SessionKey, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return self
                .transport
                .send_message(ChatId(key.chat_id), format::ASK_TITLE, None, None)
                .await;
        }

        self.sessions.set(
            key,
            ConversationState::AwaitingDescription {
                title: text.to_string(),
            },
        );
        self.transport
            .send_message(ChatId(key.chat_id), format::ASK_DESCRIPTION, None, None)
            .await
    }

    async fn receive_description(&self, key: SessionKey, title: String, text: &str) -> Result<()> {
        let input = NewTask::owned(key.user_id, title, text);
        let task = self.db.call(move |db| db.create_task(&input)).await?;
        self.sessions.clear(key);
        info!(task_id = task.id, user_id = key.user_id, "Task created via chat");

        self.transport
            .send_message(
                ChatId(key.chat_id),
                format::TASK_SAVED,
                Some(main_menu()),
                None,
            )
            .await
    }

    /// Handle a press on an inline button.
    pub async fn handle_callback(&self, query: &CallbackQuery) -> Result<()> {
        let parsed = query.data.as_deref().and_then(parse_done_callback);
        let Some(task_id) = parsed else {
            debug!(data = ?query.data, "Ignoring unknown callback");
            return self.transport.answer_callback(query, "", false).await;
        };

        let task = match task_id {
            Some(id) => self.db.call(move |db| db.mark_done(id)).await?,
            None => {
                warn!(data = ?query.data, "Malformed mark-done callback");
                None
            }
        };

        let Some(task) = task else {
            return self
                .transport
                .answer_callback(query, format::TASK_NOT_FOUND, true)
                .await;
        };

        info!(task_id = task.id, user_id = owner_id(&query.from), "Task marked done");
        self.transport
            .answer_callback(query, format::MARKED_DONE, false)
            .await?;

        if let Some(message) = query.regular_message() {
            self.transport
                .edit_message_text(
                    message.chat.id,
                    message.id,
                    &format::task_done(&task),
                    Some(ParseMode::Html),
                )
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_menu_actions() {
        assert_eq!(MenuAction::parse("/start"), Some(MenuAction::Start));
        assert_eq!(MenuAction::parse("/start@TaskBot"), Some(MenuAction::Start));
        assert_eq!(MenuAction::parse("/start ref42"), Some(MenuAction::Start));
        assert_eq!(MenuAction::parse("📋 Vazifalar"), Some(MenuAction::ListTasks));
        assert_eq!(MenuAction::parse("Statistika"), Some(MenuAction::Statistics));
        assert_eq!(MenuAction::parse("➕ Yangi vazifa"), Some(MenuAction::NewTask));
        assert_eq!(MenuAction::parse("/started"), None);
        assert_eq!(MenuAction::parse("Buy milk"), None);
        assert_eq!(MenuAction::parse(""), None);
    }

    #[test]
    fn parses_done_callbacks() {
        assert_eq!(parse_done_callback("done_12"), Some(Some(12)));
        assert_eq!(parse_done_callback("done_x"), Some(None));
        assert_eq!(parse_done_callback("other_12"), None);
    }
}
