//! Menu buttons and inline keyboards.

use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

use crate::types::TaskId;

pub const BUTTON_TASKS: &str = "📋 Vazifalar";
pub const BUTTON_STATS: &str = "📊 Statistika";
pub const BUTTON_NEW_TASK: &str = "➕ Yangi vazifa";
pub const BUTTON_MARK_DONE: &str = "Bajarildi deb belgilash ✅";

/// Prefix of the callback data carried by "mark done" buttons.
pub const DONE_PREFIX: &str = "done_";

const MENU_COLUMNS: usize = 2;

/// Reply keyboard with the three menu actions, two per row.
pub fn main_menu() -> ReplyMarkup {
    let rows: Vec<Vec<KeyboardButton>> = [BUTTON_TASKS, BUTTON_STATS, BUTTON_NEW_TASK]
        .chunks(MENU_COLUMNS)
        .map(|row| row.iter().map(|label| KeyboardButton::new(*label)).collect())
        .collect();

    ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard())
}

/// Inline "mark done" button for one task.
pub fn mark_done_button(task_id: TaskId) -> ReplyMarkup {
    ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new([[
        InlineKeyboardButton::callback(BUTTON_MARK_DONE, done_callback_data(task_id)),
    ]]))
}

pub fn done_callback_data(task_id: TaskId) -> String {
    format!("{DONE_PREFIX}{task_id}")
}
