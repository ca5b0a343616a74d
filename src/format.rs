//! Chat message formatting (Telegram HTML).

use teloxide::utils::html;

use crate::types::{Task, TaskStats};

pub const WELCOME_TAGLINE: &str = "Men sizning vazifalar bazangiz bilan ishlovchi Task Manager botman.";
pub const NO_TASKS: &str = "Hozircha vazifalar yo'q.";
pub const NO_DESCRIPTION: &str = "Izoh yo'q";
pub const ASK_TITLE: &str = "Vazifa nomini (Title) kiriting:";
pub const ASK_DESCRIPTION: &str = "Vazifa haqida batafsil ma'lumot (Description) yozing:";
pub const TASK_SAVED: &str = "🎉 Vazifa muvaffaqiyatli saqlandi!";
pub const MARKED_DONE: &str = "Vazifa bajarildi!";
pub const TASK_NOT_FOUND: &str = "Kechirasiz, bu vazifa topilmadi yoki allaqachon o'chirilgan.";
pub const USE_MENU: &str = "Quyidagi menyudan foydalaning 👇";

/// Bot API limit on message text, counted after entity parsing.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Title and description are clipped to these before escaping, which keeps
/// every card under [`MAX_MESSAGE_CHARS`].
const MAX_TITLE_CHARS: usize = 256;
const MAX_DESCRIPTION_CHARS: usize = 3500;

const ELLIPSIS: char = '…';

const STATUS_DONE: &str = "✅";
const STATUS_PENDING: &str = "⏳";

/// Shorten `text` to at most `max` characters, marking the cut with an ellipsis.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push(ELLIPSIS);
    out
}

fn title_html(task: &Task) -> String {
    html::bold(&html::escape(&clip(&task.title, MAX_TITLE_CHARS)))
}

/// Greeting sent in reply to `/start`. Plain text.
pub fn greeting(full_name: &str) -> String {
    format!("Assalomu alaykum, {}!\n{}", full_name, WELCOME_TAGLINE)
}

/// Statistics reply for the chat.
pub fn stats_message(stats: &TaskStats) -> String {
    format!(
        "📊 <b>Statistika:</b>\n\n🔹 Jami: {}\n✅ Bajarildi: {}\n⏳ Kutilmoqda: {}",
        stats.total, stats.completed, stats.uncompleted
    )
}

/// One task as shown in the task list.
pub fn task_card(task: &Task) -> String {
    let description = task
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(|d| html::escape(&clip(d, MAX_DESCRIPTION_CHARS)))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());
    let status = if task.completed {
        STATUS_DONE
    } else {
        STATUS_PENDING
    };

    format!(
        "📌 {}\n📝 {}\nHolati: {}",
        title_html(task),
        description,
        status
    )
}

/// Replacement text for a task card after it was marked done.
pub fn task_done(task: &Task) -> String {
    format!("📌 {}\nHolati: {} Bajarildi", title_html(task), STATUS_DONE)
}

/// Human-readable summary attached to the API statistics response.
pub fn pending_summary(uncompleted: i64) -> String {
    format!("Sizda {} ta bajarilishi kerak bo'lgan ish bor.", uncompleted)
}
