//! Core types for the task tracker.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};

/// Store-assigned task identifier.
pub type TaskId = i64;

/// Chat user identifier (Telegram user id).
pub type UserId = i64;

/// A persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: Option<UserId>,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Option<UserId>,
    pub completed: bool,
}

impl NewTask {
    /// A task with only a title; everything else defaulted.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// A task created from the chat flow on behalf of `owner_id`.
    pub fn owned(owner_id: UserId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            owner_id: Some(owner_id),
            completed: false,
        }
    }

    pub fn validate(&self) -> ApiResult<()> {
        validate_title(&self.title)
    }
}

/// Partial update of a task's mutable fields.
///
/// Outer `None` leaves the field untouched; for nullable fields `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub owner_id: Option<Option<UserId>>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ApiResult<()> {
        match self.title {
            Some(ref title) => validate_title(title),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.owner_id.is_none()
            && self.completed.is_none()
    }

    /// Apply this patch to a task in place.
    pub fn apply(&self, task: &mut Task) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = description.clone();
        }
        if let Some(owner_id) = self.owner_id {
            task.owner_id = owner_id;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

fn validate_title(title: &str) -> ApiResult<()> {
    if title.trim().is_empty() {
        return Err(ApiError::invalid_value("title", "title must not be blank"));
    }
    Ok(())
}

/// Filter applied to task listings and statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Exact match on the completed flag.
    pub completed: Option<bool>,
    /// Substring match against the title.
    pub search: Option<String>,
    /// Restrict to tasks owned by this user.
    pub owner_id: Option<UserId>,
}

impl TaskFilter {
    pub fn owned_by(owner_id: UserId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Default::default()
        }
    }
}

/// Completion counts over a collection of tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: i64,
    pub completed: i64,
    pub uncompleted: i64,
}

impl TaskStats {
    pub fn new(total: i64, completed: i64) -> Self {
        Self {
            total,
            completed,
            uncompleted: total - completed,
        }
    }

    /// Tally an in-memory collection.
    pub fn from_tasks<'a, I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let (total, completed) = tasks
            .into_iter()
            .fold((0, 0), |(total, completed), task| {
                (total + 1, completed + i64::from(task.completed))
            });
        Self::new(total, completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: TaskId, completed: bool) -> Task {
        Task {
            id,
            owner_id: None,
            title: format!("task {id}"),
            description: None,
            completed,
            created_at: 0,
        }
    }

    #[test]
    fn stats_of_empty_collection_are_zero() {
        let stats = TaskStats::from_tasks(&[]);
        assert_eq!(stats, TaskStats::default());
    }

    #[test]
    fn stats_uncompleted_is_total_minus_completed() {
        let tasks = vec![task(1, true), task(2, false), task(3, true), task(4, false), task(5, false)];
        let stats = TaskStats::from_tasks(&tasks);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.uncompleted, 3);
    }

    #[test]
    fn patch_apply_only_touches_present_fields() {
        let mut t = task(1, false);
        t.description = Some("keep".into());
        TaskPatch::completed(true).apply(&mut t);
        assert!(t.completed);
        assert_eq!(t.description.as_deref(), Some("keep"));
        assert_eq!(t.title, "task 1");
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(NewTask::titled("   ").validate().is_err());
        assert!(NewTask::titled("Buy milk").validate().is_ok());
        let patch = TaskPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
