//! Task CRUD operations.

use super::{Database, now_ms};
use crate::types::{NewTask, Task, TaskFilter, TaskId, TaskPatch};
use anyhow::Result;
use rusqlite::{Connection, Row, ToSql, params};

const TASK_COLUMNS: &str = "id, owner_id, title, description, completed, created_at";

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        completed: row.get("completed")?,
        created_at: row.get("created_at")?,
    })
}

/// Escape LIKE wildcards so user input matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Build a WHERE clause and its parameters from a filter.
pub(super) fn filter_clause(filter: &TaskFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(completed) = filter.completed {
        params_vec.push(Box::new(completed));
        clauses.push(format!("completed = ?{}", params_vec.len()));
    }

    if let Some(owner_id) = filter.owner_id {
        params_vec.push(Box::new(owner_id));
        clauses.push(format!("owner_id = ?{}", params_vec.len()));
    }

    if let Some(ref search) = filter.search
        && !search.is_empty()
    {
        params_vec.push(Box::new(like_pattern(search)));
        clauses.push(format!("title LIKE ?{} ESCAPE '\\'", params_vec.len()));
    }

    if clauses.is_empty() {
        (String::new(), params_vec)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params_vec)
    }
}

/// Internal helper to get a task using an existing connection (avoids deadlock).
fn get_task_internal(conn: &Connection, task_id: TaskId) -> Result<Option<Task>> {
    let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;

    let result = stmt.query_row(params![task_id], parse_task_row);

    match result {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// Create a new task and return the stored record.
    pub fn create_task(&self, input: &NewTask) -> Result<Task> {
        input.validate()?;
        self.with_conn(|conn| {
            let now = now_ms();
            conn.execute(
                "INSERT INTO tasks (owner_id, title, description, completed, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    input.owner_id,
                    input.title,
                    input.description,
                    input.completed,
                    now
                ],
            )?;

            Ok(Task {
                id: conn.last_insert_rowid(),
                owner_id: input.owner_id,
                title: input.title.clone(),
                description: input.description.clone(),
                completed: input.completed,
                created_at: now,
            })
        })
    }

    /// Get a task by ID.
    pub fn get_task(&self, task_id: TaskId) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// List tasks matching the filter, oldest first.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let (where_sql, params_vec) = filter_clause(filter);
            let sql = format!("SELECT {TASK_COLUMNS} FROM tasks{where_sql} ORDER BY id ASC");
            let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(params_refs.as_slice(), parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Apply a partial update. Returns `None` if the task does not exist.
    pub fn update_task(&self, task_id: TaskId, patch: &TaskPatch) -> Result<Option<Task>> {
        patch.validate()?;
        self.with_conn(|conn| {
            let Some(mut task) = get_task_internal(conn, task_id)? else {
                return Ok(None);
            };
            if patch.is_empty() {
                return Ok(Some(task));
            }

            patch.apply(&mut task);
            conn.execute(
                "UPDATE tasks SET owner_id = ?1, title = ?2, description = ?3, completed = ?4
                 WHERE id = ?5",
                params![
                    task.owner_id,
                    task.title,
                    task.description,
                    task.completed,
                    task.id
                ],
            )?;
            Ok(Some(task))
        })
    }

    /// Mark a task completed. Idempotent; returns `None` if the task does not exist.
    pub fn mark_done(&self, task_id: TaskId) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tasks SET completed = 1 WHERE id = ?1",
                params![task_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            get_task_internal(conn, task_id)
        })
    }

    /// Delete a task. Returns `false` if it did not exist.
    pub fn delete_task(&self, task_id: TaskId) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            Ok(deleted > 0)
        })
    }
}
