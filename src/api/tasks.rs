//! Task resource handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use super::server::ApiServer;
use crate::error::{ApiError, ApiResult};
use crate::format::pending_summary;
use crate::types::{NewTask, Task, TaskFilter, TaskId, TaskPatch, TaskStats, UserId};

/// Query parameters accepted by the list and stats routes.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// `true`/`false` (also `1`/`0`, `True`/`False`).
    pub completed: Option<String>,
    /// Substring to look for in titles.
    pub search: Option<String>,
}

impl ListParams {
    pub fn into_filter(self) -> ApiResult<TaskFilter> {
        let completed = match self.completed.as_deref() {
            None | Some("") => None,
            Some("true" | "True" | "1") => Some(true),
            Some("false" | "False" | "0") => Some(false),
            Some(_) => {
                return Err(ApiError::invalid_value(
                    "completed",
                    "completed must be true or false",
                ));
            }
        };
        let search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(TaskFilter {
            completed,
            search,
            owner_id: None,
        })
    }
}

/// Request body for create (`POST`) and full update (`PUT`).
#[derive(Debug, Default, Deserialize)]
pub struct TaskRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TaskRequest {
    fn required_title(&self) -> ApiResult<String> {
        match self.title {
            Some(ref title) => Ok(title.clone()),
            None => Err(ApiError::missing_field("title")),
        }
    }

    pub fn into_new_task(self) -> ApiResult<NewTask> {
        let task = NewTask {
            title: self.required_title()?,
            description: self.description,
            owner_id: self.owner_id,
            completed: self.completed.unwrap_or(false),
        };
        task.validate()?;
        Ok(task)
    }

    /// A patch that overwrites every mutable field.
    pub fn into_replacement(self) -> ApiResult<TaskPatch> {
        let patch = TaskPatch {
            title: Some(self.required_title()?),
            description: Some(self.description),
            owner_id: Some(self.owner_id),
            completed: Some(self.completed.unwrap_or(false)),
        };
        patch.validate()?;
        Ok(patch)
    }
}

/// Request body for partial update (`PATCH`).
///
/// Every field is a double option so an explicit `null` can be told apart from
/// an absent field.
#[derive(Debug, Default, Deserialize)]
pub struct PatchRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub owner_id: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub completed: Option<Option<bool>>,
}

impl PatchRequest {
    pub fn into_patch(self) -> ApiResult<TaskPatch> {
        let patch = TaskPatch {
            title: non_null("title", self.title)?,
            description: self.description,
            owner_id: self.owner_id,
            completed: non_null("completed", self.completed)?,
        };
        patch.validate()?;
        Ok(patch)
    }
}

/// Reject an explicit `null` for a field that cannot be null.
fn non_null<T>(field: &str, value: Option<Option<T>>) -> ApiResult<Option<T>> {
    match value {
        Some(None) => Err(ApiError::invalid_value(
            field,
            &format!("{field} may not be null"),
        )),
        Some(Some(v)) => Ok(Some(v)),
        None => Ok(None),
    }
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Response body of `GET /tasks/stats/`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub uncompleted_tasks: i64,
    pub status_message: String,
}

impl From<TaskStats> for StatsResponse {
    fn from(stats: TaskStats) -> Self {
        Self {
            total_tasks: stats.total,
            completed_tasks: stats.completed,
            uncompleted_tasks: stats.uncompleted,
            status_message: pending_summary(stats.uncompleted),
        }
    }
}

pub(super) async fn list(
    State(state): State<ApiServer>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Task>>> {
    let filter = params.into_filter()?;
    let tasks = state.db().call(move |db| db.list_tasks(&filter)).await?;
    Ok(Json(tasks))
}

pub(super) async fn stats(
    State(state): State<ApiServer>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<StatsResponse>> {
    let filter = params.into_filter()?;
    let stats = state.db().call(move |db| db.get_stats(&filter)).await?;
    Ok(Json(stats.into()))
}

pub(super) async fn retrieve(
    State(state): State<ApiServer>,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<Task>> {
    state
        .db()
        .call(move |db| db.get_task(task_id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::task_not_found(task_id))
}

pub(super) async fn create(
    State(state): State<ApiServer>,
    Json(body): Json<TaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let input = body.into_new_task()?;
    let task = state.db().call(move |db| db.create_task(&input)).await?;
    info!(task_id = task.id, "Task created via API");
    Ok((StatusCode::CREATED, Json(task)))
}

pub(super) async fn replace(
    State(state): State<ApiServer>,
    Path(task_id): Path<TaskId>,
    Json(body): Json<TaskRequest>,
) -> ApiResult<Json<Task>> {
    let patch = body.into_replacement()?;
    update_with(state, task_id, patch).await
}

pub(super) async fn partial_update(
    State(state): State<ApiServer>,
    Path(task_id): Path<TaskId>,
    Json(body): Json<PatchRequest>,
) -> ApiResult<Json<Task>> {
    let patch = body.into_patch()?;
    update_with(state, task_id, patch).await
}

async fn update_with(state: ApiServer, task_id: TaskId, patch: TaskPatch) -> ApiResult<Json<Task>> {
    let task = state
        .db()
        .call(move |db| db.update_task(task_id, &patch))
        .await?
        .ok_or_else(|| ApiError::task_not_found(task_id))?;
    info!(task_id, "Task updated via API");
    Ok(Json(task))
}

pub(super) async fn destroy(
    State(state): State<ApiServer>,
    Path(task_id): Path<TaskId>,
) -> ApiResult<StatusCode> {
    let deleted = state.db().call(move |db| db.delete_task(task_id)).await?;
    if !deleted {
        return Err(ApiError::task_not_found(task_id));
    }
    info!(task_id, "Task deleted via API");
    Ok(StatusCode::NO_CONTENT)
}
