//! REST API over the task store.
//!
//! Conventional list/retrieve/create/update/delete routes under `/tasks/`,
//! plus `/tasks/stats/`. The API is unscoped: any caller sees every task.

mod server;
mod tasks;

pub use server::{ApiServer, build_router, start_server};
pub use tasks::{ListParams, PatchRequest, StatsResponse, TaskRequest};
