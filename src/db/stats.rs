//! Aggregation queries for statistics.

use super::Database;
use super::tasks::filter_clause;
use crate::types::{TaskFilter, TaskStats};
use anyhow::Result;
use rusqlite::ToSql;

impl Database {
    /// Count total and completed tasks among those matching the filter.
    pub fn get_stats(&self, filter: &TaskFilter) -> Result<TaskStats> {
        self.with_conn(|conn| {
            let (where_sql, params_vec) = filter_clause(filter);
            let sql = format!(
                "SELECT COUNT(*), COALESCE(SUM(completed), 0) FROM tasks{where_sql}"
            );
            let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

            let (total, completed): (i64, i64) =
                conn.query_row(&sql, params_refs.as_slice(), |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?;

            Ok(TaskStats::new(total, completed))
        })
    }
}
