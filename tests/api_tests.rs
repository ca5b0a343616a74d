//! REST API tests.
//!
//! Requests go straight through the router with `oneshot`; no socket is bound.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use task_tracker_bot::api::build_router;
use task_tracker_bot::db::Database;
use task_tracker_bot::types::NewTask;
use tower::ServiceExt;

fn setup() -> (Database, Router) {
    let db = Database::open_in_memory().expect("Failed to create in-memory database");
    let app = build_router(db.clone());
    (db, app)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // Extractor rejections come back as plain text
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

mod create_tests {
    use super::*;

    #[tokio::test]
    async fn post_creates_task_with_defaults() {
        let (db, app) = setup();

        let (status, body) = send(
            &app,
            Method::POST,
            "/tasks/",
            Some(json!({ "title": "Write report" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["title"], "Write report");
        assert_eq!(body["description"], Value::Null);
        assert_eq!(body["owner_id"], Value::Null);
        assert_eq!(body["completed"], false);
        let id = body["id"].as_i64().expect("id should be an integer");
        assert!(db.get_task(id).unwrap().is_some());
    }

    #[tokio::test]
    async fn post_accepts_all_fields() {
        let (_db, app) = setup();

        let (status, body) = send(
            &app,
            Method::POST,
            "/tasks/",
            Some(json!({
                "title": "Buy milk",
                "description": "2 liters",
                "owner_id": 42,
                "completed": true
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["description"], "2 liters");
        assert_eq!(body["owner_id"], 42);
        assert_eq!(body["completed"], true);
    }

    #[tokio::test]
    async fn post_without_title_is_rejected() {
        let (db, app) = setup();

        let (status, body) = send(
            &app,
            Method::POST,
            "/tasks/",
            Some(json!({ "description": "no title" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_REQUIRED_FIELD");
        assert_eq!(body["field"], "title");
        assert_eq!(db.get_stats(&Default::default()).unwrap().total, 0);
    }

    #[tokio::test]
    async fn post_with_blank_title_is_rejected() {
        let (_db, app) = setup();

        let (status, body) =
            send(&app, Method::POST, "/tasks/", Some(json!({ "title": "  " }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FIELD_VALUE");
    }
}

mod list_tests {
    use super::*;

    fn seed(db: &Database) {
        let report = db.create_task(&NewTask::titled("Weekly report")).unwrap();
        db.create_task(&NewTask::titled("Buy milk")).unwrap();
        db.create_task(&NewTask::titled("Report bug")).unwrap();
        db.mark_done(report.id).unwrap();
    }

    #[tokio::test]
    async fn list_returns_all_tasks() {
        let (db, app) = setup();
        seed(&db);

        let (status, body) = get(&app, "/tasks/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn list_filters_by_completed() {
        let (db, app) = setup();
        seed(&db);

        let (_, done) = get(&app, "/tasks/?completed=true").await;
        let (_, open) = get(&app, "/tasks/?completed=false").await;

        let done = done.as_array().unwrap();
        let open = open.as_array().unwrap();
        assert_eq!(done.len(), 1);
        assert!(done.iter().all(|t| t["completed"] == true));
        assert_eq!(open.len(), 2);
        assert!(open.iter().all(|t| t["completed"] == false));
    }

    #[tokio::test]
    async fn list_searches_titles() {
        let (db, app) = setup();
        seed(&db);

        let (status, body) = get(&app, "/tasks/?search=report").await;

        assert_eq!(status, StatusCode::OK);
        let titles: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["Weekly report", "Report bug"]);
    }

    #[tokio::test]
    async fn list_combines_search_and_completed() {
        let (db, app) = setup();
        seed(&db);

        let (_, body) = get(&app, "/tasks/?search=report&completed=false").await;

        let body = body.as_array().unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["title"], "Report bug");
    }

    #[tokio::test]
    async fn list_search_ignores_surrounding_whitespace() {
        let (db, app) = setup();
        seed(&db);

        let (status, body) = get(&app, "/tasks/?search=milk%20").await;

        assert_eq!(status, StatusCode::OK);
        let body = body.as_array().unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["title"], "Buy milk");
    }

    #[tokio::test]
    async fn list_rejects_bad_completed_value() {
        let (_db, app) = setup();

        let (status, body) = get(&app, "/tasks/?completed=maybe").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "completed");
    }
}

mod item_tests {
    use super::*;

    #[tokio::test]
    async fn retrieve_returns_task() {
        let (db, app) = setup();
        let task = db.create_task(&NewTask::owned(3, "t", "d")).unwrap();

        let (status, body) = get(&app, &format!("/tasks/{}/", task.id)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], task.id);
        assert_eq!(body["description"], "d");
        assert_eq!(body["created_at"], task.created_at);
    }

    #[tokio::test]
    async fn retrieve_missing_task_is_not_found() {
        let (_db, app) = setup();

        let (status, body) = get(&app, "/tasks/999/").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "TASK_NOT_FOUND");
    }

    #[tokio::test]
    async fn non_integer_id_is_bad_request() {
        let (_db, app) = setup();

        let (status, _) = get(&app, "/tasks/abc/").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patch_updates_given_fields_only() {
        let (db, app) = setup();
        let task = db.create_task(&NewTask::owned(3, "old", "keep")).unwrap();

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/tasks/{}/", task.id),
            Some(json!({ "completed": true })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completed"], true);
        assert_eq!(body["title"], "old");
        assert_eq!(body["description"], "keep");
        assert!(db.get_task(task.id).unwrap().unwrap().completed);
    }

    #[tokio::test]
    async fn patch_with_null_clears_description() {
        let (db, app) = setup();
        let task = db.create_task(&NewTask::owned(3, "t", "gone")).unwrap();

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/tasks/{}/", task.id),
            Some(json!({ "description": null })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], Value::Null);
        assert_eq!(body["owner_id"], 3);
    }

    #[tokio::test]
    async fn patch_with_null_for_required_field_is_rejected() {
        let (db, app) = setup();
        let task = db.create_task(&NewTask::titled("keep")).unwrap();
        let uri = format!("/tasks/{}/", task.id);

        for (body, field) in [
            (json!({ "title": null }), "title"),
            (json!({ "completed": null }), "completed"),
        ] {
            let (status, body) = send(&app, Method::PATCH, &uri, Some(body)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["code"], "INVALID_FIELD_VALUE");
            assert_eq!(body["field"], field);
        }
        assert_eq!(db.get_task(task.id).unwrap(), Some(task));
    }

    #[tokio::test]
    async fn patch_missing_task_is_not_found() {
        let (_db, app) = setup();

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/tasks/12/",
            Some(json!({ "completed": true })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_replaces_task() {
        let (db, app) = setup();
        let task = db.create_task(&NewTask::owned(3, "old", "old desc")).unwrap();

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/tasks/{}/", task.id),
            Some(json!({ "title": "new", "completed": true })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "new");
        assert_eq!(body["completed"], true);
        assert_eq!(body["description"], Value::Null);
        assert_eq!(body["owner_id"], Value::Null);
        assert_eq!(body["created_at"], task.created_at);
    }

    #[tokio::test]
    async fn put_without_title_is_rejected() {
        let (db, app) = setup();
        let task = db.create_task(&NewTask::titled("keep")).unwrap();

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/tasks/{}/", task.id),
            Some(json!({ "completed": true })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_REQUIRED_FIELD");
        assert!(!db.get_task(task.id).unwrap().unwrap().completed);
    }

    #[tokio::test]
    async fn delete_removes_task() {
        let (db, app) = setup();
        let task = db.create_task(&NewTask::titled("t")).unwrap();
        let uri = format!("/tasks/{}/", task.id);

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
        assert!(db.get_task(task.id).unwrap().is_none());

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod stats_tests {
    use super::*;

    #[tokio::test]
    async fn stats_report_counts_and_summary() {
        let (db, app) = setup();
        let a = db.create_task(&NewTask::titled("a")).unwrap();
        db.create_task(&NewTask::titled("b")).unwrap();
        db.create_task(&NewTask::titled("c")).unwrap();
        db.mark_done(a.id).unwrap();

        let (status, body) = get(&app, "/tasks/stats/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "total_tasks": 3,
                "completed_tasks": 1,
                "uncompleted_tasks": 2,
                "status_message": "Sizda 2 ta bajarilishi kerak bo'lgan ish bor."
            })
        );
    }

    #[tokio::test]
    async fn stats_on_empty_store() {
        let (_db, app) = setup();

        let (status, body) = get(&app, "/tasks/stats/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_tasks"], 0);
        assert_eq!(body["uncompleted_tasks"], 0);
    }

    #[tokio::test]
    async fn stats_honour_filters() {
        let (db, app) = setup();
        db.create_task(&NewTask::titled("report")).unwrap();
        db.create_task(&NewTask::titled("other")).unwrap();

        let (_, body) = get(&app, "/tasks/stats/?search=rep").await;

        assert_eq!(body["total_tasks"], 1);
    }
}

#[tokio::test]
async fn health_reports_version() {
    let (_db, app) = setup();

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
