//! HTTP server exposing the note service.
//!
//! Routes:
//! - `GET    /notes`              list, with `title`, `content`, `createdBefore`,
//!                                `createdAfter`, `offset` and `limit` filters
//! - `GET    /note/read/{title}`  read by exact title
//! - `GET    /note/{id}`          read by id
//! - `POST   /note`               create
//! - `PUT    /note/{id}`          update title and/or content
//! - `DELETE /note/{id}`          delete

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use chrono::FixedOffset;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::entity::{Note, NoteView, Presentation};
use crate::error::Result;
use crate::service::NoteService;
use crate::storage::{JsonFileStore, NoteStore};

pub use error::{ApiError, ErrorBody};

/// Shared state handed to every handler.
pub struct AppState<S> {
    pub service: NoteService<S>,
    pub presentation: Presentation,
    pub display_offset: FixedOffset,
}

impl<S: NoteStore> AppState<S> {
    pub fn new(service: NoteService<S>, presentation: Presentation, display_offset: FixedOffset) -> Self {
        Self {
            service,
            presentation,
            display_offset,
        }
    }

    pub fn view(&self, note: &Note) -> NoteView {
        NoteView::render(note, self.presentation, &self.display_offset)
    }
}

pub fn router<S: NoteStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/notes", get(routes::list_notes::<S>))
        .route("/note", post(routes::create_note::<S>))
        .route("/note/read/{title}", get(routes::read_note_by_title::<S>))
        .route(
            "/note/{id}",
            get(routes::read_note::<S>)
                .put(routes::update_note::<S>)
                .delete(routes::delete_note::<S>),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Build the production state from a server config.
pub fn build_state(config: &ServerConfig) -> Result<Arc<AppState<JsonFileStore>>> {
    let store = JsonFileStore::new(config.db_path.clone());
    let service = NoteService::new(store, config.service);
    Ok(Arc::new(AppState::new(
        service,
        config.timestamps,
        config.display_offset()?,
    )))
}

/// Run the server until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = build_state(&config)?;
    // Create the database up front so a bad path fails at startup.
    state.service.store().load()?;

    let app = router(state);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        addr = %listener.local_addr()?,
        db = %config.db_path.display(),
        timestamps = %config.timestamps,
        id_errors = %config.service.id_errors,
        "notes server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("notes server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IdErrorPolicy, ServiceConfig};
    use crate::storage::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with(config: ServiceConfig, presentation: Presentation) -> Router {
        let service = NoteService::new(MemoryStore::new(), config);
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        router(Arc::new(AppState::new(service, presentation, offset)))
    }

    fn app() -> Router {
        app_with(ServiceConfig::default(), Presentation::Display)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    async fn create(app: &Router, title: &str, content: &str) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/note",
            Some(json!({ "title": title, "content": content })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn test_create_then_read_by_id() {
        let app = app();
        let created = create(&app, "A", "B").await;
        assert_eq!(created["id"], 1);

        let (status, note) = send(&app, "GET", "/note/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(note["title"], "A");
        assert_eq!(note["content"], "B");
        assert_eq!(note["created"], note["changed"]);
        // display format: "YYYY-MM-DD HH:MM:SS"
        assert_eq!(note["created"].as_str().unwrap().len(), 19);
    }

    #[tokio::test]
    async fn test_create_missing_fields_is_400() {
        let app = app();
        let (status, body) = send(&app, "POST", "/note", Some(json!({ "title": "A" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "title and content required");

        let (status, _) = send(&app, "POST", "/note", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_malformed_body_is_400() {
        let app = app();
        let (status, body) = send(&app, "POST", "/note", Some(json!({ "title": 5, "content": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("invalid JSON body"));
    }

    #[tokio::test]
    async fn test_create_non_object_body_is_400() {
        let app = app();
        for body in [json!(["t", "c"]), json!("t"), json!(42), Value::Null] {
            let (status, reply) = send(&app, "POST", "/note", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(reply["message"], "request body must be a JSON object");
        }

        let (status, _) = send(&app, "PUT", "/note/1", Some(json!(["t"]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "GET", "/notes", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_title_is_409() {
        let app = app();
        create(&app, "A", "B").await;
        let (status, body) = send(&app, "POST", "/note", Some(json!({ "title": "A", "content": "C" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "note with this title already exists");

        let (_, notes) = send(&app, "GET", "/notes", None).await;
        assert_eq!(notes.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_read_by_title() {
        let app = app();
        create(&app, "Shopping list", "eggs").await;

        let (status, note) = send(&app, "GET", "/note/read/Shopping%20list", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(note["content"], "eggs");

        let (status, body) = send(&app, "GET", "/note/read/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "note not found");
    }

    #[tokio::test]
    async fn test_list_empty_is_404() {
        let app = app();
        let (status, body) = send(&app, "GET", "/notes", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "no notes");
    }

    #[tokio::test]
    async fn test_list_limit_offset() {
        let app = app();
        for t in ["one", "two", "three"] {
            create(&app, t, "body").await;
        }
        let (status, notes) = send(&app, "GET", "/notes?limit=1&offset=1", None).await;
        assert_eq!(status, StatusCode::OK);
        let notes = notes.as_array().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0]["title"], "two");
    }

    #[tokio::test]
    async fn test_list_filters_and_no_match() {
        let app = app();
        create(&app, "Groceries", "Milk").await;
        create(&app, "Work", "report").await;

        let (status, notes) = send(&app, "GET", "/notes?content=MILK&createdBefore=garbage", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(notes.as_array().unwrap().len(), 1);
        assert_eq!(notes[0]["title"], "Groceries");

        let (status, body) = send(&app, "GET", "/notes?title=nothing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "no notes match filters");

        let (status, _) = send(&app, "GET", "/notes?createdAfter=2999-01-01", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "GET", "/notes?createdBefore=2024", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_repeated_query_key_uses_first() {
        let app = app();
        create(&app, "Groceries", "Milk").await;
        create(&app, "Work", "report").await;

        let (status, notes) = send(&app, "GET", "/notes?title=work&title=groc", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(notes.as_array().unwrap().len(), 1);
        assert_eq!(notes[0]["title"], "Work");
    }

    #[tokio::test]
    async fn test_whole_decimal_id_is_accepted() {
        let app = app();
        create(&app, "A", "x").await;

        let (status, note) = send(&app, "GET", "/note/1.0", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(note["title"], "A");

        let (status, body) = send(&app, "GET", "/note/1.5", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "invalid id");
    }

    #[tokio::test]
    async fn test_update_and_rename_conflict() {
        let app = app();
        create(&app, "A", "x").await;
        create(&app, "B", "y").await;

        let (status, body) = send(&app, "PUT", "/note/2", Some(json!({ "title": "B2", "content": "" }))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (_, note) = send(&app, "GET", "/note/2", None).await;
        assert_eq!(note["title"], "B2");
        assert_eq!(note["content"], "");

        let (status, body) = send(&app, "PUT", "/note/2", Some(json!({ "title": "A" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "another note with this title exists");

        let (_, a) = send(&app, "GET", "/note/1", None).await;
        let (_, b) = send(&app, "GET", "/note/2", None).await;
        assert_eq!(a["title"], "A");
        assert_eq!(b["title"], "B2");
    }

    #[tokio::test]
    async fn test_update_with_empty_body_is_accepted() {
        let app = app();
        create(&app, "A", "x").await;
        let (status, _) = send(&app, "PUT", "/note/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_delete_lifecycle() {
        let app = app();
        create(&app, "A", "x").await;

        let (status, _) = send(&app, "DELETE", "/note/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", "/note/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "DELETE", "/note/1", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "note not found");
    }

    #[tokio::test]
    async fn test_non_numeric_id_asymmetry() {
        let app = app();
        create(&app, "A", "x").await;

        let (status, body) = send(&app, "GET", "/note/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "invalid id");

        let (status, _) = send(&app, "DELETE", "/note/abc", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, "PUT", "/note/abc", Some(json!({ "content": "y" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unified_policy_uses_404_on_mutate() {
        let app = app_with(
            ServiceConfig {
                id_errors: IdErrorPolicy::Unified,
                ..Default::default()
            },
            Presentation::Display,
        );
        let (status, _) = send(&app, "DELETE", "/note/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "PUT", "/note/7", Some(json!({ "content": "y" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_raw_presentation_returns_rfc3339() {
        let app = app_with(ServiceConfig::default(), Presentation::Raw);
        let created = create(&app, "A", "x").await;
        let created_at = created["created"].as_str().unwrap();
        assert!(created_at.ends_with('Z'));
        assert!(created_at.contains('T'));
    }
}
