//! Axum route handlers for the notes API.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use super::AppState;
use crate::entity::NoteView;
use crate::search::{ListQuery, NoteFilter};
use crate::error::NotesError;
use crate::service::{messages, NewNote, NoteService, NoteUpdate};
use crate::storage::NoteStore;

/// Run a service call on the blocking pool; it does synchronous file I/O.
async fn run_blocking<S, T, F>(state: &Arc<AppState<S>>, op: F) -> Result<T, ApiError>
where
    S: NoteStore + 'static,
    T: Send + 'static,
    F: FnOnce(&NoteService<S>) -> crate::Result<T> + Send + 'static,
{
    let state = Arc::clone(state);
    let result = tokio::task::spawn_blocking(move || op(&state.service)).await?;
    result.map_err(ApiError::from)
}

/// Decode a JSON object body. An empty body counts as `{}`.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let invalid = |e: serde_json::Error| ApiError::bad_request(format!("invalid JSON body: {}", e));

    let value: Value = serde_json::from_slice(body).map_err(invalid)?;
    if !value.is_object() {
        return Err(NotesError::InvalidInput(messages::BODY_NOT_OBJECT.to_string()).into());
    }
    serde_json::from_value(value).map_err(invalid)
}

// GET /notes
pub async fn list_notes<S: NoteStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<NoteView>>, ApiError> {
    let Query(pairs) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let query = ListQuery::from_pairs(pairs);
    let filter = NoteFilter::from_query(&query, &state.display_offset);

    let notes = run_blocking(&state, move |svc| svc.list(&filter)).await?;
    Ok(Json(notes.iter().map(|n| state.view(n)).collect()))
}

// GET /note/read/{title}
pub async fn read_note_by_title<S: NoteStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(title): Path<String>,
) -> Result<Json<NoteView>, ApiError> {
    let note = run_blocking(&state, move |svc| svc.read_by_title(&title)).await?;
    Ok(Json(state.view(&note)))
}

// GET /note/{id}
pub async fn read_note<S: NoteStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<NoteView>, ApiError> {
    let note = run_blocking(&state, move |svc| svc.read_by_id(&id)).await?;
    Ok(Json(state.view(&note)))
}

// POST /note
pub async fn create_note<S: NoteStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<NoteView>), ApiError> {
    let input: NewNote = parse_body(&body)?;
    let note = run_blocking(&state, move |svc| svc.create(input)).await?;
    Ok((StatusCode::CREATED, Json(state.view(&note))))
}

// PUT /note/{id}
pub async fn update_note<S: NoteStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let changes: NoteUpdate = parse_body(&body)?;
    run_blocking(&state, move |svc| svc.update(&id, changes)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /note/{id}
pub async fn delete_note<S: NoteStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    run_blocking(&state, move |svc| svc.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
