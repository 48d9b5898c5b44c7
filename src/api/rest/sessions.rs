use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::confirmation::AssignmentDraft;
use crate::engine::console::ConsoleView;
use crate::engine::flow;
use crate::error::AppError;
use crate::models::assignment::ConfirmedAssignment;
use crate::models::trip::TripRequest;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(open_session))
        .route("/sessions/:id", get(get_session).delete(close_session))
        .route("/sessions/:id/search", post(search))
        .route("/sessions/:id/select", post(select))
        .route("/sessions/:id/back", post(back))
        .route("/sessions/:id/confirm", post(confirm))
        .route("/sessions/:id/history", post(view_history))
}

#[derive(Deserialize)]
pub struct SelectRequest {
    pub index: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub customer_transport_id: String,
}

async fn open_session(State(state): State<Arc<AppState>>) -> Result<Json<ConsoleView>, AppError> {
    let id = state.open_session();
    tracing::info!(session_id = %id, "session opened");

    let view = state.with_console(id, |console| console.view(&state.registry))?;
    Ok(Json(view))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConsoleView>, AppError> {
    let view = state.with_console(id, |console| console.view(&state.registry))?;
    Ok(Json(view))
}

async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.close_session(id)?;
    tracing::info!(session_id = %id, "session closed");
    Ok(StatusCode::NO_CONTENT)
}

async fn search(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TripRequest>,
) -> Result<(StatusCode, Json<ConsoleView>), AppError> {
    let view = flow::submit_search(&state, id, payload)?;
    Ok((StatusCode::ACCEPTED, Json(view)))
}

async fn select(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<AssignmentDraft>, AppError> {
    let draft = flow::select_option(&state, id, payload.index)?;
    Ok(Json(draft))
}

async fn back(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConsoleView>, AppError> {
    let view = state.with_console(id, |console| {
        console.back()?;
        Ok::<_, AppError>(console.view(&state.registry))
    })??;
    Ok(Json(view))
}

async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<ConfirmedAssignment>, AppError> {
    let record = flow::confirm_assignment(&state, id, &payload.customer_transport_id)?;
    Ok(Json(record))
}

async fn view_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ConfirmedAssignment>>, AppError> {
    let history = state.with_console(id, |console| console.view_history().to_vec())?;
    Ok(Json(history))
}
