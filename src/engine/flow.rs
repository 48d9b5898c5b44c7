use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, Local};
use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::confirmation::{generate_internal_id, AssignmentDraft};
use crate::engine::console::{ConsoleView, ResetToken, SearchOutcome, SearchTicket};
use crate::error::AppError;
use crate::models::assignment::ConfirmedAssignment;
use crate::models::trip::TripRequest;
use crate::state::AppState;

/// Puts the session into loading and starts the recommendation call in the
/// background. Returns the loading snapshot.
pub fn submit_search(
    state: &Arc<AppState>,
    session_id: Uuid,
    request: TripRequest,
) -> Result<ConsoleView, AppError> {
    request.validate().map_err(AppError::BadRequest)?;

    let (ticket, view) = state.with_console(session_id, |console| {
        let ticket = console.begin_search(request.clone())?;
        Ok::<_, AppError>((ticket, console.view(&state.registry)))
    })??;

    info!(session_id = %session_id, sequence = ticket.sequence, "search submitted");
    tokio::spawn(run_search(state.clone(), session_id, ticket, request));

    Ok(view)
}

pub async fn run_search(
    state: Arc<AppState>,
    session_id: Uuid,
    ticket: SearchTicket,
    request: TripRequest,
) {
    let start = Instant::now();
    let result = state
        .recommender
        .recommend(&request, state.registry.trucks(), state.registry.drivers())
        .await;
    let elapsed = start.elapsed().as_secs_f64();

    let label = match &result {
        Ok(response) => {
            info!(
                session_id = %session_id,
                sequence = ticket.sequence,
                recommendations = response.recommendations.len(),
                "recommendations received"
            );
            "success"
        }
        Err(err) => {
            warn!(
                session_id = %session_id,
                sequence = ticket.sequence,
                kind = err.kind(),
                error = %err,
                "recommendation call failed"
            );
            err.kind()
        }
    };

    match state.with_console(session_id, |console| console.complete_search(ticket, result)) {
        Ok(SearchOutcome::Applied) => state.metrics.observe_recommendation(label, elapsed),
        Ok(SearchOutcome::Stale) => {
            state.metrics.observe_recommendation("stale", elapsed);
            info!(
                session_id = %session_id,
                sequence = ticket.sequence,
                "discarded result of superseded search"
            );
        }
        Err(err) => warn!(session_id = %session_id, error = %err, "search finished for missing session"),
    }
}

pub fn select_option(
    state: &AppState,
    session_id: Uuid,
    index: usize,
) -> Result<AssignmentDraft, AppError> {
    let internal_id = generate_internal_id(Local::now().year(), &mut rand::thread_rng());

    let draft = state.with_console(session_id, |console| {
        console.select(index, internal_id).cloned()
    })??;

    info!(
        session_id = %session_id,
        assignment_id = %draft.internal_id,
        truck_id = %draft.recommendation.truck_id,
        driver_id = %draft.recommendation.driver_id,
        "recommendation selected"
    );
    Ok(draft)
}

/// Records the assignment, announces it, and schedules the return to search.
pub fn confirm_assignment(
    state: &Arc<AppState>,
    session_id: Uuid,
    customer_transport_id: &str,
) -> Result<ConfirmedAssignment, AppError> {
    let date = Local::now().date_naive();

    let (record, token) = state.with_console(session_id, |console| {
        console.confirm(customer_transport_id, &state.registry, date)
    })??;

    state.metrics.assignments_confirmed_total.inc();
    let _ = state.assignment_events_tx.send(record.clone());

    info!(
        session_id = %session_id,
        assignment_id = %record.id,
        customer_transport_id = %record.customer_transport_id,
        truck_plate = %record.truck_plate,
        driver_name = %record.driver_name,
        "assignment confirmed"
    );

    tokio::spawn(reset_after_success(state.clone(), session_id, token));
    Ok(record)
}

async fn reset_after_success(state: Arc<AppState>, session_id: Uuid, token: ResetToken) {
    sleep(state.success_reset).await;

    match state.with_console(session_id, |console| console.reset_after_success(token)) {
        Ok(true) => info!(session_id = %session_id, "flow reset to search"),
        Ok(false) => {}
        Err(err) => warn!(session_id = %session_id, error = %err, "reset skipped"),
    }
}
