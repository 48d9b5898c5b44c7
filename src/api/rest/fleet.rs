use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;

use crate::fleet::FleetSummary;
use crate::models::fleet::{Driver, Truck};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/fleet", get(fleet_overview))
}

#[derive(Serialize)]
pub struct FleetOverview {
    pub trucks: Vec<Truck>,
    pub drivers: Vec<Driver>,
    pub summary: FleetSummary,
}

async fn fleet_overview(State(state): State<Arc<AppState>>) -> Json<FleetOverview> {
    Json(FleetOverview {
        trucks: state.registry.trucks().to_vec(),
        drivers: state.registry.drivers().to_vec(),
        summary: state.registry.summary(),
    })
}
