use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;

use crate::fleet::FleetRegistry;
use crate::models::assignment::{AssignmentStatus, ConfirmedAssignment, InternalId};
use crate::models::trip::{MatchRecommendation, TripRequest};

/// Stand-in for a plate or driver name the registry cannot resolve.
pub const UNKNOWN: &str = "Unknown";

pub fn generate_internal_id<R: Rng + ?Sized>(year: i32, rng: &mut R) -> InternalId {
    InternalId::new(year, rng.gen_range(1000..=9999))
}

/// Selection waiting for the operator to enter the customer's transport id.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDraft {
    pub internal_id: InternalId,
    pub recommendation: MatchRecommendation,
}

pub fn confirm(
    draft: &AssignmentDraft,
    request: &TripRequest,
    customer_transport_id: &str,
    registry: &FleetRegistry,
    date: NaiveDate,
) -> ConfirmedAssignment {
    let truck_plate = registry
        .truck(&draft.recommendation.truck_id)
        .map(|truck| truck.plate.clone())
        .unwrap_or_else(|| UNKNOWN.to_string());
    let driver_name = registry
        .driver(&draft.recommendation.driver_id)
        .map(|driver| driver.name.clone())
        .unwrap_or_else(|| UNKNOWN.to_string());

    ConfirmedAssignment {
        id: draft.internal_id.clone(),
        customer_transport_id: customer_transport_id.trim().to_string(),
        date,
        origin: request.origin.clone(),
        destination: request.destination.clone(),
        material_type: request.material_type.clone(),
        truck_plate,
        driver_name,
        status: AssignmentStatus::Scheduled,
    }
}
