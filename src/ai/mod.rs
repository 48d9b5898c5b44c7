pub mod gemini;
pub mod prompt;

use async_trait::async_trait;

use crate::error::RecommendationError;
use crate::models::fleet::{Driver, Truck};
use crate::models::trip::{RecommendationResponse, TripRequest};

/// External service that analyzes a trip and ranks truck/driver pairs.
///
/// One invocation is one call: implementations do not retry and do not
/// fall back to local heuristics.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(
        &self,
        request: &TripRequest,
        trucks: &[Truck],
        drivers: &[Driver],
    ) -> Result<RecommendationResponse, RecommendationError>;
}
