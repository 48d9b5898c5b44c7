use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Urgency {
    #[default]
    Normal,
    #[serde(rename = "Urgente")]
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub material_type: String,
    pub weight_tons: f64,
    #[serde(default)]
    pub urgency: Urgency,
}

impl TripRequest {
    /// Rejects what the search form would never let through.
    pub fn validate(&self) -> Result<(), String> {
        if self.origin.trim().is_empty() {
            return Err("origin cannot be empty".to_string());
        }
        if self.destination.trim().is_empty() {
            return Err("destination cannot be empty".to_string());
        }
        if self.material_type.trim().is_empty() {
            return Err("materialType cannot be empty".to_string());
        }
        if !self.weight_tons.is_finite() || self.weight_tons <= 0.0 {
            return Err("weightTons must be > 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    #[serde(rename = "Bajo")]
    Low,
    #[serde(rename = "Medio")]
    Medium,
    #[serde(rename = "Alto")]
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripAnalysis {
    pub estimated_distance_km: String,
    pub estimated_duration: String,
    pub ideal_vehicle_description: String,
    pub suggested_route: String,
    pub risk_level: RiskLevel,
    pub risk_analysis: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TripType {
    #[serde(rename = "Corta Distancia")]
    ShortDistance,
    #[serde(rename = "Media Distancia")]
    MediumDistance,
    #[serde(rename = "Larga Distancia")]
    LongDistance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecommendation {
    pub truck_id: String,
    pub driver_id: String,
    pub match_score: f64,
    pub trip_type: TripType,
    pub reasoning: String,
}

/// Analysis and ranked recommendations from a single service call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub analysis: TripAnalysis,
    pub recommendations: Vec<MatchRecommendation>,
}
