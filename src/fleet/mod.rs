pub mod fixture;

use serde::Serialize;

use crate::models::fleet::{Driver, Truck};
use crate::models::trip::MatchRecommendation;

/// Read-only roster of trucks and drivers, loaded once at start-up.
#[derive(Debug, Clone)]
pub struct FleetRegistry {
    trucks: Vec<Truck>,
    drivers: Vec<Driver>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub trucks_total: usize,
    pub trucks_available: usize,
    pub drivers_total: usize,
    pub drivers_fit: usize,
}

impl FleetRegistry {
    pub fn new(trucks: Vec<Truck>, drivers: Vec<Driver>) -> Self {
        Self { trucks, drivers }
    }

    pub fn from_fixture() -> Self {
        Self::new(fixture::trucks(), fixture::drivers())
    }

    pub fn trucks(&self) -> &[Truck] {
        &self.trucks
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn truck(&self, id: &str) -> Option<&Truck> {
        self.trucks.iter().find(|truck| truck.id == id)
    }

    pub fn driver(&self, id: &str) -> Option<&Driver> {
        self.drivers.iter().find(|driver| driver.id == id)
    }

    /// Both sides of a recommendation, or `None` if either id is unknown.
    pub fn resolve(&self, recommendation: &MatchRecommendation) -> Option<(&Truck, &Driver)> {
        let truck = self.truck(&recommendation.truck_id)?;
        let driver = self.driver(&recommendation.driver_id)?;
        Some((truck, driver))
    }

    pub fn summary(&self) -> FleetSummary {
        FleetSummary {
            trucks_total: self.trucks.len(),
            trucks_available: self.trucks.iter().filter(|t| t.is_available()).count(),
            drivers_total: self.drivers.len(),
            drivers_fit: self.drivers.iter().filter(|d| d.is_fit_to_drive()).count(),
        }
    }
}
