use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssignmentStatus {
    #[serde(rename = "Programado")]
    Scheduled,
    #[serde(rename = "En Curso")]
    InProgress,
    #[serde(rename = "Finalizado")]
    Completed,
}

/// Tracking id shown on the assignment screen, `AGE-<year>-<nnnn>`.
///
/// The four-digit suffix is random, so two ids in the same year can collide.
/// Nothing here relies on it being unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalId(String);

impl InternalId {
    pub const PREFIX: &'static str = "AGE";

    pub fn new(year: i32, suffix: u16) -> Self {
        Self(format!("{}-{year:04}-{suffix}", Self::PREFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedAssignment {
    pub id: InternalId,
    pub customer_transport_id: String,
    pub date: NaiveDate,
    pub origin: String,
    pub destination: String,
    pub material_type: String,
    pub truck_plate: String,
    pub driver_name: String,
    pub status: AssignmentStatus,
}
