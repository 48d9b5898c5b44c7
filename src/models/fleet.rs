use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TruckType {
    #[serde(rename = "Volcador")]
    Dump,
    #[serde(rename = "Sider")]
    CurtainSide,
    #[serde(rename = "Playo")]
    Flatbed,
    #[serde(rename = "Refrigerado")]
    Refrigerated,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TruckStatus {
    #[serde(rename = "Disponible")]
    Available,
    #[serde(rename = "En Tránsito")]
    InTransit,
    #[serde(rename = "Mantenimiento Programado")]
    MaintenancePlanned,
    #[serde(rename = "Mantenimiento Urgente")]
    MaintenanceUrgent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DriverStatus {
    #[serde(rename = "Descansado")]
    Rested,
    #[serde(rename = "Horas Cumplidas (Fatigado)")]
    Fatigued,
    #[serde(rename = "Licencia")]
    OnLeave,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LicenseStatus {
    #[serde(rename = "Vigente")]
    Valid,
    #[serde(rename = "Vencida")]
    Expired,
    #[serde(rename = "Irregularidad Detectada")]
    Irregular,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Truck {
    pub id: String,
    pub plate: String,
    #[serde(rename = "type")]
    pub truck_type: TruckType,
    pub status: TruckStatus,
    pub capacity_tons: f64,
    pub current_location: String,
}

impl Truck {
    pub fn is_available(&self) -> bool {
        self.status == TruckStatus::Available
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub dni: String,
    pub status: DriverStatus,
    pub license_status: LicenseStatus,
    pub years_experience: u32,
}

impl Driver {
    /// Rested and holding a valid license.
    pub fn is_fit_to_drive(&self) -> bool {
        self.status == DriverStatus::Rested && self.license_status == LicenseStatus::Valid
    }
}
