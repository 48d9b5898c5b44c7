use crate::models::fleet::{Driver, DriverStatus, LicenseStatus, Truck, TruckStatus, TruckType};

fn truck(
    id: &str,
    plate: &str,
    truck_type: TruckType,
    status: TruckStatus,
    capacity_tons: f64,
    current_location: &str,
) -> Truck {
    Truck {
        id: id.to_string(),
        plate: plate.to_string(),
        truck_type,
        status,
        capacity_tons,
        current_location: current_location.to_string(),
    }
}

fn driver(
    id: &str,
    name: &str,
    dni: &str,
    status: DriverStatus,
    license_status: LicenseStatus,
    years_experience: u32,
) -> Driver {
    Driver {
        id: id.to_string(),
        name: name.to_string(),
        dni: dni.to_string(),
        status,
        license_status,
        years_experience,
    }
}

pub fn trucks() -> Vec<Truck> {
    vec![
        truck("T001", "AA 123 CD", TruckType::Dump, TruckStatus::Available, 30.0, "Base Central"),
        truck("T002", "AD 456 EF", TruckType::CurtainSide, TruckStatus::Available, 25.0, "Base Central"),
        truck("T003", "AF 789 GH", TruckType::Flatbed, TruckStatus::MaintenancePlanned, 28.0, "Taller Norte"),
        truck("T004", "AE 321 IJ", TruckType::Flatbed, TruckStatus::Available, 28.0, "Base Central"),
        truck("T005", "AB 654 KL", TruckType::Dump, TruckStatus::InTransit, 30.0, "Ruta 9 km 200"),
        truck("T006", "AC 987 MN", TruckType::Refrigerated, TruckStatus::Available, 22.0, "Base Sur"),
    ]
}

pub fn drivers() -> Vec<Driver> {
    vec![
        driver("D001", "Carlos Perez", "24.567.890", DriverStatus::Rested, LicenseStatus::Valid, 10),
        driver("D002", "Miguel Rodriguez", "30.123.456", DriverStatus::Rested, LicenseStatus::Valid, 5),
        driver("D003", "Ana Gomez", "28.901.234", DriverStatus::Rested, LicenseStatus::Expired, 8),
        driver("D004", "Roberto Diaz", "22.345.678", DriverStatus::Rested, LicenseStatus::Valid, 15),
        driver("D005", "Fernando Ruiz", "41.234.567", DriverStatus::OnLeave, LicenseStatus::Valid, 2),
    ]
}
