use serde::Serialize;
use serde_json::{json, Value};

use crate::error::RecommendationError;
use crate::models::fleet::{Driver, Truck};
use crate::models::trip::{RecommendationResponse, TripRequest, Urgency};

#[derive(Serialize)]
struct Inventory<'a> {
    trucks: &'a [Truck],
    drivers: &'a [Driver],
}

/// Instruction text sent to the model. The whole roster goes in unfiltered;
/// picking available units is left to the model.
pub fn build_prompt(
    request: &TripRequest,
    trucks: &[Truck],
    drivers: &[Driver],
) -> Result<String, RecommendationError> {
    let inventory = serde_json::to_string(&Inventory { trucks, drivers })
        .map_err(|err| RecommendationError::Encoding(format!("inventory: {err}")))?;

    let urgency = match request.urgency {
        Urgency::Normal => "Normal",
        Urgency::Urgent => "Urgente",
    };

    Ok(format!(
        "Actúa como un despachante de logística experto.\n\
         Tu tarea tiene dos partes:\n\
         1. ANALIZAR EL VIAJE Y SUS RIESGOS:\n\
         - Estimar distancia y tiempo entre {origin} y {destination}.\n\
         - Sugerir la mejor ruta (nombres de rutas nacionales o provinciales).\n\
         - Evaluar tráfico, estado conocido de las rutas, seguridad y clima típico de la zona; \
         determinar el nivel de riesgo (Bajo/Medio/Alto).\n\
         - Describir el vehículo ideal para {material}.\n\
         2. ASIGNAR RECURSOS: elegir del inventario los mejores pares de camión y chofer, \
         ordenados del mejor al peor.\n\n\
         DATOS DEL VIAJE:\n\
         - Origen: {origin}\n\
         - Destino: {destination}\n\
         - Material: {material}\n\
         - Peso solicitado: {weight} toneladas\n\
         - Urgencia: {urgency}\n\n\
         REGLAS DE ASIGNACIÓN:\n\
         - Priorizar camiones 'Disponible' y choferes 'Descansado'.\n\
         - El tipo de camión debe corresponder al material.\n\
         - Un camión con menos capacidad que el peso solicitado puede recomendarse \
         si se aclara en reasoning.\n\n\
         INVENTARIO (JSON):\n\
         {inventory}\n\n\
         Retorna un JSON con la estructura solicitada.",
        origin = request.origin,
        destination = request.destination,
        material = request.material_type,
        weight = request.weight_tons,
        urgency = urgency,
        inventory = inventory,
    ))
}

/// Output schema in the service's OpenAPI subset.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "analysis": {
                "type": "OBJECT",
                "properties": {
                    "estimatedDistanceKm": { "type": "STRING", "description": "Ej: '750 km'" },
                    "estimatedDuration": { "type": "STRING", "description": "Ej: '9 horas'" },
                    "idealVehicleDescription": { "type": "STRING" },
                    "suggestedRoute": { "type": "STRING", "description": "Ej: RN 9 -> RN 158" },
                    "riskLevel": { "type": "STRING", "enum": ["Bajo", "Medio", "Alto"] },
                    "riskAnalysis": { "type": "STRING" }
                },
                "required": [
                    "estimatedDistanceKm",
                    "estimatedDuration",
                    "idealVehicleDescription",
                    "suggestedRoute",
                    "riskLevel",
                    "riskAnalysis"
                ]
            },
            "recommendations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "truckId": { "type": "STRING" },
                        "driverId": { "type": "STRING" },
                        "matchScore": { "type": "NUMBER", "description": "0 a 100" },
                        "tripType": {
                            "type": "STRING",
                            "enum": ["Corta Distancia", "Media Distancia", "Larga Distancia"]
                        },
                        "reasoning": { "type": "STRING" }
                    },
                    "required": ["truckId", "driverId", "matchScore", "tripType", "reasoning"]
                }
            }
        },
        "required": ["analysis", "recommendations"]
    })
}

/// Parses the model's text payload. Order of recommendations is kept as given.
pub fn parse_payload(text: &str) -> Result<RecommendationResponse, RecommendationError> {
    if text.trim().is_empty() {
        return Err(RecommendationError::EmptyResponse);
    }

    serde_json::from_str(text).map_err(|err| RecommendationError::Schema(err.to_string()))
}
