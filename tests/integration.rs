use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fleet_dispatch::ai::Recommender;
use fleet_dispatch::api::rest::router;
use fleet_dispatch::engine::console::SEARCH_ERROR_MESSAGE;
use fleet_dispatch::error::RecommendationError;
use fleet_dispatch::fleet::FleetRegistry;
use fleet_dispatch::models::fleet::{Driver, Truck};
use fleet_dispatch::models::trip::{
    MatchRecommendation, RecommendationResponse, RiskLevel, TripAnalysis, TripRequest, TripType,
};
use fleet_dispatch::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

struct Step {
    destination: Option<&'static str>,
    delay: Duration,
    result: Result<RecommendationResponse, RecommendationError>,
}

/// Answers each call with the first queued step scripted for the request's
/// destination (or for any destination). Panics when nothing matches.
struct ScriptedRecommender {
    steps: Mutex<VecDeque<Step>>,
}

impl ScriptedRecommender {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
        }
    }
}

#[async_trait]
impl Recommender for ScriptedRecommender {
    async fn recommend(
        &self,
        request: &TripRequest,
        _trucks: &[Truck],
        _drivers: &[Driver],
    ) -> Result<RecommendationResponse, RecommendationError> {
        let step = {
            let mut steps = self.steps.lock().unwrap();
            let position = steps
                .iter()
                .position(|step| {
                    step.destination
                        .is_none_or(|destination| destination == request.destination)
                })
                .expect("unexpected recommendation call");
            steps.remove(position).unwrap()
        };
        tokio::time::sleep(step.delay).await;
        step.result
    }
}

fn respond(recommendations: Vec<MatchRecommendation>) -> Step {
    Step {
        destination: None,
        delay: Duration::ZERO,
        result: Ok(RecommendationResponse {
            analysis: TripAnalysis {
                estimated_distance_km: "145 km".to_string(),
                estimated_duration: "2 horas".to_string(),
                ideal_vehicle_description: "Volcador de 30 t".to_string(),
                suggested_route: "RN 9 -> RN 158".to_string(),
                risk_level: RiskLevel::Low,
                risk_analysis: "Ruta en buen estado".to_string(),
            },
            recommendations,
        }),
    }
}

fn fail(err: RecommendationError) -> Step {
    Step {
        destination: None,
        delay: Duration::ZERO,
        result: Err(err),
    }
}

fn recommendation(truck_id: &str, driver_id: &str, score: f64) -> MatchRecommendation {
    MatchRecommendation {
        truck_id: truck_id.to_string(),
        driver_id: driver_id.to_string(),
        match_score: score,
        trip_type: TripType::ShortDistance,
        reasoning: "Volcador disponible, chofer descansado".to_string(),
    }
}

fn setup_with_state(steps: Vec<Step>) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        FleetRegistry::from_fixture(),
        Arc::new(ScriptedRecommender::new(steps)),
        1024,
        Duration::from_millis(150),
    ));
    (router(state.clone()), state)
}

fn setup(steps: Vec<Step>) -> axum::Router {
    setup_with_state(steps).0
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn cordoba_trip() -> Value {
    json!({
        "origin": "Córdoba",
        "destination": "Villa María",
        "materialType": "Piedras",
        "weightTons": 25,
        "urgency": "Normal"
    })
}

async fn open_session(app: &axum::Router) -> String {
    let res = app
        .clone()
        .oneshot(empty_request("POST", "/sessions"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await["id"].as_str().unwrap().to_string()
}

async fn snapshot(app: &axum::Router, id: &str) -> Value {
    let res = app
        .clone()
        .oneshot(empty_request("GET", &format!("/sessions/{id}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await
}

async fn wait_until_loaded(app: &axum::Router, id: &str) -> Value {
    for _ in 0..100 {
        let view = snapshot(app, id).await;
        if view["loading"] == false {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("search never finished");
}

async fn search(app: &axum::Router, id: &str, trip: Value) -> Value {
    let res = app
        .clone()
        .oneshot(json_request("POST", &format!("/sessions/{id}/search"), trip))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    body_json(res).await
}

fn is_internal_id(id: &str) -> bool {
    let parts: Vec<&str> = id.split('-').collect();
    parts.len() == 3
        && parts[0] == "AGE"
        && parts[1].len() == 4
        && parts[1].chars().all(|c| c.is_ascii_digit())
        && parts[2]
            .parse::<u16>()
            .map(|n| (1000..=9999).contains(&n))
            .unwrap_or(false)
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup(vec![]);
    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sessions"], 0);
    assert_eq!(body["trucks"], 6);
    assert_eq!(body["drivers"], 5);
}

#[tokio::test]
async fn fleet_overview_lists_roster() {
    let app = setup(vec![]);
    let response = app.oneshot(empty_request("GET", "/fleet")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["trucks"].as_array().unwrap().len(), 6);
    assert_eq!(body["trucks"][2]["status"], "Mantenimiento Programado");
    assert_eq!(body["drivers"][2]["licenseStatus"], "Vencida");
    assert_eq!(body["summary"]["trucksAvailable"], 4);
    assert_eq!(body["summary"]["driversFit"], 3);
}

#[tokio::test]
async fn new_session_starts_on_search() {
    let app = setup(vec![]);
    let id = open_session(&app).await;

    let view = snapshot(&app, &id).await;
    assert_eq!(view["screen"], "Search");
    assert_eq!(view["loading"], false);
    assert!(view["request"].is_null());
    assert!(view["analysis"].is_null());
    assert!(view["error"].is_null());
    assert_eq!(view["historyLen"], 0);
}

#[tokio::test]
async fn unknown_session_returns_404() {
    let app = setup(vec![]);
    let fake_id = "00000000-0000-0000-0000-000000000000";

    let response = app
        .oneshot(empty_request("GET", &format!("/sessions/{fake_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_trip_is_rejected_without_calling_service() {
    let app = setup(vec![]);
    let id = open_session(&app).await;

    let mut trip = cordoba_trip();
    trip["weightTons"] = json!(0);
    let res = app
        .clone()
        .oneshot(json_request("POST", &format!("/sessions/{id}/search"), trip))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let mut trip = cordoba_trip();
    trip["origin"] = json!("  ");
    let res = app
        .clone()
        .oneshot(json_request("POST", &format!("/sessions/{id}/search"), trip))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let view = snapshot(&app, &id).await;
    assert_eq!(view["loading"], false);
    assert!(view["request"].is_null());
}

#[tokio::test]
async fn cordoba_trip_full_flow() {
    let app = setup(vec![respond(vec![recommendation("T001", "D001", 95.0)])]);
    let id = open_session(&app).await;

    let pending = search(&app, &id, cordoba_trip()).await;
    assert_eq!(pending["screen"], "Search");
    assert!(pending["analysis"].is_null());

    let view = wait_until_loaded(&app, &id).await;
    assert!(view["error"].is_null());
    assert_eq!(view["analysis"]["riskLevel"], "Bajo");
    assert_eq!(view["options"].as_array().unwrap().len(), 1);
    assert_eq!(view["options"][0]["bestMatch"], true);
    assert_eq!(view["options"][0]["capacityShortage"], false);
    assert_eq!(view["options"][0]["truck"]["capacityTons"], 30.0);
    assert_eq!(view["options"][0]["driver"]["status"], "Descansado");

    let res = app
        .clone()
        .oneshot(json_request("POST", &format!("/sessions/{id}/select"), json!({ "index": 0 })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let draft = body_json(res).await;
    assert!(is_internal_id(draft["internalId"].as_str().unwrap()));
    assert_eq!(snapshot(&app, &id).await["screen"], "Assignment");

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/sessions/{id}/confirm"),
            json!({ "customerTransportId": "TR-9988-X" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let record = body_json(res).await;
    assert_eq!(record["id"], draft["internalId"]);
    assert_eq!(record["customerTransportId"], "TR-9988-X");
    assert_eq!(record["status"], "Programado");
    assert_eq!(record["origin"], "Córdoba");
    assert_eq!(record["destination"], "Villa María");
    assert_eq!(record["materialType"], "Piedras");
    assert_eq!(record["truckPlate"], "AA 123 CD");
    assert_eq!(record["driverName"], "Carlos Perez");

    let view = snapshot(&app, &id).await;
    assert_eq!(view["screen"], "Success");
    assert_eq!(view["historyLen"], 1);

    tokio::time::sleep(Duration::from_millis(400)).await;

    let view = snapshot(&app, &id).await;
    assert_eq!(view["screen"], "Search");
    assert!(view["request"].is_null());
    assert!(view["analysis"].is_null());
    assert!(view["draft"].is_null());
    assert_eq!(view["recommendations"].as_array().unwrap().len(), 0);
    assert_eq!(view["historyLen"], 1);

    let res = app
        .clone()
        .oneshot(empty_request("POST", &format!("/sessions/{id}/history")))
        .await
        .unwrap();
    let history = body_json(res).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["id"], record["id"]);
    assert_eq!(snapshot(&app, &id).await["screen"], "History");

    let res = app
        .clone()
        .oneshot(empty_request("POST", &format!("/sessions/{id}/back")))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["screen"], "Search");
}

#[tokio::test]
async fn unknown_truck_is_dropped_from_options_and_confirms_as_unknown() {
    let app = setup(vec![respond(vec![recommendation("T999", "D001", 90.0)])]);
    let id = open_session(&app).await;

    search(&app, &id, cordoba_trip()).await;
    let view = wait_until_loaded(&app, &id).await;
    assert_eq!(view["recommendations"].as_array().unwrap().len(), 1);
    assert_eq!(view["options"].as_array().unwrap().len(), 0);
    assert_eq!(view["droppedOptions"], 1);

    let res = app
        .clone()
        .oneshot(json_request("POST", &format!("/sessions/{id}/select"), json!({ "index": 0 })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/sessions/{id}/confirm"),
            json!({ "customerTransportId": "TR-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let record = body_json(res).await;
    assert_eq!(record["truckPlate"], "Unknown");
    assert_eq!(record["driverName"], "Carlos Perez");
    assert_eq!(record["status"], "Programado");
}

#[tokio::test]
async fn rejected_call_shows_fixed_error() {
    let app = setup(vec![fail(RecommendationError::Authentication(
        "service answered 403 Forbidden".to_string(),
    ))]);
    let id = open_session(&app).await;

    search(&app, &id, cordoba_trip()).await;
    let view = wait_until_loaded(&app, &id).await;

    assert_eq!(view["screen"], "Search");
    assert_eq!(view["error"]["message"], SEARCH_ERROR_MESSAGE);
    assert_eq!(view["error"]["kind"], "authentication");
    assert!(view["analysis"].is_null());
    assert_eq!(view["recommendations"].as_array().unwrap().len(), 0);

    let res = app
        .clone()
        .oneshot(json_request("POST", &format!("/sessions/{id}/select"), json!({ "index": 0 })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn superseded_search_result_is_discarded() {
    let slow = Step {
        destination: Some("Villa María"),
        delay: Duration::from_millis(200),
        ..respond(vec![recommendation("T001", "D001", 95.0)])
    };
    let fast = Step {
        destination: Some("Rosario"),
        ..respond(vec![recommendation("T004", "D002", 70.0)])
    };
    let app = setup(vec![slow, fast]);
    let id = open_session(&app).await;

    search(&app, &id, cordoba_trip()).await;
    let mut second_trip = cordoba_trip();
    second_trip["destination"] = json!("Rosario");
    search(&app, &id, second_trip).await;

    wait_until_loaded(&app, &id).await;
    tokio::time::sleep(Duration::from_millis(350)).await;

    let view = snapshot(&app, &id).await;
    assert_eq!(view["request"]["destination"], "Rosario");
    assert_eq!(view["recommendations"].as_array().unwrap().len(), 1);
    assert_eq!(view["recommendations"][0]["truckId"], "T004");

    let res = app
        .clone()
        .oneshot(empty_request("GET", "/metrics"))
        .await
        .unwrap();
    let metrics = body_string(res).await;
    assert!(metrics.contains("recommendation_requests_total{outcome=\"stale\"} 1"));
    assert!(metrics.contains("recommendation_requests_total{outcome=\"success\"} 1"));
}

#[tokio::test]
async fn back_from_assignment_keeps_results() {
    let app = setup(vec![respond(vec![
        recommendation("T001", "D001", 95.0),
        recommendation("T006", "D004", 40.0),
    ])]);
    let id = open_session(&app).await;

    search(&app, &id, cordoba_trip()).await;
    let view = wait_until_loaded(&app, &id).await;
    assert_eq!(view["options"][1]["bestMatch"], false);
    assert_eq!(view["options"][1]["capacityShortage"], true);

    app.clone()
        .oneshot(json_request("POST", &format!("/sessions/{id}/select"), json!({ "index": 1 })))
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(empty_request("POST", &format!("/sessions/{id}/back")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let view = body_json(res).await;
    assert_eq!(view["screen"], "Search");
    assert!(view["draft"].is_null());
    assert_eq!(view["options"].as_array().unwrap().len(), 2);
    assert_eq!(view["request"]["origin"], "Córdoba");
}

#[tokio::test]
async fn confirm_requires_transport_id_and_selection() {
    let app = setup(vec![respond(vec![recommendation("T001", "D001", 95.0)])]);
    let id = open_session(&app).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/sessions/{id}/confirm"),
            json!({ "customerTransportId": "TR-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    search(&app, &id, cordoba_trip()).await;
    wait_until_loaded(&app, &id).await;
    app.clone()
        .oneshot(json_request("POST", &format!("/sessions/{id}/select"), json!({ "index": 0 })))
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/sessions/{id}/confirm"),
            json!({ "customerTransportId": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let view = snapshot(&app, &id).await;
    assert_eq!(view["screen"], "Assignment");
    assert_eq!(view["historyLen"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup(vec![]);
    open_session(&app).await;

    let response = app.oneshot(empty_request("GET", "/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("active_sessions 1"));
    assert!(body.contains("assignments_confirmed_total 0"));
}

#[tokio::test]
async fn closing_session_removes_it() {
    let (app, state) = setup_with_state(vec![]);
    let id = open_session(&app).await;
    let other = open_session(&app).await;
    assert_eq!(state.metrics.active_sessions.get(), 2);

    let res = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/sessions/{id}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(state.sessions.len(), 1);
    assert_eq!(state.metrics.active_sessions.get(), 1);

    let res = app
        .clone()
        .oneshot(empty_request("GET", &format!("/sessions/{id}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/sessions/{id}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    assert_eq!(snapshot(&app, &other).await["screen"], "Search");
}

#[tokio::test]
async fn confirm_publishes_assignment_event() {
    let (app, state) = setup_with_state(vec![respond(vec![recommendation("T004", "D002", 82.0)])]);
    let mut events = state.assignment_events_tx.subscribe();
    let id = open_session(&app).await;

    search(&app, &id, cordoba_trip()).await;
    wait_until_loaded(&app, &id).await;
    app.clone()
        .oneshot(json_request("POST", &format!("/sessions/{id}/select"), json!({ "index": 0 })))
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/sessions/{id}/confirm"),
            json!({ "customerTransportId": "TR-4455" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let record = body_json(res).await;

    let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("no assignment event")
        .unwrap();

    assert_eq!(serde_json::to_value(&event).unwrap(), record);
    assert_eq!(event.customer_transport_id, "TR-4455");
    assert_eq!(event.truck_plate, "AE 321 IJ");
    assert_eq!(event.driver_name, "Miguel Rodriguez");
}
