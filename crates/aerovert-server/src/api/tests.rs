use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{api, config::Config, state::AppState, upstream::Dataset};
use aerovert_core::{FeatureCollection, ObstacleFeature, StatsSummary};

fn loaded_state() -> Arc<AppState> {
    let state = Arc::new(AppState::new(&Config::from_env()));
    let collection = FeatureCollection::new(vec![
        ObstacleFeature::new("F0001/25", "WIND_TURBINE", 8.2, 53.4)
            .with_region("EDGG")
            .with_altitudes(Some(0), Some(15))
            .with_radius(0.5)
            .with_description("unlit turbine"),
        ObstacleFeature::new("F0002/25", "CRANE", 13.4, 52.5)
            .with_region("EDGG")
            .with_altitudes(Some(0), Some(8))
            .with_radius(0.2)
            .with_description("lit crane"),
        ObstacleFeature::new("F0003/25", "UNKNOWN", 11.5, 48.1)
            .with_region("EDWW")
            .with_altitudes(Some(0), Some(99)),
    ]);
    let stats = StatsSummary::from_features(collection.features());
    state.finish_load(Dataset { collection, stats });
    state
}

fn app(state: &Arc<AppState>) -> axum::Router {
    api::routes().with_state(state.clone())
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn session_lifecycle() {
    let state = loaded_state();
    let app = app(&state);

    let created = app
        .clone()
        .oneshot(empty_request("POST", "/v1/sessions"))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = read_json(created).await;
    let id = body["sessionId"].as_str().expect("session id").to_string();
    assert_eq!(body["view"]["kpis"]["total"], 2);
    assert_eq!(body["view"]["complianceScore"], 50);

    let updated = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/v1/sessions/{}/filters", id),
            json!({ "unlitOnly": true }),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    let view = read_json(updated).await;
    assert_eq!(view["features"].as_array().unwrap().len(), 1);
    assert_eq!(view["complianceScore"], 0);

    let filters = app
        .clone()
        .oneshot(empty_request("GET", &format!("/v1/sessions/{}/filters", id)))
        .await
        .unwrap();
    assert_eq!(read_json(filters).await["unlitOnly"], true);

    let deleted = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/v1/sessions/{}", id)))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = app
        .oneshot(empty_request("GET", &format!("/v1/sessions/{}/view", id)))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(missing).await["code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn create_session_with_initial_filters() {
    let state = loaded_state();
    let created = app(&state)
        .oneshot(json_request(
            "POST",
            "/v1/sessions",
            json!({ "searchTerm": "crane" }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = read_json(created).await;
    let features = body["view"]["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["id"], "F0002/25");
}

#[tokio::test]
async fn malformed_session_body_is_rejected() {
    let state = loaded_state();
    let app = app(&state);

    for body in [r#"{"unlitOnly": tru"#, r#"{"unlitOnly": "yes"}"#] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/sessions")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["code"], "INVALID_BODY");
    }
    assert_eq!(state.session_count(), 0);
}

#[tokio::test]
async fn regional_risk_comes_from_unfiltered_stats() {
    let state = loaded_state();
    let created = app(&state)
        .oneshot(json_request(
            "POST",
            "/v1/sessions",
            json!({ "regionFilter": "EDWW" }),
        ))
        .await
        .unwrap();
    let body = read_json(created).await;
    assert!(body["view"]["features"].as_array().unwrap().is_empty());
    assert_eq!(body["view"]["regionalRisk"][0]["region"], "EDGG");
}

#[tokio::test]
async fn dataset_and_stats_endpoints() {
    let state = loaded_state();
    let app = app(&state);

    let status = app
        .clone()
        .oneshot(empty_request("GET", "/v1/dataset"))
        .await
        .unwrap();
    let status = read_json(status).await;
    assert_eq!(status["state"], "ready");
    assert_eq!(status["featureCount"], 3);
    assert_eq!(status["sessionCount"], 0);
    assert!(status["lastError"].is_null());

    let stats = app
        .oneshot(empty_request("GET", "/v1/stats"))
        .await
        .unwrap();
    assert_eq!(stats.status(), StatusCode::OK);
    assert_eq!(read_json(stats).await["total"], 3);
}

#[tokio::test]
async fn stats_missing_before_first_load() {
    let state = Arc::new(AppState::new(&Config::from_env()));
    let response = app(&state)
        .oneshot(empty_request("GET", "/v1/stats"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
