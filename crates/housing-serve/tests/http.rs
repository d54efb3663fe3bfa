use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use housing_core::{HousingModel, Predictor};
use housing_ingest::{column_f64, records_to_frame};
use housing_model::{Record, Schema};
use housing_profile::build_profile;
use housing_serve::{AppState, router};

const OCEAN: [&str; 3] = ["INLAND", "NEAR BAY", "<1H OCEAN"];

fn training_records() -> Vec<Record> {
    (0..30)
        .map(|idx| {
            let i = f64::from(idx);
            let value = json!({
                "longitude": -122.0 + i * 0.05,
                "latitude": 37.0 + (i * 0.37).sin(),
                "housing_median_age": 10.0 + (i * 7.0) % 40.0,
                "total_rooms": 1000.0 + i * 35.0,
                "total_bedrooms": 200.0 + i * 6.0,
                "population": 800.0 + (i * 13.0) % 300.0,
                "households": 300.0 + (i * 11.0) % 120.0,
                "median_income": 1.0 + (i * 0.29) % 8.0,
                "ocean_proximity": OCEAN[idx as usize % OCEAN.len()],
                "median_house_value": 60_000.0 + i * 9_000.0,
            });
            match value {
                Value::Object(map) => map,
                _ => unreachable!(),
            }
        })
        .collect()
}

fn app(with_profile: bool, strict: bool) -> axum::Router {
    let schema = Schema::housing();
    let frame = records_to_frame(&training_records()).unwrap();
    let targets: Vec<f64> = column_f64(&frame, "median_house_value")
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    let features = frame.drop("median_house_value").unwrap();
    let model = HousingModel::fit(&features, &targets, &schema, 1.0).unwrap();
    let profile = with_profile.then(|| build_profile(&features, &schema).unwrap());

    let predictor = Predictor::new(schema, model)
        .with_profile(profile)
        .with_strict_categories(strict);
    router(AppState::new(predictor))
}

fn request_records(count: usize) -> Vec<Value> {
    training_records()
        .into_iter()
        .take(count)
        .map(|mut record| {
            record.remove("median_house_value");
            Value::Object(record)
        })
        .collect()
}

async fn post_predict(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_drift_availability() {
    let response = app(true, false)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "ok", "drift_enabled": true}));
}

#[tokio::test]
async fn predict_returns_predictions_drift_and_latency() {
    let (status, body) = post_predict(app(true, false), json!({"records": request_records(3)})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predictions"].as_array().unwrap().len(), 3);
    assert!(body["latency_ms"].as_f64().unwrap() >= 0.0);
    assert!(body["drift"]["numeric"]["median_income"]["rel_shift"].is_number());
    assert!(body["drift"]["categorical"]["ocean_proximity"]["current_top"].is_array());
}

#[tokio::test]
async fn drift_is_null_without_profile() {
    let (status, body) = post_predict(app(false, false), json!({"records": request_records(1)})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["drift"].is_null());
}

#[tokio::test]
async fn missing_columns_are_unprocessable() {
    let mut records = request_records(1);
    records[0].as_object_mut().unwrap().remove("latitude");

    let (status, body) = post_predict(app(false, false), json!({"records": records})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "missing_columns");
    assert_eq!(body["details"], json!({"missing": ["latitude"]}));
    assert_eq!(body["error"], "missing required columns: latitude");
}

#[tokio::test]
async fn unknown_category_is_unprocessable_when_strict() {
    let mut records = request_records(2);
    records[1]["ocean_proximity"] = json!("MARS");

    let (status, body) = post_predict(app(false, true), json!({"records": records})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "unknown_category");
    assert_eq!(body["details"]["unknown"], json!(["MARS"]));
}

#[tokio::test]
async fn empty_records_are_unprocessable() {
    let (status, body) = post_predict(app(false, false), json!({"records": []})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "empty_input");
}
