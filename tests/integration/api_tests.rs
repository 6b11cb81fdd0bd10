//! API integration tests
//!
//! Require a running server with PostGIS and Redis behind it.

use std::time::Duration;

use indexmap::IndexMap;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// A roughly 10 km² square near Valdai
fn boundary() -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [33.00, 57.90], [33.05, 57.90], [33.05, 57.93], [33.00, 57.93], [33.00, 57.90]
        ]]
    })
}

async fn create_area(client: &Client, name: &str) -> Value {
    let response = client
        .post(format!("{}/protected-areas", BASE_URL))
        .json(&json!({
            "name": name,
            "area_type": "regional",
            "boundary": boundary()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
}

async fn create_trail(client: &Client, area_id: i64, name: &str) -> Value {
    let response = client
        .post(format!("{}/tourism-objects", BASE_URL))
        .json(&json!({
            "protected_area_id": area_id,
            "name": name,
            "object_type": "linear",
            "tourism_type": "day_trip",
            "geometry": {
                "type": "LineString",
                "coordinates": [[33.01, 57.91], [33.04, 57.92]]
            },
            "area_per_visitor": 10.0,
            "operating_hours": 8.0,
            "avg_visit_duration": 2.0,
            "management_factor": 0.8
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
}

/// Poll a calculation until it leaves pending/processing
async fn wait_for_calculation(client: &Client, id: i64) -> Value {
    for _ in 0..50 {
        let body: Value = client
            .get(format!("{}/calculations/{}", BASE_URL, id))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response");

        if body["status"] == "completed" || body["status"] == "failed" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("Calculation {} did not finish", id);
}

/// Start a run, retrying while the previous run of the area still holds its lock
async fn start_calculation(client: &Client, area_id: i64) -> Value {
    for _ in 0..50 {
        let response = client
            .post(format!("{}/protected-areas/{}/calculate", BASE_URL, area_id))
            .send()
            .await
            .expect("Failed to send request");

        if response.status() != 409 {
            assert_eq!(response.status(), 202);
            return response.json().await.expect("Failed to parse response");
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("Area {} stayed locked", area_id);
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_area_is_measured_on_create() {
    let client = Client::new();
    let area = create_area(&client, "Measured area").await;

    let area_ha = area["area_ha"].as_f64().expect("area_ha missing");
    assert!(area_ha > 500.0 && area_ha < 2000.0);
    assert!(area["pdre_value"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_trail_length_is_derived() {
    let client = Client::new();
    let area = create_area(&client, "Trail area").await;
    let trail = create_trail(&client, area["id"].as_i64().unwrap(), "Ridge trail").await;

    let length_km = trail["length_km"].as_f64().expect("length_km missing");
    assert!(length_km > 1.0 && length_km < 3.0);
}

#[tokio::test]
#[ignore]
async fn test_invalid_correction_factor_rejected() {
    let client = Client::new();
    let area = create_area(&client, "Factor area").await;

    let response = client
        .post(format!("{}/tourism-objects", BASE_URL))
        .json(&json!({
            "protected_area_id": area["id"],
            "name": "Bad factors",
            "object_type": "areal",
            "tourism_type": "facility",
            "area_sq_m": 1000.0,
            "correction_factors": { "cf1": 1.5 }
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_calculation_run_completes() {
    let client = Client::new();
    let area = create_area(&client, "Calculated area").await;
    let area_id = area["id"].as_i64().unwrap();
    create_trail(&client, area_id, "Lake trail").await;
    create_trail(&client, area_id, "Lake trail").await;

    let response = client
        .post(format!("{}/protected-areas/{}/calculate", BASE_URL, area_id))
        .json(&json!({ "calculation_period": "week" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 202);
    let pending: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(pending["status"], "pending");

    let result = wait_for_calculation(&client, pending["id"].as_i64().unwrap()).await;
    assert_eq!(result["status"], "completed");
    assert!(result["area_pdre"]["Lake trail (2)"].is_number());

    let total = result["total_pdre"].as_f64().unwrap();
    let period_total = result["period_total"].as_f64().unwrap();
    assert!((period_total - total * 7.0).abs() < 1e-6);

    let area: Value = client
        .get(format!("{}/protected-areas/{}", BASE_URL, area_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(area["pdre_value"].as_f64(), Some(total));
}

#[tokio::test]
#[ignore]
async fn test_calculation_history_newest_first() {
    let client = Client::new();
    let area = create_area(&client, "History area").await;
    let area_id = area["id"].as_i64().unwrap();

    let mut ids = Vec::new();
    for _ in 0..2 {
        let pending = start_calculation(&client, area_id).await;
        let id = pending["id"].as_i64().unwrap();
        wait_for_calculation(&client, id).await;
        ids.push(id);
    }

    let history: Vec<Value> = client
        .get(format!("{}/protected-areas/{}/calculations", BASE_URL, area_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["id"].as_i64(), Some(ids[1]));
    assert_eq!(history[0]["calculation_period"], "month");
}

#[tokio::test]
#[ignore]
async fn test_calculate_unknown_area() {
    let client = Client::new();

    let response = client
        .post(format!("{}/protected-areas/{}/calculate", BASE_URL, i32::MAX))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_recalculate_single_object() {
    let client = Client::new();
    let area = create_area(&client, "Recalc area").await;
    let trail = create_trail(&client, area["id"].as_i64().unwrap(), "Short loop").await;

    let response = client
        .post(format!("{}/tourism-objects/{}/recalculate", BASE_URL, trail["id"]))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let pdre = body["object"]["pdre_capacity"].as_f64().unwrap();
    let base = body["object"]["base_capacity"].as_f64().unwrap();
    assert!(pdre > 0.0 && pdre <= base);
    assert_eq!(body["capacity"]["return_factor"]["value"].as_f64(), Some(4.0));
}

/// Only the breakdown, decoded without losing key order
#[derive(Deserialize)]
struct StoredBreakdown {
    area_pdre: IndexMap<String, f64>,
}

#[tokio::test]
#[ignore]
async fn test_stored_breakdown_keeps_object_order() {
    let client = Client::new();
    let area = create_area(&client, "Ordered area").await;
    let area_id = area["id"].as_i64().unwrap();
    for name in ["Zeya trail", "Camp", "Lake"] {
        create_trail(&client, area_id, name).await;
    }

    let pending = start_calculation(&client, area_id).await;
    let id = pending["id"].as_i64().unwrap();
    let result = wait_for_calculation(&client, id).await;
    assert_eq!(result["status"], "completed");

    let body = client
        .get(format!("{}/calculations/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .expect("Failed to read response");
    let stored: StoredBreakdown = serde_json::from_str(&body).expect("Failed to parse response");

    let keys: Vec<&str> = stored.area_pdre.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Zeya trail", "Camp", "Lake"]);
}

#[tokio::test]
#[ignore]
async fn test_skipped_object_loses_previous_capacity() {
    let client = Client::new();
    let area = create_area(&client, "Stale area").await;
    let area_id = area["id"].as_i64().unwrap();
    let trail = create_trail(&client, area_id, "Washed out trail").await;
    let object_url = format!("{}/tourism-objects/{}", BASE_URL, trail["id"]);

    let first = start_calculation(&client, area_id).await;
    wait_for_calculation(&client, first["id"].as_i64().unwrap()).await;
    let object: Value = client.get(&object_url).send().await.unwrap().json().await.unwrap();
    assert!(object["pdre_capacity"].as_f64().unwrap() > 0.0);

    // An areal object without a measured area cannot be calculated
    let response = client
        .put(&object_url)
        .json(&json!({ "object_type": "areal" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let second = start_calculation(&client, area_id).await;
    let result = wait_for_calculation(&client, second["id"].as_i64().unwrap()).await;
    assert_eq!(result["status"], "completed");
    assert_eq!(result["calculation_details"]["skipped"][0]["object_id"], trail["id"]);
    assert_eq!(result["total_pdre"].as_f64(), Some(0.0));

    let object: Value = client.get(&object_url).send().await.unwrap().json().await.unwrap();
    assert!(object["pdre_capacity"].is_null());
    assert!(object["base_capacity"].is_null());
    assert!(object["return_factor"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_quick_calculate_records_nothing() {
    let client = Client::new();
    let area = create_area(&client, "Quick area").await;
    let area_id = area["id"].as_i64().unwrap();
    let trail = create_trail(&client, area_id, "Quick trail").await;

    let response = client
        .post(format!("{}/protected-areas/{}/quick-calculate", BASE_URL, area_id))
        .json(&json!({ "calculation_period": "day" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    let total = body["total_pdre"].as_f64().unwrap();
    assert!(total > 0.0);
    assert_eq!(body["period_total"].as_f64(), Some(total));
    assert_eq!(body["area_pdre"]["Quick trail"].as_f64(), Some(total));

    let history: Vec<Value> = client
        .get(format!("{}/protected-areas/{}/calculations", BASE_URL, area_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(history.is_empty());

    let object: Value = client
        .get(format!("{}/tourism-objects/{}", BASE_URL, trail["id"]))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(object["pdre_capacity"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_quick_calculate_unknown_area() {
    let client = Client::new();

    let response = client
        .post(format!("{}/protected-areas/{}/quick-calculate", BASE_URL, i32::MAX))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_list_factors_by_type() {
    let client = Client::new();

    let response = client
        .post(format!("{}/limiting-factors", BASE_URL))
        .json(&json!({
            "name": "Heritage site visits",
            "factor_type": "cultural",
            "coefficient_value": 0.9,
            "apply_to_all": false
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let factor: Value = response.json().await.expect("Failed to parse response");

    let cultural: Vec<Value> = client
        .get(format!("{}/limiting-factors?factor_type=cultural", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(cultural.iter().all(|f| f["factor_type"] == "cultural"));
    assert!(cultural.iter().any(|f| f["id"] == factor["id"]));

    let social: Vec<Value> = client
        .get(format!("{}/limiting-factors?factor_type=social", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(social.iter().all(|f| f["id"] != factor["id"]));

    let response = client
        .get(format!("{}/limiting-factors?factor_type=weather", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}
