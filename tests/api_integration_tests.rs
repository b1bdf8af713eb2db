#![cfg(feature = "http-server")]

//! API-level tests driving the axum router with in-process requests.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use barberia_backend::db::{AppointmentRepository, LocalRepository};
use barberia_backend::http::{create_router, AppState};
use barberia_backend::models::{Appointment, AppointmentStatus, BarberId, SlotTime};

fn app() -> (Router, Arc<LocalRepository>) {
    let repo = Arc::new(LocalRepository::new());
    let state = AppState::new(repo.clone());
    (create_router(state), repo)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_barber(router: &Router, name: &str) -> Uuid {
    let (status, body) = send(
        router,
        Method::POST,
        "/v1/barbers",
        Some(json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "phone": "5550001"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (router, _) = app();
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_deleting_last_barber_is_rejected_over_http() {
    let (router, _) = app();
    let carlos = create_barber(&router, "Carlos").await;

    let (status, body) = send(
        &router,
        Method::DELETE,
        &format!("/v1/barbers/{}", carlos),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // With a second barber registered the deletion goes through.
    let miguel = create_barber(&router, "Miguel").await;
    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/v1/barbers/{}", carlos),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&router, Method::GET, "/v1/barbers", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["barbers"][0]["id"], miguel.to_string());
}

#[tokio::test]
async fn test_schedule_toggle_save_and_snapshot() {
    let (router, _) = app();
    let carlos = create_barber(&router, "Carlos").await;

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/v1/barbers/{}/schedule/toggle", carlos),
        Some(json!({"weekday": 1, "time": "09:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dirty"], true);

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/v1/barbers/{}/schedule/save", carlos),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dirty"], false);

    let (status, body) = send(
        &router,
        Method::GET,
        &format!("/v1/barbers/{}/schedule", carlos),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["week"]["days"]["1"]["slots"][0], "09:00");
}

#[tokio::test]
async fn test_template_and_availability_resolution() {
    let (router, _) = app();
    let carlos = create_barber(&router, "Carlos").await;

    // Apply the standard template everywhere and persist it.
    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/v1/barbers/{}/schedule/template", carlos),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    send(
        &router,
        Method::POST,
        &format!("/v1/barbers/{}/schedule/save", carlos),
        None,
    )
    .await;

    // A Monday resolves to the template's 15 slots with the midday break.
    let (status, body) = send(
        &router,
        Method::GET,
        &format!("/v1/barbers/{}/availability?date=2026-08-10", carlos),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 15);
    assert!(!slots.iter().any(|s| s == "11:00"));

    // A Sunday resolves to nothing.
    let (_, body) = send(
        &router,
        Method::GET,
        &format!("/v1/barbers/{}/availability?date=2026-08-09", carlos),
        None,
    )
    .await;
    assert_eq!(body["slots"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_bulk_unavailable_then_resolution_empty() {
    let (router, _) = app();
    let carlos = create_barber(&router, "Carlos").await;

    send(
        &router,
        Method::POST,
        &format!("/v1/barbers/{}/schedule/template", carlos),
        Some(json!({})),
    )
    .await;
    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/v1/barbers/{}/schedule/bulk", carlos),
        Some(json!({
            "dates": ["2026-08-10", "2026-08-11", "2026-08-12"],
            "action": "mark_unavailable"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    send(
        &router,
        Method::POST,
        &format!("/v1/barbers/{}/schedule/save", carlos),
        None,
    )
    .await;

    for date in ["2026-08-10", "2026-08-11", "2026-08-12"] {
        let (_, body) = send(
            &router,
            Method::GET,
            &format!("/v1/barbers/{}/availability?date={}", carlos, date),
            None,
        )
        .await;
        assert_eq!(body["slots"].as_array().unwrap().len(), 0, "{}", date);
    }
}

#[tokio::test]
async fn test_sunday_time_off_rejected_over_http() {
    let (router, _) = app();
    let carlos = create_barber(&router, "Carlos").await;

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/v1/barbers/{}/time-off", carlos),
        Some(json!({"date": "2026-08-09", "reason": "Vacaciones"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/v1/barbers/{}/time-off", carlos),
        Some(json!({"date": "2026-08-10", "reason": "Vacaciones"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &router,
        Method::GET,
        &format!("/v1/barbers/{}/time-off", carlos),
        None,
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["entries"][0]["date"], "2026-08-10");
}

#[tokio::test]
async fn test_unknown_time_off_delete_is_404() {
    let (router, _) = app();
    create_barber(&router, "Carlos").await;

    let (status, body) = send(
        &router,
        Method::DELETE,
        &format!("/v1/time-off/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_service_catalog_validation_and_crud() {
    let (router, _) = app();

    let (status, body) = send(
        &router,
        Method::POST,
        "/v1/services",
        Some(json!({"name": "Corte exprés", "duration_min": 25, "price_cents": 8000})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &router,
        Method::POST,
        "/v1/services",
        Some(json!({"name": "Corte clásico", "duration_min": 30, "price_cents": 15000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let service_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &router,
        Method::PUT,
        &format!("/v1/services/{}", service_id),
        Some(json!({"name": "Corte clásico", "duration_min": 45, "price_cents": 18000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&router, Method::GET, "/v1/services", None).await;
    assert_eq!(body[0]["duration_min"], 45);
}

#[tokio::test]
async fn test_appointment_confirm_cancel_flow() {
    let (router, repo) = app();
    let carlos = create_barber(&router, "Carlos").await;

    // Bookings arrive through the shared store, not the panel API.
    let appointment = Appointment {
        id: Uuid::new_v4(),
        client_name: "Juan Pérez".into(),
        barber_id: BarberId::new(carlos),
        service: "Corte clásico".into(),
        date: chrono::NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
        time: SlotTime::new(14, 0).unwrap(),
        status: AppointmentStatus::Pending,
    };
    repo.insert_appointment(&appointment).await.unwrap();

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/v1/appointments/{}/confirm", appointment.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    // Confirming again is a validation error.
    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/v1/appointments/{}/confirm", appointment.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/v1/appointments/{}/cancel", appointment.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    // The barber's inbox saw both transitions.
    let (_, body) = send(
        &router,
        Method::GET,
        &format!("/v1/barbers/{}/notifications", carlos),
        None,
    )
    .await;
    assert_eq!(body["total"], 2);

    // Filtered listing only returns the cancelled appointment.
    let (_, body) = send(
        &router,
        Method::GET,
        "/v1/appointments?status=cancelled&client=juan",
        None,
    )
    .await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_unknown_barber_schedule_is_404() {
    let (router, _) = app();
    let (status, body) = send(
        &router,
        Method::GET,
        &format!("/v1/barbers/{}/schedule", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
