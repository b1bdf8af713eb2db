//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Barbers
        .route("/barbers", get(handlers::list_barbers))
        .route("/barbers", post(handlers::create_barber))
        .route("/barbers/{barber_id}", delete(handlers::delete_barber))
        // Weekly schedule editing
        .route("/barbers/{barber_id}/schedule", get(handlers::get_schedule))
        .route("/barbers/{barber_id}/schedule/load", post(handlers::reload_schedule))
        .route("/barbers/{barber_id}/schedule/toggle", post(handlers::toggle_slot))
        .route("/barbers/{barber_id}/schedule/template", post(handlers::apply_template))
        .route("/barbers/{barber_id}/schedule/clear", post(handlers::clear_weekday))
        .route("/barbers/{barber_id}/schedule/toggle-date", post(handlers::toggle_date_slot))
        .route("/barbers/{barber_id}/schedule/bulk", post(handlers::bulk_action))
        .route("/barbers/{barber_id}/schedule/save", post(handlers::save_schedule))
        .route("/barbers/{barber_id}/availability", get(handlers::resolve_availability))
        // Time off
        .route("/barbers/{barber_id}/time-off", get(handlers::list_time_off))
        .route("/barbers/{barber_id}/time-off", post(handlers::add_time_off))
        .route("/time-off/{entry_id}", delete(handlers::remove_time_off))
        // Service catalog
        .route("/services", get(handlers::list_services))
        .route("/services", post(handlers::create_service))
        .route("/services/{service_id}", put(handlers::update_service))
        .route("/services/{service_id}", delete(handlers::delete_service))
        // Appointments
        .route("/appointments", get(handlers::list_appointments))
        .route("/appointments/{appointment_id}/confirm", post(handlers::confirm_appointment))
        .route("/appointments/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/appointments/{appointment_id}/reschedule", post(handlers::reschedule_appointment))
        // Notifications
        .route("/barbers/{barber_id}/notifications", get(handlers::list_notifications))
        .route("/barbers/{barber_id}/notifications/read-all", post(handlers::mark_all_notifications_read))
        .route("/barbers/{barber_id}/notifications/feed", get(handlers::notification_feed))
        .route("/notifications/{notification_id}/read", post(handlers::mark_notification_read));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn crate::db::FullRepository>;
        let state = AppState::new(repo);
        let _router = create_router(state);
        // If we got here, router was created successfully
    }
}
