//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{stream::Stream, StreamExt};
use uuid::Uuid;

use super::dto::{
    AddTimeOffRequest, AppointmentListResponse, AppointmentsQuery, ApplyTemplateRequest,
    BarberListResponse, BulkActionRequest, ClearWeekdayRequest, CreateBarberRequest,
    CreateServiceRequest, HealthResponse, MarkAllReadResponse, NotificationListResponse,
    RescheduleRequest, ResolveQuery, ResolvedAvailability, TimeOffListResponse,
    ToggleDateSlotRequest, ToggleSlotRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::{AppointmentFilter, FullRepository};
use crate::models::{Appointment, Barber, BarberId, ServiceItem, TimeOffEntry};
use crate::services::{ScheduleSnapshot, ScheduleStatus};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is
/// reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Barbers
// =============================================================================

/// GET /v1/barbers
pub async fn list_barbers(State(state): State<AppState>) -> HandlerResult<BarberListResponse> {
    let barbers = state.barbers.list().await?;
    let total = barbers.len();
    Ok(Json(BarberListResponse { barbers, total }))
}

/// POST /v1/barbers
pub async fn create_barber(
    State(state): State<AppState>,
    Json(request): Json<CreateBarberRequest>,
) -> HandlerResult<Barber> {
    let barber = state
        .barbers
        .create(&request.name, &request.email, &request.phone)
        .await?;
    Ok(Json(barber))
}

/// DELETE /v1/barbers/{barber_id}
///
/// Rejected when it would remove the last remaining barber.
pub async fn delete_barber(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
) -> HandlerResult<()> {
    state.barbers.delete(BarberId::new(barber_id)).await?;
    Ok(Json(()))
}

// =============================================================================
// Weekly Schedule
// =============================================================================

/// GET /v1/barbers/{barber_id}/schedule
///
/// Current editing snapshot (weekly template, date overrides, dirty/saving
/// status), loading the session from the store on first use.
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
) -> HandlerResult<ScheduleSnapshot> {
    let snapshot = state.availability.snapshot(BarberId::new(barber_id)).await?;
    Ok(Json(snapshot))
}

/// POST /v1/barbers/{barber_id}/schedule/load
///
/// Reload the session from the store, discarding unsaved edits.
pub async fn reload_schedule(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
) -> HandlerResult<ScheduleSnapshot> {
    let snapshot = state.availability.load(BarberId::new(barber_id)).await?;
    Ok(Json(snapshot))
}

/// POST /v1/barbers/{barber_id}/schedule/toggle
pub async fn toggle_slot(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
    Json(request): Json<ToggleSlotRequest>,
) -> HandlerResult<ScheduleStatus> {
    let status = state
        .availability
        .toggle_slot(BarberId::new(barber_id), request.weekday, request.time)
        .await?;
    Ok(Json(status))
}

/// POST /v1/barbers/{barber_id}/schedule/template
///
/// Apply the standard-workday template to one weekday, or to all six when
/// no weekday is given.
pub async fn apply_template(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
    Json(request): Json<ApplyTemplateRequest>,
) -> HandlerResult<ScheduleStatus> {
    let barber_id = BarberId::new(barber_id);
    let status = match request.weekday {
        Some(weekday) => {
            state
                .availability
                .apply_default_template(barber_id, weekday)
                .await?
        }
        None => {
            state
                .availability
                .apply_default_template_to_all(barber_id)
                .await?
        }
    };
    Ok(Json(status))
}

/// POST /v1/barbers/{barber_id}/schedule/clear
pub async fn clear_weekday(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
    Json(request): Json<ClearWeekdayRequest>,
) -> HandlerResult<ScheduleStatus> {
    let status = state
        .availability
        .clear_weekday(BarberId::new(barber_id), request.weekday)
        .await?;
    Ok(Json(status))
}

/// POST /v1/barbers/{barber_id}/schedule/toggle-date
pub async fn toggle_date_slot(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
    Json(request): Json<ToggleDateSlotRequest>,
) -> HandlerResult<ScheduleStatus> {
    let status = state
        .availability
        .toggle_slot_for_date(BarberId::new(barber_id), request.date, request.time)
        .await?;
    Ok(Json(status))
}

/// POST /v1/barbers/{barber_id}/schedule/bulk
///
/// Apply one action to every date of a multi-day calendar selection.
pub async fn bulk_action(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
    Json(request): Json<BulkActionRequest>,
) -> HandlerResult<ScheduleStatus> {
    let status = state
        .availability
        .apply_bulk_action(BarberId::new(barber_id), &request.dates, &request.action)
        .await?;
    Ok(Json(status))
}

/// POST /v1/barbers/{barber_id}/schedule/save
///
/// Replace-all persistence of the session. Returns 409 while another save
/// for the same barber is in flight.
pub async fn save_schedule(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
) -> HandlerResult<ScheduleStatus> {
    let status = state.availability.save(BarberId::new(barber_id)).await?;
    Ok(Json(status))
}

/// GET /v1/barbers/{barber_id}/availability?date=YYYY-MM-DD
///
/// Effective bookable slots for a date, from persisted state: time off and
/// calendar overrides first, weekly template as the fallback.
pub async fn resolve_availability(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
    Query(query): Query<ResolveQuery>,
) -> HandlerResult<ResolvedAvailability> {
    let slots = state
        .availability
        .resolve_availability(BarberId::new(barber_id), query.date)
        .await?;
    Ok(Json(ResolvedAvailability {
        date: query.date,
        slots: slots.into_iter().collect(),
    }))
}

// =============================================================================
// Time Off
// =============================================================================

/// GET /v1/barbers/{barber_id}/time-off
pub async fn list_time_off(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
) -> HandlerResult<TimeOffListResponse> {
    let entries = state.time_off.list_time_off(BarberId::new(barber_id)).await?;
    let total = entries.len();
    Ok(Json(TimeOffListResponse { entries, total }))
}

/// POST /v1/barbers/{barber_id}/time-off
pub async fn add_time_off(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
    Json(request): Json<AddTimeOffRequest>,
) -> HandlerResult<TimeOffEntry> {
    let entry = state
        .time_off
        .add_time_off(BarberId::new(barber_id), request.date, &request.reason)
        .await?;
    Ok(Json(entry))
}

/// DELETE /v1/time-off/{entry_id}
pub async fn remove_time_off(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
) -> HandlerResult<()> {
    state.time_off.remove_time_off(entry_id).await?;
    Ok(Json(()))
}

// =============================================================================
// Service Catalog
// =============================================================================

/// GET /v1/services
pub async fn list_services(State(state): State<AppState>) -> HandlerResult<Vec<ServiceItem>> {
    Ok(Json(state.catalog.list().await?))
}

/// POST /v1/services
pub async fn create_service(
    State(state): State<AppState>,
    Json(request): Json<CreateServiceRequest>,
) -> HandlerResult<ServiceItem> {
    let item = state
        .catalog
        .create(
            &request.name,
            request.description.as_deref(),
            request.duration_min,
            request.price_cents,
        )
        .await?;
    Ok(Json(item))
}

/// PUT /v1/services/{service_id}
pub async fn update_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
    Json(request): Json<CreateServiceRequest>,
) -> HandlerResult<ServiceItem> {
    let item = state
        .catalog
        .update(ServiceItem {
            id: service_id,
            name: request.name,
            description: request.description,
            duration_min: request.duration_min,
            price_cents: request.price_cents,
        })
        .await?;
    Ok(Json(item))
}

/// DELETE /v1/services/{service_id}
pub async fn delete_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> HandlerResult<()> {
    state.catalog.delete(service_id).await?;
    Ok(Json(()))
}

// =============================================================================
// Appointments
// =============================================================================

/// GET /v1/appointments
pub async fn list_appointments(
    State(state): State<AppState>,
    Query(query): Query<AppointmentsQuery>,
) -> HandlerResult<AppointmentListResponse> {
    let filter = AppointmentFilter {
        status: query.status,
        barber_id: query.barber_id.map(BarberId::new),
        client_contains: query.client,
    };
    let appointments = state.appointments.list(&filter).await?;
    let total = appointments.len();
    Ok(Json(AppointmentListResponse { appointments, total }))
}

/// POST /v1/appointments/{appointment_id}/confirm
pub async fn confirm_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
) -> HandlerResult<Appointment> {
    Ok(Json(state.appointments.confirm(appointment_id).await?))
}

/// POST /v1/appointments/{appointment_id}/cancel
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
) -> HandlerResult<Appointment> {
    Ok(Json(state.appointments.cancel(appointment_id).await?))
}

/// POST /v1/appointments/{appointment_id}/reschedule
pub async fn reschedule_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> HandlerResult<Appointment> {
    let appointment = state
        .appointments
        .reschedule(
            appointment_id,
            request.date,
            request.time,
            request.service.as_deref(),
        )
        .await?;
    Ok(Json(appointment))
}

// =============================================================================
// Notifications
// =============================================================================

/// GET /v1/barbers/{barber_id}/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
) -> HandlerResult<NotificationListResponse> {
    let notifications = state.notifications.list(BarberId::new(barber_id)).await?;
    let total = notifications.len();
    Ok(Json(NotificationListResponse {
        notifications,
        total,
    }))
}

/// POST /v1/notifications/{notification_id}/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> HandlerResult<()> {
    state.notifications.mark_read(notification_id).await?;
    Ok(Json(()))
}

/// POST /v1/barbers/{barber_id}/notifications/read-all
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
) -> HandlerResult<MarkAllReadResponse> {
    let updated = state
        .notifications
        .mark_all_read(BarberId::new(barber_id))
        .await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

/// GET /v1/barbers/{barber_id}/notifications/feed
///
/// Server-sent events stream of new notifications for one barber, the same
/// shape as the hosted store's filtered change subscription.
pub async fn notification_feed(
    State(state): State<AppState>,
    Path(barber_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let barber_id = BarberId::new(barber_id);
    // Reject unknown barbers before upgrading to a stream.
    state.barbers.get(barber_id).await?;

    let stream = state
        .notifications
        .feed(barber_id)
        .filter_map(|notification| async move {
            Event::default()
                .event("notification")
                .json_data(&notification)
                .ok()
                .map(Ok::<_, Infallible>)
        });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
