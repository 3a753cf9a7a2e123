use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::calendar::{month_bounds, parse_month};
use super::domain::{BookingSubmission, ResourceKind};
use super::repository::{ConfirmationMailer, ReservationStore};
use super::service::{BookingService, BookingServiceError};

const DEFAULT_CALENDAR_DAYS: u32 = 7;
const MAX_CALENDAR_DAYS: u32 = 62;

/// Router builder exposing the booking, calendar, cancellation and history endpoints.
pub fn booking_router<S, M>(service: Arc<BookingService<S, M>>) -> Router
where
    S: ReservationStore + 'static,
    M: ConfirmationMailer + 'static,
{
    Router::new()
        .route(
            "/api/v1/court/availability",
            get(court_availability_handler::<S, M>),
        )
        .route(
            "/api/v1/court/reservations",
            post(court_booking_handler::<S, M>),
        )
        .route(
            "/api/v1/court/history",
            get(court_history_handler::<S, M>),
        )
        .route(
            "/api/v1/room/availability",
            get(room_availability_handler::<S, M>),
        )
        .route(
            "/api/v1/room/reservations",
            post(room_booking_handler::<S, M>),
        )
        .route("/api/v1/room/history", get(room_history_handler::<S, M>))
        .route(
            "/api/v1/cancellations",
            get(resolve_cancellation_handler::<S, M>).post(cancel_handler::<S, M>),
        )
        .with_state(service)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CalendarQuery {
    pub start: Option<NaiveDate>,
    pub days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CancellationQuery {
    pub codigo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancellationRequest {
    #[serde(default)]
    pub codigo: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryQuery {
    pub month: Option<String>,
}

pub(crate) async fn court_availability_handler<S, M>(
    State(service): State<Arc<BookingService<S, M>>>,
    Query(query): Query<CalendarQuery>,
) -> Response
where
    S: ReservationStore + 'static,
    M: ConfirmationMailer + 'static,
{
    let start = query.start.unwrap_or_else(today);
    let days = query
        .days
        .unwrap_or(DEFAULT_CALENDAR_DAYS)
        .clamp(1, MAX_CALENDAR_DAYS);
    let snapshot = service.court_availability(start, days).await;
    (StatusCode::OK, axum::Json(snapshot)).into_response()
}

pub(crate) async fn room_availability_handler<S, M>(
    State(service): State<Arc<BookingService<S, M>>>,
) -> Response
where
    S: ReservationStore + 'static,
    M: ConfirmationMailer + 'static,
{
    let snapshot = service.room_availability(today()).await;
    (StatusCode::OK, axum::Json(snapshot)).into_response()
}

pub(crate) async fn court_booking_handler<S, M>(
    State(service): State<Arc<BookingService<S, M>>>,
    axum::Json(submission): axum::Json<BookingSubmission>,
) -> Response
where
    S: ReservationStore + 'static,
    M: ConfirmationMailer + 'static,
{
    book(&service, ResourceKind::Court, submission, today()).await
}

pub(crate) async fn room_booking_handler<S, M>(
    State(service): State<Arc<BookingService<S, M>>>,
    axum::Json(submission): axum::Json<BookingSubmission>,
) -> Response
where
    S: ReservationStore + 'static,
    M: ConfirmationMailer + 'static,
{
    book(&service, ResourceKind::CommunityRoom, submission, today()).await
}

pub(crate) async fn book<S, M>(
    service: &BookingService<S, M>,
    kind: ResourceKind,
    submission: BookingSubmission,
    today: NaiveDate,
) -> Response
where
    S: ReservationStore + 'static,
    M: ConfirmationMailer + 'static,
{
    match service.book(kind, submission, today).await {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resolve_cancellation_handler<S, M>(
    State(service): State<Arc<BookingService<S, M>>>,
    Query(query): Query<CancellationQuery>,
) -> Response
where
    S: ReservationStore + 'static,
    M: ConfirmationMailer + 'static,
{
    let Some(code) = query.codigo.filter(|code| !code.trim().is_empty()) else {
        let payload = json!({
            "error": "Código de cancelación no válido",
        });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    };

    match service.resolve_cancellation(&code).await {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<S, M>(
    State(service): State<Arc<BookingService<S, M>>>,
    axum::Json(request): axum::Json<CancellationRequest>,
) -> Response
where
    S: ReservationStore + 'static,
    M: ConfirmationMailer + 'static,
{
    match service.cancel(&request.codigo).await {
        Ok(record) => {
            let payload = json!({
                "message": "Reserva cancelada correctamente",
                "reservation": record.view(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn court_history_handler<S, M>(
    State(service): State<Arc<BookingService<S, M>>>,
    Query(query): Query<HistoryQuery>,
) -> Response
where
    S: ReservationStore + 'static,
    M: ConfirmationMailer + 'static,
{
    history(&service, ResourceKind::Court, query).await
}

pub(crate) async fn room_history_handler<S, M>(
    State(service): State<Arc<BookingService<S, M>>>,
    Query(query): Query<HistoryQuery>,
) -> Response
where
    S: ReservationStore + 'static,
    M: ConfirmationMailer + 'static,
{
    history(&service, ResourceKind::CommunityRoom, query).await
}

async fn history<S, M>(
    service: &BookingService<S, M>,
    kind: ResourceKind,
    query: HistoryQuery,
) -> Response
where
    S: ReservationStore + 'static,
    M: ConfirmationMailer + 'static,
{
    let today = today();
    let month_of = match query.month.as_deref() {
        None => today,
        Some(raw) => match parse_month(raw)
            .ok()
            .and_then(|(year, month)| month_bounds(year, month))
        {
            Some((first, _)) => first,
            None => {
                let payload = json!({
                    "error": format!("Mes no válido: {raw}"),
                });
                return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
            }
        },
    };

    match service.history(kind, month_of, today).await {
        Ok(history) => (StatusCode::OK, axum::Json(history)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Maps service failures onto status codes; the body always carries the resident-facing text.
pub(crate) fn error_response(error: BookingServiceError) -> Response {
    let (status, payload) = match &error {
        BookingServiceError::Intake(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": error.to_string() }),
        ),
        BookingServiceError::Rejected(rejection) => (
            StatusCode::CONFLICT,
            json!({ "error": rejection.summary(), "code": rejection.code() }),
        ),
        BookingServiceError::ConflictAtCommit(_) => (
            StatusCode::CONFLICT,
            json!({ "error": error.to_string(), "code": "conflict_at_commit" }),
        ),
        BookingServiceError::NotFound => (
            StatusCode::NOT_FOUND,
            json!({ "error": error.to_string() }),
        ),
        BookingServiceError::Unavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": error.to_string() }),
        ),
    };
    (status, axum::Json(payload)).into_response()
}
