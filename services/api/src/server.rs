use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryReservationStore, TracingMailer};
use crate::routes::with_booking_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use reservas::booking::BookingService;
use reservas::config::AppConfig;
use reservas::error::AppError;
use reservas::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = match args.records.take() {
        Some(path) => InMemoryReservationStore::from_json_file(&path)?,
        None => InMemoryReservationStore::default(),
    };
    let booking_service = Arc::new(BookingService::new(
        Arc::new(store),
        Arc::new(TracingMailer::default()),
        config.booking.clone(),
    ));

    let app = with_booking_routes(booking_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        origin = %config.booking.app_origin,
        "booking service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
