use crate::cli::ServeArgs;
use crate::infra::{growth_service, AppState};
use crate::routes::with_growth_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use growth_velocity::config::AppConfig;
use growth_velocity::error::AppError;
use growth_velocity::telemetry;
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

    let growth_service = Arc::new(growth_service(&config)?);
    let strategy = growth_service.default_strategy();
    let origin = growth_service.store().origin().clone();

    let app = with_growth_routes(growth_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        environment = config.environment.label(),
        strategy = strategy.key(),
        reference = %origin,
        provisional = origin.is_provisional(),
        %addr,
        "growth velocity service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
