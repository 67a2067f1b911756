use crate::cli::ServeArgs;
use crate::infra::{default_match_config, AppState, InMemoryLeadNotifier, InMemoryMatchingRepository};
use crate::routes::with_matching_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use care_match::config::AppConfig;
use care_match::error::AppError;
use care_match::telemetry;
use care_match::workflows::matching::{MatchEngine, MatchingRepository, MatchingService};
use care_match::workflows::roster::RosterImporter;
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

    let repository = Arc::new(InMemoryMatchingRepository::default());
    let notifier = Arc::new(InMemoryLeadNotifier::default());

    if let Some(path) = args.roster.take() {
        let roster = RosterImporter::from_path(&path)?;
        let count = roster.len();
        for therapist in roster {
            repository
                .upsert_therapist(therapist)
                .map_err(|err| {
                    AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))
                })?;
        }
        info!(?path, therapists = count, "roster hydrated from CSV");
    }

    let matching_service = Arc::new(MatchingService::new(
        repository,
        notifier,
        MatchEngine::new(default_match_config()),
    ));

    let app = with_matching_routes(matching_service)
        .layer(prometheus_layer)
        .layer(Extension(app_state));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "therapist matching service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
