use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::any;
use axum::Router;
use engine_logging::{engine_error, engine_info};
use schedule_engine::{
    strategy_for, DmmPageReader, DmmScheduleExtractor, FetchSettings, FileSnapshotStore,
    ConfigError, Orchestrator, ReqwestFetcher, RunConfig,
};

use crate::settings::ServerSettings;

/// Produces the per-run configuration; the environment in production.
type ConfigLoader = Arc<dyn Fn() -> Result<RunConfig, ConfigError> + Send + Sync>;

/// Shared across requests; nothing here changes between runs.
#[derive(Clone)]
struct AppState {
    snapshot_dir: PathBuf,
    fetcher: Arc<ReqwestFetcher>,
    extractor: Arc<DmmScheduleExtractor>,
    notify_client: reqwest::Client,
    load_config: ConfigLoader,
}

pub async fn serve(settings: ServerSettings) -> anyhow::Result<()> {
    let notify_client = reqwest::Client::builder()
        .timeout(settings.notify_timeout)
        .build()?;
    let fetcher = ReqwestFetcher::new(FetchSettings::default())?;
    let state = AppState {
        snapshot_dir: settings.snapshot_dir.clone(),
        fetcher: Arc::new(fetcher),
        extractor: Arc::new(DmmScheduleExtractor::default()),
        notify_client,
        load_config: Arc::new(RunConfig::from_env),
    };

    let listener = tokio::net::TcpListener::bind(&settings.listen_addr).await?;
    engine_info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/check", any(check))
        .with_state(state)
}

/// Pure trigger: always 200, outcome only visible in the log.
///
/// The run lives in its own task. A caller that hangs up early drops this
/// future, but snapshots already committed still get their notification.
async fn check(State(state): State<AppState>) -> impl IntoResponse {
    let run = tokio::spawn(async move { run_once(&state).await });
    if let Err(err) = run.await {
        engine_error!("check run aborted: {}", err);
    }
    (StatusCode::OK, "ok")
}

async fn run_once(state: &AppState) {
    let config = match (state.load_config)() {
        Ok(config) => config,
        Err(err) => {
            engine_error!("{}", err);
            return;
        }
    };

    let reader = match DmmPageReader::new(
        &config.page_base_url,
        state.fetcher.clone(),
        state.extractor.clone(),
    ) {
        Ok(reader) => reader,
        Err(err) => {
            engine_error!("invalid ENV settings. page_base_url: {}", err);
            return;
        }
    };
    let store = FileSnapshotStore::new(state.snapshot_dir.clone());
    let strategy = strategy_for(&config.notification, state.notify_client.clone());

    engine_info!("check started teachers={:?}", config.source_ids);
    let orchestrator = Orchestrator::new(Arc::new(reader), Arc::new(store), strategy);
    orchestrator.run(&config.source_ids).await;
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        engine_error!("failed to listen for shutdown signal: {}", err);
    }
    engine_info!("shutting down");
}
