mod server;
mod settings;

use engine_logging::engine_info;
use settings::ServerSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = ServerSettings::from_env();
    engine_logging::initialize(settings.log_destination(), settings.log_level);
    engine_info!(
        "lesson-watch starting listen_addr={} snapshot_dir={:?}",
        settings.listen_addr,
        settings.snapshot_dir
    );
    server::serve(settings).await
}
