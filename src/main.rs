use action_dispatcher::api::{create_router, AppState};
use action_dispatcher::config::Settings;
use action_dispatcher::domain::InMemoryAssetService;
use action_dispatcher::observability::{init_logging, LogConfig, LogFormat};
use action_dispatcher::repository::{InMemoryStore, RepositoryFacade};
use action_dispatcher::rpc::Dispatcher;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::new().unwrap_or_default();

    let log_config = LogConfig {
        level: settings.application.log_level.clone(),
        format: LogFormat::from(
            std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()).as_str(),
        ),
        include_target: true,
        include_file: false,
        include_line: false,
    };
    init_logging(&log_config);

    info!(asset_count = settings.assets.len(), "configuration loaded");

    let assets = Arc::new(InMemoryAssetService::new(settings.assets.clone()));

    let store24 = Arc::new(InMemoryStore::new());
    let store31 = Arc::new(InMemoryStore::new());
    let repository = RepositoryFacade::new(store24, store31);

    let dispatcher = Arc::new(Dispatcher::new(repository, assets));
    let state = AppState::new(dispatcher);
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", settings.application.port);
    info!("starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
