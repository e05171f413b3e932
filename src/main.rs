//! next-calc - calculator disguise shell
//!
//! Entry point: loads settings, starts the control loop and serves the local
//! control API for the presentation surfaces.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use next_calc::{
    api::{
        access::{write_token_file, AccessPolicy},
        create_router,
    },
    config::Config,
    state::AppState,
    store::SettingsStore,
    tasks::{spawn_controller, spawn_menu_presenter, ControlOptions},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("next_calc={},tower_http=info", config.log_level()))
        .init();

    info!("Starting next-calc v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = config.data_dir();
    info!(
        "Configuration: host={}, port={}, data_dir={}, dev={}",
        config.host,
        config.port,
        data_dir.display(),
        config.dev
    );

    let store = SettingsStore::open(&data_dir).await;

    let options = ControlOptions {
        content_data_dir: config.content_data_dir(),
        development: config.dev,
        panic_on_hide: config.panic_on_hide,
    };
    let (control, control_task) = spawn_controller(store, options);
    let (menu, _menu_task) = spawn_menu_presenter(control.clone(), config.dev);

    let access = AccessPolicy::generate(&config.allowed_origins);
    write_token_file(&data_dir, access.token())
        .await
        .context("Failed to write control token")?;

    let state = AppState::new(control, menu, access, config.host.clone(), config.port);
    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind control API to {}", addr))?;

    info!("Control API listening on http://{}", addr);

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            result.context("Control API server failed")?;
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    control_task.abort();
    info!("Shutdown complete");
    Ok(())
}
