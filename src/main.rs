use std::sync::Arc;

use gitlab_trace_bridge::config::BridgeConfig;
use gitlab_trace_bridge::logging::setup_logging;
use gitlab_trace_bridge::sink::OtlpHttpSink;
use gitlab_trace_bridge::{AppState, api};
use tracing::{self, info};

const DEFAULT_CONFIG_PATH: &str = "bridge_config.toml";

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config_path =
        std::env::var("BRIDGE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = match BridgeConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error in '{}': {}", config_path, e);
            std::process::exit(1);
        }
    };

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| config.bind_address.clone());

    setup_logging();

    let sink = match OtlpHttpSink::new(&config.otlp) {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("Exporter setup error: {}", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState {
        config: config.clone(),
        sink: Arc::new(sink),
    });

    let app = api::router(state);

    info!("Listening on {}", bind_address);
    info!("Receiving pipeline events at {}", config.traces.url_path);
    info!("Exporting traces to {}", config.otlp.endpoint);
    let listener = tokio::net::TcpListener::bind(bind_address).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install the shutdown signal handler");
    info!("Shutting down");
}
