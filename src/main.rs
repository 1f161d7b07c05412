mod fetcher;
mod helpers;
mod server;
mod transcoder;

use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{filter::Builder as TracingFilterBuilder, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    match dotenvy::dotenv() {
        Err(e) if e.not_found() => {}
        Ok(_) => {}
        Err(e) => {
            panic!("Failed to load .env file: {}", e);
        }
    }

    init_log();

    info!("Starting tunefetch server...");

    let addr = std::env::var("TUNEFETCH_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_owned());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");

    info!(%addr, "Listening for requests");

    axum::serve(listener, server::router())
        .await
        .expect("Server failed");
}

fn init_log() {
    tracing_subscriber::fmt()
        .with_ansi(true)
        .with_env_filter(
            TracingFilterBuilder::default()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .finish()
        .init();
}
