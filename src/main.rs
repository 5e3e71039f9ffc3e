//! OtaServe - Main entry point
//!
//! Parses flags, loads configuration, and serves the firmware and log API.

use clap::Parser;
use otaserve::server::cli::Cli;
use otaserve::server::{create_router, ApiState, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("otaserve=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config_path())?;
    cli.apply_to(&mut config);

    let state = ApiState::new(&config);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    println!("🚀 OtaServe");
    println!("   Firmware: {}", config.paths.firmware_dir.display());
    println!("   Logs:     {}", config.paths.log_dir.display());
    println!("   Listening: http://{}", addr);
    println!("   Press Ctrl+C to stop");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
