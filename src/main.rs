//! ImageS3 web gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!   gateway.toml ──▶ config ──▶ lifecycle::startup ──▶ provision::initialize
//!                                                        │
//!                                      ┌─────────────────┴────────────────┐
//!                                      │ ServiceRegistry                  │
//!                                      │  ImageS3Client   DataMapper      │
//!                                      └─────────────────┬────────────────┘
//!                                                        │ Provided<T>
//!   Client Request ──▶ http::server ──▶ handlers ────────┘
//!                           │              │ Err(HandlerError)
//!                           │              ▼
//!                           │         http::failure::translate ──▶ status + message
//!                           ▼
//!                  no route: http::fallback ──▶ 303 /404.html
//! ```

use clap::Parser;
use std::path::PathBuf;

use images3_gateway::config::load_config;
use images3_gateway::lifecycle::{signals, startup};
use images3_gateway::observability::{logging, metrics};
use images3_gateway::{provision, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "images3-gateway")]
#[command(about = "Web gateway in front of the ImageS3 image-processing backend", long_about = None)]
struct Cli {
    /// Gateway configuration file.
    #[arg(short, long, default_value = "conf/gateway.toml")]
    config: PathBuf,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address,
        "images3-gateway starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = startup::start(&config).await?;
    let listener = startup::bind(&config).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, registry.clone());
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;
    provision::shutdown(registry);

    tracing::info!("Shutdown complete");
    Ok(())
}
