use crate::config::Config;
use crate::error::{other_error, Error};
use crate::shutdown;
use crate::web::{router, AppState};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Default filter for the HTTP server
pub const SERVER_LOG_FILTER: &str = "info,tower_http=debug";

/// Initialize logging, `RUST_LOG` overrides `default_filter`
pub fn init_logging(default_filter: &str) -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the router and serve it until a termination signal arrives
pub async fn start_server(config: Config) -> miette::Result<()> {
    let state = AppState::from_config(&config)?;
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port)
        .parse()
        .map_err(|e| other_error(&format!("Invalid bind address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(Error::Io)?;
    info!("Listening on {}", addr);

    let shutdown_token = CancellationToken::new();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::handle_signals(shutdown_token))
        .await
        .map_err(Error::Io)?;

    info!("Server shut down");
    Ok(())
}
