use meeting_prep::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging(startup::SERVER_LOG_FILTER)?;

    info!("Starting meeting prep server");

    // Load configuration
    let config = startup::load_config()?;

    startup::start_server(config).await
}
