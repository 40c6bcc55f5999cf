use anyhow::Result;
use tracing_subscriber::EnvFilter;

use sprintdesk::{App, Config};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sprintdesk=info")),
        )
        .init();

    let config = Config::load()?;
    tracing::info!("Starting SprintDesk");
    App::run(config)
}
