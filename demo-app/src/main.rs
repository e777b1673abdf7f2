use std::error::Error;

use bastion_core::BastionConfig;
use demo_app::{app, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    bastion_core::init_tracing();

    let config = BastionConfig::load("dev")?;
    let state = AppState::from_config(&config)?;
    let port: u16 = config.get_or("server.port", 8080);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "Listening");
    bastion_core::http::serve(listener, app(state)).await?;
    Ok(())
}
