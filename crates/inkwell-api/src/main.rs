use inkwell_api::{setup, telemetry};
use inkwell_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // .env is optional; real deployments configure the environment directly.
    dotenvy::dotenv().ok();

    telemetry::init_telemetry();

    // Load configuration; missing required values are fatal here, before the
    // server ever accepts a request.
    let config = Config::from_env()?;

    let (_state, router) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router).await?;

    Ok(())
}
