use std::net::TcpListener;

use bizfinder::{configuration::get_configuration, services::Pipeline, startup::run};
use env_logger::Env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration()?;

    let pipeline = Pipeline::from_settings(&configuration)?;
    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    log::info!("Listening on {}", address);

    run(listener, pipeline, configuration.export)?.await?;

    Ok(())
}
