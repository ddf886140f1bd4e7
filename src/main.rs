use clap::Parser;

use student_registry::{api, Config, RegistrationService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    let store = config.open_store()?;
    let service = RegistrationService::new(store);
    let store_kind = service.store_kind();
    let app = api::router(service, &config.endpoint);

    log::info!(
        "Starting Student Registration API on http://{}{} ({} store)",
        config.bind,
        config.endpoint,
        store_kind
    );
    axum::Server::bind(&config.bind)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
