use anyhow::Result;
use airdesk_agents::AirdeskConfig;
use airdesk_api::build_app;
use airdesk_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("airdesk_api");

    let config = AirdeskConfig::from_env()?;
    let app = build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(
        bind = %config.bind,
        model = %config.openai.model,
        flight_search = config.flights.is_some(),
        "airdesk api started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
