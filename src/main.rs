use anyhow::{anyhow, Context, Result};
use hubspot_connector::api::{create_app, IntegrationAppState};
use hubspot_connector::build_http_client;
use hubspot_connector::config::AppConfig;
use hubspot_connector::items::HubSpotClient;
use hubspot_connector::oauth::HubSpotOAuth;
use hubspot_connector::store::build_store;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hubspot_connector=info".into()),
        )
        .init();

    info!("HubSpot connector starting...");

    let config =
        AppConfig::from_env().map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

    if !config.hubspot.is_configured() {
        warn!("HUBSPOT_CLIENT_ID / HUBSPOT_CLIENT_SECRET not set; authorize requests will fail");
    }

    info!(
        bind_address = %config.server.bind_address,
        redirect_uri = %config.hubspot.redirect_uri,
        store = ?config.store.backend,
        "Configuration loaded"
    );

    let store = build_store(&config.store)
        .await
        .context("Failed to initialize session store")?;

    let http_client = build_http_client().context("Failed to build HTTP client")?;

    let state = IntegrationAppState {
        oauth: HubSpotOAuth::new(config.hubspot.clone(), store, http_client.clone()),
        hubspot_client: HubSpotClient::new(http_client, config.hubspot.api_base_url.clone()),
    };
    let app = create_app(state, &config.server.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .context("Failed to bind API address")?;
    info!(address = %config.server.bind_address, "HubSpot connector listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl_c signal");
            }
            info!("Shutdown signal received");
        })
        .await
        .context("API server error")?;

    info!("HubSpot connector stopped");
    Ok(())
}
