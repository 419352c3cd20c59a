use drive_relay_auth::{AuthService, AuthState};
use drive_relay_server::{build_router, drive::DriveClient, AppState, Config};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    // RUST_LOG takes precedence over the configured level
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let auth_config = config.resolved_auth();

    tracing::info!("Starting Google Drive relay");
    tracing::info!("Configuration loaded:");
    tracing::info!("  Listen: {}:{}", config.server.host, config.server.port);
    tracing::info!("  Public URL: {}", config.server.public_url());
    tracing::info!(
        "  OAuth redirect: {}",
        auth_config.oauth.redirect_url.as_deref().unwrap_or("<unset>")
    );
    tracing::info!("  Secure cookies: {}", auth_config.session.secure);
    tracing::info!("  Drive API: {}", config.drive.api_base);

    let auth_service = AuthService::new(auth_config).map_err(|e| {
        tracing::error!("Failed to initialize authentication service: {}", e);
        e
    })?;
    let drive = DriveClient::new(&config.drive)?;

    let state = AppState::new(AuthState::new(Arc::new(auth_service)), drive);
    let app = build_router(state);

    let ip_addr = config.server.host.parse::<std::net::IpAddr>().unwrap_or_else(|e| {
        tracing::warn!("Failed to parse host '{}': {}. Using 0.0.0.0", config.server.host, e);
        [0, 0, 0, 0].into()
    });
    let addr = SocketAddr::from((ip_addr, config.server.port));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
