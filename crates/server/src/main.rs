use anyhow::{Context, Result};
use blog_identity_core::{AllowedEmails, InMemoryAccountStore, OpenRegistration, RegistrationPolicy};
use blog_identity_google::{GoogleOAuthClient, GoogleOAuthConfig};
use blog_identity_session::{SessionConfig, SessionService};
use std::sync::Arc;
use tracing::{info, warn};

use blog_server::app::{self, AppState};
use blog_server::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env()?;
    info!("starting blog server");

    // Missing credentials fail here, before any auth route is served.
    let google = GoogleOAuthClient::new(GoogleOAuthConfig::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    ))
    .context("Google OAuth2 client configuration")?;

    let policy: Arc<dyn RegistrationPolicy> = match &config.registration_allowed_emails {
        Some(emails) => {
            info!("registration restricted to {} allowed email(s)", emails.len());
            Arc::new(AllowedEmails::new(emails.clone()))
        }
        None => {
            warn!("REGISTRATION_ALLOWED_EMAILS unset; registration is open");
            Arc::new(OpenRegistration)
        }
    };

    let sessions = Arc::new(SessionService::new(SessionConfig {
        jwt_secret: config.jwt_secret.clone(),
        ..SessionConfig::default()
    }));

    let state = AppState {
        google,
        store: Arc::new(InMemoryAccountStore::new()),
        policy,
        sessions,
        public_base_url: config.public_base_url.clone(),
    };

    let app = app::router(state);

    let bind_addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;

    info!("server running on http://{bind_addr}");
    info!("OAuth2 callback base: {}", config.public_base_url);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
