//! Environment-driven server configuration.

use anyhow::{Context, Result};

/// Configuration for the blog server.
///
/// The Google client credentials are required; their absence is a fatal
/// startup error, never a per-request one.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub google_client_id: String,
    pub google_client_secret: String,
    /// External base URL the provider redirects back to, without a trailing
    /// slash (e.g. `https://robwettach.com`).
    pub public_base_url: String,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    /// Allow-list for registration. `None` means open registration.
    pub registration_allowed_emails: Option<Vec<String>>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            google_client_id: std::env::var("GOOGLE_CLIENT_ID")
                .context("GOOGLE_CLIENT_ID environment variable is required")?,
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET")
                .context("GOOGLE_CLIENT_SECRET environment variable is required")?,
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-production-please".to_string()),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            registration_allowed_emails: std::env::var("REGISTRATION_ALLOWED_EMAILS")
                .ok()
                .map(|raw| parse_allowed_emails(&raw)),
        })
    }
}

fn parse_allowed_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_emails_parsing() {
        assert_eq!(
            parse_allowed_emails("rob@robwettach.com, second@example.com ,"),
            vec!["rob@robwettach.com", "second@example.com"]
        );
        assert!(parse_allowed_emails("").is_empty());
    }
}
