//! OAuth2 authorization-code client for Google.

use crate::config::GoogleOAuthConfig;
use crate::error::{GoogleAuthError, GoogleAuthResult};
use crate::types::{TokenResponse, UserInfoResponse};
use blog_identity_core::ProviderIdentity;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Client for Google's OAuth2 authorization-code flow.
///
/// Holds the static client credentials; every flow-scoped value (state,
/// redirect URI) is passed per call, so one client serves all concurrent
/// flow attempts.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http_client: Client,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthClient {
    /// Fails with [`GoogleAuthError::MissingConfiguration`] when either
    /// credential is empty. This is the startup-time contract; no per-call
    /// configuration check exists.
    pub fn new(config: GoogleOAuthConfig) -> GoogleAuthResult<Self> {
        if config.client_id.is_empty() {
            return Err(GoogleAuthError::MissingConfiguration("client_id"));
        }
        if config.client_secret.is_empty() {
            return Err(GoogleAuthError::MissingConfiguration("client_secret"));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Build the authorization endpoint URL embedding the callback URL, the
    /// CSRF state token, and the requested scopes. Pure construction, no
    /// side effects.
    pub fn authorization_url(
        &self,
        redirect_uri: &str,
        state: &str,
        scopes: &[&str],
    ) -> GoogleAuthResult<Url> {
        let mut url = Url::parse(&self.config.authorization_endpoint)?;

        {
            let mut params = url.query_pairs_mut();
            params.append_pair("response_type", "code");
            params.append_pair("client_id", &self.config.client_id);
            params.append_pair("redirect_uri", redirect_uri);
            params.append_pair("state", state);
            if !scopes.is_empty() {
                params.append_pair("scope", &scopes.join(" "));
            }
        }

        debug!("generated Google authorization URL");
        Ok(url)
    }

    /// Complete the flow from the full callback request URL: confirm the
    /// echoed state matches `expected_state`, exchange the authorization
    /// code for tokens, and fetch the verified identity.
    ///
    /// The state comparison happens before any network I/O; a mismatch is
    /// treated as tampering, never retried.
    pub async fn exchange_and_verify(
        &self,
        callback_url: &Url,
        expected_state: &str,
    ) -> GoogleAuthResult<ProviderIdentity> {
        let query: HashMap<_, _> = callback_url.query_pairs().into_owned().collect();

        match query.get("state") {
            Some(state) if state == expected_state => {}
            _ => return Err(GoogleAuthError::StateMismatch),
        }

        if let Some(err) = query.get("error") {
            let description = query
                .get("error_description")
                .map(String::as_str)
                .unwrap_or("no description");
            return Err(GoogleAuthError::CallbackError(format!(
                "{err}: {description}"
            )));
        }

        let code = query
            .get("code")
            .ok_or(GoogleAuthError::MissingAuthorizationCode)?;

        // The redirect_uri in the token request must match the one used in
        // the authorization request: the callback URL without its query.
        let mut redirect_uri = callback_url.clone();
        redirect_uri.set_query(None);
        redirect_uri.set_fragment(None);

        let token_response = self.exchange_code(code, redirect_uri.as_str()).await?;
        let user_info = self.fetch_user_info(&token_response.access_token).await?;

        info!(subject = %user_info.sub, "verified Google identity");

        Ok(ProviderIdentity {
            subject: user_info.sub,
            email: user_info.email,
            display_name: user_info.name,
            picture: user_info.picture,
            email_verified: user_info.email_verified,
        })
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> GoogleAuthResult<TokenResponse> {
        let mut params = HashMap::new();
        params.insert("grant_type", "authorization_code");
        params.insert("code", code);
        params.insert("client_id", &self.config.client_id);
        params.insert("client_secret", &self.config.client_secret);
        params.insert("redirect_uri", redirect_uri);

        let response = self
            .http_client
            .post(&self.config.token_endpoint)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("token exchange failed: {}", error_text);
            return Err(GoogleAuthError::TokenExchangeFailed(error_text));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| GoogleAuthError::InvalidTokenResponse(e.to_string()))?;

        debug!("exchanged authorization code for tokens");
        Ok(token_response)
    }

    async fn fetch_user_info(&self, access_token: &str) -> GoogleAuthResult<UserInfoResponse> {
        let response = self
            .http_client
            .get(&self.config.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("user info request failed: {}", error_text);
            return Err(GoogleAuthError::UserInfoFailed(error_text));
        }

        let user_info: UserInfoResponse = response
            .json()
            .await
            .map_err(|e| GoogleAuthError::InvalidUserInfoResponse(e.to_string()))?;

        debug!(subject = %user_info.sub, "retrieved user info");
        Ok(user_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GoogleOAuthClient {
        GoogleOAuthClient::new(GoogleOAuthConfig::new("test_client_id", "test_secret")).unwrap()
    }

    #[test]
    fn test_missing_configuration_is_a_construction_error() {
        let result = GoogleOAuthClient::new(GoogleOAuthConfig::new("", "secret"));
        assert!(matches!(
            result,
            Err(GoogleAuthError::MissingConfiguration("client_id"))
        ));

        let result = GoogleOAuthClient::new(GoogleOAuthConfig::new("id", ""));
        assert!(matches!(
            result,
            Err(GoogleAuthError::MissingConfiguration("client_secret"))
        ));
    }

    #[test]
    fn test_authorization_url_structure() {
        let client = test_client();

        let url = client
            .authorization_url(
                "http://localhost:3000/auth/login/google/consumer",
                "abc123",
                &["https://www.googleapis.com/auth/userinfo.email"],
            )
            .unwrap();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(url.path(), "/o/oauth2/v2/auth");

        let params: HashMap<_, _> = url.query_pairs().collect();
        assert_eq!(params.get("response_type"), Some(&"code".into()));
        assert_eq!(params.get("client_id"), Some(&"test_client_id".into()));
        assert_eq!(
            params.get("redirect_uri"),
            Some(&"http://localhost:3000/auth/login/google/consumer".into())
        );
        assert_eq!(params.get("state"), Some(&"abc123".into()));
        assert_eq!(
            params.get("scope"),
            Some(&"https://www.googleapis.com/auth/userinfo.email".into())
        );
    }

    #[tokio::test]
    async fn test_state_mismatch_short_circuits() {
        let client = test_client();

        let callback =
            Url::parse("http://localhost:3000/auth/login/google/consumer?code=x&state=wrong")
                .unwrap();

        // No mock server is running; a network attempt would fail with an
        // HTTP error, not StateMismatch.
        let result = client.exchange_and_verify(&callback, "expected").await;
        assert!(matches!(result, Err(GoogleAuthError::StateMismatch)));
    }

    #[tokio::test]
    async fn test_missing_code_rejected() {
        let client = test_client();

        let callback =
            Url::parse("http://localhost:3000/auth/login/google/consumer?state=abc").unwrap();

        let result = client.exchange_and_verify(&callback, "abc").await;
        assert!(matches!(
            result,
            Err(GoogleAuthError::MissingAuthorizationCode)
        ));
    }

    #[tokio::test]
    async fn test_provider_error_callback_rejected() {
        let client = test_client();

        let callback = Url::parse(
            "http://localhost:3000/auth/login/google/consumer?state=abc&error=access_denied",
        )
        .unwrap();

        let result = client.exchange_and_verify(&callback, "abc").await;
        assert!(matches!(result, Err(GoogleAuthError::CallbackError(_))));
    }
}
