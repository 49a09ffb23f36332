//! The two-phase authentication flow controller.
//!
//! Phase one redirects to Google with a fresh CSRF state token stored in a
//! short-lived cookie; phase two validates the echoed state, exchanges the
//! authorization code, and resolves the verified identity to a local
//! account. The server holds no in-memory record of pending flows: the
//! state cookie is the only correlation between the two phases, which keeps
//! the flow stateless across restarts.

mod error;

pub use error::AuthFlowError;

use crate::app::AppState;
use axum::extract::{OriginalUri, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use blog_identity_core::{AccountError, BlogAccount};
use rand::{Rng, thread_rng};
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

const STATE_COOKIE: &str = "oauth_state";
const SESSION_COOKIE: &str = "blog_session";
/// State cookie is scoped to the auth subtree and expires with the flow.
const AUTH_COOKIE_PATH: &str = "/auth";
const STATE_COOKIE_TTL_MINUTES: i64 = 10;

const EMAIL_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

/// Which flow the user entered. Determines the callback path, whether
/// resolution may create a new account, and where a retry redirect goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowIntent {
    Login,
    Register,
}

impl FlowIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
        }
    }

    pub fn start_path(self) -> String {
        format!("/auth/{}/google", self.as_str())
    }

    pub fn callback_path(self) -> String {
        format!("/auth/{}/google/consumer", self.as_str())
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/{intent}/google", get(begin_flow))
        .route("/auth/{intent}/google/consumer", get(complete_flow))
        .route("/auth/logout", get(logout))
        .route("/me", get(current_account))
}

fn generate_state_token() -> String {
    let mut rng = thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.r#gen::<u8>()).collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Start transition: issue a fresh state token and redirect to Google.
async fn begin_flow(
    State(state): State<AppState>,
    Path(intent): Path<FlowIntent>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AuthFlowError> {
    let csrf_state = generate_state_token();
    let redirect_uri = format!("{}{}", state.public_base_url, intent.callback_path());

    let auth_url = state
        .google
        .authorization_url(&redirect_uri, &csrf_state, &[EMAIL_SCOPE])?;

    let cookie = Cookie::build((STATE_COOKIE, csrf_state))
        .path(AUTH_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(STATE_COOKIE_TTL_MINUTES))
        .build();

    info!(intent = intent.as_str(), "starting Google auth flow");
    Ok((jar.add(cookie), Redirect::to(auth_url.as_str())))
}

/// Callback transition: validate state, exchange the code, resolve the
/// identity, establish a session.
async fn complete_flow(
    State(state): State<AppState>,
    Path(intent): Path<FlowIntent>,
    OriginalUri(uri): OriginalUri,
    jar: CookieJar,
) -> Response {
    // Absent state cookie: expired, stripped, or the flow never started.
    // Recoverable; send the user back to the start endpoint without ever
    // calling the provider.
    let Some(state_cookie) = jar.get(STATE_COOKIE) else {
        info!(intent = intent.as_str(), "state cookie absent, restarting flow");
        return Redirect::to(&intent.start_path()).into_response();
    };
    let expected_state = state_cookie.value().to_string();

    // The state token is consumed here; clear it on every subsequent path.
    let jar = jar.remove(Cookie::build((STATE_COOKIE, "")).path(AUTH_COOKIE_PATH));

    match resolve_callback(&state, intent, &uri, &expected_state).await {
        Ok(session_cookie) => {
            (jar.add(session_cookie), Redirect::to("/")).into_response()
        }
        Err(err) => (jar, err).into_response(),
    }
}

async fn resolve_callback(
    state: &AppState,
    intent: FlowIntent,
    uri: &axum::http::Uri,
    expected_state: &str,
) -> Result<Cookie<'static>, AuthFlowError> {
    let callback_url = Url::parse(&format!("{}{uri}", state.public_base_url))
        .map_err(|e| AuthFlowError::Internal(e.to_string()))?;

    let identity = state
        .google
        .exchange_and_verify(&callback_url, expected_state)
        .await?;

    if intent == FlowIntent::Register {
        if !state.policy.allows(&identity) {
            warn!(
                subject = %identity.subject,
                email = identity.email.as_deref().unwrap_or(""),
                "registration rejected by policy"
            );
            return Err(AuthFlowError::RegistrationForbidden);
        }

        let username = BlogAccount::default_username(&identity.subject);
        state
            .store
            .insert_if_absent(&identity.subject, &username)
            .await?;
        info!(subject = %identity.subject, "registered new account");
    }

    let account = resolve_by_provider_identity(state, &identity.subject).await?;

    let token = state
        .sessions
        .establish(&account)
        .map_err(|e| AuthFlowError::Internal(e.to_string()))?;

    info!(
        intent = intent.as_str(),
        account_id = %account.id,
        "authenticated account"
    );

    Ok(session_cookie(token, state.sessions.ttl().num_seconds()))
}

/// Resolve a verified provider identity to a local account. Under login
/// intent a missing link is an authentication failure; under register the
/// preceding insert guarantees existence.
async fn resolve_by_provider_identity(
    state: &AppState,
    google_id: &str,
) -> Result<BlogAccount, AuthFlowError> {
    state
        .store
        .find_by_google_id(google_id)
        .await?
        .ok_or_else(|| AccountError::NoSuchAccount.into())
}

/// Resolve the request's session cookie to a local account.
async fn resolve_by_session_id(
    state: &AppState,
    jar: &CookieJar,
) -> Result<BlogAccount, AuthFlowError> {
    let token = jar
        .get(SESSION_COOKIE)
        .ok_or(AuthFlowError::Unauthenticated)?
        .value();

    let claims = state
        .sessions
        .verify(token)
        .map_err(|_| AuthFlowError::Unauthenticated)?;

    state
        .store
        .find_by_id(claims.sub)
        .await?
        .ok_or(AuthFlowError::Unauthenticated)
}

async fn current_account(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<BlogAccount>, AuthFlowError> {
    let account = resolve_by_session_id(&state, &jar).await?;
    Ok(Json(account))
}

async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    (jar, Redirect::to("/"))
}

fn session_cookie(token: String, ttl_seconds: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl_seconds))
        .build()
}
