//! Application state and router assembly.

use crate::auth;
use axum::Router;
use axum::response::Html;
use axum::routing::get;
use blog_identity_core::{AccountStore, RegistrationPolicy};
use blog_identity_google::GoogleOAuthClient;
use blog_identity_session::SessionService;
use std::sync::Arc;

/// State shared across handlers. Everything here is configured once at
/// startup; no per-flow state lives in the process.
#[derive(Clone)]
pub struct AppState {
    pub google: GoogleOAuthClient,
    pub store: Arc<dyn AccountStore>,
    pub policy: Arc<dyn RegistrationPolicy>,
    pub sessions: Arc<SessionService>,
    pub public_base_url: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .merge(auth::routes())
        .with_state(state)
}

/// Post-login landing page. Blog content rendering lives elsewhere.
async fn index() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>robwettach.com</title></head>
<body>
    <h1>robwettach.com</h1>
    <p><a href="/auth/login/google">Log in with Google</a></p>
    <p><a href="/auth/register/google">Register with Google</a></p>
</body>
</html>
"#,
    )
}
