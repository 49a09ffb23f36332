//! Google OAuth2 error types.

use thiserror::Error;

pub type GoogleAuthResult<T> = Result<T, GoogleAuthError>;

#[derive(Debug, Error)]
pub enum GoogleAuthError {
    /// Client id or secret was absent at construction time.
    #[error("missing Google OAuth2 configuration: {0}")]
    MissingConfiguration(&'static str),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    /// The state echoed in the callback does not match the expected value.
    #[error("state parameter mismatch in authorization callback")]
    StateMismatch,

    /// The callback carried no authorization code.
    #[error("missing authorization code in callback")]
    MissingAuthorizationCode,

    /// The provider reported an error in the callback query.
    #[error("authorization callback error: {0}")]
    CallbackError(String),

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("user info request failed: {0}")]
    UserInfoFailed(String),

    #[error("invalid user info response: {0}")]
    InvalidUserInfoResponse(String),
}
