//! Error taxonomy for the authentication flow.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use blog_identity_core::AccountError;
use blog_identity_google::GoogleAuthError;
use thiserror::Error;
use tracing::{error, info, warn};

/// Request-level failures of the two-phase auth flow.
///
/// `StateCookieAbsent` is handled before the flow errors out (it becomes a
/// redirect back to the start endpoint); everything else surfaces as an
/// error response.
#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// Exchange failure, network fault, or state mismatch at the provider
    /// layer. Indicates either CSRF or a protocol fault; never retried
    /// automatically.
    #[error("provider authentication failed: {0}")]
    Provider(#[from] GoogleAuthError),

    /// The registration gate rejected the verified identity.
    #[error("registration not permitted for this identity")]
    RegistrationForbidden,

    /// A local account already exists for this provider identity.
    #[error("account already linked; log in instead")]
    AlreadyLinked,

    /// Login intent with no matching local account.
    #[error("no account linked to this identity")]
    NoSuchAccount,

    /// Request carries no valid session.
    #[error("not authenticated")]
    Unauthenticated,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AccountError> for AuthFlowError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::AlreadyLinked => Self::AlreadyLinked,
            AccountError::NoSuchAccount => Self::NoSuchAccount,
            AccountError::Store(message) => Self::Internal(message),
        }
    }
}

impl AuthFlowError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Provider(_) => StatusCode::UNAUTHORIZED,
            Self::RegistrationForbidden => StatusCode::FORBIDDEN,
            Self::AlreadyLinked => StatusCode::CONFLICT,
            Self::NoSuchAccount => StatusCode::NOT_FOUND,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Provider(_) => "provider_auth_failure",
            Self::RegistrationForbidden => "registration_forbidden",
            Self::AlreadyLinked => "account_already_linked",
            Self::NoSuchAccount => "no_such_account",
            Self::Unauthenticated => "unauthenticated",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AuthFlowError {
    fn into_response(self) -> Response {
        match &self {
            Self::Provider(err) => error!("provider auth failure: {err}"),
            Self::RegistrationForbidden => warn!("registration policy violation"),
            Self::Internal(message) => error!("internal auth error: {message}"),
            other => info!("auth flow rejected: {other}"),
        }

        let body = Json(serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthFlowError::Provider(GoogleAuthError::StateMismatch).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthFlowError::RegistrationForbidden.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AuthFlowError::AlreadyLinked.status(), StatusCode::CONFLICT);
        assert_eq!(AuthFlowError::NoSuchAccount.status(), StatusCode::NOT_FOUND);
    }
}
