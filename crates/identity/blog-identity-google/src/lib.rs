//! Google OAuth2 authorization-code client.
//!
//! Pure protocol logic with no session state: builds provider authorization
//! URLs and exchanges an authorization code for a verified
//! [`ProviderIdentity`](blog_identity_core::ProviderIdentity).

mod client;
mod config;
mod error;
mod types;


pub use client::GoogleOAuthClient;
pub use config::GoogleOAuthConfig;
pub use error::{GoogleAuthError, GoogleAuthResult};
pub use types::{TokenResponse, UserInfoResponse};
