//! Blog site server: Google OAuth2 sign-in and session resolution.

pub mod app;
pub mod auth;
pub mod config;
