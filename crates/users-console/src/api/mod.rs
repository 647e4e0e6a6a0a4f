mod auth;
mod client;

pub use auth::{spawn_identity_mirror, AuthClient};
pub use client::{ApiClient, ApiError};
