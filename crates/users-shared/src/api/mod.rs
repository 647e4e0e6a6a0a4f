mod health;
mod users;

pub use health::*;
pub use users::*;

/// Path prefix the serverless platform routes function requests under.
pub const FUNCTION_PREFIX: &str = "/.netlify/functions/api";
