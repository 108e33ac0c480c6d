#![warn(clippy::pedantic)]

pub mod auth;
pub mod local_storage;
pub mod push_key;
pub mod realtime;

/// Backend endpoints of the hosted realtime database and identity provider.
/// Fixed at build time, overridable via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub api_key: String,
}

impl Config {
    #[must_use]
    pub fn from_build_env() -> Self {
        Self {
            database_url: option_env!("VIGOR_DATABASE_URL")
                .unwrap_or("https://vigor-app-default-rtdb.firebaseio.com")
                .to_string(),
            api_key: option_env!("VIGOR_API_KEY").unwrap_or("").to_string(),
        }
    }
}
