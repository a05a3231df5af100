//! Client configuration.
//!
//! The backend base URL comes from the environment and falls back to the
//! local development server.

use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const BASE_URL_VAR: &str = "TUTOR_API_URL";
pub const TOKEN_FILE_VAR: &str = "TUTOR_TOKEN_FILE";

/// Settings needed to construct an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where the session token is persisted. `None` keeps it in memory.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_file: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(default_base_url);
        let token_file = lookup(TOKEN_FILE_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self {
            base_url,
            token_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_backend() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn reads_environment_values() {
        let config = ClientConfig::from_lookup(|key| match key {
            BASE_URL_VAR => Some("https://api.example.com/v1".to_string()),
            TOKEN_FILE_VAR => Some("/tmp/tutor-token".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url, "https://api.example.com/v1");
        assert_eq!(config.token_file, Some(PathBuf::from("/tmp/tutor-token")));
    }

    #[test]
    fn blank_base_url_falls_back() {
        let config = ClientConfig::from_lookup(|key| (key == BASE_URL_VAR).then(|| "  ".to_string()));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"tokenFile":"token.txt"}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token_file, Some(PathBuf::from("token.txt")));
    }
}
