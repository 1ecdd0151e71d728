use dotenvy::dotenv;
use std::env;

use crate::error::{AppError, AppResult};

/// Backend connection settings for the hosted CareLink API.
///
/// Credentials are required up front: API client methods must fail with a
/// configuration error before attempting any network call when they are
/// absent, so `Config` construction is the single validation point.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_key: String,
    pub request_timeout_secs: u64,
    pub page_size: u32,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Split out from `from_env`
    /// so tests don't have to mutate process environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("CARELINK_API_URL")
            .ok_or_else(|| AppError::Config("CARELINK_API_URL missing".into()))?
            .trim_end_matches('/')
            .to_string();

        let api_key = lookup("CARELINK_API_KEY")
            .ok_or_else(|| AppError::Config("CARELINK_API_KEY missing".into()))?;

        if api_key.is_empty() {
            return Err(AppError::Config("CARELINK_API_KEY is empty".into()));
        }

        let request_timeout_secs = lookup("CARELINK_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let page_size = lookup("CARELINK_PAGE_SIZE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(50);

        Ok(Self {
            api_base_url,
            api_key,
            request_timeout_secs,
            page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let err = Config::from_lookup(vars(&[("CARELINK_API_KEY", "key")])).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("CARELINK_API_URL")));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err =
            Config::from_lookup(vars(&[("CARELINK_API_URL", "https://api.test")])).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("CARELINK_API_KEY")));
    }

    #[test]
    fn test_defaults_and_url_normalization() {
        let config = Config::from_lookup(vars(&[
            ("CARELINK_API_URL", "https://api.test/"),
            ("CARELINK_API_KEY", "key"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.test");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_overrides_parsed() {
        let config = Config::from_lookup(vars(&[
            ("CARELINK_API_URL", "https://api.test"),
            ("CARELINK_API_KEY", "key"),
            ("CARELINK_REQUEST_TIMEOUT_SECS", "5"),
            ("CARELINK_PAGE_SIZE", "25"),
        ]))
        .unwrap();

        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.page_size, 25);
    }
}
