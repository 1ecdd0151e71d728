//! Typed request/response wrappers over the hosted CareLink backend.
//!
//! Each domain client translates between the store's snake_case row shapes
//! and the camelCase view models consumed by the UI layer. Parsing happens
//! here, at the client boundary, never at the point of use.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub mod admin;
pub mod chat;
pub mod notifications;
pub mod progress;
pub mod resources;
pub mod sessions;

pub use admin::AdminApi;
pub use chat::{ChatApi, HttpChatApi};
pub use notifications::NotificationsApi;
pub use progress::ProgressApi;
pub use resources::ResourcesApi;
pub use sessions::SessionsApi;

/// Error body shape returned by the backend on failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Shared HTTP plumbing for the domain clients: base url, credentials,
/// JSON in/out, and status-to-error mapping.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl RestClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Http(format!("build http client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            page_size: config.page_size,
        })
    }

    pub fn default_page_size(&self) -> u32 {
        self.page_size
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let response = self
            .http
            .post(self.url(path))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let response = self
            .http
            .patch(self.url(path))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// POST where the caller only cares about success.
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<()> {
        let response = self
            .http
            .post(self.url(path))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        Self::check(response).await
    }

    pub async fn delete(&self, path: &str) -> AppResult<()> {
        let response = self
            .http
            .delete(self.url(path))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Self::check(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(Self::error_for(status, response.text().await.unwrap_or_default()))
    }

    async fn check(response: reqwest::Response) -> AppResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::error_for(status, response.text().await.unwrap_or_default()))
    }

    fn error_for(status: StatusCode, body: String) -> AppError {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);
        AppError::from_status(status.as_u16(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_prefers_structured_message() {
        let err = RestClient::error_for(
            StatusCode::CONFLICT,
            r#"{"message":"version conflict"}"#.to_string(),
        );
        match err {
            AppError::Api { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "version conflict");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_error_for_falls_back_to_raw_body() {
        let err = RestClient::error_for(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert!(matches!(err, AppError::Api { status: 502, .. }));
    }
}
