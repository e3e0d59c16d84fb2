//! Epic Games client: device auth token exchange and `world/info` fetch

use crate::config::{EpicApi, EpicCredentials, Endpoints};
use crate::error::EpicError;
use crate::retry::{with_retry, RetryConfig};
use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Token endpoint response; only the fields we use
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Client for the Epic account and Fortnite game services
pub struct EpicClient {
    client: Client,
    credentials: EpicCredentials,
    token_url: String,
    world_info_url: String,
    retry: RetryConfig,
}

impl EpicClient {
    pub fn new(credentials: EpicCredentials, endpoints: &Endpoints) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            credentials,
            token_url: EpicApi::token_url(&endpoints.epic_account),
            world_info_url: EpicApi::world_info_url(&endpoints.epic_game),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Exchange the device auth triple for a refresh token
    pub async fn refresh_token(&self) -> Result<String, EpicError> {
        let form = [
            ("grant_type", "device_auth"),
            ("device_id", self.credentials.device_id.as_str()),
            ("secret", self.credentials.secret.as_str()),
            ("account_id", self.credentials.account_id.as_str()),
        ];

        let response = with_retry(&self.retry, "epic device auth", || self.post_token(&form, false)).await?;
        let token = response.refresh_token.ok_or(EpicError::MissingToken("refresh_token"))?;
        info!("Obtained new refresh token");
        Ok(token)
    }

    /// Exchange a refresh token for an `eg1` access token
    pub async fn access_token(&self, refresh_token: &str) -> Result<String, EpicError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("token_type", "eg1"),
        ];

        let response = with_retry(&self.retry, "epic refresh token", || self.post_token(&form, true)).await?;
        let token = response.access_token.ok_or(EpicError::MissingToken("access_token"))?;
        info!("Fetched new access token");
        Ok(token)
    }

    /// Fetch the raw `world/info` document with a fresh access token
    pub async fn world_info(&self) -> Result<Value, EpicError> {
        let refresh_token = self.refresh_token().await?;
        let access_token = self.access_token(&refresh_token).await?;

        let token = access_token.as_str();
        let doc = with_retry(&self.retry, "epic world info", || async move {
            let response = self
                .client
                .get(&self.world_info_url)
                .bearer_auth(token)
                .header(USER_AGENT, "Mozilla/5.0")
                .send()
                .await
                .map_err(|e| EpicError::from_network_error(&e))?;

            json_body::<Value>(response).await
        })
        .await?;

        info!("Fetched /world/info JSON from Epic");
        Ok(doc)
    }

    async fn post_token(&self, form: &[(&str, &str)], device_header: bool) -> Result<TokenResponse, EpicError> {
        debug!("POST {}", self.token_url);
        let mut request = self
            .client
            .post(&self.token_url)
            .header(AUTHORIZATION, format!("Basic {}", self.credentials.client_auth))
            .form(form);

        if device_header {
            request = request.header("X-Epic-Device-ID", "device_auth");
        }

        let response = request
            .send()
            .await
            .map_err(|e| EpicError::from_network_error(&e))?;

        json_body::<TokenResponse>(response).await
    }
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, EpicError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(EpicError::from_response(status.as_u16(), &body));
    }

    response.json::<T>().await.map_err(|e| EpicError::Decode(e.to_string()))
}
