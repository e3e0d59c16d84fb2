//! Discord announcements for new V-Bucks mission alerts

use crate::config::DiscordApi;
use crate::error::DiscordError;
use crate::retry::{with_retry, RetryConfig};
use crate::types::Offer;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Message content for one new offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub role_id: u64,
    pub title: String,
    pub body: String,
}

impl Announcement {
    pub fn for_offer(offer: &Offer, role_id: u64) -> Self {
        Self {
            role_id,
            title: offer.description.clone(),
            body: format!("{}\n> V-Bucks: {}", offer.display_name, offer.quantity),
        }
    }

    /// Role mention placed in the message content
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.role_id)
    }

    /// Body for `POST /channels/{id}/messages`
    pub fn payload(&self) -> Value {
        json!({
            "content": self.mention(),
            "embeds": [{
                "title": self.title,
                "description": self.body,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }],
            "allowed_mentions": {
                "parse": [],
                "roles": [self.role_id.to_string()]
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default)]
    name: Option<String>,
}

/// Bot connection bound to the announcement channel.
///
/// Built once at startup; `connect` fails when the channel is not reachable.
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    token: String,
    api_url: String,
    channel_id: u64,
    role_id: u64,
    retry: RetryConfig,
    request_timeout: Duration,
}

impl DiscordClient {
    /// Verify the bot token and channel, returning a ready client
    pub async fn connect(token: String, api_url: &str, channel_id: u64, role_id: u64) -> Result<Self, DiscordError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DiscordError::from_network_error(&e))?;

        let discord = Self {
            client,
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
            channel_id,
            role_id,
            retry: RetryConfig::default(),
            request_timeout: REQUEST_TIMEOUT,
        };

        let response = discord
            .client
            .get(DiscordApi::channel_url(&discord.api_url, channel_id))
            .header(AUTHORIZATION, discord.auth_header())
            .send()
            .await
            .map_err(|e| DiscordError::from_network_error(&e))?;

        let channel: Channel = discord.json_body(response).await?;
        info!(
            "Connected to Discord channel #{} ({})",
            channel.name.as_deref().unwrap_or("unnamed"),
            channel_id
        );
        Ok(discord)
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn role_id(&self) -> u64 {
        self.role_id
    }

    /// Post one announcement.
    ///
    /// Rate limits, server errors and failed connects are retried. A timeout
    /// is not, since Discord may have accepted the message already.
    pub async fn send(&self, announcement: &Announcement) -> Result<(), DiscordError> {
        let url = DiscordApi::messages_url(&self.api_url, self.channel_id);
        let payload = announcement.payload();
        let (url, payload) = (url.as_str(), &payload);

        with_retry(&self.retry, "discord message", || async move {
            let response = self
                .client
                .post(url)
                .header(AUTHORIZATION, self.auth_header())
                .json(payload)
                .timeout(self.request_timeout)
                .send()
                .await
                .map_err(|e| DiscordError::from_network_error(&e))?;

            self.json_body::<Value>(response).await.map(|_| ())
        })
        .await
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    async fn json_body<T: serde::de::DeserializeOwned>(&self, response: Response) -> Result<T, DiscordError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiscordError::from_response(status.as_u16(), &body, self.channel_id));
        }

        response.json::<T>().await.map_err(|e| DiscordError::Decode(e.to_string()))
    }
}
