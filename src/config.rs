//! Configuration management for the tracker

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Base64 `client_id:client_secret` of the public Fortnite launcher client
pub const DEFAULT_CLIENT_AUTH: &str =
    "M2Y2OWU1NmM3NjQ5NDkyYzhjYzI5ZjFhZjA4YThhMTI6YjUxZWU5Y2IxMjIzNGY1MGE2OWVmYTY3ZWY1MzgxMmU=";

/// Tracker configuration loaded from environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Epic device auth credentials
    pub epic: EpicCredentials,

    /// Discord bot token
    pub discord_token: String,

    /// Channel that receives announcements
    pub channel_id: u64,

    /// Role mentioned in every announcement
    pub role_id: u64,

    /// Seconds between poll cycles
    pub poll_interval_seconds: u64,

    /// Path of the seen-missions JSON file
    pub state_file: PathBuf,

    /// Service endpoints, overridable for testing
    pub endpoints: Endpoints,
}

/// Device auth triple plus the client the device was registered with
#[derive(Clone)]
pub struct EpicCredentials {
    pub device_id: String,
    pub secret: String,
    pub account_id: String,
    /// Base64 `client_id:client_secret` for HTTP Basic auth
    pub client_auth: String,
}

impl std::fmt::Debug for EpicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpicCredentials")
            .field("device_id", &self.device_id)
            .field("account_id", &self.account_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub epic_account: String,
    pub epic_game: String,
    pub discord_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            epic_account: EpicApi::ACCOUNT_URL.to_string(),
            epic_game: EpicApi::GAME_URL.to_string(),
            discord_api: DiscordApi::BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load only the Epic credentials and endpoints, for commands that never
    /// post to Discord
    pub fn epic_from_env() -> Result<(EpicCredentials, Endpoints)> {
        dotenvy::dotenv().ok();
        Self::epic_from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup. Missing credentials or
    /// destination ids are errors; the tracker must not start without them.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (epic, endpoints) = Self::epic_from_lookup(&lookup)?;

        let get = |key: &str| non_empty(&lookup, key);
        let require = |key: &str| required(&lookup, key);
        let require_id = |key: &str| -> Result<u64> {
            require(key)?
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a numeric Discord id", key))
        };

        let discord_token = require("DISCORD_TOKEN")?;
        let channel_id = require_id("CHANNEL_ID")?;
        let role_id = require_id("ROLE_ID")?;

        let poll_interval_seconds = match get("POLL_INTERVAL_SECONDS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .context("POLL_INTERVAL_SECONDS must be a whole number of seconds")?,
            None => 60,
        };
        if poll_interval_seconds == 0 {
            anyhow::bail!("POLL_INTERVAL_SECONDS must be greater than zero");
        }

        let state_file = get("STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("old_vbucks_missions.json"));

        Ok(Self {
            epic,
            discord_token,
            channel_id,
            role_id,
            poll_interval_seconds,
            state_file,
            endpoints,
        })
    }

    /// Epic half of [`Config::from_lookup`]
    pub fn epic_from_lookup<F>(lookup: F) -> Result<(EpicCredentials, Endpoints)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let epic = EpicCredentials {
            device_id: required(&lookup, "EPIC_DEVICE_ID")?,
            secret: required(&lookup, "EPIC_DEVICE_SECRET")?,
            account_id: required(&lookup, "EPIC_ACCOUNT_ID")?,
            client_auth: non_empty(&lookup, "EPIC_CLIENT_AUTH")
                .unwrap_or_else(|| DEFAULT_CLIENT_AUTH.to_string()),
        };

        let defaults = Endpoints::default();
        let endpoints = Endpoints {
            epic_account: non_empty(&lookup, "EPIC_ACCOUNT_URL").unwrap_or(defaults.epic_account),
            epic_game: non_empty(&lookup, "EPIC_GAME_URL").unwrap_or(defaults.epic_game),
            discord_api: non_empty(&lookup, "DISCORD_API_URL").unwrap_or(defaults.discord_api),
        };

        Ok((epic, endpoints))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

fn non_empty<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn required<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Result<String> {
    non_empty(lookup, key).with_context(|| format!("{} must be set", key))
}

/// Epic Games service endpoints
pub struct EpicApi;

impl EpicApi {
    pub const ACCOUNT_URL: &'static str = "https://account-public-service-prod.ol.epicgames.com";
    pub const GAME_URL: &'static str = "https://fngw-mcp-gc-livefn.ol.epicgames.com";

    pub fn token_url(base: &str) -> String {
        format!("{}/account/api/oauth/token", base.trim_end_matches('/'))
    }

    pub fn world_info_url(base: &str) -> String {
        format!("{}/fortnite/api/game/v2/world/info", base.trim_end_matches('/'))
    }
}

/// Discord REST API endpoints
pub struct DiscordApi;

impl DiscordApi {
    pub const BASE_URL: &'static str = "https://discord.com/api/v10";

    pub fn channel_url(base: &str, channel_id: u64) -> String {
        format!("{}/channels/{}", base.trim_end_matches('/'), channel_id)
    }

    pub fn messages_url(base: &str, channel_id: u64) -> String {
        format!("{}/messages", Self::channel_url(base, channel_id))
    }
}
