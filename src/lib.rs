//! Save the World V-Bucks Alert Tracker
//!
//! Polls Epic's `world/info` endpoint for mission alerts that reward V-Bucks,
//! works out which alerts have not been announced yet, and posts them to a
//! Discord channel. Announced alerts are remembered in a small JSON file and
//! forgotten again once they leave the upstream response.

pub mod config;
pub mod discord;
pub mod epic;
pub mod error;
pub mod normalizer;
pub mod reconcile;
pub mod resolver;
pub mod retry;
pub mod store;
pub mod tracker;
pub mod types;

pub use config::Config;
pub use discord::{Announcement, DiscordClient};
pub use epic::EpicClient;
pub use error::{DiscordError, EpicError};
pub use normalizer::{extract_candidates, AlertsShape};
pub use reconcile::{reconcile, Reconciliation};
pub use resolver::{extract_offers, resolve_location};
pub use store::StateStore;
pub use tracker::{Announcer, CycleReport, Tracker, WorldSource};
pub use types::{LocationText, Offer, SeenEntry, SeenKey, SeenRecord};
