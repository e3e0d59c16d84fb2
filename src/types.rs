//! Core types for the V-Bucks alert tracker

use serde::{Deserialize, Serialize};
use std::fmt;

/// Item type tag of the V-Bucks currency inside mission alert rewards
pub const VBUCKS_ITEM_TYPE: &str = "AccountResource:currency_mtxswap";

/// Fallback display name when a theater cannot be resolved
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Fallback description when a theater cannot be resolved
pub const NO_DESCRIPTION: &str = "No description available.";

/// Identity of a mission alert across poll cycles.
///
/// Two alerts are the same only when both the theater and the reward amount
/// match, so a theater coming back with a different amount is a new alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeenKey {
    pub theater_id: String,
    pub quantity: u64,
}

impl SeenKey {
    pub fn new(theater_id: impl Into<String>, quantity: u64) -> Self {
        Self {
            theater_id: theater_id.into(),
            quantity,
        }
    }
}

impl fmt::Display for SeenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} V-Bucks)", self.theater_id, self.quantity)
    }
}

/// One persisted entry of the seen record.
///
/// Only the key fields are stored; display text is resolved fresh every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenEntry {
    #[serde(rename = "theaterId")]
    pub theater_id: String,
    pub quantity: u64,
}

impl SeenEntry {
    pub fn key(&self) -> SeenKey {
        SeenKey::new(self.theater_id.clone(), self.quantity)
    }
}

impl From<SeenKey> for SeenEntry {
    fn from(key: SeenKey) -> Self {
        Self {
            theater_id: key.theater_id,
            quantity: key.quantity,
        }
    }
}

/// Ordered record of alerts already announced and still live upstream
pub type SeenRecord = Vec<SeenEntry>;

/// Human-readable text for a theater
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationText {
    pub display_name: String,
    pub description: String,
}

impl LocationText {
    pub fn new(display_name: &str, description: &str) -> Self {
        let pick = |value: &str, fallback: &str| {
            if value.is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            display_name: pick(display_name, UNKNOWN_LOCATION),
            description: pick(description, NO_DESCRIPTION),
        }
    }

    /// The sentinel pair used when nothing matches
    pub fn unknown() -> Self {
        Self::new("", "")
    }
}

/// A V-Bucks mission alert active in the current poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub theater_id: String,
    pub quantity: u64,
    pub display_name: String,
    pub description: String,
}

impl Offer {
    pub fn new(key: SeenKey, text: LocationText) -> Self {
        Self {
            theater_id: key.theater_id,
            quantity: key.quantity,
            display_name: text.display_name,
            description: text.description,
        }
    }

    pub fn key(&self) -> SeenKey {
        SeenKey::new(self.theater_id.clone(), self.quantity)
    }

    /// Short label for logs
    pub fn label(&self) -> String {
        format!("'{}' worth {} V-Bucks", self.display_name, self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_text_falls_back_per_field() {
        let text = LocationText::new("Stonewood", "");
        assert_eq!(text.display_name, "Stonewood");
        assert_eq!(text.description, NO_DESCRIPTION);

        let text = LocationText::unknown();
        assert_eq!(text.display_name, UNKNOWN_LOCATION);
        assert_eq!(text.description, NO_DESCRIPTION);
    }

    #[test]
    fn test_seen_entry_serializes_with_upstream_field_names() {
        let entry = SeenEntry::from(SeenKey::new("theater1", 150));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({"theaterId": "theater1", "quantity": 150}));
    }
}
