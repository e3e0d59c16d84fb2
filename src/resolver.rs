//! Theater name lookup and offer assembly

use crate::normalizer::{array_field, extract_candidates, str_field};
use crate::types::{LocationText, Offer};
use serde_json::Value;

/// Locale used for theater display text
pub const LOCALE: &str = "en";

/// Resolve the display name and description of a theater.
///
/// The first `theaters` entry whose `uniqueId` matches wins. Missing or empty
/// text falls back to the sentinels.
pub fn resolve_location(doc: &Value, theater_id: &str) -> LocationText {
    let Some(theaters) = array_field(doc, "theaters") else {
        return LocationText::unknown();
    };

    theaters
        .iter()
        .find(|entry| str_field(entry, "uniqueId") == Some(theater_id))
        .map(|entry| {
            LocationText::new(
                localized(entry, "displayName").unwrap_or_default(),
                localized(entry, "description").unwrap_or_default(),
            )
        })
        .unwrap_or_else(LocationText::unknown)
}

fn localized<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    str_field(entry.get(key)?, LOCALE)
}

/// Current V-Bucks offers of a document, in document order, with display text
pub fn extract_offers(doc: &Value) -> Vec<Offer> {
    extract_candidates(doc)
        .into_iter()
        .map(|key| {
            let text = resolve_location(doc, &key.theater_id);
            Offer::new(key, text)
        })
        .collect()
}
