//! Mission alert extraction from the `world/info` document
//!
//! The document is loosely typed and has shipped in two layouts over time.
//! Every field is narrowed to the type we expect; anything that does not fit
//! is treated as absent and only that element is dropped.

use crate::types::{SeenKey, VBUCKS_ITEM_TYPE};
use serde_json::Value;
use tracing::debug;

/// Top-level layouts of the `missionAlerts` field
#[derive(Debug, Clone, Copy)]
pub enum AlertsShape<'a> {
    /// `{"availableMissionAlerts": [...]}` where each alert names its theater
    Flat(&'a [Value]),
    /// `[{"theaterId": ..., "availableMissionAlerts": [...]}, ...]`
    Grouped(&'a [Value]),
    /// Missing or not a recognised layout
    Absent,
}

impl<'a> AlertsShape<'a> {
    pub fn of(doc: &'a Value) -> Self {
        match doc.get("missionAlerts") {
            Some(Value::Object(map)) => {
                let alerts = map
                    .get("availableMissionAlerts")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                AlertsShape::Flat(alerts)
            }
            Some(Value::Array(blocks)) => AlertsShape::Grouped(blocks),
            _ => AlertsShape::Absent,
        }
    }

    /// Every `(theater_id, alert)` pair, whichever layout the document uses
    pub fn alerts(self) -> Vec<(&'a str, &'a Value)> {
        match self {
            AlertsShape::Flat(alerts) => alerts
                .iter()
                .filter_map(|alert| Some((str_field(alert, "theaterId")?, alert)))
                .collect(),
            AlertsShape::Grouped(blocks) => blocks
                .iter()
                .filter_map(|block| {
                    let theater_id = str_field(block, "theaterId")?;
                    let alerts = array_field(block, "availableMissionAlerts")?;
                    Some(alerts.iter().map(move |alert| (theater_id, alert)))
                })
                .flatten()
                .collect(),
            AlertsShape::Absent => Vec::new(),
        }
    }
}

/// Extract the V-Bucks alerts of a document as `(theater, quantity)` keys.
///
/// Order follows the document. Never fails; malformed elements are skipped.
pub fn extract_candidates(doc: &Value) -> Vec<SeenKey> {
    let shape = AlertsShape::of(doc);
    if matches!(shape, AlertsShape::Absent) {
        debug!("Document has no usable missionAlerts field");
    }

    shape
        .alerts()
        .into_iter()
        .filter_map(|(theater_id, alert)| {
            let quantity = first_vbucks_quantity(alert)?;
            Some(SeenKey::new(theater_id, quantity))
        })
        .collect()
}

/// Quantity of the first V-Bucks reward item of an alert.
///
/// Items with the right type but a non-integer quantity are passed over so a
/// later well-formed item can still match.
fn first_vbucks_quantity(alert: &Value) -> Option<u64> {
    let rewards = alert.get("missionAlertRewards")?;
    array_field(rewards, "items")?.iter().find_map(|item| {
        if str_field(item, "itemType")? != VBUCKS_ITEM_TYPE {
            return None;
        }
        item.get("quantity")?.as_u64()
    })
}

pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.as_object()?.get(key)?.as_str()
}

pub(crate) fn array_field<'a>(value: &'a Value, key: &str) -> Option<&'a [Value]> {
    value
        .as_object()?
        .get(key)?
        .as_array()
        .map(Vec::as_slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vbucks(quantity: Value) -> Value {
        json!({"itemType": VBUCKS_ITEM_TYPE, "quantity": quantity})
    }

    #[test]
    fn test_flat_shape_single_alert() {
        let doc = json!({
            "missionAlerts": {
                "availableMissionAlerts": [{
                    "theaterId": "theater1",
                    "missionAlertRewards": {"items": [vbucks(json!(150))]}
                }]
            }
        });

        assert_eq!(extract_candidates(&doc), vec![SeenKey::new("theater1", 150)]);
    }

    #[test]
    fn test_grouped_shape_uses_block_theater() {
        let doc = json!({
            "missionAlerts": [
                {
                    "theaterId": "stonewood",
                    "availableMissionAlerts": [
                        {"missionAlertRewards": {"items": [vbucks(json!(50))]}},
                        {"missionAlertRewards": {"items": [{"itemType": "AccountResource:eventcurrency_scaling", "quantity": 900}]}},
                        {"missionAlertRewards": {"items": [vbucks(json!(75))]}}
                    ]
                },
                {"theaterId": 7, "availableMissionAlerts": [{"missionAlertRewards": {"items": [vbucks(json!(1))]}}]},
                {"theaterId": "canny", "availableMissionAlerts": "nope"},
                {"theaterId": "twine", "availableMissionAlerts": [{"missionAlertRewards": {"items": [vbucks(json!(100))]}}]}
            ]
        });

        assert_eq!(
            extract_candidates(&doc),
            vec![
                SeenKey::new("stonewood", 50),
                SeenKey::new("stonewood", 75),
                SeenKey::new("twine", 100),
            ]
        );
    }

    #[test]
    fn test_numeric_theater_id_is_dropped() {
        let doc = json!({
            "missionAlerts": {
                "availableMissionAlerts": [
                    {"theaterId": 42, "missionAlertRewards": {"items": [vbucks(json!(150))]}},
                    {"theaterId": "theater2", "missionAlertRewards": {"items": [vbucks(json!(80))]}}
                ]
            }
        });

        assert_eq!(extract_candidates(&doc), vec![SeenKey::new("theater2", 80)]);
    }

    #[test]
    fn test_only_first_vbucks_item_is_taken() {
        let doc = json!({
            "missionAlerts": {
                "availableMissionAlerts": [{
                    "theaterId": "t",
                    "missionAlertRewards": {"items": [vbucks(json!(30)), vbucks(json!(60))]}
                }]
            }
        });

        assert_eq!(extract_candidates(&doc), vec![SeenKey::new("t", 30)]);
    }

    #[test]
    fn test_non_integer_quantity_falls_through_to_next_item() {
        let doc = json!({
            "missionAlerts": {
                "availableMissionAlerts": [{
                    "theaterId": "t",
                    "missionAlertRewards": {"items": [
                        vbucks(json!("150")),
                        vbucks(json!(12.5)),
                        vbucks(json!(-5)),
                        {"itemType": VBUCKS_ITEM_TYPE},
                        vbucks(json!(40))
                    ]}
                }]
            }
        });

        assert_eq!(extract_candidates(&doc), vec![SeenKey::new("t", 40)]);
    }

    #[test]
    fn test_malformed_elements_do_not_abort_siblings() {
        let doc = json!({
            "missionAlerts": {
                "availableMissionAlerts": [
                    "not an object",
                    {"theaterId": "a", "missionAlertRewards": []},
                    {"theaterId": "b", "missionAlertRewards": {"items": {"0": 1}}},
                    {"theaterId": "c", "missionAlertRewards": {"items": [null, 3, vbucks(json!(25))]}},
                    {"theaterId": "d"}
                ]
            }
        });

        assert_eq!(extract_candidates(&doc), vec![SeenKey::new("c", 25)]);
    }

    #[test]
    fn test_absent_or_unexpected_alerts_field() {
        assert!(extract_candidates(&json!({})).is_empty());
        assert!(extract_candidates(&json!({"missionAlerts": "x"})).is_empty());
        assert!(extract_candidates(&json!({"missionAlerts": {"availableMissionAlerts": 5}})).is_empty());
        assert!(extract_candidates(&json!([1, 2, 3])).is_empty());
    }
}
