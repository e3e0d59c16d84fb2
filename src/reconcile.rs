//! Diff of current offers against the seen record

use crate::types::{Offer, SeenEntry, SeenKey, SeenRecord};
use std::collections::HashSet;

/// Result of reconciling one poll against the seen record
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Offers to announce, in upstream order
    pub new_offers: Vec<Offer>,
    /// Record to persist: surviving entries followed by the new keys
    pub record: SeenRecord,
    /// Number of previous entries dropped: gone upstream or repeated
    pub pruned: usize,
}

/// Compute new offers and the updated seen record.
///
/// Entries of `previous` whose key is not among `current` are dropped, so an
/// alert that disappears and later returns is announced again. Every key of
/// `current` ends up in the record exactly once.
pub fn reconcile(current: &[Offer], previous: SeenRecord) -> Reconciliation {
    let current_keys: HashSet<SeenKey> = current.iter().map(Offer::key).collect();

    let before = previous.len();
    let mut seen: HashSet<SeenKey> = HashSet::new();
    let mut record: SeenRecord = previous
        .into_iter()
        .filter(|entry| {
            let key = entry.key();
            current_keys.contains(&key) && seen.insert(key)
        })
        .collect();
    let pruned = before - record.len();

    let mut new_offers = Vec::new();

    for offer in current {
        let key = offer.key();
        if seen.insert(key.clone()) {
            record.push(SeenEntry::from(key));
            new_offers.push(offer.clone());
        }
    }

    Reconciliation {
        new_offers,
        record,
        pruned,
    }
}
