//! Poll cycle driver
//!
//! One cycle: fetch `world/info`, extract offers, reconcile against the seen
//! record, announce new offers, persist the record. Cycles run strictly one
//! after another on a fixed interval.

use crate::discord::{Announcement, DiscordClient};
use crate::epic::EpicClient;
use crate::reconcile::{reconcile, Reconciliation};
use crate::resolver::extract_offers;
use crate::store::StateStore;
use crate::types::{Offer, SeenEntry, SeenRecord};
use anyhow::{Context, Result};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Source of the raw `world/info` document
pub trait WorldSource {
    fn fetch_world_info(&self) -> impl Future<Output = Result<Value>> + Send;
}

/// Destination for new-offer announcements
pub trait Announcer {
    fn announce(&self, offer: &Offer) -> impl Future<Output = Result<()>> + Send;
}

impl WorldSource for EpicClient {
    async fn fetch_world_info(&self) -> Result<Value> {
        Ok(self.world_info().await?)
    }
}

impl Announcer for DiscordClient {
    async fn announce(&self, offer: &Offer) -> Result<()> {
        self.send(&Announcement::for_offer(offer, self.role_id())).await?;
        Ok(())
    }
}

/// Counts from one completed cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub current: usize,
    pub new: usize,
    pub pruned: usize,
    pub announced: usize,
    pub failed: usize,
}

/// Owns the seen record and the collaborators of the poll loop
pub struct Tracker<S, A> {
    source: S,
    announcer: A,
    store: StateStore,
    record: SeenRecord,
}

impl<S: WorldSource, A: Announcer> Tracker<S, A> {
    /// Create a tracker, loading the seen record from the store
    pub async fn new(source: S, announcer: A, store: StateStore) -> Self {
        let record = store.load().await;
        Self {
            source,
            announcer,
            store,
            record,
        }
    }

    pub fn record(&self) -> &[SeenEntry] {
        &self.record
    }

    /// Run one poll cycle.
    ///
    /// A fetch failure returns early and leaves the record untouched. Once
    /// offers are reconciled the record is always replaced and saved, even if
    /// some announcements fail.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let doc = self
            .source
            .fetch_world_info()
            .await
            .context("Failed to fetch world info")?;

        let offers = extract_offers(&doc);
        info!("Found {} current V-Bucks missions", offers.len());

        let Reconciliation {
            new_offers,
            record,
            pruned,
        } = reconcile(&offers, self.record.clone());
        info!("Pruned {} missions no longer in API response", pruned);
        info!("Identified {} new missions", new_offers.len());

        let mut report = CycleReport {
            current: offers.len(),
            new: new_offers.len(),
            pruned,
            ..Default::default()
        };

        for offer in &new_offers {
            match self.announcer.announce(offer).await {
                Ok(()) => {
                    report.announced += 1;
                    info!("Sent announcement for {}", offer.label());
                }
                Err(e) => {
                    report.failed += 1;
                    error!("Failed to announce {}: {:#}", offer.label(), e);
                }
            }
        }

        self.record = record;
        if let Err(e) = self.store.save(&self.record).await {
            error!("Error saving state file: {:#}", e);
        }

        Ok(report)
    }

    /// Poll until Ctrl-C. Errors end the current cycle only.
    pub async fn run(mut self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // One listener for the whole loop so a Ctrl-C during a cycle is kept
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        let mut listening = true;

        info!("Starting tracker loop (every {}s)", interval.as_secs());

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                result = &mut shutdown, if listening => match result {
                    Ok(()) => {
                        info!("Shutdown requested, stopping tracker loop");
                        break;
                    }
                    Err(e) => {
                        warn!("Cannot listen for Ctrl-C, continuing without it: {}", e);
                        listening = false;
                        continue;
                    }
                },
            }

            match self.run_cycle().await {
                Ok(report) if report.failed > 0 => {
                    warn!("Cycle finished with {} failed announcements", report.failed);
                }
                Ok(_) => {}
                Err(e) => error!("[tracker] cycle failed: {:#}", e),
            }
        }
    }
}
