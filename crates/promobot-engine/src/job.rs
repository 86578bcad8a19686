//! The promotion job: one run of select → generate → deliver.

use std::sync::Arc;

use promobot_copy::CopyClient;
use promobot_core::PromotionConfig;
use promobot_storefront::StorefrontClient;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::publish::{PublishOutcome, Publisher};
use crate::select::select_items;

/// Why a run published nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No delivery endpoint is configured; the run short-circuits before
    /// any catalog or generation call.
    Unconfigured,
    /// The catalog came back empty (or the provider was unreachable, which
    /// is deliberately indistinguishable here).
    EmptyCatalog,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Unconfigured => write!(f, "unconfigured"),
            SkipReason::EmptyCatalog => write!(f, "empty catalog"),
        }
    }
}

/// Counters for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub selected: usize,
    pub published: usize,
    pub errors: usize,
}

/// Tagged outcome of one run, preserved for logging and the operator UI
/// instead of being swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunOutcome {
    Completed(RunSummary),
    Skipped { reason: SkipReason },
}

/// One promotion run over the configured collection.
///
/// Every step is independently fault-tolerant: a failed catalog fetch is an
/// empty catalog, copy generation degrades to fallback text, and a failed
/// delivery is counted and logged without aborting the remaining items.
/// Both the scheduler trigger and the manual run-now path call [`run`]
/// with identical semantics.
///
/// [`run`]: PromotionJob::run
pub struct PromotionJob {
    storefront: Arc<StorefrontClient>,
    copy: Arc<CopyClient>,
    publisher: Arc<Publisher>,
    /// Serializes runs with each other and with scheduler reconfiguration.
    run_lock: Arc<Mutex<()>>,
}

impl PromotionJob {
    #[must_use]
    pub fn new(
        storefront: Arc<StorefrontClient>,
        copy: Arc<CopyClient>,
        publisher: Arc<Publisher>,
    ) -> Self {
        Self {
            storefront,
            copy,
            publisher,
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    pub(crate) fn run_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.run_lock)
    }

    /// Executes one run with the given configuration.
    ///
    /// Concurrent invocations (a manual test run overlapping the scheduled
    /// trigger) are serialized on the run lock, so payload deliveries for
    /// one configuration never interleave.
    pub async fn run(&self, config: &PromotionConfig) -> RunOutcome {
        let _guard = self.run_lock.lock().await;

        if !self.publisher.is_configured() {
            tracing::warn!("promotion run skipped: no delivery endpoint configured");
            return RunOutcome::Skipped {
                reason: SkipReason::Unconfigured,
            };
        }

        let items = match self.storefront.list_items(&config.collection_id).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    collection = %config.collection_id,
                    error = %e,
                    "catalog fetch failed; treating as empty"
                );
                Vec::new()
            }
        };

        if items.is_empty() {
            tracing::info!(collection = %config.collection_id, "nothing to publish this run");
            return RunOutcome::Skipped {
                reason: SkipReason::EmptyCatalog,
            };
        }

        let selected = select_items(&items, config.items_per_run as usize);
        let mut summary = RunSummary {
            selected: selected.len(),
            ..RunSummary::default()
        };

        for (index, item) in selected.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.publisher.pacing()).await;
            }

            let text = self
                .copy
                .generate_post(item, config.platform, &config.tone)
                .await;

            match self.publisher.publish(item, config.platform, &text).await {
                PublishOutcome::Delivered => summary.published += 1,
                PublishOutcome::Failed => summary.errors += 1,
                // Unreachable after the is_configured check; nothing to count.
                PublishOutcome::Skipped => {}
            }
        }

        tracing::info!(
            selected = summary.selected,
            published = summary.published,
            errors = summary.errors,
            "promotion run complete"
        );
        RunOutcome::Completed(summary)
    }
}
