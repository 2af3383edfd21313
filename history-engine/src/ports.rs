use anyhow::Result;
use async_trait::async_trait;
use history_core::model::{HistoryEntry, SlotEvent};

/// Source of per-slot offer reports, one polling pass per game tick.
/// `Ok(None)` means the feed is closed.
#[async_trait]
pub trait OfferStream: Send + Sync {
    async fn next(&self) -> Result<Option<SlotEvent>>;
}

/// Presentation-side consumer of the history feed. Entries arrive in the
/// order their slots were cleared.
#[async_trait]
pub trait HistorySink: Send + Sync {
    async fn on_entry(&self, entry: &HistoryEntry) -> Result<()>;
    async fn on_reset(&self) -> Result<()>;
}
