use std::{collections::VecDeque, env, path::PathBuf, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use history_core::model::{HistoryEntry, IconHandle, ItemInfo, OfferState, OfferUpdate, SlotEvent};
use history_engine::{
    config::{load_config, HistoryConfig},
    metrics::Metrics,
    ports::{HistorySink, OfferStream},
    runner::HistoryRunner,
};
use prometheus::Registry;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct ScriptedFeed {
    events: Mutex<VecDeque<SlotEvent>>,
}

#[async_trait]
impl OfferStream for ScriptedFeed {
    async fn next(&self) -> Result<Option<SlotEvent>> {
        Ok(self.events.lock().await.pop_front())
    }
}

struct LogSink;

#[async_trait]
impl HistorySink for LogSink {
    async fn on_entry(&self, entry: &HistoryEntry) -> Result<()> {
        for line in entry.summary() {
            info!(target: "sink", "{line}");
        }
        Ok(())
    }

    async fn on_reset(&self) -> Result<()> {
        info!(target: "sink", "history cleared");
        Ok(())
    }
}

fn offer(slot: usize, id: u32, name: &str, state: OfferState, qty: i64, price: i64) -> SlotEvent {
    SlotEvent::Offer {
        slot,
        item: ItemInfo {
            id,
            name: name.to_string(),
        },
        icon: IconHandle(id),
        offer: OfferUpdate {
            state,
            quantity_filled: qty,
            price,
        },
    }
}

fn script() -> VecDeque<SlotEvent> {
    vec![
        offer(0, 1333, "Rune scimitar", OfferState::Buying, 0, 15_000),
        offer(0, 1333, "Rune scimitar", OfferState::Bought, 5, 15_000),
        offer(0, 1333, "Rune scimitar", OfferState::Empty, 0, 0),
        offer(1, 561, "Nature rune", OfferState::CancelledBuy, 0, 250),
        offer(1, 561, "Nature rune", OfferState::Empty, 0, 0),
        offer(2, 1515, "Yew logs", OfferState::CancelledSell, 120, 280),
        offer(2, 1515, "Yew logs", OfferState::Empty, 0, 0),
        SlotEvent::SessionChanged,
    ]
    .into()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = match env::args().nth(1) {
        Some(path) => load_config(&PathBuf::from(path)).await?,
        None => HistoryConfig::default(),
    };

    let registry = Registry::new();
    let metrics = Metrics::new(&registry);
    let feed = Arc::new(ScriptedFeed {
        events: Mutex::new(script()),
    });
    let runner = HistoryRunner::new(cfg, feed, Arc::new(LogSink), metrics.clone());
    runner.run().await?;

    info!(
        "replay done: {} offers observed, {} entries emitted",
        metrics.offers_observed.get(),
        metrics.entries_emitted.get()
    );
    Ok(())
}
