use crate::{
    config::HistoryConfig,
    metrics::Metrics,
    ports::{HistorySink, OfferStream},
};
use anyhow::{Context, Result};
use history_core::{
    model::{HistoryEntry, SlotEvent},
    tracker::{Observation, OfferHistoryTracker},
};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};

enum SinkEvent {
    Entry(HistoryEntry),
    Reset,
}

/// Drives the tracker from an offer stream and hands emitted entries to
/// the presentation sink.
///
/// The tracker itself is mutated only on this runner's task; emission is
/// asynchronous relative to the state update that produced it, but entries
/// reach the sink in `observe` call order because they pass through a
/// single bounded channel with a single consumer.
pub struct HistoryRunner<S, K>
where
    S: OfferStream + 'static,
    K: HistorySink + 'static,
{
    cfg: HistoryConfig,
    stream: Arc<S>,
    sink: Arc<K>,
    metrics: Arc<Metrics>,
}

impl<S, K> HistoryRunner<S, K>
where
    S: OfferStream + 'static,
    K: HistorySink + 'static,
{
    pub fn new(cfg: HistoryConfig, stream: Arc<S>, sink: Arc<K>, metrics: Arc<Metrics>) -> Self {
        Self {
            cfg,
            stream,
            sink,
            metrics,
        }
    }

    /// Runs until the offer stream closes, then drains the entry channel
    /// and joins both tasks.
    pub async fn run(&self) -> Result<()> {
        let (ev_tx, mut ev_rx) = mpsc::channel::<SlotEvent>(self.cfg.channels.event_capacity);
        let (entry_tx, mut entry_rx) = mpsc::channel::<SinkEvent>(self.cfg.channels.entry_capacity);

        let stream = self.stream.clone();
        let feed_loop: JoinHandle<Result<()>> = tokio::spawn(async move {
            info!(target: "runner", "offer stream started");
            while let Some(ev) = stream.next().await? {
                if ev_tx.send(ev).await.is_err() {
                    break;
                }
            }
            info!(target: "runner", "offer stream closed");
            Ok(())
        });

        let sink = self.sink.clone();
        let sink_loop: JoinHandle<Result<()>> = tokio::spawn(async move {
            while let Some(ev) = entry_rx.recv().await {
                match ev {
                    SinkEvent::Entry(entry) => sink.on_entry(&entry).await?,
                    SinkEvent::Reset => sink.on_reset().await?,
                }
            }
            Ok(())
        });

        let mut tracker = OfferHistoryTracker::new();
        while let Some(ev) = ev_rx.recv().await {
            match ev {
                SlotEvent::Offer {
                    slot,
                    item,
                    icon,
                    offer,
                } => {
                    self.metrics.offers_observed.inc();
                    let obs = tracker
                        .observe(slot, &item, icon, &offer)
                        .context("observe offer update")?;
                    match obs {
                        Observation::Emitted(entry) => {
                            self.metrics.entries_emitted.inc();
                            if entry_tx.send(SinkEvent::Entry(entry)).await.is_err() {
                                break;
                            }
                        }
                        Observation::Captured { overwrote } => {
                            self.metrics.snapshots_captured.inc();
                            if overwrote {
                                self.metrics.snapshots_overwritten.inc();
                                warn!(target: "runner", slot, "snapshot overwritten before slot was cleared");
                            }
                        }
                        Observation::Idle => {}
                    }
                    self.metrics
                        .pending_snapshots
                        .set(tracker.pending_snapshots() as i64);
                }
                SlotEvent::SessionChanged => {
                    info!(target: "runner", "session changed, clearing history");
                    tracker.reset();
                    self.metrics.resets.inc();
                    self.metrics.pending_snapshots.set(0);
                    if entry_tx.send(SinkEvent::Reset).await.is_err() {
                        break;
                    }
                }
            }
        }
        drop(entry_tx);

        feed_loop.await.context("join offer stream task")??;
        sink_loop.await.context("join sink task")??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use history_core::model::{IconHandle, ItemInfo, OfferState, OfferUpdate, TradeSide};
    use prometheus::Registry;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    struct ScriptedFeed {
        events: Mutex<VecDeque<SlotEvent>>,
    }

    impl ScriptedFeed {
        fn new(events: Vec<SlotEvent>) -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(events.into()),
            })
        }
    }

    #[async_trait]
    impl OfferStream for ScriptedFeed {
        async fn next(&self) -> Result<Option<SlotEvent>> {
            Ok(self.events.lock().await.pop_front())
        }
    }

    #[derive(Default)]
    struct CollectSink {
        entries: Mutex<Vec<HistoryEntry>>,
        resets: Mutex<usize>,
    }

    #[async_trait]
    impl HistorySink for CollectSink {
        async fn on_entry(&self, entry: &HistoryEntry) -> Result<()> {
            self.entries.lock().await.push(entry.clone());
            Ok(())
        }

        async fn on_reset(&self) -> Result<()> {
            *self.resets.lock().await += 1;
            Ok(())
        }
    }

    fn offer(slot: usize, item_id: u32, name: &str, state: OfferState, qty: i64, price: i64) -> SlotEvent {
        SlotEvent::Offer {
            slot,
            item: ItemInfo {
                id: item_id,
                name: name.to_string(),
            },
            icon: IconHandle(item_id),
            offer: OfferUpdate {
                state,
                quantity_filled: qty,
                price,
            },
        }
    }

    #[tokio::test]
    async fn entries_reach_the_sink_in_observation_order() {
        let feed = ScriptedFeed::new(vec![
            offer(0, 1333, "Rune scimitar", OfferState::Sold, 5, 10),
            offer(1, 561, "Nature rune", OfferState::CancelledBuy, 0, 100),
            offer(2, 1513, "Magic logs", OfferState::Bought, 3, 7),
            offer(2, 1515, "Yew logs", OfferState::Bought, 1, 20),
            offer(0, 1333, "Rune scimitar", OfferState::Empty, 0, 0),
            offer(1, 561, "Nature rune", OfferState::Empty, 0, 0),
            offer(2, 1515, "Yew logs", OfferState::Empty, 0, 0),
        ]);
        let sink = Arc::new(CollectSink::default());
        let registry = Registry::new();
        let metrics = Metrics::new(&registry);
        let runner = HistoryRunner::new(
            HistoryConfig::default(),
            feed,
            sink.clone(),
            metrics.clone(),
        );
        runner.run().await.expect("runner");

        let entries = sink.entries.lock().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].side, TradeSide::Sell);
        assert_eq!(entries[0].quantity, 5);
        assert_eq!(entries[0].total, 50);
        // Slot 2 was reused before clearing; only the later trade surfaces.
        assert_eq!(entries[1].item.name, "Yew logs");
        assert_eq!(entries[1].quantity, 1);
        assert_eq!(entries[1].price, 20);

        assert_eq!(metrics.offers_observed.get(), 7);
        assert_eq!(metrics.entries_emitted.get(), 2);
        assert_eq!(metrics.snapshots_captured.get(), 3);
        assert_eq!(metrics.snapshots_overwritten.get(), 1);
        assert_eq!(metrics.pending_snapshots.get(), 0);
    }

    #[tokio::test]
    async fn session_change_clears_pending_snapshots() {
        let feed = ScriptedFeed::new(vec![
            offer(3, 440, "Iron ore", OfferState::CancelledSell, 12, 90),
            SlotEvent::SessionChanged,
            offer(3, 440, "Iron ore", OfferState::Empty, 0, 0),
        ]);
        let sink = Arc::new(CollectSink::default());
        let registry = Registry::new();
        let metrics = Metrics::new(&registry);
        let runner = HistoryRunner::new(
            HistoryConfig::default(),
            feed,
            sink.clone(),
            metrics.clone(),
        );
        runner.run().await.expect("runner");

        assert!(sink.entries.lock().await.is_empty());
        assert_eq!(*sink.resets.lock().await, 1);
        assert_eq!(metrics.resets.get(), 1);
        assert_eq!(metrics.pending_snapshots.get(), 0);
    }

    #[tokio::test]
    async fn contract_violations_abort_the_run() {
        let feed = ScriptedFeed::new(vec![offer(
            99,
            1333,
            "Rune scimitar",
            OfferState::Sold,
            1,
            1,
        )]);
        let sink = Arc::new(CollectSink::default());
        let registry = Registry::new();
        let metrics = Metrics::new(&registry);
        let runner = HistoryRunner::new(HistoryConfig::default(), feed, sink, metrics);
        assert!(runner.run().await.is_err());
    }
}
