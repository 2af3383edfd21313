use prometheus::{IntCounter, IntGauge, Opts, Registry};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    pub offers_observed: IntCounter,
    pub entries_emitted: IntCounter,
    pub snapshots_captured: IntCounter,
    pub snapshots_overwritten: IntCounter,
    pub resets: IntCounter,
    pub pending_snapshots: IntGauge,
}

impl Metrics {
    pub fn new(registry: &Registry) -> Arc<Self> {
        let offers_observed =
            IntCounter::with_opts(Opts::new("offers_observed", "Total slot reports observed"))
                .unwrap();
        let entries_emitted =
            IntCounter::with_opts(Opts::new("entries_emitted", "History entries emitted")).unwrap();
        let snapshots_captured =
            IntCounter::with_opts(Opts::new("snapshots_captured", "Offer snapshots captured"))
                .unwrap();
        let snapshots_overwritten = IntCounter::with_opts(Opts::new(
            "snapshots_overwritten",
            "Snapshots overwritten before their slot cleared",
        ))
        .unwrap();
        let resets =
            IntCounter::with_opts(Opts::new("resets", "Session resets applied")).unwrap();
        let pending_snapshots = IntGauge::with_opts(Opts::new(
            "pending_snapshots",
            "Snapshots awaiting an Empty report",
        ))
        .unwrap();
        registry.register(Box::new(offers_observed.clone())).ok();
        registry.register(Box::new(entries_emitted.clone())).ok();
        registry.register(Box::new(snapshots_captured.clone())).ok();
        registry
            .register(Box::new(snapshots_overwritten.clone()))
            .ok();
        registry.register(Box::new(resets.clone())).ok();
        registry.register(Box::new(pending_snapshots.clone())).ok();
        Arc::new(Self {
            offers_observed,
            entries_emitted,
            snapshots_captured,
            snapshots_overwritten,
            resets,
            pending_snapshots,
        })
    }
}
