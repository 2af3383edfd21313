use crate::model::{
    now_ms, HistoryEntry, IconHandle, ItemInfo, OfferSnapshot, OfferState, OfferUpdate, TradeSide,
    SLOT_COUNT,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("slot {0} out of range")]
    SlotOutOfRange(usize),
    #[error("negative quantity {0} in offer update")]
    NegativeQuantity(i64),
    #[error("negative price {0} in offer update")]
    NegativePrice(i64),
    #[error("offer state {0:?} has no buy/sell side")]
    UnrecognizedState(OfferState),
}

/// Outcome of a single slot observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Nothing changed: in-progress offer, or Empty with no pending snapshot.
    Idle,
    /// A terminal offer with nonzero fill was snapshotted into the slot.
    Captured { overwrote: bool },
    /// The slot was cleared and its pending snapshot became a history entry.
    Emitted(HistoryEntry),
}

impl Observation {
    pub fn into_entry(self) -> Option<HistoryEntry> {
        match self {
            Observation::Emitted(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Maps a terminal or in-progress offer state to the icon side shown in
/// the history feed. `Empty` must never reach this mapping.
pub fn side_for_state(state: OfferState) -> Result<TradeSide, TrackerError> {
    match state {
        OfferState::CancelledBuy | OfferState::Buying | OfferState::Bought => Ok(TradeSide::Buy),
        OfferState::CancelledSell | OfferState::Selling | OfferState::Sold => Ok(TradeSide::Sell),
        OfferState::Empty => Err(TrackerError::UnrecognizedState(state)),
    }
}

/// Tracks per-slot offer state transitions and turns completed offers into
/// history entries once their slot reports Empty.
///
/// Holds at most one snapshot per slot: the last terminal, nonzero-fill
/// offer seen in that slot, pending acknowledgement via an Empty report.
#[derive(Debug, Default)]
pub struct OfferHistoryTracker {
    slots: [Option<OfferSnapshot>; SLOT_COUNT],
    entries: Vec<HistoryEntry>,
}

impl OfferHistoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one per-slot report from the poller.
    ///
    /// Terminal states with nonzero fill capture a snapshot (overwriting any
    /// pending one for the slot); Empty converts the pending snapshot, if
    /// any, into a history entry; in-progress states are ignored. Malformed
    /// input is rejected, never repaired.
    pub fn observe(
        &mut self,
        slot: usize,
        item: &ItemInfo,
        icon: IconHandle,
        offer: &OfferUpdate,
    ) -> Result<Observation, TrackerError> {
        if slot >= SLOT_COUNT {
            return Err(TrackerError::SlotOutOfRange(slot));
        }
        if offer.quantity_filled < 0 {
            return Err(TrackerError::NegativeQuantity(offer.quantity_filled));
        }
        if offer.price < 0 {
            return Err(TrackerError::NegativePrice(offer.price));
        }

        match offer.state {
            OfferState::Empty => {
                let Some(snapshot) = self.slots[slot].take() else {
                    return Ok(Observation::Idle);
                };
                // Side comes from the captured state, not the current Empty one.
                let side = side_for_state(snapshot.state)?;
                let entry = HistoryEntry {
                    side,
                    item: snapshot.item,
                    icon: snapshot.icon,
                    quantity: snapshot.quantity,
                    price: snapshot.price,
                    total: snapshot.price * snapshot.quantity,
                    timestamp_ms: now_ms(),
                };
                self.entries.push(entry.clone());
                Ok(Observation::Emitted(entry))
            }
            OfferState::Bought
            | OfferState::Sold
            | OfferState::CancelledBuy
            | OfferState::CancelledSell => {
                // Cancellations with nothing filled leave no trace in history.
                if offer.quantity_filled == 0 {
                    return Ok(Observation::Idle);
                }
                let overwrote = self.slots[slot].is_some();
                self.slots[slot] = Some(OfferSnapshot {
                    item: item.clone(),
                    icon,
                    quantity: offer.quantity_filled,
                    price: offer.price,
                    state: offer.state,
                });
                Ok(Observation::Captured { overwrote })
            }
            OfferState::Buying | OfferState::Selling => Ok(Observation::Idle),
        }
    }

    /// Clears all pending snapshots and the accumulated history. Called
    /// when the tracked account/session changes.
    pub fn reset(&mut self) {
        self.slots = Default::default();
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn pending_snapshots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
