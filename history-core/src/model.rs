use serde::{Deserialize, Serialize};

pub type TimestampMs = i64;

/// Number of concurrent offer slots an account may hold open at once.
pub const SLOT_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferState {
    Empty,
    Buying,
    Selling,
    Bought,
    Sold,
    CancelledBuy,
    CancelledSell,
}

/// Which icon a finished trade gets in the history feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemInfo {
    pub id: u32,
    pub name: String,
}

/// Opaque reference to a loaded item icon. Resolved to pixels by the
/// presentation layer; the tracker only carries it through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IconHandle(pub u32);

/// One per-slot report from the game-state poller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OfferUpdate {
    pub state: OfferState,
    pub quantity_filled: i64,
    pub price: i64,
}

/// The last completed trade in a slot, held until the slot reports Empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OfferSnapshot {
    pub item: ItemInfo,
    pub icon: IconHandle,
    pub quantity: i64,
    pub price: i64,
    pub state: OfferState,
}

/// Display-ready record of a completed trade.
///
/// `timestamp_ms` is the wall-clock capture time, not the time the trade
/// actually finished.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub side: TradeSide,
    pub item: ItemInfo,
    pub icon: IconHandle,
    pub quantity: i64,
    pub price: i64,
    pub total: i64,
    pub timestamp_ms: TimestampMs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SlotEvent {
    Offer {
        slot: usize,
        item: ItemInfo,
        icon: IconHandle,
        offer: OfferUpdate,
    },
    SessionChanged,
}

pub fn now_ms() -> TimestampMs {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
