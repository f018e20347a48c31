//! Upstream event shapes.
//!
//! Field names mirror the provider's wire format (`uniqueId`, `giftName`,
//! `diamondCount`, ...). Payloads are passed through as received; malformed
//! content is the provider's contract, not ours.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One upstream event, as a fixed enumerated variant set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum LiveEvent {
    /// Upstream handshake completed; carries the provider-reported room state.
    Connected { state: RoomState },
    /// Upstream connection ended (provider-side or after a local disconnect).
    Disconnected {
        #[serde(default)]
        reason: Option<String>,
    },
    /// Fatal upstream condition; the session will not recover on its own.
    Error { message: String },
    Chat(ChatEvent),
    Gift(GiftEvent),
    Like(LikeEvent),
}

/// Provider-reported room state at connect time.
///
/// Only `roomId` is interpreted; everything else the provider reports is
/// carried through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomState {
    #[serde(rename = "roomId", default)]
    pub room_id: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveUser {
    pub unique_id: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEvent {
    pub user: LiveUser,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftEvent {
    pub user: LiveUser,
    pub gift_name: String,
    pub repeat_count: u64,
    /// Per-unit gift value in coins.
    pub diamond_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeEvent {
    pub user: LiveUser,
    pub like_count: u64,
    pub total_like_count: u64,
}
