//! Pure mappings from upstream content events to outbound messages.
//!
//! Translation never fails: well-formed upstream events always produce a
//! message, and upstream payload content is passed through as received.

use crate::relay::message::OutboundMessage;
use crate::upstream::{ChatEvent, GiftEvent, LikeEvent, LiveUser};

/// Display name shown to viewers: the nickname when present and non-empty,
/// otherwise the sender's unique identifier.
#[must_use]
pub fn display_name(user: &LiveUser) -> &str {
    user.nickname
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(&user.unique_id)
}

#[must_use]
pub fn chat_message(event: &ChatEvent) -> OutboundMessage {
    OutboundMessage::ChatMessage {
        user_id: event.user.unique_id.clone(),
        display_name: display_name(&event.user).to_string(),
        comment: event.comment.clone(),
    }
}

/// Gift translation derives `total_value = diamond_count × repeat_count` and
/// composes the viewer-facing summary line. The summary format is
/// compatibility-critical for existing display surfaces; do not reword it.
#[must_use]
pub fn gift_message(event: &GiftEvent) -> OutboundMessage {
    let display_name = display_name(&event.user).to_string();
    let total_value = event.diamond_count.saturating_mul(event.repeat_count);
    let summary = format!(
        "{display_name} sent {gift_name} x{repeat_count} (Total: {total_value} coins)",
        gift_name = event.gift_name,
        repeat_count = event.repeat_count,
    );

    OutboundMessage::GiftMessage {
        user_id: event.user.unique_id.clone(),
        display_name,
        gift_name: event.gift_name.clone(),
        repeat_count: event.repeat_count,
        diamond_count: event.diamond_count,
        total_value,
        summary,
    }
}

#[must_use]
pub fn like_message(event: &LikeEvent) -> OutboundMessage {
    OutboundMessage::LikeMessage {
        user_id: event.user.unique_id.clone(),
        display_name: display_name(&event.user).to_string(),
        like_count: event.like_count,
        total_like_count: event.total_like_count,
    }
}
