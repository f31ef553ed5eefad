//! Share payload for the feed-posting collaborator.

use crate::carousel::Carousel;
use serde::Serialize;

/// Identifying fields of the active card, forwarded as a plain payload
/// when the user shares a match to the feed. The feed backend itself is
/// an external collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharePayload {
    pub image_url: String,
    pub display_name: String,
    pub similarity_percent: Option<u8>,
}

/// Build the share payload for the carousel's active card.
/// `None` when there is nothing to share (empty results view).
pub fn share_active(carousel: &Carousel) -> Option<SharePayload> {
    let card = carousel.active_card()?;
    Some(SharePayload {
        image_url: card.image_url.clone(),
        display_name: card.display_name.clone(),
        similarity_percent: card.similarity_percent,
    })
}
