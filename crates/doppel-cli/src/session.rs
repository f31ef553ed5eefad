//! Results-view session actor.
//!
//! One task owns the carousel for the lifetime of a results view; every
//! mutation — batch loads and all three navigation triggers — arrives as
//! a [`SessionRequest`] over a single channel and is applied in order.
//! That single entry point is what rules out interleaved writes to the
//! active index.

use doppel_core::{normalize_batch, NormalizedCard, RawMatchRecord, ResolverConfig};
use doppel_view::{share_active, CardLayout, Carousel, KeyDirection, ScrollSurface, SharePayload};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session task exited")]
    ChannelClosed,
}

/// Messages sent from the CLI (or any host) to the session task.
enum SessionRequest {
    LoadBatch {
        records: Vec<RawMatchRecord>,
        reply: oneshot::Sender<usize>,
    },
    Next {
        reply: oneshot::Sender<Option<usize>>,
    },
    Previous {
        reply: oneshot::Sender<Option<usize>>,
    },
    GoTo {
        index: usize,
        reply: oneshot::Sender<Option<usize>>,
    },
    ScrollObserved {
        offset: f32,
        reply: oneshot::Sender<Option<usize>>,
    },
    Key {
        direction: KeyDirection,
        reply: oneshot::Sender<Option<usize>>,
    },
    ActiveCard {
        reply: oneshot::Sender<Option<NormalizedCard>>,
    },
    Share {
        reply: oneshot::Sender<Option<SharePayload>>,
    },
}

/// Clone-safe handle to the session task.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionRequest>,
}

impl SessionHandle {
    /// Replace the results with a new raw batch. Normalization happens
    /// inside the session, atomically for the whole batch. Returns the
    /// card count.
    pub async fn load_batch(&self, records: Vec<RawMatchRecord>) -> Result<usize, SessionError> {
        self.request(|reply| SessionRequest::LoadBatch { records, reply })
            .await
    }

    pub async fn next(&self) -> Result<Option<usize>, SessionError> {
        self.request(|reply| SessionRequest::Next { reply }).await
    }

    pub async fn previous(&self) -> Result<Option<usize>, SessionError> {
        self.request(|reply| SessionRequest::Previous { reply }).await
    }

    pub async fn go_to(&self, index: usize) -> Result<Option<usize>, SessionError> {
        self.request(|reply| SessionRequest::GoTo { index, reply })
            .await
    }

    pub async fn scroll_observed(&self, offset: f32) -> Result<Option<usize>, SessionError> {
        self.request(|reply| SessionRequest::ScrollObserved { offset, reply })
            .await
    }

    pub async fn key(&self, direction: KeyDirection) -> Result<Option<usize>, SessionError> {
        self.request(|reply| SessionRequest::Key { direction, reply })
            .await
    }

    pub async fn active_card(&self) -> Result<Option<NormalizedCard>, SessionError> {
        self.request(|reply| SessionRequest::ActiveCard { reply })
            .await
    }

    pub async fn share(&self) -> Result<Option<SharePayload>, SessionError> {
        self.request(|reply| SessionRequest::Share { reply }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SessionRequest,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        reply_rx.await.map_err(|_| SessionError::ChannelClosed)
    }
}

/// Headless scroll surface: tracks the offset a real widget would hold.
/// There is no animation, so every programmatic scroll settles as soon as
/// the request that issued it finishes.
#[derive(Default)]
struct HeadlessSurface {
    offset: f32,
}

impl ScrollSurface for HeadlessSurface {
    fn scroll_to(&mut self, offset: f32) {
        tracing::trace!(from = self.offset, to = offset, "headless scroll");
        self.offset = offset;
    }
}

/// Spawn the session task.
pub fn spawn_session(resolver: ResolverConfig, layout: CardLayout) -> SessionHandle {
    let (tx, mut rx) = mpsc::channel::<SessionRequest>(16);

    tokio::spawn(async move {
        tracing::info!("session task started");
        let mut carousel = Carousel::new(layout);
        let mut surface = HeadlessSurface::default();

        while let Some(req) = rx.recv().await {
            match req {
                SessionRequest::LoadBatch { records, reply } => {
                    let cards = normalize_batch(&records, &resolver);
                    let count = cards.len();
                    carousel.load_items(cards, &mut surface);
                    carousel.scroll_settled(carousel.generation());
                    let _ = reply.send(count);
                }
                SessionRequest::Next { reply } => {
                    let token = carousel.next(&mut surface);
                    settle(&mut carousel, token);
                    let _ = reply.send(carousel.active_index());
                }
                SessionRequest::Previous { reply } => {
                    let token = carousel.previous(&mut surface);
                    settle(&mut carousel, token);
                    let _ = reply.send(carousel.active_index());
                }
                SessionRequest::GoTo { index, reply } => {
                    let token = carousel.go_to(index, &mut surface);
                    settle(&mut carousel, token);
                    let _ = reply.send(carousel.active_index());
                }
                SessionRequest::ScrollObserved { offset, reply } => {
                    carousel.on_scroll_observed(offset);
                    let _ = reply.send(carousel.active_index());
                }
                SessionRequest::Key { direction, reply } => {
                    carousel.on_key(direction, &mut surface);
                    carousel.scroll_settled(carousel.generation());
                    let _ = reply.send(carousel.active_index());
                }
                SessionRequest::ActiveCard { reply } => {
                    let _ = reply.send(carousel.active_card().cloned());
                }
                SessionRequest::Share { reply } => {
                    let _ = reply.send(share_active(&carousel));
                }
            }
        }
        tracing::info!("session task exiting");
    });

    SessionHandle { tx }
}

/// Settle a just-issued headless scroll, if any.
fn settle(carousel: &mut Carousel, token: Option<u64>) {
    if let Some(token) = token {
        carousel.scroll_settled(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(json: &str) -> Vec<RawMatchRecord> {
        serde_json::from_str(json).unwrap()
    }

    fn three_matches() -> Vec<RawMatchRecord> {
        records(
            r#"[{"id": "a", "similarity": 0.9},
                {"id": "b", "similarity": 0.8},
                {"id": "c", "similarity": 0.7}]"#,
        )
    }

    #[tokio::test]
    async fn test_session_navigation_round_trip() {
        let handle = spawn_session(ResolverConfig::default(), CardLayout::default());
        assert_eq!(handle.load_batch(three_matches()).await.unwrap(), 3);

        assert_eq!(handle.next().await.unwrap(), Some(1));
        assert_eq!(handle.next().await.unwrap(), Some(2));
        // Wrap-around at the end.
        assert_eq!(handle.next().await.unwrap(), Some(0));
        assert_eq!(handle.previous().await.unwrap(), Some(2));

        let card = handle.active_card().await.unwrap().unwrap();
        assert_eq!(card.id, "c");
    }

    #[tokio::test]
    async fn test_session_empty_batch() {
        let handle = spawn_session(ResolverConfig::default(), CardLayout::default());
        assert_eq!(handle.load_batch(Vec::new()).await.unwrap(), 0);
        assert_eq!(handle.next().await.unwrap(), None);
        assert_eq!(handle.share().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_new_batch_resets_position() {
        let handle = spawn_session(ResolverConfig::default(), CardLayout::default());
        handle.load_batch(three_matches()).await.unwrap();
        handle.go_to(2).await.unwrap();

        handle
            .load_batch(records(r#"[{"id": "x"}]"#))
            .await
            .unwrap();
        assert_eq!(handle.active_card().await.unwrap().unwrap().id, "x");
        // Single item: navigation is a no-op, index stays in bounds.
        assert_eq!(handle.next().await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_session_scroll_and_key_triggers() {
        let layout = CardLayout::default();
        let handle = spawn_session(ResolverConfig::default(), layout);
        handle.load_batch(three_matches()).await.unwrap();

        let idx = handle.scroll_observed(2.0 * layout.stride()).await.unwrap();
        assert_eq!(idx, Some(2));
        assert_eq!(handle.key(KeyDirection::Right).await.unwrap(), Some(0));
    }
}
