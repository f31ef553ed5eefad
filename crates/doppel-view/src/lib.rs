//! doppel-view — carousel navigation state machine and card view-state.
//!
//! Consumes the normalized cards produced by `doppel-core` and keeps the
//! logical active index in permanent agreement with the host widget's
//! scroll offset, under explicit navigation, pointer scroll, and keyboard
//! input.

pub mod card;
pub mod carousel;
pub mod share;

pub use card::{CardView, ImageState};
pub use carousel::{CardLayout, Carousel, KeyDirection, Phase, ScrollSurface};
pub use share::{share_active, SharePayload};
