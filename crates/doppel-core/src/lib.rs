//! doppel-core — match-record normalization and image reference resolution.
//!
//! Turns the heterogeneous match records returned by the face-matching
//! engine into canonical, rendering-ready card view-models. Pure in-memory
//! transformation; the only side effect is reading a clock for cache-bust
//! parameters.

pub mod batch;
pub mod normalize;
pub mod resolver;
pub mod types;

pub use batch::{parse_batch, BatchError};
pub use normalize::{normalize, normalize_batch, normalize_similarity};
pub use resolver::{resolve, ResolverConfig};
pub use types::{ImageCategory, NormalizedCard, RawMatchRecord};
