//! Carousel navigation state machine.
//!
//! Owns the normalized card list, the logical active index, and the
//! relationship between that index and the scroll offset of the host
//! widget. Three independent triggers mutate the state — explicit
//! navigation, observed pointer scroll, and keyboard — and all of them
//! funnel through `&mut self` methods, so writes to the active index are
//! serialized by construction.
//!
//! The feedback-loop hazard: a programmatic scroll produces scroll events
//! which, naively interpreted, would re-derive the index and issue another
//! corrective scroll. The [`Phase::Navigating`] state breaks the loop:
//! while a programmatic scroll is in flight, observed offsets are ignored,
//! and the phase is only left via [`Carousel::scroll_settled`] carrying
//! the matching navigation token.

use doppel_core::NormalizedCard;

/// Card geometry used to convert between index and scroll offset.
#[derive(Debug, Clone, Copy)]
pub struct CardLayout {
    pub card_width: f32,
    pub gap: f32,
}

impl CardLayout {
    /// Distance between the left edges of adjacent cards.
    /// Floored at 1 so degenerate geometry cannot divide by zero.
    pub fn stride(&self) -> f32 {
        (self.card_width + self.gap).max(1.0)
    }
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            card_width: 280.0,
            gap: 16.0,
        }
    }
}

/// Where the controller is in its scroll/navigation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No items; every navigation operation is a no-op.
    Empty,
    /// Items present, no programmatic scroll in flight. Observed scroll
    /// offsets drive the active index.
    Idle,
    /// A programmatic scroll toward `target` is in flight. Observed
    /// offsets are ignored until the matching settle arrives.
    Navigating { target: usize },
}

/// Seam to the host scrolling widget. The controller calls this on
/// programmatic navigation; it never reads the surface back — position
/// feedback arrives through [`Carousel::on_scroll_observed`].
pub trait ScrollSurface {
    fn scroll_to(&mut self, offset: f32);
}

/// Keyboard navigation directions forwarded by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Left,
    Right,
}

/// The carousel controller. One instance per results view.
#[derive(Debug)]
pub struct Carousel {
    items: Vec<NormalizedCard>,
    active: Option<usize>,
    phase: Phase,
    /// Navigation token, bumped on every batch load and programmatic
    /// scroll. A settle callback carrying an older token is stale and
    /// must not mutate state.
    generation: u64,
    layout: CardLayout,
}

impl Carousel {
    pub fn new(layout: CardLayout) -> Self {
        Self {
            items: Vec::new(),
            active: None,
            phase: Phase::Empty,
            generation: 0,
            layout,
        }
    }

    pub fn items(&self) -> &[NormalizedCard] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Logical position; `None` exactly when the list is empty.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_card(&self) -> Option<&NormalizedCard> {
        self.active.and_then(|i| self.items.get(i))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current navigation token. A host driving a scroll animation passes
    /// this back through [`scroll_settled`](Self::scroll_settled).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Scroll offset that left-aligns the given index.
    pub fn offset_for(&self, index: usize) -> f32 {
        index as f32 * self.layout.stride()
    }

    /// Replace the item list with a freshly normalized batch.
    ///
    /// Resets the active index to 0 (or clears it for an empty batch) and
    /// snaps the surface back to the origin. Bumping the token here is
    /// what supersedes any scroll animation still in flight from the
    /// previous batch: its settle will arrive with an old token and be
    /// discarded.
    pub fn load_items<S: ScrollSurface>(&mut self, items: Vec<NormalizedCard>, surface: &mut S) {
        self.generation += 1;
        self.items = items;
        if self.items.is_empty() {
            self.active = None;
            self.phase = Phase::Empty;
            tracing::info!(generation = self.generation, "loaded empty batch");
        } else {
            self.active = Some(0);
            self.phase = Phase::Navigating { target: 0 };
            surface.scroll_to(0.0);
            tracing::info!(
                generation = self.generation,
                count = self.items.len(),
                "loaded batch"
            );
        }
    }

    /// Navigate to an index, clamped to the list bounds. Returns the
    /// navigation token when a scroll was issued, `None` on no-op.
    pub fn go_to<S: ScrollSurface>(&mut self, index: usize, surface: &mut S) -> Option<u64> {
        if self.items.is_empty() {
            return None;
        }
        let clamped = index.min(self.items.len() - 1);
        if self.active == Some(clamped) {
            return None;
        }
        self.generation += 1;
        self.active = Some(clamped);
        self.phase = Phase::Navigating { target: clamped };
        surface.scroll_to(self.offset_for(clamped));
        tracing::debug!(index = clamped, generation = self.generation, "go_to");
        Some(self.generation)
    }

    /// Advance one card, wrapping from the last index back to 0.
    /// No-op for lists of one (no wrap against self) or zero items.
    pub fn next<S: ScrollSurface>(&mut self, surface: &mut S) -> Option<u64> {
        let (current, len) = (self.active?, self.items.len());
        if len <= 1 {
            return None;
        }
        self.go_to((current + 1) % len, surface)
    }

    /// Step back one card, wrapping from 0 to the last index.
    pub fn previous<S: ScrollSurface>(&mut self, surface: &mut S) -> Option<u64> {
        let (current, len) = (self.active?, self.items.len());
        if len <= 1 {
            return None;
        }
        self.go_to((current + len - 1) % len, surface)
    }

    /// Feed one observed scroll offset from the host surface.
    ///
    /// User-driven scrolling only: while a programmatic scroll is in
    /// flight the intermediate offsets it produces are ignored, which is
    /// what keeps a `go_to` from being re-interpreted as a user scroll
    /// needing its own corrective `go_to`.
    pub fn on_scroll_observed(&mut self, offset: f32) {
        if self.items.is_empty() {
            return;
        }
        if let Phase::Navigating { target } = self.phase {
            tracing::trace!(offset, target, "scroll observed during navigation, ignored");
            return;
        }
        let candidate = (offset / self.layout.stride()).round();
        let candidate = (candidate.max(0.0) as usize).min(self.items.len() - 1);
        if self.active != Some(candidate) {
            tracing::debug!(index = candidate, offset, "active index follows user scroll");
            self.active = Some(candidate);
        }
    }

    /// Arrow-key navigation. Ignored unless there is something to move
    /// between.
    pub fn on_key<S: ScrollSurface>(&mut self, direction: KeyDirection, surface: &mut S) {
        if self.items.len() <= 1 {
            return;
        }
        match direction {
            KeyDirection::Left => self.previous(surface),
            KeyDirection::Right => self.next(surface),
        };
    }

    /// Completion callback for a programmatic scroll. A token from a
    /// superseded batch or an older navigation is discarded.
    pub fn scroll_settled(&mut self, token: u64) {
        if token != self.generation {
            tracing::warn!(
                token,
                current = self.generation,
                "stale scroll settle discarded"
            );
            return;
        }
        if matches!(self.phase, Phase::Navigating { .. }) {
            self.phase = Phase::Idle;
        }
    }
}
