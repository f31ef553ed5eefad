//! Per-card view-state.
//!
//! The only state a rendered card owns is whether its image has loaded.
//! Everything displayable is derived from the [`NormalizedCard`].

use doppel_core::NormalizedCard;

/// Substituted when the resolved image fails to load. Kept distinct from
/// the resolver placeholders so a broken asset is visually identifiable.
const LOAD_ERROR_FALLBACK: &str = "/static/images/image_unavailable.png";
const LOADING_PLACEHOLDER: &str = "/static/images/loading.gif";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageState {
    #[default]
    Loading,
    Loaded,
    Failed,
}

/// Presentational wrapper around one normalized card.
#[derive(Debug, Clone)]
pub struct CardView {
    card: NormalizedCard,
    image_state: ImageState,
}

impl CardView {
    pub fn new(card: NormalizedCard) -> Self {
        Self {
            card,
            image_state: ImageState::Loading,
        }
    }

    pub fn card(&self) -> &NormalizedCard {
        &self.card
    }

    pub fn image_state(&self) -> ImageState {
        self.image_state
    }

    /// The host runtime reports image load completion here.
    pub fn on_image_loaded(&mut self) {
        self.image_state = ImageState::Loaded;
    }

    /// Load failures stay local to the card: swap in the fallback image,
    /// never propagate to the controller.
    pub fn on_image_error(&mut self) {
        tracing::debug!(card = %self.card.id, url = %self.card.image_url, "card image failed to load");
        self.image_state = ImageState::Failed;
    }

    /// URL the host should render right now.
    pub fn image_src(&self) -> &str {
        match self.image_state {
            ImageState::Loading => LOADING_PLACEHOLDER,
            ImageState::Loaded => &self.card.image_url,
            ImageState::Failed => LOAD_ERROR_FALLBACK,
        }
    }

    pub fn title(&self) -> &str {
        &self.card.display_name
    }

    /// Similarity badge text. `None` means "render no badge": an unknown
    /// similarity must never be shown as `0%`.
    pub fn badge_text(&self) -> Option<String> {
        self.card.similarity_percent.map(|p| format!("{p}%"))
    }

    /// Label line, with the location tag appended when present.
    pub fn subtitle(&self) -> String {
        if self.card.location_tag.is_empty() {
            self.card.label.clone()
        } else {
            format!("{} · {}", self.card.label, self.card.location_tag)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(similarity: Option<u8>) -> NormalizedCard {
        NormalizedCard {
            id: "m1".into(),
            image_url: "/static/faces/a.jpg".into(),
            display_name: "John Doe".into(),
            is_registered: false,
            label: "UNCLAIMED PROFILE".into(),
            similarity_percent: similarity,
            location_tag: "OR, 1985s".into(),
        }
    }

    #[test]
    fn test_image_lifecycle() {
        let mut view = CardView::new(card(Some(91)));
        assert_eq!(view.image_src(), LOADING_PLACEHOLDER);
        view.on_image_loaded();
        assert_eq!(view.image_src(), "/static/faces/a.jpg");
    }

    #[test]
    fn test_load_error_substitutes_fallback() {
        let mut view = CardView::new(card(None));
        view.on_image_error();
        assert_eq!(view.image_state(), ImageState::Failed);
        assert_eq!(view.image_src(), LOAD_ERROR_FALLBACK);
    }

    #[test]
    fn test_unknown_similarity_renders_no_badge() {
        assert_eq!(CardView::new(card(None)).badge_text(), None);
        assert_eq!(
            CardView::new(card(Some(91))).badge_text(),
            Some("91%".to_string())
        );
        // 0 is a real measurement and does get a badge.
        assert_eq!(
            CardView::new(card(Some(0))).badge_text(),
            Some("0%".to_string())
        );
    }

    #[test]
    fn test_subtitle_joins_label_and_location() {
        let view = CardView::new(card(None));
        assert_eq!(view.subtitle(), "UNCLAIMED PROFILE · OR, 1985s");

        let mut bare = card(None);
        bare.location_tag = String::new();
        assert_eq!(CardView::new(bare).subtitle(), "UNCLAIMED PROFILE");
    }
}
