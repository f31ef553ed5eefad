use doppel_core::ResolverConfig;
use doppel_view::CardLayout;

/// Runtime configuration, loaded from environment variables.
pub struct Config {
    /// Root of the static-asset subtree.
    pub asset_root: String,
    pub profile_placeholder: String,
    pub face_placeholder: String,
    /// Append cache-bust parameters to constructed asset URLs.
    pub cache_bust: bool,
    /// Card width in pixels, for index/offset conversion.
    pub card_width: f32,
    /// Gap between cards in pixels.
    pub card_gap: f32,
}

impl Config {
    /// Load configuration from `DOPPEL_*` environment variables with
    /// defaults matching the production asset layout.
    pub fn from_env() -> Self {
        let base = ResolverConfig::default();
        let layout = CardLayout::default();
        Self {
            asset_root: env_string("DOPPEL_ASSET_ROOT", &base.asset_root),
            profile_placeholder: env_string(
                "DOPPEL_PROFILE_PLACEHOLDER",
                &base.profile_placeholder,
            ),
            face_placeholder: env_string("DOPPEL_FACE_PLACEHOLDER", &base.face_placeholder),
            cache_bust: env_bool("DOPPEL_CACHE_BUST", false),
            card_width: env_f32("DOPPEL_CARD_WIDTH", layout.card_width),
            card_gap: env_f32("DOPPEL_CARD_GAP", layout.gap),
        }
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            asset_root: self.asset_root.clone(),
            profile_placeholder: self.profile_placeholder.clone(),
            face_placeholder: self.face_placeholder.clone(),
            cache_bust: self.cache_bust,
        }
    }

    pub fn card_layout(&self) -> CardLayout {
        CardLayout {
            card_width: self.card_width,
            gap: self.card_gap,
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names: the process environment is
    // shared across concurrently running tests.

    #[test]
    fn test_env_string_unset_and_set() {
        std::env::remove_var("DOPPEL_TEST_STR_UNSET");
        assert_eq!(env_string("DOPPEL_TEST_STR_UNSET", "/static/"), "/static/");

        std::env::set_var("DOPPEL_TEST_STR_SET", "/assets/");
        assert_eq!(env_string("DOPPEL_TEST_STR_SET", "/static/"), "/assets/");
        std::env::remove_var("DOPPEL_TEST_STR_SET");
    }

    #[test]
    fn test_env_f32_unset_unparsable_and_valid() {
        std::env::remove_var("DOPPEL_TEST_F32_UNSET");
        assert_eq!(env_f32("DOPPEL_TEST_F32_UNSET", 280.0), 280.0);

        std::env::set_var("DOPPEL_TEST_F32_BAD", "abc");
        assert_eq!(env_f32("DOPPEL_TEST_F32_BAD", 280.0), 280.0);
        std::env::remove_var("DOPPEL_TEST_F32_BAD");

        std::env::set_var("DOPPEL_TEST_F32_OK", "320.5");
        assert_eq!(env_f32("DOPPEL_TEST_F32_OK", 280.0), 320.5);
        std::env::remove_var("DOPPEL_TEST_F32_OK");
    }

    #[test]
    fn test_env_bool_unset_unparsable_and_valid() {
        std::env::remove_var("DOPPEL_TEST_BOOL_UNSET");
        assert!(!env_bool("DOPPEL_TEST_BOOL_UNSET", false));

        std::env::set_var("DOPPEL_TEST_BOOL_BAD", "maybe");
        assert!(!env_bool("DOPPEL_TEST_BOOL_BAD", false));
        std::env::remove_var("DOPPEL_TEST_BOOL_BAD");

        for truthy in ["1", "true", "TRUE"] {
            std::env::set_var("DOPPEL_TEST_BOOL_OK", truthy);
            assert!(env_bool("DOPPEL_TEST_BOOL_OK", false), "{truthy} should enable");
        }
        std::env::remove_var("DOPPEL_TEST_BOOL_OK");
    }

    #[test]
    fn test_from_env_defaults_match_library_defaults() {
        for key in [
            "DOPPEL_ASSET_ROOT",
            "DOPPEL_PROFILE_PLACEHOLDER",
            "DOPPEL_FACE_PLACEHOLDER",
            "DOPPEL_CACHE_BUST",
            "DOPPEL_CARD_WIDTH",
            "DOPPEL_CARD_GAP",
        ] {
            std::env::remove_var(key);
        }
        let config = Config::from_env();
        let base = ResolverConfig::default();
        let layout = CardLayout::default();
        assert_eq!(config.asset_root, base.asset_root);
        assert_eq!(config.profile_placeholder, base.profile_placeholder);
        assert_eq!(config.face_placeholder, base.face_placeholder);
        assert!(!config.cache_bust);
        assert_eq!(config.card_width, layout.card_width);
        assert_eq!(config.card_gap, layout.gap);
    }
}
