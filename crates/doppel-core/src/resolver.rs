//! Image reference resolution.
//!
//! Match records reference images inconsistently: absolute URLs, paths
//! already under the static-asset subtree, bare filenames, or nothing at
//! all. [`resolve`] collapses every variant into one canonical, fetchable
//! URL. Resolution is total: every input, including `None` and the empty
//! string, yields a non-empty well-formed URL.

use crate::types::ImageCategory;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

// --- Named constants (no magic strings at call sites) ---
const DEFAULT_ASSET_ROOT: &str = "/static/";
const DEFAULT_PROFILE_PLACEHOLDER: &str = "/static/images/default_profile.png";
const DEFAULT_FACE_PLACEHOLDER: &str = "/static/images/default_face.png";
const ABSOLUTE_SCHEMES: [&str; 4] = ["http://", "https://", "data:", "blob:"];
/// Marker substrings mapped to asset subdirectories. Longest-match-first:
/// "extracted_faces" must be tested before "faces".
const SUBDIR_MARKERS: [&str; 4] = ["profile_pics", "extracted_faces", "faces", "images"];
const PROFILE_SUBDIR: &str = "profile_pics";
const FACE_SUBDIR: &str = "faces";

/// Characters escaped in the final path segment. Mirrors the set a
/// browser would escape in a path component; '%' is included so an
/// unencoded literal percent cannot produce a malformed escape.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'%');

/// Resolver configuration, passed explicitly to every call.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Root of the static-asset subtree, with trailing slash.
    pub asset_root: String,
    pub profile_placeholder: String,
    pub face_placeholder: String,
    /// Append a `?v=<millis>` parameter to freshly constructed asset
    /// URLs. Used for post-edit previews, where the browser caches the
    /// previous image aggressively.
    pub cache_bust: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            asset_root: DEFAULT_ASSET_ROOT.to_string(),
            profile_placeholder: DEFAULT_PROFILE_PLACEHOLDER.to_string(),
            face_placeholder: DEFAULT_FACE_PLACEHOLDER.to_string(),
            cache_bust: false,
        }
    }
}

impl ResolverConfig {
    fn placeholder(&self, category: ImageCategory) -> &str {
        match category {
            ImageCategory::Profile => &self.profile_placeholder,
            ImageCategory::Face => &self.face_placeholder,
        }
    }
}

/// Resolve a raw image reference into a canonical URL.
///
/// Rules, applied in order:
/// 1. empty/`None` → category placeholder;
/// 2. recognized absolute scheme → unchanged;
/// 3. already under the asset root → unchanged (no double-prefixing);
/// 4. otherwise re-prefix the basename under the subdirectory implied by
///    a marker substring in the reference, or the category default.
///
/// Idempotent on its own output: every constructed URL starts with the
/// asset root and passes through rule 3 on a second call.
pub fn resolve(
    reference: Option<&str>,
    category: ImageCategory,
    config: &ResolverConfig,
) -> String {
    let Some(raw) = reference.map(str::trim).filter(|r| !r.is_empty()) else {
        return config.placeholder(category).to_string();
    };

    if ABSOLUTE_SCHEMES.iter().any(|s| raw.starts_with(s)) {
        return raw.to_string();
    }

    if raw.starts_with(config.asset_root.as_str()) {
        return raw.to_string();
    }

    let basename = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw)
        .trim();
    if basename.is_empty() {
        tracing::debug!(reference = raw, "reference has no basename, using placeholder");
        return config.placeholder(category).to_string();
    }

    let subdir = subdir_for(raw, category);
    let encoded = utf8_percent_encode(basename, PATH_SEGMENT);
    let mut url = format!("{}{}/{}", config.asset_root, subdir, encoded);
    if config.cache_bust {
        url.push_str(&format!("?v={}", chrono::Utc::now().timestamp_millis()));
    }
    url
}

/// Pick the asset subdirectory for a reference: the first recognizable
/// marker substring wins, else the category's canonical subdirectory.
fn subdir_for(reference: &str, category: ImageCategory) -> &'static str {
    for marker in SUBDIR_MARKERS {
        if reference.contains(marker) {
            return marker;
        }
    }
    match category {
        ImageCategory::Profile => PROFILE_SUBDIR,
        ImageCategory::Face => FACE_SUBDIR,
    }
}
