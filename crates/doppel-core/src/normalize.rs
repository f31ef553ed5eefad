//! Match-record normalization.
//!
//! Collapses the heterogeneous wire shapes of [`RawMatchRecord`] into the
//! canonical [`NormalizedCard`] via one fixed priority chain per logical
//! attribute. Normalization is total: a well-formed-but-incomplete record
//! always produces a card with a non-empty image URL and display name.

use crate::resolver::{resolve, ResolverConfig};
use crate::types::{ImageCategory, NormalizedCard, RawMatchRecord, RawNumber};

const REGISTERED_LABEL: &str = "REGISTERED USER";
const UNCLAIMED_LABEL: &str = "UNCLAIMED PROFILE";
const REGISTERED_FALLBACK_NAME: &str = "Registered User";
const UNCLAIMED_FALLBACK_NAME: &str = "Unclaimed Profile";

/// Data-source values identifying the registered-users store.
const REGISTERED_SOURCES: [&str; 3] = ["users", "users_table", "registered_users"];
/// Basename prefix used by the upload pipeline for user-submitted photos.
const USER_UPLOAD_PREFIX: &str = "profile_";
/// Relationship strings allowed to override the derived label. Anything
/// else on the wire is treated as noise.
const RECOGNIZED_RELATIONSHIPS: [&str; 3] = ["FAMILY MATCH", "POSSIBLE RELATIVE", "SELF"];

/// Normalize one raw match record into a canonical card.
pub fn normalize(raw: &RawMatchRecord, config: &ResolverConfig) -> NormalizedCard {
    let image_ref = first_present(&[
        &raw.image_url,
        &raw.profile_pic,
        &raw.face_path,
        &raw.image_path,
        &raw.filename,
    ]);

    let category = if raw.is_self.as_ref().is_some_and(|f| f.is_truthy()) {
        ImageCategory::Profile
    } else {
        ImageCategory::Face
    };

    let is_registered = derive_registration(raw, image_ref);
    let id = card_id(raw, image_ref);
    let display_name = display_name(raw, is_registered, &id);

    NormalizedCard {
        image_url: resolve(image_ref, category, config),
        display_name,
        is_registered,
        label: card_label(is_registered, raw.relationship.as_deref()),
        similarity_percent: normalize_similarity(raw.similarity.as_ref()),
        location_tag: location_tag(raw.state.as_deref(), raw.decade.as_ref()),
        id,
    }
}

/// Normalize a whole batch. Applied atomically per search/sync response,
/// never merged incrementally.
pub fn normalize_batch(records: &[RawMatchRecord], config: &ResolverConfig) -> Vec<NormalizedCard> {
    let cards: Vec<NormalizedCard> = records.iter().map(|r| normalize(r, config)).collect();
    tracing::info!(count = cards.len(), "normalized match batch");
    cards
}

/// Disambiguate the similarity scale and round to an integer percentage.
///
/// Values at or below 1 are fractions; anything larger is already a
/// percentage. Absent or non-numeric input yields `None`, which must be
/// rendered as "no badge" rather than `0%`.
pub fn normalize_similarity(value: Option<&RawNumber>) -> Option<u8> {
    let v = value?.as_f64()?;
    let percent = if v <= 1.0 { v * 100.0 } else { v };
    Some(percent.round().clamp(0.0, 100.0) as u8)
}

/// Registration precedence, first match wins:
/// data-source marker → registered/claimed user id → explicit truthy
/// flag → user-upload filename prefix → false.
fn derive_registration(raw: &RawMatchRecord, image_ref: Option<&str>) -> bool {
    if let Some(source) = raw.data_source.as_deref() {
        if REGISTERED_SOURCES.contains(&source.trim().to_ascii_lowercase().as_str()) {
            return true;
        }
    }
    if non_empty(&raw.registered_user_id).is_some() || non_empty(&raw.claimed_by).is_some() {
        return true;
    }
    if raw.is_registered.as_ref().is_some_and(|f| f.is_truthy()) {
        return true;
    }
    if let Some(reference) = image_ref {
        let basename = reference.rsplit(['/', '\\']).next().unwrap_or(reference);
        if basename.starts_with(USER_UPLOAD_PREFIX) {
            return true;
        }
    }
    false
}

/// Derived label, with an explicit relationship string overriding the
/// default only when it is a recognized value.
fn card_label(is_registered: bool, relationship: Option<&str>) -> String {
    if let Some(rel) = relationship {
        let canon = rel.trim().to_ascii_uppercase();
        if RECOGNIZED_RELATIONSHIPS.contains(&canon.as_str()) {
            return canon;
        }
        if !canon.is_empty() {
            tracing::debug!(relationship = rel, "unrecognized relationship label ignored");
        }
    }
    if is_registered {
        REGISTERED_LABEL.to_string()
    } else {
        UNCLAIMED_LABEL.to_string()
    }
}

fn display_name(raw: &RawMatchRecord, is_registered: bool, id: &str) -> String {
    let from_fields = first_present(&[&raw.username, &raw.display_name, &raw.name]);
    match from_fields {
        Some(name) if is_registered && !name.starts_with('@') => format!("@{name}"),
        Some(name) => name.to_string(),
        None => {
            // No name on the wire: fall back to the literal id when the
            // source provided one, else a generic per claim state.
            if first_present(&[&raw.id, &raw.match_id, &raw.face_id]).is_some() {
                id.to_string()
            } else if is_registered {
                REGISTERED_FALLBACK_NAME.to_string()
            } else {
                UNCLAIMED_FALLBACK_NAME.to_string()
            }
        }
    }
}

/// Stable identity: source id when present, else a key synthesized from
/// the image basename or name fields. Deterministic for a given record.
fn card_id(raw: &RawMatchRecord, image_ref: Option<&str>) -> String {
    if let Some(id) = first_present(&[&raw.id, &raw.match_id, &raw.face_id]) {
        return id.to_string();
    }
    let seed = image_ref
        .map(|r| r.rsplit(['/', '\\']).next().unwrap_or(r))
        .filter(|b| !b.is_empty())
        .or_else(|| first_present(&[&raw.username, &raw.display_name, &raw.name]))
        .unwrap_or("unknown");
    format!("card-{}", slug(seed))
}

fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

/// "STATE, DECADEs" with graceful degradation to either component or the
/// empty string. The `s` suffix is added only to bare numeric decades.
fn location_tag(state: Option<&str>, decade: Option<&RawNumber>) -> String {
    let state = state.map(str::trim).filter(|s| !s.is_empty());
    let decade = decade.and_then(format_decade);
    match (state, decade) {
        (Some(s), Some(d)) => format!("{s}, {d}"),
        (Some(s), None) => s.to_string(),
        (None, Some(d)) => d,
        (None, None) => String::new(),
    }
}

fn format_decade(decade: &RawNumber) -> Option<String> {
    match decade {
        RawNumber::Num(n) if n.is_finite() => Some(format!("{}s", *n as i64)),
        RawNumber::Num(_) => None,
        RawNumber::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else if trimmed.parse::<i64>().is_ok() {
                Some(format!("{trimmed}s"))
            } else {
                // Already carries a unit ("1990s", "early 80s"): verbatim.
                Some(trimmed.to_string())
            }
        }
    }
}

/// First field in the chain holding a non-empty value.
fn first_present<'a>(fields: &[&'a Option<String>]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|f| f.as_deref())
        .map(str::trim)
        .find(|v| !v.is_empty())
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
