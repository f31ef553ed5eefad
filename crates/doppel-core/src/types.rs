use serde::{Deserialize, Serialize};

/// Which asset pool an image reference belongs to.
///
/// Profile pictures are user uploads; face crops come from the archival
/// extraction pipeline. The category steers placeholder and subdirectory
/// defaults during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCategory {
    Profile,
    Face,
}

/// A numeric wire value that some endpoints serialize as a JSON number
/// and others as a numeric string ("0.83").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Num(f64),
    Text(String),
}

impl RawNumber {
    /// Numeric view of the value. Non-numeric strings yield `None`
    /// (treated downstream as "absent", never as an error).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Num(n) if n.is_finite() => Some(*n),
            RawNumber::Num(_) => None,
            RawNumber::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

/// A boolean-ish wire value: bool, string flag, or 0/1 number,
/// depending on which endpoint produced the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFlag {
    Bool(bool),
    Num(f64),
    Text(String),
}

impl RawFlag {
    pub fn is_truthy(&self) -> bool {
        match self {
            RawFlag::Bool(b) => *b,
            RawFlag::Num(n) => n.is_finite() && *n != 0.0,
            RawFlag::Text(s) => {
                matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "y")
            }
        }
    }
}

/// One raw match record as returned by the matching engine.
///
/// The shape varies by source endpoint: every field is optional and the
/// same logical attribute may arrive under several names. Unknown fields
/// are ignored. Normalization (see [`crate::normalize`]) collapses this
/// into a [`NormalizedCard`] via fixed per-attribute priority chains.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMatchRecord {
    // Identity
    pub id: Option<String>,
    pub match_id: Option<String>,
    pub face_id: Option<String>,

    // Image references, in descending priority
    pub image_url: Option<String>,
    pub profile_pic: Option<String>,
    pub face_path: Option<String>,
    pub image_path: Option<String>,
    pub filename: Option<String>,

    // Display name, in descending priority
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub name: Option<String>,

    // Similarity: fraction in [0,1] or percentage in [0,100]
    pub similarity: Option<RawNumber>,

    // Registration signals
    pub data_source: Option<String>,
    pub registered_user_id: Option<String>,
    pub claimed_by: Option<String>,
    pub is_registered: Option<RawFlag>,
    pub relationship: Option<String>,

    /// Set when the record represents the requesting user themselves.
    pub is_self: Option<RawFlag>,

    // Locale
    pub state: Option<String>,
    pub decade: Option<RawNumber>,
}

/// Canonical card view-model. Immutable once produced; the only
/// representation rendering and sharing ever see.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedCard {
    /// Stable identity; synthesized deterministically when the source
    /// record carries no identifier.
    pub id: String,
    /// Resolved, fetchable image URL. Never empty.
    pub image_url: String,
    /// Never empty; falls back to a category-appropriate default.
    pub display_name: String,
    pub is_registered: bool,
    pub label: String,
    /// Integer percentage in [0,100], or `None` when the source carried
    /// no usable similarity value. `None` must render as "no badge".
    pub similarity_percent: Option<u8>,
    /// "STATE, DECADEs" / single component / empty.
    pub location_tag: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_number_from_json_number() {
        let n: RawNumber = serde_json::from_str("0.83").unwrap();
        assert_eq!(n.as_f64(), Some(0.83));
    }

    #[test]
    fn test_raw_number_from_numeric_string() {
        let n: RawNumber = serde_json::from_str("\" 42.5 \"").unwrap();
        assert_eq!(n.as_f64(), Some(42.5));
    }

    #[test]
    fn test_raw_number_non_numeric_string() {
        let n: RawNumber = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(n.as_f64(), None);
    }

    #[test]
    fn test_raw_flag_truthiness() {
        assert!(RawFlag::Bool(true).is_truthy());
        assert!(RawFlag::Num(1.0).is_truthy());
        assert!(RawFlag::Text("Yes".into()).is_truthy());
        assert!(RawFlag::Text("1".into()).is_truthy());
        assert!(!RawFlag::Bool(false).is_truthy());
        assert!(!RawFlag::Num(0.0).is_truthy());
        assert!(!RawFlag::Num(f64::NAN).is_truthy());
        assert!(!RawFlag::Num(f64::INFINITY).is_truthy());
        assert!(!RawFlag::Text("no".into()).is_truthy());
        assert!(!RawFlag::Text("".into()).is_truthy());
    }

    #[test]
    fn test_record_ignores_unknown_fields() {
        let rec: RawMatchRecord = serde_json::from_str(
            r#"{"id": "m1", "similarity": "0.5", "ranking_debug": {"x": 1}}"#,
        )
        .unwrap();
        assert_eq!(rec.id.as_deref(), Some("m1"));
        assert_eq!(rec.similarity.unwrap().as_f64(), Some(0.5));
    }

    #[test]
    fn test_record_all_fields_optional() {
        let rec: RawMatchRecord = serde_json::from_str("{}").unwrap();
        assert!(rec.id.is_none());
        assert!(rec.similarity.is_none());
    }
}
