//! Partial visitor identity attached to events

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Visitor identity fields
///
/// Every field is optional and none is required to be non-empty. Absent
/// fields are omitted from the wire shape, never written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl UserData {
    /// True when no identity field is present
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.phone.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.country.is_none()
    }

    /// Normalised, SHA-256 hashed identifiers keyed by the ad platform's match keys
    ///
    /// Values are trimmed and lowercased before hashing; phone numbers keep
    /// digits only. Fields that normalise to an empty string are skipped.
    pub fn hashed(&self) -> BTreeMap<&'static str, String> {
        let mut out = BTreeMap::new();

        let fields: [(&'static str, &Option<String>, fn(&str) -> String); 5] = [
            ("em", &self.email, normalize_text),
            ("ph", &self.phone, normalize_phone),
            ("fn", &self.first_name, normalize_text),
            ("ln", &self.last_name, normalize_text),
            ("country", &self.country, normalize_text),
        ];

        for (key, value, normalize) in fields {
            if let Some(raw) = value {
                let normalized = normalize(raw);
                if !normalized.is_empty() {
                    out.insert(key, format!("{:x}", Sha256::digest(normalized.as_bytes())));
                }
            }
        }

        out
    }
}

fn normalize_text(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
