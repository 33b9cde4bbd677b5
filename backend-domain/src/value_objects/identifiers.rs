// Identifier value objects

use serde::{Deserialize, Serialize};

/// Every way an account can be named by a caller.
///
/// Early records are keyed by email, later ones by the identity provider UID,
/// so `key` is whichever of the two the record was stored under. Only the
/// identity resolver maps between the forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountIdentity {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AccountIdentity {
    pub fn new(key: impl Into<String>, uid: Option<String>, email: Option<String>) -> Self {
        Self {
            key: key.into(),
            uid,
            email: email.map(|value| value.trim().to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QrCodeId(pub String);

impl QrCodeId {
    /// Longest caller-supplied id; the rendered payload must still fit a QR symbol.
    pub const MAX_LEN: usize = 128;

    /// Accepts a caller-supplied id, trimmed.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let value = raw.trim();
        if value.is_empty() {
            return Err("qr_code_id must not be empty".to_string());
        }
        if value.chars().count() > Self::MAX_LEN {
            return Err(format!(
                "qr_code_id must be at most {} characters",
                Self::MAX_LEN
            ));
        }
        if value.chars().any(char::is_control) {
            return Err("qr_code_id must not contain control characters".to_string());
        }
        Ok(Self(value.to_string()))
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QrCodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_qr_ids_are_unique() {
        assert_ne!(QrCodeId::generate(), QrCodeId::generate());
    }

    #[test]
    fn parse_trims_and_bounds_length() {
        assert_eq!(QrCodeId::parse(" kayak-1 ").expect("valid").as_str(), "kayak-1");
        assert!(QrCodeId::parse(&"q".repeat(QrCodeId::MAX_LEN)).is_ok());
        let err = QrCodeId::parse(&"q".repeat(4000)).expect_err("too long");
        assert!(err.contains("at most"));
        assert!(QrCodeId::parse("a\nb").is_err());
    }
}
