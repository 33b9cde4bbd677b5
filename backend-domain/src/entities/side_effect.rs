// Outcome of a secondary effect that must not fail the primary operation

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SideEffect {
    Applied,
    Skipped { reason: String },
    Failed { error: String },
}

impl SideEffect {
    pub fn skipped(reason: impl Into<String>) -> Self {
        SideEffect::Skipped {
            reason: reason.into(),
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        SideEffect::Failed {
            error: error.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SideEffect::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_status_tag() {
        let value = serde_json::to_value(SideEffect::skipped("no donor")).expect("serialize");
        assert_eq!(value["status"], "skipped");
        assert_eq!(value["reason"], "no donor");
        let applied = serde_json::to_value(SideEffect::Applied).expect("serialize");
        assert_eq!(applied["status"], "applied");
    }
}
