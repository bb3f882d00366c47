use serde::{Deserialize, Serialize};

use cargodesk_core::{validate, DomainResult};

const MAX_STATUS_CHARS: usize = 64;

/// A free-form shipment status as entered by staff (`"In Transit"`, `"customs"`).
///
/// The label is stored as given (trimmed). [`StatusLabel::key`] gives the
/// normalized form used to pick message templates and compare statuses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatusLabel(String);

impl StatusLabel {
    pub fn parse(value: &str) -> DomainResult<Self> {
        Ok(Self(validate::bounded("status", value, MAX_STATUS_CHARS)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase key with spaces and hyphens folded to `_` (`"In-Transit"` → `in_transit`).
    pub fn key(&self) -> String {
        self.0
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|part| !part.is_empty())
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl TryFrom<String> for StatusLabel {
    type Error = cargodesk_core::DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StatusLabel> for String {
    fn from(value: StatusLabel) -> Self {
        value.0
    }
}

impl core::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn key_folds_case_and_separators() {
        let s = StatusLabel::parse("  Out-for  Delivery ").unwrap();
        assert_eq!(s.as_str(), "Out-for  Delivery");
        assert_eq!(s.key(), "out_for_delivery");
    }

    #[test]
    fn rejects_blank_and_overlong() {
        assert!(StatusLabel::parse("   ").is_err());
        assert!(StatusLabel::parse(&"x".repeat(65)).is_err());
    }

    #[test]
    fn key_ignores_formatting() {
        let a = StatusLabel::parse("in transit").unwrap();
        let b = StatusLabel::parse("IN_TRANSIT").unwrap();
        assert_eq!(a.key(), b.key());
    }

    proptest! {
        #[test]
        fn key_is_idempotent(s in "[A-Za-z][A-Za-z _-]{0,30}") {
            let label = StatusLabel::parse(&s).unwrap();
            let again = StatusLabel::parse(&label.key()).unwrap();
            prop_assert_eq!(again.key(), label.key());
        }
    }
}
