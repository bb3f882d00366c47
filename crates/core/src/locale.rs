//! Message locale preference.

use serde::{Deserialize, Serialize};

/// Languages the customer-facing messages are written in.
///
/// Deserialization is lenient like [`Locale::parse_tag`]: `"es-MX"` reads as
/// `es` and an unsupported tag falls back to the default.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    /// Lenient parse: accepts tags like `es-MX` or `EN_us`; unknown tags yield `None`.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "es" => Some(Locale::Es),
            _ => None,
        }
    }

    /// Parse with a fallback for unknown or missing tags.
    pub fn parse_or(tag: Option<&str>, fallback: Locale) -> Self {
        tag.and_then(Self::parse_tag).unwrap_or(fallback)
    }
}

impl From<String> for Locale {
    fn from(tag: String) -> Self {
        Self::parse_or(Some(&tag), Locale::default())
    }
}

impl core::fmt::Display for Locale {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_tags() {
        assert_eq!(Locale::parse_tag("es-MX"), Some(Locale::Es));
        assert_eq!(Locale::parse_tag("EN_us"), Some(Locale::En));
        assert_eq!(Locale::parse_tag("fr"), None);
    }

    #[test]
    fn falls_back_for_unknown_tags() {
        assert_eq!(Locale::parse_or(Some("de"), Locale::Es), Locale::Es);
        assert_eq!(Locale::parse_or(None, Locale::En), Locale::En);
    }

    #[test]
    fn deserializes_leniently_and_serializes_lowercase() {
        let parsed: Vec<Locale> = serde_json::from_str(r#"["es-MX", "ES", "en_US", "fr"]"#).unwrap();
        assert_eq!(parsed, vec![Locale::Es, Locale::Es, Locale::En, Locale::En]);
        assert_eq!(serde_json::to_string(&Locale::Es).unwrap(), r#""es""#);
    }
}
