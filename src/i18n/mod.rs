//! Display strings keyed by `(locale, key)`.
//!
//! Lookup falls back from the active locale to English and finally to the
//! key itself, so a missing translation never hides a message.

mod tables;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported display languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Portuguese.
    Pt,
}

impl Locale {
    /// All locales, in menu order.
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Pt];

    /// Parses a language code (`"en"`, `"pt"`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "pt" => Some(Self::Pt),
            _ => None,
        }
    }

    /// Returns the language code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Pt => "pt",
        }
    }

    /// Returns the language's own name.
    pub fn native_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Pt => "Português",
        }
    }

    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::En => tables::EN,
            Self::Pt => tables::PT,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Read-only access to the translation tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Catalog {
    /// Looks up `key` for `locale`, falling back to English, then to `key`.
    pub fn lookup<'a>(locale: Locale, key: &'a str) -> &'a str {
        find(locale.table(), key)
            .or_else(|| find(Locale::En.table(), key))
            .unwrap_or(key)
    }

    /// Looks up `key` and substitutes `{name}` placeholders.
    pub fn format(locale: Locale, key: &str, args: &[(&str, String)]) -> String {
        let mut text = Self::lookup(locale, key).to_string();
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

fn find(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, text)| *text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_locale_codes() {
        assert_eq!(Locale::from_code("pt"), Some(Locale::Pt));
        assert_eq!(Locale::from_code(" EN "), Some(Locale::En));
        assert_eq!(Locale::from_code("de"), None);
        for locale in Locale::ALL {
            assert_eq!(Locale::from_code(locale.code()), Some(locale));
        }
    }

    #[test]
    fn test_lookup_fallback_order() {
        assert_eq!(Catalog::lookup(Locale::Pt, "ready"), "Pronto");
        // Missing in pt, present in en.
        assert_eq!(
            Catalog::lookup(Locale::Pt, "installing_engine"),
            "Installing ClamAV..."
        );
        // Missing everywhere.
        assert_eq!(Catalog::lookup(Locale::Pt, "no_such_key"), "no_such_key");
    }

    #[test]
    fn test_format_placeholders() {
        let text = Catalog::format(Locale::En, "threats_found", &[("count", "3".into())]);
        assert_eq!(text, "3 infected file(s) found!");

        let about = Catalog::format(Locale::Pt, "about_text", &[("version", "3.0".into())]);
        assert!(about.starts_with("ClamAV GUI Pro v3.0"));
    }

    #[test]
    fn test_tables_have_unique_keys() {
        for locale in Locale::ALL {
            let mut seen = HashSet::new();
            for (key, _) in locale.table() {
                assert!(seen.insert(*key), "duplicate key {key} in {locale}");
            }
        }
    }

    #[test]
    fn test_every_translation_has_english_source() {
        for (key, _) in Locale::Pt.table() {
            assert!(find(Locale::En.table(), key).is_some(), "{key} missing in en");
        }
    }
}
