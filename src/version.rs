//! Program version and the static update notice.

use crate::core::RELEASES_URL;
use crate::i18n::{Catalog, Locale};

/// Version of this program.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the update notice. No request is made; the user is pointed at
/// the project page instead.
pub fn program_update_notice(locale: Locale) -> String {
    Catalog::format(
        locale,
        "program_update_notice",
        &[("version", VERSION.to_string())],
    )
}

/// Returns the about text.
pub fn about_text(locale: Locale) -> String {
    Catalog::format(locale, "about_text", &[("version", VERSION.to_string())])
}

/// Returns the release feed shown next to the update notice.
pub fn releases_url() -> &'static str {
    RELEASES_URL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_carries_version() {
        let notice = program_update_notice(Locale::En);
        assert!(notice.starts_with(&format!("Current version: {VERSION}")));
        assert!(program_update_notice(Locale::Pt).contains(VERSION));
    }

    #[test]
    fn test_about_text() {
        assert!(about_text(Locale::En).contains(&format!("v{VERSION}")));
    }
}
