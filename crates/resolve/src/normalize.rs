//! Comparison keys for names.
//!
//! A key is lowercase, free of diacritics and has single spaces between words.
//! Keys are only compared, never shown to users.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a raw name into its comparison key.
///
/// Returns an empty string for empty or whitespace-only input; callers treat
/// that as "no name present".
pub fn normalize(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(normalize("João Silva"), "joao silva");
        assert_eq!(normalize("Élisé"), "elise");
        assert_eq!(normalize("  Maria  "), "maria");
    }

    #[test]
    fn accent_and_case_invariant() {
        assert_eq!(normalize("José"), normalize("JOSE"));
        assert_eq!(normalize("JOSE"), normalize("jose"));
        assert_eq!(normalize("JOSÉ"), "jose");
    }

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(normalize("Ana \t  Paula\n Souza"), "ana paula souza");
        // NBSP from spreadsheet exports
        assert_eq!(normalize("Ana\u{a0}Paula"), "ana paula");
    }

    #[test]
    fn blank_input_gives_empty_key() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n"), "");
    }

    #[test]
    fn cedilla_and_tilde() {
        assert_eq!(normalize("Conceição Araújo"), "conceicao araujo");
        assert_eq!(normalize("MUÑOZ"), "munoz");
    }

    proptest! {
        #[test]
        fn idempotent(s in "[a-zA-ZÀ-ÿ \t.'-]{0,40}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn never_has_edge_or_double_spaces(s in "[a-zA-ZÀ-ÿ \t]{0,40}") {
            let key = normalize(&s);
            prop_assert!(!key.starts_with(' '));
            prop_assert!(!key.ends_with(' '));
            prop_assert!(!key.contains("  "));
        }
    }
}
