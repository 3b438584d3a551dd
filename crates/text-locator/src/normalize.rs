//! Canonical form used by the fallback tier
//!
//! NFKC folds full-width/half-width and compatibility variants, every
//! whitespace character is deleted (not collapsed) so wrapped or spaced
//! text compares equal, and the result is lower-cased.

use unicode_normalization::UnicodeNormalization;

/// Normalize text for containment checks. Idempotent.
pub fn normalize(text: &str) -> String {
    text.nfkc()
        .filter(|c| !is_separator(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Unicode whitespace plus the ASCII information separators (FS, GS, RS, US),
/// which PDF producers occasionally emit between words.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_width_folds_to_ascii() {
        assert_eq!(normalize("ＡＢＣ"), normalize("abc"));
        assert_eq!(normalize("０９０－１２３４"), "090-1234");
    }

    #[test]
    fn test_half_width_katakana_folds() {
        assert_eq!(normalize("ﾃｽﾄ"), normalize("テスト"));
    }

    #[test]
    fn test_internal_whitespace_removed() {
        assert_eq!(normalize("テスト です"), normalize("テストです"));
        assert_eq!(normalize("line\nwrapped\ttext"), "linewrappedtext");
        assert_eq!(normalize("全角\u{3000}スペース"), "全角スペース");
    }

    #[test]
    fn test_case_folded() {
        assert_eq!(normalize("Confidential"), "confidential");
    }

    #[test]
    fn test_whitespace_only_becomes_empty() {
        assert_eq!(normalize(" \t\u{3000}\n"), "");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn document_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ａ-ｚＡ-Ｚ０-９ぁ-んァ-ンｦ-ﾟ\u{3000}\t\n:.-]{0,40}"
    }

    proptest! {
        /// Property: normalizing twice changes nothing
        #[test]
        fn normalize_is_idempotent(text in document_text()) {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        /// Property: normalized output carries no whitespace
        #[test]
        fn normalize_strips_all_whitespace(text in document_text()) {
            prop_assert!(!normalize(&text).chars().any(char::is_whitespace));
        }

        /// Property: inserting spaces between characters does not change the result
        #[test]
        fn spacing_is_irrelevant(text in "[a-zぁ-ん0-9]{1,20}") {
            let spaced: String = text.chars().flat_map(|c| [c, ' ']).collect();
            prop_assert_eq!(normalize(&spaced), normalize(&text));
        }
    }
}
