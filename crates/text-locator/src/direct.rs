//! Direct tier: the backend's exact search, no normalization
//!
//! Machine-generated documents usually store the literal verbatim, and
//! matching it as-is avoids false positives from aggressive folding.

use crate::backend::TextPage;
use crate::layout::Rect;

pub fn match_exact<P: TextPage + ?Sized>(page: &P, literal: &str) -> Vec<Rect> {
    page.search_exact(literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PageLayout, TextBlock, TextLine, TextSpan};

    fn page(text: &str) -> PageLayout {
        PageLayout::new(
            595.0,
            842.0,
            vec![TextBlock::new(vec![TextLine::new(vec![TextSpan::uniform(
                text,
                Rect::new(50.0, 100.0, 250.0, 112.0),
            )])])],
        )
    }

    #[test]
    fn test_literal_found() {
        let hits = match_exact(&page("連絡先: 090-1234-5678"), "090-1234-5678");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_width_variant_not_folded() {
        assert!(match_exact(&page("０９０-1234"), "090-1234").is_empty());
    }

    #[test]
    fn test_spaced_text_not_matched() {
        assert!(match_exact(&page("テスト です"), "テストです").is_empty());
    }
}
