//! Fallback tier: normalized containment, one span at a time
//!
//! Runs only after the direct tier missed a page. The page-level check is a
//! cheap short-circuit; positions come from individual spans. A target split
//! across two spans passes the first step and matches no span. That outcome
//! is kept as-is: such items are reported as not found.

use crate::backend::TextPage;
use crate::layout::Rect;
use crate::normalize::normalize;

/// What the fallback tier saw on one page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FallbackOutcome {
    /// The normalized page text contains the normalized target
    pub page_contains: bool,
    /// Boxes of the spans whose normalized text contains the target
    pub rects: Vec<Rect>,
}

/// `normalized_target` must already be the output of [`normalize`].
pub fn match_spans<P: TextPage + ?Sized>(page: &P, normalized_target: &str) -> FallbackOutcome {
    // Everything contains the empty string; a whitespace-only target has
    // no meaningful span to point at.
    if normalized_target.is_empty() {
        return FallbackOutcome::default();
    }

    if !normalize(&page.plain_text()).contains(normalized_target) {
        return FallbackOutcome::default();
    }

    let rects = page
        .blocks()
        .iter()
        .flat_map(|block| block.lines.iter())
        .flat_map(|line| line.spans.iter())
        .filter(|span| normalize(&span.text).contains(normalized_target))
        .map(|span| span.bbox)
        .collect();

    FallbackOutcome {
        page_contains: true,
        rects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PageLayout, TextBlock, TextLine, TextSpan};

    fn page(lines: &[&[(&str, Rect)]]) -> PageLayout {
        let lines = lines
            .iter()
            .map(|spans| {
                TextLine::new(spans.iter().map(|(t, r)| TextSpan::uniform(t, *r)).collect())
            })
            .collect();
        PageLayout::new(600.0, 800.0, vec![TextBlock::new(lines)])
    }

    #[test]
    fn test_full_width_span_matches() {
        let bbox = Rect::new(10.0, 10.0, 200.0, 24.0);
        let p = page(&[&[("電話 ０９０－１２３４－５６７８", bbox)]]);
        let outcome = match_spans(&p, &normalize("090-1234-5678"));
        assert!(outcome.page_contains);
        assert_eq!(outcome.rects, vec![bbox]);
    }

    #[test]
    fn test_absent_target_short_circuits() {
        let p = page(&[&[("nothing here", Rect::new(0.0, 0.0, 10.0, 10.0))]]);
        assert_eq!(match_spans(&p, "secret"), FallbackOutcome::default());
    }

    #[test]
    fn test_split_across_lines_reports_nothing() {
        let p = page(&[
            &[("契約解除の", Rect::new(10.0, 10.0, 100.0, 22.0))],
            &[("通知期間", Rect::new(10.0, 24.0, 90.0, 36.0))],
        ]);
        let outcome = match_spans(&p, &normalize("解除の通知"));
        assert!(outcome.page_contains);
        assert!(outcome.rects.is_empty());
    }

    #[test]
    fn test_every_containing_span_reported() {
        let a = Rect::new(10.0, 10.0, 100.0, 22.0);
        let b = Rect::new(10.0, 30.0, 60.0, 42.0);
        let p = page(&[&[("Total Fee", a)], &[("fee", b)]]);
        let outcome = match_spans(&p, "fee");
        assert_eq!(outcome.rects, vec![a, b]);
    }

    #[test]
    fn test_empty_target_never_matches() {
        let p = page(&[&[("abc", Rect::new(0.0, 0.0, 10.0, 10.0))]]);
        assert_eq!(match_spans(&p, ""), FallbackOutcome::default());
    }
}
