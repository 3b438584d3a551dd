//! Per-(item, page) matching as an explicit state progression
//!
//! ```text
//! Untried ──direct hit──────────────────────────────▶ Matched(Direct)
//!    │
//!    └─direct miss─▶ DirectMiss ──fallback disabled──▶ Unmatched
//!                        │
//!                        └─▶ FallbackChecked ──spans──▶ Matched(Fallback)
//!                                   │
//!                                   └─no span─────────▶ Unmatched
//! ```

use crate::backend::TextPage;
use crate::direct;
use crate::fallback;
use crate::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Direct,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeState {
    Untried,
    DirectMiss,
    FallbackChecked {
        page_contains: bool,
        rects: Vec<Rect>,
    },
    Matched {
        tier: MatchTier,
        rects: Vec<Rect>,
    },
    Unmatched {
        /// The normalized page text contained the target but no single span
        /// did: the target is most likely split across spans.
        split_suspected: bool,
    },
}

impl ProbeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProbeState::Matched { .. } | ProbeState::Unmatched { .. })
    }

    /// Rectangles found, empty unless matched
    pub fn into_rects(self) -> Vec<Rect> {
        match self {
            ProbeState::Matched { rects, .. } => rects,
            _ => Vec::new(),
        }
    }
}

/// Drives one search target through the tiers on one page
pub struct PageProbe<'a, P: TextPage + ?Sized> {
    page: &'a P,
    literal: &'a str,
    normalized: &'a str,
    fallback_enabled: bool,
    state: ProbeState,
}

impl<'a, P: TextPage + ?Sized> PageProbe<'a, P> {
    /// `normalized` is the target after [`crate::normalize`], computed once per item.
    pub fn new(page: &'a P, literal: &'a str, normalized: &'a str, fallback_enabled: bool) -> Self {
        Self {
            page,
            literal,
            normalized,
            fallback_enabled,
            state: ProbeState::Untried,
        }
    }

    pub fn state(&self) -> &ProbeState {
        &self.state
    }

    /// Advance by one transition. Terminal states do not move.
    pub fn step(&mut self) {
        let current = std::mem::replace(&mut self.state, ProbeState::Untried);
        self.state = match current {
            ProbeState::Untried => {
                let rects = direct::match_exact(self.page, self.literal);
                if rects.is_empty() {
                    ProbeState::DirectMiss
                } else {
                    ProbeState::Matched {
                        tier: MatchTier::Direct,
                        rects,
                    }
                }
            }
            ProbeState::DirectMiss if !self.fallback_enabled => ProbeState::Unmatched {
                split_suspected: false,
            },
            ProbeState::DirectMiss => {
                let outcome = fallback::match_spans(self.page, self.normalized);
                ProbeState::FallbackChecked {
                    page_contains: outcome.page_contains,
                    rects: outcome.rects,
                }
            }
            ProbeState::FallbackChecked {
                page_contains,
                rects,
            } => {
                if rects.is_empty() {
                    ProbeState::Unmatched {
                        split_suspected: page_contains,
                    }
                } else {
                    ProbeState::Matched {
                        tier: MatchTier::Fallback,
                        rects,
                    }
                }
            }
            terminal => terminal,
        };
    }

    /// Step until a terminal state is reached
    pub fn run(mut self) -> ProbeState {
        while !self.state.is_terminal() {
            self.step();
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PageLayout, TextBlock, TextLine, TextSpan};
    use crate::normalize::normalize;

    fn page(lines: &[&str]) -> PageLayout {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let y = 20.0 * i as f64;
                TextLine::new(vec![TextSpan::uniform(text, Rect::new(10.0, y, 200.0, y + 12.0))])
            })
            .collect();
        PageLayout::new(612.0, 792.0, vec![TextBlock::new(lines)])
    }

    fn probe(page: &PageLayout, target: &str, fallback: bool) -> Vec<ProbeState> {
        let normalized = normalize(target);
        let mut probe = PageProbe::new(page, target, &normalized, fallback);
        let mut states = vec![probe.state().clone()];
        while !probe.state().is_terminal() {
            probe.step();
            states.push(probe.state().clone());
        }
        states
    }

    #[test]
    fn test_direct_hit_is_one_step() {
        let states = probe(&page(&["Deposit: $500"]), "$500", true);
        assert_eq!(states.len(), 2);
        assert!(matches!(
            states[1],
            ProbeState::Matched {
                tier: MatchTier::Direct,
                ..
            }
        ));
    }

    #[test]
    fn test_fallback_hit_walks_every_state() {
        let states = probe(&page(&["ＰＥＮＡＬＴＹ clause"]), "penalty", true);
        assert_eq!(states[0], ProbeState::Untried);
        assert_eq!(states[1], ProbeState::DirectMiss);
        assert!(matches!(states[2], ProbeState::FallbackChecked { page_contains: true, .. }));
        assert!(matches!(
            states[3],
            ProbeState::Matched {
                tier: MatchTier::Fallback,
                ..
            }
        ));
    }

    #[test]
    fn test_split_target_flagged_unmatched() {
        let state = PageProbe::new(
            &page(&["early termi", "nation fee"]),
            "termination",
            "termination",
            true,
        )
        .run();
        assert_eq!(
            state,
            ProbeState::Unmatched {
                split_suspected: true
            }
        );
    }

    #[test]
    fn test_absent_target_not_flagged() {
        let state = PageProbe::new(&page(&["nothing"]), "missing", "missing", true).run();
        assert_eq!(
            state,
            ProbeState::Unmatched {
                split_suspected: false
            }
        );
    }

    #[test]
    fn test_disabled_fallback_stops_after_direct_miss() {
        let states = probe(&page(&["ＰＥＮＡＬＴＹ"]), "penalty", false);
        assert_eq!(
            states.last(),
            Some(&ProbeState::Unmatched {
                split_suspected: false
            })
        );
        assert_eq!(states.len(), 3);
    }

    #[test]
    fn test_terminal_state_does_not_move() {
        let p = page(&["abc"]);
        let mut probe = PageProbe::new(&p, "abc", "abc", true);
        probe.step();
        let matched = probe.state().clone();
        probe.step();
        assert_eq!(probe.state(), &matched);
        assert_eq!(probe.run().into_rects().len(), 1);
    }
}
