//! Picks the main phone number of a site out of everything found while
//! crawling it.
//!
//! Each page is scanned with [`scan_page`], which threads a [`ScanState`]
//! through and reports a [`Decision`]. A number is decided immediately when
//! it is found on the homepage ([`Rule::Homepage`]) or after a headquarters
//! clue word on the same page ([`Rule::AfterClue`]). Otherwise it is kept as
//! a candidate, and once the crawl is over the most frequent candidate wins
//! ([`Rule::MostFrequent`]).

use crate::phone::PhoneMatcher;
use phonenumber::country;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Words that announce the switchboard number (de/pl/en).
pub const CLUE_WORDS: [&str; 4] = ["zentrale", "infolinia", "centrala", "headquarters"];

/// Text units mentioning a fax are never used.
pub const FAX_MARKER: &str = "fax";

/// E.164 strings this short are misread dates and the like.
pub const MAX_REJECTED_LEN: usize = 9;

/// Which rule settled the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// First usable number on the homepage
    Homepage,
    /// First usable number after a clue word on the same page
    AfterClue,
    /// Most frequent candidate across the crawl
    MostFrequent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Decided { number: String, rule: Rule },
    Continue,
}

/// A number seen during the crawl that did not settle the result by itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneCandidate {
    pub number: String,
    /// Work-list position of the page it was found on
    pub visit_index: usize,
}

/// Everything the heuristic carries from one page to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    pub candidates: Vec<PhoneCandidate>,
    /// Pages on which a clue word was seen
    pub clue_pages: usize,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most frequent candidate; ties go to the one seen first.
    pub fn most_frequent(&self) -> Option<&str> {
        most_frequent(self.candidates.iter().map(|c| c.number.as_str()))
    }

    /// Result once the work-list is exhausted.
    pub fn fallback(&self) -> Decision {
        match self.most_frequent() {
            Some(number) => Decision::Decided {
                number: number.to_string(),
                rule: Rule::MostFrequent,
            },
            None => Decision::Continue,
        }
    }
}

pub fn most_frequent<'a, I>(numbers: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    // number -> (count, first position)
    let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, number) in numbers.into_iter().enumerate() {
        tally.entry(number).or_insert((0, position)).0 += 1;
    }

    tally
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(number, _)| number)
}

pub fn contains_clue(lower_text: &str) -> bool {
    CLUE_WORDS.iter().any(|word| lower_text.contains(word))
}

/// Homepage first, then clue; anything else stays a candidate.
pub fn evaluate(number: &str, visit_index: usize, after_clue: bool) -> Decision {
    if visit_index == 0 {
        return Decision::Decided {
            number: number.to_string(),
            rule: Rule::Homepage,
        };
    }
    if after_clue {
        return Decision::Decided {
            number: number.to_string(),
            rule: Rule::AfterClue,
        };
    }
    Decision::Continue
}

/// One page's text units, in document order.
pub struct PageText<'a> {
    pub visit_index: usize,
    pub text_units: &'a [String],
    pub region: Option<country::Id>,
}

/// Scan the text units of one page.
///
/// Returns the updated state and [`Decision::Decided`] as soon as a number
/// settles the result; the rest of the page is then left unscanned.
pub fn scan_page(
    mut state: ScanState,
    page: PageText<'_>,
    matcher: &dyn PhoneMatcher,
) -> (ScanState, Decision) {
    let mut after_clue = false;

    for text in page.text_units {
        let text = text.trim();
        let lower = text.to_lowercase();

        if !after_clue && contains_clue(&lower) {
            debug!("Clue word on page {}: '{}'", page.visit_index, text);
            after_clue = true;
            state.clue_pages += 1;
        }

        for found in matcher.match_all(text, page.region) {
            if lower.contains(FAX_MARKER) {
                debug!("Skipping fax text '{}'", text);
                break;
            }

            let number = found.to_international();
            if number.len() <= MAX_REJECTED_LEN {
                debug!("Skipping short number {} ('{}')", number, found.raw);
                continue;
            }

            match evaluate(number, page.visit_index, after_clue) {
                Decision::Continue => {
                    debug!("Candidate {} on page {}", number, page.visit_index);
                    state.candidates.push(PhoneCandidate {
                        number: number.to_string(),
                        visit_index: page.visit_index,
                    });
                }
                decided => return (state, decided),
            }
        }
    }

    (state, Decision::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phone::PhoneMatch;

    /// Every whitespace-separated token starting with `+` is a number.
    struct PlusTokens;

    impl PhoneMatcher for PlusTokens {
        fn match_all(&self, text: &str, _region: Option<country::Id>) -> Vec<PhoneMatch> {
            text.split_whitespace()
                .filter(|token| token.starts_with('+'))
                .map(|token| PhoneMatch::new(token, token.trim_end_matches(',')))
                .collect()
        }
    }

    fn units(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    fn scan(state: ScanState, visit_index: usize, texts: &[&str]) -> (ScanState, Decision) {
        let text_units = units(texts);
        let page = PageText {
            visit_index,
            text_units: &text_units,
            region: None,
        };
        scan_page(state, page, &PlusTokens)
    }

    fn decided(number: &str, rule: Rule) -> Decision {
        Decision::Decided {
            number: number.to_string(),
            rule,
        }
    }

    #[test]
    fn test_homepage_number_is_decided() {
        let (state, decision) = scan(ScanState::new(), 0, &["Willkommen", "Tel. +4951196000"]);
        assert_eq!(decision, decided("+4951196000", Rule::Homepage));
        assert!(state.candidates.is_empty());
    }

    #[test]
    fn test_homepage_returns_first_number() {
        let (_, decision) = scan(ScanState::new(), 0, &["+4940300699 +4940300698"]);
        assert_eq!(decision, decided("+4940300699", Rule::Homepage));
    }

    #[test]
    fn test_other_pages_collect_candidates() {
        let (state, decision) = scan(ScanState::new(), 2, &["Tel. +4951196000", "+4951112340"]);
        assert_eq!(decision, Decision::Continue);
        assert_eq!(
            state.candidates,
            vec![
                PhoneCandidate {
                    number: "+4951196000".to_string(),
                    visit_index: 2,
                },
                PhoneCandidate {
                    number: "+4951112340".to_string(),
                    visit_index: 2,
                },
            ]
        );
    }

    #[test]
    fn test_clue_decides_next_number() {
        let (state, decision) = scan(
            ScanState::new(),
            1,
            &["Zentrale:", "+49403006990", "Fax: +49403006991"],
        );
        assert_eq!(decision, decided("+49403006990", Rule::AfterClue));
        assert_eq!(state.clue_pages, 1);
    }

    #[test]
    fn test_clue_in_same_unit() {
        let (_, decision) = scan(ScanState::new(), 3, &["Headquarters: +18479434000"]);
        assert_eq!(decision, decided("+18479434000", Rule::AfterClue));
    }

    #[test]
    fn test_clue_is_sticky_across_units() {
        let (_, decision) = scan(
            ScanState::new(),
            1,
            &["Infolinia", "czynna pn-pt", "8-16", "+48242560000"],
        );
        assert_eq!(decision, decided("+48242560000", Rule::AfterClue));
    }

    #[test]
    fn test_clue_after_number_does_not_apply_backwards() {
        let (state, decision) = scan(ScanState::new(), 1, &["+4951196000", "Zentrale"]);
        assert_eq!(decision, Decision::Continue);
        assert_eq!(state.candidates.len(), 1);
        assert_eq!(state.clue_pages, 1);
    }

    #[test]
    fn test_clue_resets_per_page() {
        let (state, decision) = scan(ScanState::new(), 1, &["Centrala"]);
        assert_eq!(decision, Decision::Continue);
        let (state, decision) = scan(state, 2, &["+48242560000"]);
        assert_eq!(decision, Decision::Continue);
        assert_eq!(state.candidates.len(), 1);
    }

    #[test]
    fn test_clue_wins_over_earlier_candidates() {
        let (state, _) = scan(ScanState::new(), 1, &["+4951196000", "+4951196000"]);
        let (state, decision) = scan(state, 2, &["Zentrale", "+4951112340"]);
        assert_eq!(decision, decided("+4951112340", Rule::AfterClue));
        assert_eq!(state.candidates.len(), 2);
    }

    #[test]
    fn test_fax_unit_is_skipped() {
        let (state, decision) = scan(ScanState::new(), 0, &["Fax: +49403006991 Tel: +49403006990"]);
        assert_eq!(decision, Decision::Continue);
        assert!(state.candidates.is_empty());
    }

    #[test]
    fn test_fax_only_affects_its_own_unit() {
        let (_, decision) = scan(ScanState::new(), 0, &["Telefax +49403006991", "+49403006990"]);
        assert_eq!(decision, decided("+49403006990", Rule::Homepage));
    }

    #[test]
    fn test_fax_after_clue_cannot_be_decided() {
        let (_, decision) = scan(ScanState::new(), 1, &["Zentrale", "Fax +49403006991"]);
        assert_eq!(decision, Decision::Continue);
    }

    #[test]
    fn test_short_numbers_never_decide() {
        let (state, decision) = scan(ScanState::new(), 0, &["+4930123 +49226202"]);
        assert_eq!(decision, Decision::Continue);
        assert!(state.candidates.is_empty());

        let (_, decision) = scan(ScanState::new(), 0, &["+49226202 +4940300699"]);
        assert_eq!(decision, decided("+4940300699", Rule::Homepage));
    }

    #[test]
    fn test_fallback_most_frequent() {
        let (state, _) = scan(ScanState::new(), 1, &["+4951196000"]);
        let (state, _) = scan(state, 2, &["+4951112340"]);
        let (state, _) = scan(state, 3, &["+4951196000"]);
        assert_eq!(state.fallback(), decided("+4951196000", Rule::MostFrequent));
    }

    #[test]
    fn test_fallback_tie_goes_to_first_seen() {
        let (state, _) = scan(
            ScanState::new(),
            1,
            &["+4951112340", "+4951196000", "+4951196000", "+4951112340"],
        );
        assert_eq!(state.fallback(), decided("+4951112340", Rule::MostFrequent));
    }

    #[test]
    fn test_fallback_without_candidates() {
        assert_eq!(ScanState::new().fallback(), Decision::Continue);
    }

    #[test]
    fn test_most_frequent() {
        assert_eq!(most_frequent(["a", "b", "b", "c"]), Some("b"));
        assert_eq!(most_frequent(["c", "a", "a", "c"]), Some("c"));
        assert_eq!(most_frequent(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_evaluate_rule_order() {
        assert_eq!(evaluate("+49403006990", 0, true), decided("+49403006990", Rule::Homepage));
        assert_eq!(evaluate("+49403006990", 4, true), decided("+49403006990", Rule::AfterClue));
        assert_eq!(evaluate("+49403006990", 4, false), Decision::Continue);
    }
}
