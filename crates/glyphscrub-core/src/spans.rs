//! Span resolution: attribute runs of recognized tokens to redaction terms.
//!
//! Three ordered passes share one consumption set so that no token is ever
//! attributed to two spans:
//!
//! 1. Multi-word name terms, most words first (ties: longer text first).
//! 2. Single-word names, then single-word extra terms, token by token.
//! 3. Multi-word extra terms.
//!
//! Passes 1 and 2 skip tokens with negative confidence. Pass 3 does not
//! confidence-gate; extra-redact phrases are matched regardless of the
//! engine's reliability signal.

use crate::geometry::PixelBox;
use crate::terms::{Term, TermKind, TermSet};
use crate::token::{Token, union_bbox};

/// A run of consecutive tokens attributed to one term.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchedSpan {
    /// Index of the first token.
    pub start: usize,
    /// Index of the last token (inclusive).
    pub end: usize,
    /// Normalized text of the matched term.
    pub term: String,
    /// Label to render over the span; empty for a plain blank-out.
    pub replacement: String,
    /// Whether the term came from the name map or the extra-redact list.
    pub kind: TermKind,
}

impl MatchedSpan {
    /// Number of tokens covered.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always `false`: a span covers at least one token.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Token indices covered by this span.
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Union bounding box of the covered tokens.
    pub fn bbox(&self, tokens: &[Token]) -> Option<PixelBox> {
        union_bbox(tokens, self.start, self.end)
    }

    /// Observed text of the covered tokens, joined by single spaces.
    pub fn observed_text(&self, tokens: &[Token]) -> String {
        joined_text(tokens, self.start, self.end)
    }
}

fn joined_text(tokens: &[Token], start: usize, end: usize) -> String {
    tokens
        .get(start..=end)
        .unwrap_or_default()
        .iter()
        .map(Token::trimmed)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Token indices already attributed to a span.
///
/// Grows monotonically while one image is processed.
#[derive(Debug, Clone)]
struct ConsumptionSet {
    taken: Vec<bool>,
}

impl ConsumptionSet {
    fn new(len: usize) -> Self {
        Self {
            taken: vec![false; len],
        }
    }

    fn contains(&self, idx: usize) -> bool {
        self.taken.get(idx).copied().unwrap_or(true)
    }

    fn take(&mut self, start: usize, end: usize) {
        for slot in &mut self.taken[start..=end] {
            *slot = true;
        }
    }
}

/// Whether a pass ignores tokens flagged unreliable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfidenceGate {
    Reliable,
    Any,
}

impl ConfidenceGate {
    fn admits(self, token: &Token) -> bool {
        match self {
            ConfidenceGate::Reliable => token.is_reliable(),
            ConfidenceGate::Any => true,
        }
    }
}

/// Resolve `terms` against `tokens` into disjoint spans, ordered by start index.
pub fn resolve(tokens: &[Token], terms: &TermSet) -> Vec<MatchedSpan> {
    let mut consumed = ConsumptionSet::new(tokens.len());
    let mut spans = Vec::new();

    // Pass 1: multi-word names, most specific first.
    let mut multi_names: Vec<&Term> = terms
        .names()
        .iter()
        .filter(|t| t.is_multi_word())
        .collect();
    multi_names.sort_by(|a, b| {
        b.word_count()
            .cmp(&a.word_count())
            .then(b.text.chars().count().cmp(&a.text.chars().count()))
    });
    for term in multi_names {
        scan_windows(tokens, term, ConfidenceGate::Reliable, &mut consumed, &mut spans);
    }

    // Pass 2: single words. Names win over extras on the same token.
    let single_names = terms.names().iter().filter(|t| !t.is_multi_word());
    let single_extras = terms.extras().iter().filter(|t| !t.is_multi_word());
    let single_words: Vec<&Term> = single_names.chain(single_extras).collect();
    for (idx, token) in tokens.iter().enumerate() {
        if consumed.contains(idx) || !token.is_reliable() {
            continue;
        }
        let observed = token.trimmed();
        if observed.is_empty() {
            continue;
        }
        let hit = single_words
            .iter()
            .find(|term| crate::fuzzy::matches(observed, &term.words[0]));
        if let Some(term) = hit {
            consumed.take(idx, idx);
            spans.push(MatchedSpan {
                start: idx,
                end: idx,
                term: term.text.clone(),
                replacement: term.replacement_for(observed),
                kind: term.kind,
            });
        }
    }

    // Pass 3: multi-word extras, not confidence-gated.
    for term in terms.extras().iter().filter(|t| t.is_multi_word()) {
        scan_windows(tokens, term, ConfidenceGate::Any, &mut consumed, &mut spans);
    }

    spans.sort_by_key(|s| s.start);
    spans
}

/// Slide a window of the term's word count across `tokens`, claiming every
/// non-overlapping run whose tokens are free, admitted by `gate`, and
/// fuzzy-match the term's words in order.
fn scan_windows(
    tokens: &[Token],
    term: &Term,
    gate: ConfidenceGate,
    consumed: &mut ConsumptionSet,
    spans: &mut Vec<MatchedSpan>,
) {
    let width = term.word_count();
    if width == 0 || tokens.len() < width {
        return;
    }

    for start in 0..=tokens.len() - width {
        let end = start + width - 1;
        let window_matches = term.words.iter().enumerate().all(|(offset, word)| {
            let idx = start + offset;
            let token = &tokens[idx];
            !consumed.contains(idx)
                && gate.admits(token)
                && crate::fuzzy::matches(token.trimmed(), word)
        });
        if !window_matches {
            continue;
        }

        consumed.take(start, end);
        spans.push(MatchedSpan {
            start,
            end,
            term: term.text.clone(),
            replacement: term.replacement_for(&joined_text(tokens, start, end)),
            kind: term.kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::NameMap;

    fn make_token(text: &str, confidence: i32, x: u32) -> Token {
        Token::new(text, confidence, PixelBox::new(x, 10, 40, 14))
    }

    fn tokens_of(words: &[&str]) -> Vec<Token> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| make_token(w, 90, i as u32 * 50))
            .collect()
    }

    fn terms(map: &str, extra: &[&str]) -> TermSet {
        TermSet::new(&NameMap::parse(map), extra)
    }

    fn assert_disjoint(spans: &[MatchedSpan]) {
        let mut seen = std::collections::HashSet::new();
        for span in spans {
            for idx in span.indices() {
                assert!(seen.insert(idx), "token {idx} consumed twice");
            }
        }
    }

    #[test]
    fn no_terms_no_spans() {
        let tokens = tokens_of(&["Alan", "Williams"]);
        assert!(resolve(&tokens, &TermSet::default()).is_empty());
    }

    #[test]
    fn no_tokens_no_spans() {
        assert!(resolve(&[], &terms("Alan=Bob", &["R003134"])).is_empty());
    }

    #[test]
    fn multi_word_name_beats_single_word() {
        let tokens = tokens_of(&["Alan", "Williams"]);
        let spans = resolve(&tokens, &terms("Alan Williams=Bob Williams,Williams=X", &[]));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 0);
        assert_eq!(spans[0].end, 1);
        assert_eq!(spans[0].replacement, "Bob Williams");
        assert_eq!(spans[0].kind, TermKind::Name);
    }

    #[test]
    fn single_word_used_when_full_name_absent() {
        let tokens = tokens_of(&["Mr", "Williams", "bid"]);
        let spans = resolve(&tokens, &terms("Alan Williams=Bob Williams,Williams=X", &[]));
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (1, 1));
        assert_eq!(spans[0].replacement, "X");
    }

    #[test]
    fn upper_case_token_takes_upper_variant() {
        let tokens = vec![make_token("SPWILLIAMS", 85, 0)];
        let spans = resolve(&tokens, &terms("Spwilliams=Bob", &[]));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].replacement, "BOB");
    }

    #[test]
    fn partial_multi_word_run_yields_nothing() {
        let tokens = tokens_of(&["Alan", "Jones"]);
        let spans = resolve(&tokens, &terms("Alan Williams=Bob Williams", &[]));
        assert!(spans.is_empty());
    }

    #[test]
    fn multi_word_tolerates_ocr_noise_per_word() {
        let tokens = tokens_of(&["Alan", "WiIliams"]);
        let spans = resolve(&tokens, &terms("Alan Williams=Bob Williams", &[]));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].len(), 2);
    }

    #[test]
    fn repeated_occurrences_all_claimed() {
        let tokens = tokens_of(&["Alan", "Williams", "vs", "Alan", "Williams"]);
        let spans = resolve(&tokens, &terms("Alan Williams=Bob Williams", &[]));
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[1].start), (0, 3));
        assert_disjoint(&spans);
    }

    #[test]
    fn longer_term_claims_first() {
        let tokens = tokens_of(&["Mary", "Ann", "Williams"]);
        let spans = resolve(
            &tokens,
            &terms("Ann Williams=Jo Smith,Mary Ann Williams=Sue Brown", &[]),
        );
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (0, 2));
        assert_eq!(spans[0].replacement, "Sue Brown");
    }

    #[test]
    fn negative_confidence_blocks_name_passes() {
        let tokens = vec![make_token("Alan", -1, 0), make_token("Williams", 90, 50)];
        let spans = resolve(&tokens, &terms("Alan Williams=Bob Williams,Alan=Al", &[]));
        assert!(spans.is_empty());

        let tokens = vec![make_token("Spwilliams", -1, 0)];
        assert!(resolve(&tokens, &terms("Spwilliams=Bob", &[])).is_empty());
    }

    #[test]
    fn multi_word_extra_ignores_confidence() {
        let tokens = vec![
            make_token("3273", -1, 0),
            make_token("Streamside", 90, 50),
            make_token("Cir", 90, 100),
        ];
        let spans = resolve(&tokens, &terms("", &["3273 Streamside Cir"]));
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (0, 2));
        assert_eq!(spans[0].replacement, "");
        assert_eq!(spans[0].kind, TermKind::Extra);
    }

    #[test]
    fn single_word_extra_is_confidence_gated() {
        let tokens = vec![make_token("R003134", -1, 0)];
        assert!(resolve(&tokens, &terms("", &["R003134"])).is_empty());
    }

    #[test]
    fn name_beats_extra_on_same_token() {
        let tokens = tokens_of(&["Williams"]);
        let spans = resolve(&tokens, &terms("Williams=X", &["williams"]));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, TermKind::Name);
        assert_eq!(spans[0].replacement, "X");
    }

    #[test]
    fn first_name_in_map_order_wins() {
        // "Smithe" is within tolerance of both entries
        let tokens = tokens_of(&["Smithe"]);
        let spans = resolve(&tokens, &terms("Smith=First,Smyth=Second", &[]));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].replacement, "First");
    }

    #[test]
    fn short_terms_need_exact_tokens() {
        let tokens = tokens_of(&["Bob", "Bab", "BOB"]);
        let spans = resolve(&tokens, &terms("Bob=Al", &[]));
        let starts: Vec<usize> = spans.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0, 2]);
        assert_eq!(spans[1].replacement, "AL");
    }

    #[test]
    fn blank_separator_breaks_multi_word_run() {
        let tokens = vec![
            make_token("Alan", 90, 0),
            make_token("", -1, 0),
            make_token("Williams", 90, 50),
        ];
        let spans = resolve(&tokens, &terms("Alan Williams=Bob Williams", &[]));
        assert!(spans.is_empty());
    }

    #[test]
    fn output_sorted_by_start_and_disjoint() {
        let tokens = tokens_of(&[
            "R003134", "Alan", "Williams", "at", "3273", "Streamside", "Cir", "Spwilliams",
        ]);
        let spans = resolve(
            &tokens,
            &terms(
                "Alan Williams=Bob Williams,Spwilliams=Bob,Williams=X",
                &["R003134", "3273 Streamside Cir"],
            ),
        );
        let ranges: Vec<(usize, usize)> = spans.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(ranges, vec![(0, 0), (1, 2), (4, 6), (7, 7)]);
        assert_disjoint(&spans);
    }

    #[test]
    fn observed_text_joins_trimmed_tokens() {
        let tokens = tokens_of(&[" Alan ", "Williams"]);
        let span = MatchedSpan {
            start: 0,
            end: 1,
            term: "alan williams".to_string(),
            replacement: String::new(),
            kind: TermKind::Name,
        };
        assert_eq!(span.observed_text(&tokens), "Alan Williams");
        assert_eq!(span.bbox(&tokens), Some(PixelBox::from_edges(0, 10, 90, 24)));
    }
}
