//! OCR-tolerant word comparison.
//!
//! Recognition engines commonly substitute single glyphs (`l` for `I`, `0`
//! for `O`) but rarely insert or drop several. The comparison here is
//! positional: characters are aligned from the start and the share of equal
//! positions decides the match.

/// Minimum share of equal positions for a fuzzy match.
pub const MATCH_THRESHOLD: f64 = 0.75;

/// Maximum difference in character count between observed and target.
pub const MAX_LENGTH_DIFF: usize = 2;

/// Targets this short (in characters) only match exactly.
pub const EXACT_ONLY_MAX_LEN: usize = 3;

/// Decide whether an observed token denotes `target`.
///
/// Rules, applied in order:
/// 1. Empty input on either side never matches.
/// 2. Case-insensitive equality matches.
/// 3. Character counts differing by more than [`MAX_LENGTH_DIFF`] do not match.
/// 4. Targets of at most [`EXACT_ONLY_MAX_LEN`] characters require equality.
/// 5. Otherwise the positional overlap ratio (equal characters over the
///    shorter length) must reach [`MATCH_THRESHOLD`].
pub fn matches(observed: &str, target: &str) -> bool {
    if observed.is_empty() || target.is_empty() {
        return false;
    }

    let observed: Vec<char> = observed.to_lowercase().chars().collect();
    let target: Vec<char> = target.to_lowercase().chars().collect();

    if observed == target {
        return true;
    }
    if observed.len().abs_diff(target.len()) > MAX_LENGTH_DIFF {
        return false;
    }
    if target.len() <= EXACT_ONLY_MAX_LEN {
        return false;
    }

    overlap_ratio(&observed, &target) >= MATCH_THRESHOLD
}

/// Equal-position count divided by the shorter length.
fn overlap_ratio(a: &[char], b: &[char]) -> f64 {
    let shorter = a.len().min(b.len());
    if shorter == 0 {
        return 0.0;
    }
    let equal = a.iter().zip(b).filter(|(x, y)| x == y).count();
    equal as f64 / shorter as f64
}
