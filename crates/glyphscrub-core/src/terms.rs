//! Redaction targets: the case-insensitive name map and the derived term set.
//!
//! A [`NameMap`] stores every configured original/replacement pair under the
//! normalized-lowercase form of the original, so `Spwilliams`, `SPWILLIAMS`
//! and `spwilliams` are one term with three case variants. The variants are
//! kept so that a matched occurrence can be relabelled in the same case it
//! was written in.

use std::collections::HashMap;

/// Letter-case shape of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaseShape {
    /// Every cased letter is uppercase (`ALAN WILLIAMS`).
    Upper,
    /// Every cased letter is lowercase (`alan williams`).
    Lower,
    /// Each letter run starts uppercase and continues lowercase (`Alan Williams`).
    Title,
    /// Anything else, including text without cased letters.
    Mixed,
}

impl CaseShape {
    /// Classify `text`.
    pub fn of(text: &str) -> Self {
        let mut has_upper = false;
        let mut has_lower = false;
        for c in text.chars() {
            has_upper |= c.is_uppercase();
            has_lower |= c.is_lowercase();
        }
        match (has_upper, has_lower) {
            (false, false) => CaseShape::Mixed,
            (true, false) => CaseShape::Upper,
            (false, true) => CaseShape::Lower,
            (true, true) if title_case(text) == text => CaseShape::Title,
            _ => CaseShape::Mixed,
        }
    }
}

/// Title-case `text`: a letter following a non-letter is uppercased, every
/// other letter is lowercased (`o'neil smith` -> `O'Neil Smith`).
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Lowercase `text` and collapse whitespace runs to single spaces.
pub fn normalize_term(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// One spelling of a name together with the label that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaseVariant {
    pub original: String,
    pub replacement: String,
}

/// All case variants of one normalized name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameEntry {
    key: String,
    variants: Vec<CaseVariant>,
}

impl NameEntry {
    /// Normalized-lowercase form of the name.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Variants in insertion order. The first one is the fallback.
    pub fn variants(&self) -> &[CaseVariant] {
        &self.variants
    }

    /// Pick the replacement for an observed occurrence of this name.
    ///
    /// Prefers the variant spelled exactly like `observed`, then the first
    /// variant sharing its [`CaseShape`], then the first-seen variant.
    pub fn replacement_for(&self, observed: &str) -> &str {
        pick_variant(&self.variants, observed)
    }
}

fn pick_variant<'a>(variants: &'a [CaseVariant], observed: &str) -> &'a str {
    let observed = observed.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Some(v) = variants.iter().find(|v| v.original == observed) {
        return &v.replacement;
    }
    let shape = CaseShape::of(&observed);
    if shape != CaseShape::Mixed {
        if let Some(v) = variants.iter().find(|v| CaseShape::of(&v.original) == shape) {
            return &v.replacement;
        }
    }
    variants.first().map(|v| v.replacement.as_str()).unwrap_or("")
}

/// Case-insensitive mapping from names to replacement labels.
///
/// Iteration follows the order in which names were first inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    entries: Vec<NameEntry>,
    index: HashMap<String, usize>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `orig1=repl1,orig2=repl2`, expanding each pair into case variants.
    ///
    /// Pairs without `=` or with an empty original are skipped.
    pub fn parse(pairs: &str) -> Self {
        let mut map = Self::new();
        for pair in pairs.split(',') {
            if let Some((orig, repl)) = split_pair(pair) {
                map.insert_with_case_variants(orig, repl);
            }
        }
        map
    }

    /// Parse one `old=new` pair per line, expanding each into case variants.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn parse_lines(content: &str) -> Self {
        let mut map = Self::new();
        map.extend_from_lines(content);
        map
    }

    /// Add the pairs of a line-oriented map to this one.
    pub fn extend_from_lines(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((orig, repl)) = split_pair(line) {
                self.insert_with_case_variants(orig, repl);
            }
        }
    }

    /// Insert a single variant as given.
    ///
    /// Returns `false` when the original is blank or the exact spelling is
    /// already present (first-seen wins).
    pub fn insert(&mut self, original: &str, replacement: &str) -> bool {
        let key = normalize_term(original);
        if key.is_empty() {
            return false;
        }
        let original = original.split_whitespace().collect::<Vec<_>>().join(" ");
        let variant = CaseVariant {
            original,
            replacement: replacement.trim().to_string(),
        };
        match self.index.get(&key) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                if entry.variants.iter().any(|v| v.original == variant.original) {
                    return false;
                }
                entry.variants.push(variant);
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(NameEntry {
                    key,
                    variants: vec![variant],
                });
            }
        }
        true
    }

    /// Insert the pair as given plus its lowercase, uppercase and title-case forms.
    pub fn insert_with_case_variants(&mut self, original: &str, replacement: &str) {
        self.insert(original, replacement);
        self.insert(&original.to_lowercase(), &replacement.to_lowercase());
        self.insert(&original.to_uppercase(), &replacement.to_uppercase());
        self.insert(&title_case(original), &title_case(replacement));
    }

    /// Look up a name case-insensitively.
    pub fn get(&self, name: &str) -> Option<&NameEntry> {
        self.index
            .get(&normalize_term(name))
            .map(|&i| &self.entries[i])
    }

    /// Entries in first-insertion order.
    pub fn entries(&self) -> &[NameEntry] {
        &self.entries
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of stored case variants.
    pub fn variant_count(&self) -> usize {
        self.entries.iter().map(|e| e.variants.len()).sum()
    }
}

fn split_pair(pair: &str) -> Option<(&str, &str)> {
    let (orig, repl) = pair.split_once('=')?;
    let orig = orig.trim();
    if orig.is_empty() {
        return None;
    }
    Some((orig, repl.trim()))
}

/// Split a comma-separated extra-redact list into trimmed, non-empty strings.
pub fn parse_extra_redact(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Where a term came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TermKind {
    /// A name-map entry; matches are relabelled.
    Name,
    /// A free-form extra-redact string; matches are blanked.
    Extra,
}

/// A normalized redaction target.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    /// Normalized-lowercase text.
    pub text: String,
    /// Words of `text`, in order.
    pub words: Vec<String>,
    pub kind: TermKind,
    variants: Vec<CaseVariant>,
}

impl Term {
    fn name(entry: &NameEntry) -> Self {
        Self {
            text: entry.key.clone(),
            words: entry.key.split(' ').map(str::to_string).collect(),
            kind: TermKind::Name,
            variants: entry.variants.clone(),
        }
    }

    fn extra(text: &str) -> Option<Self> {
        let text = normalize_term(text);
        if text.is_empty() {
            return None;
        }
        Some(Self {
            words: text.split(' ').map(str::to_string).collect(),
            text,
            kind: TermKind::Extra,
            variants: Vec::new(),
        })
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_multi_word(&self) -> bool {
        self.words.len() > 1
    }

    /// Replacement label for an observed occurrence; empty for extra terms.
    pub fn replacement_for(&self, observed: &str) -> String {
        match self.kind {
            TermKind::Extra => String::new(),
            TermKind::Name => pick_variant(&self.variants, observed).to_string(),
        }
    }
}

/// The targets of one run: name terms in map order, then extra terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TermSet {
    names: Vec<Term>,
    extras: Vec<Term>,
}

impl TermSet {
    /// Build terms from a name map and an extra-redact list.
    ///
    /// Extra strings are normalized; blanks and case-insensitive duplicates
    /// are dropped.
    pub fn new<S: AsRef<str>>(names: &NameMap, extra_redact: &[S]) -> Self {
        let mut extras: Vec<Term> = Vec::new();
        for raw in extra_redact {
            if let Some(term) = Term::extra(raw.as_ref()) {
                if !extras.iter().any(|t| t.text == term.text) {
                    extras.push(term);
                }
            }
        }
        Self {
            names: names.entries().iter().map(Term::name).collect(),
            extras,
        }
    }

    /// Name terms in map insertion order.
    pub fn names(&self) -> &[Term] {
        &self.names
    }

    /// Extra-redact terms in list order.
    pub fn extras(&self) -> &[Term] {
        &self.extras
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.extras.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len() + self.extras.len()
    }
}
