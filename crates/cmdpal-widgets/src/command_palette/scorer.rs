#![forbid(unsafe_code)]

//! Substring/fuzzy match scoring for the command palette.
//!
//! Two tiers, checked in order:
//!
//! ```text
//! substring   100 − 0.5 × start   (+50 when start is a word boundary)
//! fuzzy       Σ per matched char:  10
//!                                 +15 if adjacent to the previous match
//!                                 +10 if at a word boundary
//! ```
//!
//! A word boundary is the start of the text or a position preceded by a
//! space, `-` or `_`. Comparison is case-insensitive and positions count
//! characters (not bytes) of the lower-cased candidate.
//!
//! # Invariants
//!
//! 1. Determinism: same input → identical score.
//! 2. An empty query scores 0 against everything.
//! 3. `None` means no match; the fuzzy walk must consume the whole query.
//! 4. Substring matches at a word boundary outrank mid-word substrings at
//!    the same position.

use std::fmt;

use super::command::Command;

const SUBSTRING_BASE: f64 = 100.0;
const WORD_START_BONUS: f64 = 50.0;
const POSITION_PENALTY: f64 = 0.5;
const FUZZY_CHAR: f64 = 10.0;
const FUZZY_ADJACENT: f64 = 15.0;
const FUZZY_BOUNDARY: f64 = 10.0;

// ---------------------------------------------------------------------------
// Match Types
// ---------------------------------------------------------------------------

/// Which tier produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchType {
    /// Characters found in order but with gaps.
    Fuzzy,
    /// Query found as a contiguous substring mid-word.
    Substring,
    /// Query found as a contiguous substring starting a word.
    WordStart,
}

impl MatchType {
    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            Self::WordStart => "word-start substring",
            Self::Substring => "contiguous substring",
            Self::Fuzzy => "fuzzy match",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

// ---------------------------------------------------------------------------
// Match Result
// ---------------------------------------------------------------------------

/// A successful match, with enough detail to explain and highlight it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Relevance score; higher is better.
    pub score: f64,
    /// Tier that produced the score.
    pub match_type: MatchType,
    /// Positions of matched characters, counted in `char`s of the
    /// lower-cased candidate. They equal positions in the candidate only
    /// when lower-casing keeps the character count (`İ` becomes two).
    pub match_positions: Vec<usize>,
}

impl MatchResult {
    fn empty_query() -> Self {
        Self {
            score: 0.0,
            match_type: MatchType::Substring,
            match_positions: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score `candidate` against `query`. `None` means no match.
pub fn score(candidate: &str, query: &str) -> Option<f64> {
    score_match(candidate, query).map(|m| m.score)
}

/// Score `candidate` against `query`, explaining the result.
pub fn score_match(candidate: &str, query: &str) -> Option<MatchResult> {
    if query.is_empty() {
        return Some(MatchResult::empty_query());
    }
    let text: Vec<char> = candidate.to_lowercase().chars().collect();
    let needle: Vec<char> = query.to_lowercase().chars().collect();

    if let Some(start) = find_substring(&text, &needle) {
        let word_start = is_word_boundary(&text, start);
        let mut score = SUBSTRING_BASE - POSITION_PENALTY * start as f64;
        if word_start {
            score += WORD_START_BONUS;
        }
        return Some(MatchResult {
            score,
            match_type: if word_start {
                MatchType::WordStart
            } else {
                MatchType::Substring
            },
            match_positions: (start..start + needle.len()).collect(),
        });
    }

    fuzzy_match(&text, &needle)
}

/// Best score of `query` over a command's label and keywords.
pub fn score_command(command: &Command, query: &str) -> Option<f64> {
    std::iter::once(command.label.as_str())
        .chain(command.keywords.iter().map(String::as_str))
        .filter_map(|field| score(field, query))
        .reduce(f64::max)
}

fn is_word_boundary(text: &[char], pos: usize) -> bool {
    pos == 0 || matches!(text[pos - 1], ' ' | '-' | '_')
}

fn find_substring(text: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > text.len() {
        return None;
    }
    text.windows(needle.len()).position(|w| w == needle)
}

fn fuzzy_match(text: &[char], needle: &[char]) -> Option<MatchResult> {
    let mut score = 0.0;
    let mut positions = Vec::with_capacity(needle.len());
    let mut qi = 0;

    for (ti, &ch) in text.iter().enumerate() {
        if qi == needle.len() {
            break;
        }
        if ch != needle[qi] {
            continue;
        }
        score += FUZZY_CHAR;
        if positions.last().is_some_and(|&prev| prev + 1 == ti) {
            score += FUZZY_ADJACENT;
        }
        if is_word_boundary(text, ti) {
            score += FUZZY_BOUNDARY;
        }
        positions.push(ti);
        qi += 1;
    }

    (qi == needle.len()).then_some(MatchResult {
        score,
        match_type: MatchType::Fuzzy,
        match_positions: positions,
    })
}
