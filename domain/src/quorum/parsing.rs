//! Ballot parsing for the voting sub-round.
//!
//! Voters answer in free-form text. These functions extract the chosen
//! candidate and the confidence. They are pure domain logic: no I/O, just
//! pattern matching. Parsing is lenient; an unreadable ballot degrades to
//! candidate 0 with neutral confidence instead of aborting the round.
//!
//! # Supported Formats
//!
//! 1. **JSON** (preferred): `{"choice": 2, "confidence": 8}`
//!    (`choice` is 1-based, matching the "Response N" labels voters see)
//! 2. **Text**: `Response 2 ... confidence 8/10`

use super::vote::{NEUTRAL_CONFIDENCE, clamp_confidence};

/// A ballot extracted from a voter's answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ballot {
    /// 0-based candidate index
    pub selected_index: usize,
    /// Confidence (1.0 to 10.0)
    pub confidence: f64,
    /// True when the answer could not be parsed and defaults were used
    pub degraded: bool,
}

impl Ballot {
    /// The fallback ballot for unreadable answers: candidate 0, confidence 5.
    pub fn fallback() -> Self {
        Self {
            selected_index: 0,
            confidence: NEUTRAL_CONFIDENCE,
            degraded: true,
        }
    }
}

/// Parse a voter's answer into a [`Ballot`].
///
/// Choices outside `1..=candidate_count` fall back to candidate 0.
///
/// # Examples
///
/// ```
/// use council_domain::quorum::parsing::parse_ballot;
///
/// let ballot = parse_ballot(r#"{"choice": 2, "confidence": 9}"#, 3);
/// assert_eq!(ballot.selected_index, 1);
/// assert_eq!(ballot.confidence, 9.0);
///
/// let ballot = parse_ballot("I pick Response 3, confidence 7/10", 3);
/// assert_eq!(ballot.selected_index, 2);
/// assert_eq!(ballot.confidence, 7.0);
///
/// let ballot = parse_ballot("no idea", 3);
/// assert_eq!(ballot.selected_index, 0);
/// assert_eq!(ballot.confidence, 5.0);
/// assert!(ballot.degraded);
/// ```
pub fn parse_ballot(response: &str, candidate_count: usize) -> Ballot {
    if let Some(ballot) = parse_json_ballot(response, candidate_count) {
        return ballot;
    }
    if let Some(ballot) = parse_text_ballot(response, candidate_count) {
        return ballot;
    }
    Ballot::fallback()
}

fn parse_json_ballot(response: &str, candidate_count: usize) -> Option<Ballot> {
    let start = response.find('{')?;
    let end = response[start..].rfind('}')?;
    let json_str = &response[start..start + end + 1];
    let parsed = serde_json::from_str::<serde_json::Value>(json_str).ok()?;

    let choice = ["choice", "response", "selected"]
        .iter()
        .find_map(|key| parsed.get(*key).and_then(|v| v.as_f64()))?;

    let confidence = parsed
        .get("confidence")
        .and_then(|v| v.as_f64())
        .map(clamp_confidence)
        .unwrap_or(NEUTRAL_CONFIDENCE);

    let (selected_index, in_range) = to_index(choice, candidate_count);
    Some(Ballot {
        selected_index,
        confidence,
        degraded: !in_range,
    })
}

fn parse_text_ballot(response: &str, candidate_count: usize) -> Option<Ballot> {
    let words: Vec<&str> = response.split_whitespace().collect();

    // "Response N" picks the candidate
    let choice = words.windows(2).find_map(|pair| {
        if pair[0].eq_ignore_ascii_case("response") {
            pair[1]
                .trim_matches(|c: char| !c.is_ascii_digit())
                .parse::<f64>()
                .ok()
        } else {
            None
        }
    })?;

    let confidence = parse_confidence(&words).unwrap_or(NEUTRAL_CONFIDENCE);
    let (selected_index, in_range) = to_index(choice, candidate_count);
    Some(Ballot {
        selected_index,
        confidence,
        degraded: !in_range,
    })
}

/// Look for "N/10" or a number following the word "confidence".
fn parse_confidence(words: &[&str]) -> Option<f64> {
    for word in words {
        if let Some(num_str) = word
            .trim_matches(|c: char| !c.is_ascii_digit())
            .strip_suffix("/10")
            && let Ok(num) = num_str.parse::<f64>()
        {
            return Some(clamp_confidence(num));
        }
    }

    words.windows(2).find_map(|pair| {
        let key = pair[0].trim_end_matches(':').to_lowercase();
        if key == "confidence" {
            pair[1]
                .trim_matches(|c: char| !c.is_ascii_digit() && c != '.')
                .parse::<f64>()
                .ok()
                .map(clamp_confidence)
        } else {
            None
        }
    })
}

/// Map a 1-based choice onto a 0-based index, falling back to 0.
fn to_index(choice: f64, candidate_count: usize) -> (usize, bool) {
    if choice.is_finite() && choice >= 1.0 && (choice as usize) <= candidate_count {
        (choice as usize - 1, true)
    } else {
        (0, false)
    }
}
