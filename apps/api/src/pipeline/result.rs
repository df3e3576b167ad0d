//! AnalysisResult: the aggregate a successful run hands back to its caller.
//!
//! Remote payloads are checked against the documented contract on the way in.
//! Violations are `ClampError`s: logged and substituted, never fatal.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::analysis_client::MatchSkillsResponse;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsMatch {
    /// Always within [0, 100] once built through `SkillsMatch::from_response`.
    pub match_score: f64,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub additional_skills: Vec<String>,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub resume_text: String,
    pub jd_text: String,
    pub resume_summary: String,
    pub jd_summary: String,
    pub skills_match: SkillsMatch,
    pub cover_letter: String,
    pub cold_email: String,
}

/// A remote value outside the documented contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClampError {
    #[error("match_score {value} outside [0, 100], clamped to {substituted}")]
    ScoreOutOfRange { value: f64, substituted: f64 },

    #[error("{field}: dropped {dropped} blank or duplicate keyword(s)")]
    KeywordsCleaned { field: &'static str, dropped: usize },
}

/// Clamps a score into [0, 100]. Non-finite values become 0.
pub fn clamp_score(value: f64) -> (f64, Option<ClampError>) {
    if !value.is_finite() {
        return (
            MIN_SCORE,
            Some(ClampError::ScoreOutOfRange {
                value,
                substituted: MIN_SCORE,
            }),
        );
    }
    let clamped = value.clamp(MIN_SCORE, MAX_SCORE);
    if clamped != value {
        (
            clamped,
            Some(ClampError::ScoreOutOfRange {
                value,
                substituted: clamped,
            }),
        )
    } else {
        (value, None)
    }
}

/// Trims keywords, drops blanks and case-insensitive duplicates (first wins).
fn clean_keywords(field: &'static str, raw: Vec<String>) -> (Vec<String>, Option<ClampError>) {
    let total = raw.len();
    let mut seen = HashSet::new();
    let cleaned: Vec<String> = raw
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
        .collect();

    let dropped = total - cleaned.len();
    let violation = (dropped > 0).then_some(ClampError::KeywordsCleaned { field, dropped });
    (cleaned, violation)
}

impl SkillsMatch {
    /// Builds a contract-conforming match from the raw response.
    /// Returns every violation that was corrected along the way.
    pub fn from_response(response: MatchSkillsResponse) -> (Self, Vec<ClampError>) {
        let mut violations = Vec::new();

        let (match_score, v) = clamp_score(response.match_score);
        violations.extend(v);
        let (matched_keywords, v) = clean_keywords("matched_keywords", response.matched_keywords);
        violations.extend(v);
        let (missing_keywords, v) = clean_keywords("missing_keywords", response.missing_keywords);
        violations.extend(v);
        let (additional_skills, v) =
            clean_keywords("additional_skills", response.additional_skills);
        violations.extend(v);

        for violation in &violations {
            warn!("Analysis service contract violation: {violation}");
        }

        (
            SkillsMatch {
                match_score,
                matched_keywords,
                missing_keywords,
                additional_skills,
                explanation: response.explanation,
            },
            violations,
        )
    }
}
