//! Result Presentation Model: display-ready values derived from an AnalysisResult.
//!
//! Pure functions only: no I/O, no hidden state. The view layer renders these.

use serde::Serialize;

use crate::pipeline::result::clamp_score;
use crate::pipeline::AnalysisResult;

pub const EXCELLENT_THRESHOLD: f64 = 80.0;
pub const GOOD_THRESHOLD: f64 = 60.0;
pub const FAIR_THRESHOLD: f64 = 40.0;

/// Qualitative bucket for a match score. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl ScoreCategory {
    /// Maps a score in [0, 100] to its category.
    /// Out-of-range input is clamped first (non-finite counts as 0).
    pub fn from_score(score: f64) -> Self {
        let (score, _) = clamp_score(score);
        if score >= EXCELLENT_THRESHOLD {
            ScoreCategory::Excellent
        } else if score >= GOOD_THRESHOLD {
            ScoreCategory::Good
        } else if score >= FAIR_THRESHOLD {
            ScoreCategory::Fair
        } else {
            ScoreCategory::NeedsWork
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            ScoreCategory::Excellent => "Outstanding match!",
            ScoreCategory::Good => "Good match!",
            ScoreCategory::Fair => "Moderate match.",
            ScoreCategory::NeedsWork => "Needs improvement.",
        }
    }
}

/// Everything the results view shows besides the raw texts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub score: f64,
    pub category: ScoreCategory,
    pub headline: &'static str,
    pub matched_count: usize,
    pub missing_count: usize,
    pub additional_count: usize,
    /// matched / (matched + missing), 0.0 when both are empty.
    pub keyword_coverage: f64,
}

impl ResultView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let skills = &result.skills_match;
        let (score, _) = clamp_score(skills.match_score);
        let category = ScoreCategory::from_score(score);

        let matched_count = skills.matched_keywords.len();
        let missing_count = skills.missing_keywords.len();
        let total = matched_count + missing_count;
        let keyword_coverage = if total == 0 {
            0.0
        } else {
            matched_count as f64 / total as f64
        };

        ResultView {
            score,
            category,
            headline: category.headline(),
            matched_count,
            missing_count,
            additional_count: skills.additional_skills.len(),
            keyword_coverage,
        }
    }
}
