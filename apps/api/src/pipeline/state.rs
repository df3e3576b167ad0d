//! Pipeline state and the typed error a run terminates with.

use serde::Serialize;
use thiserror::Error;

use crate::analysis_client::AnalysisError;

/// Terminal error of a pipeline run. Cloneable so it can sit inside
/// `PipelineState::Failed` and still be returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PipelineError {
    /// The request is malformed or incomplete. Caught before any remote call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The transport could not complete a call.
    #[error("Network error: {0}")]
    Network(String),

    /// The service reported a failure.
    #[error("Remote error ({code}): {message}")]
    Remote { code: String, message: String },
}

impl PipelineError {
    /// `false` means "fix your input", `true` means "try again later".
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PipelineError::Validation(_))
    }
}

impl From<AnalysisError> for PipelineError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Network(e) => PipelineError::Network(e.to_string()),
            AnalysisError::Remote { code, message } => PipelineError::Remote { code, message },
        }
    }
}

/// Progress of a single pipeline run. Stage variants follow the stage numbering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    Idle,
    Uploading,
    Summarizing,
    MatchingSkills,
    GeneratingCoverLetter,
    GeneratingColdEmail,
    Complete,
    Failed(PipelineError),
}

impl PipelineState {
    /// Position in the run's lifecycle. Both terminal states share the top rank.
    pub fn rank(&self) -> u8 {
        match self {
            PipelineState::Idle => 0,
            PipelineState::Uploading => 1,
            PipelineState::Summarizing => 2,
            PipelineState::MatchingSkills => 3,
            PipelineState::GeneratingCoverLetter => 4,
            PipelineState::GeneratingColdEmail => 5,
            PipelineState::Complete | PipelineState::Failed(_) => 6,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed(_))
    }
}
