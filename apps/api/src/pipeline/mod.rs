// Analysis pipeline: request validation, stage sequencing, result aggregation.
// All remote calls go through analysis_client: nothing here talks HTTP directly.

pub mod handlers;
pub mod orchestrator;
pub mod result;
pub mod state;

pub use orchestrator::{ExecutionMode, Orchestrator};
pub use result::{AnalysisResult, SkillsMatch};
pub use state::{PipelineError, PipelineState};
