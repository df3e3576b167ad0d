//! Pipeline Orchestrator: drives one AnalysisRequest through the five remote stages.
//!
//! Flow: validate → upload → (summarize, match_skills) → (cover_letter, cold_email)
//!
//! Stage dependencies:
//! - summarize, match_skills need the extracted texts from upload
//! - cover_letter, cold_email need the summaries
//!
//! In `ExecutionMode::Concurrent` the stages inside each pair run together via
//! `tokio::try_join!`; the generation pair still waits for match_skills so a
//! skill-matching failure never reaches the generators. The first error drops
//! every in-flight sibling and no partial result leaves this module.

use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis_client::{AnalysisService, JobDescriptionPayload, SummaryPair, TextPair};
use crate::input::AnalysisRequest;
use crate::pipeline::result::{AnalysisResult, SkillsMatch};
use crate::pipeline::state::{PipelineError, PipelineState};

/// How independent stages are scheduled. Observable results are identical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    #[default]
    Concurrent,
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(ExecutionMode::Sequential),
            "concurrent" => Ok(ExecutionMode::Concurrent),
            other => Err(format!(
                "unknown pipeline mode '{other}' (expected 'sequential' or 'concurrent')"
            )),
        }
    }
}

/// Owns the `PipelineState` of one request context.
///
/// `run` takes `&mut self`: a second run cannot start while one is in flight.
pub struct Orchestrator {
    service: Arc<dyn AnalysisService>,
    mode: ExecutionMode,
    state: watch::Sender<PipelineState>,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn AnalysisService>, mode: ExecutionMode) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            service,
            mode,
            state,
        }
    }

    /// Read-only stream of state transitions for progress display.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PipelineState {
        self.state.borrow().clone()
    }

    /// Runs the full pipeline for a fresh request.
    ///
    /// Resolves to the complete `AnalysisResult`, or to the first error met.
    /// Either way the final state is terminal (`Complete` or `Failed`).
    pub async fn run(&mut self, request: AnalysisRequest) -> Result<AnalysisResult, PipelineError> {
        let run_id = Uuid::new_v4();
        self.state.send_replace(PipelineState::Idle);

        let outcome = self
            .execute(&request)
            .instrument(info_span!("analysis_run", %run_id, mode = ?self.mode))
            .await;

        match outcome {
            Ok(result) => {
                self.state.send_replace(PipelineState::Complete);
                info!(
                    "Analysis run {} complete: match_score={}",
                    run_id, result.skills_match.match_score
                );
                Ok(result)
            }
            Err(err) => {
                warn!("Analysis run {} failed: {}", run_id, err);
                self.state.send_replace(PipelineState::Failed(err.clone()));
                Err(err)
            }
        }
    }

    async fn execute(&self, request: &AnalysisRequest) -> Result<AnalysisResult, PipelineError> {
        // Nothing goes over the wire until the request passes validation
        let upload = request.validate()?;

        // Stage 1: Upload / extraction
        self.advance(PipelineState::Uploading);
        let extracted = self.service.upload(upload).await?;
        let jd_text = match upload.job_description {
            // Pasted text is its own extraction
            JobDescriptionPayload::Text(text) => text.to_string(),
            JobDescriptionPayload::File(_) => extracted.jd_text,
        };
        let resume_text = extracted.resume_text;
        info!(
            "Extracted texts: resume={} chars, jd={} chars",
            resume_text.len(),
            jd_text.len()
        );

        let texts = TextPair {
            resume_text: &resume_text,
            jd_text: &jd_text,
        };

        // Stages 2 + 3: Summarize, MatchSkills
        let (summaries, skills) = match self.mode {
            ExecutionMode::Sequential => {
                self.advance(PipelineState::Summarizing);
                let summaries = self.service.summarize(texts.clone()).await?;
                self.advance(PipelineState::MatchingSkills);
                let skills = self.service.match_skills(texts).await?;
                (summaries, skills)
            }
            ExecutionMode::Concurrent => {
                self.advance(PipelineState::Summarizing);
                self.advance(PipelineState::MatchingSkills);
                tokio::try_join!(
                    self.service.summarize(texts.clone()),
                    self.service.match_skills(texts)
                )?
            }
        };
        let (skills_match, _violations) = SkillsMatch::from_response(skills);

        let summary_pair = SummaryPair {
            resume_summary: &summaries.resume_summary,
            jd_summary: &summaries.jd_summary,
        };

        // Stages 4 + 5: GenerateCoverLetter, GenerateColdEmail
        let (cover_letter, cold_email) = match self.mode {
            ExecutionMode::Sequential => {
                self.advance(PipelineState::GeneratingCoverLetter);
                let cover_letter = self
                    .service
                    .generate_cover_letter(summary_pair.clone())
                    .await?;
                self.advance(PipelineState::GeneratingColdEmail);
                let cold_email = self.service.generate_cold_email(summary_pair).await?;
                (cover_letter, cold_email)
            }
            ExecutionMode::Concurrent => {
                self.advance(PipelineState::GeneratingCoverLetter);
                self.advance(PipelineState::GeneratingColdEmail);
                tokio::try_join!(
                    self.service.generate_cover_letter(summary_pair.clone()),
                    self.service.generate_cold_email(summary_pair)
                )?
            }
        };

        Ok(AnalysisResult {
            resume_text,
            jd_text,
            resume_summary: summaries.resume_summary,
            jd_summary: summaries.jd_summary,
            skills_match,
            cover_letter: cover_letter.cover_letter,
            cold_email: cold_email.cold_email,
        })
    }

    /// Publishes `next` only if it moves the run forward.
    fn advance(&self, next: PipelineState) {
        let advanced = self.state.send_if_modified(|current| {
            if next.rank() > current.rank() {
                *current = next.clone();
                true
            } else {
                false
            }
        });
        if advanced {
            info!("Pipeline state -> {:?}", next);
        }
    }
}
