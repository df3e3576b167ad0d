//! AnalysisRequest: the pair of document slots submitted for one pipeline run.

use serde::Serialize;

use crate::analysis_client::{JobDescriptionPayload, UploadRequest};
use crate::input::{DocumentKind, FileInput, InputCollector, InputSource};
use crate::pipeline::PipelineError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub resume: InputSource,
    pub job_description: InputSource,
}

impl AnalysisRequest {
    pub fn new(resume: InputSource, job_description: InputSource) -> Self {
        Self {
            resume,
            job_description,
        }
    }

    pub fn from_collectors(resume: InputCollector, job_description: InputCollector) -> Self {
        Self::new(resume.into_source(), job_description.into_source())
    }

    /// Checks the precondition every run must satisfy before any network call
    /// and returns the typed upload payload on success.
    ///
    /// - resume must be a non-empty file with a resume extension
    /// - job description must be a non-empty file with an accepted extension,
    ///   or non-blank text
    pub fn validate(&self) -> Result<UploadRequest<'_>, PipelineError> {
        let resume = match &self.resume {
            InputSource::File(file) => file,
            InputSource::None => {
                return Err(PipelineError::Validation(
                    "Please upload your resume".to_string(),
                ))
            }
            InputSource::Text { .. } => {
                return Err(PipelineError::Validation(
                    "The resume must be uploaded as a file".to_string(),
                ))
            }
        };
        check_file(resume, DocumentKind::Resume)?;

        let job_description = match &self.job_description {
            InputSource::None => {
                return Err(PipelineError::Validation(
                    "Please provide either a job description file or job description text"
                        .to_string(),
                ))
            }
            InputSource::File(file) => {
                check_file(file, DocumentKind::JobDescription)?;
                JobDescriptionPayload::File(file)
            }
            InputSource::Text { content } => {
                if content.trim().is_empty() {
                    return Err(PipelineError::Validation(
                        "Job description text cannot be empty".to_string(),
                    ));
                }
                JobDescriptionPayload::Text(content)
            }
        };

        Ok(UploadRequest {
            resume,
            job_description,
        })
    }
}

fn check_file(file: &FileInput, kind: DocumentKind) -> Result<(), PipelineError> {
    if file.bytes.is_empty() {
        return Err(PipelineError::Validation(format!(
            "The {} file '{}' is empty",
            kind.label(),
            file.filename
        )));
    }

    let accepted = kind.accepted_extensions();
    match file.extension() {
        Some(ext) if accepted.contains(&ext.as_str()) => Ok(()),
        _ => Err(PipelineError::Validation(format!(
            "Unsupported {} file '{}'. Accepted formats: {}",
            kind.label(),
            file.filename,
            accepted
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}
