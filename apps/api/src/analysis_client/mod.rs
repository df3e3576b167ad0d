//! Analysis Client: the single point of entry for calls to the remote analysis service.
//!
//! ARCHITECTURAL RULE: the orchestrator talks to the service only through the
//! `AnalysisService` trait. `AnalysisClient` is the reqwest-backed implementation;
//! tests substitute their own.
//!
//! Every call is a single attempt. No retries, no backoff: a transport failure is
//! `AnalysisError::Network`, anything the service reports is `AnalysisError::Remote`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod wire;

pub use wire::{
    ColdEmailResponse, CoverLetterResponse, JobDescriptionPayload, MatchSkillsResponse,
    SummarizeResponse, SummaryPair, TextPair, UploadRequest, UploadResponse,
};

use crate::input::FileInput;

pub const UPLOAD_PATH: &str = "/upload";
pub const SUMMARIZE_PATH: &str = "/summarize";
pub const MATCH_SKILLS_PATH: &str = "/match-skills";
pub const COVER_LETTER_PATH: &str = "/generate-cover-letter";
pub const COLD_EMAIL_PATH: &str = "/generate-cold-email";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The transport could not complete the call (connect, timeout, body read).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a well-formed error payload.
    #[error("Remote error ({code}): {message}")]
    Remote { code: String, message: String },
}

/// One async operation per remote stage.
///
/// Carried by the orchestrator as `Arc<dyn AnalysisService>`.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadResponse, AnalysisError>;

    async fn summarize(&self, request: TextPair<'_>) -> Result<SummarizeResponse, AnalysisError>;

    async fn match_skills(
        &self,
        request: TextPair<'_>,
    ) -> Result<MatchSkillsResponse, AnalysisError>;

    async fn generate_cover_letter(
        &self,
        request: SummaryPair<'_>,
    ) -> Result<CoverLetterResponse, AnalysisError>;

    async fn generate_cold_email(
        &self,
        request: SummaryPair<'_>,
    ) -> Result<ColdEmailResponse, AnalysisError>;
}

/// HTTP client for the remote analysis service.
#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AnalysisError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POSTs a JSON body and decodes the stage response.
    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AnalysisError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        read_response(path, response).await
    }
}

async fn read_response<T: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<T, AnalysisError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!("Analysis service returned {} for {}", status, path);
        return Err(wire::decode_failure(status.as_u16(), &body));
    }

    debug!("Analysis service call {} succeeded ({} bytes)", path, body.len());
    wire::decode_body(&body)
}

/// Builds the multipart part for an uploaded file. An unparsable MIME hint is
/// dropped rather than failing the call.
fn file_part(file: &FileInput) -> multipart::Part {
    let part = || multipart::Part::stream(file.bytes.clone()).file_name(file.filename.clone());
    match &file.mime_hint {
        Some(mime) => part().mime_str(mime).unwrap_or_else(|err| {
            warn!("Ignoring invalid MIME hint '{}' for {}: {}", mime, file.filename, err);
            part()
        }),
        None => part(),
    }
}

#[async_trait]
impl AnalysisService for AnalysisClient {
    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadResponse, AnalysisError> {
        let mut form = multipart::Form::new().part("resume", file_part(request.resume));
        form = match request.job_description {
            JobDescriptionPayload::File(file) => form.part("jd_file", file_part(file)),
            JobDescriptionPayload::Text(text) => form.text("jd_text", text.to_string()),
        };

        let response = self
            .client
            .post(self.url(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await?;
        read_response(UPLOAD_PATH, response).await
    }

    async fn summarize(&self, request: TextPair<'_>) -> Result<SummarizeResponse, AnalysisError> {
        self.post_json(SUMMARIZE_PATH, &request).await
    }

    async fn match_skills(
        &self,
        request: TextPair<'_>,
    ) -> Result<MatchSkillsResponse, AnalysisError> {
        self.post_json(MATCH_SKILLS_PATH, &request).await
    }

    async fn generate_cover_letter(
        &self,
        request: SummaryPair<'_>,
    ) -> Result<CoverLetterResponse, AnalysisError> {
        self.post_json(COVER_LETTER_PATH, &request).await
    }

    async fn generate_cold_email(
        &self,
        request: SummaryPair<'_>,
    ) -> Result<ColdEmailResponse, AnalysisError> {
        self.post_json(COLD_EMAIL_PATH, &request).await
    }
}
