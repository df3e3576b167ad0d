//! Axum route handlers for the Analysis API.

use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, State,
    },
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::input::{AnalysisRequest, FileInput, InputCollector};
use crate::pipeline::{AnalysisResult, Orchestrator};
use crate::presentation::ResultView;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub result: AnalysisResult,
    pub view: ResultView,
}

/// POST /api/v1/analyze
///
/// Multipart fields: `resume` (file), `jd_file` (file) and/or `jd_text` (string).
/// Blank text and nameless file parts are skipped; otherwise the last job
/// description field wins. Runs the full pipeline on a fresh orchestrator.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let limit = state.config.max_upload_bytes;
    let upload_error = |err: MultipartError| AppError::from_multipart(err, limit);
    let mut resume = InputCollector::resume();
    let mut job_description = InputCollector::job_description();

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                if let Some(file) = read_file(field).await.map_err(upload_error)? {
                    resume.set_file(file);
                }
            }
            "jd_file" => {
                if let Some(file) = read_file(field).await.map_err(upload_error)? {
                    job_description.set_file(file);
                }
            }
            "jd_text" => {
                let text = field.text().await.map_err(upload_error)?;
                if !text.trim().is_empty() {
                    job_description.set_text(text)?;
                }
            }
            other => debug!("Ignoring unknown upload field '{other}'"),
        }
    }

    let request = AnalysisRequest::from_collectors(resume, job_description);
    let mut orchestrator = Orchestrator::new(state.analysis.clone(), state.config.pipeline_mode);
    let result = orchestrator.run(request).await?;
    let view = ResultView::from_result(&result);

    Ok(Json(AnalyzeResponse { result, view }))
}

/// Reads a file part. Parts without a filename are what browsers send for an
/// empty file input, so they count as "no file".
async fn read_file(field: Field<'_>) -> Result<Option<FileInput>, MultipartError> {
    let filename = match field.file_name() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => return Ok(None),
    };
    let mime_hint = field.content_type().map(str::to_string);
    let bytes = field.bytes().await?;
    Ok(Some(FileInput::new(bytes, filename, mime_hint)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::analysis_client::{
        AnalysisError, AnalysisService, ColdEmailResponse, CoverLetterResponse,
        JobDescriptionPayload, MatchSkillsResponse, SummarizeResponse, SummaryPair, TextPair,
        UploadRequest, UploadResponse,
    };
    use crate::config::Config;
    use crate::pipeline::ExecutionMode;
    use crate::routes::build_router;

    const BOUNDARY: &str = "jobfit-test-boundary";

    #[derive(Default)]
    struct EchoService {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AnalysisService for EchoService {
        async fn upload(
            &self,
            request: UploadRequest<'_>,
        ) -> Result<UploadResponse, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let jd_text = match request.job_description {
                JobDescriptionPayload::File(file) => {
                    String::from_utf8_lossy(&file.bytes).to_string()
                }
                JobDescriptionPayload::Text(text) => text.to_string(),
            };
            Ok(UploadResponse {
                resume_text: format!("text of {}", request.resume.filename),
                jd_text,
            })
        }

        async fn summarize(
            &self,
            request: TextPair<'_>,
        ) -> Result<SummarizeResponse, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SummarizeResponse {
                resume_summary: format!("summary of {}", request.resume_text),
                jd_summary: format!("summary of {}", request.jd_text),
            })
        }

        async fn match_skills(
            &self,
            _request: TextPair<'_>,
        ) -> Result<MatchSkillsResponse, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(MatchSkillsResponse {
                match_score: 64.0,
                matched_keywords: vec!["Rust".into(), "SQL".into()],
                missing_keywords: vec!["Kafka".into(), "Go".into()],
                additional_skills: vec![],
                explanation: "Decent overlap".into(),
            })
        }

        async fn generate_cover_letter(
            &self,
            _request: SummaryPair<'_>,
        ) -> Result<CoverLetterResponse, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CoverLetterResponse {
                cover_letter: "Dear hiring team".into(),
            })
        }

        async fn generate_cold_email(
            &self,
            _request: SummaryPair<'_>,
        ) -> Result<ColdEmailResponse, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ColdEmailResponse {
                cold_email: "Subject: Rust role".into(),
            })
        }
    }

    fn test_state(service: Arc<EchoService>) -> AppState {
        limited_state(service, 1024 * 1024)
    }

    fn limited_state(service: Arc<EchoService>, max_upload_bytes: usize) -> AppState {
        AppState {
            analysis: service,
            config: Config {
                analysis_service_url: "http://unused".into(),
                analysis_timeout: Duration::from_secs(1),
                pipeline_mode: ExecutionMode::Concurrent,
                max_upload_bytes,
                port: 0,
                rust_log: "info".into(),
            },
        }
    }

    enum Part<'a> {
        File(&'a str, &'a str, &'a str),
        Text(&'a str, &'a str),
    }

    fn multipart_body(parts: &[Part<'_>]) -> String {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match part {
                Part::File(name, filename, content) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n{content}\r\n"
                    ));
                }
                Part::Text(name, value) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                    ));
                }
            }
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    async fn post_analyze(state: AppState, parts: &[Part<'_>]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();

        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_with_pasted_job_description() {
        let service = Arc::new(EchoService::default());
        let (status, body) = post_analyze(
            test_state(service.clone()),
            &[
                Part::File("resume", "r.pdf", "%PDF-1.4"),
                Part::Text("jd_text", "Seeking engineer..."),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["resume_text"], "text of r.pdf");
        assert_eq!(body["result"]["jd_text"], "Seeking engineer...");
        assert_eq!(body["result"]["cover_letter"], "Dear hiring team");
        assert_eq!(body["view"]["category"], "good");
        assert_eq!(body["view"]["keyword_coverage"], 0.5);
        assert_eq!(service.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_blank_text_does_not_clear_job_description_file() {
        let service = Arc::new(EchoService::default());
        let (status, body) = post_analyze(
            test_state(service),
            &[
                Part::File("resume", "r.docx", "resume bytes"),
                Part::File("jd_file", "jd.txt", "Platform engineer"),
                Part::Text("jd_text", ""),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["jd_text"], "Platform engineer");
    }

    #[tokio::test]
    async fn test_missing_resume_is_rejected_without_remote_calls() {
        let service = Arc::new(EchoService::default());
        let (status, body) = post_analyze(
            test_state(service.clone()),
            &[Part::Text("jd_text", "Seeking engineer...")],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["retryable"], false);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_job_description_is_rejected() {
        let service = Arc::new(EchoService::default());
        let (status, _) = post_analyze(
            test_state(service.clone()),
            &[Part::File("resume", "r.pdf", "%PDF-1.4")],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_payload_too_large() {
        let service = Arc::new(EchoService::default());
        let big_resume = "x".repeat(4096);
        let (status, body) = post_analyze(
            limited_state(service.clone(), 1024),
            &[
                Part::File("resume", "r.pdf", &big_resume),
                Part::Text("jd_text", "Seeking engineer..."),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(body["error"]["retryable"], false);
        assert!(body["error"]["message"].as_str().unwrap().contains("1024"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let response = build_router(test_state(Arc::new(EchoService::default())))
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
