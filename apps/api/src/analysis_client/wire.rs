//! Request/response shapes of the remote analysis service, one pair per stage.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::analysis_client::AnalysisError;
use crate::input::FileInput;

/// How the job description travels in the Upload stage.
#[derive(Debug, Clone, Copy)]
pub enum JobDescriptionPayload<'a> {
    File(&'a FileInput),
    Text(&'a str),
}

/// Upload stage request: multipart with `resume` plus `jd_file` or `jd_text`.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    pub resume: &'a FileInput,
    pub job_description: JobDescriptionPayload<'a>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub resume_text: String,
    pub jd_text: String,
}

/// Body shared by Summarize and MatchSkills.
#[derive(Debug, Clone, Serialize)]
pub struct TextPair<'a> {
    pub resume_text: &'a str,
    pub jd_text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummarizeResponse {
    pub resume_summary: String,
    pub jd_summary: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchSkillsResponse {
    pub match_score: f64,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub additional_skills: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

/// Body shared by GenerateCoverLetter and GenerateColdEmail.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryPair<'a> {
    pub resume_summary: &'a str,
    pub jd_summary: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColdEmailResponse {
    pub cold_email: String,
}

/// Error payloads the service is known to send: a bare string
/// (`{"error": "..."}`) or a structured object (`{"error": {"code", "message"}}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Message(String),
    Structured {
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

/// Extracts a service-reported error from a JSON body, if there is one.
/// Empty strings and `null` are not errors.
pub(crate) fn remote_error(body: &Value) -> Option<AnalysisError> {
    let field = body.get("error")?;
    match serde_json::from_value::<ErrorField>(field.clone()).ok()? {
        ErrorField::Message(message) if !message.trim().is_empty() => Some(AnalysisError::Remote {
            code: "REMOTE_ERROR".to_string(),
            message,
        }),
        ErrorField::Message(_) => None,
        ErrorField::Structured { code, message } => {
            if code.is_none() && message.as_deref().map_or(true, |m| m.trim().is_empty()) {
                return None;
            }
            Some(AnalysisError::Remote {
                code: code.unwrap_or_else(|| "REMOTE_ERROR".to_string()),
                message: message.unwrap_or_default(),
            })
        }
    }
}

/// Decodes a successful (2xx) body into the stage's response type.
/// An `error` field wins over transport-level success.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, AnalysisError> {
    let value: Value = serde_json::from_str(body).map_err(|e| AnalysisError::Remote {
        code: "MALFORMED_RESPONSE".to_string(),
        message: format!("Response body is not valid JSON: {e}"),
    })?;

    if let Some(err) = remote_error(&value) {
        return Err(err);
    }

    serde_json::from_value(value).map_err(|e| AnalysisError::Remote {
        code: "MALFORMED_RESPONSE".to_string(),
        message: format!("Response does not match the expected shape: {e}"),
    })
}

/// Maps a non-2xx response to a remote error, preferring the service's own payload.
pub(crate) fn decode_failure(status: u16, body: &str) -> AnalysisError {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| remote_error(&value))
        .unwrap_or_else(|| AnalysisError::Remote {
            code: format!("HTTP_{status}"),
            message: body.trim().to_string(),
        })
}
