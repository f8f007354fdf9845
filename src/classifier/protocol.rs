// Wire format for the image classifier's request/reply exchange.
//
// Request body:  {"image": "<base64>"}
// Reply body:    {"is_safe": bool, "confidence": float, "code": int, "error": string?}
//
// A missing or zero `code` breaks the contract. 4xx means the request was
// bad, 5xx means the worker failed; both must carry an `error` detail.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ClassifierError;

/// Well-known work queue shared by all callers and the worker pool.
pub const DEFAULT_WORK_QUEUE: &str = "nsfw_validation_queue";

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// One image to classify, tagged with a fresh correlation identifier.
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    correlation_id: String,
    image: String,
}

impl ValidationRequest {
    /// Wrap a base64-encoded image with a new, never-reused correlation id.
    pub fn new(image_base64: impl Into<String>) -> Self {
        Self {
            correlation_id: Uuid::new_v4().to_string(),
            image: image_base64.into(),
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// JSON body to publish on the work queue.
    pub fn encode(&self) -> Result<Vec<u8>, ClassifierError> {
        serde_json::to_vec(&RequestBody { image: &self.image }).map_err(ClassifierError::Encode)
    }
}

#[derive(Serialize)]
struct RequestBody<'a> {
    image: &'a str,
}

/// Reply body as the worker sends it.
#[derive(Debug, Deserialize)]
struct RawReply {
    #[serde(default)]
    is_safe: bool,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    error: Option<String>,
}

/// How a reply's status code is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    Success,
    ClientError,
    ServerError,
}

impl ReplyStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            400..=499 => ReplyStatus::ClientError,
            500..=599 => ReplyStatus::ServerError,
            _ => ReplyStatus::Success,
        }
    }
}

/// A successful classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResponse {
    pub is_safe: bool,
    /// Worker confidence in the verdict, 0.0 to 1.0.
    pub confidence: f64,
    pub code: i64,
    /// Detail text, if the worker sent one alongside a success code.
    pub detail: Option<String>,
}

/// Decode a reply body into a response or a typed error.
pub fn decode_reply(body: &[u8]) -> Result<ValidationResponse, ClassifierError> {
    let raw: RawReply =
        serde_json::from_slice(body).map_err(|e| ClassifierError::MalformedReply(e.to_string()))?;

    let code = match raw.code {
        Some(code) if code != 0 => code,
        _ => return Err(ClassifierError::MissingStatusCode),
    };

    let detail = raw.error.filter(|e| !e.is_empty());

    match ReplyStatus::from_code(code) {
        ReplyStatus::ClientError => Err(ClassifierError::BadRequest {
            code,
            detail: detail.ok_or(ClassifierError::MissingErrorDetail { code })?,
        }),
        ReplyStatus::ServerError => Err(ClassifierError::WorkerFailure {
            code,
            detail: detail.ok_or(ClassifierError::MissingErrorDetail { code })?,
        }),
        ReplyStatus::Success => {
            if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
                return Err(ClassifierError::MalformedReply(format!(
                    "confidence {} outside 0.0..=1.0",
                    raw.confidence
                )));
            }
            Ok(ValidationResponse {
                is_safe: raw.is_safe,
                confidence: raw.confidence,
                code,
                detail,
            })
        }
    }
}
