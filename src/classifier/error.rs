// Classifier error taxonomy.
//
// Every failure of a single classification call lands here. None of them
// are retried by this crate, and none of them leak into sibling calls of a
// fan-out.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// The broker operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStage {
    Connect,
    OpenChannel,
    DeclareQueue,
    RegisterConsumer,
    Publish,
    ReceiveReply,
}

impl fmt::Display for TransportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportStage::Connect => "connecting to the broker",
            TransportStage::OpenChannel => "opening a channel",
            TransportStage::DeclareQueue => "declaring the reply queue",
            TransportStage::RegisterConsumer => "registering the reply consumer",
            TransportStage::Publish => "publishing the request",
            TransportStage::ReceiveReply => "receiving the reply",
        };
        f.write_str(s)
    }
}

/// Coarse grouping of [`ClassifierError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Broker unreachable, channel/queue/publish failures.
    Transport,
    /// The reply arrived but broke the wire contract.
    Protocol,
    /// The worker answered with a 4xx/5xx status.
    Application,
    /// No reply before the deadline.
    Timeout,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("transport failure while {stage}: {detail}")]
    Transport {
        stage: TransportStage,
        detail: String,
    },

    #[error("failed to encode classification request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("malformed reply body: {0}")]
    MalformedReply(String),

    #[error("reply carried no status code")]
    MissingStatusCode,

    #[error("reply with status {code} carried no error detail")]
    MissingErrorDetail { code: i64 },

    #[error("classifier rejected the request ({code}): {detail}")]
    BadRequest { code: i64, detail: String },

    #[error("classifier worker failed ({code}): {detail}")]
    WorkerFailure { code: i64, detail: String },

    #[error("no reply received within {0:?}")]
    Timeout(Duration),

    #[error("classification task aborted: {0}")]
    Aborted(String),
}

impl ClassifierError {
    pub fn transport(stage: TransportStage, detail: impl fmt::Display) -> Self {
        ClassifierError::Transport {
            stage,
            detail: detail.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassifierError::Transport { .. } | ClassifierError::Aborted(_) => {
                ErrorKind::Transport
            }
            ClassifierError::Encode(_)
            | ClassifierError::MalformedReply(_)
            | ClassifierError::MissingStatusCode
            | ClassifierError::MissingErrorDetail { .. } => ErrorKind::Protocol,
            ClassifierError::BadRequest { .. } | ClassifierError::WorkerFailure { .. } => {
                ErrorKind::Application
            }
            ClassifierError::Timeout(_) => ErrorKind::Timeout,
        }
    }

    /// Remote-supplied detail text, for application errors.
    pub fn remote_detail(&self) -> Option<&str> {
        match self {
            ClassifierError::BadRequest { detail, .. }
            | ClassifierError::WorkerFailure { detail, .. } => Some(detail.as_str()),
            _ => None,
        }
    }
}
