// Moderation verdicts.
//
// Content violations are values, not errors: a rejected submission is a
// normal outcome and carries which check failed and on which field.

use std::fmt;

use crate::classifier::{ClassifierError, ErrorKind};

/// Why a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    ProfanityDetected,
    UnsafeImage,
    ClassificationError,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::ProfanityDetected => "profanity-detected",
            RejectReason::UnsafeImage => "unsafe-image",
            RejectReason::ClassificationError => "classification-error",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub reason: RejectReason,
    /// Name of the text field or image that triggered the rejection.
    pub field: String,
    /// Human-readable explanation for the submitter.
    pub message: String,
    /// Set for classification errors, to tell transport, protocol,
    /// application and timeout failures apart.
    pub error_kind: Option<ErrorKind>,
}

impl Rejection {
    pub fn profanity(field: &str) -> Self {
        Self {
            reason: RejectReason::ProfanityDetected,
            field: field.to_string(),
            message: format!("{field} contains insulting words"),
            error_kind: None,
        }
    }

    pub fn unsafe_image(field: &str) -> Self {
        Self {
            reason: RejectReason::UnsafeImage,
            field: field.to_string(),
            message: format!(
                "{field} you are trying to publish seems to be explicit content and not suitable for work"
            ),
            error_kind: None,
        }
    }

    pub fn classification_error(field: &str, error: &ClassifierError) -> Self {
        let kind = error.kind();
        let cause = match kind {
            ErrorKind::Transport | ErrorKind::Protocol => "classification unavailable",
            ErrorKind::Application => "classifier refused the image",
            ErrorKind::Timeout => "classifier did not answer in time",
        };
        Self {
            reason: RejectReason::ClassificationError,
            field: field.to_string(),
            message: format!("{field} could not be verified: {cause} ({error})"),
            error_kind: Some(kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Accepted => None,
            Verdict::Rejected(r) => Some(r),
        }
    }

    pub fn reason(&self) -> Option<RejectReason> {
        self.rejection().map(|r| r.reason)
    }
}
