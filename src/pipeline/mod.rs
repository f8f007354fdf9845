// Moderation pipeline: combines the profanity scanner and the image
// classifier fan-out into one verdict per submission.

pub mod moderation;
pub mod submission;
pub mod verdict;

pub use moderation::ModerationPipeline;
pub use submission::{NamedField, Submission, SubmissionKind};
pub use verdict::{RejectReason, Rejection, Verdict};
