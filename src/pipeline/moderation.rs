// Moderation pipeline: one pass/fail verdict per submission.
//
// Text fields go through the profanity scanner (CPU-bound, off the async
// runtime) while images go through the classifier fan-out; both run at
// the same time. Any abusive field, unsafe image, or failed
// classification rejects the submission. An image that could not be
// classified is never treated as safe.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::submission::{NamedField, Submission};
use super::verdict::{Rejection, Verdict};
use crate::classifier::{FanOut, ImageClassifier, Outcome};
use crate::profanity::ProfanityScanner;

pub struct ModerationPipeline {
    scanner: ProfanityScanner,
    fanout: FanOut,
}

impl ModerationPipeline {
    pub fn new(scanner: ProfanityScanner, classifier: Arc<dyn ImageClassifier>) -> Self {
        Self {
            scanner,
            fanout: FanOut::new(classifier),
        }
    }

    /// Use a preconfigured fan-out (e.g. with a concurrency cap).
    pub fn with_fanout(scanner: ProfanityScanner, fanout: FanOut) -> Self {
        Self { scanner, fanout }
    }

    /// Run every check on `submission` and return the verdict.
    ///
    /// Errors here are internal failures of the gate itself (a scan task
    /// panicked), not content problems.
    pub async fn moderate(&self, submission: &Submission) -> Result<Verdict> {
        let started = Instant::now();

        let scanner = self.scanner.clone();
        let texts: Vec<String> = submission
            .texts()
            .iter()
            .map(|f| f.value.clone())
            .collect();
        let scan = tokio::task::spawn_blocking(move || scanner.scan_each(&texts));

        let images: Vec<String> = submission
            .images()
            .iter()
            .map(|f| f.value.clone())
            .collect();

        let (hits, outcomes) = tokio::join!(scan, self.fanout.validate_many(&images));
        let hits = hits.context("profanity scan task failed")?;

        let verdict = decide(submission.texts(), &hits, submission.images(), &outcomes);

        match &verdict {
            Verdict::Accepted => info!(
                kind = %submission.kind(),
                texts = submission.texts().len(),
                images = submission.images().len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Submission accepted"
            ),
            Verdict::Rejected(r) => warn!(
                kind = %submission.kind(),
                reason = %r.reason,
                field = %r.field,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Submission rejected"
            ),
        }

        Ok(verdict)
    }
}

/// Pick the verdict: the first abusive text field wins, then the first
/// image (in input order) that is unsafe or failed to classify.
fn decide(
    texts: &[NamedField],
    hits: &[bool],
    images: &[NamedField],
    outcomes: &[Outcome],
) -> Verdict {
    if let Some((field, _)) = texts.iter().zip(hits).find(|(_, hit)| **hit) {
        return Verdict::Rejected(Rejection::profanity(&field.name));
    }

    for (image, outcome) in images.iter().zip(outcomes) {
        match outcome {
            Ok(resp) if resp.is_safe => {}
            Ok(_) => return Verdict::Rejected(Rejection::unsafe_image(&image.name)),
            Err(e) => return Verdict::Rejected(Rejection::classification_error(&image.name, e)),
        }
    }

    Verdict::Accepted
}
