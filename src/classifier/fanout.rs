// Fan-out orchestrator: classify many images at once.
//
// One task per image, all joined before returning. Outcomes come back in
// input order whatever order the calls finish in, and one call failing
// never cancels the others.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::info;

use super::client::ImageClassifier;
use super::error::ClassifierError;
use super::protocol::ValidationResponse;

/// Result of classifying one image in a fan-out.
pub type Outcome = Result<ValidationResponse, ClassifierError>;

/// Issues concurrent classifier calls and joins them.
#[derive(Clone)]
pub struct FanOut {
    classifier: Arc<dyn ImageClassifier>,
    max_in_flight: Option<usize>,
}

impl FanOut {
    /// Unbounded fan-out: one in-flight call per image.
    pub fn new(classifier: Arc<dyn ImageClassifier>) -> Self {
        Self {
            classifier,
            max_in_flight: None,
        }
    }

    /// Cap concurrent calls within each `validate_many` at `max_in_flight`
    /// (at least one). Extra calls wait for a slot; ordering and isolation
    /// are unchanged. Separate `validate_many` calls, including those on
    /// clones, never share slots.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = Some(max_in_flight.max(1));
        self
    }

    /// Classify every image, returning outcomes aligned with `images`.
    pub async fn validate_many(&self, images: &[String]) -> Vec<Outcome> {
        let started = Instant::now();
        let limit = self.max_in_flight.map(|n| Arc::new(Semaphore::new(n)));

        let tasks = images.iter().cloned().map(|image| {
            let classifier = Arc::clone(&self.classifier);
            let limit = limit.clone();
            tokio::spawn(classify_one(classifier, image, limit))
        });

        let outcomes: Vec<Outcome> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap_or_else(|e| Err(ClassifierError::Aborted(e.to_string()))))
            .collect();

        info!(
            images = outcomes.len(),
            failed = outcomes.iter().filter(|o| o.is_err()).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Image fan-out complete"
        );

        outcomes
    }
}

async fn classify_one(
    classifier: Arc<dyn ImageClassifier>,
    image: String,
    limit: Option<Arc<Semaphore>>,
) -> Outcome {
    let _permit = match limit {
        Some(sem) => Some(
            sem.acquire_owned()
                .await
                .map_err(|e| ClassifierError::Aborted(e.to_string()))?,
        ),
        None => None,
    };
    classifier.classify(&image).await
}
