// Classifier client: one request/reply round trip with the remote image
// classifier, synchronous from the caller's point of view.
//
// Sequence per call: open a session (private reply queue, consumer
// attached), mint a correlation id, publish to the work queue, then wait
// for the reply carrying that id or for the deadline. Replies with any
// other id are dropped and the wait continues. Session setup, publish and
// close each get their own deadline, so a broker that accepts TCP and then
// goes quiet fails the call instead of hanging it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::error::{ClassifierError, TransportStage};
use super::protocol::{decode_reply, ValidationRequest, ValidationResponse, DEFAULT_WORK_QUEUE};
use super::transport::{Broker, OutboundRequest, ReplySession};

/// Per-call reply deadline, measured from publish.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(15);

/// Deadline for each broker step outside the reply wait: opening the
/// session, publishing, and closing.
pub const DEFAULT_SETUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can classify one base64-encoded image.
///
/// The fan-out and the moderation pipeline depend on this trait, not on
/// the broker client, so tests can substitute scripted classifiers.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    async fn classify(&self, image_base64: &str) -> Result<ValidationResponse, ClassifierError>;
}

/// Broker-backed image classifier.
pub struct ClassifierClient {
    broker: Arc<dyn Broker>,
    work_queue: String,
    reply_timeout: Duration,
    setup_timeout: Duration,
}

impl ClassifierClient {
    pub fn new(broker: Arc<dyn Broker>) -> Self {
        Self {
            broker,
            work_queue: DEFAULT_WORK_QUEUE.to_string(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            setup_timeout: DEFAULT_SETUP_TIMEOUT,
        }
    }

    pub fn with_work_queue(mut self, work_queue: impl Into<String>) -> Self {
        self.work_queue = work_queue.into();
        self
    }

    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    pub fn with_setup_timeout(mut self, setup_timeout: Duration) -> Self {
        self.setup_timeout = setup_timeout;
        self
    }

    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    pub fn setup_timeout(&self) -> Duration {
        self.setup_timeout
    }

    /// Run one classification round trip.
    pub async fn validate(
        &self,
        image_base64: &str,
    ) -> Result<ValidationResponse, ClassifierError> {
        let request = ValidationRequest::new(image_base64);
        let body = request.encode()?;

        let mut session = tokio::time::timeout(self.setup_timeout, self.broker.open_session())
            .await
            .map_err(|_| {
                ClassifierError::transport(
                    TransportStage::Connect,
                    format!("no session within {:?}", self.setup_timeout),
                )
            })??;
        let result = self.exchange(session.as_mut(), &request, body).await;
        if tokio::time::timeout(self.setup_timeout, session.close())
            .await
            .is_err()
        {
            warn!(
                correlation_id = request.correlation_id(),
                "Session close timed out, dropping it"
            );
        }

        match &result {
            Ok(resp) => debug!(
                correlation_id = request.correlation_id(),
                is_safe = resp.is_safe,
                confidence = resp.confidence,
                "Image classified"
            ),
            Err(e) => warn!(
                correlation_id = request.correlation_id(),
                error = %e,
                "Image classification failed"
            ),
        }

        result
    }

    async fn exchange(
        &self,
        session: &mut dyn ReplySession,
        request: &ValidationRequest,
        body: Vec<u8>,
    ) -> Result<ValidationResponse, ClassifierError> {
        let reply_queue = session.reply_queue().to_string();
        let publish = session.publish(
            &self.work_queue,
            OutboundRequest {
                correlation_id: request.correlation_id().to_string(),
                reply_to: reply_queue.clone(),
                body,
            },
        );
        tokio::time::timeout(self.setup_timeout, publish)
            .await
            .map_err(|_| {
                ClassifierError::transport(
                    TransportStage::Publish,
                    format!("publish not confirmed within {:?}", self.setup_timeout),
                )
            })??;

        let deadline = Instant::now() + self.reply_timeout;
        loop {
            let reply = match tokio::time::timeout_at(deadline, session.next_reply()).await {
                Err(_) => return Err(ClassifierError::Timeout(self.reply_timeout)),
                Ok(None) => {
                    return Err(ClassifierError::transport(
                        TransportStage::ReceiveReply,
                        "reply stream closed before a reply arrived",
                    ))
                }
                Ok(Some(reply)) => reply?,
            };

            if reply.correlation_id.as_deref() != Some(request.correlation_id()) {
                warn!(
                    expected = request.correlation_id(),
                    received = ?reply.correlation_id,
                    reply_queue = %reply_queue,
                    "Discarding reply with mismatched correlation id"
                );
                continue;
            }

            return decode_reply(&reply.body);
        }
    }
}

#[async_trait]
impl ImageClassifier for ClassifierClient {
    async fn classify(&self, image_base64: &str) -> Result<ValidationResponse, ClassifierError> {
        self.validate(image_base64).await
    }
}
