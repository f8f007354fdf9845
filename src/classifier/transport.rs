// Broker seam: the minimal surface the classifier client needs from a
// message broker.
//
// A `Broker` opens one `ReplySession` per call. The session owns its own
// connection, channel, and private reply queue; nothing is shared between
// concurrent calls. The AMQP implementation lives in `amqp.rs`; tests swap
// in an in-memory broker.

use async_trait::async_trait;

use super::error::ClassifierError;

/// A request ready to publish on the work queue.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub correlation_id: String,
    /// Name of the session's private reply queue.
    pub reply_to: String,
    /// JSON body.
    pub body: Vec<u8>,
}

/// A message delivered on the reply queue.
#[derive(Debug, Clone)]
pub struct InboundReply {
    pub correlation_id: Option<String>,
    pub body: Vec<u8>,
}

/// One call's worth of broker resources.
#[async_trait]
pub trait ReplySession: Send {
    /// Name of the exclusive, auto-deleted reply queue this session consumes from.
    fn reply_queue(&self) -> &str;

    /// Publish a persistent JSON request on `work_queue`.
    async fn publish(
        &mut self,
        work_queue: &str,
        request: OutboundRequest,
    ) -> Result<(), ClassifierError>;

    /// Wait for the next message on the reply queue.
    ///
    /// `None` means the reply stream ended (connection or channel closed).
    async fn next_reply(&mut self) -> Option<Result<InboundReply, ClassifierError>>;

    /// Release the session's broker resources. Errors are logged, not returned.
    async fn close(self: Box<Self>);
}

/// Opens per-call reply sessions.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Connect, open a channel, declare a private reply queue and start
    /// consuming from it.
    async fn open_session(&self) -> Result<Box<dyn ReplySession>, ClassifierError>;
}
