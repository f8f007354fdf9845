// Image safety classification: request/reply with a remote classifier
// worker over a message broker.
//
// The client speaks to the broker through the `Broker` seam so the wire
// exchange can run against AMQP in production and an in-memory broker in
// tests. The fan-out drives many client calls concurrently.

pub mod amqp;
pub mod client;
pub mod error;
pub mod fanout;
pub mod protocol;
pub mod transport;

pub use client::{
    ClassifierClient, ImageClassifier, DEFAULT_REPLY_TIMEOUT, DEFAULT_SETUP_TIMEOUT,
};
pub use error::{ClassifierError, ErrorKind, TransportStage};
pub use fanout::{FanOut, Outcome};
pub use protocol::{ValidationRequest, ValidationResponse};
