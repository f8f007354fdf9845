// Shared test doubles: an in-memory broker that plays the classifier
// worker from a script, and a stub classifier keyed on image payload.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use tamis::classifier::transport::{Broker, InboundReply, OutboundRequest, ReplySession};
use tamis::classifier::{
    ClassifierError, ImageClassifier, TransportStage, ValidationResponse,
};
use tamis::profanity::{PatternCompiler, ProfanityScanner, WordList};

// ============================================================
// Profanity fixtures
// ============================================================

/// Scanner compiled from a small fixed list per alphabet.
pub fn scanner_from(english: &[&str], russian: &[&str]) -> ProfanityScanner {
    let lists = [
        WordList::from_words("english", english.iter().copied()),
        WordList::from_words("russian", russian.iter().copied()),
    ];
    let matcher = PatternCompiler::default().compile(&lists).unwrap();
    ProfanityScanner::new(matcher)
}

pub fn default_scanner() -> ProfanityScanner {
    scanner_from(&["fuck", "shit", "bitch", "cunt"], &["сука", "хуй", "блядь"])
}

// ============================================================
// Reply bodies
// ============================================================

pub fn safe_body(confidence: f64) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "is_safe": true,
        "confidence": confidence,
        "code": 200
    }))
    .unwrap()
}

pub fn unsafe_body(confidence: f64) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "is_safe": false,
        "confidence": confidence,
        "code": 200
    }))
    .unwrap()
}

pub fn error_body(code: i64, detail: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "code": code, "error": detail })).unwrap()
}

/// A reply correlated with `request`.
pub fn answer(request: &OutboundRequest, body: Vec<u8>) -> InboundReply {
    InboundReply {
        correlation_id: Some(request.correlation_id.clone()),
        body,
    }
}

/// A reply meant for some other caller.
pub fn stray(body: Vec<u8>) -> InboundReply {
    InboundReply {
        correlation_id: Some("not-your-request".to_string()),
        body,
    }
}

// ============================================================
// In-memory broker
// ============================================================

/// Decides what the simulated worker sends back for a published request:
/// a list of (delay, reply) pairs delivered on the caller's reply queue.
pub type Responder =
    Arc<dyn Fn(&OutboundRequest) -> Vec<(Duration, InboundReply)> + Send + Sync>;

#[derive(Clone, Copy, PartialEq)]
pub enum Fault {
    None,
    Unreachable,
    PublishFails,
    /// The reply stream ends right after publish.
    StreamCloses,
    /// Session setup never completes (TCP accepted, handshake never sent).
    ConnectHangs,
    /// The publish confirm never arrives.
    PublishHangs,
    /// Closing the session never completes.
    CloseHangs,
}

pub struct MemoryBroker {
    responder: Responder,
    fault: Fault,
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
    published: Arc<Mutex<Vec<(String, OutboundRequest)>>>,
}

impl MemoryBroker {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&OutboundRequest) -> Vec<(Duration, InboundReply)> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            fault: Fault::None,
            opened: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A worker that never answers.
    pub fn silent() -> Self {
        Self::new(|_| Vec::new())
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }

    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Every (work queue, request) published so far.
    pub fn published(&self) -> Vec<(String, OutboundRequest)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn open_session(&self) -> Result<Box<dyn ReplySession>, ClassifierError> {
        if self.fault == Fault::Unreachable {
            return Err(ClassifierError::transport(
                TransportStage::Connect,
                "connection refused",
            ));
        }
        if self.fault == Fault::ConnectHangs {
            std::future::pending::<()>().await;
        }

        let n = self.opened.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Box::new(MemorySession {
            reply_queue: format!("amq.gen-{n}"),
            tx: Some(tx),
            rx,
            responder: Arc::clone(&self.responder),
            fault: self.fault,
            closed: Arc::clone(&self.closed),
            published: Arc::clone(&self.published),
        }))
    }
}

struct MemorySession {
    reply_queue: String,
    tx: Option<mpsc::UnboundedSender<InboundReply>>,
    rx: mpsc::UnboundedReceiver<InboundReply>,
    responder: Responder,
    fault: Fault,
    closed: Arc<AtomicUsize>,
    published: Arc<Mutex<Vec<(String, OutboundRequest)>>>,
}

#[async_trait]
impl ReplySession for MemorySession {
    fn reply_queue(&self) -> &str {
        &self.reply_queue
    }

    async fn publish(
        &mut self,
        work_queue: &str,
        request: OutboundRequest,
    ) -> Result<(), ClassifierError> {
        if self.fault == Fault::PublishFails {
            return Err(ClassifierError::transport(
                TransportStage::Publish,
                "channel closed",
            ));
        }
        if self.fault == Fault::PublishHangs {
            std::future::pending::<()>().await;
        }

        self.published
            .lock()
            .unwrap()
            .push((work_queue.to_string(), request.clone()));

        let replies = (self.responder)(&request);

        if self.fault == Fault::StreamCloses {
            self.tx = None;
            return Ok(());
        }

        if let Some(tx) = &self.tx {
            for (delay, reply) in replies {
                let tx = tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(reply);
                });
            }
        }
        Ok(())
    }

    async fn next_reply(&mut self) -> Option<Result<InboundReply, ClassifierError>> {
        self.rx.recv().await.map(Ok)
    }

    async fn close(self: Box<Self>) {
        if self.fault == Fault::CloseHangs {
            std::future::pending::<()>().await;
        }
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================
// Stub classifier
// ============================================================

/// What the stub does for one image payload.
#[derive(Clone)]
pub enum Canned {
    Safe,
    Explicit,
    Fail,
}

/// Classifier that answers from a payload -> (delay, canned) table and
/// records how many calls ran at once.
pub struct StubClassifier {
    table: HashMap<String, (Duration, Canned)>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StubClassifier {
    pub fn new(entries: &[(&str, Duration, Canned)]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(k, d, c)| (k.to_string(), (*d, c.clone())))
                .collect(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageClassifier for StubClassifier {
    async fn classify(&self, image_base64: &str) -> Result<ValidationResponse, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let (delay, canned) = self
            .table
            .get(image_base64)
            .cloned()
            .unwrap_or((Duration::ZERO, Canned::Safe));
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match canned {
            Canned::Safe => Ok(ValidationResponse {
                is_safe: true,
                confidence: 0.95,
                code: 200,
                detail: None,
            }),
            Canned::Explicit => Ok(ValidationResponse {
                is_safe: false,
                confidence: 0.98,
                code: 200,
                detail: None,
            }),
            Canned::Fail => Err(ClassifierError::WorkerFailure {
                code: 500,
                detail: "cannot identify image file".to_string(),
            }),
        }
    }
}
