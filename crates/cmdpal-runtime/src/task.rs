#![forbid(unsafe_code)]

//! Generation-tagged request/response plumbing for background work.
//!
//! Work that may finish after the caller has moved on (an asynchronous
//! search, say) is modeled as an explicit request tagged with a generation
//! number. The owner keeps a [`GenerationCounter`]; each new request calls
//! [`GenerationCounter::advance`], which makes every older
//! [`CancellationToken`] report cancelled. Results come back through a
//! [`ReplyChannel`] as [`Response`]s carrying the generation they answer, so
//! the owner can drop stale ones on arrival.
//!
//! Cancellation here means superseding, not aborting: a worker that ignores
//! its token still runs to completion, its answer is simply discarded.
//!
//! # Invariants
//!
//! 1. Generations are strictly increasing; the first issued is 1.
//! 2. A [`Responder`] delivers exactly one [`Response`]. Dropping it
//!    unanswered delivers [`TaskError::Abandoned`], so the owner never
//!    waits forever.
//! 3. Responders are `Send`: replies may come from any thread and are
//!    drained on the owner's thread.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;

/// Why a task produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The work itself failed.
    Failed(String),
    /// The work noticed it was superseded and stopped early.
    Cancelled,
    /// The responder was dropped without an answer.
    Abandoned,
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Failed(msg) => write!(f, "task failed: {msg}"),
            TaskError::Cancelled => write!(f, "task cancelled"),
            TaskError::Abandoned => write!(f, "task abandoned without a response"),
        }
    }
}

impl std::error::Error for TaskError {}

/// Monotonic source of request generations.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    latest: Arc<AtomicU64>,
}

impl GenerationCounter {
    /// Create a counter. No generation has been issued yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next generation, cancelling all earlier tokens.
    pub fn advance(&self) -> CancellationToken {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        CancellationToken {
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    /// The most recently issued generation (0 before the first).
    #[must_use]
    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Whether `generation` is still the latest.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

/// A handle a worker can poll to learn it has been superseded.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl CancellationToken {
    /// The generation this token belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a newer generation has been issued.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.latest.load(Ordering::Acquire) != self.generation
    }
}

/// An answer to a tagged request.
#[derive(Debug)]
pub struct Response<T> {
    /// Generation of the request this answers.
    pub generation: u64,
    /// The value, or why there is none.
    pub outcome: Result<T, TaskError>,
}

/// Single-consumer channel that collects responses for one owner.
#[derive(Debug)]
pub struct ReplyChannel<T> {
    sender: mpsc::Sender<Response<T>>,
    receiver: mpsc::Receiver<Response<T>>,
}

impl<T> ReplyChannel<T> {
    /// Create an empty channel.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    /// Create a responder that answers the request behind `token`.
    #[must_use]
    pub fn responder(&self, token: CancellationToken) -> Responder<T> {
        Responder {
            token,
            sender: Some(self.sender.clone()),
        }
    }

    /// Take the next delivered response without blocking.
    pub fn try_next(&self) -> Option<Response<T>> {
        self.receiver.try_recv().ok()
    }
}

impl<T> Default for ReplyChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The sending half handed to whoever performs the work.
pub struct Responder<T> {
    token: CancellationToken,
    sender: Option<mpsc::Sender<Response<T>>>,
}

impl<T> Responder<T> {
    /// The cancellation token of the request.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Shorthand for `token().is_cancelled()`.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Deliver a value.
    pub fn resolve(mut self, value: T) {
        self.send(Ok(value));
    }

    /// Deliver a failure.
    pub fn reject(mut self, error: TaskError) {
        self.send(Err(error));
    }

    fn send(&mut self, outcome: Result<T, TaskError>) {
        if let Some(sender) = self.sender.take() {
            // The owner may be gone; there is nobody left to tell.
            let _ = sender.send(Response {
                generation: self.token.generation,
                outcome,
            });
        }
    }
}

impl<T> Drop for Responder<T> {
    fn drop(&mut self) {
        if self.sender.is_some() {
            tracing::trace!(
                generation = self.token.generation,
                "responder dropped unanswered"
            );
            self.send(Err(TaskError::Abandoned));
        }
    }
}

impl<T> fmt::Debug for Responder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("generation", &self.token.generation)
            .field("answered", &self.sender.is_none())
            .finish()
    }
}

/// Run `work` on a new thread and answer through `responder`.
///
/// Work whose request was superseded before the thread started is skipped
/// and answered with [`TaskError::Cancelled`].
pub fn spawn<T, F>(responder: Responder<T>, work: F) -> thread::JoinHandle<()>
where
    T: Send + 'static,
    F: FnOnce(&CancellationToken) -> Result<T, TaskError> + Send + 'static,
{
    thread::spawn(move || {
        if responder.is_cancelled() {
            responder.reject(TaskError::Cancelled);
            return;
        }
        let token = responder.token().clone();
        match work(&token) {
            Ok(value) => responder.resolve(value),
            Err(error) => responder.reject(error),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_increase_from_one() {
        let counter = GenerationCounter::new();
        assert_eq!(counter.current(), 0);
        let first = counter.advance();
        let second = counter.advance();
        assert_eq!(first.generation(), 1);
        assert_eq!(second.generation(), 2);
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(counter.is_current(2));
    }

    #[test]
    fn resolve_delivers_tagged_response() {
        let counter = GenerationCounter::new();
        let channel = ReplyChannel::new();
        channel.responder(counter.advance()).resolve(42);
        let response = channel.try_next().expect("response delivered");
        assert_eq!(response.generation, 1);
        assert_eq!(response.outcome, Ok(42));
        assert!(channel.try_next().is_none());
    }

    #[test]
    fn reject_delivers_error() {
        let counter = GenerationCounter::new();
        let channel: ReplyChannel<u32> = ReplyChannel::new();
        channel
            .responder(counter.advance())
            .reject(TaskError::Failed("offline".into()));
        let response = channel.try_next().unwrap();
        assert_eq!(response.outcome, Err(TaskError::Failed("offline".into())));
    }

    #[test]
    fn dropped_responder_reports_abandoned() {
        let counter = GenerationCounter::new();
        let channel: ReplyChannel<u32> = ReplyChannel::new();
        drop(channel.responder(counter.advance()));
        let response = channel.try_next().unwrap();
        assert_eq!(response.outcome, Err(TaskError::Abandoned));
    }

    #[test]
    fn spawn_answers_from_worker_thread() {
        let counter = GenerationCounter::new();
        let channel = ReplyChannel::new();
        let handle = spawn(channel.responder(counter.advance()), |_| Ok("done"));
        handle.join().unwrap();
        assert_eq!(channel.try_next().unwrap().outcome, Ok("done"));
    }

    #[test]
    fn spawn_skips_superseded_work() {
        let counter = GenerationCounter::new();
        let channel = ReplyChannel::new();
        let responder = channel.responder(counter.advance());
        counter.advance();
        let handle = spawn(responder, |_| -> Result<u8, TaskError> {
            panic!("superseded work must not run")
        });
        handle.join().unwrap();
        let response = channel.try_next().unwrap();
        assert_eq!(response.generation, 1);
        assert_eq!(response.outcome, Err(TaskError::Cancelled));
    }

    #[test]
    fn responder_outliving_channel_does_not_panic() {
        let counter = GenerationCounter::new();
        let channel: ReplyChannel<u8> = ReplyChannel::new();
        let responder = channel.responder(counter.advance());
        drop(channel);
        responder.resolve(1);
    }
}
