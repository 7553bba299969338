#![forbid(unsafe_code)]

//! Filter orchestration: sync or async filters with stale-result dropping.
//!
//! Every [`FilterEngine::request`] gets a fresh generation. A filter either
//! answers immediately with [`FilterReply::Ready`] or calls
//! [`FilterRequest::defer`] to obtain a [`Responder`] and returns
//! [`FilterReply::Pending`]. Deferred answers arrive through a reply
//! channel that [`FilterEngine::poll`] drains; answers for any generation
//! other than the latest are discarded.
//!
//! # Invariants
//!
//! 1. `results()` is the latest settled result; before the first one it is
//!    the unfiltered input of the latest request.
//! 2. `is_loading()` is true only between a deferred request and the
//!    arrival (or failure) of its own answer.
//! 3. A failed or abandoned request clears loading and keeps the last
//!    settled result.
//! 4. Synchronous results never raise the loading flag.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use cmdpal_runtime::task::{
    self, CancellationToken, GenerationCounter, ReplyChannel, Responder, TaskError,
};

use super::command::Command;
use super::scorer::score_command;

// ---------------------------------------------------------------------------
// Filter contract
// ---------------------------------------------------------------------------

/// One filter invocation.
pub struct FilterRequest<'a> {
    items: &'a [Command],
    query: &'a str,
    token: CancellationToken,
    replies: &'a ReplyChannel<Vec<Command>>,
    deferred: Cell<bool>,
}

impl<'a> FilterRequest<'a> {
    /// Candidates at the active level.
    pub fn items(&self) -> &'a [Command] {
        self.items
    }

    /// The query text.
    pub fn query(&self) -> &'a str {
        self.query
    }

    /// Cancellation token for this request's generation.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Take a responder to answer later. Pair with [`FilterReply::Pending`].
    pub fn defer(&self) -> Responder<Vec<Command>> {
        self.deferred.set(true);
        self.replies.responder(self.token.clone())
    }
}

/// Immediate answer from a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterReply {
    /// The result, available now.
    Ready(Vec<Command>),
    /// The answer will come through the deferred responder.
    Pending,
}

/// A pluggable filter.
///
/// Plain functions and closures of shape `Fn(&[Command], &str) -> Vec<Command>`
/// are synchronous filters.
pub trait CommandFilter {
    /// Filter `request.items()` by `request.query()`.
    fn filter(&self, request: &FilterRequest<'_>) -> FilterReply;
}

impl<F> CommandFilter for F
where
    F: Fn(&[Command], &str) -> Vec<Command>,
{
    fn filter(&self, request: &FilterRequest<'_>) -> FilterReply {
        FilterReply::Ready(self(request.items(), request.query()))
    }
}

// ---------------------------------------------------------------------------
// Stock filters
// ---------------------------------------------------------------------------

/// Score label and keywords, drop non-matches, sort by descending score.
///
/// Ties keep input order. An empty query returns the input unchanged.
pub fn default_filter(items: &[Command], query: &str) -> Vec<Command> {
    if query.is_empty() {
        return items.to_vec();
    }
    let mut scored: Vec<(f64, &Command)> = items
        .iter()
        .filter_map(|c| score_command(c, query).map(|s| (s, c)))
        .collect();
    // sort_by is stable.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, c)| c.clone()).collect()
}

/// The built-in synchronous filter, backed by [`default_filter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilter;

impl CommandFilter for DefaultFilter {
    fn filter(&self, request: &FilterRequest<'_>) -> FilterReply {
        FilterReply::Ready(default_filter(request.items(), request.query()))
    }
}

/// Runs a blocking filter on a background thread per request.
///
/// The function receives the request's cancellation token and may return
/// `Err(TaskError::Cancelled)` once it is cancelled.
pub struct ThreadedFilter<F> {
    work: Arc<F>,
}

impl<F> ThreadedFilter<F>
where
    F: Fn(&[Command], &str, &CancellationToken) -> Result<Vec<Command>, TaskError>
        + Send
        + Sync
        + 'static,
{
    /// Wrap a blocking filter function.
    pub fn new(work: F) -> Self {
        Self {
            work: Arc::new(work),
        }
    }
}

impl<F> CommandFilter for ThreadedFilter<F>
where
    F: Fn(&[Command], &str, &CancellationToken) -> Result<Vec<Command>, TaskError>
        + Send
        + Sync
        + 'static,
{
    fn filter(&self, request: &FilterRequest<'_>) -> FilterReply {
        let responder = request.defer();
        let items = request.items().to_vec();
        let query = request.query().to_string();
        let work = Arc::clone(&self.work);
        task::spawn(responder, move |token| work(&items, &query, token));
        FilterReply::Pending
    }
}

impl<F> fmt::Debug for ThreadedFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadedFilter").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Applies a filter, tracks loading, and drops stale async answers.
pub struct FilterEngine {
    filter: Box<dyn CommandFilter>,
    generations: GenerationCounter,
    replies: ReplyChannel<Vec<Command>>,
    input: Vec<Command>,
    settled: Option<Vec<Command>>,
    loading: bool,
    revision: u64,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(Box::new(DefaultFilter))
    }
}

impl FilterEngine {
    /// Create an engine around `filter`.
    pub fn new(filter: Box<dyn CommandFilter>) -> Self {
        Self {
            filter,
            generations: GenerationCounter::new(),
            replies: ReplyChannel::new(),
            input: Vec::new(),
            settled: None,
            loading: false,
            revision: 0,
        }
    }

    /// Run the filter over `items` for `query`, superseding any outstanding
    /// request. Returns the request's generation.
    pub fn request(&mut self, items: &[Command], query: &str) -> u64 {
        let token = self.generations.advance();
        let generation = token.generation();
        let request = FilterRequest {
            items,
            query,
            token,
            replies: &self.replies,
            deferred: Cell::new(false),
        };
        let reply = self.filter.filter(&request);
        let deferred = request.deferred.get();

        self.input = items.to_vec();
        match reply {
            FilterReply::Ready(result) => {
                tracing::trace!(generation, count = result.len(), "filter settled synchronously");
                self.settle(result);
            }
            FilterReply::Pending if deferred => {
                tracing::trace!(generation, "filter pending");
                self.loading = true;
            }
            FilterReply::Pending => {
                tracing::warn!(generation, "filter returned Pending without deferring");
                self.loading = false;
            }
        }
        generation
    }

    /// Apply answers that arrived since the last poll.
    ///
    /// Returns true when the visible result changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Some(response) = self.replies.try_next() {
            if !self.generations.is_current(response.generation) {
                tracing::trace!(
                    generation = response.generation,
                    latest = self.generations.current(),
                    "discarding stale filter response"
                );
                continue;
            }
            match response.outcome {
                Ok(result) => {
                    tracing::trace!(
                        generation = response.generation,
                        count = result.len(),
                        "filter settled"
                    );
                    self.settle(result);
                    changed = true;
                }
                Err(error) => {
                    tracing::debug!(generation = response.generation, %error, "filter failed");
                    self.loading = false;
                }
            }
        }
        changed
    }

    fn settle(&mut self, result: Vec<Command>) {
        self.settled = Some(result);
        self.loading = false;
        self.revision = self.revision.wrapping_add(1);
    }

    /// The visible result.
    pub fn results(&self) -> &[Command] {
        self.settled.as_deref().unwrap_or(&self.input)
    }

    /// Whether the latest request is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Generation of the latest request (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generations.current()
    }

    /// Bumped every time a result settles.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl fmt::Debug for FilterEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEngine")
            .field("generation", &self.generation())
            .field("loading", &self.loading)
            .field("results", &self.results().len())
            .finish()
    }
}
