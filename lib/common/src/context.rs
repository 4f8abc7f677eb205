use crate::error::QueryEvaluationError;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(0);

/// Identifies the graph scopes of a single query evaluation.
///
/// Concurrent queries that share a dataset use different scope ids and therefore never observe
/// each other's `GRAPH` scopes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    /// Allocates a new, process-wide unique scope id.
    pub fn next() -> Self {
        Self(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for ScopeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// A handle that allows cancelling a running query from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The context of a single query evaluation that is threaded through every operator.
///
/// Clones share the scope id and the cancellation signal.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    scope_id: ScopeId,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl ExecutionContext {
    /// Creates a context with a fresh [ScopeId] and no deadline.
    pub fn new() -> Self {
        Self {
            scope_id: ScopeId::next(),
            cancellation: CancellationToken::default(),
            deadline: None,
        }
    }

    /// Sets a deadline `timeout` from now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Uses an externally created cancellation token.
    #[must_use]
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn scope_id(&self) -> ScopeId {
        self.scope_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns a token that cancels this query.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Returns an error if the query has been cancelled or its deadline has passed.
    ///
    /// Operators call this between pulls from their inputs.
    pub fn check(&self) -> Result<(), QueryEvaluationError> {
        if self.is_cancelled() {
            return Err(QueryEvaluationError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(QueryEvaluationError::Timeout),
            _ => Ok(()),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
