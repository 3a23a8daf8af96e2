//! Correlation identifier carried by every request.
//!
//! The active [`TraceId`] lives in tokio task-local storage, so errors and
//! log lines can pick it up without threading it through every call.
//! Task-locals do not follow work onto other tasks or blocking threads:
//! re-enter the scope with [`TraceId::scope`] or [`TraceId::carry`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

/// HTTP header carrying the trace identifier on requests and responses.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static CURRENT: TraceId;
}

/// UUID identifying one inbound request.
///
/// # Examples
/// ```
/// use watchlist::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let id: TraceId = "00000000-0000-0000-0000-000000000000".parse().unwrap();
/// let seen = TraceId::scope(id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a header value, tolerating surrounding whitespace.
    ///
    /// Returns `None` unless the value is a UUID.
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }

    /// Identifier of the request being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current identifier.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(trace_id, fut).await
    }

    /// Wrap a closure so it sees the caller's identifier wherever it runs.
    ///
    /// Intended for `spawn_blocking` work.
    pub fn carry<F, T>(f: F) -> impl FnOnce() -> T
    where
        F: FnOnce() -> T,
    {
        let captured = Self::current();
        move || match captured {
            Some(id) => CURRENT.sync_scope(id, f),
            None => f(),
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
