//! Request tokens for last-request-wins ordering.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Identifies one issued fetch. Later requests have larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// The raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues monotonically increasing request tokens.
///
/// Only the most recently issued token is current; a response carrying any
/// older token has been superseded and must be discarded.
///
/// # Example
///
/// ```
/// use pms_grid_lib::fetch::RequestTracker;
///
/// let tracker = RequestTracker::new();
/// let first = tracker.issue();
/// let second = tracker.issue();
/// assert!(!tracker.is_current(first));
/// assert!(tracker.is_current(second));
/// ```
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    /// Creates a tracker that has issued nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new token, superseding every earlier one.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns `true` if no newer request has been issued since `token`.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// The most recently issued token, if any.
    pub fn latest(&self) -> Option<RequestToken> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            n => Some(RequestToken(n)),
        }
    }
}
