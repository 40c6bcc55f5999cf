//! Monotonic request tickets.
//!
//! Each action stamps its request with a ticket. A response is applied only
//! while its ticket is still the latest one issued by the same guard.

use crate::error::ApiError;

/// Generation number a request was issued under.
pub type Ticket = u64;

/// What happened when a response was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The ticket was superseded; state was left untouched.
    Stale,
    Failed(ApiError),
}

#[derive(Debug, Default, Clone)]
pub struct RequestGuard {
    current: Ticket,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new ticket, superseding all earlier ones.
    pub fn issue(&mut self) -> Ticket {
        self.current += 1;
        self.current
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket != 0 && ticket == self.current
    }

    /// Makes every outstanding ticket stale.
    pub fn invalidate(&mut self) {
        self.current += 1;
    }
}
