//! Request budget for the quota-constrained statistics API.
//!
//! The free API-Sports plan allows on the order of 100 requests per day.
//! Every attempt sent over the wire, retries included, draws one unit
//! from the budget. The check happens before the request goes out, so
//! the ceiling is never knowingly exceeded.

use std::sync::atomic::{AtomicU32, Ordering};

use tracing::warn;

use super::errors::ApiError;

/// Per-client request counter with a hard ceiling.
#[derive(Debug)]
pub struct RequestBudget {
    limit: u32,
    used: AtomicU32,
}

impl RequestBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            used: AtomicU32::new(0),
        }
    }

    /// Reserve one request. Fails with `QuotaExceeded` once the ceiling
    /// has been reached; the counter is left untouched in that case.
    pub fn acquire(&self) -> Result<u32, ApiError> {
        let limit = self.limit;
        match self
            .used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (used < limit).then_some(used + 1)
            }) {
            Ok(previous) => Ok(previous + 1),
            Err(used) => {
                warn!(used, limit, "Request budget exhausted");
                Err(ApiError::QuotaExceeded { used, limit })
            }
        }
    }

    pub fn used(&self) -> u32 {
        self.used.load(Ordering::SeqCst)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_until_ceiling() {
        let budget = RequestBudget::new(3);
        assert_eq!(budget.acquire().unwrap(), 1);
        assert_eq!(budget.acquire().unwrap(), 2);
        assert_eq!(budget.acquire().unwrap(), 3);
        assert_eq!(budget.used(), budget.limit());

        let err = budget.acquire().unwrap_err();
        assert!(matches!(err, ApiError::QuotaExceeded { used: 3, limit: 3 }));
        // A refused request does not count.
        assert_eq!(budget.used(), 3);
    }

    #[test]
    fn test_zero_limit_refuses_everything() {
        let budget = RequestBudget::new(0);
        assert!(budget.acquire().is_err());
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_budgets_are_independent() {
        let a = RequestBudget::new(1);
        let b = RequestBudget::new(1);
        a.acquire().unwrap();
        assert!(a.acquire().is_err());
        assert!(b.acquire().is_ok());
    }
}
