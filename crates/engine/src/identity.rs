//! Actor snapshot and the external identity collaborator.
//!
//! User records live in a separate identity service; the engine never stores
//! them. Every operation takes an explicit [`Actor`] resolved by the caller
//! *before* any balance transaction starts, so identity I/O never holds a
//! ledger lock.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

/// Snapshot of an authenticated user as returned by the identity service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    /// Role identifier from the identity service (e.g. `admin`, `member`).
    pub role: String,
    pub is_admin: bool,
    pub is_frozen: bool,
    /// The user's default family group, when the identity service knows it.
    pub default_group: Option<Uuid>,
}

impl Actor {
    /// Convenience constructor for an admin actor.
    #[must_use]
    pub fn admin(id: Uuid) -> Self {
        Self {
            id,
            role: "admin".to_string(),
            is_admin: true,
            is_frozen: false,
            default_group: None,
        }
    }

    /// Convenience constructor for a regular member actor.
    #[must_use]
    pub fn member(id: Uuid) -> Self {
        Self {
            id,
            role: "member".to_string(),
            is_admin: false,
            is_frozen: false,
            default_group: None,
        }
    }

    #[must_use]
    pub fn frozen(mut self) -> Self {
        self.is_frozen = true;
        self
    }

    /// Sets the actor's default family group.
    #[must_use]
    pub fn in_group(mut self, group_id: Uuid) -> Self {
        self.default_group = Some(group_id);
        self
    }
}

/// Boundary seam for the external identity service.
///
/// Implementations resolve an opaque bearer token into an [`Actor`].
/// Transport failures surface as [`LedgerError::IdentityUnavailable`] so the
/// caller can distinguish them from a rejected token.
pub trait IdentityProvider: Send + Sync {
    fn validate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = ResultLedger<Actor>> + Send;
}

/// Wraps an [`IdentityProvider`] with a per-attempt timeout and bounded
/// retries.
///
/// Only transport failures ([`LedgerError::IdentityUnavailable`] and
/// timeouts) are retried; a rejected token surfaces immediately. The retry
/// loop runs outside any ledger transaction.
#[derive(Debug)]
pub struct RetryingIdentity<P> {
    inner: P,
    attempts: u32,
    timeout: Duration,
}

impl<P: IdentityProvider> RetryingIdentity<P> {
    #[must_use]
    pub fn new(inner: P, attempts: u32, timeout: Duration) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            timeout,
        }
    }

    pub async fn validate(&self, token: &str) -> ResultLedger<Actor> {
        let mut last = LedgerError::IdentityUnavailable("no attempts made".to_string());
        for _ in 0..self.attempts {
            match tokio::time::timeout(self.timeout, self.inner.validate(token)).await {
                Ok(Ok(actor)) => return Ok(actor),
                Ok(Err(err @ LedgerError::IdentityUnavailable(_))) => last = err,
                Ok(Err(err)) => return Err(err),
                Err(_) => {
                    last = LedgerError::IdentityUnavailable("validation timed out".to_string());
                }
            }
        }
        Err(last)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    struct FlakyProvider {
        calls: AtomicU32,
        fail_first: u32,
    }

    impl IdentityProvider for FlakyProvider {
        async fn validate(&self, _token: &str) -> ResultLedger<Actor> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                Err(LedgerError::IdentityUnavailable("down".to_string()))
            } else {
                Ok(Actor::member(Uuid::new_v4()))
            }
        }
    }

    #[tokio::test]
    async fn retries_transport_failures() {
        let provider = FlakyProvider {
            calls: AtomicU32::new(0),
            fail_first: 2,
        };
        let identity = RetryingIdentity::new(provider, 3, Duration::from_millis(100));
        assert!(identity.validate("token").await.is_ok());
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts() {
        let provider = FlakyProvider {
            calls: AtomicU32::new(0),
            fail_first: u32::MAX,
        };
        let identity = RetryingIdentity::new(provider, 2, Duration::from_millis(100));
        let err = identity.validate("token").await.unwrap_err();
        assert!(matches!(err, LedgerError::IdentityUnavailable(_)));
    }

    struct RejectingProvider {
        calls: AtomicU32,
    }

    impl IdentityProvider for RejectingProvider {
        async fn validate(&self, _token: &str) -> ResultLedger<Actor> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(LedgerError::Forbidden("bad token".to_string()))
        }
    }

    #[tokio::test]
    async fn rejected_token_is_not_retried() {
        let provider = RejectingProvider {
            calls: AtomicU32::new(0),
        };
        let identity = RetryingIdentity::new(provider, 5, Duration::from_millis(100));
        let err = identity.validate("token").await.unwrap_err();
        assert!(matches!(err, LedgerError::Forbidden(_)));
        assert_eq!(identity.inner.calls.load(Ordering::SeqCst), 1);
    }
}
