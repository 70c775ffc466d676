//! Admission control for outbound downloads.

use crate::error::ImagesError;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Debug)]
struct GateInner {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    peak: AtomicUsize,
}

/// A fixed-capacity gate bounding how many downloads run at once.
///
/// Clones share the same permit pool.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    inner: Arc<GateInner>,
}

/// One admitted download. The slot goes back to the gate when this is dropped.
#[must_use = "the slot is released as soon as the permit is dropped"]
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyGate {
    /// # Errors
    /// Returns [`ImagesError::Config`] when `capacity` is zero, since such a gate never admits.
    pub fn new(capacity: usize) -> Result<Self, ImagesError> {
        if capacity == 0 {
            return Err(ImagesError::Config {
                message: "concurrency gate capacity must be at least 1".into(),
                context: None,
            });
        }
        if capacity > Semaphore::MAX_PERMITS {
            return Err(ImagesError::Config {
                message: format!("concurrency gate capacity {capacity} is too large").into(),
                context: None,
            });
        }

        Ok(Self {
            inner: Arc::new(GateInner {
                semaphore: Arc::new(Semaphore::new(capacity)),
                capacity,
                peak: AtomicUsize::new(0),
            }),
        })
    }

    /// Waits for a free slot, or for `cancel` to fire.
    ///
    /// # Errors
    /// Returns [`ImagesError::Cancelled`] if the token is cancelled first (including when it was
    /// already cancelled on entry). The caller must not start the download in that case.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<GatePermit, ImagesError> {
        let permit = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(ImagesError::Cancelled {
                    message: "gave up waiting for a download slot".into(),
                    context: None,
                });
            },
            permit = Arc::clone(&self.inner.semaphore).acquire_owned() => {
                permit.map_err(|_| ImagesError::Internal {
                    message: "concurrency gate closed".into(),
                    context: None,
                })?
            },
        };

        let in_flight = self.in_flight();
        self.inner.peak.fetch_max(in_flight, Ordering::Relaxed);
        trace!(in_flight, capacity = self.inner.capacity, "Download slot acquired");

        Ok(GatePermit { _permit: permit })
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Free slots right now.
    #[must_use]
    pub fn available(&self) -> usize {
        self.inner.semaphore.available_permits()
    }

    /// Slots currently held.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.capacity.saturating_sub(self.available())
    }

    /// Highest number of slots ever held at once.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.inner.peak.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(matches!(ConcurrencyGate::new(0), Err(ImagesError::Config { .. })));
    }

    #[tokio::test]
    async fn test_permits_are_returned_on_drop() {
        let gate = ConcurrencyGate::new(2).unwrap();
        let token = CancellationToken::new();

        let first = gate.acquire(&token).await.unwrap();
        let second = gate.acquire(&token).await.unwrap();
        assert_eq!((gate.available(), gate.in_flight()), (0, 2));

        drop(first);
        assert_eq!(gate.available(), 1);
        drop(second);
        assert_eq!((gate.available(), gate.in_flight()), (2, 0));
        assert_eq!(gate.peak_in_flight(), 2);
    }

    #[tokio::test]
    async fn test_already_cancelled_token_never_admits() {
        let gate = ConcurrencyGate::new(1).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        assert!(matches!(gate.acquire(&token).await, Err(ImagesError::Cancelled { .. })));
        assert_eq!(gate.available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unblocks_a_waiter() {
        let gate = ConcurrencyGate::new(1).unwrap();
        let held = gate.acquire(&CancellationToken::new()).await.unwrap();

        let token = CancellationToken::new();
        let waiter = {
            let gate = gate.clone();
            let token = token.clone();
            tokio::spawn(async move { gate.acquire(&token).await.map(drop) })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        token.cancel();
        let result = tokio::time::timeout(Duration::from_millis(100), waiter).await.unwrap().unwrap();
        assert!(matches!(result, Err(ImagesError::Cancelled { .. })));

        drop(held);
        assert_eq!(gate.available(), 1);
    }
}
