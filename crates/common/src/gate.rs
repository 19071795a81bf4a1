use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("timed out after {0:?} waiting for the mutation gate")]
    Timeout(Duration),
}

pub type GateGuard = OwnedMutexGuard<()>;

/// Process-wide mutual exclusion for everything that reads
///  or replaces the bucket root, and for reclamation.
///  Waiters are served in arrival order. Clones share the
///  same lock.
#[derive(Debug, Clone, Default)]
pub struct MutationGate(Arc<Mutex<()>>);

impl MutationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) -> GateGuard {
        self.0.clone().lock_owned().await
    }

    /// Wait at most `timeout` for the gate
    pub async fn acquire_timeout(&self, timeout: Duration) -> Result<GateGuard, GateError> {
        tokio::time::timeout(timeout, self.acquire())
            .await
            .map_err(|_| GateError::Timeout(timeout))
    }

    /// Run `f` while holding the gate. The gate is released
    ///  whether `f` succeeds or fails.
    pub async fn run_exclusive<F, T>(&self, f: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.acquire().await;
        f.await
    }

    /// Like [`MutationGate::run_exclusive`], giving up if the
    ///  gate cannot be taken within `timeout`. Once taken,
    ///  `f` runs to completion.
    pub async fn run_exclusive_timeout<F, T>(&self, timeout: Duration, f: F) -> Result<T, GateError>
    where
        F: Future<Output = T>,
    {
        let _guard = self.acquire_timeout(timeout).await?;
        Ok(f.await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_timeout_while_held() {
        let gate = MutationGate::new();
        let guard = gate.acquire().await;

        let result = gate
            .run_exclusive_timeout(Duration::from_millis(20), async { 1 })
            .await;
        assert!(matches!(result, Err(GateError::Timeout(_))));

        drop(guard);
        let result = gate
            .run_exclusive_timeout(Duration::from_millis(20), async { 1 })
            .await;
        assert_eq!(result.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sections_never_overlap() {
        let gate = MutationGate::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();

        for _ in 0..16 {
            let gate = gate.clone();
            let inside = inside.clone();
            handles.push(tokio::spawn(async move {
                gate.run_exclusive(async {
                    assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                    tokio::task::yield_now().await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
                .await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_released_on_error() {
        let gate = MutationGate::new();
        let failed: Result<(), &str> = gate.run_exclusive(async { Err("boom") }).await;
        assert!(failed.is_err());
        assert!(gate
            .run_exclusive_timeout(Duration::from_millis(20), async {})
            .await
            .is_ok());
    }
}
