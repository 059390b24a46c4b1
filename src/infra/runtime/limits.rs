use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

/// Bounds on spawned automation processes: how many may run at once and how
/// long each may take.
#[derive(Clone, Debug)]
pub struct ScriptLimits {
    permits: Arc<Semaphore>,
    timeout: Duration,
}

/// Largest accepted value for the concurrent script cap.
pub const MAX_CONCURRENT_LIMIT: usize = 64;

#[derive(Debug, PartialEq, Eq)]
pub enum LimitError {
    Closed,
    TimedOut(Duration),
}

impl ScriptLimits {
    pub fn new(max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.clamp(1, Semaphore::MAX_PERMITS))),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a slot, then run `fut` under the timeout. Dropping the future on
    /// timeout is what tears the child process down.
    pub async fn run<T, Fut>(&self, fut: Fut) -> Result<T, LimitError>
    where
        Fut: Future<Output = T>,
    {
        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| LimitError::Closed)?;
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| LimitError::TimedOut(self.timeout))
    }
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self::new(4, Duration::from_secs(30))
    }
}
