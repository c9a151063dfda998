//! Cancellable, deadline-bearing execution context
//!
//! Every transport call runs under an [`OperationContext`]. Cancellation and
//! deadline expiry surface as `context`-layer errors with distinct messages.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{LayeredError, Result, SeedError};

const CANCELLED_MESSAGE: &str = "operation cancelled";
const TIMED_OUT_MESSAGE: &str = "operation timed out";

/// Execution context shared by all operations of a run
#[derive(Debug, Clone)]
pub struct OperationContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationContext {
    /// Context with no deadline
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Context that expires after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Child context sharing cancellation with this one
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail if the context was already cancelled or has expired
    pub fn check(&self, operation: &str) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(cancelled(operation));
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(timed_out(operation));
            }
        }
        Ok(())
    }

    /// Run a future under this context
    ///
    /// Checks the context before polling `fut`, then races it against
    /// cancellation and the deadline.
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check(operation)?;

        let deadline = self.deadline;
        let expiry = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(cancelled(operation)),
            _ = expiry => Err(timed_out(operation)),
            result = fut => result,
        }
    }
}

fn cancelled(operation: &str) -> SeedError {
    LayeredError::context(operation, CANCELLED_MESSAGE).into()
}

fn timed_out(operation: &str) -> SeedError {
    LayeredError::context(operation, TIMED_OUT_MESSAGE).into()
}
