//! Caller-owned cancellation for one in-flight request.

use tokio_util::sync::CancellationToken;

/// Handle to a running request. Cloning shares the same cancellation state.
#[derive(Debug, Clone, Default)]
pub struct RequestHandle {
    token: CancellationToken,
}

impl RequestHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the request. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}
