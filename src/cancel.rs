//! Job-level cancellation signal.
//!
//! A watch channel pair: the caller keeps the [`CancelHandle`], the job
//! observes the [`CancelToken`] at every suspension point (navigation, delay,
//! LLM round-trip). Dropping the handle without cancelling leaves the job
//! running to completion.

use tokio::sync::watch;

/// Caller-side trigger.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Request cancellation. The job aborts at its next suspension point.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Job-side observer.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
    // Keeps the channel open for tokens created without a handle.
    _keepalive: Option<std::sync::Arc<watch::Sender<bool>>>,
}

impl CancelToken {
    /// Create a connected handle/token pair.
    #[must_use]
    pub fn pair() -> (CancelHandle, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (
            CancelHandle { tx },
            CancelToken {
                rx,
                _keepalive: None,
            },
        )
    }

    /// A token that can never fire; used when the caller opts out.
    #[must_use]
    pub fn never() -> CancelToken {
        let (tx, rx) = watch::channel(false);
        CancelToken {
            rx,
            _keepalive: Some(std::sync::Arc::new(tx)),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when cancellation fires; pends forever if it never does.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender dropped without cancelling: cancellation can no
                // longer happen.
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_observes_cancel() {
        let (handle, token) = CancelToken::pair();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
        token.cancelled().await;
    }

    #[tokio::test]
    async fn never_token_pends() {
        let token = CancelToken::never();
        assert!(!token.is_cancelled());
        let result =
            tokio::time::timeout(std::time::Duration::from_millis(20), token.cancelled()).await;
        assert!(result.is_err());
    }
}
