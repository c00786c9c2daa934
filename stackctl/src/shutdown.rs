//! Shutdown requests
//!
//! A request is latched: once fired, every later check sees it, including
//! checks made before anything started waiting on it.

use tokio::sync::watch;

/// Fires a shutdown request
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn fire(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes shutdown requests
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// A connected trigger and observer
    pub fn channel() -> (ShutdownTrigger, Shutdown) {
        let (tx, rx) = watch::channel(false);
        (ShutdownTrigger { tx }, Shutdown { rx })
    }

    /// An observer that is never fired
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    /// Whether shutdown has been requested
    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is requested; pends forever if the trigger is
    /// dropped without firing
    pub async fn requested(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|requested| *requested).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}
