use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Counting join: released once every enrolment has been dropped.
#[derive(Clone, Debug, Default)]
pub struct CompletionBarrier {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    pending: AtomicUsize,
    released: Notify,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one participant. The participant signals completion by dropping
    /// the returned guard, which also happens if its task panics or is aborted.
    pub fn enroll(&self) -> Enrolment {
        self.inner.pending.fetch_add(1, Ordering::SeqCst);
        Enrolment {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::SeqCst)
    }

    /// Resolves once no enrolment is outstanding. Returns immediately if none ever was.
    pub async fn wait(&self) {
        loop {
            // Registered before the check so a release between the two is not missed.
            let released = self.inner.released.notified();
            if self.pending() == 0 {
                return;
            }
            released.await;
        }
    }
}

/// Outstanding participation in a [`CompletionBarrier`].
#[derive(Debug)]
pub struct Enrolment {
    inner: Arc<Inner>,
}

impl Drop for Enrolment {
    fn drop(&mut self) {
        if self.inner.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.released.notify_waiters();
        }
    }
}
