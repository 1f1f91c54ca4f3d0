use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Releases waiters once a fixed number of completions have been signalled.
///
/// Independent of the result channel: workers send their outcome first and
/// only then call [`CompletionBarrier::complete`].
#[derive(Debug)]
pub(super) struct CompletionBarrier {
    remaining: AtomicUsize,
    released: Notify,
}

impl CompletionBarrier {
    pub(super) fn new(expected: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(expected),
            released: Notify::new(),
        }
    }

    pub(super) fn complete(&self) {
        let previous =
            self.remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| {
                    remaining.checked_sub(1)
                });
        if previous == Ok(1) {
            self.released.notify_waiters();
        }
    }

    pub(super) fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub(super) async fn wait(&self) {
        loop {
            let released = self.released.notified();
            if self.remaining() == 0 {
                return;
            }
            released.await;
        }
    }
}
