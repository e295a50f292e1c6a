//! Inline task driver for driven invocations.
//!
//! Hooks own no executor. [`spawn_inline`] polls an invocation immediately on
//! the caller's stack, then again on whichever thread wakes it, so the work
//! after a tap settles runs on the thread that settled it. The task keeps
//! being polled until it completes, which lets losing parallel taps run to
//! the end after the caller already has its result.

use core::sync::atomic::{AtomicU8, Ordering};
use core::task::Context;
use std::sync::Arc;

use futures::task::{ArcWake, waker_ref};
use hookline_tap::tap::BoxFuture;
use parking_lot::Mutex;

const IDLE: u8 = 0;
const POLLING: u8 = 1;
const NOTIFIED: u8 = 2;
const COMPLETE: u8 = 3;

struct InlineTask {
    future: Mutex<Option<BoxFuture<'static, ()>>>,
    state: AtomicU8,
}

/// Starts driving `future` on the current thread.
///
/// Returns once the future completes or first suspends.
pub(crate) fn spawn_inline(future: impl Future<Output = ()> + Send + 'static) {
    let task = Arc::new(InlineTask {
        future: Mutex::new(Some(Box::pin(future))),
        state: AtomicU8::new(IDLE),
    });
    task.schedule();
}

impl InlineTask {
    fn schedule(self: &Arc<Self>) {
        let mut state = self.state.load(Ordering::Acquire);
        loop {
            let next = match state {
                IDLE => POLLING,
                POLLING => NOTIFIED,
                _ => return,
            };
            match self
                .state
                .compare_exchange(state, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) if next == POLLING => return self.poll_loop(),
                Ok(_) => return,
                Err(actual) => state = actual,
            }
        }
    }

    fn poll_loop(self: &Arc<Self>) {
        let waker = waker_ref(self);
        let mut cx = Context::from_waker(&waker);

        loop {
            let mut slot = self.future.lock();
            let finished = match slot.as_mut() {
                Some(future) => future.as_mut().poll(&mut cx).is_ready(),
                None => true,
            };
            if finished {
                *slot = None;
                self.state.store(COMPLETE, Ordering::Release);
                return;
            }
            drop(slot);

            // A wake that arrived while polling leaves NOTIFIED behind.
            match self
                .state
                .compare_exchange(POLLING, IDLE, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return,
                Err(_) => self.state.store(POLLING, Ordering::Release),
            }
        }
    }
}

impl ArcWake for InlineTask {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.schedule();
    }
}
