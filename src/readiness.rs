//! Level-triggered "link usable" flag shared between the link manager and
//! whoever waits for the link before starting the session.

use core::cell::RefCell;
use core::future::{poll_fn, Future};
use core::task::Poll;

use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};
use embassy_sync::waitqueue::MultiWakerRegistration;

const READINESS_WAITERS: usize = 4;

struct Inner {
    ready: bool,
    // Bumped on every false -> true edge; lets a woken waiter complete even if
    // the flag was cleared again before it got polled.
    set_edges: u32,
    waiters: MultiWakerRegistration<READINESS_WAITERS>,
}

pub struct ReadinessSignal<M: RawMutex> {
    inner: Mutex<M, RefCell<Inner>>,
}

impl<M: RawMutex> ReadinessSignal<M> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                ready: false,
                set_edges: 0,
                waiters: MultiWakerRegistration::new(),
            })),
        }
    }

    pub fn set(&self) {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            if !inner.ready {
                inner.ready = true;
                inner.set_edges = inner.set_edges.wrapping_add(1);
            }
            inner.waiters.wake();
        });
    }

    pub fn clear(&self) {
        self.inner.lock(|cell| cell.borrow_mut().ready = false);
    }

    pub fn is_set(&self) -> bool {
        self.inner.lock(|cell| cell.borrow().ready)
    }

    /// Resolves once the flag is observed set. Ready on first poll when the
    /// flag is already up.
    pub fn wait_until_set(&self) -> impl Future<Output = ()> + '_ {
        let mut armed_at: Option<u32> = None;
        poll_fn(move |cx| {
            self.inner.lock(|cell| {
                let mut inner = cell.borrow_mut();
                if inner.ready {
                    return Poll::Ready(());
                }
                if armed_at.is_some_and(|edges| edges != inner.set_edges) {
                    return Poll::Ready(());
                }
                armed_at = Some(inner.set_edges);
                inner.waiters.register(cx.waker());
                Poll::Pending
            })
        })
    }
}

impl<M: RawMutex> Default for ReadinessSignal<M> {
    fn default() -> Self {
        Self::new()
    }
}
