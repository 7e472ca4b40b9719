// Copyright (c) 2026 rezky_nightky

//! Cooperative cancellation and resize signalling between the input thread
//! and the animation loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sleep {
    Elapsed,
    Interrupted,
    Cancelled,
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: bool,
    interrupts: u64,
}

#[derive(Debug, Default)]
struct TokenInner {
    state: Mutex<TokenState>,
    wake: Condvar,
}

/// Cloneable handle used to stop the animation or cut a delay short.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn cancel(&self) {
        self.lock().cancelled = true;
        self.inner.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Wakes a sleeper without cancelling.
    pub fn interrupt(&self) {
        let mut st = self.lock();
        st.interrupts = st.interrupts.wrapping_add(1);
        drop(st);
        self.inner.wake.notify_all();
    }

    /// Blocks for `delay` unless cancelled or interrupted first.
    pub fn sleep(&self, delay: Duration) -> Sleep {
        let deadline = Instant::now() + delay;
        let mut st = self.lock();
        let seen = st.interrupts;
        loop {
            if st.cancelled {
                return Sleep::Cancelled;
            }
            if st.interrupts != seen {
                return Sleep::Interrupted;
            }
            let now = Instant::now();
            if now >= deadline {
                return Sleep::Elapsed;
            }
            st = match self.inner.wake.wait_timeout(st, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }
}

#[derive(Debug)]
struct ResizeInner {
    changed: AtomicBool,
    size: Mutex<(u16, u16)>,
}

/// Records whether the terminal changed size since the last `reset`.
#[derive(Clone, Debug)]
pub struct ResizeListener {
    inner: Arc<ResizeInner>,
}

impl ResizeListener {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            inner: Arc::new(ResizeInner {
                changed: AtomicBool::new(false),
                size: Mutex::new((width, height)),
            }),
        }
    }

    pub fn notify(&self, width: u16, height: u16) {
        let mut size = self
            .inner
            .size
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *size != (width, height) {
            *size = (width, height);
            self.inner.changed.store(true, Ordering::Release);
        }
    }

    pub fn was_resized(&self) -> bool {
        self.inner.changed.load(Ordering::Acquire)
    }

    pub fn size(&self) -> (u16, u16) {
        *self
            .inner
            .size
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn reset(&self) {
        self.inner.changed.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn zero_delay_elapses_immediately() {
        assert_eq!(CancelToken::new().sleep(Duration::ZERO), Sleep::Elapsed);
    }

    #[test]
    fn cancel_from_another_thread_cuts_sleep_short() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });
        let start = Instant::now();
        assert_eq!(token.sleep(Duration::from_secs(30)), Sleep::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(10));
        handle.join().unwrap();
        assert!(token.is_cancelled());
        assert_eq!(token.sleep(Duration::from_secs(30)), Sleep::Cancelled);
    }

    #[test]
    fn interrupt_wakes_without_cancelling() {
        let token = CancelToken::new();
        let remote = token.clone();
        let done = Arc::new(AtomicBool::new(false));
        let remote_done = done.clone();
        let handle = thread::spawn(move || {
            while !remote_done.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(5));
                remote.interrupt();
            }
        });
        assert_eq!(token.sleep(Duration::from_secs(30)), Sleep::Interrupted);
        done.store(true, Ordering::Release);
        handle.join().unwrap();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn resize_flag_tracks_changes_until_reset() {
        let l = ResizeListener::new(80, 24);
        l.notify(80, 24);
        assert!(!l.was_resized());
        l.notify(100, 30);
        assert!(l.was_resized());
        assert_eq!(l.size(), (100, 30));
        l.reset();
        assert!(!l.was_resized());
        assert_eq!(l.size(), (100, 30));
    }
}
