#![forbid(unsafe_code)]

//! Time-injected debouncing.
//!
//! [`Debouncer`] holds at most one scheduled payload. Scheduling again
//! replaces it and restarts the quiescence window; cancelling drops it.
//! Nothing runs on its own: the host calls [`poll`](Debouncer::poll) on
//! its tick and gets the payload back once the window has elapsed.
//!
//! # State Machine
//!
//! ```text
//!                 schedule                    poll (now >= deadline)
//!  ┌──────┐ ─────────────────▶ ┌──────────┐ ─────────────────────────▶ fire
//!  │ Idle │                    │ Pending  │
//!  └──────┘ ◀───────────────── └──────────┘ ◀─┐
//!                 cancel             │ schedule (deadline reset)
//!                                    └─────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use srcdbg_runtime::debounce::Debouncer;
//!
//! let mut debouncer = Debouncer::new(Duration::from_millis(250));
//! let t0 = Instant::now();
//! debouncer.schedule("a", t0);
//! debouncer.schedule("ab", t0 + Duration::from_millis(50));
//! assert_eq!(debouncer.poll(t0 + Duration::from_millis(250)), None);
//! assert_eq!(debouncer.poll(t0 + Duration::from_millis(300)), Some("ab"));
//! assert_eq!(debouncer.poll(t0 + Duration::from_millis(900)), None);
//! ```

use web_time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Pending<T> {
    deadline: Instant,
    payload: T,
}

/// A cancellable, restartable delayed payload.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Schedule `payload` to fire one window after `now`, replacing any
    /// pending payload. Returns `true` if a pending payload was replaced.
    pub fn schedule(&mut self, payload: T, now: Instant) -> bool {
        let replaced = self.pending.is_some();
        self.pending = Some(Pending {
            deadline: now + self.window,
            payload,
        });
        replaced
    }

    /// Drop the pending payload. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Take the payload if its window has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.deadline);
        if !due {
            return None;
        }
        self.pending.take().map(|pending| pending.payload)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending payload fires, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Change the window. A pending payload keeps its current deadline.
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }
}
