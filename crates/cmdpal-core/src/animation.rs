#![forbid(unsafe_code)]

//! Mount/transition lifecycle for overlays.
//!
//! [`AnimationLifecycle`] is a four-state machine that tells a renderer
//! whether the overlay is present and which phase of its enter/exit
//! transition it is in:
//!
//! ```text
//!   open ──▶ Entering ──(duration)──▶ Entered
//!  close ──▶ Exiting  ──(duration)──▶ Exited (unmounted)
//! ```
//!
//! Time is explicit: transitions take the current [`Instant`] and
//! [`AnimationLifecycle::poll`] advances any timer whose deadline has
//! passed. Hosts call `poll` from their tick handler and can use
//! [`AnimationLifecycle::next_deadline`] to decide when to wake.
//!
//! # Invariants
//!
//! 1. `is_mounted()` is false only in `Exited`.
//! 2. At most one timer is pending. A new transition replaces it, so a
//!    superseded timer can never fire.
//! 3. A new transition always runs its full duration from the instant it
//!    was requested; it never resumes a previous timer.
//! 4. With a zero duration, transitions settle in the same call.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current instant.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    /// Start at the current wall-clock instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Move time forward by `dt`.
    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get() + dt);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Phase of the overlay's transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationState {
    /// Mounted, enter transition running.
    Entering,
    /// Mounted and settled.
    Entered,
    /// Mounted, exit transition running.
    Exiting,
    /// Not mounted.
    Exited,
}

impl AnimationState {
    /// Stable lowercase name, for data attributes and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entering => "entering",
            Self::Entered => "entered",
            Self::Exiting => "exiting",
            Self::Exited => "exited",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    started: Instant,
    deadline: Instant,
    settles_to: AnimationState,
}

/// Four-state enter/exit machine with cancellable timers.
#[derive(Debug, Clone)]
pub struct AnimationLifecycle {
    duration: Duration,
    state: AnimationState,
    pending: Option<PendingTimer>,
    easing: EasingFn,
}

impl AnimationLifecycle {
    /// Create a lifecycle. `initially_open` starts settled in `Entered`,
    /// otherwise in `Exited`.
    #[must_use]
    pub fn new(duration: Duration, initially_open: bool) -> Self {
        Self {
            duration,
            state: if initially_open {
                AnimationState::Entered
            } else {
                AnimationState::Exited
            },
            pending: None,
            easing: ease_out,
        }
    }

    /// Set the easing used by [`progress`](Self::progress) (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Configured transition duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Whether the overlay should be present in the render tree.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.state != AnimationState::Exited
    }

    /// When the pending timer fires, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Begin the enter transition (`open = true`) or exit transition.
    ///
    /// Any pending timer is discarded first.
    pub fn transition(&mut self, open: bool, now: Instant) {
        if self.pending.take().is_some() {
            tracing::trace!(state = self.state.as_str(), "transition timer cancelled");
        }

        let (running, settled) = if open {
            (AnimationState::Entering, AnimationState::Entered)
        } else {
            (AnimationState::Exiting, AnimationState::Exited)
        };

        if self.duration.is_zero() {
            self.state = settled;
        } else {
            self.state = running;
            self.pending = Some(PendingTimer {
                started: now,
                deadline: now + self.duration,
                settles_to: settled,
            });
        }
        tracing::debug!(
            open,
            state = self.state.as_str(),
            duration_ms = self.duration.as_millis() as u64,
            "transition started"
        );
    }

    /// Fire the pending timer if its deadline has passed.
    ///
    /// Returns the new state when it changed.
    pub fn poll(&mut self, now: Instant) -> Option<AnimationState> {
        let pending = self.pending?;
        if now < pending.deadline {
            return None;
        }
        self.pending = None;
        self.state = pending.settles_to;
        tracing::debug!(state = self.state.as_str(), "transition settled");
        Some(self.state)
    }

    /// Eased progress of the running transition in [0.0, 1.0].
    ///
    /// Settled states report 1.0 for `Entered` and 0.0 for `Exited`; the
    /// exit transition counts down from 1.0 so the value can drive opacity
    /// directly.
    #[must_use]
    pub fn progress(&self, now: Instant) -> f32 {
        match (self.state, self.pending) {
            (AnimationState::Entered, _) => 1.0,
            (AnimationState::Exited, _) => 0.0,
            (state, Some(p)) => {
                let total = p.deadline.duration_since(p.started).as_secs_f64();
                let elapsed = now.saturating_duration_since(p.started).as_secs_f64();
                let t = (self.easing)((elapsed / total) as f32);
                if state == AnimationState::Entering {
                    t
                } else {
                    1.0 - t
                }
            }
            (AnimationState::Entering, None) => 0.0,
            (AnimationState::Exiting, None) => 1.0,
        }
    }
}
