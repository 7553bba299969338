//! Integration tests for the transition lifecycle.

use cmdpal_core::animation::*;
use proptest::prelude::*;
use std::time::{Duration, Instant};

const MS_100: Duration = Duration::from_millis(100);

#[test]
fn rapid_toggle_only_last_timer_fires() {
    let t0 = Instant::now();
    let mut life = AnimationLifecycle::new(MS_100, false);
    for i in 0..10u32 {
        life.transition(i % 2 == 0, t0 + Duration::from_millis(10 * u64::from(i)));
    }
    // Last request was a close at t0+90ms.
    let last = t0 + Duration::from_millis(90);
    assert_eq!(life.state(), AnimationState::Exiting);
    assert_eq!(life.poll(last + MS_100 - Duration::from_millis(1)), None);
    assert_eq!(life.poll(last + MS_100), Some(AnimationState::Exited));
    assert!(!life.is_mounted());
}

#[test]
fn reopen_during_exit_stays_mounted() {
    let t0 = Instant::now();
    let mut life = AnimationLifecycle::new(MS_100, true);
    life.transition(false, t0);
    life.transition(true, t0 + Duration::from_millis(50));
    assert!(life.is_mounted());
    life.poll(t0 + MS_100);
    assert_eq!(life.state(), AnimationState::Entering);
    life.poll(t0 + Duration::from_millis(150));
    assert_eq!(life.state(), AnimationState::Entered);
}

proptest! {
    #[test]
    fn mounted_iff_not_exited(
        ops in proptest::collection::vec((any::<bool>(), 0u64..300), 1..40),
        duration_ms in 0u64..200,
    ) {
        let mut now = Instant::now();
        let mut life = AnimationLifecycle::new(Duration::from_millis(duration_ms), false);
        for (open, gap) in ops {
            now += Duration::from_millis(gap);
            life.poll(now);
            life.transition(open, now);
            prop_assert_eq!(life.is_mounted(), life.state() != AnimationState::Exited);
            if open {
                prop_assert!(life.is_mounted());
            }
        }
    }

    #[test]
    fn last_request_determines_settled_state(
        ops in proptest::collection::vec((any::<bool>(), 0u64..300), 1..40),
    ) {
        let mut now = Instant::now();
        let mut life = AnimationLifecycle::new(MS_100, false);
        let mut last = false;
        for (open, gap) in ops {
            now += Duration::from_millis(gap);
            life.transition(open, now);
            last = open;
        }
        life.poll(now + MS_100);
        let expected = if last { AnimationState::Entered } else { AnimationState::Exited };
        prop_assert_eq!(life.state(), expected);
        prop_assert!(life.next_deadline().is_none());
    }
}
