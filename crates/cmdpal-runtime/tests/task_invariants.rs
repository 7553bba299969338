//! Property tests for generation-tagged replies.
//!
//! 1. Generations are strictly increasing, starting at 1.
//! 2. Only the latest token is live.
//! 3. Every responder delivers exactly one response, answered or not.

use cmdpal_runtime::{GenerationCounter, ReplyChannel, TaskError};
use proptest::prelude::*;

proptest! {
    #[test]
    fn generations_strictly_increase(n in 1usize..64) {
        let counter = GenerationCounter::new();
        let generations: Vec<u64> = (0..n).map(|_| counter.advance().generation()).collect();
        prop_assert_eq!(generations[0], 1);
        prop_assert!(generations.windows(2).all(|w| w[1] == w[0] + 1));
        prop_assert_eq!(counter.current(), n as u64);
    }

    #[test]
    fn only_latest_token_is_live(n in 1usize..32) {
        let counter = GenerationCounter::new();
        let tokens: Vec<_> = (0..n).map(|_| counter.advance()).collect();
        let (latest, older) = tokens.split_last().unwrap();
        prop_assert!(!latest.is_cancelled());
        prop_assert!(counter.is_current(latest.generation()));
        prop_assert!(older.iter().all(|t| t.is_cancelled()));
    }

    #[test]
    fn one_response_per_responder(answers in proptest::collection::vec(0u8..3, 0..20)) {
        let counter = GenerationCounter::new();
        let channel: ReplyChannel<u8> = ReplyChannel::new();
        for (i, answer) in answers.iter().enumerate() {
            let responder = channel.responder(counter.advance());
            match answer {
                0 => responder.resolve(i as u8),
                1 => responder.reject(TaskError::Failed("boom".into())),
                _ => drop(responder),
            }
        }

        let mut seen = Vec::new();
        while let Some(response) = channel.try_next() {
            seen.push(response);
        }
        prop_assert_eq!(seen.len(), answers.len());
        for (i, (response, answer)) in seen.iter().zip(&answers).enumerate() {
            prop_assert_eq!(response.generation, i as u64 + 1);
            let expected = match answer {
                0 => Ok(i as u8),
                1 => Err(TaskError::Failed("boom".into())),
                _ => Err(TaskError::Abandoned),
            };
            prop_assert_eq!(&response.outcome, &expected);
        }
    }
}
