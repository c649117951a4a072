//! Core traits for the ledger's outside inputs
//!
//! The ledger reads the wall clock (night window, execution dates) and draws
//! transaction id candidates. Both sit behind traits so tests can pin them.

use crate::types::{TransactionId, MAX_TRANSACTION_ID};
use chrono::{Local, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the current local date and time
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Source of transaction id candidates
///
/// Candidates may repeat; the store rejects ids already in use and asks again.
pub trait IdSource {
    fn next_candidate(&mut self) -> TransactionId;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Uniform random ids in `0..=MAX_TRANSACTION_ID`
#[derive(Debug, Clone)]
pub struct RandomIds {
    rng: StdRng,
}

impl RandomIds {
    pub fn new() -> Self {
        RandomIds {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sequence, for tests and benchmarks
    pub fn seeded(seed: u64) -> Self {
        RandomIds {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for RandomIds {
    fn next_candidate(&mut self) -> TransactionId {
        self.rng.gen_range(0..=MAX_TRANSACTION_ID)
    }
}

/// Replays a fixed list of candidates, then counts up from the last one
#[derive(Debug, Clone)]
pub struct SequenceIds {
    queue: std::collections::VecDeque<TransactionId>,
    next: TransactionId,
}

impl SequenceIds {
    pub fn new(candidates: impl IntoIterator<Item = TransactionId>) -> Self {
        let queue: std::collections::VecDeque<_> = candidates.into_iter().collect();
        let next = queue.back().map_or(0, |last| last.saturating_add(1));
        SequenceIds { queue, next }
    }
}

impl IdSource for SequenceIds {
    fn next_candidate(&mut self) -> TransactionId {
        match self.queue.pop_front() {
            Some(id) => id,
            None => {
                let id = self.next;
                self.next = if id >= MAX_TRANSACTION_ID { 0 } else { id + 1 };
                id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fixed_clock_returns_instant() {
        let instant = NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(22, 15, 0)
            .unwrap();
        assert_eq!(FixedClock(instant).now(), instant);
    }

    #[test]
    fn test_random_ids_stay_in_range() {
        let mut ids = RandomIds::seeded(7);
        for _ in 0..1000 {
            assert!(ids.next_candidate() <= MAX_TRANSACTION_ID);
        }
    }

    #[test]
    fn test_seeded_random_ids_are_reproducible() {
        let mut a = RandomIds::seeded(42);
        let mut b = RandomIds::seeded(42);
        let first: Vec<_> = (0..5).map(|_| a.next_candidate()).collect();
        let second: Vec<_> = (0..5).map(|_| b.next_candidate()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sequence_ids_replay_then_count() {
        let mut ids = SequenceIds::new([5, 5, 9]);
        let drawn: Vec<_> = (0..5).map(|_| ids.next_candidate()).collect();
        assert_eq!(drawn, vec![5, 5, 9, 10, 11]);
    }
}
