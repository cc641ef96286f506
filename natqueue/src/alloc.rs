use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::QueueError;

/// Decides which storage requests are refused, so that the failure paths of
/// the queue can be exercised deterministically or at random.
#[derive(Debug, Clone, Default)]
pub enum FailPolicy {
    #[default]
    Never,
    /// The first `n` requests succeed, every later one fails.
    After(usize),
    Percent { percent: u8, rng: StdRng },
}

impl FailPolicy {
    pub fn percent(percent: u8, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        FailPolicy::Percent {
            percent: percent.min(100),
            rng,
        }
    }

    fn refuses(&mut self) -> bool {
        match self {
            FailPolicy::Never => false,
            FailPolicy::After(0) => true,
            FailPolicy::After(remaining) => {
                *remaining -= 1;
                false
            }
            FailPolicy::Percent { percent, rng } => rng.gen_range(0..100u8) < *percent,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Allocator {
    policy: FailPolicy,
    requests: usize,
}

impl Allocator {
    pub fn new(policy: FailPolicy) -> Self {
        Self {
            policy,
            requests: 0,
        }
    }

    pub fn set_policy(&mut self, policy: FailPolicy) {
        self.policy = policy;
    }

    /// Number of storage requests seen so far, refused ones included.
    pub fn requests(&self) -> usize {
        self.requests
    }

    pub(crate) fn grant(&mut self) -> Result<(), QueueError> {
        self.requests += 1;
        if self.policy.refuses() {
            debug!("storage request #{} refused", self.requests);
            return Err(QueueError::AllocationFailure);
        }
        Ok(())
    }

    /// Makes an independent copy of `s`, never aliasing the caller's buffer.
    pub(crate) fn copy_payload(&mut self, s: &str) -> Result<String, QueueError> {
        self.grant()?;
        let mut value = String::new();
        value.try_reserve_exact(s.len())?;
        value.push_str(s);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Allocator, FailPolicy};
    use crate::error::QueueError;

    #[test]
    fn test_after_policy_refuses_once_exhausted() {
        let mut alloc = Allocator::new(FailPolicy::After(2));
        assert_eq!(alloc.grant(), Ok(()));
        assert_eq!(alloc.copy_payload("abc").as_deref(), Ok("abc"));
        assert_eq!(alloc.grant(), Err(QueueError::AllocationFailure));
        assert_eq!(alloc.grant(), Err(QueueError::AllocationFailure));
        assert_eq!(alloc.requests(), 4);
    }

    #[test]
    fn test_percent_policy_bounds() {
        let mut never = Allocator::new(FailPolicy::percent(0, Some(7)));
        let mut always = Allocator::new(FailPolicy::percent(100, Some(7)));
        for _ in 0..64 {
            assert!(never.grant().is_ok());
            assert!(always.grant().is_err());
        }
    }

    #[test]
    fn test_seeded_percent_policy_is_reproducible() {
        let run = |seed| {
            let mut alloc = Allocator::new(FailPolicy::percent(50, Some(seed)));
            (0..32).map(|_| alloc.grant().is_ok()).collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }
}
