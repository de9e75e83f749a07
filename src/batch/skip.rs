//! Skip policy for fault-tolerant steps.

use super::error::ItemError;

/// Bounded tolerance for skippable item failures.
///
/// A failed item is dropped only when its error is skippable and fewer than
/// `limit` items have already been skipped in the step. With a limit of `L`
/// the step survives exactly `L` skips and fails on the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SkipPolicy {
    limit: usize,
}

impl SkipPolicy {
    pub fn limit(limit: usize) -> Self {
        Self { limit }
    }

    /// No tolerance: every item failure is fatal to the step.
    pub fn never() -> Self {
        Self { limit: 0 }
    }

    pub fn skip_limit(&self) -> usize {
        self.limit
    }

    pub fn should_skip(&self, error: &ItemError, skipped_so_far: usize) -> bool {
        error.is_skippable() && skipped_so_far < self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_until_limit() {
        let policy = SkipPolicy::limit(2);
        let err = ItemError::skippable("corrupt video");

        assert!(policy.should_skip(&err, 0));
        assert!(policy.should_skip(&err, 1));
        assert!(!policy.should_skip(&err, 2));
    }

    #[test]
    fn test_fatal_never_skipped() {
        let policy = SkipPolicy::limit(1000);
        assert!(!policy.should_skip(&ItemError::fatal("disk gone"), 0));
    }

    #[test]
    fn test_never_policy() {
        let policy = SkipPolicy::never();
        assert_eq!(policy.skip_limit(), 0);
        assert!(!policy.should_skip(&ItemError::skippable("x"), 0));
    }
}
