//! Local transactions for optimistic updates.
//!
//! An update is applied to local state before the backend confirms it. When
//! the backend call settles, the update either commits (nothing to do) or,
//! if it failed and the policy asks for it, the pre-update snapshot is put
//! back.

/// What happens to local state when the backend call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackPolicy {
    /// Leave the speculative state in place.
    Keep,
    /// Restore the state captured before the mutation.
    Restore,
}

/// A speculative mutation awaiting the backend's verdict.
#[must_use = "an optimistic update must be settled with the call's outcome"]
#[derive(Debug)]
pub struct OptimisticUpdate<S> {
    policy: RollbackPolicy,
    snapshot: Option<S>,
}

impl<S: Clone> OptimisticUpdate<S> {
    /// Apply `mutation` to `state`, snapshotting first when the policy is
    /// [`RollbackPolicy::Restore`].
    pub fn apply(state: &mut S, policy: RollbackPolicy, mutation: impl FnOnce(&mut S)) -> Self {
        let snapshot = match policy {
            RollbackPolicy::Restore => Some(state.clone()),
            RollbackPolicy::Keep => None,
        };
        mutation(state);
        Self { policy, snapshot }
    }

    pub fn policy(&self) -> RollbackPolicy {
        self.policy
    }

    /// Commit on success, roll back on failure when a snapshot exists.
    /// Returns whether `state` was restored.
    pub fn settle<T, E>(self, state: &mut S, outcome: &Result<T, E>) -> bool {
        match (outcome, self.snapshot) {
            (Err(_), Some(snapshot)) => {
                *state = snapshot;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_policy_rolls_back_on_failure() {
        let mut state = vec![1, 2, 3];
        let update = OptimisticUpdate::apply(&mut state, RollbackPolicy::Restore, |s| s.push(4));
        assert_eq!(state, vec![1, 2, 3, 4]);

        let rolled_back = update.settle(&mut state, &Err::<(), _>("boom"));
        assert!(rolled_back);
        assert_eq!(state, vec![1, 2, 3]);
    }

    #[test]
    fn restore_policy_commits_on_success() {
        let mut state = vec![1];
        let update = OptimisticUpdate::apply(&mut state, RollbackPolicy::Restore, |s| s.clear());
        assert!(!update.settle(&mut state, &Ok::<_, ()>(())));
        assert!(state.is_empty());
    }

    #[test]
    fn keep_policy_leaves_speculative_state() {
        let mut state = String::from("draft");
        let update = OptimisticUpdate::apply(&mut state, RollbackPolicy::Keep, |s| s.push_str(" (sent)"));
        assert_eq!(update.policy(), RollbackPolicy::Keep);
        assert!(!update.settle(&mut state, &Err::<(), _>(())));
        assert_eq!(state, "draft (sent)");
    }
}
