//! Optimistic mutation lifecycle
//!
//! A mutation captures the value it replaces, the caller applies the proposed
//! value locally, and the remote write then either commits it or rolls it
//! back to the captured value.

use crate::types::{PlaceId, UserAlert};

/// Where a mutation is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    /// Applied locally, remote write outstanding
    Pending,
    /// Remote write succeeded
    Committed,
    /// Remote write failed and the local value was restored
    RolledBack,
}

/// One optimistic change to a single place
#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticMutation<T> {
    place_id: PlaceId,
    previous: T,
    proposed: T,
    status: MutationStatus,
}

impl<T: Clone> OptimisticMutation<T> {
    /// Start a mutation from `previous` to `proposed`
    pub fn begin(place_id: PlaceId, previous: T, proposed: T) -> Self {
        Self {
            place_id,
            previous,
            proposed,
            status: MutationStatus::Pending,
        }
    }

    /// Place being mutated
    pub fn place_id(&self) -> PlaceId {
        self.place_id
    }

    /// Value before the mutation
    pub fn previous(&self) -> &T {
        &self.previous
    }

    /// Value the mutation writes
    pub fn proposed(&self) -> &T {
        &self.proposed
    }

    /// Current status
    pub fn status(&self) -> MutationStatus {
        self.status
    }

    /// Mark the remote write as done
    pub fn commit(&mut self) {
        if self.status == MutationStatus::Pending {
            self.status = MutationStatus::Committed;
        }
    }

    /// Mark the mutation as rolled back and hand out the value to restore
    pub fn roll_back(&mut self) -> T {
        self.status = MutationStatus::RolledBack;
        self.previous.clone()
    }
}

/// Result of running a mutation against the store
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome<T> {
    /// The finished mutation
    pub mutation: OptimisticMutation<T>,
    /// Alert to show when the mutation was rolled back
    pub alert: Option<UserAlert>,
}

impl<T: Clone> MutationOutcome<T> {
    /// True when the remote write succeeded
    pub fn is_committed(&self) -> bool {
        self.mutation.status() == MutationStatus::Committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit() {
        let mut m = OptimisticMutation::begin(1, 3u64, 4u64);
        assert_eq!(m.status(), MutationStatus::Pending);
        m.commit();
        assert_eq!(m.status(), MutationStatus::Committed);
        assert_eq!(*m.proposed(), 4);
    }

    #[test]
    fn test_roll_back_returns_previous() {
        let mut m = OptimisticMutation::begin(1, Some("old".to_string()), None);
        assert_eq!(m.roll_back(), Some("old".to_string()));
        assert_eq!(m.status(), MutationStatus::RolledBack);
        // a rolled back mutation cannot be committed afterwards
        m.commit();
        assert_eq!(m.status(), MutationStatus::RolledBack);
    }
}
