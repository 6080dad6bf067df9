/// Admission policy for a tenant's pending-message queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueuePolicy {
    /// Every enqueue is accepted
    #[default]
    Unbounded,
    /// Enqueue fails with `QueueFull` once `capacity` messages are pending
    Reject { capacity: usize },
}

impl QueuePolicy {
    /// Build from a configured capacity where 0 means unbounded.
    pub fn from_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            QueuePolicy::Unbounded
        } else {
            QueuePolicy::Reject { capacity }
        }
    }

    /// Whether one more message may be queued behind `pending` others.
    pub fn admits(&self, pending: usize) -> bool {
        match self {
            QueuePolicy::Unbounded => true,
            QueuePolicy::Reject { capacity } => pending < *capacity,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        match self {
            QueuePolicy::Unbounded => None,
            QueuePolicy::Reject { capacity } => Some(*capacity),
        }
    }
}
