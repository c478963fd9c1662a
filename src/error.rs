use thiserror::Error;

use crate::action::{ActionError, Index};
use crate::model::entity::Name;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PartitionError {
    #[error("at least one group is required")]
    NoGroups,
    #[error("group capacities sum to {actual}, population is {expected}")]
    CapacityMismatch { expected: usize, actual: usize },
    #[error("no group has a free seat for {individual}")]
    NoSpareCapacity { individual: Name },
    #[error("{individual} is placed {placements} times, expected once")]
    Coverage { individual: Name, placements: usize },
    #[error("group {group} holds {size} members, capacity is {capacity}")]
    SizeMismatch { group: Index, capacity: usize, size: usize },
    #[error(transparent)]
    Action(#[from] ActionError),
}
