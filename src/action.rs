use thiserror::Error;
use crate::model::entity::Name;

/// Index of a group slot in the working state.
pub type Index = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Add { individual: Name, group_index: Index },
    /// Move every member of `source` into `target`, leaving `source` empty.
    Merge { source: Index, target: Index },
    Evict(Name),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    #[error("invalid group index {0}")]
    InvalidGroup(Index),
    #[error("group {group} is full (capacity {capacity})")]
    GroupFull { group: Index, capacity: usize },
    #[error("merging group {from} into {into} gives {combined} members, limit is {limit}")]
    OverCapacity { from: Index, into: Index, combined: usize, limit: usize },
    #[error("{individual} is already in group {group}")]
    AlreadyAssigned { individual: Name, group: Index },
    #[error("{0} is not assigned to any group")]
    NotAssigned(Name),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    Applicable,
    /// Valid, but changes nothing (e.g. merging a group into itself).
    Noop,
    Failed(ActionError),
}

impl ActionResult {
    pub fn is_applicable(&self) -> bool {
        matches!(self, ActionResult::Applicable)
    }
}
