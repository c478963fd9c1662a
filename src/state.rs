use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::mem;

use crate::action::{Action, ActionError, ActionResult, Index};
use crate::error::PartitionError;
use crate::model::condition::Capacities;
use crate::model::entity::{Name, Roster};
use crate::model::group::{Group, Table};

/// A group slot during a run. Its identity survives merges; a drained
/// slot keeps its capacity and may be refilled by later passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub capacity: usize,
    pub members: BTreeSet<Name>,
}

impl Slot {
    pub fn free(&self) -> usize {
        self.capacity.saturating_sub(self.members.len())
    }

    pub fn overflow(&self) -> usize {
        self.members.len().saturating_sub(self.capacity)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }
}

/// Working state shared by every phase: the slots plus the assignment map.
///
/// All mutation goes through [`State::act`], which keeps the two views in
/// step: a name maps to slot `i` exactly when slot `i` holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    slots: Vec<Slot>,
    assignment: BTreeMap<Name, Index>,
}

impl State {
    pub fn new(capacities: &Capacities) -> State {
        let slots = capacities.as_slice().iter()
            .map(|&capacity| Slot { capacity, members: BTreeSet::new() })
            .collect();
        State { slots, assignment: BTreeMap::new() }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: Index) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn group_of(&self, name: &str) -> Option<Index> {
        self.assignment.get(name).copied()
    }

    pub fn n_assigned(&self) -> usize {
        self.assignment.len()
    }

    /// Roster members without a slot, in roster order.
    pub fn unassigned<'a>(&self, roster: &'a Roster) -> Vec<&'a Name> {
        roster.iter().filter(|name| !self.assignment.contains_key(*name)).collect()
    }

    /// Slot with the most free seats, lowest index on ties.
    pub fn roomiest(&self) -> Option<Index> {
        self.slots.iter().enumerate()
            .filter(|(_, slot)| slot.free() > 0)
            .min_by_key(|(index, slot)| (Reverse(slot.free()), *index))
            .map(|(index, _)| index)
    }

    pub fn first_with_room(&self) -> Option<Index> {
        self.slots.iter().position(|slot| slot.free() > 0)
    }

    pub fn simulate(&self, action: &Action) -> ActionResult {
        match action {
            Action::Add { individual, group_index } => {
                let Some(slot) = self.slots.get(*group_index) else {
                    return ActionResult::Failed(ActionError::InvalidGroup(*group_index));
                };
                if let Some(&group) = self.assignment.get(individual) {
                    return ActionResult::Failed(ActionError::AlreadyAssigned {
                        individual: individual.clone(),
                        group,
                    });
                }
                if slot.is_full() {
                    return ActionResult::Failed(ActionError::GroupFull {
                        group: *group_index,
                        capacity: slot.capacity,
                    });
                }
                ActionResult::Applicable
            }
            Action::Merge { source, target } => {
                let (Some(from), Some(to)) = (self.slots.get(*source), self.slots.get(*target)) else {
                    let bad = if self.slots.get(*source).is_none() { *source } else { *target };
                    return ActionResult::Failed(ActionError::InvalidGroup(bad));
                };
                if source == target {
                    return ActionResult::Noop;
                }
                let combined = from.members.len() + to.members.len();
                let limit = from.capacity.max(to.capacity);
                if combined > limit {
                    return ActionResult::Failed(ActionError::OverCapacity {
                        from: *source,
                        into: *target,
                        combined,
                        limit,
                    });
                }
                ActionResult::Applicable
            }
            Action::Evict(individual) => {
                if self.assignment.contains_key(individual) {
                    ActionResult::Applicable
                } else {
                    ActionResult::Failed(ActionError::NotAssigned(individual.clone()))
                }
            }
        }
    }

    pub fn act(&mut self, action: Action) -> Result<(), ActionError> {
        match self.simulate(&action) {
            ActionResult::Applicable => {}
            ActionResult::Noop => return Ok(()),
            ActionResult::Failed(err) => return Err(err),
        }
        match action {
            Action::Add { individual, group_index } => {
                self.slots[group_index].members.insert(individual.clone());
                self.assignment.insert(individual, group_index);
            }
            Action::Merge { source, target } => {
                let moved = mem::take(&mut self.slots[source].members);
                for member in &moved {
                    self.assignment.insert(member.clone(), target);
                }
                self.slots[target].members.extend(moved);
            }
            Action::Evict(individual) => {
                if let Some(group) = self.assignment.remove(&individual) {
                    self.slots[group].members.remove(&individual);
                }
            }
        }
        Ok(())
    }

    /// Checks that every roster member sits in exactly one slot and every
    /// slot is filled to its capacity.
    pub fn verify(&self, roster: &Roster) -> Result<(), PartitionError> {
        let mut placements: BTreeMap<&Name, usize> = roster.iter().map(|name| (name, 0)).collect();
        for slot in &self.slots {
            for member in &slot.members {
                *placements.entry(member).or_insert(0) += 1;
            }
        }
        if let Some((name, &count)) = placements.iter()
            .find(|&(name, &count)| count != 1 || !roster.contains(name.as_str()))
        {
            return Err(PartitionError::Coverage { individual: (*name).clone(), placements: count });
        }
        if let Some((group, slot)) = self.slots.iter().enumerate()
            .find(|(_, slot)| slot.members.len() != slot.capacity)
        {
            return Err(PartitionError::SizeMismatch {
                group,
                capacity: slot.capacity,
                size: slot.members.len(),
            });
        }
        Ok(())
    }

    /// Non-empty slots in index order, numbered from 1.
    pub fn into_table(self) -> Table {
        let groups = self.slots.into_iter()
            .filter(|slot| !slot.members.is_empty())
            .enumerate()
            .map(|(index, slot)| Group { id: index + 1, members: slot.members.into_iter().collect() })
            .collect();
        Table { groups }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(state: &mut State, name: &str, group_index: Index) {
        state.act(Action::Add { individual: name.to_string(), group_index }).unwrap();
    }

    #[test]
    fn add_respects_capacity() {
        let mut state = State::new(&Capacities::new(vec![1, 1], 2).unwrap());
        add(&mut state, "a", 0);
        let result = state.act(Action::Add { individual: "b".into(), group_index: 0 });
        assert_eq!(result, Err(ActionError::GroupFull { group: 0, capacity: 1 }));
        assert_eq!(state.group_of("a"), Some(0));
        assert_eq!(state.group_of("b"), None);
    }

    #[test]
    fn add_twice_is_rejected() {
        let mut state = State::new(&Capacities::new(vec![2, 2], 4).unwrap());
        add(&mut state, "a", 0);
        let result = state.simulate(&Action::Add { individual: "a".into(), group_index: 1 });
        assert_eq!(result, ActionResult::Failed(ActionError::AlreadyAssigned { individual: "a".into(), group: 0 }));
    }

    #[test]
    fn merge_moves_members_and_drains_source() {
        let mut state = State::new(&Capacities::new(vec![3, 2, 1], 6).unwrap());
        add(&mut state, "a", 0);
        add(&mut state, "b", 1);
        add(&mut state, "c", 1);
        state.act(Action::Merge { source: 0, target: 1 }).unwrap();

        assert!(state.slot(0).unwrap().members.is_empty());
        assert_eq!(state.slot(1).unwrap().members.len(), 3);
        assert_eq!(state.group_of("a"), Some(1));
        // limit is the larger capacity, so the target may end up overfull
        assert_eq!(state.slot(1).unwrap().overflow(), 1);
    }

    #[test]
    fn merge_past_larger_capacity_is_rejected() {
        let mut state = State::new(&Capacities::new(vec![3, 3], 6).unwrap());
        add(&mut state, "a", 0);
        add(&mut state, "b", 0);
        add(&mut state, "c", 1);
        add(&mut state, "d", 1);
        let before = state.clone();

        let result = state.act(Action::Merge { source: 0, target: 1 });
        assert_eq!(result, Err(ActionError::OverCapacity { from: 0, into: 1, combined: 4, limit: 3 }));
        assert_eq!(state, before);
    }

    #[test]
    fn evict_unmaps() {
        let mut state = State::new(&Capacities::new(vec![2], 2).unwrap());
        add(&mut state, "a", 0);
        state.act(Action::Evict("a".into())).unwrap();
        assert_eq!(state.group_of("a"), None);
        assert!(state.slot(0).unwrap().members.is_empty());
        assert_eq!(state.act(Action::Evict("a".into())), Err(ActionError::NotAssigned("a".into())));
    }

    #[test]
    fn roomiest_prefers_lowest_index_on_ties() {
        let mut state = State::new(&Capacities::new(vec![2, 3, 3], 8).unwrap());
        assert_eq!(state.roomiest(), Some(1));
        add(&mut state, "a", 1);
        assert_eq!(state.roomiest(), Some(2));
        assert_eq!(state.first_with_room(), Some(0));
    }

    #[test]
    fn into_table_drops_empty_slots_and_renumbers() {
        let mut state = State::new(&Capacities::new(vec![1, 1, 1], 3).unwrap());
        add(&mut state, "b", 0);
        add(&mut state, "a", 2);
        let table = state.into_table();
        assert_eq!(table.groups.len(), 2);
        assert_eq!(table.groups[1].id, 2);
        assert_eq!(table.groups[1].members, vec!["a".to_string()]);
    }

    #[test]
    fn verify_reports_missing_individual() {
        let roster = Roster::new(["a", "b"]);
        let mut state = State::new(&Capacities::new(vec![2], 2).unwrap());
        add(&mut state, "a", 0);
        let err = state.verify(&roster).unwrap_err();
        assert_eq!(err, PartitionError::Coverage { individual: "b".into(), placements: 0 });
    }
}
