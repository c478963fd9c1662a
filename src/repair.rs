use log::{debug, info};

use crate::action::Action;
use crate::error::PartitionError;
use crate::model::entity::{Name, Roster};
use crate::model::preference::Preferences;
use crate::state::State;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    /// Placed next to one of their preferred peers.
    pub with_peer: usize,
    /// Placed in the first group with a free seat.
    pub fallback: usize,
}

/// Seats everyone the greedy pass left out, in roster order.
///
/// Candidate groups are those holding one of the individual's peers, tried
/// strongest preference first. If none has room, the first slot with a free
/// seat is used.
pub fn place_unassigned(state: &mut State, roster: &Roster, preferences: &Preferences) -> Result<Placement, PartitionError> {
    let mut placement = Placement::default();

    for name in state.unassigned(roster) {
        let near_peer = preferences.ranked_peers(name).into_iter()
            .filter_map(|peer| state.group_of(peer))
            .find(|&group| state.slot(group).is_some_and(|slot| slot.free() > 0));

        let group_index = match near_peer {
            Some(group_index) => {
                placement.with_peer += 1;
                group_index
            }
            None => {
                placement.fallback += 1;
                first_free(state, name)?
            }
        };
        state.act(Action::Add { individual: name.clone(), group_index })?;
    }

    info!("placed {} with a peer, {} by fallback", placement.with_peer, placement.fallback);
    Ok(placement)
}

/// Trims every overfull slot back to its capacity and reseats the evicted
/// members in the first slots with room. Members are kept in name order;
/// the evicted members' own preferences are not consulted.
///
/// Returns the number of evictions.
pub fn rebalance(state: &mut State) -> Result<usize, PartitionError> {
    let mut evicted_total = 0;

    for index in 0..state.slots().len() {
        let slot = &state.slots()[index];
        if slot.overflow() == 0 {
            continue;
        }
        let evicted: Vec<Name> = slot.members.iter().skip(slot.capacity).cloned().collect();
        debug!("group {index} over capacity {} by {}, evicting {evicted:?}", slot.capacity, evicted.len());

        for name in &evicted {
            state.act(Action::Evict(name.clone()))?;
        }
        for name in evicted {
            let group_index = first_free(state, &name)?;
            state.act(Action::Add { individual: name, group_index })?;
            evicted_total += 1;
        }
    }

    if evicted_total > 0 {
        info!("rebalanced {evicted_total} members out of overfull groups");
    }
    Ok(evicted_total)
}

fn first_free(state: &State, name: &Name) -> Result<usize, PartitionError> {
    state.first_with_room().ok_or_else(|| PartitionError::NoSpareCapacity { individual: name.clone() })
}
