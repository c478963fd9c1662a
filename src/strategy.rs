use std::cmp::Reverse;

use log::info;
use rand::prelude::SliceRandom;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::action::Action;
use crate::config::Budget;
use crate::error::PartitionError;
use crate::graph;
use crate::greedy::{self, GreedyOutcome};
use crate::model::condition::Capacities;
use crate::model::entity::{Name, Roster};
use crate::model::group::Table;
use crate::model::preference::Preferences;
use crate::repair::{self, Placement};
use crate::state::State;

/// Splits a roster into groups of exactly the given capacities.
pub trait Partitioner {
    fn partition(&self, roster: &Roster, preferences: &Preferences, capacities: &Capacities) -> Result<Table, PartitionError>;
}

/// Greedy merge over the compatibility graph, then placement and rebalancing.
#[derive(Debug, Clone, Default)]
pub struct WeightedMerge {
    pub budget: Budget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub greedy: GreedyOutcome,
    pub placement: Placement,
    pub evicted: usize,
}

impl WeightedMerge {
    pub fn new(budget: Budget) -> Self {
        WeightedMerge { budget }
    }

    /// Like [`Partitioner::partition`], also returning what each phase did.
    pub fn run(&self, roster: &Roster, preferences: &Preferences, capacities: &Capacities) -> Result<(Table, Report), PartitionError> {
        check_capacities(roster, capacities)?;
        let edges = graph::build(roster, preferences);
        info!("{} individuals, {} edges, capacities {:?}", roster.len(), edges.len(), capacities.as_slice());

        let mut state = State::new(capacities);
        let greedy = greedy::run(&mut state, &edges, &self.budget)?;
        let placement = repair::place_unassigned(&mut state, roster, preferences)?;
        let evicted = repair::rebalance(&mut state)?;
        state.verify(roster)?;

        Ok((state.into_table(), Report { greedy, placement, evicted }))
    }
}

impl Partitioner for WeightedMerge {
    fn partition(&self, roster: &Roster, preferences: &Preferences, capacities: &Capacities) -> Result<Table, PartitionError> {
        self.run(roster, preferences, capacities).map(|(table, _)| table)
    }
}

/// Fills one group at a time around the individual with the most
/// still-unassigned peers, then tops it up from a shuffled pool.
#[derive(Debug, Clone, Default)]
pub struct MostPreferencesFirst {
    pub seed: u64,
}

impl MostPreferencesFirst {
    pub fn new(seed: u64) -> Self {
        MostPreferencesFirst { seed }
    }
}

impl Partitioner for MostPreferencesFirst {
    fn partition(&self, roster: &Roster, preferences: &Preferences, capacities: &Capacities) -> Result<Table, PartitionError> {
        check_capacities(roster, capacities)?;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut state = State::new(capacities);

        for group_index in 0..capacities.len() {
            let unassigned = state.unassigned(roster);
            let Some(&anchor) = unassigned.iter()
                .min_by_key(|name| Reverse(open_peers(&state, preferences, name)))
            else {
                break;
            };
            if capacities.get(group_index) == Some(0) {
                continue;
            }

            state.act(Action::Add { individual: anchor.clone(), group_index })?;
            for peer in preferences.ranked_peers(anchor) {
                if free(&state, group_index) == 0 {
                    break;
                }
                if state.group_of(peer).is_none() {
                    state.act(Action::Add { individual: peer.clone(), group_index })?;
                }
            }

            let mut pool = state.unassigned(roster);
            pool.shuffle(&mut rng);
            for name in pool.into_iter().take(free(&state, group_index)) {
                state.act(Action::Add { individual: name.clone(), group_index })?;
            }
        }

        state.verify(roster)?;
        Ok(state.into_table())
    }
}

fn open_peers(state: &State, preferences: &Preferences, name: &Name) -> usize {
    preferences.get(name)
        .map(|peers| peers.keys().filter(|peer| state.group_of(peer).is_none()).count())
        .unwrap_or(0)
}

fn free(state: &State, group_index: usize) -> usize {
    state.slot(group_index).map_or(0, |slot| slot.free())
}

fn check_capacities(roster: &Roster, capacities: &Capacities) -> Result<(), PartitionError> {
    if capacities.total() != roster.len() {
        return Err(PartitionError::CapacityMismatch { expected: roster.len(), actual: capacities.total() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::preference::{PreferenceRow, RankScale};
    use crate::preference;

    fn setup(names: &[&str], rows: Vec<PreferenceRow>) -> (Roster, Preferences) {
        let roster = Roster::new(names.iter().copied());
        let prefs = preference::build(&roster, &rows, &RankScale::default());
        (roster, prefs)
    }

    #[test]
    fn mutual_pair_stays_together() {
        let (roster, prefs) = setup(&["A", "B", "C", "D"], vec![
            PreferenceRow::ranked("A", ["B"]),
            PreferenceRow::ranked("B", ["A"]),
        ]);
        let capacities = Capacities::split(4, 2).unwrap();
        let (table, report) = WeightedMerge::default().run(&roster, &prefs, &capacities).unwrap();

        assert_eq!(table.sizes(), vec![2, 2]);
        assert_eq!(table.group_of("A"), table.group_of("B"));
        assert_eq!(table.group_of("C"), table.group_of("D"));
        assert_ne!(table.group_of("A"), table.group_of("C"));
        assert_eq!(report.placement, Placement { with_peer: 0, fallback: 2 });
        assert!(!report.greedy.truncated);
    }

    #[test]
    fn unrequited_preference_yields_to_mutual_pair() {
        let (roster, prefs) = setup(&["A", "B", "C", "D"], vec![
            PreferenceRow::ranked("A", ["B", "C"]),
            PreferenceRow::ranked("C", ["A"]),
        ]);
        let capacities = Capacities::split(4, 2).unwrap();
        let table = WeightedMerge::default().partition(&roster, &prefs, &capacities).unwrap();

        assert_eq!(table.group_of("A"), table.group_of("C"));
        assert_ne!(table.group_of("A"), table.group_of("B"));
    }

    #[test]
    fn overfull_merge_is_repaired() {
        // Three pairs land in three groups; the weaker b-e edge then merges
        // group 0 (capacity 4) into group 2 (capacity 3), which the
        // rebalancer trims back.
        let names = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"];
        let (roster, prefs) = setup(&names, vec![
            PreferenceRow::ranked("a", ["b"]),
            PreferenceRow::new("b", vec![Some("a".into()), None, Some("e".into())]),
            PreferenceRow::ranked("c", ["d"]),
            PreferenceRow::ranked("d", ["c"]),
            PreferenceRow::new("e", vec![Some("f".into()), None, Some("b".into())]),
            PreferenceRow::ranked("f", ["e"]),
        ]);
        let capacities = Capacities::split(11, 3).unwrap();
        assert_eq!(capacities.as_slice(), &[4, 4, 3]);

        let (table, report) = WeightedMerge::new(Budget::Unlimited).run(&roster, &prefs, &capacities).unwrap();

        assert_eq!(report.evicted, 1);
        assert_eq!(report.placement, Placement { with_peer: 0, fallback: 5 });
        assert_eq!(table.sizes(), vec![4, 4, 3]);
        assert_eq!(table.group_of("a"), table.group_of("b"));
        assert_eq!(table.group_of("a"), table.group_of("e"));
        assert_ne!(table.group_of("a"), table.group_of("f"));
        assert_eq!(table.group_of("c"), table.group_of("d"));
    }

    #[test]
    fn capacity_mismatch_is_fatal() {
        let (roster, prefs) = setup(&["a", "b", "c"], vec![]);
        let capacities = Capacities::split(4, 2).unwrap();
        let err = WeightedMerge::default().partition(&roster, &prefs, &capacities).unwrap_err();
        assert_eq!(err, PartitionError::CapacityMismatch { expected: 3, actual: 4 });
    }

    #[test]
    fn most_preferences_first_anchors_on_busiest_submitter() {
        let (roster, prefs) = setup(&["a", "b", "c", "d", "e", "f"], vec![
            PreferenceRow::ranked("a", ["f"]),
            PreferenceRow::ranked("d", ["b", "c"]),
        ]);
        let capacities = Capacities::split(6, 2).unwrap();
        let table = MostPreferencesFirst::new(7).partition(&roster, &prefs, &capacities).unwrap();

        assert_eq!(table.sizes(), vec![3, 3]);
        assert_eq!(table.group_of("d"), Some(1));
        assert_eq!(table.group_of("b"), Some(1));
        assert_eq!(table.group_of("c"), Some(1));
        assert_eq!(table.group_of("a"), table.group_of("f"));
    }

    #[test]
    fn most_preferences_first_is_seeded() {
        let names: Vec<String> = (0..12).map(|i| format!("p{i:02}")).collect();
        let roster = Roster::new(names.iter().cloned());
        let prefs = preference::build(&roster, &[], &RankScale::default());
        let capacities = Capacities::split(12, 3).unwrap();

        let first = MostPreferencesFirst::new(42).partition(&roster, &prefs, &capacities).unwrap();
        let second = MostPreferencesFirst::new(42).partition(&roster, &prefs, &capacities).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.sizes(), vec![4, 4, 4]);
    }
}
