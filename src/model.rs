pub mod entity {
    use std::collections::HashSet;

    use log::debug;

    pub type Name = String;

    /// The valid population, in enumeration order.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Roster {
        names: Vec<Name>,
        known: HashSet<Name>,
    }

    impl Roster {
        pub fn new<I, S>(names: I) -> Roster
        where
            I: IntoIterator<Item = S>,
            S: Into<Name>,
        {
            let mut roster = Roster::default();
            for name in names {
                let name = name.into();
                if roster.known.insert(name.clone()) {
                    roster.names.push(name);
                } else {
                    debug!("duplicate roster entry {name:?} ignored");
                }
            }
            roster
        }

        pub fn contains(&self, name: &str) -> bool {
            self.known.contains(name)
        }

        pub fn len(&self) -> usize {
            self.names.len()
        }

        pub fn is_empty(&self) -> bool {
            self.names.is_empty()
        }

        pub fn iter(&self) -> impl Iterator<Item = &Name> {
            self.names.iter()
        }
    }
}


pub mod preference {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serialize};

    use super::entity::Name;

    /// Number of ranked choices a submitter may give.
    pub const RANK_COUNT: usize = 5;

    pub type Strength = u8;

    /// Maps a rank position (1 = strongest) to its strength.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RankScale(pub [Strength; RANK_COUNT]);

    impl Default for RankScale {
        fn default() -> Self {
            RankScale([5, 4, 3, 2, 1])
        }
    }

    impl RankScale {
        /// `position` is 1-based. Positions past `RANK_COUNT` have no strength.
        pub fn strength(&self, position: usize) -> Option<Strength> {
            position.checked_sub(1).and_then(|index| self.0.get(index)).copied()
        }
    }

    /// One raw submission: the submitter and their choices in rank order.
    /// `None` and blank entries mean "no preference at that rank".
    #[derive(Debug, Clone, PartialEq)]
    pub struct PreferenceRow {
        pub submitter: Name,
        pub choices: Vec<Option<Name>>,
    }

    impl PreferenceRow {
        pub fn new<S: Into<Name>>(submitter: S, choices: Vec<Option<Name>>) -> PreferenceRow {
            PreferenceRow { submitter: submitter.into(), choices }
        }

        /// Convenience for rows without gaps.
        pub fn ranked<S, I, P>(submitter: S, choices: I) -> PreferenceRow
        where
            S: Into<Name>,
            I: IntoIterator<Item = P>,
            P: Into<Name>,
        {
            PreferenceRow::new(submitter, choices.into_iter().map(|c| Some(c.into())).collect())
        }
    }

    /// Cleaned preferences: submitter -> (peer -> strength).
    /// Every roster individual has an entry, possibly empty.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Preferences(pub(crate) BTreeMap<Name, BTreeMap<Name, Strength>>);

    impl Preferences {
        /// Strength `from` assigned to `to`, 0 if none.
        pub fn strength(&self, from: &str, to: &str) -> Strength {
            self.0.get(from).and_then(|peers| peers.get(to)).copied().unwrap_or(0)
        }

        pub fn get(&self, name: &str) -> Option<&BTreeMap<Name, Strength>> {
            self.0.get(name)
        }

        /// Peers of `name`, strongest first, then by name.
        pub fn ranked_peers(&self, name: &str) -> Vec<&Name> {
            let mut peers = self.0.get(name)
                .map(|peers| peers.iter().collect::<Vec<_>>())
                .unwrap_or_default();
            peers.sort_by(|(n1, s1), (n2, s2)| s2.cmp(s1).then_with(|| n1.cmp(n2)));
            peers.into_iter().map(|(name, _)| name).collect()
        }

        pub fn iter(&self) -> impl Iterator<Item = (&Name, &BTreeMap<Name, Strength>)> {
            self.0.iter()
        }
    }
}


pub mod group {
    use std::fmt;

    use super::entity::Name;

    pub type GroupId = usize;

    /// A group of the final partition. `id` is 1-based in output order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Group {
        pub id: GroupId,
        pub members: Vec<Name>,
    }

    /// The final partition.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Table {
        pub groups: Vec<Group>,
    }

    impl Table {
        pub fn group_of(&self, name: &str) -> Option<GroupId> {
            self.groups.iter()
                .find(|group| group.members.iter().any(|m| m == name))
                .map(|group| group.id)
        }

        pub fn sizes(&self) -> Vec<usize> {
            self.groups.iter().map(|group| group.members.len()).collect()
        }
    }

    impl fmt::Display for Table {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for group in &self.groups {
                writeln!(f, "Group {} (Size {}): {}", group.id, group.members.len(), group.members.join(", "))?;
            }
            Ok(())
        }
    }

}


pub mod condition {
    use crate::error::PartitionError;

    /// Fixed per-slot target capacities. Always sums to the population size.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Capacities(Vec<usize>);

    impl Capacities {
        /// Rejects sizes that do not sum to `population`.
        pub fn new(sizes: Vec<usize>, population: usize) -> Result<Capacities, PartitionError> {
            if sizes.is_empty() {
                return Err(PartitionError::NoGroups);
            }
            let actual: usize = sizes.iter().sum();
            if actual != population {
                return Err(PartitionError::CapacityMismatch { expected: population, actual });
            }
            Ok(Capacities(sizes))
        }

        /// The first `population % n_groups` slots get one extra seat.
        pub fn split(population: usize, n_groups: usize) -> Result<Capacities, PartitionError> {
            if n_groups == 0 {
                return Err(PartitionError::NoGroups);
            }
            let base = population / n_groups;
            let extra = population % n_groups;
            let sizes = (0..n_groups)
                .map(|index| if index < extra { base + 1 } else { base })
                .collect();
            Capacities::new(sizes, population)
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        pub fn total(&self) -> usize {
            self.0.iter().sum()
        }

        pub fn get(&self, index: usize) -> Option<usize> {
            self.0.get(index).copied()
        }

        pub fn as_slice(&self) -> &[usize] {
            &self.0
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn split_gives_extra_seats_to_leading_groups() {
            let capacities = Capacities::split(17, 6).unwrap();
            assert_eq!(capacities.as_slice(), &[3, 3, 3, 3, 3, 2]);
            assert_eq!(capacities.total(), 17);
        }

        #[test]
        fn split_with_fewer_people_than_groups() {
            let capacities = Capacities::split(2, 4).unwrap();
            assert_eq!(capacities.as_slice(), &[1, 1, 0, 0]);
        }

        #[test]
        fn zero_groups_is_rejected() {
            assert!(matches!(Capacities::split(10, 0), Err(PartitionError::NoGroups)));
        }

        #[test]
        fn mismatched_sizes_are_fatal() {
            let err = Capacities::new(vec![3, 3], 7).unwrap_err();
            assert!(matches!(err, PartitionError::CapacityMismatch { expected: 7, actual: 6 }));
        }
    }
}
