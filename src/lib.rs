//! Partitions a roster into fixed-size groups from ranked co-member preferences.
//!
//! The main strategy builds a weighted compatibility graph from everyone's
//! ranked choices, greedily merges along the heaviest edges without
//! exceeding group capacities, then seats leftover individuals and trims
//! overfull groups so every group ends at exactly its capacity.
//!
//! ```
//! use pref_groups::{group_individuals, Config, GroupTarget, PreferenceRow};
//!
//! let rows = vec![
//!     PreferenceRow::ranked("ann", ["bob"]),
//!     PreferenceRow::ranked("bob", ["ann"]),
//! ];
//! let config = Config { target: GroupTarget::Size(2), ..Config::default() };
//! let table = group_individuals(["ann", "bob", "cat", "dan"], &rows, &config).unwrap();
//! assert_eq!(table.group_of("ann"), table.group_of("bob"));
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod graph;
pub mod greedy;
pub mod model;
pub mod preference;
pub mod repair;
pub mod state;
pub mod strategy;

pub use config::{Budget, Config, GroupTarget, StrategyKind};
pub use error::PartitionError;
pub use model::condition::Capacities;
pub use model::entity::{Name, Roster};
pub use model::group::{Group, Table};
pub use model::preference::{PreferenceRow, Preferences, RankScale};
pub use strategy::{MostPreferencesFirst, Partitioner, WeightedMerge};

/// Cleans the inputs, sizes the groups and runs the configured strategy.
pub fn group_individuals<I, S>(roster: I, rows: &[PreferenceRow], config: &Config) -> Result<Table, PartitionError>
where
    I: IntoIterator<Item = S>,
    S: Into<Name>,
{
    let roster = Roster::new(roster);
    let preferences = preference::build(&roster, rows, &config.rank_scale);
    let capacities = config.target.capacities(roster.len())?;

    match config.strategy {
        StrategyKind::WeightedMerge => WeightedMerge::new(config.budget).partition(&roster, &preferences, &capacities),
        StrategyKind::MostPreferencesFirst { seed } => {
            MostPreferencesFirst::new(seed).partition(&roster, &preferences, &capacities)
        }
    }
}
