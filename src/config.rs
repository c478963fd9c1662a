use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::PartitionError;
use crate::model::condition::Capacities;
use crate::model::preference::RankScale;

/// How many groups to form, given either directly or as a group size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupTarget {
    Count(usize),
    /// Resolves to `ceil(population / size)` groups.
    Size(usize),
}

impl GroupTarget {
    pub fn group_count(&self, population: usize) -> Result<usize, PartitionError> {
        match *self {
            GroupTarget::Count(0) | GroupTarget::Size(0) => Err(PartitionError::NoGroups),
            GroupTarget::Count(count) => Ok(count),
            GroupTarget::Size(size) => Ok(population.div_ceil(size).max(1)),
        }
    }

    pub fn capacities(&self, population: usize) -> Result<Capacities, PartitionError> {
        Capacities::split(population, self.group_count(population)?)
    }
}

/// Soft limit on the greedy pass. Running out is not an error: the
/// remaining individuals go to the fallback placer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Budget {
    Unlimited,
    /// Maximum number of edges to consider.
    Steps(usize),
    /// Wall-clock limit measured from the start of the pass.
    Deadline(Duration),
}

impl Default for Budget {
    fn default() -> Self {
        Budget::Deadline(Duration::from_secs(50))
    }
}

impl Budget {
    pub fn is_spent(&self, steps: usize, started: Instant) -> bool {
        match *self {
            Budget::Unlimited => false,
            Budget::Steps(limit) => steps >= limit,
            Budget::Deadline(limit) => started.elapsed() > limit,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    WeightedMerge,
    MostPreferencesFirst { seed: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: GroupTarget,
    pub rank_scale: RankScale,
    pub budget: Budget,
    pub strategy: StrategyKind,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            target: GroupTarget::Count(6),
            rank_scale: RankScale::default(),
            budget: Budget::default(),
            strategy: StrategyKind::default(),
        }
    }
}
