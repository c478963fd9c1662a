use itertools::Itertools;

use crate::model::entity::{Name, Roster};
use crate::model::preference::{Preferences, Strength};

pub type Weight = u32;

/// Strength at or above which a preference counts as strong.
const STRONG: Strength = 4;
/// Strength at or below which a preference counts as weak.
const WEAK: Strength = 2;

/// Undirected edge with `a < b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub a: Name,
    pub b: Name,
    pub weight: Weight,
}

/// Combines the two directional strengths of a pair. First matching rule wins:
/// mutual strong is 10, unrequited strong is 1, mutual weak is 5, otherwise
/// the sum.
pub fn weight(rank_ab: Strength, rank_ba: Strength) -> Weight {
    let (ab, ba) = (Weight::from(rank_ab), Weight::from(rank_ba));
    if rank_ab >= STRONG && rank_ba >= STRONG {
        10
    } else if (rank_ab >= STRONG && rank_ba == 0) || (rank_ba >= STRONG && rank_ab == 0) {
        1
    } else if rank_ab <= WEAK && rank_ba <= WEAK && rank_ab > 0 && rank_ba > 0 {
        5
    } else {
        ab + ba
    }
}

/// One edge per unordered pair with any preference between them, sorted by
/// weight descending, then by `(a, b)` ascending.
pub fn build(roster: &Roster, preferences: &Preferences) -> Vec<Edge> {
    roster.iter()
        .combinations(2)
        .filter_map(|pair| {
            let (a, b) = if pair[0] < pair[1] { (pair[0], pair[1]) } else { (pair[1], pair[0]) };
            let (rank_ab, rank_ba) = (preferences.strength(a, b), preferences.strength(b, a));
            if rank_ab == 0 && rank_ba == 0 {
                return None;
            }
            Some(Edge { a: a.clone(), b: b.clone(), weight: weight(rank_ab, rank_ba) })
        })
        .sorted_by(|e1, e2| {
            e2.weight.cmp(&e1.weight)
                .then_with(|| e1.a.cmp(&e2.a))
                .then_with(|| e1.b.cmp(&e2.b))
        })
        .collect()
}
