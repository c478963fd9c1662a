use std::collections::BTreeMap;

use log::debug;

use crate::model::entity::Roster;
use crate::model::preference::{PreferenceRow, Preferences, RankScale, RANK_COUNT};

/// Cleans raw rows against the roster.
///
/// Rows from unknown submitters are dropped, as are peers outside the
/// roster, self-references, blank cells and ranks past `RANK_COUNT`.
/// A peer listed twice keeps its strongest rank; a submitter with several
/// rows keeps the last one. Roster members without a row get an empty map.
pub fn build(roster: &Roster, rows: &[PreferenceRow], scale: &RankScale) -> Preferences {
    let mut table: BTreeMap<_, BTreeMap<_, _>> = roster.iter()
        .map(|name| (name.clone(), BTreeMap::new()))
        .collect();

    for row in rows {
        if !roster.contains(&row.submitter) {
            debug!("dropping preferences of unknown submitter {:?}", row.submitter);
            continue;
        }
        if row.choices.len() > RANK_COUNT {
            debug!("{}: ignoring {} choices past rank {RANK_COUNT}", row.submitter, row.choices.len() - RANK_COUNT);
        }

        let mut peers = BTreeMap::new();
        for (position, choice) in row.choices.iter().enumerate().take(RANK_COUNT) {
            let Some(peer) = choice.as_deref().map(str::trim).filter(|peer| !peer.is_empty()) else {
                continue;
            };
            if !roster.contains(peer) {
                debug!("{}: dropping unknown peer {peer:?}", row.submitter);
                continue;
            }
            if peer == row.submitter {
                continue;
            }
            let Some(strength) = scale.strength(position + 1).filter(|&s| s > 0) else {
                continue;
            };
            peers.entry(peer.to_string()).or_insert(strength);
        }

        if table.insert(row.submitter.clone(), peers).is_some_and(|old| !old.is_empty()) {
            debug!("{}: later row replaces earlier preferences", row.submitter);
        }
    }

    Preferences(table)
}
