use std::time::Instant;

use log::{debug, info, warn};

use crate::action::{Action, ActionError, ActionResult};
use crate::config::Budget;
use crate::graph::Edge;
use crate::state::State;

/// How far the greedy pass got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreedyOutcome {
    pub considered: usize,
    pub total: usize,
    /// The budget ran out before every edge was considered.
    pub truncated: bool,
}

/// Consumes `edges` in order, growing and merging groups without exceeding
/// capacity. Edges that cannot be honoured are skipped.
///
/// The budget is checked before each edge. When it runs out the pass stops
/// and returns what it has; nothing is rolled back.
pub fn run(state: &mut State, edges: &[Edge], budget: &Budget) -> Result<GreedyOutcome, ActionError> {
    let started = Instant::now();
    let mut considered = 0;
    let mut truncated = false;
    let mut merges = 0;

    for edge in edges {
        if budget.is_spent(considered, started) {
            truncated = true;
            break;
        }
        considered += 1;

        match (state.group_of(&edge.a), state.group_of(&edge.b)) {
            (Some(ga), Some(gb)) if ga == gb => {}
            (Some(ga), Some(gb)) => {
                let action = Action::Merge { source: ga.min(gb), target: ga.max(gb) };
                if attempt(state, action)? {
                    merges += 1;
                    debug!("merged group {} into {} on {}-{} ({})", ga.min(gb), ga.max(gb), edge.a, edge.b, edge.weight);
                }
            }
            (Some(group_index), None) => {
                attempt(state, Action::Add { individual: edge.b.clone(), group_index })?;
            }
            (None, Some(group_index)) => {
                attempt(state, Action::Add { individual: edge.a.clone(), group_index })?;
            }
            (None, None) => {
                if let Some(group_index) = state.roomiest() {
                    attempt(state, Action::Add { individual: edge.a.clone(), group_index })?;
                    attempt(state, Action::Add { individual: edge.b.clone(), group_index })?;
                }
            }
        }
    }

    if truncated {
        warn!("greedy pass stopped after {considered} of {} edges; the rest falls back to placement", edges.len());
    }
    info!("greedy pass: {considered} edges, {merges} merges, {} assigned in {:?}", state.n_assigned(), started.elapsed());

    Ok(GreedyOutcome { considered, total: edges.len(), truncated })
}

/// Applies `action` if capacity allows. Capacity rejections are skips;
/// anything else is a bookkeeping defect.
fn attempt(state: &mut State, action: Action) -> Result<bool, ActionError> {
    match state.simulate(&action) {
        ActionResult::Applicable => state.act(action).map(|()| true),
        ActionResult::Noop => Ok(false),
        ActionResult::Failed(ActionError::GroupFull { .. } | ActionError::OverCapacity { .. }) => Ok(false),
        ActionResult::Failed(err) => Err(err),
    }
}
