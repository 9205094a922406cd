//! Quest Evaluator
//!
//! The host cannot evaluate wait conditions on framework items, so item
//! notifications are checked here and satisfied nodes are marked done
//! through the quest runtime.

use tracing::{debug, info, warn};

use crate::error::HostError;
use crate::host::{ActionNotification, QuestRuntime};
use crate::item::ItemLookup;

use super::graph::QuestGraph;
use super::registry::{is_managed_quest, QuestRegistry};

/// Outcome of evaluating one notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Managed quest instances inspected
    pub checked: usize,
    /// Nodes marked done
    pub completed: usize,
    /// Instances or nodes skipped because the runtime errored
    pub errors: usize,
}

/// Check every in-progress managed quest against an item notification.
///
/// Non-item notifications are ignored. The inventory count is read from the
/// runtime, not taken from the notification. Quests registered since the last
/// compile pass are compiled on first use.
pub fn evaluate_item_event(
    notification: &ActionNotification,
    quests: &mut QuestRegistry,
    items: &dyn ItemLookup,
    runtime: &mut dyn QuestRuntime,
) -> EvaluationReport {
    let mut report = EvaluationReport::default();
    if !notification.is_item_event() {
        return report;
    }

    for quest_id in runtime.in_progress_quests() {
        if !is_managed_quest(&quest_id) {
            continue;
        }
        let Some(graph) = quests.graph_or_compile(&quest_id, items) else {
            warn!("In-progress quest {} is not registered", quest_id);
            continue;
        };
        report.checked += 1;

        match evaluate_instance(graph, &quest_id, notification, runtime) {
            Ok(completed) => report.completed += completed,
            Err(e) => {
                warn!("Quest {} evaluation failed: {}", quest_id, e);
                report.errors += 1;
            }
        }
    }

    report
}

fn evaluate_instance(
    graph: &QuestGraph,
    quest_id: &str,
    notification: &ActionNotification,
    runtime: &mut dyn QuestRuntime,
) -> Result<usize, HostError> {
    let mut completed = 0;

    for node_id in runtime.in_progress_nodes(quest_id)? {
        let Some(condition) = graph.node(&node_id).and_then(|n| n.wait_condition()) else {
            continue;
        };
        if condition.item_id != notification.item_id {
            continue;
        }

        let count = runtime.inventory_count(condition.item_id);
        if !condition.is_met(count) {
            debug!(
                "Quest {} node {}: {} of {} item {}",
                quest_id,
                node_id,
                count,
                condition.required_count(),
                condition.item_id
            );
            continue;
        }

        runtime.mark_node_done(quest_id, &node_id)?;
        info!(
            "Quest {} node {} complete ({})",
            quest_id, node_id, condition.expression
        );
        completed += 1;
    }

    Ok(completed)
}
