//! Quest Graph Compiler
//!
//! Turns a quest's flat stage list into nodes with forward edges. Pure: no
//! host table is touched.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::host::NumericId;
use crate::item::ItemLookup;
use crate::package::PackageInfo;

use super::definition::{ActionType, QuestDefinition, StageDefinition, StageType, WaitDefinition};

const DEFAULT_DIALOGUE_TEXT: &str = "...";
const DEFAULT_OPTION_TEXT: &str = "Continue";
const DEFAULT_WAIT_NOTE: &str = "Complete this objective";

/// Item count required when a comparator cannot be parsed.
const FALLBACK_REQUIRED_COUNT: i32 = 1;

// ============================================================================
// Nodes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Action(ActionNode),
    Dialogue(DialogueNode),
    Wait(WaitNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionNode {
    pub action: ActionType,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueNode {
    pub text: String,
    pub options: Vec<DialogueOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueOption {
    pub text: String,
    /// Index of the node this option leads to
    pub next: Option<usize>,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaitNode {
    pub note: String,
    pub done_after_success: bool,
    /// Present only for item waits whose item resolved
    pub condition: Option<WaitCondition>,
}

/// `count(item) >= threshold`
#[derive(Debug, Clone, PartialEq)]
pub struct WaitCondition {
    pub item_id: NumericId,
    pub threshold: i32,
    /// Comparator as the host stores it, e.g. `>=3`
    pub comparator: String,
    /// Human-readable form, e.g. `item_60000>=3`
    pub expression: String,
}

impl WaitCondition {
    pub fn new(item_id: NumericId, threshold: i32) -> Self {
        Self {
            item_id,
            threshold,
            comparator: format!(">={}", threshold),
            expression: format!("item_{}>={}", item_id, threshold),
        }
    }

    /// Threshold parsed back out of the comparator; `>= 1` when unparseable.
    pub fn required_count(&self) -> i32 {
        self.comparator
            .trim()
            .strip_prefix(">=")
            .and_then(|n| n.trim().parse().ok())
            .unwrap_or(FALLBACK_REQUIRED_COUNT)
    }

    pub fn is_met(&self, count: i32) -> bool {
        count >= self.required_count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestNode {
    /// Stage id the node was compiled from
    pub id: String,
    pub npc: Option<String>,
    pub description: Option<String>,
    pub kind: NodeKind,
    /// Indices of the nodes that follow
    pub next: Vec<usize>,
}

impl QuestNode {
    pub fn wait_condition(&self) -> Option<&WaitCondition> {
        match &self.kind {
            NodeKind::Wait(wait) => wait.condition.as_ref(),
            _ => None,
        }
    }
}

// ============================================================================
// Graph
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct QuestGraph {
    pub quest_id: String,
    pub title: String,
    pub is_permanent: bool,
    pub nodes: Vec<QuestNode>,
    index: HashMap<String, usize>,
}

impl QuestGraph {
    /// Entry node; always index 0.
    pub fn entry(&self) -> Option<&QuestNode> {
        self.nodes.first()
    }

    pub fn index_of(&self, stage_id: &str) -> Option<usize> {
        self.index.get(stage_id).copied()
    }

    pub fn node(&self, stage_id: &str) -> Option<&QuestNode> {
        self.index_of(stage_id).map(|i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Compile a registered quest into its node graph.
///
/// Item references in wait stages resolve in the context of `package`.
pub fn compile(
    key: &str,
    package: &PackageInfo,
    quest: &QuestDefinition,
    items: &dyn ItemLookup,
) -> QuestGraph {
    let mut index = HashMap::new();
    for (i, stage) in quest.stages.iter().enumerate() {
        if index.contains_key(&stage.id) {
            warn!("Quest {} declares stage '{}' twice, keeping the first", key, stage.id);
            continue;
        }
        index.insert(stage.id.clone(), i);
    }

    let resolve = |target: &str| -> Option<usize> {
        let found = index.get(target).copied();
        if found.is_none() {
            debug!("Quest {}: dropping edge to unknown stage '{}'", key, target);
        }
        found
    };

    let nodes = quest
        .stages
        .iter()
        .map(|stage| QuestNode {
            id: stage.id.clone(),
            npc: stage.npc.clone(),
            description: stage.description().map(|d| package.resolve_text(d)),
            kind: compile_kind(key, package, stage, items, &resolve),
            next: stage.next_stages.iter().filter_map(|s| resolve(s.as_str())).collect(),
        })
        .collect();

    let title = match quest.title.as_deref() {
        Some(title) if !title.is_empty() => package.resolve_text(title),
        _ => key.to_string(),
    };

    QuestGraph {
        quest_id: key.to_string(),
        title,
        is_permanent: quest.is_permanent,
        nodes,
        index,
    }
}

fn compile_kind(
    key: &str,
    package: &PackageInfo,
    stage: &StageDefinition,
    items: &dyn ItemLookup,
    resolve: &dyn Fn(&str) -> Option<usize>,
) -> NodeKind {
    match stage.stage_type() {
        StageType::Dialogue => {
            let dialogue = stage.dialogue.clone().unwrap_or_default();
            let text = match dialogue.text.as_deref() {
                Some(text) if !text.is_empty() => package.resolve_text(text),
                _ => DEFAULT_DIALOGUE_TEXT.to_string(),
            };
            let options = dialogue
                .options
                .iter()
                .map(|option| DialogueOption {
                    text: match option.text.as_deref() {
                        Some(text) if !text.is_empty() => package.resolve_text(text),
                        _ => DEFAULT_OPTION_TEXT.to_string(),
                    },
                    next: option.next_stage.as_deref().and_then(|s| resolve(s)),
                    condition: option.condition.clone(),
                })
                .collect();
            NodeKind::Dialogue(DialogueNode { text, options })
        }
        StageType::Wait => {
            let note = stage
                .description()
                .map(|d| package.resolve_text(d))
                .unwrap_or_else(|| DEFAULT_WAIT_NOTE.to_string());
            let condition = stage
                .wait
                .as_ref()
                .filter(|w| w.is_item())
                .and_then(|w| item_condition(key, package, &stage.id, w, items));
            NodeKind::Wait(WaitNode {
                note,
                done_after_success: true,
                condition,
            })
        }
        StageType::Action => {
            let action = stage.action.clone().unwrap_or_default();
            let params = action
                .param
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect();
            NodeKind::Action(ActionNode {
                action: action.action_type(),
                params,
            })
        }
        StageType::Unknown => NodeKind::Action(ActionNode {
            action: ActionType::Nothing,
            params: Vec::new(),
        }),
    }
}

fn item_condition(
    key: &str,
    package: &PackageInfo,
    stage_id: &str,
    wait: &WaitDefinition,
    items: &dyn ItemLookup,
) -> Option<WaitCondition> {
    let Some(item) = wait.item.as_ref() else {
        warn!("Quest {} stage '{}': item wait without an item", key, stage_id);
        return None;
    };
    match items.resolve_item(&package.id, item) {
        Some(item_id) => Some(WaitCondition::new(item_id, wait.count)),
        None => {
            warn!(
                "Quest {} stage '{}': item '{}' not found, wait has no condition",
                key, stage_id, item
            );
            None
        }
    }
}
