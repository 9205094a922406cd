//! Quests
//!
//! Quest definitions are compiled into node graphs for the host. Wait nodes
//! on framework items are completed by the evaluator, since the host's own
//! condition check does not know those items.

pub mod definition;
pub mod evaluator;
pub mod graph;
pub mod registry;

pub use definition::{
    ActionDefinition, ActionType, DialogueDefinition, DialogueOptionDefinition, QuestDefinition,
    StageDefinition, StageType, WaitDefinition,
};
pub use evaluator::{evaluate_item_event, EvaluationReport};
pub use graph::{
    compile, ActionNode, DialogueNode, DialogueOption, NodeKind, QuestGraph, QuestNode,
    WaitCondition, WaitNode,
};
pub use registry::{is_managed_quest, QuestRegistry, RegisteredQuest};
