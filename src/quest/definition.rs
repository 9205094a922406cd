//! Quest Definitions
//!
//! A quest is a flat list of stages. Each stage names the stages that follow
//! it; the graph compiler turns those names into node indices.

use serde::Deserialize;

use crate::item::ItemRef;
use crate::registry::Definition;

fn default_wait_count() -> i32 {
    1
}

/// Quest definition loaded from a package document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestDefinition {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "is_permanent")]
    pub is_permanent: bool,
    #[serde(default)]
    pub stages: Vec<StageDefinition>,
}

impl QuestDefinition {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: None,
            is_permanent: false,
            stages: Vec::new(),
        }
    }

    pub fn stage(&self, id: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.id == id)
    }
}

impl Definition for QuestDefinition {
    const KIND: &'static str = "quest";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDefinition {
    pub id: String,
    /// "action", "dialogue", or "wait"
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub npc: Option<String>,
    #[serde(default)]
    pub dialogue: Option<DialogueDefinition>,
    #[serde(default)]
    pub action: Option<ActionDefinition>,
    #[serde(default)]
    pub wait: Option<WaitDefinition>,
    #[serde(default, alias = "next_stages")]
    pub next_stages: Vec<String>,
}

impl StageDefinition {
    pub fn new(id: &str, kind: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: kind.to_string(),
            description: None,
            npc: None,
            dialogue: None,
            action: None,
            wait: None,
            next_stages: Vec::new(),
        }
    }

    pub fn stage_type(&self) -> StageType {
        StageType::parse(&self.kind)
    }

    /// Description, treating an empty string as absent.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageType {
    Action,
    Dialogue,
    Wait,
    /// Unrecognised; compiled as an action that does nothing
    Unknown,
}

impl StageType {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "action" => StageType::Action,
            "dialogue" => StageType::Dialogue,
            "wait" => StageType::Wait,
            _ => StageType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DialogueDefinition {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub options: Vec<DialogueOptionDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueOptionDefinition {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "next_stage")]
    pub next_stage: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionDefinition {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub param: Option<String>,
}

impl ActionDefinition {
    pub fn action_type(&self) -> ActionType {
        ActionType::parse(&self.kind)
    }
}

/// Immediate effect fired by an action stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    Item,
    StartQuest,
    QuestDone,
    QuestFail,
    Skill,
    Reputation,
    SpawnObjects,
    RemoveObjects,
    Nothing,
}

impl ActionType {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "item" | "give_item" => ActionType::Item,
            "start_quest" => ActionType::StartQuest,
            "quest_done" => ActionType::QuestDone,
            "quest_fail" => ActionType::QuestFail,
            "skill" => ActionType::Skill,
            "rep" => ActionType::Reputation,
            "spawn" => ActionType::SpawnObjects,
            "remove" => ActionType::RemoveObjects,
            _ => ActionType::Nothing,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaitDefinition {
    /// Wait subkind; only "item" carries a condition
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, rename = "item_id", alias = "itemId")]
    pub item: Option<ItemRef>,
    #[serde(default = "default_wait_count")]
    pub count: i32,
}

impl WaitDefinition {
    pub fn is_item(&self) -> bool {
        self.kind.eq_ignore_ascii_case("item")
    }
}
