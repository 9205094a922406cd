//! Quest Registry
//!
//! Registered quest definitions plus their compiled graphs. Graphs are
//! compiled after items are injected so wait stages can resolve item ids.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, info};

use crate::error::RegisterError;
use crate::host::NumericId;
use crate::item::ItemLookup;
use crate::package::PackageInfo;
use crate::registry::{ContentRegistry, RegisteredEntry};

use super::definition::QuestDefinition;
use super::graph::{compile, QuestGraph};

pub type RegisteredQuest = RegisteredEntry<QuestDefinition>;

const NO_STAGE_DESCRIPTION: &str = "Quest Stage (No Description)";

/// Quest ids the framework owns are always package-qualified.
pub fn is_managed_quest(quest_id: &str) -> bool {
    quest_id.contains(':')
}

pub struct QuestRegistry {
    entries: ContentRegistry<QuestDefinition>,
    /// Fully-qualified key -> compiled graph
    graphs: HashMap<String, QuestGraph>,
}

impl QuestRegistry {
    pub fn new(base: NumericId) -> Self {
        Self {
            entries: ContentRegistry::new(base),
            graphs: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        package: &Rc<PackageInfo>,
        quest: QuestDefinition,
    ) -> Result<NumericId, RegisterError> {
        let key = package.qualify(&quest.id);
        let id = self.entries.register(package, quest)?;
        // A re-registered quest must be recompiled
        self.graphs.remove(&key);
        Ok(id)
    }

    pub fn get(&self, quest_id: &str) -> Option<&RegisteredQuest> {
        self.entries.lookup_by_key(quest_id)
    }

    pub fn contains(&self, quest_id: &str) -> bool {
        self.get(quest_id).is_some()
    }

    pub fn entries(&self) -> &ContentRegistry<QuestDefinition> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ========================================================================
    // Graphs
    // ========================================================================

    /// Compile every registered quest, replacing cached graphs.
    pub fn compile_all(&mut self, items: &dyn ItemLookup) -> usize {
        self.graphs.clear();
        for entry in self.entries.iter() {
            let graph = compile(&entry.key, &entry.package, &entry.definition, items);
            debug!("Compiled quest {} ({} nodes)", entry.key, graph.len());
            self.graphs.insert(entry.key.clone(), graph);
        }
        info!("Compiled {} quest(s)", self.graphs.len());
        self.graphs.len()
    }

    /// Cached graph, if the quest has been compiled.
    pub fn graph(&self, quest_id: &str) -> Option<&QuestGraph> {
        self.graphs.get(quest_id)
    }

    /// Cached graph, compiling it first when needed.
    pub fn graph_or_compile(
        &mut self,
        quest_id: &str,
        items: &dyn ItemLookup,
    ) -> Option<&QuestGraph> {
        if !self.graphs.contains_key(quest_id) {
            let entry = self.entries.lookup_by_key(quest_id)?;
            let graph = compile(&entry.key, &entry.package, &entry.definition, items);
            self.graphs.insert(quest_id.to_string(), graph);
        }
        self.graphs.get(quest_id)
    }

    // ========================================================================
    // Display Text
    // ========================================================================

    /// Quest title, falling back to the full id.
    pub fn quest_title(&self, quest_id: &str) -> Option<String> {
        let entry = self.get(quest_id)?;
        Some(match entry.definition.title.as_deref() {
            Some(title) if !title.is_empty() => entry.resolve_text(title),
            _ => entry.key.clone(),
        })
    }

    /// Text for a stage looked up by node id.
    pub fn stage_text(&self, quest_id: &str, node_id: &str) -> Option<String> {
        let entry = self.get(quest_id)?;
        let text = entry
            .definition
            .stage(node_id)
            .and_then(|s| s.description())
            .map(|d| entry.resolve_text(d))
            .unwrap_or_else(|| format!("Quest stage: {}", node_id));
        Some(text)
    }

    /// Text for the node the host is displaying. The host does not always
    /// hand over a node id; falls back to the first stage's description.
    pub fn stage_text_or_first(&self, quest_id: &str, node_id: Option<&str>) -> Option<String> {
        let entry = self.get(quest_id)?;
        let quest = &entry.definition;
        let description = node_id
            .and_then(|id| quest.stage(id))
            .and_then(|s| s.description())
            .or_else(|| quest.stages.first().and_then(|s| s.description()));
        Some(match description {
            Some(d) => entry.resolve_text(d),
            None => NO_STAGE_DESCRIPTION.to_string(),
        })
    }

    /// Translation entries for the host's quest text table: the title under
    /// the quest id, then one entry per stage.
    pub fn translations(&self, quest_id: &str) -> Option<Vec<(String, String)>> {
        let entry = self.get(quest_id)?;
        let mut out = Vec::with_capacity(entry.definition.stages.len() + 1);
        out.push((entry.key.clone(), self.quest_title(quest_id)?));
        for stage in &entry.definition.stages {
            let text = match stage.description() {
                Some(d) => entry.resolve_text(d),
                None => format!("Stage: {}", stage.id),
            };
            out.push((stage.id.clone(), text));
        }
        Some(out)
    }
}
