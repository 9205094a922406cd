//! Content Registry
//!
//! Maps fully-qualified keys (`package:definition`) to allocated numeric ids
//! and definitions. One registry exists per content kind; each counts up from
//! its own id base.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::RegisterError;
use crate::host::{ContentTable, NumericId};
use crate::package::PackageInfo;

/// A parsed definition that can be registered.
pub trait Definition {
    /// Content kind used in diagnostics ("item", "recipe", ...)
    const KIND: &'static str;

    /// Human-readable id, unique within the declaring package.
    fn id(&self) -> &str;

    /// Existing host id this definition patches in place, if any.
    /// Such entries do not consume an id from the counter.
    fn patch_target(&self) -> Option<NumericId> {
        None
    }
}

/// A definition plus its allocated numeric id.
#[derive(Debug, Clone)]
pub struct RegisteredEntry<D> {
    /// Fully-qualified key, `package:definition`
    pub key: String,
    pub numeric_id: NumericId,
    pub package: Rc<PackageInfo>,
    pub definition: D,
    /// Id of the host record last written for this entry. Advisory: the host
    /// may have rebuilt its tables since.
    materialized: Option<NumericId>,
}

impl<D: Definition> RegisteredEntry<D> {
    /// Whether this entry patches an existing host record instead of creating one
    pub fn is_patch(&self) -> bool {
        self.definition.patch_target().is_some()
    }

    /// The materialized record id, if the host table still holds it.
    pub fn materialized_in<R, T>(&self, table: &T) -> Option<NumericId>
    where
        T: ContentTable<R> + ?Sized,
    {
        self.materialized.filter(|id| table.contains(*id))
    }

    pub fn set_materialized(&mut self, id: NumericId) {
        self.materialized = Some(id);
    }

    pub fn clear_materialized(&mut self) {
        self.materialized = None;
    }

    /// Resolve a display string against the owning package's localization.
    pub fn resolve_text(&self, text: &str) -> String {
        self.package.resolve_text(text)
    }
}

/// Registry for one content kind.
///
/// Entries iterate in the order their key was first registered. Registering
/// an existing key again replaces the entry (last write wins); the replaced
/// entry's numeric id is retired and never handed out again.
#[derive(Debug, Clone)]
pub struct ContentRegistry<D> {
    base: NumericId,
    next_id: NumericId,
    entries: Vec<RegisteredEntry<D>>,
    /// Fully-qualified key -> position in `entries`
    keys: HashMap<String, usize>,
    /// Allocated numeric id -> position in `entries`
    ids: HashMap<NumericId, usize>,
}

impl<D: Definition> ContentRegistry<D> {
    pub fn new(base: NumericId) -> Self {
        Self {
            base,
            next_id: base,
            entries: Vec::new(),
            keys: HashMap::new(),
            ids: HashMap::new(),
        }
    }

    /// Register a definition declared by `package` and return its numeric id.
    pub fn register(
        &mut self,
        package: &Rc<PackageInfo>,
        definition: D,
    ) -> Result<NumericId, RegisterError> {
        if definition.id().is_empty() {
            warn!(
                "Skipping {} with empty id in package '{}'",
                D::KIND,
                package.id
            );
            return Err(RegisterError::EmptyId {
                kind: D::KIND,
                package: package.id.clone(),
            });
        }

        let key = package.qualify(definition.id());
        let numeric_id = match definition.patch_target() {
            Some(target) => target,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        };
        let allocated = definition.patch_target().is_none();

        let entry = RegisteredEntry {
            key: key.clone(),
            numeric_id,
            package: Rc::clone(package),
            definition,
            materialized: None,
        };

        let position = match self.keys.get(&key) {
            Some(&position) => {
                let old = &self.entries[position];
                warn!(
                    "Duplicate {} key '{}', overwriting (id {} retired)",
                    D::KIND,
                    key,
                    old.numeric_id
                );
                if !old.is_patch() {
                    self.ids.remove(&old.numeric_id);
                }
                self.entries[position] = entry;
                position
            }
            None => {
                self.entries.push(entry);
                self.keys.insert(key.clone(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        if allocated {
            self.ids.insert(numeric_id, position);
        }

        debug!("Registered {} '{}' -> {}", D::KIND, key, numeric_id);
        Ok(numeric_id)
    }

    pub fn lookup_by_key(&self, key: &str) -> Option<&RegisteredEntry<D>> {
        self.keys.get(key).map(|&i| &self.entries[i])
    }

    /// Look up by allocated id. Patch entries are not reachable this way.
    pub fn lookup_by_numeric_id(&self, id: NumericId) -> Option<&RegisteredEntry<D>> {
        self.ids.get(&id).map(|&i| &self.entries[i])
    }

    pub fn is_registered(&self, id: NumericId) -> bool {
        self.ids.contains_key(&id)
    }

    /// Find the entry whose key ends with `:name` (case-insensitive).
    /// Returns `None` when no entry or more than one entry matches.
    pub fn find_by_suffix(&self, name: &str) -> Option<&RegisteredEntry<D>> {
        if name.is_empty() {
            return None;
        }
        let suffix = format!(":{}", name.to_lowercase());
        let mut matches = self
            .entries
            .iter()
            .filter(|e| e.key.to_lowercase().ends_with(&suffix));

        let first = matches.next()?;
        if matches.next().is_some() {
            warn!("Ambiguous {} reference '{}'", D::KIND, name);
            return None;
        }
        Some(first)
    }

    /// Numeric id of the first entry that owns an allocated id. Its presence in
    /// the host table tells whether the table still holds injected content.
    pub fn first_allocated_id(&self) -> Option<NumericId> {
        self.entries
            .iter()
            .find(|e| !e.is_patch())
            .map(|e| e.numeric_id)
    }

    /// True when the host table is missing the first allocated id.
    pub fn needs_reinjection<R, T>(&self, table: &T) -> bool
    where
        T: ContentTable<R> + ?Sized,
    {
        match self.first_allocated_id() {
            Some(id) => !table.contains(id),
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredEntry<D>> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RegisteredEntry<D>> {
        self.entries.iter_mut()
    }

    pub fn base(&self) -> NumericId {
        self.base
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Injection Report
// ============================================================================

/// Outcome counts of one injection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectReport {
    /// New records inserted into the host table
    pub injected: usize,
    /// Existing host records patched in place
    pub patched: usize,
    /// Entries already present in the host table
    pub skipped: usize,
    /// Entries inserted with an asset still pending
    pub deferred: usize,
    pub failed: usize,
}

impl InjectReport {
    pub fn merge(&mut self, other: InjectReport) {
        self.injected += other.injected;
        self.patched += other.patched;
        self.skipped += other.skipped;
        self.deferred += other.deferred;
        self.failed += other.failed;
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl std::fmt::Display for InjectReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} injected, {} patched, {} skipped, {} deferred, {} failed",
            self.injected, self.patched, self.skipped, self.deferred, self.failed
        )
    }
}
