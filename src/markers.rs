//! Custom-kind markers
//!
//! Ids of injected records that need special handling in host lifecycle
//! hooks (for example bags, which must not go through the host's default
//! duplication on clone or save load). Append-only.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::host::NumericId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomKind {
    Bag,
}

#[derive(Debug, Clone, Default)]
pub struct CustomMarkers {
    sets: HashMap<CustomKind, HashSet<NumericId>>,
}

impl CustomMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the id was not marked before.
    pub fn mark(&mut self, kind: CustomKind, id: NumericId) -> bool {
        let added = self.sets.entry(kind).or_default().insert(id);
        if added {
            debug!("Marked {} as custom {:?}", id, kind);
        }
        added
    }

    pub fn is_marked(&self, kind: CustomKind, id: NumericId) -> bool {
        self.sets.get(&kind).is_some_and(|set| set.contains(&id))
    }

    pub fn count(&self, kind: CustomKind) -> usize {
        self.sets.get(&kind).map_or(0, HashSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_is_idempotent() {
        let mut markers = CustomMarkers::new();
        assert!(markers.mark(CustomKind::Bag, 60003));
        assert!(!markers.mark(CustomKind::Bag, 60003));
        assert!(markers.is_marked(CustomKind::Bag, 60003));
        assert!(!markers.is_marked(CustomKind::Bag, 60004));
        assert_eq!(markers.count(CustomKind::Bag), 1);
    }
}
