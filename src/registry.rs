//! Document registry: owns every content unit of a build, keyed by uid.

use std::collections::HashMap;

use crate::error::Error;
use crate::index::{self, ResolutionIndex};
use crate::types::{ContentUnit, UnitKind};

/// Content units in registration order plus a uid lookup.
/// Registration order is the canonical order for everything downstream.
#[derive(Debug, Default)]
pub struct Registry {
    /// uid to position in `units`.
    positions: HashMap<String, usize>,
    /// Units in the order they were registered.
    units: Vec<ContentUnit>,
}

impl Registry {
    /// All units in registration order. Calling again restarts the sequence.
    pub fn all_units(&self) -> std::slice::Iter<'_, ContentUnit> {
        return self.units.iter();
    }

    /// Build the resolution index from the current snapshot.
    ///
    /// Every unit is keyed by its uid; generated API members are also keyed by
    /// their dotted short names. Shared short names stay in the index with all
    /// their candidates and never resolve to one of them.
    pub fn build_index(&self) -> ResolutionIndex {
        let mut index = ResolutionIndex::default();
        for unit in &self.units {
            index.insert_uid(&unit.uid);
            if unit.kind == UnitKind::GeneratedApiMember {
                index.insert_aliases(&unit.uid, index::member_aliases(&unit.uid));
            }
        }

        for (alias, uids) in index.colliding_aliases() {
            tracing::debug!(alias, candidates = uids.len(), "alias shared by several members");
        }
        return index;
    }

    /// Look up a unit by exact uid.
    pub fn get(&self, uid: &str) -> Option<&ContentUnit> {
        let position = *self.positions.get(uid)?;
        return self.units.get(position);
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        return self.units.is_empty();
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        return self.units.len();
    }

    /// Create an empty registry.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Add a unit. A uid that is already taken is an authoring error and is
    /// never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateUid` if the uid is already registered,
    /// or `Error::EmptyUid` if the uid is blank.
    pub fn register(&mut self, unit: ContentUnit) -> Result<(), Error> {
        if unit.uid.trim().is_empty() {
            return Err(Error::EmptyUid { source_path: unit.source_path });
        }

        if let Some(existing) = self.get(&unit.uid) {
            return Err(Error::DuplicateUid {
                existing: existing.source_path.clone(),
                incoming: unit.source_path,
                uid: unit.uid,
            });
        }

        self.positions.insert(unit.uid.clone(), self.units.len());
        self.units.push(unit);
        return Ok(());
    }
}
