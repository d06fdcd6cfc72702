//! Dialogue catalog
//!
//! Interprets the parsed NPC, enemy and loot script tables as entities that
//! own categories of dialogue sets, each an ordered list of cues with their
//! audio already resolved against an [`OggLibrary`](crate::audio::OggLibrary).
//!
//! The catalog is read-only once built. Problems found while building are
//! returned as [`Diagnostic`] values rather than errors.

mod builder;
mod diagnostic;
mod groups;
mod types;

use std::collections::BTreeMap;

pub use builder::{BuildOutput, CatalogBuilder, CatalogRoots, SetSource, build, display_name};
pub use diagnostic::{Diagnostic, DiagnosticKind, summarize};
pub use groups::{CategoryGroup, groups};
pub use types::{Category, Cue, DialogueSet, Entity, EntityKind};

use crate::error::{Error, Result};

/// Totals over a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogCounts {
    pub npcs: usize,
    pub enemies: usize,
    pub loot: usize,
    pub dialogue_sets: usize,
    pub cues: usize,
}

/// All entities with dialogue, by kind, sorted by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    npcs: BTreeMap<String, Entity>,
    enemies: BTreeMap<String, Entity>,
    loot: BTreeMap<String, Entity>,
}

impl Catalog {
    pub(crate) fn from_parts(
        npcs: BTreeMap<String, Entity>,
        enemies: BTreeMap<String, Entity>,
        loot: BTreeMap<String, Entity>,
    ) -> Self {
        Self { npcs, enemies, loot }
    }

    fn entities(&self, kind: EntityKind) -> &BTreeMap<String, Entity> {
        match kind {
            EntityKind::Npc => &self.npcs,
            EntityKind::Enemy => &self.enemies,
            EntityKind::Loot => &self.loot,
        }
    }

    /// Entities of a kind, sorted by id.
    pub fn list_entities(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities(kind).values()
    }

    /// # Errors
    /// Returns [`Error::NotFound`] if no entity of `kind` has this id.
    pub fn get_entity(&self, kind: EntityKind, id: &str) -> Result<&Entity> {
        self.entities(kind)
            .get(id)
            .ok_or_else(|| Error::not_found(kind.label(), id))
    }

    /// Set ids of one category, in script order.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown entity or category.
    pub fn list_dialogue_ids(
        &self,
        kind: EntityKind,
        entity: &str,
        category: &str,
    ) -> Result<Vec<&str>> {
        let category = self.get_category(kind, entity, category)?;
        Ok(category.ids().collect())
    }

    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown entity, category or set.
    pub fn get_dialogue_set(
        &self,
        kind: EntityKind,
        entity: &str,
        category: &str,
        id: &str,
    ) -> Result<&DialogueSet> {
        self.get_category(kind, entity, category)?
            .get(id)
            .ok_or_else(|| Error::not_found("dialogue", id))
    }

    fn get_category(&self, kind: EntityKind, entity: &str, category: &str) -> Result<&Category> {
        self.get_entity(kind, entity)?
            .category(category)
            .ok_or_else(|| Error::NotFound {
                what: "category",
                name: format!("{entity} / {category}"),
            })
    }

    #[must_use]
    pub fn counts(&self) -> CatalogCounts {
        let mut counts = CatalogCounts {
            npcs: self.npcs.len(),
            enemies: self.enemies.len(),
            loot: self.loot.len(),
            ..CatalogCounts::default()
        };
        for kind in EntityKind::ALL {
            for (_, set) in self.list_entities(kind).flat_map(Entity::dialogue_sets) {
                counts.dialogue_sets += 1;
                counts.cues += set.cues.len();
            }
        }
        counts
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty() && self.enemies.is_empty() && self.loot.is_empty()
    }
}
