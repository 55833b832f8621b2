//! World pawn registry
//!
//! Owns every committed pawn, the free pool used for recycling, settlement
//! inhabitant lists and the world clock.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::races::TICKS_PER_DAY;
use crate::data::RuleTables;
use crate::pawn::{DirectRelation, Pawn, PawnId};

/// Where a registered pawn currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PawnSituation {
    /// Spawned and owned by a caller.
    InPlay,
    /// Unowned, available for recycling.
    Free,
    /// Leading a faction from off-map. Only leader archetypes may recycle
    /// it, and only through the general free-pool roll.
    FactionLeader,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RegistryEntry {
    pawn: Pawn,
    situation: PawnSituation,
    /// Tick at which the pawn last entered the free pool.
    became_free_tick: Option<i64>,
}

/// All pawns known to the world, in id order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PawnRegistry {
    entries: BTreeMap<PawnId, RegistryEntry>,
    next_id: u64,
    /// Absolute world clock.
    pub now_ticks: i64,
    /// Calendar year matching `now_ticks`.
    pub current_year: i32,
    settlement_inhabitants: BTreeMap<String, Vec<PawnId>>,
}

impl Default for PawnRegistry {
    fn default() -> Self {
        Self::new(0, 5500)
    }
}

impl PawnRegistry {
    pub fn new(now_ticks: i64, current_year: i32) -> Self {
        PawnRegistry {
            entries: BTreeMap::new(),
            next_id: 1,
            now_ticks,
            current_year,
            settlement_inhabitants: BTreeMap::new(),
        }
    }

    /// Hand out a fresh id. Ids are never reused, even after a purge.
    pub fn reserve_id(&mut self) -> PawnId {
        let id = PawnId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, pawn: Pawn, situation: PawnSituation) {
        let became_free_tick = (situation == PawnSituation::Free).then_some(self.now_ticks);
        self.entries.insert(pawn.id, RegistryEntry { pawn, situation, became_free_tick });
    }

    /// Insert a finished pawn and mirror its relations onto the other side.
    pub fn commit(&mut self, pawn: Pawn, situation: PawnSituation, tables: &RuleTables) {
        let id = pawn.id;
        let edges: Vec<_> = pawn.relations.clone();
        self.insert(pawn, situation);
        for edge in edges {
            if let Some(other) = self.get_mut(edge.other) {
                let inverse = edge.kind.inverse();
                if !other.relations.iter().any(|r| r.other == id && r.kind == inverse) {
                    let def = tables
                        .relation_of_kind(inverse)
                        .map_or_else(|| edge.def.clone(), |d| d.name.clone());
                    other.relations.push(DirectRelation::new(&def, inverse, id));
                }
            }
        }
    }

    /// Restore a pawn snapshot in place, keeping its id.
    pub fn restore(&mut self, pawn: Pawn, situation: PawnSituation, became_free_tick: Option<i64>) {
        self.entries.insert(pawn.id, RegistryEntry { pawn, situation, became_free_tick });
    }

    pub fn get(&self, id: PawnId) -> Option<&Pawn> {
        self.entries.get(&id).map(|e| &e.pawn)
    }

    pub fn get_mut(&mut self, id: PawnId) -> Option<&mut Pawn> {
        self.entries.get_mut(&id).map(|e| &mut e.pawn)
    }

    pub fn contains(&self, id: PawnId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn situation(&self, id: PawnId) -> Option<PawnSituation> {
        self.entries.get(&id).map(|e| e.situation)
    }

    pub fn became_free_tick(&self, id: PawnId) -> Option<i64> {
        self.entries.get(&id).and_then(|e| e.became_free_tick)
    }

    pub fn set_situation(&mut self, id: PawnId, situation: PawnSituation) {
        let now = self.now_ticks;
        if let Some(entry) = self.entries.get_mut(&id) {
            if situation == PawnSituation::Free && entry.situation != PawnSituation::Free {
                entry.became_free_tick = Some(now);
            }
            if situation != PawnSituation::Free {
                entry.became_free_tick = None;
            }
            entry.situation = situation;
        }
    }

    /// Days a free pawn has spent in the pool.
    pub fn days_in_pool(&self, id: PawnId) -> f32 {
        match self.became_free_tick(id) {
            Some(tick) => (self.now_ticks - tick).max(0) as f32 / TICKS_PER_DAY as f32,
            None => 0.0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pawn> {
        self.entries.values().map(|e| &e.pawn)
    }

    pub fn ids_in(&self, situation: PawnSituation) -> Vec<PawnId> {
        self.entries
            .values()
            .filter(|e| e.situation == situation)
            .map(|e| e.pawn.id)
            .collect()
    }

    pub fn free_count(&self) -> usize {
        self.entries.values().filter(|e| e.situation == PawnSituation::Free).count()
    }

    /// Pawns in play that ever were colonists.
    pub fn player_pawn_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.situation == PawnSituation::InPlay && e.pawn.ever_colonist)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record_inhabitant(&mut self, settlement: &str, id: PawnId) {
        let list = self.settlement_inhabitants.entry(settlement.to_string()).or_default();
        if !list.contains(&id) {
            list.push(id);
        }
    }

    /// Previous inhabitants of a settlement that are back in the free pool.
    pub fn free_inhabitants_of(&self, settlement: &str) -> Vec<PawnId> {
        self.settlement_inhabitants
            .get(settlement)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|id| self.situation(*id) == Some(PawnSituation::Free))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remove pawns entirely, stripping every edge that points at them.
    pub fn purge(&mut self, ids: &[PawnId]) {
        if ids.is_empty() {
            return;
        }
        for id in ids {
            self.entries.remove(id);
        }
        for entry in self.entries.values_mut() {
            entry.pawn.relations.retain(|r| !ids.contains(&r.other));
            for c in entry.pawn.health.conditions_mut() {
                if c.linked_pawn.map_or(false, |p| ids.contains(&p)) {
                    c.linked_pawn = None;
                }
            }
        }
        for list in self.settlement_inhabitants.values_mut() {
            list.retain(|id| !ids.contains(id));
        }
    }

    /// Advance the world clock.
    pub fn advance(&mut self, ticks: i64) {
        self.now_ticks += ticks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RelationKind;

    fn pawn(registry: &mut PawnRegistry) -> Pawn {
        let id = registry.reserve_id();
        Pawn::blank(id, "Colonist", "Human")
    }

    #[test]
    fn test_commit_mirrors_relations() {
        let mut registry = PawnRegistry::default();
        let parent = pawn(&mut registry);
        let parent_id = parent.id;
        registry.insert(parent, PawnSituation::Free);

        let mut child = pawn(&mut registry);
        child.relations.push(DirectRelation::new("Parent", RelationKind::Parent, parent_id));
        let child_id = child.id;
        registry.commit(child, PawnSituation::InPlay, &RuleTables::defaults());

        let parent = registry.get(parent_id).unwrap();
        assert_eq!(parent.relations.len(), 1);
        assert_eq!(parent.relations[0].kind, RelationKind::Child);
        assert_eq!(parent.relations[0].other, child_id);
    }

    #[test]
    fn test_purge_strips_edges() {
        let mut registry = PawnRegistry::default();
        let a = pawn(&mut registry);
        let a_id = a.id;
        registry.insert(a, PawnSituation::Free);
        let mut b = pawn(&mut registry);
        b.relations.push(DirectRelation::new("Sibling", RelationKind::Sibling, a_id));
        let b_id = b.id;
        registry.commit(b, PawnSituation::InPlay, &RuleTables::defaults());
        registry.record_inhabitant("Outpost", b_id);

        registry.purge(&[b_id]);
        assert!(!registry.contains(b_id));
        assert!(registry.get(a_id).unwrap().relations.is_empty());
        assert!(registry.free_inhabitants_of("Outpost").is_empty());
    }

    #[test]
    fn test_days_in_pool() {
        let mut registry = PawnRegistry::default();
        let a = pawn(&mut registry);
        let id = a.id;
        registry.insert(a, PawnSituation::InPlay);
        registry.set_situation(id, PawnSituation::Free);
        registry.advance(TICKS_PER_DAY * 10);
        assert!((registry.days_in_pool(id) - 10.0).abs() < 1e-4);
        assert_eq!(registry.free_count(), 1);
        registry.set_situation(id, PawnSituation::InPlay);
        assert_eq!(registry.days_in_pool(id), 0.0);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut registry = PawnRegistry::default();
        let a = registry.reserve_id();
        registry.purge(&[a]);
        assert_ne!(registry.reserve_id(), a);
    }
}
