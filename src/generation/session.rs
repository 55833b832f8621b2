//! In-flight generation sessions
//!
//! Each `generate` attempt opens a session. Pawns committed or recycled while
//! a session is innermost belong to it; when the session commits they pass to
//! its parent, when it is discarded they are purged or returned to the pool.

use crate::pawn::{Pawn, PawnId};
use crate::registry::{PawnRegistry, PawnSituation};

/// How a pawn came to be owned by a session
#[derive(Clone, Debug)]
pub enum Origin {
    /// Created by the session; removed from the registry on discard.
    New,
    /// Taken from the pool; the snapshot is restored on discard.
    Recycled {
        previous: Box<Pawn>,
        situation: PawnSituation,
        became_free_tick: Option<i64>,
    },
}

#[derive(Clone, Debug)]
pub struct SpawnRecord {
    pub id: PawnId,
    pub origin: Origin,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub candidate: PawnId,
    pub allows_dead: bool,
    pub allows_downed: bool,
    pub spawned: Vec<SpawnRecord>,
}

/// LIFO stack of open sessions
#[derive(Debug, Default)]
pub struct SessionStack {
    sessions: Vec<Session>,
}

impl SessionStack {
    pub fn push(&mut self, candidate: PawnId, allows_dead: bool, allows_downed: bool) {
        self.sessions.push(Session { candidate, allows_dead, allows_downed, spawned: Vec::new() });
    }

    pub fn pop(&mut self) -> Option<Session> {
        self.sessions.pop()
    }

    pub fn depth(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn innermost(&self) -> Option<&Session> {
        self.sessions.last()
    }

    /// Whether a pawn is a candidate of any open session.
    pub fn is_being_generated(&self, id: PawnId) -> bool {
        self.sessions.iter().any(|s| s.candidate == id)
    }

    /// Attach a pawn to the innermost session. With no open session the
    /// pawn has no owner to answer to and nothing is recorded.
    pub fn record(&mut self, record: SpawnRecord) {
        if let Some(session) = self.sessions.last_mut() {
            session.spawned.push(record);
        }
    }

    /// Hand a finished session's pawns, and its candidate, to the parent.
    pub fn absorb_committed(&mut self, finished: Session) {
        if let Some(parent) = self.sessions.last_mut() {
            parent.spawned.extend(finished.spawned);
            parent.spawned.push(SpawnRecord { id: finished.candidate, origin: Origin::New });
        }
    }

    /// Hand a recycled pawn to the parent session.
    pub fn absorb_recycled(&mut self, id: PawnId, origin: Origin) {
        self.record(SpawnRecord { id, origin });
    }
}

/// Undo everything a discarded session produced, newest first.
///
/// Returns the ids purged from the registry.
pub fn discard(session: Session, registry: &mut PawnRegistry) -> Vec<PawnId> {
    let mut purged = Vec::new();
    for record in session.spawned.into_iter().rev() {
        match record.origin {
            Origin::New => purged.push(record.id),
            Origin::Recycled { previous, situation, became_free_tick } => {
                registry.restore(*previous, situation, became_free_tick);
            }
        }
    }
    registry.purge(&purged);
    purged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RelationKind, RuleTables};
    use crate::pawn::DirectRelation;

    #[test]
    fn test_commit_hands_pawns_to_parent() {
        let mut stack = SessionStack::default();
        stack.push(PawnId(1), false, false);
        stack.push(PawnId(2), true, true);
        assert!(stack.is_being_generated(PawnId(2)));
        stack.record(SpawnRecord { id: PawnId(3), origin: Origin::New });
        let inner = stack.pop().unwrap();
        stack.absorb_committed(inner);
        let outer = stack.innermost().unwrap();
        let ids: Vec<PawnId> = outer.spawned.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![PawnId(3), PawnId(2)]);
    }

    #[test]
    fn test_discard_purges_new_and_restores_recycled() {
        let tables = RuleTables::defaults();
        let mut registry = PawnRegistry::default();

        let world_id = registry.reserve_id();
        let world = Pawn::blank(world_id, "Villager", "Human");
        registry.insert(world.clone(), PawnSituation::Free);

        let new_id = registry.reserve_id();
        let mut fresh = Pawn::blank(new_id, "Villager", "Human");
        fresh.relations.push(DirectRelation::new("Sibling", RelationKind::Sibling, world_id));
        registry.commit(fresh, PawnSituation::InPlay, &tables);

        // Recycle the world pawn and mutate it
        registry.set_situation(world_id, PawnSituation::InPlay);
        registry.get_mut(world_id).unwrap().archetype = "Pirate".into();

        let session = Session {
            candidate: PawnId(99),
            allows_dead: false,
            allows_downed: false,
            spawned: vec![
                SpawnRecord { id: new_id, origin: Origin::New },
                SpawnRecord {
                    id: world_id,
                    origin: Origin::Recycled {
                        previous: Box::new(world),
                        situation: PawnSituation::Free,
                        became_free_tick: Some(0),
                    },
                },
            ],
        };
        let purged = discard(session, &mut registry);
        assert_eq!(purged, vec![new_id]);
        assert!(!registry.contains(new_id));
        let restored = registry.get(world_id).unwrap();
        assert_eq!(restored.archetype, "Villager");
        assert!(restored.relations.is_empty());
        assert_eq!(registry.situation(world_id), Some(PawnSituation::Free));
    }
}
