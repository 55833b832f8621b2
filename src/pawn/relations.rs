//! Relation edges between pawns

use serde::{Deserialize, Serialize};

use crate::data::RelationKind;
use crate::pawn::types::PawnId;

/// A directed edge: this pawn holds `kind` towards `other`.
///
/// Parent means `other` is this pawn's parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectRelation {
    pub def: String,
    pub kind: RelationKind,
    pub other: PawnId,
}

impl DirectRelation {
    pub fn new(def: &str, kind: RelationKind, other: PawnId) -> Self {
        DirectRelation { def: def.to_string(), kind, other }
    }
}

/// Whether a relation list already holds an edge of this kind to `other`.
pub fn has_relation(relations: &[DirectRelation], kind: RelationKind, other: PawnId) -> bool {
    relations.iter().any(|r| r.kind == kind && r.other == other)
}

pub fn count_of_kind(relations: &[DirectRelation], kind: RelationKind) -> usize {
    relations.iter().filter(|r| r.kind == kind).count()
}
