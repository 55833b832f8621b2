//! Relation kind definitions.

use serde::{Deserialize, Serialize};

use super::Def;

fn default_chance_factor() -> f32 {
    1.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Parent,
    Child,
    Sibling,
    Spouse,
    ExSpouse,
    Lover,
    ExLover,
    Fiance,
}

impl RelationKind {
    pub fn is_blood(self) -> bool {
        matches!(self, RelationKind::Parent | RelationKind::Child | RelationKind::Sibling)
    }

    /// Romantic kinds that count as love history for orientation.
    pub fn is_romantic(self) -> bool {
        !self.is_blood()
    }

    /// The kind the other pawn holds back towards us.
    pub fn inverse(self) -> RelationKind {
        match self {
            RelationKind::Parent => RelationKind::Child,
            RelationKind::Child => RelationKind::Parent,
            other => other,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelationDef {
    pub name: String,
    pub kind: RelationKind,
    #[serde(default = "default_chance_factor")]
    pub generation_chance_factor: f32,
    /// Weight of a partner with this relation as the implied father of a
    /// pregnancy.
    #[serde(default)]
    pub father_weight: f32,
}

impl Def for RelationDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl RelationDef {
    pub fn is_blood(&self) -> bool {
        self.kind.is_blood()
    }
}
