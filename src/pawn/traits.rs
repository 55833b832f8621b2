//! Pawn trait set

use serde::{Deserialize, Serialize};

use crate::data::{Orientation, RuleTables};

/// A trait instance on a pawn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trait {
    pub def: String,
    pub degree: i32,
    /// Granted by archetype or request rather than drawn.
    pub forced: bool,
}

impl Trait {
    pub fn new(def: &str, degree: i32) -> Self {
        Trait { def: def.to_string(), degree, forced: false }
    }

    pub fn forced(def: &str, degree: i32) -> Self {
        Trait { def: def.to_string(), degree, forced: true }
    }
}

/// Traits held by a pawn. Holds at most one instance per trait def.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitSet {
    traits: Vec<Trait>,
}

impl TraitSet {
    pub fn has(&self, def: &str) -> bool {
        self.traits.iter().any(|t| t.def == def)
    }

    pub fn get(&self, def: &str) -> Option<&Trait> {
        self.traits.iter().find(|t| t.def == def)
    }

    /// Add a trait. Returns false if the def is already present.
    pub fn gain(&mut self, t: Trait) -> bool {
        if self.has(&t.def) {
            return false;
        }
        self.traits.push(t);
        true
    }

    pub fn remove(&mut self, def: &str) {
        self.traits.retain(|t| t.def != def);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trait> {
        self.traits.iter()
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    pub fn orientation(&self, tables: &RuleTables) -> Option<Orientation> {
        self.traits
            .iter()
            .filter_map(|t| tables.trait_def(&t.def))
            .find_map(|d| d.orientation)
    }

    pub fn has_orientation(&self, orientation: Orientation, tables: &RuleTables) -> bool {
        self.traits
            .iter()
            .filter_map(|t| tables.trait_def(&t.def))
            .any(|d| d.orientation == Some(orientation))
    }

    /// Whether `def` conflicts with any trait already held.
    pub fn conflicts_with(&self, def: &str, tables: &RuleTables) -> bool {
        let candidate = match tables.trait_def(def) {
            Some(d) => d,
            None => return false,
        };
        self.traits
            .iter()
            .filter_map(|t| tables.trait_def(&t.def))
            .any(|held| held.conflicts_with(candidate))
    }

    /// Display labels, e.g. "hard worker".
    pub fn labels(&self, tables: &RuleTables) -> Vec<String> {
        self.traits
            .iter()
            .map(|t| match tables.trait_def(&t.def) {
                Some(def) => def.label(t.degree).to_string(),
                None => t.def.clone(),
            })
            .collect()
    }
}
