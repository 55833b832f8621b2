//! Xenotype and gene definitions.

use serde::{Deserialize, Serialize};

use super::Def;
use crate::pawn::{BodyType, WorkTags};

fn default_true() -> bool {
    true
}

fn default_commonality() -> f32 {
    1.0
}

/// A xenotype with the probability of being picked from a set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XenotypeChance {
    pub xenotype: String,
    pub chance: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct XenotypeDef {
    pub name: String,
    /// Inheritable genes become endogenes, the rest xenogenes.
    #[serde(default = "default_true")]
    pub inheritable: bool,
    #[serde(default)]
    pub genes: Vec<String>,
    #[serde(default = "default_true")]
    pub can_generate_as_combatant: bool,
    /// Chance of also receiving a second, non-inheritable xenotype.
    #[serde(default)]
    pub double_xenotype_chances: Vec<XenotypeChance>,
}

impl Def for XenotypeDef {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneCategory {
    SkinColor,
    HairColor,
    BodyType,
    Other,
}

impl GeneCategory {
    /// Categories every genetic pawn ends up with one gene of.
    pub fn is_appearance(self) -> bool {
        matches!(self, GeneCategory::SkinColor | GeneCategory::HairColor)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneDef {
    pub name: String,
    pub category: GeneCategory,
    #[serde(default = "default_commonality")]
    pub commonality: f32,
    #[serde(default)]
    pub body_type: Option<BodyType>,
    #[serde(default)]
    pub disabled_work_tags: WorkTags,
    #[serde(default)]
    pub remove_on_redress: bool,
    #[serde(default)]
    pub hereditary_condition: Option<String>,
}

impl Def for GeneDef {
    fn name(&self) -> &str {
        &self.name
    }
}
