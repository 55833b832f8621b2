//! Apparel, weapon and item definitions.

use serde::{Deserialize, Serialize};

use super::Def;
use crate::pawn::Gender;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GearKind {
    Apparel,
    Weapon,
    Item,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApparelLayer {
    Skin,
    Middle,
    Shell,
    Headgear,
    Belt,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GearDef {
    pub name: String,
    pub kind: GearKind,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub layer: Option<ApparelLayer>,
    /// Only pawns of this gender wear it.
    #[serde(default)]
    pub gender: Option<Gender>,
    pub market_value: f32,
    #[serde(default)]
    pub max_hit_points: u32,
    #[serde(default)]
    pub has_quality: bool,
}

impl Def for GearDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl GearDef {
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }

    pub fn wearable_by(&self, gender: Gender) -> bool {
        self.gender.map_or(true, |g| g == gender)
    }
}
