//! Health condition definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Def;
use crate::curve::SimpleCurve;
use crate::pawn::{Capacity, Gender};

fn default_true() -> bool {
    true
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    /// Healed old wound.
    Injury,
    /// Fresh, possibly bleeding wound.
    Wound,
    MissingPart,
    Chronic,
    Addiction,
    Pregnancy,
    Sterilized,
    Contraceptive,
    Scar,
    Blindness,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConditionDef {
    pub name: String,
    pub kind: ConditionKind,
    /// Capacity offsets at full severity.
    #[serde(default)]
    pub capacity_offsets: BTreeMap<Capacity, f32>,
    #[serde(default)]
    pub pain: f32,
    #[serde(default)]
    pub bleed_rate: f32,
    #[serde(default)]
    pub lethal: bool,
    #[serde(default = "default_true")]
    pub tendable: bool,
    /// Only applies to pawns of this gender.
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Chance per pawn of having the condition, by biological age in years.
    #[serde(default)]
    pub onset_chance_by_age: Option<SimpleCurve>,
    /// Chance of being healed during redress, by days spent in the free pool.
    #[serde(default)]
    pub remove_on_redress_chance_by_days: Option<SimpleCurve>,
    /// Removed on redress unless the new archetype is listed here.
    #[serde(default)]
    pub remove_on_redress_if_not_of_archetype: Vec<String>,
}

impl Def for ConditionDef {
    fn name(&self) -> &str {
        &self.name
    }
}
