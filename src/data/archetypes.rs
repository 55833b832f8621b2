//! Archetype (pawn kind) definitions loaded from JSON.

use serde::{Deserialize, Serialize};

use super::{Def, XenotypeChance};
use crate::curve::{FloatRange, IntRange};
use crate::generation::SpawnContext;
use crate::pawn::{Gender, WorkTags};

fn default_max_age() -> f32 {
    999_999.0
}

fn default_true() -> bool {
    true
}

fn default_pregnancy_chance() -> f32 {
    0.03
}

fn default_gear_health() -> FloatRange {
    FloatRange::new(1.0, 1.0)
}

fn default_quality_center() -> f32 {
    2.0
}

fn default_inventory_chance() -> f32 {
    1.0
}

/// A trait named together with an optional degree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraitRequirement {
    #[serde(rename = "trait")]
    pub trait_name: String,
    #[serde(default)]
    pub degree: Option<i32>,
}

impl TraitRequirement {
    pub fn new(trait_name: &str, degree: Option<i32>) -> Self {
        TraitRequirement { trait_name: trait_name.to_string(), degree }
    }

    /// Whether a trait instance matches. A requirement without a degree
    /// matches every degree.
    pub fn matches(&self, trait_name: &str, degree: i32) -> bool {
        self.trait_name == trait_name && self.degree.map_or(true, |d| d == degree)
    }
}

/// Required level range for a skill.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillRange {
    pub skill: String,
    pub range: IntRange,
}

/// Item carried in inventory with some probability.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InventoryOption {
    pub item: String,
    pub count: IntRange,
    #[serde(default = "default_inventory_chance")]
    pub chance: f32,
    /// Contexts in which the option applies. Empty means every context.
    #[serde(default)]
    pub contexts: Vec<SpawnContext>,
}

impl InventoryOption {
    pub fn applies_to(&self, context: SpawnContext) -> bool {
        self.contexts.is_empty() || self.contexts.contains(&context)
    }
}

/// A named template controlling ranges and weights for one kind of pawn.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchetypeDef {
    pub name: String,
    pub race: String,
    #[serde(default)]
    pub fixed_gender: Option<Gender>,
    #[serde(default)]
    pub min_generation_age: f32,
    #[serde(default = "default_max_age")]
    pub max_generation_age: f32,
    #[serde(default)]
    pub chronological_age_range: Option<FloatRange>,
    #[serde(default)]
    pub backstory_categories: Vec<String>,
    /// Weight that this kind has spent time in stasis.
    #[serde(default)]
    pub stasis_commonality: f32,
    #[serde(default)]
    pub forced_traits: Vec<TraitRequirement>,
    #[serde(default)]
    pub disallowed_traits: Vec<String>,
    #[serde(default)]
    pub required_work_tags: WorkTags,
    #[serde(default)]
    pub skills: Vec<SkillRange>,
    #[serde(default)]
    pub extra_skill_levels: i32,
    #[serde(default)]
    pub min_best_skill_level: i32,
    #[serde(default)]
    pub min_total_skill_levels: i32,
    #[serde(default = "default_true")]
    pub use_faction_xenotypes: bool,
    #[serde(default)]
    pub xenotype_set: Vec<XenotypeChance>,
    #[serde(default = "default_true")]
    pub generate_non_family_relations: bool,
    #[serde(default = "default_pregnancy_chance")]
    pub pregnancy_chance: f32,
    #[serde(default)]
    pub addiction_chance: f32,
    /// Conditions every pawn of this kind must carry.
    #[serde(default)]
    pub missing_parts: Vec<String>,
    #[serde(default)]
    pub apparel_tags: Vec<String>,
    #[serde(default)]
    pub apparel_money: Option<FloatRange>,
    #[serde(default)]
    pub weapon_tags: Vec<String>,
    #[serde(default)]
    pub weapon_money: Option<FloatRange>,
    #[serde(default)]
    pub inventory: Vec<InventoryOption>,
    #[serde(default = "default_gear_health")]
    pub gear_health_range: FloatRange,
    /// Centre of the item quality distribution, as a quality index.
    #[serde(default = "default_quality_center")]
    pub item_quality_center: f32,
    #[serde(default)]
    pub faction_leader: bool,
}

impl Def for ArchetypeDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl ArchetypeDef {
    pub fn skill_range(&self, skill: &str) -> Option<IntRange> {
        self.skills.iter().find(|s| s.skill == skill).map(|s| s.range)
    }

    pub fn disallows_trait(&self, trait_name: &str) -> bool {
        self.disallowed_traits.iter().any(|t| t == trait_name)
    }
}
