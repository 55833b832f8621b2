//! Trait definitions loaded from JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Def;
use crate::pawn::{Gender, WorkTags};

fn default_commonality() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Sexual orientation carried by an orientation trait.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Gay,
    Bisexual,
    Asexual,
}

/// One degree of a (possibly spectrum) trait.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraitDegree {
    #[serde(default)]
    pub degree: i32,
    pub label: String,
    #[serde(default = "default_commonality")]
    pub commonality: f32,
    #[serde(default)]
    pub skill_gains: BTreeMap<String, i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraitDef {
    pub name: String,
    /// At least one degree. Single-degree traits use degree 0.
    pub degrees: Vec<TraitDegree>,
    #[serde(default = "default_commonality")]
    pub commonality: f32,
    #[serde(default)]
    pub commonality_female: Option<f32>,
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub disabled_work_tags: WorkTags,
    #[serde(default)]
    pub required_work_tags: WorkTags,
    #[serde(default)]
    pub forced_passions: Vec<String>,
    #[serde(default)]
    pub conflicting_passions: Vec<String>,
    #[serde(default = "default_true")]
    pub allow_on_hostile_spawn: bool,
    #[serde(default)]
    pub orientation: Option<Orientation>,
    #[serde(default)]
    pub blocks_scarification: bool,
}

impl Def for TraitDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl TraitDef {
    /// Commonality for a pawn of the given gender.
    pub fn commonality_for(&self, gender: Gender) -> f32 {
        match (gender, self.commonality_female) {
            (Gender::Female, Some(c)) => c,
            _ => self.commonality,
        }
    }

    /// Conflicts are symmetric: either side listing the other is enough.
    pub fn conflicts_with(&self, other: &TraitDef) -> bool {
        self.name == other.name
            || self.conflicts.iter().any(|c| *c == other.name)
            || other.conflicts.iter().any(|c| *c == self.name)
    }

    pub fn degree_data(&self, degree: i32) -> Option<&TraitDegree> {
        self.degrees.iter().find(|d| d.degree == degree)
    }

    pub fn label(&self, degree: i32) -> &str {
        self.degree_data(degree).map_or(self.name.as_str(), |d| d.label.as_str())
    }

    pub fn skill_gain(&self, degree: i32, skill: &str) -> i32 {
        self.degree_data(degree)
            .and_then(|d| d.skill_gains.get(skill))
            .copied()
            .unwrap_or(0)
    }

    pub fn forces_passion(&self, skill: &str) -> bool {
        self.forced_passions.iter().any(|s| s == skill)
    }

    pub fn conflicts_with_passion(&self, skill: &str) -> bool {
        self.conflicting_passions.iter().any(|s| s == skill)
    }

    pub fn is_orientation(&self) -> bool {
        self.orientation.is_some()
    }
}
