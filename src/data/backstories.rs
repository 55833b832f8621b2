//! Backstory definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Def, TraitRequirement};
use crate::pawn::{BodyType, Gender, WorkTags};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackstorySlot {
    Childhood,
    Adulthood,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackstoryDef {
    pub name: String,
    pub title: String,
    pub slot: BackstorySlot,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub skill_gains: BTreeMap<String, i32>,
    #[serde(default)]
    pub forced_traits: Vec<TraitRequirement>,
    #[serde(default)]
    pub disallowed_traits: Vec<TraitRequirement>,
    #[serde(default)]
    pub disabled_work_tags: WorkTags,
    #[serde(default)]
    pub body_type_male: Option<BodyType>,
    #[serde(default)]
    pub body_type_female: Option<BodyType>,
    #[serde(default)]
    pub tribal: bool,
}

impl Def for BackstoryDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl BackstoryDef {
    pub fn in_any_category(&self, categories: &[String]) -> bool {
        self.categories.iter().any(|c| categories.contains(c))
    }

    pub fn disallows_trait(&self, trait_name: &str, degree: i32) -> bool {
        self.disallowed_traits.iter().any(|r| r.matches(trait_name, degree))
    }

    pub fn skill_gain(&self, skill: &str) -> i32 {
        self.skill_gains.get(skill).copied().unwrap_or(0)
    }

    pub fn body_type_for(&self, gender: Gender) -> Option<BodyType> {
        match gender {
            Gender::Female => self.body_type_female,
            _ => self.body_type_male,
        }
    }
}
