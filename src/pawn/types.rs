//! Pawn types and structures
//!
//! A pawn is any generated character: identity, age, story, traits, skills,
//! genes, relations, health and gear.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::RuleTables;
use crate::pawn::age::AgeTracker;
use crate::pawn::gear::Gear;
use crate::pawn::genes::GeneSet;
use crate::pawn::health::Health;
use crate::pawn::relations::DirectRelation;
use crate::pawn::skills::SkillSet;
use crate::pawn::traits::TraitSet;
use crate::pawn::work::{WorkTag, WorkTags};

/// Unique identifier for a pawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PawnId(pub u64);

impl fmt::Display for PawnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pawn#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    None,
    Male,
    Female,
}

impl Gender {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
            Gender::None => Gender::None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::None => write!(f, "none"),
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// Developmental stage, derived from biological age
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DevelopmentalStage {
    Newborn,
    Baby,
    Child,
    Adult,
}

impl DevelopmentalStage {
    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn all() -> &'static [DevelopmentalStage] {
        &[
            DevelopmentalStage::Newborn,
            DevelopmentalStage::Baby,
            DevelopmentalStage::Child,
            DevelopmentalStage::Adult,
        ]
    }
}

/// Set of allowed developmental stages
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<DevelopmentalStage>", into = "Vec<DevelopmentalStage>")]
pub struct DevelopmentalStages(u8);

impl DevelopmentalStages {
    pub const EMPTY: DevelopmentalStages = DevelopmentalStages(0);

    pub fn only(stage: DevelopmentalStage) -> Self {
        DevelopmentalStages(stage.bit())
    }

    pub fn adult() -> Self {
        Self::only(DevelopmentalStage::Adult)
    }

    pub fn child_or_adult() -> Self {
        Self::only(DevelopmentalStage::Child).with(DevelopmentalStage::Adult)
    }

    pub fn with(self, stage: DevelopmentalStage) -> Self {
        DevelopmentalStages(self.0 | stage.bit())
    }

    pub fn contains(self, stage: DevelopmentalStage) -> bool {
        self.0 & stage.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Exactly the newborn stage.
    pub fn is_newborn_only(self) -> bool {
        self == Self::only(DevelopmentalStage::Newborn)
    }

    pub fn iter(self) -> impl Iterator<Item = DevelopmentalStage> {
        DevelopmentalStage::all().iter().copied().filter(move |s| self.contains(*s))
    }
}

impl From<Vec<DevelopmentalStage>> for DevelopmentalStages {
    fn from(stages: Vec<DevelopmentalStage>) -> Self {
        stages.into_iter().fold(DevelopmentalStages::EMPTY, |acc, s| acc.with(s))
    }
}

impl From<DevelopmentalStages> for Vec<DevelopmentalStage> {
    fn from(stages: DevelopmentalStages) -> Self {
        stages.iter().collect()
    }
}

impl fmt::Debug for DevelopmentalStages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyType {
    Male,
    Female,
    Thin,
    Hulk,
    Fat,
    Child,
    Baby,
}

/// Full name. Tribal and pirate cultures still get all three parts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PawnName {
    pub first: String,
    pub nick: String,
    pub last: String,
}

impl fmt::Display for PawnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nick == self.first || self.nick.is_empty() {
            write!(f, "{} {}", self.first, self.last)
        } else {
            write!(f, "{} '{}' {}", self.first, self.nick, self.last)
        }
    }
}

/// Needs, reset when a pawn leaves the pool
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    pub food: f32,
    pub rest: f32,
    pub recreation: f32,
    pub mood: f32,
}

impl Default for Needs {
    fn default() -> Self {
        Needs { food: 1.0, rest: 1.0, recreation: 0.5, mood: 0.5 }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MindState {
    pub mental_state: Option<String>,
    pub inspiration: Option<String>,
    pub duty: Option<String>,
}

/// A generated character
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pawn {
    pub id: PawnId,
    pub archetype: String,
    pub race: String,
    pub faction: Option<String>,
    pub gender: Gender,
    pub name: Option<PawnName>,
    /// Last name at birth, before any marriage.
    pub birth_last_name: Option<String>,
    pub age: AgeTracker,
    pub childhood: Option<String>,
    pub adulthood: Option<String>,
    pub body_type: Option<BodyType>,
    pub traits: TraitSet,
    pub skills: SkillSet,
    pub genes: Option<GeneSet>,
    pub ideology: Option<String>,
    pub relations: Vec<DirectRelation>,
    pub health: Health,
    pub gear: Gear,
    pub needs: Needs,
    pub mind_state: MindState,
    pub ever_colonist: bool,
    pub ever_seen_by_player: bool,
}

impl Pawn {
    /// An empty pawn shell for the given archetype and race.
    pub fn blank(id: PawnId, archetype: &str, race: &str) -> Self {
        Pawn {
            id,
            archetype: archetype.to_string(),
            race: race.to_string(),
            faction: None,
            gender: Gender::None,
            name: None,
            birth_last_name: None,
            age: AgeTracker::default(),
            childhood: None,
            adulthood: None,
            body_type: None,
            traits: TraitSet::default(),
            skills: SkillSet::default(),
            genes: None,
            ideology: None,
            relations: Vec::new(),
            health: Health::default(),
            gear: Gear::default(),
            needs: Needs::default(),
            mind_state: MindState::default(),
            ever_colonist: false,
            ever_seen_by_player: false,
        }
    }

    /// Display label: the name, or the archetype for unnamed pawns.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.to_string(),
            None => format!("{} {}", self.archetype, self.id.0),
        }
    }

    pub fn last_name(&self) -> Option<&str> {
        self.name.as_ref().map(|n| n.last.as_str())
    }

    /// Work tags disabled by backstories, traits and genes.
    pub fn disabled_work_tags(&self, tables: &RuleTables) -> WorkTags {
        let mut disabled = WorkTags::NONE;
        for story in self.childhood.iter().chain(self.adulthood.iter()) {
            if let Some(def) = tables.backstories.get(story) {
                disabled = disabled.union(def.disabled_work_tags);
            }
        }
        for t in self.traits.iter() {
            if let Some(def) = tables.trait_def(&t.def) {
                disabled = disabled.union(def.disabled_work_tags);
            }
        }
        if let Some(genes) = &self.genes {
            for gene in genes.all_genes() {
                if let Some(def) = tables.genes.get(gene) {
                    disabled = disabled.union(def.disabled_work_tags);
                }
            }
        }
        disabled
    }

    pub fn work_tag_disabled(&self, tag: WorkTag, tables: &RuleTables) -> bool {
        self.disabled_work_tags(tables).contains(tag)
    }

    pub fn is_incapable_of_violence(&self, tables: &RuleTables) -> bool {
        self.work_tag_disabled(WorkTag::Violent, tables)
    }

    pub fn is_skill_disabled(&self, skill: &str, tables: &RuleTables) -> bool {
        match tables.skills.get(skill) {
            Some(def) => def.is_disabled_by(self.disabled_work_tags(tables)),
            None => false,
        }
    }

    pub fn is_dead(&self, tables: &RuleTables) -> bool {
        self.health.is_dead(tables)
    }

    pub fn is_downed(&self, tables: &RuleTables) -> bool {
        self.health.is_downed(tables)
    }

    pub fn relations_with(&self, other: PawnId) -> impl Iterator<Item = &DirectRelation> {
        self.relations.iter().filter(move |r| r.other == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_set() {
        let stages = DevelopmentalStages::child_or_adult();
        assert!(stages.contains(DevelopmentalStage::Adult));
        assert!(!stages.contains(DevelopmentalStage::Baby));
        assert!(!stages.is_newborn_only());
        assert!(DevelopmentalStages::only(DevelopmentalStage::Newborn).is_newborn_only());
        let parsed: DevelopmentalStages = serde_json::from_str(r#"["Adult", "Child"]"#).unwrap();
        assert_eq!(parsed, stages);
    }

    #[test]
    fn test_name_display() {
        let name = PawnName { first: "Ada".into(), nick: "Doc".into(), last: "Brandt".into() };
        assert_eq!(name.to_string(), "Ada 'Doc' Brandt");
        let plain = PawnName { first: "Ada".into(), nick: "Ada".into(), last: "Brandt".into() };
        assert_eq!(plain.to_string(), "Ada Brandt");
    }

    #[test]
    fn test_disabled_work_tags_collects_sources() {
        let tables = RuleTables::defaults();
        let mut pawn = Pawn::blank(PawnId(1), "Colonist", "Human");
        assert!(!pawn.is_incapable_of_violence(&tables));
        pawn.adulthood = Some("Healer".into());
        assert!(pawn.is_incapable_of_violence(&tables));
        assert!(pawn.is_skill_disabled("Shooting", &tables));
        assert!(!pawn.is_skill_disabled("Medicine", &tables));
    }
}
