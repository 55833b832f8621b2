//! Pawn model
//!
//! The entity assembled by the generation pipeline and stored in the registry.

pub mod age;
pub mod gear;
pub mod genes;
pub mod health;
pub mod relations;
pub mod skills;
pub mod traits;
pub mod types;
pub mod work;

pub use age::AgeTracker;
pub use gear::{Gear, GearItem, Quality};
pub use genes::GeneSet;
pub use health::{Capacity, Condition, Health};
pub use relations::DirectRelation;
pub use skills::{Passion, SkillRecord, SkillSet, MAX_SKILL_LEVEL};
pub use traits::{Trait, TraitSet};
pub use types::{
    BodyType, DevelopmentalStage, DevelopmentalStages, Gender, MindState, Needs, Pawn, PawnId,
    PawnName,
};
pub use work::{WorkTag, WorkTags};
