//! Generation request: the constraints a caller places on a pawn.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::curve::FloatRange;
use crate::data::RelationKind;
use crate::pawn::{DevelopmentalStages, Gender, Pawn, PawnId};

/// Why the pawn is being generated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnContext {
    /// Starting colonists chosen by the player.
    PlayerStarter,
    /// World pawns, visitors, raiders.
    NonPlayer,
    /// Quest rewards and participants.
    Quest,
}

/// Caller-supplied predicate over a pawn.
#[derive(Clone)]
pub struct PawnPredicate {
    pub name: String,
    test: Arc<dyn Fn(&Pawn) -> bool + Send + Sync>,
}

impl PawnPredicate {
    pub fn new(name: &str, test: impl Fn(&Pawn) -> bool + Send + Sync + 'static) -> Self {
        PawnPredicate { name: name.to_string(), test: Arc::new(test) }
    }

    pub fn check(&self, pawn: &Pawn) -> bool {
        (self.test)(pawn)
    }
}

impl fmt::Debug for PawnPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PawnPredicate({})", self.name)
    }
}

/// A relation to an existing pawn recorded before traits are drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresetRelation {
    pub kind: RelationKind,
    pub other: PawnId,
}

/// Everything a caller can pin down about a pawn.
///
/// Build with [`GenerationRequest::new`] and override fields with struct
/// update syntax.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub archetype: String,
    pub faction: Option<String>,
    pub context: SpawnContext,
    /// Settlement whose previous inhabitants are recycled first.
    pub inhabitant_of: Option<String>,
    pub force_generate_new: bool,
    pub redress_former_colonist: bool,
    pub world_faction_doesnt_matter: bool,
    pub can_generate_relations: bool,
    pub must_be_capable_of_violence: bool,
    pub allow_dead: bool,
    pub allow_downed: bool,
    pub allow_addictions: bool,
    pub allow_pregnant: bool,
    pub allow_gay: bool,
    pub force_dead: bool,
    pub allowed_stages: DevelopmentalStages,
    pub fixed_biological_age: Option<f32>,
    pub fixed_chronological_age: Option<f32>,
    pub biological_age_range: Option<FloatRange>,
    /// Biological ages inside this range are rejected.
    pub excluded_biological_age_range: Option<FloatRange>,
    pub certainly_been_in_stasis: bool,
    pub fixed_gender: Option<Gender>,
    pub fixed_last_name: Option<String>,
    pub fixed_birth_name: Option<String>,
    pub forced_traits: Vec<String>,
    pub prohibited_traits: Vec<String>,
    pub forced_xenotype: Option<String>,
    pub forced_xenogenes: Vec<String>,
    pub forced_endogenes: Vec<String>,
    pub allowed_xenotypes: Vec<String>,
    pub force_baseliner_chance: f32,
    pub fixed_ideology: Option<String>,
    pub validator_pre_gear: Option<PawnPredicate>,
    pub validator_post_gear: Option<PawnPredicate>,
    /// Extra filter applied only to recycling candidates.
    pub redress_validator: Option<PawnPredicate>,
    pub min_recycle_chance: f32,
    pub preset_relations: Vec<PresetRelation>,
}

impl GenerationRequest {
    pub fn new(archetype: &str) -> Self {
        GenerationRequest {
            archetype: archetype.to_string(),
            faction: None,
            context: SpawnContext::NonPlayer,
            inhabitant_of: None,
            force_generate_new: false,
            redress_former_colonist: false,
            world_faction_doesnt_matter: false,
            can_generate_relations: true,
            must_be_capable_of_violence: false,
            allow_dead: false,
            allow_downed: false,
            allow_addictions: true,
            allow_pregnant: false,
            allow_gay: true,
            force_dead: false,
            allowed_stages: DevelopmentalStages::adult(),
            fixed_biological_age: None,
            fixed_chronological_age: None,
            biological_age_range: None,
            excluded_biological_age_range: None,
            certainly_been_in_stasis: false,
            fixed_gender: None,
            fixed_last_name: None,
            fixed_birth_name: None,
            forced_traits: Vec::new(),
            prohibited_traits: Vec::new(),
            forced_xenotype: None,
            forced_xenogenes: Vec::new(),
            forced_endogenes: Vec::new(),
            allowed_xenotypes: Vec::new(),
            force_baseliner_chance: 0.0,
            fixed_ideology: None,
            validator_pre_gear: None,
            validator_post_gear: None,
            redress_validator: None,
            min_recycle_chance: 0.0,
            preset_relations: Vec::new(),
        }
    }

    /// Repair inconsistent combinations in place.
    pub fn validate_and_fix(&mut self) {
        if let (Some(bio), Some(chrono)) = (self.fixed_biological_age, self.fixed_chronological_age) {
            if bio > chrono {
                warn!(
                    archetype = %self.archetype,
                    biological = bio,
                    chronological = chrono,
                    "fixed biological age exceeds fixed chronological age"
                );
            }
        }
        if self.allowed_stages.is_empty() {
            warn!(archetype = %self.archetype, "empty developmental stage set, defaulting to adult");
            self.allowed_stages = DevelopmentalStages::adult();
        }
        if self.force_dead {
            self.allow_dead = true;
        }
        self.min_recycle_chance = self.min_recycle_chance.clamp(0.0, 1.0);
        self.force_baseliner_chance = self.force_baseliner_chance.clamp(0.0, 1.0);
    }

    pub fn is_newborn(&self) -> bool {
        self.allowed_stages.is_newborn_only()
    }

    pub fn prohibits_trait(&self, trait_name: &str) -> bool {
        self.prohibited_traits.iter().any(|t| t == trait_name)
    }
}
