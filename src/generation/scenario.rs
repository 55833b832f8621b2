//! Scenario and difficulty policy supplied by the host game.

use serde::{Deserialize, Serialize};

use crate::data::RuleTables;
use crate::generation::request::GenerationRequest;
use crate::pawn::{Gender, Pawn};

/// Difficulty toggles read by the age and health stages
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Children and pregnancies may be generated.
    pub children_allowed: bool,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty { children_allowed: true }
    }
}

/// Scenario-specific admissibility of starting pawns.
pub trait ScenarioPolicy {
    /// `Err` carries the reason a starting pawn is rejected.
    fn allow_player_starting_pawn(
        &self,
        pawn: &Pawn,
        redressing: bool,
        request: &GenerationRequest,
        tables: &RuleTables,
    ) -> Result<(), String>;

    fn difficulty(&self) -> Difficulty;
}

/// Accepts every pawn.
#[derive(Clone, Debug, Default)]
pub struct DefaultScenario {
    pub difficulty: Difficulty,
}

impl ScenarioPolicy for DefaultScenario {
    fn allow_player_starting_pawn(
        &self,
        _pawn: &Pawn,
        _redressing: bool,
        _request: &GenerationRequest,
        _tables: &RuleTables,
    ) -> Result<(), String> {
        Ok(())
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

/// Declarative starting-pawn restrictions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioRules {
    pub forbidden_traits: Vec<String>,
    pub max_biological_age: Option<f32>,
    pub required_gender: Option<Gender>,
    pub difficulty: Difficulty,
}

impl ScenarioPolicy for ScenarioRules {
    fn allow_player_starting_pawn(
        &self,
        pawn: &Pawn,
        _redressing: bool,
        _request: &GenerationRequest,
        _tables: &RuleTables,
    ) -> Result<(), String> {
        if let Some(t) = self.forbidden_traits.iter().find(|t| pawn.traits.has(t)) {
            return Err(format!("scenario forbids trait {}", t));
        }
        if let Some(max) = self.max_biological_age {
            if pawn.age.biological_years() > max {
                return Err(format!(
                    "biological age {:.1} above scenario limit {:.1}",
                    pawn.age.biological_years(),
                    max
                ));
            }
        }
        if let Some(gender) = self.required_gender {
            if pawn.gender != gender {
                return Err(format!("scenario requires {} pawns", gender));
            }
        }
        Ok(())
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pawn::{AgeTracker, PawnId, Trait};

    #[test]
    fn test_scenario_rules() {
        let tables = RuleTables::defaults();
        let request = GenerationRequest::new("Colonist");
        let rules = ScenarioRules {
            forbidden_traits: vec!["Wimp".into()],
            max_biological_age: Some(40.0),
            ..Default::default()
        };
        let mut pawn = Pawn::blank(PawnId(1), "Colonist", "Human");
        pawn.age = AgeTracker::from_years(30.0, 30.0);
        assert!(rules.allow_player_starting_pawn(&pawn, false, &request, &tables).is_ok());
        pawn.traits.gain(Trait::new("Wimp", 0));
        assert!(rules.allow_player_starting_pawn(&pawn, false, &request, &tables).is_err());
        pawn.traits.remove("Wimp");
        pawn.age = AgeTracker::from_years(55.0, 55.0);
        assert!(rules.allow_player_starting_pawn(&pawn, false, &request, &tables).is_err());
    }
}
