//! Race definitions loaded from JSON.

use serde::{Deserialize, Serialize};

use super::Def;
use crate::curve::SimpleCurve;
use crate::pawn::{DevelopmentalStage, Gender};

/// Ticks in one in-game year.
pub const TICKS_PER_YEAR: i64 = 3_600_000;
/// Ticks in one in-game day.
pub const TICKS_PER_DAY: i64 = 60_000;

fn default_true() -> bool {
    true
}

fn default_life_expectancy() -> f32 {
    80.0
}

fn default_child_age() -> f32 {
    3.0
}

fn default_adult_age() -> f32 {
    13.0
}

fn default_growth_birthdays() -> Vec<u32> {
    vec![7, 10, 13]
}

fn default_orientation_age() -> f32 {
    13.0
}

/// A race definition. Capabilities that other stages branch on are plain
/// flags resolved when the file is parsed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RaceDef {
    pub name: String,
    #[serde(default = "default_true")]
    pub humanlike: bool,
    #[serde(default = "default_true")]
    pub has_genders: bool,
    #[serde(default = "default_true")]
    pub flesh: bool,
    #[serde(default = "default_true")]
    pub tool_user: bool,
    #[serde(default = "default_true")]
    pub has_genes: bool,
    #[serde(default = "default_life_expectancy")]
    pub life_expectancy: f32,
    /// Biological age density in years. Falls back to the default curve
    /// scaled by life expectancy.
    #[serde(default)]
    pub age_generation_curve: Option<SimpleCurve>,
    #[serde(default = "default_child_age")]
    pub child_min_age: f32,
    #[serde(default = "default_adult_age")]
    pub adult_min_age: f32,
    #[serde(default = "default_growth_birthdays")]
    pub growth_birthdays: Vec<u32>,
    #[serde(default = "default_orientation_age")]
    pub orientation_min_age: f32,
    #[serde(default)]
    pub fertility_female: Option<SimpleCurve>,
    #[serde(default)]
    pub fertility_male: Option<SimpleCurve>,
    /// Expected count of old injuries by biological age in years.
    #[serde(default)]
    pub old_injury_count_by_age: Option<SimpleCurve>,
}

impl Def for RaceDef {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Density over age as a fraction of life expectancy.
fn default_age_generation_curve() -> SimpleCurve {
    SimpleCurve::from_pairs(&[
        (0.05, 0.0),
        (0.1, 100.0),
        (0.675, 100.0),
        (0.75, 30.0),
        (0.875, 18.0),
        (1.0, 10.0),
        (1.125, 3.0),
        (1.25, 0.0),
    ])
}

impl RaceDef {
    /// The biological age density in years.
    pub fn age_curve(&self) -> SimpleCurve {
        match &self.age_generation_curve {
            Some(curve) => curve.clone(),
            None => {
                let scaled = default_age_generation_curve()
                    .points()
                    .iter()
                    .map(|p| (p.x * self.life_expectancy, p.y))
                    .collect::<Vec<_>>();
                SimpleCurve::from_pairs(&scaled)
            }
        }
    }

    pub fn stage_for_age(&self, years: f32) -> DevelopmentalStage {
        if years < 1.0 {
            DevelopmentalStage::Newborn
        } else if years < self.child_min_age {
            DevelopmentalStage::Baby
        } else if years < self.adult_min_age {
            DevelopmentalStage::Child
        } else {
            DevelopmentalStage::Adult
        }
    }

    /// Youngest age in years at which the stage begins.
    pub fn stage_min_age(&self, stage: DevelopmentalStage) -> f32 {
        match stage {
            DevelopmentalStage::Newborn => 0.0,
            DevelopmentalStage::Baby => 1.0,
            DevelopmentalStage::Child => self.child_min_age,
            DevelopmentalStage::Adult => self.adult_min_age,
        }
    }

    /// Number of growth birthdays already passed at `years`.
    pub fn growth_birthdays_passed(&self, years: f32) -> usize {
        self.growth_birthdays
            .iter()
            .filter(|&&b| years >= b as f32)
            .count()
    }

    pub fn fertility(&self, gender: Gender, years: f32) -> f32 {
        let curve = match gender {
            Gender::Female => self.fertility_female.as_ref(),
            Gender::Male => self.fertility_male.as_ref(),
            Gender::None => None,
        };
        curve.map(|c| c.evaluate(years)).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn human() -> RaceDef {
        serde_json::from_str(r#"{ "name": "Human" }"#).unwrap()
    }

    #[test]
    fn test_race_defaults() {
        let race = human();
        assert!(race.humanlike && race.has_genders && race.flesh);
        assert_eq!(race.growth_birthdays, vec![7, 10, 13]);
        assert_eq!(race.stage_for_age(0.5), DevelopmentalStage::Newborn);
        assert_eq!(race.stage_for_age(2.0), DevelopmentalStage::Baby);
        assert_eq!(race.stage_for_age(8.0), DevelopmentalStage::Child);
        assert_eq!(race.stage_for_age(13.0), DevelopmentalStage::Adult);
    }

    #[test]
    fn test_default_age_curve_scales_with_life_expectancy() {
        let race = human();
        let curve = race.age_curve();
        assert_eq!(curve.points()[0].x, 4.0);
        assert_eq!(curve.points().last().unwrap().x, 100.0);
        assert_eq!(curve.evaluate(30.0), 100.0);
    }

    #[test]
    fn test_growth_birthdays_passed() {
        let race = human();
        assert_eq!(race.growth_birthdays_passed(5.0), 0);
        assert_eq!(race.growth_birthdays_passed(10.0), 2);
        assert_eq!(race.growth_birthdays_passed(40.0), 3);
    }
}
