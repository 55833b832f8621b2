//! Tuning parameters for pawn generation.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::generation::error::ConfigError;
use crate::generation::relax::RelaxationTier;

/// Configuration parameters for the generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// First attempt at which scenario checks are skipped (default: 70).
    pub ignore_scenario_from_attempt: u32,

    /// First attempt at which caller validators are skipped (default: 100).
    pub ignore_validator_from_attempt: u32,

    /// Hard ceiling on attempts per request (default: 120).
    pub max_attempts: u32,

    /// Rejection-sampling tries for biological age.
    pub age_sampling_tries: u32,

    /// Re-rolls of the health stage while the result is incapacitated.
    pub health_seeding_tries: u32,

    /// Extra draws allowed beyond the requested trait count.
    pub extra_trait_attempts: u32,

    /// (pawn, relation kind) pairs sampled by the relation stage.
    pub relation_samples: u32,

    /// Weight of "no relation" per sample batch before scaling.
    pub relation_none_weight: f32,

    /// Added to `relation_none_weight` per player pawn in play.
    pub relation_none_weight_per_player_pawn: f32,

    /// Recycle chance with an empty pool.
    pub recycle_base_chance: f32,

    /// Growth of the recycle chance with ln(1 + free / 10).
    pub recycle_log_scale: f32,

    /// Upper bound of the recycle chance.
    pub recycle_max_chance: f32,

    /// Mean of the passion budget.
    pub passion_budget_mean: f32,

    /// Gaussian noise on the passion budget is clamped to +/- this.
    pub passion_budget_noise_clamp: f32,

    pub major_passion_cost: f32,

    pub minor_passion_cost: f32,

    /// Earliest calendar year a pawn can have been born in.
    pub calendar_origin_year: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            ignore_scenario_from_attempt: 70,
            ignore_validator_from_attempt: 100,
            max_attempts: 120,
            age_sampling_tries: 300,
            health_seeding_tries: 80,
            extra_trait_attempts: 500,
            relation_samples: 40,
            relation_none_weight: 45.0,
            relation_none_weight_per_player_pawn: 2.7,
            recycle_base_chance: 0.02,
            recycle_log_scale: 0.05,
            recycle_max_chance: 0.8,
            passion_budget_mean: 5.0,
            passion_budget_noise_clamp: 4.0,
            major_passion_cost: 1.5,
            minor_passion_cost: 1.0,
            calendar_origin_year: 2026,
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GeneratorConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
        }
        if self.ignore_scenario_from_attempt > self.ignore_validator_from_attempt
            || self.ignore_validator_from_attempt > self.max_attempts
        {
            return Err(ConfigError::Invalid(format!(
                "relaxation thresholds must satisfy scenario ({}) <= validator ({}) <= max ({})",
                self.ignore_scenario_from_attempt,
                self.ignore_validator_from_attempt,
                self.max_attempts
            )));
        }
        if self.major_passion_cost <= 0.0 || self.minor_passion_cost <= 0.0 {
            return Err(ConfigError::Invalid("passion costs must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.recycle_max_chance) {
            return Err(ConfigError::Invalid("recycle_max_chance must be within [0, 1]".into()));
        }
        Ok(())
    }

    /// Relaxation tier in force for a 1-based attempt number.
    pub fn tier_for(&self, attempt: u32) -> RelaxationTier {
        if attempt >= self.ignore_validator_from_attempt {
            RelaxationTier::IgnoreValidator
        } else if attempt >= self.ignore_scenario_from_attempt {
            RelaxationTier::IgnoreScenarioConstraints
        } else {
            RelaxationTier::Strict
        }
    }

    /// Chance of recycling from the general free pool.
    pub fn recycle_chance(&self, free_pawns: usize, request_minimum: f32) -> f32 {
        let pressure = (1.0 + free_pawns as f32 / 10.0).ln();
        let chance = (self.recycle_base_chance + self.recycle_log_scale * pressure)
            .min(self.recycle_max_chance);
        chance.max(request_minimum).clamp(0.0, 1.0)
    }
}
