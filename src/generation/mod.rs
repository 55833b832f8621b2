//! Pawn generation
//!
//! Requests go through the recycler first and then through the stage
//! pipeline, validated at two checkpoints and retried with progressively
//! relaxed constraints.

pub mod checks;
pub mod config;
pub mod error;
pub mod generator;
pub mod recycle;
pub mod relax;
pub mod request;
pub mod scenario;
pub mod session;
pub mod stages;

pub use checks::CheckTag;
pub use config::GeneratorConfig;
pub use error::{CheckFailure, ConfigError, GenerationError};
pub use generator::{generate, GenerationContext, PawnGenerator, RunSummary};
pub use relax::RelaxationTier;
pub use request::{GenerationRequest, PawnPredicate, PresetRelation, SpawnContext};
pub use scenario::{DefaultScenario, Difficulty, ScenarioPolicy, ScenarioRules};
