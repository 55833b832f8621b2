//! Pawn generation library
//!
//! Re-exports modules for use by the CLI and by host games.

pub mod curve;
pub mod data;
pub mod generation;
pub mod pawn;
pub mod rand_util;
pub mod registry;

pub use data::RuleTables;
pub use generation::{generate, GenerationContext, GenerationError, GenerationRequest, GeneratorConfig, PawnGenerator};
pub use pawn::{Pawn, PawnId};
pub use registry::{PawnRegistry, PawnSituation};
