//! Attribute generators
//!
//! Each stage reads the partially built pawn and the request and fills in
//! one group of attributes. The orchestrator runs them in a fixed order so a
//! given seed always consumes randomness the same way.

pub mod age;
pub mod gear;
pub mod genes;
pub mod health;
pub mod identity;
pub mod relations;
pub mod skills;
pub mod traits;
