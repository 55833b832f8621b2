//! Faction and ideology definitions.

use serde::{Deserialize, Serialize};

use super::{Def, XenotypeChance};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FactionDef {
    pub name: String,
    #[serde(default)]
    pub is_player: bool,
    #[serde(default)]
    pub hostile_to_player: bool,
    /// Key into the name pools.
    pub culture: String,
    #[serde(default)]
    pub xenotype_set: Vec<XenotypeChance>,
    #[serde(default)]
    pub ideologies: Vec<String>,
}

impl Def for FactionDef {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A belief system. Memes are reduced to the xenotype preference they imply
/// and the body modifications they require.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdeologyDef {
    pub name: String,
    #[serde(default)]
    pub xenotype_set: Vec<XenotypeChance>,
    #[serde(default)]
    pub required_scars: u32,
    #[serde(default)]
    pub blindness_chance: f32,
}

impl Def for IdeologyDef {
    fn name(&self) -> &str {
        &self.name
    }
}
