//! Name pools per culture.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pawn::Gender;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NameCulture {
    pub male_first: Vec<String>,
    pub female_first: Vec<String>,
    #[serde(default)]
    pub nicks: Vec<String>,
    pub last: Vec<String>,
}

impl NameCulture {
    /// First names for a gender. Genderless pawns draw from both lists.
    pub fn first_names(&self, gender: Gender) -> Vec<&String> {
        match gender {
            Gender::Male => self.male_first.iter().collect(),
            Gender::Female => self.female_first.iter().collect(),
            Gender::None => self.male_first.iter().chain(self.female_first.iter()).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NamePools {
    pub cultures: BTreeMap<String, NameCulture>,
}

impl NamePools {
    pub fn culture(&self, name: &str) -> Option<&NameCulture> {
        self.cultures.get(name)
    }

    pub fn merge(&mut self, other: NamePools) {
        self.cultures.extend(other.cultures);
    }
}
