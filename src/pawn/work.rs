//! Work tags - capability bitset
//!
//! Backstories, traits and genes disable whole categories of work. Tags are
//! stored as a bitset and serialized as a list of names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Individual work capability
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkTag {
    Violent,
    Social,
    Intellectual,
    Caring,
    ManualDumb,
    ManualSkilled,
    Crafting,
    Artistic,
    Animals,
    Cooking,
    Mining,
    PlantWork,
    Firefighting,
}

impl WorkTag {
    pub fn all() -> &'static [WorkTag] {
        &[
            WorkTag::Violent,
            WorkTag::Social,
            WorkTag::Intellectual,
            WorkTag::Caring,
            WorkTag::ManualDumb,
            WorkTag::ManualSkilled,
            WorkTag::Crafting,
            WorkTag::Artistic,
            WorkTag::Animals,
            WorkTag::Cooking,
            WorkTag::Mining,
            WorkTag::PlantWork,
            WorkTag::Firefighting,
        ]
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Set of work tags
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<WorkTag>", into = "Vec<WorkTag>")]
pub struct WorkTags(u16);

impl WorkTags {
    pub const NONE: WorkTags = WorkTags(0);

    pub fn from_tags(tags: &[WorkTag]) -> Self {
        tags.iter().fold(WorkTags::NONE, |acc, t| acc.with(*t))
    }

    pub fn with(self, tag: WorkTag) -> Self {
        WorkTags(self.0 | tag.bit())
    }

    pub fn contains(self, tag: WorkTag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn intersects(self, other: WorkTags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: WorkTags) -> Self {
        WorkTags(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = WorkTag> {
        WorkTag::all().iter().copied().filter(move |t| self.contains(*t))
    }
}

impl From<Vec<WorkTag>> for WorkTags {
    fn from(tags: Vec<WorkTag>) -> Self {
        WorkTags::from_tags(&tags)
    }
}

impl From<WorkTags> for Vec<WorkTag> {
    fn from(tags: WorkTags) -> Self {
        tags.iter().collect()
    }
}

impl fmt::Debug for WorkTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
