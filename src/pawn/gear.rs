//! Equipped and carried items

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quality {
    Awful,
    Poor,
    Normal,
    Good,
    Excellent,
    Masterwork,
    Legendary,
}

impl Quality {
    pub fn from_index(index: i32) -> Self {
        match index.clamp(0, 6) {
            0 => Quality::Awful,
            1 => Quality::Poor,
            2 => Quality::Normal,
            3 => Quality::Good,
            4 => Quality::Excellent,
            5 => Quality::Masterwork,
            _ => Quality::Legendary,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GearItem {
    pub def: String,
    pub quality: Option<Quality>,
    pub hit_points: u32,
    pub count: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Gear {
    pub apparel: Vec<GearItem>,
    pub weapon: Option<GearItem>,
    pub inventory: Vec<GearItem>,
}

impl Gear {
    pub fn clear(&mut self) {
        self.apparel.clear();
        self.weapon = None;
        self.inventory.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.apparel.is_empty() && self.weapon.is_none() && self.inventory.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &GearItem> {
        self.apparel.iter().chain(self.weapon.iter()).chain(self.inventory.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_from_index_clamps() {
        assert_eq!(Quality::from_index(-3), Quality::Awful);
        assert_eq!(Quality::from_index(2), Quality::Normal);
        assert_eq!(Quality::from_index(12), Quality::Legendary);
    }
}
