//! Health conditions and derived capacities

use serde::{Deserialize, Serialize};

use crate::data::{ConditionKind, RuleTables};
use crate::pawn::types::PawnId;

/// Consciousness below this downs a pawn
const DOWNED_CONSCIOUSNESS: f32 = 0.3;
/// Moving below this downs a pawn
const DOWNED_MOVING: f32 = 0.16;
/// Total pain at or above this puts a pawn in shock
const PAIN_SHOCK: f32 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capacity {
    Consciousness,
    Moving,
    Manipulation,
    Sight,
}

/// A condition instance on a pawn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub def: String,
    pub kind: ConditionKind,
    /// 0..=1. For pregnancies this is gestation progress.
    pub severity: f32,
    pub tended: bool,
    /// Other pawn involved, e.g. the father of a pregnancy.
    pub linked_pawn: Option<PawnId>,
}

impl Condition {
    pub fn new(def: &str, kind: ConditionKind, severity: f32) -> Self {
        Condition {
            def: def.to_string(),
            kind,
            severity: severity.clamp(0.0, 1.0),
            tended: false,
            linked_pawn: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Health {
    conditions: Vec<Condition>,
    /// Set when the pawn was killed outright.
    pub killed: bool,
}

impl Health {
    pub fn add(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn conditions_mut(&mut self) -> std::slice::IterMut<'_, Condition> {
        self.conditions.iter_mut()
    }

    pub fn has(&self, def: &str) -> bool {
        self.conditions.iter().any(|c| c.def == def)
    }

    pub fn has_kind(&self, kind: ConditionKind) -> bool {
        self.conditions.iter().any(|c| c.kind == kind)
    }

    pub fn count_kind(&self, kind: ConditionKind) -> usize {
        self.conditions.iter().filter(|c| c.kind == kind).count()
    }

    pub fn retain(&mut self, f: impl FnMut(&Condition) -> bool) {
        self.conditions.retain(f);
    }

    pub fn clear(&mut self) {
        self.conditions.clear();
        self.killed = false;
    }

    /// Mark every tendable condition as tended.
    pub fn tend_all(&mut self, tables: &RuleTables) {
        for c in self.conditions.iter_mut() {
            if tables.conditions.get(&c.def).map_or(false, |d| d.tendable) {
                c.tended = true;
            }
        }
    }

    /// Capacity level in `[0, 1]`.
    pub fn capacity(&self, capacity: Capacity, tables: &RuleTables) -> f32 {
        let offset: f32 = self
            .conditions
            .iter()
            .filter_map(|c| {
                tables
                    .conditions
                    .get(&c.def)
                    .and_then(|d| d.capacity_offsets.get(&capacity))
                    .map(|o| o * c.severity)
            })
            .sum();
        (1.0 + offset).clamp(0.0, 1.0)
    }

    /// Total pain. Tended conditions hurt half as much.
    pub fn pain(&self, tables: &RuleTables) -> f32 {
        self.conditions
            .iter()
            .filter_map(|c| {
                tables.conditions.get(&c.def).map(|d| {
                    let tend = if c.tended { 0.5 } else { 1.0 };
                    d.pain * c.severity * tend
                })
            })
            .sum()
    }

    /// Blood loss per day from untended wounds.
    pub fn bleed_rate(&self, tables: &RuleTables) -> f32 {
        self.conditions
            .iter()
            .filter(|c| !c.tended)
            .filter_map(|c| tables.conditions.get(&c.def).map(|d| d.bleed_rate * c.severity))
            .sum()
    }

    pub fn is_bleeding(&self, tables: &RuleTables) -> bool {
        self.bleed_rate(tables) > 0.0
    }

    pub fn is_dead(&self, tables: &RuleTables) -> bool {
        if self.killed {
            return true;
        }
        let lethal = self.conditions.iter().any(|c| {
            c.severity >= 1.0 && tables.conditions.get(&c.def).map_or(false, |d| d.lethal)
        });
        lethal || self.capacity(Capacity::Consciousness, tables) <= 0.0
    }

    pub fn is_downed(&self, tables: &RuleTables) -> bool {
        self.capacity(Capacity::Consciousness, tables) < DOWNED_CONSCIOUSNESS
            || self.capacity(Capacity::Moving, tables) < DOWNED_MOVING
            || self.pain(tables) >= PAIN_SHOCK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_offsets_scale_with_severity() {
        let tables = RuleTables::defaults();
        let mut health = Health::default();
        health.add(Condition::new("Cataract", ConditionKind::Chronic, 0.5));
        assert!((health.capacity(Capacity::Sight, &tables) - 0.8).abs() < 1e-5);
        assert_eq!(health.capacity(Capacity::Moving, &tables), 1.0);
        assert!(!health.is_downed(&tables));
    }

    #[test]
    fn test_bleeding_stops_when_tended() {
        let tables = RuleTables::defaults();
        let mut health = Health::default();
        health.add(Condition::new("Cut", ConditionKind::Wound, 1.0));
        assert!(health.is_bleeding(&tables));
        health.tend_all(&tables);
        assert!(!health.is_bleeding(&tables));
    }

    #[test]
    fn test_lethal_condition_at_full_severity_kills() {
        let tables = RuleTables::defaults();
        let mut health = Health::default();
        health.add(Condition::new("HeartArteryBlockage", ConditionKind::Chronic, 0.6));
        assert!(!health.is_dead(&tables));
        health.add(Condition::new("HeartArteryBlockage", ConditionKind::Chronic, 1.0));
        assert!(health.is_dead(&tables));
    }

    #[test]
    fn test_dementia_and_frailty_can_down() {
        let tables = RuleTables::defaults();
        let mut health = Health::default();
        health.add(Condition::new("Dementia", ConditionKind::Chronic, 1.0));
        health.add(Condition::new("Dementia", ConditionKind::Chronic, 1.0));
        health.add(Condition::new("Dementia", ConditionKind::Chronic, 1.0));
        assert!(health.is_downed(&tables));
    }
}
