//! Skill levels and passions

use serde::{Deserialize, Serialize};

/// Highest reachable skill level
pub const MAX_SKILL_LEVEL: u8 = 20;

/// Engagement with a skill
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Passion {
    #[default]
    None,
    Minor,
    Major,
}

impl Passion {
    pub fn increment(self) -> Self {
        match self {
            Passion::None => Passion::Minor,
            _ => Passion::Major,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub skill: String,
    pub level: u8,
    pub passion: Passion,
}

/// One record per skill def, in table order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillSet {
    records: Vec<SkillRecord>,
}

impl SkillSet {
    pub fn new<'a>(skills: impl IntoIterator<Item = &'a str>) -> Self {
        SkillSet {
            records: skills
                .into_iter()
                .map(|s| SkillRecord { skill: s.to_string(), level: 0, passion: Passion::None })
                .collect(),
        }
    }

    pub fn get(&self, skill: &str) -> Option<&SkillRecord> {
        self.records.iter().find(|r| r.skill == skill)
    }

    pub fn get_mut(&mut self, skill: &str) -> Option<&mut SkillRecord> {
        self.records.iter_mut().find(|r| r.skill == skill)
    }

    pub fn level(&self, skill: &str) -> u8 {
        self.get(skill).map_or(0, |r| r.level)
    }

    /// Set a level, clamped to the valid range.
    pub fn set_level(&mut self, skill: &str, level: i32) {
        if let Some(r) = self.get_mut(skill) {
            r.level = level.clamp(0, MAX_SKILL_LEVEL as i32) as u8;
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SkillRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, SkillRecord> {
        self.records.iter_mut()
    }

    pub fn best_level(&self) -> u8 {
        self.records.iter().map(|r| r.level).max().unwrap_or(0)
    }

    pub fn total_levels(&self) -> u32 {
        self.records.iter().map(|r| r.level as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest skills first, ties in table order.
    pub fn top(&self, n: usize) -> Vec<&SkillRecord> {
        let mut sorted: Vec<&SkillRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.level.cmp(&a.level));
        sorted.truncate(n);
        sorted
    }
}
