//! Skill definitions.

use serde::{Deserialize, Serialize};

use super::Def;
use crate::pawn::WorkTags;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillDef {
    pub name: String,
    /// Skills normally granted by backstories get no random base level
    /// unless a backstory contributes to them.
    #[serde(default)]
    pub usually_defined_in_backstories: bool,
    /// The skill is totally disabled when all of these work tags are.
    #[serde(default)]
    pub disabling_work_tags: WorkTags,
}

impl Def for SkillDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl SkillDef {
    pub fn named(name: &str) -> Self {
        SkillDef {
            name: name.to_string(),
            usually_defined_in_backstories: false,
            disabling_work_tags: WorkTags::NONE,
        }
    }

    /// Whether the pawn's disabled work tags disable this skill.
    pub fn is_disabled_by(&self, disabled: WorkTags) -> bool {
        !self.disabling_work_tags.is_empty()
            && self.disabling_work_tags.iter().all(|t| disabled.contains(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pawn::WorkTag;

    #[test]
    fn test_skill_disabled_by_work_tags() {
        let mut social = SkillDef::named("Social");
        social.disabling_work_tags = WorkTags::from_tags(&[WorkTag::Social]);
        assert!(social.is_disabled_by(WorkTags::from_tags(&[WorkTag::Social, WorkTag::Caring])));
        assert!(!social.is_disabled_by(WorkTags::from_tags(&[WorkTag::Caring])));
        assert!(!SkillDef::named("Mining").is_disabled_by(WorkTags::from_tags(&[WorkTag::Mining])));
    }
}
