//! Relaxation ladder applied across retries

use serde::{Deserialize, Serialize};

use crate::generation::checks::CheckTag;

/// Strictness of validation for one attempt. Only ever advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelaxationTier {
    Strict,
    IgnoreScenarioConstraints,
    IgnoreValidator,
}

impl RelaxationTier {
    /// Whether checks with this tag still run.
    pub fn runs(self, tag: CheckTag) -> bool {
        match tag {
            CheckTag::Structural => true,
            CheckTag::Scenario => self < RelaxationTier::IgnoreScenarioConstraints,
            CheckTag::Caller => self < RelaxationTier::IgnoreValidator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_filter_by_tag() {
        assert!(RelaxationTier::Strict.runs(CheckTag::Scenario));
        assert!(RelaxationTier::Strict.runs(CheckTag::Caller));
        assert!(!RelaxationTier::IgnoreScenarioConstraints.runs(CheckTag::Scenario));
        assert!(RelaxationTier::IgnoreScenarioConstraints.runs(CheckTag::Caller));
        assert!(!RelaxationTier::IgnoreValidator.runs(CheckTag::Caller));
        assert!(RelaxationTier::IgnoreValidator.runs(CheckTag::Structural));
    }
}
