//! Validator checks
//!
//! Each checkpoint is an ordered list of named checks. Checks are tagged so
//! the relaxation tier can drop whole groups without touching the rest.

use serde::{Deserialize, Serialize};

use crate::data::RuleTables;
use crate::generation::error::CheckFailure;
use crate::generation::relax::RelaxationTier;
use crate::generation::request::{GenerationRequest, SpawnContext};
use crate::generation::scenario::ScenarioPolicy;
use crate::pawn::{Capacity, Pawn, WorkTag};

/// Manipulation at or below this makes a pawn unable to fight
const MIN_VIOLENCE_MANIPULATION: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckTag {
    /// Never relaxed.
    Structural,
    /// Dropped once scenario constraints are ignored.
    Scenario,
    /// Dropped once caller validators are ignored.
    Caller,
}

/// Everything a check may look at
pub struct CheckEnv<'a> {
    pub pawn: &'a Pawn,
    pub request: &'a GenerationRequest,
    pub tables: &'a RuleTables,
    pub policy: &'a dyn ScenarioPolicy,
    /// Dead results are acceptable for this session.
    pub allows_dead: bool,
    pub allows_downed: bool,
    /// Checking a recycled pawn rather than a fresh one.
    pub redressing: bool,
}

pub type CheckFn = fn(&CheckEnv<'_>) -> Result<(), String>;

#[derive(Clone, Copy)]
pub struct Check {
    pub name: &'static str,
    pub tag: CheckTag,
    pub run: CheckFn,
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Check({}, {:?})", self.name, self.tag)
    }
}

/// Checks run before gear and health are generated.
pub const PRE_GEAR_CHECKS: &[Check] = &[
    Check { name: "caller_pre_gear", tag: CheckTag::Caller, run: caller_pre_gear },
    Check { name: "required_skills_enabled", tag: CheckTag::Structural, run: required_skills_enabled },
    Check { name: "skill_ranges", tag: CheckTag::Structural, run: skill_ranges },
    Check { name: "violence_work_tag", tag: CheckTag::Structural, run: violence_work_tag },
    Check { name: "required_work_tags", tag: CheckTag::Structural, run: required_work_tags },
    Check { name: "skill_minimums", tag: CheckTag::Structural, run: skill_minimums },
    Check { name: "scenario_admissible", tag: CheckTag::Scenario, run: scenario_admissible },
];

/// Checks run on the finished pawn.
pub const POST_GEAR_CHECKS: &[Check] = &[
    Check { name: "caller_post_gear", tag: CheckTag::Caller, run: caller_post_gear },
    Check { name: "not_dead", tag: CheckTag::Structural, run: not_dead },
    Check { name: "not_downed", tag: CheckTag::Structural, run: not_downed },
    Check { name: "capable_of_violence", tag: CheckTag::Structural, run: capable_of_violence },
];

/// Run checks in order, skipping those the tier relaxes. The first failure
/// short-circuits.
pub fn run_checks(checks: &[Check], env: &CheckEnv<'_>, tier: RelaxationTier) -> Result<(), CheckFailure> {
    for check in checks.iter().filter(|c| tier.runs(c.tag)) {
        (check.run)(env).map_err(|reason| CheckFailure::new(check.name, check.tag, reason))?;
    }
    Ok(())
}

fn caller_pre_gear(env: &CheckEnv<'_>) -> Result<(), String> {
    match &env.request.validator_pre_gear {
        Some(p) if !p.check(env.pawn) => Err(format!("rejected by {}", p.name)),
        _ => Ok(()),
    }
}

fn caller_post_gear(env: &CheckEnv<'_>) -> Result<(), String> {
    match &env.request.validator_post_gear {
        Some(p) if !p.check(env.pawn) => Err(format!("rejected by {}", p.name)),
        _ => Ok(()),
    }
}

fn required_skills_enabled(env: &CheckEnv<'_>) -> Result<(), String> {
    let archetype = match env.tables.archetype(&env.pawn.archetype) {
        Some(a) => a,
        None => return Ok(()),
    };
    for range in &archetype.skills {
        if env.pawn.is_skill_disabled(&range.skill, env.tables) {
            return Err(format!("required skill {} is disabled", range.skill));
        }
    }
    Ok(())
}

fn skill_ranges(env: &CheckEnv<'_>) -> Result<(), String> {
    let archetype = match env.tables.archetype(&env.pawn.archetype) {
        Some(a) => a,
        None => return Ok(()),
    };
    if env.pawn.skills.is_empty() {
        return Ok(());
    }
    for range in &archetype.skills {
        let level = env.pawn.skills.level(&range.skill) as i32;
        if !range.range.includes(level) {
            return Err(format!(
                "{} level {} outside [{}, {}]",
                range.skill, level, range.range.min, range.range.max
            ));
        }
    }
    Ok(())
}

fn violence_work_tag(env: &CheckEnv<'_>) -> Result<(), String> {
    if env.request.must_be_capable_of_violence && env.pawn.is_incapable_of_violence(env.tables) {
        return Err("incapable of violence".into());
    }
    Ok(())
}

fn required_work_tags(env: &CheckEnv<'_>) -> Result<(), String> {
    let archetype = match env.tables.archetype(&env.pawn.archetype) {
        Some(a) => a,
        None => return Ok(()),
    };
    let disabled = env.pawn.disabled_work_tags(env.tables);
    let missing: Vec<WorkTag> = archetype.required_work_tags.iter().filter(|t| disabled.contains(*t)).collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("required work tags disabled: {:?}", missing))
    }
}

fn skill_minimums(env: &CheckEnv<'_>) -> Result<(), String> {
    let archetype = match env.tables.archetype(&env.pawn.archetype) {
        Some(a) => a,
        None => return Ok(()),
    };
    if env.pawn.skills.is_empty() {
        return Ok(());
    }
    let best = env.pawn.skills.best_level() as i32;
    if best < archetype.min_best_skill_level {
        return Err(format!("best skill {} below {}", best, archetype.min_best_skill_level));
    }
    let total = env.pawn.skills.total_levels() as i32;
    if total < archetype.min_total_skill_levels {
        return Err(format!("total skills {} below {}", total, archetype.min_total_skill_levels));
    }
    Ok(())
}

fn scenario_admissible(env: &CheckEnv<'_>) -> Result<(), String> {
    if env.request.context != SpawnContext::PlayerStarter {
        return Ok(());
    }
    env.policy
        .allow_player_starting_pawn(env.pawn, env.redressing, env.request, env.tables)
}

fn not_dead(env: &CheckEnv<'_>) -> Result<(), String> {
    if !env.allows_dead && env.pawn.is_dead(env.tables) {
        return Err("pawn is dead".into());
    }
    Ok(())
}

fn not_downed(env: &CheckEnv<'_>) -> Result<(), String> {
    if !env.allows_dead && !env.allows_downed && env.pawn.is_downed(env.tables) {
        return Err("pawn is downed".into());
    }
    Ok(())
}

fn capable_of_violence(env: &CheckEnv<'_>) -> Result<(), String> {
    if !env.request.must_be_capable_of_violence {
        return Ok(());
    }
    if env.pawn.is_incapable_of_violence(env.tables) {
        return Err("incapable of violence".into());
    }
    let manipulation = env.pawn.health.capacity(Capacity::Manipulation, env.tables);
    if manipulation <= MIN_VIOLENCE_MANIPULATION {
        return Err(format!("manipulation {:.2} too low to fight", manipulation));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::request::PawnPredicate;
    use crate::generation::scenario::{DefaultScenario, ScenarioRules};
    use crate::curve::IntRange;
    use crate::data::SkillRange;
    use crate::pawn::{PawnId, SkillSet, Trait};

    fn env<'a>(
        pawn: &'a Pawn,
        request: &'a GenerationRequest,
        tables: &'a RuleTables,
        policy: &'a dyn ScenarioPolicy,
    ) -> CheckEnv<'a> {
        CheckEnv { pawn, request, tables, policy, allows_dead: false, allows_downed: false, redressing: false }
    }

    #[test]
    fn test_caller_check_is_relaxed_last() {
        let tables = RuleTables::defaults();
        let pawn = Pawn::blank(PawnId(1), "Colonist", "Human");
        let request = GenerationRequest {
            validator_pre_gear: Some(PawnPredicate::new("never", |_| false)),
            ..GenerationRequest::new("Colonist")
        };
        let policy = DefaultScenario::default();
        let e = env(&pawn, &request, &tables, &policy);
        let failure = run_checks(PRE_GEAR_CHECKS, &e, RelaxationTier::Strict).unwrap_err();
        assert_eq!(failure.check, "caller_pre_gear");
        assert_eq!(failure.tag, CheckTag::Caller);
        assert!(run_checks(PRE_GEAR_CHECKS, &e, RelaxationTier::IgnoreScenarioConstraints).is_err());
        assert!(run_checks(PRE_GEAR_CHECKS, &e, RelaxationTier::IgnoreValidator).is_ok());
    }

    #[test]
    fn test_scenario_check_only_for_starting_pawns() {
        let tables = RuleTables::defaults();
        let mut pawn = Pawn::blank(PawnId(1), "Colonist", "Human");
        pawn.traits.gain(Trait::new("Wimp", 0));
        let policy = ScenarioRules { forbidden_traits: vec!["Wimp".into()], ..Default::default() };

        let world = GenerationRequest::new("Colonist");
        assert!(run_checks(PRE_GEAR_CHECKS, &env(&pawn, &world, &tables, &policy), RelaxationTier::Strict).is_ok());

        let starter = GenerationRequest { context: SpawnContext::PlayerStarter, ..GenerationRequest::new("Colonist") };
        let e = env(&pawn, &starter, &tables, &policy);
        assert_eq!(run_checks(PRE_GEAR_CHECKS, &e, RelaxationTier::Strict).unwrap_err().tag, CheckTag::Scenario);
        assert!(run_checks(PRE_GEAR_CHECKS, &e, RelaxationTier::IgnoreScenarioConstraints).is_ok());
    }

    #[test]
    fn test_structural_checks_never_relax() {
        let tables = RuleTables::defaults();
        let mut pawn = Pawn::blank(PawnId(1), "Pirate", "Human");
        pawn.skills = SkillSet::new(tables.skills.iter().map(|s| s.name.as_str()));
        pawn.skills.set_level("Shooting", 8);
        pawn.traits.gain(Trait::new("Pacifist", 0));
        let request = GenerationRequest::new("Pirate");
        let policy = DefaultScenario::default();
        let e = env(&pawn, &request, &tables, &policy);
        let failure = run_checks(PRE_GEAR_CHECKS, &e, RelaxationTier::IgnoreValidator).unwrap_err();
        assert_eq!(failure.tag, CheckTag::Structural);
        assert_eq!(failure.check, "required_skills_enabled");
    }

    #[test]
    fn test_any_listed_skill_must_be_enabled() {
        let mut tables = RuleTables::defaults();
        let mut villager = tables.archetype("Villager").unwrap().clone();
        villager.skills = vec![SkillRange { skill: "Shooting".into(), range: IntRange { min: 0, max: 10 } }];
        tables.archetypes.upsert(villager);

        let mut pawn = Pawn::blank(PawnId(1), "Villager", "Human");
        pawn.skills = SkillSet::new(tables.skills.iter().map(|s| s.name.as_str()));
        pawn.traits.gain(Trait::new("Pacifist", 0));
        let request = GenerationRequest::new("Villager");
        let policy = DefaultScenario::default();
        let failure = run_checks(PRE_GEAR_CHECKS, &env(&pawn, &request, &tables, &policy), RelaxationTier::IgnoreValidator)
            .unwrap_err();
        assert_eq!(failure.check, "required_skills_enabled");
    }

    #[test]
    fn test_skill_range_violation() {
        let tables = RuleTables::defaults();
        let mut pawn = Pawn::blank(PawnId(1), "Pirate", "Human");
        pawn.skills = SkillSet::new(tables.skills.iter().map(|s| s.name.as_str()));
        pawn.skills.set_level("Shooting", 2);
        let request = GenerationRequest::new("Pirate");
        let policy = DefaultScenario::default();
        let failure = run_checks(PRE_GEAR_CHECKS, &env(&pawn, &request, &tables, &policy), RelaxationTier::Strict)
            .unwrap_err();
        assert_eq!(failure.check, "skill_ranges");
    }

    #[test]
    fn test_dead_pawn_rejected_unless_allowed() {
        let tables = RuleTables::defaults();
        let mut pawn = Pawn::blank(PawnId(1), "Colonist", "Human");
        pawn.health.killed = true;
        let request = GenerationRequest::new("Colonist");
        let policy = DefaultScenario::default();
        let mut e = env(&pawn, &request, &tables, &policy);
        assert_eq!(run_checks(POST_GEAR_CHECKS, &e, RelaxationTier::Strict).unwrap_err().check, "not_dead");
        e.allows_dead = true;
        assert!(run_checks(POST_GEAR_CHECKS, &e, RelaxationTier::Strict).is_ok());
    }
}
