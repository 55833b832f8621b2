//! Skill levels and passions

use rand::Rng;
use rand_distr::StandardNormal;

use crate::curve::SimpleCurve;
use crate::data::{ArchetypeDef, RaceDef, RuleTables, SkillDef};
use crate::generation::config::GeneratorConfig;
use crate::generation::generator::GenerationContext;
use crate::generation::request::GenerationRequest;
use crate::pawn::{Passion, Pawn, SkillSet, MAX_SKILL_LEVEL};
use crate::rand_util::{random_element, range_f32};

/// Base level for skills backstories normally define
const BACKSTORY_SKILL_BASE_MAX: i32 = 4;

/// Backstory gains are scaled by a factor in this range
const BACKSTORY_GAIN_JITTER: (f32, f32) = (1.0, 1.4);

/// Most passion increments a child gains per growth birthday
const CHILD_PASSIONS_PER_BIRTHDAY: u32 = 3;

fn level_random_curve() -> SimpleCurve {
    SimpleCurve::from_pairs(&[(0.0, 0.0), (0.5, 150.0), (4.0, 150.0), (5.0, 25.0), (10.0, 5.0), (15.0, 0.0)])
}

fn age_skill_max_factor_curve() -> SimpleCurve {
    SimpleCurve::from_pairs(&[(0.0, 0.0), (10.0, 0.7), (35.0, 1.0), (60.0, 1.6)])
}

fn age_skill_factor_curve() -> SimpleCurve {
    SimpleCurve::from_pairs(&[(3.0, 0.2), (18.0, 1.0)])
}

fn level_final_adjustment_curve() -> SimpleCurve {
    SimpleCurve::from_pairs(&[(0.0, 0.0), (10.0, 10.0), (20.0, 16.0), (27.0, 20.0)])
}

/// Level of one skill before clamping to the archetype range.
fn raw_level<R: Rng>(pawn: &Pawn, skill: &SkillDef, archetype: &ArchetypeDef, tables: &RuleTables, rng: &mut R) -> f32 {
    let mut level = if skill.usually_defined_in_backstories {
        rng.gen_range(0..=BACKSTORY_SKILL_BASE_MAX) as f32
    } else {
        level_random_curve().sample_density(rng)
    };

    for story in pawn.childhood.iter().chain(pawn.adulthood.iter()) {
        if let Some(def) = tables.backstories.get(story) {
            let gain = def.skill_gain(&skill.name);
            if gain != 0 {
                level += gain as f32 * range_f32(rng, BACKSTORY_GAIN_JITTER.0, BACKSTORY_GAIN_JITTER.1);
            }
        }
    }
    for t in pawn.traits.iter() {
        if let Some(def) = tables.trait_def(&t.def) {
            level += def.skill_gain(t.degree, &skill.name) as f32;
        }
    }

    let age = pawn.age.biological_years_floor() as f32;
    level *= range_f32(rng, 1.0, age_skill_max_factor_curve().evaluate(age).max(1.0));
    level *= age_skill_factor_curve().evaluate(age);
    level = level_final_adjustment_curve().evaluate(level);
    if level > 0.0 {
        level += archetype.extra_skill_levels as f32;
    }
    level
}

/// Passion slots bought from a noisy budget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassionBudget {
    pub major: u32,
    pub minor: u32,
}

impl PassionBudget {
    pub fn roll<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> Self {
        let noise: f32 = rng.sample(StandardNormal);
        let clamp = config.passion_budget_noise_clamp;
        let mut points = config.passion_budget_mean + noise.clamp(-clamp, clamp);
        let mut budget = PassionBudget::default();
        while points >= config.minor_passion_cost {
            if points >= config.major_passion_cost && rng.gen_bool(0.5) {
                budget.major += 1;
                points -= config.major_passion_cost;
            } else {
                budget.minor += 1;
                points -= config.minor_passion_cost;
            }
        }
        budget
    }

    pub fn is_spent(&self) -> bool {
        self.major == 0 && self.minor == 0
    }

    /// Spend one slot, best first. `force` grants a minor passion even when
    /// the budget is empty.
    fn take(&mut self, force: bool) -> Option<Passion> {
        if self.major > 0 {
            self.major -= 1;
            Some(Passion::Major)
        } else if self.minor > 0 || force {
            self.minor = self.minor.saturating_sub(1);
            Some(Passion::Minor)
        } else {
            None
        }
    }
}

fn assign_passions<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &mut Pawn,
    race: &RaceDef,
) {
    let tables = ctx.tables;
    let mut budget = PassionBudget::roll(ctx.config, ctx.rng);

    let forced: Vec<String> = pawn
        .traits
        .iter()
        .filter_map(|t| tables.trait_def(&t.def))
        .flat_map(|d| d.forced_passions.iter().cloned())
        .collect();
    for skill in forced {
        if pawn.is_skill_disabled(&skill, tables) {
            continue;
        }
        if let (Some(passion), Some(record)) = (budget.take(true), pawn.skills.get_mut(&skill)) {
            record.passion = record.passion.max(passion);
        }
    }

    let years = pawn.age.biological_years();
    if years < race.adult_min_age {
        for _ in 0..race.growth_birthdays_passed(years) {
            let increments = ctx.rng.gen_range(0..=CHILD_PASSIONS_PER_BIRTHDAY);
            for _ in 0..increments {
                let open: Vec<String> = pawn
                    .skills
                    .iter()
                    .filter(|r| r.passion != Passion::Major && !pawn.is_skill_disabled(&r.skill, tables))
                    .map(|r| r.skill.clone())
                    .collect();
                if let Some(skill) = random_element(&open, ctx.rng) {
                    if let Some(record) = pawn.skills.get_mut(skill) {
                        record.passion = record.passion.increment();
                    }
                }
            }
        }
        return;
    }

    let by_level: Vec<String> = pawn
        .skills
        .top(usize::MAX)
        .into_iter()
        .filter(|r| r.passion == Passion::None)
        .map(|r| r.skill.clone())
        .collect();
    for skill in by_level {
        if budget.is_spent() {
            break;
        }
        if pawn.is_skill_disabled(&skill, tables) {
            continue;
        }
        let conflicts = pawn
            .traits
            .iter()
            .filter_map(|t| tables.trait_def(&t.def))
            .any(|d| d.conflicts_with_passion(&skill));
        if conflicts {
            continue;
        }
        if let (Some(passion), Some(record)) = (budget.take(false), pawn.skills.get_mut(&skill)) {
            record.passion = passion;
        }
    }
}

pub fn generate_skills<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &mut Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
) {
    if !race.humanlike {
        pawn.skills = SkillSet::default();
        return;
    }
    let tables = ctx.tables;
    pawn.skills = SkillSet::new(tables.skills.iter().map(|s| s.name.as_str()));
    if request.is_newborn() {
        return;
    }

    for def in tables.skills.iter() {
        if pawn.is_skill_disabled(&def.name, tables) {
            continue;
        }
        let raw = raw_level(pawn, def, archetype, tables, ctx.rng);
        let mut level = raw.round() as i32;
        if let Some(range) = archetype.skill_range(&def.name) {
            if !range.includes(level) {
                level = range.random_in_range(ctx.rng);
            }
        }
        pawn.skills.set_level(&def.name, level.clamp(0, MAX_SKILL_LEVEL as i32));
    }

    assign_passions(ctx, pawn, race);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::generator::tests::Fixture;
    use crate::pawn::{AgeTracker, Gender, PawnId, Trait};

    fn run(fixture: &mut Fixture, pawn: &mut Pawn, archetype: &str, years: f32) {
        let tables = fixture.tables.clone();
        let archetype = tables.archetype(archetype).unwrap();
        let race = tables.race("Human").unwrap();
        pawn.age = AgeTracker::from_years(years, years);
        let request = GenerationRequest::new(&archetype.name);
        let mut ctx = fixture.ctx();
        generate_skills(&mut ctx, pawn, &request, archetype, race);
    }

    #[test]
    fn test_levels_stay_in_bounds_and_ranges() {
        for seed in 0..40 {
            let mut fixture = Fixture::new(seed);
            let mut pawn = Pawn::blank(PawnId(1), "Veteran", "Human");
            pawn.gender = Gender::Male;
            run(&mut fixture, &mut pawn, "Veteran", 45.0);
            assert!(pawn.skills.iter().all(|r| r.level <= MAX_SKILL_LEVEL));
            let shooting = pawn.skills.level("Shooting");
            assert!((6..=14).contains(&shooting), "shooting {}", shooting);
        }
    }

    #[test]
    fn test_disabled_skills_get_nothing() {
        let mut fixture = Fixture::new(3);
        let mut pawn = Pawn::blank(PawnId(1), "Colonist", "Human");
        pawn.adulthood = Some("Healer".into());
        run(&mut fixture, &mut pawn, "Colonist", 40.0);
        let shooting = pawn.skills.get("Shooting").unwrap();
        assert_eq!(shooting.level, 0);
        assert_eq!(shooting.passion, Passion::None);
    }

    #[test]
    fn test_trait_forced_passion() {
        for seed in 0..20 {
            let mut fixture = Fixture::new(seed);
            let mut pawn = Pawn::blank(PawnId(1), "Colonist", "Human");
            pawn.traits.gain(Trait::new("Brawler", 0));
            run(&mut fixture, &mut pawn, "Colonist", 30.0);
            assert_ne!(pawn.skills.get("Melee").unwrap().passion, Passion::None);
            assert_eq!(pawn.skills.get("Shooting").unwrap().passion, Passion::None);
        }
    }

    #[test]
    fn test_budget_costs() {
        let config = GeneratorConfig::default();
        for seed in 0..50 {
            let mut fixture = Fixture::new(seed);
            let budget = PassionBudget::roll(&config, &mut fixture.rng);
            let spent = budget.major as f32 * 1.5 + budget.minor as f32;
            assert!(spent <= 9.0 + 1e-4);
            assert!(spent > 0.0);
        }
    }

    #[test]
    fn test_newborns_have_blank_skills() {
        let mut fixture = Fixture::new(42);
        let tables = fixture.tables.clone();
        let archetype = tables.archetype("Colonist").unwrap();
        let race = tables.race("Human").unwrap();
        let mut pawn = Pawn::blank(PawnId(1), "Colonist", "Human");
        let request = GenerationRequest {
            allowed_stages: crate::pawn::DevelopmentalStages::only(crate::pawn::DevelopmentalStage::Newborn),
            ..GenerationRequest::new("Colonist")
        };
        let mut ctx = fixture.ctx();
        generate_skills(&mut ctx, &mut pawn, &request, archetype, race);
        assert_eq!(pawn.skills.total_levels(), 0);
        assert!(pawn.skills.iter().all(|r| r.passion == Passion::None));
    }
}
