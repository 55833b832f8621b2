//! Biological and chronological age

use rand::Rng;
use tracing::warn;

use crate::curve::IntRange;
use crate::data::{ArchetypeDef, RaceDef};
use crate::generation::error::GenerationError;
use crate::generation::generator::GenerationContext;
use crate::generation::request::GenerationRequest;
use crate::pawn::{AgeTracker, DevelopmentalStage, DevelopmentalStages, Pawn};
use crate::rand_util::{chance, range_f32};

/// Stasis gaps: most are short, a quarter long, the rest ancient.
const STASIS_SHORT_CHANCE: f32 = 0.7;
const STASIS_LONG_CHANCE: f32 = 0.95;

/// Stages the age sampler may land in. Difficulty can forbid children
/// whenever an adult is acceptable instead.
pub fn effective_stages(request: &GenerationRequest, children_allowed: bool) -> DevelopmentalStages {
    let stages = request.allowed_stages;
    if children_allowed || !stages.contains(DevelopmentalStage::Adult) {
        return stages;
    }
    stages
        .iter()
        .filter(|s| !matches!(s, DevelopmentalStage::Baby | DevelopmentalStage::Child))
        .fold(DevelopmentalStages::EMPTY, |acc, s| acc.with(s))
}

fn age_allowed(
    years: f32,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
    stages: DevelopmentalStages,
) -> bool {
    years <= archetype.max_generation_age
        && years >= archetype.min_generation_age
        && stages.contains(race.stage_for_age(years))
        && !request.excluded_biological_age_range.map_or(false, |r| r.includes(years))
        && request.biological_age_range.map_or(true, |r| r.includes(years))
}

/// Closest admissible value to a rejected sample.
fn best_effort(
    years: f32,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
    stages: DevelopmentalStages,
) -> f32 {
    let stage_min = stages.iter().map(|s| race.stage_min_age(s)).fold(f32::MAX, f32::min);
    let mut lo = archetype.min_generation_age.max(if stage_min == f32::MAX { 0.0 } else { stage_min });
    let mut hi = archetype.max_generation_age;
    if let Some(range) = request.biological_age_range {
        lo = lo.max(range.min);
        hi = hi.min(range.max);
    }
    if lo > hi {
        lo
    } else {
        years.clamp(lo, hi)
    }
}

fn sample_biological<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
    stages: DevelopmentalStages,
) -> f32 {
    let baby_only = stages == DevelopmentalStages::only(DevelopmentalStage::Baby);
    let curve = race.age_curve();
    let tries = ctx.config.age_sampling_tries;

    let mut years = 0.0;
    for _ in 0..tries {
        years = if baby_only {
            range_f32(ctx.rng, 1.0, race.child_min_age)
        } else {
            curve.sample_density(ctx.rng)
        };
        if age_allowed(years, request, archetype, race, stages) {
            return years;
        }
    }

    let fallback = best_effort(years, request, archetype, race, stages);
    warn!(
        archetype = %archetype.name,
        tries,
        fallback,
        "no biological age satisfied the constraints"
    );
    ctx.diagnostics.push(GenerationError::AgeSamplingExhausted { tries });
    fallback
}

/// Years spent in stasis on top of biological age.
fn stasis_gap<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    biological: f32,
) -> f32 {
    if !(request.certainly_been_in_stasis || chance(ctx.rng, archetype.stasis_commonality)) {
        return 0.0;
    }
    let roll: f32 = ctx.rng.gen();
    if roll < STASIS_SHORT_CHANCE {
        ctx.rng.gen_range(0..100) as f32
    } else if roll < STASIS_LONG_CHANCE {
        ctx.rng.gen_range(100..1000) as f32
    } else {
        let max = ctx.world.current_year - ctx.config.calendar_origin_year - biological as i32;
        IntRange::new(1000, max).random_in_range(ctx.rng) as f32
    }
}

pub fn generate_age<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &mut Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
) {
    let stages = effective_stages(request, ctx.policy.difficulty().children_allowed);
    let newborn = stages.is_newborn_only();

    let biological = if newborn {
        0.0
    } else if let Some(fixed) = request.fixed_biological_age {
        fixed
    } else {
        sample_biological(ctx, request, archetype, race, stages)
    };

    let chronological = if newborn {
        0.0
    } else if let Some(fixed) = request.fixed_chronological_age {
        fixed
    } else if let Some(range) = archetype.chronological_age_range {
        range.random_in_range(ctx.rng)
    } else {
        biological + stasis_gap(ctx, request, archetype, biological)
    };

    pawn.age = AgeTracker::from_years(biological, chronological);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::FloatRange;
    use crate::data::RuleTables;
    use crate::generation::config::GeneratorConfig;
    use crate::generation::scenario::{DefaultScenario, Difficulty};
    use crate::pawn::PawnId;
    use crate::registry::PawnRegistry;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn run(request: &GenerationRequest, policy: &DefaultScenario, seed: u64) -> (Pawn, Vec<GenerationError>) {
        let tables = RuleTables::defaults();
        let config = GeneratorConfig::default();
        let mut world = PawnRegistry::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut ctx = GenerationContext::new(&tables, &config, policy, &mut world, &mut rng);
        let archetype = tables.archetype(&request.archetype).unwrap();
        let race = tables.race(&archetype.race).unwrap();
        let mut pawn = Pawn::blank(PawnId(1), &archetype.name, &race.name);
        generate_age(&mut ctx, &mut pawn, request, archetype, race);
        let diagnostics = std::mem::take(&mut ctx.diagnostics);
        (pawn, diagnostics)
    }

    #[test]
    fn test_adult_ages_respect_archetype_minimum() {
        let policy = DefaultScenario::default();
        for seed in 0..50 {
            let (pawn, diagnostics) = run(&GenerationRequest::new("Veteran"), &policy, seed);
            assert!(diagnostics.is_empty());
            assert!(pawn.age.biological_years() >= 25.0);
            assert!(pawn.age.biological_ticks <= pawn.age.chronological_ticks);
        }
    }

    #[test]
    fn test_certain_stasis_adds_a_gap() {
        let policy = DefaultScenario::default();
        let request = GenerationRequest {
            certainly_been_in_stasis: true,
            fixed_biological_age: Some(30.0),
            ..GenerationRequest::new("Colonist")
        };
        let mut any_gap = false;
        for seed in 0..20 {
            let (pawn, _) = run(&request, &policy, seed);
            assert_eq!(pawn.age.biological_years_floor(), 30);
            any_gap |= pawn.age.stasis_years() > 0.0;
        }
        assert!(any_gap);
    }

    #[test]
    fn test_impossible_range_falls_back_with_diagnostic() {
        let policy = DefaultScenario::default();
        let request = GenerationRequest {
            biological_age_range: Some(FloatRange::new(500.0, 600.0)),
            ..GenerationRequest::new("Colonist")
        };
        let (pawn, diagnostics) = run(&request, &policy, 42);
        assert!(matches!(diagnostics.as_slice(), [GenerationError::AgeSamplingExhausted { tries: 300 }]));
        assert!((pawn.age.biological_years() - 500.0).abs() < 0.01);
    }

    #[test]
    fn test_newborns_are_zero() {
        let policy = DefaultScenario::default();
        let request = GenerationRequest {
            allowed_stages: DevelopmentalStages::only(DevelopmentalStage::Newborn),
            ..GenerationRequest::new("Colonist")
        };
        let (pawn, _) = run(&request, &policy, 42);
        assert_eq!(pawn.age, AgeTracker::default());
    }

    #[test]
    fn test_difficulty_can_forbid_children() {
        let policy = DefaultScenario { difficulty: Difficulty { children_allowed: false } };
        let request = GenerationRequest {
            allowed_stages: DevelopmentalStages::child_or_adult(),
            ..GenerationRequest::new("Colonist")
        };
        assert_eq!(effective_stages(&request, false), DevelopmentalStages::adult());
        for seed in 0..30 {
            let (pawn, _) = run(&request, &policy, seed);
            assert!(pawn.age.biological_years() >= 13.0);
        }
    }
}
