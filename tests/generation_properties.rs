use pawn_generator::data::{RelationKind, RuleTables};
use pawn_generator::generation::{
    generate, DefaultScenario, GenerationContext, GenerationRequest, GeneratorConfig, PawnGenerator,
    PawnPredicate, PresetRelation, RelaxationTier, SpawnContext,
};
use pawn_generator::pawn::{DevelopmentalStage, DevelopmentalStages, Gender, PawnId, MAX_SKILL_LEVEL};
use pawn_generator::registry::{PawnRegistry, PawnSituation};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn populated_world(seed: u64, count: usize) -> PawnRegistry {
    let mut generator = PawnGenerator::new(RuleTables::defaults(), GeneratorConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let archetypes = ["Villager", "Colonist", "Tribesperson"];
    for i in 0..count {
        let request = GenerationRequest {
            force_generate_new: true,
            ..GenerationRequest::new(archetypes[i % archetypes.len()])
        };
        let id = generator.generate(&request, &mut rng).expect("pool pawn");
        generator.world_mut().set_situation(id, PawnSituation::Free);
    }
    generator.world().clone()
}

/// Ids, situations and relation edges, in id order.
fn world_shape(world: &PawnRegistry) -> Vec<(PawnId, Option<PawnSituation>, Vec<(RelationKind, PawnId)>)> {
    world
        .iter()
        .map(|p| {
            let edges = p.relations.iter().map(|r| (r.kind, r.other)).collect();
            (p.id, world.situation(p.id), edges)
        })
        .collect()
}

#[test]
fn scenario_female_kind_colonist() {
    let mut generator = PawnGenerator::new(RuleTables::defaults(), GeneratorConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let request = GenerationRequest {
        context: SpawnContext::PlayerStarter,
        faction: Some("PlayerColony".into()),
        fixed_gender: Some(Gender::Female),
        forced_traits: vec!["Kind".into()],
        allowed_stages: DevelopmentalStages::only(DevelopmentalStage::Adult),
        ..GenerationRequest::new("Colonist")
    };
    let id = generator.generate(&request, &mut rng).unwrap();
    let pawn = generator.pawn(id).unwrap();
    assert_eq!(pawn.gender, Gender::Female);
    let kind = pawn.traits.get("Kind").expect("forced trait");
    assert!(kind.forced);
    assert!(!pawn.traits.has("Psychopath") && !pawn.traits.has("Abrasive"));
    assert!(pawn.age.biological_years() >= 13.0);
    assert!(pawn.age.biological_ticks <= pawn.age.chronological_ticks);
    let human = generator.tables().race("Human").unwrap();
    assert_eq!(human.stage_for_age(pawn.age.biological_years()), DevelopmentalStage::Adult);
    assert!(pawn.ever_colonist);
}

#[test]
fn scenario_opposite_gender_lover_blocks_prohibited_gay() {
    for seed in 0..10 {
        let mut generator = PawnGenerator::new(RuleTables::defaults(), GeneratorConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let partner_request = GenerationRequest {
            fixed_gender: Some(Gender::Female),
            force_generate_new: true,
            can_generate_relations: false,
            ..GenerationRequest::new("Colonist")
        };
        let partner = generator.generate(&partner_request, &mut rng).unwrap();

        let request = GenerationRequest {
            fixed_gender: Some(Gender::Male),
            force_generate_new: true,
            prohibited_traits: vec!["Gay".into()],
            preset_relations: vec![PresetRelation { kind: RelationKind::Lover, other: partner }],
            ..GenerationRequest::new("Colonist")
        };
        let id = generator.generate(&request, &mut rng).unwrap();
        let pawn = generator.pawn(id).unwrap();
        assert!(!pawn.traits.has("Gay"));
        assert!(pawn.relations.iter().any(|r| r.kind == RelationKind::Lover && r.other == partner));
        let mirrored = generator.pawn(partner).unwrap();
        assert!(mirrored.relations.iter().any(|r| r.kind == RelationKind::Lover && r.other == id));
    }
}

#[test]
fn scenario_empty_pool_still_synthesizes() {
    let tables = RuleTables::defaults();
    let config = GeneratorConfig::default();
    let policy = DefaultScenario::default();
    let mut world = PawnRegistry::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = GenerationContext::new(&tables, &config, &policy, &mut world, &mut rng);

    let request = GenerationRequest { min_recycle_chance: 0.9, ..GenerationRequest::new("Villager") };
    let id = generate(&mut ctx, &request).unwrap();
    let run = ctx.last_run.unwrap();
    assert!(!run.recycled);
    assert!(run.attempts >= 1);
    assert_eq!(ctx.world.situation(id), Some(PawnSituation::InPlay));
}

#[test]
fn scenario_impossible_validator_is_eventually_ignored() {
    let tables = RuleTables::defaults();
    let config = GeneratorConfig::default();
    let policy = DefaultScenario::default();
    let mut world = PawnRegistry::default();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut ctx = GenerationContext::new(&tables, &config, &policy, &mut world, &mut rng);

    let request = GenerationRequest {
        force_generate_new: true,
        validator_post_gear: Some(PawnPredicate::new("never", |_| false)),
        ..GenerationRequest::new("Colonist")
    };
    let id = generate(&mut ctx, &request).unwrap();
    let run = ctx.last_run.unwrap();
    assert_eq!(run.tier, RelaxationTier::IgnoreValidator);
    assert_eq!(run.attempts, config.ignore_validator_from_attempt);
    assert!(ctx.world.contains(id));
    assert!(ctx.sessions.is_empty());
}

#[test]
fn recycling_preserves_fixed_gender() {
    let mut world = populated_world(5, 30);
    let before = world.clone();
    let tables = RuleTables::defaults();
    let config = GeneratorConfig::default();
    let policy = DefaultScenario::default();
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let mut ctx = GenerationContext::new(&tables, &config, &policy, &mut world, &mut rng);

    for _ in 0..5 {
        let request = GenerationRequest {
            fixed_gender: Some(Gender::Female),
            min_recycle_chance: 1.0,
            ..GenerationRequest::new("Villager")
        };
        let id = generate(&mut ctx, &request).unwrap();
        let pawn = ctx.world.get(id).unwrap();
        assert_eq!(pawn.gender, Gender::Female);
        if ctx.last_run.unwrap().recycled {
            let original = before.get(id).expect("recycled pawn came from the pool");
            assert_eq!(original.gender, Gender::Female);
            assert_eq!(pawn.age, original.age);
            assert_eq!(pawn.name, original.name);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn property_biological_age_never_exceeds_chronological(seed in 0_u64..10_000) {
        let mut generator = PawnGenerator::new(RuleTables::defaults(), GeneratorConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let request = GenerationRequest {
            allowed_stages: DevelopmentalStages::child_or_adult(),
            ..GenerationRequest::new("Colonist")
        };
        let id = generator.generate(&request, &mut rng).unwrap();
        let pawn = generator.pawn(id).unwrap();
        prop_assert!(pawn.age.biological_ticks >= 0);
        prop_assert!(pawn.age.biological_ticks <= pawn.age.chronological_ticks);
    }

    #[test]
    fn property_traits_are_exclusive(seed in 0_u64..10_000) {
        let mut generator = PawnGenerator::new(RuleTables::defaults(), GeneratorConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let id = generator.generate(&GenerationRequest::new("Colonist"), &mut rng).unwrap();
        let tables = generator.tables();
        let pawn = generator.pawn(id).unwrap();
        let defs: Vec<_> = pawn.traits.iter().map(|t| tables.trait_def(&t.def).unwrap()).collect();
        for (i, a) in defs.iter().enumerate() {
            for b in &defs[i + 1..] {
                prop_assert!(!a.conflicts_with(b), "{} conflicts with {}", a.name, b.name);
            }
        }
        prop_assert!(defs.iter().filter(|d| d.is_orientation()).count() <= 1);
    }

    #[test]
    fn property_skill_levels_stay_in_bounds(seed in 0_u64..10_000) {
        let mut generator = PawnGenerator::new(RuleTables::defaults(), GeneratorConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let id = generator.generate(&GenerationRequest::new("Pirate"), &mut rng).unwrap();
        let tables = generator.tables();
        let pawn = generator.pawn(id).unwrap();
        for record in pawn.skills.iter() {
            prop_assert!(record.level <= MAX_SKILL_LEVEL);
            if pawn.is_skill_disabled(&record.skill, tables) {
                prop_assert_eq!(record.level, 0);
            }
        }
    }

    #[test]
    fn property_relaxation_only_advances(scenario in 1_u32..80, gap in 0_u32..40, tail in 0_u32..40) {
        let config = GeneratorConfig {
            ignore_scenario_from_attempt: scenario,
            ignore_validator_from_attempt: scenario + gap,
            max_attempts: scenario + gap + tail,
            ..GeneratorConfig::default()
        };
        prop_assert!(config.validate().is_ok());
        let mut previous = RelaxationTier::Strict;
        for attempt in 1..=config.max_attempts {
            let tier = config.tier_for(attempt);
            prop_assert!(tier >= previous);
            previous = tier;
        }
        prop_assert_eq!(config.tier_for(config.ignore_validator_from_attempt), RelaxationTier::IgnoreValidator);
    }

    #[test]
    fn property_rejected_attempts_leave_the_world_untouched(seed in 0_u64..1_000) {
        let mut world = populated_world(seed, 12);
        let before = world_shape(&world);
        let tables = RuleTables::defaults();
        let config = GeneratorConfig {
            max_attempts: 4,
            ignore_scenario_from_attempt: 10,
            ignore_validator_from_attempt: 10,
            ..GeneratorConfig::default()
        };
        let policy = DefaultScenario::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
        let mut ctx = GenerationContext::new(&tables, &config, &policy, &mut world, &mut rng);

        let request = GenerationRequest {
            force_generate_new: true,
            validator_post_gear: Some(PawnPredicate::new("never", |_| false)),
            ..GenerationRequest::new("Colonist")
        };
        prop_assert!(generate(&mut ctx, &request).is_err());
        prop_assert!(ctx.sessions.is_empty());
        prop_assert_eq!(world_shape(&*ctx.world), before);
    }
}
