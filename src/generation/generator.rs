//! Pipeline orchestrator
//!
//! `generate` first tries to recycle a free world pawn. Failing that it runs
//! the stage pipeline in a retry loop, relaxing scenario and caller checks as
//! attempts accumulate. Every attempt owns a session on the stack; a rejected
//! attempt takes everything it spawned down with it.

use rand::Rng;
use tracing::{debug, info, warn};

use crate::data::{ArchetypeDef, RaceDef, RuleTables};
use crate::generation::checks::{run_checks, Check, CheckEnv, POST_GEAR_CHECKS, PRE_GEAR_CHECKS};
use crate::generation::config::GeneratorConfig;
use crate::generation::error::{CheckFailure, GenerationError};
use crate::generation::recycle::try_recycle;
use crate::generation::relax::RelaxationTier;
use crate::generation::request::GenerationRequest;
use crate::generation::scenario::{DefaultScenario, ScenarioPolicy};
use crate::generation::session::{discard, SessionStack};
use crate::generation::stages::{age, gear, genes, health, identity, relations, skills, traits};
use crate::pawn::{Pawn, PawnId};
use crate::registry::{PawnRegistry, PawnSituation};

/// How the last top-level `generate` call ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Pipeline attempts used; 0 when the pawn was recycled.
    pub attempts: u32,
    pub tier: RelaxationTier,
    pub recycled: bool,
}

/// Everything one generation call reads and mutates.
///
/// The same context is threaded through recursive calls made by the
/// relation stage, so nested pawns share the session stack and RNG stream.
pub struct GenerationContext<'a, R: Rng> {
    pub tables: &'a RuleTables,
    pub config: &'a GeneratorConfig,
    pub policy: &'a dyn ScenarioPolicy,
    pub world: &'a mut PawnRegistry,
    pub rng: &'a mut R,
    pub sessions: SessionStack,
    /// Recoverable problems met along the way, e.g. exhausted sampling.
    pub diagnostics: Vec<GenerationError>,
    pub last_run: Option<RunSummary>,
}

impl<'a, R: Rng> GenerationContext<'a, R> {
    pub fn new(
        tables: &'a RuleTables,
        config: &'a GeneratorConfig,
        policy: &'a dyn ScenarioPolicy,
        world: &'a mut PawnRegistry,
        rng: &'a mut R,
    ) -> Self {
        GenerationContext {
            tables,
            config,
            policy,
            world,
            rng,
            sessions: SessionStack::default(),
            diagnostics: Vec::new(),
            last_run: None,
        }
    }
}

fn check<R: Rng>(
    ctx: &GenerationContext<'_, R>,
    pawn: &Pawn,
    request: &GenerationRequest,
    checks: &[Check],
    tier: RelaxationTier,
) -> Result<(), CheckFailure> {
    let (allows_dead, allows_downed) = ctx
        .sessions
        .innermost()
        .map_or((request.allow_dead, request.allow_downed), |s| (s.allows_dead, s.allows_downed));
    let env = CheckEnv {
        pawn,
        request,
        tables: ctx.tables,
        policy: ctx.policy,
        allows_dead,
        allows_downed,
        redressing: false,
    };
    run_checks(checks, &env, tier)
}

/// One attempt at a fresh pawn, stages in their fixed order.
fn run_pipeline<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    id: PawnId,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
    tier: RelaxationTier,
) -> Result<Pawn, CheckFailure> {
    let tables = ctx.tables;
    let mut pawn = Pawn::blank(id, &archetype.name, &race.name);
    pawn.faction = request.faction.clone();

    identity::assign_gender(&mut pawn, request, archetype, race, ctx.rng);
    age::generate_age(ctx, &mut pawn, request, archetype, race);
    identity::assign_name(&mut pawn, request, tables, ctx.rng);
    identity::assign_backstories(&mut pawn, request, archetype, tables, ctx.rng);
    identity::assign_ideology(&mut pawn, request, tables, ctx.rng);
    relations::apply_preset_relations(&mut pawn, &request.preset_relations, tables);
    traits::generate_traits(ctx, &mut pawn, request, archetype, race);
    skills::generate_skills(ctx, &mut pawn, request, archetype, race);
    genes::generate_genes(ctx, &mut pawn, request, archetype, race);
    relations::generate_relations(ctx, &mut pawn, request, archetype, race);

    check(ctx, &pawn, request, PRE_GEAR_CHECKS, tier)?;

    gear::generate_gear(ctx, &mut pawn, request, archetype, race);
    health::generate_health(ctx, &mut pawn, request, archetype, race);

    check(ctx, &pawn, request, POST_GEAR_CHECKS, tier)?;
    Ok(pawn)
}

fn commit<R: Rng>(ctx: &mut GenerationContext<'_, R>, mut pawn: Pawn, request: &GenerationRequest) {
    let tables = ctx.tables;
    let player = pawn
        .faction
        .as_deref()
        .and_then(|f| tables.faction(f))
        .map_or(false, |f| f.is_player);
    if player {
        pawn.ever_colonist = true;
        pawn.ever_seen_by_player = true;
    }
    let id = pawn.id;
    ctx.world.commit(pawn, PawnSituation::InPlay, tables);
    if let Some(settlement) = &request.inhabitant_of {
        ctx.world.record_inhabitant(settlement, id);
    }
}

/// Produce a pawn for `request`, recycled or new.
///
/// The pawn is committed to the registry and its id returned. Nested calls
/// made while another generation is in flight attach their pawns to the
/// caller's session.
pub fn generate<R: Rng>(ctx: &mut GenerationContext<'_, R>, request: &GenerationRequest) -> Result<PawnId, GenerationError> {
    let mut request = request.clone();
    request.validate_and_fix();

    let tables = ctx.tables;
    let archetype = tables
        .archetype(&request.archetype)
        .ok_or_else(|| GenerationError::unknown("archetype", &request.archetype))?;
    let race = tables
        .race(&archetype.race)
        .ok_or_else(|| GenerationError::unknown("race", &archetype.race))?;
    if let Some(faction) = &request.faction {
        if tables.faction(faction).is_none() {
            return Err(GenerationError::unknown("faction", faction));
        }
    }

    if !request.force_generate_new && !request.is_newborn() {
        if let Some(id) = try_recycle(ctx, &request, archetype) {
            ctx.last_run = Some(RunSummary { attempts: 0, tier: RelaxationTier::Strict, recycled: true });
            return Ok(id);
        }
    }

    let max_attempts = ctx.config.max_attempts;
    let mut tier = RelaxationTier::Strict;
    let mut last_failure: Option<CheckFailure> = None;
    for attempt in 1..=max_attempts {
        let next = ctx.config.tier_for(attempt);
        if next != tier {
            info!(attempt, from = ?tier, to = ?next, archetype = %archetype.name, "relaxing constraints");
            tier = next;
        }

        let id = ctx.world.reserve_id();
        ctx.sessions.push(id, request.allow_dead || request.force_dead, request.allow_downed);
        let result = run_pipeline(ctx, id, &request, archetype, race, tier);
        let session = ctx.sessions.pop();

        match result {
            Ok(pawn) => {
                let label = pawn.label();
                commit(ctx, pawn, &request);
                if let Some(session) = session {
                    ctx.sessions.absorb_committed(session);
                }
                ctx.last_run = Some(RunSummary { attempts: attempt, tier, recycled: false });
                debug!(pawn = %id, name = %label, attempt, depth = ctx.sessions.depth(), "pawn generated");
                return Ok(id);
            }
            Err(failure) => {
                debug!(attempt, check = failure.check, reason = %failure.reason, "candidate rejected");
                if let Some(session) = session {
                    let purged = discard(session, ctx.world);
                    if !purged.is_empty() {
                        debug!(attempt, count = purged.len(), "discarded pawns spawned by rejected candidate");
                    }
                }
                ctx.world.purge(&[id]);
                last_failure = Some(failure);
            }
        }
    }

    let last_failure = last_failure.map(|f| f.to_string()).unwrap_or_default();
    warn!(archetype = %archetype.name, attempts = max_attempts, %last_failure, "pawn generation failed");
    Err(GenerationError::RetriesExhausted { attempts: max_attempts, last_failure })
}

/// Owns the rule tables, configuration, scenario policy and world for
/// callers that do not manage those themselves.
pub struct PawnGenerator {
    tables: RuleTables,
    config: GeneratorConfig,
    policy: Box<dyn ScenarioPolicy>,
    world: PawnRegistry,
    diagnostics: Vec<GenerationError>,
}

impl PawnGenerator {
    pub fn new(tables: RuleTables, config: GeneratorConfig) -> Self {
        PawnGenerator {
            tables,
            config,
            policy: Box::new(DefaultScenario::default()),
            world: PawnRegistry::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: impl ScenarioPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn with_world(mut self, world: PawnRegistry) -> Self {
        self.world = world;
        self
    }

    pub fn tables(&self) -> &RuleTables {
        &self.tables
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn world(&self) -> &PawnRegistry {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PawnRegistry {
        &mut self.world
    }

    pub fn pawn(&self, id: PawnId) -> Option<&Pawn> {
        self.world.get(id)
    }

    /// Recoverable problems from the most recent call.
    pub fn diagnostics(&self) -> &[GenerationError] {
        &self.diagnostics
    }

    pub fn generate<R: Rng>(&mut self, request: &GenerationRequest, rng: &mut R) -> Result<PawnId, GenerationError> {
        let mut ctx = GenerationContext::new(&self.tables, &self.config, self.policy.as_ref(), &mut self.world, rng);
        let result = generate(&mut ctx, request);
        self.diagnostics = ctx.diagnostics;
        result
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::RelationKind;
    use crate::generation::request::{PawnPredicate, PresetRelation, SpawnContext};
    use crate::generation::scenario::{Difficulty, ScenarioRules};
    use crate::pawn::Gender;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Default tables, config, policy and an empty world
    pub(crate) struct Fixture {
        pub tables: RuleTables,
        pub config: GeneratorConfig,
        pub policy: DefaultScenario,
        pub world: PawnRegistry,
        pub rng: ChaCha8Rng,
    }

    impl Fixture {
        pub fn new(seed: u64) -> Self {
            Fixture {
                tables: RuleTables::defaults(),
                config: GeneratorConfig::default(),
                policy: DefaultScenario::default(),
                world: PawnRegistry::default(),
                rng: ChaCha8Rng::seed_from_u64(seed),
            }
        }

        pub fn ctx(&mut self) -> GenerationContext<'_, ChaCha8Rng> {
            GenerationContext::new(&self.tables, &self.config, &self.policy, &mut self.world, &mut self.rng)
        }
    }

    #[test]
    fn test_generates_and_commits() {
        let mut fixture = Fixture::new(42);
        let request = GenerationRequest { faction: Some("PlayerColony".into()), ..GenerationRequest::new("Colonist") };
        let mut ctx = fixture.ctx();
        let id = generate(&mut ctx, &request).unwrap();
        assert!(ctx.sessions.is_empty());
        assert_eq!(ctx.world.situation(id), Some(PawnSituation::InPlay));
        let pawn = ctx.world.get(id).unwrap();
        assert!(pawn.ever_colonist && pawn.ever_seen_by_player);
        assert!(pawn.name.is_some());
        assert!(pawn.age.biological_years() >= 13.0);
        let run = ctx.last_run.unwrap();
        assert!(!run.recycled);
        assert!(run.attempts >= 1);
    }

    #[test]
    fn test_unknown_defs_are_rejected_up_front() {
        let mut fixture = Fixture::new(42);
        let mut ctx = fixture.ctx();
        let err = generate(&mut ctx, &GenerationRequest::new("Astronaut")).unwrap_err();
        assert!(matches!(err, GenerationError::UnknownDef { kind: "archetype", .. }));
        let bad_faction = GenerationRequest { faction: Some("Empire".into()), ..GenerationRequest::new("Colonist") };
        let err = generate(&mut ctx, &bad_faction).unwrap_err();
        assert!(matches!(err, GenerationError::UnknownDef { kind: "faction", .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_caller_validator_is_dropped_at_its_threshold() {
        let mut fixture = Fixture::new(42);
        let request = GenerationRequest {
            validator_pre_gear: Some(PawnPredicate::new("never", |_| false)),
            ..GenerationRequest::new("Colonist")
        };
        let mut ctx = fixture.ctx();
        let id = generate(&mut ctx, &request).unwrap();
        assert!(ctx.world.contains(id));
        let run = ctx.last_run.unwrap();
        assert_eq!(run.attempts, 100);
        assert_eq!(run.tier, RelaxationTier::IgnoreValidator);
        assert_eq!(ctx.world.len(), 1);
    }

    #[test]
    fn test_scenario_rules_are_dropped_before_the_validator() {
        let mut fixture = Fixture::new(42);
        let rules = ScenarioRules {
            required_gender: Some(Gender::Female),
            ..ScenarioRules::default()
        };
        let request = GenerationRequest {
            fixed_gender: Some(Gender::Male),
            context: SpawnContext::PlayerStarter,
            ..GenerationRequest::new("Colonist")
        };
        let mut ctx = GenerationContext::new(&fixture.tables, &fixture.config, &rules, &mut fixture.world, &mut fixture.rng);
        let id = generate(&mut ctx, &request).unwrap();
        let run = ctx.last_run.unwrap();
        assert_eq!(run.attempts, 70);
        assert_eq!(run.tier, RelaxationTier::IgnoreScenarioConstraints);
        assert_eq!(ctx.world.get(id).unwrap().gender, Gender::Male);
    }

    #[test]
    fn test_exhaustion_is_reported_and_leaves_nothing_behind() {
        let mut fixture = Fixture::new(42);
        fixture.config = GeneratorConfig { max_attempts: 5, ..GeneratorConfig::default() };
        let request = GenerationRequest {
            validator_post_gear: Some(PawnPredicate::new("never", |_| false)),
            ..GenerationRequest::new("Colonist")
        };
        let mut ctx = fixture.ctx();
        match generate(&mut ctx, &request) {
            Err(GenerationError::RetriesExhausted { attempts, last_failure }) => {
                assert_eq!(attempts, 5);
                assert!(last_failure.contains("caller_post_gear"));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert!(ctx.world.is_empty());
        assert!(ctx.sessions.is_empty());
    }

    #[test]
    fn test_leaders_and_inhabitants_are_recorded() {
        let mut fixture = Fixture::new(42);
        let request = GenerationRequest {
            faction: Some("PirateGang".into()),
            inhabitant_of: Some("Redhold".into()),
            context: SpawnContext::NonPlayer,
            ..GenerationRequest::new("PirateBoss")
        };
        let mut ctx = fixture.ctx();
        let id = generate(&mut ctx, &request).unwrap();
        assert_eq!(ctx.world.situation(id), Some(PawnSituation::InPlay));
        assert!(ctx.world.get(id).unwrap().traits.has("Bloodlust"));
        ctx.world.set_situation(id, PawnSituation::Free);
        assert_eq!(ctx.world.free_inhabitants_of("Redhold"), vec![id]);
    }

    #[test]
    fn test_committed_leader_is_not_handed_out_again() {
        let mut generator = PawnGenerator::new(RuleTables::defaults(), GeneratorConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let request = GenerationRequest {
            faction: Some("PirateGang".into()),
            min_recycle_chance: 1.0,
            ..GenerationRequest::new("PirateBoss")
        };
        let first = generator.generate(&request, &mut rng).unwrap();
        let second = generator.generate(&request, &mut rng).unwrap();
        assert_ne!(first, second);
        assert_eq!(generator.world().situation(first), Some(PawnSituation::InPlay));
        assert_eq!(generator.world().situation(second), Some(PawnSituation::InPlay));
        assert!(generator.world().len() >= 2);
    }

    #[test]
    fn test_preset_relations_are_mirrored() {
        let mut fixture = Fixture::new(42);
        let mut ctx = fixture.ctx();
        let husband = generate(
            &mut ctx,
            &GenerationRequest { fixed_gender: Some(Gender::Male), can_generate_relations: false, ..GenerationRequest::new("Villager") },
        )
        .unwrap();
        let wife_request = GenerationRequest {
            fixed_gender: Some(Gender::Female),
            force_generate_new: true,
            preset_relations: vec![PresetRelation { kind: RelationKind::Spouse, other: husband }],
            ..GenerationRequest::new("Villager")
        };
        let wife = generate(&mut ctx, &wife_request).unwrap();
        let husband_pawn = ctx.world.get(husband).unwrap();
        assert!(husband_pawn.relations_with(wife).any(|r| r.kind == RelationKind::Spouse));
    }

    #[test]
    fn test_children_disallowed_forces_adults() {
        let mut fixture = Fixture::new(42);
        fixture.policy = DefaultScenario { difficulty: Difficulty { children_allowed: false } };
        let request = GenerationRequest {
            allowed_stages: crate::pawn::DevelopmentalStages::child_or_adult(),
            ..GenerationRequest::new("Colonist")
        };
        for _ in 0..10 {
            let mut ctx = fixture.ctx();
            let id = generate(&mut ctx, &request).unwrap();
            assert!(ctx.world.get(id).unwrap().age.biological_years() >= 13.0);
        }
    }

    #[test]
    fn test_facade_keeps_its_world() {
        let mut generator = PawnGenerator::new(RuleTables::defaults(), GeneratorConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let a = generator.generate(&GenerationRequest::new("Villager"), &mut rng).unwrap();
        let b = generator.generate(&GenerationRequest::new("Tribesperson"), &mut rng).unwrap();
        assert_ne!(a, b);
        assert!(generator.pawn(a).is_some() && generator.pawn(b).is_some());
        assert!(generator.world().len() >= 2);
    }
}
