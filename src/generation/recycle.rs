//! Recycling free world pawns
//!
//! Before a pawn is synthesized the free pool is searched for one that
//! already satisfies the request's hard constraints. A match is redressed in
//! place: its identity, age and relations survive, while archetype, faction,
//! gear and stale conditions are brought up to date.

use rand::Rng;
use tracing::{debug, info};

use crate::data::{ArchetypeDef, ConditionKind, Orientation, RaceDef, RuleTables, BASELINER};
use crate::generation::checks::{run_checks, CheckEnv, POST_GEAR_CHECKS, PRE_GEAR_CHECKS};
use crate::generation::generator::GenerationContext;
use crate::generation::relax::RelaxationTier;
use crate::generation::request::GenerationRequest;
use crate::generation::scenario::ScenarioPolicy;
use crate::generation::session::Origin;
use crate::generation::stages::age::effective_stages;
use crate::generation::stages::{gear, health, identity};
use crate::pawn::{MindState, Needs, Pawn, PawnId};
use crate::rand_util::{chance, try_random_element_by_weight};
use crate::registry::{PawnRegistry, PawnSituation};

/// Weight of unseen pawns that carry relations; tangled histories stay in the pool.
const TANGLED_HISTORY_WEIGHT: f32 = 0.1;

/// Which subset of the pool a recycling pass searches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PoolTier {
    Reserved,
    FormerColonists,
    Free,
}

/// The candidate as it would look once redressed for `archetype`, for checks
/// that read archetype data off the pawn.
fn preview(pawn: &Pawn, request: &GenerationRequest, archetype: &ArchetypeDef) -> Pawn {
    let mut preview = pawn.clone();
    preview.archetype = archetype.name.clone();
    if request.faction.is_some() {
        preview.faction = request.faction.clone();
    }
    preview
}

fn violates_identity(pawn: &Pawn, request: &GenerationRequest, race: &RaceDef, tables: &RuleTables, policy: &dyn ScenarioPolicy) -> Option<String> {
    let years = pawn.age.biological_years();
    let stages = effective_stages(request, policy.difficulty().children_allowed);
    if !stages.contains(race.stage_for_age(years)) {
        return Some("developmental stage not allowed".into());
    }
    if let Some(fixed) = request.fixed_biological_age {
        if pawn.age.biological_years_floor() != fixed.floor() as u32 {
            return Some("biological age differs from fixed age".into());
        }
    }
    if let Some(fixed) = request.fixed_chronological_age {
        if pawn.age.chronological_years_floor() != fixed.floor() as u32 {
            return Some("chronological age differs from fixed age".into());
        }
    }
    if request.biological_age_range.map_or(false, |r| !r.includes(years)) {
        return Some("biological age outside range".into());
    }
    if request.excluded_biological_age_range.map_or(false, |r| r.includes(years)) {
        return Some("biological age in excluded range".into());
    }
    if request.fixed_gender.map_or(false, |g| g != pawn.gender) {
        return Some("gender differs".into());
    }
    if let Some(last) = &request.fixed_last_name {
        if pawn.last_name() != Some(last.as_str()) {
            return Some("last name differs".into());
        }
    }
    if !request.can_generate_relations && !pawn.relations.is_empty() {
        return Some("has relations".into());
    }
    if !request.allow_gay && pawn.traits.has_orientation(Orientation::Gay, tables) {
        return Some("gay orientation prohibited".into());
    }
    None
}

fn violates_traits_and_health(pawn: &Pawn, request: &GenerationRequest, archetype: &ArchetypeDef, tables: &RuleTables) -> Option<String> {
    if let Some(held) = pawn.traits.iter().find(|t| request.prohibits_trait(&t.def) || archetype.disallows_trait(&t.def)) {
        return Some(format!("holds prohibited trait {}", held.def));
    }
    if let Some(missing) = request.forced_traits.iter().find(|t| !pawn.traits.has(t)) {
        return Some(format!("lacks forced trait {}", missing));
    }
    if !request.allow_addictions && pawn.health.has_kind(ConditionKind::Addiction) {
        return Some("addicted".into());
    }
    if !request.allow_pregnant && pawn.health.has_kind(ConditionKind::Pregnancy) {
        return Some("pregnant".into());
    }
    if pawn.health.is_bleeding(tables) {
        return Some("bleeding".into());
    }
    if pawn.is_dead(tables) && !(request.allow_dead || request.force_dead) {
        return Some("dead".into());
    }
    None
}

fn violates_genes(pawn: &Pawn, request: &GenerationRequest, tables: &RuleTables) -> Option<String> {
    let xenotype = pawn.genes.as_ref().map_or(BASELINER, |g| g.xenotype.as_str());
    if request.forced_xenotype.as_deref().map_or(false, |x| x != xenotype) {
        return Some(format!("xenotype {} is not the forced one", xenotype));
    }
    let has_gene = |gene: &String| pawn.genes.as_ref().map_or(false, |g| g.has_gene(gene));
    if let Some(gene) = request.forced_xenogenes.iter().chain(request.forced_endogenes.iter()).find(|g| !has_gene(*g)) {
        return Some(format!("lacks forced gene {}", gene));
    }
    if !request.allowed_xenotypes.is_empty() {
        let baseliner_ok = request.force_baseliner_chance > 0.0 && xenotype == BASELINER;
        if !baseliner_ok && !request.allowed_xenotypes.iter().any(|x| x == xenotype) {
            return Some(format!("xenotype {} not allowed", xenotype));
        }
    }
    if request.must_be_capable_of_violence
        && !tables.xenotypes.get(xenotype).map_or(true, |x| x.can_generate_as_combatant)
    {
        return Some(format!("xenotype {} cannot fight", xenotype));
    }
    None
}

/// Why `pawn` cannot be recycled for `request`, or `None` when it can.
pub fn rejection_reason(
    pawn: &Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    tables: &RuleTables,
    policy: &dyn ScenarioPolicy,
) -> Option<String> {
    let race = match tables.race(&archetype.race) {
        Some(r) if r.name == pawn.race => r,
        _ => return Some(format!("race {} does not match", pawn.race)),
    };
    let faction_ok = request.world_faction_doesnt_matter || pawn.faction == request.faction;
    if !faction_ok {
        return Some("belongs to another faction".into());
    }
    if let Some(reason) = violates_identity(pawn, request, race, tables, policy)
        .or_else(|| violates_traits_and_health(pawn, request, archetype, tables))
        .or_else(|| violates_genes(pawn, request, tables))
    {
        return Some(reason);
    }

    let preview = preview(pawn, request, archetype);
    let env = CheckEnv {
        pawn: &preview,
        request,
        tables,
        policy,
        allows_dead: request.allow_dead || request.force_dead,
        allows_downed: request.allow_downed,
        redressing: true,
    };
    if let Err(failure) = run_checks(PRE_GEAR_CHECKS, &env, RelaxationTier::Strict)
        .and_then(|_| run_checks(POST_GEAR_CHECKS, &env, RelaxationTier::Strict))
    {
        return Some(failure.to_string());
    }
    match &request.redress_validator {
        Some(p) if !p.check(&preview) => Some(format!("rejected by {}", p.name)),
        _ => None,
    }
}

fn weight(pawn: &Pawn, tables: &RuleTables) -> f32 {
    let flesh = tables.race(&pawn.race).map_or(false, |r| r.flesh);
    if flesh && !pawn.ever_seen_by_player && !pawn.relations.is_empty() {
        TANGLED_HISTORY_WEIGHT
    } else {
        1.0
    }
}

fn pool(world: &PawnRegistry, request: &GenerationRequest, archetype: &ArchetypeDef, tier: PoolTier) -> Vec<PawnId> {
    match tier {
        PoolTier::Reserved => request
            .inhabitant_of
            .as_deref()
            .map(|s| world.free_inhabitants_of(s))
            .unwrap_or_default(),
        PoolTier::FormerColonists => world
            .ids_in(PawnSituation::Free)
            .into_iter()
            .filter(|id| world.get(*id).map_or(false, |p| p.ever_colonist))
            .collect(),
        PoolTier::Free => {
            let mut ids = world.ids_in(PawnSituation::Free);
            if archetype.faction_leader {
                ids.extend(world.ids_in(PawnSituation::FactionLeader));
            }
            ids
        }
    }
}

fn pick<R: Rng>(ctx: &mut GenerationContext<'_, R>, request: &GenerationRequest, archetype: &ArchetypeDef, tier: PoolTier) -> Option<PawnId> {
    let tables = ctx.tables;
    let world: &PawnRegistry = &*ctx.world;
    let mut ids = pool(world, request, archetype, tier);
    ids.sort();
    ids.dedup();
    let weighted: Vec<(PawnId, f32)> = ids
        .into_iter()
        .filter(|id| !ctx.sessions.is_being_generated(*id))
        .filter_map(|id| world.get(id))
        .filter(|p| match rejection_reason(p, request, archetype, tables, ctx.policy) {
            Some(reason) => {
                debug!(pawn = %p.id, ?tier, %reason, "not recyclable");
                false
            }
            None => true,
        })
        .map(|p| (p.id, weight(p, tables)))
        .collect();
    try_random_element_by_weight(&weighted, |(_, w)| *w, ctx.rng).map(|(id, _)| *id)
}

/// A recycled pawn keeps its beliefs unless the request fixes them or it
/// moved to a faction that does not hold them.
fn needs_new_ideology(pawn: &Pawn, previous_faction: Option<&str>, request: &GenerationRequest, tables: &RuleTables) -> bool {
    if let Some(fixed) = &request.fixed_ideology {
        return pawn.ideology.as_ref() != Some(fixed);
    }
    if pawn.faction.as_deref() == previous_faction {
        return false;
    }
    let held = match &pawn.ideology {
        Some(ideo) => ideo,
        None => return true,
    };
    !pawn
        .faction
        .as_deref()
        .and_then(|f| tables.faction(f))
        .map_or(false, |f| f.ideologies.contains(held))
}

/// Bring a recycled pawn up to date for its new role.
fn redress<R: Rng>(ctx: &mut GenerationContext<'_, R>, pawn: &mut Pawn, days_in_pool: f32, request: &GenerationRequest, archetype: &ArchetypeDef) {
    let tables = ctx.tables;
    {
        let rng = &mut *ctx.rng;
        pawn.health.retain(|c| {
            let Some(def) = tables.conditions.get(&c.def) else {
                return true;
            };
            if !def.remove_on_redress_if_not_of_archetype.is_empty()
                && !def.remove_on_redress_if_not_of_archetype.contains(&archetype.name)
            {
                return false;
            }
            let odds = def.remove_on_redress_chance_by_days.as_ref().map_or(0.0, |c| c.evaluate(days_in_pool));
            !chance(rng, odds)
        });
    }

    pawn.archetype = archetype.name.clone();
    if let Some(genes) = pawn.genes.as_mut() {
        genes.remove_where(|g| tables.genes.get(g).map_or(false, |d| d.remove_on_redress));
    }
    let previous_faction = pawn.faction.clone();
    if request.faction.is_some() || !request.world_faction_doesnt_matter {
        pawn.faction = request.faction.clone();
    }
    if needs_new_ideology(pawn, previous_faction.as_deref(), request, tables) {
        identity::assign_ideology(pawn, request, tables, ctx.rng);
    }

    if let Some(race) = tables.race(&pawn.race) {
        gear::generate_gear(ctx, pawn, request, archetype, race);
    }
    health::add_ideology_scars(pawn, tables, ctx.rng);
    pawn.needs = Needs::default();
    pawn.mind_state = MindState::default();

    if request.force_dead {
        pawn.health.killed = true;
    }
    let player = pawn
        .faction
        .as_deref()
        .and_then(|f| tables.faction(f))
        .map_or(false, |f| f.is_player);
    if player {
        pawn.ever_colonist = true;
        pawn.ever_seen_by_player = true;
    } else {
        pawn.health.tend_all(tables);
    }
}

/// Take a matching pawn from the pool, or `None` to fall through to
/// synthesis. Never creates a pawn.
pub fn try_recycle<R: Rng>(ctx: &mut GenerationContext<'_, R>, request: &GenerationRequest, archetype: &ArchetypeDef) -> Option<PawnId> {
    let mut tiers = vec![PoolTier::Reserved];
    if request.redress_former_colonist {
        tiers.push(PoolTier::FormerColonists);
    }
    let odds = ctx.config.recycle_chance(ctx.world.free_count(), request.min_recycle_chance);
    if chance(ctx.rng, odds) {
        tiers.push(PoolTier::Free);
    }

    let (id, tier) = tiers.into_iter().find_map(|tier| pick(ctx, request, archetype, tier).map(|id| (id, tier)))?;

    let situation = ctx.world.situation(id)?;
    let became_free_tick = ctx.world.became_free_tick(id);
    let days = ctx.world.days_in_pool(id);
    let previous = ctx.world.get(id)?.clone();

    let mut pawn = previous.clone();
    redress(ctx, &mut pawn, days, request, archetype);
    let label = pawn.label();
    if let Some(slot) = ctx.world.get_mut(id) {
        *slot = pawn;
    }
    ctx.world.set_situation(id, PawnSituation::InPlay);
    if let Some(settlement) = &request.inhabitant_of {
        ctx.world.record_inhabitant(settlement, id);
    }
    ctx.sessions.absorb_recycled(id, Origin::Recycled { previous: Box::new(previous), situation, became_free_tick });
    info!(pawn = %id, name = %label, ?tier, days_in_pool = days, archetype = %archetype.name, "recycled world pawn");
    Some(id)
}
