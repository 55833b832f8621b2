//! Health seeding
//!
//! Conditions are seeded from scratch on every try. A try is kept once the
//! pawn is in a state the request accepts; dead or downed results are only
//! kept when the request allows them.

use rand::Rng;
use tracing::warn;

use crate::curve::SimpleCurve;
use crate::data::{ArchetypeDef, ConditionDef, ConditionKind, RaceDef, RuleTables};
use crate::generation::error::GenerationError;
use crate::generation::generator::GenerationContext;
use crate::generation::request::{GenerationRequest, SpawnContext};
use crate::pawn::{Condition, DevelopmentalStage, Gender, Pawn, PawnId};
use crate::registry::PawnRegistry;
use crate::rand_util::{chance, random_element, range_f32, try_random_element_by_weight};

const OLD_INJURY_SEVERITY: (f32, f32) = (0.2, 0.8);
const CHRONIC_SEVERITY: (f32, f32) = (0.2, 0.8);
const ADDICTION_SEVERITY: (f32, f32) = (0.4, 1.0);

/// Fresh wounds on pawns that spawn outside the player's colony
const FRESH_WOUND_CHANCE: f32 = 0.1;
const FRESH_WOUND_SEVERITY: (f32, f32) = (0.1, 0.5);

/// Per-condition chance of sterilization and of a contraceptive
const CONTRACEPTION_CHANCE: f32 = 0.005;
const CONTRACEPTION_MIN_AGE: f32 = 20.0;

const UNKNOWN_FATHER_CHANCE: f32 = 0.2;

fn scar_chance_by_age() -> SimpleCurve {
    SimpleCurve::from_pairs(&[(5.0, 0.0), (18.0, 1.0)])
}

fn add_new<R: Rng>(pawn: &mut Pawn, def: &ConditionDef, severity: (f32, f32), rng: &mut R) {
    let severity = range_f32(rng, severity.0, severity.1);
    pawn.health.add(Condition::new(&def.name, def.kind, severity));
}

fn of_kind(tables: &RuleTables, kind: ConditionKind) -> Vec<&ConditionDef> {
    tables.conditions.iter().filter(|c| c.kind == kind).collect()
}

fn seed_old_injuries<R: Rng>(pawn: &mut Pawn, race: &RaceDef, tables: &RuleTables, rng: &mut R) {
    let Some(curve) = &race.old_injury_count_by_age else {
        return;
    };
    let expected = curve.evaluate(pawn.age.biological_years()).max(0.0);
    let mut count = expected.floor() as u32;
    if chance(rng, expected.fract()) {
        count += 1;
    }
    let injuries = of_kind(tables, ConditionKind::Injury);
    for _ in 0..count {
        if let Some(def) = random_element(&injuries, rng) {
            add_new(pawn, def, OLD_INJURY_SEVERITY, rng);
        }
    }
}

fn seed_chronic<R: Rng>(pawn: &mut Pawn, tables: &RuleTables, rng: &mut R) {
    let years = pawn.age.biological_years();
    for def in tables.conditions.iter().filter(|c| c.kind == ConditionKind::Chronic) {
        let onset = def.onset_chance_by_age.as_ref().map_or(0.0, |c| c.evaluate(years));
        if chance(rng, onset) {
            add_new(pawn, def, CHRONIC_SEVERITY, rng);
        }
    }
}

fn seed_addiction<R: Rng>(pawn: &mut Pawn, archetype: &ArchetypeDef, tables: &RuleTables, rng: &mut R) {
    if !chance(rng, archetype.addiction_chance) {
        return;
    }
    let addictions = of_kind(tables, ConditionKind::Addiction);
    if let Some(def) = random_element(&addictions, rng) {
        add_new(pawn, def, ADDICTION_SEVERITY, rng);
    }
}

/// Ritual scars the pawn's ideology asks for, up to its required count.
/// Age lowers the odds for each scar; traits that block scarification
/// prevent them entirely.
pub fn add_ideology_scars<R: Rng>(pawn: &mut Pawn, tables: &RuleTables, rng: &mut R) {
    let Some(ideology) = pawn.ideology.as_deref().and_then(|i| tables.ideologies.get(i)) else {
        return;
    };
    let blocked = pawn
        .traits
        .iter()
        .filter_map(|t| tables.trait_def(&t.def))
        .any(|d| d.blocks_scarification);
    let Some(scar) = tables.condition_of_kind(ConditionKind::Scar) else {
        return;
    };
    if blocked {
        return;
    }
    let odds = scar_chance_by_age().evaluate(pawn.age.biological_years());
    let have = pawn.health.count_kind(ConditionKind::Scar) as u32;
    for _ in have..ideology.required_scars {
        if chance(rng, odds) {
            pawn.health.add(Condition::new(&scar.name, scar.kind, 1.0));
        }
    }
}

fn seed_blindness<R: Rng>(pawn: &mut Pawn, tables: &RuleTables, rng: &mut R) {
    let odds = pawn
        .ideology
        .as_deref()
        .and_then(|i| tables.ideologies.get(i))
        .map_or(0.0, |i| i.blindness_chance);
    if pawn.health.has_kind(ConditionKind::Blindness) || !chance(rng, odds) {
        return;
    }
    if let Some(def) = tables.condition_of_kind(ConditionKind::Blindness) {
        pawn.health.add(Condition::new(&def.name, def.kind, 1.0));
    }
}

fn seed_hereditary(pawn: &mut Pawn, tables: &RuleTables) {
    let inherited: Vec<String> = pawn
        .genes
        .iter()
        .flat_map(|g| g.all_genes())
        .filter_map(|g| tables.genes.get(g).and_then(|d| d.hereditary_condition.clone()))
        .collect();
    for name in inherited {
        if pawn.health.has(&name) {
            continue;
        }
        if let Some(def) = tables.conditions.get(&name) {
            pawn.health.add(Condition::new(&def.name, def.kind, 0.5));
        }
    }
}

fn seed_contraception<R: Rng>(pawn: &mut Pawn, tables: &RuleTables, rng: &mut R) {
    if pawn.age.biological_years() < CONTRACEPTION_MIN_AGE {
        return;
    }
    let tribal = pawn
        .childhood
        .iter()
        .chain(pawn.adulthood.iter())
        .filter_map(|b| tables.backstories.get(b))
        .any(|b| b.tribal);
    if tribal {
        return;
    }
    if chance(rng, CONTRACEPTION_CHANCE) {
        if let Some(def) = tables.condition_of_kind(ConditionKind::Sterilized) {
            pawn.health.add(Condition::new(&def.name, def.kind, 1.0));
        }
    }
    if chance(rng, CONTRACEPTION_CHANCE) {
        let gender = pawn.gender;
        let fitting = tables
            .conditions
            .iter()
            .find(|c| c.kind == ConditionKind::Contraceptive && c.gender.map_or(true, |g| g == gender));
        if let Some(def) = fitting {
            pawn.health.add(Condition::new(&def.name, def.kind, 1.0));
        }
    }
}

/// Male partners weighted by how likely the relation is to have fathered a
/// child. `None` stands for an unknown father.
fn pick_father<R: Rng>(pawn: &Pawn, world: &PawnRegistry, tables: &RuleTables, rng: &mut R) -> Option<PawnId> {
    if chance(rng, UNKNOWN_FATHER_CHANCE) {
        return None;
    }
    let candidates: Vec<(PawnId, f32)> = pawn
        .relations
        .iter()
        .filter(|r| world.get(r.other).map_or(false, |o| o.gender == Gender::Male))
        .filter_map(|r| {
            let weight = tables.relation(&r.def).map_or(0.0, |d| d.father_weight);
            (weight > 0.0).then_some((r.other, weight))
        })
        .collect();
    try_random_element_by_weight(&candidates, |(_, w)| *w, rng).map(|(id, _)| *id)
}

fn seed_pregnancy<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &mut Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
) {
    let tables = ctx.tables;
    if pawn.gender != Gender::Female
        || !request.allow_pregnant
        || !ctx.policy.difficulty().children_allowed
        || pawn.health.has_kind(ConditionKind::Sterilized)
        || pawn.health.has_kind(ConditionKind::Contraceptive)
        || pawn.health.has_kind(ConditionKind::Pregnancy)
    {
        return;
    }
    let odds = archetype.pregnancy_chance * race.fertility(Gender::Female, pawn.age.biological_years());
    if !chance(ctx.rng, odds) {
        return;
    }
    let Some(def) = tables.condition_of_kind(ConditionKind::Pregnancy) else {
        return;
    };
    let world: &PawnRegistry = &*ctx.world;
    let father = pick_father(pawn, world, tables, ctx.rng);
    let mut pregnancy = Condition::new(&def.name, def.kind, ctx.rng.gen::<f32>());
    pregnancy.linked_pawn = father;
    pawn.health.add(pregnancy);
}

fn seed<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &mut Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
) {
    if !race.flesh {
        return;
    }
    let tables = ctx.tables;
    let adult = race.stage_for_age(pawn.age.biological_years()) == DevelopmentalStage::Adult;

    seed_old_injuries(pawn, race, tables, ctx.rng);
    seed_chronic(pawn, tables, ctx.rng);
    if request.context != SpawnContext::PlayerStarter && chance(ctx.rng, FRESH_WOUND_CHANCE) {
        let wounds = of_kind(tables, ConditionKind::Wound);
        if let Some(def) = random_element(&wounds, ctx.rng) {
            add_new(pawn, def, FRESH_WOUND_SEVERITY, ctx.rng);
        }
    }
    for part in &archetype.missing_parts {
        if let Some(def) = tables.conditions.get(part) {
            pawn.health.add(Condition::new(&def.name, def.kind, 1.0));
        }
    }
    if request.allow_addictions && adult {
        seed_addiction(pawn, archetype, tables, ctx.rng);
    }
    add_ideology_scars(pawn, tables, ctx.rng);
    seed_blindness(pawn, tables, ctx.rng);
    seed_hereditary(pawn, tables);
    seed_contraception(pawn, tables, ctx.rng);
    if adult {
        seed_pregnancy(ctx, pawn, request, archetype, race);
    }
}

pub fn generate_health<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &mut Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
) {
    let tables = ctx.tables;
    let allows_dead = request.allow_dead || request.force_dead;
    let allows_downed = request.allow_downed || allows_dead;
    let tries = ctx.config.health_seeding_tries;

    let mut settled = false;
    for _ in 0..tries {
        pawn.health.clear();
        seed(ctx, pawn, request, archetype, race);
        let dead = pawn.is_dead(tables);
        if allows_dead || (!dead && (allows_downed || !pawn.is_downed(tables))) {
            settled = true;
            break;
        }
    }
    if !settled {
        warn!(pawn = %pawn.id, tries, "health seeding exhausted, keeping last result");
        ctx.diagnostics.push(GenerationError::HealthSeedingExhausted { tries });
    }

    if request.force_dead {
        pawn.health.killed = true;
    }
    let player = pawn
        .faction
        .as_deref()
        .and_then(|f| tables.faction(f))
        .map_or(false, |f| f.is_player);
    if !player {
        pawn.health.tend_all(tables);
    }
}
