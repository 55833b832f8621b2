//! Family and romantic relations to pawns already in the world
//!
//! A fixed number of (pawn, relation kind) pairs is sampled and weighted by
//! how plausible each pairing is; "no relation" competes with them. At most
//! one blood and one non-blood relation is created. Giving the candidate a
//! sibling with no recorded parents generates those parents on the spot.

use rand::Rng;
use tracing::{debug, warn};

use crate::curve::{FloatRange, SimpleCurve};
use crate::data::{ArchetypeDef, Orientation, RaceDef, RelationDef, RelationKind, RuleTables};
use crate::generation::generator::{generate, GenerationContext};
use crate::generation::request::{GenerationRequest, PresetRelation};
use crate::pawn::relations::has_relation;
use crate::pawn::{DevelopmentalStages, DirectRelation, Gender, Pawn, PawnId};
use crate::rand_util::{random_element, random_element_by_weight_with_default};
use crate::registry::{PawnRegistry, PawnSituation};

/// Youngest age at which romantic relations are generated
const MIN_ROMANCE_AGE: f32 = 16.0;

/// Age differences over which siblings become implausible
const SIBLING_MAX_AGE_DIFF: f32 = 20.0;

/// Parents generated for a new sibling pair are this much older than the
/// elder sibling
const PARENT_AGE_GAP: FloatRange = FloatRange::new(16.0, 45.0);

fn parent_age_gap_curve() -> SimpleCurve {
    SimpleCurve::from_pairs(&[(14.0, 0.0), (16.0, 0.5), (25.0, 1.0), (35.0, 1.0), (50.0, 0.0)])
}

fn romance_age_diff_curve() -> SimpleCurve {
    SimpleCurve::from_pairs(&[(0.0, 1.0), (10.0, 0.5), (20.0, 0.1), (30.0, 0.0)])
}

/// Record relations the request pins to existing pawns.
pub fn apply_preset_relations(pawn: &mut Pawn, presets: &[PresetRelation], tables: &RuleTables) {
    for preset in presets {
        if has_relation(&pawn.relations, preset.kind, preset.other) {
            continue;
        }
        let def = tables
            .relation_of_kind(preset.kind)
            .map_or_else(|| format!("{:?}", preset.kind), |d| d.name.clone());
        pawn.relations.push(DirectRelation::new(&def, preset.kind, preset.other));
    }
}

fn parent_ids(relations: &[DirectRelation]) -> Vec<PawnId> {
    relations.iter().filter(|r| r.kind == RelationKind::Parent).map(|r| r.other).collect()
}

fn has_parent_of_gender(relations: &[DirectRelation], gender: Gender, world: &PawnRegistry) -> bool {
    parent_ids(relations)
        .into_iter()
        .any(|id| world.get(id).map_or(false, |p| p.gender == gender))
}

fn has_current_partner(relations: &[DirectRelation]) -> bool {
    relations
        .iter()
        .any(|r| matches!(r.kind, RelationKind::Spouse | RelationKind::Lover | RelationKind::Fiance))
}

fn attracted_to(orientation: Option<Orientation>, own: Gender, other: Gender) -> bool {
    if own == Gender::None || other == Gender::None {
        return false;
    }
    match orientation {
        Some(Orientation::Asexual) => false,
        Some(Orientation::Bisexual) => true,
        Some(Orientation::Gay) => own == other,
        None => own != other,
    }
}

/// How plausible it is that `other` holds `kind` towards `pawn`'s story,
/// before the def's generation chance factor.
fn context_chance(kind: RelationKind, pawn: &Pawn, other: &Pawn, world: &PawnRegistry, tables: &RuleTables) -> f32 {
    if pawn.relations_with(other.id).next().is_some() {
        return 0.0;
    }
    let own_age = pawn.age.biological_years();
    let other_age = other.age.biological_years();
    match kind {
        RelationKind::Parent => {
            if other.gender == Gender::None || has_parent_of_gender(&pawn.relations, other.gender, world) {
                return 0.0;
            }
            parent_age_gap_curve().evaluate(other_age - own_age)
        }
        RelationKind::Child => {
            if pawn.gender == Gender::None || has_parent_of_gender(&other.relations, pawn.gender, world) {
                return 0.0;
            }
            parent_age_gap_curve().evaluate(own_age - other_age)
        }
        RelationKind::Sibling => (1.0 - (own_age - other_age).abs() / SIBLING_MAX_AGE_DIFF).max(0.0),
        romantic => {
            if own_age < MIN_ROMANCE_AGE || other_age < MIN_ROMANCE_AGE {
                return 0.0;
            }
            let current = matches!(romantic, RelationKind::Spouse | RelationKind::Lover | RelationKind::Fiance);
            if current && (has_current_partner(&pawn.relations) || has_current_partner(&other.relations)) {
                return 0.0;
            }
            let mutual = attracted_to(pawn.traits.orientation(tables), pawn.gender, other.gender)
                && attracted_to(other.traits.orientation(tables), other.gender, pawn.gender);
            if !mutual {
                return 0.0;
            }
            romance_age_diff_curve().evaluate((own_age - other_age).abs())
        }
    }
}

/// Sample pairs and pick one, or nothing.
fn sample_relation<'t, R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &Pawn,
    defs: &[&'t RelationDef],
    candidates: &[PawnId],
) -> Option<(PawnId, &'t RelationDef)> {
    if defs.is_empty() || candidates.is_empty() {
        return None;
    }
    let world: &PawnRegistry = &*ctx.world;
    let tables = ctx.tables;
    let samples = ctx.config.relation_samples;
    let none_weight = (ctx.config.relation_none_weight
        + ctx.config.relation_none_weight_per_player_pawn * world.player_pawn_count() as f32)
        * samples as f32
        / (candidates.len() * defs.len()) as f32;

    let mut pairs: Vec<(PawnId, &'t RelationDef, f32)> = Vec::with_capacity(samples as usize);
    for _ in 0..samples {
        let (other, def) = match (random_element(candidates, ctx.rng), random_element(defs, ctx.rng)) {
            (Some(o), Some(d)) => (*o, *d),
            _ => continue,
        };
        let weight = world
            .get(other)
            .map_or(0.0, |o| def.generation_chance_factor * context_chance(def.kind, pawn, o, world, tables));
        pairs.push((other, def, weight));
    }
    random_element_by_weight_with_default(&pairs, |(_, _, w)| *w, none_weight, ctx.rng).map(|(id, def, _)| (*id, *def))
}

/// Generate every request or none of them. Pawns made before a failure are
/// purged again; the survivors join the free pool since nobody called for
/// them.
fn generate_all<R: Rng>(ctx: &mut GenerationContext<'_, R>, requests: &[GenerationRequest]) -> Option<Vec<PawnId>> {
    let mut made = Vec::with_capacity(requests.len());
    for request in requests {
        match generate(ctx, request) {
            Ok(id) => made.push(id),
            Err(e) => {
                warn!(error = %e, archetype = %request.archetype, "could not generate a relative");
                ctx.world.purge(&made);
                return None;
            }
        }
    }
    for id in &made {
        ctx.world.set_situation(*id, PawnSituation::Free);
    }
    Some(made)
}

/// Generate a married father and mother for a sibling pair.
fn generate_parents<R: Rng>(ctx: &mut GenerationContext<'_, R>, elder_age: f32, template: &Pawn) -> Option<(PawnId, PawnId)> {
    let range = FloatRange::new(elder_age + PARENT_AGE_GAP.min, elder_age + PARENT_AGE_GAP.max);
    let base = GenerationRequest {
        faction: template.faction.clone(),
        fixed_last_name: template.last_name().map(str::to_string),
        can_generate_relations: false,
        force_generate_new: true,
        allowed_stages: DevelopmentalStages::adult(),
        biological_age_range: Some(range),
        ..GenerationRequest::new(&template.archetype)
    };
    let requests = [
        GenerationRequest { fixed_gender: Some(Gender::Male), ..base.clone() },
        GenerationRequest { fixed_gender: Some(Gender::Female), ..base },
    ];
    let (father, mother) = match generate_all(ctx, &requests)?.as_slice() {
        [father, mother] => (*father, *mother),
        _ => return None,
    };

    let tables = ctx.tables;
    let spouse = tables.relation_of_kind(RelationKind::Spouse).map_or("Spouse", |d| d.name.as_str());
    for (a, b) in [(father, mother), (mother, father)] {
        if let Some(p) = ctx.world.get_mut(a) {
            p.relations.push(DirectRelation::new(spouse, RelationKind::Spouse, b));
        }
    }
    Some((father, mother))
}

fn adopt_last_name(pawn: &mut Pawn, last: &str, at_birth: bool) {
    if let Some(name) = pawn.name.as_mut() {
        name.last = last.to_string();
        if at_birth {
            pawn.birth_last_name = Some(last.to_string());
        }
    }
}

/// Attach `def` from the candidate to `other`, with its knock-on effects.
pub fn add_relation<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &mut Pawn,
    request: &GenerationRequest,
    def: &RelationDef,
    other: PawnId,
) {
    let tables = ctx.tables;
    let (other_last, other_gender, other_parents, other_age) = match ctx.world.get(other) {
        Some(o) => (
            o.last_name().map(str::to_string),
            o.gender,
            parent_ids(&o.relations),
            o.age.biological_years(),
        ),
        None => return,
    };

    if def.kind == RelationKind::Sibling {
        let parents = if other_parents.is_empty() {
            let template = match ctx.world.get(other) {
                Some(o) => o.clone(),
                None => return,
            };
            let elder = pawn.age.biological_years().max(other_age);
            match generate_parents(ctx, elder, &template) {
                Some((father, mother)) => {
                    let parent_def = tables.relation_of_kind(RelationKind::Parent).map_or("Parent", |d| d.name.as_str());
                    let child_def = tables.relation_of_kind(RelationKind::Child).map_or("Child", |d| d.name.as_str());
                    for parent in [father, mother] {
                        if let Some(o) = ctx.world.get_mut(other) {
                            o.relations.push(DirectRelation::new(parent_def, RelationKind::Parent, parent));
                        }
                        if let Some(p) = ctx.world.get_mut(parent) {
                            p.relations.push(DirectRelation::new(child_def, RelationKind::Child, other));
                        }
                    }
                    vec![father, mother]
                }
                None => Vec::new(),
            }
        } else {
            other_parents
        };
        if let Some(parent_def) = tables.relation_of_kind(RelationKind::Parent) {
            for parent in parents {
                let gender = ctx.world.get(parent).map_or(Gender::None, |p| p.gender);
                if !has_parent_of_gender(&pawn.relations, gender, ctx.world) {
                    pawn.relations.push(DirectRelation::new(&parent_def.name, RelationKind::Parent, parent));
                }
            }
        }
    }

    pawn.relations.push(DirectRelation::new(&def.name, def.kind, other));
    debug!(pawn = %pawn.id, other = %other, relation = %def.name, "relation generated");

    if request.fixed_last_name.is_some() {
        return;
    }
    if let Some(last) = other_last {
        if def.is_blood() {
            adopt_last_name(pawn, &last, true);
        } else if def.kind == RelationKind::Spouse && pawn.gender == Gender::Female && other_gender == Gender::Male {
            adopt_last_name(pawn, &last, false);
        }
    }
}

pub fn generate_relations<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &mut Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
) {
    if request.is_newborn() || !request.can_generate_relations || !race.humanlike {
        return;
    }
    let tables = ctx.tables;
    let candidates: Vec<PawnId> = ctx
        .world
        .iter()
        .filter(|p| p.race == pawn.race && p.id != pawn.id && !ctx.sessions.is_being_generated(p.id))
        .map(|p| p.id)
        .collect();
    if candidates.is_empty() {
        return;
    }

    let blood: Vec<&RelationDef> = tables.relations.iter().filter(|r| r.is_blood()).collect();
    if let Some((other, def)) = sample_relation(ctx, pawn, &blood, &candidates) {
        add_relation(ctx, pawn, request, def, other);
    }
    if archetype.generate_non_family_relations {
        let romantic: Vec<&RelationDef> = tables.relations.iter().filter(|r| !r.is_blood()).collect();
        if let Some((other, def)) = sample_relation(ctx, pawn, &romantic, &candidates) {
            add_relation(ctx, pawn, request, def, other);
        }
    }
}
