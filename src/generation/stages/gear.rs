//! Apparel, weapon and inventory

use rand::Rng;
use rand_distr::StandardNormal;

use crate::data::{ApparelLayer, ArchetypeDef, GearDef, GearKind, RaceDef, RuleTables};
use crate::generation::generator::GenerationContext;
use crate::generation::request::GenerationRequest;
use crate::pawn::{GearItem, Pawn, Quality};
use crate::rand_util::{chance, random_element};

/// Layers are dressed in this order, sharing one budget.
const LAYER_ORDER: [ApparelLayer; 5] = [
    ApparelLayer::Skin,
    ApparelLayer::Middle,
    ApparelLayer::Shell,
    ApparelLayer::Headgear,
    ApparelLayer::Belt,
];

/// Chance that an optional layer stays empty
const OPTIONAL_LAYER_SKIP_CHANCE: f32 = 0.35;

/// Standard deviation of item quality around the archetype centre
const QUALITY_SPREAD: f32 = 1.0;

fn make_item<R: Rng>(def: &GearDef, archetype: &ArchetypeDef, count: u32, rng: &mut R) -> GearItem {
    let quality = if def.has_quality {
        let noise: f32 = rng.sample(StandardNormal);
        Some(Quality::from_index((archetype.item_quality_center + noise * QUALITY_SPREAD).round() as i32))
    } else {
        None
    };
    let health = archetype.gear_health_range.random_in_range(rng).clamp(0.0, 1.0);
    let hit_points = ((def.max_hit_points as f32 * health).round() as u32).max(1);
    GearItem { def: def.name.clone(), quality, hit_points, count }
}

fn dress<R: Rng>(pawn: &mut Pawn, archetype: &ArchetypeDef, tables: &RuleTables, rng: &mut R) {
    let mut money = match archetype.apparel_money {
        Some(range) if !archetype.apparel_tags.is_empty() => range.random_in_range(rng),
        _ => return,
    };
    for layer in LAYER_ORDER {
        if layer != ApparelLayer::Skin && chance(rng, OPTIONAL_LAYER_SKIP_CHANCE) {
            continue;
        }
        let options: Vec<&GearDef> = tables
            .gear
            .iter()
            .filter(|g| g.kind == GearKind::Apparel && g.layer == Some(layer))
            .filter(|g| g.has_any_tag(&archetype.apparel_tags) && g.wearable_by(pawn.gender))
            .filter(|g| g.market_value <= money)
            .collect();
        if let Some(def) = random_element(&options, rng) {
            money -= def.market_value;
            let item = make_item(def, archetype, 1, rng);
            pawn.gear.apparel.push(item);
        }
    }
}

fn arm<R: Rng>(pawn: &mut Pawn, archetype: &ArchetypeDef, tables: &RuleTables, rng: &mut R) {
    if archetype.weapon_tags.is_empty() || pawn.is_incapable_of_violence(tables) {
        return;
    }
    let money = match archetype.weapon_money {
        Some(range) => range.random_in_range(rng),
        None => return,
    };
    let options: Vec<&GearDef> = tables
        .gear
        .iter()
        .filter(|g| g.kind == GearKind::Weapon && g.has_any_tag(&archetype.weapon_tags))
        .filter(|g| g.market_value <= money)
        .collect();
    if let Some(def) = random_element(&options, rng) {
        pawn.gear.weapon = Some(make_item(def, archetype, 1, rng));
    }
}

fn pack<R: Rng>(pawn: &mut Pawn, request: &GenerationRequest, archetype: &ArchetypeDef, tables: &RuleTables, rng: &mut R) {
    for option in archetype.inventory.iter().filter(|o| o.applies_to(request.context)) {
        if !chance(rng, option.chance) {
            continue;
        }
        let count = option.count.random_in_range(rng).max(1) as u32;
        if let Some(def) = tables.gear.get(&option.item) {
            let item = make_item(def, archetype, count, rng);
            pawn.gear.inventory.push(item);
        }
    }
}

pub fn generate_gear<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &mut Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
) {
    pawn.gear.clear();
    if request.is_newborn() || !race.humanlike || !race.tool_user {
        return;
    }
    let tables = ctx.tables;
    dress(pawn, archetype, tables, ctx.rng);
    arm(pawn, archetype, tables, ctx.rng);
    pack(pawn, request, archetype, tables, ctx.rng);
}
