//! Trait assignment
//!
//! Forced traits come first (archetype, request, backstories), then one
//! random trait per growth birthday up to the rolled count, then sexual
//! orientation. Random draws never produce a conflict with what is held.

use rand::Rng;
use tracing::debug;

use crate::data::{ArchetypeDef, Orientation, RaceDef, RuleTables, TraitDef};
use crate::generation::generator::GenerationContext;
use crate::generation::request::GenerationRequest;
use crate::pawn::{Gender, Pawn, Trait};
use crate::rand_util::{random_element_by_weight_with_default, try_random_element_by_weight};

/// Random traits a pawn may end up with, before growth birthdays cap it
const TRAIT_COUNT_MIN: usize = 1;
const TRAIT_COUNT_MAX: usize = 3;

/// Age from which growth birthdays can grant traits
const FIRST_TRAIT_AGE: u32 = 3;

/// Genders of the pawn's current and former romantic partners
#[derive(Debug, Default, Clone, Copy)]
struct LoveHistory {
    same_gender: bool,
    opposite_gender: bool,
}

fn love_history<R: Rng>(ctx: &GenerationContext<'_, R>, pawn: &Pawn) -> LoveHistory {
    let mut history = LoveHistory::default();
    if pawn.gender == Gender::None {
        return history;
    }
    for rel in pawn.relations.iter().filter(|r| r.kind.is_romantic()) {
        match ctx.world.get(rel.other).map(|p| p.gender) {
            Some(g) if g == pawn.gender => history.same_gender = true,
            Some(g) if g == pawn.gender.opposite() => history.opposite_gender = true,
            _ => {}
        }
    }
    history
}

/// Rules a random draw must satisfy
struct DrawRules<'a> {
    request: &'a GenerationRequest,
    archetype: &'a ArchetypeDef,
    tables: &'a RuleTables,
    hostile: bool,
    love: LoveHistory,
}

impl DrawRules<'_> {
    fn gay_allowed(&self) -> bool {
        self.request.allow_gay && !self.love.opposite_gender
    }

    fn accepts(&self, pawn: &Pawn, def: &TraitDef, growth_moment: bool) -> bool {
        if pawn.traits.has(&def.name) {
            return false;
        }
        if def.orientation == Some(Orientation::Gay) && !self.gay_allowed() {
            return false;
        }
        if growth_moment && def.is_orientation() {
            return false;
        }
        if self.archetype.disallows_trait(&def.name)
            || def.disabled_work_tags.intersects(self.archetype.required_work_tags)
            || self.request.prohibits_trait(&def.name)
        {
            return false;
        }
        if self.hostile && !def.allow_on_hostile_spawn {
            return false;
        }
        if pawn.traits.conflicts_with(&def.name, self.tables) {
            return false;
        }
        let disabled = pawn.disabled_work_tags(self.tables);
        if def.required_work_tags.iter().any(|t| disabled.contains(t)) {
            return false;
        }
        !def.forced_passions.iter().any(|s| pawn.is_skill_disabled(s, self.tables))
    }

    fn backstory_disallows(&self, pawn: &Pawn, def: &TraitDef, degree: i32) -> bool {
        pawn.childhood
            .iter()
            .chain(pawn.adulthood.iter())
            .filter_map(|b| self.tables.backstories.get(b))
            .any(|b| b.disallows_trait(&def.name, degree))
    }
}

/// Pick a degree for a spectrum trait by degree commonality.
pub fn random_trait_degree<R: Rng>(def: &TraitDef, rng: &mut R) -> i32 {
    match def.degrees.as_slice() {
        [only] => only.degree,
        degrees => try_random_element_by_weight(degrees, |d| d.commonality, rng).map_or(0, |d| d.degree),
    }
}

/// Gain a mandated trait unless it is held, conflicts, or would be a second
/// orientation.
fn gain_forced(pawn: &mut Pawn, name: &str, degree: i32, tables: &RuleTables) -> bool {
    let def = match tables.trait_def(name) {
        Some(d) => d,
        None => return false,
    };
    if pawn.traits.has(name) || pawn.traits.conflicts_with(name, tables) {
        return false;
    }
    if def.is_orientation() && pawn.traits.orientation(tables).is_some() {
        return false;
    }
    pawn.traits.gain(Trait::forced(name, degree))
}

fn draw_random_trait<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &mut Pawn,
    rules: &DrawRules<'_>,
    growth_moment: bool,
) -> bool {
    let tables = ctx.tables;
    let gender = pawn.gender;
    let tries = tables.traits.len() as u32 + ctx.config.extra_trait_attempts;
    for _ in 0..tries {
        let def = match try_random_element_by_weight(tables.traits.as_slice(), |t| t.commonality_for(gender), ctx.rng) {
            Some(d) => d,
            None => return false,
        };
        if !rules.accepts(pawn, def, growth_moment) {
            continue;
        }
        let degree = random_trait_degree(def, ctx.rng);
        if rules.backstory_disallows(pawn, def, degree) {
            continue;
        }
        return pawn.traits.gain(Trait::new(&def.name, degree));
    }
    false
}

/// Draw at most one orientation. "None of them" carries the weight of every
/// other trait the pawn could still gain.
fn draw_orientation<R: Rng>(ctx: &mut GenerationContext<'_, R>, pawn: &mut Pawn, rules: &DrawRules<'_>) {
    let tables = ctx.tables;
    let gender = pawn.gender;
    let none_weight: f32 = tables
        .traits
        .iter()
        .filter(|t| !t.is_orientation() && !pawn.traits.has(&t.name))
        .map(|t| t.commonality_for(gender))
        .sum();
    let options: Vec<&TraitDef> = [Orientation::Gay, Orientation::Bisexual, Orientation::Asexual]
        .iter()
        .filter_map(|o| tables.orientation_trait(*o))
        .filter(|def| rules.accepts(pawn, def, false))
        .collect();
    if let Some(def) = random_element_by_weight_with_default(&options, |d| d.commonality_for(gender), none_weight, ctx.rng) {
        let degree = random_trait_degree(def, ctx.rng);
        pawn.traits.gain(Trait::new(&def.name, degree));
    }
}

/// A same-gender partner settles orientation before any draw.
fn orientation_from_partners(pawn: &mut Pawn, rules: &DrawRules<'_>) {
    if !rules.love.same_gender || pawn.traits.orientation(rules.tables).is_some() {
        return;
    }
    let orientation = if rules.love.opposite_gender { Orientation::Bisexual } else { Orientation::Gay };
    if orientation == Orientation::Gay && !rules.request.allow_gay {
        return;
    }
    if let Some(def) = rules.tables.orientation_trait(orientation) {
        if !rules.request.prohibits_trait(&def.name) && !pawn.traits.conflicts_with(&def.name, rules.tables) {
            pawn.traits.gain(Trait::new(&def.name, 0));
        }
    }
}

pub fn generate_traits<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &mut Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
) {
    if !race.humanlike || request.is_newborn() {
        return;
    }
    let tables = ctx.tables;

    for req in &archetype.forced_traits {
        gain_forced(pawn, &req.trait_name, req.degree.unwrap_or(0), tables);
    }
    for name in &request.forced_traits {
        gain_forced(pawn, name, 0, tables);
    }
    let backstory_forced: Vec<(String, i32)> = pawn
        .childhood
        .iter()
        .chain(pawn.adulthood.iter())
        .filter_map(|b| tables.backstories.get(b))
        .flat_map(|b| b.forced_traits.iter())
        .map(|r| (r.trait_name.clone(), r.degree.unwrap_or(0)))
        .collect();
    for (name, degree) in backstory_forced {
        if archetype.disallows_trait(&name) || request.prohibits_trait(&name) {
            continue;
        }
        gain_forced(pawn, &name, degree, tables);
    }

    let hostile = pawn
        .faction
        .as_deref()
        .and_then(|f| tables.faction(f))
        .map_or(false, |f| f.hostile_to_player);
    let rules = DrawRules { request, archetype, tables, hostile, love: love_history(ctx, pawn) };

    let wanted = race
        .growth_birthdays
        .len()
        .min(ctx.rng.gen_range(TRAIT_COUNT_MIN..=TRAIT_COUNT_MAX));
    let age = pawn.age.biological_years_floor();
    for year in FIRST_TRAIT_AGE..=age {
        if pawn.traits.len() >= wanted {
            break;
        }
        if race.growth_birthdays.contains(&year) && !draw_random_trait(ctx, pawn, &rules, true) {
            debug!(pawn = %pawn.id, year, "no acceptable trait for growth birthday");
        }
    }

    orientation_from_partners(pawn, &rules);
    if pawn.age.biological_years() >= race.orientation_min_age && pawn.traits.orientation(tables).is_none() {
        draw_orientation(ctx, pawn, &rules);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RelationKind;
    use crate::generation::generator::tests::Fixture;
    use crate::pawn::{AgeTracker, DirectRelation, PawnId};
    use crate::registry::PawnSituation;

    fn adult(id: u64, archetype: &str, gender: Gender) -> Pawn {
        let mut pawn = Pawn::blank(PawnId(id), archetype, "Human");
        pawn.gender = gender;
        pawn.age = AgeTracker::from_years(30.0, 30.0);
        pawn
    }

    fn run(fixture: &mut Fixture, pawn: &mut Pawn, request: &GenerationRequest) {
        let tables = fixture.tables.clone();
        let archetype = tables.archetype(&request.archetype).unwrap();
        let race = tables.race("Human").unwrap();
        let mut ctx = fixture.ctx();
        generate_traits(&mut ctx, pawn, request, archetype, race);
    }

    #[test]
    fn test_traits_never_conflict() {
        for seed in 0..60 {
            let mut fixture = Fixture::new(seed);
            let mut pawn = adult(1, "Colonist", Gender::random(&mut fixture.rng));
            run(&mut fixture, &mut pawn, &GenerationRequest::new("Colonist"));
            let held: Vec<&Trait> = pawn.traits.iter().collect();
            for (i, a) in held.iter().enumerate() {
                for b in &held[i + 1..] {
                    let (da, db) = (fixture.tables.trait_def(&a.def).unwrap(), fixture.tables.trait_def(&b.def).unwrap());
                    assert!(!da.conflicts_with(db), "{} conflicts with {}", a.def, b.def);
                }
            }
            let orientations = held
                .iter()
                .filter(|t| fixture.tables.trait_def(&t.def).unwrap().is_orientation())
                .count();
            assert!(orientations <= 1);
            assert!(pawn.traits.len() <= TRAIT_COUNT_MAX + 1);
        }
    }

    #[test]
    fn test_forced_traits_are_marked() {
        let mut fixture = Fixture::new(42);
        let mut pawn = adult(1, "PirateBoss", Gender::Male);
        let request = GenerationRequest { forced_traits: vec!["Tough".into()], ..GenerationRequest::new("PirateBoss") };
        run(&mut fixture, &mut pawn, &request);
        assert!(pawn.traits.get("Bloodlust").unwrap().forced);
        assert!(pawn.traits.get("Tough").unwrap().forced);
        assert!(!pawn.traits.has("Pacifist"));
        assert!(!pawn.traits.has("Wimp"));
    }

    #[test]
    fn test_hostile_pawns_skip_peaceful_traits() {
        for seed in 0..40 {
            let mut fixture = Fixture::new(seed);
            let mut pawn = adult(1, "Colonist", Gender::Male);
            pawn.faction = Some("PirateGang".into());
            run(&mut fixture, &mut pawn, &GenerationRequest::new("Colonist"));
            assert!(!pawn.traits.has("Pacifist"));
        }
    }

    #[test]
    fn test_opposite_gender_partner_blocks_gay() {
        for seed in 0..40 {
            let mut fixture = Fixture::new(seed);
            let partner = adult(1, "Colonist", Gender::Female);
            let tables = fixture.tables.clone();
            fixture.world.commit(partner, PawnSituation::Free, &tables);
            let mut pawn = adult(2, "Colonist", Gender::Male);
            pawn.relations.push(DirectRelation::new("Lover", RelationKind::Lover, PawnId(1)));
            let request = GenerationRequest { prohibited_traits: vec!["Gay".into()], ..GenerationRequest::new("Colonist") };
            run(&mut fixture, &mut pawn, &request);
            assert!(!pawn.traits.has("Gay"));
        }
    }

    #[test]
    fn test_same_gender_partner_sets_orientation() {
        let mut fixture = Fixture::new(7);
        let tables = fixture.tables.clone();
        fixture.world.commit(adult(1, "Colonist", Gender::Male), PawnSituation::Free, &tables);
        let mut pawn = adult(2, "Colonist", Gender::Male);
        pawn.relations.push(DirectRelation::new("Spouse", RelationKind::Spouse, PawnId(1)));
        run(&mut fixture, &mut pawn, &GenerationRequest::new("Colonist"));
        assert!(pawn.traits.has("Gay"));
    }

    #[test]
    fn test_single_degree_trait() {
        let tables = RuleTables::defaults();
        let mut fixture = Fixture::new(1);
        assert_eq!(random_trait_degree(tables.trait_def("Kind").unwrap(), &mut fixture.rng), 0);
        let nerves = tables.trait_def("Nerves").unwrap();
        for _ in 0..20 {
            assert_ne!(random_trait_degree(nerves, &mut fixture.rng), 0);
        }
    }
}
