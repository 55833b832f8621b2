//! Gender, name, backstories and ideology

use rand::Rng;

use crate::data::{ArchetypeDef, BackstoryDef, BackstorySlot, NameCulture, RaceDef, RuleTables};
use crate::generation::request::GenerationRequest;
use crate::pawn::{Gender, Pawn, PawnName};
use crate::rand_util::{chance, random_element};

/// Name culture for pawns without a faction
pub const DEFAULT_CULTURE: &str = "outlander";

/// Biological age from which an adulthood backstory is given
pub const ADULTHOOD_MIN_AGE: f32 = 20.0;

/// Chance of a nickname other than the first name
const NICKNAME_CHANCE: f32 = 0.3;

/// Request gender, then archetype gender, then a coin flip for gendered races.
pub fn assign_gender<R: Rng>(
    pawn: &mut Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
    rng: &mut R,
) {
    pawn.gender = if let Some(gender) = request.fixed_gender {
        gender
    } else if let Some(gender) = archetype.fixed_gender {
        gender
    } else if race.has_genders {
        Gender::random(rng)
    } else {
        Gender::None
    };
}

fn culture_for<'t>(pawn: &Pawn, tables: &'t RuleTables) -> Option<&'t NameCulture> {
    let key = pawn
        .faction
        .as_deref()
        .and_then(|f| tables.faction(f))
        .map_or(DEFAULT_CULTURE, |f| f.culture.as_str());
    tables
        .names
        .culture(key)
        .or_else(|| tables.names.cultures.values().next())
}

/// Draw a name from the pawn's faction culture.
pub fn assign_name<R: Rng>(pawn: &mut Pawn, request: &GenerationRequest, tables: &RuleTables, rng: &mut R) {
    let humanlike = tables.race(&pawn.race).map_or(false, |r| r.humanlike);
    if !humanlike {
        pawn.name = None;
        pawn.birth_last_name = None;
        return;
    }
    let culture = match culture_for(pawn, tables) {
        Some(c) => c,
        None => return,
    };

    let firsts = culture.first_names(pawn.gender);
    let first = random_element(&firsts, rng).map_or_else(|| "Nameless".to_string(), |s| s.to_string());
    let nick = if chance(rng, NICKNAME_CHANCE) {
        random_element(&culture.nicks, rng).cloned().unwrap_or_else(|| first.clone())
    } else {
        first.clone()
    };
    let last = match &request.fixed_last_name {
        Some(last) => last.clone(),
        None => random_element(&culture.last, rng).cloned().unwrap_or_default(),
    };

    pawn.birth_last_name = Some(request.fixed_birth_name.clone().unwrap_or_else(|| last.clone()));
    pawn.name = Some(PawnName { first, nick, last });
}

fn backstory_options<'t>(
    slot: BackstorySlot,
    archetype: &ArchetypeDef,
    tables: &'t RuleTables,
) -> Vec<&'t BackstoryDef> {
    tables
        .backstories
        .iter()
        .filter(|b| b.slot == slot)
        .filter(|b| archetype.backstory_categories.is_empty() || b.in_any_category(&archetype.backstory_categories))
        .filter(|b| !b.disabled_work_tags.intersects(archetype.required_work_tags))
        .collect()
}

/// Childhood for every humanlike past infancy, adulthood from age 20.
pub fn assign_backstories<R: Rng>(
    pawn: &mut Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    tables: &RuleTables,
    rng: &mut R,
) {
    pawn.childhood = None;
    pawn.adulthood = None;
    let humanlike = tables.race(&pawn.race).map_or(false, |r| r.humanlike);
    if !humanlike || request.is_newborn() {
        return;
    }
    let childhood = backstory_options(BackstorySlot::Childhood, archetype, tables);
    pawn.childhood = random_element(&childhood, rng).map(|b| b.name.clone());
    if pawn.age.biological_years() >= ADULTHOOD_MIN_AGE {
        let adulthood = backstory_options(BackstorySlot::Adulthood, archetype, tables);
        pawn.adulthood = random_element(&adulthood, rng).map(|b| b.name.clone());
    }
}

/// Fixed ideology, else one of the faction's. Babies hold none.
pub fn assign_ideology<R: Rng>(pawn: &mut Pawn, request: &GenerationRequest, tables: &RuleTables, rng: &mut R) {
    pawn.ideology = None;
    let race = match tables.race(&pawn.race) {
        Some(r) if r.humanlike => r,
        _ => return,
    };
    if pawn.age.biological_years() < race.child_min_age {
        return;
    }
    pawn.ideology = match &request.fixed_ideology {
        Some(ideo) => Some(ideo.clone()),
        None => pawn
            .faction
            .as_deref()
            .and_then(|f| tables.faction(f))
            .and_then(|f| random_element(&f.ideologies, rng).cloned()),
    };
}
