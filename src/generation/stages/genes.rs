//! Xenotype, genes and body type

use rand::Rng;

use crate::data::{ArchetypeDef, GeneCategory, GeneDef, RaceDef, RuleTables, XenotypeChance, BASELINER};
use crate::generation::generator::GenerationContext;
use crate::generation::request::GenerationRequest;
use crate::pawn::{BodyType, DevelopmentalStage, GeneSet, Gender, Pawn};
use crate::rand_util::{chance, random_element, try_random_element_by_weight};

/// Chance of a thin body when nothing else decides it
const THIN_BODY_CHANCE: f32 = 0.5;

fn accumulate(weights: &mut Vec<(String, f32)>, set: &[XenotypeChance]) {
    for entry in set {
        match weights.iter_mut().find(|(name, _)| *name == entry.xenotype) {
            Some((_, w)) => *w += entry.chance,
            None => weights.push((entry.xenotype.clone(), entry.chance)),
        }
    }
}

/// Primary xenotype for a pawn.
///
/// Forced and allowed xenotypes short-circuit. Otherwise the faction,
/// ideology and archetype preferences are summed and Baseliner takes
/// whatever weight is left below 1.
pub fn choose_xenotype<R: Rng>(
    pawn: &Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    tables: &RuleTables,
    rng: &mut R,
) -> String {
    if let Some(forced) = &request.forced_xenotype {
        return forced.clone();
    }
    if !request.allowed_xenotypes.is_empty() {
        if chance(rng, request.force_baseliner_chance) {
            return BASELINER.to_string();
        }
        return random_element(&request.allowed_xenotypes, rng)
            .cloned()
            .unwrap_or_else(|| BASELINER.to_string());
    }

    let mut weights: Vec<(String, f32)> = Vec::new();
    if archetype.use_faction_xenotypes {
        if let Some(faction) = pawn.faction.as_deref().and_then(|f| tables.faction(f)) {
            accumulate(&mut weights, &faction.xenotype_set);
        }
    }
    if let Some(ideology) = pawn.ideology.as_deref().and_then(|i| tables.ideologies.get(i)) {
        accumulate(&mut weights, &ideology.xenotype_set);
    }
    accumulate(&mut weights, &archetype.xenotype_set);

    let total: f32 = weights.iter().map(|(_, w)| *w).sum();
    if total < 1.0 {
        accumulate(&mut weights, &[XenotypeChance { xenotype: BASELINER.to_string(), chance: 1.0 - total }]);
    }
    if request.must_be_capable_of_violence {
        weights.retain(|(name, _)| tables.xenotypes.get(name).map_or(false, |x| x.can_generate_as_combatant));
    }

    try_random_element_by_weight(&weights, |(_, w)| *w, rng)
        .map_or_else(|| BASELINER.to_string(), |(name, _)| name.clone())
}

/// One appearance gene per category, weighted by commonality.
fn fill_appearance<R: Rng>(genes: &mut GeneSet, tables: &RuleTables, rng: &mut R) {
    for category in [GeneCategory::SkinColor, GeneCategory::HairColor] {
        let has = genes
            .all_genes()
            .filter_map(|g| tables.genes.get(g))
            .any(|g| g.category == category);
        if has {
            continue;
        }
        let options: Vec<&GeneDef> = tables.genes.iter().filter(|g| g.category == category).collect();
        if let Some(gene) = try_random_element_by_weight(&options, |g| g.commonality, rng) {
            genes.add_endogene(&gene.name);
        }
    }
}

pub fn build_gene_set<R: Rng>(xenotype: &str, request: &GenerationRequest, tables: &RuleTables, rng: &mut R) -> GeneSet {
    let mut genes = GeneSet::new(xenotype);
    if let Some(def) = tables.xenotypes.get(xenotype) {
        let double_total: f32 = def.double_xenotype_chances.iter().map(|c| c.chance).sum();
        if rng.gen::<f32>() < double_total {
            let double = try_random_element_by_weight(&def.double_xenotype_chances, |c| c.chance, rng)
                .and_then(|c| tables.xenotypes.get(&c.xenotype));
            if let Some(double) = double {
                genes.double_xenotype = Some(double.name.clone());
                for gene in &double.genes {
                    genes.add_xenogene(gene);
                }
            }
        }
        for gene in &def.genes {
            if def.inheritable {
                genes.add_endogene(gene);
            } else {
                genes.add_xenogene(gene);
            }
        }
    }
    for gene in &request.forced_xenogenes {
        genes.add_xenogene(gene);
    }
    for gene in &request.forced_endogenes {
        genes.add_endogene(gene);
    }
    fill_appearance(&mut genes, tables, rng);
    genes
}

/// Stage body types first, then genes, then the adulthood backstory.
pub fn assign_body_type<R: Rng>(pawn: &mut Pawn, race: &RaceDef, tables: &RuleTables, rng: &mut R) {
    if !race.humanlike {
        pawn.body_type = None;
        return;
    }
    pawn.body_type = Some(match race.stage_for_age(pawn.age.biological_years()) {
        DevelopmentalStage::Newborn | DevelopmentalStage::Baby => BodyType::Baby,
        DevelopmentalStage::Child => BodyType::Child,
        DevelopmentalStage::Adult => {
            let from_genes: Vec<BodyType> = pawn
                .genes
                .iter()
                .flat_map(|g| g.all_genes())
                .filter_map(|g| tables.genes.get(g).and_then(|d| d.body_type))
                .collect();
            let from_story = pawn
                .adulthood
                .as_deref()
                .and_then(|b| tables.backstories.get(b))
                .and_then(|b| b.body_type_for(pawn.gender));
            if let Some(body) = random_element(&from_genes, rng) {
                *body
            } else if let Some(body) = from_story {
                body
            } else if chance(rng, THIN_BODY_CHANCE) {
                BodyType::Thin
            } else if pawn.gender == Gender::Female {
                BodyType::Female
            } else {
                BodyType::Male
            }
        }
    });
}

pub fn generate_genes<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    pawn: &mut Pawn,
    request: &GenerationRequest,
    archetype: &ArchetypeDef,
    race: &RaceDef,
) {
    let tables = ctx.tables;
    pawn.genes = if race.has_genes {
        let xenotype = choose_xenotype(pawn, request, archetype, tables, ctx.rng);
        Some(build_gene_set(&xenotype, request, tables, ctx.rng))
    } else {
        None
    };
    assign_body_type(pawn, race, tables, ctx.rng);
}
