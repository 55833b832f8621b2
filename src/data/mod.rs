//! Data-driven rule tables.
//!
//! Loads races, archetypes, factions, traits, skills, backstories, xenotypes,
//! relation kinds, conditions, gear and name pools from JSON data files.
//! Defaults are embedded in the binary via `include_str!`; an optional data
//! directory can override or extend them. Cross references are resolved once
//! at load time so the generation stages can look defs up without failing.

pub mod archetypes;
pub mod backstories;
pub mod conditions;
pub mod factions;
pub mod gear;
pub mod names;
pub mod races;
pub mod relations;
pub mod skills;
pub mod traits;
pub mod xenotypes;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

pub use archetypes::{ArchetypeDef, InventoryOption, SkillRange, TraitRequirement};
pub use backstories::{BackstoryDef, BackstorySlot};
pub use conditions::{ConditionDef, ConditionKind};
pub use factions::{FactionDef, IdeologyDef};
pub use gear::{ApparelLayer, GearDef, GearKind};
pub use names::{NameCulture, NamePools};
pub use races::RaceDef;
pub use relations::{RelationDef, RelationKind};
pub use skills::SkillDef;
pub use traits::{Orientation, TraitDef, TraitDegree};
pub use xenotypes::{GeneCategory, GeneDef, XenotypeChance, XenotypeDef};

/// Name of the xenotype that absorbs the residual xenotype weight.
pub const BASELINER: &str = "Baseliner";

// Embedded default data files
const DEFAULT_RACES_JSON: &str = include_str!("../../data/defaults/races.json");
const DEFAULT_ARCHETYPES_JSON: &str = include_str!("../../data/defaults/archetypes.json");
const DEFAULT_FACTIONS_JSON: &str = include_str!("../../data/defaults/factions.json");
const DEFAULT_TRAITS_JSON: &str = include_str!("../../data/defaults/traits.json");
const DEFAULT_SKILLS_JSON: &str = include_str!("../../data/defaults/skills.json");
const DEFAULT_BACKSTORIES_JSON: &str = include_str!("../../data/defaults/backstories.json");
const DEFAULT_XENOTYPES_JSON: &str = include_str!("../../data/defaults/xenotypes.json");
const DEFAULT_RELATIONS_JSON: &str = include_str!("../../data/defaults/relations.json");
const DEFAULT_CONDITIONS_JSON: &str = include_str!("../../data/defaults/conditions.json");
const DEFAULT_GEAR_JSON: &str = include_str!("../../data/defaults/gear.json");
const DEFAULT_NAMES_JSON: &str = include_str!("../../data/defaults/names.json");

/// Errors raised while loading or cross-checking rule tables.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{referenced_by} references unknown {kind} '{name}'")]
    MissingReference {
        kind: &'static str,
        name: String,
        referenced_by: String,
    },
}

/// Anything stored in a `DefList`.
pub trait Def {
    fn name(&self) -> &str;
}

/// Ordered def collection with lookup by name.
///
/// Iteration follows file order, which keeps weighted draws deterministic.
#[derive(Clone, Debug)]
pub struct DefList<T> {
    defs: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Def> DefList<T> {
    pub fn new(defs: Vec<T>) -> Self {
        let mut list = DefList { defs: Vec::new(), index: HashMap::new() };
        for def in defs {
            list.upsert(def);
        }
        list
    }

    /// Insert a def, replacing one with the same name in place.
    pub fn upsert(&mut self, def: T) {
        match self.index.get(def.name()) {
            Some(&i) => self.defs[i] = def,
            None => {
                self.index.insert(def.name().to_string(), self.defs.len());
                self.defs.push(def);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&i| &self.defs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.defs.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.defs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[derive(Deserialize)]
struct RacesFile {
    races: Vec<RaceDef>,
}

#[derive(Deserialize)]
struct ArchetypesFile {
    archetypes: Vec<ArchetypeDef>,
}

#[derive(Deserialize)]
struct FactionsFile {
    factions: Vec<FactionDef>,
    #[serde(default)]
    ideologies: Vec<IdeologyDef>,
}

#[derive(Deserialize)]
struct TraitsFile {
    traits: Vec<TraitDef>,
}

#[derive(Deserialize)]
struct SkillsFile {
    skills: Vec<SkillDef>,
}

#[derive(Deserialize)]
struct BackstoriesFile {
    backstories: Vec<BackstoryDef>,
}

#[derive(Deserialize)]
struct XenotypesFile {
    xenotypes: Vec<XenotypeDef>,
    #[serde(default)]
    genes: Vec<GeneDef>,
}

#[derive(Deserialize)]
struct RelationsFile {
    relations: Vec<RelationDef>,
}

#[derive(Deserialize)]
struct ConditionsFile {
    conditions: Vec<ConditionDef>,
}

#[derive(Deserialize)]
struct GearFile {
    gear: Vec<GearDef>,
}

/// Read-only rule tables, loaded once at startup.
#[derive(Clone, Debug)]
pub struct RuleTables {
    pub races: DefList<RaceDef>,
    pub archetypes: DefList<ArchetypeDef>,
    pub factions: DefList<FactionDef>,
    pub ideologies: DefList<IdeologyDef>,
    pub traits: DefList<TraitDef>,
    pub skills: DefList<SkillDef>,
    pub backstories: DefList<BackstoryDef>,
    pub xenotypes: DefList<XenotypeDef>,
    pub genes: DefList<GeneDef>,
    pub relations: DefList<RelationDef>,
    pub conditions: DefList<ConditionDef>,
    pub gear: DefList<GearDef>,
    pub names: NamePools,
}

fn parse<T: DeserializeOwned>(file: &str, contents: &str) -> Result<T, DataError> {
    serde_json::from_str(contents).map_err(|source| DataError::Parse {
        file: file.to_string(),
        source,
    })
}

impl RuleTables {
    /// Load from embedded defaults compiled into the binary.
    pub fn defaults() -> Self {
        Self::from_embedded().expect("embedded default rule tables are invalid")
    }

    fn from_embedded() -> Result<Self, DataError> {
        let races: RacesFile = parse("races.json", DEFAULT_RACES_JSON)?;
        let archetypes: ArchetypesFile = parse("archetypes.json", DEFAULT_ARCHETYPES_JSON)?;
        let factions: FactionsFile = parse("factions.json", DEFAULT_FACTIONS_JSON)?;
        let traits: TraitsFile = parse("traits.json", DEFAULT_TRAITS_JSON)?;
        let skills: SkillsFile = parse("skills.json", DEFAULT_SKILLS_JSON)?;
        let backstories: BackstoriesFile = parse("backstories.json", DEFAULT_BACKSTORIES_JSON)?;
        let xenotypes: XenotypesFile = parse("xenotypes.json", DEFAULT_XENOTYPES_JSON)?;
        let relations: RelationsFile = parse("relations.json", DEFAULT_RELATIONS_JSON)?;
        let conditions: ConditionsFile = parse("conditions.json", DEFAULT_CONDITIONS_JSON)?;
        let gear: GearFile = parse("gear.json", DEFAULT_GEAR_JSON)?;
        let names: NamePools = parse("names.json", DEFAULT_NAMES_JSON)?;

        let tables = RuleTables {
            races: DefList::new(races.races),
            archetypes: DefList::new(archetypes.archetypes),
            factions: DefList::new(factions.factions),
            ideologies: DefList::new(factions.ideologies),
            traits: DefList::new(traits.traits),
            skills: DefList::new(skills.skills),
            backstories: DefList::new(backstories.backstories),
            xenotypes: DefList::new(xenotypes.xenotypes),
            genes: DefList::new(xenotypes.genes),
            relations: DefList::new(relations.relations),
            conditions: DefList::new(conditions.conditions),
            gear: DefList::new(gear.gear),
            names,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// Load from a directory, merging with embedded defaults.
    ///
    /// Files present in the directory add new defs or override defs with the
    /// same name. Missing files fall back to defaults. The merged tables are
    /// cross-checked before being returned.
    pub fn load_from(dir: &Path) -> Result<Self, DataError> {
        let mut tables = Self::from_embedded()?;

        if let Some(file) = read_optional::<RacesFile>(dir, "races.json")? {
            file.races.into_iter().for_each(|d| tables.races.upsert(d));
        }
        if let Some(file) = read_optional::<ArchetypesFile>(dir, "archetypes.json")? {
            file.archetypes.into_iter().for_each(|d| tables.archetypes.upsert(d));
        }
        if let Some(file) = read_optional::<FactionsFile>(dir, "factions.json")? {
            file.factions.into_iter().for_each(|d| tables.factions.upsert(d));
            file.ideologies.into_iter().for_each(|d| tables.ideologies.upsert(d));
        }
        if let Some(file) = read_optional::<TraitsFile>(dir, "traits.json")? {
            file.traits.into_iter().for_each(|d| tables.traits.upsert(d));
        }
        if let Some(file) = read_optional::<SkillsFile>(dir, "skills.json")? {
            file.skills.into_iter().for_each(|d| tables.skills.upsert(d));
        }
        if let Some(file) = read_optional::<BackstoriesFile>(dir, "backstories.json")? {
            file.backstories.into_iter().for_each(|d| tables.backstories.upsert(d));
        }
        if let Some(file) = read_optional::<XenotypesFile>(dir, "xenotypes.json")? {
            file.xenotypes.into_iter().for_each(|d| tables.xenotypes.upsert(d));
            file.genes.into_iter().for_each(|d| tables.genes.upsert(d));
        }
        if let Some(file) = read_optional::<RelationsFile>(dir, "relations.json")? {
            file.relations.into_iter().for_each(|d| tables.relations.upsert(d));
        }
        if let Some(file) = read_optional::<ConditionsFile>(dir, "conditions.json")? {
            file.conditions.into_iter().for_each(|d| tables.conditions.upsert(d));
        }
        if let Some(file) = read_optional::<GearFile>(dir, "gear.json")? {
            file.gear.into_iter().for_each(|d| tables.gear.upsert(d));
        }
        if let Some(names) = read_optional::<NamePools>(dir, "names.json")? {
            tables.names.merge(names);
        }

        tables.validate()?;
        Ok(tables)
    }

    /// Get a race by name.
    pub fn race(&self, name: &str) -> Option<&RaceDef> {
        self.races.get(name)
    }

    pub fn archetype(&self, name: &str) -> Option<&ArchetypeDef> {
        self.archetypes.get(name)
    }

    pub fn faction(&self, name: &str) -> Option<&FactionDef> {
        self.factions.get(name)
    }

    pub fn trait_def(&self, name: &str) -> Option<&TraitDef> {
        self.traits.get(name)
    }

    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.get(name)
    }

    /// First relation def of the given kind.
    pub fn relation_of_kind(&self, kind: RelationKind) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.kind == kind)
    }

    /// First condition def of the given kind.
    pub fn condition_of_kind(&self, kind: ConditionKind) -> Option<&ConditionDef> {
        self.conditions.iter().find(|c| c.kind == kind)
    }

    /// The trait carrying an orientation tag.
    pub fn orientation_trait(&self, orientation: Orientation) -> Option<&TraitDef> {
        self.traits.iter().find(|t| t.orientation == Some(orientation))
    }

    /// Cross-check every name reference between tables.
    pub fn validate(&self) -> Result<(), DataError> {
        fn require<T: Def>(
            list: &DefList<T>,
            kind: &'static str,
            name: &str,
            referenced_by: &str,
        ) -> Result<(), DataError> {
            if list.contains(name) {
                Ok(())
            } else {
                Err(DataError::MissingReference {
                    kind,
                    name: name.to_string(),
                    referenced_by: referenced_by.to_string(),
                })
            }
        }

        require(&self.xenotypes, "xenotype", BASELINER, "rule tables")?;

        for arch in self.archetypes.iter() {
            let who = format!("archetype '{}'", arch.name);
            require(&self.races, "race", &arch.race, &who)?;
            for t in &arch.forced_traits {
                require(&self.traits, "trait", &t.trait_name, &who)?;
            }
            for t in &arch.disallowed_traits {
                require(&self.traits, "trait", t, &who)?;
            }
            for s in &arch.skills {
                require(&self.skills, "skill", &s.skill, &who)?;
            }
            for x in &arch.xenotype_set {
                require(&self.xenotypes, "xenotype", &x.xenotype, &who)?;
            }
            for part in &arch.missing_parts {
                require(&self.conditions, "condition", part, &who)?;
            }
            for inv in &arch.inventory {
                require(&self.gear, "gear", &inv.item, &who)?;
            }
        }

        for faction in self.factions.iter() {
            let who = format!("faction '{}'", faction.name);
            for x in &faction.xenotype_set {
                require(&self.xenotypes, "xenotype", &x.xenotype, &who)?;
            }
            for ideo in &faction.ideologies {
                require(&self.ideologies, "ideology", ideo, &who)?;
            }
            if self.names.culture(&faction.culture).is_none() {
                return Err(DataError::MissingReference {
                    kind: "name culture",
                    name: faction.culture.clone(),
                    referenced_by: who,
                });
            }
        }

        for ideo in self.ideologies.iter() {
            let who = format!("ideology '{}'", ideo.name);
            for x in &ideo.xenotype_set {
                require(&self.xenotypes, "xenotype", &x.xenotype, &who)?;
            }
        }

        for t in self.traits.iter() {
            let who = format!("trait '{}'", t.name);
            for other in &t.conflicts {
                require(&self.traits, "trait", other, &who)?;
            }
            for skill in t.forced_passions.iter().chain(t.conflicting_passions.iter()) {
                require(&self.skills, "skill", skill, &who)?;
            }
            for degree in &t.degrees {
                for skill in degree.skill_gains.keys() {
                    require(&self.skills, "skill", skill, &who)?;
                }
            }
        }

        for b in self.backstories.iter() {
            let who = format!("backstory '{}'", b.name);
            for skill in b.skill_gains.keys() {
                require(&self.skills, "skill", skill, &who)?;
            }
            for t in b.forced_traits.iter().chain(b.disallowed_traits.iter()) {
                require(&self.traits, "trait", &t.trait_name, &who)?;
            }
        }

        for x in self.xenotypes.iter() {
            let who = format!("xenotype '{}'", x.name);
            for gene in &x.genes {
                require(&self.genes, "gene", gene, &who)?;
            }
            for d in &x.double_xenotype_chances {
                require(&self.xenotypes, "xenotype", &d.xenotype, &who)?;
            }
        }

        for g in self.genes.iter() {
            if let Some(condition) = &g.hereditary_condition {
                require(&self.conditions, "condition", condition, &format!("gene '{}'", g.name))?;
            }
        }

        for c in self.conditions.iter() {
            for arch in &c.remove_on_redress_if_not_of_archetype {
                require(&self.archetypes, "archetype", arch, &format!("condition '{}'", c.name))?;
            }
        }

        Ok(())
    }
}

fn read_optional<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Option<T>, DataError> {
    let path = dir.join(file);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| DataError::Io {
        path: path.clone(),
        source,
    })?;
    parse(&path.display().to_string(), &contents).map(Some)
}
