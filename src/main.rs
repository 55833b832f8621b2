use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pawn_generator::data::RuleTables;
use pawn_generator::generation::{GenerationRequest, GeneratorConfig, PawnGenerator, SpawnContext};
use pawn_generator::pawn::{DevelopmentalStage, DevelopmentalStages, Gender, Pawn};
use pawn_generator::registry::PawnSituation;

#[derive(Parser, Debug)]
#[command(name = "pawn_generator")]
#[command(about = "Generate procedural pawns from rule tables")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of pawns to generate
    #[arg(short = 'n', long, default_value = "1")]
    count: usize,

    /// Archetype to generate
    #[arg(short, long, default_value = "Colonist")]
    archetype: String,

    /// Owning faction
    #[arg(short, long)]
    faction: Option<String>,

    /// Why the pawns are generated
    #[arg(long, value_enum, default_value = "player-starter")]
    context: ContextArg,

    /// Fixed gender
    #[arg(short, long, value_enum)]
    gender: Option<GenderArg>,

    /// Allowed developmental stages (repeatable, default adult)
    #[arg(long, value_enum)]
    stage: Vec<StageArg>,

    /// Trait every pawn must have (repeatable)
    #[arg(long)]
    forced_trait: Vec<String>,

    /// Trait no pawn may have (repeatable)
    #[arg(long)]
    prohibited_trait: Vec<String>,

    /// Directory with JSON rule tables overriding the built-in defaults
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON file with generator tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pre-populate the free pool with this many world pawns
    #[arg(long, default_value = "0")]
    pool: usize,

    /// Print pawns as a JSON array
    #[arg(long)]
    json: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ContextArg {
    PlayerStarter,
    NonPlayer,
    Quest,
}

impl From<ContextArg> for SpawnContext {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::PlayerStarter => SpawnContext::PlayerStarter,
            ContextArg::NonPlayer => SpawnContext::NonPlayer,
            ContextArg::Quest => SpawnContext::Quest,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StageArg {
    Newborn,
    Baby,
    Child,
    Adult,
}

impl From<StageArg> for DevelopmentalStage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::Newborn => DevelopmentalStage::Newborn,
            StageArg::Baby => DevelopmentalStage::Baby,
            StageArg::Child => DevelopmentalStage::Child,
            StageArg::Adult => DevelopmentalStage::Adult,
        }
    }
}

fn build_request(args: &Args) -> GenerationRequest {
    let allowed_stages = if args.stage.is_empty() {
        DevelopmentalStages::adult()
    } else {
        args.stage.iter().map(|s| DevelopmentalStage::from(*s)).collect::<Vec<_>>().into()
    };
    GenerationRequest {
        faction: args.faction.clone(),
        context: args.context.into(),
        fixed_gender: args.gender.map(|g| match g {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }),
        allowed_stages,
        forced_traits: args.forced_trait.clone(),
        prohibited_traits: args.prohibited_trait.clone(),
        ..GenerationRequest::new(&args.archetype)
    }
}

/// Fill the free pool with villagers and outlanders.
fn populate_pool(generator: &mut PawnGenerator, count: usize, rng: &mut ChaCha8Rng) {
    let archetypes = ["Villager", "Colonist", "Tribesperson"];
    for i in 0..count {
        let request = GenerationRequest {
            force_generate_new: true,
            ..GenerationRequest::new(archetypes[i % archetypes.len()])
        };
        match generator.generate(&request, rng) {
            Ok(id) => generator.world_mut().set_situation(id, PawnSituation::Free),
            Err(e) => error!(error = %e, "failed to generate pool pawn"),
        }
    }
    info!(free = generator.world().free_count(), "free pool populated");
}

fn summary(pawn: &Pawn, generator: &PawnGenerator) -> String {
    let tables = generator.tables();
    let traits = pawn.traits.labels(tables).join(", ");
    let skills = pawn
        .skills
        .top(3)
        .iter()
        .map(|r| format!("{} {}", r.skill, r.level))
        .collect::<Vec<_>>()
        .join(", ");
    let xenotype = pawn.genes.as_ref().map_or("-", |g| g.xenotype.as_str());
    let relations = pawn
        .relations
        .iter()
        .map(|r| {
            let other = generator.pawn(r.other).map_or_else(|| r.other.to_string(), |o| o.label());
            format!("{} of {}", r.def, other)
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{} ({}, {:.0}/{:.0}y) [{}] skills: {} | xenotype: {} | relations: {}",
        pawn.label(),
        pawn.gender,
        pawn.age.biological_years(),
        pawn.age.chronological_years(),
        traits,
        skills,
        xenotype,
        if relations.is_empty() { "none".to_string() } else { relations },
    )
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let tables = match &args.data_dir {
        Some(dir) => match RuleTables::load_from(dir) {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, dir = %dir.display(), "failed to load rule tables");
                return ExitCode::FAILURE;
            }
        },
        None => RuleTables::defaults(),
    };
    let config = match &args.config {
        Some(path) => match GeneratorConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "failed to load config");
                return ExitCode::FAILURE;
            }
        },
        None => GeneratorConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    info!(seed, "generating pawns");

    let mut generator = PawnGenerator::new(tables, config);
    populate_pool(&mut generator, args.pool, &mut rng);

    let request = build_request(&args);
    let mut generated = Vec::with_capacity(args.count);
    for _ in 0..args.count {
        match generator.generate(&request, &mut rng) {
            Ok(id) => generated.push(id),
            Err(e) => {
                error!(error = %e, archetype = %request.archetype, "generation failed");
                return ExitCode::FAILURE;
            }
        }
    }

    let pawns: Vec<&Pawn> = generated.iter().filter_map(|id| generator.pawn(*id)).collect();
    if args.json {
        match serde_json::to_string_pretty(&pawns) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!(error = %e, "failed to serialize pawns");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("Seed: {}", seed);
        for pawn in pawns {
            println!("{}", summary(pawn, &generator));
        }
    }
    ExitCode::SUCCESS
}
