//! Statblock CLI - Stat blocks and encounter sheets from compendium files
//!
//! Commands: monster, check, search, encounter
//! Documents go to stdout, logs to stderr.

use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use statblock_core::{
    catalog::{self, Catalog, FsLoader},
    pipeline::{render_monster, Pipeline, PipelineError},
    DocumentWriter, EncounterSpec, HtmlWriter, Library, LibraryLoader, LoadError, MonsterRecord,
    SheetConfig, TextWriter, Validator, ENGINE_VERSION,
};

#[derive(Parser)]
#[command(name = "statblock-cli", version)]
#[command(about = "Render monster stat blocks and encounter sheets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON sheet configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Html)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one monster; a random one when no name is given
    Monster {
        /// Compendium file (stdin when omitted)
        #[arg(short, long)]
        library: Option<PathBuf>,

        /// Monster name, words are joined with spaces
        name: Vec<String>,
    },

    /// Report unparsed data and other problems in a compendium
    Check {
        /// Compendium file (stdin when omitted)
        #[arg(short, long)]
        library: Option<PathBuf>,
    },

    /// Search every compendium of a directory
    Search {
        /// Directory of compendium files
        #[arg(short, long, default_value = "data")]
        dir: PathBuf,

        /// Compendium name filter
        #[arg(long, default_value = "")]
        compendium: String,

        /// Monster name filter
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Render an encounter sheet
    Encounter {
        /// Encounter file, JSON or YAML
        #[arg(short, long)]
        spec: PathBuf,

        /// Directory of compendium files; sources may name its compendiums
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("statblock_core={level},statblock_cli={level}"))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    info!("statblock-cli v{}", ENGINE_VERSION);

    let config = match &cli.config {
        Some(path) => match SheetConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => SheetConfig::default(),
    }
    .with_verbose(cli.verbose);

    let writer: Box<dyn DocumentWriter> = match cli.format {
        Format::Html => Box::new(HtmlWriter),
        Format::Text => Box::new(TextWriter),
    };

    match cli.command {
        Commands::Monster { library, name } => {
            let library = match read_library(library.as_deref()) {
                Ok(l) => l,
                Err(e) => {
                    error!("Could not load monsters: {}", e);
                    return ExitCode::from(1);
                }
            };
            let name = (!name.is_empty()).then(|| name.join(" "));

            match render_monster(&library, name.as_deref(), writer.as_ref()) {
                Ok(page) => {
                    println!("{}", page);
                    ExitCode::SUCCESS
                }
                Err(e @ PipelineError::MonsterNotFound { .. }) => {
                    error!("{}", e);
                    ExitCode::from(2)
                }
                Err(e) => {
                    error!("Could not render stat block: {}", e);
                    ExitCode::from(3)
                }
            }
        }

        Commands::Check { library } => {
            let library = match read_library(library.as_deref()) {
                Ok(l) => l,
                Err(e) => {
                    error!("Could not load monsters: {}", e);
                    return ExitCode::from(1);
                }
            };
            let report = Validator::new().validate(&library);
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    error!("{}", e);
                    return ExitCode::FAILURE;
                }
            }
            if report.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }

        Commands::Search { dir, compendium, search } => {
            let catalog = match Catalog::load_dir(&dir) {
                Ok(c) => c,
                Err(e) => {
                    error!("Could not read {}: {}", dir.display(), e);
                    return ExitCode::FAILURE;
                }
            };
            let found = catalog.search(&compendium, &search);
            let monsters: Vec<&MonsterRecord> = found.iter().map(|m| m.as_ref()).collect();
            let output = serde_json::json!({ "monsters": monsters });
            match serde_json::to_string(&output) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("{}", e);
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Encounter { spec, dir } => {
            let spec = match EncounterSpec::load(&spec) {
                Ok(s) => s,
                Err(e) => {
                    error!("{}", e);
                    return ExitCode::from(1);
                }
            };

            let result = match dir {
                Some(dir) => match Catalog::load_dir(&dir) {
                    Ok(catalog) => render_encounter(catalog, config, &spec, writer.as_ref()),
                    Err(e) => {
                        error!("Could not read {}: {}", dir.display(), e);
                        return ExitCode::FAILURE;
                    }
                },
                None => render_encounter(FsLoader::new(), config, &spec, writer.as_ref()),
            };

            match result {
                Ok(page) => {
                    println!("{}", page);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("{}", e);
                    ExitCode::from(2)
                }
            }
        }
    }
}

fn render_encounter<L: LibraryLoader>(
    loader: L,
    config: SheetConfig,
    spec: &EncounterSpec,
    writer: &dyn DocumentWriter,
) -> Result<String, PipelineError> {
    Pipeline::new(loader, config).render_encounter(spec, writer)
}

fn read_library(path: Option<&Path>) -> Result<Library, LoadError> {
    match path {
        Some(path) => catalog::load(path),
        None => catalog::load_reader(io::stdin().lock(), Path::new("stdin")),
    }
}
