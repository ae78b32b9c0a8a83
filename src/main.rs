use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use swarfgen::config::GeneratorOptions;
use swarfgen::post::PostProcessorType;
use swarfgen::tool_library::generate_catalog;
use swarfgen::validator::Validator;
use swarfgen::{generate_program, output, ToolCatalog};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "swarfgen", version, about = "Generate sample G-code programs for testing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate programs from a tool catalog
    Generate {
        /// Tool catalog JSON
        #[arg(long)]
        catalog: PathBuf,

        /// Run options JSON; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of programs
        #[arg(long)]
        count: Option<usize>,

        /// Random seed, for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// generic, haas, linuxcnc or mach3
        #[arg(long)]
        controller: Option<PostProcessorType>,

        #[arg(long)]
        part_id: Option<String>,

        #[arg(long)]
        revision: Option<String>,

        #[arg(long, default_value = "programs")]
        out_dir: PathBuf,

        /// Print programs instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// Generate a random tool catalog
    Catalog {
        #[arg(long, default_value_t = 20)]
        count: usize,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value = "cuttingtools")]
        out_dir: PathBuf,
    },

    /// Check the structure of a program file
    Check {
        program: PathBuf,

        /// Also check tool codes and cutter compensation against a catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Seeded source, logging the seed so a run can be replayed
fn random_source(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, "random source");
    StdRng::seed_from_u64(seed)
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            catalog,
            config,
            count,
            seed,
            controller,
            part_id,
            revision,
            out_dir,
            stdout,
        } => {
            let mut options = match config {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str::<GeneratorOptions>(&text)
                        .with_context(|| format!("parsing {}", path.display()))?
                }
                None => GeneratorOptions::default(),
            };
            options.count = count.unwrap_or(options.count);
            options.seed = seed.or(options.seed);
            options.controller = controller.unwrap_or(options.controller);
            options.part_id = part_id.unwrap_or(options.part_id);
            options.revision = revision.unwrap_or(options.revision);

            let tools = ToolCatalog::from_file(&catalog)
                .with_context(|| format!("loading catalog {}", catalog.display()))?;
            info!(tools = tools.len(), path = %catalog.display(), "loaded catalog");

            let mut rng = random_source(options.seed);
            for index in 0..options.count {
                let now = Local::now().naive_local();
                let metadata = options.metadata(index, now);
                let program = generate_program(&tools, &metadata, &mut rng)?;

                if stdout {
                    print!("{}", program.to_text());
                    continue;
                }
                let name = output::unique_file_name(&out_dir, now, "nc");
                let path = output::write_program(&out_dir, &name, &program)
                    .with_context(|| format!("writing {}", out_dir.join(&name).display()))?;
                println!(
                    "{} ({} sequences, {} lines) -> {}",
                    metadata.program_id,
                    program.sequence_count(),
                    program.lines().len(),
                    path.display()
                );
            }
        }

        Command::Catalog {
            count,
            seed,
            out_dir,
        } => {
            let mut rng = random_source(seed);
            let catalog = generate_catalog(count, &mut rng);

            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("creating {}", out_dir.display()))?;
            let name = output::unique_file_name(&out_dir, Local::now().naive_local(), "json");
            let path = out_dir.join(name);
            catalog
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("{} new tools written to {}", catalog.len(), path.display());
        }

        Command::Check { program, catalog } => {
            let text = std::fs::read_to_string(&program)
                .with_context(|| format!("reading {}", program.display()))?;
            let lines: Vec<&str> = text.lines().collect();

            let tools = catalog
                .map(|path| {
                    ToolCatalog::from_file(&path)
                        .with_context(|| format!("loading catalog {}", path.display()))
                })
                .transpose()?;
            let validator = match &tools {
                Some(tools) => Validator::with_catalog(tools),
                None => Validator::new(),
            };

            match validator.validate_program(&lines) {
                Ok(report) => println!(
                    "{}: ok, {} sequences, {} tools, N{}..N{}",
                    program.display(),
                    report.sequence_count,
                    report.tool_codes.len(),
                    report.first_address,
                    report.last_address
                ),
                Err(errors) => {
                    for err in &errors {
                        warn!("{}", err);
                        eprintln!("  - {}", err);
                    }
                    bail!("{}: {} problems found", program.display(), errors.len());
                }
            }
        }
    }

    Ok(())
}
