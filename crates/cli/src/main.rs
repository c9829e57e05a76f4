//! bomgraph CLI - BOM dependency graphs from tabular exports.
//!
//! `analyze` reports what lies within N hops of a component; `merge` folds
//! several exports into one described edge list.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use bom_graph_core::pipeline::{self, Outcome};
use bom_graph_core::{BomId, BuildOptions, IdPolicy, IsolatedNodes, ShapeRegistry, SourceInput};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod output;

use output::Destination;

/// bomgraph - Bill-of-Materials dependency graphs
#[derive(Parser)]
#[command(name = "bomgraph")]
#[command(version)] // Auto-pull version from Cargo.toml
#[command(about = "Build BOM dependency graphs and report component neighborhoods", long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file mapping shape names to source shapes (extends the built-ins)
    #[arg(long, global = true, value_name = "FILE")]
    shapes: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report precursors and successors of a component by hop distance
    Analyze {
        #[command(flatten)]
        io: SourceArgs,

        /// BOM ID to start from
        #[arg(long)]
        start: String,

        /// Maximum number of hops in each direction
        #[arg(short = 'd', long, default_value_t = 1)]
        max_distance: usize,
    },

    /// Merge all sources into one edge list with descriptions
    Merge {
        #[command(flatten)]
        io: SourceArgs,
    },

    /// List available source shapes
    Shapes,
}

#[derive(Args)]
struct SourceArgs {
    /// Tabular source as SHAPE=PATH; repeat for several sources, earlier
    /// sources win description conflicts
    #[arg(short, long = "source", value_name = "SHAPE=PATH", required = true)]
    sources: Vec<SourceSpec>,

    /// Keep ids that have no accepted edge as isolated nodes
    #[arg(long)]
    include_isolated: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Output file, or `-` for stdout (defaults to a name derived from the query)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
    /// Single-sheet workbook with a bold header row
    Xlsx,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xlsx => "xlsx",
        }
    }
}

/// `SHAPE=PATH` as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceSpec {
    shape: String,
    path: PathBuf,
}

impl FromStr for SourceSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (shape, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected SHAPE=PATH, got '{s}'"))?;
        if shape.trim().is_empty() || path.trim().is_empty() {
            return Err(format!("expected SHAPE=PATH, got '{s}'"));
        }
        Ok(Self {
            shape: shape.trim().to_string(),
            path: PathBuf::from(path.trim()),
        })
    }
}

impl SourceArgs {
    fn build_options(&self) -> BuildOptions {
        BuildOptions {
            isolated_nodes: if self.include_isolated {
                IsolatedNodes::Include
            } else {
                IsolatedNodes::Exclude
            },
        }
    }

    /// Read every source file and attach its shape.
    fn load(&self, registry: &ShapeRegistry) -> Result<Vec<SourceInput>> {
        self.sources
            .iter()
            .map(|spec| {
                let shape = registry.get(&spec.shape).ok_or_else(|| {
                    anyhow!(
                        "Unknown shape '{}' (available: {})",
                        spec.shape,
                        registry.names().collect::<Vec<_>>().join(", ")
                    )
                })?;
                let bytes = fs::read(&spec.path)
                    .with_context(|| format!("Failed to read {}", spec.path.display()))?;
                Ok(SourceInput::new(
                    spec.path.display().to_string(),
                    shape.clone(),
                    bytes,
                ))
            })
            .collect()
    }
}

fn load_registry(shapes: Option<&Path>) -> Result<ShapeRegistry> {
    let mut registry = ShapeRegistry::with_builtins();
    if let Some(path) = shapes {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read shapes file {}", path.display()))?;
        let count = registry
            .extend_from_json(&json)
            .with_context(|| format!("Invalid shapes file {}", path.display()))?;
        tracing::debug!(count, path = %path.display(), "Loaded source shapes");
    }
    Ok(registry)
}

fn report_warnings<T>(outcome: &Outcome<T>) {
    if !outcome.warnings.is_empty() {
        eprintln!(
            "warning: skipped {} row(s) with unreadable BOM ids (run with -v for details)",
            outcome.warnings.len()
        );
    }
}

fn run_analyze(
    registry: &ShapeRegistry,
    io: &SourceArgs,
    start: &str,
    max_distance: usize,
) -> Result<()> {
    let start = BomId::parse(start, IdPolicy::Lenient)
        .ok_or_else(|| anyhow!("Start BOM ID must not be empty"))?;
    let inputs = io.load(registry)?;

    let outcome = pipeline::analyze(&inputs, &start, max_distance, &io.build_options())?;
    report_warnings(&outcome);

    let report = outcome.output;
    let dest = Destination::resolve(
        io.output.as_deref(),
        &report.file_name(io.format.extension()),
    );
    output::emit(&dest, |w| match io.format {
        OutputFormat::Csv => report.write_csv(w),
        OutputFormat::Json => report.write_json(w),
        OutputFormat::Xlsx => report.write_xlsx(w),
    })
}

fn run_merge(registry: &ShapeRegistry, io: &SourceArgs) -> Result<()> {
    let inputs = io.load(registry)?;

    let outcome = pipeline::merge(&inputs, &io.build_options())?;
    report_warnings(&outcome);

    let edges = outcome.output;
    let dest = Destination::resolve(
        io.output.as_deref(),
        &bom_graph_core::EdgeList::file_name(io.format.extension()),
    );
    output::emit(&dest, |w| match io.format {
        OutputFormat::Csv => edges.write_csv(w),
        OutputFormat::Json => edges.write_json(w),
        OutputFormat::Xlsx => edges.write_xlsx(w),
    })
}

fn run(cli: Cli) -> Result<()> {
    let registry = load_registry(cli.shapes.as_deref())?;

    match cli.command {
        Commands::Analyze {
            io,
            start,
            max_distance,
        } => run_analyze(&registry, &io, &start, max_distance),
        Commands::Merge { io } => run_merge(&registry, &io),
        Commands::Shapes => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

/// Exit code 2 for problems with the input, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<bom_graph_core::Error>() {
        Some(core) if core.kind().is_input_error() => 2,
        _ => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG takes precedence over -v
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
