use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use itertools::Itertools;
use mimalloc::MiMalloc;
use protoprune_filter::FilterRequest;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Prune a parsed protocol schema tree down to the definitions a set of
/// entry messages needs, ready for code generation.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Commands,
}

/// Input, output and entry set shared by every subcommand.
#[derive(clap::Args)]
struct FilterArgs {
    /// Entry set as `namespace:Type[,Type...]`; repeat to merge several
    #[arg(short, long = "entry", value_name = "NS:TYPES", required = true)]
    entries: Vec<FilterRequest>,

    /// Schema tree JSON to read (reads stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file path (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prune a schema tree to the definitions reachable from the entry set
    ///
    /// Writes the pruned tree as JSON, keeping declaration order.
    Filter(FilterArgs),

    /// Report the definitions reachable from the entry set without pruning
    ///
    /// Writes a JSON object mapping namespace names to definition names.
    Reachable(FilterArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize structured logging. Output goes to stderr so JSON output
    // on stdout remains clean for piping. Default to warn, allowlist our crates.
    const CRATES: &[&str] =
        &["protoprune", "protoprune_filter", "protoprune_schemas"];
    let level = cli.verbose.tracing_level_filter();
    let allowlist = CRATES.iter().map(|c| format!("{c}={level}")).join(",");
    let filter = EnvFilter::new(format!("warn,{allowlist}"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    match cli.command {
        Commands::Filter(args) => {
            let (input, output) = open_streams(&args)?;
            protoprune_filter::run(input, output, &args.entries)?;
        }
        Commands::Reachable(args) => {
            let (input, output) = open_streams(&args)?;
            protoprune_filter::run_reachable(input, output, &args.entries)?;
        }
    }
    Ok(())
}

fn open_streams(args: &FilterArgs) -> Result<(Box<dyn Read>, Box<dyn Write>)> {
    let input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(std::io::stdin().lock()),
    };
    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    Ok((input, output))
}
