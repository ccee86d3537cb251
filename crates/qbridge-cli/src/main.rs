//! qbridge Command-Line Interface
//!
//! Inspect the conversion graph and convert programs between the built-in
//! representations.
//!
//! ```text
//!   qasm3 <──> qasm2 <──> ionq
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use qbridge_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{convert, edges, nodes, path, rank, version};

/// qbridge - find and execute conversion paths between quantum program formats
#[derive(Parser)]
#[command(name = "qbridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ~/.qbridge/config.yaml)
    #[arg(short, long, global = true, env = "QBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the nodes of the conversion graph
    Nodes,

    /// List the conversion edges
    Edges,

    /// Show the cheapest conversion path between two nodes
    Path {
        /// Source node
        #[arg(short, long)]
        from: String,

        /// Target node
        #[arg(short, long)]
        to: String,

        /// List every simple path instead of the cheapest one
        #[arg(short, long)]
        all: bool,

        /// Maximum number of conversion steps
        #[arg(long)]
        max_hops: Option<usize>,
    },

    /// Rank the nodes a source can be converted to
    Targets {
        /// Source node
        #[arg(short, long)]
        from: String,

        /// Candidate targets, comma separated (all nodes if omitted)
        #[arg(long, value_delimiter = ',')]
        candidates: Vec<String>,

        /// Show at most this many nodes
        #[arg(short)]
        k: Option<usize>,
    },

    /// Rank the nodes that can be converted to a target
    Sources {
        /// Target node
        #[arg(short, long)]
        to: String,

        /// Candidate sources, comma separated (all nodes if omitted)
        #[arg(long, value_delimiter = ',')]
        candidates: Vec<String>,

        /// Show at most this many nodes
        #[arg(short)]
        k: Option<usize>,
    },

    /// Convert a program file
    Convert {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source node (detected from the file contents if omitted)
        #[arg(short, long)]
        from: Option<String>,

        /// Target node; with several, comma separated, the cheapest reachable one is used
        #[arg(short, long, value_delimiter = ',', required = true)]
        to: Vec<String>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    // Setup logging
    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Nodes => nodes::execute(&config),

        Commands::Edges => edges::execute(&config),

        Commands::Path {
            from,
            to,
            all,
            max_hops,
        } => path::execute(&config, &from, &to, all, max_hops),

        Commands::Targets { from, candidates, k } => {
            rank::execute_targets(&config, &from, &candidates, k)
        }

        Commands::Sources { to, candidates, k } => {
            rank::execute_sources(&config, &to, &candidates, k)
        }

        Commands::Convert {
            input,
            output,
            from,
            to,
        } => convert::execute(&config, &input, output.as_deref(), from.as_deref(), &to),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
