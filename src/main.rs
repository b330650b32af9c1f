//! flowmood CLI.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use flowmood::{cfg, mood};

/// Control-flow graphs and MOOD design metrics for C/C++ sources.
#[derive(Parser)]
#[command(
    name = "flowmood",
    version,
    about = "Control-flow graphs and MOOD design metrics for C/C++ sources",
    long_about = r#"
Control-flow graphs and MOOD design metrics for C/C++ sources.

Examples:
    flowmood cfg src/parse.c next_token      # DOT graph to cfg.dot
    flowmood cfg src/parse.c main -o -       # DOT graph to stdout
    flowmood cfg src/parse.c main --format json -o cfg.json
    flowmood mood include/                   # MOOD factors for a tree
"#
)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum GraphFormat {
    #[default]
    Dot,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the control-flow graph of one function
    #[command(
        about = "Control-flow graph",
        long_about = "Lower a C function into a flow-node graph and render it."
    )]
    Cfg {
        /// Source file
        file: PathBuf,

        /// Function name
        function: String,

        /// Output format
        #[arg(long, value_enum, default_value = "dot")]
        format: GraphFormat,

        /// Output path, "-" for stdout
        #[arg(short, long, default_value = "cfg.dot")]
        output: PathBuf,
    },

    /// Compute MOOD metrics over a file or directory
    #[command(
        about = "MOOD metrics",
        long_about = "Collect C++ classes and compute the six MOOD design factors."
    )]
    Mood {
        /// Source file or directory
        path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Ignore .gitignore patterns (include all files)
        #[arg(long)]
        no_ignore: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Cfg {
            file,
            function,
            format,
            output,
        } => cmd_cfg(&file, &function, format, &output),
        Commands::Mood {
            path,
            format,
            no_ignore,
        } => cmd_mood(&path, format, no_ignore),
    }
}

fn cmd_cfg(file: &Path, function: &str, format: GraphFormat, output: &Path) -> Result<()> {
    let extracted = cfg::extract_from_file(file, function)
        .with_context(|| format!("extracting flow graph of {function} from {}", file.display()))?;
    let rendered = match format {
        GraphFormat::Dot => cfg::to_dot(&extracted.graph, extracted.entry),
        GraphFormat::Json => cfg::to_json(&extracted.graph)?,
    };
    if output.as_os_str() == "-" {
        print!("{rendered}");
    } else {
        fs::write(output, rendered)
            .with_context(|| format!("writing {}", output.display()))?;
        tracing::info!(path = %output.display(), "wrote flow graph");
    }
    Ok(())
}

fn cmd_mood(path: &Path, format: ReportFormat, no_ignore: bool) -> Result<()> {
    let classes = mood::collect_path_with(path, no_ignore)
        .with_context(|| format!("collecting classes from {}", path.display()))?;
    let report = mood::compute(&classes);
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => {
            println!("classes: {}", report.classes);
            println!("MHF: {:.3}", report.mhf);
            println!("AHF: {:.3}", report.ahf);
            println!("MIF: {:.3}", report.mif);
            println!("AIF: {:.3}", report.aif);
            println!("POF: {:.3}", report.pof);
            println!("COF: {:.3}", report.cof);
        }
    }
    Ok(())
}
