use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use quill_core::config::Config;
use quill_core::{AnalysisPipeline, AnalysisReport, AnalyzeOptions, ClusterTable, ReportVariant};
use quill_report::{json, markdown, text};

const CONFIG_FILE: &str = ".quill.toml";

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Score a manuscript across craft dimensions and suggest revisions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Manuscript file, or a directory of .txt/.md chapters
    path: PathBuf,
    /// Config file path (defaults to .quill.toml next to the manuscript)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Genre used for dialogue targets (e.g. fantasy, thriller, young-adult)
    #[arg(short, long)]
    genre: Option<String>,
    /// Words per scene/sequel window
    #[arg(long)]
    window_size: Option<usize>,
    /// Add the two-principle tier summary
    #[arg(long)]
    tier: bool,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a manuscript and print a full report
    Analyze(AnalyzeArgs),
    /// Analyze and exit with code 0 (pass) or 1 (fail)
    Check {
        #[command(flatten)]
        args: AnalyzeArgs,
        /// Minimum overall score required to pass
        #[arg(long)]
        min_score: f64,
    },
    /// Create a default .quill.toml configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze(args) => cmd_analyze(&args),
        Commands::Check { args, min_score } => cmd_check(&args, min_score),
        Commands::Init { force } => cmd_init(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quill=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_analyze(args: &AnalyzeArgs) -> Result<()> {
    let report = run_analysis(args)?;
    let out = match args.format {
        OutputFormat::Text => text::format_report(&report),
        OutputFormat::Json => format!("{}\n", json::format_report(&report, args.compact)),
        OutputFormat::Markdown => markdown::format_report(&report),
    };
    print!("{out}");
    Ok(())
}

fn cmd_check(args: &AnalyzeArgs, min_score: f64) -> Result<()> {
    let report = run_analysis(args)?;
    let (out, passed) = match args.format {
        OutputFormat::Text => text::format_check(&report, min_score),
        OutputFormat::Json => {
            let (json, passed) = json::format_check(&report, min_score, args.compact);
            (format!("{json}\n"), passed)
        }
        OutputFormat::Markdown => markdown::format_check(&report, min_score),
    };
    print!("{out}");
    if !passed {
        process::exit(1);
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(CONFIG_FILE);
    if target.exists() && !force {
        anyhow::bail!("{CONFIG_FILE} already exists. Use --force to overwrite.");
    }
    std::fs::write(&target, Config::default_toml())
        .with_context(|| format!("failed to write {CONFIG_FILE}"))?;
    println!("Created {CONFIG_FILE} with default configuration.");
    Ok(())
}

fn load_config(manuscript: &Path, config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(p) => Config::load(p),
        None => Ok(Config::load_or_default(manuscript)),
    }
}

fn run_analysis(args: &AnalyzeArgs) -> Result<AnalysisReport> {
    let config = load_config(&args.path, args.config.as_deref())?;
    let bytes = read_manuscript(&args.path)?;
    let pipeline = AnalysisPipeline::new(ClusterTable::builtin(), config)?;
    let options = AnalyzeOptions {
        genre: args.genre.clone(),
        window_size: args.window_size,
        variant: if args.tier {
            ReportVariant::Tier
        } else {
            ReportVariant::Standard
        },
    };
    let report = pipeline
        .analyze_bytes(&bytes, &options)
        .with_context(|| format!("failed to analyze {}", args.path.display()))?;
    Ok(report)
}

/// Read a single file, or concatenate the .txt/.md files under a directory
/// in path order, separated by blank lines.
fn read_manuscript(path: &Path) -> Result<Vec<u8>> {
    if path.is_file() {
        return std::fs::read(path).with_context(|| format!("failed to read {}", path.display()));
    }
    if !path.is_dir() {
        anyhow::bail!("{} does not exist", path.display());
    }

    let mut chapters: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt" || ext == "md"))
        .collect();
    chapters.sort();
    if chapters.is_empty() {
        anyhow::bail!("no .txt or .md files found under {}", path.display());
    }
    tracing::debug!(chapters = chapters.len(), "reading manuscript directory");

    let mut out = Vec::new();
    for (i, chapter) in chapters.iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(b"\n\n");
        }
        let content = std::fs::read(chapter)
            .with_context(|| format!("failed to read {}", chapter.display()))?;
        out.extend_from_slice(&content);
    }
    Ok(out)
}
