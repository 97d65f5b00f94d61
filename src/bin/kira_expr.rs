use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_expression::app::{App, ProgressEvent, ProgressSink, RunResult};
use kira_expression::config::{ConfigLoader, ConfigOverrides, ResolvedConfig};
use kira_expression::error::KiraError;
use kira_expression::geo::GeoHttpClient;
use kira_expression::logbook::Logbook;
use kira_expression::output::{JsonOutput, OutputMode};
use kira_expression::provider::{
    DatasetProvider, FetchOptions, GeoDatasetProvider, SoftFileProvider,
};
use kira_expression::render::PlottersRenderer;

#[derive(Parser)]
#[command(name = "kira-expr")]
#[command(about = "Merge GEO sample tables into one expression matrix with summary statistics and charts")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Build the expression matrix, statistics and charts")]
    Run(RunArgs),
    #[command(about = "Show how each sample's columns resolve")]
    Inspect(SourceArgs),
}

#[derive(Args, Clone)]
struct SourceArgs {
    /// GEO series accession, e.g. GSE11121
    accession: Option<String>,

    #[arg(long)]
    config: Option<String>,

    /// Read a local SOFT family file instead of downloading
    #[arg(long)]
    soft_file: Option<Utf8PathBuf>,

    #[arg(long)]
    data_dir: Option<String>,

    #[arg(long)]
    results_dir: Option<String>,

    #[arg(long)]
    force: bool,

    #[arg(long)]
    no_cache: bool,
}

#[derive(Args, Clone)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[arg(long)]
    heatmap_rows: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    bins: Option<usize>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(kira) = report.downcast_ref::<KiraError>() {
            return ExitCode::from(map_exit_code(kira));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &KiraError) -> u8 {
    match error {
        KiraError::MissingAccession
        | KiraError::InvalidExpressionAccession(_)
        | KiraError::ConfigRead(_)
        | KiraError::ConfigParse(_)
        | KiraError::InvalidConfig(_) => 2,
        KiraError::GeoHttp(_) | KiraError::GeoStatus { .. } => 3,
        KiraError::EmptyResult(_) => 4,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    match cli.command {
        Commands::Run(args) => run_pipeline(args, output_mode),
        Commands::Inspect(args) => run_inspect(args, output_mode),
    }
}

fn overrides(source: &SourceArgs) -> ConfigOverrides {
    ConfigOverrides {
        accession: source.accession.clone(),
        data_dir: source.data_dir.clone(),
        results_dir: source.results_dir.clone(),
        ..ConfigOverrides::default()
    }
}

fn open_logbook(resolved: &ResolvedConfig, output_mode: OutputMode) -> miette::Result<Logbook> {
    let workspace = resolved.workspace();
    workspace.ensure_log_dir()?;
    Ok(Logbook::open(
        workspace.log_file(),
        matches!(output_mode, OutputMode::Interactive),
    ))
}

fn run_pipeline(args: RunArgs, output_mode: OutputMode) -> miette::Result<()> {
    let overrides = ConfigOverrides {
        heatmap_rows: args.heatmap_rows,
        seed: args.seed,
        bins: args.bins,
        ..overrides(&args.source)
    };
    let resolved = ConfigLoader::resolve(args.source.config.as_deref(), overrides)?;
    let sink = open_logbook(&resolved, output_mode)?;
    let fetch = FetchOptions {
        force: args.source.force,
        no_cache: args.source.no_cache,
    };

    let result = match args.source.soft_file {
        Some(path) => execute(SoftFileProvider::new(path), &resolved, &sink)?,
        None => {
            let client = GeoHttpClient::new()?;
            let provider = GeoDatasetProvider::new(client, resolved.workspace(), fetch);
            execute(provider, &resolved, &sink)?
        }
    };

    match output_mode {
        OutputMode::Interactive => print_run_summary(&result),
        OutputMode::NonInteractive => JsonOutput::print_run(&result).into_diagnostic()?,
    }
    Ok(())
}

fn execute<P: DatasetProvider>(
    provider: P,
    resolved: &ResolvedConfig,
    sink: &Logbook,
) -> Result<RunResult, KiraError> {
    let app = App::new(resolved.workspace(), provider, PlottersRenderer::default());
    app.run(&resolved.accession, &resolved.options, sink)
        .inspect_err(|err| sink.event(ProgressEvent::new(format!("run aborted: {err}"))))
}

fn run_inspect(args: SourceArgs, output_mode: OutputMode) -> miette::Result<()> {
    let resolved = ConfigLoader::resolve(args.config.as_deref(), overrides(&args))?;
    let sink = open_logbook(&resolved, output_mode)?;
    let fetch = FetchOptions {
        force: args.force,
        no_cache: args.no_cache,
    };

    let result = match args.soft_file {
        Some(path) => App::new(
            resolved.workspace(),
            SoftFileProvider::new(path),
            PlottersRenderer::default(),
        )
        .inspect(&resolved.accession, &sink)?,
        None => {
            let client = GeoHttpClient::new()?;
            let provider = GeoDatasetProvider::new(client, resolved.workspace(), fetch);
            App::new(resolved.workspace(), provider, PlottersRenderer::default())
                .inspect(&resolved.accession, &sink)?
        }
    };

    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_inspect(&result).into_diagnostic()?,
        OutputMode::Interactive => {
            println!("{}: {}", result.accession, result.title.as_deref().unwrap_or("untitled"));
            for entry in &result.samples {
                match (&entry.id_column, &entry.unusable) {
                    (Some(id_column), _) => println!(
                        "  {:<12} {:>7} rows  id={id_column}",
                        entry.sample, entry.rows
                    ),
                    (None, Some(reason)) => println!(
                        "  {:<12} {:>7} rows  skipped: {reason} (columns: {})",
                        entry.sample,
                        entry.rows,
                        entry.columns.join(", ")
                    ),
                    (None, None) => println!("  {:<12} {:>7} rows", entry.sample, entry.rows),
                }
            }
        }
    }
    Ok(())
}

fn print_run_summary(result: &RunResult) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}KIRA-EXPR summary: {}{reset}", result.accession);
    println!(
        "{green}Samples merged: {} of {}{reset}",
        result.samples_used.len(),
        result.samples_total
    );
    println!("{green}Genes kept: {}{reset}", result.genes);
    if !result.samples_skipped.is_empty() {
        println!(
            "{yellow}Samples skipped: {}{reset}",
            result.samples_skipped.len()
        );
    }
    if result.duplicate_rows > 0 {
        println!(
            "{yellow}Duplicate identifier rows overwritten: {}{reset}",
            result.duplicate_rows
        );
    }

    let stats = &result.statistics;
    println!(
        "{cyan}mean_expression: mean={:.3} std={:.3} min={:.3} median={:.3} max={:.3}{reset}",
        stats.mean, stats.std, stats.min, stats.p50, stats.max
    );
    for path in [
        &result.outputs.summary_stats,
        &result.outputs.histogram,
        &result.outputs.heatmap,
        &result.outputs.matrix,
    ] {
        println!("{green}   {path}{reset}");
    }
}
