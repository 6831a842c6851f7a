use std::fs::File;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use virokit::aggregate;
use virokit::checkv::{self, CheckvOutputs};
use virokit::config::{ConfigLoader, ResolvedConfig};
use virokit::domain::Tool;
use virokit::error::VirokitError;
use virokit::genomad::{self, GenomadOptions, GenomadOutputs};
use virokit::output::{AnalysisResult, CombineResult, JsonOutput, ValidateResult};
use virokit::runner::SystemRunner;
use virokit::schema::MetadataBundle;
use virokit::store::{self, Store};
use virokit::virsorter2::{self, Virsorter2Outputs};

#[derive(Parser)]
#[command(name = "virokit")]
#[command(about = "Viromics toolkit wrapping CheckV, geNomad and VirSorter2")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Manage reference databases")]
    Db(DbArgs),
    #[command(about = "Run a per-sample analysis")]
    Analyze(AnalyzeArgs),
    #[command(about = "Work with per-sample metadata tables")]
    Metadata(MetadataArgs),
}

#[derive(Args)]
struct DbArgs {
    #[command(subcommand)]
    command: DbCommand,
}

#[derive(Subcommand)]
enum DbCommand {
    #[command(about = "Fetch a reference database into the cache")]
    Fetch {
        tool: Tool,
        #[arg(long, default_value_t = 1)]
        threads: u32,
    },
    #[command(about = "Validate a database or results tree")]
    Validate {
        target: ValidateTarget,
        path: Utf8PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ValidateTarget {
    Checkv,
    Genomad,
    Virsorter2,
    Metadata,
}

#[derive(Args)]
struct AnalyzeArgs {
    #[command(subcommand)]
    command: AnalyzeCommand,
}

#[derive(Subcommand)]
enum AnalyzeCommand {
    #[command(about = "Assess viral genome quality and completeness")]
    Checkv(CheckvArgs),
    #[command(about = "Classify viral and plasmid sequences")]
    Genomad(GenomadArgs),
    #[command(about = "Detect viral sequences")]
    Virsorter2(Virsorter2Args),
}

#[derive(Args)]
struct CheckvArgs {
    #[command(flatten)]
    common: CommonAnalyzeArgs,
}

#[derive(Args)]
struct GenomadArgs {
    #[command(flatten)]
    common: CommonAnalyzeArgs,

    #[arg(long)]
    splits: Option<u32>,

    #[arg(long)]
    min_score: Option<f64>,

    #[arg(long)]
    min_number_genes: Option<u32>,

    #[arg(long)]
    conservative_taxonomy: bool,
}

#[derive(Args)]
struct Virsorter2Args {
    #[command(flatten)]
    common: CommonAnalyzeArgs,
}

#[derive(Args)]
struct CommonAnalyzeArgs {
    #[arg(long, help = "Directory of <sample>_contigs.fa input files")]
    sequences: Utf8PathBuf,

    #[arg(long, help = "Database root (defaults to virokit.json)")]
    database: Option<Utf8PathBuf>,

    #[arg(long, help = "Root directory for the per-sample outputs")]
    output: Utf8PathBuf,

    #[arg(long)]
    threads: Option<u32>,

    #[arg(long, help = "Path to virokit.json")]
    config: Option<String>,
}

#[derive(Args)]
struct MetadataArgs {
    #[command(subcommand)]
    command: MetadataCommand,
}

#[derive(Subcommand)]
enum MetadataCommand {
    #[command(about = "Merge per-sample metadata tables into one table")]
    Combine {
        directory: Utf8PathBuf,
        #[arg(long, help = "Write the combined TSV here instead of stdout")]
        output: Option<Utf8PathBuf>,
    },
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<VirokitError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &VirokitError) -> u8 {
    match error {
        VirokitError::Parse(_)
        | VirokitError::EmptyFile(_)
        | VirokitError::EmptyInput(_)
        | VirokitError::MalformedTable { .. }
        | VirokitError::FieldCount { .. }
        | VirokitError::EmptyField { .. }
        | VirokitError::InvalidProfile { .. }
        | VirokitError::MissingRequiredFile(_)
        | VirokitError::LayoutInvalid { .. }
        | VirokitError::ColumnMismatch { .. }
        | VirokitError::InvalidSampleName(_)
        | VirokitError::MissingConfig => 2,
        VirokitError::MissingTool(_)
        | VirokitError::ToolFailed { .. }
        | VirokitError::ToolKilled { .. } => 3,
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
    match cli.command {
        Commands::Db(args) => run_db(args),
        Commands::Analyze(args) => run_analyze(args),
        Commands::Metadata(args) => run_metadata(args),
    }
}

fn run_db(args: DbArgs) -> miette::Result<()> {
    match args.command {
        DbCommand::Fetch { tool, threads } => {
            let store = Store::new().into_diagnostic()?;
            let result = store
                .fetch_database(&SystemRunner, tool, threads)
                .into_diagnostic()?;
            JsonOutput::print_fetch(&result).into_diagnostic()?;
            Ok(())
        }
        DbCommand::Validate { target, path } => {
            let schema = match target {
                ValidateTarget::Checkv => store::database_schema(Tool::Checkv),
                ValidateTarget::Genomad => store::database_schema(Tool::Genomad),
                ValidateTarget::Virsorter2 => store::database_schema(Tool::Virsorter2),
                ValidateTarget::Metadata => MetadataBundle::schema(),
            }
            .into_diagnostic()?;

            let report = schema.validate(&path).into_diagnostic()?;
            let result = ValidateResult {
                schema: schema.name().to_string(),
                path: path.to_string(),
                pass: report.is_pass(),
                violations: report.violations.clone(),
            };
            JsonOutput::print_validate(&result).into_diagnostic()?;
            report.into_result().into_diagnostic()
        }
    }
}

fn run_analyze(args: AnalyzeArgs) -> miette::Result<()> {
    let runner = SystemRunner;
    match args.command {
        AnalyzeCommand::Checkv(args) => {
            let (database, threads) = resolve_tool_context(&args.common, Tool::Checkv)?;
            let outputs = CheckvOutputs::under(&args.common.output);
            let samples = checkv::run_analysis(
                &runner,
                &args.common.sequences,
                &database,
                threads,
                &outputs,
            )
            .into_diagnostic()?;
            print_analysis(Tool::Checkv, samples, &args.common.output)
        }
        AnalyzeCommand::Genomad(args) => {
            let (database, threads) = resolve_tool_context(&args.common, Tool::Genomad)?;
            let options = genomad_options(&args)?;
            let outputs = GenomadOutputs::under(&args.common.output);
            let samples = genomad::run_analysis(
                &runner,
                &args.common.sequences,
                &database,
                threads,
                &options,
                &outputs,
            )
            .into_diagnostic()?;
            print_analysis(Tool::Genomad, samples, &args.common.output)
        }
        AnalyzeCommand::Virsorter2(args) => {
            let (database, threads) =
                resolve_tool_context(&args.common, Tool::Virsorter2)?;
            let outputs = Virsorter2Outputs::under(&args.common.output);
            let samples = virsorter2::run_analysis(
                &runner,
                &args.common.sequences,
                &database,
                threads,
                &outputs,
            )
            .into_diagnostic()?;
            print_analysis(Tool::Virsorter2, samples, &args.common.output)
        }
    }
}

/// Database and thread count come from the flags when given, otherwise from
/// `virokit.json`.
fn resolve_tool_context(
    args: &CommonAnalyzeArgs,
    tool: Tool,
) -> miette::Result<(Utf8PathBuf, u32)> {
    let config = if args.database.is_none() || args.threads.is_none() {
        load_config(args)?
    } else {
        None
    };

    let database = match (&args.database, &config) {
        (Some(database), _) => database.clone(),
        (None, Some(config)) => config
            .database(tool)
            .map(|path| path.to_path_buf())
            .ok_or_else(|| {
                miette::Report::msg(format!(
                    "no database configured for {tool}; pass --database or set databases.{tool} in virokit.json"
                ))
            })?,
        (None, None) => {
            return Err(miette::Report::msg(format!(
                "no database configured for {tool}; pass --database or create virokit.json"
            )));
        }
    };

    let threads = args
        .threads
        .or(config.as_ref().map(|config| config.threads))
        .unwrap_or(1);

    Ok((database, threads))
}

/// The config file is optional when every needed value arrives via flags;
/// an explicitly named config that is unreadable is still an error.
fn load_config(args: &CommonAnalyzeArgs) -> miette::Result<Option<ResolvedConfig>> {
    match ConfigLoader::resolve(args.config.as_deref()) {
        Ok(config) => Ok(Some(config)),
        Err(VirokitError::MissingConfig) if args.config.is_none() => Ok(None),
        Err(err) => Err(miette::Report::new(err)),
    }
}

fn genomad_options(args: &GenomadArgs) -> miette::Result<GenomadOptions> {
    let config_options = match ConfigLoader::resolve(args.common.config.as_deref()) {
        Ok(config) => Some(config.genomad),
        Err(VirokitError::MissingConfig) if args.common.config.is_none() => None,
        Err(err) => return Err(miette::Report::new(err)),
    };
    let defaults = config_options.unwrap_or_default();
    Ok(GenomadOptions {
        splits: args.splits.unwrap_or(defaults.splits),
        min_score: args.min_score.unwrap_or(defaults.min_score),
        min_number_genes: args.min_number_genes.unwrap_or(defaults.min_number_genes),
        conservative_taxonomy: args.conservative_taxonomy || defaults.conservative_taxonomy,
    })
}

fn print_analysis(
    tool: Tool,
    samples: Vec<virokit::domain::SampleId>,
    output_root: &Utf8PathBuf,
) -> miette::Result<()> {
    let result = AnalysisResult {
        tool: tool.to_string(),
        samples: samples.iter().map(|id| id.to_string()).collect(),
        output_root: output_root.to_string(),
    };
    JsonOutput::print_analysis(&result).into_diagnostic()
}

fn run_metadata(args: MetadataArgs) -> miette::Result<()> {
    match args.command {
        MetadataCommand::Combine { directory, output } => {
            let table = aggregate::combine_sample_metadata(&directory).into_diagnostic()?;
            match &output {
                Some(path) => {
                    let file = File::create(path.as_std_path()).into_diagnostic()?;
                    table.write_tsv(file).into_diagnostic()?;
                    let result = CombineResult {
                        rows: table.rows.len(),
                        columns: table.columns.clone(),
                        output: Some(path.to_string()),
                    };
                    JsonOutput::print_combine(&result).into_diagnostic()?;
                }
                None => {
                    table.write_tsv(std::io::stdout()).into_diagnostic()?;
                }
            }
            Ok(())
        }
    }
}
