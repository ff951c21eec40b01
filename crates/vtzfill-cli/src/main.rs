use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vtzfill_core::{
    Calendar, CoreError, Findings, TimezoneId, TimezoneReport, TransitionWindow, TzdbProvider,
    add_missing_timezones, canonical_json, lint_timezones, parse_calendar, timezone_component,
    timezone_report,
};

#[derive(Parser, Debug)]
#[command(version, about = "RFC5545 VTIMEZONE checker + filler")]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List referenced, defined and missing timezone identifiers.
    Missing(ReportArgs),
    /// Add a VTIMEZONE for every referenced but undefined TZID.
    Fill(FillArgs),
    /// Lint VTIMEZONE usage for common footguns.
    Lint(ReportArgs),
    /// Print a synthesized VTIMEZONE for one IANA timezone.
    Vtimezone(VtimezoneArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// iCalendar input file
    #[arg(long)]
    ics: PathBuf,
}

#[derive(Args, Debug, Clone, Copy)]
struct WindowArgs {
    /// First year (inclusive) of emitted transitions
    #[arg(long, default_value_t = 1970)]
    first_year: i32,

    /// Last year (exclusive) of emitted transitions
    #[arg(long, default_value_t = 2038)]
    last_year: i32,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct FillArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    window: WindowArgs,

    /// Write the result here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct VtimezoneArgs {
    /// IANA timezone (e.g. Europe/Zurich)
    #[arg(long)]
    tz: String,

    #[command(flatten)]
    window: WindowArgs,
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Missing(args) => run_missing(args),
        Commands::Fill(args) => run_fill(args),
        Commands::Lint(args) => run_lint(args),
        Commands::Vtimezone(args) => run_vtimezone(args),
    }
}

fn run_missing(args: ReportArgs) -> Result<()> {
    let calendar = read_calendar(&args.input.ics)?;
    let report = timezone_report(&calendar);

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_report_text(&report),
    }

    Ok(())
}

/// Writes the calendar even when some zones cannot be resolved, so the blocks
/// that were synthesized are kept; the resolution error still sets the exit code.
fn run_fill(args: FillArgs) -> Result<()> {
    let mut calendar = read_calendar(&args.input.ics)?;
    let provider = build_provider(args.window)?;

    let unresolved = match add_missing_timezones(&mut calendar, &provider) {
        Ok(added) => {
            info!(added = added.len(), "filled missing timezones");
            None
        }
        Err(err @ CoreError::UnresolvedTimezones { .. }) => Some(err),
        Err(err) => return Err(err.into()),
    };

    let rendered = calendar.to_ics();
    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write ICS file {}", path.display()))?,
        None => print!("{rendered}"),
    }

    match unresolved {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn run_lint(args: ReportArgs) -> Result<()> {
    let calendar = read_calendar(&args.input.ics)?;
    let findings = lint_timezones(&calendar);

    match args.format {
        OutputFormat::Json => print_json(&findings)?,
        OutputFormat::Text => print_lint_text(&findings),
    }

    Ok(())
}

fn run_vtimezone(args: VtimezoneArgs) -> Result<()> {
    let provider = build_provider(args.window)?;
    let block = timezone_component(&TimezoneId::from(args.tz.as_str()), &provider)?;
    print!("{}", block.to_ics());
    Ok(())
}

fn read_calendar(path: &Path) -> Result<Calendar> {
    let raw = fs::read(path)
        .with_context(|| format!("failed to read ICS file {}", path.display()))?;
    Calendar::from_bytes(&raw)
        .with_context(|| format!("failed to parse ICS file {}", path.display()))
}

fn build_provider(window: WindowArgs) -> Result<TzdbProvider> {
    let window = TransitionWindow::new(window.first_year, window.last_year)?;
    Ok(TzdbProvider::new(window))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let raw = serde_json::to_value(value)?;
    let canonical = canonical_json(&raw);
    println!("{}", serde_json::to_string_pretty(&canonical)?);
    Ok(())
}

fn print_report_text(report: &TimezoneReport) {
    for tzid in &report.used {
        println!("used: {tzid}");
    }
    for tzid in &report.defined {
        println!("defined: {tzid}");
    }
    for tzid in &report.missing {
        println!("missing: {tzid}");
    }
}

fn print_lint_text(findings: &Findings) {
    for finding in &findings.errors {
        println!("ERROR {}: {}", finding.code, finding.message);
    }
    for finding in &findings.warnings {
        println!("WARN {}: {}", finding.code, finding.message);
    }
    for finding in &findings.hints {
        println!("HINT {}: {}", finding.code, finding.message);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code_for_error(err: &anyhow::Error) -> u8 {
    if let Some(
        CoreError::UnresolvedTimezones { .. }
        | CoreError::UnknownTimezone(_)
        | CoreError::UtcDefinition,
    ) = err.downcast_ref::<CoreError>()
    {
        3
    } else {
        2
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code_for_error(&err))
        }
    }
}
