use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use enel_invoice_ocr::{
    ExtractOptions, ExtractionReport, Invoice, LayoutMode, OcrOutput, RecordedOcr,
    extract_invoice, geometry, line_items, load_rules, meter_readings, tax_lines, write_csv,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "invoice2json",
    version,
    about = "Rebuild utility invoice tables and fields from recorded OCR output"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Assemble a whole invoice from per-region OCR output.
    Extract(ExtractArgs),
    /// Rebuild a single table from one region's OCR output.
    Table(TableArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TableKind {
    LineItems,
    MeterReadings,
    TaxLines,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// JSON object mapping region names to OCR output.
    #[arg(short, long)]
    input: PathBuf,

    /// Output path.
    #[arg(short, long)]
    output: PathBuf,

    /// json writes the whole invoice, csv only its line items.
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// auto, v1 or v2.
    #[arg(long, default_value = "auto")]
    layout: String,

    /// Layout anchor rules (JSON).
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct TableArgs {
    /// OCR output of one region: {"texts": [...], "boxes": [...], "scores": [...]}.
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path.
    #[arg(short, long)]
    output: PathBuf,

    #[arg(long, value_enum)]
    kind: TableKind,
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    let layout = LayoutMode::from_str(&args.layout)
        .map_err(|error| anyhow!("invalid layout: {error}"))
        .context("failed to parse --layout")?;

    let mut options = ExtractOptions::default().with_layout(layout);
    if let Some(path) = &args.rules {
        let rules = load_rules(path)
            .with_context(|| format!("failed to load layout rules '{}'", path.display()))?;
        options = options.with_rules(rules);
    }
    Ok(options)
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!(
        "warning: {} issue(s) detected (layout {})",
        report.warnings.len(),
        report.layout
    );
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} region={:?}: {}",
                warning.code, warning.region, warning.message
            );
        }
    }
}

fn write_invoice(invoice: &Invoice, output: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(invoice).context("failed to encode invoice")?;
            fs::write(output, json + "\n")
                .with_context(|| format!("failed to write '{}'", output.display()))
        }
        OutputFormat::Csv => write_csv(output, &invoice.invoice_items)
            .with_context(|| format!("failed to write '{}'", output.display())),
    }
}

fn run_extract(args: &ExtractArgs) -> Result<(Invoice, ExtractionReport)> {
    let options = parse_options(args)?;
    let recorded = RecordedOcr::from_path(&args.input)
        .with_context(|| format!("failed to read OCR recording '{}'", args.input.display()))?;
    let (invoice, report) = extract_invoice(&recorded, &options)
        .with_context(|| format!("failed to extract invoice from '{}'", args.input.display()))?;
    write_invoice(&invoice, &args.output, args.format)?;
    Ok((invoice, report))
}

fn run_table(args: &TableArgs) -> Result<usize> {
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let output: OcrOutput = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse OCR output '{}'", args.input.display()))?;
    let tokens = geometry::tokens_from_ocr(&output);

    let written = match args.kind {
        TableKind::LineItems => {
            let records = line_items::extract(&tokens);
            write_csv(&args.output, &records).map(|()| records.len())
        }
        TableKind::MeterReadings => {
            let records = meter_readings::extract(&tokens);
            write_csv(&args.output, &records).map(|()| records.len())
        }
        TableKind::TaxLines => {
            let records = tax_lines::extract(&tokens);
            write_csv(&args.output, &records).map(|()| records.len())
        }
    };
    written.with_context(|| format!("failed to write '{}'", args.output.display()))
}

fn exit_for_rows(rows: usize) -> ExitCode {
    if rows > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("enel_invoice_ocr=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Extract(args) => run_extract(&args).map(|(invoice, report)| {
            log_report(&report, args.verbose);
            invoice.invoice_items.len()
        }),
        Commands::Table(args) => run_table(&args),
    };

    match result {
        Ok(rows) => exit_for_rows(rows),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
