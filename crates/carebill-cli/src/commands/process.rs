//! Process command - extract data from a single statement file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use carebill_core::invoice::rules::format_currency;
use carebill_core::{ExtractedInvoiceRecord, ExtractionResult, ExtractionWarning, StatementParser};

use super::{load_children, load_config, read_statement_text};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or text)
    #[arg(required = true)]
    input: PathBuf,

    /// JSON file with known children: [{"id", "name", "reference_number"}]
    #[arg(long)]
    children: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include the strategy that resolved each field
    #[arg(long)]
    show_trace: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    record: &'a ExtractedInvoiceRecord,
    warnings: &'a [ExtractionWarning],
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Reading statement...");
    pb.set_position(10);
    let text = read_statement_text(&args.input, &config.pdf)?;
    let children = load_children(args.children.as_deref())?;

    pb.set_message("Extracting statement data...");
    pb.set_position(50);
    let parser = StatementParser::from_config(&config.extraction);
    let result = parser.extract(&text, &children);

    pb.finish_and_clear();

    print_warnings(&result.warnings);

    let output = format_result(&result, args.format, args.show_trace)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn print_warnings(warnings: &[ExtractionWarning]) {
    for warning in warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }
}

pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    show_trace: bool,
) -> anyhow::Result<String> {
    let mut record = result.record.clone();
    if !show_trace {
        record.trace.clear();
    }

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&JsonOutput {
            record: &record,
            warnings: &result.warnings,
        })?),
        OutputFormat::Csv => format_csv(&record),
        OutputFormat::Text => Ok(format_text(&record, &result.warnings)),
    }
}

const CSV_HEADER: [&str; 19] = [
    "invoice_reference",
    "child_name",
    "child_reference",
    "matched_child_id",
    "provider_name",
    "fee_type",
    "issue_date",
    "due_date",
    "period_start",
    "period_end",
    "previous_balance",
    "original_amount",
    "discount_percentage",
    "discount_amount",
    "week_amount_due",
    "total_amount_due",
    "amount_due",
    "strategies",
    "status",
];

fn format_csv(record: &ExtractedInvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    let strategies = record
        .trace
        .iter()
        .map(|t| format!("{}={}", t.field, t.strategy))
        .collect::<Vec<_>>()
        .join(";");

    wtr.write_record(CSV_HEADER)?;
    wtr.write_record([
        record.invoice_reference.clone(),
        record.child_name.clone(),
        record.child_reference.clone(),
        record.matched_child_id.map(|id| id.to_string()).unwrap_or_default(),
        record.provider_name.clone(),
        record.fee_type.clone(),
        date(record.issue_date),
        date(record.due_date),
        date(record.period_start),
        date(record.period_end),
        record.previous_balance.to_string(),
        record.original_amount.to_string(),
        record.discount_percentage.to_string(),
        record.discount_amount.to_string(),
        record.week_amount_due.to_string(),
        record.total_amount_due.to_string(),
        record.amount_due.to_string(),
        strategies,
        "success".to_string(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &ExtractedInvoiceRecord, warnings: &[ExtractionWarning]) -> String {
    let mut output = String::new();
    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    let date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%d %b %Y").to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    output.push_str(&format!("Statement: {}\n", or_dash(&record.invoice_reference)));
    output.push_str(&format!("Provider:  {}\n", or_dash(&record.provider_name)));
    output.push_str(&format!("Issued:    {}\n", date(record.issue_date)));
    output.push_str(&format!("Due:       {}\n", date(record.due_date)));
    output.push_str(&format!(
        "Period:    {} - {}\n",
        date(record.period_start),
        date(record.period_end)
    ));
    output.push('\n');

    output.push_str("Child:\n");
    output.push_str(&format!("  {}\n", or_dash(&record.child_name)));
    output.push_str(&format!("  Reference: {}\n", or_dash(&record.child_reference)));
    match record.matched_child_id {
        Some(id) => output.push_str(&format!("  Matched:   #{}\n", id)),
        None => output.push_str("  Matched:   no\n"),
    }
    output.push('\n');

    output.push_str("Summary:\n");
    if !record.fee_type.is_empty() {
        output.push_str(&format!("  Fee type:         {}\n", record.fee_type));
    }
    push_amount(&mut output, "Previous balance", record.previous_balance);
    push_amount(&mut output, "Original amount", record.original_amount);
    if !record.discount_percentage.is_zero() {
        output.push_str(&format!("  Discount:         {}%\n", record.discount_percentage.round_dp(2)));
    }
    push_amount(&mut output, "Discount amount", record.discount_amount);
    push_amount(&mut output, "Week amount due", record.week_amount_due);
    push_amount(&mut output, "Total amount due", record.total_amount_due);

    if !record.trace.is_empty() {
        output.push_str("\nStrategies:\n");
        for trace in &record.trace {
            output.push_str(&format!(
                "  {:<20} {} ({:.2})\n",
                trace.field.as_str(),
                trace.strategy,
                trace.confidence
            ));
        }
    }

    if !warnings.is_empty() {
        output.push_str(&format!("\nWarnings: {}\n", warnings.len()));
    }

    output
}

fn push_amount(output: &mut String, label: &str, amount: Decimal) {
    output.push_str(&format!("  {:<17} {}\n", format!("{}:", label), format_currency(amount)));
}
