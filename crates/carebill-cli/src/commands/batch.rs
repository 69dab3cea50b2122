//! Batch processing command for multiple statement files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use carebill_core::models::config::CarebillConfig;
use carebill_core::{ExtractionResult, KnownChild, StatementParser, WarningKind};

use super::process::{format_result, OutputFormat};
use super::{is_statement_file, load_children, load_config, read_statement_text};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// JSON file with known children, shared by every statement
    #[arg(long)]
    children: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let children = load_children(args.children.as_deref())?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_statement_file(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    let parser = StatementParser::from_config(&config.extraction);

    for path in files {
        let file_start = Instant::now();
        let outcome = process_single_file(&path, &parser, &children, &config);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                results.push(ProcessResult {
                    path,
                    result: Some(result),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        result: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    let successful: Vec<_> = results.iter().filter(|r| r.result.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for processed in &successful {
            if let Some(result) = &processed.result {
                let output_name = processed
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("statement");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_result(result, args.format, false)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let with_warnings = successful
        .iter()
        .filter(|r| r.result.as_ref().is_some_and(|res| !res.warnings.is_empty()))
        .count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful ({} with warnings), {} failed",
        style(successful.len()).green(),
        style(with_warnings).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for processed in &failed {
            println!(
                "  - {}: {}",
                processed.path.display(),
                processed.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    parser: &StatementParser,
    children: &[KnownChild],
    config: &CarebillConfig,
) -> anyhow::Result<ExtractionResult> {
    let text = read_statement_text(path, &config.pdf)?;
    let result = parser.extract(&text, children);

    if result.has_warning(WarningKind::EmptyText) {
        anyhow::bail!("No text could be extracted");
    }

    Ok(result)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let processed_at = chrono::Local::now().to_rfc3339();

    wtr.write_record([
        "filename",
        "status",
        "invoice_reference",
        "child_name",
        "matched_child_id",
        "issue_date",
        "total_amount_due",
        "warnings",
        "processing_time_ms",
        "processed_at",
        "error",
    ])?;

    for processed in results {
        let filename = processed
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        if let Some(result) = &processed.result {
            let record = &result.record;
            let warnings = result
                .warnings
                .iter()
                .map(|w| w.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");

            wtr.write_record([
                filename,
                "success".to_string(),
                record.invoice_reference.clone(),
                record.child_name.clone(),
                record.matched_child_id.map(|id| id.to_string()).unwrap_or_default(),
                record.issue_date.map(|d| d.to_string()).unwrap_or_default(),
                record.total_amount_due.to_string(),
                warnings,
                processed.processing_time_ms.to_string(),
                processed_at.clone(),
                String::new(),
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                processed.processing_time_ms.to_string(),
                processed_at.clone(),
                processed.error.clone().unwrap_or_default(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
