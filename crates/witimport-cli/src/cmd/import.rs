//! Import subcommand - post CSV rows as work item comments

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use witimport_comments::{
    Dispatcher, FAILED_FILENAME, FileSink, ReqwestTransport, expand, import_csv, parse_input,
    read_source, render_comment, token_count,
};
use witimport_core::{HttpConfig, RetryPolicy, SharedProgress, current_thread_runtime, fmt_num};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// CSV file with `Title` and `WorkItemId` columns
    pub file: PathBuf,

    /// Organization URL (e.g. https://dev.azure.com/myorg/)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Project name
    #[arg(short, long)]
    pub project: Option<String>,

    /// Access token (default: config file or AZURE_DEVOPS_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Directory for import-failed.csv
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Parse and expand only; show what would be posted
    #[arg(long)]
    pub dry_run: bool,

    /// Also print the failure file as a base64 data URI on stdout
    #[arg(long)]
    pub print_data_uri: bool,
}

/// Merge CLI arguments over the config file.
fn pipeline_config(args: &ImportArgs, config: &Config) -> witimport_comments::Config {
    witimport_comments::Config {
        base_url: args
            .base_url
            .clone()
            .unwrap_or_else(|| config.devops.base_url.clone()),
        project: args
            .project
            .clone()
            .unwrap_or_else(|| config.devops.project.clone()),
        api_version: config.devops.api_version.clone(),
        token: args
            .token
            .clone()
            .or_else(|| config.devops.token.clone())
            .unwrap_or_default(),
        retry: RetryPolicy::new(
            config.http.max_attempts,
            Duration::from_millis(config.http.base_delay_ms),
        ),
        http: HttpConfig {
            request_timeout: Duration::from_secs(config.http.request_timeout),
            ..HttpConfig::default()
        },
    }
}

pub fn run(args: ImportArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let text = read_source(&args.file)?;

    if args.dry_run {
        return preview(&text);
    }

    let settings = pipeline_config(&args, config);
    settings.validate().context("Incomplete configuration")?;

    let transport =
        ReqwestTransport::from_config(&settings.http).context("Failed to build HTTP client")?;
    let dispatcher = Dispatcher::from_config(&settings, transport);
    let sink = FileSink::new(args.output.clone().unwrap_or_else(|| config.output.dir.clone()));

    log::info!(
        "Importing {} into {}{}",
        args.file.display(),
        settings.endpoint().base_url(),
        settings.project
    );

    let runtime = current_thread_runtime().context("Failed to start async runtime")?;
    let pb = progress.records_bar("import", 0);
    let summary = runtime.block_on(import_csv(&text, &dispatcher, &sink, &pb))?;

    let report = &summary.report;
    if report.failures.is_empty() {
        progress.println(format!(
            "Added {} comments from {} rows",
            fmt_num(report.succeeded),
            fmt_num(summary.rows)
        ));
        return Ok(());
    }

    match &summary.export {
        Some(export) => {
            if args.print_data_uri {
                println!("{}", export.data_uri());
            }
            anyhow::bail!(
                "{} of {} comments failed; re-import {}",
                fmt_num(report.failed()),
                fmt_num(report.total),
                sink.path_for(FAILED_FILENAME).display()
            )
        }
        None => anyhow::bail!(
            "{} of {} comments failed and {FAILED_FILENAME} could not be written",
            fmt_num(report.failed()),
            fmt_num(report.total)
        ),
    }
}

/// Dry run: show the expansion without touching the network.
fn preview(text: &str) -> Result<()> {
    let rows = parse_input(text)?;
    let records = expand(&rows);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Work item").fg(Color::Cyan),
            Cell::new("Title").fg(Color::Cyan),
            Cell::new("Columns").fg(Color::Cyan),
        ]);
    for rec in &records {
        log::debug!("#{}: {}", rec.work_item_id, render_comment(rec).text);
        let columns: Vec<&str> = rec.fields.keys().map(String::as_str).collect();
        table.add_row(vec![
            rec.work_item_id.to_string(),
            rec.title.clone(),
            columns.join(", "),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!(
        "{} rows, {} comments, {} invalid ids skipped",
        fmt_num(rows.len()),
        fmt_num(records.len()),
        fmt_num(token_count(&rows) - records.len())
    );
    Ok(())
}
