//! witimport - bulk-import CSV rows as work item discussion comments
//!
//! Every row becomes an HTML table comment on each work item listed in its
//! `WorkItemId` column. Rows that could not be posted are written to
//! `import-failed.csv`, which can be fed straight back in.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "witimport")]
#[command(about = "Import CSV rows as work item discussion comments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (includes request URLs and payloads)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./witimport.toml or ~/.config/witimport/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Timeout in seconds for a single request attempt
    #[arg(long, global = true)]
    request_timeout: Option<u64>,

    /// Total attempts per comment, including the first
    #[arg(long, global = true)]
    max_attempts: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Post one comment per work item id listed in a CSV file
    Import(cmd::import::ImportArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = Arc::new(witimport_core::ProgressContext::new());

    // Logging:
    //   TTY:     info through the progress bar, debug with --debug
    //   non-TTY: plain lines on stderr
    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    witimport_core::init_logging(false, cli.debug, multi);

    let mut config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    // CLI overrides config file
    if let Some(secs) = cli.request_timeout {
        config.http.request_timeout = secs;
    }
    if let Some(attempts) = cli.max_attempts {
        config.http.max_attempts = attempts;
    }

    match cli.command {
        Command::Import(args) => cmd::import::run(args, &config, &progress),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec!["Base URL", &config.devops.base_url]);
            table.add_row(vec![
                "Project",
                if config.devops.project.is_empty() {
                    "not set"
                } else {
                    config.devops.project.as_str()
                },
            ]);
            table.add_row(vec!["API version", &config.devops.api_version]);
            table.add_row(vec![
                "Access token",
                if config.devops.token.is_some() {
                    "configured"
                } else {
                    "not set"
                },
            ]);
            table.add_row(vec![
                "Request timeout",
                &format!("{}s", config.http.request_timeout),
            ]);
            table.add_row(vec!["Max attempts", &config.http.max_attempts.to_string()]);
            table.add_row(vec![
                "Backoff base",
                &format!("{}ms", config.http.base_delay_ms),
            ]);
            table.add_row(vec![
                "Failure file dir",
                &config.output.dir.display().to_string(),
            ]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
