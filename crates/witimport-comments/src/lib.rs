//! witimport comments - bulk CSV to work item discussion pipeline
//!
//! Reads a CSV whose `WorkItemId` column lists one or more work item ids
//! (separated by `;`), renders every other column as an HTML table and
//! posts it as a comment on each listed work item. Transient failures are
//! retried with exponential backoff; whatever still fails is written back
//! out as `import-failed.csv`, ready to be imported again.
//!
//! # Example
//!
//! ```ignore
//! use witimport_comments::{Config, Dispatcher, FileSink, ReqwestTransport, import_csv};
//!
//! let config = Config {
//!     base_url: "https://dev.azure.com/myorg/".into(),
//!     project: "MyProject".into(),
//!     token: std::env::var("AZURE_DEVOPS_TOKEN")?,
//!     ..Default::default()
//! };
//! let transport = ReqwestTransport::from_config(&config.http)?;
//! let dispatcher = Dispatcher::from_config(&config, transport);
//! let sink = FileSink::new(".");
//!
//! let text = witimport_comments::read_source("comments.csv".as_ref())?;
//! let summary = import_csv(&text, &dispatcher, &sink, &indicatif::ProgressBar::hidden()).await?;
//! println!("{} comments added", summary.report.succeeded);
//! ```
//!
//! All dispatches run concurrently with no cap on in-flight requests. Very
//! large files therefore open as many connections as the client pool and
//! server allow at once.

pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod expand;
pub mod export;
pub mod record;
pub mod render;
pub mod runner;

// Re-exports
pub use config::Config;
pub use dispatch::{CommentTransport, Dispatcher, Outcome, ReqwestTransport};
pub use endpoint::Endpoint;
pub use error::{ExportError, InputError, ParseError};
pub use expand::{clean_identifier, expand, token_count};
pub use export::{DownloadSink, FAILED_FILENAME, FailureExport, FileSink, deliver_failures};
pub use record::{ExpandedRecord, Row, WorkItemId, parse_input, parse_rows, read_source};
pub use render::{CommentBody, render_comment};
pub use runner::{FailureSet, ImportSummary, RunReport, import_csv, submit_all};
