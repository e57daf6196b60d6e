//! witimport core - shared infrastructure for the CSV comment importer
//!
//! Logging, progress reporting, the pooled HTTP client with its error
//! taxonomy, and backoff timing. Nothing in here knows about CSV rows or
//! work items.

pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;

// Re-exports for convenience
pub use http::{HttpConfig, TransportError, build_client, current_thread_runtime};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use retry::RetryPolicy;
