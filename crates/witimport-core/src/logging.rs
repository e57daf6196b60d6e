//! Logging setup: env_logger behind the `log` facade, bridged through
//! indicatif so log lines do not tear the progress bar.

use indicatif::MultiProgress;

/// HTTP stack crates that are chatty at debug level
const QUIET_DEPENDENCIES: &str = "hyper=warn,hyper_util=warn,reqwest=warn,native_tls=warn";

/// Padded level label, optionally wrapped in an ANSI color.
fn level_label(level: log::Level, color: bool) -> String {
    let (label, ansi) = match level {
        log::Level::Error => ("ERROR", "\x1b[31m"),
        log::Level::Warn => ("WARN ", "\x1b[33m"),
        log::Level::Info => ("INFO ", "\x1b[32m"),
        log::Level::Debug => ("DEBUG", "\x1b[36m"),
        log::Level::Trace => ("TRACE", "\x1b[35m"),
    };
    if color {
        format!("{ansi}{label}\x1b[0m")
    } else {
        label.to_string()
    }
}

/// Filter string for the given verbosity, before `RUST_LOG` overrides it.
fn default_filter(quiet: bool, debug: bool) -> String {
    let level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    format!("{level},{QUIET_DEPENDENCIES}")
}

/// Logger that prints through indicatif MultiProgress to avoid mixing with progress bars.
pub struct IndicatifLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(inner: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.inner.matches(record) {
            return;
        }
        // Only installed on a TTY, so color is always on
        let line = format!("[{}] {}", level_label(record.level(), true), record.args());
        self.multi.suspend(|| eprintln!("{line}"));
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Initialize logging.
///
/// With `multi`, log lines go through the progress bars; without, plain
/// uncolored lines on stderr suitable for redirection.
pub fn init_logging(quiet: bool, debug: bool, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let env = env_logger::Env::default().default_filter_or(default_filter(quiet, debug));

    match multi {
        Some(multi) => {
            let logger = env_logger::Builder::from_env(env).build();
            let max_level = logger.filter();
            // A second init (tests, embedding) keeps the first logger
            if log::set_boxed_logger(Box::new(IndicatifLogger::new(logger, multi.clone()))).is_ok()
            {
                log::set_max_level(max_level);
            }
        }
        None => {
            // A second init (tests, embedding) keeps the first logger
            let _ = env_logger::Builder::from_env(env)
                .format(|buf, record| {
                    writeln!(buf, "[{}] {}", level_label(record.level(), false), record.args())
                })
                .try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_labels_are_padded() {
        assert_eq!(level_label(log::Level::Info, false), "INFO ");
        assert_eq!(level_label(log::Level::Warn, false), "WARN ");
        assert_eq!(level_label(log::Level::Error, false), "ERROR");
    }

    #[test]
    fn colored_label_resets() {
        let label = level_label(log::Level::Debug, true);
        assert!(label.starts_with("\x1b[36m"));
        assert!(label.ends_with("\x1b[0m"));
        assert!(label.contains("DEBUG"));
    }

    #[test]
    fn filter_levels() {
        assert!(default_filter(false, true).starts_with("debug,"));
        assert!(default_filter(true, false).starts_with("warn,"));
        assert!(default_filter(false, false).starts_with("info,"));
        // debug wins over quiet
        assert!(default_filter(true, true).starts_with("debug,"));
    }

    #[test]
    fn filter_silences_http_stack() {
        assert!(default_filter(false, true).contains("hyper=warn"));
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_logging(false, false, None);
        init_logging(false, true, None);
    }
}
