/// Reporting sink for conditions the core recovers from on its own.
///
/// The core never prints. Anything worth telling the user (an over-tight
/// filter, an invalid catalog) goes through a `Reporter` supplied by the caller.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Debug,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Debug => "debug",
        })
    }
}

pub trait Reporter {
    fn report(&self, severity: Severity, message: &str);

    fn error(&self, message: &str) {
        self.report(Severity::Error, message);
    }

    fn warning(&self, message: &str) {
        self.report(Severity::Warning, message);
    }

    fn info(&self, message: &str) {
        self.report(Severity::Info, message);
    }

    fn debug(&self, message: &str) {
        self.report(Severity::Debug, message);
    }
}

/// Forwards to `tracing` under the `tasteduel` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => tracing::error!(target: "tasteduel", "{message}"),
            Severity::Warning => tracing::warn!(target: "tasteduel", "{message}"),
            Severity::Info => tracing::info!(target: "tasteduel", "{message}"),
            Severity::Debug => tracing::debug!(target: "tasteduel", "{message}"),
        }
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _severity: Severity, _message: &str) {}
}
