//! Tracing setup shared by the trainlog binary and tests.
//!
//! Diagnostics always go to stderr. Stdout is reserved for command output
//! (tables, prescriptions, JSON).

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How chatty the CLI should be
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Warnings and errors only
    Quiet,
    #[default]
    Normal,
    /// Debug output, including per-row parse diagnostics
    Verbose,
}

impl Verbosity {
    /// Map `-q` / `-v` command-line flags; quiet wins
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose > 0 {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    pub fn level(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }

    /// Filter directives: our crates at this level, dependencies at warn
    fn directives(&self) -> String {
        let level = self.level();
        format!("warn,trainlog={level},trainlog_core={level}")
    }
}

/// Initialize logging
///
/// `RUST_LOG` overrides the verbosity when set.
pub fn init_with(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(verbosity == Verbosity::Verbose)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
