//! Shared CLI plumbing: pipeline steps, reports and the error type used
//! by every subcommand. The binary in `main.rs` is argument parsing and
//! dispatch only.

pub mod exit_codes;
pub mod pipeline;

use exit_codes::*;

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn log_parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_LOG_PARSE, message: msg.into(), hint: None }
    }

    pub fn reference_table(msg: impl Into<String>) -> Self {
        Self { code: EXIT_REFERENCE_TABLE, message: msg.into(), hint: None }
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self { code: EXIT_REGISTRY_NETWORK, message: msg.into(), hint: None }
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self { code: EXIT_REGISTRY_PROTOCOL, message: msg.into(), hint: None }
    }

    pub fn creation(msg: impl Into<String>) -> Self {
        Self { code: EXIT_REGISTRY_CREATE, message: msg.into(), hint: None }
    }

    pub fn unresolved(msg: impl Into<String>) -> Self {
        Self { code: EXIT_UNRESOLVED, message: msg.into(), hint: None }
    }

    pub fn export_io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_EXPORT_IO, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
