//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 10-19   | input data       | Log and reference-table parsing          |
//! | 20-29   | registry         | Wavelog API communication                |
//! | 30-39   | export           | Reconciliation and file output           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Input data (10-19)
// =============================================================================

/// Log file cannot be read or contains no usable records.
pub const EXIT_LOG_PARSE: u8 = 10;

/// DXCC reference table cannot be read.
pub const EXIT_REFERENCE_TABLE: u8 = 11;

// =============================================================================
// Registry (20-29)
// =============================================================================

/// Network/HTTP error talking to the registry.
pub const EXIT_REGISTRY_NETWORK: u8 = 20;

/// Registry answered with a payload shape it is not supposed to produce.
pub const EXIT_REGISTRY_PROTOCOL: u8 = 21;

/// One or more station creations failed or were rejected.
pub const EXIT_REGISTRY_CREATE: u8 = 22;

// =============================================================================
// Export (30-39)
// =============================================================================

/// Ambiguous stations left unresolved (check refuses to pass them).
pub const EXIT_UNRESOLVED: u8 = 30;

/// Export directory or file could not be written.
pub const EXIT_EXPORT_IO: u8 = 31;
