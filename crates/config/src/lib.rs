//! `stationsplit-config`: persistent settings for the CLI.

pub mod settings;

pub use settings::{normalize_url, Settings};
