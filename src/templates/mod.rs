//! Embedded templates for Triad files.

/// Default `triad.toml` configuration.
pub(crate) const TRIAD_TOML: &str = include_str!("triad.toml");
