/*
 * Error Module
 *
 * The simulation itself is infallible. Errors only come from loading and
 * validating configuration supplied by the host.
 */

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("unknown device tier `{0}` (expected `standard` or `constrained`)")]
    UnknownTier(String),
}
