//! Error types for nextgsim

use thiserror::Error;

/// Error types shared by the nextgsim crates.
#[derive(Debug, Error)]
pub enum Error {
    /// YAML parsing errors.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}
