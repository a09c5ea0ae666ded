use std::path::PathBuf;

use thiserror::Error;

/// A state-machine transition bug. Never masked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InteractionError {
    #[error("selection gesture in progress without an anchor")]
    MissingAnchor,
}

/// Failure reported by a host collaborator. The controller logs and drops
/// these; selection state is unaffected.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
    #[error("failed to launch {uri}: {reason}")]
    Launch { uri: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config file {path:?}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}
