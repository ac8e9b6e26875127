//! Error types for loading, configuring and running an IAT session.

use std::path::PathBuf;

/// Problems with the experiment configuration file or its values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Problems reading the stimulus table.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("cannot open stimulus table '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed stimulus table: {0}")]
    Csv(#[from] csv::Error),

    #[error("stimulus table has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("stimulus row {row} has no value for '{column}'")]
    MissingField { row: usize, column: &'static str },
}

/// Configuration faults detected while a session runs. None of them is
/// recoverable; the scheduler reports them as a configuration error outcome.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("instruction needs either text or an image")]
    EmptyInstruction,

    #[error("block '{block}': category '{label}' has no response key")]
    UnmappedCategory { block: String, label: String },

    #[error("block '{block}': no stimuli match the selected categories")]
    EmptySelection { block: String },

    #[error(
        "block '{block}': cannot avoid back-to-back repeats, one stimulus fills {count} of {len} slots"
    )]
    Unarrangeable {
        block: String,
        count: usize,
        len: usize,
    },

    #[error("condition '{0}' is not one of the configured conditions")]
    UnknownCondition(String),
}

/// Why a block or trial stopped early.
#[derive(Debug, thiserror::Error)]
pub enum Halt {
    #[error("session aborted by participant")]
    Abort,

    #[error(transparent)]
    Failed(#[from] SessionError),
}
