use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::OutputKind;

/// Misconfiguration detected while resolving an excerpt.
///
/// These are deployment defects rather than per-node data problems, so callers
/// should surface them as build failures instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExcerptError {
    #[error("unknown excerpt `{excerpt}`")]
    UnknownExcerpt { excerpt: String },
    #[error("excerpt `{excerpt}` has no source set for node type `{node_type}` and no `*` entry")]
    NoApplicableSourceSet { excerpt: String, node_type: String },
    #[error("excerpt `{excerpt}` refers to unknown source set `{source_set}`")]
    UnknownSourceSet { excerpt: String, source_set: String },
    #[error("source set `{source_set}` refers to unknown source `{source_name}`")]
    UnknownSource { source_set: String, source_name: String },
    #[error("source `{source_name}` has unknown strategy type `{strategy_type}`")]
    UnknownStrategyType {
        source_name: String,
        strategy_type: String,
    },
    #[error("source `{source_name}` has invalid selector `{selector}`: {message}")]
    InvalidSelector {
        source_name: String,
        selector: String,
        message: String,
    },
    #[error("source `{source_name}` cannot produce {kind} output")]
    UnsupportedOutput { source_name: String, kind: OutputKind },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid RON configuration: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("unsupported configuration format for {0:?} (expected .json or .ron)")]
    UnsupportedFormat(PathBuf),
}
