//! Excerpt core: configuration model and the pure HTML extraction pipeline.
mod config;
mod convert;
mod error;
mod extract;
mod strategy;
mod truncate;

pub use config::{
    ElementReplacement, ExcerptConfiguration, OutputKind, PluginConfiguration,
    SourceConfiguration, TruncateOptions, WILDCARD_NODE_TYPE,
};
pub use convert::{convert, to_html, to_text};
pub use error::{ConfigError, ExcerptError};
pub use extract::{Fragment, HtmlFragmentExtractor, QuerySettings};
pub use strategy::{
    Converter, HtmlQuery, Strategy, StrategyConstructor, StrategyRegistry, HTML_QUERY,
};
