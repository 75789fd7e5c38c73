use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ExcerptError};

/// Node type key that applies an excerpt to every node type without its own entry.
pub const WILDCARD_NODE_TYPE: &str = "*";

/// Representation an excerpt is serialized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Text,
    Html,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Text => write!(f, "text"),
            OutputKind::Html => write!(f, "html"),
        }
    }
}

/// A named extraction strategy bound to one field of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfiguration {
    /// Strategy type tag, looked up in the `StrategyRegistry`.
    #[serde(rename = "type")]
    pub strategy: String,
    pub source_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_selector: Option<String>,
    /// Applied in order; each rule sees the renames made by the rules before it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub element_replacements: Vec<ElementReplacement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncate: Option<TruncateOptions>,
}

impl SourceConfiguration {
    pub fn new(strategy: impl Into<String>, source_field: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            source_field: source_field.into(),
            excerpt_selector: None,
            ignore_selector: None,
            strip_selector: None,
            element_replacements: Vec::new(),
            truncate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementReplacement {
    pub selector: String,
    /// Tag name the matched elements are renamed to.
    pub replace_with: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruncateOptions {
    /// Maximum number of text characters (or words when `by_words` is set) to keep.
    pub length: usize,
    #[serde(default)]
    pub by_words: bool,
    #[serde(default = "default_ellipsis")]
    pub ellipsis: String,
}

fn default_ellipsis() -> String {
    "...".to_string()
}

impl TruncateOptions {
    pub fn chars(length: usize) -> Self {
        Self {
            length,
            by_words: false,
            ellipsis: default_ellipsis(),
        }
    }

    pub fn words(length: usize) -> Self {
        Self {
            by_words: true,
            ..Self::chars(length)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcerptConfiguration {
    #[serde(rename = "type")]
    pub output: OutputKind,
    /// Node type name (or `*`) to Source Set name.
    pub node_type_source_set: BTreeMap<String, String>,
}

impl ExcerptConfiguration {
    /// Source Set for `node_type`, falling back to the wildcard entry.
    pub fn source_set_for(&self, node_type: &str) -> Option<&str> {
        self.node_type_source_set
            .get(node_type)
            .or_else(|| self.node_type_source_set.get(WILDCARD_NODE_TYPE))
            .map(String::as_str)
    }

    pub fn applies_to(&self, node_type: &str) -> bool {
        self.source_set_for(node_type).is_some()
    }
}

/// Process-wide excerpt configuration. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfiguration {
    #[serde(default)]
    pub sources: BTreeMap<String, SourceConfiguration>,
    /// Ordered Source names; the first Source producing a fragment wins.
    #[serde(default)]
    pub source_sets: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub excerpts: BTreeMap<String, ExcerptConfiguration>,
}

impl PluginConfiguration {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Load a `.json` or `.ron` configuration file.
    ///
    /// Cross references are not checked here; see [`PluginConfiguration::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("json") => Self::from_json_str,
            Some("ron") => Self::from_ron_str,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&text)
    }

    /// Eagerly list every dangling Source Set and Source reference.
    ///
    /// Resolution never depends on this; the same problems are reported lazily
    /// the first time an affected excerpt is resolved.
    pub fn validate(&self) -> Vec<ExcerptError> {
        let mut problems = Vec::new();
        for (excerpt, settings) in &self.excerpts {
            for source_set in settings.node_type_source_set.values() {
                if !self.source_sets.contains_key(source_set) {
                    problems.push(ExcerptError::UnknownSourceSet {
                        excerpt: excerpt.clone(),
                        source_set: source_set.clone(),
                    });
                }
            }
        }
        for (source_set, names) in &self.source_sets {
            for name in names {
                if !self.sources.contains_key(name) {
                    problems.push(ExcerptError::UnknownSource {
                        source_set: source_set.clone(),
                        source_name: name.clone(),
                    });
                }
            }
        }
        problems.dedup();
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "sources": {
            "excerptElement": {
                "type": "htmlQuery",
                "sourceField": "html",
                "excerptSelector": ".excerpt",
                "stripSelector": "a"
            },
            "default": {
                "type": "htmlQuery",
                "sourceField": "html",
                "excerptSelector": "html > *",
                "ignoreSelector": "img, .gatsby-highlight",
                "elementReplacements": [{ "selector": "h1", "replaceWith": "h2" }],
                "truncate": { "length": 140 }
            }
        },
        "sourceSets": { "markdownHtml": ["excerptElement", "default"] },
        "excerpts": {
            "snippet": { "type": "html", "nodeTypeSourceSet": { "MarkdownRemark": "markdownHtml" } }
        }
    }"#;

    #[test]
    fn parses_camel_case_json() {
        let config = PluginConfiguration::from_json_str(SAMPLE).unwrap();
        assert_eq!(
            config.source_sets["markdownHtml"],
            vec!["excerptElement".to_string(), "default".to_string()]
        );
        let default = &config.sources["default"];
        assert_eq!(default.strategy, "htmlQuery");
        assert_eq!(default.ignore_selector.as_deref(), Some("img, .gatsby-highlight"));
        assert_eq!(
            default.element_replacements,
            vec![ElementReplacement {
                selector: "h1".into(),
                replace_with: "h2".into()
            }]
        );
        assert_eq!(default.truncate, Some(TruncateOptions::chars(140)));
        assert_eq!(config.excerpts["snippet"].output, OutputKind::Html);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn rejects_unknown_output_kind() {
        let text = r#"{ "excerpts": { "x": { "type": "markdown", "nodeTypeSourceSet": {} } } }"#;
        assert!(PluginConfiguration::from_json_str(text).is_err());
    }

    #[test]
    fn wildcard_is_only_a_fallback() {
        let excerpt = ExcerptConfiguration {
            output: OutputKind::Text,
            node_type_source_set: BTreeMap::from([
                ("Post".to_string(), "posts".to_string()),
                (WILDCARD_NODE_TYPE.to_string(), "fallback".to_string()),
            ]),
        };
        assert_eq!(excerpt.source_set_for("Post"), Some("posts"));
        assert_eq!(excerpt.source_set_for("Page"), Some("fallback"));
    }

    #[test]
    fn validate_reports_dangling_references() {
        let mut config = PluginConfiguration::from_json_str(SAMPLE).unwrap();
        config
            .source_sets
            .insert("broken".into(), vec!["nowhere".into()]);
        config.excerpts.insert(
            "summary".into(),
            ExcerptConfiguration {
                output: OutputKind::Text,
                node_type_source_set: BTreeMap::from([("*".into(), "missing".into())]),
            },
        );

        assert_eq!(
            config.validate(),
            vec![
                ExcerptError::UnknownSourceSet {
                    excerpt: "summary".into(),
                    source_set: "missing".into(),
                },
                ExcerptError::UnknownSource {
                    source_set: "broken".into(),
                    source_name: "nowhere".into(),
                },
            ]
        );
    }
}
