use std::collections::HashMap;
use std::fmt;

use excerpt_logging::excerpt_debug;
use serde_json::Value;

use crate::convert::{to_html, to_text};
use crate::{
    ExcerptError, Fragment, HtmlFragmentExtractor, OutputKind, QuerySettings, SourceConfiguration,
};

/// Type tag of the built-in HTML query strategy.
pub const HTML_QUERY: &str = "htmlQuery";

pub type Converter = fn(&Fragment) -> String;

/// Runtime form of one Source: finds a fragment in a field value and knows
/// how to serialize it.
pub trait Strategy: Send + Sync {
    /// `None` means this Source has nothing to offer for the value.
    fn search(&self, field_value: &Value) -> Option<Fragment>;

    fn output_converters(&self) -> &HashMap<OutputKind, Converter>;

    fn convert(&self, fragment: &Fragment, kind: OutputKind) -> Option<String> {
        self.output_converters()
            .get(&kind)
            .map(|converter| converter(fragment))
    }
}

/// The `htmlQuery` strategy: selector based extraction from an HTML string field.
#[derive(Debug)]
pub struct HtmlQuery {
    settings: QuerySettings,
    converters: HashMap<OutputKind, Converter>,
}

impl HtmlQuery {
    pub fn new(source_name: &str, settings: &SourceConfiguration) -> Result<Self, ExcerptError> {
        Ok(Self {
            settings: QuerySettings::compile(source_name, settings)?,
            converters: HashMap::from([
                (OutputKind::Html, to_html as Converter),
                (OutputKind::Text, to_text as Converter),
            ]),
        })
    }
}

impl Strategy for HtmlQuery {
    fn search(&self, field_value: &Value) -> Option<Fragment> {
        let Some(html) = field_value.as_str() else {
            excerpt_debug!("htmlQuery expects a string field value, got {field_value}");
            return None;
        };
        HtmlFragmentExtractor.extract(html, &self.settings)
    }

    fn output_converters(&self) -> &HashMap<OutputKind, Converter> {
        &self.converters
    }
}

pub type StrategyConstructor = Box<
    dyn Fn(&str, &SourceConfiguration) -> Result<Box<dyn Strategy>, ExcerptError> + Send + Sync,
>;

/// Maps strategy type tags to constructors.
///
/// `StrategyRegistry::default()` knows `htmlQuery`; further types are added
/// with [`StrategyRegistry::register`].
pub struct StrategyRegistry {
    constructors: HashMap<String, StrategyConstructor>,
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, type_tag: impl Into<String>, constructor: F)
    where
        F: Fn(&str, &SourceConfiguration) -> Result<Box<dyn Strategy>, ExcerptError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors
            .insert(type_tag.into(), Box::new(constructor));
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.constructors.contains_key(type_tag)
    }

    /// Build the strategy for the Source named `source_name`.
    pub fn create(
        &self,
        source_name: &str,
        settings: &SourceConfiguration,
    ) -> Result<Box<dyn Strategy>, ExcerptError> {
        let constructor = self.constructors.get(&settings.strategy).ok_or_else(|| {
            ExcerptError::UnknownStrategyType {
                source_name: source_name.to_string(),
                strategy_type: settings.strategy.clone(),
            }
        })?;
        constructor(source_name, settings)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(HTML_QUERY, |name, settings| {
            Ok(Box::new(HtmlQuery::new(name, settings)?) as Box<dyn Strategy>)
        });
        registry
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&String> = self.constructors.keys().collect();
        tags.sort();
        f.debug_struct("StrategyRegistry")
            .field("types", &tags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Literal {
        converters: HashMap<OutputKind, Converter>,
    }

    impl Strategy for Literal {
        fn search(&self, field_value: &Value) -> Option<Fragment> {
            field_value
                .as_str()
                .map(|text| Fragment::parse(&format!("<span>{text}</span>")))
        }

        fn output_converters(&self) -> &HashMap<OutputKind, Converter> {
            &self.converters
        }
    }

    #[test]
    fn unknown_type_is_reported_with_source_name() {
        let registry = StrategyRegistry::default();
        let source = SourceConfiguration::new("regex", "body");
        let err = registry.create("bodyRegex", &source).err().unwrap();
        assert_eq!(
            err,
            ExcerptError::UnknownStrategyType {
                source_name: "bodyRegex".into(),
                strategy_type: "regex".into(),
            }
        );
    }

    #[test]
    fn registered_types_are_constructed() {
        let mut registry = StrategyRegistry::default();
        registry.register("literal", |_, _| {
            Ok(Box::new(Literal {
                converters: HashMap::from([(OutputKind::Text, to_text as Converter)]),
            }) as Box<dyn Strategy>)
        });
        assert!(registry.contains("literal"));

        let strategy = registry
            .create("lit", &SourceConfiguration::new("literal", "title"))
            .unwrap();
        let fragment = strategy.search(&json!("Hi")).unwrap();
        assert_eq!(strategy.convert(&fragment, OutputKind::Text).as_deref(), Some("Hi"));
        assert_eq!(strategy.convert(&fragment, OutputKind::Html), None);
    }

    #[test]
    fn html_query_ignores_non_string_values() {
        let strategy = StrategyRegistry::default()
            .create("default", &SourceConfiguration::new(HTML_QUERY, "html"))
            .unwrap();
        assert!(strategy.search(&json!({ "html": "<p>x</p>" })).is_none());
        assert!(strategy.search(&json!("<p>x</p>")).is_some());
    }
}
