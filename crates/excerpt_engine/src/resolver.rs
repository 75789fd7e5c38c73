use std::fmt;
use std::sync::Arc;

use excerpt_core::{
    ExcerptError, OutputKind, PluginConfiguration, SourceConfiguration, StrategyRegistry,
};
use excerpt_logging::{excerpt_debug, excerpt_error};
use serde_json::Value;

use crate::{FieldResolver, FieldValueCache, ResolveContext};

/// Resolves named excerpts for content nodes.
///
/// Holds only read-only state; any number of resolutions may run at once,
/// each with its own [`FieldValueCache`].
pub struct ExcerptResolver {
    config: Arc<PluginConfiguration>,
    registry: Arc<StrategyRegistry>,
    fields: Arc<dyn FieldResolver>,
}

impl ExcerptResolver {
    /// Resolver using the built-in strategy types.
    pub fn new(config: Arc<PluginConfiguration>, fields: Arc<dyn FieldResolver>) -> Self {
        Self::with_registry(config, Arc::new(StrategyRegistry::default()), fields)
    }

    pub fn with_registry(
        config: Arc<PluginConfiguration>,
        registry: Arc<StrategyRegistry>,
        fields: Arc<dyn FieldResolver>,
    ) -> Self {
        Self {
            config,
            registry,
            fields,
        }
    }

    pub fn config(&self) -> &PluginConfiguration {
        &self.config
    }

    /// Resolve excerpt `excerpt_name` for `node` of type `node_type`.
    ///
    /// Sources of the applicable Source Set are tried in order and the first
    /// one producing a fragment wins; later Sources' fields are never resolved.
    /// `Ok(None)` means no Source found anything, which is not an error.
    pub async fn resolve_excerpt(
        &self,
        excerpt_name: &str,
        node_type: &str,
        node: &Value,
        request: &Value,
    ) -> Result<Option<String>, ExcerptError> {
        let excerpt = self.config.excerpts.get(excerpt_name).ok_or_else(|| {
            configuration_error(ExcerptError::UnknownExcerpt {
                excerpt: excerpt_name.to_string(),
            })
        })?;
        let source_set = excerpt.source_set_for(node_type).ok_or_else(|| {
            configuration_error(ExcerptError::NoApplicableSourceSet {
                excerpt: excerpt_name.to_string(),
                node_type: node_type.to_string(),
            })
        })?;
        let source_names = self.config.source_sets.get(source_set).ok_or_else(|| {
            configuration_error(ExcerptError::UnknownSourceSet {
                excerpt: excerpt_name.to_string(),
                source_set: source_set.to_string(),
            })
        })?;

        let context = ResolveContext {
            excerpt: excerpt_name.to_string(),
            node_type: node_type.to_string(),
            request: request.clone(),
        };
        let mut cache = FieldValueCache::new();

        for source_name in source_names {
            let source = self.config.sources.get(source_name).ok_or_else(|| {
                configuration_error(ExcerptError::UnknownSource {
                    source_set: source_set.to_string(),
                    source_name: source_name.clone(),
                })
            })?;

            let Some(value) = cache
                .get_or_resolve(self.fields.as_ref(), node, &source.source_field, &context)
                .await
            else {
                excerpt_debug!(
                    "excerpt `{}`: source `{}` skipped, field `{}` unavailable",
                    excerpt_name,
                    source_name,
                    source.source_field
                );
                continue;
            };

            if let Some(output) = self.run_source(source_name, source, value, excerpt.output)? {
                excerpt_debug!("excerpt `{}`: matched source `{}`", excerpt_name, source_name);
                return Ok(Some(output));
            }
        }

        excerpt_debug!(
            "excerpt `{}`: no source in `{}` matched {} node",
            excerpt_name,
            source_set,
            node_type
        );
        Ok(None)
    }

    // Kept synchronous: parsed fragments never live across an await.
    fn run_source(
        &self,
        source_name: &str,
        source: &SourceConfiguration,
        value: &Value,
        kind: OutputKind,
    ) -> Result<Option<String>, ExcerptError> {
        let strategy = self
            .registry
            .create(source_name, source)
            .map_err(configuration_error)?;
        let Some(fragment) = strategy.search(value) else {
            return Ok(None);
        };
        strategy
            .convert(&fragment, kind)
            .map(Some)
            .ok_or_else(|| {
                configuration_error(ExcerptError::UnsupportedOutput {
                    source_name: source_name.to_string(),
                    kind,
                })
            })
    }
}

impl fmt::Debug for ExcerptResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcerptResolver")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn configuration_error(err: ExcerptError) -> ExcerptError {
    excerpt_error!("{err}");
    err
}
