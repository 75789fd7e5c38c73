use std::collections::BTreeMap;
use std::sync::Arc;

use excerpt_core::{ExcerptError, OutputKind};
use serde_json::Value;

use crate::ExcerptResolver;

/// Exposes configured excerpts as fields on node types.
#[derive(Debug, Clone)]
pub struct SchemaFieldBinder {
    resolver: Arc<ExcerptResolver>,
}

impl SchemaFieldBinder {
    pub fn new(resolver: Arc<ExcerptResolver>) -> Self {
        Self { resolver }
    }

    /// Excerpt fields for `node_type`, keyed by excerpt name.
    ///
    /// An excerpt is included when it maps `node_type` or has a `*` entry.
    pub fn fields_for(&self, node_type: &str) -> BTreeMap<String, ExcerptField> {
        self.resolver
            .config()
            .excerpts
            .iter()
            .filter(|(_, excerpt)| excerpt.applies_to(node_type))
            .map(|(name, excerpt)| {
                let field = ExcerptField {
                    name: name.clone(),
                    node_type: node_type.to_string(),
                    output: excerpt.output,
                    resolver: Arc::clone(&self.resolver),
                };
                (name.clone(), field)
            })
            .collect()
    }
}

/// A lazily resolved excerpt field; nothing is extracted until [`ExcerptField::resolve`].
#[derive(Debug, Clone)]
pub struct ExcerptField {
    name: String,
    node_type: String,
    output: OutputKind,
    resolver: Arc<ExcerptResolver>,
}

impl ExcerptField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn output(&self) -> OutputKind {
        self.output
    }

    /// Resolve the excerpt for `node`; every call starts with an empty field cache.
    pub async fn resolve(
        &self,
        node: &Value,
        request: &Value,
    ) -> Result<Option<String>, ExcerptError> {
        self.resolver
            .resolve_excerpt(&self.name, &self.node_type, node, request)
            .await
    }
}
