use std::collections::HashMap;

use excerpt_logging::{excerpt_info, excerpt_trace, excerpt_warn};
use serde_json::Value;
use thiserror::Error;

/// Ambient information handed to a [`FieldResolver`].
///
/// `request` is the context of the excerpt field being resolved, not of the
/// source field. Fields whose value depends on their own arguments may
/// therefore resolve differently than when queried directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveContext {
    pub excerpt: String,
    pub node_type: String,
    pub request: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("node type `{node_type}` has no field `{field}`")]
    UnknownField { node_type: String, field: String },
    #[error("failed to resolve field `{field}`: {message}")]
    Failed { field: String, message: String },
}

/// The host's per-field value resolution.
///
/// Returning `Value::Null` means the field exists but has no value on this node.
#[async_trait::async_trait]
pub trait FieldResolver: Send + Sync {
    async fn resolve(
        &self,
        node: &Value,
        field: &str,
        context: &ResolveContext,
    ) -> Result<Value, FieldError>;
}

/// Resolves fields straight from a JSON node object.
///
/// Dotted names walk nested objects, so `frontmatter.description` reads
/// `node["frontmatter"]["description"]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFieldResolver;

#[async_trait::async_trait]
impl FieldResolver for JsonFieldResolver {
    async fn resolve(
        &self,
        node: &Value,
        field: &str,
        context: &ResolveContext,
    ) -> Result<Value, FieldError> {
        field
            .split('.')
            .try_fold(node, |current, key| current.as_object()?.get(key))
            .cloned()
            .ok_or_else(|| FieldError::UnknownField {
                node_type: context.node_type.clone(),
                field: field.to_string(),
            })
    }
}

/// Field values resolved during one excerpt resolution.
///
/// Every field name is resolved at most once; failures are remembered as absent.
#[derive(Debug, Default)]
pub struct FieldValueCache {
    values: HashMap<String, Option<Value>>,
}

impl FieldValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of `field` on `node`, or `None` when it is missing, null or failed.
    pub async fn get_or_resolve(
        &mut self,
        resolver: &dyn FieldResolver,
        node: &Value,
        field: &str,
        context: &ResolveContext,
    ) -> Option<&Value> {
        if !self.values.contains_key(field) {
            let value = match resolver.resolve(node, field, context).await {
                Ok(Value::Null) => None,
                Ok(value) => Some(value),
                Err(err @ FieldError::UnknownField { .. }) => {
                    excerpt_info!("excerpt `{}`: {}", context.excerpt, err);
                    None
                }
                Err(err) => {
                    excerpt_warn!(
                        "excerpt `{}` on {} node: {}",
                        context.excerpt,
                        context.node_type,
                        err
                    );
                    None
                }
            };
            excerpt_trace!("field `{}` resolved (present: {})", field, value.is_some());
            self.values.insert(field.to_string(), value);
        }
        self.values.get(field).and_then(Option::as_ref)
    }
}
