use std::collections::BTreeMap;

use excerpt_core::ExcerptError;
use excerpt_engine::SchemaFieldBinder;
use excerpt_logging::excerpt_warn;
use serde::Serialize;
use serde_json::Value;

/// One output line: the node's id and every excerpt bound to its type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeExcerpts {
    pub id: Value,
    pub excerpts: BTreeMap<String, Option<String>>,
}

/// Node type of a Gatsby-style node (`internal.type`).
pub fn node_type(node: &Value) -> Option<&str> {
    node.pointer("/internal/type").and_then(Value::as_str)
}

/// Resolve every excerpt field bound to `node`'s type.
pub async fn excerpts_for_node(
    binder: &SchemaFieldBinder,
    node: &Value,
) -> Result<NodeExcerpts, ExcerptError> {
    let id = node.get("id").cloned().unwrap_or(Value::Null);
    let Some(node_type) = node_type(node) else {
        excerpt_warn!("node {} has no internal.type, skipping", id);
        return Ok(NodeExcerpts {
            id,
            excerpts: BTreeMap::new(),
        });
    };

    let mut excerpts = BTreeMap::new();
    for (name, field) in binder.fields_for(node_type) {
        let value = field.resolve(node, &Value::Null).await?;
        excerpts.insert(name, value);
    }
    Ok(NodeExcerpts { id, excerpts })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use excerpt_core::PluginConfiguration;
    use excerpt_engine::{ExcerptResolver, JsonFieldResolver};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn binder(config: &str) -> SchemaFieldBinder {
        let config = PluginConfiguration::from_json_str(config).unwrap();
        let resolver = ExcerptResolver::new(Arc::new(config), Arc::new(JsonFieldResolver));
        SchemaFieldBinder::new(Arc::new(resolver))
    }

    const CONFIG: &str = r#"{
        "sources": { "default": { "type": "htmlQuery", "sourceField": "html", "stripSelector": "a" } },
        "sourceSets": { "markdownHtml": ["default"] },
        "excerpts": {
            "snippet": { "type": "html", "nodeTypeSourceSet": { "MarkdownRemark": "markdownHtml" } },
            "plain": { "type": "text", "nodeTypeSourceSet": { "MarkdownRemark": "markdownHtml" } }
        }
    }"#;

    #[tokio::test]
    async fn renders_all_bound_excerpts() {
        let node = json!({
            "id": "post-1",
            "internal": { "type": "MarkdownRemark" },
            "html": "<p>Go <a href=\"/\">home</a></p>"
        });

        let output = excerpts_for_node(&binder(CONFIG), &node).await.unwrap();

        assert_eq!(output.id, json!("post-1"));
        assert_eq!(
            output.excerpts,
            BTreeMap::from([
                ("plain".to_string(), Some("Go home".to_string())),
                ("snippet".to_string(), Some("<p>Go home</p>".to_string())),
            ])
        );
        assert_eq!(
            serde_json::to_string(&output).unwrap(),
            r#"{"id":"post-1","excerpts":{"plain":"Go home","snippet":"<p>Go home</p>"}}"#
        );
    }

    #[tokio::test]
    async fn unbound_and_untyped_nodes_get_no_excerpts() {
        let binder = binder(CONFIG);

        let page = json!({ "id": 2, "internal": { "type": "SitePage" }, "html": "<p>x</p>" });
        assert!(excerpts_for_node(&binder, &page).await.unwrap().excerpts.is_empty());

        let untyped = json!({ "id": 3, "html": "<p>x</p>" });
        assert!(excerpts_for_node(&binder, &untyped).await.unwrap().excerpts.is_empty());
    }

    #[tokio::test]
    async fn configuration_errors_abort() {
        let binder = binder(
            r#"{ "excerpts": { "snippet": { "type": "html", "nodeTypeSourceSet": { "*": "nope" } } } }"#,
        );
        let node = json!({ "id": 1, "internal": { "type": "Any" }, "html": "<p>x</p>" });

        let err = excerpts_for_node(&binder, &node).await.unwrap_err();
        assert_eq!(err.to_string(), "excerpt `snippet` refers to unknown source set `nope`");
    }
}
