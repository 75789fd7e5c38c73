use std::fs;

use excerpt_core::{ConfigError, OutputKind, PluginConfiguration};
use tempfile::TempDir;

const RON_CONFIG: &str = r#"(
    sources: {
        "default": (
            type: "htmlQuery",
            sourceField: "html",
            ignoreSelector: Some("img"),
            truncate: Some((length: 20, byWords: true)),
        ),
    },
    sourceSets: { "markdownHtml": ["default"] },
    excerpts: {
        "summary": (type: text, nodeTypeSourceSet: { "*": "markdownHtml" }),
    },
)"#;

#[test]
fn loads_ron_by_extension() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("excerpts.ron");
    fs::write(&path, RON_CONFIG).unwrap();

    let config = PluginConfiguration::load(&path).unwrap();
    let default = &config.sources["default"];
    assert_eq!(default.ignore_selector.as_deref(), Some("img"));
    let truncate = default.truncate.as_ref().unwrap();
    assert!(truncate.by_words);
    assert_eq!(truncate.ellipsis, "...");
    assert_eq!(config.excerpts["summary"].output, OutputKind::Text);
}

#[test]
fn loads_json_by_extension() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("excerpts.JSON");
    fs::write(
        &path,
        r#"{ "sourceSets": { "empty": [] }, "excerpts": {} }"#,
    )
    .unwrap();

    let config = PluginConfiguration::load(&path).unwrap();
    assert!(config.sources.is_empty());
    assert_eq!(config.source_sets["empty"], Vec::<String>::new());
}

#[test]
fn dangling_references_load_fine() {
    let config = PluginConfiguration::from_json_str(
        r#"{ "excerpts": { "snippet": { "type": "html", "nodeTypeSourceSet": { "Post": "nope" } } } }"#,
    )
    .unwrap();
    assert_eq!(config.validate().len(), 1);
}

#[test]
fn unknown_extension_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("excerpts.yaml");
    fs::write(&path, "sources: {}").unwrap();

    let err = PluginConfiguration::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
}

#[test]
fn missing_file_reports_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.json");

    let err = PluginConfiguration::load(&path).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}
