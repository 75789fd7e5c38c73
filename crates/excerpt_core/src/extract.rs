use ego_tree::{NodeId, Tree};
use excerpt_logging::excerpt_trace;
use scraper::{ElementRef, Html, Node, Selector};

use crate::truncate::truncate_fragment;
use crate::{ExcerptError, SourceConfiguration, TruncateOptions};

/// A Source's query rules with every selector already parsed.
#[derive(Debug, Clone)]
pub struct QuerySettings {
    /// `None` selects every top-level element of the field's markup.
    pub excerpt: Option<Selector>,
    pub ignore: Option<Selector>,
    pub strip: Option<Selector>,
    /// `(selector, tag name)` pairs, applied in order against the current tree.
    pub replacements: Vec<(Selector, String)>,
    pub truncate: Option<TruncateOptions>,
}

impl QuerySettings {
    pub fn compile(source_name: &str, settings: &SourceConfiguration) -> Result<Self, ExcerptError> {
        let parse = |selector: &Option<String>| {
            selector
                .as_deref()
                .map(|s| parse_selector(source_name, s))
                .transpose()
        };

        let replacements = settings
            .element_replacements
            .iter()
            .map(|rule| {
                let tag = rule.replace_with.trim().to_ascii_lowercase();
                if tag.is_empty() {
                    return Err(ExcerptError::InvalidSelector {
                        source_name: source_name.to_string(),
                        selector: rule.selector.clone(),
                        message: "replacement tag name is empty".to_string(),
                    });
                }
                Ok((parse_selector(source_name, &rule.selector)?, tag))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            excerpt: parse(&settings.excerpt_selector)?,
            ignore: parse(&settings.ignore_selector)?,
            strip: parse(&settings.strip_selector)?,
            replacements,
            truncate: settings.truncate.clone(),
        })
    }
}

fn parse_selector(source_name: &str, selector: &str) -> Result<Selector, ExcerptError> {
    Selector::parse(selector).map_err(|err| ExcerptError::InvalidSelector {
        source_name: source_name.to_string(),
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

/// Extracted markup. Only nodes reachable from the container are part of it;
/// whatever the pruning steps detached stays unreachable in the arena.
#[derive(Debug, Clone)]
pub struct Fragment {
    html: Html,
    container: NodeId,
}

impl Fragment {
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_fragment(markup);
        let container = html.root_element().id();
        Self { html, container }
    }

    fn container(&self) -> Option<ElementRef<'_>> {
        self.html.tree.get(self.container).and_then(ElementRef::wrap)
    }

    /// Concatenated markup of the fragment's top-level nodes.
    pub fn inner_html(&self) -> String {
        self.container()
            .map(|root| root.inner_html())
            .unwrap_or_default()
    }

    /// Text content with all markup stripped.
    pub fn text(&self) -> String {
        self.container()
            .map(|root| root.text().collect())
            .unwrap_or_default()
    }
}

/// Selector driven extraction:
/// - gathers the nodes matching the excerpt selector, in document order
/// - removes ignored subtrees
/// - unwraps stripped elements, keeping their children in place
/// - renames elements per replacement rule
/// - optionally truncates the remaining text.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlFragmentExtractor;

impl HtmlFragmentExtractor {
    /// Returns `None` when nothing but whitespace survives the pruning steps.
    pub fn extract(&self, html: &str, settings: &QuerySettings) -> Option<Fragment> {
        let mut document = Html::parse_fragment(html);
        // The fragment's implicit <html> element doubles as the output container.
        let container = document.root_element().id();

        let selected = match &settings.excerpt {
            Some(selector) => select_ids(&document, container, selector),
            None => element_children(&document.tree, container),
        };
        excerpt_trace!("excerpt selector matched {} element(s)", selected.len());
        gather(&mut document.tree, container, &selected);

        if let Some(selector) = &settings.ignore {
            for id in select_ids(&document, container, selector) {
                detach(&mut document.tree, id);
            }
        }

        if let Some(selector) = &settings.strip {
            for id in select_ids(&document, container, selector) {
                unwrap_element(&mut document.tree, id);
            }
        }

        // Each rule re-queries the tree, so later rules see earlier renames:
        // h2->h3 followed by h3->h4 turns an original h2 into h4.
        for (selector, tag) in &settings.replacements {
            for id in select_ids(&document, container, selector) {
                rename_element(&mut document.tree, id, tag);
            }
        }

        if !has_content(&document.tree, container) {
            return None;
        }

        if let Some(options) = &settings.truncate {
            truncate_fragment(&mut document.tree, container, options);
        }

        Some(Fragment {
            html: document,
            container,
        })
    }
}

fn select_ids(document: &Html, container: NodeId, selector: &Selector) -> Vec<NodeId> {
    document
        .tree
        .get(container)
        .and_then(ElementRef::wrap)
        .map(|root| {
            root.select(selector)
                .map(|element| element.id())
                .filter(|id| *id != container)
                .collect()
        })
        .unwrap_or_default()
}

fn element_children(tree: &Tree<Node>, container: NodeId) -> Vec<NodeId> {
    tree.get(container)
        .map(|root| {
            root.children()
                .filter(|child| child.value().is_element())
                .map(|child| child.id())
                .collect()
        })
        .unwrap_or_default()
}

/// Replace the container's children with `selected`, moving each node out of
/// wherever it currently sits.
fn gather(tree: &mut Tree<Node>, container: NodeId, selected: &[NodeId]) {
    let existing: Vec<NodeId> = tree
        .get(container)
        .map(|root| root.children().map(|child| child.id()).collect())
        .unwrap_or_default();
    for id in existing {
        detach(tree, id);
    }
    if let Some(mut root) = tree.get_mut(container) {
        for id in selected {
            root.append_id(*id);
        }
    }
}

fn detach(tree: &mut Tree<Node>, id: NodeId) {
    if let Some(mut node) = tree.get_mut(id) {
        node.detach();
    }
}

fn unwrap_element(tree: &mut Tree<Node>, id: NodeId) {
    let children: Vec<NodeId> = match tree.get(id) {
        Some(node) if node.parent().is_some() => node.children().map(|child| child.id()).collect(),
        _ => return,
    };
    if let Some(mut node) = tree.get_mut(id) {
        for child in children {
            node.insert_id_before(child);
        }
        node.detach();
    }
}

fn rename_element(tree: &mut Tree<Node>, id: NodeId, tag: &str) {
    if let Some(mut node) = tree.get_mut(id) {
        if let Node::Element(element) = node.value() {
            element.name.local = tag.into();
        }
    }
}

fn has_content(tree: &Tree<Node>, container: NodeId) -> bool {
    tree.get(container)
        .map(|root| {
            root.children().any(|child| match child.value() {
                Node::Element(_) => true,
                Node::Text(text) => !text.trim().is_empty(),
                _ => false,
            })
        })
        .unwrap_or(false)
}
