use crate::{Fragment, OutputKind};

pub fn to_html(fragment: &Fragment) -> String {
    fragment.inner_html()
}

pub fn to_text(fragment: &Fragment) -> String {
    fragment.text()
}

/// Serialize `fragment` to the requested representation.
pub fn convert(fragment: &Fragment, kind: OutputKind) -> String {
    match kind {
        OutputKind::Html => to_html(fragment),
        OutputKind::Text => to_text(fragment),
    }
}
