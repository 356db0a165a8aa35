//! Visible text extraction from rendered HTML.

use scraper::{Html, Node, Selector};
use std::sync::LazyLock;

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Returns the visible text of the document body in document order,
/// with text nodes separated by single spaces.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let Some(body) = document.select(&BODY).next() else {
        return String::new();
    };

    let mut out = String::new();

    for node in body.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()));
        if hidden {
            continue;
        }

        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(text);
    }

    out
}
