//! Small typed helpers over `scraper`'s document tree.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Elements whose content the tokenizer reads as text, never as markup.
const RAW_TEXT_TAGS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes",
];

/// One markup token per match: a comment, a whole raw-text element, or a start
/// tag (attribute values quoted or bare). Unterminated comments and raw-text
/// elements run to the end of input, as they do in the tokenizer.
static MARKUP_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    let raw_text = RAW_TEXT_TAGS
        .iter()
        .map(|tag| format!(r"<{tag}\b[^>]*>(?:.*?</{tag}\s*>|.*)"))
        .collect::<Vec<_>>()
        .join("|");
    let attr = r#"[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?"#;
    Regex::new(&format!(
        r"(?is)<!--(?:.*?-->|.*)|{raw_text}|<(?P<tag>[a-z][a-z0-9:-]*)(?:\s+{attr})*\s*/?>"
    ))
    .unwrap()
});

/// The HTML5 parser always synthesizes `<body>`, so presence has to be judged
/// from the source markup: a real `<body>` start tag, not one inside a
/// comment, a script or an attribute value.
pub fn has_body_tag(source: &str) -> bool {
    MARKUP_TOKEN_RE.captures_iter(source).any(|caps| {
        caps.name("tag")
            .is_some_and(|tag| tag.as_str().eq_ignore_ascii_case("body"))
    })
}

/// Recursively collect all text from an element and its descendants.
pub fn collect_text(el: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for child in el.children() {
        match child.value() {
            Node::Text(text) => parts.push((&*text.text).to_string()),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    parts.push(collect_text(child_el));
                }
            }
            _ => {}
        }
    }
    parts.join("")
}

/// Each descendant text node trimmed on its own, empties dropped, the rest
/// glued together with no separator.
pub fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Depth-first search for the first element with the given tag name.
pub fn find_first_tag<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if child_el.value().name() == tag {
                return Some(child_el);
            }
            if let Some(found) = find_first_tag(child_el, tag) {
                return Some(found);
            }
        }
    }
    None
}

/// First `tag` element anywhere in the document.
pub fn document_find_first<'a>(document: &'a Html, tag: &str) -> Option<ElementRef<'a>> {
    let root = document.root_element();
    if root.value().name() == tag {
        return Some(root);
    }
    find_first_tag(root, tag)
}

/// First descendant of `el` matching `selector` (tag, class, or any CSS
/// selector), excluding `el` itself.
pub fn select_first<'a>(el: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    el.select(selector).find(|found| *found != el)
}
