//! HTML subtree → Markdown.
//!
//! A recursive walker over `scraper` elements. Output is never wrapped, and
//! Unicode is kept literal: entities are decoded by the parser and written back
//! as-is.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::node::Node;
use scraper::ElementRef;

use crate::dom::collect_text;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\n\x0C]+").unwrap());

// Text that would otherwise open a heading, list item or quote.
static LINE_START_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(\d+\.|[#>+*-])(\s|$)").unwrap());

const FENCE: &str = "```";

/// Rendering policy.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Emit `[text](href)`; otherwise only the link text.
    pub links: bool,
    /// Emit `![alt](src)`; otherwise only the alt text.
    pub images: bool,
    /// Fence `<pre>` blocks and backtick inline `<code>`.
    pub mark_code: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            links: true,
            images: true,
            mark_code: true,
        }
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Convert `el` and its descendants. The result is normalized (no trailing
/// spaces, at most one blank line in a row outside code fences) but not trimmed.
pub fn element_to_markdown(el: ElementRef<'_>, options: &MarkdownOptions) -> String {
    let raw = walk_element(el, options);
    normalize_blank_lines(&raw)
}

// ── DOM tree walker → Markdown ───────────────────────────────────────────────

fn walk_element(el: ElementRef<'_>, opts: &MarkdownOptions) -> String {
    let name = el.value().name();

    match name {
        "script" | "style" | "noscript" | "template" | "svg" | "head" => String::new(),

        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            let text = single_line(&walk_children(el, opts));
            if text.is_empty() {
                return String::new();
            }
            format!("\n\n{} {}\n\n", "#".repeat(level), text)
        }

        "p" => block(walk_children(el, opts)),

        "br" => "\n".to_string(),
        "hr" => "\n\n---\n\n".to_string(),

        "a" => {
            let content = walk_children(el, opts);
            let trimmed = content.trim();
            match el.value().attr("href") {
                Some(href) if opts.links && !trimmed.is_empty() => {
                    format!("[{}]({})", trimmed, href)
                }
                _ => trimmed.to_string(),
            }
        }

        "img" => {
            let alt = el.value().attr("alt").map(str::trim).unwrap_or("");
            match el.value().attr("src") {
                Some(src) if opts.images => format!("![{}]({})", alt, src),
                _ => alt.to_string(),
            }
        }

        "strong" | "b" => wrap_inline(walk_children(el, opts), "**"),
        "em" | "i" => wrap_inline(walk_children(el, opts), "*"),

        "code" => {
            let text = collect_text(el);
            if opts.mark_code && !text.is_empty() {
                inline_code(&text)
            } else {
                text
            }
        }

        "pre" => handle_pre(el, opts),

        "blockquote" => {
            let content = normalize_blank_lines(&walk_children(el, opts));
            let quoted = content
                .trim()
                .lines()
                .map(|l| {
                    if l.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {}", l)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            block(quoted)
        }

        "ul" => handle_list(el, opts, false),
        "ol" => handle_list(el, opts, true),
        "li" => block(format!("- {}", walk_children(el, opts).trim())),

        "table" => handle_table(el, opts),

        "html" | "body" | "div" | "section" | "article" | "main" | "header" | "footer" | "nav"
        | "aside" | "address" | "figure" | "figcaption" | "details" | "summary" | "form"
        | "fieldset" | "dl" | "dt" | "dd" | "center" => block(walk_children(el, opts)),

        _ => walk_children(el, opts),
    }
}

fn walk_children(el: ElementRef<'_>, opts: &MarkdownOptions) -> String {
    let mut result = String::new();
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                let collapsed = WHITESPACE_RE.replace_all(text, " ");
                if at_line_start(&result) {
                    result.push_str(&escape_line_start(&collapsed));
                } else {
                    result.push_str(&collapsed);
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    result.push_str(&walk_element(child_el, opts));
                }
            }
            _ => {}
        }
    }
    result
}

// ── Element-specific handlers ────────────────────────────────────────────────

fn handle_pre(el: ElementRef<'_>, opts: &MarkdownOptions) -> String {
    let text = collect_text(el);
    let text = text.strip_prefix('\n').unwrap_or(text.as_str());
    let text = text.trim_end_matches(['\n', '\r']);
    if text.trim().is_empty() {
        return String::new();
    }
    if opts.mark_code {
        format!("\n\n{}\n{}\n{}\n\n", FENCE, text, FENCE)
    } else {
        let indented = text
            .lines()
            .map(|l| format!("    {}", l))
            .collect::<Vec<_>>()
            .join("\n");
        format!("\n\n{}\n\n", indented)
    }
}

fn handle_list(el: ElementRef<'_>, opts: &MarkdownOptions, ordered: bool) -> String {
    let mut result = String::new();
    let mut idx = 1usize;

    for child in el.children() {
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };
        if child_el.value().name() != "li" {
            continue;
        }
        let content = normalize_blank_lines(&walk_children(child_el, opts));
        let trimmed = content.trim();
        if trimmed.is_empty() {
            continue;
        }
        let marker = if ordered {
            let m = format!("{}. ", idx);
            idx += 1;
            m
        } else {
            "- ".to_string()
        };
        result.push_str(&marker);
        result.push_str(&indent_continuation(trimmed, marker.len()));
        result.push('\n');
    }

    if result.is_empty() {
        return result;
    }
    format!("\n\n{}\n", result)
}

fn handle_table(el: ElementRef<'_>, opts: &MarkdownOptions) -> String {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in own_rows(el) {
        let cells: Vec<String> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| matches!(c.value().name(), "td" | "th"))
            .map(|c| single_line(&walk_children(c, opts)).replace('|', "\\|"))
            .collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    let Some(width) = rows.iter().map(Vec::len).max() else {
        return String::new();
    };

    let render_row = |cells: &[String]| {
        let mut padded: Vec<&str> = cells.iter().map(String::as_str).collect();
        padded.resize(width, "");
        format!("| {} |", padded.join(" | "))
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_row(&rows[0]));
    lines.push(format!("|{}", " --- |".repeat(width)));
    lines.extend(rows[1..].iter().map(|r| render_row(r)));

    block(lines.join("\n"))
}

/// Rows belonging to `table` itself: direct `tr` children and those of its
/// `thead` / `tbody` / `tfoot` sections. Nested tables keep their own rows.
fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|r| r.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

// ── Formatting helpers ───────────────────────────────────────────────────────

fn block(content: String) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("\n\n{}\n\n", trimmed)
}

fn wrap_inline(content: String, marker: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content;
    }
    // Keep the surrounding spaces outside the markers so `a <b>b</b>` stays spaced.
    let lead = if content.starts_with(' ') { " " } else { "" };
    let trail = if content.ends_with(' ') { " " } else { "" };
    format!("{}{}{}{}{}", lead, marker, trimmed, marker, trail)
}

fn at_line_start(rendered: &str) -> bool {
    let rendered = rendered.trim_end_matches(' ');
    rendered.is_empty() || rendered.ends_with('\n')
}

/// Backslash-escape a leading `#`, `>`, `-`, `+`, `*` or `N.` so plain text
/// cannot turn into block syntax.
fn escape_line_start(text: &str) -> String {
    let Some(caps) = LINE_START_MARKER_RE.captures(text) else {
        return text.to_string();
    };
    let (Some(lead), Some(marker)) = (caps.get(1), caps.get(2)) else {
        return text.to_string();
    };
    let escaped = match marker.as_str().strip_suffix('.') {
        Some(digits) => format!("{}\\.", digits),
        None => format!("\\{}", marker.as_str()),
    };
    format!("{}{}{}", lead.as_str(), escaped, &text[marker.end()..])
}

fn inline_code(text: &str) -> String {
    if text.contains('`') {
        format!("`` {} ``", text)
    } else {
        format!("`{}`", text)
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn indent_continuation(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    let mut lines = text.lines();
    let mut out = lines.next().unwrap_or("").to_string();
    for line in lines {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(&pad);
            out.push_str(line);
        }
    }
    out
}

/// Strip trailing whitespace and squeeze blank-line runs, leaving fenced code
/// untouched.
fn normalize_blank_lines(markdown: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut in_fence = false;

    for line in markdown.split('\n') {
        if line.trim_start().starts_with(FENCE) {
            in_fence = !in_fence;
            out.push(line.trim_end());
            continue;
        }
        if in_fence {
            out.push(line);
            continue;
        }
        let line = line.trim_end();
        if line.is_empty() && out.last().is_some_and(|prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::document_find_first;
    use scraper::Html;

    fn md(body: &str) -> String {
        let doc = Html::parse_document(&format!("<html><body>{}</body></html>", body));
        let body = document_find_first(&doc, "body").unwrap();
        element_to_markdown(body, &MarkdownOptions::default())
            .trim()
            .to_string()
    }

    #[test]
    fn paragraph_with_bold() {
        assert_eq!(md("<p>Hello <b>world</b></p>"), "Hello **world**");
    }

    #[test]
    fn links_and_images_are_preserved() {
        assert_eq!(
            md(r#"<p>See <a href="https://x.example/a">the docs</a> and <img src="/i.png" alt="logo"></p>"#),
            "See [the docs](https://x.example/a) and ![logo](/i.png)"
        );
    }

    #[test]
    fn links_can_be_dropped() {
        let doc = Html::parse_document(r#"<body><a href="/x">text</a></body>"#);
        let body = document_find_first(&doc, "body").unwrap();
        let opts = MarkdownOptions {
            links: false,
            ..MarkdownOptions::default()
        };
        assert_eq!(element_to_markdown(body, &opts).trim(), "text");
    }

    #[test]
    fn headings_and_paragraphs_are_separated() {
        assert_eq!(
            md("<h1>Title</h1><p>one</p><div>two</div><h3>Sub <i>part</i></h3>"),
            "# Title\n\none\n\ntwo\n\n### Sub *part*"
        );
    }

    #[test]
    fn unicode_is_literal() {
        assert_eq!(md("<p>caf&eacute; &mdash; 日本</p>"), "café — 日本");
    }

    #[test]
    fn pre_is_fenced_and_keeps_blank_lines() {
        assert_eq!(
            md("<p>Run:</p><pre><code>fn main() {\n\n\n    go();\n}</code></pre>"),
            "Run:\n\n```\nfn main() {\n\n\n    go();\n}\n```"
        );
    }

    #[test]
    fn inline_code_is_backticked() {
        assert_eq!(md("<p>call <code>f(x)</code> now</p>"), "call `f(x)` now");
    }

    #[test]
    fn lists_render_markers_and_nested_indent() {
        assert_eq!(
            md("<ul><li>a</li><li>b<ul><li>c</li></ul></li></ul><ol><li>x</li><li>y</li></ol>"),
            "- a\n- b\n\n  - c\n\n1. x\n2. y"
        );
    }

    #[test]
    fn table_becomes_pipe_table() {
        assert_eq!(
            md("<table><tr><th>k</th><th>v</th></tr><tr><td>a|b</td></tr></table>"),
            "| k | v |\n| --- | --- |\n| a\\|b |  |"
        );
    }

    #[test]
    fn nested_table_rows_stay_in_their_own_table() {
        let out = md(
            "<table><tr><td>outer<table><tr><td>inner</td></tr></table></td></tr>\
             <tr><td>z</td></tr></table>",
        );
        assert_eq!(out.matches("inner").count(), 1);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("| outer"));
        assert_eq!(lines[1], "| --- |");
        assert_eq!(lines[2], "| z |");
    }

    #[test]
    fn thead_and_tbody_rows_are_kept_in_order() {
        assert_eq!(
            md("<table><thead><tr><th>h</th></tr></thead><tbody><tr><td>b</td></tr></tbody></table>"),
            "| h |\n| --- |\n| b |"
        );
    }

    #[test]
    fn text_that_looks_like_block_syntax_is_escaped() {
        assert_eq!(md("<p># not a heading</p>"), "\\# not a heading");
        assert_eq!(md("<p>1. not a list</p>"), "1\\. not a list");
        assert_eq!(md("<p>- dash</p><p>> quote</p>"), "\\- dash\n\n\\> quote");
        assert_eq!(md("<p>Item 1. fine # here</p>"), "Item 1. fine # here");
        assert_eq!(md("<p>#hashtag</p>"), "#hashtag");
    }

    #[test]
    fn blockquote_is_prefixed() {
        assert_eq!(md("<blockquote><p>one</p><p>two</p></blockquote>"), "> one\n>\n> two");
    }

    #[test]
    fn scripts_are_skipped_and_whitespace_collapsed() {
        assert_eq!(
            md("<p>a\n   b</p><script>alert(1)</script><style>p{}</style>"),
            "a b"
        );
    }

    #[test]
    fn output_is_deterministic() {
        let html = "<h2>T</h2><p>x <a href='/y'>y</a></p><table><tr><td>1</td></tr></table>";
        assert_eq!(md(html), md(html));
    }
}
