//! Plain-text and structured (links / tables / headings) views of a page.

use once_cell::sync::Lazy;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::dom::stripped_text;

static LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static TABLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("td, th").unwrap());
static HEADING_SELS: Lazy<Vec<Selector>> = Lazy::new(|| {
    (1..=6)
        .map(|level| Selector::parse(&format!("h{}", level)).unwrap())
        .collect()
});

const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];
const CELL_DELIMITER: &str = " | ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    pub text: String,
}

/// One `<table>`: the cell texts of each non-empty row.
pub type TableRows = Vec<Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredReport {
    pub links: Vec<Link>,
    pub tables: Vec<TableRows>,
    /// All h1 in document order, then all h2, and so on.
    pub headings: Vec<Heading>,
}

impl StructuredReport {
    pub fn from_document(document: &Html) -> Self {
        let links = document
            .select(&LINK_SEL)
            .filter_map(|a| {
                a.value().attr("href").map(|href| Link {
                    label: stripped_text(a),
                    href: href.to_string(),
                })
            })
            .collect();

        let tables = document.select(&TABLE_SEL).map(table_rows).collect();

        let headings = HEADING_SELS
            .iter()
            .enumerate()
            .flat_map(move |(idx, sel)| {
                document.select(sel).map(move |h| Heading {
                    level: idx + 1,
                    text: stripped_text(h),
                })
            })
            .collect();

        Self {
            links,
            tables,
            headings,
        }
    }

    /// Render in the `structured_data.txt` layout.
    pub fn render(&self) -> String {
        let mut out = String::from("=== LINKS ===\n");
        for link in &self.links {
            out.push_str(&format!("{}: {}\n", link.label, link.href));
        }

        out.push_str("\n=== TABLES ===\n");
        for table in &self.tables {
            out.push_str("\n--- Table ---\n");
            for row in table {
                out.push_str(&row.join(CELL_DELIMITER));
                out.push('\n');
            }
        }

        out.push_str("\n=== HEADINGS ===\n");
        for heading in &self.headings {
            out.push_str(&format!("{} {}\n", "#".repeat(heading.level), heading.text));
        }
        out
    }
}

fn table_rows(table: ElementRef<'_>) -> TableRows {
    table
        .select(&ROW_SEL)
        .map(|row| row.select(&CELL_SEL).map(stripped_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect()
}

/// Every visible text segment of the document, trimmed, one per line.
pub fn visible_text(document: &Html) -> String {
    let mut segments = Vec::new();
    push_visible_text(document.root_element(), &mut segments);
    segments.join("\n")
}

fn push_visible_text(el: ElementRef<'_>, segments: &mut Vec<String>) {
    if INVISIBLE_TAGS.contains(&el.value().name()) {
        return;
    }
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    segments.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_visible_text(child_el, segments);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(html: &str) -> String {
        StructuredReport::from_document(&Html::parse_document(html)).render()
    }

    #[test]
    fn table_row_is_joined_under_tables_section() {
        let out = report("<table><tr><td>a</td><td>b</td></tr></table>");
        let tables = out.split("=== TABLES ===").nth(1).unwrap();
        assert!(tables.contains("\n--- Table ---\na | b\n"));
    }

    #[test]
    fn heading_is_prefixed_by_level() {
        let out = report("<h2>Title</h2>");
        let headings = out.split("=== HEADINGS ===").nth(1).unwrap();
        assert!(headings.lines().any(|l| l == "## Title"));
    }

    #[test]
    fn renders_full_layout() {
        let html = r#"<html><body>
            <h2>Second</h2>
            <h1>First</h1>
            <a href="/a">Alpha  link</a>
            <a>no target</a>
            <a href="https://b.example/">B</a>
            <table>
              <tr><th>k</th><th>v</th></tr>
              <tr></tr>
              <tr><td>x</td><td> y </td></tr>
            </table>
            <table><tr><td>only</td></tr></table>
        </body></html>"#;
        let expected = "=== LINKS ===\n\
                        Alpha  link: /a\n\
                        B: https://b.example/\n\
                        \n=== TABLES ===\n\
                        \n--- Table ---\n\
                        k | v\n\
                        x | y\n\
                        \n--- Table ---\n\
                        only\n\
                        \n=== HEADINGS ===\n\
                        # First\n\
                        ## Second\n";
        assert_eq!(report(html), expected);
    }

    #[test]
    fn inline_markup_text_is_stripped_per_node() {
        let out = report(
            "<a href=\"/x\">Hello <b>world</b></a>\
             <table><tr><td> 1 <i>kg</i> </td><th>\n two </th></tr></table>\
             <h3> Part <em>one</em> </h3>",
        );
        assert!(out.contains("\nHelloworld: /x\n"));
        assert!(out.contains("\n1kg | two\n"));
        assert!(out.ends_with("### Partone\n"));
    }

    #[test]
    fn empty_document_still_has_sections() {
        assert_eq!(
            report(""),
            "=== LINKS ===\n\n=== TABLES ===\n\n=== HEADINGS ===\n"
        );
    }

    #[test]
    fn visible_text_skips_scripts_and_blank_segments() {
        let doc = Html::parse_document(
            "<html><head><title> Page </title><style>p{}</style></head>\
             <body><p>  one </p>\n\n<div>two<script>var x;</script></div></body></html>",
        );
        assert_eq!(visible_text(&doc), "Page\none\ntwo");
    }
}
