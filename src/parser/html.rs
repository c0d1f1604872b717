//! Page zone extraction
//!
//! A page is indexed as two independent zones: the text of its `<title>`
//! and the text of its `<body>`. Markup is discarded, entities are decoded
//! by the HTML parser and whitespace is collapsed.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::parser::sanitize::normalize_whitespace;

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// Elements whose text never reaches the reader
static HIDDEN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script, style, noscript, template").unwrap());

/// Text zones of a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageZones {
    /// Inner text of `<title>`
    pub title: String,

    /// Inner text of `<body>`
    pub body: String,
}

impl PageZones {
    /// Parse raw HTML and extract both zones
    pub fn parse(html: &str) -> Self {
        if html.trim().is_empty() {
            return Self::default();
        }

        let document = Html::parse_document(html);

        Self {
            title: zone_text(&document, &TITLE_SELECTOR),
            body: zone_text(&document, &BODY_SELECTOR),
        }
    }

    /// Title followed by body, separated by a single space
    pub fn full_text(&self) -> String {
        match (self.title.is_empty(), self.body.is_empty()) {
            (true, _) => self.body.clone(),
            (_, true) => self.title.clone(),
            _ => format!("{} {}", self.title, self.body),
        }
    }
}

/// Collect the visible text of every element matching `selector`
fn zone_text(document: &Html, selector: &Selector) -> String {
    let mut parts = Vec::new();
    for element in document.select(selector) {
        collect_text(element, &mut parts);
        parts.push(" ");
    }
    normalize_whitespace(&parts.concat())
}

/// Inline elements are concatenated as-is, block elements are padded with
/// spaces so that adjacent paragraphs do not merge into one word.
fn collect_text<'a>(element: ElementRef<'a>, parts: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            parts.push(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if HIDDEN_SELECTOR.matches(&child_element) {
                continue;
            }
            let block = is_block(child_element.value().name());
            if block {
                parts.push(" ");
            }
            collect_text(child_element, parts);
            if block {
                parts.push(" ");
            }
        }
    }
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "br"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "li"
            | "ul"
            | "ol"
            | "dl"
            | "dt"
            | "dd"
            | "tr"
            | "td"
            | "th"
            | "table"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "nav"
            | "aside"
            | "main"
            | "blockquote"
            | "pre"
            | "figure"
            | "figcaption"
            | "form"
            | "hr"
    )
}
