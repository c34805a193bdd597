//! Readable-content extraction
//!
//! Turns a page into a markdown-ish text document made of its headings,
//! paragraphs and code blocks, with page chrome and boilerplate removed.

use crate::config::ExtractConfig;
use scraper::{ElementRef, Html, Node};

/// Elements dropped together with everything inside them
const STRIPPED_TAGS: &[&str] = &[
    "header", "footer", "nav", "script", "style", "meta", "link", "noscript", "iframe", "object",
    "embed",
];

/// Kind of content block an element renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Heading(usize),
    Paragraph,
    Code,
}

impl Block {
    fn classify(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(Self::Heading(1)),
            "h2" => Some(Self::Heading(2)),
            "h3" => Some(Self::Heading(3)),
            "h4" => Some(Self::Heading(4)),
            "h5" => Some(Self::Heading(5)),
            "h6" => Some(Self::Heading(6)),
            "p" => Some(Self::Paragraph),
            "pre" | "code" => Some(Self::Code),
            _ => None,
        }
    }
}

/// Extracts normalized text from page markup
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    /// Lowercased boilerplate phrases
    blocklist: Vec<String>,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(&ExtractConfig::default())
    }
}

impl ContentExtractor {
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            blocklist: config
                .boilerplate_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    /// Extracts the readable content of a page
    ///
    /// Headings render as `#`-prefixed lines, code and preformatted blocks as
    /// fenced blocks, and paragraphs with their whitespace collapsed. Blocks
    /// keep document order and are joined with newlines.
    ///
    /// # Example
    ///
    /// ```
    /// use docs_harvester::extract::ContentExtractor;
    ///
    /// let html = "<header>Cookie notice: usamos cookies</header><h2>Auth</h2><p>Real   content</p>";
    /// let text = ContentExtractor::default().extract(html);
    /// assert_eq!(text, "## Auth\nReal content");
    /// ```
    pub fn extract(&self, markup: &str) -> String {
        let document = Html::parse_document(markup);
        let mut blocks = Vec::new();
        self.walk(document.root_element(), &mut blocks);
        blocks.join("\n")
    }

    /// Collects rendered blocks below `element` in document order
    ///
    /// A matched block is not descended into, so `<pre><code>` yields a single
    /// fence and inline `<code>` stays part of its paragraph.
    fn walk(&self, element: ElementRef<'_>, blocks: &mut Vec<String>) {
        for child in element.children() {
            let Some(child) = ElementRef::wrap(child) else {
                continue;
            };

            let tag = child.value().name();
            if STRIPPED_TAGS.contains(&tag) {
                continue;
            }

            match Block::classify(tag) {
                Some(kind) => {
                    if let Some(rendered) = self.render(kind, child) {
                        blocks.push(rendered);
                    }
                }
                None => self.walk(child, blocks),
            }
        }
    }

    fn render(&self, kind: Block, element: ElementRef<'_>) -> Option<String> {
        let mut raw = String::new();
        collect_text(element, &mut raw);
        let text = raw.trim();

        if text.is_empty() || self.is_boilerplate(text) {
            return None;
        }

        let rendered = match kind {
            Block::Heading(level) => format!("{} {}", "#".repeat(level), collapse_whitespace(text)),
            Block::Code => format!("```\n{}\n```", text),
            Block::Paragraph => collapse_whitespace(text),
        };
        Some(rendered)
    }

    /// Returns true if the text contains any blocklisted phrase (case-insensitive)
    pub fn is_boilerplate(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.blocklist
            .iter()
            .any(|phrase| lower.contains(phrase.as_str()))
    }
}

/// Appends the text below `element`, skipping stripped subtrees at any depth
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if !STRIPPED_TAGS.contains(&el.name()) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

/// Collapses every whitespace run into a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Convenience wrapper using the default boilerplate list
pub fn extract_content(markup: &str) -> String {
    ContentExtractor::default().extract(markup)
}
