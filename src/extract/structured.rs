//! Structured sub-content: endpoint mentions and tables
//!
//! Works on the raw markup, independently of the readable-content pass, so
//! tables inside page chrome are still picked up.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// A table as rows of trimmed cell texts
pub type Table = Vec<Vec<String>>;

fn api_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://api\.").expect("valid api url pattern"))
}

fn path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/[A-Za-z0-9_/]+").expect("valid path pattern"))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Finds probable API endpoint strings in page markup
///
/// Bold text mentioning an `http(s)://api.` URL and table cells containing a
/// path-like string are returned verbatim (trimmed), in document order.
/// Duplicates are kept.
pub fn extract_endpoints(markup: &str) -> Vec<String> {
    let document = Html::parse_document(markup);
    extract_endpoints_from(&document)
}

fn extract_endpoints_from(document: &Html) -> Vec<String> {
    let mut endpoints = Vec::new();

    if let Ok(bold) = Selector::parse("strong, b") {
        for element in document.select(&bold) {
            let text = element_text(element);
            if api_url_pattern().is_match(&text) {
                endpoints.push(text);
            }
        }
    }

    if let Ok(cells) = Selector::parse("table td") {
        for element in document.select(&cells) {
            let text = element_text(element);
            if path_pattern().is_match(&text) {
                endpoints.push(text);
            }
        }
    }

    endpoints
}

/// Extracts every table as rows of trimmed cell texts, header cells included
pub fn extract_tables(markup: &str) -> Vec<Table> {
    let document = Html::parse_document(markup);
    extract_tables_from(&document)
}

fn extract_tables_from(document: &Html) -> Vec<Table> {
    let (Ok(table_sel), Ok(row_sel), Ok(cell_sel)) = (
        Selector::parse("table"),
        Selector::parse("tr"),
        Selector::parse("th, td"),
    ) else {
        return Vec::new();
    };

    document
        .select(&table_sel)
        .map(|table| -> Table {
            table
                .select(&row_sel)
                .map(|row| -> Vec<String> { row.select(&cell_sel).map(element_text).collect() })
                .collect()
        })
        .collect()
}

/// Endpoints and tables of one page, parsed from a single DOM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredContent {
    pub endpoints: Vec<String>,
    pub tables: Vec<Table>,
}

impl StructuredContent {
    pub fn from_markup(markup: &str) -> Self {
        let document = Html::parse_document(markup);
        Self {
            endpoints: extract_endpoints_from(&document),
            tables: extract_tables_from(&document),
        }
    }

    /// Renders the endpoint list as one output unit, or `None` when there are none
    pub fn endpoint_block(&self) -> Option<String> {
        if self.endpoints.is_empty() {
            return None;
        }
        Some(format!("API Endpoints:\n{}", self.endpoints.join("\n")))
    }

    /// Renders all tables as one output unit, or `None` when there are none
    pub fn table_block(&self) -> Option<String> {
        if self.tables.is_empty() {
            return None;
        }

        let mut block = String::from("Tables:\n");
        for (i, table) in self.tables.iter().enumerate() {
            block.push_str(&format!("\nTable {}:\n", i + 1));
            for row in table {
                block.push_str(&row.join(" | "));
                block.push('\n');
            }
        }
        Some(block.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <p>Base URL: <strong>https://api.example.com/v1</strong></p>
            <p><strong>Important</strong> note</p>
            <table>
                <tr><th>Method</th><th>Path</th></tr>
                <tr><td>GET</td><td> /v1/payments/{id} </td></tr>
                <tr><td>POST</td><td>/v1/payments</td></tr>
            </table>
        </body></html>
    "#;

    #[test]
    fn test_extract_endpoints() {
        let endpoints = extract_endpoints(PAGE);
        assert_eq!(
            endpoints,
            vec![
                "https://api.example.com/v1".to_string(),
                "/v1/payments/{id}".to_string(),
                "/v1/payments".to_string(),
            ]
        );
    }

    #[test]
    fn test_bold_tag_counts_as_emphasis() {
        let html = "<p><b>http://api.sandbox.example.com</b></p>";
        assert_eq!(extract_endpoints(html), vec!["http://api.sandbox.example.com"]);
    }

    #[test]
    fn test_header_cells_not_scanned_for_endpoints() {
        let html = "<table><tr><th>/not/an/endpoint</th></tr><tr><td>plain</td></tr></table>";
        assert!(extract_endpoints(html).is_empty());
    }

    #[test]
    fn test_duplicate_endpoints_kept() {
        let html = "<table><tr><td>/v1/a</td><td>/v1/a</td></tr></table>";
        assert_eq!(extract_endpoints(html).len(), 2);
    }

    #[test]
    fn test_extract_tables() {
        let tables = extract_tables(PAGE);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0][0], vec!["Method", "Path"]);
        assert_eq!(tables[0][1], vec!["GET", "/v1/payments/{id}"]);
        assert_eq!(tables[0].len(), 3);
    }

    #[test]
    fn test_multiple_tables_in_order() {
        let html = "<table><tr><td>a</td></tr></table><table><tr><td>b</td></tr></table>";
        let tables = extract_tables(html);
        assert_eq!(tables, vec![vec![vec!["a".to_string()]], vec![vec!["b".to_string()]]]);
    }

    #[test]
    fn test_no_structured_content() {
        let content = StructuredContent::from_markup("<p>Nothing here</p>");
        assert!(content.endpoints.is_empty());
        assert!(content.tables.is_empty());
        assert_eq!(content.endpoint_block(), None);
        assert_eq!(content.table_block(), None);
    }

    #[test]
    fn test_render_blocks() {
        let content = StructuredContent::from_markup(PAGE);

        assert_eq!(
            content.endpoint_block().unwrap(),
            "API Endpoints:\nhttps://api.example.com/v1\n/v1/payments/{id}\n/v1/payments"
        );
        assert_eq!(
            content.table_block().unwrap(),
            "Tables:\n\nTable 1:\nMethod | Path\nGET | /v1/payments/{id}\nPOST | /v1/payments"
        );
    }
}
