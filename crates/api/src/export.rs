//! CSV rendering for export endpoints.

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

/// Rows of string cells rendered as RFC 4180 CSV.
#[derive(Debug, Clone, Default)]
pub struct Csv {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Csv {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in std::iter::once(&self.header).chain(&self.rows) {
            let line: Vec<String> = row.iter().map(|cell| escape_cell(cell)).collect();
            out.push_str(&line.join(","));
            out.push_str("\r\n");
        }
        out
    }

    /// Wrap the rendered CSV in an attachment response.
    pub fn into_attachment(self, filename: &str) -> Response {
        (
            [
                (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            self.render(),
        )
            .into_response()
    }
}

/// Quote a cell when it contains a delimiter, quote or line break.
fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        let mut csv = Csv::new(["Name", "Notes"]);
        csv.push(["Ann", "plain"]);
        csv.push(["Lee, Bo", "said \"hi\""]);
        assert_eq!(
            csv.render(),
            "Name,Notes\r\nAnn,plain\r\n\"Lee, Bo\",\"said \"\"hi\"\"\"\r\n"
        );
        assert_eq!(csv.len(), 2);
    }

    #[test]
    fn header_only_when_empty() {
        let csv = Csv::new(["A"]);
        assert!(csv.is_empty());
        assert_eq!(csv.render(), "A\r\n");
    }
}
