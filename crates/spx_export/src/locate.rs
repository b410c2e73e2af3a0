//! Main-table selection.

use crate::error::{ExportResult, ExportTableError};
use crate::html::{SpecHtmlDocument, SpecHtmlTable};

/// Pick the table with the most rows; the first one in document order wins ties.
///
/// Returns [`ExportTableError::NotFound`] when the document holds no table.
pub fn locate_table(doc: &SpecHtmlDocument) -> ExportResult<&SpecHtmlTable> {
    let mut table_best: Option<&SpecHtmlTable> = None;
    for table in &doc.tables {
        match table_best {
            Some(best) if best.n_rows() >= table.n_rows() => {}
            _ => table_best = Some(table),
        }
    }

    let table = table_best.ok_or(ExportTableError::NotFound)?;
    log::info!(
        "Located table #{} with {} rows among {} tables",
        table.n_ordinal,
        table.n_rows(),
        doc.tables.len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html_document;

    fn derive_table_html(n_rows: usize, c_marker: &str) -> String {
        let mut html = String::from("<table>");
        for n_idx in 0..n_rows {
            html.push_str(&format!("<tr><td>{c_marker}{n_idx}</td></tr>"));
        }
        html.push_str("</table>");
        html
    }

    #[test]
    fn locate_picks_table_with_most_rows() {
        let html = format!(
            "{}<div>{}</div>",
            derive_table_html(5, "small"),
            derive_table_html(12, "big")
        );
        let doc = parse_html_document(&html);

        let table = locate_table(&doc).expect("table located");
        assert_eq!(table.n_rows(), 12);
        assert_eq!(table.rows[0][0], "big0");
    }

    #[test]
    fn locate_breaks_ties_by_document_order() {
        let html = format!(
            "{}{}{}",
            derive_table_html(2, "x"),
            derive_table_html(4, "first"),
            derive_table_html(4, "second")
        );
        let doc = parse_html_document(&html);

        let table = locate_table(&doc).expect("table located");
        assert_eq!(table.n_ordinal, 1);
        assert_eq!(table.rows[0][0], "first0");
    }

    #[test]
    fn locate_reports_not_found_without_tables() {
        let doc = parse_html_document("<p>no tables</p>");
        assert!(matches!(locate_table(&doc), Err(ExportTableError::NotFound)));
    }
}
