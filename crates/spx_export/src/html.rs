//! Tolerant HTML table scanner.
//!
//! Walks tags in document order and records every `<table>` with its rows and
//! cell texts. It is not a general HTML parser: only the table structure
//! (`table`, `tr`, `td`, `th`, row groups, `br`) is interpreted, all other
//! markup is dropped from cell text.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static RE_HTML_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<![^>]*>|<(/?)([a-z][a-z0-9]*)\b(?:[^>"']|"[^"]*"|'[^']*')*>"#,
    )
    .expect("RE_HTML_TOKEN: hardcoded regex is valid")
});

static RE_HTML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});")
        .expect("RE_HTML_ENTITY: hardcoded regex is valid")
});

////////////////////////////////////////////////////////////////////////////////
// #region DocumentModel

/// One table as rendered: rows of trimmed cell texts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecHtmlTable {
    /// Zero-based position of the opening `<table>` tag in the document.
    pub n_ordinal: usize,
    /// Rows (`<tr>`) owned directly by this table, each a list of cell texts.
    pub rows: Vec<Vec<String>>,
}

impl SpecHtmlTable {
    /// Row count, nested tables excluded.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }
}

/// All tables of one page, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecHtmlDocument {
    /// Tables ordered by their opening tag.
    pub tables: Vec<SpecHtmlTable>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Scanner

#[derive(Debug, Default)]
struct TableBuilder {
    n_ordinal: usize,
    rows: Vec<Vec<String>>,
    row_current: Option<Vec<String>>,
    // One entry per `<br>`-separated line.
    cell_current: Option<Vec<String>>,
}

impl TableBuilder {
    fn new(n_ordinal: usize) -> Self {
        Self {
            n_ordinal,
            ..Default::default()
        }
    }

    fn open_row(&mut self) {
        self.close_row();
        self.row_current = Some(Vec::new());
    }

    fn close_row(&mut self) {
        self.close_cell();
        if let Some(row) = self.row_current.take() {
            self.rows.push(row);
        }
    }

    fn open_cell(&mut self) {
        self.close_cell();
        if self.row_current.is_none() {
            self.row_current = Some(Vec::new());
        }
        self.cell_current = Some(vec![String::new()]);
    }

    fn close_cell(&mut self) {
        let Some(l_lines) = self.cell_current.take() else {
            return;
        };
        let c_text = l_lines
            .iter()
            .map(|line| normalize_ws(&decode_entities(line)))
            .collect::<Vec<_>>()
            .join("\n");
        self.row_current
            .get_or_insert_with(Vec::new)
            .push(c_text.trim().to_string());
    }

    fn push_text(&mut self, text: &str) {
        if let Some(l_lines) = self.cell_current.as_mut()
            && let Some(line) = l_lines.last_mut()
        {
            line.push_str(text);
        }
    }

    fn push_line_break(&mut self) {
        if let Some(l_lines) = self.cell_current.as_mut() {
            l_lines.push(String::new());
        }
    }

    fn finish(mut self) -> SpecHtmlTable {
        self.close_row();
        SpecHtmlTable {
            n_ordinal: self.n_ordinal,
            rows: self.rows,
        }
    }
}

/// Scan `html` and collect every table with its rows and cell texts.
///
/// Unclosed cells, rows and tables are closed at end of input. Rows always
/// belong to the innermost open table.
pub fn parse_html_document(html: &str) -> SpecHtmlDocument {
    let mut l_stack: Vec<TableBuilder> = Vec::new();
    let mut l_tables: Vec<SpecHtmlTable> = Vec::new();
    let mut n_ordinal_next = 0usize;
    let mut n_pos_text = 0usize;

    for caps in RE_HTML_TOKEN.captures_iter(html) {
        let Some(m_token) = caps.get(0) else {
            continue;
        };
        if let Some(builder) = l_stack.last_mut() {
            builder.push_text(&html[n_pos_text..m_token.start()]);
        }
        n_pos_text = m_token.end();

        let Some((if_closing, c_tag)) = derive_tag(&caps) else {
            continue;
        };

        if c_tag == "table" {
            if if_closing {
                if let Some(builder) = l_stack.pop() {
                    l_tables.push(builder.finish());
                }
            } else {
                l_stack.push(TableBuilder::new(n_ordinal_next));
                n_ordinal_next += 1;
            }
            continue;
        }

        let Some(builder) = l_stack.last_mut() else {
            continue;
        };
        match (c_tag.as_str(), if_closing) {
            ("tr", false) => builder.open_row(),
            ("tr", true) => builder.close_row(),
            ("td" | "th", false) => builder.open_cell(),
            ("td" | "th", true) => builder.close_cell(),
            ("thead" | "tbody" | "tfoot", _) => builder.close_row(),
            ("br", _) => builder.push_line_break(),
            _ => {}
        }
    }

    if let Some(builder) = l_stack.last_mut() {
        builder.push_text(&html[n_pos_text..]);
    }
    while let Some(builder) = l_stack.pop() {
        l_tables.push(builder.finish());
    }

    l_tables.sort_by_key(|table| table.n_ordinal);
    SpecHtmlDocument { tables: l_tables }
}

fn derive_tag(caps: &Captures<'_>) -> Option<(bool, String)> {
    let m_name = caps.get(2)?;
    let if_closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
    Some((if_closing, m_name.as_str().to_ascii_lowercase()))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TextNormalization

/// Decode named and numeric character references.
///
/// Only the common named references are known; others stay verbatim.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    RE_HTML_ENTITY
        .replace_all(s, |caps: &Captures<'_>| {
            let c_raw = &caps[0];
            let c_name = &caps[1];
            let chr = if let Some(c_hex) = c_name
                .strip_prefix("#x")
                .or_else(|| c_name.strip_prefix("#X"))
            {
                u32::from_str_radix(c_hex, 16).ok().and_then(char::from_u32)
            } else if let Some(c_dec) = c_name.strip_prefix('#') {
                c_dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match c_name {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            chr.map_or_else(|| c_raw.to_string(), String::from)
        })
        .into_owned()
}

/// Collapse sequences of whitespace into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
