//! Shared export specification models.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::conf::{
    C_FILE_NAME_PREFIX_DEFAULT, C_NUM_FORMAT_DATE, C_NUM_FORMAT_DATETIME, C_SHEET_NAME_DEFAULT,
    N_HEIGHT_ROW_PX_DEFAULT, N_WIDTH_EXCEL_COLUMN_MAX, TUP_LEAD_COLUMN_LABELS,
    derive_default_cell_format, derive_default_cols_idx_remove, derive_default_date_columns,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell decoration record, mapped onto `rust_xlsxwriter::Format` at write time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Border color for all sides, `RRGGBB`.
    pub border_color: Option<String>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Left border override.
    pub left: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            border_color: other
                .border_color
                .clone()
                .or_else(|| self.border_color.clone()),
            text_wrap: other.text_wrap.or(self.text_wrap),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValues

/// Kind tag of a normalized date cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumDateKind {
    /// Calendar date shown as `dd/mm/yyyy`.
    Date,
    /// Date with time shown as `dd/mm/yyyy h:mm`.
    DateTime,
}

impl EnumDateKind {
    /// Excel number format attached to cells of this kind.
    pub fn num_format(self) -> &'static str {
        match self {
            Self::Date => C_NUM_FORMAT_DATE,
            Self::DateTime => C_NUM_FORMAT_DATETIME,
        }
    }
}

/// Typed date value replacing a recognized date text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecDateValue {
    /// Parsed local date-time (midnight for date-only text).
    pub value: NaiveDateTime,
    /// Kind tag.
    pub kind: EnumDateKind,
    /// Display number format.
    pub num_format: String,
}

impl SpecDateValue {
    /// Build a typed date value; the number format follows `kind`.
    pub fn new(value: NaiveDateTime, kind: EnumDateKind) -> Self {
        Self {
            value,
            kind,
            num_format: kind.num_format().to_string(),
        }
    }

    /// Text as shown by the display number format.
    pub fn render_text(&self) -> String {
        let c_date = format!(
            "{:02}/{:02}/{:04}",
            self.value.day(),
            self.value.month(),
            self.value.year()
        );
        match self.kind {
            EnumDateKind::Date => c_date,
            EnumDateKind::DateTime => format!(
                "{c_date} {}:{:02}",
                self.value.hour(),
                self.value.minute()
            ),
        }
    }
}

/// One cell in the export matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum EnumCellValue {
    /// No cell at this position (ragged row padding). Never written.
    #[default]
    Absent,
    /// Text value; empty text is still a materialized cell.
    Text(String),
    /// Normalized date value.
    Date(SpecDateValue),
}

impl EnumCellValue {
    /// Shorthand for a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Whether the exporter writes this cell.
    pub fn is_materialized(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Text as it appears in the sheet; `None` for absent cells.
    pub fn render_text(&self) -> Option<String> {
        match self {
            Self::Absent => None,
            Self::Text(val) => Some(val.clone()),
            Self::Date(val) => Some(val.render_text()),
        }
    }
}

/// Rectangular cell matrix. Row 0 is the header row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecCellMatrix {
    /// Rows in rendered order.
    pub rows: Vec<Vec<EnumCellValue>>,
}

impl SpecCellMatrix {
    /// Build a matrix, padding ragged rows with [`EnumCellValue::Absent`].
    pub fn new(mut rows: Vec<Vec<EnumCellValue>>) -> Self {
        let n_width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(n_width, EnumCellValue::Absent);
        }
        Self { rows }
    }

    /// Build a matrix of text cells.
    pub fn from_text_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|val| EnumCellValue::text(val.as_ref())).collect())
                .collect(),
        )
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportOptions

/// Date normalization mode for one reshaped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecDateColumn {
    /// Keep the time component and show it (`dd/mm/yyyy h:mm`).
    pub if_with_time: bool,
}

/// Column width and row height policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLayoutPolicy {
    /// Width padding added to the longest rendered text.
    pub width_cell_padding: usize,
    /// Minimum width of data columns.
    pub width_cell_min: usize,
    /// Minimum width of the inserted lead columns.
    pub width_lead_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Uniform row height in pixels.
    pub row_height_px: u16,
}

impl Default for SpecLayoutPolicy {
    fn default() -> Self {
        Self {
            width_cell_padding: 2,
            width_cell_min: 12,
            width_lead_cell_min: 12,
            width_cell_max: N_WIDTH_EXCEL_COLUMN_MAX,
            row_height_px: N_HEIGHT_ROW_PX_DEFAULT,
        }
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExportOptions {
    /// Source column indices dropped before insertion.
    pub cols_idx_remove: BTreeSet<usize>,
    /// Header labels of the two inserted lead columns.
    pub lead_column_labels: [String; 2],
    /// Reshaped column index -> date mode.
    pub date_columns: BTreeMap<usize, SpecDateColumn>,
    /// Output sheet name.
    pub sheet_name: String,
    /// Output file name prefix for timestamped exports.
    pub file_name_prefix: String,
    /// Width/height policy.
    pub policy_layout: SpecLayoutPolicy,
    /// Decoration applied to every materialized cell.
    pub fmt_cell: SpecCellFormat,
}

impl Default for SpecExportOptions {
    fn default() -> Self {
        Self {
            cols_idx_remove: derive_default_cols_idx_remove(),
            lead_column_labels: TUP_LEAD_COLUMN_LABELS.map(ToString::to_string),
            date_columns: derive_default_date_columns(),
            sheet_name: C_SHEET_NAME_DEFAULT.to_string(),
            file_name_prefix: C_FILE_NAME_PREFIX_DEFAULT.to_string(),
            policy_layout: SpecLayoutPolicy::default(),
            fmt_cell: derive_default_cell_format(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LayoutSpecification

/// Presentation metadata derived from the final matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetLayout {
    /// Column widths in character units.
    pub widths_by_col: Vec<usize>,
    /// Row heights in pixels.
    pub heights_px_by_row: Vec<u16>,
    /// Decoration shared by every materialized cell.
    pub fmt_cell: SpecCellFormat,
    /// Bounding rectangle height.
    pub n_rows: usize,
    /// Bounding rectangle width.
    pub n_cols: usize,
    /// Number of cells receiving the decoration.
    pub n_cells_decorated: usize,
}

impl SpecSheetLayout {
    /// Final format of one cell, or `None` when the cell is not written.
    ///
    /// Date cells carry their display number format on top of the decoration.
    pub fn derive_cell_format(&self, value: &EnumCellValue) -> Option<SpecCellFormat> {
        match value {
            EnumCellValue::Absent => None,
            EnumCellValue::Text(_) => Some(self.fmt_cell.clone()),
            EnumCellValue::Date(val) => Some(self.fmt_cell.with_(SpecCellFormat {
                num_format: Some(val.num_format.clone()),
                ..Default::default()
            })),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-export report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecExportReport {
    /// Actual sheet name in workbook.
    pub sheet_name: String,
    /// Written workbook path, when exported to disk.
    pub file_out: Option<PathBuf>,
    /// Number of tables found in the document.
    pub n_tables_found: usize,
    /// Row count of the selected source table.
    pub n_rows_source: usize,
    /// Final matrix height.
    pub n_rows: usize,
    /// Final matrix width.
    pub n_cols: usize,
    /// Cells converted to typed dates.
    pub n_dates_normalized: usize,
    /// Cells receiving border/alignment/wrap decoration.
    pub n_cells_decorated: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecExportReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
