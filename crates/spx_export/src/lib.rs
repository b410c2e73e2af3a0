//! `spx_export` v1:
//! HTML table to single-sheet XLSX export kernel.
//!
//! Pipeline stages run strictly forward:
//! `html` -> `locate` -> `extract` -> `reshape` -> `date` -> `layout` -> `writer`.
//!
//! Module map:
//! - `conf`     : constants and preset factories
//! - `spec`     : models/options/reports
//! - `error`    : error taxonomy
//! - `html`     : tolerant HTML table scanner
//! - `locate`   : main-table selection
//! - `extract`  : rectangular cell matrix extraction
//! - `reshape`  : column removal and Code/PIN insertion
//! - `date`     : day-first date normalization
//! - `layout`   : widths/heights/decoration planning
//! - `writer`   : rust_xlsxwriter-backed sheet exporter
//! - `util`     : pure helper functions
//! - `pipeline` : end-to-end orchestration
pub mod conf;
pub mod date;
pub mod error;
pub mod extract;
pub mod html;
pub mod layout;
pub mod locate;
pub mod pipeline;
pub mod reshape;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    EnumExportVariant, N_HEIGHT_ROW_PX_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, derive_default_export_options, derive_export_options_for_variant,
};
pub use date::{normalize_date_column, parse_date_text};
pub use error::ExportTableError;
pub use extract::extract_cell_matrix;
pub use html::{SpecHtmlDocument, SpecHtmlTable, parse_html_document};
pub use layout::compute_sheet_layout;
pub use locate::locate_table;
pub use pipeline::{
    SpecSheetPlan, export_html_table, export_html_table_to_dir, plan_table_sheet,
    validate_export_options,
};
pub use reshape::reshape_columns;
pub use spec::{
    EnumCellValue, EnumDateKind, SpecCellFormat, SpecCellMatrix, SpecDateColumn, SpecDateValue,
    SpecExportOptions, SpecExportReport, SpecLayoutPolicy, SpecSheetLayout,
};
pub use util::{
    derive_export_file_name, sanitize_sheet_name, select_column_indices_from_refs,
};
pub use writer::XlsxSheetExporter;
