//! End-to-end export orchestration.

use std::io;
use std::path::Path;

use chrono::Local;

use crate::conf::TUP_EXCEL_ILLEGAL;
use crate::date::normalize_date_column;
use crate::error::{ExportResult, ExportTableError};
use crate::extract::extract_cell_matrix;
use crate::html::parse_html_document;
use crate::layout::compute_sheet_layout;
use crate::locate::locate_table;
use crate::reshape::reshape_columns;
use crate::spec::{SpecCellMatrix, SpecExportOptions, SpecExportReport, SpecSheetLayout};
use crate::util::{derive_column_letters, derive_export_file_name, sanitize_sheet_name};
use crate::writer::XlsxSheetExporter;

/// Final matrix with its layout and report, ready for the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetPlan {
    pub matrix: SpecCellMatrix,
    pub layout: SpecSheetLayout,
    pub report: SpecExportReport,
}

/// Reject option sets the pipeline cannot honor.
pub fn validate_export_options(options: &SpecExportOptions) -> ExportResult<()> {
    let policy = &options.policy_layout;
    if policy.width_cell_min == 0 || policy.width_lead_cell_min == 0 {
        return Err(ExportTableError::InvalidOptions(
            "width floors must be >= 1".to_string(),
        ));
    }
    if policy.width_cell_max < usize::max(policy.width_cell_min, policy.width_lead_cell_min) {
        return Err(ExportTableError::InvalidOptions(format!(
            "width_cell_max ({}) must be >= width floors ({}, {})",
            policy.width_cell_max, policy.width_lead_cell_min, policy.width_cell_min
        )));
    }
    if policy.row_height_px == 0 {
        return Err(ExportTableError::InvalidOptions(
            "row_height_px must be >= 1".to_string(),
        ));
    }
    let mut c_sheet_name = options.sheet_name.clone();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_sheet_name = c_sheet_name.replace(c_illegal, "");
    }
    if c_sheet_name.trim().trim_matches('\'').trim().is_empty() {
        return Err(ExportTableError::InvalidOptions(format!(
            "sheet_name is not usable: {:?}",
            options.sheet_name
        )));
    }
    if options.file_name_prefix.is_empty() || options.file_name_prefix.contains(['/', '\\']) {
        return Err(ExportTableError::InvalidOptions(format!(
            "file_name_prefix must be a plain non-empty name: {:?}",
            options.file_name_prefix
        )));
    }
    Ok(())
}

/// Run locate -> extract -> reshape -> dates -> layout without touching disk.
///
/// Deterministic: the same document and options always give the same plan.
pub fn plan_table_sheet(html: &str, options: &SpecExportOptions) -> ExportResult<SpecSheetPlan> {
    validate_export_options(options)?;

    let document = parse_html_document(html);
    let table = locate_table(&document)?;
    let matrix_source = extract_cell_matrix(table)?;

    let mut report = SpecExportReport {
        sheet_name: sanitize_sheet_name(&options.sheet_name, "_"),
        n_tables_found: document.tables.len(),
        n_rows_source: table.n_rows(),
        ..Default::default()
    };

    let n_width_source = matrix_source.width();
    for n_idx in options.cols_idx_remove.range(n_width_source..) {
        report.warn(format!(
            "Removal index {n_idx} ({}) is beyond the source width {n_width_source}; ignored.",
            derive_column_letters(*n_idx)
        ));
    }

    let mut matrix = reshape_columns(
        &matrix_source,
        &options.cols_idx_remove,
        &options.lead_column_labels,
    );

    let n_width = matrix.width();
    for (n_idx_col, col_date) in &options.date_columns {
        if *n_idx_col >= n_width {
            report.warn(format!(
                "Date column {n_idx_col} ({}) is beyond the reshaped width {n_width}; ignored.",
                derive_column_letters(*n_idx_col)
            ));
            continue;
        }
        report.n_dates_normalized +=
            normalize_date_column(&mut matrix, *n_idx_col, col_date.if_with_time);
    }

    let layout = compute_sheet_layout(&matrix, &options.policy_layout, &options.fmt_cell);
    report.n_rows = layout.n_rows;
    report.n_cols = layout.n_cols;
    report.n_cells_decorated = layout.n_cells_decorated;

    for c_warning in &report.warnings {
        log::warn!("{c_warning}");
    }

    Ok(SpecSheetPlan {
        matrix,
        layout,
        report,
    })
}

/// Plan the sheet and write it as a single-sheet workbook at `path_file_out`.
///
/// The file is only created after every stage succeeded.
pub fn export_html_table(
    html: &str,
    path_file_out: &Path,
    options: &SpecExportOptions,
) -> ExportResult<SpecExportReport> {
    let SpecSheetPlan {
        matrix,
        layout,
        mut report,
    } = plan_table_sheet(html, options)?;

    let mut exporter = XlsxSheetExporter::new(path_file_out.to_path_buf());
    report.sheet_name = exporter.build_sheet(&matrix, &layout, &options.sheet_name)?;
    exporter.close()?;

    log::info!(
        "Exported {}x{} sheet {:?} to {}",
        report.n_rows,
        report.n_cols,
        report.sheet_name,
        path_file_out.display()
    );
    report.file_out = Some(exporter.file_out().to_path_buf());
    Ok(report)
}

/// Same as [`export_html_table`], naming the file from the local clock.
pub fn export_html_table_to_dir(
    html: &str,
    dir_out: &Path,
    options: &SpecExportOptions,
) -> ExportResult<SpecExportReport> {
    if !dir_out.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Output directory does not exist: {}", dir_out.display()),
        )
        .into());
    }
    let c_file_name =
        derive_export_file_name(&options.file_name_prefix, &Local::now().naive_local());
    export_html_table(html, &dir_out.join(c_file_name), options)
}
