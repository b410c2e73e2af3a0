//! Rectangular cell matrix extraction.

use crate::error::{ExportResult, ExportTableError};
use crate::html::SpecHtmlTable;
use crate::spec::{EnumCellValue, SpecCellMatrix};

/// Convert a located table into a rectangular matrix of raw text cells.
///
/// Row and intra-row column order are kept as rendered. Missing trailing
/// cells of short rows become [`EnumCellValue::Absent`]; trailing rows without
/// any cell are dropped. Fails with [`ExportTableError::Empty`] when no row
/// carries a cell.
pub fn extract_cell_matrix(table: &SpecHtmlTable) -> ExportResult<SpecCellMatrix> {
    let n_rows_used = table
        .rows
        .iter()
        .rposition(|row| !row.is_empty())
        .map_or(0, |n_idx| n_idx + 1);
    if n_rows_used == 0 {
        return Err(ExportTableError::Empty);
    }

    let l_rows = table.rows[..n_rows_used]
        .iter()
        .map(|row| row.iter().map(|val| EnumCellValue::text(val.as_str())).collect())
        .collect();
    let matrix = SpecCellMatrix::new(l_rows);

    log::debug!(
        "Extracted {}x{} cell matrix from table #{}",
        matrix.height(),
        matrix.width(),
        table.n_ordinal
    );
    Ok(matrix)
}
