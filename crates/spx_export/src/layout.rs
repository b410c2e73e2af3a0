//! Column width, row height and decoration planning.

use crate::spec::{SpecCellFormat, SpecCellMatrix, SpecLayoutPolicy, SpecSheetLayout};

/// Number of inserted lead columns that use the lead width floor.
pub const N_COLS_LEAD: usize = 2;

/// Derive presentation metadata from the final matrix.
///
/// Pure function of its inputs: identical matrices yield identical layouts.
/// - width: longest rendered text (dates through their display format) plus
///   padding, clamped to `[floor, width_cell_max]`; the lead columns use
///   `width_lead_cell_min` as floor;
/// - height: `row_height_px` for every row, header included;
/// - decoration: `fmt_cell` for every materialized cell.
pub fn compute_sheet_layout(
    matrix: &SpecCellMatrix,
    policy: &SpecLayoutPolicy,
    fmt_cell: &SpecCellFormat,
) -> SpecSheetLayout {
    let n_rows = matrix.height();
    let n_cols = matrix.width();

    let mut l_width_by_col = vec![0usize; n_cols];
    let mut n_cells_decorated = 0usize;
    for row in &matrix.rows {
        for (n_idx_col, value) in row.iter().enumerate() {
            if !value.is_materialized() {
                continue;
            }
            n_cells_decorated += 1;
            let n_len = value
                .render_text()
                .map_or(0, |c_text| estimate_width_len(&c_text));
            l_width_by_col[n_idx_col] = usize::max(l_width_by_col[n_idx_col], n_len);
        }
    }

    let widths_by_col = l_width_by_col
        .into_iter()
        .enumerate()
        .map(|(n_idx_col, n_width_recorded)| {
            let n_min = if n_idx_col < N_COLS_LEAD {
                policy.width_lead_cell_min
            } else {
                policy.width_cell_min
            };
            let n_max = usize::max(n_min, policy.width_cell_max);
            usize::min(
                n_max,
                usize::max(n_min, n_width_recorded + policy.width_cell_padding),
            )
        })
        .collect();

    SpecSheetLayout {
        widths_by_col,
        heights_px_by_row: vec![policy.row_height_px; n_rows],
        fmt_cell: fmt_cell.clone(),
        n_rows,
        n_cols,
        n_cells_decorated,
    }
}

/// Displayed width of one cell text, in characters.
pub fn estimate_width_len(s: &str) -> usize {
    s.chars().count()
}
