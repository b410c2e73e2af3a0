//! Column removal and lead column insertion.

use std::collections::BTreeSet;

use crate::spec::{EnumCellValue, SpecCellMatrix};

/// Drop `cols_idx_remove` and prepend two lead columns.
///
/// Removal indices refer to the source matrix, before insertion; indices at or
/// beyond the row width are ignored. Row 0 receives `lead_column_labels`, every
/// other row two empty text cells.
pub fn reshape_columns(
    matrix: &SpecCellMatrix,
    cols_idx_remove: &BTreeSet<usize>,
    lead_column_labels: &[String; 2],
) -> SpecCellMatrix {
    let l_rows = matrix
        .rows
        .iter()
        .enumerate()
        .map(|(n_idx_row, row)| {
            let mut l_row_new = Vec::with_capacity(row.len() + 2);
            if n_idx_row == 0 {
                l_row_new.extend(lead_column_labels.iter().map(|val| EnumCellValue::text(val)));
            } else {
                l_row_new.extend([EnumCellValue::text(""), EnumCellValue::text("")]);
            }
            l_row_new.extend(
                row.iter()
                    .enumerate()
                    .filter(|(n_idx_col, _)| !cols_idx_remove.contains(n_idx_col))
                    .map(|(_, val)| val.clone()),
            );
            l_row_new
        })
        .collect();

    let matrix_new = SpecCellMatrix { rows: l_rows };
    log::debug!(
        "Reshaped matrix width {} -> {} (removal set {:?})",
        matrix.width(),
        matrix_new.width(),
        cols_idx_remove
    );
    matrix_new
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{TUP_LEAD_COLUMN_LABELS, derive_default_cols_idx_remove};

    fn derive_labels() -> [String; 2] {
        TUP_LEAD_COLUMN_LABELS.map(ToString::to_string)
    }

    fn derive_letter_row() -> Vec<String> {
        ('A'..='K').map(String::from).collect()
    }

    #[test]
    fn reshape_removes_canonical_columns_and_prefixes_code_pin() {
        let matrix =
            SpecCellMatrix::from_text_rows(&[derive_letter_row(), derive_letter_row()]);

        let matrix_new =
            reshape_columns(&matrix, &derive_default_cols_idx_remove(), &derive_labels());

        let l_header: Vec<String> = matrix_new.rows[0]
            .iter()
            .filter_map(EnumCellValue::render_text)
            .collect();
        assert_eq!(l_header, vec!["Code", "PIN", "A", "B", "D", "E", "J"]);

        let l_data: Vec<String> = matrix_new.rows[1]
            .iter()
            .filter_map(EnumCellValue::render_text)
            .collect();
        assert_eq!(l_data, vec!["", "", "A", "B", "D", "E", "J"]);
    }

    #[test]
    fn reshape_width_follows_removed_count_for_every_width() {
        let set_remove = derive_default_cols_idx_remove();
        for n_width in 0..14usize {
            let row: Vec<String> = (0..n_width).map(|n| n.to_string()).collect();
            let matrix = SpecCellMatrix::from_text_rows(&[row.clone(), row.clone(), row]);

            let matrix_new = reshape_columns(&matrix, &set_remove, &derive_labels());

            let n_removed = set_remove.iter().filter(|n_idx| **n_idx < n_width).count();
            for row_new in &matrix_new.rows {
                assert_eq!(row_new.len(), n_width - n_removed + 2);
            }
        }
    }

    #[test]
    fn reshape_blanks_lead_cells_of_data_rows_regardless_of_content() {
        let matrix = SpecCellMatrix::from_text_rows(&[
            vec!["Code", "PIN", "x"],
            vec!["Code", "PIN", "y"],
        ]);

        let matrix_new = reshape_columns(&matrix, &BTreeSet::new(), &derive_labels());

        assert_eq!(matrix_new.rows[0][0], EnumCellValue::text("Code"));
        assert_eq!(matrix_new.rows[1][0], EnumCellValue::text(""));
        assert_eq!(matrix_new.rows[1][1], EnumCellValue::text(""));
        assert_eq!(matrix_new.rows[1][2], EnumCellValue::text("Code"));
    }

    #[test]
    fn reshape_keeps_absent_padding_of_survivors() {
        let matrix = SpecCellMatrix::new(vec![
            vec![EnumCellValue::text("a"), EnumCellValue::text("b")],
            vec![EnumCellValue::text("c")],
        ]);
        let set_remove: BTreeSet<usize> = [0].into_iter().collect();

        let matrix_new = reshape_columns(&matrix, &set_remove, &derive_labels());

        assert_eq!(matrix_new.width(), 3);
        assert_eq!(matrix_new.rows[1][2], EnumCellValue::Absent);
    }
}
