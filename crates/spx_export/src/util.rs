//! Stateless helper utilities used by the export kernel.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::error::{ExportResult, ExportTableError};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().trim_matches('\'').trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Reject matrices that do not fit in one worksheet.
pub fn validate_sheet_bounds(n_rows: usize, n_cols: usize) -> ExportResult<()> {
    if n_rows > N_NROWS_EXCEL_MAX {
        return Err(ExportTableError::SheetTooLarge(format!(
            "{n_rows} rows > {N_NROWS_EXCEL_MAX}"
        )));
    }
    if n_cols > N_NCOLS_EXCEL_MAX {
        return Err(ExportTableError::SheetTooLarge(format!(
            "{n_cols} columns > {N_NCOLS_EXCEL_MAX}"
        )));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnRefs

/// Convert spreadsheet column letters (`A`, `K`, `AA`) to a zero-based index.
pub fn parse_column_letters(letters: &str) -> Option<usize> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut n_idx = 0usize;
    for chr in letters.chars() {
        if !chr.is_ascii_alphabetic() {
            return None;
        }
        n_idx = n_idx * 26 + (chr.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(n_idx - 1)
}

/// Convert a zero-based column index to spreadsheet letters.
pub fn derive_column_letters(col_idx: usize) -> String {
    let mut l_chars = Vec::new();
    let mut n_rest = col_idx + 1;
    while n_rest > 0 {
        let n_rem = (n_rest - 1) % 26;
        l_chars.push((b'A' + n_rem as u8) as char);
        n_rest = (n_rest - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

/// Resolve mixed refs (zero-based index or column letters) to a sorted set.
pub fn select_column_indices_from_refs(refs: &[String]) -> ExportResult<BTreeSet<usize>> {
    let mut set_idx = BTreeSet::new();
    for ref_col in refs {
        let c_ref = ref_col.trim();
        if let Ok(n_idx) = c_ref.parse::<usize>() {
            set_idx.insert(n_idx);
            continue;
        }

        let Some(n_idx) = parse_column_letters(c_ref) else {
            return Err(ExportTableError::InvalidOptions(format!(
                "Column ref must be an index or letters: {ref_col:?}"
            )));
        };
        set_idx.insert(n_idx);
    }

    Ok(set_idx)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileNames

/// Build `<prefix>_<YYYYMMDD>_<HHMMSS>.xlsx`, all components zero-padded.
pub fn derive_export_file_name(prefix: &str, timestamp: &NaiveDateTime) -> String {
    format!(
        "{prefix}_{:04}{:02}{:02}_{:02}{:02}{:02}.xlsx",
        timestamp.year(),
        timestamp.month(),
        timestamp.day(),
        timestamp.hour(),
        timestamp.minute(),
        timestamp.second()
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasting

/// Cast a matrix row index to a worksheet row number.
pub fn cast_row_num(value: usize) -> ExportResult<u32> {
    u32::try_from(value)
        .map_err(|_| ExportTableError::SheetTooLarge(format!("row index overflow: {value}")))
}

/// Cast a matrix column index to a worksheet column number.
pub fn cast_col_num(value: usize) -> ExportResult<u16> {
    u16::try_from(value)
        .map_err(|_| ExportTableError::SheetTooLarge(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn derive_datetime(y: i32, m: u32, d: u32, hh: u32, mi: u32, ss: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|val| val.and_hms_opt(hh, mi, ss))
            .expect("valid datetime")
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("SPX", "_"), "SPX");
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("  ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").len(), 31);
    }

    #[test]
    fn test_column_letters_round_trip_known_values() {
        assert_eq!(parse_column_letters("A"), Some(0));
        assert_eq!(parse_column_letters("k"), Some(10));
        assert_eq!(parse_column_letters("AA"), Some(26));
        assert_eq!(parse_column_letters("XFD"), Some(16_383));
        assert_eq!(parse_column_letters("A1"), None);
        assert_eq!(derive_column_letters(0), "A");
        assert_eq!(derive_column_letters(27), "AB");
        assert_eq!(derive_column_letters(16_383), "XFD");
    }

    #[test]
    fn test_select_column_indices_from_mixed_refs() {
        let refs: Vec<String> = ["C", "F", "g", "7", "8", " K "]
            .iter()
            .map(ToString::to_string)
            .collect();

        let set_idx = select_column_indices_from_refs(&refs).expect("valid refs");
        assert_eq!(set_idx.into_iter().collect::<Vec<_>>(), vec![2, 5, 6, 7, 8, 10]);

        let err = select_column_indices_from_refs(&["C-1".to_string()]);
        assert!(matches!(err, Err(ExportTableError::InvalidOptions(_))));
    }

    #[test]
    fn test_derive_export_file_name_is_zero_padded() {
        let timestamp = derive_datetime(2025, 3, 7, 9, 5, 1);
        assert_eq!(
            derive_export_file_name("SPX_export", &timestamp),
            "SPX_export_20250307_090501.xlsx"
        );
    }

    #[test]
    fn test_validate_sheet_bounds() {
        assert!(validate_sheet_bounds(N_NROWS_EXCEL_MAX, N_NCOLS_EXCEL_MAX).is_ok());
        assert!(matches!(
            validate_sheet_bounds(N_NROWS_EXCEL_MAX + 1, 1),
            Err(ExportTableError::SheetTooLarge(_))
        ));
        assert!(matches!(
            validate_sheet_bounds(1, N_NCOLS_EXCEL_MAX + 1),
            Err(ExportTableError::SheetTooLarge(_))
        ));
    }
}
