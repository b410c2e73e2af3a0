//! Export constants and default preset factories.

use std::collections::{BTreeMap, BTreeSet};

use crate::spec::{SpecCellFormat, SpecDateColumn, SpecExportOptions, SpecLayoutPolicy};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Excel column width upper bound, in character units.
pub const N_WIDTH_EXCEL_COLUMN_MAX: usize = 255;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Sheet name used by every historical export.
pub const C_SHEET_NAME_DEFAULT: &str = "SPX";
/// Export file name prefix (`<prefix>_<YYYYMMDD>_<HHMMSS>.xlsx`).
pub const C_FILE_NAME_PREFIX_DEFAULT: &str = "SPX_export";
/// Labels of the two inserted lead columns.
pub const TUP_LEAD_COLUMN_LABELS: [&str; 2] = ["Code", "PIN"];
/// Source columns dropped before insertion: C, F, G, H, I, K.
pub const TUP_COLS_IDX_REMOVE_DEFAULT: [usize; 6] = [2, 5, 6, 7, 8, 10];
/// Reshaped column holding a date-time (F).
pub const N_COL_IDX_DATETIME_DEFAULT: usize = 5;
/// Reshaped column holding a date (G).
pub const N_COL_IDX_DATE_DEFAULT: usize = 6;
/// First year of the 1900 date system; earlier dates stay text.
pub const N_YEAR_EXCEL_MIN: u32 = 1900;
/// Uniform row height in pixels.
pub const N_HEIGHT_ROW_PX_DEFAULT: u16 = 60;

/// Number format for date-only cells.
pub const C_NUM_FORMAT_DATE: &str = "dd/mm/yyyy";
/// Number format for date-time cells.
pub const C_NUM_FORMAT_DATETIME: &str = "dd/mm/yyyy h:mm";

/// Historical pipeline variants with their cosmetic differences pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumExportVariant {
    /// Floor 8 before padding on every column, no date normalization.
    V1,
    /// Lead columns 12, data floor 10, no date normalization.
    V2,
    /// Lead columns 12, data floor 10, dates in columns F/G.
    V3,
    /// Lead columns 12, data floor 12, dates in columns F/G.
    #[default]
    V4,
}

/// Build the canonical decoration: thin black border, vertical center, wrap.
pub fn derive_default_cell_format() -> SpecCellFormat {
    SpecCellFormat {
        border: Some(1),
        border_color: Some("000000".to_string()),
        valign: Some("vcenter".to_string()),
        text_wrap: Some(true),
        ..Default::default()
    }
}

/// Build the canonical `{F: datetime, G: date}` mapping.
pub fn derive_default_date_columns() -> BTreeMap<usize, SpecDateColumn> {
    let mut dict_date_cols = BTreeMap::new();
    dict_date_cols.insert(
        N_COL_IDX_DATETIME_DEFAULT,
        SpecDateColumn {
            if_with_time: true,
        },
    );
    dict_date_cols.insert(
        N_COL_IDX_DATE_DEFAULT,
        SpecDateColumn {
            if_with_time: false,
        },
    );
    dict_date_cols
}

/// Build default export options (latest variant).
pub fn derive_default_export_options() -> SpecExportOptions {
    SpecExportOptions::default()
}

/// Build export options pinned to one historical variant.
pub fn derive_export_options_for_variant(variant: EnumExportVariant) -> SpecExportOptions {
    let (n_width_lead_min, n_width_min, if_dates) = match variant {
        // `max(8, len) + 2` is the same as a floor of 10 after padding.
        EnumExportVariant::V1 => (10, 10, false),
        EnumExportVariant::V2 => (12, 10, false),
        EnumExportVariant::V3 => (12, 10, true),
        EnumExportVariant::V4 => (12, 12, true),
    };

    SpecExportOptions {
        date_columns: if if_dates {
            derive_default_date_columns()
        } else {
            BTreeMap::new()
        },
        policy_layout: SpecLayoutPolicy {
            width_cell_min: n_width_min,
            width_lead_cell_min: n_width_lead_min,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Canonical removal set as an owned set.
pub fn derive_default_cols_idx_remove() -> BTreeSet<usize> {
    TUP_COLS_IDX_REMOVE_DEFAULT.into_iter().collect()
}
