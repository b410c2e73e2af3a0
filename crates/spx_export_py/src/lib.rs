use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Local;
use pyo3::exceptions::{PyOSError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyAny, PyDict};
use spx_export::conf::derive_default_cell_format;
use spx_export::spec::{SpecCellFormat, SpecDateColumn, SpecExportOptions, SpecExportReport};
use spx_export::{
    EnumExportVariant, ExportTableError, derive_export_file_name as rs_derive_export_file_name,
    derive_export_options_for_variant, export_html_table as rs_export_html_table,
    export_html_table_to_dir as rs_export_html_table_to_dir, select_column_indices_from_refs,
};

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "spx_export.table.v1";

/// Export the largest table of `html` to a single-sheet workbook.
///
/// Exactly one of `file_out` / `dir_out` is expected; with `dir_out` the file
/// name is timestamped from the local clock.
#[pyfunction]
#[pyo3(signature = (
    html,
    file_out = None,
    dir_out = None,
    variant = None,
    cols_remove = None,
    date_columns = None,
    sheet_name = None,
    fmt_cell = None,
    row_height_px = None,
    width_cell_min = None,
    width_lead_cell_min = None
))]
#[allow(clippy::too_many_arguments)]
fn export_html_table<'py>(
    py: Python<'py>,
    html: &str,
    file_out: Option<String>,
    dir_out: Option<String>,
    variant: Option<&str>,
    cols_remove: Option<&Bound<'_, PyAny>>,
    date_columns: Option<&Bound<'_, PyAny>>,
    sheet_name: Option<String>,
    fmt_cell: Option<&Bound<'_, PyAny>>,
    row_height_px: Option<u16>,
    width_cell_min: Option<usize>,
    width_lead_cell_min: Option<usize>,
) -> PyResult<Bound<'py, PyDict>> {
    let mut cfg_options = match variant {
        Some(val) => derive_export_options_for_variant(parse_export_variant(val)?),
        None => SpecExportOptions::default(),
    };

    if let Some(l_refs) = parse_column_refs(cols_remove)? {
        cfg_options.cols_idx_remove =
            select_column_indices_from_refs(&l_refs).map_err(derive_py_err)?;
    }
    if let Some(dict_date_cols) = parse_date_columns(date_columns)? {
        cfg_options.date_columns = dict_date_cols;
    }
    if let Some(val) = sheet_name {
        cfg_options.sheet_name = val;
    }
    if let Some(val) = parse_spec_cell_format(fmt_cell)? {
        cfg_options.fmt_cell = derive_default_cell_format().merge(&val);
    }
    if let Some(val) = row_height_px {
        cfg_options.policy_layout.row_height_px = val;
    }
    if let Some(val) = width_cell_min {
        cfg_options.policy_layout.width_cell_min = val;
    }
    if let Some(val) = width_lead_cell_min {
        cfg_options.policy_layout.width_lead_cell_min = val;
    }

    let report = match (file_out, dir_out) {
        (Some(c_file_out), None) => {
            rs_export_html_table(html, &PathBuf::from(c_file_out), &cfg_options)
        }
        (None, Some(c_dir_out)) => {
            rs_export_html_table_to_dir(html, &PathBuf::from(c_dir_out), &cfg_options)
        }
        _ => {
            return Err(PyValueError::new_err(
                "Pass exactly one of `file_out` or `dir_out`.",
            ));
        }
    }
    .map_err(derive_py_err)?;

    create_report_dict(py, &report)
}

/// Timestamped export file name for the current local time.
#[pyfunction]
#[pyo3(signature = (prefix = "SPX_export"))]
fn derive_export_file_name(prefix: &str) -> String {
    rs_derive_export_file_name(prefix, &Local::now().naive_local())
}

fn create_report_dict<'py>(
    py: Python<'py>,
    report: &SpecExportReport,
) -> PyResult<Bound<'py, PyDict>> {
    let dict_report = PyDict::new(py);
    dict_report.set_item("sheet_name", &report.sheet_name)?;
    dict_report.set_item(
        "file_out",
        report
            .file_out
            .as_ref()
            .map(|val| val.to_string_lossy().to_string()),
    )?;
    dict_report.set_item("n_tables_found", report.n_tables_found)?;
    dict_report.set_item("n_rows_source", report.n_rows_source)?;
    dict_report.set_item("n_rows", report.n_rows)?;
    dict_report.set_item("n_cols", report.n_cols)?;
    dict_report.set_item("n_dates_normalized", report.n_dates_normalized)?;
    dict_report.set_item("n_cells_decorated", report.n_cells_decorated)?;
    dict_report.set_item("warnings", report.warnings.clone())?;
    Ok(dict_report)
}

fn derive_py_err(err: ExportTableError) -> PyErr {
    match err {
        ExportTableError::NotFound
        | ExportTableError::Empty
        | ExportTableError::InvalidOptions(_)
        | ExportTableError::SheetTooLarge(_) => PyValueError::new_err(err.to_string()),
        ExportTableError::Io(_) => PyOSError::new_err(err.to_string()),
        ExportTableError::SheetAlreadyBuilt(_)
        | ExportTableError::WriterClosed
        | ExportTableError::Xlsx(_) => PyRuntimeError::new_err(err.to_string()),
    }
}

fn parse_export_variant(value: &str) -> PyResult<EnumExportVariant> {
    match value.trim().to_ascii_lowercase().as_str() {
        "v1" => Ok(EnumExportVariant::V1),
        "v2" => Ok(EnumExportVariant::V2),
        "v3" => Ok(EnumExportVariant::V3),
        "v4" => Ok(EnumExportVariant::V4),
        _ => Err(PyValueError::new_err(format!(
            "Invalid variant: {value:?}. Expected one of: v1, v2, v3, v4."
        ))),
    }
}

fn parse_spec_cell_format(obj: Option<&Bound<'_, PyAny>>) -> PyResult<Option<SpecCellFormat>> {
    let Some(obj) = obj else {
        return Ok(None);
    };
    if obj.is_none() {
        return Ok(None);
    }

    Ok(Some(SpecCellFormat {
        bold: extract_optional_attr::<bool>(obj, "bold")?,
        align: extract_optional_attr::<String>(obj, "align")?,
        valign: extract_optional_attr::<String>(obj, "valign")?,
        border: extract_optional_attr::<i64>(obj, "border")?,
        border_color: extract_optional_attr::<String>(obj, "border_color")?,
        text_wrap: extract_optional_attr::<bool>(obj, "text_wrap")?,
        top: extract_optional_attr::<i64>(obj, "top")?,
        bottom: extract_optional_attr::<i64>(obj, "bottom")?,
        left: extract_optional_attr::<i64>(obj, "left")?,
        right: extract_optional_attr::<i64>(obj, "right")?,
        num_format: extract_optional_attr::<String>(obj, "num_format")?,
        bg_color: extract_optional_attr::<String>(obj, "bg_color")?,
        font_color: extract_optional_attr::<String>(obj, "font_color")?,
    }))
}

/// Accept `{ref: with_time}` where `ref` is a column letter or an index.
fn parse_date_columns(
    value: Option<&Bound<'_, PyAny>>,
) -> PyResult<Option<BTreeMap<usize, SpecDateColumn>>> {
    let Some(value) = value else {
        return Ok(None);
    };
    if value.is_none() {
        return Ok(None);
    }

    let dict_value = value.downcast::<PyDict>().map_err(|_| {
        PyValueError::new_err("Date columns must be a dict of column ref -> with_time.")
    })?;

    let mut dict_date_cols = BTreeMap::new();
    for (key, val) in dict_value.iter() {
        let c_ref = match key.extract::<i64>() {
            Ok(n_idx) => n_idx.to_string(),
            Err(_) => key.extract::<String>()?,
        };
        let set_idx = select_column_indices_from_refs(&[c_ref]).map_err(derive_py_err)?;
        for n_idx in set_idx {
            dict_date_cols.insert(
                n_idx,
                SpecDateColumn {
                    if_with_time: val.extract::<bool>()?,
                },
            );
        }
    }

    Ok(Some(dict_date_cols))
}

fn parse_column_refs(value: Option<&Bound<'_, PyAny>>) -> PyResult<Option<Vec<String>>> {
    let Some(value) = value else {
        return Ok(None);
    };
    if value.is_none() {
        return Ok(None);
    }

    if let Ok(c_value) = value.extract::<String>() {
        return Ok(Some(vec![c_value]));
    }
    if let Ok(l_values) = value.extract::<Vec<String>>() {
        return Ok(Some(l_values));
    }
    if let Ok(l_values) = value.extract::<Vec<i64>>() {
        return Ok(Some(
            l_values
                .into_iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>(),
        ));
    }

    Err(PyValueError::new_err(
        "Column refs must be str, sequence[str], sequence[int], or None.",
    ))
}

fn extract_optional_attr<T>(obj: &Bound<'_, PyAny>, attr: &str) -> PyResult<Option<T>>
where
    for<'a> T: FromPyObject<'a>,
{
    if !obj.hasattr(attr)? {
        return Ok(None);
    }
    let val = obj.getattr(attr)?;
    if val.is_none() {
        return Ok(None);
    }
    Ok(Some(val.extract::<T>()?))
}

#[pymodule]
fn _spx_export_rs(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(export_html_table, module)?)?;
    module.add_function(wrap_pyfunction!(derive_export_file_name, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    Ok(())
}
