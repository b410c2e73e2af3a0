//! XLSX sheet exporter that turns a planned matrix into workbook output.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::error::{ExportResult, ExportTableError};
use crate::spec::{EnumCellValue, SpecCellFormat, SpecCellMatrix, SpecSheetLayout};
use crate::util::{cast_col_num, cast_row_num, sanitize_sheet_name, validate_sheet_bounds};

/// Stateful single-sheet workbook exporter.
///
/// The sheet is buffered in memory; the file only appears on [`Self::close`].
pub struct XlsxSheetExporter {
    path_file_out: PathBuf,
    workbook: Workbook,
    sheet_name_built: Option<String>,
    if_closed: bool,
}

impl XlsxSheetExporter {
    /// Create an exporter bound to an output path.
    pub fn new(path_file_out: PathBuf) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            sheet_name_built: None,
            if_closed: false,
        }
    }

    /// Output file path.
    pub fn file_out(&self) -> &Path {
        &self.path_file_out
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> ExportResult<()> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        log::info!("Saved workbook {}", self.path_file_out.display());
        Ok(())
    }

    /// Serialize the workbook without touching the output path.
    pub fn save_to_buffer(&mut self) -> ExportResult<Vec<u8>> {
        Ok(self.workbook.save_to_buffer()?)
    }

    /// Add the sheet holding `matrix`, decorated per `layout`.
    ///
    /// Returns the actual (sanitized) sheet name. A workbook holds one sheet.
    pub fn build_sheet(
        &mut self,
        matrix: &SpecCellMatrix,
        layout: &SpecSheetLayout,
        sheet_name: &str,
    ) -> ExportResult<String> {
        if self.if_closed {
            return Err(ExportTableError::WriterClosed);
        }
        if let Some(val) = &self.sheet_name_built {
            return Err(ExportTableError::SheetAlreadyBuilt(val.clone()));
        }
        validate_sheet_bounds(matrix.height(), matrix.width())?;

        let c_sheet_name = sanitize_sheet_name(sheet_name, "_");
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&c_sheet_name)?;

        write_matrix(worksheet, matrix, layout)?;
        write_dimensions(worksheet, layout)?;

        log::debug!(
            "Built sheet {c_sheet_name:?}: {}x{} ({} decorated cells)",
            layout.n_rows,
            layout.n_cols,
            layout.n_cells_decorated
        );
        self.sheet_name_built = Some(c_sheet_name.clone());
        Ok(c_sheet_name)
    }
}

fn write_matrix(
    worksheet: &mut Worksheet,
    matrix: &SpecCellMatrix,
    layout: &SpecSheetLayout,
) -> ExportResult<()> {
    let fmt_text = derive_rust_xlsx_format(&layout.fmt_cell);
    for (row_idx, row_values) in matrix.rows.iter().enumerate() {
        for (col_idx, value) in row_values.iter().enumerate() {
            let Some(fmt_cell) = layout.derive_cell_format(value) else {
                continue;
            };
            let n_row = cast_row_num(row_idx)?;
            let n_col = cast_col_num(col_idx)?;
            match value {
                EnumCellValue::Absent => {}
                EnumCellValue::Text(val) if val.is_empty() => {
                    worksheet.write_blank(n_row, n_col, &fmt_text)?;
                }
                EnumCellValue::Text(val) => {
                    worksheet.write_string_with_format(n_row, n_col, val, &fmt_text)?;
                }
                EnumCellValue::Date(val) => {
                    let fmt_date = derive_rust_xlsx_format(&fmt_cell);
                    worksheet.write_datetime_with_format(n_row, n_col, &val.value, &fmt_date)?;
                }
            }
        }
    }
    Ok(())
}

fn write_dimensions(worksheet: &mut Worksheet, layout: &SpecSheetLayout) -> ExportResult<()> {
    for (col_idx, n_width) in layout.widths_by_col.iter().enumerate() {
        worksheet.set_column_width(cast_col_num(col_idx)?, *n_width as f64)?;
    }
    for (row_idx, n_height_px) in layout.heights_px_by_row.iter().enumerate() {
        worksheet.set_row_height_pixels(cast_row_num(row_idx)?, *n_height_px)?;
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if let Some(val) = spec.top {
        format = format.set_border_top(derive_format_border(val));
    }
    if let Some(val) = spec.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }
    if let Some(val) = spec.left {
        format = format.set_border_left(derive_format_border(val));
    }
    if let Some(val) = spec.right {
        format = format.set_border_right(derive_format_border(val));
    }
    if let Some(val) = &spec.border_color {
        format = format.set_border_color(val.as_str());
    }

    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use calamine::{Data, Reader, Xlsx, open_workbook};
    use chrono::NaiveDate;
    use regex::Regex;

    use super::*;
    use crate::conf::derive_default_cell_format;
    use crate::layout::compute_sheet_layout;
    use crate::spec::{EnumDateKind, SpecDateValue, SpecLayoutPolicy};

    fn derive_date(y: i32, m: u32, d: u32) -> EnumCellValue {
        let value = NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date");
        EnumCellValue::Date(SpecDateValue::new(value, EnumDateKind::Date))
    }

    fn derive_layout(matrix: &SpecCellMatrix) -> SpecSheetLayout {
        compute_sheet_layout(
            matrix,
            &SpecLayoutPolicy::default(),
            &derive_default_cell_format(),
        )
    }

    fn read_zip_entry(buf: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(buf)).expect("xlsx is a zip");
        let mut entry = archive.by_name(name).expect("zip entry exists");
        let mut c_xml = String::new();
        entry.read_to_string(&mut c_xml).expect("utf-8 xml");
        c_xml
    }

    fn read_serial(range: &calamine::Range<Data>, pos: (u32, u32)) -> f64 {
        match range.get_value(pos) {
            Some(Data::DateTime(val)) => val.as_f64(),
            Some(Data::Float(val)) => *val,
            other => panic!("unexpected date cell {other:?}"),
        }
    }

    fn derive_matrix() -> SpecCellMatrix {
        SpecCellMatrix::new(vec![
            vec![
                EnumCellValue::text("Code"),
                EnumCellValue::text("PIN"),
                EnumCellValue::text("When"),
            ],
            vec![
                EnumCellValue::text(""),
                EnumCellValue::text(""),
                derive_date(2025, 12, 4),
            ],
            vec![EnumCellValue::text(""), EnumCellValue::text("")],
        ])
    }

    #[test]
    fn build_sheet_writes_text_dates_and_skips_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.xlsx");
        let matrix = derive_matrix();
        let layout = derive_layout(&matrix);

        let mut exporter = XlsxSheetExporter::new(path.clone());
        let sheet_name = exporter
            .build_sheet(&matrix, &layout, "SPX")
            .expect("sheet built");
        assert_eq!(sheet_name, "SPX");
        assert!(!path.exists());
        exporter.close().expect("saved");
        assert!(path.exists());

        let mut workbook: Xlsx<_> = open_workbook(&path).expect("readable workbook");
        let range = workbook.worksheet_range("SPX").expect("sheet exists");
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Code".to_string())));
        assert_eq!(range.get_value((0, 2)), Some(&Data::String("When".to_string())));
        assert_eq!(read_serial(&range, (1, 2)), 45995.0);
        assert!(matches!(range.get_value((2, 2)), None | Some(Data::Empty)));
    }

    #[test]
    fn close_is_idempotent_and_blocks_later_writes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let matrix = derive_matrix();
        let layout = derive_layout(&matrix);

        let mut exporter = XlsxSheetExporter::new(dir.path().join("out.xlsx"));
        exporter.build_sheet(&matrix, &layout, "SPX").expect("sheet built");
        exporter.close().expect("first close");
        exporter.close().expect("second close");

        assert!(matches!(
            exporter.build_sheet(&matrix, &layout, "SPX"),
            Err(ExportTableError::WriterClosed)
        ));
    }

    #[test]
    fn second_sheet_is_rejected_and_name_is_sanitized() {
        let matrix = derive_matrix();
        let layout = derive_layout(&matrix);

        let mut exporter = XlsxSheetExporter::new(PathBuf::from("unused.xlsx"));
        let sheet_name = exporter.build_sheet(&matrix, &layout, "a/b").expect("first");
        assert_eq!(sheet_name, "a_b");

        let err = exporter.build_sheet(&matrix, &layout, "other");
        assert!(matches!(err, Err(ExportTableError::SheetAlreadyBuilt(val)) if val == "a_b"));
        assert!(!exporter.save_to_buffer().expect("buffer").is_empty());
    }

    #[test]
    fn early_1900_dates_get_excel_serials() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("early.xlsx");
        let matrix = SpecCellMatrix::new(vec![
            vec![EnumCellValue::text("When")],
            vec![derive_date(1900, 1, 15)],
            vec![derive_date(1900, 2, 28)],
            vec![derive_date(1900, 3, 1)],
        ]);
        let layout = derive_layout(&matrix);

        let mut exporter = XlsxSheetExporter::new(path.clone());
        exporter.build_sheet(&matrix, &layout, "SPX").expect("sheet built");
        exporter.close().expect("saved");

        let mut workbook: Xlsx<_> = open_workbook(&path).expect("readable workbook");
        let range = workbook.worksheet_range("SPX").expect("sheet exists");
        assert_eq!(read_serial(&range, (1, 0)), 15.0);
        assert_eq!(read_serial(&range, (2, 0)), 59.0);
        // Serial 60 is the phantom 29/02/1900.
        assert_eq!(read_serial(&range, (3, 0)), 61.0);
    }

    #[test]
    fn saved_sheet_carries_widths_heights_and_cell_styles() {
        let matrix = derive_matrix();
        let mut layout = derive_layout(&matrix);
        layout.widths_by_col = vec![12, 20, 30];

        let mut exporter = XlsxSheetExporter::new(PathBuf::from("unused.xlsx"));
        exporter.build_sheet(&matrix, &layout, "SPX").expect("sheet built");
        let buf = exporter.save_to_buffer().expect("buffer");
        let c_sheet_xml = read_zip_entry(&buf, "xl/worksheets/sheet1.xml");
        let c_styles_xml = read_zip_entry(&buf, "xl/styles.xml");

        let re_col = Regex::new(r#"<col min="(\d+)" max="(\d+)" width="([0-9.]+)""#)
            .expect("valid regex");
        let mut l_widths = vec![None; 3];
        for caps in re_col.captures_iter(&c_sheet_xml) {
            let n_min: usize = caps[1].parse().expect("min");
            let n_max: usize = caps[2].parse().expect("max");
            let n_width: f64 = caps[3].parse().expect("width");
            for n_col in n_min..=n_max {
                l_widths[n_col - 1] = Some(n_width);
            }
        }
        for (n_idx, n_expected) in [12.0, 20.0, 30.0].into_iter().enumerate() {
            let n_width = l_widths[n_idx].expect("column width written");
            assert!(
                (n_expected..n_expected + 1.0).contains(&n_width),
                "column {n_idx}: {n_width}"
            );
        }

        assert_eq!(c_sheet_xml.matches(r#"ht="45""#).count(), 3);
        assert!(c_sheet_xml.contains(r#"customHeight="1""#));

        let re_cell = Regex::new(r"<c [^>]*>").expect("valid regex");
        let l_cells: Vec<&str> = re_cell
            .find_iter(&c_sheet_xml)
            .map(|val| val.as_str())
            .collect();
        assert_eq!(l_cells.len(), layout.n_cells_decorated);
        assert!(l_cells.iter().all(|val| val.contains(" s=\"")));
        assert!(!c_sheet_xml.contains(r#"r="C3""#));

        assert!(c_styles_xml.contains(r#"style="thin""#));
        assert!(c_styles_xml.contains(r#"rgb="FF000000""#));
        assert!(c_styles_xml.contains(r#"vertical="center""#));
        assert!(c_styles_xml.contains(r#"wrapText="1""#));
        assert!(c_styles_xml.contains(r#"formatCode="dd/mm/yyyy""#));
    }

    #[test]
    fn format_mapping_accepts_known_codes_only() {
        assert!(matches!(derive_format_border(1), FormatBorder::Thin));
        assert!(matches!(derive_format_border(99), FormatBorder::None));
        assert!(matches!(
            derive_format_align(" VCenter "),
            Some(FormatAlign::VerticalCenter)
        ));
        assert!(derive_format_align("sideways").is_none());
    }
}
