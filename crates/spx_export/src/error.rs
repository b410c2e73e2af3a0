//! Export error types.

use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportTableError>;

/// Errors that abort an export invocation.
///
/// Unparseable date text is not an error; such cells stay text.
#[derive(Debug, Error)]
pub enum ExportTableError {
    /// The document contains no table.
    #[error("No tables found on this page.")]
    NotFound,

    /// The selected table yields zero rows.
    #[error("Table appears to be empty.")]
    Empty,

    /// Options failed validation.
    #[error("Invalid export options: {0}")]
    InvalidOptions(String),

    /// Matrix does not fit in one worksheet.
    #[error("Sheet exceeds Excel limits: {0}")]
    SheetTooLarge(String),

    /// A second sheet was requested from a single-sheet exporter.
    #[error("Workbook already holds sheet {0:?}.")]
    SheetAlreadyBuilt(String),

    /// Exporter used after `close()`.
    #[error("Cannot write after close().")]
    WriterClosed,

    /// Workbook serialization error.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
