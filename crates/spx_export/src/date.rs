//! Day-first date normalization.
//!
//! Recognized texts:
//! - `D/M/YYYY` or `D-M-YYYY` (one or two digit day/month, four digit year);
//! - the same followed by whitespace and `H:MM` (optional `:SS`), 24-hour.
//!
//! Anything else is left untouched. This is best-effort normalization, not
//! validation: source columns legitimately mix dates with other text.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::conf::N_YEAR_EXCEL_MIN;
use crate::spec::{EnumCellValue, EnumDateKind, SpecCellMatrix, SpecDateValue};

////////////////////////////////////////////////////////////////////////////////
// #region Parsing

/// Parse one cell text into a typed date value.
///
/// The date kind is `DateTime` only when `if_with_time` is set and the text
/// carries a time token. Returns `None` for empty, malformed or impossible
/// dates (e.g. `31/02/2025`) and for years before 1900, which Excel cannot
/// store.
pub fn parse_date_text(text: &str, if_with_time: bool) -> Option<SpecDateValue> {
    let mut tokens = text.split_whitespace();
    let date = parse_date_token(tokens.next()?)?;
    let time = tokens.next().and_then(parse_time_token);

    let kind = if if_with_time && time.is_some() {
        EnumDateKind::DateTime
    } else {
        EnumDateKind::Date
    };
    let value: NaiveDateTime = match time {
        Some(val) => date.and_time(val),
        None => date.and_hms_opt(0, 0, 0)?,
    };
    Some(SpecDateValue::new(value, kind))
}

fn parse_date_token(token: &str) -> Option<NaiveDate> {
    let sep = token.chars().find(|chr| !chr.is_ascii_digit())?;
    if sep != '/' && sep != '-' {
        return None;
    }

    let mut parts = token.split(sep);
    let n_day = parse_digits(parts.next()?, 1, 2)?;
    let n_month = parse_digits(parts.next()?, 1, 2)?;
    let n_year = parse_digits(parts.next()?, 4, 4)?;
    if parts.next().is_some() || n_year < N_YEAR_EXCEL_MIN {
        return None;
    }

    NaiveDate::from_ymd_opt(i32::try_from(n_year).ok()?, n_month, n_day)
}

fn parse_time_token(token: &str) -> Option<NaiveTime> {
    let mut parts = token.split(':');
    let n_hour = parse_digits(parts.next()?, 1, 2)?;
    let n_minute = parse_digits(parts.next()?, 2, 2)?;
    let n_second = match parts.next() {
        Some(part) => parse_digits(part, 2, 2)?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    NaiveTime::from_hms_opt(n_hour, n_minute, n_second)
}

fn parse_digits(s: &str, n_len_min: usize, n_len_max: usize) -> Option<u32> {
    if s.len() < n_len_min || s.len() > n_len_max || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnNormalization

/// Replace recognized date texts in one column of the data rows.
///
/// The header row is never touched; cells that fail to parse (or are not
/// text) keep their value. A column index beyond the matrix width is a no-op.
/// Returns the number of converted cells.
pub fn normalize_date_column(
    matrix: &mut SpecCellMatrix,
    col_idx: usize,
    if_with_time: bool,
) -> usize {
    let mut n_converted = 0usize;
    for row in matrix.rows.iter_mut().skip(1) {
        let Some(cell) = row.get_mut(col_idx) else {
            continue;
        };
        let EnumCellValue::Text(text) = cell else {
            continue;
        };
        let Some(value) = parse_date_text(text, if_with_time) else {
            continue;
        };
        *cell = EnumCellValue::Date(value);
        n_converted += 1;
    }

    log::debug!(
        "Normalized {n_converted} date cells in column {col_idx} (with_time={if_with_time})"
    );
    n_converted
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
