use chrono::{Days, NaiveDate};
use std::fmt;

/// Value held by one worksheet cell.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel 1900-system serial date.
    Date(f64),
    /// Formula text without the leading `=`, plus the last value Excel computed for it.
    Formula { expr: String, cached: Option<String> },
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }

    /// Blank in the sense the row scan uses: nothing, or an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(serial) => match serial_to_date(*serial) {
                Some(date) => write!(f, "{}", date.format("%d/%m/%Y")),
                None => f.write_str(&format_number(*serial)),
            },
            CellValue::Formula { expr, cached } => match cached {
                Some(value) => f.write_str(value),
                None => write!(f, "={}", expr),
            },
        }
    }
}

/// Integral values print without a fractional part (`3.0` -> `3`).
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Convert an Excel serial day number to a calendar date.
///
/// Day 0 of the 1900 system is 1899-12-30 once the fictitious 1900-02-29 is
/// accounted for, which is correct for every date from March 1900 on.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}
