//! A1-style range addressing (`'May 2024'!A2:E2`).
//!
//! Columns are stored 0-based, rows 1-based as they appear in the notation.
//! A range without row numbers spans whole columns.

use crate::error::{LedgerError, Result};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// A rectangular range inside one container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeSpec {
    pub container: String,
    pub start_col: usize,
    pub end_col: usize,
    pub start_row: Option<u32>,
    pub end_row: Option<u32>,
}

impl RangeSpec {
    /// Whole-column range, e.g. `May!A:E`.
    pub fn columns(container: impl Into<String>, start_col: usize, end_col: usize) -> Self {
        Self {
            container: container.into(),
            start_col,
            end_col,
            start_row: None,
            end_row: None,
        }
    }

    /// Single-row range, e.g. `May!A7:E7`.
    pub fn row(container: impl Into<String>, start_col: usize, end_col: usize, row: u32) -> Self {
        Self {
            container: container.into(),
            start_col,
            end_col,
            start_row: Some(row),
            end_row: Some(row),
        }
    }

    /// 0-based column indices covered by the range.
    pub fn column_span(&self) -> Range<usize> {
        self.start_col..self.end_col + 1
    }

    pub fn width(&self) -> usize {
        self.end_col + 1 - self.start_col
    }

    /// 0-based index of the first grid row covered. Row 0 does not exist and
    /// clamps to the first row.
    pub fn first_row_index(&self) -> usize {
        self.start_row
            .map(|r| r.saturating_sub(1) as usize)
            .unwrap_or(0)
    }

    /// 0-based exclusive end, `None` for open-ended ranges.
    pub fn end_row_index(&self) -> Option<usize> {
        self.end_row.map(|r| r as usize)
    }
}

/// Convert a 0-based column index into letters (0 -> A, 26 -> AA).
pub fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Parse column letters into a 0-based index.
pub fn parse_column(letters: &str) -> Result<usize> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(LedgerError::InvalidRange(format!(
            "bad column reference '{}'",
            letters
        )));
    }
    let mut value = 0usize;
    for b in letters.bytes() {
        value = value * 26 + (b - b'A' + 1) as usize;
    }
    Ok(value - 1)
}

/// Parse `B12` or `B` into (column, row).
fn parse_cell(cell: &str) -> Result<(usize, Option<u32>)> {
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(split);
    let col = parse_column(&letters.to_ascii_uppercase())?;
    let row = if digits.is_empty() {
        None
    } else {
        let row: u32 = digits
            .parse()
            .map_err(|_| LedgerError::InvalidRange(format!("bad row reference '{}'", cell)))?;
        if row == 0 {
            return Err(LedgerError::InvalidRange("rows are 1-based".into()));
        }
        Some(row)
    };
    Ok((col, row))
}

/// Split `'It''s May'!A:E` into container title and cell part.
fn split_container(s: &str) -> Result<(String, &str)> {
    if let Some(rest) = s.strip_prefix('\'') {
        let mut title = String::new();
        let mut chars = rest.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c == '\'' {
                if matches!(chars.peek(), Some((_, '\''))) {
                    title.push('\'');
                    chars.next();
                    continue;
                }
                let tail = &rest[i + 1..];
                return match tail.strip_prefix('!') {
                    Some(cells) => Ok((title, cells)),
                    None => Err(LedgerError::InvalidRange(format!("missing '!' in '{}'", s))),
                };
            }
            title.push(c);
        }
        Err(LedgerError::InvalidRange(format!("unterminated quote in '{}'", s)))
    } else {
        match s.rsplit_once('!') {
            Some((title, cells)) if !title.is_empty() => Ok((title.to_string(), cells)),
            _ => Err(LedgerError::InvalidRange(format!(
                "missing container in '{}'",
                s
            ))),
        }
    }
}

impl FromStr for RangeSpec {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let (container, cells) = split_container(s.trim())?;
        let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
        let (start_col, start_row) = parse_cell(start)?;
        let (end_col, end_row) = parse_cell(end)?;

        if end_col < start_col {
            return Err(LedgerError::InvalidRange(format!("columns reversed in '{}'", s)));
        }
        if let (Some(a), Some(b)) = (start_row, end_row) {
            if b < a {
                return Err(LedgerError::InvalidRange(format!("rows reversed in '{}'", s)));
            }
        }

        Ok(Self {
            container,
            start_col,
            end_col,
            start_row,
            end_row,
        })
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self
            .container
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            write!(f, "{}!", self.container)?;
        } else {
            write!(f, "'{}'!", self.container.replace('\'', "''"))?;
        }

        let row = |r: Option<u32>| r.map(|r| r.to_string()).unwrap_or_default();
        write!(
            f,
            "{}{}:{}{}",
            column_letters(self.start_col),
            row(self.start_row),
            column_letters(self.end_col),
            row(self.end_row)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(4), "E");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(parse_column("AA").unwrap(), 26);
        assert_eq!(parse_column("E").unwrap(), 4);
    }

    #[test]
    fn test_parse_whole_columns() {
        let range: RangeSpec = "May!A:E".parse().unwrap();
        assert_eq!(range, RangeSpec::columns("May", 0, 4));
        assert_eq!(range.width(), 5);
        assert_eq!(range.to_string(), "May!A:E");
    }

    #[test]
    fn test_parse_single_row() {
        let range: RangeSpec = "May!A7:E7".parse().unwrap();
        assert_eq!(range, RangeSpec::row("May", 0, 4, 7));
        assert_eq!(range.first_row_index(), 6);
        assert_eq!(range.end_row_index(), Some(7));
    }

    #[test]
    fn test_row_zero_does_not_underflow() {
        let range = RangeSpec::row("May", 0, 4, 0);
        assert_eq!(range.first_row_index(), 0);
        assert_eq!(range.end_row_index(), Some(0));
    }

    #[test]
    fn test_quoted_container() {
        let range = RangeSpec::columns("Coach's May", 0, 0);
        let text = range.to_string();
        assert_eq!(text, "'Coach''s May'!A:A");
        assert_eq!(text.parse::<RangeSpec>().unwrap(), range);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("A:E".parse::<RangeSpec>().is_err());
        assert!("May!E:A".parse::<RangeSpec>().is_err());
        assert!("May!A0:E0".parse::<RangeSpec>().is_err());
        assert!("'May!A:E".parse::<RangeSpec>().is_err());
        assert!("May!1:2".parse::<RangeSpec>().is_err());
    }
}
