//! Two-column records and their tab-delimited line form.
//!
//! Fields are joined with a single `\t` and never quoted or escaped, so a
//! field that itself contains a tab or line break shifts the column
//! boundaries when read back. Strict sessions reject such fields; lenient
//! sessions write them as given.
//!
//! Lines end at `\n`, with an optional `\r` before it. A lone `\r` is not
//! a terminator and stays part of the field it appears in.

use std::path::Path;

use crate::error::StoreError;

pub const FIELD_SEPARATOR: char = '\t';
pub const COLUMNS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub first: String,
    pub second: String,
}

impl Record {
    #[must_use]
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    #[must_use]
    pub fn first(&self) -> &str {
        &self.first
    }

    #[must_use]
    pub fn second(&self) -> &str {
        &self.second
    }

    #[must_use]
    pub fn into_fields(self) -> (String, String) {
        (self.first, self.second)
    }

    #[must_use]
    pub fn to_line(&self) -> String {
        format_line([self.first.as_str(), self.second.as_str()])
    }
}

/// Outcome of parsing one line read from a record file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineParse {
    /// Empty or whitespace-only; treated like end of input.
    Blank,
    Record(Record),
    /// Non-blank but without a second column.
    Malformed,
}

/// Joins fields with tabs. No trailing separator and no line terminator.
pub fn format_line<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = String::new();
    for (index, field) in fields.into_iter().enumerate() {
        if index > 0 {
            line.push(FIELD_SEPARATOR);
        }
        line.push_str(field.as_ref());
    }
    line
}

/// Splits a line into its first two columns; anything after the second tab
/// is ignored.
#[must_use]
pub fn parse_line(line: &str) -> LineParse {
    let line = strip_line_ending(line);
    if line.trim().is_empty() {
        return LineParse::Blank;
    }

    let mut columns = line.split(FIELD_SEPARATOR);
    match (columns.next(), columns.next()) {
        (Some(first), Some(second)) => LineParse::Record(Record::new(first, second)),
        _ => LineParse::Malformed,
    }
}

pub(crate) fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

pub(crate) fn check_strict<S: AsRef<str>>(path: &Path, fields: &[S]) -> Result<(), StoreError> {
    if fields.len() != COLUMNS {
        return Err(StoreError::ColumnCount {
            path: path.to_path_buf(),
            expected: COLUMNS,
            found: fields.len(),
        });
    }

    check_delimiters(path, fields)
}

fn check_delimiters<S: AsRef<str>>(path: &Path, fields: &[S]) -> Result<(), StoreError> {
    let embedded = fields.iter().position(|field| {
        field
            .as_ref()
            .contains(|c: char| matches!(c, FIELD_SEPARATOR | '\r' | '\n'))
    });
    match embedded {
        Some(index) => Err(StoreError::EmbeddedDelimiter {
            path: path.to_path_buf(),
            column: index + 1,
        }),
        None => Ok(()),
    }
}
