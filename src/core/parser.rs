use crate::domain::model::InputRow;
use std::iter::{Enumerate, Filter};
use std::str::Split;

/// Lazy iterator over the `ID,Address` rows of an input file.
///
/// Blank lines are dropped before row indices are assigned, so `row_index`
/// is the position among non-blank lines. Lines with fewer than two fields or
/// a non-integer ID are skipped with a warning.
pub struct RowParser<'a> {
    lines: Enumerate<Lines<'a>>,
    line_count: usize,
}

type Lines<'a> = Filter<Split<'a, fn(char) -> bool>, fn(&&str) -> bool>;

pub fn parse_rows(text: &str) -> RowParser<'_> {
    RowParser::new(text)
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

fn is_non_blank(line: &&str) -> bool {
    !line.is_empty()
}

fn non_blank_lines(text: &str) -> Lines<'_> {
    text.split(is_line_break as fn(char) -> bool)
        .filter(is_non_blank as fn(&&str) -> bool)
}

impl<'a> RowParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: non_blank_lines(text).enumerate(),
            line_count: non_blank_lines(text).count(),
        }
    }

    /// Number of non-blank lines, valid or not.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn is_empty(&self) -> bool {
        self.line_count == 0
    }
}

fn parse_line(row_index: usize, line: &str) -> Option<InputRow> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 2 {
        tracing::warn!("Skipping malformed line {}: {}", row_index + 1, line);
        return None;
    }

    let id_field = fields[0].trim();
    let id = match id_field.parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Invalid ID on line {}: {}", row_index + 1, id_field);
            return None;
        }
    };

    Some(InputRow {
        row_index,
        id,
        address: fields[1..].join(",").trim().to_string(),
    })
}

impl Iterator for RowParser<'_> {
    type Item = InputRow;

    fn next(&mut self) -> Option<Self::Item> {
        for (row_index, line) in self.lines.by_ref() {
            if let Some(row) = parse_line(row_index, line) {
                return Some(row);
            }
        }
        None
    }
}
