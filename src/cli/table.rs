//! # ASCII Table Formatter
//!
//! Renders frames MySQL-style:
//!
//! ```text
//! +----+------+
//! | id | name |
//! +----+------+
//! | 1  | aaa  |
//! | 2  | bbb  |
//! +----+------+
//! 2 rows in set (0.001 sec)
//! ```
//!
//! A column is as wide as its longest header or value, capped at
//! `MAX_COLUMN_WIDTH`; longer values are cut and end in `...`. Values are
//! formatted in one pass and rendered in a second.

use std::fmt::Write;

use crate::config::MAX_COLUMN_WIDTH;
use crate::frame::DataFrame;
use crate::types::Value;

const BLOB_PREVIEW_BYTES: usize = 16;

pub struct TableFormatter {
    headers: Vec<String>,
    widths: Vec<usize>,
    rows: Vec<Vec<String>>,
}

impl TableFormatter {
    pub fn new(frame: &DataFrame) -> Self {
        let headers: Vec<String> = frame.column_names().into_iter().map(String::from).collect();
        let mut widths: Vec<usize> = headers
            .iter()
            .map(|h| h.chars().count().clamp(1, MAX_COLUMN_WIDTH))
            .collect();

        let rows: Vec<Vec<String>> = (0..frame.row_count())
            .map(|row| {
                frame
                    .columns()
                    .iter()
                    .enumerate()
                    .map(|(i, column)| {
                        let formatted = format_value(&column.values()[row]);
                        widths[i] = widths[i].max(formatted.chars().count()).min(MAX_COLUMN_WIDTH);
                        formatted
                    })
                    .collect()
            })
            .collect();

        Self {
            headers,
            widths,
            rows,
        }
    }

    pub fn render(&self) -> String {
        let mut output = String::new();

        self.write_separator(&mut output);
        self.write_row(&mut output, &self.headers);
        self.write_separator(&mut output);
        for row in &self.rows {
            self.write_row(&mut output, row);
        }
        self.write_separator(&mut output);

        output
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn write_separator(&self, output: &mut String) {
        output.push('+');
        for width in &self.widths {
            output.push_str(&"-".repeat(width + 2));
            output.push('+');
        }
        output.push('\n');
    }

    fn write_row(&self, output: &mut String, cells: &[String]) {
        output.push('|');
        for (cell, &width) in cells.iter().zip(&self.widths) {
            let _ = write!(output, " {:<width$} |", truncate(cell, width), width = width);
        }
        output.push('\n');
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format_blob(b),
    }
}

fn format_float(f: f64) -> String {
    if !f.is_finite() {
        return f.to_string();
    }
    let text = format!("{:.6}", f);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn format_blob(bytes: &[u8]) -> String {
    let shown = &bytes[..bytes.len().min(BLOB_PREVIEW_BYTES)];
    let hex: String = shown.iter().map(|b| format!("{:02X}", b)).collect();
    if bytes.len() <= BLOB_PREVIEW_BYTES {
        format!("x'{}'", hex)
    } else {
        format!("x'{}'... ({} bytes)", hex, bytes.len())
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().take(max).collect();
    }
    let mut cut: String = s.chars().take(max - 3).collect();
    cut.push_str("...");
    cut
}
