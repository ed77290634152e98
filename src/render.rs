//! Built-in templates for rendering a `ResultDocument` as text.

use crate::error::{DbError, DbResult};
use crate::models::{ColumnDescriptor, ResultDocument, Row};
use serde_json::Value as JsonValue;
use unicode_width::UnicodeWidthStr;

/// A named output template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Pretty-printed JSON of the whole document
    Json,
    /// ASCII table format (like MySQL CLI)
    Table,
    /// Markdown table format
    Markdown,
    /// RFC 4180 CSV with a header line
    Csv,
}

impl Template {
    /// Resolve a template by name.
    ///
    /// Names are case-insensitive and may carry a `.ftl` suffix.
    pub fn from_name(name: &str) -> DbResult<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        let base = normalized.strip_suffix(".ftl").unwrap_or(&normalized);
        match base {
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            _ => Err(DbError::unknown_template(name)),
        }
    }

    /// MIME type of the rendered text.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Table => "text/plain; charset=utf-8",
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn render(&self, document: &ResultDocument) -> DbResult<String> {
        let rows = document.data.as_deref().unwrap_or(&[]);
        match self {
            Self::Json => serde_json::to_string_pretty(document)
                .map_err(|e| DbError::internal(format!("Failed to render JSON: {}", e))),
            Self::Table => Ok(format_as_table(&document.columns, rows)),
            Self::Markdown => Ok(format_as_markdown(&document.columns, rows)),
            Self::Csv => Ok(format_as_csv(&document.columns, rows)),
        }
    }
}

fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
    }
}

fn cell<'a>(row: &'a Row, column: &ColumnDescriptor) -> &'a JsonValue {
    row.get(&column.name).unwrap_or(&JsonValue::Null)
}

fn format_as_table(columns: &[ColumnDescriptor], rows: &[Row]) -> String {
    if columns.is_empty() {
        return "Empty set\n".to_string();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.name.width()).collect();
    for row in rows {
        for (i, col) in columns.iter().enumerate() {
            widths[i] = widths[i].max(format_value(cell(row, col)).width());
        }
    }

    // Pad by display width so wide characters line up
    let pad = |text: &str, width: usize| " ".repeat(width.saturating_sub(text.width()));

    let separator: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+\n";

    let mut output = separator.clone();
    for (col, w) in columns.iter().zip(&widths) {
        let fill = pad(&col.name, *w);
        let left = fill.len() / 2;
        output.push_str(&format!(
            "| {}{}{} ",
            &fill[..left],
            col.name,
            &fill[left..]
        ));
    }
    output.push_str("|\n");
    output.push_str(&separator);

    for row in rows {
        for (col, w) in columns.iter().zip(&widths) {
            let value = cell(row, col);
            let formatted = format_value(value);
            let fill = pad(&formatted, *w);
            if matches!(value, JsonValue::Number(_)) {
                output.push_str(&format!("| {}{} ", fill, formatted));
            } else {
                output.push_str(&format!("| {}{} ", formatted, fill));
            }
        }
        output.push_str("|\n");
    }
    output.push_str(&separator);

    output.push_str(&format!("{} {} in set\n", rows.len(), row_noun(rows.len())));
    output
}

fn row_noun(count: usize) -> &'static str {
    if count == 1 { "row" } else { "rows" }
}

fn format_as_markdown(columns: &[ColumnDescriptor], rows: &[Row]) -> String {
    if columns.is_empty() {
        return "*Empty set*\n".to_string();
    }

    let escape = |text: String| text.replace('|', "\\|").replace('\n', " ");

    let mut output: String = columns
        .iter()
        .map(|c| format!("| {} ", escape(c.name.clone())))
        .collect::<String>()
        + "|\n";
    output.push_str(&(columns.iter().map(|_| "|---").collect::<String>() + "|\n"));

    for row in rows {
        let line: String = columns
            .iter()
            .map(|col| format!("| {} ", escape(format_value(cell(row, col)))))
            .collect::<String>()
            + "|\n";
        output.push_str(&line);
    }

    output.push_str(&format!("\n*{} {}*\n", rows.len(), row_noun(rows.len())));
    output
}

fn format_as_csv(columns: &[ColumnDescriptor], rows: &[Row]) -> String {
    fn field(text: &str) -> String {
        if text.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", text.replace('"', "\"\""))
        } else {
            text.to_string()
        }
    }

    let mut output = columns
        .iter()
        .map(|c| field(&c.name))
        .collect::<Vec<_>>()
        .join(",");
    output.push_str("\r\n");

    for row in rows {
        let line = columns
            .iter()
            .map(|col| match cell(row, col) {
                JsonValue::Null => String::new(),
                value => field(&format_value(value)),
            })
            .collect::<Vec<_>>()
            .join(",");
        output.push_str(&line);
        output.push_str("\r\n");
    }
    output
}
