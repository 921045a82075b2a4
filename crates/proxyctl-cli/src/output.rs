//! Output formatting for CLI commands.
//!
//! Handlers render typed values into an [`Output`] with [`OutputFormat::render`]
//! (a table or a JSON document); the driver prints whatever [`Output`] the
//! invocation ends with, or the error.

use std::io::Write;

use proxyctl_core::{CtlError, Output};
use serde::Serialize;

use crate::cli::Format;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Render a typed value into an [`Output`].
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render<T>(&self, value: &T) -> Result<Output, CtlError>
    where
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => serde_json::to_value(value)
                .map(Output::Json)
                .map_err(|e| CtlError::Format(format!("JSON serialization failed: {e}"))),
            Format::Table => {
                let mut buf = Vec::new();
                value.write_table(&mut buf)?;
                String::from_utf8(buf)
                    .map(Output::Text)
                    .map_err(|e| CtlError::Format(format!("UTF-8 error: {e}")))
            }
        }
    }

    /// Write a success value. Empty output writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W: Write>(&self, writer: &mut W, output: &Output) -> Result<(), CtlError> {
        match output {
            Output::Empty => {}
            Output::Text(text) => {
                writer.write_all(text.as_bytes())?;
                if !text.ends_with('\n') {
                    writeln!(writer)?;
                }
            }
            Output::Json(value) => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CtlError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
        }
        Ok(())
    }

    /// Write a failure message, followed by usage text for usage errors.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_error<W: Write>(&self, writer: &mut W, error: &CtlError) -> Result<(), CtlError> {
        writeln!(writer, "Error: {error}")?;
        if let CtlError::Usage { usage, .. } = error {
            if !usage.is_empty() {
                writeln!(writer)?;
                writeln!(writer, "{usage}")?;
            }
        }
        Ok(())
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CtlError>;
}

/// Write `rows` under `headers` with columns padded to their widest cell.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_columns<W: Write>(
    writer: &mut W,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<(), CtlError> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(writer, "{}", line(headers.to_vec()))?;
    let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    writeln!(writer, "{}", "─".repeat(total))?;
    for row in rows {
        writeln!(writer, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

/// Write `label: value` pairs with aligned values.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_fields<W: Write>(writer: &mut W, fields: &[(&str, String)]) -> Result<(), CtlError> {
    let width = fields.iter().map(|(label, _)| label.len() + 1).max().unwrap_or(0);
    for (label, value) in fields {
        let label = format!("{label}:");
        writeln!(writer, "{label:<width$}  {value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Pair {
        name: String,
        count: u32,
    }

    impl TableDisplay for Pair {
        fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CtlError> {
            write_fields(writer, &[("Name", self.name.clone()), ("Count", self.count.to_string())])
        }
    }

    fn written(format: Format, output: &Output) -> String {
        let mut buf = Vec::new();
        OutputFormat::new(format).write(&mut buf, output).expect("write");
        String::from_utf8(buf).expect("valid utf8")
    }

    #[test]
    fn render_table_and_json() {
        let pair = Pair {
            name: "db1".into(),
            count: 3,
        };
        let table = OutputFormat::new(Format::Table).render(&pair).expect("render");
        assert_eq!(table, Output::Text("Name:   db1\nCount:  3\n".into()));

        let json_out = OutputFormat::new(Format::Json).render(&pair).expect("render");
        assert_eq!(json_out, Output::Json(json!({"name": "db1", "count": 3})));
    }

    #[test]
    fn empty_output_is_silent() {
        assert_eq!(written(Format::Table, &Output::Empty), "");
        assert_eq!(written(Format::Json, &Output::Empty), "");
    }

    #[test]
    fn text_gets_trailing_newline() {
        assert_eq!(written(Format::Table, &Output::Text("OK".into())), "OK\n");
        assert_eq!(written(Format::Table, &Output::Text("OK\n".into())), "OK\n");
    }

    #[test]
    fn json_is_pretty_printed() {
        let out = written(Format::Table, &Output::Json(json!({"a": 1})));
        assert_eq!(out, "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn usage_errors_include_usage() {
        let mut buf = Vec::new();
        let err = CtlError::usage("Wrong number of arguments", "Usage: clear server <server> <state>");
        OutputFormat::default().write_error(&mut buf, &err).expect("write");
        let text = String::from_utf8(buf).expect("valid utf8");
        assert_eq!(
            text,
            "Error: Wrong number of arguments\n\nUsage: clear server <server> <state>\n"
        );
    }

    #[test]
    fn columns_are_aligned() {
        let mut buf = Vec::new();
        write_columns(
            &mut buf,
            &["Server", "State"],
            &[
                vec!["db1".into(), "Running".into()],
                vec!["replica-02".into(), "Maintenance".into()],
            ],
        )
        .expect("write");
        let text = String::from_utf8(buf).expect("valid utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Server      State");
        assert_eq!(lines[2], "db1         Running");
        assert_eq!(lines[3], "replica-02  Maintenance");
    }
}
