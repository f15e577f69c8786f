//! Output sinks for match records
//!
//! Records are written as soon as they are produced; each sink flushes after
//! every record so partial results survive an interrupted batch.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::record::MatchRecord;
use crate::{Error, Result};

/// Column names of the CSV output, in order
pub const CSV_HEADER: [&str; 6] = [
    "repo_url",
    "ref",
    "file_path",
    "line_number",
    "matched_line",
    "pattern",
];

/// Destination for match records
pub trait MatchSink {
    /// Append one record
    fn write_record(&mut self, record: &MatchRecord) -> Result<()>;

    /// Flush buffered output
    fn flush(&mut self) -> Result<()>;
}

/// Quote a CSV field unconditionally, doubling embedded quotes
pub fn escape_csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// CSV sink; every field of every row is quoted
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    writer: W,
}

impl CsvSink<BufWriter<File>> {
    /// Create (truncate) the CSV file at `path` and write the header row
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(Error::Output)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap a writer and emit the header row
    pub fn new(writer: W) -> Result<Self> {
        let mut sink = Self { writer };
        sink.write_row(&CSV_HEADER)?;
        sink.flush()?;
        Ok(sink)
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_row(&mut self, fields: &[&str]) -> Result<()> {
        let row = fields
            .iter()
            .map(|f| escape_csv_field(f))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.writer, "{}", row).map_err(Error::Output)
    }
}

impl<W: Write> MatchSink for CsvSink<W> {
    fn write_record(&mut self, record: &MatchRecord) -> Result<()> {
        let line_number = record.line_number.to_string();
        self.write_row(&[
            record.repo_url.as_str(),
            record.reference.as_str(),
            record.file_path.as_str(),
            line_number.as_str(),
            record.matched_line.as_str(),
            record.pattern.as_str(),
        ])?;
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(Error::Output)
    }
}

/// Plain-text sink: `<repo> :: <ref> :: <path>:<line>:<content>`
#[derive(Debug)]
pub struct ConsoleSink<W: Write> {
    writer: W,
}

impl ConsoleSink<std::io::Stdout> {
    /// Sink writing to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Render a record the way the console sink prints it
pub fn format_console_line(record: &MatchRecord) -> String {
    format!(
        "{} :: {} :: {}:{}:{}",
        record.repo_url, record.reference, record.file_path, record.line_number, record.matched_line
    )
}

impl<W: Write> MatchSink for ConsoleSink<W> {
    fn write_record(&mut self, record: &MatchRecord) -> Result<()> {
        writeln!(self.writer, "{}", format_console_line(record)).map_err(Error::Output)?;
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(Error::Output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(matched_line: &str) -> MatchRecord {
        MatchRecord {
            repo_url: "https://example.com/a.git".to_string(),
            reference: "main".to_string(),
            file_path: "src/lib.rs".to_string(),
            line_number: 5,
            matched_line: matched_line.to_string(),
            pattern: "foo".to_string(),
        }
    }

    /// Minimal RFC-4180 reader for checking what the sink writes
    fn parse_csv(input: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if in_quotes {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => in_quotes = false,
                    _ => field.push(c),
                }
            } else {
                match c {
                    '"' => in_quotes = true,
                    ',' => row.push(std::mem::take(&mut field)),
                    '\n' => {
                        row.push(std::mem::take(&mut field));
                        rows.push(std::mem::take(&mut row));
                    }
                    '\r' => {}
                    _ => field.push(c),
                }
            }
        }

        if !field.is_empty() || !row.is_empty() {
            row.push(field);
            rows.push(row);
        }
        rows
    }

    #[test]
    fn test_escape_always_quotes() {
        assert_eq!(escape_csv_field("plain"), "\"plain\"");
        assert_eq!(escape_csv_field(""), "\"\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_header_written_on_creation() {
        let sink = CsvSink::new(Vec::new()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "\"repo_url\",\"ref\",\"file_path\",\"line_number\",\"matched_line\",\"pattern\"\n"
        );
    }

    #[test]
    fn test_record_row() {
        let mut sink = CsvSink::new(Vec::new()).unwrap();
        sink.write_record(&record("this has foo in it")).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "\"https://example.com/a.git\",\"main\",\"src/lib.rs\",\"5\",\"this has foo in it\",\"foo\""
        );
    }

    #[test]
    fn test_escaping_survives_reparse() {
        let awkward = [
            "a \"quoted\" word",
            "comma, separated, values",
            "multi\nline",
            "\"\"",
            "mixed \"a,b\"\nend",
        ];

        let mut sink = CsvSink::new(Vec::new()).unwrap();
        for value in awkward {
            sink.write_record(&record(value)).unwrap();
        }

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let rows = parse_csv(&out);
        assert_eq!(rows.len(), awkward.len() + 1);
        assert_eq!(rows[0], CSV_HEADER.map(String::from).to_vec());
        for (row, value) in rows[1..].iter().zip(awkward) {
            assert_eq!(row.len(), 6);
            assert_eq!(row[4], value);
            assert_eq!(row[3], "5");
        }
    }

    #[test]
    fn test_create_truncates_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("results.csv");
        std::fs::write(&path, "stale contents\n").unwrap();

        let mut sink = CsvSink::create(&path).unwrap();
        sink.write_record(&record("foo")).unwrap();
        drop(sink);

        let out = std::fs::read_to_string(&path).unwrap();
        assert!(out.starts_with("\"repo_url\""));
        assert!(!out.contains("stale"));
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_console_line_format() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.write_record(&record("x: foo")).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "https://example.com/a.git :: main :: src/lib.rs:5:x: foo\n"
        );
    }
}
