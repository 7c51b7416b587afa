//! Delimited-file export of course meeting records.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::portal::CourseMeeting;

/// Export header, in the column order downstream spreadsheets expect.
pub const COURSE_COLUMNS: [&str; 10] = [
    "CRN",
    "Subject",
    "Title",
    "Hours",
    "Instructor",
    "Days",
    "Start Time",
    "End Time",
    "Location",
    "Seats Available",
];

/// Writes the accumulated records to a single file, once, at the end of a run.
#[derive(Debug, Clone)]
pub struct ExportSink {
    path: PathBuf,
    delimiter: char,
}

impl ExportSink {
    /// Tab-separated for a `.tsv` path, comma-separated otherwise.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let delimiter = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => '\t',
            _ => ',',
        };
        Self { path, delimiter }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Write a header of `columns` followed by one line per record.
    /// Returns the number of records written.
    pub fn write(&self, columns: &[&str], records: &[CourseMeeting]) -> Result<usize> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        write_records(&mut writer, columns, records, self.delimiter)
            .and_then(|_| writer.flush())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(records.len())
    }
}

/// Serialize records under the given header. Each record contributes its
/// value for every column; unknown column titles produce empty cells.
pub fn write_records<W: Write>(
    mut w: W,
    columns: &[&str],
    records: &[CourseMeeting],
    delimiter: char,
) -> io::Result<()> {
    write_row(&mut w, columns.iter().copied(), delimiter)?;
    for record in records {
        let row = columns
            .iter()
            .map(|column| record.field(column).unwrap_or_default());
        write_row(&mut w, row, delimiter)?;
    }
    Ok(())
}

fn needs_quotes(field: &str, delimiter: char) -> bool {
    field.contains(delimiter) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<'a, W: Write>(
    mut w: W,
    row: impl IntoIterator<Item = &'a str>,
    delimiter: char,
) -> io::Result<()> {
    for (i, cell) in row.into_iter().enumerate() {
        if i > 0 {
            write!(w, "{delimiter}")?;
        }
        if needs_quotes(cell, delimiter) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(crn: &str, title: &str, days: &str) -> CourseMeeting {
        CourseMeeting {
            crn: crn.to_string(),
            subject: "ART".to_string(),
            title: title.to_string(),
            hours: "3".to_string(),
            instructor: "Smith, Jane".to_string(),
            days: days.to_string(),
            start_time: "9:30 am".to_string(),
            end_time: "10:45 am".to_string(),
            location: String::new(),
            seats_available: "18".to_string(),
        }
    }

    fn to_string(columns: &[&str], records: &[CourseMeeting], delimiter: char) -> String {
        let mut buf = Vec::new();
        write_records(&mut buf, columns, records, delimiter).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_and_rows_in_column_order() {
        let out = to_string(&COURSE_COLUMNS, &[record("01234", "Drawing", "TR")], ',');
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines[0],
            "CRN,Subject,Title,Hours,Instructor,Days,Start Time,End Time,Location,Seats Available"
        );
        assert_eq!(
            lines[1],
            "01234,ART,Drawing,3,\"Smith, Jane\",TR,9:30 am,10:45 am,,18"
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_quotes_are_doubled() {
        let out = to_string(&["Title"], &[record("1", "The \"Art\" of War", "")], ',');
        assert_eq!(out, "Title\n\"The \"\"Art\"\" of War\"\n");
    }

    #[test]
    fn test_tab_delimiter_leaves_commas_alone() {
        let out = to_string(&["CRN", "Instructor"], &[record("1", "x", "")], '\t');
        assert_eq!(out, "CRN\tInstructor\n1\tSmith, Jane\n");
    }

    #[test]
    fn test_custom_column_subset_and_unknown_column() {
        let out = to_string(&["Days", "Room", "CRN"], &[record("7", "x", "MWF")], ',');
        assert_eq!(out, "Days,Room,CRN\nMWF,,7\n");
    }

    #[test]
    fn test_empty_records_write_header_only() {
        let out = to_string(&COURSE_COLUMNS, &[], ',');
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_delimiter_from_extension() {
        assert_eq!(ExportSink::new("courses.csv").delimiter(), ',');
        assert_eq!(ExportSink::new("out/courses.TSV").delimiter(), '\t');
        assert_eq!(ExportSink::new("courses").delimiter(), ',');
    }

    #[test]
    fn test_sink_writes_file_and_creates_directories() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("coursesearch_export_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("courses.tsv");

        let sink = ExportSink::new(&path);
        let written = sink
            .write(&COURSE_COLUMNS, &[record("1", "A", "M"), record("1", "A", "W")])
            .unwrap();
        assert_eq!(written, 2);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.starts_with("CRN\tSubject\t"));

        let _ = fs::remove_dir_all(&dir);
    }
}
