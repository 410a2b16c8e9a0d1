//! Report sinks: CSV file and console
//!
//! Both sinks render a [`PaperRecord`] through [`PaperRow`], which applies the
//! display rules: list fields joined with `", "` and empty values shown as
//! `"N/A"`. The conversion is lossy, so reading an export back yields rows,
//! not records.

use std::io::Write;
use std::path::Path;

use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::pubmed::models::{MISSING_PLACEHOLDER, PaperRecord};

/// Report columns, in output order
pub const COLUMNS: [&str; 5] = [
    "PubmedID",
    "Title",
    "Non-academic Authors",
    "Company Affiliations",
    "Corresponding Author Email",
];

/// Line printed around console records
pub const SEPARATOR: &str = "---------------------------------";

/// Separator for list-valued fields
pub const LIST_SEPARATOR: &str = ", ";

/// Display form of a [`PaperRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaperRow {
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Non-academic Authors")]
    pub non_academic_authors: String,
    #[serde(rename = "Company Affiliations")]
    pub company_affiliations: String,
    #[serde(rename = "Corresponding Author Email")]
    pub corresponding_author_email: String,
}

impl PaperRow {
    /// Cell values in [`COLUMNS`] order
    pub fn values(&self) -> [&str; 5] {
        [
            self.pubmed_id.as_str(),
            self.title.as_str(),
            self.non_academic_authors.as_str(),
            self.company_affiliations.as_str(),
            self.corresponding_author_email.as_str(),
        ]
    }

    /// `(column, value)` pairs in [`COLUMNS`] order
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        COLUMNS.into_iter().zip(self.values())
    }
}

impl From<&PaperRecord> for PaperRow {
    fn from(record: &PaperRecord) -> Self {
        Self {
            pubmed_id: or_placeholder(record.pubmed_id.clone()),
            title: or_placeholder(record.title.clone()),
            non_academic_authors: join_or_placeholder(&record.non_academic_authors),
            company_affiliations: join_or_placeholder(&record.company_affiliations),
            corresponding_author_email: or_placeholder(
                record.corresponding_author_email.clone().unwrap_or_default(),
            ),
        }
    }
}

fn or_placeholder(value: String) -> String {
    if value.trim().is_empty() {
        MISSING_PLACEHOLDER.to_string()
    } else {
        value
    }
}

fn join_or_placeholder(values: &[String]) -> String {
    or_placeholder(values.join(LIST_SEPARATOR))
}

/// Write the report as CSV to `path`, replacing any existing file
///
/// Rows go to a temporary file next to `path`, which is renamed over the
/// target only once everything is written. On error the target is left as it
/// was and the temporary file is removed.
#[instrument(skip(path, records), fields(path = %path.as_ref().display(), records = records.len()))]
pub fn write_csv<P: AsRef<Path>>(path: P, records: &[PaperRecord]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    write_csv_to(&mut tmp, records)?;
    tmp.persist(path).map_err(|e| e.error)?;

    debug!("CSV report written");
    Ok(())
}

/// Write the report as CSV to any writer: header row first, then one row per record
pub fn write_csv_to<W: Write>(writer: W, records: &[PaperRecord]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(COLUMNS)?;
    for record in records {
        let row = PaperRow::from(record);
        csv_writer.write_record(row.values())?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Read a CSV report back into rows
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<PaperRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<PaperRow>, _>>()?;
    Ok(rows)
}

/// Print one block per record, each opened by a separator, plus a closing separator
pub fn print_results<W: Write>(out: &mut W, records: &[PaperRecord]) -> Result<()> {
    for record in records {
        writeln!(out, "\n{SEPARATOR}")?;
        for (column, value) in PaperRow::from(record).fields() {
            writeln!(out, "{column}: {value}")?;
        }
    }
    writeln!(out, "\n{SEPARATOR}")?;
    out.flush()?;
    Ok(())
}
