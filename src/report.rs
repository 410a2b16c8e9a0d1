//! End-to-end run: pipeline followed by the selected sink

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::output::{print_results, write_csv};
use crate::pubmed::PubMedClient;

/// Message printed when the search stage yields nothing
pub const NO_RESULTS_MESSAGE: &str = "No results found.";

/// What a completed run produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The search matched nothing; no file was created
    NoResults,
    /// `n` records were written to the CSV file
    SavedCsv(usize),
    /// `n` records were printed
    Printed(usize),
}

/// Search, fetch and report
///
/// With `file` set the report goes to that CSV file and a confirmation line is
/// written to `out`; otherwise the records themselves are printed to `out`.
/// Nothing is written anywhere if the pipeline fails.
pub async fn run<W: Write>(
    client: &PubMedClient,
    query: &str,
    file: Option<&Path>,
    out: &mut W,
) -> Result<RunOutcome> {
    let papers = client.search_and_fetch(query).await?;

    if papers.is_empty() {
        writeln!(out, "{NO_RESULTS_MESSAGE}")?;
        return Ok(RunOutcome::NoResults);
    }

    match file {
        Some(path) => {
            write_csv(path, &papers)?;
            info!(path = %path.display(), papers = papers.len(), "Saved CSV report");
            writeln!(out, "Results saved to {}", path.display())?;
            Ok(RunOutcome::SavedCsv(papers.len()))
        }
        None => {
            print_results(out, &papers)?;
            Ok(RunOutcome::Printed(papers.len()))
        }
    }
}
