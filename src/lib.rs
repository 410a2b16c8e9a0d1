//! # pubmed-affiliations
//!
//! Searches PubMed through the NCBI E-utilities and reports, for each matching
//! article, the authors whose affiliation looks like a company (pharma,
//! biotech and similar) rather than an academic institution.
//!
//! ## Pipeline
//!
//! 1. **ESearch**: query text → list of PMIDs (capped, default 5)
//! 2. **EFetch**: all PMIDs in one request → PubMed XML
//! 3. **Parse**: one [`PaperRecord`] per `<PubmedArticle>`, with company
//!    affiliations selected by [`KeywordSet`]
//! 4. **Report**: CSV file or console blocks
//!
//! ## Quick Start
//!
//! ```no_run
//! use pubmed_affiliations::{ClientConfig, PubMedClient, output};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PubMedClient::with_config(ClientConfig::new().with_max_results(10))?;
//!     let papers = client.search_and_fetch("monoclonal antibody").await?;
//!
//!     output::write_csv("papers.csv", &papers)?;
//!     Ok(())
//! }
//! ```
//!
//! The corresponding-author email is a heuristic: it is the first
//! email-looking string anywhere in the article record.

pub mod classify;
pub mod config;
pub mod error;
pub mod output;
pub mod pubmed;
pub mod report;
pub mod retry;

// Re-export main types for convenience
pub use classify::{Classification, KeywordSet};
pub use config::ClientConfig;
pub use error::{PubMedError, Result};
pub use output::PaperRow;
pub use pubmed::{AuthorEntry, PaperRecord, PubMedClient};
pub use report::{RunOutcome, run};
