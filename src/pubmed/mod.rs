//! PubMed E-utilities pipeline
//!
//! ESearch maps a query to PMIDs, EFetch maps PMIDs to article XML, and the
//! parser turns each `<PubmedArticle>` into a [`PaperRecord`].

pub mod client;
pub mod models;
pub mod parser;
pub(crate) mod responses;

pub use client::PubMedClient;
pub use models::{AuthorEntry, MISSING_PLACEHOLDER, PaperRecord, UNKNOWN_AUTHOR};
pub use parser::{ArticleNode, find_email, parse_papers_from_xml, read_article};
