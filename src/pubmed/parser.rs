//! EFetch XML parsing
//!
//! The document is scanned once for `<PubmedArticle>` elements. Each article's
//! raw content is handed to [`read_article`], which walks it with a second
//! event reader to pick out the PMID, the title and the authors, and which
//! runs the email heuristic over the article's serialized text.

use std::ops::Range;
use std::sync::OnceLock;

use quick_xml::Reader;
use quick_xml::events::{BytesText, Event};
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::classify::KeywordSet;
use crate::error::{PubMedError, Result};
use crate::pubmed::models::{AuthorEntry, PaperRecord};

/// Email pattern applied to the serialized article
pub const EMAIL_PATTERN: &str = r"[\w.%+-]+@[\w.-]+\.[A-Za-z]{2,}";

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("Failed to compile email regex"))
}

/// First email-looking substring of `text`
///
/// This is a heuristic: the match may belong to any author, or to no author at
/// all, depending on where it appears in the record.
pub fn find_email(text: &str) -> Option<String> {
    email_regex().find(text).map(|m| m.as_str().to_string())
}

/// Fields read from one `<PubmedArticle>` before classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleNode {
    /// Text of the first `<PMID>`
    pub pmid: Option<String>,
    /// Text of the first `<ArticleTitle>`, inline markup flattened
    pub title: Option<String>,
    /// Every `<Author>` in document order
    pub authors: Vec<AuthorEntry>,
    /// First email match in the article's serialized text
    pub email: Option<String>,
}

impl ArticleNode {
    /// Classify the authors and build the report row
    ///
    /// `index` is the article's position in the EFetch document and only
    /// serves error reporting.
    pub fn into_record(self, index: usize, keywords: &KeywordSet) -> Result<PaperRecord> {
        let pubmed_id = self
            .pmid
            .filter(|p| !p.is_empty())
            .ok_or(PubMedError::MissingPmid { index })?;

        for author in &self.authors {
            if let Some(affiliation) = &author.affiliation {
                let class = keywords.classify(affiliation);
                debug!(
                    pmid = %pubmed_id,
                    author = %author.name,
                    is_company = class.is_company,
                    is_academic = class.is_academic,
                    "Classified affiliation"
                );
            }
        }

        Ok(PaperRecord::from_authors(
            pubmed_id,
            self.title,
            &self.authors,
            self.email,
            keywords,
        ))
    }
}

/// Parse every `<PubmedArticle>` of an EFetch response, in document order
///
/// Any malformed markup or any article without a PMID fails the whole batch.
#[instrument(skip(xml, keywords), fields(xml_size = xml.len()))]
pub fn parse_papers_from_xml(xml: &str, keywords: &KeywordSet) -> Result<Vec<PaperRecord>> {
    // Article spans are sliced from `xml`, so it must start where the reader does
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    let mut records = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"PubmedArticle" => {
                seen_root = true;
                let end = e.to_end().into_owned();
                let span = reader.read_to_end(end.name()).map_err(|err| {
                    PubMedError::XmlError(format!(
                        "Unterminated PubmedArticle at position {}: {}",
                        reader.buffer_position(),
                        err
                    ))
                })?;
                let inner = slice_span(xml, span.start, span.end)?;

                let index = records.len();
                let record = read_article(inner)?.into_record(index, keywords)?;
                records.push(record);
            }
            Ok(Event::Start(_)) => {
                seen_root = true;
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                seen_root = true;
                if e.name().as_ref() == b"PubmedArticle" {
                    return Err(PubMedError::MissingPmid {
                        index: records.len(),
                    });
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Failed to parse EFetch XML: {}", e);
                return Err(PubMedError::XmlError(format!(
                    "Error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
    }

    if !seen_root {
        return Err(PubMedError::XmlError(
            "Document contains no root element".to_string(),
        ));
    }
    if depth != 0 {
        return Err(PubMedError::XmlError(format!(
            "Unexpected end of document with {depth} unclosed element(s)"
        )));
    }

    debug!(articles = records.len(), "Parsed EFetch response");
    Ok(records)
}

fn slice_span<P>(xml: &str, start: P, end: P) -> Result<&str>
where
    usize: TryFrom<P>,
{
    let range: Option<Range<usize>> = match (usize::try_from(start), usize::try_from(end)) {
        (Ok(start), Ok(end)) => Some(start..end),
        _ => None,
    };

    range
        .and_then(|r| xml.get(r))
        .ok_or_else(|| PubMedError::XmlError("Article span out of bounds".to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Pmid,
    Title,
    ForeName,
    LastName,
    Affiliation,
}

struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

#[derive(Default)]
struct PendingAuthor {
    depth: usize,
    fore_name: Option<String>,
    last_name: Option<String>,
    affiliation: Option<String>,
}

impl PendingAuthor {
    fn finish(self) -> AuthorEntry {
        AuthorEntry::from_parts(
            self.fore_name.as_deref(),
            self.last_name.as_deref(),
            self.affiliation.as_deref(),
        )
    }
}

/// Read one article from the raw content of its `<PubmedArticle>` element
///
/// `PMID` and `ArticleTitle` are taken from their first occurrence at any
/// depth. Name parts are read from direct children of `<Author>`; the
/// affiliation is the first `<Affiliation>` anywhere below it.
pub fn read_article(article_xml: &str) -> Result<ArticleNode> {
    let mut reader = Reader::from_str(article_xml);
    let mut node = ArticleNode {
        email: find_email(article_xml),
        ..ArticleNode::default()
    };

    let mut depth = 0usize;
    let mut capture: Option<Capture> = None;
    let mut author: Option<PendingAuthor> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                if capture.is_some() {
                    // Inline markup inside a captured field
                    continue;
                }
                let field = match e.name().as_ref() {
                    b"Author" if author.is_none() => {
                        author = Some(PendingAuthor {
                            depth,
                            ..PendingAuthor::default()
                        });
                        None
                    }
                    name => field_for(name, depth, &node, author.as_ref()),
                };
                if let Some(field) = field {
                    capture = Some(Capture {
                        field,
                        depth,
                        text: String::new(),
                    });
                }
            }
            Ok(Event::Empty(e)) => {
                if capture.is_some() {
                    continue;
                }
                match e.name().as_ref() {
                    b"Author" if author.is_none() => {
                        node.authors.push(PendingAuthor::default().finish());
                    }
                    name => {
                        // Self-closing fields still count as the first occurrence
                        if let Some(field) = field_for(name, depth + 1, &node, author.as_ref()) {
                            store(field, String::new(), &mut node, author.as_mut());
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&unescape_text(&e));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                if capture.as_ref().is_some_and(|c| c.depth == depth) {
                    if let Some(done) = capture.take() {
                        store(done.field, done.text, &mut node, author.as_mut());
                    }
                } else if capture.is_none() && author.as_ref().is_some_and(|a| a.depth == depth) {
                    if let Some(done) = author.take() {
                        node.authors.push(done.finish());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(PubMedError::XmlError(format!(
                    "Error inside PubmedArticle at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
    }

    Ok(node)
}

/// Which field, if any, an element at `depth` opens given what was read so far
fn field_for(
    name: &[u8],
    depth: usize,
    node: &ArticleNode,
    author: Option<&PendingAuthor>,
) -> Option<Field> {
    let direct_child = author.is_some_and(|a| depth == a.depth + 1);
    match name {
        b"PMID" if node.pmid.is_none() => Some(Field::Pmid),
        b"ArticleTitle" if node.title.is_none() => Some(Field::Title),
        b"ForeName" if direct_child && author.is_some_and(|a| a.fore_name.is_none()) => {
            Some(Field::ForeName)
        }
        b"LastName" if direct_child && author.is_some_and(|a| a.last_name.is_none()) => {
            Some(Field::LastName)
        }
        b"Affiliation" if author.is_some_and(|a| a.affiliation.is_none()) => {
            Some(Field::Affiliation)
        }
        _ => None,
    }
}

fn store(field: Field, text: String, node: &mut ArticleNode, author: Option<&mut PendingAuthor>) {
    let text = text.trim().to_string();
    match field {
        Field::Pmid => node.pmid = Some(text),
        Field::Title => node.title = Some(text),
        Field::ForeName | Field::LastName | Field::Affiliation => {
            let Some(author) = author else {
                return;
            };
            match field {
                Field::ForeName => author.fore_name = Some(text),
                Field::LastName => author.last_name = Some(text),
                _ => author.affiliation = Some(text),
            }
        }
    }
}

fn unescape_text(e: &BytesText<'_>) -> String {
    match e.unescape() {
        Ok(text) => text.into_owned(),
        Err(err) => {
            debug!("Keeping raw text after unescape failure: {}", err);
            String::from_utf8_lossy(e).into_owned()
        }
    }
}
