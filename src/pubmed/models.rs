use crate::classify::KeywordSet;

/// Placeholder used for absent titles and empty report fields
pub const MISSING_PLACEHOLDER: &str = "N/A";

/// Display name used when an author lacks a given or family name
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// One `<Author>` node, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorEntry {
    /// `"<ForeName> <LastName>"`, or `"Unknown"` if either part is missing
    pub name: String,
    /// Text of the author's first `<Affiliation>`
    pub affiliation: Option<String>,
}

impl AuthorEntry {
    /// Build an entry from optional name parts; empty parts count as missing
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_affiliations::pubmed::AuthorEntry;
    ///
    /// let author = AuthorEntry::from_parts(Some("Jane"), Some("Doe"), None);
    /// assert_eq!(author.name, "Jane Doe");
    ///
    /// let author = AuthorEntry::from_parts(None, Some("Doe"), None);
    /// assert_eq!(author.name, "Unknown");
    /// ```
    pub fn from_parts(
        fore_name: Option<&str>,
        last_name: Option<&str>,
        affiliation: Option<&str>,
    ) -> Self {
        let name = match (non_empty(fore_name), non_empty(last_name)) {
            (Some(fore), Some(last)) => format!("{fore} {last}"),
            _ => UNKNOWN_AUTHOR.to_string(),
        };

        Self {
            name,
            affiliation: non_empty(affiliation).map(str::to_string),
        }
    }
}

fn non_empty(part: Option<&str>) -> Option<&str> {
    part.map(str::trim).filter(|s| !s.is_empty())
}

/// Per-article result row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRecord {
    pub pubmed_id: String,
    /// Article title, `"N/A"` when the record has none
    pub title: String,
    /// Authors whose affiliation matched a company keyword
    pub non_academic_authors: Vec<String>,
    /// Matching affiliation strings, parallel to `non_academic_authors`
    pub company_affiliations: Vec<String>,
    /// First email-looking string anywhere in the record; not tied to an author
    pub corresponding_author_email: Option<String>,
}

impl PaperRecord {
    /// Assemble a record, keeping only company-affiliated authors
    pub fn from_authors(
        pubmed_id: String,
        title: Option<String>,
        authors: &[AuthorEntry],
        corresponding_author_email: Option<String>,
        keywords: &KeywordSet,
    ) -> Self {
        let mut non_academic_authors = Vec::new();
        let mut company_affiliations = Vec::new();

        for author in authors {
            let Some(affiliation) = &author.affiliation else {
                continue;
            };
            if keywords.is_company(affiliation) {
                non_academic_authors.push(author.name.clone());
                company_affiliations.push(affiliation.clone());
            }
        }

        Self {
            pubmed_id,
            title: title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| MISSING_PLACEHOLDER.to_string()),
            non_academic_authors,
            company_affiliations,
            corresponding_author_email,
        }
    }

    pub fn has_company_authors(&self) -> bool {
        !self.non_academic_authors.is_empty()
    }
}
