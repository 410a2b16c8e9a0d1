//! Affiliation classification
//!
//! An affiliation is a *company* affiliation when it contains one of the
//! company keywords as a case-sensitive substring. The academic keywords are
//! evaluated as well and reported in [`Classification::is_academic`], but only
//! the company test decides which authors appear in a report.

/// Default substrings that mark an affiliation as a company
pub const DEFAULT_COMPANY_KEYWORDS: &[&str] = &[
    "Inc.",
    "Ltd.",
    "Pharma",
    "Biotech",
    "Corp.",
    "Therapeutics",
    "Laboratories",
];

/// Default substrings that mark an affiliation as academic
pub const DEFAULT_ACADEMIC_KEYWORDS: &[&str] = &[
    "University",
    "Institute",
    "College",
    "Hospital",
    "School",
    "Academy",
];

/// Immutable pair of keyword lists used by the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    company: Vec<String>,
    academic: Vec<String>,
}

/// Result of classifying one affiliation string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub is_company: bool,
    pub is_academic: bool,
}

impl KeywordSet {
    /// Build a keyword set from alternate lists
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_affiliations::classify::KeywordSet;
    ///
    /// let keywords = KeywordSet::new(["GmbH"], ["Universität"]);
    /// assert!(keywords.classify("Bayer GmbH").is_company);
    /// ```
    pub fn new<C, A>(company: C, academic: A) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            company: company.into_iter().map(Into::into).collect(),
            academic: academic.into_iter().map(Into::into).collect(),
        }
    }

    pub fn company_keywords(&self) -> &[String] {
        &self.company
    }

    pub fn academic_keywords(&self) -> &[String] {
        &self.academic
    }

    /// Classify an affiliation by substring match against both lists
    pub fn classify(&self, affiliation: &str) -> Classification {
        Classification {
            is_company: contains_any(affiliation, &self.company),
            is_academic: contains_any(affiliation, &self.academic),
        }
    }

    /// Shorthand for `classify(affiliation).is_company`
    pub fn is_company(&self, affiliation: &str) -> bool {
        contains_any(affiliation, &self.company)
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(
            DEFAULT_COMPANY_KEYWORDS.iter().copied(),
            DEFAULT_ACADEMIC_KEYWORDS.iter().copied(),
        )
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|keyword| !keyword.is_empty() && text.contains(keyword.as_str()))
}
