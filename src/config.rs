//! Client configuration
//!
//! [`ClientConfig`] carries everything that shapes a run: the E-utilities base
//! URL, the HTTP timeout, the retry count, the result cap, the NCBI
//! identification parameters and the keyword lists used for classification.

use std::time::Duration;

use crate::classify::KeywordSet;
use crate::error::{PubMedError, Result};

/// Default NCBI E-utilities base URL
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Default number of PMIDs requested from ESearch
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Default HTTP timeout for each request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default tool name sent to NCBI
pub const DEFAULT_TOOL: &str = "pubmed-affiliations";

/// Configuration for [`PubMedClient`](crate::PubMedClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// NCBI API key, sent as `api_key`
    pub api_key: Option<String>,
    /// Contact email, sent as `email`
    pub email: Option<String>,
    /// Tool name, sent as `tool`
    pub tool: Option<String>,
    /// Override for the E-utilities base URL (used for mock servers)
    pub base_url: Option<String>,
    /// Override for the `User-Agent` header
    pub user_agent: Option<String>,
    /// Timeout applied to every HTTP request
    pub timeout: Duration,
    /// Number of retries for transient failures; 0 disables retrying
    pub max_retries: usize,
    /// Value sent as `retmax` to ESearch
    pub max_results: usize,
    /// Keyword lists used to classify affiliations
    pub keywords: KeywordSet,
}

impl ClientConfig {
    /// Create a configuration with the default values
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_affiliations::ClientConfig;
    ///
    /// let config = ClientConfig::new()
    ///     .with_email("researcher@university.edu")
    ///     .with_max_results(20);
    /// assert_eq!(config.max_results, 20);
    /// assert_eq!(config.max_retries, 0);
    /// ```
    pub fn new() -> Self {
        Self {
            api_key: None,
            email: None,
            tool: None,
            base_url: None,
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
            max_results: DEFAULT_MAX_RESULTS,
            keywords: KeywordSet::default(),
        }
    }

    /// Build a configuration from the process environment
    ///
    /// Recognized variables: `NCBI_API_KEY`, `NCBI_EMAIL`, `NCBI_TOOL`,
    /// `PUBMED_BASE_URL`, `PUBMED_TIMEOUT_SECS`, `PUBMED_MAX_RESULTS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::new();

        if let Some(key) = get("NCBI_API_KEY") {
            config = config.with_api_key(key);
        }
        if let Some(email) = get("NCBI_EMAIL") {
            config = config.with_email(email);
        }
        if let Some(tool) = get("NCBI_TOOL") {
            config = config.with_tool(tool);
        }
        if let Some(url) = get("PUBMED_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Some(secs) = get("PUBMED_TIMEOUT_SECS") {
            let secs = parse_number("PUBMED_TIMEOUT_SECS", &secs)?;
            config = config.with_timeout(Duration::from_secs(secs as u64));
        }
        if let Some(max) = get("PUBMED_MAX_RESULTS") {
            config = config.with_max_results(parse_number("PUBMED_MAX_RESULTS", &max)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_tool<S: Into<String>>(mut self, tool: S) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = keywords;
        self
    }

    /// Base URL without a trailing slash
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("pubmed-affiliations/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn effective_tool(&self) -> &str {
        self.tool.as_deref().unwrap_or(DEFAULT_TOOL)
    }

    /// Identification parameters appended to every E-utilities request
    pub fn build_api_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(api_key) = &self.api_key {
            params.push(("api_key".to_string(), api_key.clone()));
        }
        if let Some(email) = &self.email {
            params.push(("email".to_string(), email.clone()));
        }
        params.push(("tool".to_string(), self.effective_tool().to_string()));

        params
    }

    /// Reject values that would make every request pointless
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(PubMedError::InvalidConfig(
                "max_results must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(PubMedError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|e| PubMedError::InvalidConfig(format!("{key}={value:?}: {e}")))
}
