use crate::config::ClientConfig;
use crate::error::{PubMedError, Result};
use crate::pubmed::models::PaperRecord;
use crate::pubmed::parser::parse_papers_from_xml;
use crate::pubmed::responses::ESearchResult;
use crate::retry::with_retry;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

/// Client for the ESearch → EFetch pipeline
///
/// Requests are issued one at a time; each is awaited before the next starts.
#[derive(Clone)]
pub struct PubMedClient {
    client: Client,
    base_url: String,
    config: ClientConfig,
}

impl PubMedClient {
    /// Create a client with the default configuration
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_affiliations::PubMedClient;
    ///
    /// let client = PubMedClient::new().unwrap();
    /// assert_eq!(client.config().max_results, 5);
    /// ```
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::new())
    }

    /// Create a client with a custom configuration
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_affiliations::{ClientConfig, PubMedClient};
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new()
    ///     .with_email("researcher@university.edu")
    ///     .with_timeout(Duration::from_secs(10));
    ///
    /// let client = PubMedClient::with_config(config).unwrap();
    /// ```
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.effective_user_agent())
            .build()
            .map_err(|e| PubMedError::InvalidConfig(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(client, config))
    }

    /// Create a client around an existing reqwest client
    ///
    /// The timeout and user agent of `config` are ignored; those of `client`
    /// apply.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        let base_url = config.effective_base_url().to_string();
        Self {
            client,
            base_url,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Search PubMed and return matching PMIDs (search stage)
    ///
    /// An empty or blank query returns an empty list without a request.
    ///
    /// # Errors
    ///
    /// * `PubMedError::ApiError` - If ESearch answers with a non-2xx status
    /// * `PubMedError::RequestError` - If the HTTP request fails
    /// * `PubMedError::JsonError` - If `esearchresult.idlist` is missing
    #[instrument(skip(self), fields(query = %query, limit = limit))]
    pub async fn search_articles(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        if query.trim().is_empty() {
            debug!("Empty query provided, returning empty results");
            return Ok(Vec::new());
        }

        let url = self.build_url(
            "esearch.fcgi",
            &[
                ("db", "pubmed"),
                ("term", query),
                ("retmax", &limit.to_string()),
                ("retmode", "json"),
            ],
        );

        debug!("Making ESearch API request");
        let body = self.get_text(&url, "esearch").await?;

        let search_result: ESearchResult = serde_json::from_str(&body)?;
        let pmids = search_result.esearchresult.idlist;

        info!(results_found = pmids.len(), "Search completed successfully");
        Ok(pmids)
    }

    /// Fetch the EFetch XML for a batch of PMIDs in a single request (fetch stage)
    ///
    /// # Errors
    ///
    /// * `PubMedError::ApiError` - If EFetch answers with a non-2xx status
    /// * `PubMedError::RequestError` - If the HTTP request fails
    #[instrument(skip(self), fields(pmids_count = pmids.len()))]
    pub async fn fetch_xml(&self, pmids: &[&str]) -> Result<String> {
        let ids = pmids.join(",");
        let url = self.build_url(
            "efetch.fcgi",
            &[("db", "pubmed"), ("id", &ids), ("retmode", "xml")],
        );

        debug!("Making EFetch API request");
        let xml = self.get_text(&url, "efetch").await?;
        debug!(xml_size = xml.len(), "Received EFetch response");
        Ok(xml)
    }

    /// Fetch and parse a batch of PMIDs into report rows, in document order
    ///
    /// An empty PMID list returns an empty result without a request.
    ///
    /// # Errors
    ///
    /// Everything [`fetch_xml`](Self::fetch_xml) returns, plus
    /// `PubMedError::XmlError` and `PubMedError::MissingPmid` from parsing.
    pub async fn fetch_papers(&self, pmids: &[&str]) -> Result<Vec<PaperRecord>> {
        if pmids.is_empty() {
            return Ok(Vec::new());
        }

        let xml = self.fetch_xml(pmids).await?;
        let papers = parse_papers_from_xml(&xml, &self.config.keywords)?;

        info!(
            papers = papers.len(),
            with_company_authors = papers.iter().filter(|p| p.has_company_authors()).count(),
            "Parsed EFetch response"
        );
        Ok(papers)
    }

    /// Run the whole pipeline: search, fetch, parse
    ///
    /// Uses `ClientConfig::max_results` as the search cap. Zero hits is an
    /// empty `Ok`, not an error.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_affiliations::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new()?;
    ///     for paper in client.search_and_fetch("cancer immunotherapy").await? {
    ///         println!("{}: {}", paper.pubmed_id, paper.title);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_and_fetch(&self, query: &str) -> Result<Vec<PaperRecord>> {
        let pmids = self
            .search_articles(query, self.config.max_results)
            .await?;

        if pmids.is_empty() {
            info!("No papers found for the query");
            return Ok(Vec::new());
        }

        let pmid_refs: Vec<&str> = pmids.iter().map(String::as_str).collect();
        self.fetch_papers(&pmid_refs).await
    }

    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}/{}?", self.base_url, endpoint);

        let api_params = self.config.build_api_params();
        let all_params = params
            .iter()
            .map(|(k, v)| (*k, *v))
            .chain(api_params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        for (i, (key, value)) in all_params.enumerate() {
            if i > 0 {
                url.push('&');
            }
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }

        url
    }

    async fn get_text(&self, url: &str, label: &str) -> Result<String> {
        with_retry(
            move || async move {
                let response = self.client.get(url).send().await?;
                let status = response.status();

                if !status.is_success() {
                    warn!("{} request failed with status: {}", label, status);
                    return Err(PubMedError::ApiError {
                        status: status.as_u16(),
                        message: status
                            .canonical_reason()
                            .unwrap_or("Unknown error")
                            .to_string(),
                    });
                }

                Ok(response.text().await?)
            },
            self.config.max_retries,
            label,
        )
        .await
    }
}
