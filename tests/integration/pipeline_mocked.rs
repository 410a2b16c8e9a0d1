//! Integration tests for the ESearch → EFetch pipeline using mocked HTTP responses
//!
//! wiremock stands in for both E-utilities endpoints, so these tests never
//! touch the network.

mod common;

use std::time::Duration;

use common::{
    EFETCH_TWO_ARTICLES, ESEARCH_NO_IDS, ESEARCH_TWO_IDS, create_client_with, create_mock_client,
    mount_efetch, mount_esearch, setup_two_article_server,
};
use pubmed_affiliations::{ClientConfig, KeywordSet, PaperRow, PubMedError};
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
#[traced_test]
async fn test_cancer_research_scenario() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("term", "cancer research"))
        .and(query_param("retmax", "5"))
        .and(query_param("retmode", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_TWO_IDS))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("id", "111,222"))
        .and(query_param("retmode", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_TWO_ARTICLES))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let papers = client
        .search_and_fetch("cancer research")
        .await
        .expect("pipeline should succeed");

    assert_eq!(papers.len(), 2);

    let first = &papers[0];
    assert_eq!(first.pubmed_id, "111");
    assert_eq!(first.title, "Targeted therapy for solid tumours");
    assert_eq!(first.non_academic_authors, vec!["Alice Smith"]);
    assert_eq!(first.company_affiliations, vec!["Acme Pharma Inc."]);
    assert_eq!(first.corresponding_author_email, None);

    let second = &papers[1];
    assert_eq!(second.pubmed_id, "222");
    assert!(second.non_academic_authors.is_empty());
    assert!(second.company_affiliations.is_empty());

    let row = PaperRow::from(second);
    assert_eq!(row.non_academic_authors, "N/A");
    assert_eq!(row.company_affiliations, "N/A");
    assert_eq!(row.corresponding_author_email, "N/A");
}

#[tokio::test]
#[traced_test]
async fn test_no_identifiers_skips_fetch_stage() {
    let mock_server = MockServer::start().await;
    mount_esearch(&mock_server, ESEARCH_NO_IDS).await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_TWO_ARTICLES))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let papers = client
        .search_and_fetch("nothing matches this")
        .await
        .expect("empty search is not an error");

    assert!(papers.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_search_server_error_aborts_before_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_TWO_ARTICLES))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let result = client.search_and_fetch("cancer research").await;

    match result {
        Err(PubMedError::ApiError { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected ApiError 500, got {other:?}"),
    }

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1, "fetch stage must not be attempted");
    assert!(logs_contain("request failed with status"));
}

#[tokio::test]
#[traced_test]
async fn test_fetch_server_error_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_esearch(&mock_server, ESEARCH_TWO_IDS).await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let result = client.search_and_fetch("cancer research").await;

    assert!(matches!(
        result,
        Err(PubMedError::ApiError { status: 503, .. })
    ));
}

#[tokio::test]
#[traced_test]
async fn test_malformed_xml_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_esearch(&mock_server, ESEARCH_TWO_IDS).await;
    mount_efetch(
        &mock_server,
        "<PubmedArticleSet><PubmedArticle><PMID>111</PMID></Broken></PubmedArticleSet>",
    )
    .await;

    let client = create_mock_client(&mock_server);
    let result = client.search_and_fetch("cancer research").await;

    assert!(matches!(result, Err(PubMedError::XmlError(_))));
}

#[tokio::test]
#[traced_test]
async fn test_search_response_without_idlist_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_esearch(
        &mock_server,
        r#"{"esearchresult":{"ERROR":"Invalid query syntax"}}"#,
    )
    .await;

    let client = create_mock_client(&mock_server);
    let result = client.search_articles("((", 5).await;

    assert!(matches!(result, Err(PubMedError::JsonError(_))));
}

#[tokio::test]
#[traced_test]
async fn test_configured_result_cap_and_identification_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("retmax", "20"))
        .and(query_param("api_key", "secret"))
        .and(query_param("email", "me@example.org"))
        .and(query_param("tool", "pubmed-affiliations"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_TWO_IDS))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("api_key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_TWO_ARTICLES))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new()
        .with_max_results(20)
        .with_api_key("secret")
        .with_email("me@example.org");
    let client = create_client_with(&mock_server, config);

    let papers = client.search_and_fetch("cancer research").await.unwrap();
    assert_eq!(papers.len(), 2);
}

#[tokio::test]
#[traced_test]
async fn test_transient_error_not_retried_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_esearch(&mock_server, ESEARCH_TWO_IDS).await;
    mount_efetch(&mock_server, EFETCH_TWO_ARTICLES).await;

    let client = create_mock_client(&mock_server);
    let result = client.search_and_fetch("cancer research").await;

    assert!(matches!(
        result,
        Err(PubMedError::ApiError { status: 503, .. })
    ));
}

#[tokio::test]
#[traced_test]
async fn test_transient_error_retried_when_enabled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_esearch(&mock_server, ESEARCH_TWO_IDS).await;
    mount_efetch(&mock_server, EFETCH_TWO_ARTICLES).await;

    let client = create_client_with(&mock_server, ClientConfig::new().with_max_retries(1));
    let papers = client
        .search_and_fetch("cancer research")
        .await
        .expect("second attempt should succeed");

    assert_eq!(papers.len(), 2);
    assert!(logs_contain("Request failed, retrying"));
}

#[tokio::test]
#[traced_test]
async fn test_alternate_keyword_set() {
    let mock_server = setup_two_article_server().await;

    let keywords = KeywordSet::new(["University"], ["Pharma"]);
    let client = create_client_with(&mock_server, ClientConfig::new().with_keywords(keywords));

    let papers = client.search_and_fetch("cancer research").await.unwrap();

    assert!(papers[0].non_academic_authors.is_empty());
    assert_eq!(papers[1].non_academic_authors, vec!["Bob Jones"]);
    assert_eq!(papers[1].company_affiliations, vec!["State University"]);
}

#[tokio::test]
#[traced_test]
async fn test_fetch_papers_single_batch_request() {
    let mock_server = setup_two_article_server().await;
    let client = create_mock_client(&mock_server);

    let papers = client.fetch_papers(&["111", "222"]).await.unwrap();
    assert_eq!(papers.len(), 2);

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1, "all PMIDs go in one EFetch request");
    assert_eq!(received[0].url.path(), "/efetch.fcgi");
}

#[tokio::test]
#[traced_test]
async fn test_slow_search_times_out_before_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ESEARCH_TWO_IDS)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_TWO_ARTICLES))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new().with_timeout(Duration::from_millis(300));
    let client = create_client_with(&mock_server, config);

    let result = client.search_and_fetch("cancer research").await;
    match result {
        Err(PubMedError::RequestError(e)) => assert!(e.is_timeout(), "expected timeout, got {e}"),
        other => panic!("expected RequestError timeout, got {other:?}"),
    }

    let received = mock_server.received_requests().await.unwrap();
    assert!(received.iter().all(|r| r.url.path() == "/esearch.fcgi"));
}
