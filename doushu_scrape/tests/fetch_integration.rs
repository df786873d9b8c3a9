use doushu_scrape::{collect_url, CrawlSession, FetchError, HttpFetcher, PageFetcher};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session() -> CrawlSession {
    CrawlSession {
        subject_id: "alice".to_string(),
        cookie_header: "bid=abc; dbcl2=\"123:xyz\"".to_string(),
    }
}

#[tokio::test]
async fn fetch_page_sends_the_session_cookies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/people/alice/collect"))
        .and(query_param("start", "30"))
        .and(header("cookie", "bid=abc; dbcl2=\"123:xyz\""))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let url = collect_url(&mock_server.uri(), "alice", 2);
    let html = fetcher.fetch_page(&url, &session()).await.unwrap();
    assert_eq!(html, "<html></html>");
}

#[tokio::test]
async fn fetch_page_surfaces_http_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/people/alice/collect"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let url = collect_url(&mock_server.uri(), "alice", 0);
    let err = fetcher.fetch_page(&url, &session()).await.unwrap_err();
    assert!(matches!(
        err,
        FetchError::HttpStatus { status } if status.as_u16() == 403
    ));
}
