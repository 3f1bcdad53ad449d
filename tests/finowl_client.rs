// tests/finowl_client.rs
use std::time::Duration;

use finowl_poster::finowl::types::SummarySource;
use finowl_poster::finowl::{wait_until_available, FinowlClient, PollPolicy};
use finowl_poster::pacing::RecordingSleeper;
use finowl_poster::PipelineError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUMMARY_PATH: &str = "/api/v0/summary";

fn body_for(id: u64) -> serde_json::Value {
    serde_json::json!({
        "summary": {
            "id": id,
            "timestamp": "2025-02-01T12:00:00Z",
            "content": "## Featured Tickers and Projects\n**$ABC** up\n## Key Insights from Influencers\nX said Y\n## Market Sentiment and Directions\nBullish"
        },
        "total": 250
    })
}

async fn client_for(server: &MockServer) -> FinowlClient {
    FinowlClient::new(format!("{}{SUMMARY_PATH}", server.uri())).expect("client")
}

#[tokio::test]
async fn ok_response_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SUMMARY_PATH))
        .and(query_param("id", "105"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body_for(105)))
        .expect(1)
        .mount(&server)
        .await;

    let summary = client_for(&server).await.fetch(105).await.expect("fetch ok");
    assert_eq!(summary.id, 105);
    assert!(summary.content.contains("## Market Sentiment and Directions"));
}

#[tokio::test]
async fn not_found_is_classified_regardless_of_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SUMMARY_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"summary\": garbage"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.fetch(999).await.unwrap_err();
    assert!(
        matches!(err, PipelineError::SummaryNotFound { id: 999 }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn other_statuses_are_unexpected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).await.fetch(1).await.unwrap_err();
    assert!(matches!(err, PipelineError::UnexpectedStatus { code: 503 }));
}

#[tokio::test]
async fn malformed_body_is_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.fetch(1).await.unwrap_err();
    assert!(matches!(err, PipelineError::RequestFailed { .. }), "got {err:?}");
}

#[tokio::test]
async fn transport_failure_is_request_failure() {
    // Nothing listens on this port once the listener is dropped.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let client = FinowlClient::with_timeout(
        format!("http://127.0.0.1:{port}{SUMMARY_PATH}"),
        Duration::from_secs(2),
    )
    .expect("client");
    let err = client.fetch(1).await.unwrap_err();
    assert!(matches!(err, PipelineError::RequestFailed { .. }), "got {err:?}");
}

#[tokio::test]
async fn slow_upstream_times_out_as_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body_for(1))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = FinowlClient::with_timeout(
        format!("{}{SUMMARY_PATH}", server.uri()),
        Duration::from_millis(200),
    )
    .expect("client");
    let err = client.fetch(1).await.unwrap_err();
    assert!(matches!(err, PipelineError::RequestFailed { .. }), "got {err:?}");
}

#[tokio::test]
async fn wait_polls_next_id_until_published() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("id", "106"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("id", "106"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body_for(106)))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let sleeper = RecordingSleeper::new();
    let policy = PollPolicy::default();

    let summary = wait_until_available(&client, 105, &policy, &sleeper)
        .await
        .expect("eventually available");
    assert_eq!(summary.id, 106);
    assert_eq!(sleeper.calls(), vec![Duration::from_secs(15 * 60); 2]);
}

#[tokio::test]
async fn wait_surfaces_non_not_found_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let sleeper = RecordingSleeper::new();
    let err = wait_until_available(&client, 10, &PollPolicy::default(), &sleeper)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnexpectedStatus { code: 500 }));
    assert!(sleeper.calls().is_empty());
}

#[tokio::test]
async fn bounded_wait_returns_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let sleeper = RecordingSleeper::new();
    let policy = PollPolicy {
        interval: Duration::from_secs(1),
        max_attempts: Some(3),
    };
    let err = wait_until_available(&client, 41, &policy, &sleeper)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::SummaryNotFound { id: 42 }));
    assert_eq!(sleeper.calls().len(), 2);
}
