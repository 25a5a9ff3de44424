//! Contract tests for RecordsClient.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET | `/app/{responses,repairs,services}` | `list_*` |
//! | GET | `/app/{route}-done` | `history_*` |
//! | GET | `/app/{route}/{id}` | `detail_*` |

use serde_json::json;
use svcdesk_client::records::RecordKind;
use svcdesk_client::{ClientConfig, ServiceDeskClient, ServiceDeskError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> ServiceDeskClient {
    let mut config = ClientConfig::new(&server.uri()).unwrap();
    config.api_token = Some(svcdesk_client::BearerToken::new("test-token"));
    ServiceDeskClient::new(config).unwrap()
}

#[tokio::test]
async fn list_repairs_unwraps_data_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app/repairs"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1, "status": 1}, {"id": 2, "status": 3}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = test_client(&server)
        .records()
        .list(RecordKind::Repairs)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["id"], 2);
}

#[tokio::test]
async fn list_error_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app/responses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .records()
        .list(RecordKind::Orders)
        .await
        .unwrap_err();

    match err {
        ServiceDeskError::ApiError { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn history_queries_the_whole_year() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app/services-done"))
        .and(query_param("date_from", "2024-01-01"))
        .and(query_param("date_to", "2024-12-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"services": [{"id": 9}]})))
        .expect(1)
        .mount(&server)
        .await;

    let records = test_client(&server)
        .records()
        .history(RecordKind::Services, 2024)
        .await
        .unwrap();

    assert_eq!(records, vec![json!({"id": 9})]);
}

#[tokio::test]
async fn detail_unwraps_data_object() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app/responses/41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 41, "description": "Printer jam"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let detail = test_client(&server)
        .records()
        .detail(RecordKind::Orders, "41")
        .await
        .unwrap();

    assert_eq!(detail["description"], "Printer jam");
}

#[tokio::test]
async fn detail_for_services_is_unsupported_without_request() {
    let server = MockServer::start().await;

    let err = test_client(&server)
        .records()
        .detail(RecordKind::Services, "1")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceDeskError::Unsupported { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn labelled_records_use_family_dictionary() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app/repairs/statuses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 4, "name": "Waiting for parts"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let labelled = client
        .records()
        .labelled(
            RecordKind::Repairs,
            vec![
                json!({"id": 1, "status": 4}),
                json!({"id": 2, "state": {"name": "Open"}}),
                json!({"number": "R-3", "status": 99}),
                json!({"id": 4}),
            ],
        )
        .await;

    let statuses: Vec<&str> = labelled.iter().map(|r| r.status.as_str()).collect();
    assert_eq!(statuses, vec!["Waiting for parts", "Open", "99", "—"]);
    assert_eq!(labelled[2].id.as_deref(), Some("R-3"));
}
