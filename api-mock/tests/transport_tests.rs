//! The reqwest transport against a wiremock server
//!
//! The same `ApiClient` code that runs over the in-process mock must behave
//! identically over the network.

use api_mock::{ApiClient, Credentials, HarnessConfig, MockError, ReqwestClient};
use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const BASIC_AUTH: &str = "Basic dGVzdF9hcGlfa2V5OnRlc3RfYXBpX3NlY3JldA==";

fn client_for(server: &MockServer) -> ApiClient<ReqwestClient> {
    let config = HarnessConfig::builder()
        .base_url(server.uri())
        .timeout(5)
        .build()
        .unwrap();
    ApiClient::with_http_client(ReqwestClient::new(&config).unwrap(), Credentials::default())
}

#[tokio::test]
async fn test_get_sends_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/groups/group_id"))
        .and(header("authorization", BASIC_AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "Success",
            "data": {"id": "group_id", "name": "group"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let envelope = client_for(&server).get("/v1/groups/group_id").await.unwrap();
    assert!(envelope.is_success());
    assert_eq!(envelope.data.unwrap()["name"], "group");
}

#[tokio::test]
async fn test_patch_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v1/connections/conn_id/schemas"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"schema_change_handling": "BLOCK_ALL"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "Success"})))
        .expect(1)
        .mount(&server)
        .await;

    let envelope = client_for(&server)
        .patch(
            "/v1/connections/conn_id/schemas",
            &json!({"schema_change_handling": "BLOCK_ALL"}),
        )
        .await
        .unwrap();
    assert_eq!(envelope.data, None);
}

#[tokio::test]
async fn test_error_envelope_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/connections/conn_id/schemas"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "NotFound_SchemaConfig",
            "message": "Schema config not found"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get("/v1/connections/conn_id/schemas")
        .await
        .unwrap_err();
    match err {
        MockError::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 404);
            assert_eq!(code, "NotFound_SchemaConfig");
            assert_eq!(message, "Schema config not found");
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/users"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client_for(&server).get("/v1/users").await.unwrap_err();
    assert_eq!(err.api_status(), Some(502));
    assert!(err.to_string().contains("Bad Gateway"));
}

#[tokio::test]
async fn test_list_all_over_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/groups/group_id/users"))
        .and(query_param("cursor", "cursor_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "Success",
            "data": {"items": [{"id": "user_3"}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/groups/group_id/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "Success",
            "data": {"items": [{"id": "user_1"}, {"id": "user_2"}], "next_cursor": "cursor_2"}
        })))
        .mount(&server)
        .await;

    let users = client_for(&server)
        .list_all("/v1/groups/group_id/users")
        .await
        .unwrap();
    let ids: Vec<_> = users.iter().map(|user| user["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["user_1", "user_2", "user_3"]);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let config = HarnessConfig::builder()
        .base_url("http://127.0.0.1:1")
        .timeout(5)
        .build()
        .unwrap();
    let transport = ReqwestClient::new(&config).unwrap();
    let client = ApiClient::with_http_client(transport, Credentials::default());

    let err = client.get("/v1/users").await.unwrap_err();
    assert!(matches!(err, MockError::Transport { .. }));
}
