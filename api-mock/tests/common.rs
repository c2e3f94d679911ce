//! Shared helpers for api-mock integration tests

#![allow(dead_code)]

use api_mock::{
    build_success_response, ApiClient, HarnessConfig, MockHttpClient, SchemaConfigTestData,
    TestContext,
};
use serde_json::{json, Value};

pub const CONNECTION_ID: &str = "conn_id";

/// Fresh context over the default configuration
pub fn create_context() -> TestContext {
    TestContext::new().expect("default configuration is valid")
}

/// Context whose configuration points at `base_url`
pub fn create_context_for(base_url: &str) -> TestContext {
    let config = HarnessConfig::builder()
        .base_url(base_url)
        .build()
        .expect("test configuration is valid");
    TestContext::with_config(config).expect("context builds")
}

pub fn api(context: &TestContext) -> ApiClient<MockHttpClient> {
    context.api_client()
}

/// Group as returned by `GET /v1/groups/{id}`
pub fn group_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "created_at": "2023-01-01T00:00:00.000000Z"
    })
}

/// Register `GET /v1/groups/{id}` answering with a fixed group
pub fn register_group(mock: &MockHttpClient, id: &str, name: &str) -> api_mock::Handler {
    let data = group_json(id, name);
    mock.when(api_mock::Method::GET, &format!("/v1/groups/{}", id))
        .then_call(move |req| build_success_response(req, 200, None, Some(data.clone())))
}

/// Schema configuration with one schema, two tables and a locked column
pub fn schema_config(table_1_enabled: bool) -> SchemaConfigTestData {
    let mut data = SchemaConfigTestData::new(CONNECTION_ID, "ALLOW_COLUMNS");
    let schema = data.new_schema("schema_1", true);
    let table = schema.new_table("table_1", table_1_enabled, Some("SOFT_DELETE"));
    table.new_column("column_1", true, false, Some(true));
    table.new_column_locked("column_2", true, false, None);
    schema.new_table_locked("table_2", true, Some("LIVE"));
    data
}
