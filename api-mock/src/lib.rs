//! API Mock - declarative in-process HTTP mock harness
//!
//! This crate lets tests register route handlers on an injectable HTTP
//! client, answer requests with the API's `{code, message?, data?}` envelope,
//! assert on decoded JSON bodies and drive multi-step schema configuration
//! scenarios against a system under test.

// Core modules
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Transports
pub mod http;
pub mod routing;

// Test building blocks
pub mod assertions;
pub mod backoff;
pub mod client;
pub mod context;
pub mod diff;
pub mod envelope;
pub mod json;
pub mod logging;
pub mod request;
pub mod scenario;
pub mod sequence;
pub mod state;

// Re-export main types for convenience
pub use assertions::{
    assert_array_items, assert_empty, assert_equal, assert_key_does_not_exist,
    assert_key_exists, assert_key_exists_and_has_value, assert_not_empty, check_array_items,
    check_equal, check_resource_attr, check_resource_attr_set, check_resource_count,
    compose_import_state_check, ImportStateCheck,
};
pub use backoff::{
    override_schema_conflict_backoff, schema_conflict_backoff, BackoffOverride,
};
pub use client::ApiClient;
pub use config::{bootstrap_env, Credentials, HarnessConfig, HarnessConfigBuilder};
pub use context::TestContext;
pub use envelope::{
    build_response, build_success_response, paged_data, ApiCode, ApiEnvelope, Paginator,
};
pub use error::{MockError, Result};
pub use http::ReqwestClient;
pub use json::{json_eq, JsonExt};
pub use logging::{
    init_test_tracing, init_test_tracing_json, init_test_tracing_silent,
    init_test_tracing_with_filter, init_tracing, tracing_installed, TracingMode,
};
pub use request::{
    decode_optional_request_body, decode_request_body, path_segments, query_param,
    try_decode_request_body,
};
pub use routing::{Handler, MockHttpClient, PathPattern, RecordedInteraction};
pub use scenario::{
    setup_complex_test, setup_complex_test_with_columns_reload, setup_one_step_test,
    SchemaConfigTestData, ScenarioReport, ScenarioStep, SchemaScenario,
};
pub use sequence::{ResponseSequence, SequenceState};
pub use state::ResourceState;
pub use traits::HttpClient;
pub use types::{ApiRequest, ApiResponse};

pub use reqwest::Method;
