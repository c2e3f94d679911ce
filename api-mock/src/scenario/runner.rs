//! Multi-step schema configuration scenarios
//!
//! A scenario registers the schema endpoints of one connection on a
//! [`MockHttpClient`], installs the simulated upstream state of each step,
//! lets the system under test run against it and captures every PATCH body
//! the step produced.

use crate::envelope::{build_response, build_success_response, ApiCode};
use crate::error::{MockError, Result};
use crate::request::{decode_request_body, path_segments};
use crate::routing::{Handler, MockHttpClient};
use crate::scenario::data::SchemaConfigTestData;
use crate::types::{ApiRequest, ApiResponse};
use reqwest::Method;
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Desired configuration applied by the system under test against a simulated upstream state
#[derive(Debug, Clone)]
pub struct ScenarioStep {
    pub desired: SchemaConfigTestData,
    pub upstream: SchemaConfigTestData,
}

impl ScenarioStep {
    pub fn new(desired: SchemaConfigTestData, upstream: SchemaConfigTestData) -> Self {
        Self { desired, upstream }
    }

    /// Step whose upstream already matches the desired configuration
    pub fn consistent(config: SchemaConfigTestData) -> Self {
        Self {
            desired: config.clone(),
            upstream: config,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScenarioMode {
    /// Upstream is loaded at the start of every step
    Complex,
    /// Like `Complex`, but schema responses omit columns; they are served per table
    ComplexWithColumnsReload,
    /// Upstream starts unloaded and appears on `POST .../schemas/reload`
    OneStep,
}

#[derive(Debug)]
struct EndpointState {
    upstream: Option<SchemaConfigTestData>,
    reloadable: Option<SchemaConfigTestData>,
    patches: Vec<Value>,
    locked_changes: Vec<String>,
}

/// What happened during one step
#[derive(Debug, Clone)]
pub struct StepReport {
    pub index: usize,
    /// PATCH bodies in arrival order
    pub patches: Vec<Value>,
    /// Locked entities a captured PATCH tried to change
    pub locked_changes: Vec<String>,
    /// Error returned by the system under test, if any
    pub error: Option<String>,
    /// Upstream state at the end of the step, `None` if never loaded
    pub upstream_after: Option<SchemaConfigTestData>,
}

impl StepReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScenarioReport {
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    pub fn step(&self, index: usize) -> Option<&StepReport> {
        self.steps.get(index)
    }

    /// Total number of PATCH bodies captured across steps
    pub fn patch_count(&self) -> usize {
        self.steps.iter().map(|step| step.patches.len()).sum()
    }

    pub fn all_patches(&self) -> Vec<&Value> {
        self.steps.iter().flat_map(|step| step.patches.iter()).collect()
    }

    pub fn locked_changes(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|step| step.locked_changes.iter().map(String::as_str))
            .collect()
    }
}

/// Schema endpoints of one connection wired to a list of steps
pub struct SchemaScenario {
    connection_id: String,
    mode: ScenarioMode,
    steps: Vec<ScenarioStep>,
    state: Arc<Mutex<EndpointState>>,
    get_handler: Handler,
    patch_handler: Handler,
    reload_handler: Handler,
    columns_handler: Option<Handler>,
}

/// Scenario where each step starts from its own loaded upstream state
pub fn setup_complex_test(
    mock: &MockHttpClient,
    connection_id: &str,
    steps: Vec<ScenarioStep>,
) -> SchemaScenario {
    SchemaScenario::register(mock, connection_id, ScenarioMode::Complex, steps)
}

/// Like [`setup_complex_test`], with column maps served by the per-table columns endpoint
pub fn setup_complex_test_with_columns_reload(
    mock: &MockHttpClient,
    connection_id: &str,
    steps: Vec<ScenarioStep>,
) -> SchemaScenario {
    SchemaScenario::register(
        mock,
        connection_id,
        ScenarioMode::ComplexWithColumnsReload,
        steps,
    )
}

/// Single step starting with no schema configuration loaded upstream
///
/// `GET .../schemas` answers `404 NotFound_SchemaConfig` until the system
/// under test calls `POST .../schemas/reload`, which loads `upstream`.
pub fn setup_one_step_test(
    mock: &MockHttpClient,
    connection_id: &str,
    upstream: SchemaConfigTestData,
    desired: SchemaConfigTestData,
) -> SchemaScenario {
    SchemaScenario::register(
        mock,
        connection_id,
        ScenarioMode::OneStep,
        vec![ScenarioStep::new(desired, upstream)],
    )
}

fn lock_state(state: &Mutex<EndpointState>) -> MutexGuard<'_, EndpointState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn schema_config_not_found(request: &ApiRequest) -> Result<ApiResponse> {
    build_response(
        request,
        404,
        ApiCode::NotFound("SchemaConfig".to_string()),
        Some("Schema config not found"),
        None,
    )
}

impl SchemaScenario {
    fn register(
        mock: &MockHttpClient,
        connection_id: &str,
        mode: ScenarioMode,
        steps: Vec<ScenarioStep>,
    ) -> Self {
        let state = Arc::new(Mutex::new(EndpointState {
            upstream: None,
            reloadable: None,
            patches: Vec::new(),
            locked_changes: Vec::new(),
        }));
        let schemas_path = format!("/v1/connections/{}/schemas", connection_id);
        let omit_columns = mode == ScenarioMode::ComplexWithColumnsReload;

        let get_state = Arc::clone(&state);
        let get_handler = mock
            .when(Method::GET, &schemas_path)
            .then_call(move |request| {
                let state = lock_state(&get_state);
                match &state.upstream {
                    Some(upstream) if omit_columns => build_success_response(
                        request,
                        200,
                        None,
                        Some(upstream.json_response_without_columns()),
                    ),
                    Some(upstream) => {
                        build_success_response(request, 200, None, Some(upstream.json_response()))
                    }
                    None => schema_config_not_found(request),
                }
            });

        let reload_state = Arc::clone(&state);
        let reload_connection = connection_id.to_string();
        let reload_handler = mock
            .when(Method::POST, &format!("{}/reload", schemas_path))
            .then_call(move |request| {
                let mut state = lock_state(&reload_state);
                let loaded = match (state.upstream.take(), state.reloadable.clone()) {
                    (Some(current), _) => current,
                    (None, Some(reloadable)) => reloadable,
                    (None, None) => SchemaConfigTestData::new(&reload_connection, "ALLOW_ALL"),
                };
                let data = loaded.json_response();
                state.upstream = Some(loaded);
                tracing::debug!(connection_id = %reload_connection, "schema config reloaded");
                build_success_response(request, 200, None, Some(data))
            });

        let patch_state = Arc::clone(&state);
        let patch_handler = mock
            .when(Method::PATCH, &schemas_path)
            .then_call(move |request| {
                let body = decode_request_body(request);
                let mut state = lock_state(&patch_state);

                let locked = state
                    .upstream
                    .as_ref()
                    .map(|upstream| upstream.locked_changes(&body))
                    .unwrap_or_default();
                state.locked_changes.extend(locked);
                state.patches.push(body.clone());

                let Some(upstream) = state.upstream.as_mut() else {
                    return schema_config_not_found(request);
                };
                match upstream.apply_patch(&body) {
                    Ok(()) => {
                        let data = upstream.json_response();
                        build_success_response(request, 200, None, Some(data))
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "schema patch rejected");
                        build_response(
                            request,
                            400,
                            ApiCode::InvalidInput,
                            Some(&err.to_string()),
                            None,
                        )
                    }
                }
            });

        let columns_handler = omit_columns.then(|| {
            let columns_state = Arc::clone(&state);
            mock.when_wc(Method::GET, &format!("{}/*", schemas_path))
                .then_call(move |request| {
                    // v1/connections/{id}/schemas/{schema}/tables/{table}/columns
                    let segments = path_segments(request);
                    let (schema, table) = match segments.as_slice() {
                        [_, _, _, _, schema, tables, table, columns]
                            if tables == "tables" && columns == "columns" =>
                        {
                            (schema.clone(), table.clone())
                        }
                        _ => {
                            return build_response(
                                request,
                                400,
                                ApiCode::BadRequest,
                                Some("Unsupported schema sub-resource"),
                                None,
                            )
                        }
                    };

                    let state = lock_state(&columns_state);
                    let columns = state
                        .upstream
                        .as_ref()
                        .and_then(|upstream| upstream.columns_response(&schema, &table));
                    match columns {
                        Some(data) => build_success_response(request, 200, None, Some(data)),
                        None => build_response(
                            request,
                            404,
                            ApiCode::NotFound("Table".to_string()),
                            Some(&format!("Table '{}.{}' not found", schema, table)),
                            None,
                        ),
                    }
                })
        });

        Self {
            connection_id: connection_id.to_string(),
            mode,
            steps,
            state,
            get_handler,
            patch_handler,
            reload_handler,
            columns_handler,
        }
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn steps(&self) -> &[ScenarioStep] {
        &self.steps
    }

    pub fn get_handler(&self) -> &Handler {
        &self.get_handler
    }

    pub fn patch_handler(&self) -> &Handler {
        &self.patch_handler
    }

    pub fn reload_handler(&self) -> &Handler {
        &self.reload_handler
    }

    /// Columns endpoint, registered only for the columns-reload variant
    pub fn columns_handler(&self) -> Option<&Handler> {
        self.columns_handler.as_ref()
    }

    /// Current simulated upstream state
    pub fn upstream(&self) -> Option<SchemaConfigTestData> {
        lock_state(&self.state).upstream.clone()
    }

    fn begin_step(&self, step: &ScenarioStep) {
        let mut state = lock_state(&self.state);
        state.patches.clear();
        state.locked_changes.clear();
        match self.mode {
            ScenarioMode::Complex | ScenarioMode::ComplexWithColumnsReload => {
                state.upstream = Some(step.upstream.clone());
                state.reloadable = Some(step.upstream.clone());
            }
            ScenarioMode::OneStep => {
                state.upstream = None;
                state.reloadable = Some(step.upstream.clone());
            }
        }
    }

    fn finish_step(&self, index: usize, outcome: Result<()>) -> StepReport {
        let mut state = lock_state(&self.state);
        StepReport {
            index,
            patches: std::mem::take(&mut state.patches),
            locked_changes: std::mem::take(&mut state.locked_changes),
            error: outcome.err().map(|err| err.to_string()),
            upstream_after: state.upstream.clone(),
        }
    }

    /// Run every step through `apply`, the system under test
    ///
    /// `apply` receives the step index and the desired configuration. An
    /// error from `apply` is recorded in the step report and does not stop
    /// later steps.
    pub async fn run<F, Fut>(&self, mut apply: F) -> Result<ScenarioReport>
    where
        F: FnMut(usize, SchemaConfigTestData) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        if self.steps.is_empty() {
            return Err(MockError::scenario(0, "scenario has no steps"));
        }

        let mut report = ScenarioReport::default();
        for (index, step) in self.steps.iter().enumerate() {
            tracing::info!(
                connection_id = %self.connection_id,
                step = index,
                "running scenario step"
            );
            self.begin_step(step);

            let outcome = apply(index, step.desired.clone()).await;
            let step_report = self.finish_step(index, outcome);
            tracing::debug!(
                step = index,
                patches = step_report.patches.len(),
                error = step_report.error.as_deref().unwrap_or(""),
                "scenario step finished"
            );
            report.steps.push(step_report);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;
    use crate::config::Credentials;
    use serde_json::json;
    use url::Url;

    fn mock() -> MockHttpClient {
        MockHttpClient::new(Url::parse("https://api.fivetran.com").unwrap())
    }

    fn config(table_enabled: bool) -> SchemaConfigTestData {
        let mut data = SchemaConfigTestData::new("conn_id", "ALLOW_ALL");
        data.new_schema("schema_1", true)
            .new_table("table_1", table_enabled, None)
            .new_column("column_1", true, false, None);
        data
    }

    #[tokio::test]
    async fn test_patch_bodies_captured_per_step() {
        let mock = mock();
        let api = ApiClient::with_http_client(mock.clone(), Credentials::default());
        let scenario = setup_complex_test(
            &mock,
            "conn_id",
            vec![
                ScenarioStep::new(config(false), config(true)),
                ScenarioStep::consistent(config(true)),
            ],
        );

        let report = scenario
            .run(|_, desired| {
                let api = api.clone();
                async move {
                    let envelope = api.get("/v1/connections/conn_id/schemas").await?;
                    let data = envelope.data.unwrap_or_default();
                    let upstream = SchemaConfigTestData::from_json("conn_id", &data)?;
                    if let Some(patch) = desired.expected_patch(&upstream) {
                        api.patch("/v1/connections/conn_id/schemas", &patch).await?;
                    }
                    Ok::<(), MockError>(())
                }
            })
            .await
            .unwrap();

        assert_eq!(report.step(0).unwrap().patches.len(), 1);
        assert_eq!(
            report.step(0).unwrap().patches[0],
            json!({"schemas": {"schema_1": {"tables": {"table_1": {"enabled": false}}}}})
        );
        assert!(report.step(1).unwrap().patches.is_empty());
        assert_eq!(scenario.patch_handler().interactions(), 1);
        assert_eq!(scenario.get_handler().interactions(), 2);
    }

    #[tokio::test]
    async fn test_one_step_requires_reload() {
        let mock = mock();
        let api = ApiClient::with_http_client(mock.clone(), Credentials::default());
        let scenario = setup_one_step_test(&mock, "conn_id", config(true), config(true));

        let report = scenario
            .run(|_, _| {
                let api = api.clone();
                async move {
                    let err = api.get("/v1/connections/conn_id/schemas").await.unwrap_err();
                    assert_eq!(err.api_code(), Some("NotFound_SchemaConfig"));
                    let reload = json!({"exclude_mode": "PRESERVE"});
                    api.post("/v1/connections/conn_id/schemas/reload", &reload)
                        .await?;
                    api.get("/v1/connections/conn_id/schemas").await?;
                    Ok::<(), MockError>(())
                }
            })
            .await
            .unwrap();

        assert!(report.step(0).unwrap().succeeded());
        assert_eq!(scenario.reload_handler().interactions(), 1);
        assert_eq!(scenario.upstream(), Some(config(true)));
    }

    #[tokio::test]
    async fn test_columns_served_per_table() {
        let mock = mock();
        let api = ApiClient::with_http_client(mock.clone(), Credentials::default());
        let scenario = setup_complex_test_with_columns_reload(
            &mock,
            "conn_id",
            vec![ScenarioStep::consistent(config(true))],
        );

        scenario
            .run(|_, _| {
                let api = api.clone();
                async move {
                    let schemas = api.get("/v1/connections/conn_id/schemas").await?;
                    let data = schemas.data.unwrap_or_default();
                    let table_1 = &data["schemas"]["schema_1"]["tables"]["table_1"];
                    assert!(table_1.get("columns").is_none());

                    let columns = api
                        .get("/v1/connections/conn_id/schemas/schema_1/tables/table_1/columns")
                        .await?;
                    let columns = columns.data.unwrap_or_default();
                    assert_eq!(columns["columns"]["column_1"]["enabled"], true);
                    Ok::<(), MockError>(())
                }
            })
            .await
            .unwrap();

        assert_eq!(scenario.columns_handler().unwrap().interactions(), 1);
    }

    #[tokio::test]
    async fn test_empty_scenario_is_an_error() {
        let mock = mock();
        let scenario = setup_complex_test(&mock, "conn_id", Vec::new());
        let result = scenario.run(|_, _| async { Ok::<(), MockError>(()) }).await;
        assert!(matches!(result, Err(MockError::Scenario { step: 0, .. })));
    }
}
