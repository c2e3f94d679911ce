use crate::config::HarnessConfig;
use crate::error::{MockError, Result};
use crate::routing::handler::Handler;
use crate::routing::pattern::PathPattern;
use crate::traits::HttpClient;
use crate::types::{ApiRequest, ApiResponse};
use chrono::{DateTime, Utc};
use comfy_table::{presets::ASCII_MARKDOWN, Table};
use reqwest::Method;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use url::Url;
use uuid::Uuid;

/// One request seen by the mock client
#[derive(Debug, Clone, Serialize)]
pub struct RecordedInteraction {
    pub request_id: Uuid,
    pub method: String,
    pub path: String,
    /// Pattern of the route that accepted the request, `None` when unmatched
    pub matched: Option<String>,
    /// Status of the produced response, `None` when the handler failed
    pub status: Option<u16>,
    pub received_at: DateTime<Utc>,
}

/// In-process stand-in for the remote API
///
/// Requests are matched against registered routes and answered by the
/// route's closure on the calling thread. Clones share routes and journal.
#[derive(Clone)]
pub struct MockHttpClient {
    base_url: Url,
    routes: Arc<RwLock<Vec<Handler>>>,
    journal: Arc<Mutex<Vec<RecordedInteraction>>>,
}

impl MockHttpClient {
    /// Create an empty mock client answering for `base_url`
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            routes: Arc::new(RwLock::new(Vec::new())),
            journal: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create an empty mock client for the configured base URL
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        Ok(Self::new(config.parsed_base_url()?))
    }

    /// Remove every route, counter and recorded interaction
    pub fn reset(&self) {
        self.routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!("mock client reset");
    }

    /// Register a route for an exact method and path
    pub fn when(&self, method: Method, path: &str) -> Handler {
        self.register(Handler::new(method, PathPattern::exact(path)))
    }

    /// Register a route for every path sharing a prefix, e.g. `/v1/groups/group_id/users/*`
    pub fn when_wc(&self, method: Method, pattern: &str) -> Handler {
        self.register(Handler::new(method, PathPattern::wildcard(pattern)))
    }

    fn register(&self, handler: Handler) -> Handler {
        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        routes.retain(|existing| {
            !(existing.method() == handler.method() && existing.pattern() == handler.pattern())
        });
        tracing::debug!(
            method = %handler.method(),
            pattern = %handler.pattern(),
            "route registered"
        );
        routes.push(handler.clone());
        handler
    }

    /// Number of registered routes
    pub fn route_count(&self) -> usize {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Most specific route accepting `method` and `path`
    pub fn find_route(&self, method: &Method, path: &str) -> Option<Handler> {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|route| route.accepts(method, path))
            .max_by_key(|route| route.pattern().specificity())
            .cloned()
    }

    /// Route a request to its handler and return the handler's response
    ///
    /// The routes lock is released before the closure runs, so closures may
    /// execute concurrently and may register further routes.
    pub fn dispatch(&self, request: &mut ApiRequest) -> Result<ApiResponse> {
        let path = request.path().to_string();
        let route = self.find_route(&request.method, &path);

        let Some(route) = route else {
            tracing::warn!(method = %request.method, path = %path, "no route registered");
            self.record(request, None, None);
            return Err(MockError::UnmatchedRoute {
                method: request.method.to_string(),
                path,
            });
        };

        tracing::debug!(
            method = %request.method,
            path = %path,
            pattern = %route.pattern(),
            "dispatching"
        );
        let result = route.invoke(request);
        let status = result.as_ref().ok().map(|response| response.status);
        self.record(request, Some(route.pattern().to_string()), status);
        result
    }

    fn record(&self, request: &ApiRequest, matched: Option<String>, status: Option<u16>) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedInteraction {
                request_id: request.id,
                method: request.method.to_string(),
                path: request.path().to_string(),
                matched,
                status,
                received_at: request.received_at,
            });
    }

    /// Every request seen since the last reset, in arrival order
    pub fn received_requests(&self) -> Vec<RecordedInteraction> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Table of registered routes and their interaction counts
    pub fn interaction_report(&self) -> String {
        let mut table = Table::new();
        table.load_preset(ASCII_MARKDOWN);
        table.set_header(vec!["Method", "Pattern", "Interactions"]);

        for route in self
            .routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            table.add_row(vec![
                route.method().to_string(),
                route.pattern().to_string(),
                route.interactions().to_string(),
            ]);
        }

        table.to_string()
    }
}

impl HttpClient for MockHttpClient {
    async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        self.dispatch(&mut request)
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::build_success_response;
    use serde_json::json;

    fn client() -> MockHttpClient {
        MockHttpClient::new(Url::parse("https://api.fivetran.com").unwrap())
    }

    fn request(method: Method, path: &str) -> ApiRequest {
        ApiRequest::new(
            method,
            Url::parse(&format!("https://api.fivetran.com{}", path)).unwrap(),
        )
    }

    #[test]
    fn test_reset_unregisters_routes() {
        let client = client();
        client
            .when(Method::GET, "/v1/groups/group_id")
            .then_call(|req| {
                build_success_response(req, 200, None, Some(json!({"id": "group_id"})))
            });
        assert!(client.dispatch(&mut request(Method::GET, "/v1/groups/group_id")).is_ok());

        client.reset();
        client.reset();

        let err = client
            .dispatch(&mut request(Method::GET, "/v1/groups/group_id"))
            .unwrap_err();
        assert!(matches!(err, MockError::UnmatchedRoute { .. }));
        assert_eq!(client.route_count(), 0);
        assert_eq!(client.received_requests().len(), 1);
    }

    #[test]
    fn test_exact_route_preferred_over_wildcard() {
        let client = client();
        let wildcard = client
            .when_wc(Method::DELETE, "/v1/groups/group_id/users/*")
            .then_call(|req| build_success_response(req, 200, Some("wildcard"), None));
        let exact = client
            .when(Method::DELETE, "/v1/groups/group_id/users/special")
            .then_call(|req| build_success_response(req, 200, Some("exact"), None));

        let response = client
            .dispatch(&mut request(Method::DELETE, "/v1/groups/group_id/users/special"))
            .unwrap();
        assert_eq!(response.envelope().unwrap().message.as_deref(), Some("exact"));

        client
            .dispatch(&mut request(Method::DELETE, "/v1/groups/group_id/users/other"))
            .unwrap();
        assert_eq!(exact.interactions(), 1);
        assert_eq!(wildcard.interactions(), 1);
    }

    #[test]
    fn test_method_must_match() {
        let client = client();
        let handler = client
            .when(Method::GET, "/v1/users")
            .then_call(|req| build_success_response(req, 200, None, None));

        assert!(client.dispatch(&mut request(Method::POST, "/v1/users")).is_err());
        assert_eq!(handler.interactions(), 0);
    }

    #[test]
    fn test_reregistration_replaces_route() {
        let client = client();
        let first = client
            .when(Method::GET, "/v1/users")
            .then_call(|req| build_success_response(req, 200, Some("first"), None));
        let second = client
            .when(Method::GET, "/v1/users")
            .then_call(|req| build_success_response(req, 200, Some("second"), None));

        let response = client.dispatch(&mut request(Method::GET, "/v1/users")).unwrap();
        assert_eq!(response.envelope().unwrap().message.as_deref(), Some("second"));
        assert_eq!(first.interactions(), 0);
        assert_eq!(second.interactions(), 1);
        assert_eq!(client.route_count(), 1);
    }

    #[test]
    fn test_journal_and_report() {
        let client = client();
        client
            .when(Method::GET, "/v1/users")
            .then_call(|req| build_success_response(req, 200, None, None));
        client.dispatch(&mut request(Method::GET, "/v1/users")).unwrap();

        let journal = client.received_requests();
        assert_eq!(journal[0].matched.as_deref(), Some("/v1/users"));
        assert_eq!(journal[0].status, Some(200));

        let report = client.interaction_report();
        assert!(report.contains("/v1/users"));
        assert!(report.contains("Interactions"));
    }

    #[test]
    fn test_execute_through_trait() {
        let client = client();
        client
            .when(Method::GET, "/v1/users")
            .then_call(|req| build_success_response(req, 200, None, None));

        let response =
            tokio_test::block_on(client.execute(request(Method::GET, "/v1/users"))).unwrap();
        assert!(response.is_success());
    }
}
