use crate::error::{MockError, Result};
use crate::routing::pattern::PathPattern;
use crate::types::{ApiRequest, ApiResponse};
use reqwest::Method;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Response-producing closure attached to a route
pub type HandlerFn = Arc<dyn Fn(&mut ApiRequest) -> Result<ApiResponse> + Send + Sync>;

/// Handle to a registered route
///
/// Clones share the same closure slot and interaction counter, so the handle
/// returned at registration time observes every call the registry dispatches.
#[derive(Clone)]
pub struct Handler {
    method: Method,
    pattern: PathPattern,
    callback: Arc<RwLock<Option<HandlerFn>>>,
    interactions: Arc<AtomicUsize>,
}

impl Handler {
    pub(crate) fn new(method: Method, pattern: PathPattern) -> Self {
        Self {
            method,
            pattern,
            callback: Arc::new(RwLock::new(None)),
            interactions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Attach the closure that answers requests routed here
    pub fn then_call<F>(&self, callback: F) -> Self
    where
        F: Fn(&mut ApiRequest) -> Result<ApiResponse> + Send + Sync + 'static,
    {
        let mut slot = self
            .callback
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(callback));
        self.clone()
    }

    /// Number of requests this route has accepted
    pub fn interactions(&self) -> usize {
        self.interactions.load(Ordering::SeqCst)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub(crate) fn accepts(&self, method: &Method, path: &str) -> bool {
        self.method == *method && self.pattern.matches(path)
    }

    /// Count the interaction and run the closure on the calling thread
    pub(crate) fn invoke(&self, request: &mut ApiRequest) -> Result<ApiResponse> {
        self.interactions.fetch_add(1, Ordering::SeqCst);
        let callback = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match callback {
            Some(callback) => callback(request),
            None => Err(MockError::MissingHandler {
                method: self.method.to_string(),
                pattern: self.pattern.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("interactions", &self.interactions())
            .finish()
    }
}
