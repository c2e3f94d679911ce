//! Probe clients exercising the mock harness the way a provider would
//!
//! [`SchemaConfigReconciler`] reconciles a desired schema configuration
//! against the remote API: it loads or reloads the upstream configuration,
//! refuses changes the API has locked, sends a minimal PATCH and retries
//! optimistic-lock conflicts. Calls for the same connection are serialised.
//! [`GroupMembership`] keeps a group's user list in sync.

use api_mock::{
    schema_conflict_backoff, ApiClient, ApiEnvelope, HttpClient, MockError, ResourceState, Result,
    SchemaConfigTestData,
};
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

/// Attempts made before a persisting conflict is returned to the caller
pub const DEFAULT_MAX_CONFLICT_ATTEMPTS: usize = 5;

/// Where the reconciler is in its read-modify-write cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    NotLoaded,
    Consistent,
    Drifted,
    ConflictPending,
}

/// Result of applying a desired configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Upstream already matched
    Unchanged,
    /// A PATCH was accepted after `attempts` tries
    Patched { attempts: usize },
    /// The connection no longer exists upstream
    Removed,
}

enum Upstream {
    Loaded(SchemaConfigTestData),
    ConnectionRemoved,
}

pub struct SchemaConfigReconciler<C: HttpClient> {
    api: ApiClient<C>,
    max_conflict_attempts: usize,
    connection_locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
    transitions: Arc<Mutex<Vec<ReconcileState>>>,
}

impl<C: HttpClient> Clone for SchemaConfigReconciler<C> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            max_conflict_attempts: self.max_conflict_attempts,
            connection_locks: Arc::clone(&self.connection_locks),
            transitions: Arc::clone(&self.transitions),
        }
    }
}

fn schemas_path(connection_id: &str) -> String {
    format!("/v1/connections/{}/schemas", connection_id)
}

impl<C: HttpClient> SchemaConfigReconciler<C> {
    pub fn new(api: ApiClient<C>) -> Self {
        Self {
            api,
            max_conflict_attempts: DEFAULT_MAX_CONFLICT_ATTEMPTS,
            connection_locks: Arc::new(Mutex::new(HashMap::new())),
            transitions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn with_max_conflict_attempts(mut self, attempts: usize) -> Self {
        self.max_conflict_attempts = attempts.max(1);
        self
    }

    /// Every state entered so far, in order
    pub fn transitions(&self) -> Vec<ReconcileState> {
        self.transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn enter(&self, state: ReconcileState) {
        tracing::debug!(?state, "reconcile state");
        self.transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(state);
    }

    fn connection_lock(&self, connection_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .connection_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(connection_id.to_string()).or_default())
    }

    async fn load(&self, connection_id: &str, wanted: &SchemaConfigTestData) -> Result<Upstream> {
        let path = schemas_path(connection_id);
        let data = match self.api.get(&path).await {
            Ok(envelope) => envelope.data.unwrap_or(Value::Null),
            Err(err) if err.api_code() == Some("NotFound_SchemaConfig") => {
                self.enter(ReconcileState::NotLoaded);
                let envelope = self
                    .api
                    .post(&format!("{}/reload", path), &json!({ "exclude_mode": "PRESERVE" }))
                    .await?;
                envelope.data.unwrap_or(Value::Null)
            }
            Err(err) if err.api_code() == Some("NotFound_Connection") => {
                return Ok(Upstream::ConnectionRemoved)
            }
            Err(err) => return Err(err),
        };

        let mut upstream = SchemaConfigTestData::from_json(connection_id, &data)?;
        self.reload_missing_columns(connection_id, &data, wanted, &mut upstream)
            .await?;
        Ok(Upstream::Loaded(upstream))
    }

    /// Fetch column maps the schema response left out for tables we manage columns of
    async fn reload_missing_columns(
        &self,
        connection_id: &str,
        data: &Value,
        wanted: &SchemaConfigTestData,
        upstream: &mut SchemaConfigTestData,
    ) -> Result<()> {
        for (schema_name, schema) in &wanted.schemas {
            for (table_name, table) in &schema.tables {
                let served = &data["schemas"][schema_name]["tables"][table_name];
                if table.columns.is_empty() || served.is_null() || served.get("columns").is_some() {
                    continue;
                }

                let envelope = self
                    .api
                    .get(&format!(
                        "{}/{}/tables/{}/columns",
                        schemas_path(connection_id),
                        schema_name,
                        table_name
                    ))
                    .await?;
                let columns = envelope.data.unwrap_or(Value::Null);
                if let Some(target) = upstream.table_mut(schema_name, table_name) {
                    target.merge_columns(&columns["columns"])?;
                }
            }
        }
        Ok(())
    }

    /// Bring the connection's schema configuration to `desired`
    pub async fn apply(&self, desired: &SchemaConfigTestData) -> Result<ApplyOutcome> {
        let connection_id = desired.connection_id.as_str();
        let lock = self.connection_lock(connection_id);
        let _guard = lock.lock().await;

        let mut attempts = 0;
        loop {
            let upstream = match self.load(connection_id, desired).await? {
                Upstream::Loaded(upstream) => upstream,
                Upstream::ConnectionRemoved => {
                    tracing::info!(connection_id, "connection removed upstream");
                    return Ok(ApplyOutcome::Removed);
                }
            };

            let locked = desired.locked_conflicts(&upstream);
            if !locked.is_empty() {
                return Err(MockError::general(format!(
                    "Cannot change the enabled state of locked entities on connection '{}': {}",
                    connection_id,
                    locked.join(", ")
                )));
            }

            let Some(patch) = desired.expected_patch(&upstream) else {
                self.enter(ReconcileState::Consistent);
                return Ok(if attempts == 0 {
                    ApplyOutcome::Unchanged
                } else {
                    ApplyOutcome::Patched { attempts }
                });
            };
            self.enter(ReconcileState::Drifted);

            attempts += 1;
            match self.api.patch(&schemas_path(connection_id), &patch).await {
                Ok(_) => {
                    self.enter(ReconcileState::Consistent);
                    return Ok(ApplyOutcome::Patched { attempts });
                }
                Err(err)
                    if err.api_code() == Some("Conflict")
                        && attempts < self.max_conflict_attempts =>
                {
                    self.enter(ReconcileState::ConflictPending);
                    tracing::debug!(connection_id, attempts, "schema patch conflict, retrying");
                    tokio::time::sleep(schema_conflict_backoff()).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Enable or disable one schema, serialised with every other call on the connection
    pub async fn apply_schema(
        &self,
        connection_id: &str,
        schema_name: &str,
        enabled: bool,
    ) -> Result<()> {
        let lock = self.connection_lock(connection_id);
        let _guard = lock.lock().await;

        self.api
            .patch(
                &format!("{}/{}", schemas_path(connection_id), schema_name),
                &json!({ "enabled": enabled }),
            )
            .await?;
        Ok(())
    }
}

type PendingCall<'a> = Pin<Box<dyn Future<Output = Result<ApiEnvelope>> + Send + 'a>>;

/// Keeps a group's members equal to a desired set of emails
pub struct GroupMembership<C: HttpClient> {
    api: ApiClient<C>,
}

impl<C: HttpClient> GroupMembership<C> {
    pub fn new(api: ApiClient<C>) -> Self {
        Self { api }
    }

    /// Current members as `(user_id, email)` pairs, across every page
    pub async fn members(&self, group_id: &str) -> Result<Vec<(String, String)>> {
        let items = self
            .api
            .list_all(&format!("/v1/groups/{}/users", group_id))
            .await?;
        items
            .iter()
            .map(|item| {
                let id = item["id"]
                    .as_str()
                    .ok_or_else(|| MockError::general("group member without id"))?;
                let email = item["email"].as_str().unwrap_or_default();
                Ok((id.to_string(), email.to_string()))
            })
            .collect()
    }

    /// Remove members not in `emails` and add missing ones with `role`
    ///
    /// Removals and additions are sent concurrently; the first failure is returned.
    pub async fn sync(&self, group_id: &str, emails: &[&str], role: &str) -> Result<()> {
        let current = self.members(group_id).await?;
        let members_path = format!("/v1/groups/{}/users", group_id);
        let mut pending: FuturesUnordered<PendingCall<'_>> = FuturesUnordered::new();

        for (user_id, email) in &current {
            if !emails.contains(&email.as_str()) {
                let path = format!("{}/{}", members_path, user_id);
                pending.push(Box::pin(async move { self.api.delete(&path).await }));
            }
        }

        for email in emails {
            if !current.iter().any(|(_, existing)| existing == email) {
                let body = json!({ "email": email, "role": role });
                let path = members_path.as_str();
                pending.push(Box::pin(async move { self.api.post(path, &body).await }));
            }
        }

        while let Some(result) = pending.next().await {
            result?;
        }
        Ok(())
    }

    /// Group state as an import would record it
    pub async fn import(&self, group_id: &str) -> Result<Vec<ResourceState>> {
        let envelope = self.api.get(&format!("/v1/groups/{}", group_id)).await?;
        let data = envelope.data.unwrap_or(Value::Null);
        Ok(vec![ResourceState::from_json(group_id, &data)])
    }
}
