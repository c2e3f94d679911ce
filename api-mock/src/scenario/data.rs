//! In-memory schema configuration trees
//!
//! One [`SchemaConfigTestData`] renders the Terraform configuration, the
//! desired JSON configuration and the upstream API response of the same
//! tree, and can compute the minimal PATCH body that moves an upstream tree
//! towards it. Maps are ordered, so every rendering lists entities in the
//! same order.

use crate::error::{MockError, Result};
use crate::json::JsonExt;
use serde_json::{json, Map, Value};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

pub const SYSTEM_TABLE_REASON_CODE: &str = "SYSTEM_TABLE";
pub const SYSTEM_COLUMN_REASON_CODE: &str = "SYSTEM_COLUMN";

const DEFAULT_SCHEMA_CHANGE_HANDLING: &str = "ALLOW_ALL";

/// Server-side refusal to change an entity's `enabled` flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchLock {
    pub reason_code: String,
    pub reason: String,
}

impl PatchLock {
    fn system_table() -> Self {
        Self {
            reason_code: SYSTEM_TABLE_REASON_CODE.to_string(),
            reason: "The table does not support exclusion".to_string(),
        }
    }

    fn system_column() -> Self {
        Self {
            reason_code: SYSTEM_COLUMN_REASON_CODE.to_string(),
            reason: "The column does not support exclusion".to_string(),
        }
    }
}

fn patch_settings_json(lock: Option<&PatchLock>) -> Value {
    match lock {
        None => json!({ "allowed": true }),
        Some(lock) => json!({
            "allowed": false,
            "reason_code": lock.reason_code,
            "reason": lock.reason,
        }),
    }
}

fn parse_lock(entity: &Value) -> Result<Option<PatchLock>> {
    let Some(settings) = entity
        .get("enabled_patch_settings")
        .filter(|settings| !settings.is_null())
    else {
        return Ok(None);
    };

    if settings.opt_bool_field("allowed")?.unwrap_or(true) {
        return Ok(None);
    }
    Ok(Some(PatchLock {
        reason_code: settings
            .opt_str_field("reason_code")?
            .unwrap_or_default()
            .to_string(),
        reason: settings.opt_str_field("reason")?.unwrap_or_default().to_string(),
    }))
}

fn upsert<T>(map: &mut BTreeMap<String, T>, name: String, value: T) -> &mut T {
    match map.entry(name) {
        Entry::Occupied(entry) => {
            let slot = entry.into_mut();
            *slot = value;
            slot
        }
        Entry::Vacant(entry) => entry.insert(value),
    }
}

fn push_line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(text);
    out.push('\n');
}

fn locked_error(kind: &str, path: &str, lock: &PatchLock) -> MockError {
    MockError::general(format!(
        "{} '{}' does not allow changing its enabled state ({}): {}",
        kind, path, lock.reason_code, lock.reason
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTestData {
    pub name: String,
    pub enabled: bool,
    pub hashed: bool,
    pub is_primary_key: Option<bool>,
    pub lock: Option<PatchLock>,
}

impl ColumnTestData {
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.enabled = enabled;
        self
    }

    pub fn set_hashed(&mut self, hashed: bool) -> &mut Self {
        self.hashed = hashed;
        self
    }

    fn json_config(&self) -> Value {
        let mut value = json!({ "enabled": self.enabled, "hashed": self.hashed });
        if let Some(is_primary_key) = self.is_primary_key {
            value["is_primary_key"] = Value::Bool(is_primary_key);
        }
        value
    }

    fn json_response(&self) -> Value {
        let mut value = json!({
            "name_in_destination": self.name,
            "enabled": self.enabled,
            "hashed": self.hashed,
            "enabled_patch_settings": patch_settings_json(self.lock.as_ref()),
        });
        if let Some(is_primary_key) = self.is_primary_key {
            value["is_primary_key"] = Value::Bool(is_primary_key);
        }
        value
    }

    fn from_json(name: &str, value: &Value) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            enabled: value.opt_bool_field("enabled")?.unwrap_or(true),
            hashed: value.opt_bool_field("hashed")?.unwrap_or(false),
            is_primary_key: value.opt_bool_field("is_primary_key")?,
            lock: parse_lock(value)?,
        })
    }

    fn render_hcl(&self, out: &mut String, depth: usize) {
        push_line(out, depth, &format!("\"{}\" = {{", self.name));
        push_line(out, depth + 1, &format!("enabled = {}", self.enabled));
        push_line(out, depth + 1, &format!("hashed = {}", self.hashed));
        if let Some(is_primary_key) = self.is_primary_key {
            push_line(out, depth + 1, &format!("is_primary_key = {}", is_primary_key));
        }
        push_line(out, depth, "}");
    }

    /// Changed fields only; a differing `enabled` on a locked column is left out
    fn patch_from(&self, upstream: &ColumnTestData) -> Option<Value> {
        let mut patch = Map::new();
        if self.enabled != upstream.enabled && !upstream.is_locked() {
            patch.insert("enabled".to_string(), Value::Bool(self.enabled));
        }
        if self.hashed != upstream.hashed {
            patch.insert("hashed".to_string(), Value::Bool(self.hashed));
        }
        if let Some(is_primary_key) = self.is_primary_key {
            if upstream.is_primary_key != Some(is_primary_key) {
                patch.insert("is_primary_key".to_string(), Value::Bool(is_primary_key));
            }
        }
        (!patch.is_empty()).then_some(Value::Object(patch))
    }

    fn apply_patch(&mut self, patch: &Value, path: &str) -> Result<()> {
        if let Some(enabled) = patch.opt_bool_field("enabled")? {
            if enabled != self.enabled {
                if let Some(lock) = &self.lock {
                    return Err(locked_error("Column", path, lock));
                }
                self.enabled = enabled;
            }
        }
        if let Some(hashed) = patch.opt_bool_field("hashed")? {
            self.hashed = hashed;
        }
        if let Some(is_primary_key) = patch.opt_bool_field("is_primary_key")? {
            self.is_primary_key = Some(is_primary_key);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTestData {
    pub name: String,
    pub enabled: bool,
    pub sync_mode: Option<String>,
    pub lock: Option<PatchLock>,
    pub columns: BTreeMap<String, ColumnTestData>,
}

impl TableTestData {
    /// Add or replace a column
    pub fn new_column(
        &mut self,
        name: &str,
        enabled: bool,
        hashed: bool,
        is_primary_key: Option<bool>,
    ) -> &mut ColumnTestData {
        let column = ColumnTestData {
            name: name.to_string(),
            enabled,
            hashed,
            is_primary_key,
            lock: None,
        };
        upsert(&mut self.columns, name.to_string(), column)
    }

    /// Add or replace a column whose enabled flag the API refuses to change
    pub fn new_column_locked(
        &mut self,
        name: &str,
        enabled: bool,
        hashed: bool,
        is_primary_key: Option<bool>,
    ) -> &mut ColumnTestData {
        let column = self.new_column(name, enabled, hashed, is_primary_key);
        column.lock = Some(PatchLock::system_column());
        column
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnTestData> {
        self.columns.get_mut(name)
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.enabled = enabled;
        self
    }

    pub fn set_sync_mode(&mut self, sync_mode: Option<&str>) -> &mut Self {
        self.sync_mode = sync_mode.map(str::to_string);
        self
    }

    fn json_config(&self) -> Value {
        let mut value = json!({ "enabled": self.enabled });
        if let Some(sync_mode) = &self.sync_mode {
            value["sync_mode"] = Value::String(sync_mode.clone());
        }
        if !self.columns.is_empty() {
            let columns: Map<String, Value> = self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.json_config()))
                .collect();
            value["columns"] = Value::Object(columns);
        }
        value
    }

    fn json_response(&self, include_columns: bool) -> Value {
        let mut value = json!({
            "name_in_destination": self.name,
            "enabled": self.enabled,
            "enabled_patch_settings": patch_settings_json(self.lock.as_ref()),
        });
        if let Some(sync_mode) = &self.sync_mode {
            value["sync_mode"] = Value::String(sync_mode.clone());
        }
        if include_columns {
            value["columns"] = self.columns_response();
        }
        value
    }

    fn columns_response(&self) -> Value {
        Value::Object(
            self.columns
                .iter()
                .map(|(name, column)| (name.clone(), column.json_response()))
                .collect(),
        )
    }

    fn from_json(name: &str, value: &Value) -> Result<Self> {
        let mut table = Self {
            name: name.to_string(),
            enabled: value.opt_bool_field("enabled")?.unwrap_or(true),
            sync_mode: value.opt_str_field("sync_mode")?.map(str::to_string),
            lock: parse_lock(value)?,
            columns: BTreeMap::new(),
        };
        if let Some(columns) = value.get("columns").filter(|columns| !columns.is_null()) {
            table.merge_columns(columns)?;
        }
        Ok(table)
    }

    /// Replace columns from a `{name: column}` response map
    pub fn merge_columns(&mut self, columns: &Value) -> Result<()> {
        for (name, column) in columns.as_object_or_err()? {
            self.columns
                .insert(name.clone(), ColumnTestData::from_json(name, column)?);
        }
        Ok(())
    }

    fn render_hcl(&self, out: &mut String, depth: usize) {
        push_line(out, depth, &format!("\"{}\" = {{", self.name));
        push_line(out, depth + 1, &format!("enabled = {}", self.enabled));
        if let Some(sync_mode) = &self.sync_mode {
            push_line(out, depth + 1, &format!("sync_mode = \"{}\"", sync_mode));
        }
        if !self.columns.is_empty() {
            push_line(out, depth + 1, "columns = {");
            for column in self.columns.values() {
                column.render_hcl(out, depth + 2);
            }
            push_line(out, depth + 1, "}");
        }
        push_line(out, depth, "}");
    }

    fn patch_from(&self, upstream: &TableTestData) -> Option<Value> {
        let mut patch = Map::new();
        if self.enabled != upstream.enabled && !upstream.is_locked() {
            patch.insert("enabled".to_string(), Value::Bool(self.enabled));
        }
        if let Some(sync_mode) = &self.sync_mode {
            if upstream.sync_mode.as_ref() != Some(sync_mode) {
                patch.insert("sync_mode".to_string(), Value::String(sync_mode.clone()));
            }
        }

        let mut columns = Map::new();
        for (name, column) in &self.columns {
            let change = match upstream.columns.get(name) {
                Some(existing) => column.patch_from(existing),
                None => Some(column.json_config()),
            };
            if let Some(change) = change {
                columns.insert(name.clone(), change);
            }
        }
        if !columns.is_empty() {
            patch.insert("columns".to_string(), Value::Object(columns));
        }

        (!patch.is_empty()).then_some(Value::Object(patch))
    }

    fn apply_patch(&mut self, patch: &Value, path: &str) -> Result<()> {
        if let Some(enabled) = patch.opt_bool_field("enabled")? {
            if enabled != self.enabled {
                if let Some(lock) = &self.lock {
                    return Err(locked_error("Table", path, lock));
                }
                self.enabled = enabled;
            }
        }
        if let Some(sync_mode) = patch.opt_str_field("sync_mode")? {
            self.sync_mode = Some(sync_mode.to_string());
        }
        if let Some(columns) = patch.get("columns").filter(|columns| !columns.is_null()) {
            for (name, column_patch) in columns.as_object_or_err()? {
                let column_path = format!("{}.{}", path, name);
                let column = self
                    .columns
                    .entry(name.clone())
                    .or_insert_with(|| ColumnTestData {
                        name: name.clone(),
                        enabled: true,
                        hashed: false,
                        is_primary_key: None,
                        lock: None,
                    });
                column.apply_patch(column_patch, &column_path)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTestData {
    pub name: String,
    pub enabled: bool,
    pub tables: BTreeMap<String, TableTestData>,
}

impl SchemaTestData {
    /// Add or replace a table
    pub fn new_table(
        &mut self,
        name: &str,
        enabled: bool,
        sync_mode: Option<&str>,
    ) -> &mut TableTestData {
        let table = TableTestData {
            name: name.to_string(),
            enabled,
            sync_mode: sync_mode.map(str::to_string),
            lock: None,
            columns: BTreeMap::new(),
        };
        upsert(&mut self.tables, name.to_string(), table)
    }

    /// Add or replace a table whose enabled flag the API refuses to change
    pub fn new_table_locked(
        &mut self,
        name: &str,
        enabled: bool,
        sync_mode: Option<&str>,
    ) -> &mut TableTestData {
        let table = self.new_table(name, enabled, sync_mode);
        table.lock = Some(PatchLock::system_table());
        table
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut TableTestData> {
        self.tables.get_mut(name)
    }

    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.enabled = enabled;
        self
    }

    fn json_config(&self) -> Value {
        let mut value = json!({ "enabled": self.enabled });
        if !self.tables.is_empty() {
            let tables: Map<String, Value> = self
                .tables
                .iter()
                .map(|(name, table)| (name.clone(), table.json_config()))
                .collect();
            value["tables"] = Value::Object(tables);
        }
        value
    }

    fn json_response(&self, include_columns: bool) -> Value {
        let tables: Map<String, Value> = self
            .tables
            .iter()
            .map(|(name, table)| (name.clone(), table.json_response(include_columns)))
            .collect();
        json!({
            "name_in_destination": self.name,
            "enabled": self.enabled,
            "tables": tables,
        })
    }

    fn from_json(name: &str, value: &Value) -> Result<Self> {
        let mut schema = Self {
            name: name.to_string(),
            enabled: value.opt_bool_field("enabled")?.unwrap_or(true),
            tables: BTreeMap::new(),
        };
        if let Some(tables) = value.get("tables").filter(|tables| !tables.is_null()) {
            for (table_name, table) in tables.as_object_or_err()? {
                schema
                    .tables
                    .insert(table_name.clone(), TableTestData::from_json(table_name, table)?);
            }
        }
        Ok(schema)
    }

    fn render_hcl(&self, out: &mut String, depth: usize) {
        push_line(out, depth, &format!("\"{}\" = {{", self.name));
        push_line(out, depth + 1, &format!("enabled = {}", self.enabled));
        if !self.tables.is_empty() {
            push_line(out, depth + 1, "tables = {");
            for table in self.tables.values() {
                table.render_hcl(out, depth + 2);
            }
            push_line(out, depth + 1, "}");
        }
        push_line(out, depth, "}");
    }

    fn patch_from(&self, upstream: &SchemaTestData) -> Option<Value> {
        let mut patch = Map::new();
        if self.enabled != upstream.enabled {
            patch.insert("enabled".to_string(), Value::Bool(self.enabled));
        }

        let mut tables = Map::new();
        for (name, table) in &self.tables {
            let change = match upstream.tables.get(name) {
                Some(existing) => table.patch_from(existing),
                None => Some(table.json_config()),
            };
            if let Some(change) = change {
                tables.insert(name.clone(), change);
            }
        }
        if !tables.is_empty() {
            patch.insert("tables".to_string(), Value::Object(tables));
        }

        (!patch.is_empty()).then_some(Value::Object(patch))
    }

    fn apply_patch(&mut self, patch: &Value) -> Result<()> {
        if let Some(enabled) = patch.opt_bool_field("enabled")? {
            self.enabled = enabled;
        }
        if let Some(tables) = patch.get("tables").filter(|tables| !tables.is_null()) {
            for (name, table_patch) in tables.as_object_or_err()? {
                let path = format!("{}.{}", self.name, name);
                let table = self
                    .tables
                    .entry(name.clone())
                    .or_insert_with(|| TableTestData {
                        name: name.clone(),
                        enabled: true,
                        sync_mode: None,
                        lock: None,
                        columns: BTreeMap::new(),
                    });
                table.apply_patch(table_patch, &path)?;
            }
        }
        Ok(())
    }
}

/// Schema configuration of one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConfigTestData {
    pub connection_id: String,
    pub schema_change_handling: String,
    pub schemas: BTreeMap<String, SchemaTestData>,
}

impl SchemaConfigTestData {
    pub fn new(connection_id: &str, schema_change_handling: &str) -> Self {
        Self {
            connection_id: connection_id.to_string(),
            schema_change_handling: schema_change_handling.to_string(),
            schemas: BTreeMap::new(),
        }
    }

    /// Add or replace a schema
    pub fn new_schema(&mut self, name: &str, enabled: bool) -> &mut SchemaTestData {
        let schema = SchemaTestData {
            name: name.to_string(),
            enabled,
            tables: BTreeMap::new(),
        };
        upsert(&mut self.schemas, name.to_string(), schema)
    }

    pub fn schema_mut(&mut self, name: &str) -> Option<&mut SchemaTestData> {
        self.schemas.get_mut(name)
    }

    pub fn table(&self, schema: &str, table: &str) -> Option<&TableTestData> {
        self.schemas.get(schema)?.tables.get(table)
    }

    pub fn table_mut(&mut self, schema: &str, table: &str) -> Option<&mut TableTestData> {
        self.schemas.get_mut(schema)?.tables.get_mut(table)
    }

    pub fn column_mut(
        &mut self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Option<&mut ColumnTestData> {
        self.table_mut(schema, table)?.columns.get_mut(column)
    }

    /// Terraform configuration of a `fivetran_connector_schema_config` resource
    pub fn tf_config(&self) -> String {
        let mut out = String::new();
        push_line(
            &mut out,
            0,
            "resource \"fivetran_connector_schema_config\" \"test_schema\" {",
        );
        push_line(&mut out, 1, "provider = fivetran-provider");
        out.push('\n');
        push_line(&mut out, 1, &format!("connector_id = \"{}\"", self.connection_id));
        push_line(
            &mut out,
            1,
            &format!("schema_change_handling = \"{}\"", self.schema_change_handling),
        );
        if !self.schemas.is_empty() {
            push_line(&mut out, 1, "schemas = {");
            for schema in self.schemas.values() {
                schema.render_hcl(&mut out, 2);
            }
            push_line(&mut out, 1, "}");
        }
        push_line(&mut out, 0, "}");
        out
    }

    /// Desired configuration as a JSON body
    pub fn json_config(&self) -> Value {
        let schemas: Map<String, Value> = self
            .schemas
            .iter()
            .map(|(name, schema)| (name.clone(), schema.json_config()))
            .collect();
        json!({
            "schema_change_handling": self.schema_change_handling,
            "schemas": schemas,
        })
    }

    /// The `data` of a `GET /v1/connections/{id}/schemas` response
    pub fn json_response(&self) -> Value {
        self.render_response(true)
    }

    /// Response data with column maps left out, as served for large schemas
    pub fn json_response_without_columns(&self) -> Value {
        self.render_response(false)
    }

    fn render_response(&self, include_columns: bool) -> Value {
        let schemas: Map<String, Value> = self
            .schemas
            .iter()
            .map(|(name, schema)| (name.clone(), schema.json_response(include_columns)))
            .collect();
        json!({
            "schema_change_handling": self.schema_change_handling,
            "schemas": schemas,
        })
    }

    /// The `data` of a `GET .../tables/{table}/columns` response
    pub fn columns_response(&self, schema: &str, table: &str) -> Option<Value> {
        let table = self.table(schema, table)?;
        Some(json!({ "columns": table.columns_response() }))
    }

    /// Parse response data back into a tree
    pub fn from_json(connection_id: &str, data: &Value) -> Result<Self> {
        let mut config = Self::new(
            connection_id,
            data.opt_str_field("schema_change_handling")?
                .unwrap_or(DEFAULT_SCHEMA_CHANGE_HANDLING),
        );
        if let Some(schemas) = data.get("schemas").filter(|schemas| !schemas.is_null()) {
            for (name, schema) in schemas.as_object_or_err()? {
                config
                    .schemas
                    .insert(name.clone(), SchemaTestData::from_json(name, schema)?);
            }
        }
        Ok(config)
    }

    /// Apply a PATCH body; nothing changes if any part is rejected
    ///
    /// Missing schemas, tables and columns are created. Changing the
    /// enabled flag of a locked table or column is an error.
    pub fn apply_patch(&mut self, body: &Value) -> Result<()> {
        let mut next = self.clone();

        if let Some(handling) = body.opt_str_field("schema_change_handling")? {
            next.schema_change_handling = handling.to_string();
        }
        if let Some(schemas) = body.get("schemas").filter(|schemas| !schemas.is_null()) {
            for (name, schema_patch) in schemas.as_object_or_err()? {
                let schema = next
                    .schemas
                    .entry(name.clone())
                    .or_insert_with(|| SchemaTestData {
                        name: name.clone(),
                        enabled: true,
                        tables: BTreeMap::new(),
                    });
                schema.apply_patch(schema_patch)?;
            }
        }

        *self = next;
        Ok(())
    }

    /// Minimal PATCH body moving `upstream` to this tree, `None` when consistent
    ///
    /// Entities present upstream but not here are left alone. Enabled flag
    /// changes on locked entities are never included; see
    /// [`Self::locked_conflicts`].
    pub fn expected_patch(&self, upstream: &SchemaConfigTestData) -> Option<Value> {
        let mut patch = Map::new();
        if self.schema_change_handling != upstream.schema_change_handling {
            patch.insert(
                "schema_change_handling".to_string(),
                Value::String(self.schema_change_handling.clone()),
            );
        }

        let mut schemas = Map::new();
        for (name, schema) in &self.schemas {
            let change = match upstream.schemas.get(name) {
                Some(existing) => schema.patch_from(existing),
                None => Some(schema.json_config()),
            };
            if let Some(change) = change {
                schemas.insert(name.clone(), change);
            }
        }
        if !schemas.is_empty() {
            patch.insert("schemas".to_string(), Value::Object(schemas));
        }

        (!patch.is_empty()).then_some(Value::Object(patch))
    }

    /// Paths of locked entities whose enabled flag differs between this tree and `upstream`
    pub fn locked_conflicts(&self, upstream: &SchemaConfigTestData) -> Vec<String> {
        let mut conflicts = Vec::new();
        for (schema_name, schema) in &self.schemas {
            let Some(upstream_schema) = upstream.schemas.get(schema_name) else {
                continue;
            };
            for (table_name, table) in &schema.tables {
                let Some(upstream_table) = upstream_schema.tables.get(table_name) else {
                    continue;
                };
                if upstream_table.is_locked() && table.enabled != upstream_table.enabled {
                    conflicts.push(format!("{}.{}", schema_name, table_name));
                }
                for (column_name, column) in &table.columns {
                    if let Some(upstream_column) = upstream_table.columns.get(column_name) {
                        if upstream_column.is_locked()
                            && column.enabled != upstream_column.enabled
                        {
                            conflicts.push(format!(
                                "{}.{}.{}",
                                schema_name, table_name, column_name
                            ));
                        }
                    }
                }
            }
        }
        conflicts
    }

    /// Paths of locked entities in this tree whose enabled flag `body` tries to change
    pub fn locked_changes(&self, body: &Value) -> Vec<String> {
        let mut changes = Vec::new();
        let Some(schemas) = body.get("schemas").and_then(Value::as_object) else {
            return changes;
        };

        for (schema_name, schema_patch) in schemas {
            let Some(tables) = schema_patch.get("tables").and_then(Value::as_object) else {
                continue;
            };
            for (table_name, table_patch) in tables {
                let Some(table) = self.table(schema_name, table_name) else {
                    continue;
                };
                let requested = table_patch.get("enabled").and_then(Value::as_bool);
                if table.is_locked() && requested.is_some_and(|enabled| enabled != table.enabled) {
                    changes.push(format!("{}.{}", schema_name, table_name));
                }

                let Some(columns) = table_patch.get("columns").and_then(Value::as_object) else {
                    continue;
                };
                for (column_name, column_patch) in columns {
                    let Some(column) = table.columns.get(column_name) else {
                        continue;
                    };
                    let requested = column_patch.get("enabled").and_then(Value::as_bool);
                    if column.is_locked()
                        && requested.is_some_and(|enabled| enabled != column.enabled)
                    {
                        changes.push(format!("{}.{}.{}", schema_name, table_name, column_name));
                    }
                }
            }
        }
        changes
    }

    /// Dotted paths of every schema, table and column, depth first
    pub fn entity_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (schema_name, schema) in &self.schemas {
            paths.push(schema_name.clone());
            for (table_name, table) in &schema.tables {
                paths.push(format!("{}.{}", schema_name, table_name));
                for column_name in table.columns.keys() {
                    paths.push(format!("{}.{}.{}", schema_name, table_name, column_name));
                }
            }
        }
        paths
    }
}
