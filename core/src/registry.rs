//! Tool trait and registry.
//!
//! RULE: Every tool call opens its own store connection through
//! `ToolContext::open_store` and drops it before returning, success or
//! failure. Tools never hold a connection between calls.

use crate::{
    catalog,
    clock::{Clock, SystemClock},
    config::DeskConfig,
    error::{DeskError, DeskResult},
    seed,
    store::DeskStore,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Everything a tool invocation needs besides its arguments.
pub struct ToolContext {
    config: DeskConfig,
    clock: Box<dyn Clock>,
}

impl ToolContext {
    pub fn new(config: DeskConfig, clock: impl Clock + 'static) -> Self {
        Self {
            config,
            clock: Box::new(clock),
        }
    }

    pub fn system(config: DeskConfig) -> Self {
        Self::new(config, SystemClock)
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Open the configured database, bring the schema up to date and seed
    /// the demo data on first use.
    pub fn open_store(&self) -> DeskResult<DeskStore> {
        let store = DeskStore::open(&self.config.db_path)?;
        store.migrate()?;
        seed::seed_if_empty(&store, self.now())?;
        Ok(store)
    }
}

/// A single named operation exposed to the host agent.
pub trait Tool {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value;
    fn invoke(&self, ctx: &ToolContext, args: &Value) -> DeskResult<Value>;
}

pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// A registry holding every desk tool.
    pub fn with_desk_tools() -> Self {
        let mut registry = Self::new();
        catalog::register_all(&mut registry);
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Tool names in sorted order.
    pub fn list(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    /// `{name, description, parameters}` per tool, for the host's tool list.
    pub fn definitions(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|t| {
                json!({
                    "name": t.name(),
                    "description": t.description(),
                    "parameters": t.parameters(),
                })
            })
            .collect()
    }

    /// Invoke a tool by name. Always yields a JSON object: tool payloads
    /// pass through, errors become `{"success": false, "error": ...}`.
    pub fn call(&self, ctx: &ToolContext, name: &str, args: &Value) -> Value {
        let result = match self.get(name) {
            Some(tool) => tool.invoke(ctx, args),
            None => Err(DeskError::UnknownTool {
                name: name.to_string(),
            }),
        };
        match result {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Tool '{name}' failed: {e}");
                failure(&e)
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ── Payload envelopes ────────────────────────────────────────────────

/// Serialize `payload` (which must be a JSON object) and mark it successful.
pub fn success(payload: impl Serialize) -> DeskResult<Value> {
    with_success(serde_json::to_value(payload)?, true)
}

/// Mark an already-built object with the given success flag.
pub fn with_success(payload: Value, ok: bool) -> DeskResult<Value> {
    match payload {
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len() + 1);
            out.insert("success".into(), Value::Bool(ok));
            out.extend(fields);
            Ok(Value::Object(out))
        }
        other => Err(DeskError::Other(anyhow::anyhow!(
            "tool payload must be a JSON object, got {other}"
        ))),
    }
}

pub fn failure(error: &DeskError) -> Value {
    json!({
        "success": false,
        "error": error.to_string(),
        "error_kind": error.kind(),
    })
}

// ── Argument extraction ──────────────────────────────────────────────

fn invalid(name: &str, reason: &str) -> DeskError {
    DeskError::InvalidArgument {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// A present, non-null argument. `null` counts as absent.
fn present<'a>(args: &'a Value, name: &str) -> Option<&'a Value> {
    args.get(name).filter(|v| !v.is_null())
}

pub fn optional_str<'a>(args: &'a Value, name: &str) -> DeskResult<Option<&'a str>> {
    match present(args, name) {
        None => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(invalid(name, "expected a string")),
    }
}

pub fn required_str<'a>(args: &'a Value, name: &str) -> DeskResult<&'a str> {
    optional_str(args, name)?.ok_or_else(|| invalid(name, "is required"))
}

/// Numbers, or strings holding a number (hosts often send "800.50").
pub fn optional_f64(args: &Value, name: &str) -> DeskResult<Option<f64>> {
    match present(args, name) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(name, "is not a finite number")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(name, "expected a number")),
        Some(_) => Err(invalid(name, "expected a number")),
    }
}

pub fn required_f64(args: &Value, name: &str) -> DeskResult<f64> {
    optional_f64(args, name)?.ok_or_else(|| invalid(name, "is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_helpers_accept_loose_host_input() {
        let args = json!({
            "customer_id": "C001",
            "blank": "  ",
            "amount": "800.50",
            "count": 3,
            "nothing": null,
            "flag": true,
        });
        assert_eq!(required_str(&args, "customer_id").unwrap(), "C001");
        assert_eq!(optional_str(&args, "blank").unwrap(), None);
        assert_eq!(optional_str(&args, "nothing").unwrap(), None);
        assert_eq!(required_f64(&args, "amount").unwrap(), 800.5);
        assert_eq!(required_f64(&args, "count").unwrap(), 3.0);
        assert_eq!(optional_f64(&args, "missing").unwrap(), None);

        let err = required_str(&args, "pension_id").unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
        assert!(err.to_string().contains("pension_id"));
        assert!(optional_f64(&args, "flag").is_err());
        assert!(optional_str(&args, "count").is_err());
    }

    #[test]
    fn success_envelope_requires_an_object() {
        let ok = success(json!({ "count": 2 })).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["count"], 2);
        assert!(success(json!([1, 2])).is_err());
    }
}
