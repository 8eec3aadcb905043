//! Value store and configuration resolution
//!
//! The store holds attributes produced by succeeded resources for the
//! lifetime of one run. Descriptor configuration is resolved against it
//! right before a resource is provisioned.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stackflow_core::{AttributeRef, ConfigValue, ResourceDescriptor};
use std::collections::{BTreeMap, HashMap};
use std::collections::hash_map::Entry;

/// Write-once map of `(resource, attribute)` to produced values
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    values: HashMap<AttributeRef, Value>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. Each key can only be written once per run.
    pub fn put(
        &mut self,
        resource: impl Into<String>,
        attribute: impl Into<String>,
        value: Value,
    ) -> Result<()> {
        let key = AttributeRef::new(resource, attribute);
        match self.values.entry(key) {
            Entry::Occupied(entry) => Err(CloudError::DuplicateAttribute(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!("Stored attribute {}", entry.key());
                entry.insert(value);
                Ok(())
            }
        }
    }

    /// Look up a reference
    pub fn resolve(&self, reference: &AttributeRef) -> Result<&Value> {
        self.values
            .get(reference)
            .ok_or_else(|| CloudError::UnresolvedReference(reference.clone()))
    }

    pub fn contains(&self, reference: &AttributeRef) -> bool {
        self.values.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Fully literal configuration handed to a provisioner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    values: BTreeMap<String, Value>,
}

impl ResolvedConfig {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Get a configuration value as a specific type
    pub fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// A string value that must be present and non-empty
    pub fn require_str(&self, key: &str) -> Result<&str> {
        match self.get_str(key) {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(CloudError::InvalidConfig(format!(
                "missing required config '{}'",
                key
            ))),
        }
    }

    /// A map of scalar values rendered as strings (app settings, tags)
    pub fn string_map(&self, key: &str) -> Result<Vec<(String, String)>> {
        let Some(value) = self.values.get(key) else {
            return Ok(Vec::new());
        };
        let Value::Object(map) = value else {
            return Err(CloudError::InvalidConfig(format!(
                "config '{}' must be a block of key/value pairs",
                key
            )));
        };
        map.iter()
            .map(|(k, v)| Ok((k.clone(), scalar_to_string(key, v)?)))
            .collect()
    }

    /// A scalar or list value rendered as a list of strings
    pub fn string_list(&self, key: &str) -> Result<Vec<String>> {
        match self.values.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items.iter().map(|v| scalar_to_string(key, v)).collect(),
            Some(other) => Ok(vec![scalar_to_string(key, other)?]),
        }
    }
}

fn scalar_to_string(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(CloudError::InvalidConfig(format!(
            "config '{}' contains a non-scalar value",
            key
        ))),
    }
}

/// Replace every reference in a descriptor's configuration with its value
///
/// Fails on the first unresolved reference, visiting keys in sorted order.
pub fn resolve_config(descriptor: &ResourceDescriptor, store: &ValueStore) -> Result<ResolvedConfig> {
    let mut values = BTreeMap::new();
    for (key, value) in &descriptor.config {
        values.insert(key.clone(), resolve_value(value, store)?);
    }
    Ok(ResolvedConfig::new(values))
}

fn resolve_value(value: &ConfigValue, store: &ValueStore) -> Result<Value> {
    match value {
        ConfigValue::Literal(v) => Ok(v.clone()),
        ConfigValue::Reference(r) => store.resolve(r).cloned(),
        ConfigValue::Map(map) => map
            .iter()
            .map(|(k, v)| Ok((k.clone(), resolve_value(v, store)?)))
            .collect::<Result<serde_json::Map<_, _>>>()
            .map(Value::Object),
        ConfigValue::List(items) => items
            .iter()
            .map(|v| resolve_value(v, store))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
    }
}
