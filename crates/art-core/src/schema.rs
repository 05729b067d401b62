// SPDX-License-Identifier: MIT

//! Schema-validated state maps for agent values.

use crate::error::CoreError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Map,
    /// Accepts any JSON value; used for opaque payloads.
    Any,
}

impl FieldType {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_f64() || value.is_i64() || value.is_u64(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::List => value.is_array(),
            FieldType::Map => value.is_object(),
            FieldType::Any => true,
        }
    }
}

crate::simple_display! {
    FieldType {
        String => "string",
        Integer => "integer",
        Float => "float",
        Boolean => "boolean",
        List => "list",
        Map => "map",
        Any => "any",
    }
}

/// A single field declaration in an agent's [`Schema`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self { name: name.into(), field_type, default: None, required: false, allowed_values: None }
    }

    crate::setters! {
        option { default: Value }
        set { required: bool }
        option { allowed_values: Vec<Value> }
    }
}

/// An agent class's fixed, schema field declarations.
///
/// Field order is preserved (an [`IndexMap`]) because schemas are
/// typically defined once at agent-class construction time and the
/// declaration order is useful for documentation/introspection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema(IndexMap<String, FieldSpec>);

impl Schema {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.0.insert(spec.name.clone(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.0.values()
    }

    /// Defaults for every field that declares one, as an object map.
    pub fn defaults(&self) -> serde_json::Map<String, Value> {
        self.0
            .values()
            .filter_map(|f| f.default.clone().map(|d| (f.name.clone(), d)))
            .collect()
    }

    /// Validate `state` against this schema.
    ///
    /// Splits `state` into known/unknown fields by schema membership. In
    /// strict mode an unknown field is an error; otherwise unknown fields
    /// are preserved unchanged in the returned map. Known fields are
    /// checked for type, required-ness, and allowed-value membership.
    pub fn validate(
        &self,
        agent_id: &str,
        state: &serde_json::Map<String, Value>,
        strict: bool,
    ) -> Result<serde_json::Map<String, Value>, CoreError> {
        let mut known = serde_json::Map::new();
        let mut unknown = serde_json::Map::new();

        for (key, value) in state {
            if self.0.contains_key(key) {
                known.insert(key.clone(), value.clone());
            } else if strict {
                return Err(CoreError::UnknownField {
                    agent_id: agent_id.to_string(),
                    field: key.clone(),
                });
            } else {
                unknown.insert(key.clone(), value.clone());
            }
        }

        for spec in self.0.values() {
            match known.get(&spec.name) {
                Some(value) => {
                    if !spec.field_type.accepts(value) {
                        return Err(CoreError::TypeMismatch {
                            agent_id: agent_id.to_string(),
                            field: spec.name.clone(),
                            expected: spec.field_type.to_string(),
                            actual: json_type_name(value).to_string(),
                        });
                    }
                    if let Some(allowed) = &spec.allowed_values {
                        if !allowed.contains(value) {
                            return Err(CoreError::NotAllowed {
                                agent_id: agent_id.to_string(),
                                field: spec.name.clone(),
                                value: value.clone(),
                            });
                        }
                    }
                }
                None => {
                    if spec.required {
                        return Err(CoreError::MissingRequired {
                            agent_id: agent_id.to_string(),
                            field: spec.name.clone(),
                        });
                    }
                    if let Some(default) = &spec.default {
                        known.insert(spec.name.clone(), default.clone());
                    }
                }
            }
        }

        known.extend(unknown);
        Ok(known)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Deep-merge `attrs` into `base`. Leaf values overwrite; lists are
/// replaced wholesale (never merged element-wise), per the documented
/// `set` semantics.
pub fn deep_merge(base: &mut serde_json::Map<String, Value>, attrs: &serde_json::Map<String, Value>) {
    for (key, value) in attrs {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
