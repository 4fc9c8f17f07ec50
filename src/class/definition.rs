//! Definitions - class-in-progress records

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Behavior, ClassId, Function, Value};
use crate::error::{ClassError, Result};

/// Fields are stored as name -> value pairs
pub type Fields = HashMap<String, Value>;

/// Set of definition identities reachable by inheritance
pub type AncestorSet = HashSet<ClassId>;

struct Record {
    id: ClassId,
    name: Option<String>,
    fields: Fields,
    ancestors: Option<AncestorSet>,
    behavior: Option<Behavior>,
    finalized: bool,
}

/// A class-in-progress: data defaults and methods, plus the hidden
/// ancestor set and behavior table.
///
/// Cloning the handle aliases the same record. The engine never holds
/// the record's lock while running user code, so hooks and methods may
/// freely read and write the definition they are given.
#[derive(Clone)]
pub struct Definition {
    inner: Arc<RwLock<Record>>,
}

impl Definition {
    /// Create an empty, unnamed definition
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Record {
                id: ClassId::generate(),
                name: None,
                fields: Fields::new(),
                ancestors: None,
                behavior: None,
                finalized: false,
            })),
        }
    }

    /// Create a definition from name/value pairs
    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let def = Self::new();
        {
            let mut record = def.inner.write();
            for (key, value) in fields {
                let value = value.into();
                if !value.is_nil() {
                    record.fields.insert(key.into(), value);
                }
            }
        }
        def
    }

    /// Create a definition from a plain JSON record
    pub fn from_json(record: serde_json::Value) -> Result<Self> {
        match record {
            serde_json::Value::Object(map) => Ok(Self::from_fields(map)),
            other => Err(ClassError::InvalidRecord(other.to_string())),
        }
    }

    /// Builder: set the name
    pub fn with_name(self, name: &str) -> Self {
        self.set_name(name);
        self
    }

    /// Builder: set a field
    pub fn with_field(self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder: set a method. The receiver is passed as `args[0]`.
    pub fn with_method(
        self,
        key: &str,
        func: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.set(key, Function::named(key, func));
        self
    }

    pub fn id(&self) -> ClassId {
        self.inner.read().id
    }

    pub fn name(&self) -> Option<String> {
        self.inner.read().name.clone()
    }

    pub fn set_name(&self, name: &str) {
        self.inner.write().name = Some(name.to_string());
    }

    /// Name for messages, falling back to the short id
    pub fn display_name(&self) -> String {
        let record = self.inner.read();
        match &record.name {
            Some(name) => name.clone(),
            None => format!("<anonymous {}>", record.id),
        }
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().fields.get(key).cloned()
    }

    /// Set a field value. Setting `Nil` removes the field.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let mut record = self.inner.write();
        if value.is_nil() {
            record.fields.remove(key);
        } else {
            record.fields.insert(key.to_string(), value);
        }
    }

    /// Remove a field
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.write().fields.remove(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.inner.read().fields.contains_key(key)
    }

    /// Field names, sorted
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().fields.keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot of all fields
    pub fn fields(&self) -> Fields {
        self.inner.read().fields.clone()
    }

    /// Snapshot of the ancestor set (empty if none attached yet)
    pub fn ancestors(&self) -> AncestorSet {
        self.inner.read().ancestors.clone().unwrap_or_default()
    }

    pub fn has_ancestor(&self, id: ClassId) -> bool {
        self.inner
            .read()
            .ancestors
            .as_ref()
            .is_some_and(|set| set.contains(&id))
    }

    /// Snapshot of the behavior table (empty if none attached yet)
    pub fn behavior(&self) -> Behavior {
        self.inner.read().behavior.clone().unwrap_or_default()
    }

    pub fn has_behavior(&self) -> bool {
        self.inner.read().behavior.is_some()
    }

    /// Whether `create` has run on this definition
    pub fn is_finalized(&self) -> bool {
        self.inner.read().finalized
    }

    /// Copy the fields and name into a fresh definition with a new
    /// identity. Ancestors and behavior are not copied.
    pub fn shallow_copy(&self) -> Definition {
        let record = self.inner.read();
        let copy = Definition::from_fields(record.fields.clone());
        if let Some(name) = &record.name {
            copy.set_name(name);
        }
        copy
    }

    /// Whether both handles refer to the same record
    pub fn ptr_eq(&self, other: &Definition) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn merge_fields(&self, fields: &Fields) {
        let mut record = self.inner.write();
        for (key, value) in fields {
            if !value.is_nil() {
                record.fields.insert(key.clone(), value.clone());
            }
        }
    }

    pub(crate) fn set_ancestors(&self, ancestors: AncestorSet) {
        self.inner.write().ancestors = Some(ancestors);
    }

    /// Add this definition to its own ancestor set, creating the set if needed
    pub(crate) fn include_self(&self) {
        let mut record = self.inner.write();
        let id = record.id;
        record.ancestors.get_or_insert_with(AncestorSet::new).insert(id);
    }

    pub(crate) fn set_behavior(&self, behavior: Behavior) {
        self.inner.write().behavior = Some(behavior);
    }

    pub(crate) fn mark_finalized(&self) {
        self.inner.write().finalized = true;
    }
}

impl Default for Definition {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.display_name())
            .field("fields", &self.field_names())
            .field("finalized", &self.is_finalized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_definition_fields() {
        let def = Definition::new()
            .with_name("point")
            .with_field("x", 1)
            .with_field("label", "origin");

        assert_eq!(def.name(), Some("point".to_string()));
        assert_eq!(def.get("x"), Some(Value::Int(1)));
        assert_eq!(def.get("label"), Some(Value::from("origin")));
        assert!(def.has("x"));
        assert!(!def.has("y"));
        assert_eq!(def.field_names(), vec!["label", "x"]);

        assert_eq!(def.remove("x"), Some(Value::Int(1)));
        assert!(!def.has("x"));
    }

    #[test]
    fn test_from_json() {
        let def = Definition::from_json(json!({"hp": 100, "tags": ["a"], "alive": true})).unwrap();
        assert_eq!(def.get("hp"), Some(Value::Int(100)));
        assert_eq!(def.get("alive"), Some(Value::Bool(true)));
        assert_eq!(def.get("tags"), Some(Value::Json(json!(["a"]))));

        assert!(matches!(
            Definition::from_json(json!([1, 2])),
            Err(ClassError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_nil_means_absent() {
        let def = Definition::from_json(json!({"x": null, "y": 2})).unwrap();
        assert!(!def.has("x"));
        assert_eq!(def.field_names(), vec!["y"]);

        def.set("y", Value::Nil);
        assert!(!def.has("y"));
        assert!(def.get("y").is_none());
    }

    #[test]
    fn test_handles_alias() {
        let def = Definition::new();
        let alias = def.clone();
        alias.set("x", 5);
        assert_eq!(def.get("x"), Some(Value::Int(5)));
        assert!(def.ptr_eq(&alias));
        assert_eq!(def.id(), alias.id());
    }

    #[test]
    fn test_shallow_copy_has_new_identity() {
        let def = Definition::new().with_name("base").with_field("x", 1);
        def.include_self();

        let copy = def.shallow_copy();
        assert_ne!(copy.id(), def.id());
        assert_eq!(copy.name(), Some("base".to_string()));
        assert_eq!(copy.get("x"), Some(Value::Int(1)));
        assert!(copy.ancestors().is_empty());

        copy.set("x", 2);
        assert_eq!(def.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_include_self() {
        let def = Definition::new();
        assert!(def.ancestors().is_empty());
        def.include_self();
        def.include_self();
        assert!(def.has_ancestor(def.id()));
        assert_eq!(def.ancestors().len(), 1);
    }

    #[test]
    fn test_display_name_fallback() {
        let def = Definition::new();
        assert!(def.display_name().starts_with("<anonymous "));
    }
}
