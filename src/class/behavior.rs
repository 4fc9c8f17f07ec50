//! Behavior tables: lifecycle hooks and operator metamethods
//!
//! A behavior table sits beside a definition's ordinary fields. It holds
//! three optional lifecycle hooks and a map of named operators
//! (`__add`, `__eq`, `__tostring`, ...). Tables are merged across parents
//! at inheritance time and frozen into the class at finalization.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{Class, Definition, Function, Value};
use crate::error::Result;

/// `__new`: total override of instantiation
pub type NewHook = Arc<dyn Fn(&Class, &Behavior, &[Value]) -> Result<Value> + Send + Sync>;

/// `__inherit`: runs on every new child definition produced by a merge
pub type InheritHook = Arc<dyn Fn(&Definition, &mut Behavior) -> Result<()> + Send + Sync>;

/// `__create`: runs when a definition is finalized into a class
pub type CreateHook = Arc<dyn Fn(&Class, &Behavior) -> Result<()> + Send + Sync>;

/// Hook slots plus operator metamethods
#[derive(Clone, Default)]
pub struct Behavior {
    new: Option<NewHook>,
    inherit: Option<InheritHook>,
    create: Option<CreateHook>,
    metamethods: HashMap<String, Function>,
    /// Class name, set at finalization
    name: Option<String>,
}

impl Behavior {
    /// Create an empty behavior table
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_new(
        mut self,
        hook: impl Fn(&Class, &Behavior, &[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.new = Some(Arc::new(hook));
        self
    }

    pub fn with_inherit(
        mut self,
        hook: impl Fn(&Definition, &mut Behavior) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.inherit = Some(Arc::new(hook));
        self
    }

    pub fn with_create(
        mut self,
        hook: impl Fn(&Class, &Behavior) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.create = Some(Arc::new(hook));
        self
    }

    /// Add an operator metamethod, e.g. `__add`
    pub fn with_metamethod(mut self, name: &str, func: Function) -> Self {
        self.metamethods.insert(name.to_string(), func);
        self
    }

    pub fn set_new(&mut self, hook: Option<NewHook>) {
        self.new = hook;
    }

    pub fn set_inherit(&mut self, hook: Option<InheritHook>) {
        self.inherit = hook;
    }

    pub fn set_create(&mut self, hook: Option<CreateHook>) {
        self.create = hook;
    }

    pub fn set_metamethod(&mut self, name: &str, func: Function) {
        self.metamethods.insert(name.to_string(), func);
    }

    pub fn new_hook(&self) -> Option<&NewHook> {
        self.new.as_ref()
    }

    pub fn inherit_hook(&self) -> Option<&InheritHook> {
        self.inherit.as_ref()
    }

    pub fn create_hook(&self) -> Option<&CreateHook> {
        self.create.as_ref()
    }

    pub fn metamethod(&self, name: &str) -> Option<&Function> {
        self.metamethods.get(name)
    }

    /// Names of all operator metamethods
    pub fn metamethod_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.metamethods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Name of the class this table was finalized for
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Shallow-overwrite this table with every entry `other` defines.
    ///
    /// The class name is not carried over.
    pub fn overlay(&mut self, other: &Behavior) {
        if let Some(hook) = &other.new {
            self.new = Some(hook.clone());
        }
        if let Some(hook) = &other.inherit {
            self.inherit = Some(hook.clone());
        }
        if let Some(hook) = &other.create {
            self.create = Some(hook.clone());
        }
        for (name, func) in &other.metamethods {
            self.metamethods.insert(name.clone(), func.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new.is_none()
            && self.inherit.is_none()
            && self.create.is_none()
            && self.metamethods.is_empty()
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("name", &self.name)
            .field("new", &self.new.is_some())
            .field("inherit", &self.inherit.is_some())
            .field("create", &self.create.is_some())
            .field("metamethods", &self.metamethod_names())
            .finish()
    }
}
