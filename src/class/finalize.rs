//! Finalizer: sealing a definition into an instantiable class

use std::fmt;

use tracing::debug;

use super::{AncestorSet, Behavior, ClassId, Definition, Value};
use crate::error::Result;

/// A finalized definition. Calling it produces instances.
///
/// Clones alias the same underlying definition; two classes are equal
/// when they share an identity.
#[derive(Clone)]
pub struct Class {
    def: Definition,
}

impl Class {
    /// The underlying definition (same record, not a copy)
    pub fn definition(&self) -> &Definition {
        &self.def
    }

    pub fn id(&self) -> ClassId {
        self.def.id()
    }

    pub fn name(&self) -> Option<String> {
        self.def.name()
    }

    /// Get a class-level field or method
    pub fn get(&self, key: &str) -> Option<Value> {
        self.def.get(key)
    }

    /// Set a class-level field; visible to every instance that has not
    /// shadowed it
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.def.set(key, value);
    }

    /// The behavior table frozen at finalization
    pub fn behavior(&self) -> Behavior {
        self.def.behavior()
    }

    /// Ancestor set, including this class
    pub fn ancestors(&self) -> AncestorSet {
        self.def.ancestors()
    }

    /// True if `other` is this class or one of its ancestors
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.def.has_ancestor(other.id())
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.def.display_name())
            .field("id", &self.id())
            .finish()
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.def.display_name())
    }
}

/// Finalize `def` into a class.
///
/// The inherited behavior table is overlaid with `extra`, stamped with the
/// definition's name and attached. The definition joins its own ancestor
/// set. If the resulting table has a `__create` hook, it runs now; calling
/// `create` again re-runs it.
pub fn create(def: &Definition, extra: Option<Behavior>) -> Result<Class> {
    let mut behavior = def.behavior();
    if let Some(extra) = &extra {
        behavior.overlay(extra);
    }
    behavior.set_name(def.name());

    def.include_self();
    def.set_behavior(behavior.clone());
    def.mark_finalized();

    let class = Class { def: def.clone() };
    debug!(
        "Finalized {} ({} ancestors, create hook: {})",
        class,
        def.ancestors().len(),
        behavior.create_hook().is_some()
    );

    if let Some(hook) = behavior.create_hook() {
        hook(&class, &behavior)?;
    }

    Ok(class)
}
