//! Instance pooling
//!
//! Every class that inherits from `Poolable` gets its own pool, injected
//! by `__inherit` into the class-level `pool` field. Calling the class
//! hands out a released instance when one is available (running `init`
//! again with the new arguments) and builds a fresh one otherwise.

use parking_lot::Mutex;
use tracing::trace;

use super::receiver;
use crate::class::{create, generate_instance, Behavior, Class, Definition, Instance, Opaque, Value};
use crate::error::{ClassError, Result};

/// Class-level field holding the pool
pub const POOL_FIELD: &str = "pool";

/// Released instances waiting for reuse.
///
/// A pooled instance keeps its class alive, and the class owns the pool
/// through its `pool` field, so a class with released instances is not
/// freed until the pool is emptied. Call [`Pool::clear`] when retiring a
/// pooled class.
#[derive(Debug, Default)]
pub struct Pool {
    free: Mutex<Vec<Instance>>,
}

impl Pool {
    pub fn put(&self, instance: Instance) {
        self.free.lock().push(instance);
    }

    pub fn take(&self) -> Option<Instance> {
        self.free.lock().pop()
    }

    pub fn len(&self) -> usize {
        self.free.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.lock().is_empty()
    }

    /// Drop every released instance, returning how many were dropped
    pub fn clear(&self) -> usize {
        let drained = std::mem::take(&mut *self.free.lock());
        drained.len()
    }

    /// Run `f` against the pool stored on `class`, if it has one
    pub fn with<R>(class: &Class, f: impl FnOnce(&Pool) -> R) -> Option<R> {
        let value = class.get(POOL_FIELD)?;
        value.downcast_ref::<Pool>().map(f)
    }
}

fn fresh_pool() -> Value {
    Value::Opaque(Opaque::new(Pool::default()))
}

/// Build the `Poolable` parent class
pub fn poolable() -> Result<Class> {
    let def = Definition::new()
        .with_name("Poolable")
        .with_field(POOL_FIELD, fresh_pool())
        .with_method("release", |args| {
            let this = receiver(args)?;
            Pool::with(this.class(), |pool| pool.put(this.clone())).ok_or_else(|| {
                ClassError::msg(format!("{} has no instance pool", this.class()))
            })?;
            Ok(Value::Nil)
        });

    let behavior = Behavior::new()
        .with_inherit(|child, _| {
            child.set(POOL_FIELD, fresh_pool());
            Ok(())
        })
        .with_new(|class, _, args| {
            let Some(instance) = Pool::with(class, Pool::take).flatten() else {
                return generate_instance(class, args).map(Value::Instance);
            };
            trace!("Reusing pooled instance of {}", class);
            if instance.get("init").is_some_and(|init| init.is_function()) {
                instance.call("init", args)?;
            }
            Ok(Value::Instance(instance))
        });

    create(&def, Some(behavior))
}
