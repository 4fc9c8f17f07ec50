//! One instance per class
//!
//! The `__new` hook keeps a cache keyed by class identity. The first call
//! on a class builds and initializes the instance; every later call, with
//! any arguments, returns that same instance. Descendants inherit the hook
//! but get their own entry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::class::{create, generate_instance, Behavior, Class, ClassId, Definition, Instance, Value};
use crate::error::Result;

/// Build the `Singleton` parent class
pub fn singleton() -> Result<Class> {
    let cache: Arc<Mutex<HashMap<ClassId, Instance>>> = Arc::new(Mutex::new(HashMap::new()));

    let behavior = Behavior::new().with_new(move |class, _, args| {
        if let Some(existing) = cache.lock().get(&class.id()) {
            return Ok(Value::Instance(existing.clone()));
        }
        // init runs without the cache lock held
        let built = generate_instance(class, args)?;
        let stored = cache.lock().entry(class.id()).or_insert(built).clone();
        Ok(Value::Instance(stored))
    });

    create(&Definition::new().with_name("Singleton"), Some(behavior))
}
