//! Instances and the instantiation protocol
//!
//! Calling a class either hands control to its `__new` hook, or builds a
//! fresh instance, runs `init` on it if one resolves, and returns it.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use super::{Class, Fields, Value};
use crate::error::{ClassError, Result};

struct InstanceInner {
    class: Class,
    fields: RwLock<Fields>,
}

/// A record produced by instantiating a class.
///
/// Reads that miss the instance's own fields fall through to its class.
/// The class is fixed for the instance's lifetime.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

impl Instance {
    fn empty(class: Class) -> Self {
        Self {
            inner: Arc::new(InstanceInner {
                class,
                fields: RwLock::new(Fields::new()),
            }),
        }
    }

    /// The class this instance delegates to
    pub fn class(&self) -> &Class {
        &self.inner.class
    }

    /// Get a field, falling back to the class
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.inner.fields.read().get(key) {
            return Some(value.clone());
        }
        self.inner.class.get(key)
    }

    /// Get a field set directly on this instance
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.inner.fields.read().get(key).cloned()
    }

    /// Set a field on this instance (never on the class). Setting `Nil`
    /// removes the instance's own value so reads fall through again.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let mut fields = self.inner.fields.write();
        if value.is_nil() {
            fields.remove(key);
        } else {
            fields.insert(key.to_string(), value);
        }
    }

    /// Remove a field set directly on this instance
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.fields.write().remove(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.inner.fields.read().contains_key(key) || self.inner.class.definition().has(key)
    }

    /// Get a numeric field as f64
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_f64())
    }

    /// Get an integer field
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    /// Invoke a method, passing this instance as the first argument
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        match self.get(method) {
            Some(Value::Function(func)) => func.call(&self.with_receiver(args)),
            Some(_) => Err(ClassError::NotCallable {
                member: method.to_string(),
            }),
            None => Err(ClassError::UndefinedMember {
                member: method.to_string(),
            }),
        }
    }

    /// Invoke an operator from the class's behavior table, e.g. `__add`,
    /// passing this instance as the first argument
    pub fn call_meta(&self, name: &str, args: &[Value]) -> Result<Value> {
        let behavior = self.inner.class.behavior();
        match behavior.metamethod(name) {
            Some(func) => func.call(&self.with_receiver(args)),
            None => Err(ClassError::UndefinedMember {
                member: name.to_string(),
            }),
        }
    }

    /// Membership test against the class's ancestor set
    pub fn is(&self, class: &Class) -> bool {
        self.inner.class.is_subclass_of(class)
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn with_receiver(&self, args: &[Value]) -> Vec<Value> {
        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.push(Value::Instance(self.clone()));
        call_args.extend_from_slice(args);
        call_args
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.inner.fields.read().keys().cloned().collect();
        keys.sort();
        f.debug_struct("Instance")
            .field("class", &self.inner.class.definition().display_name())
            .field("fields", &keys)
            .finish()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Ok(text) = self.call_meta("__tostring", &[]) {
            return write!(f, "{}", text);
        }
        write!(
            f,
            "{} instance",
            self.inner.class.definition().display_name()
        )
    }
}

/// Build a fresh instance of `class` and run its `init`, bypassing any
/// `__new` override
pub fn generate_instance(class: &Class, args: &[Value]) -> Result<Instance> {
    let instance = Instance::empty(class.clone());
    if let Some(Value::Function(init)) = instance.get("init") {
        init.call(&instance.with_receiver(args))?;
    }
    trace!("Generated instance of {}", class);
    Ok(instance)
}

impl Class {
    /// Instantiate: run `__new` if the class defines one, otherwise
    /// [`generate_instance`]. Whatever `__new` returns is the result.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        let behavior = self.behavior();
        match behavior.new_hook() {
            Some(hook) => {
                trace!("Instantiating {} through __new", self);
                hook(self, &behavior, args)
            }
            None => generate_instance(self, args).map(Value::Instance),
        }
    }

    /// Instantiate and require an instance back
    pub fn instantiate(&self, args: &[Value]) -> Result<Instance> {
        match self.call(args)? {
            Value::Instance(instance) => Ok(instance),
            _ => Err(ClassError::NotAnInstance {
                class: self.definition().display_name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{create, Behavior, Definition};
    use parking_lot::Mutex;

    fn counter_class() -> Class {
        let def = Definition::new()
            .with_name("Counter")
            .with_field("count", 0)
            .with_method("init", |args| {
                let this = args[0].as_instance().ok_or_else(|| ClassError::msg("no self"))?;
                let start = args.get(1).and_then(Value::as_i64).unwrap_or(0);
                this.set("count", start);
                Ok(Value::Nil)
            })
            .with_method("bump", |args| {
                let this = args[0].as_instance().ok_or_else(|| ClassError::msg("no self"))?;
                let next = this.get_i64("count").unwrap_or(0) + 1;
                this.set("count", next);
                Ok(Value::Int(next))
            });
        create(&def, None).unwrap()
    }

    #[test]
    fn test_default_path_runs_init() {
        let class = counter_class();
        let instance = class.instantiate(&[Value::Int(10)]).unwrap();
        assert_eq!(instance.get_i64("count"), Some(10));
        assert_eq!(instance.call("bump", &[]).unwrap(), Value::Int(11));
        assert_eq!(instance.class(), &class);
    }

    #[test]
    fn test_fields_fall_through_to_class() {
        let def = Definition::new().with_field("x", 1);
        let class = create(&def, None).unwrap();
        let instance = class.instantiate(&[]).unwrap();

        assert_eq!(instance.get("x"), Some(Value::Int(1)));
        assert!(instance.get_own("x").is_none());

        instance.set("x", 2);
        assert_eq!(instance.get("x"), Some(Value::Int(2)));
        assert_eq!(class.get("x"), Some(Value::Int(1)));

        class.set("y", 3);
        assert_eq!(instance.get("y"), Some(Value::Int(3)));
        assert!(instance.has("y"));
    }

    #[test]
    fn test_clearing_instance_field_falls_through() {
        let def = Definition::new().with_field("x", 1);
        let class = create(&def, None).unwrap();
        let instance = class.instantiate(&[]).unwrap();

        instance.set("x", 5);
        instance.set("x", Value::Nil);
        assert_eq!(instance.get("x"), Some(Value::Int(1)));
        assert!(instance.get_own("x").is_none());

        instance.set("x", 7);
        assert_eq!(instance.remove("x"), Some(Value::Int(7)));
        assert_eq!(instance.get("x"), Some(Value::Int(1)));
        assert!(instance.remove("x").is_none());
    }

    #[test]
    fn test_new_override_is_total() {
        let init_calls = Arc::new(Mutex::new(0));
        let counter = init_calls.clone();
        let def = Definition::new().with_method("init", move |_| {
            *counter.lock() += 1;
            Ok(Value::Nil)
        });
        let class = create(
            &def,
            Some(Behavior::new().with_new(|_, _, _| Ok(Value::from("sentinel")))),
        )
        .unwrap();

        assert_eq!(class.call(&[]).unwrap(), Value::from("sentinel"));
        assert_eq!(class.call(&[Value::Int(1), Value::Int(2)]).unwrap(), Value::from("sentinel"));
        assert_eq!(*init_calls.lock(), 0);

        assert!(matches!(
            class.instantiate(&[]),
            Err(ClassError::NotAnInstance { .. })
        ));

        let direct = generate_instance(&class, &[]).unwrap();
        assert_eq!(*init_calls.lock(), 1);
        assert_eq!(direct.class(), &class);
    }

    #[test]
    fn test_new_hook_sees_args_and_behavior() {
        let def = Definition::new().with_name("Echo");
        let class = create(
            &def,
            Some(Behavior::new().with_new(|class, behavior, args| {
                assert_eq!(behavior.name(), Some("Echo"));
                let instance = generate_instance(class, &[])?;
                instance.set("argc", args.len() as i64);
                Ok(Value::Instance(instance))
            })),
        )
        .unwrap();

        let instance = class.instantiate(&[Value::Nil, Value::Nil]).unwrap();
        assert_eq!(instance.get_i64("argc"), Some(2));
    }

    #[test]
    fn test_init_error_propagates() {
        let def = Definition::new().with_method("init", |_| Err(ClassError::msg("bad args")));
        let class = create(&def, None).unwrap();
        assert_eq!(class.call(&[]).unwrap_err().to_string(), "bad args");
    }

    #[test]
    fn test_call_dispatch_errors() {
        let def = Definition::new().with_field("size", 3);
        let instance = create(&def, None).unwrap().instantiate(&[]).unwrap();

        assert!(matches!(
            instance.call("size", &[]),
            Err(ClassError::NotCallable { .. })
        ));
        assert!(matches!(
            instance.call("missing", &[]),
            Err(ClassError::UndefinedMember { .. })
        ));
    }

    #[test]
    fn test_display_uses_tostring() {
        let plain = create(&Definition::new().with_name("Plain"), None).unwrap();
        assert_eq!(plain.instantiate(&[]).unwrap().to_string(), "Plain instance");

        let fancy = create(
            &Definition::new().with_name("Fancy"),
            Some(Behavior::new().with_metamethod(
                "__tostring",
                crate::class::Function::new(|_| Ok(Value::from("*fancy*"))),
            )),
        )
        .unwrap();
        assert_eq!(fancy.instantiate(&[]).unwrap().to_string(), "*fancy*");
    }
}
