//! Membership queries
//!
//! Both queries accept any value and never fail. `is` answers for
//! instances and for classes themselves; everything else answers `false`.
//! `type_of` only resolves instances.

use super::{Class, Value};

/// True if `value` is an instance, or a class, with `class` in its ancestor set
pub fn is(value: &Value, class: &Class) -> bool {
    match value {
        Value::Instance(instance) => instance.is(class),
        Value::Class(other) => other.is_subclass_of(class),
        _ => false,
    }
}

/// Alias for [`is`]
pub fn implements(value: &Value, class: &Class) -> bool {
    is(value, class)
}

/// Alias for [`is`]
pub fn instanceof(value: &Value, class: &Class) -> bool {
    is(value, class)
}

/// The class an instance delegates to
pub fn type_of(value: &Value) -> Option<Class> {
    match value {
        Value::Instance(instance) => Some(instance.class().clone()),
        _ => None,
    }
}

/// Alias for [`type_of`]
pub fn class_of(value: &Value) -> Option<Class> {
    type_of(value)
}
