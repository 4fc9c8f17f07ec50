//! Class-Commons style adapter
//!
//! `class(name, table, parents)` / `instance(class, args)` /
//! `instanceof(value, class)`, built only from the core operations.

use crate::class::{create, inherit, is, Class, Definition, Parent, Value};
use crate::error::Result;

/// Build a named class from `table`, inheriting from `parents`.
///
/// Members in `table` take precedence over anything the parents define,
/// and never count as diamond conflicts. A behavior table already attached
/// to `table` is applied on top of the inherited one.
pub fn class(name: &str, table: &Definition, parents: &[Parent]) -> Result<Class> {
    let def = inherit(parents.iter().cloned())?;
    for (key, value) in table.fields() {
        def.set(&key, value);
    }
    def.set_name(name);
    let extra = table.has_behavior().then(|| table.behavior());
    create(&def, extra)
}

/// Instantiate `class` with `args`
pub fn instance(class: &Class, args: &[Value]) -> Result<Value> {
    class.call(args)
}

/// True if `value` is an instance of `class` or one of its descendants
pub fn instanceof(value: &Value, class: &Class) -> bool {
    is(value, class)
}
