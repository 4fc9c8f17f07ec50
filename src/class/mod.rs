//! Class composition engine
//!
//! Definitions are plain records of fields and methods. [`inherit`] merges
//! any number of parents into a new definition, [`create`] seals a
//! definition into a callable [`Class`], and calling a class produces
//! [`Instance`]s that can be queried with [`is`] and [`type_of`].

mod behavior;
mod definition;
mod finalize;
mod identity;
mod instance;
mod merge;
mod query;
mod value;

pub use behavior::{Behavior, CreateHook, InheritHook, NewHook};
pub use definition::{AncestorSet, Definition, Fields};
pub use finalize::{create, Class};
pub use identity::ClassId;
pub use instance::{generate_instance, Instance};
pub use merge::{extend, inherit, Composer, Factory, Parent};
pub use query::{class_of, implements, instanceof, is, type_of};
pub use value::{Function, NativeFn, Opaque, Value};
