//! classmix - runtime class composition
//!
//! Builds classes from plain records, with multiple inheritance by
//! structural merge, lifecycle hooks (`__new`, `__inherit`, `__create`),
//! operator metamethods and ancestor-set membership queries.

pub mod class;
pub mod commons;
pub mod config;
pub mod error;
pub mod mixins;

pub use class::{
    class_of, create, extend, generate_instance, implements, inherit, instanceof, is, type_of,
    Behavior, Class, ClassId, Composer, Definition, Function, Instance, Opaque, Parent, Value,
};
pub use config::{configure, ComposeConfig};
pub use error::{ClassError, Result};
