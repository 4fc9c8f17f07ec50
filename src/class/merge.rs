//! Merge engine: multiple inheritance by structural merge
//!
//! Parents are folded right-to-left, so on any colliding name the parent
//! listed first is applied last and wins. The same precedence applies to
//! fields, methods and behavior-table entries.
//!
//! Per parent, in fold order:
//! 1. the parent and its whole ancestor set join the child's ancestor set
//! 2. the parent's behavior table is overlaid onto the child's
//! 3. the parent's `__inherit` hook is collected (once per distinct hook)
//! 4. the parent's fields are copied onto the child
//!
//! With diamond disambiguation on, a name that two parents bind to
//! different functions is replaced by a stub that fails when called.
//! Collected `__inherit` hooks run last, against the finished child.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{AncestorSet, Behavior, Class, Definition, Function, InheritHook, Value};
use crate::config::{self, ComposeConfig};
use crate::error::{ClassError, Result};

/// Zero-argument factory producing a parent definition
pub type Factory = Arc<dyn Fn() -> Definition + Send + Sync>;

/// Something a definition can inherit from
#[derive(Clone)]
pub enum Parent {
    Definition(Definition),
    /// Resolved once, before merging
    Factory(Factory),
}

impl Parent {
    pub fn factory(f: impl Fn() -> Definition + Send + Sync + 'static) -> Self {
        Parent::Factory(Arc::new(f))
    }

    fn resolve(self) -> Definition {
        match self {
            Parent::Definition(def) => def,
            Parent::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parent::Definition(def) => write!(f, "Parent({})", def.display_name()),
            Parent::Factory(_) => write!(f, "Parent(<factory>)"),
        }
    }
}

impl From<Definition> for Parent {
    fn from(def: Definition) -> Self {
        Parent::Definition(def)
    }
}

impl From<&Definition> for Parent {
    fn from(def: &Definition) -> Self {
        Parent::Definition(def.clone())
    }
}

impl From<Class> for Parent {
    fn from(class: Class) -> Self {
        Parent::Definition(class.definition().clone())
    }
}

impl From<&Class> for Parent {
    fn from(class: &Class) -> Self {
        Parent::Definition(class.definition().clone())
    }
}

/// Merge engine bound to an explicit configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct Composer {
    config: ComposeConfig,
}

impl Composer {
    pub fn new(config: ComposeConfig) -> Self {
        Self { config }
    }

    /// Engine using the process-wide settings (freezes them)
    pub fn global() -> Self {
        Self::new(config::settings())
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Combine `parents` into a new, unfinalized definition.
    ///
    /// Only `__inherit` hooks can fail; their errors propagate unchanged.
    pub fn inherit<I, P>(&self, parents: I) -> Result<Definition>
    where
        I: IntoIterator<Item = P>,
        P: Into<Parent>,
    {
        let parents: Vec<Definition> = parents
            .into_iter()
            .map(|parent| Into::<Parent>::into(parent).resolve())
            .collect();

        let child = Definition::new();
        let mut ancestors = AncestorSet::new();
        let mut behavior = Behavior::new();
        let mut hooks: Vec<InheritHook> = Vec::new();
        let mut first_functions: HashMap<String, Function> = HashMap::new();
        let mut ambiguous: BTreeSet<String> = BTreeSet::new();

        for parent in parents.iter().rev() {
            ancestors.insert(parent.id());
            ancestors.extend(parent.ancestors());

            let parent_behavior = parent.behavior();
            behavior.overlay(&parent_behavior);
            if let Some(hook) = parent_behavior.inherit_hook() {
                if !hooks.iter().any(|seen| Arc::ptr_eq(seen, hook)) {
                    hooks.push(hook.clone());
                }
            }

            let fields = parent.fields();
            if self.config.disambiguate_diamonds {
                for (key, value) in &fields {
                    let Value::Function(func) = value else {
                        continue;
                    };
                    match first_functions.get(key) {
                        Some(first) if !first.ptr_eq(func) => {
                            ambiguous.insert(key.clone());
                        }
                        Some(_) => {}
                        None => {
                            first_functions.insert(key.clone(), func.clone());
                        }
                    }
                }
            }
            child.merge_fields(&fields);
        }

        for member in &ambiguous {
            child.set(member, ambiguous_stub(member));
        }

        child.set_ancestors(ancestors);
        child.set_behavior(behavior);

        for hook in &hooks {
            let mut current = child.behavior();
            hook(&child, &mut current)?;
            child.set_behavior(current);
        }

        debug!(
            "Merged {} parent(s) into {} ({} ancestors, {} inherit hooks, ambiguous: {:?})",
            parents.len(),
            child.display_name(),
            child.ancestors().len(),
            hooks.len(),
            ambiguous
        );

        Ok(child)
    }

    /// Alias for [`Composer::inherit`]
    pub fn extend<I, P>(&self, parents: I) -> Result<Definition>
    where
        I: IntoIterator<Item = P>,
        P: Into<Parent>,
    {
        self.inherit(parents)
    }
}

/// Stub installed for a diamond-conflicted member
fn ambiguous_stub(member: &str) -> Function {
    let member = member.to_string();
    Function::named(&format!("ambiguous {}", member), move |_args| {
        Err(ClassError::Ambiguous {
            member: member.clone(),
        })
    })
}

/// Merge `parents` into a new definition using the process-wide settings
pub fn inherit<I, P>(parents: I) -> Result<Definition>
where
    I: IntoIterator<Item = P>,
    P: Into<Parent>,
{
    Composer::global().inherit(parents)
}

/// Alias for [`inherit`]
pub fn extend<I, P>(parents: I) -> Result<Definition>
where
    I: IntoIterator<Item = P>,
    P: Into<Parent>,
{
    inherit(parents)
}
