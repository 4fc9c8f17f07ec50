//! Reusable parent classes built on the lifecycle hooks
//!
//! - [`poolable`]: per-class instance pools via `__inherit` + `__new`
//! - [`singleton`]: one cached instance per class via `__new`

mod pool;
mod singleton;

pub use pool::{poolable, Pool, POOL_FIELD};
pub use singleton::singleton;

use crate::class::{Instance, Value};
use crate::error::{ClassError, Result};

/// The receiver of a method call: the instance passed as `args[0]`
pub fn receiver(args: &[Value]) -> Result<&Instance> {
    args.first()
        .and_then(Value::as_instance)
        .ok_or_else(|| ClassError::msg("method called without an instance receiver"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{create, Definition};

    #[test]
    fn test_receiver() {
        let instance = create(&Definition::new(), None).unwrap().instantiate(&[]).unwrap();
        let args = [Value::Instance(instance.clone()), Value::Int(1)];
        assert!(receiver(&args).unwrap().ptr_eq(&instance));

        assert!(receiver(&[]).is_err());
        assert!(receiver(&[Value::Int(1)]).is_err());
    }
}
