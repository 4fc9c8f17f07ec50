//! Common test utilities - class builders shared by the integration tests

#![allow(dead_code)]

use classmix::{create, Behavior, Class, ClassError, Definition, Function, Instance, Result, Value};

pub use classmix::mixins::receiver;

fn arg_f64(args: &[Value], index: usize) -> f64 {
    args.get(index).and_then(Value::as_f64).unwrap_or(0.0)
}

fn vector_pair(args: &[Value]) -> Result<(&Instance, &Instance)> {
    match (args.first(), args.get(1)) {
        (Some(Value::Instance(a)), Some(Value::Instance(b))) => Ok((a, b)),
        _ => Err(ClassError::msg("expected two vectors")),
    }
}

/// Vector2: x/y defaults, `init`, `length`, and `__add`/`__eq`/`__tostring`
pub fn vector2() -> Class {
    let def = Definition::new()
        .with_name("Vector2")
        .with_field("x", 0.0)
        .with_field("y", 0.0)
        .with_method("init", |args| {
            let this = receiver(args)?;
            if args.len() > 1 {
                this.set("x", arg_f64(args, 1));
                this.set("y", arg_f64(args, 2));
            }
            Ok(Value::Nil)
        })
        .with_method("length", |args| {
            let this = receiver(args)?;
            let x = this.get_f64("x").unwrap_or(0.0);
            let y = this.get_f64("y").unwrap_or(0.0);
            Ok(Value::Float((x * x + y * y).sqrt()))
        });

    let add = Function::named("__add", |args| {
        let (a, b) = vector_pair(args)?;
        let x = a.get_f64("x").unwrap_or(0.0) + b.get_f64("x").unwrap_or(0.0);
        let y = a.get_f64("y").unwrap_or(0.0) + b.get_f64("y").unwrap_or(0.0);
        a.class().call(&[Value::Float(x), Value::Float(y)])
    });
    let eq = Function::named("__eq", |args| {
        let (a, b) = vector_pair(args)?;
        Ok(Value::Bool(
            a.get_f64("x") == b.get_f64("x") && a.get_f64("y") == b.get_f64("y"),
        ))
    });
    let tostring = Function::named("__tostring", |args| {
        let this = receiver(args)?;
        Ok(Value::Str(format!(
            "Vector2({}, {})",
            this.get_f64("x").unwrap_or(0.0),
            this.get_f64("y").unwrap_or(0.0)
        )))
    });

    let behavior = Behavior::new()
        .with_metamethod("__add", add)
        .with_metamethod("__eq", eq)
        .with_metamethod("__tostring", tostring);
    create(&def, Some(behavior)).expect("Failed to create Vector2")
}

/// A method returning a fixed string
pub fn says(text: &'static str) -> Function {
    Function::new(move |_| Ok(Value::from(text)))
}
