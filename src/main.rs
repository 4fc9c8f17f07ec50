//! classmix - walk through the composition engine from the command line

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use classmix::mixins::{poolable, receiver, singleton};
use classmix::{configure, create, inherit, Behavior, Class, ComposeConfig, Definition, Function, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Runtime class composition demos
#[derive(Parser, Debug)]
#[command(name = "classmix", version, about = "Runtime class composition demos")]
struct Args {
    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Turn on diamond disambiguation regardless of settings
    #[arg(long)]
    disambiguate: bool,

    #[command(subcommand)]
    demo: Demo,
}

#[derive(Subcommand, Debug)]
enum Demo {
    /// Vector2 class with operator metamethods
    Vector { x: f64, y: f64, dx: f64, dy: f64 },
    /// Instance pooling through __inherit + __new
    Pool,
    /// One instance per class through __new
    Singleton,
    /// Two parents overriding the same method
    Diamond,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classmix=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = ComposeConfig::load(args.config.as_deref())?;
    if args.disambiguate {
        config.disambiguate_diamonds = true;
    }
    configure(config)?;

    match args.demo {
        Demo::Vector { x, y, dx, dy } => vector_demo(x, y, dx, dy),
        Demo::Pool => pool_demo(),
        Demo::Singleton => singleton_demo(),
        Demo::Diamond => diamond_demo(),
    }
}

fn number(args: &[Value], index: usize) -> f64 {
    args.get(index).and_then(Value::as_f64).unwrap_or(0.0)
}

fn vector_class() -> Result<Class> {
    let def = Definition::new()
        .with_name("Vector2")
        .with_field("x", 0.0)
        .with_field("y", 0.0)
        .with_method("init", |args| {
            let this = receiver(args)?;
            this.set("x", number(args, 1));
            this.set("y", number(args, 2));
            Ok(Value::Nil)
        });

    let add = Function::named("__add", |args| {
        let (a, b) = match (args.first(), args.get(1)) {
            (Some(Value::Instance(a)), Some(Value::Instance(b))) => (a, b),
            _ => return Err(classmix::ClassError::msg("Vector2 + expects two vectors")),
        };
        let x = a.get_f64("x").unwrap_or(0.0) + b.get_f64("x").unwrap_or(0.0);
        let y = a.get_f64("y").unwrap_or(0.0) + b.get_f64("y").unwrap_or(0.0);
        a.class().call(&[Value::Float(x), Value::Float(y)])
    });
    let tostring = Function::named("__tostring", |args| {
        let this = receiver(args)?;
        Ok(Value::Str(format!(
            "({}, {})",
            this.get_f64("x").unwrap_or(0.0),
            this.get_f64("y").unwrap_or(0.0)
        )))
    });

    let behavior = Behavior::new()
        .with_metamethod("__add", add)
        .with_metamethod("__tostring", tostring);
    Ok(create(&def, Some(behavior))?)
}

fn vector_demo(x: f64, y: f64, dx: f64, dy: f64) -> Result<()> {
    let vector = vector_class()?;
    let a = vector.instantiate(&[Value::Float(x), Value::Float(y)])?;
    let b = vector.instantiate(&[Value::Float(dx), Value::Float(dy)])?;
    let sum = a.call_meta("__add", &[Value::Instance(b.clone())])?;
    println!("{} + {} = {}", a, b, sum);
    Ok(())
}

fn pool_demo() -> Result<()> {
    let poolable = poolable()?;
    let particle = create(&inherit([&poolable])?.with_name("Particle"), None)?;

    let first = particle.instantiate(&[])?;
    println!("allocated {}", first);
    first.call("release", &[])?;
    let second = particle.instantiate(&[])?;
    println!("reallocated {} (reused: {})", second, second.ptr_eq(&first));
    Ok(())
}

fn singleton_demo() -> Result<()> {
    let singleton = singleton()?;
    let registry = create(&inherit([&singleton])?.with_name("Registry"), None)?;

    let a = registry.instantiate(&[])?;
    let b = registry.instantiate(&[])?;
    println!("{} called twice, same instance: {}", registry, a.ptr_eq(&b));
    Ok(())
}

fn diamond_demo() -> Result<()> {
    let base = create(
        &Definition::new()
            .with_name("Base")
            .with_method("speak", |_| Ok(Value::from("base"))),
        None,
    )?;
    let left = create(
        &inherit([&base])?
            .with_name("Left")
            .with_method("speak", |_| Ok(Value::from("left"))),
        None,
    )?;
    let right = create(
        &inherit([&base])?
            .with_name("Right")
            .with_method("speak", |_| Ok(Value::from("right"))),
        None,
    )?;
    let diamond = create(&inherit([&left, &right])?.with_name("Diamond"), None)?;

    let instance = diamond.instantiate(&[])?;
    match instance.call("speak", &[]) {
        Ok(said) => println!("{} says {}", diamond, said),
        Err(err) => println!("{}: {}", diamond, err),
    }
    Ok(())
}
