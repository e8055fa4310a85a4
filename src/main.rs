//! Klass CLI - tools for working with declaration schemas
//!
//! Commands:
//!   klass inspect <schema>  - Define a schema and display its reflection view
//!   klass check <schema>    - Define a schema and report the first error

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use klass::{ClassReflector, Registry, Schema};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "klass")]
#[command(about = "Tools for working with class declaration schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Define every declaration in a schema and display the result
    Inspect {
        /// Path to the schema JSON file
        schema: PathBuf,

        /// Show structural signature hashes
        #[arg(long, short = 'H')]
        hashes: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Define every declaration in a schema, failing on the first error
    Check {
        /// Path to the schema JSON file
        schema: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            schema,
            hashes,
            json,
        } => inspect_command(&schema, hashes, json),
        Commands::Check { schema } => check_command(&schema),
    }
}

fn load(path: &Path) -> anyhow::Result<Registry> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let schema = Schema::from_json(&source)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
    let registry = schema.registry();
    schema
        .apply(&registry)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
    Ok(registry)
}

fn check_command(path: &Path) -> anyhow::Result<()> {
    let registry = load(path)?;
    println!(
        "ok: {} classes, {} interfaces, {} enums",
        registry.class_names().len(),
        registry.interface_names().len(),
        registry.enum_names().len()
    );
    Ok(())
}

fn inspect_command(path: &Path, show_hashes: bool, json: bool) -> anyhow::Result<()> {
    let registry = load(path)?;
    let reflectors = reflectors(&registry);

    if json {
        print_json(&registry, &reflectors, show_hashes)?;
    } else {
        print_reflection(&registry, &reflectors, show_hashes);
    }

    Ok(())
}

/// Interfaces first, then classes, each in definition order.
fn reflectors(registry: &Registry) -> Vec<ClassReflector> {
    let interfaces = registry
        .interface_names()
        .into_iter()
        .filter_map(|name| registry.interface(&name))
        .map(ClassReflector::new);
    let classes = registry
        .class_names()
        .into_iter()
        .filter_map(|name| registry.class(&name))
        .map(|class| class.reflect());
    interfaces.chain(classes).collect()
}

fn print_reflection(registry: &Registry, reflectors: &[ClassReflector], show_hashes: bool) {
    for name in registry.enum_names() {
        if let Some(enumeration) = registry.enumeration(&name) {
            println!("enum {}:", enumeration.name());
            for (key, value) in enumeration.constants() {
                println!("  {} = {}", key, value);
            }
        }
    }

    for class in reflectors {
        let mut header = String::new();
        if class.is_abstract() {
            header.push_str("abstract ");
        }
        if class.is_final() {
            header.push_str("final ");
        }
        header.push_str(class.kind().as_str());
        header.push(' ');
        header.push_str(class.name());
        if let Some(parent) = class.parent() {
            header.push_str(&format!(" extends {}", parent.name()));
        }
        let interfaces = class.interfaces();
        if !class.is_interface() && !interfaces.is_empty() {
            header.push_str(&format!(" implements {}", interfaces.join(", ")));
        }
        if show_hashes {
            header.push_str(&format!(" [{}]", class.signature_hash()));
        }
        println!("{}:", header);

        for property in class.properties() {
            println!("  {}", property);
        }
        for method in class.methods() {
            println!("  {}", method);
        }
    }
}

fn print_json(
    registry: &Registry,
    reflectors: &[ClassReflector],
    show_hashes: bool,
) -> anyhow::Result<()> {
    let enums = registry
        .enum_names()
        .iter()
        .filter_map(|name| registry.enumeration(name))
        .map(|e| {
            serde_json::json!({
                "name": e.name(),
                "constants": e.constants().iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<serde_json::Map<_, _>>(),
            })
        })
        .collect::<Vec<_>>();

    let types = reflectors
        .iter()
        .map(|class| descriptor_to_json(class, show_hashes))
        .collect::<Vec<_>>();

    let output = serde_json::json!({
        "enums": enums,
        "types": types,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn descriptor_to_json(class: &ClassReflector, show_hashes: bool) -> serde_json::Value {
    let mut output = serde_json::json!({
        "kind": class.kind().as_str(),
        "name": class.name(),
        "parent": class.parent().map(|p| p.name().to_string()),
        "interfaces": class.interfaces(),
        "abstract": class.is_abstract(),
        "final": class.is_final(),
        "constants": class.constants().iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>(),
        "properties": class.properties().iter().map(|p| serde_json::json!({
            "name": p.name(),
            "visibility": p.visibility().as_str(),
            "type": p.type_name(),
            "nullable": p.is_nullable(),
            "read_only": p.is_read_only(),
            "constant": p.is_constant(),
            "serializable": p.is_serializable(),
            "default": p.default_value().to_json(),
        })).collect::<Vec<_>>(),
        "methods": class.methods().iter().map(|m| serde_json::json!({
            "name": m.name(),
            "visibility": m.visibility().as_str(),
            "abstract": m.is_abstract(),
            "final": m.is_final(),
            "generated": m.is_generated(),
            "signatures": m.parameters().iter()
                .map(|params| klass::decl::format_params(params))
                .collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
    });
    if show_hashes {
        output["hash"] = serde_json::Value::String(class.signature_hash().to_hex());
    }
    output
}
