#![allow(clippy::print_stdout)]
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use lottie_schema::{DiagnosticType, Input, LottieSchema};

#[derive(Parser)]
#[command(name = "lottie-schema")]
struct Cli {
    /// A path to a Lottie document (i.e. animation.json) to validate (may be specified multiple times).
    #[arg(short = 'i', long = "instance")]
    instances: Option<Vec<PathBuf>>,

    /// The Lottie JSON Schema to validate with (i.e. lottie.schema.json).
    #[arg(value_parser, required_unless_present("version"))]
    schema: Option<PathBuf>,

    /// Report warnings (unknown `ty`/properties) in addition to errors.
    #[arg(short = 'w', long = "warnings")]
    warnings: bool,

    /// Resolve every diagnostic's location to the chain of layer names
    /// leading to it, instead of a bare JSON Pointer.
    #[arg(long = "name-paths")]
    name_paths: bool,

    /// Show program's version number and exit.
    #[arg(short = 'v', long = "version")]
    version: bool,
}

fn read_json(path: &Path) -> Result<serde_json::Result<serde_json::Value>, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader))
}

fn validate_instances(
    instances: &[PathBuf],
    schema_path: &Path,
    show_warnings: bool,
    name_paths: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut success = true;

    let schema_json = read_json(schema_path)??;
    let engine = LottieSchema::options().with_name_paths(name_paths).build(schema_json)?;

    for instance in instances {
        let instance_json = read_json(instance)??;
        let diagnostics = engine.validate(Input::from(&instance_json), show_warnings);
        let filename = instance.to_string_lossy();
        if diagnostics.is_empty() {
            println!("{filename} - VALID");
            continue;
        }
        let has_errors = diagnostics.iter().any(|d| d.kind == DiagnosticType::Error);
        success &= !has_errors;
        println!("{filename} - {}. Diagnostics:", if has_errors { "INVALID" } else { "VALID" });
        for (i, diagnostic) in diagnostics.iter().enumerate() {
            let marker = match diagnostic.kind {
                DiagnosticType::Error => "error",
                DiagnosticType::Warning => "warning",
            };
            println!("{}. [{marker}] {}: {}", i + 1, diagnostic.path, diagnostic.message);
        }
    }
    Ok(success)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Cli::parse();

    if config.version {
        println!(concat!("Version: ", env!("CARGO_PKG_VERSION")));
        return ExitCode::SUCCESS;
    }

    if let Some(schema) = config.schema {
        if let Some(instances) = config.instances {
            return match validate_instances(&instances, &schema, config.warnings, config.name_paths) {
                Ok(true) => ExitCode::SUCCESS,
                Ok(false) => ExitCode::FAILURE,
                Err(error) => {
                    println!("Error: {error}");
                    ExitCode::FAILURE
                }
            };
        }
    }
    ExitCode::SUCCESS
}
