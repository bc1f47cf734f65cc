//! Morphscript CLI - Compile mapping tasks to Metamorph scripts
//!
//! # Main Commands
//!
//! ```bash
//! morphscript compile task.json            # Print the compiled script
//! morphscript compile task.json --indent   # Pretty-printed
//! morphscript compile task.json --temp-file
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! morphscript filter '[{"person.age":"^[0-9]+$"}]' --value person.name
//! morphscript flush-path person.name person.age person.gender
//! morphscript example-task
//! ```
//!
//! Logging goes to stderr; `RUST_LOG` sets the level (default `warn`).

use clap::{Parser, Subcommand};
use log::kv::{self, Key, Value, VisitSource};
use log::{LevelFilter, Log, Metadata, Record};
use morphscript::{
    compile_task, example_task, extract, resolve_flush_path, CompileOptions, FilterExpression,
    RenderConfig, ScriptBuilder, Task,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "morphscript")]
#[command(about = "Compile mapping tasks into Metamorph scripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a task JSON file into a script
    Compile {
        /// Input task file
        input: PathBuf,

        /// Indent the script
        #[arg(short, long)]
        indent: bool,

        /// Output encoding (default: MORPHSCRIPT_ENCODING or UTF-8)
        #[arg(short, long)]
        encoding: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long, conflicts_with = "temp_file")]
        output: Option<PathBuf>,

        /// Write the unindented script to a kept temporary file
        #[arg(long)]
        temp_file: bool,

        /// Skip task validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Parse a filter expression and show its entries
    Filter {
        /// Filter expression (JSON array of single-key objects)
        expression: String,

        /// Value path to resolve the flush path against
        #[arg(short, long)]
        value: Option<String>,
    },

    /// Resolve the flush path for a value path and filter paths
    FlushPath {
        /// Attribute path of the filtered value
        value: String,

        /// Attribute paths of the filter conditions
        #[arg(required = true)]
        filters: Vec<String>,
    },

    /// Show example task
    ExampleTask,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    init_logging();

    let config = RenderConfig::from_env();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile {
            input,
            indent,
            encoding,
            output,
            temp_file,
            no_validate,
        } => {
            if temp_file {
                // Temp files are unindented; --encoding replaces the default encoding
                let config = match encoding {
                    Some(e) => config.clone().with_default_encoding(e),
                    None => config.clone(),
                };
                cmd_compile_temp_file(&input, &config, !no_validate)
            } else {
                let options = CompileOptions {
                    indent,
                    encoding,
                    validate: !no_validate,
                };
                cmd_compile(&input, &config, &options, output.as_deref())
            }
        }

        Commands::Filter { expression, value } => cmd_filter(&expression, value.as_deref()),

        Commands::FlushPath { value, filters } => cmd_flush_path(&value, &filters),

        Commands::ExampleTask => cmd_example_task(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_compile(
    input: &Path,
    config: &RenderConfig,
    options: &CompileOptions,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Compiling: {}", input.display());

    let task = Task::from_file(input)?;
    eprintln!("   Task: {}", task.name);
    eprintln!("   Mappings: {}", task.mappings.len());

    let compiled = compile_task(&task, config, options)?;
    eprintln!("   Rules: {} ({} filtered)", compiled.rule_count, compiled.filter_count);
    eprintln!("   Maps: {}", compiled.map_count);

    if !compiled.diagnostics.is_empty() {
        eprintln!("\n⚠️  Diagnostics:");
        for d in &compiled.diagnostics {
            eprintln!("   - [{}] {}", d.mapping.as_deref().unwrap_or("-"), d.message);
        }
    }

    write_output(&compiled.script, output)?;
    Ok(())
}

fn cmd_compile_temp_file(
    input: &Path,
    config: &RenderConfig,
    validate: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Compiling: {}", input.display());

    let task = Task::from_file(input)?;
    if validate {
        task.validate()?;
    }

    let mut builder = ScriptBuilder::metamorph(config);
    builder.apply(&task)?;
    let path = builder.to_file()?;

    eprintln!("💾 Script written to: {}", path.display());
    println!("{}", path.display());
    Ok(())
}

fn cmd_filter(expression: &str, value: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let parsed: FilterExpression = extract(Some(expression));
    if parsed.is_empty() {
        eprintln!("📋 No usable conditions.");
        return Ok(());
    }

    eprintln!("📋 Conditions ({}):\n", parsed.len());
    for (path, pattern) in parsed.iter() {
        println!("{}\t{}", path, pattern);
    }

    if let Some(value) = value {
        let flush = resolve_flush_path(value, parsed.paths());
        eprintln!("\n   Flush path: {}", flush);
    }
    Ok(())
}

fn cmd_flush_path(value: &str, filters: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let flush = resolve_flush_path(value, filters.iter().map(String::as_str));
    println!("{}", flush);
    Ok(())
}

fn cmd_example_task() -> Result<(), Box<dyn std::error::Error>> {
    let task = example_task();
    let json = task.to_json()?;
    println!("{}", json);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

// =============================================================================
// Logging
// =============================================================================

/// Plain-text logger writing `LEVEL target: message key=value` lines to stderr.
struct StderrLogger {
    level: LevelFilter,
}

struct Fields(String);

impl<'kvs> VisitSource<'kvs> for Fields {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        self.0.push_str(&format!(" {}={}", key, value));
        Ok(())
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut fields = Fields(String::new());
        let _ = record.key_values().visit(&mut fields);
        eprintln!("{:<5} {}: {}{}", record.level(), record.target(), record.args(), fields.0);
    }

    fn flush(&self) {}
}

fn init_logging() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|spec| LevelFilter::from_str(spec.trim()).ok())
        .unwrap_or(LevelFilter::Warn);

    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}
