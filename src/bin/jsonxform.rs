use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

use jsonxform::logging::LogTarget;
use jsonxform::{
    AdapterKind, ContextConfig, FunctionCatalog, JmesPathToken, SelectableToken, TransformContext,
};

/// Inspect and exercise a transformation context built from configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Default log level (RUST_LOG directives still refine it)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Write logs to this file instead of stderr
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered custom functions and the loaded code units
    Functions,
    /// Invoke a registered custom function. Each ARG is parsed as JSON, else taken as a string
    Call {
        key: String,
        #[arg(value_name = "ARG")]
        args: Vec<String>,
    },
    /// Select a path from an input document
    Select {
        /// Input JSON file, or '-' for stdin
        #[arg(long = "input", value_name = "FILE")]
        input: PathBuf,
        /// Adapter name: jmespath or pointer
        #[arg(long = "adapter", default_value = "jmespath")]
        adapter: String,
        path: String,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn  => tracing::Level::WARN,
            LogLevel::Info  => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let level = args.logging.map(tracing::Level::from);
    let target = match args.log_file {
        Some(path) => LogTarget::File(Some(path)),
        None => LogTarget::Stderr,
    };
    jsonxform::logging::init_with(target, level)?;

    let config = ContextConfig::from_path(args.config.as_ref())
        .wrap_err("Failed to load context configuration")?;
    debug!("Loaded config: {config:?}");
    let catalog = Arc::new(FunctionCatalog::with_std());

    let res = match args.command {
        Command::Functions => {
            let ctx = TransformContext::from_config(&config, catalog)?;
            list_functions(&ctx)
        }
        Command::Call { key, args } => {
            let ctx = TransformContext::from_config(&config, catalog)?;
            call_function(&ctx, &key, &args)
        }
        Command::Select { input, adapter, path } => {
            let document = read_document(&input)?;
            let ctx = TransformContext::from_config(&config, catalog)?.with_input(&document);
            select(&ctx, &adapter, &path)
        }
    };
    if let Err(e) = &res {
        error!("Error: {e}");
    }
    res
}

fn list_functions(ctx: &TransformContext<'_>) -> Result<()> {
    println!("code units: {}", ctx.catalog().unit_names().join(", "));
    for key in ctx.registry().keys() {
        let handle = ctx.resolve_function(key)?;
        let marker = if ctx.registry().is_variadic(key) { " (variadic)" } else { "" };
        println!("{key} -> {}{marker}", handle.qualified_name());
    }
    Ok(())
}

fn call_function(ctx: &TransformContext<'_>, key: &str, raw_args: &[String]) -> Result<()> {
    let args: Vec<Value> = raw_args.iter().map(|raw| parse_call_arg(raw)).collect();
    let result = ctx.call_site(key)?.invoke(args)?;
    print_value(ctx, &result)
}

/// JSON when it parses, else the raw text as a string.
fn parse_call_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn select(ctx: &TransformContext<'_>, adapter: &str, path: &str) -> Result<()> {
    let kind = AdapterKind::parse(adapter)?;
    let result = match kind {
        // Custom functions registered on the context are callable from JMESPath.
        AdapterKind::JmesPath => {
            let input = ctx.input().ok_or(jsonxform::ContextError::NoInput)?;
            JmesPathToken::bind(input).select_with(&ctx.jmes_runtime(), path)?
        }
        other => ctx.wrap_input(other)?.select(path)?,
    };
    print_value(ctx, &result)
}

fn read_document(input: &PathBuf) -> Result<Value> {
    let text = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)
            .wrap_err_with(|| format!("Failed to read {}", input.display()))?
    };
    serde_json::from_str(&text).wrap_err("Input is not valid JSON")
}

fn print_value(ctx: &TransformContext<'_>, value: &Value) -> Result<()> {
    let value = match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .and_then(|f| serde_json::Number::from_f64(ctx.round(f)))
            .map(Value::Number)
            .unwrap_or_else(|| value.clone()),
        other => other.clone(),
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
