//! condsql — condition pushdown CLI
//!
//! Translates a filter condition into a parametrized SQL fragment and shows
//! the values to bind, in order.
//!
//! # Usage
//!
//! ```bash
//! # Translate a condition
//! condsql "price > 100 and symbol == StockStream.symbol"
//!
//! # Pick a dialect and table alias
//! condsql "volume >= $0:long" --dialect postgres --alias orders
//!
//! # Machine-readable output
//! condsql "a = 1 or b is null" --format json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use condsql::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "condsql")]
#[command(version)]
#[command(about = "Translate filter conditions into parametrized SQL fragments", long_about = None)]
#[command(after_help = "EXAMPLES:
    condsql 'price > 100 and symbol == StockStream.symbol'
    condsql 'volume >= $0:long' --dialect postgres --alias orders
    condsql '{\"is_null\":{\"operand\":{\"store_variable\":{\"attribute\":\"a\",\"ty\":\"int\"}}}}' --json-tree")]
struct Cli {
    /// The condition to translate
    condition: Option<String>,

    /// Target SQL dialect (overrides the config file)
    #[arg(short, long)]
    dialect: Option<Dialect>,

    /// Table alias for store columns (overrides the config file)
    #[arg(short, long)]
    alias: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long, env = "CONDSQL_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Treat the condition as a JSON-serialized expression tree
    #[arg(long)]
    json_tree: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a condition and show its expression tree
    Explain {
        /// The condition to explain
        condition: String,
    },
    /// List supported dialects
    Dialects,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Some(Commands::Explain { condition }) => explain_condition(condition, &cli),
        Some(Commands::Dialects) => {
            show_dialects();
            Ok(())
        }
        None => match &cli.condition {
            Some(condition) => translate_condition(condition, &cli),
            None => {
                println!("{}", "condsql — condition pushdown".cyan().bold());
                println!();
                println!("Usage: condsql <CONDITION> [OPTIONS]");
                println!();
                println!("Try: condsql --help");
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "condsql=debug" } else { "condsql=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

/// Config file (explicit or default location), then command-line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<QueryConfig> {
    let mut config = match &cli.config {
        Some(path) => QueryConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => match QueryConfig::default_path().filter(|p| p.exists()) {
            Some(path) => QueryConfig::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => QueryConfig::default(),
        },
    };

    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }
    if let Some(alias) = &cli.alias {
        config.table_alias = alias.clone();
    }
    config.validate()?;
    Ok(config)
}

fn read_condition(condition: &str, cli: &Cli) -> anyhow::Result<Expr> {
    let expr = if cli.json_tree {
        serde_json::from_str(condition).map_err(CondError::from)?
    } else {
        condsql::parse(condition)?
    };
    Ok(expr)
}

fn translate_condition(condition: &str, cli: &Cli) -> anyhow::Result<()> {
    if cli.verbose {
        println!("{} {}", "Input:".dimmed(), condition.yellow());
    }

    let config = load_config(cli)?;
    let expr = read_condition(condition, cli)?;
    let fragment = translate(&expr, &config)?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&fragment)?);
        }
        OutputFormat::Table => print_fragment(&fragment, config.dialect),
    }
    Ok(())
}

fn print_fragment(fragment: &Fragment, dialect: Dialect) {
    println!("{}", "Fragment:".green().bold());
    println!("{}", fragment.text().white());

    let params = fragment.parameters();
    if params.is_empty() {
        println!();
        println!("{}", "(no parameters)".dimmed());
        return;
    }

    println!();
    println!("{}", "Parameters:".cyan());
    for (ordinal, value) in params.iter() {
        let (kind, shown) = match value {
            BoundValue::Constant { value, .. } => ("const", value.to_string()),
            BoundValue::Variable { source, .. } => ("var", source.to_string()),
        };
        println!(
            "  {:>4}  {:6} {:7} {}",
            dialect.marker(ordinal).cyan(),
            kind.dimmed(),
            value.ty().to_string().white(),
            shown.yellow()
        );
    }
}

fn explain_condition(condition: &str, cli: &Cli) -> anyhow::Result<()> {
    println!("{}", "condsql Condition Explanation".cyan().bold());
    println!();
    println!("{} {}", "Condition:".dimmed(), condition.yellow());
    println!();

    let expr = read_condition(condition, cli)?;
    println!("{}", "Expression Tree:".green().bold());
    print_tree(&expr, 1);
    println!();
    println!(
        "  {} {}",
        "Bind values:".dimmed(),
        expr.bind_leaf_count().to_string().cyan()
    );

    let config = load_config(cli)?;
    println!();
    match translate(&expr, &config) {
        Ok(fragment) => {
            println!("{}", "Generated SQL:".green().bold());
            println!("  {}", fragment.text().white());
        }
        Err(e) => {
            println!("{}", "Not translatable:".yellow().bold());
            println!("  {}", e);
        }
    }
    Ok(())
}

fn print_tree(expr: &Expr, depth: usize) {
    let indent = "  ".repeat(depth);
    match expr {
        Expr::And { left, right } | Expr::Or { left, right } => {
            let name = if matches!(expr, Expr::And { .. }) { "AND" } else { "OR" };
            println!("{}{}", indent, name.cyan());
            print_tree(left, depth + 1);
            print_tree(right, depth + 1);
        }
        Expr::Not { operand } => {
            println!("{}{}", indent, "NOT".cyan());
            print_tree(operand, depth + 1);
        }
        Expr::Compare { left, op, right } => {
            println!("{}{} {}", indent, "Compare".cyan(), op.to_string().white());
            print_tree(left, depth + 1);
            print_tree(right, depth + 1);
        }
        Expr::Math { left, op, right } => {
            println!("{}{} {}", indent, "Math".cyan(), op.to_string().white());
            print_tree(left, depth + 1);
            print_tree(right, depth + 1);
        }
        Expr::IsNull { operand, stream_id } => {
            println!("{}{}", indent, "IS NULL".cyan());
            match (operand, stream_id) {
                (Some(operand), _) => print_tree(operand, depth + 1),
                (None, Some(stream)) => println!("{}  {} {}", indent, "stream".dimmed(), stream),
                (None, None) => {}
            }
        }
        Expr::In { operand, store_id } => {
            println!("{}{} {}", indent, "IN".cyan(), store_id.white());
            print_tree(operand, depth + 1);
        }
        Expr::Function {
            namespace,
            name,
            args,
        } => {
            let full = match namespace {
                Some(ns) if !ns.is_empty() => format!("{}:{}", ns, name),
                _ => name.clone(),
            };
            println!("{}{} {}", indent, "Function".cyan(), full.white());
            for arg in args {
                print_tree(arg, depth + 1);
            }
        }
        Expr::Constant { value, ty } => {
            println!("{}{} {} {}", indent, "Constant".dimmed(), value.to_string().yellow(), ty);
        }
        Expr::Parameter { index, ty } => {
            println!("{}{} ${} {}", indent, "Parameter".dimmed(), index.to_string().yellow(), ty);
        }
        Expr::StreamVariable { id, ty, .. } => {
            println!("{}{} {} {}", indent, "Stream var".dimmed(), id.yellow(), ty);
        }
        Expr::StoreVariable { attribute, ty, .. } => {
            println!("{}{} {} {}", indent, "Column".dimmed(), attribute.white(), ty);
        }
    }
}

fn show_dialects() {
    println!("{}", "condsql Dialects".cyan().bold());
    println!();
    println!(
        "{:12} {:10} {}",
        "Dialect".white().bold(),
        "Markers".white().bold(),
        "Not equal".white().bold()
    );
    println!("{}", "─".repeat(40).dimmed());

    for dialect in Dialect::ALL {
        let markers = format!("{}, {}", dialect.marker(0), dialect.marker(1));
        println!(
            "{:12} {:10} {}",
            dialect.name().cyan().bold(),
            markers.yellow(),
            dialect.not_equal().dimmed()
        );
    }
}
