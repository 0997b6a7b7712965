//! sqlpig command-line interface: SQL to Pig Latin.
//!
//! # Usage
//!
//! ```bash
//! # Translate a query
//! sqlpig "select uri from logs where mvid = 'x' group by uri"
//!
//! # Restrict the load to one hour of one day
//! sqlpig "select uri from logs" --date 2013-05-01 --hour 08
//!
//! # Read the query from stdin
//! echo "select uri from logs" | sqlpig
//! ```

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sqlpig::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlpig")]
#[command(version)]
#[command(about = "Translate SQL SELECT queries into Pig Latin scripts", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "EXAMPLES:
    sqlpig 'select a from b where c = 1'
    sqlpig 'select uri from logs group by uri' --date 2013-05-01 --hour 08
    sqlpig explain 'select a from b where a between 1 and 2'")]
struct Cli {
    /// The SQL query to translate (read from stdin when omitted)
    query: Option<String>,

    /// Load only this day's partition
    #[arg(short, long)]
    date: Option<String>,

    /// Load only this hour of the day given by --date
    #[arg(long)]
    hour: Option<String>,

    /// Configuration file
    #[arg(short, long, env = "SQLPIG_CONFIG")]
    config: Option<PathBuf>,

    /// Reject fields outside the configured whitelist
    #[arg(long)]
    strict_fields: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a query and show its structure and translation
    Explain {
        /// The SQL query to explain
        query: String,
    },
    /// List the field whitelist
    Fields,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = PigConfig::discover(cli.config.as_deref())?;
    if cli.strict_fields {
        config.check_fields = true;
    }
    let grammar = Grammar::new(config.max_depth);
    let window = LoadWindow::new(cli.date.clone(), cli.hour.clone());

    match &cli.command {
        Some(Commands::Explain { query }) => explain_query(&grammar, &config, &window, query),
        Some(Commands::Fields) => {
            show_fields(&config);
            Ok(())
        }
        None => {
            let query = match &cli.query {
                Some(query) => query.clone(),
                None => read_query()?,
            };
            let script = sqlpig::translate_with(&grammar, &config, &query, &window)?;
            match cli.format {
                OutputFormat::Text => print!("{}", script),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&script)?),
            }
            Ok(())
        }
    }
}

/// First non-blank line of stdin.
fn read_query() -> anyhow::Result<String> {
    for line in std::io::stdin().lock().lines() {
        let line = line.context("reading query from stdin")?;
        if !line.trim().is_empty() {
            return Ok(line);
        }
    }
    bail!("no query given; pass one as an argument or on stdin")
}

fn explain_query(
    grammar: &Grammar,
    config: &PigConfig,
    window: &LoadWindow,
    query: &str,
) -> anyhow::Result<()> {
    println!("{}", "Query Explanation".cyan().bold());
    println!();
    println!("{} {}", "Query:".dimmed(), query.yellow());
    println!();

    let stmt = grammar.parse(query)?;

    println!("{}", "Parsed Structure:".green().bold());
    if let Some(quantifier) = &stmt.core.quantifier {
        println!("  {} {}", "Quantifier:".dimmed(), quantifier.to_string().cyan());
    }
    println!("  {}", "Columns:".dimmed());
    for column in stmt.columns() {
        println!("    • {}", column.to_string().white());
    }
    if let Some(from) = &stmt.core.from {
        println!("  {} {}", "From:".dimmed(), from.to_string().white());
    }
    if let Some(predicate) = stmt.where_expr() {
        println!("  {} {}", "Where:".dimmed(), predicate.to_pig().white());
    }
    if let Some(terms) = stmt.group_terms() {
        let terms: Vec<String> = terms.iter().map(ToPig::to_pig).collect();
        println!("  {} {}", "Group by:".dimmed(), terms.join(", ").white());
    }
    if let Some(having) = stmt.having_expr() {
        println!("  {} {}", "Having:".dimmed(), having.to_string().white());
    }
    if let Some(terms) = stmt.order_by_terms() {
        let terms: Vec<String> = terms.iter().map(ToString::to_string).collect();
        println!("  {} {}", "Order by:".dimmed(), terms.join(", ").white());
    }
    if let Some(limit) = stmt.limit_terms() {
        let offset = limit.offset.map(|o| format!(" offset {}", o)).unwrap_or_default();
        println!("  {} {}{}", "Limit:".dimmed(), limit.count, offset);
    }
    for (op, core) in &stmt.compounds {
        println!("  {} {}", op.to_string().cyan(), core.to_string().white());
    }

    println!();
    println!("{}", "Pig Latin:".green().bold());
    let script = Translator::new(config).translate(&stmt, window)?;
    for statement in script.statements() {
        println!("  {}", statement.white());
    }

    println!();
    println!("{}", "AST:".green().bold());
    println!("{}", serde_json::to_string_pretty(&stmt)?);
    Ok(())
}

fn show_fields(config: &PigConfig) {
    let status = if config.check_fields {
        "enforced".green()
    } else {
        "not enforced".yellow()
    };
    println!("{} ({})", "Field whitelist".cyan().bold(), status);
    println!("{}", "─".repeat(40).dimmed());
    for field in &config.fields {
        println!("  {}", field.white());
    }
}
