use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use relative_date::{
    parse_reference, parse_timezone, Backfill, Columns, Granularity, RelativeExpression,
    ResolvedDate,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Parser)]
#[command(
    name = "reldate",
    version,
    about = "Resolve relative date phrases (\"3 years ago\") into calendar dates"
)]
struct Cli {
    /// IANA timezone for reading reference timestamps and taking calendar dates
    #[arg(long, global = true, env = "RELDATE_TIMEZONE", default_value = "UTC")]
    timezone: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one expression and print the date
    Resolve(ResolveArgs),
    /// Fill year/month/day fields on a JSON array of rows
    Backfill(BackfillArgs),
}

#[derive(Args)]
struct ResolveArgs {
    /// The relative expression, e.g. "a month ago"
    expression: String,

    /// Reference timestamp (defaults to now)
    #[arg(short, long)]
    reference: Option<String>,

    /// Print a JSON object instead of a bare date
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BackfillArgs {
    /// Input JSON file (omit or use "-" for stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file for updated rows (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fallback reference for rows without one (defaults to now)
    #[arg(long)]
    now: Option<String>,

    #[arg(long, default_value = "date_text")]
    expression_column: String,

    #[arg(long, default_value = "captured_at")]
    reference_column: String,

    #[arg(long, default_value = "year")]
    year_column: String,

    #[arg(long, default_value = "month")]
    month_column: String,

    #[arg(long, default_value = "day")]
    day_column: String,

    /// Resolve and print the summary only; write no rows
    #[arg(long)]
    dry_run: bool,
}

/// JSON shape of `resolve --json`.
#[derive(Serialize)]
struct ResolveOutput {
    expression: String,
    canonical: Option<String>,
    reference: String,
    granularity: Option<Granularity>,
    resolved: Option<ResolvedDate>,
}

fn main() {
    // Variables already in the environment take precedence over .env.
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("RELDATE_LOG", "warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let tz = parse_timezone(&cli.timezone)?;
    match cli.command {
        Command::Resolve(args) => cmd_resolve(args, tz),
        Command::Backfill(args) => cmd_backfill(args, tz),
    }
}

fn cmd_resolve(args: ResolveArgs, tz: Tz) -> Result<()> {
    let reference = match &args.reference {
        Some(text) => parse_reference(text, tz).context("reading --reference")?,
        None => Utc::now().with_timezone(&tz),
    };

    let parsed = RelativeExpression::parse(&args.expression);
    let resolved = parsed.and_then(|expr| expr.resolve(&reference));
    log::debug!(
        "'{}' against {} -> {:?}",
        args.expression,
        reference.to_rfc3339(),
        resolved
    );

    let mut stdout = io::stdout().lock();
    if args.json {
        let output = ResolveOutput {
            expression: args.expression,
            canonical: parsed.map(|expr| expr.to_string()),
            reference: reference.to_rfc3339(),
            granularity: parsed.filter(|_| resolved.is_some()).map(|expr| expr.granularity()),
            resolved,
        };
        serde_json::to_writer_pretty(&mut stdout, &output)?;
        writeln!(stdout)?;
    } else {
        match resolved {
            Some(date) => writeln!(stdout, "{date}")?,
            None => writeln!(stdout, "no match")?,
        }
    }
    Ok(())
}

fn cmd_backfill(args: BackfillArgs, tz: Tz) -> Result<()> {
    let fallback: DateTime<Utc> = match &args.now {
        Some(text) => parse_reference(text, tz)
            .context("reading --now")?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let raw = read_input(args.input.as_ref())?;
    let mut rows = match serde_json::from_str::<Value>(&raw).context("parsing input JSON")? {
        Value::Array(rows) => rows,
        other => bail!("expected a JSON array of rows, got {}", json_kind(&other)),
    };

    let columns = Columns {
        expression: args.expression_column,
        reference: args.reference_column,
        year: args.year_column,
        month: args.month_column,
        day: args.day_column,
    };
    let report = Backfill::new(columns, tz, fallback).apply(&mut rows);
    log::info!(
        "{} rows: {} updated, {} no match, {} missing expression, {} skipped",
        report.total,
        report.updated,
        report.no_match,
        report.missing_expression,
        report.skipped
    );

    let summary = serde_json::json!({
        "total": report.total,
        "updated": report.updated,
        "no_match": report.no_match,
        "missing_expression": report.missing_expression,
        "skipped": report.skipped,
    });

    if args.dry_run {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
        return Ok(());
    }

    let body = serde_json::to_string_pretty(&rows)?;
    match &args.output {
        Some(path) => fs::write(path, body + "\n")
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{body}")?;
        }
    }
    eprintln!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
