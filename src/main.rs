//! Livestock Premium CLI
//!
//! `table` prints Pr{Wt = k} for a list of hazard rates (optionally writing
//! CSV), `premium` runs the three premium stages.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use livestock_premium::distribution::{resolve_export_file_name, ColumnSummary};
use livestock_premium::format::format_significant;
use livestock_premium::premium::{PipelineReport, PremiumPipeline};
use livestock_premium::{Diagnostics, ModelConfig, ProbabilityTable};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "livestock_premium")]
#[command(version = "0.1.0")]
#[command(about = "Loss distribution and premium calculator for livestock insurance")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with model inputs (missing fields use defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Probability table Pr{Wt = k} for k = 0..n
    Table(TableArgs),
    /// Expectation, rate and total premium
    Premium(PremiumArgs),
}

#[derive(Args)]
struct TableArgs {
    /// Herd size (largest k)
    #[arg(long, allow_hyphen_values = true)]
    n: Option<i64>,
    /// Per-head loss probability
    #[arg(long)]
    q: Option<f64>,
    /// Time horizon in years
    #[arg(long, allow_hyphen_values = true)]
    t: Option<f64>,
    /// Comma-separated hazard rates, e.g. 0.000696,0.000325
    #[arg(long, allow_hyphen_values = true)]
    lambdas: Option<String>,
    /// Write the table as CSV (no value: default file name)
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    output: Option<String>,
}

#[derive(Args)]
struct PremiumArgs {
    #[arg(long, allow_hyphen_values = true)]
    lambda: Option<f64>,
    #[arg(long)]
    t: Option<f64>,
    #[arg(long)]
    n: Option<u32>,
    #[arg(long)]
    d: Option<u32>,
    #[arg(long)]
    u: Option<u32>,
    #[arg(long)]
    q: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    alpha: Option<f64>,
    /// Risk loading
    #[arg(long, allow_hyphen_values = true)]
    rho: Option<f64>,
    /// Expense loading
    #[arg(long, allow_hyphen_values = true)]
    eta: Option<f64>,
    /// Target loss ratio
    #[arg(long)]
    qt: Option<f64>,
    /// Price of one animal
    #[arg(long)]
    unit_price: Option<f64>,
}

#[derive(Serialize)]
struct TableOutput<'a> {
    table: &'a ProbabilityTable,
    column_totals: &'a [ColumnSummary],
    diagnostics: &'a Diagnostics,
}

#[derive(Serialize)]
struct PremiumOutput<'a> {
    report: &'a PipelineReport,
    diagnostics: &'a Diagnostics,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ModelConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ModelConfig::default(),
    };

    match cli.command {
        Commands::Table(args) => run_table(config, args, cli.json),
        Commands::Premium(args) => run_premium(config, args, cli.json),
    }
}

fn run_table(mut config: ModelConfig, args: TableArgs, json: bool) -> anyhow::Result<()> {
    let table_config = &mut config.table;
    if let Some(n) = args.n { table_config.n = n; }
    if let Some(q) = args.q { table_config.q = q; }
    if let Some(t) = args.t { table_config.t = t; }
    if let Some(lambdas) = args.lambdas { table_config.lambdas = lambdas; }

    let mut sink = Diagnostics::new();
    let table = table_config
        .build_table(&mut sink)
        .context("Failed to build probability table")?;
    let summaries = table.check_column_sums(&mut sink);

    if json {
        let output = TableOutput {
            table: &table,
            column_totals: &summaries,
            diagnostics: &sink,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if table.is_empty() {
        println!("No table produced.");
    } else {
        print_table(&table, table_config.n, table_config.q, table_config.t, &summaries);
    }

    if let Some(custom) = args.output.as_deref() {
        if table.is_empty() {
            log::warn!("table is empty; nothing written");
        } else {
            let file_name =
                resolve_export_file_name(Some(custom), table_config.n, table_config.q, table_config.t);
            table
                .write_csv_path(&file_name)
                .with_context(|| format!("Failed to write {}", file_name))?;
            if !json {
                println!("\nTable written to: {}", file_name);
            }
        }
    }

    if !json {
        print_diagnostics(&sink);
    }
    Ok(())
}

fn print_table(table: &ProbabilityTable, n: i64, q: f64, t: f64, summaries: &[ColumnSummary]) {
    println!("Parameters: n={}, q={}, t={}", n, q, t);
    println!();

    print!("{:>5}", "k");
    for label in table.labels() {
        print!(" {:>14}", label);
    }
    println!();
    println!("{}", "-".repeat(5 + 15 * table.columns.len()));

    for index in 0..table.row_count() {
        if let Some((k, values)) = table.row(index) {
            print!("{:>5}", k);
            for value in values {
                print!(" {:>14}", format_significant(value, 6));
            }
            println!();
        }
    }

    println!("\nTotal probability per lambda column:");
    for summary in summaries {
        let verdict = if summary.sums_to_one { "ok" } else { "NOT close to 1.0" };
        println!("  {:<14} {:.10}  {}", summary.label, summary.total, verdict);
    }
}

fn run_premium(mut config: ModelConfig, args: PremiumArgs, json: bool) -> anyhow::Result<()> {
    let premium = &mut config.premium;
    if let Some(v) = args.lambda { premium.stage1.lambda = v; }
    if let Some(v) = args.t { premium.stage1.t = v; }
    if let Some(v) = args.n { premium.stage1.n = v; }
    if let Some(v) = args.d { premium.stage1.d = v; }
    if let Some(v) = args.u { premium.stage1.u = v; }
    if let Some(v) = args.q { premium.stage1.q = v; }
    if let Some(v) = args.alpha { premium.stage1.alpha = v; }
    if let Some(v) = args.rho { premium.stage2.rho = v; }
    if let Some(v) = args.eta { premium.stage2.eta = v; }
    if let Some(v) = args.qt { premium.stage2.qt = v; }
    if let Some(v) = args.unit_price { premium.stage3.unit_price = v; }

    let mut sink = Diagnostics::new();
    let pipeline = PremiumPipeline::new();

    let result = pipeline
        .run_stage1(&premium.stage1, &mut sink)
        .and_then(|p| p.run_stage2(&premium.stage2))
        .and_then(|p| p.run_stage3(&premium.stage3));

    let complete = match result {
        Ok(complete) => complete,
        Err(err) => {
            print_diagnostics(&sink);
            return Err(anyhow::Error::new(err).context("Premium pipeline halted"));
        }
    };

    let report = complete
        .report()
        .context("Premium pipeline did not reach completion")?;

    if json {
        let output = PremiumOutput {
            report: &report,
            diagnostics: &sink,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Stage 1:");
    println!("  E[Wt(d,u)]:      {:.8}", report.statistics.expectation);
    println!("  StdDev[Wt(d,u)]: {:.8}", report.statistics.std_dev);
    println!("Stage 2:");
    println!("  P_bar_I:         {:.8}", report.premium_rate);
    println!("Stage 3:");
    println!("  P_TOTAL:         {:.8}", report.total_premium);

    print_diagnostics(&sink);
    Ok(())
}

fn print_diagnostics(sink: &Diagnostics) {
    if sink.is_empty() {
        return;
    }
    println!("\nDiagnostics:");
    for diagnostic in sink.iter() {
        println!("  - {}", diagnostic);
    }
}
