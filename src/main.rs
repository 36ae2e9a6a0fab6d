use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table as TextTable};
use configuration::{Config, TopCutPolicy, init_logging, load_config};
use core_types::{Item, ItemLossRecord, SalesRecord, Table, Tabular, WholesalePriceRecord};
use loader::load_inputs;
use reports::{Dataset, ReportId, ReportOutcome, ReportPipeline, select_reports};
use serde_json::{Map, json};
use std::path::PathBuf;

/// The main entry point for the sales analytics application.
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => handle_run(args),
        Commands::List => {
            handle_list();
            Ok(())
        }
        Commands::Schema => {
            handle_schema();
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Business reports over vegetable sales, wholesale price and loss snapshots.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the input tables and run the selected reports.
    Run(RunArgs),
    /// List every report id with its title.
    List,
    /// Print the expected columns of the four input files.
    Schema,
}

#[derive(Parser)]
struct RunArgs {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = "config.toml")]
    config: PathBuf,

    /// Run only this report (repeatable). Overrides `reports.enabled`.
    #[arg(long = "report", short = 'r')]
    reports: Vec<String>,

    /// How top-N reports treat ties at the cut. Overrides `reports.top_cut`.
    #[arg(long, value_enum)]
    top_cut: Option<TopCutPolicy>,

    /// Output format for report tables.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Run reports one after another instead of on the thread pool.
    #[arg(long)]
    sequential: bool,

    /// Print the first N rows of each input table before the reports.
    #[arg(long, value_name = "N")]
    preview: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

/// Loads configuration and data, runs the reports and renders every outcome.
fn handle_run(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    apply_overrides(&mut config, &args);

    // The guard must live until the end of the run so file logs are flushed.
    let _log_guard = init_logging(&config.logging)?;

    let selected = select_reports(&config.reports)?;
    let inputs = load_inputs(&config.data).context("Failed to load input tables")?;

    if let Some(n) = args.preview {
        let previews = [
            (Item::TABLE, &inputs.items),
            (SalesRecord::TABLE, &inputs.daily_sales),
            (WholesalePriceRecord::TABLE, &inputs.wholesale_prices),
            (ItemLossRecord::TABLE, &inputs.item_loss),
        ];
        for (name, table) in previews {
            println!("{} ({} rows)", name, table.len());
            println!("{}", text_table(&table.head(n)));
        }
    }

    let dataset = Dataset::new(
        inputs.items,
        inputs.daily_sales,
        inputs.wholesale_prices,
        inputs.item_loss,
    )?;
    let outcomes = ReportPipeline::from_settings(&config.reports).run(&dataset, &selected);

    match args.format {
        OutputFormat::Table => print_tables(&outcomes),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json_outcomes(&outcomes))?),
    }

    let failed: Vec<String> = outcomes
        .iter()
        .filter(|o| !o.is_ok())
        .map(|o| o.id.to_string())
        .collect();
    if !failed.is_empty() {
        bail!("{} of {} reports failed: {}", failed.len(), outcomes.len(), failed.join(", "));
    }
    Ok(())
}

/// Command-line flags win over the file and the environment.
fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if !args.reports.is_empty() {
        config.reports.enabled = Some(args.reports.clone());
    }
    if let Some(policy) = args.top_cut {
        config.reports.top_cut = policy;
    }
    if args.sequential {
        config.reports.parallel = false;
    }
}

fn print_tables(outcomes: &[ReportOutcome]) {
    for outcome in outcomes {
        println!("== {} ({})", outcome.id.title(), outcome.id);
        match &outcome.result {
            Ok(table) => println!("{}", text_table(table)),
            Err(e) => eprintln!("Error: {}", e),
        }
        println!();
    }
}

fn json_outcomes(outcomes: &[ReportOutcome]) -> serde_json::Value {
    let reports: Vec<serde_json::Value> = outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(table) => json!({
                "id": outcome.id,
                "title": outcome.id.title(),
                "columns": table.schema().names(),
                "rows": json_rows(table),
            }),
            Err(e) => json!({
                "id": outcome.id,
                "title": outcome.id.title(),
                "error": e.to_string(),
            }),
        })
        .collect();
    serde_json::Value::Array(reports)
}

/// Rows as objects keyed by column name.
fn json_rows(table: &Table) -> Vec<serde_json::Value> {
    let names = table.schema().names();
    table
        .rows()
        .iter()
        .map(|row| {
            let object: Map<String, serde_json::Value> = names
                .iter()
                .zip(row)
                .map(|(name, value)| (name.to_string(), json!(value)))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect()
}

fn text_table(table: &Table) -> TextTable {
    let mut out = TextTable::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(table.schema().names());
    for row in table.rows() {
        out.add_row(row.iter().map(|v| v.to_string()).collect::<Vec<_>>());
    }
    out
}

// ==============================================================================
// List & Schema Commands
// ==============================================================================

fn handle_list() {
    let mut out = TextTable::new();
    out.load_preset(UTF8_FULL).set_header(vec!["Report", "Title"]);
    for id in ReportId::ALL {
        out.add_row(vec![id.as_str(), id.title()]);
    }
    println!("{}", out);
}

fn handle_schema() {
    print_schema::<Item>();
    print_schema::<SalesRecord>();
    print_schema::<WholesalePriceRecord>();
    print_schema::<ItemLossRecord>();
}

fn print_schema<T: Tabular>() {
    let mut out = TextTable::new();
    out.load_preset(UTF8_FULL)
        .set_header(vec!["Source header", "Column", "Type"]);
    for (header, (column, data_type)) in T::SOURCE_HEADERS.iter().zip(T::COLUMNS) {
        out.add_row(vec![header.to_string(), column.to_string(), data_type.to_string()]);
    }
    println!("{}\n{}\n", T::TABLE, out);
}
