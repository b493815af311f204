// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use statement_ledger::config::{
    DEFAULT_DATABASE_FILE, DEFAULT_DATASET_FILE, DEFAULT_INTAKE_DIR, DEFAULT_LEDGER_FILE,
};
use statement_ledger::db::{get_all_records, get_period_stats, load_dataset_into_db, open_database, verify_count};
use statement_ledger::model::{Category, TransactionRecord};
use statement_ledger::report::{format_currency, summarize, totals_by_category, totals_by_period, ReportFilter};
use statement_ledger::{load_dataset, load_dataset_strict, run_batch, BatchConfig, PdfTextReader, SantanderParser, StatementParser};

#[derive(Parser, Debug)]
#[command(name = "statement-ledger", version, about = "Bank statement PDFs → JSON dataset + SQLite")]
struct Cli {
    #[command(flatten)]
    paths: PathArgs,

    /// Defaults to `ui`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct PathArgs {
    /// Directory holding `<mmm><yy>.pdf` statements
    #[arg(long, global = true, default_value = DEFAULT_INTAKE_DIR)]
    intake_dir: PathBuf,

    /// Processed-file ledger
    #[arg(long, global = true, default_value = DEFAULT_LEDGER_FILE)]
    ledger: PathBuf,

    /// Aggregate JSON dataset
    #[arg(long, global = true, default_value = DEFAULT_DATASET_FILE)]
    dataset: PathBuf,

    /// SQLite database
    #[arg(long, global = true, default_value = DEFAULT_DATABASE_FILE)]
    database: PathBuf,
}

impl PathArgs {
    fn into_config(self) -> BatchConfig {
        BatchConfig {
            intake_dir: self.intake_dir,
            ledger_path: self.ledger,
            dataset_path: self.dataset,
            database_path: self.database,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse new statements into the dataset, then load it into SQLite
    Import {
        /// Only update the JSON dataset
        #[arg(long)]
        no_db: bool,
    },

    /// Load the current dataset into SQLite
    LoadDb,

    /// Print totals, per-category and per-period sums
    Summary {
        /// Only these years (repeatable)
        #[arg(long = "year")]
        years: Vec<i32>,

        /// Only these types, e.g. pix, cartão (repeatable)
        #[arg(long = "category", value_parser = parse_category)]
        categories: Vec<Category>,

        /// Read records from SQLite instead of the JSON dataset
        #[arg(long)]
        from_db: bool,
    },

    /// Terminal dashboard
    Ui {
        /// Read records from SQLite instead of the JSON dataset
        #[arg(long)]
        from_db: bool,
    },
}

fn parse_category(value: &str) -> Result<Category, String> {
    let category = Category::from_label(value);
    if category == Category::Other && !value.trim().eq_ignore_ascii_case("outro") {
        let known: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
        return Err(format!("unknown category '{}' (expected one of: {})", value, known.join(", ")));
    }
    Ok(category)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.paths.into_config();

    match cli.command.unwrap_or(Command::Ui { from_db: false }) {
        Command::Import { no_db } => run_import(&config, no_db)?,
        Command::LoadDb => run_load_db(&config)?,
        Command::Summary {
            years,
            categories,
            from_db,
        } => run_summary(&config, ReportFilter { years, categories }, from_db)?,
        Command::Ui { from_db } => run_ui_mode(&config, from_db)?,
    }

    Ok(())
}

fn run_import(config: &BatchConfig, no_db: bool) -> Result<()> {
    println!("🗄️  Statement Import - PDF → JSON dataset");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Parse new statements
    println!("\n📂 Scanning {}...", config.intake_dir.display());
    let parser = SantanderParser::new()?;
    let report = run_batch(config, &parser, &PdfTextReader::new())?;

    for name in &report.skipped {
        println!("  · {} already processed", name);
    }

    if report.is_noop() {
        println!("✓ No new statements");
    } else {
        for file in &report.processed {
            println!("✓ {} ({}): {} transactions", file.file_name, file.period, file.records);
        }
        println!(
            "✓ Appended {} transactions (parser v{}), dataset now holds {}",
            report.records_appended,
            parser.version(),
            report.dataset_len
        );
        println!("✓ Saved {} and {}", config.dataset_path.display(), config.ledger_path.display());
    }

    // 2. Load into SQLite
    if no_db {
        println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("✅ Import complete (database skipped)");
        return Ok(());
    }

    run_load_db(config)
}

fn run_load_db(config: &BatchConfig) -> Result<()> {
    println!("\n🔧 Loading {} into {}...", config.dataset_path.display(), config.database_path.display());
    let dataset = load_dataset(&config.dataset_path);
    let stats = load_dataset_into_db(&config.database_path, &dataset)?;
    println!("✓ Inserted {} rows, {} already present", stats.inserted, stats.duplicates);

    // Verify against the table itself
    println!("\n🔍 Verifying database...");
    let conn = open_database(&config.database_path)?;
    let count = verify_count(&conn)?;
    println!("✓ Database contains {} transactions", count);

    for stat in get_period_stats(&conn)? {
        println!(
            "  {:>6}  {:>4} tx  in {:>16}  out {:>16}",
            stat.period,
            stat.transaction_count,
            format_currency(stat.total_income),
            format_currency(stat.total_expenses)
        );
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if count == dataset.len() as i64 {
        println!("✅ Database in sync with dataset: {} transactions", count);
    } else {
        println!("✅ Load complete");
        println!("✓ Dataset: {} | Database: {}", dataset.len(), count);
    }

    Ok(())
}

fn load_records(config: &BatchConfig, from_db: bool) -> Result<(Vec<TransactionRecord>, String)> {
    if from_db {
        if !config.database_path.exists() {
            bail!(
                "Database not found: {} (run `statement-ledger import` first)",
                config.database_path.display()
            );
        }
        let conn = open_database(&config.database_path)?;
        let records = get_all_records(&conn)
            .with_context(|| format!("Failed to read {}", config.database_path.display()))?;
        Ok((records, config.database_path.display().to_string()))
    } else {
        // Unlike the batch, a missing or corrupt dataset is an error here
        let dataset = load_dataset_strict(&config.dataset_path)
            .context("Run `statement-ledger import` to create the dataset")?;
        Ok((dataset.records, config.dataset_path.display().to_string()))
    }
}

fn run_summary(config: &BatchConfig, filter: ReportFilter, from_db: bool) -> Result<()> {
    let (records, source) = load_records(config, from_db)?;
    let records = filter.apply(&records);
    let summary = summarize(&records);

    println!("📊 Summary of {}", source);
    if !filter.is_empty() {
        let years: Vec<String> = filter.years.iter().map(|y| y.to_string()).collect();
        let categories: Vec<&str> = filter.categories.iter().map(|c| c.label()).collect();
        println!("   years: [{}]  types: [{}]", years.join(", "), categories.join(", "));
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Entradas   {:>18}", format_currency(summary.income));
    println!("  Saídas     {:>18}", format_currency(summary.expenses));
    println!("  Saldo      {:>18}", format_currency(summary.balance));
    println!("  Movimentos {:>18}", summary.count);

    println!("\nPor tipo:");
    for (category, total) in totals_by_category(&records) {
        println!("  {:<14} {:>18}", category.label(), format_currency(total));
    }

    println!("\nPor período:");
    for (period, stats) in totals_by_period(&records) {
        println!(
            "  {:<6} {:>4} tx  {:>18}",
            period,
            stats.count,
            format_currency(stats.balance)
        );
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &BatchConfig, from_db: bool) -> Result<()> {
    println!("🖥️  Loading Statement Ledger UI...\n");

    println!("📊 Loading transactions...");
    let (records, source) = load_records(config, from_db)?;

    if records.is_empty() {
        eprintln!("❌ No transactions in {}", source);
        eprintln!("   Run: statement-ledger import");
        eprintln!("   to parse statements first.");
        std::process::exit(1);
    }

    println!("✓ Loaded {} transactions\n", records.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(records, source);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &BatchConfig, _from_db: bool) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: statement-ledger summary");
    std::process::exit(1);
}
