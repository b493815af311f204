use crate::model::{Category, Dataset, TransactionRecord};
use anyhow::{Context, Result};
use log::info;
use rusqlite::{params, Connection};
use std::path::Path;

/// Outcome of loading a dataset into the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertStats {
    pub inserted: usize,
    pub duplicates: usize,
}

pub fn open_database(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Movements Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS movimentacoes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            idempotency_hash TEXT UNIQUE NOT NULL,
            mesano TEXT,
            descricao TEXT,
            tipo TEXT,
            documento TEXT,
            valor REAL,
            Local TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_mesano ON movimentacoes(mesano)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tipo ON movimentacoes(tipo)",
        [],
    )?;

    Ok(())
}

/// Append the dataset, skipping rows that are already present.
///
/// Identity is period + description + amount + position within the period,
/// so reloading an unchanged dataset inserts nothing.
pub fn insert_records(conn: &Connection, dataset: &Dataset) -> Result<InsertStats> {
    let mut stats = InsertStats::default();
    let tx = conn.unchecked_transaction()?;

    for (position, record) in dataset.positioned() {
        let hash = record.compute_idempotency_hash(position);

        let result = tx.execute(
            "INSERT INTO movimentacoes (
                idempotency_hash, mesano, descricao, tipo, documento, valor, Local
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                hash,
                record.period,
                record.description,
                record.category.label(),
                record.document_reference,
                record.amount,
                record.merchant_location,
            ],
        );

        match result {
            Ok(_) => stats.inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                stats.duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tx.commit()?;

    info!("Inserted: {} rows, skipped duplicates: {}", stats.inserted, stats.duplicates);

    Ok(stats)
}

/// Open (or create) the database and load the dataset into it
pub fn load_dataset_into_db(db_path: &Path, dataset: &Dataset) -> Result<InsertStats> {
    let conn = open_database(db_path)?;
    insert_records(&conn, dataset)
}

pub fn get_all_records(conn: &Connection) -> Result<Vec<TransactionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT mesano, descricao, tipo, documento, valor, Local
         FROM movimentacoes
         ORDER BY id",
    )?;

    let records = stmt
        .query_map([], |row| {
            let tipo: Option<String> = row.get(2)?;

            Ok(TransactionRecord {
                period: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                description: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                category: tipo.as_deref().map(Category::from_label).unwrap_or_default(),
                document_reference: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                amount: row.get::<_, Option<f64>>(4)?.unwrap_or_default(),
                merchant_location: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM movimentacoes", [], |row| row.get(0))?;

    Ok(count)
}

/// Statement period statistics
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodStat {
    pub period: String,
    pub transaction_count: i64,
    pub total_income: f64,
    pub total_expenses: f64,
}

/// Get statistics grouped by statement period
pub fn get_period_stats(conn: &Connection) -> Result<Vec<PeriodStat>> {
    let mut stmt = conn.prepare(
        "SELECT
            mesano,
            COUNT(*) as count,
            SUM(CASE WHEN valor > 0 THEN valor ELSE 0.0 END) as income,
            SUM(CASE WHEN valor < 0 THEN valor ELSE 0.0 END) as expenses
         FROM movimentacoes
         GROUP BY mesano
         ORDER BY substr(mesano, 4, 2), substr(mesano, 1, 2)",
    )?;

    let stats = stmt
        .query_map([], |row| {
            Ok(PeriodStat {
                period: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                transaction_count: row.get(1)?,
                total_income: row.get(2)?,
                total_expenses: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(stats)
}

// ============================================================================
// TESTS
// ============================================================================
