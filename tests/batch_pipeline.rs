// End-to-end batch runs over a temp intake directory with in-memory text

use statement_ledger::db::{get_all_records, load_dataset_into_db, open_database, verify_count};
use statement_ledger::model::Category;
use statement_ledger::{
    load_dataset, run_batch, BatchConfig, MemoryTextSource, ProcessedLedger, SantanderParser,
    StatementError,
};
use std::fs;
use tempfile::TempDir;

const DEZ24: &[&str] = &[
    "Extrato Consolidado Inteligente\n\
     COMPRACARTAODEBMC 594461 10,50-\n\
     12/12CANTINA SAO PAULO\n\
     PIX RECEBIDO 881 250,00\n\
     FULANO DE TAL",
    "CREDITO DE SALARIO - 3.500,00\n\
     EMPRESA XYZ LTDA\n\
     Saldos por Período\n\
     PIX ENVIADO 1 99,00-",
];

const JAN25: &[&str] = &["REMUNERACAO APLICACAO AUTOMATICA - 0,42\n\
                          APLICACAO AUTOMATICA\n\
                          PAGAMENTO DE BOLETO 77 1.234,56-\n\
                          PAGAMENTO DE BOLETO 78 10,00-"];

fn workspace(files: &[&str]) -> (TempDir, BatchConfig) {
    let dir = TempDir::new().unwrap();
    let config = BatchConfig::rooted_at(dir.path());
    fs::create_dir_all(&config.intake_dir).unwrap();
    for name in files {
        fs::write(config.intake_dir.join(name), b"%PDF-1.4").unwrap();
    }
    (dir, config)
}

fn source() -> MemoryTextSource {
    let mut source = MemoryTextSource::new();
    source.insert_text("dez24.pdf", DEZ24);
    source.insert_text("jan25.pdf", JAN25);
    source
}

#[test]
fn first_run_parses_every_statement() {
    let (_dir, config) = workspace(&["jan25.pdf", "dez24.pdf"]);
    let parser = SantanderParser::new().unwrap();

    let report = run_batch(&config, &parser, &source()).unwrap();

    let names: Vec<&str> = report.processed.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(names, vec!["dez24.pdf", "jan25.pdf"]);
    assert_eq!(report.processed[0].period, "12/24");
    assert_eq!(report.processed[0].records, 3);
    assert_eq!(report.processed[1].records, 3);
    assert_eq!(report.records_appended, 6);

    let dataset = load_dataset(&config.dataset_path);
    assert_eq!(dataset.len(), 6);

    let card = &dataset.records[0];
    assert_eq!(card.category, Category::Card);
    assert_eq!(card.amount, -10.50);
    assert_eq!(card.merchant_location, "12/12CANTINA");

    let salary = &dataset.records[2];
    assert_eq!(salary.category, Category::Salary);
    assert_eq!(salary.merchant_location, "EMPRESA XYZ LTDA");

    // Yield swallows its follow-up line without keeping it
    let yield_credit = &dataset.records[3];
    assert_eq!(yield_credit.period, "01/25");
    assert_eq!(yield_credit.category, Category::Yield);
    assert_eq!(yield_credit.merchant_location, "");

    // Consecutive transactions: the second is not eaten as a merchant line
    assert_eq!(dataset.records[4].amount, -1234.56);
    assert_eq!(dataset.records[4].merchant_location, "");
    assert_eq!(dataset.records[5].category, Category::Slip);

    // Nothing after the stop marker
    assert!(dataset.records.iter().all(|r| r.amount != -99.0));

    let ledger = ProcessedLedger::load(&config.ledger_path);
    assert_eq!(ledger.files().collect::<Vec<_>>(), vec!["dez24.pdf", "jan25.pdf"]);
}

#[test]
fn second_run_without_new_files_rewrites_nothing() {
    let (_dir, config) = workspace(&["dez24.pdf"]);
    let parser = SantanderParser::new().unwrap();
    run_batch(&config, &parser, &source()).unwrap();

    let dataset_before = fs::read(&config.dataset_path).unwrap();
    let ledger_before = fs::read(&config.ledger_path).unwrap();
    let modified_before = fs::metadata(&config.dataset_path).unwrap().modified().unwrap();

    let report = run_batch(&config, &parser, &source()).unwrap();

    assert!(report.is_noop());
    assert_eq!(report.skipped, vec!["dez24.pdf"]);
    assert_eq!(report.dataset_len, 3);
    assert_eq!(fs::read(&config.dataset_path).unwrap(), dataset_before);
    assert_eq!(fs::read(&config.ledger_path).unwrap(), ledger_before);
    assert_eq!(
        fs::metadata(&config.dataset_path).unwrap().modified().unwrap(),
        modified_before
    );
}

#[test]
fn new_statement_appends_to_existing_dataset() {
    let (_dir, config) = workspace(&["dez24.pdf"]);
    let parser = SantanderParser::new().unwrap();
    run_batch(&config, &parser, &source()).unwrap();

    fs::write(config.intake_dir.join("jan25.pdf"), b"%PDF-1.4").unwrap();
    let report = run_batch(&config, &parser, &source()).unwrap();

    assert_eq!(report.processed.len(), 1);
    assert_eq!(report.processed[0].file_name, "jan25.pdf");
    assert_eq!(report.dataset_len, 6);
    assert_eq!(load_dataset(&config.dataset_path).len(), 6);
}

#[test]
fn unknown_month_aborts_without_writing() {
    let (_dir, config) = workspace(&["dez24.pdf", "xyz24.pdf"]);
    let mut source = source();
    source.insert_text("xyz24.pdf", DEZ24);
    let parser = SantanderParser::new().unwrap();

    let err = run_batch(&config, &parser, &source).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StatementError>(),
        Some(StatementError::UnknownPeriodToken { .. })
    ));
    assert!(!config.dataset_path.exists());
    assert!(!config.ledger_path.exists());
}

#[test]
fn malformed_amount_leaves_previous_state_untouched() {
    let (_dir, config) = workspace(&["dez24.pdf"]);
    let parser = SantanderParser::new().unwrap();
    run_batch(&config, &parser, &source()).unwrap();

    let dataset_before = fs::read(&config.dataset_path).unwrap();
    let ledger_before = fs::read(&config.ledger_path).unwrap();

    fs::write(config.intake_dir.join("fev25.pdf"), b"%PDF-1.4").unwrap();
    let mut source = source();
    source.insert_text("fev25.pdf", &["PIX ENVIADO 1 1,00\nPIX ENVIADO 2 -2,00-"]);

    let err = run_batch(&config, &parser, &source).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StatementError>(),
        Some(StatementError::MalformedAmountToken { .. })
    ));
    assert_eq!(fs::read(&config.dataset_path).unwrap(), dataset_before);
    assert_eq!(fs::read(&config.ledger_path).unwrap(), ledger_before);
}

#[test]
fn loading_dataset_into_database_twice_is_idempotent() {
    let (_dir, config) = workspace(&["dez24.pdf", "jan25.pdf"]);
    let parser = SantanderParser::new().unwrap();
    run_batch(&config, &parser, &source()).unwrap();
    let dataset = load_dataset(&config.dataset_path);

    let first = load_dataset_into_db(&config.database_path, &dataset).unwrap();
    let second = load_dataset_into_db(&config.database_path, &dataset).unwrap();

    assert_eq!(first.inserted, 6);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.duplicates, 6);

    let conn = open_database(&config.database_path).unwrap();
    assert_eq!(verify_count(&conn).unwrap(), 6);
    assert_eq!(get_all_records(&conn).unwrap(), dataset.records);
}
