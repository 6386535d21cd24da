use anyhow::Result;
use assert_cmd::prelude::*;
use duckdb::Connection;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const PROJECT: &str = r#"
name: trade_dq
version: "1.0.0"
run:
  default-limit: 10
  timeout-secs: 30
"#;

const CONNECTIONS: &str = r#"
systems:
  - name: Trade System
    database: data/trade.duckdb
  - name: Settlement System
    database: data/settlement.duckdb
  - name: Reporting System
    database: data/reporting.duckdb
"#;

const MAPPINGS: &str = r#"
mappings:
  Symbol:
    Trade System: symbol
    Settlement System: symbol
    Reporting System: instrument_symbol
  Counterparty:
    Trade System: null
    Settlement System: counterparty_name
    Reporting System: counterparty_name
"#;

const GRAPH: &str = r#"
nodes:
  - { id: cde_qty, labels: [CDE], properties: { name: Quantity, dataType: integer, columnName: quantity } }
  - { id: cde_sym, labels: [CDE], properties: { name: Symbol, dataType: string } }
  - { id: cde_cpty, labels: [CDE], properties: { name: Counterparty, dataType: string } }
  - { id: cde_side, labels: [CDE], properties: { name: Side, dataType: string, columnName: side } }
  - { id: cde_date, labels: [CDE], properties: { name: TradeDate, dataType: date, columnName: trade_date } }
  - { id: r_qty, labels: [DQRule], properties: { id: DQ_QTY_POS, description: Quantity must be positive, ruleType: POSITIVE_VALUE } }
  - { id: r_sym, labels: [DQRule], properties: { id: DQ_SYMBOL_NN, description: Symbol must not be null, ruleType: NOT_NULL } }
  - { id: r_cpty, labels: [DQRule], properties: { id: DQ_CPTY_NN, description: Counterparty must not be null, ruleType: NOT_NULL } }
  - { id: r_side, labels: [DQRule], properties: { id: DQ_SIDE_ENUM, description: Side must be either BUY or SELL, ruleType: ENUM_VALUE } }
  - { id: r_date, labels: [DQRule], properties: { id: DQ_DATE_NN, description: Trade date must not be null, ruleType: NOT_NULL } }
  - { id: s_trade, labels: [System], properties: { name: Trade System } }
  - { id: s_settle, labels: [System], properties: { name: Settlement System } }
  - { id: s_report, labels: [System], properties: { name: Reporting System } }
relationships:
  - { type: HAS_RULE, from: cde_qty, to: r_qty }
  - { type: HAS_RULE, from: cde_sym, to: r_sym }
  - { type: HAS_RULE, from: cde_cpty, to: r_cpty }
  - { type: HAS_RULE, from: cde_side, to: r_side }
  - { type: HAS_RULE, from: cde_date, to: r_date }
  - { type: USED_IN_SYSTEM, from: cde_qty, to: s_trade }
  - { type: USED_IN_SYSTEM, from: cde_qty, to: s_settle }
  - { type: HAS_CDE, from: s_report, to: cde_qty }
  - { type: USED_IN_SYSTEM, from: cde_cpty, to: s_settle }
"#;

/// Temp project with three seeded DuckDB systems.
struct CrosscheckTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl CrosscheckTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().join("trade_dq");
        fs::create_dir_all(root.join("config"))?;
        fs::create_dir_all(root.join("graph"))?;
        fs::create_dir_all(root.join("data"))?;

        fs::write(root.join("crosscheck.yaml"), PROJECT)?;
        fs::write(root.join("config/connections.yml"), CONNECTIONS)?;
        fs::write(root.join("config/mappings.yml"), MAPPINGS)?;
        fs::write(root.join("graph/metadata.yaml"), GRAPH)?;

        seed(
            &root.join("data/trade.duckdb"),
            "CREATE TABLE trade (uitid VARCHAR, quantity INTEGER, symbol VARCHAR, side VARCHAR, trade_date DATE);
             INSERT INTO trade VALUES
               ('UIT-0001-ABC', 100, 'AAPL', 'BUY', DATE '2024-01-15'),
               ('UIT-0002-XYZ', -15, 'MSFT', 'SELL', DATE '2024-01-16'),
               ('UIT-0003-DEF', 10, 'GOOG', 'BUY', DATE '2024-01-17');",
        )?;
        seed(
            &root.join("data/settlement.duckdb"),
            "CREATE TABLE trade (uitid VARCHAR, quantity INTEGER, symbol VARCHAR, side VARCHAR, trade_date DATE, counterparty_name VARCHAR);
             INSERT INTO trade VALUES
               ('UIT-0001-ABC', 100, 'AAPL', 'BUY', DATE '2024-01-15', 'ACME Bank'),
               ('UIT-0002-XYZ', 15, 'MSFT', 'SELL', DATE '2024-01-16', 'Globex'),
               ('UIT-0003-DEF', 10, NULL, 'BUY', DATE '2024-01-17', 'Initech');",
        )?;
        seed(
            &root.join("data/reporting.duckdb"),
            "CREATE TABLE trade (uitid VARCHAR, quantity INTEGER, instrument_symbol VARCHAR, side VARCHAR, trade_date DATE, counterparty_name VARCHAR);
             INSERT INTO trade VALUES
               ('UIT-0001-ABC', 100, 'AAPL', 'BUY', NULL, 'ACME Bank'),
               ('UIT-0002-XYZ', 15, 'MSFT', 'SELL', DATE '2024-01-16', 'Globex'),
               ('UIT-0003-DEF', 10, 'GOOG', 'BUY', DATE '2024-01-17', 'Initech');",
        )?;

        Ok(Self { _tmp: tmp, root })
    }

    /// Adds a fourth system whose database file does not exist.
    fn with_offline_system(self) -> Result<Self> {
        let connections = format!(
            "{}  - name: Archive System\n    database: data/archive.duckdb\n",
            CONNECTIONS
        );
        fs::write(self.root.join("config/connections.yml"), connections)?;
        Ok(self)
    }

    fn crosscheck(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("crosscheck"));
        cmd.current_dir(&self.root);
        cmd
    }
}

fn seed(path: &Path, sql: &str) -> Result<()> {
    let conn = Connection::open(path)?;
    conn.execute_batch(sql)?;
    Ok(())
}

#[test]
fn test_csv_grid_across_three_systems() -> Result<()> {
    let env = CrosscheckTestEnv::new()?;

    env.crosscheck()
        .args(["run", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "CDE,Rule,Key,Trade System,Settlement System,Reporting System\n",
        ))
        .stdout(predicate::str::contains(
            "Quantity,Quantity must be positive,UIT-0002-XYZ,VIOLATION,OK,OK\n",
        ))
        .stdout(predicate::str::contains(
            "Symbol,Symbol must not be null,UIT-0003-DEF,OK,VIOLATION,OK\n",
        ))
        .stdout(predicate::str::contains(
            "Counterparty,Counterparty must not be null,UIT-0001-ABC,-,OK,OK\n",
        ))
        .stdout(predicate::str::contains(
            "TradeDate,Trade date must not be null,UIT-0001-ABC,OK,OK,VIOLATION\n",
        ));
    Ok(())
}

#[test]
fn test_summary_and_fail_on_violation() -> Result<()> {
    let env = CrosscheckTestEnv::new()?;

    env.crosscheck()
        .args(["run", "--format", "summary", "--fail-on-violation"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("CDEs validated: 5"))
        .stdout(predicate::str::contains("Keys checked: 3"))
        .stdout(predicate::str::contains("Total violations: 3"))
        .stdout(predicate::str::contains("- Quantity: UIT-0002-XYZ - Trade System"))
        .stdout(predicate::str::contains("- Trade System: 1/3 (33.33%)"))
        .stdout(predicate::str::contains("- Reporting System: 1/3 (33.33%)"));
    Ok(())
}

#[test]
fn test_explicit_key_and_cde_selection() -> Result<()> {
    let env = CrosscheckTestEnv::new()?;

    env.crosscheck()
        .args(["run", "--keys", "UIT-0001-ABC", "--cde", "Symbol", "--format", "csv"])
        .assert()
        .success()
        .stdout(
            "CDE,Rule,Key,Trade System,Settlement System,Reporting System\n\
             Symbol,Symbol must not be null,UIT-0001-ABC,OK,OK,OK\n",
        );
    Ok(())
}

#[test]
fn test_saved_json_run_can_be_re_rendered() -> Result<()> {
    let env = CrosscheckTestEnv::new()?;

    env.crosscheck()
        .args(["run", "--cde", "Quantity", "--format", "json", "--output", "out/run.json"])
        .assert()
        .success();
    assert!(env.root.join("out/run.json").exists());

    env.crosscheck()
        .args(["report", "--input", "out/run.json", "--format", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total violations: 1"))
        .stdout(predicate::str::contains("- Quantity: UIT-0002-XYZ - Trade System"));
    Ok(())
}

#[test]
fn test_malformed_saved_run_gives_error_report() -> Result<()> {
    let env = CrosscheckTestEnv::new()?;
    fs::write(env.root.join("broken.json"), "{ \"cells\": 42 }")?;

    env.crosscheck()
        .args(["report", "--input", "broken.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("REPORT ERROR"))
        .stdout(predicate::str::contains("Malformed report input"));
    Ok(())
}

#[test]
fn test_unknown_cde_renders_failed_run() -> Result<()> {
    let env = CrosscheckTestEnv::new()?;

    env.crosscheck()
        .args(["run", "--cde", "Notional"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("(FAILED)"))
        .stderr(predicate::str::contains("Unknown CDE 'Notional'"));
    Ok(())
}

#[test]
fn test_offline_system_degrades_to_unavailable() -> Result<()> {
    let env = CrosscheckTestEnv::new()?.with_offline_system()?;

    env.crosscheck()
        .args(["run", "--cde", "Quantity", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Quantity,Quantity must be positive,UIT-0002-XYZ,VIOLATION,OK,OK,-\n",
        ));
    assert!(!env.root.join("data/archive.duckdb").exists());
    Ok(())
}

#[test]
fn test_ping_reports_totals() -> Result<()> {
    let env = CrosscheckTestEnv::new()?;
    env.crosscheck()
        .arg("ping")
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Trade System (duckdb)"))
        .stdout(predicate::str::contains("Successful: 3 | Failed: 0"));

    let env = env.with_offline_system()?;
    env.crosscheck()
        .arg("ping")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("❌ Archive System"))
        .stdout(predicate::str::contains("Successful: 3 | Failed: 1"));
    Ok(())
}

#[test]
fn test_catalog_rules_view() -> Result<()> {
    let env = CrosscheckTestEnv::new()?;

    env.crosscheck()
        .args(["catalog", "--view", "rules"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DQ_SIDE_ENUM"))
        .stdout(predicate::str::contains("ENUM_VALUE [BUY, SELL]"))
        .stdout(predicate::str::contains("instrument_symbol"));
    Ok(())
}

#[test]
fn test_missing_project_config_fails() -> Result<()> {
    let tmp = tempfile::tempdir()?;

    Command::new(assert_cmd::cargo::cargo_bin!("crosscheck"))
        .args(["run", "--project-dir"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load project configuration"));
    Ok(())
}
