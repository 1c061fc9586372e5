use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn facture_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("facture"))
}

#[test]
fn test_help() {
    facture_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Minimal CLI for quotes and invoices",
        ));
}

#[test]
fn test_version() {
    facture_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("facture"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized facture config"));

    // Check files were created
    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("clients.toml").exists());
    assert!(config_path.join("items.toml").exists());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    // First init should succeed
    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    // Second init should fail
    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_clients_list() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "clients"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exemple-client"))
        .stdout(predicate::str::contains("Client Exemple SA"));
}

#[test]
fn test_items_list() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "items"])
        .assert()
        .success()
        .stdout(predicate::str::contains("conseil"))
        .stdout(predicate::str::contains("Prestation de conseil"))
        .stdout(predicate::str::contains("25 000,00 FCFA"))
        .stdout(predicate::str::contains("19,25%"));
}

#[test]
fn test_status_shows_next_numbers() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Facture Status"))
        .stdout(predicate::str::contains("Next devis:"))
        .stdout(predicate::str::contains("DEV-"))
        .stdout(predicate::str::contains("Next facture:"))
        .stdout(predicate::str::contains("FAC-"));
}

#[test]
fn test_devis_missing_client() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "devis",
            "--client",
            "nonexistent",
            "--item",
            "conseil:8",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Client 'nonexistent' not found"));
}

#[test]
fn test_facture_missing_item() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "facture",
            "--client",
            "exemple-client",
            "--item",
            "nonexistent:8",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Item 'nonexistent' not found"));
}

#[test]
fn test_facture_invalid_quantity() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "facture",
            "--client",
            "exemple-client",
            "--item",
            "conseil:abc",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quantity"));

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "facture",
            "--client",
            "exemple-client",
            "--item",
            "conseil:0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quantity"));
}

#[test]
fn test_facture_invalid_discount() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "facture",
            "--client",
            "exemple-client",
            "--item",
            "conseil:8:150",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid discount"));
}

#[test]
fn test_facture_no_items() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "facture",
            "--client",
            "exemple-client",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No items specified"));
}

fn write_state(config_path: &std::path::Path, state: &str) {
    fs::write(config_path.join("state.toml"), state).unwrap();
}

/// One devis and two factures, no payments yet.
const MIXED_STATE: &str = r#"[devis_counter]
last_number = 1
last_year = 2026

[facture_counter]
last_number = 2
last_year = 2026

[[history]]
number = "DEV-2026-0001"
kind = "devis"
client = "exemple-client"
date = "2026-01-05"
total = "59625.00"
file = "DEV-2026-0001.pdf"
items = ["conseil:2"]

[[history]]
number = "FAC-2026-0001"
kind = "facture"
client = "exemple-client"
date = "2026-01-10"
total = "100000.00"
file = "FAC-2026-0001.pdf"
items = ["conseil:4"]

[[history]]
number = "FAC-2026-0002"
kind = "facture"
client = "exemple-client"
date = "2026-01-11"
total = "50000.00"
file = "FAC-2026-0002.pdf"
items = ["conseil:2"]
"#;

#[test]
fn test_add_payment_and_list_status() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_state(&config_path, MIXED_STATE);

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "add-payment",
            "FAC-2026-0001",
            "40000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Recorded 40 000,00 FCFA payment for FAC-2026-0001",
        ))
        .stdout(predicate::str::contains("60 000,00 FCFA remaining"));

    // Devis shows no payment status; factures show three-way status.
    // Footer totals cover factures only.
    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PARTIAL"))
        .stdout(predicate::str::contains("UNPAID"))
        .stdout(predicate::str::contains("(-) PAID"))
        .stdout(predicate::str::contains("(=) OUTSTANDING"))
        .stdout(predicate::str::contains("150 000 FCFA"))
        .stdout(predicate::str::contains("40 000 FCFA"))
        .stdout(predicate::str::contains("110 000 FCFA"))
        .stdout(predicate::str::contains("Outstanding in EUR"));
}

#[test]
fn test_add_payment_to_devis_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_state(&config_path, MIXED_STATE);

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "add-payment",
            "DEV-2026-0001",
            "1000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is a devis, not a facture"));
}

#[test]
fn test_overpayment_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_state(&config_path, MIXED_STATE);

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "add-payment",
            "FAC-2026-0002",
            "60000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Payment would exceed"));

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "add-payment",
            "FAC-2026-0002",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Payment amount must be greater than zero",
        ));
}

#[test]
fn test_full_payment_and_payment_history() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_state(&config_path, MIXED_STATE);

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "add-payment",
            "FAC-2026-0002",
            "50000",
            "--date",
            "2026-02-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("fully paid"));

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "payments",
            "FAC-2026-0002",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Payments for FAC-2026-0002"))
        .stdout(predicate::str::contains("2026-02-01"))
        .stdout(predicate::str::contains("50 000,00 FCFA"))
        .stdout(predicate::str::contains("Status: PAID"));
}

#[test]
fn test_remove_payment() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_state(&config_path, MIXED_STATE);

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "add-payment",
            "FAC-2026-0001",
            "25000",
        ])
        .assert()
        .success();

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "remove-payment",
            "FAC-2026-0001",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Removed 25 000,00 FCFA payment from FAC-2026-0001",
        ));

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "remove-payment",
            "FAC-2026-0001",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No payments recorded"));
}

#[test]
fn test_payment_by_index_uses_newest_first_order() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_state(&config_path, MIXED_STATE);

    // Index 1 is the newest entry, FAC-2026-0002
    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "add-payment",
            "1",
            "10000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("FAC-2026-0002"));

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "add-payment", "0", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid document index"));
}

#[test]
fn test_convert_rejects_factures_and_unknown_documents() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_state(&config_path, MIXED_STATE);

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "convert",
            "FAC-2026-0001",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already a facture"));

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "convert",
            "DEV-2099-0001",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in history"));
}

#[test]
fn test_list_kind_filter() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_state(&config_path, MIXED_STATE);

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "list", "--kind", "devis"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DEV-2026-0001"))
        .stdout(predicate::str::contains("FAC-2026-0001").not());
}

#[test]
fn test_list_legacy_entries_default_to_facture_unpaid() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_state(
        &config_path,
        r#"[facture_counter]
last_number = 1
last_year = 2026

[[history]]
number = "FAC-2026-0001"
client = "exemple-client"
date = "2026-01-10"
total = "1250.00"
file = "FAC-2026-0001.pdf"
items = ["conseil:5"]
"#,
    );

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("facture"))
        .stdout(predicate::str::contains("UNPAID"))
        .stdout(predicate::str::contains("(=) OUTSTANDING"))
        .stdout(predicate::str::contains("1 250 FCFA"));
}

#[test]
fn test_currency_label_comes_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    // Bill in euros instead of the default CFA franc
    fs::write(
        config_path.join("config.toml"),
        r#"[company]
name = "Société Export SARL"
address = "Rue de la Réunification"
city = "Douala"
country = "Cameroun"
email = "contact@societe-export.cm"

[document]
devis_number_format = "DEV-{year}-{seq:04}"
facture_number_format = "FAC-{year}-{seq:04}"
currency = "EUR"
currency_label = "EUR"
due_days = 30

[pdf]
output_dir = "output"
"#,
    )
    .unwrap();

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "items"])
        .assert()
        .success()
        .stdout(predicate::str::contains("25 000,00 EUR"))
        .stdout(predicate::str::contains("FCFA").not());

    write_state(&config_path, MIXED_STATE);

    // The XAF/EUR parity line only applies to the CFA franc
    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("150 000 EUR"))
        .stdout(predicate::str::contains("Outstanding in EUR").not());
}

#[test]
fn test_report_filters() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_state(&config_path, MIXED_STATE);

    // The devis is excluded from the report
    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "--client",
            "exemple-client",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("FAC-2026-0001"))
        .stdout(predicate::str::contains("FAC-2026-0002"))
        .stdout(predicate::str::contains("DEV-2026-0001").not())
        .stdout(predicate::str::contains("150 000,00 FCFA"));

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "--client",
            "exemple-client",
            "--from",
            "2026-01-11",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("FAC-2026-0002"))
        .stdout(predicate::str::contains("FAC-2026-0001").not());

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "--client",
            "exemple-client",
            "--status",
            "paid",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No factures found"));

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "--client",
            "exemple-client",
            "--status",
            "overdue",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --status value"));

    facture_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "--client",
            "inconnu",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Client 'inconnu' not found"));
}
