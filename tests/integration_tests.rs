//! Integration tests for the qf CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to get a qf command isolated from the user's config
fn qf(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("qf").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.join(".config"))
        .env("HOME", home)
        .env_remove("QF_AUTHOR")
        .env_remove("QF_POLICY")
        .env_remove("QF_KNOWLEDGE_DB")
        .env_remove("RUST_LOG")
        .current_dir(home);
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    qf(tmp.path()).arg("init").assert().success();
    tmp
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

const BRACKET_TEXT: &str =
    "Bracket, Mild Steel. 5.5 x 3.2 x 2.1 in. QTY: 20. Weight 4.1 lbs. Simple part.";

// ============================================================================
// Basic CLI
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    qf(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("quote"))
        .stdout(predicate::str::contains("estimate"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    qf(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("qf"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    qf(tmp.path()).arg("frobnicate").assert().failure();
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();
    qf(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized QuoteForge project"));

    assert!(tmp.path().join(".qf/config.yaml").is_file());
    assert!(tmp.path().join(".qf/knowledge").is_dir());
    assert!(tmp.path().join("quotes").is_dir());
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_test_project();
    qf(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

// ============================================================================
// Extract
// ============================================================================

#[test]
fn test_extract_text_as_json() {
    let tmp = TempDir::new().unwrap();
    let value = json_stdout(qf(tmp.path()).args(["extract", "--text", BRACKET_TEXT, "-f", "json"]));

    assert_eq!(value["material"], "mild steel");
    assert_eq!(value["qty"], 20);
    assert_eq!(value["length_in"], 5.5);
    assert_eq!(value["material_weight_lbs"], 4.1);
    assert_eq!(value["complexity"], "simple");
}

#[test]
fn test_extract_from_file_and_stdin() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("drawing.txt"), "TITANIUM SHAFT  qty 4").unwrap();

    let from_file = json_stdout(qf(tmp.path()).args(["extract", "drawing.txt", "-f", "json"]));
    assert_eq!(from_file["material"], "titanium");
    assert_eq!(from_file["qty"], 4);

    let from_stdin = json_stdout(
        qf(tmp.path())
            .args(["extract", "-", "-f", "json"])
            .write_stdin("aluminum plate, 3 pcs"),
    );
    assert_eq!(from_stdin["material"], "aluminum");
    assert_eq!(from_stdin["qty"], 3);
}

#[test]
fn test_extract_requires_input() {
    let tmp = TempDir::new().unwrap();
    qf(tmp.path()).arg("extract").assert().failure();
}

#[test]
fn test_extract_rejects_pdf() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("part.pdf"), b"%PDF-1.4").unwrap();
    qf(tmp.path()).args(["extract", "part.pdf"]).assert().failure();
}

// ============================================================================
// Estimate
// ============================================================================

#[test]
fn test_estimate_fully_specified() {
    let tmp = TempDir::new().unwrap();
    let value = json_stdout(qf(tmp.path()).args([
        "estimate",
        "--material",
        "aluminum",
        "--machining-minutes",
        "60",
        "--weight",
        "2",
        "--qty",
        "10",
        "--complexity",
        "moderate",
        "--tolerance",
        "normal",
        "-f",
        "json",
    ]));

    assert_eq!(value["ready"], true);
    assert_eq!(value["cost_usd"].as_f64(), Some(1800.0));
    assert_eq!(value["lead_time_days"], 5);
    assert_eq!(value["confidence"], "high");
}

#[test]
fn test_estimate_without_material_is_not_ready() {
    let tmp = TempDir::new().unwrap();
    let value = json_stdout(qf(tmp.path()).args(["estimate", "-f", "json"]));

    assert_eq!(value["ready"], false);
    assert_eq!(value["missing_inputs"], serde_json::json!(["material"]));
    assert_eq!(value["confidence"], "low");
}

#[test]
fn test_estimate_strict_policy() {
    let tmp = TempDir::new().unwrap();
    let value = json_stdout(qf(tmp.path()).args([
        "estimate",
        "--policy",
        "strict",
        "--material",
        "brass",
        "--complexity",
        "baroque",
        "-f",
        "json",
    ]));

    assert_eq!(value["ready"], false);
    assert_eq!(
        value["missing_inputs"],
        serde_json::json!(["machining_minutes", "material_weight_lbs"])
    );
}

#[test]
fn test_estimate_from_signal_map_with_override() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("part.yaml"),
        "material: aluminum\nmachining_minutes: 60\nmaterial_weight_lbs: 2\nqty: 1\n",
    )
    .unwrap();

    let value = json_stdout(qf(tmp.path()).args([
        "estimate",
        "--signals",
        "part.yaml",
        "--qty",
        "10",
        "-f",
        "json",
    ]));
    assert_eq!(value["ready"], true);
    assert_eq!(value["cost_usd"].as_f64(), Some(1800.0));
}

#[test]
fn test_estimate_tsv_summary() {
    let tmp = TempDir::new().unwrap();
    qf(tmp.path())
        .args(["estimate", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("missing_inputs"))
        .stdout(predicate::str::contains("false"));
}

// ============================================================================
// Quote, list and show
// ============================================================================

#[test]
fn test_quote_without_project_is_not_saved() {
    let tmp = TempDir::new().unwrap();
    let value = json_stdout(qf(tmp.path()).args(["quote", "--text", BRACKET_TEXT, "-f", "json"]));

    assert!(value["quote_id"].is_null());
    assert_eq!(value["text_extracted"], true);
    assert_eq!(value["signals"]["material"], "mild steel");
    assert_eq!(value["references"], serde_json::json!([]));
    assert_eq!(value["estimate"]["ready"], true);
    assert_eq!(value["next_step"], "Quote complete");
}

#[test]
fn test_quote_save_requires_project() {
    let tmp = TempDir::new().unwrap();
    qf(tmp.path())
        .args(["quote", "--text", BRACKET_TEXT, "--save"])
        .assert()
        .failure();
}

#[test]
fn test_quote_save_then_list_and_show() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join("bracket.txt"), BRACKET_TEXT).unwrap();

    let saved = json_stdout(qf(tmp.path()).args(["quote", "bracket.txt", "--save", "-f", "json"]));
    let id = saved["quote_id"].as_str().unwrap().to_string();
    assert!(id.starts_with("QUOT-"));
    assert_eq!(saved["uploaded_file"], "bracket.txt");
    assert_eq!(saved["signals"]["notes"], "Uploaded bracket.txt");

    qf(tmp.path())
        .args(["list", "--count"])
        .assert()
        .success()
        .stdout("1\n");

    let listed = json_stdout(qf(tmp.path()).args(["list", "-f", "json"]));
    assert_eq!(listed[0]["id"], id.as_str());
    assert_eq!(listed[0]["title"], "bracket");
    assert_eq!(listed[0]["material"], "mild steel");

    let shown = json_stdout(qf(tmp.path()).args(["show", &id[..12], "-f", "json"]));
    assert_eq!(shown["id"], id.as_str());
    assert_eq!(shown["estimate"]["ready"], true);
}

#[test]
fn test_list_filters() {
    let tmp = setup_test_project();
    qf(tmp.path())
        .args(["quote", "--text", BRACKET_TEXT, "--save", "--title", "Bracket"])
        .assert()
        .success();
    qf(tmp.path())
        .args(["quote", "--text", "mystery part", "--save", "--title", "Unknown"])
        .assert()
        .success();

    qf(tmp.path())
        .args(["list", "--ready-only", "--count"])
        .assert()
        .success()
        .stdout("1\n");
    qf(tmp.path())
        .args(["list", "--material", "steel", "--count"])
        .assert()
        .success()
        .stdout("1\n");
    qf(tmp.path())
        .args(["list", "--limit", "5", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_list_empty_project() {
    let tmp = setup_test_project();
    qf(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No quotes found."));
}

#[test]
fn test_show_unknown_id_fails() {
    let tmp = setup_test_project();
    qf(tmp.path())
        .args(["show", "QUOT-01ZZZZ"])
        .assert()
        .failure();
}

#[test]
fn test_project_flag_from_elsewhere() {
    let tmp = setup_test_project();
    let elsewhere = TempDir::new().unwrap();

    qf(tmp.path())
        .args(["quote", "--text", BRACKET_TEXT, "--save"])
        .assert()
        .success();

    qf(elsewhere.path())
        .args(["list", "--count", "--project"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout("1\n");
}

// ============================================================================
// Reference store
// ============================================================================

#[test]
fn test_refs_index_search_and_quote() {
    let tmp = setup_test_project();
    let docs = tmp.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(
        docs.join("rates.md"),
        "Shop notes: titanium rate cost multiplier lead time is nine working days.",
    )
    .unwrap();
    fs::write(docs.join("ignored.bin"), [0u8, 1, 2]).unwrap();

    qf(tmp.path())
        .args(["refs", "index", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 1 chunks"));

    qf(tmp.path())
        .args(["refs", "sources"])
        .assert()
        .success()
        .stdout("rates.md\n");

    let hits = json_stdout(qf(tmp.path()).args(["refs", "search", "lead time", "-f", "json"]));
    assert_eq!(hits[0]["source_file"], "rates.md");
    assert_eq!(hits[0]["page"], 1);

    let quoted = json_stdout(qf(tmp.path()).args([
        "quote",
        "--text",
        "shaft",
        "--material",
        "titanium",
        "-f",
        "json",
    ]));
    assert_eq!(quoted["references"][0]["source_file"], "rates.md");

    let skipped = json_stdout(qf(tmp.path()).args([
        "quote",
        "--text",
        "shaft",
        "--material",
        "titanium",
        "--no-refs",
        "-f",
        "json",
    ]));
    assert_eq!(skipped["references"], serde_json::json!([]));
}

#[test]
fn test_refs_search_without_index_fails() {
    let tmp = setup_test_project();
    qf(tmp.path())
        .args(["refs", "search", "rate"])
        .assert()
        .failure();
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_set_policy_changes_estimate() {
    let tmp = setup_test_project();
    qf(tmp.path())
        .args(["config", "set", "policy", "strict"])
        .assert()
        .success();

    qf(tmp.path())
        .args(["config", "show", "policy"])
        .assert()
        .success()
        .stdout("strict\n");

    let value = json_stdout(qf(tmp.path()).args([
        "estimate",
        "--material",
        "brass",
        "--complexity",
        "baroque",
        "-f",
        "json",
    ]));
    assert_eq!(value["ready"], false);

    qf(tmp.path())
        .args(["config", "unset", "policy"])
        .assert()
        .success();
    qf(tmp.path())
        .args(["config", "show", "policy"])
        .assert()
        .success()
        .stdout("lenient\n");
}

#[test]
fn test_config_env_override() {
    let tmp = setup_test_project();
    let value = json_stdout(
        qf(tmp.path())
            .env("QF_POLICY", "strict")
            .args(["estimate", "--material", "brass", "--complexity", "baroque", "-f", "json"]),
    );
    assert_eq!(value["ready"], false);
}

#[test]
fn test_config_rejects_unknown_key() {
    let tmp = setup_test_project();
    qf(tmp.path())
        .args(["config", "set", "editor", "vim"])
        .assert()
        .failure();
}

#[test]
fn test_completions_generate() {
    let tmp = TempDir::new().unwrap();
    qf(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qf"));
}
