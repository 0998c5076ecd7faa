//! Integration tests for the rfp CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd. Every
//! test gets its own data and config directories.

use assert_cmd::Command;
use base64::Engine;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to get an rfp command bound to `tmp`
fn rfp(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rfp").unwrap();
    cmd.env("RFP_DATA_DIR", tmp.path().join("data"))
        .env("XDG_CONFIG_HOME", tmp.path().join("config"))
        .env("HOME", tmp.path())
        .env_remove("RFP_SHARE_BASE_URL")
        .env_remove("RFP_LOG");
    cmd
}

/// Helper to create an RFP and return its id
fn create_rfp(tmp: &TempDir, name: &str, deadline: &str) -> String {
    let output = rfp(tmp)
        .args([
            "new",
            "--name",
            name,
            "--summary",
            "Supply of copper cables",
            "--deadline",
            deadline,
            "-q",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "create failed: {:?}", output);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn stored_json(tmp: &TempDir) -> serde_json::Value {
    let text = fs::read_to_string(tmp.path().join("data").join("rfp_data.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn list_ids(tmp: &TempDir, extra: &[&str]) -> Vec<String> {
    let output = rfp(tmp)
        .args(["list", "--format", "id"])
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    rfp(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Request For Proposal"))
        .stdout(predicate::str::contains("share"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    rfp(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rfp"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    rfp(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rfp"));
}

#[test]
fn test_completions_fish_lists_subcommands() {
    let tmp = TempDir::new().unwrap();
    rfp(&tmp)
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("share"))
        .stdout(predicate::str::contains("completions"));
}

// ============================================================================
// Browsing
// ============================================================================

#[test]
fn test_empty_store_lists_seed_examples() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(
        list_ids(&tmp, &[]),
        ["default-dmrc", "default-drl", "default-dmrc-phase4"]
    );

    rfp(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in examples"));
}

#[test]
fn test_search_seeds_for_metro() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(
        list_ids(&tmp, &["--search", "metro"]),
        ["default-dmrc", "default-dmrc-phase4"]
    );
}

#[test]
fn test_unknown_tab_behaves_like_recent() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(list_ids(&tmp, &["--tab", "archived"]), list_ids(&tmp, &[]));
}

#[test]
fn test_corrupt_data_reads_as_empty() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("rfp_data.json"), "{ definitely not json").unwrap();

    assert_eq!(list_ids(&tmp, &[]).len(), 3);
    rfp(&tmp)
        .args(["list", "--count"])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn test_show_seed() {
    let tmp = TempDir::new().unwrap();
    rfp(&tmp)
        .args(["show", "default-drl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jun 15, 2026"))
        .stdout(predicate::str::contains("built-in example"));
}

// ============================================================================
// Create / edit / delete
// ============================================================================

#[test]
fn test_new_requires_project_name() {
    let tmp = TempDir::new().unwrap();
    rfp(&tmp)
        .args(["new", "--summary", "Cables", "--deadline", "2030-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project name is required."));
}

#[test]
fn test_new_requires_deadline() {
    let tmp = TempDir::new().unwrap();
    rfp(&tmp)
        .args(["new", "--name", "Metro", "--summary", "Cables"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Deadline date is required."));
}

#[test]
fn test_new_rejects_bad_deadline() {
    let tmp = TempDir::new().unwrap();
    rfp(&tmp)
        .args(["new", "--name", "Metro", "--summary", "Cables", "--deadline", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid deadline"));
}

#[test]
fn test_new_persists_wire_format() {
    let tmp = TempDir::new().unwrap();
    let id = create_rfp(&tmp, "  Metro Phase 5  ", "2020-01-01");
    assert!(id.starts_with("RFP-"));

    let stored = stored_json(&tmp);
    let record = &stored.as_array().unwrap()[0];
    assert_eq!(record["_id"], id.as_str());
    assert_eq!(record["projectName"], "Metro Phase 5");
    assert_eq!(record["status"], "open");
    assert_eq!(record["deadline"], "2020-01-01");
    // Past deadline clamps to zero
    assert_eq!(record["durationDays"], 0);
    assert!(record["uploadedAt"].is_string());

    // A stored record replaces the seed fallback
    assert_eq!(list_ids(&tmp, &[]), [id]);
}

#[test]
fn test_created_ids_are_unique() {
    let tmp = TempDir::new().unwrap();
    let a = create_rfp(&tmp, "A", "2031-01-01");
    let b = create_rfp(&tmp, "B", "2031-01-01");
    let c = create_rfp(&tmp, "C", "2031-01-01");
    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_ne!(a, c);

    // Newest upload first
    assert_eq!(list_ids(&tmp, &[]), [c, b, a]);
}

#[test]
fn test_edit_status_moves_between_tabs() {
    let tmp = TempDir::new().unwrap();
    let id = create_rfp(&tmp, "Metro", "2031-01-01");
    assert_eq!(list_ids(&tmp, &["--tab", "open"]), [id.clone()]);

    rfp(&tmp)
        .args(["edit", &id, "--status", "EXTENDED"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated RFP"));

    assert!(list_ids(&tmp, &["--tab", "open"]).is_empty());
    assert_eq!(list_ids(&tmp, &["--tab", "extended"]), [id.clone()]);

    let record = &stored_json(&tmp)[0];
    assert_eq!(record["_id"], id.as_str());
    assert_eq!(record["projectName"], "Metro");
}

#[test]
fn test_edit_by_id_prefix() {
    let tmp = TempDir::new().unwrap();
    let id = create_rfp(&tmp, "Metro", "2031-01-01");

    rfp(&tmp)
        .args(["edit", &id[..20], "--name", "Renamed"])
        .assert()
        .success();
    assert_eq!(stored_json(&tmp)[0]["projectName"], "Renamed");
}

#[test]
fn test_edit_without_changes_fails() {
    let tmp = TempDir::new().unwrap();
    let id = create_rfp(&tmp, "Metro", "2031-01-01");
    rfp(&tmp)
        .args(["edit", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to change"));
}

#[test]
fn test_edit_blank_name_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let id = create_rfp(&tmp, "Metro", "2031-01-01");
    rfp(&tmp)
        .args(["edit", &id, "--name", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project name is required."));
    assert_eq!(stored_json(&tmp)[0]["projectName"], "Metro");
}

#[test]
fn test_delete_removes_record() {
    let tmp = TempDir::new().unwrap();
    let keep = create_rfp(&tmp, "Keep", "2031-01-01");
    let gone = create_rfp(&tmp, "Gone", "2031-01-01");

    rfp(&tmp)
        .args(["delete", &gone, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted RFP"));

    assert_eq!(list_ids(&tmp, &[]), [keep]);
}

#[test]
fn test_delete_missing_id_changes_nothing() {
    let tmp = TempDir::new().unwrap();
    create_rfp(&tmp, "Keep", "2031-01-01");
    let before = stored_json(&tmp);

    rfp(&tmp)
        .args(["delete", "RFP-NOPE", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No RFP found"));

    assert_eq!(stored_json(&tmp), before);
}

#[test]
fn test_seed_records_are_read_only() {
    let tmp = TempDir::new().unwrap();
    rfp(&tmp)
        .args(["delete", "default-dmrc", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be modified"));
    rfp(&tmp)
        .args(["edit", "default-drl", "--status", "closed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be modified"));
}

// ============================================================================
// Documents
// ============================================================================

fn write_pdf(dir: &Path) -> (std::path::PathBuf, Vec<u8>) {
    let bytes = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF\n".to_vec();
    let path = dir.join("tender.pdf");
    fs::write(&path, &bytes).unwrap();
    (path, bytes)
}

#[test]
fn test_document_is_embedded_and_saved_back() {
    let tmp = TempDir::new().unwrap();
    let (pdf, bytes) = write_pdf(tmp.path());

    let output = rfp(&tmp)
        .args([
            "new",
            "--name",
            "Docs",
            "--summary",
            "With a file",
            "--deadline",
            "2031-01-01",
            "--file",
        ])
        .arg(&pdf)
        .arg("-q")
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = String::from_utf8_lossy(&output.stdout).trim().to_string();

    let record = &stored_json(&tmp)[0];
    assert!(record["fileData"]
        .as_str()
        .unwrap()
        .starts_with("data:application/pdf;base64,"));
    assert_eq!(record["fileName"], "tender.pdf");
    assert_eq!(record["fileSize"], bytes.len());

    let out = tmp.path().join("copy.pdf");
    rfp(&tmp)
        .args(["doc", &id, "-o"])
        .arg(&out)
        .assert()
        .success();
    assert_eq!(fs::read(&out).unwrap(), bytes);

    // Viewing spools a file and prints its location
    let output = rfp(&tmp).args(["doc", &id]).output().unwrap();
    assert!(output.status.success());
    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let spooled = url.strip_prefix("file://").unwrap();
    assert_eq!(fs::read(spooled).unwrap(), bytes);

    rfp(&tmp)
        .args(["doc", "--clean"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Released 1"));
    assert!(!Path::new(spooled).exists());
}

#[test]
fn test_viewing_twice_keeps_one_spooled_copy() {
    let tmp = TempDir::new().unwrap();
    let (pdf, bytes) = write_pdf(tmp.path());
    let output = rfp(&tmp)
        .args([
            "new",
            "--name",
            "Docs",
            "--summary",
            "With a file",
            "--deadline",
            "2031-01-01",
            "--file",
        ])
        .arg(&pdf)
        .arg("-q")
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = String::from_utf8_lossy(&output.stdout).trim().to_string();

    let view = || {
        let output = rfp(&tmp).args(["doc", &id]).output().unwrap();
        assert!(output.status.success());
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    };
    let first = view();
    let second = view();
    assert_ne!(first, second);

    let spool: Vec<_> = fs::read_dir(tmp.path().join("data").join("spool"))
        .unwrap()
        .collect();
    assert_eq!(spool.len(), 1);
    assert!(!Path::new(first.strip_prefix("file://").unwrap()).exists());
    assert_eq!(fs::read(second.strip_prefix("file://").unwrap()).unwrap(), bytes);
}

#[test]
fn test_external_document_prints_url() {
    let tmp = TempDir::new().unwrap();
    rfp(&tmp)
        .args(["doc", "default-dmrc"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".pdf"));
}

#[test]
fn test_doc_without_attachment_fails() {
    let tmp = TempDir::new().unwrap();
    let id = create_rfp(&tmp, "Plain", "2031-01-01");
    rfp(&tmp)
        .args(["doc", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no document attached"));
}

// ============================================================================
// Export / import
// ============================================================================

#[test]
fn test_export_then_import_merges() {
    let source = TempDir::new().unwrap();
    let a = create_rfp(&source, "Alpha", "2031-01-01");
    let b = create_rfp(&source, "Beta", "2031-02-01");

    let file = source.path().join("export.json");
    rfp(&source)
        .args(["export", "-o"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 RFP(s)"));

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(exported["version"], "1.0");
    assert!(exported["exportDate"].is_string());
    assert_eq!(exported["rfps"].as_array().unwrap().len(), 2);

    let target = TempDir::new().unwrap();
    let local = create_rfp(&target, "Local", "2031-03-01");
    rfp(&target)
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully imported 2 RFP(s) (3 total)"));

    let ids: Vec<String> = stored_json(&target)
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, [local, a, b]);
}

#[test]
fn test_import_replace_and_bare_array() {
    let tmp = TempDir::new().unwrap();
    create_rfp(&tmp, "Old", "2031-01-01");

    let file = tmp.path().join("bare.json");
    fs::write(
        &file,
        r#"[{"_id":"legacy-1","projectName":"Legacy","productSummary":"From the web app","deadline":"2031-05-01T00:00:00.000Z","durationDays":"12","status":"Open","uploadedAt":"2024-01-01T10:00:00.000Z","fileUrl":null,"fileData":null,"fileName":null}]"#,
    )
    .unwrap();

    rfp(&tmp)
        .arg("import")
        .arg(&file)
        .args(["--replace", "--yes"])
        .assert()
        .success();

    assert_eq!(list_ids(&tmp, &[]), ["legacy-1"]);
    let record = &stored_json(&tmp)[0];
    assert_eq!(record["status"], "open");
    assert_eq!(record["deadline"], "2031-05-01");
    assert_eq!(record["durationDays"], 12);
}

#[test]
fn test_import_invalid_file_keeps_data() {
    let tmp = TempDir::new().unwrap();
    create_rfp(&tmp, "Keep", "2031-01-01");
    let before = stored_json(&tmp);

    let file = tmp.path().join("bad.json");
    fs::write(&file, r#"{"rfps": 3}"#).unwrap();

    rfp(&tmp)
        .arg("import")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid import data"));
    assert_eq!(stored_json(&tmp), before);
}

// ============================================================================
// Share links
// ============================================================================

#[test]
fn test_share_then_open_elsewhere() {
    let source = TempDir::new().unwrap();
    let id = create_rfp(&source, "Shared Metro", "2031-01-01");

    let output = rfp(&source)
        .args(["share", "--base-url", "https://rfp.example/browse.html"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let link = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert!(link.starts_with("https://rfp.example/browse.html?data="));

    let target = TempDir::new().unwrap();
    create_rfp(&target, "Overwritten", "2031-01-01");
    rfp(&target)
        .args(["open", &link])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 1 shared RFP(s)"));

    assert_eq!(list_ids(&target, &[]), [id]);
}

#[test]
fn test_open_invalid_link_keeps_data() {
    let tmp = TempDir::new().unwrap();
    let id = create_rfp(&tmp, "Keep", "2031-01-01");

    rfp(&tmp)
        .args(["open", "https://rfp.example/browse.html?data=not-base64-json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stored RFPs were kept"));

    assert_eq!(list_ids(&tmp, &[]), [id]);
}

#[test]
fn test_share_base_url_from_env() {
    let tmp = TempDir::new().unwrap();
    create_rfp(&tmp, "Metro", "2031-01-01");
    rfp(&tmp)
        .env("RFP_SHARE_BASE_URL", "https://env.example/b.html")
        .arg("share")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("https://env.example/b.html?data="));
}

#[cfg(target_os = "linux")]
#[test]
fn test_oversized_share_is_stored_and_reopened() {
    let tmp = TempDir::new().unwrap();
    let config_dir = tmp.path().join("config").join("rfp");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.yaml"), "share:\n  max_url_len: 50\n").unwrap();

    let id = create_rfp(&tmp, "Big", "2031-01-01");
    rfp(&tmp)
        .arg("share")
        .assert()
        .success()
        .stdout(predicate::str::contains("rfp open --stored"));
    assert!(tmp.path().join("data").join("rfp_share.json").exists());

    // Wipe the primary collection, then restore it from the stored share
    rfp(&tmp).args(["delete", &id, "--yes"]).assert().success();
    assert_eq!(list_ids(&tmp, &[]).len(), 3);

    rfp(&tmp).args(["open", "--stored"]).assert().success();
    assert_eq!(list_ids(&tmp, &[]), [id]);

    // The stored payload is consumed once opened
    assert!(!tmp.path().join("data").join("rfp_share.json").exists());
    rfp(&tmp)
        .args(["open", "--stored"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No stored share payload found"));
}

#[test]
fn test_open_link_with_seed_records_skips_them() {
    let source = TempDir::new().unwrap();
    let seeds = rfp(&source)
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(seeds.status.success());
    let seeds: serde_json::Value = serde_json::from_slice(&seeds.stdout).unwrap();
    let payload = serde_json::to_string(&seeds).unwrap();
    assert!(payload.contains("default-"));

    // A standard-alphabet payload with percent-escaped '+', '/' and '='
    let encoded = base64::engine::general_purpose::STANDARD.encode(payload);
    let escaped = encoded
        .replace('+', "%2B")
        .replace('/', "%2F")
        .replace('=', "%3D");
    let link = format!("https://rfp.example/browse.html?data={}", escaped);

    let target = TempDir::new().unwrap();
    let id = create_rfp(&target, "Local", "2031-01-01");
    rfp(&target)
        .args(["open", &link])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 0 shared RFP(s)"))
        .stdout(predicate::str::contains("skipped 3 built-in example record(s)"));

    // Nothing reserved was persisted, so the seed fallback is back
    assert_eq!(stored_json(&target), serde_json::json!([]));
    let ids = list_ids(&target, &[]);
    assert_eq!(ids.len(), 3);
    assert!(!ids.contains(&id));
    assert!(ids.iter().all(|i| i.starts_with("default-")));
}
