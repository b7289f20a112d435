use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Copy a fixture into a fresh temp directory so runs never write into the tree.
fn fixture(name: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    copy_dir(&Path::new("tests/fixtures").join(name), dir.path());
    dir
}

fn copy_dir(from: &Path, to: &Path) {
    std::fs::create_dir_all(to).unwrap();
    for entry in std::fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), target).unwrap();
        }
    }
}

fn docxref(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docxref"))
        .current_dir(dir.path())
        .args(args)
        .output()
        .unwrap()
}

fn read_manifest(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn build_then_check_passes() {
    let dir = fixture("basic");

    let build = docxref(&dir, &["build"]);
    assert!(build.status.success(), "build failed: {}", String::from_utf8_lossy(&build.stderr));

    let manifest = read_manifest(&dir.path().join("_site/manifest.json"));
    assert_eq!(manifest["diagnostics"].as_array().unwrap().len(), 0);

    let uids: Vec<&str> = manifest["units"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["uid"].as_str().unwrap())
        .collect();
    assert_eq!(uids, vec!["getting_started", "guides", "ReqRest.RestClient", "ReqRest.RestClient.Send"]);

    let body = manifest["units"][0]["body"].as_str().unwrap();
    assert!(body.contains("read [Guides](docs/guides/index.html)."), "{body}");
    assert!(body.contains("[`ReqRest.RestClient`](api/ReqRest.RestClient.html)"), "{body}");
    assert!(body.contains("[Send](api/ReqRest.RestClient.Send.html)"), "{body}");

    let guides = manifest["units"][1]["body"].as_str().unwrap();
    assert!(guides.contains("Write xref:some_uid to link a page."), "fenced block was rewritten: {guides}");

    let check = docxref(&dir, &["check"]);
    assert!(check.status.success(), "check failed: {}", String::from_utf8_lossy(&check.stdout));
}

#[test]
fn check_reports_stale_manifest() {
    let dir = fixture("basic");
    assert!(docxref(&dir, &["build"]).status.success());

    std::fs::write(dir.path().join("docs/extra.md"), "# Extra\n\nSee xref:guides.\n").unwrap();
    let check = docxref(&dir, &["check"]);
    assert_eq!(check.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&check.stdout).contains("STALE"));
}

#[test]
fn check_without_manifest_is_a_runtime_error() {
    let dir = fixture("basic");
    let check = docxref(&dir, &["check"]);
    assert_eq!(check.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&check.stderr).contains("Manifest Not Found"));
}

#[test]
fn unresolved_references_do_not_fail_the_build() {
    let dir = fixture("broken");

    let build = docxref(&dir, &["build"]);
    assert!(build.status.success(), "build failed: {}", String::from_utf8_lossy(&build.stderr));

    let manifest = read_manifest(&dir.path().join("out/manifest.json"));
    let diagnostics = manifest["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0]["target_token"], "missing_target");
    assert_eq!(diagnostics[0]["resolution_state"]["state"], "missing");
    assert_eq!(diagnostics[1]["target_token"], "Foo");
    assert_eq!(diagnostics[1]["resolution_state"]["state"], "ambiguous");

    let stderr = String::from_utf8_lossy(&build.stderr);
    assert!(stderr.contains("Missing Reference"));
    assert!(stderr.contains("Ambiguous Reference"));

    assert_eq!(docxref(&dir, &["build", "--strict"]).status.code(), Some(2));
    assert_eq!(docxref(&dir, &["check"]).status.code(), Some(2));
}

#[test]
fn duplicate_uid_aborts_the_build() {
    let dir = fixture("duplicate");

    let build = docxref(&dir, &["build"]);
    assert_eq!(build.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&build.stderr).contains("Duplicate uid"));
    assert!(!dir.path().join("_site/manifest.json").exists());
}

#[test]
fn resolve_shows_single_tokens() {
    let dir = fixture("broken");

    let resolved = docxref(&dir, &["resolve", "X.Foo"]);
    assert!(resolved.status.success());
    assert!(String::from_utf8_lossy(&resolved.stdout).contains("A.X.Foo -> api/A.X.Foo.html"));

    let ambiguous = docxref(&dir, &["resolve", "Foo"]);
    assert_eq!(ambiguous.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&ambiguous.stdout);
    assert!(stdout.contains("A.X.Foo") && stdout.contains("B.Y.Foo"));
}

#[test]
fn json_format_prints_diagnostics() {
    let dir = fixture("broken");
    let build = docxref(&dir, &["build", "--format", "json"]);
    assert!(build.status.success());

    let printed: serde_json::Value = serde_json::from_slice(&build.stdout).unwrap();
    assert_eq!(printed.as_array().unwrap().len(), 2);
}

#[test]
fn unreadable_page_is_named_in_the_error() {
    let dir = fixture("basic");
    std::fs::write(dir.path().join("docs/bad.md"), b"\xff\xfe").unwrap();

    let build = docxref(&dir, &["build"]);
    assert_eq!(build.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&build.stderr);
    assert!(stderr.contains("Unreadable Content"), "{stderr}");
    assert!(stderr.contains("bad.md"), "{stderr}");
}
