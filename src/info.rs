use std::path::Path;

use serde::Serialize;

use docxref::config::{CONFIG_FILE, Config};
use docxref::manifest::BuildManifest;

/// Every reference form the scanner recognizes, as listed by `info --json`.
const REFERENCE_SYNTAXES: &[&str] =
    &["xref:<uid>", "<xref:<uid>>", "[text](xref:<uid>)", "@\"<uid>\"", "@'<uid>'", "@<uid>", "`<uid>`"];

/// Output the comprehensive docxref reference document.
pub fn run(root: &Path, json: bool) {
    let state = gather_state(root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

struct CurrentState {
    config_found: bool,
    manifest_diagnostics: Option<usize>,
    manifest_path: String,
    manifest_units: Option<usize>,
}

fn gather_state(root: &Path) -> CurrentState {
    let config_found = root.join(CONFIG_FILE).exists();
    let config = Config::load(root).unwrap_or_default();
    let manifest = BuildManifest::read(&root.join(&config.output)).ok();

    CurrentState {
        config_found,
        manifest_diagnostics: manifest.as_ref().map(|m| m.diagnostics.len()),
        manifest_path: config.output.display().to_string(),
        manifest_units: manifest.as_ref().map(|m| m.units.len()),
    }
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# docxref {version}

Cross-reference resolution for documentation builds: register pages and API
members by uid, resolve every reference, emit a manifest for the renderer.

## Reference Syntax

    xref:getting_started               explicit reference
    <xref:ReqRest.RestClient>          explicit reference, delimited
    [the client](xref:ReqRest.RestClient)  markdown link, text kept
    @\"ReqRest.RestClient\"              mention, quoted
    @'RestClient.Get(System.String)'   mention, single-quoted
    @getting_started                   mention, bare
    `ReqRest.RestClient.Send`          inline code matching informal_pattern

Short names of API members resolve when unique: `RestClient.Send` and `Send`
both reach `ReqRest.RestClient.Send` unless another member shares them.

## Workflow

    docxref build                      Resolve references, write the manifest
    docxref build --strict             Same, exit 2 on unresolved references
    docxref check                      Verify the manifest is current (exit 0/1/2)
    docxref resolve <token>            Show what a token resolves to
    docxref list                       List every uid with its link target
    docxref watch                      Rebuild on content changes

## Configuration (.docxref.toml)

    manual = [\"docs\"]                  # markdown pages (uid from front-matter)
    api = [\"api\"]                      # API member records (.yml, .json)
    include = [\"docs/\"]                # only load these paths
    exclude = [\"docs/archive/\"]        # skip these paths
    output = \"_site/manifest.json\"     # manifest destination
    informal_pattern = \"...\"           # inline-code references, \"\" disables

    [links]
    api_prefix = \"api/\"
    page_extension = \"html\"

## Current State

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    if state.config_found {
        println!("Config:     {CONFIG_FILE} (found)");
    } else {
        println!("Config:     {CONFIG_FILE} (not found, using defaults)");
    }

    match (state.manifest_units, state.manifest_diagnostics) {
        (Some(units), Some(diagnostics)) => println!(
            "Manifest:   {} ({units} units, {diagnostics} unresolved references)",
            state.manifest_path
        ),
        _ => println!("Manifest:   {} (not found)", state.manifest_path),
    }
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Success / manifest fresh |
| 1    | Manifest stale |
| 2    | Unresolved references found |
| 3    | Runtime error |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    version: String,
    reference_syntaxes: Vec<String>,
    exit_codes: Vec<ExitCodeInfo>,
    current_state: StateJson,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    config_found: bool,
    manifest_diagnostics: Option<usize>,
    manifest_path: String,
    manifest_units: Option<usize>,
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        version: env!("CARGO_PKG_VERSION").to_string(),
        reference_syntaxes: REFERENCE_SYNTAXES.iter().map(ToString::to_string).collect(),
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Success / manifest fresh".to_string() },
            ExitCodeInfo { code: 1, meaning: "Manifest stale".to_string() },
            ExitCodeInfo { code: 2, meaning: "Unresolved references found".to_string() },
            ExitCodeInfo { code: 3, meaning: "Runtime error".to_string() },
        ],
        current_state: StateJson {
            config_found: state.config_found,
            manifest_diagnostics: state.manifest_diagnostics,
            manifest_path: state.manifest_path.clone(),
            manifest_units: state.manifest_units,
        },
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scanner_syntax_is_listed() {
        assert!(REFERENCE_SYNTAXES.contains(&"[text](xref:<uid>)"));
        assert!(REFERENCE_SYNTAXES.contains(&"@'<uid>'"));
        assert_eq!(REFERENCE_SYNTAXES.len(), 7);
    }
}
