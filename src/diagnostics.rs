use std::fmt::Write as _;

use crate::error::Error;
use crate::manifest::Diagnostic;
use crate::types::ResolutionState;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    print_markdown(&render_error(e));
}

/// Print every reference diagnostic of a build to stderr.
pub fn print_reference_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        print_markdown(&render_reference_diagnostic(diagnostic));
        eprintln!();
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is one,
/// how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::ContentUnreadable { file, reason } => render_content_unreadable(&file.display().to_string(), reason),
        Error::DuplicateUid { uid, existing, incoming }
        | Error::RegistryCollision { uid, existing, incoming } => render_duplicate_uid(uid, existing, incoming),
        Error::EmptyUid { source_path } => render_empty_uid(source_path),
        Error::FrontMatterInvalid { file, reason } => render_front_matter_invalid(&file.display().to_string(), reason),
        Error::InvalidPattern(err) => render_invalid_pattern(&err.to_string()),
        Error::ManifestNotFound { path } => render_manifest_not_found(&path.display().to_string()),
        _ => render_generic(e),
    }
}

/// Render one unresolved reference: where it is, why it failed, what to write instead.
pub fn render_reference_diagnostic(diagnostic: &Diagnostic) -> String {
    let Diagnostic { line, source_path, target_token, uid, suggestions, .. } = diagnostic;

    match &diagnostic.resolution_state {
        ResolutionState::Ambiguous(candidates) => {
            let mut out = format!("\
# Warning: Ambiguous Reference

`{target_token}` in `{source_path}` (uid `{uid}`) line {line} matches several uids.

## Candidates

");
            for c in candidates {
                let _ = writeln!(out, "- `{c}`");
            }
            if let Some(first) = candidates.first() {
                let _ = write!(out, "\n## Fix\n\nUse the fully-qualified uid:\n\n    xref:{first}\n");
            }
            out
        },
        ResolutionState::Missing => {
            let mut out = format!("\
# Warning: Missing Reference

`{target_token}` in `{source_path}` (uid `{uid}`) line {line} does not match any uid.
");
            if let Some(suggestion) = suggestions.first() {
                let _ = write!(out, "\n## Did you mean `{suggestion}`?\n\n    xref:{suggestion}\n");
            }
            out
        },
        ResolutionState::Resolved(_) | ResolutionState::Unresolved => String::new(),
    }
}

/// Print markdown to stderr, headings in bold.
fn print_markdown(md: &str) {
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

fn render_content_unreadable(file: &str, reason: &str) -> String {
    format!("\
# Error: Unreadable Content

`{file}`: {reason}

## Fix

Content files must be UTF-8 text. Re-save the file as UTF-8, or add its
path to `exclude` in `.docxref.toml`.
")
}

fn render_duplicate_uid(uid: &str, existing: &str, incoming: &str) -> String {
    format!("\
# Error: Duplicate uid

`{uid}` is declared by both `{existing}` and `{incoming}`.
Nothing was resolved.

## Fix

Give one of them a different `uid:` in its front-matter, or drop the
duplicate API record.
")
}

fn render_empty_uid(source_path: &str) -> String {
    format!("\
# Error: Empty uid

`{source_path}` declares a blank uid.

## Fix

Set a non-empty `uid:` in its front-matter, or remove the key to fall back
to the file path.
")
}

fn render_front_matter_invalid(file: &str, reason: &str) -> String {
    format!("\
# Error: Invalid Front-Matter

`{file}`: {reason}
")
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::ApiRecordInvalid { file, reason } => format!("\
# Error: Invalid API Record File

`{}`: {reason}

## Fix

Each file must be a list of records or an `items:` document, and every
record needs a `uid`.
", file.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: Manifest Corrupt

{e}

## Fix

Regenerate the manifest:

    docxref build
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),
        Error::WatchFailed { reason } => format!("\
# Error: Watch Failed

{reason}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_invalid_pattern(reason: &str) -> String {
    format!("\
# Error: Invalid Reference Pattern

`informal_pattern` in `.docxref.toml` does not compile:

{reason}

## Fix

Fix the regex, or set `informal_pattern = \"\"` to turn inline-code
references off.
")
}

fn render_manifest_not_found(path: &str) -> String {
    format!("\
# Error: Manifest Not Found

`{path}` does not exist.

## Fix

Run `docxref build` to resolve references and write the manifest:

    docxref build
")
}
