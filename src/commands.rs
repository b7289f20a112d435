use std::path::Path;
use std::process::ExitCode;

use docxref::config::Config;
use docxref::diagnostics;
use docxref::driver::SiteAssembly;
use docxref::error;
use docxref::hasher;
use docxref::loader;
use docxref::manifest::BuildManifest;
use docxref::registry::Registry;
use docxref::resolver;
use docxref::rewrite;
use docxref::types::ResolutionState;

/// How `build` reports unresolved references.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Machine-readable diagnostics on stdout.
    Json,
    /// Markdown diagnostics on stderr.
    #[default]
    Text,
}

/// Exit code when unresolved references are present and the caller cares.
const EXIT_UNRESOLVED: u8 = 2;
/// Exit code when the manifest on disk is out of date.
const EXIT_STALE: u8 = 1;

/// Load content, run the pipeline, write the manifest, report diagnostics.
///
/// # Errors
///
/// Returns errors from config loading, content loading, registry collisions,
/// or manifest writing.
pub fn build(root: &Path, strict: bool, format: OutputFormat) -> Result<ExitCode, error::Error> {
    let config = Config::load(root)?;
    let manifest = assemble(root, &config)?;

    let output = root.join(&config.output);
    manifest.write(&output)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&manifest.diagnostics)?),
        OutputFormat::Text => {
            diagnostics::print_reference_diagnostics(&manifest.diagnostics);
            let units = manifest.units.len();
            let unresolved = manifest.diagnostics.len();
            println!("Wrote {units} units to {} ({unresolved} unresolved references)", config.output.display());
        },
    }

    if strict && manifest.has_diagnostics() {
        return Ok(ExitCode::from(EXIT_UNRESOLVED));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Rebuild in memory and compare with the manifest on disk.
///
/// Exit code priority: unresolved (2) > stale (1) > fresh (0).
///
/// # Errors
///
/// Returns `Error::ManifestNotFound` if no manifest has been written yet,
/// or errors from loading and assembling content.
pub fn check(root: &Path) -> Result<ExitCode, error::Error> {
    let config = Config::load(root)?;
    let on_disk = BuildManifest::read(&root.join(&config.output))?;
    let current = assemble(root, &config)?;

    let stale = hasher::digest_manifest(&on_disk)? != hasher::digest_manifest(&current)?;
    let unresolved = current.diagnostics.len();

    if unresolved > 0 {
        diagnostics::print_reference_diagnostics(&current.diagnostics);
        let ambiguous = current.ambiguous_count();
        let missing = unresolved.saturating_sub(ambiguous);
        let staleness = if stale { ", manifest stale" } else { "" };
        println!("{missing} missing, {ambiguous} ambiguous{staleness}");
        return Ok(ExitCode::from(EXIT_UNRESOLVED));
    }
    if stale {
        println!("STALE   {}", config.output.display());
        return Ok(ExitCode::from(EXIT_STALE));
    }

    let total = current.units.len();
    println!("All {total} units fresh, every reference resolved");
    return Ok(ExitCode::SUCCESS);
}

/// List every registered uid with its kind and link target.
///
/// # Errors
///
/// Returns errors from loading content or registry collisions.
pub fn list(root: &Path) -> Result<(), error::Error> {
    let config = Config::load(root)?;
    let registry = load_registry(root, &config)?;

    if registry.is_empty() {
        println!("No content found.");
        return Ok(());
    }

    for unit in registry.all_units() {
        let kind = match unit.kind {
            docxref::types::UnitKind::GeneratedApiMember => "api ",
            docxref::types::UnitKind::ManualPage => "page",
        };
        println!("{kind}  {}  -> {}", unit.uid, rewrite::href_for(unit, &config.links));
    }
    return Ok(());
}

/// Resolve a single token against the current content and print the outcome.
///
/// # Errors
///
/// Returns errors from loading content or registry collisions.
pub fn resolve(root: &Path, token: &str) -> Result<ExitCode, error::Error> {
    let config = Config::load(root)?;
    let registry = load_registry(root, &config)?;
    let index = registry.build_index();

    match resolver::classify_token(token, &index) {
        ResolutionState::Resolved(uid) => {
            let href = registry
                .get(&uid)
                .map(|unit| return rewrite::href_for(unit, &config.links))
                .unwrap_or_default();
            println!("{uid} -> {href}");
            return Ok(ExitCode::SUCCESS);
        },
        ResolutionState::Ambiguous(candidates) => {
            println!("ambiguous: `{token}` matches");
            for candidate in candidates {
                println!("  {candidate}");
            }
        },
        ResolutionState::Missing | ResolutionState::Unresolved => {
            println!("missing: `{token}` matches no uid");
            for suggestion in index.suggest(token) {
                println!("  did you mean {suggestion}?");
            }
        },
    }
    return Ok(ExitCode::from(EXIT_UNRESOLVED));
}

/// Load all content and run the assembly pipeline.
///
/// # Errors
///
/// Returns errors from content loading or `Error::RegistryCollision`.
fn assemble(root: &Path, config: &Config) -> Result<BuildManifest, error::Error> {
    let assembly = SiteAssembly::new(config)?;
    let pages = loader::load_manual_pages(root, config)?;
    let members = loader::load_api_members(root, config)?;
    return assembly.run(pages, members);
}

/// Load all content into a registry without resolving anything.
///
/// # Errors
///
/// Returns errors from content loading or `Error::RegistryCollision`.
fn load_registry(root: &Path, config: &Config) -> Result<Registry, error::Error> {
    let pages = loader::load_manual_pages(root, config)?;
    let members = loader::load_api_members(root, config)?;
    return SiteAssembly::register_all(pages, members);
}
