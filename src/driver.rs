//! Site assembly: the ordered pipeline from content units to a manifest.

use crate::config::{Config, LinkStyle};
use crate::error::Error;
use crate::index::ResolutionIndex;
use crate::manifest::{self, BuildManifest, Diagnostic, ManifestUnit};
use crate::registry::Registry;
use crate::resolver::{self, UnitReferences};
use crate::rewrite;
use crate::scanner::{DEFAULT_INFORMAL_PATTERN, Scanner};
use crate::types::ContentUnit;

/// The settings one build runs with. Holds no per-run state, so calling
/// `run` twice on the same input yields the same manifest.
pub struct SiteAssembly {
    /// Link spelling for rewritten bodies.
    links: LinkStyle,
    /// Compiled reference patterns.
    scanner: Scanner,
}

impl SiteAssembly {
    /// Assembly with the default informal pattern and link style.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` only if the built-in patterns fail to compile.
    pub fn with_defaults() -> Result<Self, Error> {
        return Ok(Self {
            links: LinkStyle::default(),
            scanner: Scanner::new(DEFAULT_INFORMAL_PATTERN)?,
        });
    }

    /// Assembly configured from `.docxref.toml` settings.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if the configured informal pattern is invalid.
    pub fn new(config: &Config) -> Result<Self, Error> {
        return Ok(Self {
            links: config.links.clone(),
            scanner: Scanner::new(&config.informal_pattern)?,
        });
    }

    /// Register every unit, in order: manual pages first, then generated members.
    ///
    /// # Errors
    ///
    /// Returns `Error::RegistryCollision` on the first duplicate uid,
    /// or `Error::EmptyUid` for a unit without a uid.
    pub fn register_all(
        manual_pages: impl IntoIterator<Item = ContentUnit>,
        generated_members: impl IntoIterator<Item = ContentUnit>,
    ) -> Result<Registry, Error> {
        let mut registry = Registry::new();
        for unit in manual_pages.into_iter().chain(generated_members) {
            registry.register(unit).map_err(|e| {
                return match e {
                    Error::DuplicateUid { existing, incoming, uid } => {
                        Error::RegistryCollision { existing, incoming, uid }
                    },
                    other => other,
                };
            })?;
        }
        return Ok(registry);
    }

    /// Run the whole pipeline: register pages, register members, build the
    /// index, extract and resolve references, rewrite bodies, emit the manifest.
    ///
    /// Unresolved references never fail the build; they are degraded to plain
    /// text and listed in the manifest's diagnostics.
    ///
    /// # Errors
    ///
    /// Returns `Error::RegistryCollision` if two units share a uid. Nothing is
    /// resolved in that case.
    pub fn run(
        &self,
        manual_pages: impl IntoIterator<Item = ContentUnit>,
        generated_members: impl IntoIterator<Item = ContentUnit>,
    ) -> Result<BuildManifest, Error> {
        let registry = Self::register_all(manual_pages, generated_members)?;
        let index = registry.build_index();
        let resolved = resolver::resolve_all(&registry, &index, &self.scanner);
        let manifest = self.assemble(&registry, &index, &resolved);

        tracing::info!(
            units = manifest.units.len(),
            uids = index.uid_count(),
            diagnostics = manifest.diagnostics.len(),
            "site assembled"
        );
        return Ok(manifest);
    }

    /// Rewrite bodies and collect diagnostics from resolved references.
    fn assemble(
        &self,
        registry: &Registry,
        index: &ResolutionIndex,
        resolved: &[UnitReferences],
    ) -> BuildManifest {
        let mut manifest = BuildManifest::default();

        for (unit, unit_refs) in registry.all_units().zip(resolved) {
            for reference in unit_refs.references.iter().filter(|r| return !r.resolution_state.is_resolved()) {
                tracing::warn!(
                    uid = %unit.uid,
                    token = %reference.target_token,
                    state = reference.resolution_state.label(),
                    "unresolved reference"
                );
                manifest.diagnostics.push(Diagnostic {
                    line: manifest::line_of_offset(&unit.raw_body, reference.location_offset),
                    location_offset: reference.location_offset,
                    resolution_state: reference.resolution_state.clone(),
                    source_path: unit.source_path.clone(),
                    suggestions: index.suggest(&reference.target_token),
                    target_token: reference.target_token.clone(),
                    uid: unit.uid.clone(),
                });
            }

            manifest.units.push(ManifestUnit {
                body: rewrite::rewrite_body(unit, &unit_refs.references, registry, &self.links),
                href: rewrite::href_for(unit, &self.links),
                kind: unit.kind,
                source_path: unit.source_path.clone(),
                title: unit.title.clone(),
                uid: unit.uid.clone(),
            });
        }
        return manifest;
    }
}

/// Run the pipeline with default settings.
///
/// # Errors
///
/// Returns `Error::RegistryCollision` if two units share a uid.
pub fn run(
    manual_pages: impl IntoIterator<Item = ContentUnit>,
    generated_members: impl IntoIterator<Item = ContentUnit>,
) -> Result<BuildManifest, Error> {
    return SiteAssembly::with_defaults()?.run(manual_pages, generated_members);
}
