//! Build manifest: the complete handoff to the renderer, plus persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{ResolutionState, UnitKind};

/// Everything the renderer needs. Units are in registration order and their
/// bodies are already rewritten; diagnostics are in (registration order,
/// offset) order. The renderer never re-resolves anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Unresolved references, in canonical order.
    pub diagnostics: Vec<Diagnostic>,
    /// Rewritten content units.
    pub units: Vec<ManifestUnit>,
}

/// One reference that did not resolve to a single unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// One-based line of the reference in the owning unit's body.
    pub line: u32,
    /// Byte offset of the reference in the owning unit's raw body.
    pub location_offset: usize,
    /// Why the reference did not resolve.
    pub resolution_state: ResolutionState,
    /// Source path of the owning unit, for humans.
    pub source_path: String,
    /// Close matches worth suggesting, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    /// The token as the author wrote it.
    pub target_token: String,
    /// uid of the owning unit.
    pub uid: String,
}

/// A content unit after link rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestUnit {
    /// Rewritten body.
    pub body: String,
    /// Link target of this unit relative to the site root.
    pub href: String,
    /// Origin of the unit.
    pub kind: UnitKind,
    /// File path or fully-qualified symbol name.
    pub source_path: String,
    /// Display title.
    pub title: String,
    /// Unique identifier.
    pub uid: String,
}

impl BuildManifest {
    /// Diagnostics that are ambiguous, as opposed to missing.
    pub fn ambiguous_count(&self) -> usize {
        return self
            .diagnostics
            .iter()
            .filter(|d| return matches!(d.resolution_state, ResolutionState::Ambiguous(_)))
            .count();
    }

    /// Whether any reference failed to resolve.
    pub fn has_diagnostics(&self) -> bool {
        return !self.diagnostics.is_empty();
    }

    /// Parse a manifest from JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the content is not a valid manifest.
    pub fn parse(content: &str) -> Result<Self, Error> {
        return Ok(serde_json::from_str(content)?);
    }

    /// Read and parse a manifest from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::ManifestNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures,
    /// or `Error::Json` if the content is not a valid manifest.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ManifestNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Serialize to pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn serialize(&self) -> Result<String, Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        return Ok(json);
    }

    /// Write the manifest to disk, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails,
    /// or `Error::Io` if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let content = self.serialize()?;
        if let Some(parent) = path.parent().filter(|p| return !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        return Ok(());
    }
}

/// One-based line number of a byte offset in `body`.
pub fn line_of_offset(body: &str, offset: usize) -> u32 {
    let before = body.get(..offset).unwrap_or(body);
    let newlines = before.bytes().filter(|b| return *b == b'\n').count();
    return u32::try_from(newlines).unwrap_or(u32::MAX).saturating_add(1);
}
