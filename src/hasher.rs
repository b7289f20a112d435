/// Content digests of build manifests, used to tell whether a written
/// manifest still matches what the current sources would produce.
use sha2::{Digest as _, Sha256};

use crate::error::Error;
use crate::manifest::BuildManifest;
use crate::types::ManifestDigest;

/// Compute the SHA-256 digest of a manifest's canonical serialization.
///
/// The serialization is deterministic: struct fields are emitted in
/// declaration order and every sequence is already in canonical build order,
/// so identical inputs always hash identically.
///
/// # Errors
///
/// Returns `Error::Json` if the manifest cannot be serialized.
pub fn digest_manifest(manifest: &BuildManifest) -> Result<ManifestDigest, Error> {
    let canonical = serde_json::to_vec(manifest)?;
    let hash = Sha256::digest(&canonical);
    return Ok(ManifestDigest(format!("{hash:x}")));
}
