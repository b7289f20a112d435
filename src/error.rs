/// Crate-level error types for docxref diagnostics.
use std::path::PathBuf;

/// All errors in docxref carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, uid, or reason for failure.
///
/// Unresolved references are not errors: they travel as data inside the
/// manifest. Only conditions that make a build meaningless end up here.
#[allow(clippy::error_impl_error, reason = "crate-level error type")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An API member record file could not be parsed.
    #[error("invalid api record file {}: {reason}", file.display())]
    ApiRecordInvalid {
        /// Record file that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A content file exists but cannot be read as UTF-8 text.
    #[error("cannot read {}: {reason}", file.display())]
    ContentUnreadable {
        /// Content file that failed to load.
        file: PathBuf,
        /// Description of the read failure.
        reason: String,
    },

    /// Two content units claim the same uid at registration time.
    #[error("duplicate uid: `{uid}` declared by {existing} and {incoming}")]
    DuplicateUid {
        /// Source path of the unit registered first.
        existing: String,
        /// Source path of the unit that was rejected.
        incoming: String,
        /// The contested uid.
        uid: String,
    },

    /// A content unit arrived without a usable uid.
    #[error("empty uid for {source_path}")]
    EmptyUid {
        /// Source path of the unit without a uid.
        source_path: String,
    },

    /// A markdown page has a front-matter block that is not valid YAML.
    #[error("invalid front-matter in {}: {reason}", file.display())]
    FrontMatterInvalid {
        /// Markdown file containing the front-matter.
        file: PathBuf,
        /// Description of the YAML failure.
        reason: String,
    },

    /// The configured informal reference pattern does not compile.
    #[error("invalid reference pattern: {0}")]
    InvalidPattern(
        /// The wrapped regex compilation error.
        #[from]
        regex::Error,
    ),

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON (de)serialization of the manifest failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// Expected manifest does not exist on disk.
    #[error("manifest not found: {}", path.display())]
    ManifestNotFound {
        /// Path to the missing manifest.
        path: PathBuf,
    },

    /// The site build aborted because the registry rejected a duplicate uid.
    /// Raised before any reference is resolved.
    #[error("registry collision: `{uid}` declared by {existing} and {incoming}")]
    RegistryCollision {
        /// Source path of the unit registered first.
        existing: String,
        /// Source path of the unit that was rejected.
        incoming: String,
        /// The contested uid.
        uid: String,
    },

    /// TOML deserialization of `.docxref.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The filesystem watcher could not be set up.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}
