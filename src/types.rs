/// Core domain types for docxref content units, references, and digests.
use serde::{Deserialize, Serialize};

/// One documentation page or one generated API member description.
/// The uid is set by whoever builds the unit; the registry never parses text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    /// Whether this unit was written by hand or generated from API metadata.
    pub kind: UnitKind,
    /// Text containing zero or more embedded references.
    pub raw_body: String,
    /// File path for manual pages, fully-qualified symbol name for API members.
    pub source_path: String,
    /// Display string used as link text when the unit is referenced.
    pub title: String,
    /// Identifier that must be unique across one build.
    pub uid: String,
}

impl ContentUnit {
    /// Build a generated API member. Its source path is the symbol name itself.
    pub fn api_member(uid: &str, title: &str, raw_body: &str) -> Self {
        return Self {
            kind: UnitKind::GeneratedApiMember,
            raw_body: raw_body.to_string(),
            source_path: uid.to_string(),
            title: title.to_string(),
            uid: uid.to_string(),
        };
    }

    /// Build a hand-written page loaded from `source_path`.
    pub fn manual_page(uid: &str, title: &str, source_path: &str, raw_body: &str) -> Self {
        return Self {
            kind: UnitKind::ManualPage,
            raw_body: raw_body.to_string(),
            source_path: source_path.to_string(),
            title: title.to_string(),
            uid: uid.to_string(),
        };
    }
}

/// A SHA-256 digest of a serialized manifest, 64 lowercase hex chars.
/// Newtype prevents mixing with arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDigest(
    /// The hex-encoded SHA-256 digest string.
    pub String,
);

/// One occurrence of a cross-reference inside a unit's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Byte offset of the first character of the match in the owning body.
    pub location_offset: usize,
    /// Outcome of the lookup; `Unresolved` until the resolver runs.
    pub resolution_state: ResolutionState,
    /// Byte length of the whole match, delimiters included.
    pub span_len: usize,
    /// Which syntax the author used.
    pub syntax: SyntaxKind,
    /// The token as written, minus delimiters and trailing punctuation.
    pub target_token: String,
}

impl Reference {
    /// Byte offset one past the end of the match.
    pub fn end_offset(&self) -> usize {
        return self.location_offset.saturating_add(self.span_len);
    }
}

/// Result of looking a reference up in the resolution index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "uids", rename_all = "snake_case")]
pub enum ResolutionState {
    /// Several units could be meant. Candidates are sorted.
    Ambiguous(Vec<String>),
    /// Nothing in the index matches.
    Missing,
    /// Exactly one unit matches.
    Resolved(String),
    /// Not looked up yet.
    Unresolved,
}

impl ResolutionState {
    /// Whether the reference will render as a link.
    pub const fn is_resolved(&self) -> bool {
        return matches!(self, Self::Resolved(_));
    }

    /// Short lowercase label used in CSS classes and text output.
    pub const fn label(&self) -> &'static str {
        return match self {
            Self::Ambiguous(_) => "ambiguous",
            Self::Missing => "missing",
            Self::Resolved(_) => "resolved",
            Self::Unresolved => "unresolved",
        };
    }
}

/// Reference syntaxes recognized by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxKind {
    /// `<xref:Token>`
    AngleXref,
    /// `@Token`, `@"Token"` or `@'Token'`
    AtMention,
    /// `` `Namespace.Type` `` matching the informal pattern.
    InlineCode,
    /// `[link text](xref:Token)`; the author's link text is kept.
    MarkdownLink,
    /// `xref:Token`
    Xref,
}

/// Origin of a content unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// A record produced by an external API metadata extraction step.
    GeneratedApiMember,
    /// A hand-written markdown page.
    ManualPage,
}
