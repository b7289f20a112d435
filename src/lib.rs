//! Cross-reference resolution and content merge for documentation builds.
//!
//! Hand-written pages and generated API member records are registered under
//! unique uids, every `xref:`-style reference in their bodies is resolved
//! against that registry, and the rewritten units are emitted as a
//! [`manifest::BuildManifest`] for an external renderer.
//!
//! ```
//! use docxref::types::ContentUnit;
//!
//! let pages = vec![
//!     ContentUnit::manual_page("getting_started", "Getting Started", "getting_started.md", "see xref:guides"),
//!     ContentUnit::manual_page("guides", "Guides", "guides.md", "..."),
//! ];
//! let manifest = docxref::driver::run(pages, Vec::new())?;
//! assert!(manifest.diagnostics.is_empty());
//! # Ok::<(), docxref::error::Error>(())
//! ```

pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod hasher;
pub mod index;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod rewrite;
pub mod scanner;
pub mod types;
