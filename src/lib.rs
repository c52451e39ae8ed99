//! IIIF Presentation Upgrade Library
//!
//! This library upgrades documents written against the IIIF Presentation
//! API 2.x (collections, manifests, sequences, canvases, ranges and
//! annotations) into their Presentation API 3.0 form.
//!
//! # Overview
//!
//! The upgrade is a recursive rewrite of the document tree:
//!
//! 1. Every node's legacy `@type` (or, for services, `@context`/`profile`)
//!    is resolved to a Presentation 3 `type`
//! 2. Properties shared by all resources are renamed and normalized:
//!    language maps, sets, typed object references
//! 3. A per-type transformer restructures the node (`sequences` and
//!    `canvases` become `items`, canvas images move into an annotation page,
//!    flat ranges are nested under their parents, ...)
//! 4. The walk continues into every nested node
//!
//! Nothing unexpected in the input stops an upgrade. Unknown properties,
//! contexts and profiles, dangling range parents and references whose type
//! could not be worked out are returned as [`Diagnostic`]s next to the
//! upgraded document.
//!
//! # Usage
//!
//! ```ignore
//! use iiif_upgrade::{upgrade, to_json_string, NoOpDereferencer, UpgradeOptions};
//!
//! let document: serde_json::Value = // load a Presentation 2 manifest
//! let options = UpgradeOptions { deref_links: false, ..UpgradeOptions::default() };
//! let result = upgrade(document, &options, &NoOpDereferencer)?;
//!
//! for diagnostic in &result.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! println!("{}", to_json_string(&result, true)?);
//! ```

pub mod deref;
pub mod diagnostics;
pub mod error;
pub mod language;
pub mod loader;
pub mod normalize;
pub mod ranges;
pub mod resource;
pub mod transform;
pub mod upgrade;
pub mod vocab;
pub mod walk;

// Re-export main types for convenience
pub use crate::deref::{Dereferencer, HttpDereferencer, NoOpDereferencer};
pub use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use crate::error::UpgradeError;
pub use crate::language::{language_map, LanguageMap};
pub use crate::loader::{load_document, parse_document, DocumentSource};
pub use crate::resource::ResourceType;
pub use crate::upgrade::{
    to_json_string, upgrade, UpgradeOptions, UpgradeResult, UpgradeStats, Upgrader,
};
pub use crate::vocab::{PRESENTATION_2_CONTEXT, PRESENTATION_3_CONTEXT};
