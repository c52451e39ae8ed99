//! Non-fatal diagnostics collected during an upgrade
//!
//! Nothing recorded here stops a run. Callers get the full list back with
//! the upgraded document and can filter it by [`DiagnosticKind`].

use std::fmt;

use serde::Serialize;

/// Category of a [`Diagnostic`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnknownProperty,
    UnknownContext,
    UnknownProfile,
    DanglingRange,
    RangeCycle,
    UnresolvedReference,
    MalformedChoice,
    EmptyLanguageValue,
}

/// A single unexpected or unresolved input condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    UnknownProperty {
        property: String,
    },
    UnknownContext {
        context: String,
    },
    UnknownProfile {
        profile: String,
    },
    DanglingRange {
        range: String,
        parent: String,
    },
    RangeCycle {
        range: String,
        parent: String,
    },
    UnresolvedReference {
        property: String,
        id: String,
        reason: String,
    },
    MalformedChoice {
        id: Option<String>,
    },
    /// A language-valued property with no usable string in it
    EmptyLanguageValue {
        property: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownProperty { property } => write!(f, "Unknown property: {}", property),
            Diagnostic::UnknownContext { context } => write!(f, "Unknown context: {}", context),
            Diagnostic::UnknownProfile { profile } => {
                write!(f, "Unrecognized profile: {} (continuing)", profile)
            }
            Diagnostic::DanglingRange { range, parent } => {
                write!(f, "Unknown parent range {} for range {}", parent, range)
            }
            Diagnostic::RangeCycle { range, parent } => write!(
                f,
                "Range {} cannot be placed within its own descendant {}",
                range, parent
            ),
            Diagnostic::UnresolvedReference {
                property,
                id,
                reason,
            } => write!(
                f,
                "Don't know type for {} reference {}: {}",
                property, id, reason
            ),
            Diagnostic::MalformedChoice { id } => match id {
                Some(id) => write!(f, "Choice {} has neither default nor item", id),
                None => write!(f, "Choice has neither default nor item"),
            },
            Diagnostic::EmptyLanguageValue { property } => {
                write!(f, "No text in {}, property dropped", property)
            }
        }
    }
}

impl Diagnostic {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::UnknownProperty { .. } => DiagnosticKind::UnknownProperty,
            Diagnostic::UnknownContext { .. } => DiagnosticKind::UnknownContext,
            Diagnostic::UnknownProfile { .. } => DiagnosticKind::UnknownProfile,
            Diagnostic::DanglingRange { .. } => DiagnosticKind::DanglingRange,
            Diagnostic::RangeCycle { .. } => DiagnosticKind::RangeCycle,
            Diagnostic::UnresolvedReference { .. } => DiagnosticKind::UnresolvedReference,
            Diagnostic::MalformedChoice { .. } => DiagnosticKind::MalformedChoice,
            Diagnostic::EmptyLanguageValue { .. } => DiagnosticKind::EmptyLanguageValue,
        }
    }
}

/// Ordered collector of diagnostics for one run
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(kind = ?diagnostic.kind(), "{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Diagnostics of one category, in the order they were recorded
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind() == kind)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
