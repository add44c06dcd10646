//! Diagnostics recorded while loading actions and evaluating documents
//!
//! Nothing in the engine is fatal to the host. When something goes wrong the
//! offending action or modification is skipped and a [`Diagnostic`] is
//! recorded instead. Every recorded diagnostic is also emitted as a `tracing`
//! event so operators see it without inspecting the outcome.

use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Something was tolerated or worked around
    Warning,
    /// An action or modification was skipped
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// What a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// An action definition failed validation and was disabled
    Configuration,
    /// A frontmatter line had no `:` separator
    MalformedLine,
    /// A frontmatter opening fence had no closing fence
    UnterminatedFrontmatter,
    /// Duplicate frontmatter keys collapsed with last-wins
    DuplicateKey,
    /// A modification could not be applied and was skipped
    SkippedModification,
}

/// A single non-fatal problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Name of the action involved, if any
    pub action: Option<String>,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(severity: Severity, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            action: None,
            severity,
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, message)
    }

    #[must_use]
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, message)
    }

    /// Attach the name of the action this diagnostic belongs to
    #[must_use]
    pub fn for_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    /// Emit this diagnostic as a `tracing` event
    pub fn emit(&self) {
        let action = self.action.as_deref().unwrap_or("-");
        match self.severity {
            Severity::Warning => tracing::warn!(action, kind = ?self.kind, "{}", self.message),
            Severity::Error => tracing::error!(action, kind = ?self.kind, "{}", self.message),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Some(action) => write!(f, "{} [{}]: {}", self.severity, action, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Ordered collection of diagnostics
///
/// Pushing a diagnostic emits it immediately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.0.push(diagnostic);
    }

    /// Move all diagnostics from `other` into `self`, tagging them with `action`
    pub fn absorb(&mut self, other: Self, action: &str) {
        self.0.extend(other.0.into_iter().map(|d| match d.action {
            Some(_) => d,
            None => d.for_action(action),
        }));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_tags_untagged_diagnostics() {
        let mut inner = Diagnostics::new();
        inner.push(Diagnostic::warning(DiagnosticKind::MalformedLine, "no colon"));
        inner.push(
            Diagnostic::error(DiagnosticKind::SkippedModification, "skipped").for_action("other"),
        );

        let mut outer = Diagnostics::new();
        outer.absorb(inner, "tidy");

        let actions: Vec<_> = outer.iter().map(|d| d.action.as_deref()).collect();
        assert_eq!(actions, vec![Some("tidy"), Some("other")]);
        assert!(outer.has_errors());
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::warning(DiagnosticKind::DuplicateKey, "duplicate key 'a'").for_action("x");
        assert_eq!(d.to_string(), "warning [x]: duplicate key 'a'");
    }
}
