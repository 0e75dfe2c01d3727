//! Non-fatal findings recorded while a report is processed.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::resource::ResourceKey;

/// What kind of name could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// An assembly name/version pair
    Assembly,
    /// A fully qualified type name
    Type,
}

/// A condition that dropped part of the graph without failing the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A name in the report could not be mapped to a resource; the edge was dropped.
    UnresolvedReference {
        /// Assembly or type
        reference: ReferenceKind,
        /// The unresolved name
        name: String,
        /// Where the name was referenced from
        referenced_from: String,
    },
    /// A type reference could not be rolled up and was skipped: a file or
    /// folder has no owner, or no `References` edge links the two projects.
    InconsistentRollup {
        /// Source endpoint
        from: ResourceKey,
        /// Target endpoint
        to: ResourceKey,
        /// Why the step was skipped
        reason: String,
    },
}

/// Run-scoped list of diagnostics. Every push is also logged.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an unresolved type reference.
    pub fn unresolved_type(&mut self, name: &str, referenced_from: &str) {
        warn!(
            "Unresolved type reference {} (from {}), dropping edge",
            name, referenced_from
        );
        self.entries.push(Diagnostic::UnresolvedReference {
            reference: ReferenceKind::Type,
            name: name.to_string(),
            referenced_from: referenced_from.to_string(),
        });
    }

    /// Records an assembly reference that names nothing (blank name).
    pub fn unresolved_assembly(&mut self, name: &str, referenced_from: &str) {
        warn!(
            "Unresolved assembly reference {:?} (from {}), dropping edge",
            name, referenced_from
        );
        self.entries.push(Diagnostic::UnresolvedReference {
            reference: ReferenceKind::Assembly,
            name: name.to_string(),
            referenced_from: referenced_from.to_string(),
        });
    }

    /// Records a type reference skipped because its project hierarchy is incomplete.
    pub fn inconsistent_rollup(&mut self, from: &ResourceKey, to: &ResourceKey, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Skipping rollup from {} to {}: {}", from, to, reason);
        self.entries.push(Diagnostic::InconsistentRollup {
            from: from.clone(),
            to: to.clone(),
            reason,
        });
    }

    /// All recorded diagnostics, in order.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of unresolved-reference diagnostics.
    pub fn unresolved_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| matches!(d, Diagnostic::UnresolvedReference { .. }))
            .count()
    }

    /// Number of inconsistent-rollup diagnostics.
    pub fn inconsistent_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| matches!(d, Diagnostic::InconsistentRollup { .. }))
            .count()
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the list.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_kind() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.unresolved_type("System.String", "Shop.Order");
        diagnostics.inconsistent_rollup(
            &ResourceKey::new("acme:Core"),
            &ResourceKey::new("acme:Web"),
            "no project-level edge",
        );
        diagnostics.unresolved_type("System.Int32", "Shop.Order");

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.unresolved_count(), 2);
        assert_eq!(diagnostics.inconsistent_count(), 1);
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.unresolved_type("Vendor.Widget", "Shop.Cart");

        let json = serde_json::to_value(diagnostics.entries()).unwrap();
        assert_eq!(json[0]["kind"], "unresolved_reference");
        assert_eq!(json[0]["reference"], "type");
        assert_eq!(json[0]["name"], "Vendor.Widget");
    }
}
