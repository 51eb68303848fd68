//! Schema capability gate.
//!
//! The database schema is rolled out incrementally, so a relation or column
//! this code knows about may not exist yet in a given deployment. Every
//! optional read asks a [`SchemaCapabilityProvider`] first.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

/// Answers whether a relation and a set of its columns exist.
///
/// Implementations return `false` when uncertain and never fail.
#[async_trait]
pub trait SchemaCapabilityProvider: Send + Sync {
    /// `true` when `relation` exists and has every column in `columns`.
    ///
    /// An empty `columns` slice checks for the relation alone.
    async fn has_required_columns(&self, relation: &str, columns: &[&str]) -> bool;
}

/// A fixed capability table, resolved once (e.g. per schema version).
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilities {
    relations: HashMap<String, HashSet<String>>,
}

impl StaticCapabilities {
    /// An empty table: nothing is available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a relation with its columns.
    pub fn with_relation(mut self, relation: &str, columns: &[&str]) -> Self {
        self.relations
            .entry(relation.to_string())
            .or_default()
            .extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Check a relation synchronously.
    pub fn supports(&self, relation: &str, columns: &[&str]) -> bool {
        self.relations
            .get(relation)
            .is_some_and(|known| columns.iter().all(|c| known.contains(*c)))
    }
}

#[async_trait]
impl SchemaCapabilityProvider for StaticCapabilities {
    async fn has_required_columns(&self, relation: &str, columns: &[&str]) -> bool {
        self.supports(relation, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_capabilities() {
        let caps = StaticCapabilities::new()
            .with_relation("destinations", &["id", "status"])
            .with_relation("destinations", &["sent_at"]);

        assert!(caps.has_required_columns("destinations", &[]).await);
        assert!(caps.has_required_columns("destinations", &["id", "sent_at"]).await);
        assert!(!caps.has_required_columns("destinations", &["submitted_at"]).await);
        assert!(!caps.has_required_columns("offers", &[]).await);
    }
}
