//! Request-scoped identifier registry.
//!
//! Maps counter identifiers to dense integer codes and back. Codes index
//! the node feature table, the edge list handed to the cost oracle and the
//! route graph, so all three agree on what node `k` is.

use crate::error::{RerouteError, Result};
use std::collections::{BTreeSet, HashMap};

/// Dense node code assigned by an [`IdentifierRegistry`].
pub type NodeCode = usize;

/// Bidirectional identifier ↔ code mapping.
///
/// Codes follow the lexicographic order of the identifiers, so the same set
/// of identifiers always yields the same codes regardless of the order in
/// which they were seen.
///
/// # Examples
///
/// ```
/// use reroute::registry::IdentifierRegistry;
///
/// let registry = IdentifierRegistry::fit(["C", "A", "B", "A"]);
/// assert_eq!(registry.len(), 3);
/// assert_eq!(registry.encode("B").unwrap(), 1);
/// assert_eq!(registry.decode(2).unwrap(), "C");
/// assert!(registry.encode("Z").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdentifierRegistry {
    labels: Vec<String>,
    codes: HashMap<String, NodeCode>,
}

impl IdentifierRegistry {
    /// Registers the distinct identifiers in `ids`.
    pub fn fit<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = ids.into_iter().map(|s| s.as_ref().to_string()).collect();
        let labels: Vec<String> = unique.into_iter().collect();
        let codes = labels
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code))
            .collect();
        Self { labels, codes }
    }

    /// Code for `identifier`.
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` if the identifier was never registered.
    pub fn encode(&self, identifier: &str) -> Result<NodeCode> {
        self.codes
            .get(identifier)
            .copied()
            .ok_or_else(|| RerouteError::InvalidIdentifier {
                identifier: identifier.to_string(),
            })
    }

    /// Identifier for `code`.
    ///
    /// # Errors
    ///
    /// `InvalidCode` if `code` is out of range.
    pub fn decode(&self, code: NodeCode) -> Result<&str> {
        self.labels
            .get(code)
            .map(String::as_str)
            .ok_or(RerouteError::InvalidCode {
                code,
                len: self.labels.len(),
            })
    }

    /// True when `identifier` is registered.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.codes.contains_key(identifier)
    }

    /// Number of registered identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Identifiers in code order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
