//! Include chain and cycle detection.
//!
//! The chain is the ordered list of include ids visited on the current
//! recursive path. It is extended copy-on-write, one new chain value per
//! recursive call, so sibling includes of a glob expansion never observe
//! each other's extensions beyond their common prefix. Revisiting an id is
//! the engine's sole built-in recursion-termination safeguard.

use crate::core::{PetkError, Result};

/// The ids visited on the current include path, in visit order.
#[derive(Debug, Clone, Default)]
pub struct IncludeChain {
    ids: Vec<String>,
}

impl IncludeChain {
    /// An empty chain for a top-level resolve call.
    pub fn new() -> Self {
        Self::default()
    }

    /// The visited ids in visit order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Current include nesting depth.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Return a new chain with `next_id` appended.
    ///
    /// # Errors
    ///
    /// Returns [`PetkError::Cycle`] if `next_id` was already visited; the
    /// message enumerates the full chain plus the repeated id.
    pub fn extend(&self, next_id: &str) -> Result<Self> {
        if self.ids.iter().any(|id| id == next_id) {
            let chain = self
                .ids
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(next_id))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(PetkError::Cycle { chain });
        }

        let mut ids = self.ids.clone();
        ids.push(next_id.to_string());
        Ok(Self { ids })
    }
}
