//! The evidence store: one result per executed step, in execution order.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultStoreError {
    #[error("evidence variable {0:?} already has a result")]
    AlreadyBound(String),
}

/// Mapping from evidence variable (`#E1`) to its stringified result.
///
/// Insert-only. A variable is bound at most once, so the number of entries
/// equals the number of steps that have completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultStore {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `variable` to `value`. Returns the new number of entries.
    pub fn insert(
        &mut self,
        variable: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<usize, ResultStoreError> {
        let variable = variable.into();
        if self.index.contains_key(&variable) {
            return Err(ResultStoreError::AlreadyBound(variable));
        }
        self.index.insert(variable.clone(), self.entries.len());
        self.entries.push((variable, value.into()));
        Ok(self.entries.len())
    }

    pub fn get(&self, variable: &str) -> Option<&str> {
        self.index
            .get(variable)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.index.contains_key(variable)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(variable, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
