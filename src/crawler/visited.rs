use std::collections::HashSet;

use super::address::Address;

/// Addresses already fetched (or attempted) during one crawl run
///
/// Only grows. Not shared between runs unless the caller passes the same set
/// to a new walker.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    addresses: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `address` as visited, returning `false` if it already was
    pub fn insert(&mut self, address: &Address) -> bool {
        self.addresses.insert(address.as_str().to_string())
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.addresses.contains(address.as_str())
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.addresses.iter().map(String::as_str)
    }
}
