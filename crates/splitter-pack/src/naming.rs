//! Globally unique entry names
//!
//! The engine only guarantees unique names within one input file. Entries from
//! different files are disambiguated here with a `_<n>` suffix, checked against
//! an in-memory set rather than any storage medium.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct UniqueNamer {
    taken: HashSet<String>,
}

impl UniqueNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a name as used without generating it (e.g. a manifest entry)
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// Claim `<stem>.<ext>`, or `<stem>_<n>.<ext>` with the lowest free `n >= 1`
    pub fn claim(&mut self, stem: &str, ext: &str) -> String {
        let mut name = format!("{}.{}", stem, ext);
        let mut counter = 1;
        while self.taken.contains(&name) {
            name = format!("{}_{}.{}", stem, counter, ext);
            counter += 1;
        }

        self.taken.insert(name.clone());
        name
    }
}
