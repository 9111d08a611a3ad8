//! The live seed list
//!
//! Seeds come from configuration at startup, but the list can grow while
//! the crawl runs: when a seed's very first fetch redirects, the redirect
//! target is adopted as a seed in its own right.

use std::collections::HashSet;
use std::sync::Mutex;

/// Thread-safe, append-only list of seed URIs
#[derive(Debug, Default)]
pub struct SeedList {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    list: Vec<String>,
    known: HashSet<String>,
}

impl SeedList {
    pub fn new(seeds: impl IntoIterator<Item = String>) -> Self {
        let list = Self::default();
        for seed in seeds {
            list.push(seed);
        }
        list
    }

    /// Appends a seed unless it is already listed. Returns true when added.
    pub fn push(&self, uri: impl Into<String>) -> bool {
        let uri = uri.into();
        let mut inner = self.inner.lock().unwrap();
        if !inner.known.insert(uri.clone()) {
            return false;
        }
        inner.list.push(uri);
        true
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.inner.lock().unwrap().known.contains(uri)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of the current list, in insertion order
    pub fn snapshot(&self) -> Vec<String> {
        self.inner.lock().unwrap().list.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_snapshot() {
        let seeds = SeedList::new(vec!["http://a.com/".to_string()]);
        assert!(seeds.push("http://b.com/"));
        assert_eq!(
            seeds.snapshot(),
            vec!["http://a.com/".to_string(), "http://b.com/".to_string()]
        );
    }

    #[test]
    fn test_push_deduplicates() {
        let seeds = SeedList::default();
        assert!(seeds.push("http://a.com/"));
        assert!(!seeds.push("http://a.com/"));
        assert_eq!(seeds.len(), 1);
    }

    #[test]
    fn test_contains() {
        let seeds = SeedList::new(vec!["http://a.com/".to_string()]);
        assert!(seeds.contains("http://a.com/"));
        assert!(!seeds.contains("http://b.com/"));
    }
}
