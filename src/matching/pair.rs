//! Canonical key for an unordered pair of users.

use std::fmt;

/// The two user ids sorted lexicographically and joined by `:`.
///
/// Every lookup and write concerning a pair goes through this key, so the
/// direction in which two members met never matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        PairKey(format!("{}:{}", low, high))
    }

    /// Wrap a key read back from the store.
    pub fn from_stored(key: String) -> Self {
        PairKey(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_ignores_order() {
        assert_eq!(PairKey::new("alice", "bob"), PairKey::new("bob", "alice"));
        assert_eq!(PairKey::new("bob", "alice").as_str(), "alice:bob");
    }

    #[test]
    fn test_pair_key_distinguishes_pairs() {
        assert_ne!(PairKey::new("a", "b"), PairKey::new("a", "c"));
    }
}
