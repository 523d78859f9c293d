//! Prefix tree keyed by byte strings
//!
//! Used to group alignment segments by read name in a single streaming pass,
//! without sorting the input or hashing the names.

use std::collections::TryReserveError;

#[derive(Debug)]
pub enum TrieError {
    EmptyKey,
    Allocation(TryReserveError),
}

impl std::fmt::Display for TrieError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrieError::EmptyKey => write!(f, "Trie keys must not be empty"),
            TrieError::Allocation(e) => write!(f, "Failed to grow trie node: {}", e),
        }
    }
}

impl std::error::Error for TrieError {}

impl From<TryReserveError> for TrieError {
    fn from(e: TryReserveError) -> Self {
        TrieError::Allocation(e)
    }
}

#[derive(Debug)]
struct TrieNode<V> {
    key: u8,
    children: Vec<TrieNode<V>>,
    value: Option<V>,
}

impl<V> TrieNode<V> {
    fn new(key: u8) -> Self {
        Self {
            key,
            children: Vec::new(),
            value: None,
        }
    }

    fn child_index(&self, key: u8) -> Option<usize> {
        self.children.iter().position(|child| child.key == key)
    }

    /// Build a linear chain of single-byte nodes for `suffix`, storing `value`
    /// at its tail. `suffix` must not be empty.
    fn chain(suffix: &[u8], value: V) -> Result<Self, TryReserveError> {
        let mut node = TrieNode::new(suffix[suffix.len() - 1]);
        node.value = Some(value);

        // Built from the tail upwards so no recursion is needed
        for &key in suffix[..suffix.len() - 1].iter().rev() {
            let mut parent = TrieNode::new(key);
            parent.children.try_reserve_exact(1)?;
            parent.children.push(node);
            node = parent;
        }

        Ok(node)
    }

    fn count(&self) -> usize {
        self.children.iter().map(TrieNode::count).sum::<usize>() + self.value.is_some() as usize
    }

    fn destroy_with<F: FnMut(V)>(self, cleanup: &mut F) {
        for child in self.children {
            child.destroy_with(cleanup);
        }
        if let Some(value) = self.value {
            cleanup(value);
        }
    }
}

/// String-keyed prefix tree.
///
/// Children are kept in insertion order and scanned linearly, so lookups cost
/// O(key length × branching factor).
#[derive(Debug)]
pub struct Trie<V> {
    root: TrieNode<V>,
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Trie<V> {
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(0),
        }
    }

    /// Insert `value` under `key`, replacing any value already stored there.
    pub fn insert(&mut self, key: &str, value: V) -> Result<(), TrieError> {
        let key = key.as_bytes();
        if key.is_empty() {
            return Err(TrieError::EmptyKey);
        }

        let mut node = &mut self.root;
        let mut position = 0;
        while position < key.len() {
            match node.child_index(key[position]) {
                Some(index) => {
                    node = &mut node.children[index];
                    position += 1;
                }
                None => break,
            }
        }

        if position == key.len() {
            node.value = Some(value);
            return Ok(());
        }

        // Graft the remaining suffix as a fresh branch
        node.children.try_reserve(1)?;
        let branch = TrieNode::chain(&key[position..], value)?;
        node.children.push(branch);

        Ok(())
    }

    fn terminal(&self, key: &str) -> Option<&TrieNode<V>> {
        if key.is_empty() {
            return None;
        }
        let mut node = &self.root;
        for &byte in key.as_bytes() {
            let index = node.child_index(byte)?;
            node = &node.children[index];
        }
        Some(node)
    }

    /// Look up the value stored under exactly `key`.
    pub fn find(&self, key: &str) -> Option<&V> {
        self.terminal(key).and_then(|node| node.value.as_ref())
    }

    /// Number of values stored in the trie.
    pub fn count(&self) -> usize {
        self.root.count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Tear the trie down depth-first, handing every stored value to
    /// `cleanup` exactly once. Children are released before their parent.
    pub fn destroy_with<F: FnMut(V)>(self, mut cleanup: F) {
        self.root.destroy_with(&mut cleanup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find() {
        let mut trie = Trie::new();
        let keys = ["read1", "read10", "read2", "other", "r"];
        for (i, key) in keys.iter().enumerate() {
            trie.insert(key, i).unwrap();
        }

        for (i, key) in keys.iter().enumerate() {
            assert_eq!(trie.find(key), Some(&i), "key {}", key);
        }
        assert_eq!(trie.count(), keys.len());
    }

    #[test]
    fn test_missing_keys() {
        let mut trie = Trie::new();
        trie.insert("read10", 1).unwrap();

        // Prefix of a stored key, path exists but holds no value
        assert_eq!(trie.find("read1"), None);
        // Descent runs out of children mid-key
        assert_eq!(trie.find("read100"), None);
        assert_eq!(trie.find("rx"), None);
        assert_eq!(trie.find(""), None);
    }

    #[test]
    fn test_reinsert_replaces_value() {
        let mut trie = Trie::new();
        trie.insert("abc", 1).unwrap();
        trie.insert("abc", 2).unwrap();
        assert_eq!(trie.find("abc"), Some(&2));
        assert_eq!(trie.count(), 1);
    }

    #[test]
    fn test_value_on_interior_node() {
        let mut trie = Trie::new();
        trie.insert("abcd", 1).unwrap();
        trie.insert("ab", 2).unwrap();
        assert_eq!(trie.find("ab"), Some(&2));
        assert_eq!(trie.find("abcd"), Some(&1));
        assert_eq!(trie.find("abc"), None);
        assert_eq!(trie.count(), 2);
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut trie = Trie::new();
        assert!(matches!(trie.insert("", 1), Err(TrieError::EmptyKey)));
        assert!(trie.is_empty());
        assert_eq!(trie.count(), 0);
    }

    #[test]
    fn test_destroy_with_visits_each_value_once() {
        let mut trie = Trie::new();
        for key in ["a", "ab", "abc", "b", "ba"] {
            trie.insert(key, key.to_string()).unwrap();
        }

        let mut seen = Vec::new();
        trie.destroy_with(|value| seen.push(value));
        seen.sort();
        assert_eq!(seen, vec!["a", "ab", "abc", "b", "ba"]);
    }

    #[test]
    fn test_destroy_children_before_parent() {
        let mut trie = Trie::new();
        trie.insert("x", 0).unwrap();
        trie.insert("xy", 1).unwrap();
        trie.insert("xyz", 2).unwrap();

        let mut order = Vec::new();
        trie.destroy_with(|value| order.push(value));
        assert_eq!(order, vec![2, 1, 0]);
    }
}
