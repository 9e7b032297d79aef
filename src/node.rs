use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::value::StateValue;

/// One node of the state tree.
///
/// Nodes are immutable handles. Cloning a node clones a handle, never the
/// data behind it, so an unchanged subtree can be carried from one state to
/// the next and still compare as the [same](StateNode::same) node.
#[derive(Clone, Default)]
pub enum StateNode {
    /// Explicit "no value". Distinct from an absent node (`Option::None`).
    #[default]
    Null,
    /// Keyed children.
    Branch(Arc<StateBranch>),
    /// Any domain value.
    Leaf(StateValue),
}

impl StateNode {
    /// Wrap a domain value as a leaf.
    pub fn leaf<T: Any + Send + Sync>(value: T) -> Self {
        StateNode::Leaf(StateValue::new(value))
    }

    /// Build a branch from `(key, child)` pairs.
    pub fn branch<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, StateNode)>,
    {
        StateNode::Branch(Arc::new(StateBranch::from_entries(entries)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StateNode::Null)
    }

    pub fn as_branch(&self) -> Option<&StateBranch> {
        match self {
            StateNode::Branch(branch) => Some(branch),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&StateValue> {
        match self {
            StateNode::Leaf(value) => Some(value),
            _ => None,
        }
    }

    /// Child at `key`. `None` for missing keys and for non-branch nodes.
    pub fn get(&self, key: &str) -> Option<&StateNode> {
        self.as_branch().and_then(|branch| branch.get(key))
    }

    /// Node at a `/`-separated path, e.g. `"lorem/dolor/emet"`.
    ///
    /// The empty path addresses `self`.
    pub fn at(&self, path: &str) -> Option<&StateNode> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.get(segment))
    }

    /// Downcast a leaf to a concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_leaf().and_then(|value| value.downcast_ref::<T>())
    }

    /// Identity comparison.
    ///
    /// Two nulls are the same node; branches and leaves are the same only
    /// when they share an allocation. This is the change test used by the
    /// composition engine, so "unchanged" is observable without deep
    /// comparison.
    pub fn same(&self, other: &StateNode) -> bool {
        match (self, other) {
            (StateNode::Null, StateNode::Null) => true,
            (StateNode::Branch(a), StateNode::Branch(b)) => Arc::ptr_eq(a, b),
            (StateNode::Leaf(a), StateNode::Leaf(b)) => StateValue::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Short description of the node's kind, used in log messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            StateNode::Null => "null",
            StateNode::Branch(_) => "branch",
            StateNode::Leaf(value) => value.type_name(),
        }
    }
}

impl fmt::Debug for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateNode::Null => f.write_str("Null"),
            StateNode::Branch(branch) => fmt::Debug::fmt(branch, f),
            StateNode::Leaf(value) => fmt::Debug::fmt(value, f),
        }
    }
}

/// Keyed children of a branch node, ordered by key.
#[derive(Clone, Default)]
pub struct StateBranch {
    entries: BTreeMap<String, StateNode>,
}

impl StateBranch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, StateNode)>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&StateNode> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shallow copy with `changes` written over the existing keys.
    ///
    /// Children that are not part of `changes` keep their handles.
    pub fn with_changes<I>(&self, changes: I) -> StateBranch
    where
        I: IntoIterator<Item = (String, StateNode)>,
    {
        let mut entries = self.entries.clone();
        entries.extend(changes);
        StateBranch { entries }
    }
}

impl fmt::Debug for StateBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StateNode {
        StateNode::branch([
            ("foo", StateNode::branch([("bar", StateNode::leaf(5u32))])),
            ("name", StateNode::leaf("x".to_string())),
            ("empty", StateNode::Null),
        ])
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[test]
    fn get_and_path_lookup() {
        let state = sample();
        assert_eq!(
            state.get("name").and_then(|n| n.downcast_ref::<String>()),
            Some(&"x".to_string())
        );
        assert_eq!(
            state.at("foo/bar").and_then(|n| n.downcast_ref::<u32>()),
            Some(&5)
        );
        assert!(state.at("foo/missing").is_none());
        assert!(state.at("name/deeper").is_none());
        assert!(state.at("").unwrap().same(&state));
    }

    #[test]
    fn null_is_distinct_from_missing() {
        let state = sample();
        assert!(state.get("empty").unwrap().is_null());
        assert!(state.get("nothing").is_none());

        let branch = state.as_branch().unwrap();
        assert!(branch.contains_key("empty"));
        assert!(!branch.contains_key("nothing"));
    }

    #[test]
    fn branch_keys_are_ordered() {
        let state = sample();
        let keys: Vec<&str> = state.as_branch().unwrap().keys().collect();
        assert_eq!(keys, vec!["empty", "foo", "name"]);

        let leaves: Vec<&str> = state
            .as_branch()
            .unwrap()
            .iter()
            .filter(|(_, node)| node.as_leaf().is_some())
            .map(|(key, _)| key)
            .collect();
        assert_eq!(leaves, vec!["name"]);
    }

    // ========================================================================
    // Identity
    // ========================================================================

    #[test]
    fn clones_are_same() {
        let state = sample();
        let copy = state.clone();
        assert!(state.same(&copy));
        assert!(StateNode::Null.same(&StateNode::Null));
    }

    #[test]
    fn rebuilt_nodes_are_not_same() {
        assert!(!sample().same(&sample()));
        assert!(!StateNode::leaf(1u8).same(&StateNode::leaf(1u8)));
        assert!(!StateNode::Null.same(&StateNode::leaf(())));
    }

    #[test]
    fn with_changes_shares_untouched_children() {
        let state = sample();
        let branch = state.as_branch().unwrap();
        let next = branch.with_changes([("name".to_string(), StateNode::leaf("y".to_string()))]);

        assert!(next.get("foo").unwrap().same(branch.get("foo").unwrap()));
        assert!(!next.get("name").unwrap().same(branch.get("name").unwrap()));
        assert_eq!(next.len(), 3);
        // Input untouched.
        assert_eq!(
            branch.get("name").unwrap().downcast_ref::<String>(),
            Some(&"x".to_string())
        );
    }

    #[test]
    fn debug_format() {
        let debug = format!("{:?}", sample());
        assert!(debug.contains("\"foo\""));
        assert!(debug.contains("Null"));
    }
}
