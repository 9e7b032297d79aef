use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::action::{Action, StaticAction};
use crate::command::{CommandReducer, slice_command, typed_command};
use crate::error::StateError;
use crate::node::{StateBranch, StateNode};

/// A composed reducer: `(state, event) -> next state`.
///
/// `None` as input means "no state yet"; reducers substitute their initial
/// state for it. The output is the same handle as the input whenever
/// nothing changed.
pub type Reducer = Arc<dyn Fn(Option<StateNode>, &dyn Action) -> StateNode + Send + Sync>;

/// Wrap a closure as a [`Reducer`].
pub fn reducer_fn<F>(f: F) -> Reducer
where
    F: Fn(Option<StateNode>, &dyn Action) -> StateNode + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A (possibly sparse) tree of reducers mirroring the state's shape.
#[derive(Clone)]
pub enum ReducerTree {
    /// Leaves the slice untouched.
    Pass,
    /// One reducer for the whole slice.
    Reducer(Reducer),
    /// Reducers applied left to right, each receiving the previous output.
    Sequence(Vec<ReducerTree>),
    /// Per-key subtrees. Keys not listed are never visited.
    Branch(Vec<(String, ReducerTree)>),
}

impl ReducerTree {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Option<StateNode>, &dyn Action) -> StateNode + Send + Sync + 'static,
    {
        ReducerTree::Reducer(Arc::new(f))
    }

    pub fn sequence<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ReducerTree>,
    {
        ReducerTree::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Debug for ReducerTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReducerTree::Pass => f.write_str("Pass"),
            ReducerTree::Reducer(_) => f.write_str("Reducer"),
            ReducerTree::Sequence(items) => f.debug_list().entries(items).finish(),
            ReducerTree::Branch(slices) => f
                .debug_map()
                .entries(slices.iter().map(|(k, v)| (k, v)))
                .finish(),
        }
    }
}

impl From<Reducer> for ReducerTree {
    fn from(reducer: Reducer) -> Self {
        ReducerTree::Reducer(reducer)
    }
}

impl From<CommandReducer> for ReducerTree {
    fn from(commands: CommandReducer) -> Self {
        ReducerTree::Reducer(commands.reducer())
    }
}

impl From<DeepReducer> for ReducerTree {
    fn from(deep: DeepReducer) -> Self {
        ReducerTree::Reducer(deep.reducer())
    }
}

impl From<ReducerMap> for ReducerTree {
    fn from(map: ReducerMap) -> Self {
        ReducerTree::Branch(map.slices)
    }
}

impl<T: Into<ReducerTree>> From<Vec<T>> for ReducerTree {
    fn from(items: Vec<T>) -> Self {
        ReducerTree::sequence(items)
    }
}

/// Builder for [`ReducerTree::Branch`].
///
/// ```ignore
/// let map = ReducerMap::new()
///     .slice("foo", ReducerMap::new().slice("bar", vec![bar_reduce1, bar_reduce2]))
///     .slice("lorem", vec![
///         ReducerTree::from(ReducerMap::new().slice("form", form_reduce)),
///         ReducerTree::from(lorem_reduce),
///     ]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ReducerMap {
    slices: Vec<(String, ReducerTree)>,
}

impl ReducerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subtree for `key`. Setting a key twice replaces the first.
    pub fn slice(mut self, key: impl Into<String>, tree: impl Into<ReducerTree>) -> Self {
        let key = key.into();
        let tree = tree.into();
        match self.slices.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = tree,
            None => self.slices.push((key, tree)),
        }
        self
    }
}

// ============================================================================
// Composition
// ============================================================================

/// Compose a reducer tree into a single reducer.
///
/// `initial` is substituted whenever the reducer is called without a state.
/// Each branch child gets `initial[key]` as its own initial state, or
/// `Null` when `initial` is absent or null.
///
/// Branch reducers return the incoming handle when no child changed; when
/// some did, they return one new branch sharing every unchanged child.
///
/// Composition is permissive about keys the state lacks: the child sees no
/// state, substitutes its initial state, and the result is inserted. Use
/// [`try_compose`] to reject such trees up front.
pub fn compose(tree: &ReducerTree, initial: Option<StateNode>) -> Reducer {
    match tree {
        ReducerTree::Pass => {
            reducer_fn(move |state, _| state.or_else(|| initial.clone()).unwrap_or_default())
        }
        ReducerTree::Reducer(reducer) => {
            let reducer = Arc::clone(reducer);
            reducer_fn(move |state, action| reducer(state.or_else(|| initial.clone()), action))
        }
        ReducerTree::Sequence(items) => compose_sequence(items, initial),
        ReducerTree::Branch(slices) => compose_branch(slices, initial),
    }
}

/// Like [`compose`], but first checks that every branch key in `tree`
/// exists in `initial`.
///
/// Subtrees below an absent or null initial state are not checked.
pub fn try_compose(tree: &ReducerTree, initial: Option<StateNode>) -> Result<Reducer, StateError> {
    validate(tree, initial.as_ref(), "")?;
    Ok(compose(tree, initial))
}

fn compose_sequence(items: &[ReducerTree], initial: Option<StateNode>) -> Reducer {
    let reducers: Vec<Reducer> = items
        .iter()
        .map(|item| compose(item, initial.clone()))
        .collect();

    reducer_fn(move |state, action| {
        let mut state = state.or_else(|| initial.clone());
        for reducer in &reducers {
            state = Some(reducer(state, action));
        }
        state.unwrap_or_default()
    })
}

fn compose_branch(slices: &[(String, ReducerTree)], initial: Option<StateNode>) -> Reducer {
    let children: Vec<(String, Reducer)> = slices
        .iter()
        .map(|(key, tree)| {
            let child_initial = child_initial(initial.as_ref(), key);
            (key.clone(), compose(tree, child_initial))
        })
        .collect();

    reducer_fn(move |state, action| {
        let state = state.or_else(|| initial.clone()).unwrap_or_default();
        let branch: Option<&StateBranch> = match &state {
            StateNode::Branch(branch) => Some(branch.as_ref()),
            // Null reads as an empty branch.
            StateNode::Null => None,
            StateNode::Leaf(value) => {
                warn!(
                    "compose: expected a branch, found {} leaf; passing it through",
                    value.type_name()
                );
                return state;
            }
        };

        let mut changes = Vec::new();
        for (key, child) in &children {
            let previous = branch.and_then(|b| b.get(key));
            let next = child(previous.cloned(), action);
            match previous {
                Some(previous) if previous.same(&next) => {}
                Some(_) => changes.push((key.clone(), next)),
                None => {
                    trace!("compose: materializing missing key '{}'", key);
                    changes.push((key.clone(), next));
                }
            }
        }

        if changes.is_empty() {
            return state;
        }
        let next = match branch {
            Some(branch) => branch.with_changes(changes),
            None => StateBranch::from_entries(changes),
        };
        StateNode::Branch(Arc::new(next))
    })
}

fn child_initial(initial: Option<&StateNode>, key: &str) -> Option<StateNode> {
    match initial {
        None | Some(StateNode::Null) => Some(StateNode::Null),
        Some(node) => node.get(key).cloned(),
    }
}

fn validate(tree: &ReducerTree, state: Option<&StateNode>, path: &str) -> Result<(), StateError> {
    match tree {
        ReducerTree::Pass | ReducerTree::Reducer(_) => Ok(()),
        ReducerTree::Sequence(items) => items
            .iter()
            .try_for_each(|item| validate(item, state, path)),
        ReducerTree::Branch(slices) => {
            let node = match state {
                None | Some(StateNode::Null) => return Ok(()),
                Some(node) => node,
            };
            let Some(branch) = node.as_branch() else {
                return Err(StateError::NotABranch {
                    path: if path.is_empty() { "/".into() } else { path.into() },
                });
            };
            for (key, subtree) in slices {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}/{}", path, key)
                };
                let Some(child) = branch.get(key) else {
                    return Err(StateError::UnknownKey { path: child_path });
                };
                validate(subtree, Some(child), &child_path)?;
            }
            Ok(())
        }
    }
}

// ============================================================================
// DeepReducer
// ============================================================================

/// A combined reducer for complex state structures.
///
/// Similar to a flat "combine reducers", except that it slices state along
/// the full depth of the registered maps, supports several reducers per
/// slice, lets maps omit slices, and accepts command-style registrations.
///
/// `add_map` / `add_reducer` / `add_command` run in the order they were
/// called. Consecutive `add_command*` calls share one [`CommandReducer`].
///
/// ```ignore
/// let reducer = DeepReducer::with_initial(initial)
///     .add_map(ReducerMap::new().slice("foo", ReducerMap::new().slice("bar", bar_reduce)))
///     .add_command::<Reset, _>(|_, _| Some(initial.clone()))
///     .reducer();
/// ```
#[derive(Clone, Default)]
pub struct DeepReducer {
    steps: Vec<ReducerTree>,
    pending: Option<CommandReducer>,
    initial_state: Option<StateNode>,
}

impl DeepReducer {
    /// Create a DeepReducer without an initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a DeepReducer that substitutes `initial_state` when
    /// dispatched without a state.
    pub fn with_initial(initial_state: StateNode) -> Self {
        Self {
            initial_state: Some(initial_state),
            ..Self::default()
        }
    }

    pub fn initial_state(&self) -> Option<&StateNode> {
        self.initial_state.as_ref()
    }

    /// Add a reducer map (see [`ReducerMap`]).
    pub fn add_map(mut self, map: impl Into<ReducerTree>) -> Self {
        self.close_commands();
        self.steps.push(map.into());
        self
    }

    /// Add a reducer run against the entire state graph.
    pub fn add_reducer(mut self, reducer: impl Into<ReducerTree>) -> Self {
        self.close_commands();
        self.steps.push(reducer.into());
        self
    }

    /// Add a command for a concrete event type, run against the entire
    /// state graph.
    pub fn add_command<A, F>(mut self, command: F) -> Self
    where
        A: StaticAction,
        F: Fn(&StateNode, &A) -> Option<StateNode> + Send + Sync + 'static,
    {
        self.commands().push(A::TYPE, typed_command::<A, F>(command));
        self
    }

    /// Add a command for a concrete event type when the state is a `T` leaf.
    pub fn add_slice_command<T, A, F>(mut self, command: F) -> Self
    where
        T: Any + Send + Sync,
        A: StaticAction,
        F: Fn(&T, &A) -> Option<T> + Send + Sync + 'static,
    {
        self.commands().push(A::TYPE, slice_command::<T, A, F>(command));
        self
    }

    /// Get the combined reducer function.
    pub fn reducer(&self) -> Reducer {
        let tree = self.tree();
        debug!("DeepReducer: composing {:?}", tree);
        compose(&tree, self.initial_state.clone())
    }

    /// Get the combined reducer, rejecting maps whose keys are missing
    /// from the initial state.
    pub fn try_reducer(&self) -> Result<Reducer, StateError> {
        try_compose(&self.tree(), self.initial_state.clone())
    }

    fn tree(&self) -> ReducerTree {
        let mut steps = self.steps.clone();
        if let Some(commands) = &self.pending {
            steps.push(commands.clone().into());
        }
        ReducerTree::Sequence(steps)
    }

    fn commands(&mut self) -> &mut CommandReducer {
        let initial = &self.initial_state;
        self.pending
            .get_or_insert_with(|| CommandReducer::with_optional_default(initial.clone()))
    }

    fn close_commands(&mut self) {
        if let Some(commands) = self.pending.take() {
            self.steps.push(commands.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::tests::{Derived, Ping};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Adds `n` to a `u32` leaf on `Ping`, leaves anything else alone.
    fn add(n: u32) -> Reducer {
        reducer_fn(move |state, action| {
            let state = state.unwrap_or_default();
            match (state.downcast_ref::<u32>(), action.downcast_ref::<Ping>()) {
                (Some(value), Some(_)) => StateNode::leaf(value + n),
                _ => state,
            }
        })
    }

    /// Multiplies a `u32` leaf by `n` on `Ping`.
    fn mul(n: u32) -> Reducer {
        reducer_fn(move |state, action| {
            let state = state.unwrap_or_default();
            match (state.downcast_ref::<u32>(), action.downcast_ref::<Ping>()) {
                (Some(value), Some(_)) => StateNode::leaf(value * n),
                _ => state,
            }
        })
    }

    fn value_at(state: &StateNode, path: &str) -> Option<u32> {
        state.at(path).and_then(|n| n.downcast_ref::<u32>()).copied()
    }

    fn sample_state() -> StateNode {
        StateNode::branch([
            (
                "a",
                StateNode::branch([
                    ("b", StateNode::branch([("c", StateNode::leaf(1u32))])),
                    ("d", StateNode::branch([("e", StateNode::leaf(2u32))])),
                ]),
            ),
            ("f", StateNode::branch([("g", StateNode::leaf(3u32))])),
            ("untouched", StateNode::leaf("keep".to_string())),
        ])
    }

    // ========================================================================
    // Identity preservation
    // ========================================================================

    #[test]
    fn unchanged_state_keeps_identity() {
        let tree: ReducerTree = ReducerMap::new()
            .slice("a", ReducerMap::new().slice("b", ReducerMap::new().slice("c", add(1))))
            .slice("f", ReducerMap::new().slice("g", vec![add(1), add(2)]))
            .into();
        let reducer = compose(&tree, None);

        let state = sample_state();
        // Derived is not a Ping: nothing changes anywhere.
        let next = reducer(Some(state.clone()), &Derived);
        assert!(next.same(&state));
    }

    #[test]
    fn empty_map_is_identity() {
        let reducer = compose(&ReducerMap::new().into(), None);
        let state = sample_state();
        assert!(reducer(Some(state.clone()), &Ping(1)).same(&state));
    }

    // ========================================================================
    // Minimal reallocation
    // ========================================================================

    #[test]
    fn only_branches_on_changed_path_are_reallocated() {
        let tree: ReducerTree = ReducerMap::new()
            .slice("a", ReducerMap::new().slice("b", ReducerMap::new().slice("c", add(10))))
            .into();
        let reducer = compose(&tree, None);

        let state = sample_state();
        let next = reducer(Some(state.clone()), &Ping(0));

        assert!(!next.same(&state));
        assert!(!next.at("a").unwrap().same(state.at("a").unwrap()));
        assert!(!next.at("a/b").unwrap().same(state.at("a/b").unwrap()));
        // Siblings keep identity.
        assert!(next.at("a/d").unwrap().same(state.at("a/d").unwrap()));
        assert!(next.at("f").unwrap().same(state.at("f").unwrap()));
        assert!(next.at("untouched").unwrap().same(state.at("untouched").unwrap()));

        assert_eq!(value_at(&next, "a/b/c"), Some(11));
        // Input untouched.
        assert_eq!(value_at(&state, "a/b/c"), Some(1));
    }

    #[test]
    fn keys_absent_from_tree_are_copied_through() {
        let tree: ReducerTree = ReducerMap::new()
            .slice("f", ReducerMap::new().slice("g", add(1)))
            .into();
        let next = compose(&tree, None)(Some(sample_state()), &Ping(0));

        let keys: Vec<&str> = next.as_branch().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "f", "untouched"]);
        assert_eq!(value_at(&next, "f/g"), Some(4));
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    #[test]
    fn sequence_threads_state_in_order() {
        let tree: ReducerTree = ReducerMap::new()
            .slice("f", ReducerMap::new().slice("g", vec![add(1), mul(10)]))
            .into();
        let next = compose(&tree, None)(Some(sample_state()), &Ping(0));
        // (3 + 1) * 10, never 3 * 10 + 1.
        assert_eq!(value_at(&next, "f/g"), Some(40));
    }

    #[test]
    fn sequence_mixes_maps_and_whole_slice_reducers() {
        let calls = Arc::new(AtomicU64::new(0));
        let c = calls.clone();
        let observer = reducer_fn(move |state, _| {
            let state = state.unwrap_or_default();
            // Sees the output of the map that ran before it.
            if value_at(&state, "g") == Some(4) {
                c.fetch_add(1, Ordering::Relaxed);
            }
            state
        });

        let tree: ReducerTree = ReducerMap::new()
            .slice(
                "f",
                vec![
                    ReducerTree::from(ReducerMap::new().slice("g", add(1))),
                    ReducerTree::from(observer),
                ],
            )
            .into();
        compose(&tree, None)(Some(sample_state()), &Ping(0));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn closure_and_pass_nodes_in_a_sequence() {
        let tree: ReducerTree = ReducerMap::new()
            .slice(
                "f",
                ReducerMap::new().slice(
                    "g",
                    ReducerTree::sequence([
                        ReducerTree::Pass,
                        ReducerTree::from_fn(|state, _| {
                            let n = state.as_ref().and_then(|s| s.downcast_ref::<u32>()).copied();
                            StateNode::leaf(n.unwrap_or(0) + 100)
                        }),
                        ReducerTree::Pass,
                    ]),
                ),
            )
            .into();
        let next = compose(&tree, None)(Some(sample_state()), &Derived);
        assert_eq!(value_at(&next, "f/g"), Some(103));
    }

    // ========================================================================
    // Initial state
    // ========================================================================

    #[test]
    fn absent_state_uses_initial() {
        let initial = StateNode::branch([("count", StateNode::leaf(5u32))]);
        let tree: ReducerTree = ReducerMap::new().slice("count", add(1)).into();
        let reducer = compose(&tree, Some(initial.clone()));

        let next = reducer(None, &Ping(0));
        assert_eq!(value_at(&next, "count"), Some(6));

        // Unchanged dispatch against no state returns the initial handle.
        let next = reducer(None, &Derived);
        assert!(next.same(&initial));
    }

    #[test]
    fn missing_key_takes_child_initial_and_is_materialized() {
        let initial = StateNode::branch([("count", StateNode::leaf(5u32))]);
        let tree: ReducerTree = ReducerMap::new().slice("count", add(1)).into();
        let reducer = compose(&tree, Some(initial));

        // State lacks "count": the child falls back to initial["count"].
        let state = StateNode::branch([("other", StateNode::Null)]);
        let next = reducer(Some(state.clone()), &Derived);
        assert!(!next.same(&state));
        assert_eq!(value_at(&next, "count"), Some(5));

        // Once materialized, unchanged dispatches keep identity.
        let again = reducer(Some(next.clone()), &Derived);
        assert!(again.same(&next));
    }

    #[test]
    fn child_initial_defaults_to_null() {
        let tree: ReducerTree = ReducerMap::new()
            .slice("x", ReducerMap::new().slice("y", ReducerTree::Pass))
            .into();
        let next = compose(&tree, None)(None, &Ping(0));

        // Null root reads as an empty branch; "x" is null (not an empty
        // branch), so it is materialized as a branch holding a null "y".
        assert!(next.at("x/y").unwrap().is_null());
    }

    #[test]
    fn leaf_at_branch_position_passes_through() {
        let tree: ReducerTree = ReducerMap::new().slice("a", add(1)).into();
        let state = StateNode::leaf(9u32);
        let next = compose(&tree, None)(Some(state.clone()), &Ping(0));
        assert!(next.same(&state));
    }

    // ========================================================================
    // Strict composition
    // ========================================================================

    #[test]
    fn try_compose_accepts_matching_tree() {
        let tree: ReducerTree = ReducerMap::new()
            .slice("a", ReducerMap::new().slice("d", ReducerMap::new().slice("e", add(1))))
            .into();
        let reducer = try_compose(&tree, Some(sample_state())).unwrap();
        let next = reducer(None, &Ping(0));
        assert_eq!(value_at(&next, "a/d/e"), Some(3));
    }

    #[test]
    fn try_compose_reports_unknown_key_path() {
        let tree: ReducerTree = ReducerMap::new()
            .slice("a", ReducerMap::new().slice("zz", add(1)))
            .into();
        let err = try_compose(&tree, Some(sample_state())).err().unwrap();
        assert_eq!(err, StateError::UnknownKey { path: "a/zz".into() });
    }

    #[test]
    fn try_compose_reports_leaf_used_as_branch() {
        let tree: ReducerTree = ReducerMap::new()
            .slice("untouched", ReducerMap::new().slice("x", add(1)))
            .into();
        let err = try_compose(&tree, Some(sample_state())).err().unwrap();
        assert_eq!(err, StateError::NotABranch { path: "untouched".into() });
    }

    #[test]
    fn try_compose_skips_null_initial() {
        let tree: ReducerTree = ReducerMap::new().slice("anything", add(1)).into();
        assert!(try_compose(&tree, None).is_ok());
        assert!(try_compose(&tree, Some(StateNode::Null)).is_ok());
    }

    // ========================================================================
    // DeepReducer
    // ========================================================================

    #[test]
    fn deep_reducer_runs_steps_in_call_order() {
        let initial = StateNode::branch([("n", StateNode::leaf(1u32))]);
        let reducer = DeepReducer::with_initial(initial)
            .add_map(ReducerMap::new().slice("n", add(1)))
            .add_command::<Ping, _>(|state, ping| {
                let n = state.get("n")?.downcast_ref::<u32>()?;
                Some(StateNode::branch([("n", StateNode::leaf(n * 10 + ping.0))]))
            })
            .add_map(ReducerMap::new().slice("n", add(3)))
            .reducer();

        // ((1 + 1) * 10 + 5) + 3
        let next = reducer(None, &Ping(5));
        assert_eq!(value_at(&next, "n"), Some(28));
    }

    #[test]
    fn consecutive_commands_share_one_command_reducer() {
        let reducer = DeepReducer::new()
            .add_command::<Ping, _>(|_, _| None)
            .add_command::<Ping, _>(|_, _| None);
        assert_eq!(reducer.steps.len(), 0);
        assert_eq!(reducer.pending.as_ref().map(CommandReducer::len), Some(2));

        let reducer = reducer
            .add_reducer(add(1))
            .add_command::<Ping, _>(|_, _| None);
        assert_eq!(reducer.steps.len(), 2);
        assert_eq!(reducer.pending.as_ref().map(CommandReducer::len), Some(1));
    }

    #[test]
    fn commands_default_to_deep_initial_state() {
        let reducer = DeepReducer::with_initial(StateNode::leaf(7u32))
            .add_slice_command::<u32, Ping, _>(|n, ping| Some(n + ping.0))
            .reducer();
        let next = reducer(None, &Ping(1));
        assert_eq!(next.downcast_ref::<u32>(), Some(&8));
    }

    #[test]
    fn nested_deep_reducer_uses_own_initial_for_missing_key() {
        let inner = DeepReducer::with_initial(StateNode::leaf(100u32)).add_reducer(add(1));
        let outer = DeepReducer::with_initial(StateNode::branch([("other", StateNode::Null)]))
            .add_map(ReducerMap::new().slice("inner", inner))
            .reducer();

        // initial["inner"] is missing, so the nested reducer sees no state.
        let next = outer(None, &Ping(0));
        assert_eq!(value_at(&next, "inner"), Some(101));
    }

    #[test]
    fn null_parent_initial_overrides_nested_initial() {
        let inner = DeepReducer::with_initial(StateNode::leaf(100u32)).add_reducer(add(1));
        let outer = DeepReducer::new()
            .add_map(ReducerMap::new().slice("inner", inner))
            .reducer();

        // Without a parent initial the child's initial is null, not absent.
        let next = outer(None, &Ping(0));
        assert!(next.at("inner").unwrap().is_null());
    }

    #[test]
    fn try_reducer_validates_maps() {
        let initial = StateNode::branch([("n", StateNode::leaf(1u32))]);
        let deep = DeepReducer::with_initial(initial).add_map(ReducerMap::new().slice("m", add(1)));
        assert!(matches!(
            deep.try_reducer(),
            Err(StateError::UnknownKey { .. })
        ));
    }

    #[test]
    fn reducer_map_replaces_duplicate_key() {
        let map = ReducerMap::new().slice("k", add(1)).slice("k", add(2));
        let tree: ReducerTree = map.into();
        let state = StateNode::branch([("k", StateNode::leaf(0u32))]);
        let next = compose(&tree, None)(Some(state), &Ping(0));
        assert_eq!(value_at(&next, "k"), Some(2));
    }
}
