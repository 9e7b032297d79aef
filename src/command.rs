use std::any::Any;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::action::{Action, ActionType, StaticAction};
use crate::deep::{Reducer, reducer_fn};
use crate::node::StateNode;

/// Type-erased command stored in a [`CommandReducer`].
///
/// Returns `None` to leave the state untouched for this event instance.
type Command = Arc<dyn Fn(&StateNode, &dyn Action) -> Option<StateNode> + Send + Sync>;

#[derive(Clone)]
struct CommandEntry {
    action_type: ActionType,
    command: Command,
}

/// A command-style reducer: maps event type tags to reducer functions.
///
/// Entries run in registration order. Every entry whose tag matches the
/// event (its own tag or one of its parent tags) fires, and each sees the
/// state produced by the previous one. Entries that don't match are never
/// invoked.
///
/// # Examples
///
/// ```ignore
/// let reducer = CommandReducer::with_default(StateNode::leaf(0u32))
///     .on_slice::<u32, Increment, _>(|count, _| Some(count + 1))
///     .on_slice::<u32, Reset, _>(|_, _| Some(0))
///     .reducer();
/// ```
#[derive(Clone, Default)]
pub struct CommandReducer {
    entries: Vec<CommandEntry>,
    default_state: Option<StateNode>,
}

impl CommandReducer {
    /// Create an empty command reducer without a default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty command reducer that substitutes `default_state`
    /// when dispatched without a state.
    pub fn with_default(default_state: StateNode) -> Self {
        Self {
            entries: Vec::new(),
            default_state: Some(default_state),
        }
    }

    pub(crate) fn with_optional_default(default_state: Option<StateNode>) -> Self {
        Self {
            entries: Vec::new(),
            default_state,
        }
    }

    /// Register a command for a tag, receiving the event untyped.
    ///
    /// Use this for parent tags shared by several event types.
    pub fn add<F>(mut self, action_type: ActionType, command: F) -> Self
    where
        F: Fn(&StateNode, &dyn Action) -> Option<StateNode> + Send + Sync + 'static,
    {
        self.push(action_type, command_fn(command));
        self
    }

    /// Register a command for a concrete event type.
    pub fn on<A, F>(mut self, command: F) -> Self
    where
        A: StaticAction,
        F: Fn(&StateNode, &A) -> Option<StateNode> + Send + Sync + 'static,
    {
        self.push(A::TYPE, typed_command::<A, F>(command));
        self
    }

    /// Register a command for a concrete event type over a typed leaf.
    ///
    /// The command is skipped when the current state is not a `T` leaf.
    pub fn on_slice<T, A, F>(mut self, command: F) -> Self
    where
        T: Any + Send + Sync,
        A: StaticAction,
        F: Fn(&T, &A) -> Option<T> + Send + Sync + 'static,
    {
        self.push(A::TYPE, slice_command::<T, A, F>(command));
        self
    }

    pub(crate) fn push(&mut self, action_type: ActionType, command: Command) {
        self.entries.push(CommandEntry {
            action_type,
            command,
        });
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run all matching commands against `state`.
    pub fn dispatch(&self, state: Option<StateNode>, action: &dyn Action) -> StateNode {
        let state = state
            .or_else(|| self.default_state.clone())
            .unwrap_or_default();

        self.entries
            .iter()
            .filter(|entry| action.is(entry.action_type))
            .fold(state, |current, entry| {
                (entry.command)(&current, action).unwrap_or(current)
            })
    }

    /// Get the reducer function.
    pub fn reducer(self) -> Reducer {
        let this = Arc::new(self);
        reducer_fn(move |state, action| this.dispatch(state, action))
    }
}

pub(crate) fn typed_command<A, F>(command: F) -> Command
where
    A: StaticAction,
    F: Fn(&StateNode, &A) -> Option<StateNode> + Send + Sync + 'static,
{
    command_fn(move |state, action| {
        let Some(typed) = action.downcast_ref::<A>() else {
            debug!(
                "CommandReducer: {} matched {:?}, which is not a {}; skipping",
                A::TYPE,
                action,
                std::any::type_name::<A>()
            );
            return None;
        };
        command(state, typed)
    })
}

fn command_fn<F>(command: F) -> Command
where
    F: Fn(&StateNode, &dyn Action) -> Option<StateNode> + Send + Sync + 'static,
{
    Arc::new(command)
}

pub(crate) fn slice_command<T, A, F>(command: F) -> Command
where
    T: Any + Send + Sync,
    A: StaticAction,
    F: Fn(&T, &A) -> Option<T> + Send + Sync + 'static,
{
    typed_command::<A, _>(move |state: &StateNode, action: &A| {
        let Some(current) = state.downcast_ref::<T>() else {
            warn!(
                "CommandReducer: {} expects a {} slice, found {}",
                A::TYPE,
                std::any::type_name::<T>(),
                state.kind()
            );
            return None;
        };
        command(current, action).map(StateNode::leaf)
    })
}
