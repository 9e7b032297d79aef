//! Fetch tracking with out-of-order response protection.
//!
//! A fetched slice remembers the id of the last request issued for it. A
//! completion is applied only when it carries that id, so a slow response
//! to a superseded request can never overwrite fresher data.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::{ActionType, StaticAction};
use crate::command::CommandReducer;
use crate::deep::DeepReducer;
use crate::node::StateNode;

/// Parent tag for events that begin a fetch.
pub const FETCH_REQUEST: ActionType = ActionType::new("fetch/request");

/// Parent tag for events that complete a fetch.
pub const FETCH_COMPLETE: ActionType = ActionType::new("fetch/complete");

/// Opaque id of one logical fetch, minted when the fetch begins and carried
/// unchanged to its completion. Only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Mint a new random id (UUIDv4, no dashes).
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State of a slice that is fetched asynchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedState<T> {
    pub is_loading: bool,
    pub last_request_id: Option<RequestId>,
    pub value: T,
}

impl<T> FetchedState<T> {
    /// Idle state holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            is_loading: false,
            last_request_id: None,
            value,
        }
    }
}

impl<T: Default> Default for FetchedState<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Mark `state` as loading on behalf of `request_id`.
///
/// Always yields a new record. A request already in flight is superseded:
/// its completion will no longer match.
pub fn fetch_reduce<T: Clone>(state: &FetchedState<T>, request_id: RequestId) -> FetchedState<T> {
    FetchedState {
        is_loading: true,
        last_request_id: Some(request_id),
        value: state.value.clone(),
    }
}

/// Apply a completed fetch if it belongs to the latest request.
///
/// Returns `None` when `request_id` is not the one `state` is waiting for
/// (superseded, already completed, or never issued); the caller keeps the
/// current state as is.
pub fn fetch_complete_reduce<T>(
    state: &FetchedState<T>,
    value: T,
    request_id: &RequestId,
) -> Option<FetchedState<T>> {
    if state.last_request_id.as_ref() != Some(request_id) {
        debug!(
            "fetch: dropping stale response {} (awaiting {:?})",
            request_id,
            state.last_request_id.as_ref().map(RequestId::as_str)
        );
        return None;
    }
    Some(FetchedState {
        is_loading: false,
        last_request_id: None,
        value,
    })
}

/// An event beginning a fetch.
///
/// Every instance carries the id minted for it, so a begin event can
/// never be applied without one.
pub trait FetchAction: StaticAction {
    fn fetch_request_id(&self) -> &RequestId;
}

/// An event completing a fetch, carrying the fetched value and the id of
/// the request it answers.
pub trait FetchCompleteAction: StaticAction {
    type Value: Clone + Send + Sync + 'static;

    fn fetch_request_id(&self) -> &RequestId;

    fn value(&self) -> &Self::Value;
}

/// Command reducer driving a `FetchedState<C::Value>` leaf from a begin
/// event `F` and a completion event `C`.
pub fn create_fetch_reducer<F, C>(default_state: FetchedState<C::Value>) -> CommandReducer
where
    F: FetchAction,
    C: FetchCompleteAction,
{
    CommandReducer::with_default(StateNode::leaf(default_state))
        .on_slice::<FetchedState<C::Value>, F, _>(|state, action| {
            Some(fetch_reduce(state, action.fetch_request_id().clone()))
        })
        .on_slice::<FetchedState<C::Value>, C, _>(|state, action| {
            fetch_complete_reduce(state, action.value().clone(), action.fetch_request_id())
        })
}

/// Builds [`DeepReducer`]s for fetched slices.
pub struct FetchReducer;

impl FetchReducer {
    /// A DeepReducer seeded with `default_state`, reacting to `F` and `C`.
    ///
    /// Further maps and commands can be chained onto the result.
    pub fn new<F, C>(default_state: FetchedState<C::Value>) -> DeepReducer
    where
        F: FetchAction,
        C: FetchCompleteAction,
    {
        DeepReducer::with_initial(StateNode::leaf(default_state.clone()))
            .add_reducer(create_fetch_reducer::<F, C>(default_state))
    }
}
