//! Reducer: composable reducers over tree-shaped state.
//!
//! State is an immutable tree of `Arc` handles. Reducers are pure functions
//! `(state, event) -> state` and are composed into a tree that mirrors the
//! state's shape. Unchanged subtrees keep their identity, so observers can
//! detect changes with a pointer comparison.
//!
//! # Building Blocks
//!
//! - `DeepReducer`: builder whose call order is execution order:
//!   `add_map` (per-key sub-reducers), `add_reducer`, `add_command`
//! - `CommandReducer`: dispatch on the event's type tag
//! - `fetch_reduce` / `fetch_complete_reduce`: drop responses to
//!   superseded requests
//! - `ListReducer`: paged, searchable, selectable lists bound to a list id
//! - `UrlSerializer`: flatten router snapshots into application state
//!
//! # State Addressing
//!
//! Nodes are addressed by `/`-separated key paths:
//! - Slice: `users`
//! - Nested: `users/list/search`
//!
//! # Example
//!
//! ```ignore
//! use openerp_reducer::{DeepReducer, ListReducer, ReducerMap, StateNode};
//!
//! let reducer = DeepReducer::with_initial(StateNode::branch([
//!     ("users", StateNode::leaf(default_list_state::<User>("users"))),
//! ]))
//! .add_map(ReducerMap::new().slice("users", ListReducer::simple::<User>("users")))
//! .add_slice_command::<Session, Logout, _>(|_, _| Some(Session::anonymous()))
//! .reducer();
//!
//! let state = reducer(None, &LoadList::new("users", json!({})));
//! ```

pub mod action;
pub mod command;
pub mod deep;
pub mod error;
pub mod fetched;
pub mod list;
pub mod node;
pub mod patch;
pub mod router_state;
pub mod value;

// Re-export primary types at crate root.
pub use action::{Action, ActionType, StaticAction};
pub use command::CommandReducer;
pub use deep::{DeepReducer, Reducer, ReducerMap, ReducerTree, compose, reducer_fn, try_compose};
pub use error::StateError;
pub use fetched::{
    FETCH_COMPLETE, FETCH_REQUEST, FetchAction, FetchCompleteAction, FetchReducer, FetchedState,
    RequestId, create_fetch_reducer, fetch_complete_reduce, fetch_reduce,
};
pub use list::{
    FulltextListSearch, ListItem, ListReducer, ListSearch, ListState, LoadList, LoadListComplete,
    ModifyListSearch, SelectListItems, create_list_reducer, default_fulltext_list_state,
    default_list_state,
};
pub use node::{StateBranch, StateNode};
pub use patch::{apply_patch, merge_patch};
pub use router_state::{
    RouteSnapshot, RouterSnapshot, RouterStateSerializer, RouterStateUrl, UrlSerializer,
};
pub use value::StateValue;
