//! Paged, searchable list slices.
//!
//! One set of list commands serves any number of independent lists: every
//! command is bound to a list id when the reducer is built and ignores
//! events addressed to other lists.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use crate::action::{Action, ActionType, StaticAction};
use crate::command::CommandReducer;
use crate::deep::DeepReducer;
use crate::error::StateError;
use crate::fetched::{
    FETCH_COMPLETE, FETCH_REQUEST, FetchAction, FetchCompleteAction, FetchedState, RequestId,
    fetch_complete_reduce, fetch_reduce,
};
use crate::node::StateNode;
use crate::patch::apply_patch;

pub const MODIFY_LIST_SEARCH: ActionType = ActionType::new("lists/modify-search");
pub const LOAD_LIST: ActionType = ActionType::new("lists/load");
pub const LOAD_LIST_COMPLETE: ActionType = ActionType::new("lists/load-complete");
pub const SELECT_LIST_ITEMS: ActionType = ActionType::new("lists/select");

// ============================================================================
// State
// ============================================================================

/// Paging and ordering criteria of a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListSearch {
    pub page: usize,
    pub items_per_page: usize,
    pub order_by: Vec<String>,
}

fn default_items_per_page() -> usize {
    10
}

impl Default for ListSearch {
    fn default() -> Self {
        Self {
            page: 0,
            items_per_page: default_items_per_page(),
            order_by: Vec::new(),
        }
    }
}

/// [`ListSearch`] plus an optional fulltext term.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FulltextListSearch {
    #[serde(flatten)]
    pub search: ListSearch,
    pub fulltext: Option<String>,
}

/// Search criteria usable in a [`ListState`].
pub trait ListCriteria:
    Clone + Default + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<S> ListCriteria for S where
    S: Clone + Default + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// An element of a list.
pub trait ListItem: Clone + fmt::Debug + Send + Sync + 'static {
    type Id: PartialEq;

    /// Identity key used to carry a selection across refetches.
    ///
    /// Items without an id never stay selected after a refetch.
    fn item_id(&self) -> Option<&Self::Id>;
}

/// Untyped items: the `"id"` field, when present and truthy.
impl ListItem for Value {
    type Id = Value;

    fn item_id(&self) -> Option<&Value> {
        self.get("id").filter(|id| is_truthy(id))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// State of one list: fetched items plus selection and search criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListState<T, S = ListSearch> {
    pub id: String,
    #[serde(flatten)]
    pub fetched: FetchedState<Vec<T>>,
    pub search: S,
    pub total_count: usize,
    pub selected: Vec<T>,
}

impl<T, S: Default> ListState<T, S> {
    /// Empty, idle list with default search criteria.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fetched: FetchedState::new(Vec::new()),
            search: S::default(),
            total_count: 0,
            selected: Vec::new(),
        }
    }
}

impl<T, S> ListState<T, S> {
    pub fn items(&self) -> &[T] {
        &self.fetched.value
    }

    pub fn is_loading(&self) -> bool {
        self.fetched.is_loading
    }
}

/// Default state of a list with plain paging criteria.
pub fn default_list_state<T>(id: impl Into<String>) -> ListState<T, ListSearch> {
    ListState::new(id)
}

/// Default state of a list with fulltext criteria.
pub fn default_fulltext_list_state<T>(id: impl Into<String>) -> ListState<T, FulltextListSearch> {
    ListState::new(id)
}

// ============================================================================
// Events
// ============================================================================

/// Merge-patch the search criteria of a list (RFC 7386 over camelCase JSON).
#[derive(Debug, Clone)]
pub struct ModifyListSearch {
    pub list_id: String,
    pub patch: Value,
}

impl ModifyListSearch {
    pub fn new(list_id: impl Into<String>, patch: Value) -> Self {
        Self {
            list_id: list_id.into(),
            patch,
        }
    }
}

impl Action for ModifyListSearch {
    fn action_type(&self) -> ActionType {
        Self::TYPE
    }
}

impl StaticAction for ModifyListSearch {
    const TYPE: ActionType = MODIFY_LIST_SEARCH;
}

/// Begin loading a list. Mints a fresh request id.
///
/// `search` is the criteria the fetch was issued with, in the list's
/// camelCase JSON form, so one event type serves every search shape.
#[derive(Debug, Clone)]
pub struct LoadList {
    pub list_id: String,
    pub search: Value,
    pub request_id: RequestId,
}

impl LoadList {
    pub fn new(list_id: impl Into<String>, search: Value) -> Self {
        Self {
            list_id: list_id.into(),
            search,
            request_id: RequestId::new(),
        }
    }

    /// Load `state`'s list with its current search criteria.
    pub fn for_state<T, S: Serialize>(state: &ListState<T, S>) -> Result<Self, StateError> {
        Ok(Self::new(state.id.clone(), serde_json::to_value(&state.search)?))
    }
}

impl Action for LoadList {
    fn action_type(&self) -> ActionType {
        Self::TYPE
    }

    fn parent_types(&self) -> &'static [ActionType] {
        &[FETCH_REQUEST]
    }

    fn request_id(&self) -> Option<&RequestId> {
        Some(&self.request_id)
    }
}

impl StaticAction for LoadList {
    const TYPE: ActionType = LOAD_LIST;
}

impl FetchAction for LoadList {
    fn fetch_request_id(&self) -> &RequestId {
        &self.request_id
    }
}

/// A page of items arrived for the request `request_id`.
#[derive(Debug, Clone)]
pub struct LoadListComplete<T> {
    pub list_id: String,
    pub items: Vec<T>,
    pub total_count: usize,
    pub request_id: RequestId,
}

impl<T> LoadListComplete<T> {
    pub fn new(
        list_id: impl Into<String>,
        items: Vec<T>,
        total_count: usize,
        request_id: RequestId,
    ) -> Self {
        Self {
            list_id: list_id.into(),
            items,
            total_count,
            request_id,
        }
    }
}

impl<T: ListItem> Action for LoadListComplete<T> {
    fn action_type(&self) -> ActionType {
        Self::TYPE
    }

    fn parent_types(&self) -> &'static [ActionType] {
        &[FETCH_COMPLETE]
    }

    fn request_id(&self) -> Option<&RequestId> {
        Some(&self.request_id)
    }
}

impl<T: ListItem> StaticAction for LoadListComplete<T> {
    const TYPE: ActionType = LOAD_LIST_COMPLETE;
}

impl<T: ListItem> FetchCompleteAction for LoadListComplete<T> {
    type Value = Vec<T>;

    fn fetch_request_id(&self) -> &RequestId {
        &self.request_id
    }

    fn value(&self) -> &Vec<T> {
        &self.items
    }
}

/// Replace the selection of a list.
#[derive(Debug, Clone)]
pub struct SelectListItems<T> {
    pub list_id: String,
    pub selected: Vec<T>,
}

impl<T> SelectListItems<T> {
    pub fn new(list_id: impl Into<String>, selected: Vec<T>) -> Self {
        Self {
            list_id: list_id.into(),
            selected,
        }
    }
}

impl<T: ListItem> Action for SelectListItems<T> {
    fn action_type(&self) -> ActionType {
        Self::TYPE
    }
}

impl<T: ListItem> StaticAction for SelectListItems<T> {
    const TYPE: ActionType = SELECT_LIST_ITEMS;
}

// ============================================================================
// Reducers
// ============================================================================

fn modify_list_search<T, S>(
    list_id: String,
) -> impl Fn(&ListState<T, S>, &ModifyListSearch) -> Option<ListState<T, S>>
where
    T: Clone,
    S: ListCriteria,
{
    move |state, action| {
        if action.list_id != list_id {
            return None;
        }
        match apply_patch(&state.search, &action.patch) {
            Ok(search) => Some(ListState {
                search,
                ..state.clone()
            }),
            Err(err) => {
                warn!("ListReducer: ignoring search patch for '{}': {}", list_id, err);
                None
            }
        }
    }
}

fn load_list<T, S>(
    list_id: String,
) -> impl Fn(&ListState<T, S>, &LoadList) -> Option<ListState<T, S>>
where
    T: Clone,
    S: Clone,
{
    move |state, action| {
        if action.list_id != list_id {
            return None;
        }
        Some(ListState {
            fetched: fetch_reduce(&state.fetched, action.request_id.clone()),
            ..state.clone()
        })
    }
}

fn load_list_complete<T, S>(
    list_id: String,
) -> impl Fn(&ListState<T, S>, &LoadListComplete<T>) -> Option<ListState<T, S>>
where
    T: ListItem,
    S: Clone,
{
    move |state, action| {
        if action.list_id != list_id {
            return None;
        }
        let fetched =
            fetch_complete_reduce(&state.fetched, action.items.clone(), &action.request_id)?;
        let selected = reselect(&state.selected, &action.items);
        trace!(
            "ListReducer: '{}' loaded {} of {} items, {} still selected",
            list_id,
            action.items.len(),
            action.total_count,
            selected.len()
        );
        Some(ListState {
            id: state.id.clone(),
            fetched,
            search: state.search.clone(),
            total_count: action.total_count,
            selected,
        })
    }
}

fn select_list_items<T, S>(
    list_id: String,
) -> impl Fn(&ListState<T, S>, &SelectListItems<T>) -> Option<ListState<T, S>>
where
    T: ListItem,
    S: Clone,
{
    move |state, action| {
        if action.list_id != list_id {
            return None;
        }
        Some(ListState {
            selected: action.selected.clone(),
            ..state.clone()
        })
    }
}

/// Re-resolve a selection against freshly fetched items by id.
///
/// Selected items missing from `items` are dropped; the rest are replaced
/// by their fresh copies.
fn reselect<T: ListItem>(selected: &[T], items: &[T]) -> Vec<T> {
    selected
        .iter()
        .filter_map(|old| {
            let id = old.item_id()?;
            items.iter().find(|item| item.item_id() == Some(id)).cloned()
        })
        .collect()
}

/// Command reducer for the list `list_id`.
///
/// Handles [`ModifyListSearch`], [`LoadList`], [`LoadListComplete`] and
/// [`SelectListItems`]; events for other lists leave the state untouched.
pub fn create_list_reducer<T, S>(list_id: &str) -> CommandReducer
where
    T: ListItem,
    S: ListCriteria,
{
    let id = || list_id.to_string();
    CommandReducer::with_default(StateNode::leaf(ListState::<T, S>::new(list_id)))
        .on_slice::<ListState<T, S>, ModifyListSearch, _>(modify_list_search::<T, S>(id()))
        .on_slice::<ListState<T, S>, LoadList, _>(load_list::<T, S>(id()))
        .on_slice::<ListState<T, S>, LoadListComplete<T>, _>(load_list_complete::<T, S>(id()))
        .on_slice::<ListState<T, S>, SelectListItems<T>, _>(select_list_items::<T, S>(id()))
}

/// Builds [`DeepReducer`]s for list slices.
pub struct ListReducer;

impl ListReducer {
    /// List with [`ListSearch`] criteria.
    pub fn simple<T: ListItem>(list_id: &str) -> DeepReducer {
        Self::with_state::<T, ListSearch>(list_id, default_list_state(list_id))
    }

    /// List with [`FulltextListSearch`] criteria.
    pub fn fulltext<T: ListItem>(list_id: &str) -> DeepReducer {
        Self::with_state::<T, FulltextListSearch>(list_id, default_fulltext_list_state(list_id))
    }

    /// List bound to `list_id`, starting from `default_state`.
    ///
    /// Further maps and commands can be chained onto the result.
    pub fn with_state<T, S>(list_id: &str, default_state: ListState<T, S>) -> DeepReducer
    where
        T: ListItem,
        S: ListCriteria,
    {
        DeepReducer::with_initial(StateNode::leaf(default_state))
            .add_reducer(create_list_reducer::<T, S>(list_id))
    }
}
