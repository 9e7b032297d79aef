//! Navigation-state projection.
//!
//! Flattens a route snapshot tree into the compact record kept in
//! application state: the url plus parameters, query parameters and
//! route data merged along the active branch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the outlet followed when a route has several children.
pub const PRIMARY_OUTLET: &str = "primary";

pub type Params = BTreeMap<String, String>;

/// One activated route and its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteSnapshot {
    pub outlet: String,
    pub params: Params,
    pub query_params: Params,
    pub data: Map<String, Value>,
    pub children: Vec<RouteSnapshot>,
}

impl RouteSnapshot {
    /// The child on the primary outlet, else the first child.
    pub fn active_child(&self) -> Option<&RouteSnapshot> {
        self.children
            .iter()
            .find(|child| child.outlet == PRIMARY_OUTLET)
            .or_else(|| self.children.first())
    }
}

/// Router state at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterSnapshot {
    pub url: String,
    pub root: RouteSnapshot,
}

/// The projected record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterStateUrl {
    pub url: String,
    pub params: Params,
    pub query_params: Params,
    pub data: Map<String, Value>,
}

pub trait RouterStateSerializer {
    type Output;

    fn serialize(&self, snapshot: &RouterSnapshot) -> Self::Output;
}

/// Projects a [`RouterSnapshot`] into a [`RouterStateUrl`].
///
/// Values are merged from the root down the active branch; on a key
/// collision the deeper route wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlSerializer;

impl RouterStateSerializer for UrlSerializer {
    type Output = RouterStateUrl;

    fn serialize(&self, snapshot: &RouterSnapshot) -> RouterStateUrl {
        let mut state = RouterStateUrl {
            url: snapshot.url.clone(),
            ..RouterStateUrl::default()
        };
        for route in active_branch(&snapshot.root) {
            state.params.extend(route.params.clone());
            state.query_params.extend(route.query_params.clone());
            state.data.extend(route.data.clone());
        }
        state
    }
}

fn active_branch(root: &RouteSnapshot) -> impl Iterator<Item = &RouteSnapshot> {
    std::iter::successors(Some(root), |route| route.active_child())
}
