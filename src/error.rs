use thiserror::Error;

/// Errors raised while building reducers or applying serde-backed patches.
///
/// Dispatch itself never fails: stale completions, unmatched events and
/// commands that decline to change anything are all silent no-ops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// A reducer tree names a key the initial state does not have.
    #[error("unknown state key: {path}")]
    UnknownKey { path: String },

    /// A reducer tree branches below a value that is not a branch.
    #[error("state at '{path}' is not a branch")]
    NotABranch { path: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Serialization(err.to_string())
    }
}
