use std::any::Any;
use std::fmt;

use crate::fetched::RequestId;

/// Stable, machine-readable event type tag.
///
/// Tags are plain path-like strings (`"lists/load"`). Reducers match on the
/// tag, never on Rust type identity, so two event types may share a parent
/// tag and be handled by one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionType(&'static str);

impl ActionType {
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Upcast helper so `&dyn Action` can be downcast to its concrete type.
///
/// Implemented for every `'static` type; never implement it by hand.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An event dispatched through a reducer.
///
/// ```ignore
/// #[derive(Debug)]
/// struct Increment;
///
/// impl Action for Increment {
///     fn action_type(&self) -> ActionType {
///         Self::TYPE
///     }
/// }
///
/// impl StaticAction for Increment {
///     const TYPE: ActionType = ActionType::new("counter/increment");
/// }
/// ```
pub trait Action: AsAny + fmt::Debug + Send + Sync {
    /// The event's own tag.
    fn action_type(&self) -> ActionType;

    /// Tags of the event kinds this one specializes.
    ///
    /// A registration for any of these tags also fires for this event.
    fn parent_types(&self) -> &'static [ActionType] {
        &[]
    }

    /// Request id carried by fetch-lifecycle events.
    fn request_id(&self) -> Option<&RequestId> {
        None
    }
}

impl dyn Action + '_ {
    /// Whether this event answers to `tag`, either as its own tag or as
    /// one of its parent tags.
    pub fn is(&self, tag: ActionType) -> bool {
        self.action_type() == tag || self.parent_types().contains(&tag)
    }

    pub fn downcast_ref<A: Action + 'static>(&self) -> Option<&A> {
        self.as_any().downcast_ref::<A>()
    }
}

/// An event type with a tag known at compile time.
///
/// Required for typed registrations (`CommandReducer::on`).
pub trait StaticAction: Action + Sized + 'static {
    const TYPE: ActionType;
}
