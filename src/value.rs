use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A leaf of the state tree holding any `Send + Sync` value.
///
/// Leaves are shared, never copied: the next state reuses the previous
/// state's handle for every leaf a reducer did not replace. Two handles
/// are the same leaf only if they share one allocation
/// ([`StateValue::ptr_eq`]); equal contents are not enough.
#[derive(Clone)]
pub struct StateValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl StateValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Borrow the value as `T`, or `None` if the leaf holds another type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Rust type name of the value, for log messages.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn ptr_eq(a: &StateValue, b: &StateValue) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Number of states currently sharing this leaf.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl fmt::Debug for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateValue<{}>", self.type_name)
    }
}
