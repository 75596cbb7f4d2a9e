//! Multicast delegates.
//!
//! A delegate is a list of callbacks bound to one notification channel. Broadcasting calls every
//! callback synchronously, in the order they were added. Everything here is single threaded:
//! delegates are driven from the same update loop that owns the [`World`](crate::World).

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

/// Identifies one binding on one delegate; returned by [`MulticastDelegate::add`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DelegateHandle(u64);

type Callback<A> = Rc<dyn Fn(&A)>;

pub struct MulticastDelegate<A> {
    bindings: RefCell<Vec<(DelegateHandle, Callback<A>)>>,
    next_binding: Cell<u64>,
}

impl<A> Default for MulticastDelegate<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for MulticastDelegate<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MulticastDelegate")
            .field("bindings", &self.len())
            .finish()
    }
}

impl<A> MulticastDelegate<A> {
    pub fn new() -> Self {
        Self {
            bindings: RefCell::new(Vec::new()),
            next_binding: Cell::new(1),
        }
    }

    pub fn add(&self, callback: impl Fn(&A) + 'static) -> DelegateHandle {
        let handle = DelegateHandle(self.next_binding.get());
        self.next_binding.set(handle.0 + 1);
        self.bindings.borrow_mut().push((handle, Rc::new(callback)));
        handle
    }

    /// Returns `false` if the binding was already removed.
    pub fn remove(&self, handle: DelegateHandle) -> bool {
        let mut bindings = self.bindings.borrow_mut();
        let len_before = bindings.len();
        bindings.retain(|(h, _)| *h != handle);
        bindings.len() != len_before
    }

    pub fn contains(&self, handle: DelegateHandle) -> bool {
        self.bindings.borrow().iter().any(|(h, _)| *h == handle)
    }

    pub fn is_bound(&self) -> bool {
        !self.bindings.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        !self.is_bound()
    }

    pub fn clear(&self) {
        self.bindings.borrow_mut().clear();
    }

    /// Calls every callback bound when the broadcast starts.
    ///
    /// Callbacks may add or remove bindings on this delegate. A binding removed by an earlier
    /// callback is not called; a binding added during the broadcast waits for the next one.
    pub fn broadcast(&self, args: &A) {
        let snapshot: Vec<_> = self
            .bindings
            .borrow()
            .iter()
            .map(|(handle, callback)| (*handle, callback.clone()))
            .collect();

        for (handle, callback) in snapshot {
            if self.contains(handle) {
                callback(args);
            }
        }
    }
}
