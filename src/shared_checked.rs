use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub use std::cell::{Ref, RefMut};
pub use std::unreachable;

/// Owning handle to a shared node.
pub struct RcCell<T> {
    inner: Rc<RefCell<T>>,
}

/// Non-owning handle, never used to keep its target alive.
pub struct WeakCell<T> {
    inner: Weak<RefCell<T>>,
}

impl<T> RcCell<T> {
    pub fn new(value: T) -> Self {
        RcCell {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    pub fn get(&self) -> Ref<'_, T> {
        self.inner.borrow()
    }

    pub fn get_mut(&self) -> RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    #[cfg(test)]
    pub fn ptr_eq(&self, rhs: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &rhs.inner)
    }

    pub fn shallow_clone(&self) -> Self {
        RcCell {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn downgrade(&self) -> WeakCell<T> {
        WeakCell {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Takes the value out if this is the last owning handle.
    pub fn try_unwrap(self) -> Result<T, Self> {
        Rc::try_unwrap(self.inner)
            .map(RefCell::into_inner)
            .map_err(|inner| RcCell { inner })
    }
}

impl<T> WeakCell<T> {
    pub fn upgrade(&self) -> Option<RcCell<T>> {
        self.inner.upgrade().map(|inner| RcCell { inner })
    }

    #[cfg(test)]
    pub fn points_to(&self, target: &RcCell<T>) -> bool {
        std::ptr::eq(self.inner.as_ptr(), Rc::as_ptr(&target.inner))
    }
}

pub fn map_ref<T, U, F: FnOnce(&T) -> &U>(orig: Ref<'_, T>, f: F) -> Ref<'_, U> {
    Ref::map(orig, f)
}
