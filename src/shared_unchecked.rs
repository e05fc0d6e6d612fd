//! Unchecked version of the shared node cell.
//!
//! If the logic is correct with the checked version,
//! it should also be sound with this unchecked version
//! as all the checks in there are redundant and always panic when failed.

use std::cell::UnsafeCell;
use std::rc::{Rc, Weak};

pub type Ref<'a, T> = &'a T;
pub type RefMut<'a, T> = &'a mut T;

macro_rules! unreachable {
    ($($arg:tt)*) => {
        unsafe { ::std::hint::unreachable_unchecked() }
    };
}
pub(crate) use unreachable;

pub struct RcCell<T> {
    inner: Rc<UnsafeCell<T>>,
}

pub struct WeakCell<T> {
    inner: Weak<UnsafeCell<T>>,
}

impl<T> RcCell<T> {
    pub fn new(value: T) -> Self {
        RcCell {
            inner: Rc::new(UnsafeCell::new(value)),
        }
    }

    pub fn get(&self) -> Ref<'_, T> {
        unsafe { &*self.inner.get() }
    }

    #[allow(clippy::mut_from_ref)]
    pub fn get_mut(&self) -> RefMut<'_, T> {
        unsafe { &mut *self.inner.get() }
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

    pub fn try_unwrap(self) -> Result<T, Self> {
        Rc::try_unwrap(self.inner)
            .map(UnsafeCell::into_inner)
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
    f(orig)
}
