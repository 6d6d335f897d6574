//! Logical and native listeners.
//!
//! Both kinds are shared callbacks whose identity is the allocation they
//! point to. Cloning a listener keeps its identity, so the clone can later be
//! handed to `off` as the removal key.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use smol_str::SmolStr;

use crate::event::{Incoming, SyntheticEvent};

/// A callback registered through the public event API.
pub struct Listener<E> {
    callback: Rc<dyn Fn(&SyntheticEvent<E>)>,
}

impl<E> Listener<E> {
    pub fn new(callback: impl Fn(&SyntheticEvent<E>) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    pub fn call(&self, event: &SyntheticEvent<E>) {
        (self.callback)(event)
    }

    /// Identity comparison, the only key `off` matches on.
    pub fn same(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.callback), Rc::as_ptr(&other.callback))
    }
}

impl<E> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self {
            callback: self.callback.clone(),
        }
    }
}

impl<E> fmt::Debug for Listener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.callback) as *const ())
    }
}

struct NativeInner<R, E> {
    callback: Box<dyn Fn(Incoming<'_, R, E>)>,
    stash: RefCell<HashMap<SmolStr, Box<dyn Any>>>,
}

/// A callback a backend subscribes to the host.
///
/// Besides the callback it carries a stash of named slots. Whoever wires a
/// native listener into the host (a backend, a legacy reroute, a special
/// event) keeps the resulting subscription in the stash, keyed by a name it
/// owns, so the matching teardown can find exactly what it created.
pub struct NativeListener<R, E> {
    inner: Rc<NativeInner<R, E>>,
}

impl<R, E> NativeListener<R, E> {
    pub fn new(callback: impl Fn(Incoming<'_, R, E>) + 'static) -> Self {
        Self {
            inner: Rc::new(NativeInner {
                callback: Box::new(callback),
                stash: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn call(&self, incoming: Incoming<'_, R, E>) {
        (self.inner.callback)(incoming)
    }

    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// A handle that does not keep the listener alive.
    ///
    /// Host-side closures hold these so a listener stashed inside its own
    /// subscription does not form a cycle.
    pub fn downgrade(&self) -> WeakNativeListener<R, E> {
        WeakNativeListener {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Store `value` under `key`, replacing anything already there.
    pub fn stash<T: 'static>(&self, key: impl Into<SmolStr>, value: T) {
        let previous = self
            .inner
            .stash
            .borrow_mut()
            .insert(key.into(), Box::new(value));
        // Dropped outside the borrow: it may own host subscriptions.
        drop(previous);
    }

    /// Remove and return the value stored under `key`.
    ///
    /// Returns `None` if nothing is stored there or it has another type, in
    /// which case the slot is left untouched.
    pub fn take<T: 'static>(&self, key: &str) -> Option<T> {
        let mut stash = self.inner.stash.borrow_mut();
        let boxed = stash.remove(key)?;
        match boxed.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                stash.insert(SmolStr::from(key), other);
                None
            }
        }
    }

    pub fn is_stashed(&self, key: &str) -> bool {
        self.inner.stash.borrow().contains_key(key)
    }
}

impl<R, E> Clone for NativeListener<R, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R, E> fmt::Debug for NativeListener<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots: Vec<SmolStr> = self.inner.stash.borrow().keys().cloned().collect();
        f.debug_struct("NativeListener")
            .field("ptr", &Rc::as_ptr(&self.inner))
            .field("stash", &slots)
            .finish()
    }
}

/// Non-owning counterpart of [`NativeListener`].
pub struct WeakNativeListener<R, E> {
    inner: Weak<NativeInner<R, E>>,
}

impl<R, E> WeakNativeListener<R, E> {
    pub fn upgrade(&self) -> Option<NativeListener<R, E>> {
        self.inner.upgrade().map(|inner| NativeListener { inner })
    }
}

impl<R, E> Clone for WeakNativeListener<R, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
