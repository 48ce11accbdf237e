//! Objects with swappable, named methods.
//!
//! An [`Object`] is a cheaply clonable handle to a method table. Production
//! code holds `Object`s for its collaborators and calls them by name, which
//! is what lets a scenario substitute interceptors for individual methods
//! and put the originals back afterwards.
//!
//! The substitution itself goes through the [`Interceptable`] trait so other
//! dispatch tables can take part in a scenario.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::dynamic::{CallResult, Dynamic};

/// A method implementation.
pub type Method = Rc<dyn Fn(Vec<Dynamic>) -> CallResult>;

/// Something whose named methods can be temporarily replaced.
pub trait Interceptable {
    /// Human-readable name used in logs.
    fn label(&self) -> &str;

    /// Whether a method by this name exists.
    fn has_method(&self, method: &str) -> bool;

    /// Replace an existing method, returning the previous implementation.
    ///
    /// Returns `None` and leaves the table untouched when `method` does not exist.
    fn swap_method(&self, method: &str, replacement: Method) -> Option<Method>;
}

struct ObjectInner {
    name: String,
    methods: RefCell<HashMap<String, Method>>,
}

/// A named table of methods.
#[derive(Clone)]
pub struct Object {
    inner: Rc<ObjectInner>,
}

impl Object {
    /// Create an object with no methods.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                name: name.into(),
                methods: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Add a method, builder style.
    #[must_use]
    pub fn with_method(
        self,
        name: impl Into<String>,
        method: impl Fn(Vec<Dynamic>) -> CallResult + 'static,
    ) -> Self {
        self.define(name, method);
        self
    }

    /// Add or overwrite a method.
    pub fn define(
        &self,
        name: impl Into<String>,
        method: impl Fn(Vec<Dynamic>) -> CallResult + 'static,
    ) {
        self.inner
            .methods
            .borrow_mut()
            .insert(name.into(), Rc::new(method));
    }

    /// The object's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Sorted method names.
    #[must_use]
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.methods.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Invoke a method by name.
    ///
    /// Calling a method that does not exist throws a `TypeError` string, the
    /// same way a dynamic call on a missing property would.
    pub fn call(&self, method: &str, args: Vec<Dynamic>) -> CallResult {
        // Release the table borrow before running the method: interceptors
        // and production code re-enter `call` freely.
        let found = self.inner.methods.borrow().get(method).cloned();
        match found {
            Some(implementation) => implementation(args),
            None => Err(Dynamic::from(format!(
                "TypeError: {}.{method} is not a function",
                self.name()
            ))),
        }
    }

    /// Whether two handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// A non-owning handle, for methods that need to return their own object.
    #[must_use]
    pub fn downgrade(&self) -> WeakObject {
        WeakObject(Rc::downgrade(&self.inner))
    }
}

impl Interceptable for Object {
    fn label(&self) -> &str {
        self.name()
    }

    fn has_method(&self, method: &str) -> bool {
        self.inner.methods.borrow().contains_key(method)
    }

    fn swap_method(&self, method: &str, replacement: Method) -> Option<Method> {
        let mut methods = self.inner.methods.borrow_mut();
        let slot = methods.get_mut(method)?;
        Some(std::mem::replace(slot, replacement))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("name", &self.name())
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Weak counterpart of [`Object`].
#[derive(Clone)]
pub struct WeakObject(Weak<ObjectInner>);

impl WeakObject {
    /// Recover a strong handle if the object is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Object> {
        self.0.upgrade().map(|inner| Object { inner })
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakObject")
    }
}
