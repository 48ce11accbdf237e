//! Registration of mocked methods and scoped interceptor installation.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::MockPair;
use crate::error::{MaddoxError, Result};
use crate::object::{Interceptable, Method};

/// One mockable method and the object that owns it.
#[derive(Clone)]
pub struct MockTarget {
    pair: MockPair,
    owner: Rc<dyn Interceptable>,
}

impl MockTarget {
    /// The mocked pair.
    #[must_use]
    pub const fn pair(&self) -> &MockPair {
        &self.pair
    }

    /// The owning object.
    #[must_use]
    pub fn owner(&self) -> &dyn Interceptable {
        self.owner.as_ref()
    }
}

impl fmt::Debug for MockTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTarget")
            .field("pair", &self.pair)
            .field("owner", &self.owner.label())
            .finish()
    }
}

/// The set of mocked pairs in one scenario.
#[derive(Debug, Default)]
pub struct MockRegistry {
    targets: Vec<MockTarget>,
    keys: HashSet<MockPair>,
}

impl MockRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `owner.method_name` under `mock_name`.
    ///
    /// # Errors
    ///
    /// - `FunctionNotInMock` (2001) when `owner` has no such method
    /// - `MockAlreadyExists` (2002) when the pair is already registered
    pub fn register(
        &mut self,
        mock_name: &str,
        method_name: &str,
        owner: Rc<dyn Interceptable>,
    ) -> Result<&MockTarget> {
        if !owner.has_method(method_name) {
            return Err(MaddoxError::function_not_in_mock(mock_name, method_name));
        }
        let pair = MockPair::new(mock_name, method_name);
        if !self.keys.insert(pair.clone()) {
            return Err(MaddoxError::mock_already_exists(mock_name, method_name));
        }
        debug!(%pair, owner = owner.label(), "registered mock");
        let index = self.targets.len();
        self.targets.push(MockTarget { pair, owner });
        Ok(&self.targets[index])
    }

    /// Whether the pair was registered.
    #[must_use]
    pub fn contains(&self, pair: &MockPair) -> bool {
        self.keys.contains(pair)
    }

    /// Registered targets in registration order.
    #[must_use]
    pub fn targets(&self) -> &[MockTarget] {
        &self.targets
    }

    /// Number of registered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Swap an interceptor in for every registered method.
    ///
    /// `interceptor` builds the replacement for each target. The originals
    /// go back when the returned guard is dropped, including when a
    /// scenario unwinds early.
    pub fn install(&self, mut interceptor: impl FnMut(&MockTarget) -> Method) -> InstallGuard {
        let mut guard = InstallGuard {
            originals: Vec::with_capacity(self.targets.len()),
        };
        for target in &self.targets {
            let replacement = interceptor(target);
            match target.owner.swap_method(target.pair.method_name(), replacement) {
                Some(original) => {
                    debug!(pair = %target.pair, "installed interceptor");
                    guard.originals.push(Installed {
                        owner: Rc::clone(&target.owner),
                        method: target.pair.method_name().to_string(),
                        original,
                    });
                }
                None => debug!(pair = %target.pair, "method vanished before install"),
            }
        }
        guard
    }
}

struct Installed {
    owner: Rc<dyn Interceptable>,
    method: String,
    original: Method,
}

/// Restores original methods when dropped.
#[must_use = "interceptors are removed as soon as the guard is dropped"]
pub struct InstallGuard {
    originals: Vec<Installed>,
}

impl InstallGuard {
    /// Number of interceptors currently installed.
    #[must_use]
    pub fn installed(&self) -> usize {
        self.originals.len()
    }

    /// Restore the originals now.
    pub fn uninstall(self) {
        drop(self);
    }
}

impl Drop for InstallGuard {
    fn drop(&mut self) {
        // Reverse order so a method registered twice under different keys
        // ends up with its true original.
        while let Some(installed) = self.originals.pop() {
            installed
                .owner
                .swap_method(&installed.method, installed.original);
            debug!(
                owner = installed.owner.label(),
                method = %installed.method,
                "restored original method"
            );
        }
    }
}

impl fmt::Debug for InstallGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallGuard")
            .field("installed", &self.originals.len())
            .finish()
    }
}
