//! Registry of descendant controls for a form item.
//!
//! Inputs nested inside a form item register a live reference to their
//! control so the item can display that control's status. Only one child is
//! ever surfaced: the **active** entry.
//!
//! # Active entry rules
//!
//! 1. The first [`register`](ControlRegistry::register) call, in call order,
//!    becomes active. Later calls for any key leave the active slot alone.
//! 2. While active, the slot follows the *current* value of the registered
//!    reference, not a snapshot taken at registration.
//! 3. [`unregister`](ControlRegistry::unregister) of the active key releases
//!    the binding and clears the slot. A *subsequent* registration can then
//!    become active; children that registered earlier do not take over.
//! 4. Unregistering a key that is not active, or unregistering twice, does
//!    nothing.
//!
//! # Example
//!
//! ```rust
//! use fieldmark::reactive::Signal;
//! use fieldmark::{Control, ControlRegistry, Trigger};
//!
//! let registry = ControlRegistry::new();
//! let email = Signal::new(Some(Control::new(Trigger::Change)));
//! let phone = Signal::new(Some(Control::new(Trigger::Blur)));
//!
//! registry.register("email", &email.read_only());
//! registry.register("phone", &phone.read_only());
//! assert_eq!(registry.active_control().get(), email.get());
//!
//! registry.unregister("email");
//! assert_eq!(registry.active_control().get(), None);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::control::Control;
use crate::reactive::{Computed, ReadSignal, Signal};

/// Stable identity of a registering child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Name(String),
    Index(i64),
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKey::Name(name) => f.write_str(name),
            ControlKey::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for ControlKey {
    fn from(name: &str) -> Self {
        ControlKey::Name(name.to_string())
    }
}

impl From<String> for ControlKey {
    fn from(name: String) -> Self {
        ControlKey::Name(name)
    }
}

impl From<&ControlKey> for ControlKey {
    fn from(key: &ControlKey) -> Self {
        key.clone()
    }
}

impl From<i64> for ControlKey {
    fn from(index: i64) -> Self {
        ControlKey::Index(index)
    }
}

impl From<i32> for ControlKey {
    fn from(index: i32) -> Self {
        ControlKey::Index(index.into())
    }
}

impl From<u32> for ControlKey {
    fn from(index: u32) -> Self {
        ControlKey::Index(index.into())
    }
}

struct RegistryInner {
    active_key: RefCell<Option<ControlKey>>,
    /// The reference registered under the active key, kept alive while active.
    bound: Signal<Option<ReadSignal<Option<Control>>>>,
    slot: Computed<Option<Control>>,
}

/// Per-item registry of descendant controls.
///
/// Cloning yields another handle to the same registry, which is how the item
/// hands it to its descendants.
#[derive(Clone)]
pub struct ControlRegistry {
    inner: Rc<RegistryInner>,
}

impl ControlRegistry {
    /// Creates a registry with an empty active slot.
    pub fn new() -> Self {
        let bound: Signal<Option<ReadSignal<Option<Control>>>> = Signal::new(None);
        let slot = {
            let bound = bound.clone();
            Computed::new(move || bound.with(|control| control.as_ref().and_then(ReadSignal::get)))
        };
        Self {
            inner: Rc::new(RegistryInner {
                active_key: RefCell::new(None),
                bound,
                slot,
            }),
        }
    }

    /// Registers a child's control reference.
    ///
    /// Becomes active only if no entry is active. See the module docs for the
    /// full rules.
    pub fn register(&self, key: impl Into<ControlKey>, control: &ReadSignal<Option<Control>>) {
        let key = key.into();
        {
            let mut active = self.inner.active_key.borrow_mut();
            if let Some(current) = active.as_ref() {
                if *current == key {
                    tracing::trace!(key = %key, "control already active");
                } else {
                    tracing::debug!(key = %key, active = %current, "control registration ignored");
                }
                return;
            }
            *active = Some(key.clone());
        }

        tracing::debug!(key = %key, "control registered as active");
        self.inner.bound.set(Some(control.clone()));
    }

    /// Unregisters a child. A no-op unless `key` is the active key.
    pub fn unregister(&self, key: impl Into<ControlKey>) {
        let key = key.into();
        {
            let mut active = self.inner.active_key.borrow_mut();
            if active.as_ref() != Some(&key) {
                tracing::trace!(key = %key, "stale unregister ignored");
                return;
            }
            *active = None;
        }

        tracing::debug!(key = %key, "active control unregistered");
        self.inner.bound.set(None);
    }

    /// Registers a child and returns a guard that unregisters it on drop.
    pub fn scoped(
        &self,
        key: impl Into<ControlKey>,
        control: &ReadSignal<Option<Control>>,
    ) -> Registration {
        let key = key.into();
        self.register(key.clone(), control);
        Registration {
            registry: self.clone(),
            key: Some(key),
        }
    }

    /// Key of the active entry, if any.
    pub fn active_key(&self) -> Option<ControlKey> {
        self.inner.active_key.borrow().clone()
    }

    /// Returns true if `key` is the active entry.
    pub fn is_active(&self, key: impl Into<ControlKey>) -> bool {
        self.inner.active_key.borrow().as_ref() == Some(&key.into())
    }

    /// The published active-control slot.
    pub fn active_control(&self) -> ReadSignal<Option<Control>> {
        self.inner.slot.read_only()
    }
}

impl Default for ControlRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ControlRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlRegistry")
            .field("active_key", &self.active_key())
            .finish()
    }
}

/// Guard returned by [`ControlRegistry::scoped`].
///
/// Unregisters its key when dropped or released.
#[must_use = "dropping a Registration unregisters the control immediately"]
#[derive(Debug)]
pub struct Registration {
    registry: ControlRegistry,
    key: Option<ControlKey>,
}

impl Registration {
    /// Unregisters now. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(key) = self.key.take() {
            self.registry.unregister(key);
        }
    }

    pub fn key(&self) -> Option<&ControlKey> {
        self.key.as_ref()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}
