//! Derived values.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::runtime::{self, Derived, Source};
use super::signal::{ReadSignal, Signal};
use super::subscription::Subscription;

struct ComputedInner<T> {
    output: Signal<T>,
    compute: Box<dyn Fn() -> T>,
    stale: Cell<bool>,
    dependencies: RefCell<Vec<Subscription>>,
}

impl<T: Clone + PartialEq + 'static> ComputedInner<T> {
    fn bind(this: &Rc<Self>, sources: Vec<Rc<dyn Source>>) {
        let node: Rc<dyn Derived> = this.clone();
        let weak = Rc::downgrade(&node);
        let subscriptions = sources
            .iter()
            .map(|source| source.subscribe_derived(weak.clone()))
            .collect();
        let previous = this.dependencies.replace(subscriptions);
        drop(previous);
    }

    fn recompute(this: &Rc<Self>) {
        let (value, sources) = runtime::collect(|| (this.compute)());
        // Cleared after the run: upstream refreshes pulled by `compute`
        // re-mark this node, and those are already reflected in `value`.
        this.stale.set(false);
        Self::bind(this, sources);
        this.output.set_if_changed(value);
    }
}

impl<T: Clone + PartialEq + 'static> Derived for ComputedInner<T> {
    fn mark_stale(self: Rc<Self>) {
        if self.stale.replace(true) {
            return;
        }
        runtime::queue_refresh(self.clone());
        self.output.mark_dependents();
    }

    fn refresh(self: Rc<Self>) {
        if self.stale.get() {
            ComputedInner::recompute(&self);
        }
    }
}

/// A value derived from other reactive values.
///
/// The closure runs once on construction and again, within the same update
/// pass, whenever any value it read during its last run changes. Reading a
/// computation whose inputs changed recomputes it first, so reads are never
/// stale. Dependencies are re-collected on every run, so a branch that stops
/// reading a signal stops depending on it. Downstream observers are notified only when the output
/// actually changes.
///
/// # Example
///
/// ```rust
/// use fieldmark::reactive::{Computed, Signal};
///
/// let use_fallback = Signal::new(false);
/// let primary = Signal::new("primary");
/// let fallback = Signal::new("fallback");
///
/// let chosen = {
///     let (use_fallback, primary, fallback) =
///         (use_fallback.clone(), primary.clone(), fallback.clone());
///     Computed::new(move || {
///         if use_fallback.get() { fallback.get() } else { primary.get() }
///     })
/// };
///
/// assert_eq!(chosen.get(), "primary");
/// use_fallback.set(true);
/// assert_eq!(chosen.get(), "fallback");
/// ```
pub struct Computed<T> {
    inner: Rc<ComputedInner<T>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Computed<T> {
    /// Evaluates `compute` and keeps the result up to date.
    pub fn new(compute: impl Fn() -> T + 'static) -> Self {
        let (initial, sources) = runtime::collect(&compute);
        let inner = Rc::new(ComputedInner {
            output: Signal::new(initial),
            compute: Box::new(compute),
            stale: Cell::new(false),
            dependencies: RefCell::new(Vec::new()),
        });
        ComputedInner::bind(&inner, sources);
        Self { inner }
    }

    /// Returns the current value, recording a dependency.
    pub fn get(&self) -> T {
        self.refresh();
        self.inner.output.get()
    }

    /// Returns the current value without recording a dependency.
    pub fn get_untracked(&self) -> T {
        self.refresh();
        self.inner.output.get_untracked()
    }

    /// Borrows the current value, recording a dependency.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.refresh();
        self.inner.output.with(f)
    }

    /// Registers `callback` to run whenever the output changes.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        self.inner.output.subscribe(callback)
    }

    /// Number of distinct values published after the initial one.
    pub fn version(&self) -> u64 {
        self.inner.output.version()
    }

    /// Number of values read during the last evaluation.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.borrow().len()
    }

    /// Returns a read-only view that keeps this computation alive.
    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal::with_owner(self.inner.output.clone(), self.inner.clone())
    }

    fn refresh(&self) {
        self.inner.clone().refresh();
    }
}

impl<T: fmt::Debug> fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("output", &self.inner.output)
            .finish()
    }
}
