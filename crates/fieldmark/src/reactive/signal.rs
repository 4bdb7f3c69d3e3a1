//! Mutable reactive cells and their read-only views.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::runtime::{self, Derived, Source};
use super::subscription::Subscription;

static NEXT_SOURCE_ID: AtomicUsize = AtomicUsize::new(1);
static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

enum Listener {
    /// A computation reading this signal; marked stale on change.
    Derived(Weak<dyn Derived>),
    /// A plain callback; queued on change.
    Effect(Rc<dyn Fn()>),
}

struct Subscriber {
    id: u64,
    live: Rc<Cell<bool>>,
    listener: Listener,
}

struct SignalInner<T> {
    id: usize,
    value: RefCell<T>,
    version: Cell<u64>,
    subscribers: RefCell<Vec<Subscriber>>,
}

impl<T: 'static> SignalInner<T> {
    fn subscribe(self: &Rc<Self>, listener: Listener) -> Subscription {
        let id = NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed);
        let live = Rc::new(Cell::new(true));
        self.subscribers.borrow_mut().push(Subscriber {
            id,
            live: live.clone(),
            listener,
        });

        let weak = Rc::downgrade(self);
        Subscription::new(move || {
            live.set(false);
            if let Some(inner) = weak.upgrade() {
                inner.subscribers.borrow_mut().retain(|s| s.id != id);
            }
        })
    }

    /// Marks dependent computations stale and, unless `only_derived`, queues
    /// plain subscribers.
    fn propagate(&self, only_derived: bool) {
        // Snapshot first: marking may subscribe or release while we iterate.
        let mut stale = Vec::new();
        for subscriber in self.subscribers.borrow().iter() {
            match &subscriber.listener {
                Listener::Derived(node) => stale.extend(node.upgrade()),
                Listener::Effect(callback) if !only_derived => runtime::queue_effect(
                    subscriber.id,
                    subscriber.live.clone(),
                    callback.clone(),
                ),
                Listener::Effect(_) => {}
            }
        }
        for node in stale {
            node.mark_stale();
        }
    }
}

/// A shared, mutable reactive value.
///
/// Reading with [`get`](Signal::get) or [`with`](Signal::with) inside a
/// [`Computed`](super::Computed) makes the computation depend on this signal.
/// After every [`set`](Signal::set) or [`update`](Signal::update), dependent
/// computations are brought up to date and then subscribers run, in
/// registration order.
///
/// Cloning a signal yields another handle to the same cell.
///
/// # Example
///
/// ```rust
/// use fieldmark::reactive::Signal;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let name = Signal::new(String::from("ada"));
/// let changes = Rc::new(Cell::new(0));
/// let counter = changes.clone();
/// let _sub = name.subscribe(move || counter.set(counter.get() + 1));
///
/// name.set("grace".into());
/// assert_eq!(name.get(), "grace");
/// assert_eq!(changes.get(), 1);
/// ```
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Signal<T> {
    /// Creates a signal holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                id: NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed),
                value: RefCell::new(value),
                version: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Returns a clone of the current value, recording a dependency.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.track();
        self.inner.value.borrow().clone()
    }

    /// Returns a clone of the current value without recording a dependency.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.inner.value.borrow().clone()
    }

    /// Borrows the current value, recording a dependency.
    ///
    /// Setting this signal from inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&self.inner.value.borrow())
    }

    /// Replaces the value and notifies subscribers.
    pub fn set(&self, value: T) {
        let previous = self.inner.value.replace(value);
        drop(previous);
        self.changed();
    }

    /// Replaces the value only if it differs from the current one.
    ///
    /// Returns true when the value changed and subscribers were notified.
    pub fn set_if_changed(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        if *self.inner.value.borrow() == value {
            return false;
        }
        self.set(value);
        true
    }

    /// Mutates the value in place and notifies subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.value.borrow_mut());
        self.changed();
    }

    /// Number of changes applied so far.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Registers `callback` to run after every change.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        self.inner.subscribe(Listener::Effect(Rc::new(callback)))
    }

    /// Number of live subscribers, computations included.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Returns a read-only view of this signal.
    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal {
            signal: self.clone(),
            owner: None,
        }
    }

    /// Returns a handle that does not keep the signal alive.
    pub fn downgrade(&self) -> WeakSignal<T> {
        WeakSignal {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Returns true if both handles point to the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Marks dependent computations stale without queueing subscribers.
    pub(crate) fn mark_dependents(&self) {
        self.inner.propagate(true);
    }

    fn track(&self) {
        if runtime::is_tracking() {
            runtime::track(Rc::new(SignalSource(self.inner.clone())));
        }
    }

    fn changed(&self) {
        let inner = &self.inner;
        inner.version.set(inner.version.get() + 1);
        inner.propagate(false);
        runtime::flush();
    }
}

impl<T: Default + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Signal");
        match self.inner.value.try_borrow() {
            Ok(value) => out.field("value", &*value),
            Err(_) => out.field("value", &"<borrowed>"),
        };
        out.field("version", &self.inner.version.get()).finish()
    }
}

struct SignalSource<T>(Rc<SignalInner<T>>);

impl<T: 'static> Source for SignalSource<T> {
    fn source_id(&self) -> usize {
        self.0.id
    }

    fn subscribe_derived(&self, node: Weak<dyn Derived>) -> Subscription {
        self.0.subscribe(Listener::Derived(node))
    }
}

/// A non-owning handle to a [`Signal`].
pub struct WeakSignal<T> {
    inner: Weak<SignalInner<T>>,
}

impl<T> Clone for WeakSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> WeakSignal<T> {
    /// Returns the signal if it is still alive.
    pub fn upgrade(&self) -> Option<Signal<T>> {
        self.inner.upgrade().map(|inner| Signal { inner })
    }
}

/// A read-only view of a reactive value.
///
/// Derived values are published as `ReadSignal`s so that only their owner can
/// change them. A view produced by [`Computed::read_only`](super::Computed::read_only)
/// keeps its computation alive and always reads an up-to-date value.
pub struct ReadSignal<T> {
    signal: Signal<T>,
    owner: Option<Rc<dyn Derived>>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
            owner: self.owner.clone(),
        }
    }
}

impl<T: 'static> ReadSignal<T> {
    pub(crate) fn with_owner(signal: Signal<T>, owner: Rc<dyn Derived>) -> Self {
        Self {
            signal,
            owner: Some(owner),
        }
    }

    /// A view of a value that never changes.
    pub fn constant(value: T) -> Self {
        Signal::new(value).read_only()
    }

    /// Returns a clone of the current value, recording a dependency.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.refresh_owner();
        self.signal.get()
    }

    /// Returns a clone of the current value without recording a dependency.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.refresh_owner();
        self.signal.get_untracked()
    }

    /// Borrows the current value, recording a dependency.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.refresh_owner();
        self.signal.with(f)
    }

    /// Registers `callback` to run after every change.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        self.signal.subscribe(callback)
    }

    /// Number of changes applied so far.
    pub fn version(&self) -> u64 {
        self.signal.version()
    }

    fn refresh_owner(&self) {
        if let Some(owner) = &self.owner {
            owner.clone().refresh();
        }
    }
}

impl<T: 'static> From<Signal<T>> for ReadSignal<T> {
    fn from(signal: Signal<T>) -> Self {
        signal.read_only()
    }
}

impl<T: 'static> From<&Signal<T>> for ReadSignal<T> {
    fn from(signal: &Signal<T>) -> Self {
        signal.read_only()
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadSignal").field(&self.signal).finish()
    }
}
