//! Thread-local dependency tracking and update scheduling.
//!
//! Every reactive read made while a tracking frame is open records its source
//! in that frame. [`Computed`](super::Computed) opens a frame around each
//! evaluation and subscribes to whatever was recorded.
//!
//! A change propagates in two phases:
//!
//! 1. The changed signal marks every dependent computation stale, transitively,
//!    and queues its plain subscribers.
//! 2. The scheduler refreshes stale computations, then runs the queued
//!    subscribers once nothing is stale.
//!
//! A stale computation also refreshes itself when read, so a computation
//! never observes an upstream value from before the change, whatever order
//! the refreshes are queued in.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use super::subscription::Subscription;

/// A reactive value that can be depended upon.
pub(crate) trait Source {
    /// Stable identity used to deduplicate reads within one frame.
    fn source_id(&self) -> usize;

    /// Registers `node` to be marked stale when this source changes.
    fn subscribe_derived(&self, node: Weak<dyn Derived>) -> Subscription;
}

/// A value computed from other sources.
pub(crate) trait Derived {
    /// Flags the value stale and queues a refresh. Propagates to dependents.
    fn mark_stale(self: Rc<Self>);

    /// Recomputes the value if it is stale.
    fn refresh(self: Rc<Self>);
}

struct PendingEffect {
    key: u64,
    live: Rc<Cell<bool>>,
    callback: Rc<dyn Fn()>,
}

#[derive(Default)]
struct Scheduler {
    batch_depth: usize,
    flushing: bool,
    stale: VecDeque<Rc<dyn Derived>>,
    effects: VecDeque<PendingEffect>,
}

enum Step {
    Refresh(Rc<dyn Derived>),
    Run(Rc<dyn Fn()>),
    Idle,
}

thread_local! {
    static FRAMES: RefCell<Vec<Vec<Rc<dyn Source>>>> = const { RefCell::new(Vec::new()) };
    static SCHEDULER: RefCell<Scheduler> = RefCell::new(Scheduler::default());
}

/// Returns true when a tracking frame is open on this thread.
pub(crate) fn is_tracking() -> bool {
    FRAMES.with(|frames| frames.borrow().last().is_some())
}

/// Records a read of `source` in the innermost tracking frame.
pub(crate) fn track(source: Rc<dyn Source>) {
    FRAMES.with(|frames| {
        if let Some(frame) = frames.borrow_mut().last_mut() {
            let id = source.source_id();
            if !frame.iter().any(|s| s.source_id() == id) {
                frame.push(source);
            }
        }
    });
}

struct FrameGuard;

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with(|frames| {
            frames.borrow_mut().pop();
        });
    }
}

/// Runs `f` inside a fresh tracking frame, returning its output and every
/// source it read.
pub(crate) fn collect<R>(f: impl FnOnce() -> R) -> (R, Vec<Rc<dyn Source>>) {
    FRAMES.with(|frames| frames.borrow_mut().push(Vec::new()));
    let guard = FrameGuard;
    let output = f();
    let sources = FRAMES.with(|frames| frames.borrow_mut().last_mut().map(std::mem::take));
    drop(guard);
    (output, sources.unwrap_or_default())
}

/// Runs `f` without recording any reads in the enclosing computation.
///
/// # Example
///
/// ```rust
/// use fieldmark::reactive::{untracked, Computed, Signal};
///
/// let a = Signal::new(1);
/// let b = Signal::new(10);
/// let sum = {
///     let (a, b) = (a.clone(), b.clone());
///     Computed::new(move || a.get() + untracked(|| b.get()))
/// };
///
/// b.set(20);
/// assert_eq!(sum.get(), 11);
/// a.set(2);
/// assert_eq!(sum.get(), 22);
/// ```
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    collect(f).0
}

/// Queues a stale computation for refresh.
pub(crate) fn queue_refresh(node: Rc<dyn Derived>) {
    SCHEDULER.with(|scheduler| scheduler.borrow_mut().stale.push_back(node));
}

/// Queues a subscriber callback. A subscriber already queued is not queued
/// again, so it runs at most once per update pass.
pub(crate) fn queue_effect(key: u64, live: Rc<Cell<bool>>, callback: Rc<dyn Fn()>) {
    SCHEDULER.with(|scheduler| {
        let mut scheduler = scheduler.borrow_mut();
        if !scheduler.effects.iter().any(|effect| effect.key == key) {
            scheduler.effects.push_back(PendingEffect {
                key,
                live,
                callback,
            });
        }
    });
}

struct FlushGuard;

impl Drop for FlushGuard {
    fn drop(&mut self) {
        SCHEDULER.with(|scheduler| scheduler.borrow_mut().flushing = false);
    }
}

fn next_step() -> Step {
    SCHEDULER.with(|scheduler| {
        let mut scheduler = scheduler.borrow_mut();
        if let Some(node) = scheduler.stale.pop_front() {
            return Step::Refresh(node);
        }
        while let Some(effect) = scheduler.effects.pop_front() {
            if effect.live.get() {
                return Step::Run(effect.callback);
            }
        }
        Step::Idle
    })
}

/// Runs the update pass unless a batch is open or a pass is already running.
///
/// Stale computations always go first: a subscriber only runs when every
/// computation is up to date.
pub(crate) fn flush() {
    let start = SCHEDULER.with(|scheduler| {
        let mut scheduler = scheduler.borrow_mut();
        if scheduler.batch_depth > 0 || scheduler.flushing {
            false
        } else {
            scheduler.flushing = true;
            true
        }
    });
    if !start {
        return;
    }

    let _guard = FlushGuard;
    loop {
        match next_step() {
            Step::Refresh(node) => node.refresh(),
            Step::Run(callback) => callback(),
            Step::Idle => break,
        }
    }
}

struct BatchGuard;

impl Drop for BatchGuard {
    fn drop(&mut self) {
        SCHEDULER.with(|scheduler| scheduler.borrow_mut().batch_depth -= 1);
    }
}

/// Applies several changes as one update pass.
///
/// Values change immediately and reads inside the batch see them, but
/// subscribers are only notified once the outermost batch returns. This keeps
/// observers from seeing a half-applied update, such as a control that is
/// dirty but not yet revalidated.
///
/// # Example
///
/// ```rust
/// use fieldmark::reactive::{batch, Computed, Signal};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let first = Signal::new(1);
/// let second = Signal::new(2);
/// let total = {
///     let (first, second) = (first.clone(), second.clone());
///     Computed::new(move || first.get() + second.get())
/// };
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let _watch = {
///     let (total, seen) = (total.clone(), seen.clone());
///     total.clone().subscribe(move || seen.borrow_mut().push(total.get_untracked()))
/// };
///
/// batch(|| {
///     first.set(10);
///     second.set(20);
/// });
/// assert_eq!(*seen.borrow(), vec![30]);
/// ```
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    SCHEDULER.with(|scheduler| scheduler.borrow_mut().batch_depth += 1);
    let output = {
        let _guard = BatchGuard;
        f()
    };
    flush();
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{Computed, Signal};

    #[test]
    fn test_subscribers_run_after_every_computation_settles() {
        let base = Signal::new(1);
        let doubled = {
            let base = base.clone();
            Computed::new(move || base.get() * 2)
        };
        let quadrupled = {
            let doubled = doubled.clone();
            Computed::new(move || doubled.get() * 2)
        };

        let seen = Rc::new(RefCell::new(Vec::new()));
        let _watch = {
            let (doubled, quadrupled, seen) = (doubled.clone(), quadrupled.clone(), seen.clone());
            doubled.clone().subscribe(move || {
                seen.borrow_mut()
                    .push((doubled.get_untracked(), quadrupled.get_untracked()))
            })
        };

        base.set(5);
        assert_eq!(*seen.borrow(), vec![(10, 20)]);
    }

    #[test]
    fn test_reads_pull_stale_upstream_values() {
        let base = Signal::new(1);
        let first = {
            let base = base.clone();
            Computed::new(move || base.get() + 1)
        };
        // Depends on `base` both directly and through `first`.
        let pair = {
            let (base, first) = (base.clone(), first.clone());
            Computed::new(move || (base.get(), first.get()))
        };

        let seen = Rc::new(RefCell::new(Vec::new()));
        let _watch = {
            let (pair, seen) = (pair.clone(), seen.clone());
            pair.clone().subscribe(move || seen.borrow_mut().push(pair.get_untracked()))
        };

        base.set(10);
        base.set(20);
        assert_eq!(*seen.borrow(), vec![(10, 11), (20, 21)]);
    }

    #[test]
    fn test_nested_batch_flushes_at_outermost_exit() {
        let value = Signal::new(0);
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let _sub = value.subscribe(move || counter.set(counter.get() + 1));

        batch(|| {
            value.set(1);
            batch(|| value.set(2));
            assert_eq!(calls.get(), 0);
            value.set(3);
        });
        assert_eq!(calls.get(), 1);
        assert_eq!(value.get(), 3);
    }

    #[test]
    fn test_subscriber_may_write_during_flush() {
        let source = Signal::new(0);
        let mirror = Signal::new(0);
        let _sub = {
            let (src, mirror) = (source.clone(), mirror.clone());
            source.subscribe(move || mirror.set(src.get_untracked() * 10))
        };
        let derived = {
            let mirror = mirror.clone();
            Computed::new(move || mirror.get() + 1)
        };

        source.set(4);
        assert_eq!(derived.get(), 41);
    }
}
