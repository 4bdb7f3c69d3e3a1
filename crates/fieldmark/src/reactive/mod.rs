//! Single-threaded reactive primitives.
//!
//! This module provides:
//!
//! - [`Signal`]: A shared mutable value that notifies subscribers on change
//! - [`ReadSignal`]: A read-only view used to publish owned values
//! - [`Computed`]: A derived value recomputed synchronously when its inputs change
//! - [`Subscription`]: Handle for a registered change callback
//! - [`batch`] and [`untracked`]: Update-pass and dependency control
//!
//! Dependencies are tracked automatically: whatever a [`Computed`] reads
//! during an evaluation becomes its dependency set for the next change. A
//! change first marks dependent computations stale, then refreshes them, then
//! runs subscribers, so a subscriber never sees two derived values from
//! different moments.
//! Everything here is `!Send`; a form lives on one thread.

mod computed;
mod runtime;
mod signal;
mod subscription;

pub use computed::Computed;
pub use runtime::{batch, untracked};
pub use signal::{ReadSignal, Signal, WeakSignal};
pub use subscription::Subscription;
