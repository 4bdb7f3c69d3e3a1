//! Effective control resolution.

use crate::control::Control;
use crate::reactive::{Computed, ReadSignal};

/// The single control a form item displays.
///
/// Resolves to the item's own control when it has one, otherwise to the
/// registry's active control. Recomputed in the same update pass as either
/// input changes, so observers never see it point at neither source while
/// one of them is set.
#[derive(Debug, Clone)]
pub struct EffectiveControl {
    resolved: Computed<Option<Control>>,
}

impl EffectiveControl {
    pub fn new(own: ReadSignal<Option<Control>>, registered: ReadSignal<Option<Control>>) -> Self {
        let resolved = Computed::new(move || own.get().or_else(|| registered.get()));
        Self { resolved }
    }

    /// Current effective control, recording a dependency.
    pub fn get(&self) -> Option<Control> {
        self.resolved.get()
    }

    pub fn signal(&self) -> ReadSignal<Option<Control>> {
        self.resolved.read_only()
    }
}
