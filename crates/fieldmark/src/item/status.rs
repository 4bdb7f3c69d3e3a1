//! Displayed status derivation.

use crate::control::{Control, Trigger, ValidateStatus};
use crate::reactive::{Computed, ReadSignal};

/// The status a control shows right now, given its trigger policy.
///
/// A `Change` control shows its status once dirty, a `Blur` control once
/// blurred. Before that the status is hidden even if validation already ran.
/// Only the flag the policy needs is read.
pub fn visible_status(control: &Control) -> Option<ValidateStatus> {
    let visible = match control.trigger() {
        Trigger::Change => control.dirty(),
        Trigger::Blur => control.blurred(),
    };
    if visible {
        control.status()
    } else {
        None
    }
}

/// Derives the displayed status of an item.
///
/// An override short-circuits before the effective control is read, so
/// while one is set the result does not depend on the control at all.
pub(crate) fn derive_status(
    overridden: ReadSignal<Option<ValidateStatus>>,
    effective: ReadSignal<Option<Control>>,
) -> Computed<Option<ValidateStatus>> {
    Computed::new(move || {
        if let Some(status) = overridden.get() {
            return Some(status);
        }
        let control = effective.get()?;
        visible_status(&control)
    })
}
