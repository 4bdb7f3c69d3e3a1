//! The control: a value holder with interaction history and validation state.

use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::errors::ValidateErrors;
use super::status::{Trigger, ValidateStatus};
use crate::reactive::{batch, Signal};

/// A synchronous validator: returns the errors for a value, or `None` if valid.
pub type Validator = Rc<dyn Fn(&Value) -> Option<ValidateErrors>>;

static NEXT_CONTROL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(u64);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

struct ControlInner {
    id: ControlId,
    trigger: Trigger,
    initial: RefCell<Value>,
    value: Signal<Value>,
    dirty: Signal<bool>,
    blurred: Signal<bool>,
    status: Signal<Option<ValidateStatus>>,
    errors: Signal<Option<ValidateErrors>>,
    validator: RefCell<Option<Validator>>,
}

/// A reactive value holder.
///
/// Every field is a signal: reading one inside a
/// [`Computed`](crate::reactive::Computed) makes the computation follow it.
/// The input that owns a control drives it through [`set_value`](Control::set_value),
/// [`mark_blurred`](Control::mark_blurred) and friends; form items only read it.
///
/// `Control` is a cheap handle. Clones refer to the same control and compare
/// equal; distinct controls never compare equal, whatever their values.
///
/// # Example
///
/// ```rust
/// use fieldmark::{Control, Trigger, ValidateError, ValidateErrors, ValidateStatus};
/// use serde_json::json;
///
/// let name = Control::new(Trigger::Change).with_validator(|value| {
///     if value.as_str().map_or(true, str::is_empty) {
///         Some(ValidateErrors::new().with("required", ValidateError::with_message("required")))
///     } else {
///         None
///     }
/// });
/// assert_eq!(name.status(), Some(ValidateStatus::Invalid));
///
/// name.set_value(json!("Ada"));
/// assert!(name.dirty());
/// assert_eq!(name.status(), Some(ValidateStatus::Valid));
/// ```
#[derive(Clone)]
pub struct Control {
    inner: Rc<ControlInner>,
}

impl Control {
    /// Creates a control holding `null` with no validation state.
    pub fn new(trigger: Trigger) -> Self {
        Self {
            inner: Rc::new(ControlInner {
                id: ControlId(NEXT_CONTROL_ID.fetch_add(1, Ordering::Relaxed)),
                trigger,
                initial: RefCell::new(Value::Null),
                value: Signal::new(Value::Null),
                dirty: Signal::new(false),
                blurred: Signal::new(false),
                status: Signal::new(None),
                errors: Signal::new(None),
                validator: RefCell::new(None),
            }),
        }
    }

    /// Sets the initial value, which [`reset`](Control::reset) returns to.
    pub fn with_value(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.inner.initial.replace(value.clone());
        self.inner.value.set(value);
        self.validate();
        self
    }

    /// Installs a validator and runs it against the current value.
    pub fn with_validator(
        self,
        validator: impl Fn(&Value) -> Option<ValidateErrors> + 'static,
    ) -> Self {
        self.inner.validator.replace(Some(Rc::new(validator)));
        self.validate();
        self
    }

    pub fn id(&self) -> ControlId {
        self.inner.id
    }

    pub fn trigger(&self) -> Trigger {
        self.inner.trigger
    }

    pub fn value(&self) -> Value {
        self.inner.value.get()
    }

    pub fn dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    pub fn blurred(&self) -> bool {
        self.inner.blurred.get()
    }

    pub fn status(&self) -> Option<ValidateStatus> {
        self.inner.status.get()
    }

    pub fn errors(&self) -> Option<ValidateErrors> {
        self.inner.errors.get()
    }

    /// Reads the errors in place, recording a dependency.
    pub fn with_errors<R>(&self, f: impl FnOnce(Option<&ValidateErrors>) -> R) -> R {
        self.inner.errors.with(|errors| f(errors.as_ref()))
    }

    /// Records a user edit: stores the value, marks the control dirty and
    /// revalidates, all in one update pass.
    pub fn set_value(&self, value: impl Into<Value>) {
        let value = value.into();
        batch(|| {
            self.inner.value.set_if_changed(value);
            self.inner.dirty.set_if_changed(true);
            self.validate();
        });
    }

    /// Records that the input lost focus.
    pub fn mark_blurred(&self) {
        self.inner.blurred.set_if_changed(true);
    }

    /// Marks an in-flight validation.
    pub fn mark_validating(&self) {
        self.inner.status.set_if_changed(Some(ValidateStatus::Validating));
    }

    /// Replaces the validation outcome, as reported by an external validator.
    pub fn set_validation(&self, status: Option<ValidateStatus>, errors: Option<ValidateErrors>) {
        batch(|| {
            self.inner.status.set_if_changed(status);
            self.inner.errors.set(errors);
        });
    }

    /// Restores the initial value and clears the interaction history.
    pub fn reset(&self) {
        let initial = self.inner.initial.borrow().clone();
        batch(|| {
            self.inner.value.set_if_changed(initial);
            self.inner.dirty.set_if_changed(false);
            self.inner.blurred.set_if_changed(false);
            self.validate();
        });
    }

    /// Runs the installed validator, if any, against the current value.
    pub fn validate(&self) {
        let validator = self.inner.validator.borrow().clone();
        let Some(validator) = validator else {
            return;
        };
        let errors = self.inner.value.with(|value| validator(value));
        let status = if errors.is_some() {
            ValidateStatus::Invalid
        } else {
            ValidateStatus::Valid
        };
        self.set_validation(Some(status), errors);
    }
}

impl PartialEq for Control {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Control {}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("id", &self.inner.id)
            .field("trigger", &self.inner.trigger)
            .field("dirty", &self.inner.dirty.get_untracked())
            .field("blurred", &self.inner.blurred.get_untracked())
            .field("status", &self.inner.status.get_untracked())
            .finish_non_exhaustive()
    }
}
