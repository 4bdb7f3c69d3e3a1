//! Displayed message derivation.
//!
//! The message comes from, in order:
//!
//! 1. The item's override for the displayed status, if any
//! 2. The first error of the effective control that carries a message
//!
//! No status means no message, whatever errors the control holds. An empty
//! literal override or error message is skipped as if it were not set; any
//! other source resolving to an empty string gives no message.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::control::{Control, ValidateStatus};
use crate::locale::Locale;
use crate::reactive::{Computed, ReadSignal};

/// An item-level message for one status.
#[derive(Clone)]
pub enum MessageOverride {
    Literal(String),
    /// Computed from the effective control.
    Computed(Rc<dyn Fn(&Control) -> String>),
}

impl MessageOverride {
    pub fn computed(f: impl Fn(&Control) -> String + 'static) -> Self {
        MessageOverride::Computed(Rc::new(f))
    }

    fn is_empty_literal(&self) -> bool {
        matches!(self, MessageOverride::Literal(text) if text.is_empty())
    }

    fn resolve(&self, control: Option<&Control>) -> Option<String> {
        match self {
            MessageOverride::Literal(text) => Some(text.clone()),
            MessageOverride::Computed(format) => control.map(|c| format(c)),
        }
    }
}

impl From<&str> for MessageOverride {
    fn from(text: &str) -> Self {
        MessageOverride::Literal(text.to_string())
    }
}

impl From<String> for MessageOverride {
    fn from(text: String) -> Self {
        MessageOverride::Literal(text)
    }
}

impl fmt::Debug for MessageOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageOverride::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            MessageOverride::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// Item-level messages keyed by status.
///
/// A bare message converts to an override for [`ValidateStatus::Invalid`].
///
/// # Example
///
/// ```rust
/// use fieldmark::{MessageOverrides, ValidateStatus};
///
/// let shorthand = MessageOverrides::from("required");
/// assert!(shorthand.get(ValidateStatus::Invalid).is_some());
///
/// let per_status = MessageOverrides::new()
///     .with(ValidateStatus::Invalid, "required")
///     .with(ValidateStatus::Validating, "checking...");
/// assert_eq!(per_status.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageOverrides {
    by_status: HashMap<ValidateStatus, MessageOverride>,
}

impl MessageOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message for `status`, returning the updated set for chaining.
    pub fn with(mut self, status: ValidateStatus, message: impl Into<MessageOverride>) -> Self {
        self.by_status.insert(status, message.into());
        self
    }

    pub fn get(&self, status: ValidateStatus) -> Option<&MessageOverride> {
        self.by_status.get(&status)
    }

    pub fn len(&self) -> usize {
        self.by_status.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_status.is_empty()
    }
}

impl From<MessageOverride> for MessageOverrides {
    fn from(message: MessageOverride) -> Self {
        MessageOverrides::new().with(ValidateStatus::Invalid, message)
    }
}

impl From<&str> for MessageOverrides {
    fn from(text: &str) -> Self {
        MessageOverride::from(text).into()
    }
}

impl From<String> for MessageOverrides {
    fn from(text: String) -> Self {
        MessageOverride::from(text).into()
    }
}

impl<M: Into<MessageOverride>> FromIterator<(ValidateStatus, M)> for MessageOverrides {
    fn from_iter<I: IntoIterator<Item = (ValidateStatus, M)>>(iter: I) -> Self {
        Self {
            by_status: iter.into_iter().map(|(s, m)| (s, m.into())).collect(),
        }
    }
}

/// Computes the message for a displayed status.
pub fn resolve_message(
    status: Option<ValidateStatus>,
    overrides: &MessageOverrides,
    control: Option<&Control>,
    locale: &Locale,
) -> Option<String> {
    resolve_with(status?, overrides, control, || locale.clone())
}

// The locale is only read when the control's errors are consulted.
fn resolve_with(
    status: ValidateStatus,
    overrides: &MessageOverrides,
    control: Option<&Control>,
    locale: impl FnOnce() -> Locale,
) -> Option<String> {
    let message = match overrides.get(status).filter(|m| !m.is_empty_literal()) {
        Some(message) => message.resolve(control),
        None => {
            let control = control?;
            let locale = locale();
            control.with_errors(|errors| errors?.first_message(&locale))
        }
    };
    message.filter(|m| !m.is_empty())
}

/// Derives the displayed message of an item.
pub(crate) fn derive_message(
    overrides: ReadSignal<MessageOverrides>,
    status: ReadSignal<Option<ValidateStatus>>,
    effective: ReadSignal<Option<Control>>,
    locale: ReadSignal<Locale>,
) -> Computed<Option<String>> {
    Computed::new(move || {
        let current = status.get()?;
        let control = effective.get();
        overrides.with(|overrides| {
            resolve_with(current, overrides, control.as_ref(), || locale.get())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ErrorMessage, Trigger, ValidateError, ValidateErrors};
    use crate::reactive::Signal;

    fn en() -> Locale {
        Locale::new("en")
    }

    fn control_with(errors: ValidateErrors) -> Control {
        let control = Control::new(Trigger::Change);
        control.set_validation(Some(ValidateStatus::Invalid), Some(errors));
        control
    }

    #[test]
    fn test_absent_status_means_absent_message() {
        let control = control_with(
            ValidateErrors::new().with("required", ValidateError::with_message("required")),
        );
        let overrides = MessageOverrides::from("custom");
        assert_eq!(resolve_message(None, &overrides, Some(&control), &en()), None);
    }

    #[test]
    fn test_override_wins_over_errors() {
        let control = control_with(
            ValidateErrors::new().with("minLength", ValidateError::with_message("too short")),
        );
        let overrides = MessageOverrides::new().with(ValidateStatus::Invalid, "required");
        assert_eq!(
            resolve_message(Some(ValidateStatus::Invalid), &overrides, Some(&control), &en()),
            Some("required".to_string())
        );
    }

    #[test]
    fn test_override_for_other_status_is_ignored() {
        let control = control_with(
            ValidateErrors::new().with("minLength", ValidateError::with_message("too short")),
        );
        let overrides = MessageOverrides::new().with(ValidateStatus::Valid, "looks good");
        assert_eq!(
            resolve_message(Some(ValidateStatus::Invalid), &overrides, Some(&control), &en()),
            Some("too short".to_string())
        );
    }

    #[test]
    fn test_computed_override_receives_control() {
        let control = control_with(ValidateErrors::new());
        let id = control.id();
        let overrides: MessageOverrides = [(
            ValidateStatus::Invalid,
            MessageOverride::computed(|c| format!("{} failed", c.id())),
        )]
        .into_iter()
        .collect();

        assert_eq!(
            resolve_message(Some(ValidateStatus::Invalid), &overrides, Some(&control), &en()),
            Some(format!("{} failed", id))
        );
        assert_eq!(
            resolve_message(Some(ValidateStatus::Invalid), &overrides, None, &en()),
            None
        );
    }

    #[test]
    fn test_empty_override_falls_through_to_errors() {
        let control = control_with(
            ValidateErrors::new().with("minLength", ValidateError::with_message("too short")),
        );
        let overrides = MessageOverrides::from("");
        assert_eq!(
            resolve_message(Some(ValidateStatus::Invalid), &overrides, Some(&control), &en()),
            Some("too short".to_string())
        );
        assert_eq!(
            resolve_message(Some(ValidateStatus::Invalid), &overrides, None, &en()),
            None
        );
    }

    #[test]
    fn test_empty_computed_message_is_absent() {
        let blank = MessageOverrides::new().with(
            ValidateStatus::Invalid,
            MessageOverride::computed(|_| String::new()),
        );
        let control = control_with(
            ValidateErrors::new().with("minLength", ValidateError::with_message("too short")),
        );
        assert_eq!(
            resolve_message(Some(ValidateStatus::Invalid), &blank, Some(&control), &en()),
            None
        );

        let control = control_with(ValidateErrors::new().with(
            "custom",
            ValidateError::with_message(ErrorMessage::computed(|_| String::new())),
        ));
        assert_eq!(
            resolve_message(
                Some(ValidateStatus::Invalid),
                &MessageOverrides::new(),
                Some(&control),
                &en()
            ),
            None
        );
    }

    #[test]
    fn test_derived_message_follows_locale() {
        let control = control_with(ValidateErrors::new().with(
            "required",
            ValidateError::with_message(ErrorMessage::localized([
                ("en", "Required field"),
                ("fr", "Champ requis"),
            ])),
        ));
        let locale = Signal::new(Locale::new("fr"));
        let message = derive_message(
            ReadSignal::constant(MessageOverrides::new()),
            ReadSignal::constant(Some(ValidateStatus::Invalid)),
            ReadSignal::constant(Some(control)),
            locale.read_only(),
        );

        assert_eq!(message.get(), Some("Champ requis".to_string()));
        locale.set(Locale::new("en"));
        assert_eq!(message.get(), Some("Required field".to_string()));
    }

    #[test]
    fn test_derived_message_ignores_locale_when_overridden() {
        let locale = Signal::new(Locale::new("fr"));
        let message = derive_message(
            ReadSignal::constant(MessageOverrides::from("required")),
            ReadSignal::constant(Some(ValidateStatus::Invalid)),
            ReadSignal::constant(None),
            locale.read_only(),
        );

        assert_eq!(message.get(), Some("required".to_string()));
        assert_eq!(message.dependency_count(), 3);
    }
}
