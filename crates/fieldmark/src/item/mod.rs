//! Form items: derived validation status and message for one field.
//!
//! A [`FormItem`] resolves a single effective control, its own or the first
//! one registered by a descendant, and derives from it:
//!
//! - [`status`](FormItem::status): what validation state to show, if any
//! - [`message`](FormItem::message): what text to show with it, if any
//! - [`status_icon`](FormItem::status_icon): the icon for the status, when feedback is on
//!
//! All three are read-only reactive values recomputed in the same update
//! pass as any of their inputs.
//!
//! # Example
//!
//! ```rust
//! use fieldmark::reactive::Signal;
//! use fieldmark::{
//!     Control, FormItem, FormItemOptions, FormScope, Trigger, ValidateError, ValidateErrors,
//!     ValidateStatus,
//! };
//!
//! let item = FormItem::new(FormItemOptions::new(), &FormScope::default());
//!
//! // A nested input registers its control with the item.
//! let email = Control::new(Trigger::Change);
//! let email_ref = Signal::new(Some(email.clone()));
//! let registration = item.registry().scoped("email", &email_ref.read_only());
//!
//! email.set_value("not-an-email");
//! email.set_validation(
//!     Some(ValidateStatus::Invalid),
//!     Some(ValidateErrors::new().with("format", ValidateError::with_message("Invalid email"))),
//! );
//! assert_eq!(item.status().get(), Some(ValidateStatus::Invalid));
//! assert_eq!(item.message().get().as_deref(), Some("Invalid email"));
//!
//! drop(registration);
//! assert_eq!(item.status().get(), None);
//! assert_eq!(item.message().get(), None);
//! ```

mod message;
mod resolver;
mod status;

pub use message::{resolve_message, MessageOverride, MessageOverrides};
pub use resolver::EffectiveControl;
pub use status::visible_status;

use crate::config::{FormItemConfig, LabelAlign};
use crate::control::{Control, ValidateStatus};
use crate::locale::LocaleProvider;
use crate::reactive::{Computed, ReadSignal, Signal};
use crate::registry::{ControlKey, ControlRegistry};
use crate::scope::FormScope;

/// Resolved label settings of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelConfig {
    pub colonless: bool,
    pub align: LabelAlign,
    pub required: bool,
}

/// Construction options for a [`FormItem`].
///
/// Layout settings left unset fall back to the [`FormScope`].
#[derive(Debug, Clone, Default)]
pub struct FormItemOptions {
    status: Option<ValidateStatus>,
    message: MessageOverrides,
    control: Option<ReadSignal<Option<Control>>>,
    required: bool,
    colonless: Option<bool>,
    label_align: Option<LabelAlign>,
    has_feedback: Option<bool>,
}

impl FormItemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the displayed status, ignoring every control.
    pub fn status(mut self, status: ValidateStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets message overrides. A bare message applies to `invalid`.
    pub fn message(mut self, message: impl Into<MessageOverrides>) -> Self {
        self.message = message.into();
        self
    }

    /// Binds the item's own control, which takes precedence over children.
    pub fn control(mut self, control: Control) -> Self {
        self.control = Some(ReadSignal::constant(Some(control)));
        self
    }

    /// Binds a reactive own-control reference.
    pub fn control_ref(mut self, control: impl Into<ReadSignal<Option<Control>>>) -> Self {
        self.control = Some(control.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn colonless(mut self, colonless: bool) -> Self {
        self.colonless = Some(colonless);
        self
    }

    pub fn label_align(mut self, align: LabelAlign) -> Self {
        self.label_align = Some(align);
        self
    }

    pub fn has_feedback(mut self, has_feedback: bool) -> Self {
        self.has_feedback = Some(has_feedback);
        self
    }
}

impl From<&FormItemConfig> for FormItemOptions {
    fn from(config: &FormItemConfig) -> Self {
        Self {
            status: config.status,
            message: config
                .message
                .as_ref()
                .map(MessageOverrides::from)
                .unwrap_or_default(),
            control: None,
            required: config.required,
            colonless: config.colonless,
            label_align: config.label_align,
            has_feedback: config.has_feedback,
        }
    }
}

impl From<FormItemConfig> for FormItemOptions {
    fn from(config: FormItemConfig) -> Self {
        Self::from(&config)
    }
}

/// A form item: the container that displays one control's validation state.
pub struct FormItem {
    registry: ControlRegistry,
    effective: EffectiveControl,
    status_override: Signal<Option<ValidateStatus>>,
    messages: Signal<MessageOverrides>,
    status: Computed<Option<ValidateStatus>>,
    message: Computed<Option<String>>,
    status_icon: Computed<Option<&'static str>>,
    locale: LocaleProvider,
    label: LabelConfig,
    has_feedback: bool,
}

impl FormItem {
    /// Creates an item inside `scope`.
    pub fn new(options: FormItemOptions, scope: &FormScope) -> Self {
        let registry = ControlRegistry::new();
        let own = options
            .control
            .unwrap_or_else(|| ReadSignal::constant(None));
        let effective = EffectiveControl::new(own, registry.active_control());

        let status_override = Signal::new(options.status);
        let messages = Signal::new(options.message);
        let locale = scope.locale().clone();

        let status = status::derive_status(status_override.read_only(), effective.signal());
        let message = message::derive_message(
            messages.read_only(),
            status.read_only(),
            effective.signal(),
            locale.signal(),
        );

        let has_feedback = options.has_feedback.unwrap_or_else(|| scope.has_feedback());
        let status_icon = {
            let status = status.read_only();
            Computed::new(move || {
                if has_feedback {
                    status.get().map(ValidateStatus::icon)
                } else {
                    None
                }
            })
        };

        let label = LabelConfig {
            colonless: options.colonless.unwrap_or_else(|| scope.colonless()),
            align: options.label_align.unwrap_or_else(|| scope.label_align()),
            required: options.required,
        };

        Self {
            registry,
            effective,
            status_override,
            messages,
            status,
            message,
            status_icon,
            locale,
            label,
            has_feedback,
        }
    }

    /// Creates an item from declarative configuration.
    pub fn from_config(config: &FormItemConfig, scope: &FormScope) -> Self {
        Self::new(FormItemOptions::from(config), scope)
    }

    /// The registry descendants register their controls with.
    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    /// Registers a descendant control. See [`ControlRegistry::register`].
    pub fn register(&self, key: impl Into<ControlKey>, control: &ReadSignal<Option<Control>>) {
        self.registry.register(key, control);
    }

    /// Unregisters a descendant control. See [`ControlRegistry::unregister`].
    pub fn unregister(&self, key: impl Into<ControlKey>) {
        self.registry.unregister(key);
    }

    /// The control this item displays.
    pub fn effective_control(&self) -> ReadSignal<Option<Control>> {
        self.effective.signal()
    }

    /// The displayed validation status.
    pub fn status(&self) -> ReadSignal<Option<ValidateStatus>> {
        self.status.read_only()
    }

    /// The displayed message.
    pub fn message(&self) -> ReadSignal<Option<String>> {
        self.message.read_only()
    }

    /// Icon name for the displayed status; always `None` without feedback.
    pub fn status_icon(&self) -> ReadSignal<Option<&'static str>> {
        self.status_icon.read_only()
    }

    /// Replaces the status override. `None` returns to the control's status.
    pub fn set_status_override(&self, status: Option<ValidateStatus>) {
        self.status_override.set_if_changed(status);
    }

    /// Replaces the message overrides.
    pub fn set_message(&self, message: impl Into<MessageOverrides>) {
        self.messages.set(message.into());
    }

    pub fn locale(&self) -> &LocaleProvider {
        &self.locale
    }

    pub fn label(&self) -> LabelConfig {
        self.label
    }

    pub fn has_feedback(&self) -> bool {
        self.has_feedback
    }
}

impl std::fmt::Debug for FormItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormItem")
            .field("status", &self.status.get_untracked())
            .field("message", &self.message.get_untracked())
            .field("registry", &self.registry)
            .field("label", &self.label)
            .field("has_feedback", &self.has_feedback)
            .finish_non_exhaustive()
    }
}
