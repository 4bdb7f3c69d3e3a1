//! Reactive validation status and messages for form items.
//!
//! A form item wraps an input and shows that input's validation state: a
//! status (`valid`, `invalid`, `validating`) and a message. The item finds the
//! control to display either on itself or among its descendants, decides
//! whether the status should be visible yet given the control's trigger
//! policy, and picks the message from item overrides or the control's errors.
//!
//! # Concepts
//!
//! - [`Control`]: a value holder with `dirty`/`blurred` flags, a status and
//!   keyed [`ValidateErrors`]. Every field is reactive.
//! - [`ControlRegistry`]: where descendants register their control. The first
//!   registrant is surfaced, see the [`registry`] module for the exact rules.
//! - [`FormItem`]: derives the displayed status and message, recomputing them
//!   whenever any input changes.
//! - [`reactive`]: the single-threaded signal runtime everything is built on.
//!
//! # Example
//!
//! ```rust
//! use fieldmark::reactive::Signal;
//! use fieldmark::{
//!     Control, ErrorMessage, FormItem, FormItemOptions, FormScope, Trigger, ValidateError,
//!     ValidateErrors, ValidateStatus,
//! };
//!
//! let name = Control::new(Trigger::Blur).with_validator(|value| {
//!     let len = value.as_str().map_or(0, |s| s.chars().count());
//!     (len < 3).then(|| {
//!         ValidateErrors::new().with(
//!             "minLength",
//!             ValidateError::with_message(ErrorMessage::template(
//!                 "at least {{ min }} characters",
//!             ))
//!             .with("min", 3),
//!         )
//!     })
//! });
//!
//! let item = FormItem::new(FormItemOptions::new(), &FormScope::default());
//! let name_ref = Signal::new(Some(name.clone()));
//! item.register("name", &name_ref.read_only());
//!
//! name.set_value("Al");
//! assert_eq!(item.status().get(), None); // not blurred yet
//!
//! name.mark_blurred();
//! assert_eq!(item.status().get(), Some(ValidateStatus::Invalid));
//! assert_eq!(item.message().get().as_deref(), Some("at least 3 characters"));
//! ```
//!
//! # Configuration
//!
//! Item and form settings can be loaded from YAML or JSON, see [`config`].

pub mod config;
pub mod control;
pub mod item;
pub mod locale;
pub mod reactive;
pub mod registry;
pub mod scope;

pub use config::{ConfigError, FormItemConfig, LabelAlign, MessageConfig, ScopeConfig};
pub use control::{
    Control, ControlId, ErrorContext, ErrorMessage, LocalizedMessage, MessageFn, Trigger,
    ValidateError, ValidateErrors, ValidateStatus, Validator,
};
pub use item::{
    resolve_message, visible_status, EffectiveControl, FormItem, FormItemOptions, LabelConfig,
    MessageOverride, MessageOverrides,
};
pub use locale::{default_locale, set_default_locale, Locale, LocaleProvider};
pub use registry::{ControlKey, ControlRegistry, Registration};
pub use scope::FormScope;
