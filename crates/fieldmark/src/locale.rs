//! Locales used to pick localized validation messages.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::reactive::{ReadSignal, Signal};

/// A locale identified by its type key, such as `"en"` or `"zh-CN"`.
///
/// The type key indexes [`ErrorMessage::Localized`](crate::ErrorMessage::Localized)
/// maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl Locale {
    /// Creates a locale with the given type key.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
        }
    }

    /// Sets a human readable name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The type key used for message lookup.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The human readable name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::new("en").with_name("English")
    }
}

static DEFAULT_LOCALE: Lazy<Mutex<Locale>> = Lazy::new(|| Mutex::new(Locale::default()));

/// Overrides the process-wide locale used by scopes that do not supply one.
///
/// Items read the default when they are created; changing it later does not
/// affect existing items. Use a [`LocaleProvider`] for live switching.
pub fn set_default_locale(locale: Locale) {
    let mut guard = DEFAULT_LOCALE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = locale;
}

/// Returns the process-wide default locale.
pub fn default_locale() -> Locale {
    DEFAULT_LOCALE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Reactive source of the current locale.
///
/// Cloning yields another handle to the same locale cell, so switching the
/// locale through any handle recomputes every message that depends on it.
#[derive(Debug, Clone)]
pub struct LocaleProvider {
    current: Signal<Locale>,
}

impl LocaleProvider {
    /// Creates a provider starting at `locale`.
    pub fn new(locale: Locale) -> Self {
        Self {
            current: Signal::new(locale),
        }
    }

    /// Creates a provider starting at the process-wide default.
    pub fn from_default() -> Self {
        Self::new(default_locale())
    }

    /// Returns the current locale, recording a dependency.
    pub fn current(&self) -> Locale {
        self.current.get()
    }

    /// Switches the current locale.
    pub fn set(&self, locale: Locale) {
        let kind = locale.kind().to_string();
        if self.current.set_if_changed(locale) {
            tracing::debug!(locale = %kind, "locale switched");
        }
    }

    /// Read-only view of the current locale.
    pub fn signal(&self) -> ReadSignal<Locale> {
        self.current.read_only()
    }
}

impl Default for LocaleProvider {
    fn default() -> Self {
        Self::from_default()
    }
}
