//! Validation errors and their message sources.
//!
//! A control's errors are an insertion-ordered map from error kind (such as
//! `"required"` or `"maxLength"`) to a [`ValidateError`]. Each error may carry
//! a message in one of several shapes, modeled as [`ErrorMessage`]:
//!
//! | Variant | Produces |
//! |---------|----------|
//! | `Literal` | The string itself |
//! | `Computed` | The result of a function of the error context |
//! | `Template` | A minijinja template rendered with the error context |
//! | `Localized` | The entry for the current locale's type key |
//!
//! The order of the map is the order the validator inserted errors. Message
//! lookup never reorders or ranks them.

use indexmap::IndexMap;
use minijinja::Environment;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

use crate::locale::Locale;

/// Context fields of an error, everything except its message.
pub type ErrorContext = serde_json::Map<String, Value>;

/// A message formatter invoked with the error context.
pub type MessageFn = Rc<dyn Fn(&ErrorContext) -> String>;

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(Environment::new);

fn render_template(source: &str, context: &ErrorContext) -> Option<String> {
    match TEMPLATES.render_str(source, context) {
        Ok(rendered) => Some(rendered),
        Err(err) => {
            tracing::warn!(template = source, error = %err, "failed to render error message template");
            None
        }
    }
}

/// The message for one locale inside [`ErrorMessage::Localized`].
#[derive(Clone)]
pub enum LocalizedMessage {
    Literal(String),
    Computed(MessageFn),
    Template(String),
}

impl LocalizedMessage {
    /// Wraps a formatter function.
    pub fn computed(f: impl Fn(&ErrorContext) -> String + 'static) -> Self {
        LocalizedMessage::Computed(Rc::new(f))
    }

    /// Wraps a minijinja template source.
    pub fn template(source: impl Into<String>) -> Self {
        LocalizedMessage::Template(source.into())
    }

    fn resolve(&self, context: &ErrorContext) -> Option<String> {
        match self {
            LocalizedMessage::Literal(text) => Some(text.clone()),
            LocalizedMessage::Computed(format) => Some(format(context)),
            LocalizedMessage::Template(source) => render_template(source, context),
        }
    }
}

impl From<&str> for LocalizedMessage {
    fn from(text: &str) -> Self {
        LocalizedMessage::Literal(text.to_string())
    }
}

impl From<String> for LocalizedMessage {
    fn from(text: String) -> Self {
        LocalizedMessage::Literal(text)
    }
}

impl fmt::Debug for LocalizedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalizedMessage::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            LocalizedMessage::Computed(_) => f.write_str("Computed(<fn>)"),
            LocalizedMessage::Template(source) => f.debug_tuple("Template").field(source).finish(),
        }
    }
}

/// The message attached to a validation error.
#[derive(Clone)]
pub enum ErrorMessage {
    Literal(String),
    Computed(MessageFn),
    Template(String),
    /// Messages keyed by locale type.
    Localized(IndexMap<String, LocalizedMessage>),
}

impl ErrorMessage {
    /// Wraps a formatter function.
    pub fn computed(f: impl Fn(&ErrorContext) -> String + 'static) -> Self {
        ErrorMessage::Computed(Rc::new(f))
    }

    /// Wraps a minijinja template source.
    pub fn template(source: impl Into<String>) -> Self {
        ErrorMessage::Template(source.into())
    }

    /// Builds a locale-keyed message.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fieldmark::ErrorMessage;
    ///
    /// let message = ErrorMessage::localized([
    ///     ("en", "Required field"),
    ///     ("fr", "Champ requis"),
    /// ]);
    /// ```
    pub fn localized<K, M>(entries: impl IntoIterator<Item = (K, M)>) -> Self
    where
        K: Into<String>,
        M: Into<LocalizedMessage>,
    {
        ErrorMessage::Localized(
            entries
                .into_iter()
                .map(|(kind, message)| (kind.into(), message.into()))
                .collect(),
        )
    }

    /// Produces the message text for `locale`.
    ///
    /// Returns `None` when a localized message has no entry for the locale's
    /// type, or when a template fails to render.
    pub fn resolve(&self, context: &ErrorContext, locale: &Locale) -> Option<String> {
        match self {
            ErrorMessage::Literal(text) => Some(text.clone()),
            ErrorMessage::Computed(format) => Some(format(context)),
            ErrorMessage::Template(source) => render_template(source, context),
            ErrorMessage::Localized(by_locale) => match by_locale.get(locale.kind()) {
                Some(message) => message.resolve(context),
                None => {
                    tracing::trace!(locale = locale.kind(), "no message for locale");
                    None
                }
            },
        }
    }
}

impl From<&str> for ErrorMessage {
    fn from(text: &str) -> Self {
        ErrorMessage::Literal(text.to_string())
    }
}

impl From<String> for ErrorMessage {
    fn from(text: String) -> Self {
        ErrorMessage::Literal(text)
    }
}

impl fmt::Debug for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMessage::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            ErrorMessage::Computed(_) => f.write_str("Computed(<fn>)"),
            ErrorMessage::Template(source) => f.debug_tuple("Template").field(source).finish(),
            ErrorMessage::Localized(map) => f.debug_tuple("Localized").field(map).finish(),
        }
    }
}

/// A single validation failure: an optional message plus context fields.
#[derive(Debug, Clone, Default)]
pub struct ValidateError {
    message: Option<ErrorMessage>,
    context: ErrorContext,
}

impl ValidateError {
    /// An error without a message.
    pub fn new() -> Self {
        Self::default()
    }

    /// An error with the given message.
    pub fn with_message(message: impl Into<ErrorMessage>) -> Self {
        Self {
            message: Some(message.into()),
            context: ErrorContext::new(),
        }
    }

    /// Adds a context field passed to formatters and templates.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn message(&self) -> Option<&ErrorMessage> {
        self.message.as_ref()
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }
}

/// Insertion-ordered validation errors of a control.
#[derive(Debug, Clone, Default)]
pub struct ValidateErrors {
    entries: IndexMap<String, ValidateError>,
}

impl ValidateErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error, returning the updated set for chaining.
    ///
    /// Re-inserting an existing kind replaces its error but keeps its position.
    pub fn with(mut self, kind: impl Into<String>, error: ValidateError) -> Self {
        self.insert(kind, error);
        self
    }

    /// Appends an error. Re-inserting an existing kind keeps its position.
    pub fn insert(&mut self, kind: impl Into<String>, error: ValidateError) {
        self.entries.insert(kind.into(), error);
    }

    /// Removes an error, preserving the order of the rest.
    pub fn remove(&mut self, kind: &str) -> Option<ValidateError> {
        self.entries.shift_remove(kind)
    }

    pub fn get(&self, kind: &str) -> Option<&ValidateError> {
        self.entries.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Error kinds in insertion order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidateError)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Message of the first error, in insertion order, that carries one.
    ///
    /// An empty literal does not count as a message. Only the first error
    /// carrying one is consulted: if its message does not resolve for
    /// `locale`, the result is `None` even when later errors have messages.
    pub fn first_message(&self, locale: &Locale) -> Option<String> {
        let (kind, error, message) =
            self.entries.iter().find_map(|(kind, error)| match &error.message {
                Some(ErrorMessage::Literal(text)) if text.is_empty() => None,
                Some(message) => Some((kind, error, message)),
                None => None,
            })?;
        let resolved = message.resolve(&error.context, locale);
        if resolved.is_none() {
            tracing::trace!(kind = kind.as_str(), locale = locale.kind(), "error message unresolved");
        }
        resolved
    }
}

impl<K: Into<String>> FromIterator<(K, ValidateError)> for ValidateErrors {
    fn from_iter<I: IntoIterator<Item = (K, ValidateError)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn en() -> Locale {
        Locale::new("en")
    }

    #[test]
    fn test_first_message_skips_errors_without_message() {
        let errors = ValidateErrors::new()
            .with("required", ValidateError::new())
            .with("maxLength", ValidateError::with_message("too long"))
            .with("pattern", ValidateError::with_message("bad format"));

        assert_eq!(errors.first_message(&en()), Some("too long".to_string()));
    }

    #[test]
    fn test_first_message_skips_empty_literal() {
        let errors = ValidateErrors::new()
            .with("custom", ValidateError::with_message(""))
            .with("maxLength", ValidateError::with_message("too long"));

        assert_eq!(errors.first_message(&en()), Some("too long".to_string()));
    }

    #[test]
    fn test_first_message_keeps_insertion_order() {
        let errors: ValidateErrors = vec![
            ("z", ValidateError::with_message("last letter")),
            ("a", ValidateError::with_message("first letter")),
        ]
        .into_iter()
        .collect();

        assert_eq!(errors.kinds().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(errors.first_message(&en()), Some("last letter".to_string()));
    }

    #[test]
    fn test_computed_message_receives_context() {
        let error = ValidateError::with_message(ErrorMessage::computed(|ctx| {
            format!("at least {} characters", ctx["min"])
        }))
        .with("min", 8);
        let errors = ValidateErrors::new().with("minLength", error);

        assert_eq!(
            errors.first_message(&en()),
            Some("at least 8 characters".to_string())
        );
    }

    #[test]
    fn test_template_message_renders_context() {
        let error = ValidateError::with_message(ErrorMessage::template(
            "between {{ min }} and {{ max }}",
        ))
        .with("min", 1)
        .with("max", json!(5));

        let message = error.message().unwrap().resolve(error.context(), &en());
        assert_eq!(message, Some("between 1 and 5".to_string()));
    }

    #[test]
    fn test_broken_template_resolves_to_none() {
        let message = ErrorMessage::template("{{ unclosed");
        assert_eq!(message.resolve(&ErrorContext::new(), &en()), None);
    }

    #[test]
    fn test_localized_message_lookup() {
        let message = ErrorMessage::localized([("en", "Required field"), ("fr", "Champ requis")]);
        let ctx = ErrorContext::new();

        assert_eq!(
            message.resolve(&ctx, &Locale::new("fr")),
            Some("Champ requis".to_string())
        );
        assert_eq!(
            message.resolve(&ctx, &en()),
            Some("Required field".to_string())
        );
    }

    #[test]
    fn test_localized_missing_locale_is_none_not_empty() {
        let errors = ValidateErrors::new()
            .with(
                "required",
                ValidateError::with_message(ErrorMessage::localized([("en", "Required")])),
            )
            .with("other", ValidateError::with_message("fallback"));

        assert_eq!(errors.first_message(&Locale::new("de")), None);
    }

    #[test]
    fn test_localized_computed_entry() {
        let message = ErrorMessage::localized([(
            "en",
            LocalizedMessage::computed(|ctx| format!("max {}", ctx["max"])),
        )]);
        let mut ctx = ErrorContext::new();
        ctx.insert("max".into(), json!(3));

        assert_eq!(message.resolve(&ctx, &en()), Some("max 3".to_string()));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut errors = ValidateErrors::new()
            .with("a", ValidateError::new())
            .with("b", ValidateError::new())
            .with("c", ValidateError::new());
        errors.remove("a");

        assert_eq!(errors.kinds().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(errors.len(), 2);
        assert!(!errors.contains("a"));
    }

    #[test]
    fn test_empty_errors_have_no_message() {
        assert!(ValidateErrors::new().is_empty());
        assert_eq!(ValidateErrors::new().first_message(&en()), None);
    }
}
