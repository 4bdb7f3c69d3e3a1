//! The form scope: defaults shared by the items of one form.

use crate::config::{LabelAlign, ScopeConfig};
use crate::locale::LocaleProvider;

/// Form-level settings passed explicitly to each [`FormItem`](crate::FormItem).
///
/// Items read layout defaults from their scope when their own configuration
/// leaves a setting unset, and share the scope's locale provider. A
/// standalone item uses [`FormScope::default`].
#[derive(Debug, Clone, Default)]
pub struct FormScope {
    config: ScopeConfig,
    locale: LocaleProvider,
}

impl FormScope {
    /// Creates a scope from configuration.
    ///
    /// The locale starts at `config.locale`, or the process-wide default.
    pub fn new(config: ScopeConfig) -> Self {
        let locale = match &config.locale {
            Some(locale) => LocaleProvider::new(locale.clone()),
            None => LocaleProvider::from_default(),
        };
        Self { config, locale }
    }

    /// Shares an existing locale provider, for example one owned by the app.
    pub fn with_locale(mut self, locale: LocaleProvider) -> Self {
        self.locale = locale;
        self
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    pub fn locale(&self) -> &LocaleProvider {
        &self.locale
    }

    pub fn colonless(&self) -> bool {
        self.config.colonless
    }

    pub fn label_align(&self) -> LabelAlign {
        self.config.label_align
    }

    pub fn has_feedback(&self) -> bool {
        self.config.has_feedback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;

    #[test]
    fn test_scope_uses_configured_locale() {
        let scope = FormScope::new(ScopeConfig {
            locale: Some(Locale::new("fr")),
            ..ScopeConfig::default()
        });
        assert_eq!(scope.locale().current().kind(), "fr");
    }

    #[test]
    fn test_scope_shares_provider() {
        let provider = LocaleProvider::new(Locale::new("en"));
        let scope = FormScope::default().with_locale(provider.clone());

        provider.set(Locale::new("fr"));
        assert_eq!(scope.locale().current().kind(), "fr");
    }

    #[test]
    fn test_scope_defaults() {
        let scope = FormScope::default();
        assert!(!scope.colonless());
        assert!(!scope.has_feedback());
        assert_eq!(scope.label_align(), LabelAlign::End);
    }
}
