use fieldmark::reactive::Signal;
use fieldmark::{
    default_locale, set_default_locale, ConfigError, Control, ErrorMessage, FormItem,
    FormItemConfig, FormScope, LabelAlign, Locale, ScopeConfig, Trigger, ValidateError,
    ValidateErrors, ValidateStatus,
};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_item_from_yaml_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "email.yaml",
        r#"
message:
  invalid: "Please enter a valid email"
  validating: "Checking..."
required: true
has_feedback: true
"#,
    );

    let config = FormItemConfig::from_path(&path).unwrap();
    let item = FormItem::from_config(&config, &FormScope::default());
    assert!(item.label().required);
    assert!(item.has_feedback());

    let email = Control::new(Trigger::Change);
    let email_ref = Signal::new(Some(email.clone()));
    item.register("email", &email_ref.read_only());
    email.set_value("nope");
    email.set_validation(
        Some(ValidateStatus::Invalid),
        Some(ValidateErrors::new().with("format", ValidateError::with_message("raw"))),
    );

    assert_eq!(
        item.message().get().as_deref(),
        Some("Please enter a valid email")
    );
    assert_eq!(item.status_icon().get(), Some("close-circle-filled"));
}

#[test]
fn test_scope_from_json_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "form.json",
        r#"{"colonless": true, "label_align": "start", "locale": {"type": "fr", "name": "Français"}}"#,
    );

    let scope = FormScope::new(ScopeConfig::from_path(&path).unwrap());
    assert!(scope.colonless());
    assert_eq!(scope.label_align(), LabelAlign::Start);
    assert_eq!(scope.locale().current().name(), Some("Français"));

    let item = FormItem::from_config(&FormItemConfig::default(), &scope);
    assert!(item.label().colonless);
    assert_eq!(item.label().align, LabelAlign::Start);
}

#[test]
fn test_malformed_yaml_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.yml", "message: [unclosed");

    let err = FormItemConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
    assert!(err.to_string().starts_with("invalid YAML config"));
}

#[test]
fn test_unknown_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "form.toml", "colonless = true");

    let err = ScopeConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
}

#[test]
#[serial]
fn test_scope_without_locale_uses_process_default() {
    let previous = default_locale();
    set_default_locale(Locale::new("fr"));

    let control = Control::new(Trigger::Change);
    control.set_value("");
    control.set_validation(
        Some(ValidateStatus::Invalid),
        Some(ValidateErrors::new().with(
            "required",
            ValidateError::with_message(ErrorMessage::localized([
                ("en", "Required field"),
                ("fr", "Champ requis"),
            ])),
        )),
    );
    let scope = FormScope::new(ScopeConfig::default());
    let item = FormItem::new(fieldmark::FormItemOptions::new().control(control), &scope);
    assert_eq!(item.message().get().as_deref(), Some("Champ requis"));

    set_default_locale(previous);
}

#[test]
#[serial]
fn test_default_locale_does_not_affect_existing_scopes() {
    let previous = default_locale();
    let scope = FormScope::new(ScopeConfig::default());
    let kind = scope.locale().current().kind().to_string();

    set_default_locale(Locale::new("zz"));
    assert_eq!(scope.locale().current().kind(), kind);
    assert_eq!(default_locale().kind(), "zz");

    set_default_locale(previous);
}
