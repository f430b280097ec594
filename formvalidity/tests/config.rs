use std::time::Duration;

use formdom::{Document, Element, NodeId};
use formvalidity::{
    ConfigError, ErrorDisplay, FieldOverride, FormOverride, NotifyPolicy, OverrideMode,
    Validation, ValidityConfig,
};
use serde_json::json;

fn setup() -> (Document, Validation, NodeId, NodeId) {
    let mut doc = Document::new();
    let form = doc.mount(
        Element::form().child(Element::input("text").id("user").name("user").value("jane")),
    );
    let mut validation = Validation::default();
    validation.sync(&mut doc);
    let user = doc.by_id("user").unwrap();
    (doc, validation, form, user)
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_defaults() {
    let config = ValidityConfig::default();
    assert_eq!(config.messages.required, "field is required");
    assert_eq!(config.messages.pattern, "illegal value format");
    assert_eq!(config.notify, NotifyPolicy::OnTransition);
    assert_eq!(config.overrides, OverrideMode::Replace);
    assert_eq!(config.tooltip.display, ErrorDisplay::Below);
    assert_eq!(config.tooltip.stagger, Duration::from_millis(100));
    assert_eq!(config.tooltip.refresh_delay, Duration::from_millis(100));
}

#[test]
fn test_from_json_keeps_missing_defaults() {
    let config = ValidityConfig::from_json(
        r#"{
            "messages": { "required": "obligatoire" },
            "notify": "every_invalid_check",
            "overrides": "merge",
            "tooltip": { "display": "inline", "stagger_ms": 250 }
        }"#,
    )
    .unwrap();

    assert_eq!(config.messages.required, "obligatoire");
    assert_eq!(config.messages.email, "should be a valid email");
    assert_eq!(config.notify, NotifyPolicy::EveryInvalidCheck);
    assert_eq!(config.overrides, OverrideMode::Merge);
    assert_eq!(config.tooltip.display, ErrorDisplay::Inline);
    assert_eq!(config.tooltip.stagger, Duration::from_millis(250));
    assert_eq!(config.tooltip.refresh_delay, Duration::from_millis(100));
}

#[test]
fn test_from_json_rejects_malformed_input() {
    assert!(matches!(
        ValidityConfig::from_json("{ not json"),
        Err(ConfigError::Json(_))
    ));
    assert!(matches!(
        ValidityConfig::from_json(r#"{ "notify": "sometimes" }"#),
        Err(ConfigError::Json(_))
    ));
}

// ============================================================================
// Dynamic overrides
// ============================================================================

#[test]
fn test_field_override_from_json_shapes() {
    assert!(FieldOverride::from_json(json!(null)).unwrap().is_none());
    assert!(matches!(
        FieldOverride::from_json(json!("taken")).unwrap(),
        Some(FieldOverride::Errors(errors)) if errors == ["taken"]
    ));
    assert!(matches!(
        FieldOverride::from_json(json!(["a", "b"])).unwrap(),
        Some(FieldOverride::Errors(errors)) if errors == ["a", "b"]
    ));

    for bad in [json!(42), json!(true), json!({ "a": "b" }), json!(["a", 1])] {
        let err = FieldOverride::from_json(bad).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { scope: "field", .. }));
    }
}

#[test]
fn test_form_override_from_json_shapes() {
    assert!(FormOverride::from_json(json!(null)).unwrap().is_none());

    let Some(FormOverride::Errors(errors)) =
        FormOverride::from_json(json!({ "user": "taken", "coupon": ["expired", "unknown"] }))
            .unwrap()
    else {
        panic!("expected static errors");
    };
    assert!(errors.form.is_empty());
    assert_eq!(errors.fields["user"], ["taken"]);
    assert_eq!(errors.fields["coupon"], ["expired", "unknown"]);

    let Some(FormOverride::Errors(errors)) =
        FormOverride::from_json(json!("server down")).unwrap()
    else {
        panic!("expected static errors");
    };
    assert_eq!(errors.form, ["server down"]);

    let err = FormOverride::from_json(json!({ "user": { "nested": true } })).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidOverride { scope: "form", .. }));
    assert!(err.to_string().contains("field 'user'"));
}

#[test]
fn test_json_overrides_on_engine() {
    let (doc, mut validation, form, user) = setup();

    validation.set_field_errors_json(user, json!("taken")).unwrap();
    assert_eq!(validation.field_errors(&doc, user), vec!["taken"]);
    validation.set_field_errors_json(user, json!(null)).unwrap();
    assert!(validation.field_errors(&doc, user).is_empty());

    validation
        .set_form_errors_json(form, json!({ "user": ["taken"], "coupon": "expired" }))
        .unwrap();
    let aggregate = validation.form_errors(&doc, form);
    assert_eq!(aggregate.names().collect::<Vec<_>>(), vec!["user", "coupon"]);

    validation.set_form_errors_json(form, json!(null)).unwrap();
    assert!(validation.form_errors(&doc, form).is_valid());
}

#[test]
fn test_rejected_json_keeps_previous_override() {
    let (doc, mut validation, _, user) = setup();

    validation.set_field_errors(user, "taken").unwrap();
    assert!(validation.set_field_errors_json(user, json!(7)).is_err());
    assert_eq!(validation.field_errors(&doc, user), vec!["taken"]);
}

#[test]
fn test_json_override_on_wrong_node_kind() {
    let (_, mut validation, form, user) = setup();

    assert!(matches!(
        validation.set_form_errors_json(user, json!("x")),
        Err(ConfigError::NotAttached { scope: "form", .. })
    ));
    assert!(matches!(
        validation.set_field_errors_json(form, json!("x")),
        Err(ConfigError::NotAttached { scope: "field", .. })
    ));
}
