use std::sync::{Arc, Mutex};
use std::time::Duration;

use formdom::{Align, Document, Element, Event, NodeId, Placement};
use formvalidity::extension::{Behavior, Extension};
use formvalidity::{
    ConfigError, Dom, ErrorDisplay, Flow, Notification, NotifyPolicy, Validation, ValidityConfig,
};

type Log = Arc<Mutex<Vec<Notification>>>;

fn setup(form: Element, config: ValidityConfig) -> (Document, Validation, NodeId) {
    let mut doc = Document::new();
    let form = doc.mount(form);
    let mut validation = Validation::new(config);
    validation.sync(&mut doc);
    (doc, validation, form)
}

fn node(doc: &Document, id: &str) -> NodeId {
    doc.by_id(id).unwrap()
}

fn record(validation: &mut Validation, target: Option<NodeId>, flow: Flow) -> Log {
    let log = Log::default();
    let sink = Arc::clone(&log);
    validation.on(target, move |notification| {
        sink.lock().unwrap().push(notification.clone());
        flow
    });
    log
}

fn taken(log: &Log) -> Vec<Notification> {
    std::mem::take(&mut *log.lock().unwrap())
}

fn signup_form() -> Element {
    Element::form().children([
        Element::input("text").id("username").name("username").required(),
        Element::input("email").id("email").name("email").value("jane@example.org"),
        Element::input("tel").id("phone").name("phone").value("nope"),
        Element::input("checkbox").id("terms").name("terms").required(),
    ])
}

// ============================================================================
// Field state machine
// ============================================================================

#[test]
fn test_report_notifies_on_transitions_only() {
    let (mut doc, mut validation, _) = setup(signup_form(), ValidityConfig::default());
    let username = node(&doc, "username");
    let log = record(&mut validation, None, Flow::Continue);

    assert_eq!(validation.report_field(&mut doc, username), vec!["field is required"]);
    assert_eq!(doc.attr(username, "aria-invalid"), Some("true"));
    validation.report_field(&mut doc, username);

    doc.set_value(username, "jane");
    assert!(validation.report_field(&mut doc, username).is_empty());
    assert_eq!(doc.attr(username, "aria-invalid"), Some("false"));
    validation.report_field(&mut doc, username);

    let notifications = taken(&log);
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0].errors().unwrap(), ["field is required"]);
    assert_eq!(notifications[1], Notification::Ok { target: username });
}

#[test]
fn test_first_valid_report_is_silent() {
    let (mut doc, mut validation, _) = setup(signup_form(), ValidityConfig::default());
    let email = node(&doc, "email");
    let log = record(&mut validation, None, Flow::Continue);

    assert!(validation.report_field(&mut doc, email).is_empty());
    assert_eq!(doc.attr(email, "aria-invalid"), Some("false"));
    assert!(taken(&log).is_empty());
}

#[test]
fn test_every_invalid_check_refires_with_refresh_delay() {
    let config = ValidityConfig::new().notify(NotifyPolicy::EveryInvalidCheck);
    let (mut doc, mut validation, _) = setup(signup_form(), config);
    let phone = node(&doc, "phone");
    let log = record(&mut validation, Some(phone), Flow::Continue);

    validation.report_field(&mut doc, phone);
    assert_eq!(doc.popover(phone).unwrap().delay, Duration::ZERO);

    doc.set_value(phone, "still nope");
    validation.report_field(&mut doc, phone);
    let popover = doc.popover(phone).unwrap();
    assert!(popover.visible);
    assert_eq!(popover.delay, Duration::from_millis(100));

    assert_eq!(taken(&log).len(), 2);
}

#[test]
fn test_novalidate_report_has_no_side_effects() {
    let (mut doc, mut validation, _) = setup(
        Element::form().child(
            Element::input("text")
                .id("nick")
                .name("nick")
                .required()
                .flag("novalidate"),
        ),
        ValidityConfig::default(),
    );
    let nick = node(&doc, "nick");
    let log = record(&mut validation, None, Flow::Continue);

    assert!(validation.report_field(&mut doc, nick).is_empty());
    assert_eq!(doc.attr(nick, "aria-invalid"), None);
    assert!(taken(&log).is_empty());
}

// ============================================================================
// DOM events
// ============================================================================

#[test]
fn test_input_before_first_check_is_silent() {
    let (mut doc, mut validation, _) = setup(signup_form(), ValidityConfig::default());
    let phone = node(&doc, "phone");
    let log = record(&mut validation, None, Flow::Continue);

    let flow = validation.handle_event(&mut doc, &Event::Input { target: phone });
    assert_eq!(flow, Flow::Continue);
    assert_eq!(doc.attr(phone, "aria-invalid"), None);
    assert!(taken(&log).is_empty());
}

#[test]
fn test_input_after_change_revalidates() {
    let (mut doc, mut validation, _) = setup(signup_form(), ValidityConfig::default());
    let phone = node(&doc, "phone");
    let log = record(&mut validation, Some(phone), Flow::Continue);

    validation.handle_event(&mut doc, &Event::Change { target: phone });
    assert!(doc.popover_visible(phone));
    assert_eq!(doc.popover(phone).unwrap().content, "should be a valid phone number");

    doc.set_value(phone, "555 123 4567");
    validation.handle_event(&mut doc, &Event::Input { target: phone });
    assert!(!doc.popover_visible(phone));
    assert_eq!(doc.attr(phone, "aria-invalid"), Some("false"));

    let notifications = taken(&log);
    assert_eq!(notifications.len(), 2);
    assert!(notifications[0].is_fail());
    assert!(notifications[1].is_ok());
}

#[test]
fn test_maxlength_truncates_on_input() {
    let (mut doc, mut validation, _) = setup(
        Element::form().children([
            Element::input("text").id("code").name("code").attr("maxlength", "3"),
            Element::textarea().id("note").name("note").attr("maxlength", "2"),
        ]),
        ValidityConfig::default(),
    );
    let code = node(&doc, "code");
    let note = node(&doc, "note");

    doc.set_value(code, "abcdef");
    validation.handle_event(&mut doc, &Event::Input { target: code });
    assert_eq!(doc.value(code), "abc");

    doc.set_value(note, "héllo");
    validation.handle_event(&mut doc, &Event::Input { target: note });
    assert_eq!(doc.value(note), "hé");

    doc.set_value(code, "ab");
    validation.handle_event(&mut doc, &Event::Input { target: code });
    assert_eq!(doc.value(code), "ab");

    // counted in chars: each emoji is one unit
    doc.set_value(code, "\u{1F600}\u{1F601}\u{1F602}\u{1F603}");
    validation.handle_event(&mut doc, &Event::Input { target: code });
    assert_eq!(doc.value(code), "\u{1F600}\u{1F601}\u{1F602}");
}

#[test]
fn test_click_reports_checkbox() {
    let (mut doc, mut validation, _) = setup(signup_form(), ValidityConfig::default());
    let terms = node(&doc, "terms");
    let log = record(&mut validation, Some(terms), Flow::Continue);

    validation.handle_event(&mut doc, &Event::Click { target: terms });
    assert_eq!(doc.attr(terms, "aria-invalid"), Some("true"));

    doc.set_checked(terms, true);
    validation.handle_event(&mut doc, &Event::Click { target: terms });
    assert_eq!(doc.attr(terms, "aria-invalid"), Some("false"));

    assert_eq!(taken(&log).len(), 2);
}

#[test]
fn test_click_on_text_field_is_ignored() {
    let (mut doc, mut validation, _) = setup(signup_form(), ValidityConfig::default());
    let username = node(&doc, "username");

    validation.handle_event(&mut doc, &Event::Click { target: username });
    assert_eq!(doc.attr(username, "aria-invalid"), None);
}

#[test]
fn test_events_on_unattached_nodes_are_ignored() {
    let mut doc = Document::new();
    let mut validation = Validation::default();
    let form = doc.mount(signup_form());
    let username = node(&doc, "username");

    assert_eq!(
        validation.handle_event(&mut doc, &Event::Submit { target: form }),
        Flow::Continue
    );
    validation.handle_event(&mut doc, &Event::Change { target: username });
    assert_eq!(doc.attr(username, "aria-invalid"), None);
}

#[test]
fn test_radio_click_settles_group() {
    let (mut doc, mut validation, form) = setup(
        Element::form().children([
            Element::input("radio").id("free").name("plan").required(),
            Element::input("radio").id("pro").name("plan").required(),
        ]),
        ValidityConfig::default(),
    );
    let free = node(&doc, "free");
    let pro = node(&doc, "pro");

    validation.handle_event(&mut doc, &Event::Submit { target: form });
    assert!(doc.popover_visible(free));

    let log = record(&mut validation, Some(free), Flow::Continue);
    doc.set_checked(pro, true);
    validation.handle_event(&mut doc, &Event::Click { target: pro });

    assert_eq!(taken(&log), vec![Notification::Ok { target: free }]);
    assert!(!doc.popover_visible(free));
    assert_eq!(doc.attr(free, "aria-invalid"), Some("false"));
}

// ============================================================================
// Submit
// ============================================================================

#[test]
fn test_submit_cancels_and_fans_out() {
    let (mut doc, mut validation, form) = setup(signup_form(), ValidityConfig::default());
    let log = record(&mut validation, None, Flow::Continue);

    let flow = validation.handle_event(&mut doc, &Event::Submit { target: form });
    assert!(flow.is_cancel());

    let notifications = taken(&log);
    assert_eq!(notifications.len(), 4);
    assert_eq!(notifications[0].target(), form);
    assert_eq!(notifications[0].aggregate().unwrap().len(), 3);

    let expected = [
        ("username", "field is required", 0),
        ("phone", "should be a valid phone number", 100),
        ("terms", "field is required", 200),
    ];
    for ((id, message, delay), notification) in expected.into_iter().zip(&notifications[1..]) {
        let field = node(&doc, id);
        assert!(matches!(
            notification,
            Notification::Fail { target, batch: true, .. } if *target == field
        ));
        assert_eq!(doc.attr(field, "aria-invalid"), Some("true"));

        let popover = doc.popover(field).unwrap();
        assert!(popover.visible, "{id}");
        assert_eq!(popover.content, message);
        assert_eq!(popover.placement, Placement::Bottom);
        assert_eq!(popover.delay, Duration::from_millis(delay));
    }

    let email = node(&doc, "email");
    assert!(!doc.popover_visible(email));
    assert_eq!(doc.attr(email, "aria-invalid"), None);
}

#[test]
fn test_submit_stagger_restarts_per_batch() {
    let (mut doc, mut validation, form) = setup(signup_form(), ValidityConfig::default());

    validation.handle_event(&mut doc, &Event::Submit { target: form });
    validation.handle_event(&mut doc, &Event::Submit { target: form });

    let username = node(&doc, "username");
    assert_eq!(doc.popover(username).unwrap().delay, Duration::ZERO);
}

#[test]
fn test_cancelled_form_failure_skips_fan_out() {
    let (mut doc, mut validation, form) = setup(signup_form(), ValidityConfig::default());
    let log = record(&mut validation, None, Flow::Continue);
    record(&mut validation, Some(form), Flow::Cancel);

    let flow = validation.handle_event(&mut doc, &Event::Submit { target: form });
    assert!(flow.is_cancel());

    let notifications = taken(&log);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].target(), form);

    let username = node(&doc, "username");
    assert!(!doc.popover_visible(username));
    assert_eq!(doc.attr(username, "aria-invalid"), None);
}

#[test]
fn test_cancelled_field_failure_shows_no_popover() {
    let (mut doc, mut validation, _) = setup(signup_form(), ValidityConfig::default());
    let username = node(&doc, "username");
    record(&mut validation, Some(username), Flow::Cancel);

    validation.report_field(&mut doc, username);
    assert_eq!(doc.attr(username, "aria-invalid"), Some("true"));
    assert!(doc.popover(username).is_none());
}

#[test]
fn test_valid_submit_after_failure_emits_form_ok() {
    let (mut doc, mut validation, form) = setup(signup_form(), ValidityConfig::default());
    validation.handle_event(&mut doc, &Event::Submit { target: form });

    let log = record(&mut validation, Some(form), Flow::Continue);
    doc.set_value(node(&doc, "username"), "jane");
    doc.set_value(node(&doc, "phone"), "555 123 4567");
    doc.set_checked(node(&doc, "terms"), true);

    let flow = validation.handle_event(&mut doc, &Event::Submit { target: form });
    assert_eq!(flow, Flow::Continue);
    assert_eq!(taken(&log), vec![Notification::Ok { target: form }]);

    for id in ["username", "phone", "terms"] {
        let field = node(&doc, id);
        assert!(!doc.popover_visible(field), "{id}");
        assert_eq!(doc.attr(field, "aria-invalid"), Some("false"));
    }

    // Already valid: no second Ok.
    validation.handle_event(&mut doc, &Event::Submit { target: form });
    assert!(taken(&log).is_empty());
}

#[test]
fn test_reset_event_clears_fields() {
    let (mut doc, mut validation, form) = setup(signup_form(), ValidityConfig::default());
    validation.handle_event(&mut doc, &Event::Submit { target: form });

    let flow = validation.handle_event(&mut doc, &Event::Reset { target: form });
    assert_eq!(flow, Flow::Continue);

    let username = node(&doc, "username");
    assert_eq!(doc.attr(username, "aria-invalid"), None);
    assert!(!doc.popover_visible(username));

    // Live revalidation is off again until the next check.
    validation.handle_event(&mut doc, &Event::Input { target: username });
    assert_eq!(doc.attr(username, "aria-invalid"), None);
}

// ============================================================================
// Tooltip display modes
// ============================================================================

#[test]
fn test_error_display_none_keeps_notifications() {
    let config = ValidityConfig::new().error_display(ErrorDisplay::None);
    let (mut doc, mut validation, form) = setup(signup_form(), config);
    let log = record(&mut validation, None, Flow::Continue);

    validation.handle_event(&mut doc, &Event::Submit { target: form });
    assert_eq!(taken(&log).len(), 4);
    assert!(doc.popover(node(&doc, "username")).is_none());
}

#[test]
fn test_inline_display_placement() {
    let config = ValidityConfig::new().error_display(ErrorDisplay::Inline);
    let (mut doc, mut validation, _) = setup(signup_form(), config);
    let phone = node(&doc, "phone");

    validation.report_field(&mut doc, phone);
    let popover = doc.popover(phone).unwrap();
    assert_eq!(popover.placement, Placement::Right);
    assert_eq!(popover.align, Align::Center);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_detach_drops_state_and_listeners() {
    let (mut doc, mut validation, _) = setup(signup_form(), ValidityConfig::default());
    let username = node(&doc, "username");
    let id = validation.on(Some(username), |_| Flow::Continue);
    assert!(validation.field(username).is_some());

    doc.remove(username).unwrap();
    validation.sync(&mut doc);

    assert!(validation.field(username).is_none());
    assert!(!validation.off(id));
    assert!(matches!(
        validation.set_field_errors(username, "gone"),
        Err(ConfigError::NotAttached { .. })
    ));
}

#[test]
fn test_late_mounted_controls_attach_on_sync() {
    let (mut doc, mut validation, form) = setup(Element::form(), ValidityConfig::default());
    let extra = doc
        .append(form, Element::input("email").name("extra").value("nope"))
        .unwrap();
    assert!(validation.field(extra).is_none());

    validation.sync(&mut doc);
    assert!(validation.field(extra).is_some());
    assert!(!validation.submit_gate(&mut doc, form));
}

#[test]
fn test_off_removes_listener() {
    let (mut doc, mut validation, _) = setup(signup_form(), ValidityConfig::default());
    let username = node(&doc, "username");
    let log = Log::default();
    let sink = Arc::clone(&log);
    let id = validation.on(None, move |n| {
        sink.lock().unwrap().push(n.clone());
        Flow::Continue
    });

    assert!(validation.off(id));
    validation.report_field(&mut doc, username);
    assert!(taken(&log).is_empty());
}

#[test]
fn test_custom_extension_attaches_field_behavior() {
    let mut doc = Document::new();
    let widget = doc.mount(Element::new("div").name("rating").flag("data-field"));
    let mut validation = Validation::default().with_extension(Extension::new(
        "data-field",
        Behavior::Field,
        |dom: &dyn Dom, node| dom.has_attr(node, "data-field"),
    ));
    validation.sync(&mut doc);

    assert!(validation.field(widget).is_some());
    validation.set_field_errors(widget, "pick a rating").unwrap();
    assert_eq!(validation.report_field(&mut doc, widget), vec!["pick a rating"]);
}
