use std::fs::File;

use formvalidity::prelude::*;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};

// ============================================================================
// Sign-up form
// ============================================================================

fn signup_form() -> Element {
    Element::form().id("signup").children([
        Element::input("text")
            .id("username")
            .name("username")
            .required()
            .attr("pattern", "[a-z0-9_]{3,16}")
            .attr("title", "3-16 lowercase letters, digits or underscores")
            .attr("maxlength", "16"),
        Element::input("email").id("email").name("email").required(),
        Element::input("tel").id("phone").name("phone"),
        Element::input("radio").name("plan").value("free"),
        Element::input("radio").id("plan-pro").name("plan").value("pro").required(),
        Element::input("checkbox").id("terms").name("terms").required(),
        Element::button("submit").id("submit"),
    ])
}

fn no_admin(dom: &dyn Dom, node: NodeId) -> Option<String> {
    (dom.value(node) == "admin").then(|| "this username is reserved".to_string())
}

formvalidity::inventory::submit! {
    ValidatorRegistration::new("input[name=username]", no_admin)
}

fn print_aggregate(label: &str, aggregate: &Aggregate) {
    println!("{label}: {} error(s)", aggregate.len());
    for entry in aggregate.fields() {
        println!("  {:<10} {}", entry.name, entry.errors.join("; "));
    }
}

fn main() -> Result<(), ConfigError> {
    // Initialize file logging
    if let Ok(log_file) = File::create("signup.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file);
    }

    let mut doc = Document::new();
    let form = doc.mount(signup_form());

    let mut validation = Validation::new(ValidityConfig::default())
        .with_validators(ValidatorRegistry::from_inventory()?);
    validation.sync(&mut doc);

    validation.on(None, |notification| {
        println!("-> {notification}");
        Flow::Continue
    });

    // Empty submit: everything required fails at once.
    let flow = validation.handle_event(&mut doc, &Event::Submit { target: form });
    print_aggregate("first submit", &validation.form_errors(&doc, form));
    println!("submit cancelled: {}", flow.is_cancel());

    // Fill the form in.
    let fill = [("username", "admin"), ("email", "jane@example.org"), ("phone", "555 123 4567")];
    for (id, value) in fill {
        if let Some(node) = doc.by_id(id) {
            doc.set_value(node, value);
            validation.handle_event(&mut doc, &Event::Input { target: node });
        }
    }
    for id in ["terms", "plan-pro"] {
        if let Some(node) = doc.by_id(id) {
            doc.set_checked(node, true);
            validation.handle_event(&mut doc, &Event::Click { target: node });
        }
    }
    print_aggregate("after typing", &validation.form_errors(&doc, form));

    // The server rejects the phone number.
    validation.set_form_errors_json(
        form,
        serde_json::json!({ "phone": "number already registered" }),
    )?;
    print_aggregate("server errors", &validation.form_errors(&doc, form));

    validation.clear_form_errors(form)?;
    if let Some(username) = doc.by_id("username") {
        doc.set_value(username, "jane_doe");
        validation.handle_event(&mut doc, &Event::Change { target: username });
    }

    let flow = validation.handle_event(&mut doc, &Event::Submit { target: form });
    print_aggregate("final submit", &validation.form_errors(&doc, form));
    println!("submit cancelled: {}", flow.is_cancel());

    Ok(())
}
