use std::{cell::Cell, rc::Rc};

use dev_console::{key_action, ConsoleAction, ConsoleOptions, DevConsole, ParamKind, Value};
use pretty_assertions::assert_eq;

fn opened(options: ConsoleOptions) -> DevConsole {
    let mut console = DevConsole::new(options);
    console.show(true);
    console.transcript().clear();
    console
}

fn press(console: &mut DevConsole, key: &str) {
    let action = key_action(key).unwrap_or_else(|| panic!("unmapped key {key:?}"));
    console.handle_action(action);
}

fn type_and_submit(console: &mut DevConsole, line: &str) {
    console.set_text(line);
    press(console, "Enter");
}

#[test]
fn submitted_lines_are_echoed_and_remembered() {
    let mut console = opened(ConsoleOptions::default());
    type_and_submit(&mut console, "print(hi, 1)");
    assert_eq!(console.transcript().texts(), vec!["> print(hi, 1)", "hi"]);
    assert_eq!(console.text(), "");
    assert_eq!(console.history().entries().collect::<Vec<_>>(), vec!["print(hi, 1)"]);

    type_and_submit(&mut console, "print(hi, 1)");
    assert_eq!(console.history().len(), 1);
}

#[test]
fn history_navigation_restores_the_draft() {
    let mut console = opened(ConsoleOptions::default());
    type_and_submit(&mut console, "print(a, 1)");
    type_and_submit(&mut console, "print(b, 1)");

    console.set_text("pri");
    press(&mut console, "ArrowUp");
    assert_eq!(console.text(), "print(b, 1)");
    press(&mut console, "ArrowUp");
    assert_eq!(console.text(), "print(a, 1)");
    press(&mut console, "ArrowUp");
    assert_eq!(console.text(), "print(a, 1)");
    press(&mut console, "ArrowDown");
    press(&mut console, "ArrowDown");
    assert_eq!(console.text(), "pri");
}

#[test]
fn history_capacity_evicts_the_oldest_line() {
    let mut console = opened(ConsoleOptions {
        history_size: 2,
        ..ConsoleOptions::default()
    });
    for line in ["print(a, 0)", "print(b, 0)", "print(c, 0)"] {
        type_and_submit(&mut console, line);
    }
    assert_eq!(
        console.history().entries().collect::<Vec<_>>(),
        vec!["print(c, 0)", "print(b, 0)"]
    );
}

#[test]
fn tab_switches_arrows_to_suggestions() {
    let mut console = opened(ConsoleOptions::default());
    console
        .register_direct("heal", "", None, vec![ParamKind::Int], |_| Ok(Value::Nil))
        .expect("register");

    console.set_text("He");
    let names = console
        .suggestions()
        .into_iter()
        .map(|entry| entry.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["help", "heal"]);

    press(&mut console, "Tab");
    assert!(console.suggestions()[0].selected);
    press(&mut console, "ArrowUp");
    assert!(console.suggestions()[1].selected);
    assert_eq!(console.text(), "He");

    press(&mut console, "Enter");
    assert_eq!(console.text(), "heal");
    assert!(console.transcript().lines().is_empty());
}

#[test]
fn enter_completes_nested_partial_tokens() {
    let mut console = opened(ConsoleOptions {
        always_autocomplete: true,
        ..ConsoleOptions::default()
    });
    console.set_text("print(cl");
    press(&mut console, "Enter");
    assert_eq!(console.text(), "print(clear");
    assert_eq!(console.suggestions()[0].matched_len, 5);
}

#[test]
fn exact_input_executes_instead_of_completing() {
    let mut console = opened(ConsoleOptions {
        always_autocomplete: true,
        ..ConsoleOptions::default()
    });
    let ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran);
    console
        .register_action("help_me", "", None, move || flag.set(true))
        .expect("register");

    console.set_text("help_me");
    assert!(console.suggestions_visible());
    press(&mut console, "Enter");
    assert!(ran.get());
    assert_eq!(console.transcript().texts()[0], "> help_me");
}

#[test]
fn without_autocomplete_enter_runs_the_typed_line() {
    let mut console = opened(ConsoleOptions::default());
    console.set_text("hel");
    press(&mut console, "Enter");
    assert_eq!(console.text(), "");
    assert_eq!(
        console.transcript().texts(),
        vec![
            "> hel",
            "Command \"hel\" was not implemented. Type \"help\" for a list of implemented commands."
        ]
    );
}

#[test]
fn opening_schedules_a_single_scroll() {
    let mut console = DevConsole::new(ConsoleOptions::default());
    console.end_frame();
    let opened_count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&opened_count);
    console.on_open(move || counter.set(counter.get() + 1));

    press(&mut console, "`");
    assert!(console.is_open());
    assert_eq!(opened_count.get(), 1);
    console.transcript().info("one");
    console.transcript().info("two");
    assert!(console.end_frame());
    assert!(!console.end_frame());

    press(&mut console, "Backquote");
    assert!(!console.is_open());
    assert!(!console.handle_action(ConsoleAction::Up));
}
