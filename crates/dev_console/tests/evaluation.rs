use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use dev_console::{
    CommandTarget, ConsoleError, ConsoleOptions, DevConsole, InstancePool, MethodEntry, ParamKind,
    RegisteredCommand, Severity, TargetMode, Value, Vector3,
};
use pretty_assertions::assert_eq;

fn console() -> DevConsole {
    let console = DevConsole::new(ConsoleOptions {
        start_opened: true,
        ..ConsoleOptions::default()
    });
    console.transcript().clear();
    console
}

fn recorder(console: &DevConsole, name: &str, arity: usize) -> Rc<RefCell<Vec<Vec<Value>>>> {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&calls);
    let result_name = name.to_string();
    console
        .register_direct(
            name,
            "records its arguments",
            None,
            vec![ParamKind::Any; arity],
            move |args| {
                log.borrow_mut().push(args.values().to_vec());
                Ok(Value::Text(format!("{result_name}-result")))
            },
        )
        .expect("register recorder");
    calls
}

#[test]
fn nested_call_runs_inner_before_outer() {
    let console = console();
    let order = Rc::new(RefCell::new(Vec::new()));

    for (name, arity) in [("inner", 2usize), ("outer", 2)] {
        let order = Rc::clone(&order);
        console
            .register_direct(name, "", None, vec![ParamKind::Any; arity], move |args| {
                order.borrow_mut().push((name, args.values().to_vec()));
                Ok(Value::Int(7))
            })
            .expect("register");
    }

    console.execute("outer(inner(1,2),3)");
    assert_eq!(
        *order.borrow(),
        vec![
            ("inner", vec![Value::Int(1), Value::Int(2)]),
            ("outer", vec![Value::Int(7), Value::Int(3)]),
        ]
    );
}

#[test]
fn overloads_resolve_by_argument_count() {
    let console = console();
    let one = recorder(&console, "move", 1);
    let two = recorder(&console, "move", 2);

    console.execute("move(1)");
    assert_eq!(one.borrow().len(), 1);
    assert!(two.borrow().is_empty());

    console.execute("move(1, 2, 3)");
    assert_eq!(
        console.transcript().texts(),
        vec![
            "The parameters for the command \"move\" are invalid. Expected:",
            "move(any)",
            "move(any, any)",
            "Received:",
            "(int, int, int)",
        ]
    );
    assert_eq!(one.borrow().len() + two.borrow().len(), 1);
}

#[test]
fn unknown_command_reports_without_side_effects() {
    let console = console();
    let before = console.registry().descriptors();
    assert_eq!(console.execute("frobnicate()"), None);
    assert_eq!(console.registry().descriptors(), before);
    assert_eq!(console.transcript().count(Severity::Error), 1);
    assert!(console.transcript().texts()[0]
        .starts_with("Command \"frobnicate\" was not implemented."));
}

struct Turret {
    shots: Cell<u32>,
}

impl CommandTarget for Turret {
    fn command_methods() -> Vec<MethodEntry<Self>> {
        vec![
            MethodEntry::new("fire", Vec::new(), |turret, _| {
                turret.shots.set(turret.shots.get() + 1);
                Ok(Value::Int(i64::from(turret.shots.get())))
            }),
            MethodEntry::new("fire", vec![ParamKind::Int], |turret, args| {
                let burst = u32::try_from(args.int(0)?).unwrap_or(0);
                turret.shots.set(turret.shots.get() + burst);
                Ok(Value::Nil)
            }),
        ]
    }
}

fn discover_turret(console: &DevConsole, mode: TargetMode) {
    for entry in Turret::command_methods() {
        console
            .register_discovered(entry.into_command("fire", mode))
            .expect("discovered command");
    }
}

#[test]
fn all_mode_with_no_instances_is_a_no_op() {
    let pool = InstancePool::default();
    let console = DevConsole::with_lookup(ConsoleOptions::default(), pool.clone());
    console.transcript().clear();
    discover_turret(&console, TargetMode::All);

    assert_eq!(console.execute("fire()"), Some(Value::Nil));
    assert!(console.transcript().lines().is_empty());

    let first = pool.spawn(Turret { shots: Cell::new(0) });
    let second = pool.spawn(Turret { shots: Cell::new(0) });
    assert_eq!(console.execute("fire(3)"), Some(Value::Nil));
    assert_eq!((first.shots.get(), second.shots.get()), (3, 3));
}

#[test]
fn single_mode_returns_the_target_result() {
    let pool = InstancePool::default();
    let console = DevConsole::with_lookup(ConsoleOptions::default(), pool.clone());
    discover_turret(&console, TargetMode::Single);
    pool.spawn(Turret { shots: Cell::new(4) });
    assert_eq!(console.execute("fire"), Some(Value::Int(5)));
}

#[test]
fn registry_mode_uses_the_singleton_table() {
    let console = console();
    discover_turret(&console, TargetMode::Registry);
    assert_eq!(console.execute("fire()"), Some(Value::Nil));

    let turret = Rc::new(Turret { shots: Cell::new(0) });
    assert!(console.register_singleton(Rc::clone(&turret)).is_none());
    console.execute("fire()");
    assert_eq!(turret.shots.get(), 1);

    let replacement = Rc::new(Turret { shots: Cell::new(10) });
    assert!(console.register_singleton(Rc::clone(&replacement)).is_some());
    assert_eq!(console.transcript().count(Severity::Warn), 1);
    console.execute("fire()");
    assert_eq!((turret.shots.get(), replacement.shots.get()), (1, 11));

    assert!(console.unregister_singleton::<Turret>().is_some());
    console.execute("fire()");
    assert_eq!(replacement.shots.get(), 11);
}

#[test]
fn bound_methods_register_one_command_per_overload() {
    let console = console();
    let turret = Rc::new(Turret { shots: Cell::new(0) });
    let count = console
        .register_bound(
            "shoot",
            "Fires the turret.",
            Some("Combat"),
            Rc::clone(&turret),
            "fire",
        )
        .expect("bind fire");
    assert_eq!(count, 2);
    console.execute("shoot(2)");
    console.execute("shoot");
    assert_eq!(turret.shots.get(), 3);

    let err = console
        .register_bound("reload", "", None, turret, "reload")
        .expect_err("no such method");
    assert!(matches!(err, ConsoleError::InvalidRegistration { .. }));
    assert_eq!(console.transcript().count(Severity::Error), 1);
}

#[test]
fn faulting_command_does_not_stop_the_line() {
    let console = console();
    let calls = recorder(&console, "after", 1);
    console
        .register_direct("explode", "", None, Vec::new(), |_| panic!("boom"))
        .expect("register");

    console.execute("after(explode())");
    assert_eq!(*calls.borrow(), vec![vec![Value::Nil]]);
    assert_eq!(
        console.transcript().texts(),
        vec!["Command \"explode\" failed: boom"]
    );
}

#[test]
fn quick_commands_follow_the_option() {
    let console = console();
    let calls = recorder(&console, "ping", 0);
    console.execute("ping");
    assert_eq!(calls.borrow().len(), 1);

    let strict = DevConsole::new(ConsoleOptions {
        quick_commands: false,
        ..ConsoleOptions::default()
    });
    let strict_calls = recorder(&strict, "ping", 0);
    strict.execute("ping");
    strict.execute("ping()");
    assert_eq!(strict_calls.borrow().len(), 1);
}

#[test]
fn consoles_do_not_share_registries() {
    let first = console();
    let second = console();
    recorder(&first, "only_here", 0);
    assert_eq!(first.registry().lookup("only_here").len(), 1);
    assert!(second.registry().lookup("only_here").is_empty());
}

#[test]
fn help_lists_categories_then_uncategorized() {
    let console = console();
    recorder(&console, "spawn", 3);
    console
        .register_direct("noclip", "Walk through walls.", Some("Cheats"), Vec::new(), |_| {
            Ok(Value::Nil)
        })
        .expect("register");

    console.execute("help");
    let texts = console.transcript().texts();
    let position = |needle: &str| {
        texts
            .iter()
            .position(|line| line == needle)
            .unwrap_or_else(|| panic!("missing help line {needle:?}"))
    };
    assert!(position("# Utility #") < position("# Cheats #"));
    assert!(position("# Cheats #") < position("# Uncategorized #"));
    assert!(
        position("- print(string, int): Print the typed text in the console a number of times.")
            > position("# Utility #")
    );
    assert!(position("- noclip(): Walk through walls.") > position("# Cheats #"));
    assert!(
        position("- spawn(any, any, any): records its arguments") > position("# Uncategorized #")
    );
}

#[test]
fn vector_arguments_accept_nested_calls() {
    let console = console();
    console
        .register_direct("height", "", None, Vec::new(), |_| Ok(Value::Float(2.5)))
        .expect("register");
    let teleports = recorder(&console, "teleport", 1);
    console.execute("teleport([1, height(), 3])");
    assert_eq!(
        *teleports.borrow(),
        vec![vec![Value::Vector3(Vector3 {
            x: 1.0,
            y: 2.5,
            z: 3.0
        })]]
    );
}

#[test]
fn discovered_commands_with_inconsistent_modes_are_rejected() {
    let console = console();
    let mut command = RegisteredCommand::bound("bad", Vec::new(), |_| Ok(Value::Nil));
    command.descriptor.target_mode = TargetMode::All;
    assert!(console.register_discovered(command).is_err());
    assert!(console.registry().lookup("bad").is_empty());
}
