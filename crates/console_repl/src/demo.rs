//! Demo object universe and the statically declared commands that target it.
//!
//! Commands that act on [`Player`] and [`Enemy`] are declared next to those types with
//! `inventory::submit!` and picked up by [`discover`], which hands each one to the console in
//! name order. Free-standing commands are registered directly by [`register_demo`].

use std::cell::Cell;
use std::rc::Rc;

use dev_console::{
    Args, CommandFault, CommandOutcome, CommandTarget, ConsoleError, DevConsole, InstancePool,
    MethodEntry, ParamKind, RegisteredCommand, TargetMode, Value, Vector3,
};
use tracing::{info, warn};

/// The player character, reachable in registry mode.
#[derive(Debug, Default)]
pub struct Player {
    position: Cell<Vector3>,
    health: Cell<i64>,
}

impl Player {
    /// Player at the origin with the given health.
    pub fn new(health: i64) -> Self {
        Self {
            position: Cell::new(Vector3::default()),
            health: Cell::new(health),
        }
    }

    /// Current position.
    pub fn position(&self) -> Vector3 {
        self.position.get()
    }

    /// Current health.
    pub fn health(&self) -> i64 {
        self.health.get()
    }
}

impl CommandTarget for Player {
    fn command_methods() -> Vec<MethodEntry<Self>> {
        vec![
            MethodEntry::new("teleport", vec![ParamKind::Vector3], |player, args| {
                player.position.set(args.vector3(0)?);
                Ok(Value::Nil)
            }),
            MethodEntry::new("teleport", vec![ParamKind::Float; 3], |player, args| {
                player.position.set(Vector3 {
                    x: args.float(0)?,
                    y: args.float(1)?,
                    z: args.float(2)?,
                });
                Ok(Value::Nil)
            }),
            MethodEntry::new("heal", vec![ParamKind::Int], |player, args| {
                let amount = args.int(0)?;
                if amount < 0 {
                    return Err(CommandFault::new("heal amount must not be negative"));
                }
                player.health.set(player.health.get().saturating_add(amount));
                Ok(Value::Int(player.health.get()))
            }),
            MethodEntry::new("position", Vec::new(), |player, _| {
                Ok(Value::Vector3(player.position.get()))
            }),
        ]
    }
}

/// A spawned enemy, reachable in single and all modes through the [`InstancePool`].
#[derive(Debug)]
pub struct Enemy {
    name: String,
    health: Cell<i64>,
}

impl Enemy {
    /// Named enemy; add it to an [`InstancePool`] to make it reachable.
    pub fn new(name: impl Into<String>, health: i64) -> Self {
        Self {
            name: name.into(),
            health: Cell::new(health),
        }
    }

    /// Current health.
    pub fn health(&self) -> i64 {
        self.health.get()
    }
}

impl CommandTarget for Enemy {
    fn command_methods() -> Vec<MethodEntry<Self>> {
        vec![
            MethodEntry::new("damage", vec![ParamKind::Int], |enemy, args| {
                let remaining = enemy.health.get().saturating_sub(args.int(0)?).max(0);
                enemy.health.set(remaining);
                Ok(Value::Int(remaining))
            }),
            MethodEntry::new("inspect", Vec::new(), |enemy, _| {
                Ok(Value::Text(format!("{} ({} hp)", enemy.name, enemy.health.get())))
            }),
        ]
    }
}

/// A command declared at compile time and registered by the discovery pass.
pub struct DeclaredCommand {
    /// Console name; discovery registers in ascending name order.
    pub name: &'static str,
    /// Builds every overload of the command.
    pub build: fn() -> Vec<RegisteredCommand>,
}

inventory::collect!(DeclaredCommand);

fn declare<T: CommandTarget>(
    method: &str,
    command: &str,
    mode: TargetMode,
    description: &str,
    category: &str,
) -> Vec<RegisteredCommand> {
    T::command_methods()
        .into_iter()
        .filter(|entry| entry.name == method)
        .map(|entry| {
            entry
                .into_command(command, mode)
                .with_description(description)
                .with_category(category)
        })
        .collect()
}

fn teleport_commands() -> Vec<RegisteredCommand> {
    declare::<Player>(
        "teleport",
        "teleport",
        TargetMode::Registry,
        "Move the player to a position.",
        "Player",
    )
}

fn heal_commands() -> Vec<RegisteredCommand> {
    declare::<Player>("heal", "heal", TargetMode::Registry, "Restore player health.", "Player")
}

fn damage_all_commands() -> Vec<RegisteredCommand> {
    declare::<Enemy>("damage", "damage_all", TargetMode::All, "Damage every enemy.", "Enemies")
}

fn inspect_commands() -> Vec<RegisteredCommand> {
    declare::<Enemy>(
        "inspect",
        "inspect_enemy",
        TargetMode::Single,
        "Describe the first spawned enemy.",
        "Enemies",
    )
}

inventory::submit! {
    DeclaredCommand { name: "teleport", build: teleport_commands }
}

inventory::submit! {
    DeclaredCommand { name: "heal", build: heal_commands }
}

inventory::submit! {
    DeclaredCommand { name: "damage_all", build: damage_all_commands }
}

inventory::submit! {
    DeclaredCommand { name: "inspect_enemy", build: inspect_commands }
}

/// Registers every declared command. Returns how many overloads were accepted.
///
/// Rejected commands are already reported in the transcript; discovery continues past them.
pub fn discover(console: &DevConsole) -> usize {
    let mut declared: Vec<_> = inventory::iter::<DeclaredCommand>().collect();
    declared.sort_by_key(|declared| declared.name);

    let mut accepted = 0;
    for declared in declared {
        for command in (declared.build)() {
            match console.register_discovered(command) {
                Ok(()) => accepted += 1,
                Err(err) => warn!(command = declared.name, %err, "declared command rejected"),
            }
        }
    }
    info!(accepted, "discovery pass finished");
    accepted
}

fn add(args: &Args<'_>) -> CommandOutcome {
    if args.values().iter().all(|value| matches!(value, Value::Int(_))) {
        let mut total = 0i64;
        for index in 0..args.len() {
            total = total
                .checked_add(args.int(index)?)
                .ok_or_else(|| CommandFault::new("integer overflow"))?;
        }
        return Ok(Value::Int(total));
    }

    let mut total = 0.0;
    for index in 0..args.len() {
        total += args.float(index)?;
    }
    Ok(Value::Float(total))
}

/// Registers the free-standing demo commands and the player singleton.
pub fn register_demo(
    console: &DevConsole,
    pool: &InstancePool,
) -> Result<Rc<Player>, ConsoleError> {
    let player = Rc::new(Player::new(100));
    console.register_singleton(Rc::clone(&player));

    for arity in [2, 3] {
        console.register_direct(
            "add",
            "Add numbers; integers stay integers.",
            Some("Math"),
            vec![ParamKind::Any; arity],
            add,
        )?;
    }

    let transcript = console.transcript().clone();
    console.register_direct(
        "echo",
        "Print a value and return it.",
        None,
        vec![ParamKind::Any],
        move |args| {
            let value = args.value(0)?.clone();
            transcript.info(value.to_string());
            Ok(value)
        },
    )?;

    let spawner = pool.clone();
    console.register_direct(
        "spawn_enemy",
        "Spawn an enemy with a name and health.",
        Some("Enemies"),
        vec![ParamKind::Text, ParamKind::Int],
        move |args| {
            spawner.spawn(Enemy::new(args.text(0)?, args.int(1)?));
            Ok(Value::Int(count_of(&spawner)))
        },
    )?;

    let counter = pool.clone();
    console.register_direct(
        "enemies",
        "Count spawned enemies.",
        Some("Enemies"),
        Vec::new(),
        move |_| Ok(Value::Int(count_of(&counter))),
    )?;

    console.register_direct(
        "alarm",
        "Emit a host warning with the given text.",
        None,
        vec![ParamKind::Text],
        |args| {
            warn!(target: "game", "{}", args.text(0)?);
            Ok(Value::Nil)
        },
    )?;

    console.register_bound(
        "whereami",
        "Show the player position.",
        Some("Player"),
        Rc::clone(&player),
        "position",
    )?;

    Ok(player)
}

fn count_of(pool: &InstancePool) -> i64 {
    i64::try_from(pool.count::<Enemy>()).unwrap_or(i64::MAX)
}
