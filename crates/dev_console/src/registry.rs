use std::{
    any::{Any, TypeId},
    cell::RefCell,
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    rc::{Rc, Weak},
};

use console_contract::{CommandDescriptor, CommandFault, ConsoleError, ParamKind, TargetMode, Value};
use console_syntax::is_word_char;
use tracing::{debug, warn};

use crate::args::Args;

/// Result of running a command body.
pub type CommandOutcome = Result<Value, CommandFault>;

/// Zero-argument closure without a result.
pub type ActionHandler = Rc<dyn Fn()>;

/// Ready-to-call handler with its receiver already bound.
pub type BoundHandler = Rc<dyn Fn(&Args<'_>) -> CommandOutcome>;

/// Method reference invoked against a receiver resolved at call time.
pub type MethodHandler = Rc<dyn Fn(&dyn Any, &Args<'_>) -> CommandOutcome>;

/// Live receiver instance handed out by an instance lookup or the singleton table.
pub type Instance = Rc<dyn Any>;

/// Runtime type tag used for target resolution.
///
/// Equality and hashing use only the [`TypeId`]; the name is carried for diagnostics and help.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for `T`.
    pub fn of<T: Any>() -> Self {
        let full = std::any::type_name::<T>();
        let outer = full.split('<').next().unwrap_or(full);
        let name = outer.rsplit("::").next().unwrap_or(outer);
        Self {
            id: TypeId::of::<T>(),
            name,
        }
    }

    /// Unqualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Callable half of a registered command.
#[derive(Clone)]
pub enum Invoker {
    /// Zero-argument closure; always yields [`Value::Nil`].
    Action(ActionHandler),
    /// Direct handler carrying its own receiver.
    Bound(BoundHandler),
    /// Method reference resolved against receivers of `declaring_type` at call time.
    Method {
        /// Receiver type.
        declaring_type: TypeKey,
        /// Method body.
        handler: MethodHandler,
    },
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(_) => f.write_str("Action"),
            Self::Bound(_) => f.write_str("Bound"),
            Self::Method { declaring_type, .. } => {
                f.debug_struct("Method").field("declaring_type", declaring_type).finish()
            }
        }
    }
}

/// Descriptor plus callable for one command overload.
#[derive(Clone, Debug)]
pub struct RegisteredCommand {
    /// Registration metadata.
    pub descriptor: CommandDescriptor,
    /// Callable reference.
    pub invoker: Invoker,
}

impl RegisteredCommand {
    /// Direct zero-argument closure.
    pub fn action(name: impl Into<String>, action: impl Fn() + 'static) -> Self {
        Self {
            descriptor: CommandDescriptor::new(name, Vec::new()),
            invoker: Invoker::Action(Rc::new(action)),
        }
    }

    /// Direct handler with declared parameters.
    pub fn bound(
        name: impl Into<String>,
        params: Vec<ParamKind>,
        handler: impl Fn(&Args<'_>) -> CommandOutcome + 'static,
    ) -> Self {
        Self {
            descriptor: CommandDescriptor::new(name, params),
            invoker: Invoker::Bound(Rc::new(handler)),
        }
    }

    /// Method of `T` dispatched to receivers chosen by `mode`.
    pub fn method<T: Any>(
        name: impl Into<String>,
        params: Vec<ParamKind>,
        mode: TargetMode,
        handler: impl Fn(&T, &Args<'_>) -> CommandOutcome + 'static,
    ) -> Self {
        let declaring_type = TypeKey::of::<T>();
        let mut descriptor = CommandDescriptor::new(name, params);
        descriptor.target_mode = mode;
        descriptor.declaring_type = Some(declaring_type.name().to_string());

        let handler: MethodHandler = Rc::new(move |receiver: &dyn Any, args: &Args<'_>| {
            match receiver.downcast_ref::<T>() {
                Some(receiver) => handler(receiver, args),
                None => Err(CommandFault::new(format!(
                    "receiver is not a {}",
                    declaring_type.name()
                ))),
            }
        });

        Self {
            descriptor,
            invoker: Invoker::Method {
                declaring_type,
                handler,
            },
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.descriptor.description = Some(description.into());
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.descriptor.category = Some(category.into());
        self
    }

    /// Sets the category when one is given.
    pub fn with_optional_category(mut self, category: Option<&str>) -> Self {
        self.descriptor.category = category.map(str::to_string);
        self
    }

    /// Checks the name and that the target mode agrees with the callable.
    pub fn validate(&self) -> Result<(), ConsoleError> {
        let name = &self.descriptor.name;
        let reject = |reason: &str| ConsoleError::InvalidRegistration {
            name: name.clone(),
            reason: reason.to_string(),
        };

        if name.is_empty() || !name.chars().all(is_word_char) {
            return Err(reject("names must be non-empty word characters"));
        }
        match (&self.invoker, self.descriptor.target_mode) {
            (Invoker::Method { .. }, TargetMode::Direct) => {
                Err(reject("direct commands need a bound callable"))
            }
            (Invoker::Action(_) | Invoker::Bound(_), mode) if mode != TargetMode::Direct => {
                Err(reject("targeted commands need a declaring type"))
            }
            (Invoker::Action(_), _) if !self.descriptor.params.is_empty() => {
                Err(reject("actions take no parameters"))
            }
            _ => Ok(()),
        }
    }
}

/// One named overload in a type's method table.
pub struct MethodEntry<T> {
    /// Method name.
    pub name: &'static str,
    /// Declared parameters.
    pub params: Vec<ParamKind>,
    /// Method body.
    pub call: fn(&T, &Args<'_>) -> CommandOutcome,
}

impl<T> MethodEntry<T> {
    /// Creates a method table entry.
    pub fn new(
        name: &'static str,
        params: Vec<ParamKind>,
        call: fn(&T, &Args<'_>) -> CommandOutcome,
    ) -> Self {
        Self { name, params, call }
    }
}

impl<T: Any> MethodEntry<T> {
    /// Builds a targeted command that dispatches this method under `command_name`.
    pub fn into_command(
        self,
        command_name: impl Into<String>,
        mode: TargetMode,
    ) -> RegisteredCommand {
        let call = self.call;
        RegisteredCommand::method::<T>(command_name, self.params, mode, move |receiver, args| {
            call(receiver, args)
        })
    }
}

/// A type whose methods can be registered as console commands.
///
/// The method table stands in for runtime reflection: [`CommandRegistry::register_bound`]
/// resolves names against it and discovery passes build targeted commands from it.
pub trait CommandTarget: Any + Sized {
    /// Named method overloads of this type.
    fn command_methods() -> Vec<MethodEntry<Self>>;
}

/// Outcome of resolving a name and argument count.
#[derive(Debug, Clone)]
pub enum CallResolution {
    /// First overload whose arity matches.
    Found(RegisteredCommand),
    /// No command with that name.
    NotFound,
    /// Name matched but no arity did; carries every same-named descriptor.
    ArityMismatch(Vec<CommandDescriptor>),
}

#[derive(Default)]
struct RegistryState {
    commands: Vec<RegisteredCommand>,
    singletons: HashMap<TypeKey, Instance>,
}

/// Shared command registry.
///
/// Ordered and never deduplicated: same-named commands coexist as arity overloads. Clones share
/// state; independent consoles each own a fresh registry.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl CommandRegistry {
    /// Appends one command.
    pub fn register(&self, command: RegisteredCommand) -> Result<(), ConsoleError> {
        command.validate()?;
        debug!(
            command = %command.descriptor.name,
            arity = command.descriptor.arity(),
            mode = ?command.descriptor.target_mode,
            "registered command"
        );
        self.state.borrow_mut().commands.push(command);
        Ok(())
    }

    /// Accepts a fully formed command built by an external discovery pass.
    pub fn register_discovered(&self, command: RegisteredCommand) -> Result<(), ConsoleError> {
        self.register(command)
    }

    /// Registers every overload of `method` on `instance` as a direct command named `name`.
    ///
    /// Returns the number of overloads registered.
    pub fn register_bound<T: CommandTarget>(
        &self,
        name: &str,
        description: Option<&str>,
        category: Option<&str>,
        instance: Rc<T>,
        method: &str,
    ) -> Result<usize, ConsoleError> {
        let overloads = T::command_methods()
            .into_iter()
            .filter(|entry| entry.name == method)
            .collect::<Vec<_>>();
        if overloads.is_empty() {
            return Err(ConsoleError::InvalidRegistration {
                name: name.to_string(),
                reason: format!(
                    "could not find method \"{method}\" on {}",
                    TypeKey::of::<T>().name()
                ),
            });
        }

        let count = overloads.len();
        for entry in overloads {
            let receiver = Rc::clone(&instance);
            let call = entry.call;
            let mut command = RegisteredCommand::bound(name, entry.params, move |args| {
                call(&*receiver, args)
            })
            .with_optional_category(category);
            if let Some(description) = description {
                command = command.with_description(description);
            }
            self.register(command)?;
        }
        Ok(count)
    }

    /// Every descriptor named exactly `name`, in registration order.
    pub fn lookup(&self, name: &str) -> Vec<CommandDescriptor> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter(|command| command.descriptor.name == name)
            .map(|command| command.descriptor.clone())
            .collect()
    }

    /// Picks the first same-named overload with `arg_count` parameters.
    pub fn resolve_for_call(&self, name: &str, arg_count: usize) -> CallResolution {
        let state = self.state.borrow();
        let mut candidates = Vec::new();
        for command in state.commands.iter().filter(|c| c.descriptor.name == name) {
            if command.descriptor.arity() == arg_count {
                return CallResolution::Found(command.clone());
            }
            candidates.push(command.descriptor.clone());
        }

        if candidates.is_empty() {
            CallResolution::NotFound
        } else {
            CallResolution::ArityMismatch(candidates)
        }
    }

    /// All descriptors in registration order.
    pub fn descriptors(&self) -> Vec<CommandDescriptor> {
        self.state
            .borrow()
            .commands
            .iter()
            .map(|command| command.descriptor.clone())
            .collect()
    }

    /// Distinct command names in first-registration order.
    pub fn names(&self) -> Vec<String> {
        let state = self.state.borrow();
        let mut names: Vec<String> = Vec::new();
        for command in &state.commands {
            if !names.contains(&command.descriptor.name) {
                names.push(command.descriptor.name.clone());
            }
        }
        names
    }

    /// Number of registered overloads.
    pub fn len(&self) -> usize {
        self.state.borrow().commands.len()
    }

    /// Returns whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().commands.is_empty()
    }

    /// Records the singleton for `T`, returning the replaced one.
    pub fn register_singleton<T: Any>(&self, instance: Rc<T>) -> Option<Instance> {
        let key = TypeKey::of::<T>();
        let previous = self.state.borrow_mut().singletons.insert(key, instance);
        if previous.is_some() {
            warn!(
                target_type = key.name(),
                "replaced registered singleton; the previous instance is no longer a target"
            );
        }
        previous
    }

    /// Removes the singleton for `T`.
    pub fn unregister_singleton<T: Any>(&self) -> Option<Instance> {
        self.state
            .borrow_mut()
            .singletons
            .remove(&TypeKey::of::<T>())
    }

    /// Singleton recorded for `key`.
    pub fn singleton(&self, key: &TypeKey) -> Option<Instance> {
        self.state.borrow().singletons.get(key).cloned()
    }

    pub(crate) fn downgrade(&self) -> WeakRegistry {
        WeakRegistry {
            state: Rc::downgrade(&self.state),
        }
    }
}

/// Non-owning registry handle for commands that inspect their own registry.
#[derive(Clone)]
pub(crate) struct WeakRegistry {
    state: Weak<RefCell<RegistryState>>,
}

impl WeakRegistry {
    pub(crate) fn upgrade(&self) -> Option<CommandRegistry> {
        self.state.upgrade().map(|state| CommandRegistry { state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Door {
        open: std::cell::Cell<bool>,
    }

    impl CommandTarget for Door {
        fn command_methods() -> Vec<MethodEntry<Self>> {
            vec![
                MethodEntry::new("set_open", vec![ParamKind::Int], |door, args| {
                    door.open.set(args.int(0)? != 0);
                    Ok(Value::Nil)
                }),
                MethodEntry::new("set_open", Vec::new(), |door, _| {
                    door.open.set(true);
                    Ok(Value::Nil)
                }),
            ]
        }
    }

    fn nop(_: &Args<'_>) -> CommandOutcome {
        Ok(Value::Nil)
    }

    #[test]
    fn resolve_for_call_prefers_first_matching_arity() {
        let registry = CommandRegistry::default();
        registry
            .register(RegisteredCommand::bound("move", vec![ParamKind::Float], nop))
            .expect("register");
        registry
            .register(RegisteredCommand::bound(
                "move",
                vec![ParamKind::Float, ParamKind::Float],
                nop,
            ))
            .expect("register");

        match registry.resolve_for_call("move", 2) {
            CallResolution::Found(command) => assert_eq!(command.descriptor.arity(), 2),
            other => panic!("expected a match, got {other:?}"),
        }
        match registry.resolve_for_call("move", 3) {
            CallResolution::ArityMismatch(candidates) => assert_eq!(candidates.len(), 2),
            other => panic!("expected arity mismatch, got {other:?}"),
        }
        assert!(matches!(
            registry.resolve_for_call("frobnicate", 0),
            CallResolution::NotFound
        ));
        assert_eq!(registry.names(), vec!["move".to_string()]);
        assert_eq!(registry.lookup("move").len(), 2);
    }

    #[test]
    fn validation_rejects_mode_and_callable_disagreement() {
        let mut direct_method = RegisteredCommand::method::<Door>(
            "open",
            Vec::new(),
            TargetMode::All,
            |_, _| Ok(Value::Nil),
        );
        direct_method.descriptor.target_mode = TargetMode::Direct;
        assert!(matches!(
            direct_method.validate(),
            Err(ConsoleError::InvalidRegistration { .. })
        ));

        let mut targeted_bound = RegisteredCommand::bound("open", Vec::new(), nop);
        targeted_bound.descriptor.target_mode = TargetMode::Single;
        assert!(targeted_bound.validate().is_err());

        assert!(RegisteredCommand::bound("two words", Vec::new(), nop)
            .validate()
            .is_err());
        assert!(RegisteredCommand::bound("", Vec::new(), nop).validate().is_err());
    }

    #[test]
    fn register_bound_registers_every_overload() {
        let registry = CommandRegistry::default();
        let door = Rc::new(Door {
            open: std::cell::Cell::new(false),
        });
        let count = registry
            .register_bound("door", Some("Opens the door"), None, Rc::clone(&door), "set_open")
            .expect("bind");
        assert_eq!(count, 2);
        assert_eq!(
            registry
                .lookup("door")
                .iter()
                .map(CommandDescriptor::signature)
                .collect::<Vec<_>>(),
            vec!["door(int)", "door()"]
        );

        let error = registry
            .register_bound("door", None, None, door, "slam")
            .expect_err("missing method");
        assert_eq!(
            error.to_string(),
            "Could not register command \"door\": could not find method \"slam\" on Door"
        );
    }

    #[test]
    fn singleton_table_replaces_and_removes() {
        let registry = CommandRegistry::default();
        let first = Rc::new(Door {
            open: std::cell::Cell::new(false),
        });
        assert!(registry.register_singleton(Rc::clone(&first)).is_none());
        let replaced = registry
            .register_singleton(Rc::new(Door {
                open: std::cell::Cell::new(true),
            }))
            .expect("previous singleton");
        let replaced = replaced.downcast_ref::<Door>().expect("door singleton");
        assert!(!replaced.open.get());

        assert!(registry.singleton(&TypeKey::of::<Door>()).is_some());
        assert!(registry.unregister_singleton::<Door>().is_some());
        assert!(registry.singleton(&TypeKey::of::<Door>()).is_none());
    }

    #[test]
    fn type_keys_use_unqualified_names() {
        assert_eq!(TypeKey::of::<Door>().name(), "Door");
        assert_eq!(TypeKey::of::<Door>(), TypeKey::of::<Door>());
        assert_ne!(TypeKey::of::<Door>(), TypeKey::of::<String>());
        assert_eq!(TypeKey::of::<Vec<Door>>().name(), "Vec");
        assert_eq!(TypeKey::of::<Option<Rc<Door>>>().name(), "Option");
    }
}
