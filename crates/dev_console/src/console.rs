use std::rc::Rc;

use console_contract::{ConsoleError, ConsoleLine, ParamKind, Severity, Value};
use tracing::{debug, warn};

use crate::{
    args::Args,
    builtins::register_builtins,
    eval::Evaluator,
    history::{HistoryBuffer, NavDirection},
    options::ConsoleOptions,
    registry::{
        CommandOutcome, CommandRegistry, CommandTarget, Instance, RegisteredCommand, TypeKey,
    },
    suggest::{SuggestionEngine, SuggestionEntry},
    target::{InstanceLookup, NoInstances, TargetResolver},
    transcript::Transcript,
};

const GREETING: &str =
    "> Welcome to the developer console! Type \"help\" to see a list of all registered commands.";

/// Keystroke-level input the host forwards to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    /// Open or close the console.
    Toggle,
    /// Switch up/down between history and suggestions.
    ToggleSuggestions,
    /// Older history entry or next suggestion.
    Up,
    /// Newer history entry or previous suggestion.
    Down,
    /// Submit the input line.
    Submit,
}

/// Maps a host key name to a console action.
pub fn key_action(key: &str) -> Option<ConsoleAction> {
    match key {
        "`" | "Backquote" => Some(ConsoleAction::Toggle),
        "Tab" => Some(ConsoleAction::ToggleSuggestions),
        "ArrowUp" => Some(ConsoleAction::Up),
        "ArrowDown" => Some(ConsoleAction::Down),
        "Enter" | "NumpadEnter" => Some(ConsoleAction::Submit),
        _ => None,
    }
}

type Hook = Box<dyn FnMut()>;

/// One interactive console: registry, evaluator, input line, history, and suggestions.
///
/// Instances share nothing implicitly; each owns its registry and transcript.
pub struct DevConsole {
    options: ConsoleOptions,
    registry: CommandRegistry,
    transcript: Transcript,
    evaluator: Evaluator,
    history: HistoryBuffer,
    suggestions: SuggestionEngine,
    text: String,
    draft: String,
    open: bool,
    open_hooks: Vec<Hook>,
    close_hooks: Vec<Hook>,
}

impl DevConsole {
    /// Console without an object universe; only direct and registry-mode commands find targets.
    pub fn new(options: ConsoleOptions) -> Self {
        Self::with_lookup(options, NoInstances)
    }

    /// Console resolving single/all targets through the host's `lookup`.
    pub fn with_lookup(options: ConsoleOptions, lookup: impl InstanceLookup + 'static) -> Self {
        let registry = CommandRegistry::default();
        let transcript = Transcript::new(options.max_characters);
        let resolver = TargetResolver::new(lookup);
        let evaluator = Evaluator::new(registry.clone(), resolver, transcript.clone())
            .with_quick_commands(options.quick_commands)
            .with_function_info(options.show_function_info);

        if let Err(err) = register_builtins(&registry, &transcript) {
            transcript.extend(err.report_lines());
        }
        transcript.info(GREETING);

        Self {
            history: HistoryBuffer::new(options.history_size),
            open: options.start_opened,
            options,
            registry,
            transcript,
            evaluator,
            suggestions: SuggestionEngine::default(),
            text: String::new(),
            draft: String::new(),
            open_hooks: Vec::new(),
            close_hooks: Vec::new(),
        }
    }

    /// Options this console was built with.
    pub fn options(&self) -> &ConsoleOptions {
        &self.options
    }

    /// Command registry handle.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Output transcript handle.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Submitted lines, most recent first.
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Current input text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the console is visible.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the suggestion panel is visible.
    pub fn suggestions_visible(&self) -> bool {
        self.suggestions.is_visible()
    }

    /// Suggestion render data.
    pub fn suggestions(&self) -> Vec<SuggestionEntry> {
        self.suggestions.entries()
    }

    /// Registers a direct command with declared parameters.
    pub fn register_direct(
        &self,
        name: &str,
        description: &str,
        category: Option<&str>,
        params: Vec<ParamKind>,
        handler: impl Fn(&Args<'_>) -> CommandOutcome + 'static,
    ) -> Result<(), ConsoleError> {
        let command = RegisteredCommand::bound(name, params, handler)
            .with_description(description)
            .with_optional_category(category);
        self.reported(self.registry.register(command))
    }

    /// Registers a direct zero-argument closure.
    pub fn register_action(
        &self,
        name: &str,
        description: &str,
        category: Option<&str>,
        action: impl Fn() + 'static,
    ) -> Result<(), ConsoleError> {
        let command = RegisteredCommand::action(name, action)
            .with_description(description)
            .with_optional_category(category);
        self.reported(self.registry.register(command))
    }

    /// Binds every overload of `method` on `instance` as a direct command.
    pub fn register_bound<T: CommandTarget>(
        &self,
        name: &str,
        description: &str,
        category: Option<&str>,
        instance: Rc<T>,
        method: &str,
    ) -> Result<usize, ConsoleError> {
        self.reported(self.registry.register_bound(
            name,
            Some(description),
            category,
            instance,
            method,
        ))
    }

    /// Accepts a command built by an external discovery pass.
    pub fn register_discovered(&self, command: RegisteredCommand) -> Result<(), ConsoleError> {
        self.reported(self.registry.register_discovered(command))
    }

    /// Records the registry-mode target for `T`.
    pub fn register_singleton<T: 'static>(&self, instance: Rc<T>) -> Option<Instance> {
        let previous = self.registry.register_singleton(instance);
        if previous.is_some() {
            self.transcript.warn(format!(
                "A singleton of type {} was already registered and has been replaced.",
                TypeKey::of::<T>().name()
            ));
        }
        previous
    }

    /// Forgets the registry-mode target for `T`.
    pub fn unregister_singleton<T: 'static>(&self) -> Option<Instance> {
        self.registry.unregister_singleton::<T>()
    }

    /// Registers a callback fired whenever the console opens.
    pub fn on_open(&mut self, hook: impl FnMut() + 'static) {
        self.open_hooks.push(Box::new(hook));
    }

    /// Registers a callback fired whenever the console closes.
    pub fn on_close(&mut self, hook: impl FnMut() + 'static) {
        self.close_hooks.push(Box::new(hook));
    }

    /// Opens or closes the console.
    pub fn show(&mut self, open: bool) {
        if self.open == open {
            return;
        }
        self.open = open;
        debug!(open, "console visibility changed");

        if open {
            self.history.reset_cursor();
            self.suggestions.reset_cursor();
            self.transcript.scroll().schedule();
            for hook in &mut self.open_hooks {
                hook();
            }
        } else {
            self.set_text("");
            for hook in &mut self.close_hooks {
                hook();
            }
        }
    }

    /// Flips visibility.
    pub fn toggle(&mut self) {
        self.show(!self.open);
    }

    /// Applies a text change typed by the user.
    pub fn set_text(&mut self, text: &str) {
        self.draft = text.to_string();
        self.apply_text(text.to_string());
    }

    fn apply_text(&mut self, text: String) {
        self.text = text;
        self.suggestions.refresh(&self.text, &self.registry.names());
    }

    /// Handles one keystroke action. Returns whether it had an effect.
    ///
    /// While closed, only [`ConsoleAction::Toggle`] is accepted.
    pub fn handle_action(&mut self, action: ConsoleAction) -> bool {
        if !self.open && action != ConsoleAction::Toggle {
            return false;
        }

        match action {
            ConsoleAction::Toggle => self.toggle(),
            ConsoleAction::ToggleSuggestions => {
                self.suggestions.toggle_focus();
            }
            ConsoleAction::Up => self.navigate(NavDirection::Up),
            ConsoleAction::Down => self.navigate(NavDirection::Down),
            ConsoleAction::Submit => {
                self.submit();
            }
        }
        true
    }

    fn navigate(&mut self, direction: NavDirection) {
        if self.suggestions.is_focused() {
            self.suggestions.cycle(direction);
            return;
        }
        let text = self.history.navigate(direction, &self.draft);
        self.apply_text(text);
    }

    /// Submits the input line.
    ///
    /// With suggestions showing, Enter first completes the selected suggestion (or the first
    /// one when `always_autocomplete` is set) unless the input already reads that way.
    pub fn submit(&mut self) -> Option<Value> {
        let line = self.text.trim().to_string();
        if line.is_empty() {
            self.transcript.info(">");
            return None;
        }

        if let Some(completed) = self.pending_completion() {
            self.set_text(&completed);
            return None;
        }

        self.transcript.info(format!("> {line}"));
        self.history.push(&line);
        self.suggestions.reset_cursor();
        self.set_text("");
        self.evaluator.evaluate(&line)
    }

    fn pending_completion(&self) -> Option<String> {
        if !self.suggestions.is_visible() {
            return None;
        }
        let name = match self.suggestions.selected() {
            Some(name) => name,
            None if self.options.always_autocomplete => self.suggestions.first()?,
            None => return None,
        };
        let completed = SuggestionEngine::accept(&self.text, name);
        (completed != self.text).then_some(completed)
    }

    /// Evaluates a line without echo or history.
    pub fn execute(&self, line: &str) -> Option<Value> {
        self.evaluator.evaluate(line)
    }

    /// Mirrors a host log message into the transcript.
    pub fn append_host_log(&self, message: &str, severity: Severity) {
        let text = match severity {
            Severity::Info => format!("HOST: {message}"),
            Severity::Warn => format!("HOST [Warn]: {message}"),
            Severity::Error => format!("HOST [Error]: {message}"),
        };
        self.transcript.push(ConsoleLine { text, severity });
    }

    /// Runs the deferred end-of-frame work. Returns whether the view should scroll to the end.
    pub fn end_frame(&self) -> bool {
        self.transcript.scroll().take()
    }

    fn reported<T>(&self, result: Result<T, ConsoleError>) -> Result<T, ConsoleError> {
        if let Err(err) = &result {
            warn!(error = %err, "command registration rejected");
            self.transcript.extend(err.report_lines());
        }
        result
    }
}
