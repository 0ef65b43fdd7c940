use std::collections::HashMap;

use console_contract::{ConsoleError, Value};
use console_syntax::{convert_with, find_innermost_call, has_parenthesis, split_fields, CallSite};
use tracing::{debug, info};

use crate::{
    invoke::invoke_call, registry::CommandRegistry, target::TargetResolver, transcript::Transcript,
};

/// Reduces one console line into command invocations, innermost call first.
///
/// Each reduced call is replaced in the working text by a placeholder key whose value is spliced
/// into the enclosing call's arguments. Placeholders live only for one [`Evaluator::evaluate`].
#[derive(Clone)]
pub struct Evaluator {
    registry: CommandRegistry,
    resolver: TargetResolver,
    transcript: Transcript,
    quick_commands: bool,
    show_function_info: bool,
}

impl Evaluator {
    /// Evaluator writing its diagnostics to `transcript`.
    pub fn new(
        registry: CommandRegistry,
        resolver: TargetResolver,
        transcript: Transcript,
    ) -> Self {
        Self {
            registry,
            resolver,
            transcript,
            quick_commands: true,
            show_function_info: false,
        }
    }

    /// Enables or disables parenthesis-free zero-argument calls.
    pub fn with_quick_commands(mut self, enabled: bool) -> Self {
        self.quick_commands = enabled;
        self
    }

    /// Enables or disables per-call tracing output.
    pub fn with_function_info(mut self, enabled: bool) -> Self {
        self.show_function_info = enabled;
        self
    }

    /// Evaluates one submitted line.
    ///
    /// Returns the value of the top-level call, or `None` when evaluation halted.
    pub fn evaluate(&self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if !has_parenthesis(line) {
            if self.quick_commands {
                return self.call(line, "", Vec::new());
            }
            self.report(&ConsoleError::Unresolved {
                text: line.to_string(),
            });
            return None;
        }

        let mut text = line.to_string();
        let mut pending: HashMap<String, Value> = HashMap::new();
        let mut last_key = None;

        while let Some(site) = find_innermost_call(&text) {
            let args = arguments(&site.args, &mut pending);
            let value = self.call(&site.name, &site.args, args)?;
            let key = placeholder_key(&site, &text, &pending);
            text.replace_range(site.start..site.end, &key);
            pending.insert(key.clone(), value);
            last_key = Some(key);
        }

        let rest = text.trim();
        match last_key {
            Some(key) if key == rest => pending.remove(&key),
            _ => {
                self.report(&ConsoleError::Unresolved {
                    text: line.to_string(),
                });
                None
            }
        }
    }

    /// Invokes one reduced call. `None` means the line must halt.
    fn call(&self, name: &str, raw_args: &str, args: Vec<Value>) -> Option<Value> {
        self.trace_call(name, raw_args, &args);
        match invoke_call(&self.registry, &self.resolver, name, &args) {
            Ok(value) => Some(value),
            Err(err @ ConsoleError::InvocationFault { .. }) => {
                self.report(&err);
                Some(Value::Nil)
            }
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    fn report(&self, err: &ConsoleError) {
        debug!(error = %err, "line evaluation failed");
        self.transcript.extend(err.report_lines());
    }

    fn trace_call(&self, name: &str, raw_args: &str, args: &[Value]) {
        let rendered = args.iter().map(Value::to_string).collect::<Vec<_>>().join(", ");
        if !self.show_function_info {
            debug!(command = name, arity = args.len(), args = %rendered, "reducing call");
            return;
        }

        info!(
            command = name,
            arity = args.len(),
            raw = raw_args,
            args = %rendered,
            "reducing call"
        );
        self.transcript.info(format!("Function: {name}"));
        self.transcript.info(format!("Arg count: {}", args.len()));
        self.transcript.info(format!("Raw args: {raw_args}"));
        self.transcript.info(format!("Args: {rendered}"));
    }
}

/// Converts the argument text of one call, consuming placeholders it references.
fn arguments(raw: &str, pending: &mut HashMap<String, Value>) -> Vec<Value> {
    split_fields(raw)
        .into_iter()
        .map(|field| match pending.remove(field) {
            Some(value) => value,
            None => convert_with(field, &mut |component| pending.remove(component)),
        })
        .collect()
}

/// Name plus source offset; suffixed while that key is still pending or already appears in the
/// surrounding line text.
fn placeholder_key(site: &CallSite, text: &str, pending: &HashMap<String, Value>) -> String {
    let (before, after) = (&text[..site.start], &text[site.end..]);
    let taken = |key: &str| {
        pending.contains_key(key) || before.contains(key) || after.contains(key)
    };

    let base = format!("{}{}", site.name, site.start);
    let mut key = base.clone();
    let mut suffix = 0usize;
    while taken(&key) {
        suffix += 1;
        key = format!("{base}_{suffix}");
    }
    key
}
