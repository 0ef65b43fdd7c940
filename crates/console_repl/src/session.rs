//! Line-driven console loop.
//!
//! Each input line is either typed text that gets submitted, or a `:`-prefixed directive that
//! presses a key (`:Tab`, `:ArrowUp`, ...) or edits the input without submitting. After every
//! line the loop runs one frame: host logs are forwarded, new transcript lines are printed, and
//! the deferred scroll is flushed.

use std::io::{BufRead, Write};

use dev_console::{key_action, ConsoleAction, ConsoleLine, DevConsole, Severity, Value};
use tracing::debug;

use crate::error::ReplResult;
use crate::host_log::HostLogBuffer;

/// One parsed input line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Input {
    /// Replace the input text and press Enter.
    Submit(String),
    /// Replace the input text only.
    Type(String),
    /// Press a key.
    Key(ConsoleAction),
    /// Key name with no console binding.
    UnknownKey(String),
    /// Leave the loop.
    Quit,
}

impl Input {
    /// Classifies one input line. Lines starting with `:` are directives; anything else is
    /// submitted as a command line.
    pub fn parse(line: &str) -> Self {
        let Some(directive) = line.strip_prefix(':') else {
            return Self::Submit(line.to_string());
        };
        if directive == "quit" || directive == "q" {
            return Self::Quit;
        }
        if let Some(text) = directive.strip_prefix("type ") {
            return Self::Type(text.to_string());
        }
        match key_action(directive.trim()) {
            Some(action) => Self::Key(action),
            None => Self::UnknownKey(directive.trim().to_string()),
        }
    }
}

/// Drives a [`DevConsole`] from line input and writes what a renderer would show.
pub struct Session<'a> {
    console: &'a mut DevConsole,
    logs: HostLogBuffer,
}

impl<'a> Session<'a> {
    /// Session over `console`, forwarding `logs` into its transcript once per frame.
    pub fn new(console: &'a mut DevConsole, logs: HostLogBuffer) -> Self {
        Self { console, logs }
    }

    /// Reads lines until end of input or `:quit`.
    pub fn run(&mut self, input: impl BufRead, output: &mut impl Write) -> ReplResult<()> {
        self.frame(output)?;
        for line in input.lines() {
            let line = line?;
            let line = line.trim_end_matches(['\r', '\n']);
            if !self.apply(Input::parse(line), output)? {
                break;
            }
            self.frame(output)?;
        }
        Ok(())
    }

    fn apply(&mut self, input: Input, output: &mut impl Write) -> ReplResult<bool> {
        match input {
            Input::Quit => return Ok(false),
            Input::Type(text) => self.console.set_text(&text),
            Input::Key(ConsoleAction::Submit) => self.submit(output)?,
            Input::Key(action) => {
                if !self.console.handle_action(action) {
                    writeln!(output, "(console closed; press :Backquote to open it)")?;
                }
            }
            Input::UnknownKey(key) => writeln!(output, "(unknown key {key:?})")?,
            Input::Submit(text) => {
                if !self.console.is_open() {
                    writeln!(output, "(console closed; press :Backquote to open it)")?;
                    return Ok(true);
                }
                self.console.set_text(&text);
                self.submit(output)?;
            }
        }
        Ok(true)
    }

    fn submit(&mut self, output: &mut impl Write) -> ReplResult<()> {
        if !self.console.is_open() {
            writeln!(output, "(console closed; press :Backquote to open it)")?;
            return Ok(());
        }
        if let Some(value) = self.console.submit() {
            if !value.is_nil() {
                writeln!(output, "= {}", render_value(&value))?;
            }
        }
        Ok(())
    }

    fn frame(&mut self, output: &mut impl Write) -> ReplResult<()> {
        self.logs.forward_to(self.console);
        for line in self.console.transcript().take_unread() {
            writeln!(output, "{}", render_line(&line))?;
        }

        if self.console.suggestions_visible() {
            let entries = self
                .console
                .suggestions()
                .into_iter()
                .map(|entry| {
                    if entry.selected {
                        format!("[{}]", entry.name)
                    } else {
                        entry.name
                    }
                })
                .collect::<Vec<_>>();
            writeln!(output, "  suggestions: {}", entries.join(" "))?;
        }
        if !self.console.text().is_empty() {
            writeln!(output, "  input: {}", self.console.text())?;
        }
        output.flush()?;

        if self.console.end_frame() {
            debug!("transcript scrolled to the newest line");
        }
        Ok(())
    }
}

fn render_line(line: &ConsoleLine) -> String {
    match line.severity {
        Severity::Info => line.text.clone(),
        Severity::Warn => format!("warning: {}", line.text),
        Severity::Error => format!("error: {}", line.text),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Text(text) => format!("{text:?}"),
        other => other.to_string(),
    }
}
