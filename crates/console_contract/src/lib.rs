//! Shared developer-console contracts used by the headless syntax layer, the console engine, and
//! host applications.
//!
//! This crate is intentionally engine-agnostic. It defines serializable argument values, command
//! metadata, output lines, and the error taxonomy without depending on registry state, callables,
//! or any rendering surface.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Two-component float vector argument.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

/// Three-component float vector argument.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

/// Four-component float vector argument.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector4 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
    /// W component.
    pub w: f64,
}

/// Typed runtime value passed to and returned from console commands.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Value {
    /// No value: a command without a result, a fan-out call, or a malformed vector literal.
    #[default]
    Nil,
    /// Base-10 integer literal.
    Int(i64),
    /// Floating point literal, with or without the `f` suffix.
    Float(f64),
    /// `[x, y]` literal.
    Vector2(Vector2),
    /// `[x, y, z]` literal.
    Vector3(Vector3),
    /// `[x, y, z, w]` literal.
    Vector4(Vector4),
    /// Fallback for anything that is not numeric or a vector.
    Text(String),
}

impl Value {
    /// Short type name used in signatures and diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Vector2(_) => "vector2",
            Self::Vector3(_) => "vector3",
            Self::Vector4(_) => "vector4",
            Self::Text(_) => "string",
        }
    }

    /// Returns whether this is [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Numeric coercion used for vector components and float parameters.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Vector2(v) => write!(f, "[{}, {}]", v.x, v.y),
            Self::Vector3(v) => write!(f, "[{}, {}, {}]", v.x, v.y, v.z),
            Self::Vector4(v) => write!(f, "[{}, {}, {}, {}]", v.x, v.y, v.z, v.w),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Declared parameter type of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamKind {
    /// Integer parameter.
    Int,
    /// Float parameter; integer arguments are widened.
    Float,
    /// Two-component vector parameter.
    Vector2,
    /// Three-component vector parameter.
    Vector3,
    /// Four-component vector parameter.
    Vector4,
    /// Text parameter.
    Text,
    /// Accepts any value, including nested call results.
    Any,
}

impl ParamKind {
    /// Type name rendered in help listings and arity diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Vector2 => "vector2",
            Self::Vector3 => "vector3",
            Self::Vector4 => "vector4",
            Self::Text => "string",
            Self::Any => "any",
        }
    }
}

/// Policy controlling which receiver instance(s) a command is invoked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetMode {
    /// The command carries its own ready-to-call reference.
    #[default]
    Direct,
    /// The one live instance the host's object universe selects.
    Single,
    /// Every live instance of the declaring type.
    All,
    /// The singleton registered for the declaring type in the registry side table.
    Registry,
}

/// Registration metadata for one named command overload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// Command name; not unique across overloads.
    pub name: String,
    /// Optional one-line description shown by `help`.
    pub description: Option<String>,
    /// Optional grouping label for the help listing.
    pub category: Option<String>,
    /// Declared parameters, in call order.
    pub params: Vec<ParamKind>,
    /// Receiver resolution policy.
    pub target_mode: TargetMode,
    /// Declaring type name for non-direct commands.
    pub declaring_type: Option<String>,
}

impl CommandDescriptor {
    /// Creates a direct-mode descriptor without description or category.
    pub fn new(name: impl Into<String>, params: Vec<ParamKind>) -> Self {
        Self {
            name: name.into(),
            description: None,
            category: None,
            params,
            target_mode: TargetMode::Direct,
            declaring_type: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Declared parameter count.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Comma-separated parameter type names, e.g. `string, int`.
    pub fn parameters_string(&self) -> String {
        self.params
            .iter()
            .map(|param| param.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Full call signature, e.g. `print(string, int)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.parameters_string())
    }
}

/// Severity tag attached to every output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// Regular output.
    Info,
    /// Recoverable anomaly.
    Warn,
    /// Failed command or evaluation.
    Error,
}

/// One `(text, severity)` output pair routed to the logging collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleLine {
    /// Line text without trailing newline.
    pub text: String,
    /// Severity tag.
    pub severity: Severity,
}

impl ConsoleLine {
    /// Informational line.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Info,
        }
    }

    /// Warning line.
    pub fn warn(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Warn,
        }
    }

    /// Error line.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Error,
        }
    }
}

/// Failure raised by a command body.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct CommandFault {
    /// Human-readable message.
    pub message: String,
}

impl CommandFault {
    /// Creates a fault with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Argument at `index` did not have the expected type.
    pub fn type_mismatch(index: usize, expected: ParamKind, got: &Value) -> Self {
        Self::new(format!(
            "argument {index} expected {}, got {}",
            expected.name(),
            got.kind_name()
        ))
    }
}

/// Errors surfaced by registration, lookup, evaluation, and invocation.
///
/// None of these escape the console: each is reported as one or more [`ConsoleLine`]s through
/// [`ConsoleError::report_lines`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// No command with the given name is registered.
    #[error("Command \"{name}\" was not implemented. Type \"help\" for a list of implemented commands.")]
    NotFound {
        /// Requested command name.
        name: String,
    },
    /// The name matched but no overload accepts the received argument count.
    #[error("The parameters for the command \"{name}\" are invalid.")]
    ArityMismatch {
        /// Requested command name.
        name: String,
        /// Signatures of every same-named overload.
        expected: Vec<String>,
        /// Type names of the received arguments.
        received: Vec<String>,
    },
    /// The remaining line text matched no call pattern.
    #[error("Command \"{text}\" was not implemented. Type \"help\" for a list of implemented commands.")]
    Unresolved {
        /// Unmatched text.
        text: String,
    },
    /// The command body itself failed.
    #[error("Command \"{name}\" failed: {fault}")]
    InvocationFault {
        /// Command name.
        name: String,
        /// Fault raised by the body.
        #[source]
        fault: CommandFault,
    },
    /// A registration request was rejected.
    #[error("Could not register command \"{name}\": {reason}")]
    InvalidRegistration {
        /// Command name.
        name: String,
        /// Rejection reason.
        reason: String,
    },
}

impl ConsoleError {
    /// Renders the error as user-visible output lines.
    pub fn report_lines(&self) -> Vec<ConsoleLine> {
        match self {
            Self::ArityMismatch {
                expected, received, ..
            } => {
                let mut lines = vec![ConsoleLine::error(format!("{self} Expected:"))];
                lines.extend(expected.iter().cloned().map(ConsoleLine::error));
                lines.push(ConsoleLine::error("Received:"));
                lines.push(ConsoleLine::error(format!("({})", received.join(", "))));
                lines
            }
            _ => vec![ConsoleLine::error(self.to_string())],
        }
    }
}
