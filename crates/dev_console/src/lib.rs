//! Interactive developer-console engine: command registry, nested-call evaluator, target
//! resolution, autocomplete, and history.
//!
//! The engine is single-threaded and event-driven. A host feeds it text changes, keystroke
//! actions, and submits through [`DevConsole`]; everything the console wants shown comes back as
//! `(text, severity)` lines on its [`Transcript`]. Rendering, key polling, and object lifecycles
//! stay with the host.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod args;
mod builtins;
mod console;
mod eval;
mod history;
mod invoke;
mod options;
mod registry;
mod suggest;
mod target;
mod transcript;

pub use args::Args;
pub use console::{key_action, ConsoleAction, DevConsole};
pub use eval::Evaluator;
pub use history::{HistoryBuffer, NavDirection};
pub use options::ConsoleOptions;
pub use registry::{
    ActionHandler, BoundHandler, CallResolution, CommandOutcome, CommandRegistry, CommandTarget,
    Instance, Invoker, MethodEntry, MethodHandler, RegisteredCommand, TypeKey,
};
pub use suggest::{SuggestionEngine, SuggestionEntry};
pub use target::{InstanceLookup, InstancePool, NoInstances, TargetResolver};
pub use transcript::{DeferredScroll, Transcript};

pub use console_contract::{
    CommandDescriptor, CommandFault, ConsoleError, ConsoleLine, ParamKind, Severity, TargetMode,
    Value, Vector2, Vector3, Vector4,
};
