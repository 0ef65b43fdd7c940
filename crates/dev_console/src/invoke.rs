use std::panic::{self, AssertUnwindSafe};

use console_contract::{CommandFault, ConsoleError, Value};
use tracing::{debug, error};

use crate::{
    args::Args,
    registry::{CallResolution, CommandOutcome, CommandRegistry, Invoker},
    target::TargetResolver,
};

/// Resolves `name` by arity and runs it against its receivers.
///
/// Lookup failures come back as `NotFound`/`ArityMismatch`. A failing body comes back as
/// `InvocationFault`; the caller decides whether the line continues.
pub(crate) fn invoke_call(
    registry: &CommandRegistry,
    resolver: &TargetResolver,
    name: &str,
    args: &[Value],
) -> Result<Value, ConsoleError> {
    let command = match registry.resolve_for_call(name, args.len()) {
        CallResolution::Found(command) => command,
        CallResolution::NotFound => {
            return Err(ConsoleError::NotFound {
                name: name.to_string(),
            })
        }
        CallResolution::ArityMismatch(candidates) => {
            return Err(ConsoleError::ArityMismatch {
                name: name.to_string(),
                expected: candidates.iter().map(|c| c.signature()).collect(),
                received: args.iter().map(|a| a.kind_name().to_string()).collect(),
            })
        }
    };

    let args = Args::new(args);
    let fault = |fault: CommandFault| {
        error!(command = name, %fault, "command faulted");
        ConsoleError::InvocationFault {
            name: name.to_string(),
            fault,
        }
    };

    match &command.invoker {
        Invoker::Action(action) => {
            guarded(|| {
                action();
                Ok(Value::Nil)
            })
            .map_err(fault)
        }
        Invoker::Bound(handler) => guarded(|| handler(&args)).map_err(fault),
        Invoker::Method {
            declaring_type,
            handler,
        } => {
            let targets =
                resolver.resolve(declaring_type, command.descriptor.target_mode, registry);
            match targets.as_slice() {
                [] => {
                    debug!(
                        command = name,
                        target_type = declaring_type.name(),
                        mode = ?command.descriptor.target_mode,
                        "no live targets; call skipped"
                    );
                    Ok(Value::Nil)
                }
                [target] => guarded(|| handler(&**target, &args)).map_err(fault),
                many => {
                    debug!(command = name, targets = many.len(), "fan-out call");
                    let mut first_fault = None;
                    for target in many {
                        if let Err(err) = guarded(|| handler(&**target, &args)) {
                            let err = fault(err);
                            first_fault.get_or_insert(err);
                        }
                    }
                    first_fault.map_or(Ok(Value::Nil), Err)
                }
            }
        }
    }
}

/// Runs a command body, turning a panic into a fault.
fn guarded(body: impl FnOnce() -> CommandOutcome) -> CommandOutcome {
    panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "command panicked".to_string());
        Err(CommandFault::new(message))
    })
}
