use console_contract::{CommandDescriptor, ConsoleError, ParamKind, Value};

use crate::{
    registry::{CommandRegistry, RegisteredCommand},
    transcript::Transcript,
};

const CATEGORY: &str = "Utility";

/// Registers `help`, `clear`, and `print` against `registry`, writing to `transcript`.
pub(crate) fn register_builtins(
    registry: &CommandRegistry,
    transcript: &Transcript,
) -> Result<(), ConsoleError> {
    let weak = registry.downgrade();
    let out = transcript.clone();
    registry.register(
        RegisteredCommand::bound("help", Vec::new(), move |_| {
            if let Some(registry) = weak.upgrade() {
                for line in help_lines(&registry.descriptors()) {
                    out.info(line);
                }
            }
            Ok(Value::Nil)
        })
        .with_description("Show all registered commands.")
        .with_category(CATEGORY),
    )?;

    let out = transcript.clone();
    registry.register(
        RegisteredCommand::action("clear", move || out.clear())
            .with_description("Clear the console.")
            .with_category(CATEGORY),
    )?;

    let out = transcript.clone();
    registry.register(
        RegisteredCommand::bound("print", vec![ParamKind::Text, ParamKind::Int], move |args| {
            let text = args.text(0)?;
            for _ in 0..args.int(1)?.max(0) {
                out.info(text);
            }
            Ok(Value::Nil)
        })
        .with_description("Print the typed text in the console a number of times.")
        .with_category(CATEGORY),
    )?;

    Ok(())
}

/// Help listing: categories in first-appearance order, uncategorized commands last.
pub(crate) fn help_lines(descriptors: &[CommandDescriptor]) -> Vec<String> {
    let mut lines = vec![
        "=== Command List ===".to_string(),
        "This is a list of all available commands:".to_string(),
        String::new(),
    ];

    let mut categories: Vec<&str> = Vec::new();
    for category in descriptors.iter().filter_map(|d| d.category.as_deref()) {
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    for category in categories {
        lines.push(format!("# {category} #"));
        lines.extend(
            descriptors
                .iter()
                .filter(|d| d.category.as_deref() == Some(category))
                .map(entry_line),
        );
        lines.push(String::new());
    }

    let uncategorized = descriptors
        .iter()
        .filter(|d| d.category.is_none())
        .map(entry_line)
        .collect::<Vec<_>>();
    if !uncategorized.is_empty() {
        lines.push("# Uncategorized #".to_string());
        lines.extend(uncategorized);
        lines.push(String::new());
    }

    lines.push(
        "Use TAB to toggle between command history and suggestions, then UP and DOWN to navigate."
            .to_string(),
    );
    lines.push(
        "Vectors of 2, 3 and 4 components are written in square brackets, e.g. \"[0, 0]\"."
            .to_string(),
    );
    lines.push("=== End of the List ===".to_string());
    lines
}

fn entry_line(descriptor: &CommandDescriptor) -> String {
    match &descriptor.description {
        Some(description) => format!("- {}: {description}", descriptor.signature()),
        None => format!("- {}", descriptor.signature()),
    }
}
