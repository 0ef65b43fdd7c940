//! Headless console-line syntax helpers shared by the evaluator and the suggestion engine.
//!
//! This crate intentionally implements only the small text layer the console needs: literal
//! conversion into typed [`Value`]s, nesting-aware field splitting, innermost call location, and
//! partial-token extraction for autocomplete. Every function here is total; malformed input
//! degrades to a fallback value or `None` instead of an error.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use console_contract::{Value, Vector2, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// Converts one argument token into a typed value.
///
/// Tries, in order: integer, float, float with an `f` suffix, bracketed vector of 2 to 4
/// components, and finally the trimmed text itself. A bracketed token with the wrong component
/// count, or with a non-numeric component, converts to [`Value::Nil`].
pub fn convert(token: &str) -> Value {
    convert_with(token, &mut |_| None)
}

/// Like [`convert`], but consults `resolve` first for each vector component.
///
/// The evaluator uses this to splice nested call results into vector literals such as
/// `[height(), 0, 1]`.
pub fn convert_with(token: &str, resolve: &mut dyn FnMut(&str) -> Option<Value>) -> Value {
    let token = token.trim();

    if let Ok(value) = token.parse::<i64>() {
        return Value::Int(value);
    }
    if let Some(value) = parse_float(token) {
        return Value::Float(value);
    }
    if let Some(value) = token.strip_suffix('f').and_then(parse_float) {
        return Value::Float(value);
    }
    if let Some(body) = token
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        return convert_vector(body, resolve);
    }

    Value::Text(token.to_string())
}

fn parse_float(token: &str) -> Option<f64> {
    // `inf`/`nan` words stay text.
    if !token.bytes().any(|byte| byte.is_ascii_digit()) {
        return None;
    }
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn convert_vector(body: &str, resolve: &mut dyn FnMut(&str) -> Option<Value>) -> Value {
    let fields = split_fields(body);
    if !(2..=4).contains(&fields.len()) {
        return Value::Nil;
    }

    let mut components = Vec::with_capacity(fields.len());
    for field in fields {
        let value = match resolve(field) {
            Some(value) => value,
            None => convert_with(field, &mut *resolve),
        };
        let Some(component) = value.as_float() else {
            return Value::Nil;
        };
        components.push(component);
    }

    match components[..] {
        [x, y] => Value::Vector2(Vector2 { x, y }),
        [x, y, z] => Value::Vector3(Vector3 { x, y, z }),
        [x, y, z, w] => Value::Vector4(Vector4 { x, y, z, w }),
        _ => Value::Nil,
    }
}

/// Splits argument text on top-level commas, never inside `(...)` or `[...]`.
///
/// Fields are trimmed. Blank text yields no fields.
pub fn split_fields(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (index, ch) in text.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                fields.push(text[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    fields.push(text[start..].trim());
    fields
}

/// One reducible call site inside a (partially substituted) console line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Function name.
    pub name: String,
    /// Byte offset of the first character of the name.
    pub start: usize,
    /// Byte offset one past the closing parenthesis.
    pub end: usize,
    /// Raw text between the parentheses.
    pub args: String,
}

/// Locates the left-most call whose argument text contains no further parentheses.
///
/// A call is a run of word characters immediately followed by `(`. A `(` without a name in
/// front of it blocks any call it encloses from being innermost.
pub fn find_innermost_call(line: &str) -> Option<CallSite> {
    let mut open: Option<(usize, usize)> = None;

    for (index, ch) in line.char_indices() {
        match ch {
            '(' => {
                let name_start = name_start_before(line, index);
                open = (name_start < index).then_some((name_start, index));
            }
            ')' => {
                if let Some((start, paren)) = open.take() {
                    return Some(CallSite {
                        name: line[start..paren].to_string(),
                        start,
                        end: index + 1,
                        args: line[paren + 1..index].to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    None
}

fn name_start_before(line: &str, paren: usize) -> usize {
    line[..paren]
        .char_indices()
        .rev()
        .take_while(|(_, ch)| is_word_char(*ch))
        .last()
        .map(|(index, _)| index)
        .unwrap_or(paren)
}

/// Word characters accepted in command names.
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Returns whether the line contains any parenthesis.
pub fn has_parenthesis(line: &str) -> bool {
    line.contains(['(', ')'])
}

/// Byte offset of the last `(` that has no matching `)` after it.
pub fn last_unmatched_paren(text: &str) -> Option<usize> {
    let mut stack = Vec::new();
    for (index, ch) in text.char_indices() {
        match ch {
            '(' => stack.push(index),
            ')' => {
                stack.pop();
            }
            _ => {}
        }
    }
    stack.pop()
}

/// Splits input into the preserved head and the trailing partial token being typed.
///
/// The head ends with the last unmatched `(` (inclusive); without one the whole text is the
/// partial token. Leading whitespace of the partial token is not part of it.
pub fn split_partial(text: &str) -> (&str, &str) {
    let split = last_unmatched_paren(text).map(|index| index + 1).unwrap_or(0);
    let (head, tail) = text.split_at(split);
    (head, tail.trim_start())
}

/// The trailing partial token used for autocomplete.
pub fn partial_token(text: &str) -> &str {
    split_partial(text).1
}
