use serde::{Deserialize, Serialize};

const DEFAULT_HISTORY_SIZE: usize = 100;
const DEFAULT_MAX_CHARACTERS: usize = 15_000;

/// Console behavior preferences.
///
/// Every field has a default so hosts can deserialize partial configuration tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleOptions {
    /// Whether the console starts visible.
    pub start_opened: bool,
    /// Echo name, argument count, and raw/final arguments of every reduced call.
    pub show_function_info: bool,
    /// Allow zero-argument commands without parentheses at the start of a line.
    pub quick_commands: bool,
    /// Enter completes the first suggestion when none is selected.
    pub always_autocomplete: bool,
    /// History capacity.
    pub history_size: usize,
    /// Transcript character budget; the oldest lines are dropped first.
    pub max_characters: usize,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            start_opened: false,
            show_function_info: false,
            quick_commands: true,
            always_autocomplete: false,
            history_size: DEFAULT_HISTORY_SIZE,
            max_characters: DEFAULT_MAX_CHARACTERS,
        }
    }
}
