use console_syntax::{partial_token, split_partial};

use crate::history::NavDirection;

/// One autocomplete candidate as a renderer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionEntry {
    /// Command name.
    pub name: String,
    /// Byte length of the prefix of `name` that matched the partial token.
    pub matched_len: usize,
    /// Whether the selection cursor is on this entry.
    pub selected: bool,
}

/// Incremental command-name filter with a selection cursor.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    matches: Vec<String>,
    partial_chars: usize,
    cursor: Option<usize>,
    focused: bool,
}

impl SuggestionEngine {
    /// Recomputes suggestions for `text` against `names`, keeping their order.
    pub fn refresh(&mut self, text: &str, names: &[String]) {
        let partial = partial_token(text);
        self.partial_chars = partial.chars().count();
        self.matches = if partial.is_empty() {
            Vec::new()
        } else {
            names
                .iter()
                .filter(|name| starts_with_ignore_case(name, partial))
                .cloned()
                .collect()
        };

        if self.matches.is_empty() {
            self.reset_cursor();
        } else if let Some(index) = self.cursor {
            self.cursor = Some(index.min(self.matches.len() - 1));
        }
    }

    /// Whether the suggestion panel has anything to show.
    pub fn is_visible(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Whether up/down currently drive the suggestion cursor.
    pub fn is_focused(&self) -> bool {
        self.focused && self.is_visible()
    }

    /// Switches focus between history and suggestions. Returns the new focus.
    ///
    /// Focusing selects the first suggestion; unfocusing clears the selection.
    pub fn toggle_focus(&mut self) -> bool {
        self.focused = !self.focused && self.is_visible();
        self.cursor = self.focused.then_some(0);
        self.focused
    }

    /// Moves the selection circularly.
    pub fn cycle(&mut self, direction: NavDirection) {
        let len = self.matches.len();
        if len == 0 {
            return;
        }
        self.cursor = Some(match (direction, self.cursor) {
            (NavDirection::Up, None) => 0,
            (NavDirection::Up, Some(index)) => (index + 1) % len,
            (NavDirection::Down, None) => len - 1,
            (NavDirection::Down, Some(index)) => (index + len - 1) % len,
        });
    }

    /// Clears the selection and focus.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
        self.focused = false;
    }

    /// Selected suggestion, if any.
    pub fn selected(&self) -> Option<&str> {
        self.cursor
            .and_then(|index| self.matches.get(index))
            .map(String::as_str)
    }

    /// First suggestion, if any.
    pub fn first(&self) -> Option<&str> {
        self.matches.first().map(String::as_str)
    }

    /// Matching names in registry order.
    pub fn names(&self) -> &[String] {
        &self.matches
    }

    /// Render data for every suggestion.
    pub fn entries(&self) -> Vec<SuggestionEntry> {
        self.matches
            .iter()
            .enumerate()
            .map(|(index, name)| SuggestionEntry {
                name: name.clone(),
                matched_len: name
                    .char_indices()
                    .nth(self.partial_chars)
                    .map_or(name.len(), |(offset, _)| offset),
                selected: self.cursor == Some(index),
            })
            .collect()
    }

    /// Replaces the trailing partial token of `text` with `name`.
    pub fn accept(text: &str, name: &str) -> String {
        let (head, _) = split_partial(text);
        format!("{head}{name}")
    }
}

fn starts_with_ignore_case(name: &str, prefix: &str) -> bool {
    let mut name = name.chars();
    prefix.chars().all(|expected| {
        name.next()
            .is_some_and(|actual| actual.to_lowercase().eq(expected.to_lowercase()))
    })
}
