use std::collections::VecDeque;

/// Direction of an up/down keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    /// Toward older history entries.
    Up,
    /// Toward newer entries and finally the draft.
    Down,
}

/// Bounded, most-recent-first log of submitted lines with a navigation cursor.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<String>,
    capacity: usize,
    cursor: Option<usize>,
    draft: String,
}

impl HistoryBuffer {
    /// Empty buffer holding at most `capacity` lines.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            cursor: None,
            draft: String::new(),
        }
    }

    /// Records a submitted line and resets navigation.
    ///
    /// Resubmitting the most recent line does not grow the buffer.
    pub fn push(&mut self, line: &str) {
        self.cursor = None;
        if self.entries.front().is_some_and(|latest| latest == line) {
            return;
        }
        self.entries.push_front(line.to_string());
        self.entries.truncate(self.capacity);
    }

    /// Moves the cursor and returns the text the input should show.
    ///
    /// `draft` is remembered when navigation starts and restored when the cursor returns past
    /// the newest entry.
    pub fn navigate(&mut self, direction: NavDirection, draft: &str) -> String {
        if self.cursor.is_none() {
            self.draft = draft.to_string();
        }

        self.cursor = match (direction, self.cursor) {
            (NavDirection::Up, _) if self.entries.is_empty() => None,
            (NavDirection::Up, None) => Some(0),
            (NavDirection::Up, Some(index)) => Some((index + 1).min(self.entries.len() - 1)),
            (NavDirection::Down, None | Some(0)) => None,
            (NavDirection::Down, Some(index)) => Some(index - 1),
        };

        match self.cursor {
            Some(index) => self.entries[index].clone(),
            None => self.draft.clone(),
        }
    }

    /// Returns navigation to the draft position.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Current cursor; `None` is the draft position.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Whether the input currently shows a history entry.
    pub fn is_navigating(&self) -> bool {
        self.cursor.is_some()
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of stored lines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing has been submitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
