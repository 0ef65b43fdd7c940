use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use console_contract::{ConsoleLine, Severity};

/// Scroll-to-newest request that runs once the current rendering pass is done.
///
/// Scheduling while a request is already pending collapses into that request.
#[derive(Debug, Clone, Default)]
pub struct DeferredScroll {
    pending: Rc<Cell<bool>>,
}

impl DeferredScroll {
    /// Requests a scroll. Returns `false` when one was already pending.
    pub fn schedule(&self) -> bool {
        !self.pending.replace(true)
    }

    /// Consumes the pending request, if any.
    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }
}

#[derive(Debug)]
struct TranscriptState {
    lines: VecDeque<ConsoleLine>,
    characters: usize,
    max_characters: usize,
    unread: usize,
}

/// Character-bounded console output log.
///
/// Clones share the same log; command bodies hold a clone to write their output.
#[derive(Debug, Clone)]
pub struct Transcript {
    state: Rc<RefCell<TranscriptState>>,
    scroll: DeferredScroll,
}

impl Transcript {
    /// Empty transcript keeping at most `max_characters` characters.
    pub fn new(max_characters: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(TranscriptState {
                lines: VecDeque::new(),
                characters: 0,
                max_characters,
                unread: 0,
            })),
            scroll: DeferredScroll::default(),
        }
    }

    /// Appends a line and schedules a scroll to it.
    pub fn push(&self, line: ConsoleLine) {
        {
            let mut state = self.state.borrow_mut();
            state.characters += line_cost(&line);
            state.lines.push_back(line);
            state.unread += 1;
            while state.characters > state.max_characters && state.lines.len() > 1 {
                if let Some(dropped) = state.lines.pop_front() {
                    state.characters -= line_cost(&dropped);
                }
            }
            state.unread = state.unread.min(state.lines.len());
        }
        self.scroll.schedule();
    }

    /// Appends an informational line.
    pub fn info(&self, text: impl Into<String>) {
        self.push(ConsoleLine::info(text));
    }

    /// Appends a warning line.
    pub fn warn(&self, text: impl Into<String>) {
        self.push(ConsoleLine::warn(text));
    }

    /// Appends an error line.
    pub fn error(&self, text: impl Into<String>) {
        self.push(ConsoleLine::error(text));
    }

    /// Appends several lines in order.
    pub fn extend(&self, lines: impl IntoIterator<Item = ConsoleLine>) {
        for line in lines {
            self.push(line);
        }
    }

    /// Removes every line.
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.lines.clear();
        state.characters = 0;
        state.unread = 0;
    }

    /// Snapshot of the retained lines, oldest first.
    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.state.borrow().lines.iter().cloned().collect()
    }

    /// Retained line texts, oldest first.
    pub fn texts(&self) -> Vec<String> {
        self.state
            .borrow()
            .lines
            .iter()
            .map(|line| line.text.clone())
            .collect()
    }

    /// Lines appended since the previous call.
    pub fn take_unread(&self) -> Vec<ConsoleLine> {
        let mut state = self.state.borrow_mut();
        let skip = state.lines.len() - state.unread;
        state.unread = 0;
        state.lines.iter().skip(skip).cloned().collect()
    }

    /// Number of retained lines with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.state
            .borrow()
            .lines
            .iter()
            .filter(|line| line.severity == severity)
            .count()
    }

    /// Characters currently retained, counting one newline per line.
    pub fn characters(&self) -> usize {
        self.state.borrow().characters
    }

    /// Scroll request shared with this transcript.
    pub fn scroll(&self) -> &DeferredScroll {
        &self.scroll
    }
}

fn line_cost(line: &ConsoleLine) -> usize {
    line.text.chars().count() + 1
}
