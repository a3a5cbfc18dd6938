use std::collections::VecDeque;

use rusty_compass::diagnostics::forward_to_log;
use rusty_compass::{Diagnostic, DiagnosticSink};

/// Lines kept before the oldest are dropped.
const MAX_LINES: usize = 2000;

// ---------------------------------------------------------------------------
// In-app console
// ---------------------------------------------------------------------------

/// Diagnostic sink backing the console panel. Every line is also forwarded
/// to the `log` facade.
#[derive(Debug, Clone)]
pub struct Console {
    lines: VecDeque<Diagnostic>,
    capacity: usize,
    pub visible: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::with_capacity(MAX_LINES)
    }
}

impl Console {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
            visible: false,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &Diagnostic> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&Diagnostic> {
        self.lines.back()
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl DiagnosticSink for Console {
    fn emit(&mut self, diagnostic: Diagnostic) {
        forward_to_log(&diagnostic);
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(diagnostic);
    }
}
