//! Output seams: where rendered lines and error notifications go.

use super::render::RenderedLine;

/// Live view of an install's output, implemented by the front-end.
///
/// Only the orchestrator writes to it.
pub trait DisplaySurface {
    fn set_title(&mut self, title: &str);
    fn clear(&mut self);
    fn append_line(&mut self, line: &RenderedLine);
    fn show(&mut self);
    fn hide(&mut self);
}

/// One-shot error notifications (binary not found, spawn failures, …).
pub trait Notifier {
    fn error(&mut self, message: &str);
}

/// A surface that keeps everything in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySurface {
    pub title: String,
    pub lines: Vec<RenderedLine>,
    pub visible: bool,
}

impl DisplaySurface for MemorySurface {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn clear(&mut self) {
        self.lines.clear();
    }

    fn append_line(&mut self, line: &RenderedLine) {
        self.lines.push(line.clone());
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

/// Collects notifications instead of showing them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryNotifier {
    pub errors: Vec<String>,
}

impl Notifier for MemoryNotifier {
    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}
