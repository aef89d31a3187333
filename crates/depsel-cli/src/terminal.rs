//! Terminal front-end for the install display and error notifications.

use depsel_core::install::{DisplaySurface, Notifier, RenderedLine};
use std::io::Write;

/// Prints install output as plain text.
///
/// The title is printed as a header each time the surface is shown, and a
/// completion marker when it is hidden after a successful install.
pub struct TerminalSurface<W: Write> {
    out: W,
    title: String,
    visible: bool,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            title: String::new(),
            visible: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    // Display writes are best-effort; a closed stdout must not stop the install.
    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }
}

impl TerminalSurface<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> DisplaySurface for TerminalSurface<W> {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn clear(&mut self) {}

    fn append_line(&mut self, line: &RenderedLine) {
        self.write_line(&line.text);
    }

    fn show(&mut self) {
        self.visible = true;
        let header = format!("> {}", self.title);
        self.write_line(&header);
    }

    fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            let done = format!("> {} done", self.title);
            self.write_line(&done);
        }
    }
}

/// Prints notifications as `error: <message>` on stderr.
#[derive(Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn error(&mut self, message: &str) {
        eprintln!("error: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depsel_core::install::render_line;

    fn output(surface: TerminalSurface<Vec<u8>>) -> String {
        String::from_utf8(surface.into_inner()).unwrap()
    }

    #[test]
    fn test_show_prints_title_header() {
        let mut surface = TerminalSurface::new(Vec::new());
        surface.set_title("yarn add lodash");
        surface.clear();
        surface.show();
        assert_eq!(output(surface), "> yarn add lodash\n");
    }

    #[test]
    fn test_lines_are_printed_as_plain_text() {
        let mut surface = TerminalSurface::new(Vec::new());
        surface.append_line(&render_line("\u{1b}[32m+ lodash@4.17.21\u{1b}[39m"));
        surface.append_line(&render_line("  a < b & c"));
        assert_eq!(output(surface), "+ lodash@4.17.21\n  a < b & c\n");
    }

    #[test]
    fn test_hide_marks_completion_once() {
        let mut surface = TerminalSurface::new(Vec::new());
        surface.set_title("npm install a -S -d");
        surface.show();
        surface.hide();
        surface.hide();
        assert_eq!(
            output(surface),
            "> npm install a -S -d\n> npm install a -S -d done\n"
        );
    }

    #[test]
    fn test_hide_without_show_prints_nothing() {
        let mut surface = TerminalSurface::new(Vec::new());
        surface.hide();
        assert!(output(surface).is_empty());
    }
}
