//! Converting raw tool output lines into inert display markup.
//!
//! SGR colour and emphasis sequences become `<span style="…">` markup, every
//! other escape sequence and control character is dropped, text is
//! XML-escaped, and leading spaces become `&nbsp;` so indentation survives a
//! whitespace-collapsing display. Each line is converted on its own and
//! closes every span it opens.

use std::fmt::Write;

/// The 16 base colours, normal then bright.
const PALETTE: [&str; 16] = [
    "#000", "#A00", "#0A0", "#A50", "#00A", "#A0A", "#0AA", "#AAA", "#555", "#F55", "#5F5",
    "#FF5", "#55F", "#F5F", "#5FF", "#FFF",
];

/// Channel levels of the 6x6x6 colour cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

const ESC: char = '\u{1b}';
const BEL: char = '\u{7}';

/// One line of output, ready for a display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// Inert markup for rich displays.
    pub markup: String,
    /// The visible text with escapes removed, for plain displays.
    pub text: String,
}

/// Render one raw output line.
#[must_use]
pub fn render_line(raw: &str) -> RenderedLine {
    let mut out = LineWriter::default();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != ESC {
            if !c.is_control() || c == '\t' {
                out.push_visible(c);
            }
            continue;
        }

        match chars.next() {
            Some('[') => {
                let mut params = String::new();
                let mut terminator = None;
                for next in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&next) {
                        terminator = Some(next);
                        break;
                    }
                    params.push(next);
                }
                if terminator == Some('m') {
                    out.apply_sgr(&params);
                }
            }
            // OSC: runs to BEL or ESC \
            Some(']') => {
                while let Some(next) = chars.next() {
                    if next == BEL {
                        break;
                    }
                    if next == ESC && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            // Charset designation takes one more character.
            Some('(' | ')' | '*' | '+') => {
                chars.next();
            }
            _ => {}
        }
    }

    out.finish()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Style {
    bold: bool,
    italic: bool,
    underline: bool,
    fg: Option<String>,
    bg: Option<String>,
}

impl Style {
    fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    fn css(&self) -> String {
        let mut parts = Vec::new();
        if self.bold {
            parts.push("font-weight:bold".to_string());
        }
        if self.italic {
            parts.push("font-style:italic".to_string());
        }
        if self.underline {
            parts.push("text-decoration:underline".to_string());
        }
        if let Some(fg) = &self.fg {
            parts.push(format!("color:{fg}"));
        }
        if let Some(bg) = &self.bg {
            parts.push(format!("background-color:{bg}"));
        }
        parts.join(";")
    }

    fn apply(&mut self, codes: &[u16]) {
        let mut i = 0;
        while i < codes.len() {
            match codes[i] {
                0 => *self = Self::default(),
                1 => self.bold = true,
                3 => self.italic = true,
                4 => self.underline = true,
                22 => self.bold = false,
                23 => self.italic = false,
                24 => self.underline = false,
                n @ 30..=37 => self.fg = Some(PALETTE[usize::from(n - 30)].to_string()),
                n @ 90..=97 => self.fg = Some(PALETTE[usize::from(n - 90 + 8)].to_string()),
                39 => self.fg = None,
                n @ 40..=47 => self.bg = Some(PALETTE[usize::from(n - 40)].to_string()),
                n @ 100..=107 => self.bg = Some(PALETTE[usize::from(n - 100 + 8)].to_string()),
                49 => self.bg = None,
                n @ (38 | 48) => {
                    let (color, used) = extended_color(&codes[i + 1..]);
                    i += used;
                    if let Some(color) = color {
                        if n == 38 {
                            self.fg = Some(color);
                        } else {
                            self.bg = Some(color);
                        }
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }
}

/// Parse the tail of a 38/48 sequence. Returns the colour and how many codes it used.
fn extended_color(rest: &[u16]) -> (Option<String>, usize) {
    match rest {
        [5, n, ..] => (Some(color_256(*n)), 2),
        [2, r, g, b, ..] => (
            Some(format!(
                "#{:02x}{:02x}{:02x}",
                (*r).min(255),
                (*g).min(255),
                (*b).min(255)
            )),
            4,
        ),
        [5] => (None, 1),
        [2, ..] => (None, rest.len()),
        _ => (None, 0),
    }
}

fn color_256(n: u16) -> String {
    match n {
        0..=15 => PALETTE[usize::from(n)].to_string(),
        16..=231 => {
            let idx = usize::from(n - 16);
            let r = CUBE_LEVELS[idx / 36];
            let g = CUBE_LEVELS[(idx % 36) / 6];
            let b = CUBE_LEVELS[idx % 6];
            format!("#{r:02x}{g:02x}{b:02x}")
        }
        _ => {
            let level = (n.min(255) - 232) * 10 + 8;
            format!("#{level:02x}{level:02x}{level:02x}")
        }
    }
}

#[derive(Default)]
struct LineWriter {
    markup: String,
    text: String,
    style: Style,
    span_open: bool,
    seen_visible: bool,
}

impl LineWriter {
    fn apply_sgr(&mut self, params: &str) {
        // Private-mode and malformed sequences are dropped.
        if !params.bytes().all(|b| b.is_ascii_digit() || b == b';') {
            return;
        }
        let codes: Vec<u16> = params
            .split(';')
            .map(|p| p.parse().unwrap_or(0))
            .collect();
        let before = self.style.clone();
        self.style.apply(&codes);
        if self.style != before {
            self.close_span();
        }
    }

    fn close_span(&mut self) {
        if self.span_open {
            self.markup.push_str("</span>");
            self.span_open = false;
        }
    }

    fn push_visible(&mut self, c: char) {
        if !self.span_open && !self.style.is_plain() {
            let _ = write!(self.markup, "<span style=\"{}\">", self.style.css());
            self.span_open = true;
        }

        match c {
            ' ' if !self.seen_visible => self.markup.push_str("&nbsp;"),
            '&' => self.markup.push_str("&amp;"),
            '<' => self.markup.push_str("&lt;"),
            '>' => self.markup.push_str("&gt;"),
            _ => self.markup.push(c),
        }
        if c != ' ' {
            self.seen_visible = true;
        }
        self.text.push(c);
    }

    fn finish(mut self) -> RenderedLine {
        self.close_span();
        RenderedLine {
            markup: self.markup,
            text: self.text,
        }
    }
}
