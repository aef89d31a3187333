//! Module specifier scanner.
//!
//! A lexical pass over JavaScript source that picks out the string operands of
//! `import`, `export … from` and `require(…)` without building a syntax tree.
//! Comments, string literals and template literals are skipped so keywords
//! inside them are not mistaken for statements.

/// How far past `import`/`export` to look for the `from` clause.
const FROM_SEARCH_LIMIT: usize = 1000;

/// Syntactic form a specifier was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import x from "m"` or `import "m"`.
    Static,
    /// `import("m")`.
    Dynamic,
    /// `export … from "m"`.
    ReExport,
    /// `require("m")`.
    Require,
}

/// A module specifier found in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    /// Specifier exactly as written between the quotes.
    pub raw: String,
    pub kind: ImportKind,
    /// 1-indexed line of the keyword that introduced it.
    pub line: u32,
}

/// Scan source for module specifiers, in order of appearance.
///
/// Duplicates are kept; callers decide how to collapse them.
#[must_use]
pub fn scan_specifiers(source: &str) -> Vec<Specifier> {
    let mut cursor = Cursor::new(source);
    let mut found = Vec::new();

    while let Some(c) = cursor.peek(0) {
        if cursor.skip_comment() {
            continue;
        }
        if c == '"' || c == '\'' {
            let _ = cursor.read_quoted();
            continue;
        }
        if c == '`' {
            cursor.skip_template();
            continue;
        }

        let line = cursor.line;
        let hit = if cursor.at_keyword("import") {
            cursor.advance(6);
            scan_import(&mut cursor)
        } else if cursor.at_keyword("export") {
            cursor.advance(6);
            scan_export(&mut cursor)
        } else if cursor.at_keyword("require") {
            cursor.advance(7);
            scan_require(&mut cursor)
        } else {
            cursor.bump();
            continue;
        };

        if let Some((raw, kind)) = hit {
            if !raw.is_empty() {
                found.push(Specifier { raw, kind, line });
            }
        }
    }

    found
}

fn scan_import(cursor: &mut Cursor) -> Option<(String, ImportKind)> {
    let mark = cursor.mark();
    cursor.skip_whitespace();

    match cursor.peek(0) {
        Some('(') => {
            cursor.bump();
            cursor.skip_whitespace();
            if let Some(spec) = cursor.read_quoted() {
                return Some((spec, ImportKind::Dynamic));
            }
        }
        Some('"' | '\'') => {
            if let Some(spec) = cursor.read_quoted() {
                return Some((spec, ImportKind::Static));
            }
        }
        // import.meta
        Some('.') => {}
        Some(_) => {
            if let Some(spec) = find_from_clause(cursor) {
                return Some((spec, ImportKind::Static));
            }
        }
        None => {}
    }

    cursor.restore(mark);
    None
}

fn scan_export(cursor: &mut Cursor) -> Option<(String, ImportKind)> {
    let mark = cursor.mark();
    if let Some(spec) = find_from_clause(cursor) {
        return Some((spec, ImportKind::ReExport));
    }
    cursor.restore(mark);
    None
}

fn scan_require(cursor: &mut Cursor) -> Option<(String, ImportKind)> {
    let mark = cursor.mark();
    cursor.skip_inline_whitespace();
    if cursor.peek(0) == Some('(') {
        cursor.bump();
        cursor.skip_inline_whitespace();
        if let Some(spec) = cursor.read_quoted() {
            return Some((spec, ImportKind::Require));
        }
    }
    cursor.restore(mark);
    None
}

/// Walk forward to `from "<spec>"`, stopping at the end of the statement.
fn find_from_clause(cursor: &mut Cursor) -> Option<String> {
    let start = cursor.pos;
    while let Some(c) = cursor.peek(0) {
        if c == ';' || cursor.pos > start + FROM_SEARCH_LIMIT {
            return None;
        }
        if cursor.at_keyword("from") {
            cursor.advance(4);
            cursor.skip_whitespace();
            return cursor.read_quoted();
        }
        cursor.bump();
    }
    None
}

#[derive(Clone, Copy)]
struct Mark {
    pos: usize,
    line: u32,
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: u32,
}

impl Cursor {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek(0) {
            if c == '\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
        }
    }

    fn restore(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
    }

    fn skip_whitespace(&mut self) {
        while self.peek(0).is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn skip_inline_whitespace(&mut self) {
        while self.peek(0).is_some_and(|c| c.is_whitespace() && c != '\n') {
            self.bump();
        }
    }

    /// Skip a `//` or `/* */` comment at the cursor. Returns whether one was skipped.
    fn skip_comment(&mut self) -> bool {
        match (self.peek(0), self.peek(1)) {
            (Some('/'), Some('/')) => {
                while self.peek(0).is_some_and(|c| c != '\n') {
                    self.bump();
                }
                true
            }
            (Some('/'), Some('*')) => {
                self.advance(2);
                while let Some(c) = self.peek(0) {
                    if c == '*' && self.peek(1) == Some('/') {
                        self.advance(2);
                        break;
                    }
                    self.bump();
                }
                true
            }
            _ => false,
        }
    }

    /// Skip a template literal at the cursor, interpolations included.
    fn skip_template(&mut self) {
        self.bump();
        while let Some(c) = self.peek(0) {
            match c {
                '`' => {
                    self.bump();
                    return;
                }
                '\\' => self.advance(2),
                '$' if self.peek(1) == Some('{') => {
                    self.advance(2);
                    self.skip_interpolation();
                }
                _ => self.bump(),
            }
        }
    }

    /// Skip past the `}` closing the interpolation the cursor is inside.
    fn skip_interpolation(&mut self) {
        let mut depth = 1usize;
        while let Some(c) = self.peek(0) {
            if self.skip_comment() {
                continue;
            }
            match c {
                '{' => {
                    depth += 1;
                    self.bump();
                }
                '}' => {
                    depth -= 1;
                    self.bump();
                    if depth == 0 {
                        return;
                    }
                }
                '"' | '\'' => {
                    let _ = self.read_quoted();
                }
                '`' => self.skip_template(),
                _ => self.bump(),
            }
        }
    }

    /// Keyword at the cursor with identifier boundaries on both sides.
    fn at_keyword(&self, keyword: &str) -> bool {
        let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';

        if self.pos > 0 && is_ident(self.chars[self.pos - 1]) {
            return false;
        }
        let len = keyword.chars().count();
        if !keyword
            .chars()
            .enumerate()
            .all(|(i, k)| self.peek(i) == Some(k))
        {
            return false;
        }
        !self.peek(len).is_some_and(is_ident)
    }

    /// Read a quoted literal at the cursor, consuming the closing quote.
    ///
    /// Returns `None` (leaving the cursor past what was consumed) when the
    /// cursor is not on a quote, the literal is unterminated, a `'`/`"`
    /// literal crosses a newline, or a template literal interpolates.
    fn read_quoted(&mut self) -> Option<String> {
        let quote = self.peek(0).filter(|c| matches!(c, '"' | '\'' | '`'))?;
        self.bump();

        let mut value = String::new();
        while let Some(c) = self.peek(0) {
            match c {
                c if c == quote => {
                    self.bump();
                    return Some(value);
                }
                '\\' => {
                    self.bump();
                    if let Some(escaped) = self.peek(0) {
                        value.push(escaped);
                        self.bump();
                    }
                }
                '\n' if quote != '`' => return None,
                '$' if quote == '`' && self.peek(1) == Some('{') => return None,
                _ => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        None
    }
}
