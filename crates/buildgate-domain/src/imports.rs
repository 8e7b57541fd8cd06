//! Import clause scanning for Go sources.
//!
//! Only the prologue of a file is read: the package clause followed by any number of
//! `import` declarations. Scanning stops at the first other top-level token.

/// One imported package path and the 1-based line it appears on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportRef {
    pub path: String,
    pub line: u32,
}

/// Why an import clause could not be read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub line: u32,
    pub reason: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

pub fn scan_imports(source: &str) -> Result<Vec<ImportRef>, ParseError> {
    let mut s = Scanner::new(source);

    s.skip_trivia()?;
    if s.word() != Some("package") {
        return Err(s.error("missing package clause"));
    }
    s.skip_trivia()?;
    if s.word().is_none() {
        return Err(s.error("missing package name"));
    }

    let mut imports = Vec::new();
    loop {
        s.skip_trivia_and_semicolons()?;
        let checkpoint = s.pos;
        if s.word() != Some("import") {
            s.pos = checkpoint;
            break;
        }
        s.skip_trivia()?;
        if s.eat(b'(') {
            loop {
                s.skip_trivia_and_semicolons()?;
                if s.eat(b')') {
                    break;
                }
                if s.at_end() {
                    return Err(s.error("unterminated import block"));
                }
                imports.push(s.import_spec()?);
            }
        } else {
            imports.push(s.import_spec()?);
        }
    }
    Ok(imports)
}

/// An import is external when its first element looks like a host name and it is not part
/// of the project's own import path.
pub fn is_external(import: &str, own_import_path: Option<&str>) -> bool {
    let first = import.split('/').next().unwrap_or_default();
    if !first.contains('.') {
        return false;
    }
    match own_import_path {
        Some(own) if !own.is_empty() => {
            let own = own.trim_end_matches('/');
            !(import == own || import.starts_with(&format!("{own}/")))
        }
        _ => true,
    }
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        // A leading BOM is allowed by the Go spec.
        let pos = if src.starts_with('\u{feff}') { 3 } else { 0 };
        Self {
            src,
            bytes: src.as_bytes(),
            pos,
            line: 1,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error(&self, reason: &str) -> ParseError {
        ParseError {
            line: self.line,
            reason: reason.to_string(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.bump();
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    let start = self.line;
                    self.pos += 2;
                    loop {
                        match self.bump() {
                            Some(b'*') if self.peek() == Some(b'/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(ParseError {
                                    line: start,
                                    reason: "unterminated block comment".to_string(),
                                });
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_trivia_and_semicolons(&mut self) -> Result<(), ParseError> {
        loop {
            self.skip_trivia()?;
            if !self.eat(b';') {
                return Ok(());
            }
        }
    }

    /// Identifier (ASCII letters, digits, `_`, or any non-ASCII letter bytes).
    fn word(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80 {
                self.pos += 1;
            } else {
                break;
            }
        }
        (self.pos > start).then(|| &self.src[start..self.pos])
    }

    fn import_spec(&mut self) -> Result<ImportRef, ParseError> {
        // Optional package name: identifier, `.` or `_`.
        if !self.eat(b'.') {
            self.word();
        }
        self.skip_trivia()?;
        let line = self.line;
        let path = match self.peek() {
            Some(b'"') => self.interpreted_string()?,
            Some(b'`') => self.raw_string()?,
            _ => return Err(self.error("expected import path string")),
        };
        Ok(ImportRef { path, line })
    }

    fn interpreted_string(&mut self) -> Result<String, ParseError> {
        let line = self.line;
        self.bump();
        let mut out = Vec::new();
        loop {
            match self.bump() {
                Some(b'"') => break,
                Some(b'\\') => match self.bump() {
                    Some(b'\n') | None => return Err(unterminated(line)),
                    Some(b) => out.push(b),
                },
                Some(b'\n') | None => return Err(unterminated(line)),
                Some(b) => out.push(b),
            }
        }
        String::from_utf8(out).map_err(|_| unterminated(line))
    }

    fn raw_string(&mut self) -> Result<String, ParseError> {
        let line = self.line;
        self.bump();
        let start = self.pos;
        loop {
            match self.bump() {
                Some(b'`') => return Ok(self.src[start..self.pos - 1].to_string()),
                Some(_) => {}
                None => return Err(unterminated(line)),
            }
        }
    }
}

fn unterminated(line: u32) -> ParseError {
    ParseError {
        line,
        reason: "unterminated import path string".to_string(),
    }
}
