use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

/// Largest value an integer constant may take (15-bit immediate).
pub const MAX_INT_CONST: u32 = 32767;

pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    /// Whether the previously emitted token was `.` — a reserved word
    /// directly after a dot is an ordinary identifier.
    after_dot: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            after_dot: false,
        }
    }

    /// Tokenize the whole unit. Stops at the first malformed lexeme.
    pub fn tokenize(mut self) -> Result<Vec<Spanned<Lexeme>>, Diagnostic> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.node == Lexeme::Eof;
            self.after_dot = tok.node == Lexeme::Dot;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Spanned<Lexeme>, Diagnostic> {
        self.skip_whitespace_and_comments()?;

        if self.pos >= self.bytes.len() {
            return Ok(self.make_token(Lexeme::Eof, self.pos, self.pos));
        }

        let start = self.pos;
        let ch = self.bytes[self.pos];

        if is_ident_start(ch) {
            return Ok(self.scan_ident_or_keyword());
        }

        if ch.is_ascii_digit() {
            return self.scan_number();
        }

        if ch == b'"' {
            return self.scan_string();
        }

        self.scan_symbol(start)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), Diagnostic> {
        loop {
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }

            // Line comments: `// ...` to end of line
            if self.pos + 1 < self.bytes.len()
                && self.bytes[self.pos] == b'/'
                && self.bytes[self.pos + 1] == b'/'
            {
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            // Block comments: `/* ... */` and the doc form `/** ... */`,
            // possibly spanning multiple lines
            if self.pos + 1 < self.bytes.len()
                && self.bytes[self.pos] == b'/'
                && self.bytes[self.pos + 1] == b'*'
            {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos + 1 >= self.bytes.len() {
                        self.pos = self.bytes.len();
                        return Err(Diagnostic::lex(
                            "unterminated block comment".to_string(),
                            Span::new(start as u32, self.pos as u32),
                        )
                        .with_help("close the comment with `*/`".to_string()));
                    }
                    if self.bytes[self.pos] == b'*' && self.bytes[self.pos + 1] == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }

            return Ok(());
        }
    }

    fn scan_ident_or_keyword(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.bytes.len() && is_ident_continue(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let text = &self.source[start..self.pos];
        let token = if self.after_dot {
            Lexeme::Ident(text.to_string())
        } else {
            Lexeme::from_keyword(text).unwrap_or_else(|| Lexeme::Ident(text.to_string()))
        };
        self.make_token(token, start, self.pos)
    }

    fn scan_number(&mut self) -> Result<Spanned<Lexeme>, Diagnostic> {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let text = &self.source[start..self.pos];
        match text.parse::<u32>() {
            Ok(n) if n <= MAX_INT_CONST => {
                Ok(self.make_token(Lexeme::IntConst(n as u16), start, self.pos))
            }
            _ => Err(Diagnostic::lex(
                format!("integer constant '{}' is out of range", text),
                Span::new(start as u32, self.pos as u32),
            )
            .with_help(format!("integer constants must be 0..={}", MAX_INT_CONST))),
        }
    }

    fn scan_string(&mut self) -> Result<Spanned<Lexeme>, Diagnostic> {
        let start = self.pos;
        self.pos += 1; // skip opening '"'
        let body_start = self.pos;
        while self.pos < self.bytes.len()
            && self.bytes[self.pos] != b'"'
            && self.bytes[self.pos] != b'\n'
        {
            self.pos += 1;
        }
        if self.pos >= self.bytes.len() || self.bytes[self.pos] == b'\n' {
            return Err(Diagnostic::lex(
                "unterminated string constant".to_string(),
                Span::new(start as u32, self.pos as u32),
            )
            .with_help("string constants may not span lines; close with '\"'".to_string()));
        }
        let body = &self.source[body_start..self.pos];
        // Each character must be emittable as a `push constant` later.
        for c in body.chars() {
            if c as u32 > MAX_INT_CONST {
                return Err(Diagnostic::lex(
                    format!("character '{}' is outside the platform character set", c),
                    Span::new(start as u32, self.pos as u32),
                ));
            }
        }
        self.pos += 1; // skip closing '"'
        Ok(self.make_token(Lexeme::StrConst(body.to_string()), start, self.pos))
    }

    fn scan_symbol(&mut self, start: usize) -> Result<Spanned<Lexeme>, Diagnostic> {
        let ch = self.bytes[self.pos];
        self.pos += 1;

        let token = match ch {
            b'{' => Lexeme::LBrace,
            b'}' => Lexeme::RBrace,
            b'(' => Lexeme::LParen,
            b')' => Lexeme::RParen,
            b'[' => Lexeme::LBracket,
            b']' => Lexeme::RBracket,
            b'.' => Lexeme::Dot,
            b',' => Lexeme::Comma,
            b';' => Lexeme::Semicolon,
            b'+' => Lexeme::Plus,
            b'-' => Lexeme::Minus,
            b'*' => Lexeme::Star,
            b'/' => Lexeme::Slash,
            b'&' => Lexeme::Amp,
            b'|' => Lexeme::Pipe,
            b'<' => Lexeme::Lt,
            b'>' => Lexeme::Gt,
            b'=' => Lexeme::Eq,
            b'~' => Lexeme::Tilde,
            _ => {
                return Err(Diagnostic::lex(
                    format!("unexpected character '{}' (U+{:04X})", ch as char, ch),
                    Span::new(start as u32, self.pos as u32),
                )
                .with_help("this character is not part of the Jack syntax".to_string()));
            }
        };

        Ok(self.make_token(token, start, self.pos))
    }

    fn make_token(&self, token: Lexeme, start: usize, end: usize) -> Spanned<Lexeme> {
        Spanned::new(token, Span::new(start as u32, end as u32))
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}
