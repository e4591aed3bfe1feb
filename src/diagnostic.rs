use crate::span::Span;

/// A fatal toolchain diagnostic. Every stage fails fast: the first
/// error aborts the invocation, so a run reports at most one.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub help: Option<String>,
}

/// The stage that rejected the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed lexeme: unrecognized character, unterminated string,
    /// integer out of range.
    Lex,
    /// Token mismatch, or malformed command/instruction text.
    Parse,
    /// Identifier misuse: undeclared, redefined, or an ill-formed
    /// assembly symbol.
    Symbol,
}

impl ErrorKind {
    pub fn title(self) -> &'static str {
        match self {
            ErrorKind::Lex => "lex error",
            ErrorKind::Parse => "parse error",
            ErrorKind::Symbol => "symbol error",
        }
    }
}

impl Diagnostic {
    pub fn lex(message: String, span: Span) -> Self {
        Self::new(ErrorKind::Lex, message, span)
    }

    pub fn parse(message: String, span: Span) -> Self {
        Self::new(ErrorKind::Parse, message, span)
    }

    pub fn symbol(message: String, span: Span) -> Self {
        Self::new(ErrorKind::Symbol, message, span)
    }

    fn new(kind: ErrorKind, message: String, span: Span) -> Self {
        Self {
            kind,
            message,
            span,
            help: None,
        }
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render the diagnostic to stderr using ariadne, titled by the
    /// stage that produced it.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let kind = ReportKind::Custom(self.kind.title(), Color::Red);
        let mut report = Report::build(kind, filename, self.span.start as usize)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.range()))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            );

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report
            .finish()
            .eprint((filename, Source::from(source)))
            .unwrap();
    }
}
