pub mod asm;
pub mod ast;
pub mod diagnostic;
pub mod lexeme;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod symtab;
pub mod vm;

pub use vm::builder::{build_class, LabelCounter};
pub use vm::lower::Translator;
pub use vm::{Segment, VmCommand};

use diagnostic::Diagnostic;
use lexer::Lexer;
use parser::Parser;

/// Parse one Jack unit, rendering the diagnostic to stderr on failure.
pub fn parse_source(source: &str, filename: &str) -> Result<ast::Class, Diagnostic> {
    match parse_source_silent(source) {
        Ok(class) => Ok(class),
        Err(error) => {
            error.render(filename, source);
            Err(error)
        }
    }
}

pub fn parse_source_silent(source: &str) -> Result<ast::Class, Diagnostic> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_class()
}

/// Compile one Jack unit to VM commands, rendering the diagnostic to
/// stderr on failure. The label counter is threaded by the caller so a
/// multi-unit run keeps its labels globally unique.
pub fn compile_source(
    source: &str,
    filename: &str,
    labels: &mut LabelCounter,
) -> Result<Vec<VmCommand>, Diagnostic> {
    match compile_source_silent(source, labels) {
        Ok(commands) => Ok(commands),
        Err(error) => {
            error.render(filename, source);
            Err(error)
        }
    }
}

pub fn compile_source_silent(
    source: &str,
    labels: &mut LabelCounter,
) -> Result<Vec<VmCommand>, Diagnostic> {
    let class = parse_source_silent(source)?;
    build_class(&class, labels)
}

/// Assemble Hack assembly text to machine-code words, rendering the
/// diagnostic to stderr on failure.
pub fn assemble_source(source: &str, filename: &str) -> Result<Vec<String>, Diagnostic> {
    match asm::assemble(source) {
        Ok(words) => Ok(words),
        Err(error) => {
            error.render(filename, source);
            Err(error)
        }
    }
}
