//! Line-based parser for `.vm` text.
//!
//! Each line is blank, a `//` comment, or exactly one command. The first
//! malformed line aborts the parse.

use crate::diagnostic::Diagnostic;
use crate::span::Span;
use crate::vm::{Segment, VmCommand};

pub fn parse_unit(source: &str) -> Result<Vec<VmCommand>, Diagnostic> {
    let mut commands = Vec::new();
    let mut offset = 0usize;

    for line in source.split('\n') {
        let span = Span::new(offset as u32, (offset + line.len()) as u32);
        offset += line.len() + 1;

        // Strip trailing comments, then surrounding whitespace
        let code = line.split("//").next().unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }

        commands.push(parse_command(code, span)?);
    }

    Ok(commands)
}

fn parse_command(code: &str, span: Span) -> Result<VmCommand, Diagnostic> {
    let fields: Vec<&str> = code.split_whitespace().collect();

    let command = match fields[0] {
        "push" | "pop" => {
            let (segment, index) = segment_and_index(&fields, span)?;
            if fields[0] == "push" {
                VmCommand::Push(segment, index)
            } else {
                if segment == Segment::Constant {
                    return Err(Diagnostic::parse(
                        "cannot pop to the constant segment".to_string(),
                        span,
                    ));
                }
                VmCommand::Pop(segment, index)
            }
        }
        "add" => arity(&fields, 1, span).map(|_| VmCommand::Add)?,
        "sub" => arity(&fields, 1, span).map(|_| VmCommand::Sub)?,
        "neg" => arity(&fields, 1, span).map(|_| VmCommand::Neg)?,
        "eq" => arity(&fields, 1, span).map(|_| VmCommand::Eq)?,
        "gt" => arity(&fields, 1, span).map(|_| VmCommand::Gt)?,
        "lt" => arity(&fields, 1, span).map(|_| VmCommand::Lt)?,
        "and" => arity(&fields, 1, span).map(|_| VmCommand::And)?,
        "or" => arity(&fields, 1, span).map(|_| VmCommand::Or)?,
        "not" => arity(&fields, 1, span).map(|_| VmCommand::Not)?,
        "label" => VmCommand::Label(name_arg(&fields, span)?),
        "goto" => VmCommand::Goto(name_arg(&fields, span)?),
        "if-goto" => VmCommand::IfGoto(name_arg(&fields, span)?),
        "function" => {
            let (name, n) = name_and_count(&fields, span)?;
            VmCommand::Function(name, n)
        }
        "call" => {
            let (name, n) = name_and_count(&fields, span)?;
            VmCommand::Call(name, n)
        }
        "return" => arity(&fields, 1, span).map(|_| VmCommand::Return)?,
        other => {
            return Err(Diagnostic::parse(
                format!("unknown VM command '{}'", other),
                span,
            ));
        }
    };

    Ok(command)
}

fn arity(fields: &[&str], expected: usize, span: Span) -> Result<(), Diagnostic> {
    if fields.len() != expected {
        return Err(Diagnostic::parse(
            format!(
                "'{}' takes {} argument(s), found {}",
                fields[0],
                expected - 1,
                fields.len() - 1
            ),
            span,
        ));
    }
    Ok(())
}

fn segment_and_index(fields: &[&str], span: Span) -> Result<(Segment, u16), Diagnostic> {
    arity(fields, 3, span)?;
    let segment = Segment::from_str(fields[1]).ok_or_else(|| {
        Diagnostic::parse(format!("unknown segment '{}'", fields[1]), span)
    })?;
    let index: u16 = fields[2].parse().map_err(|_| {
        Diagnostic::parse(format!("invalid index '{}'", fields[2]), span)
    })?;
    match segment {
        Segment::Pointer if index > 1 => Err(Diagnostic::parse(
            format!("pointer index must be 0 or 1, found {}", index),
            span,
        )),
        Segment::Temp if index > 7 => Err(Diagnostic::parse(
            format!("temp index must be 0..=7, found {}", index),
            span,
        )),
        Segment::Constant if index > 32767 => Err(Diagnostic::parse(
            format!("constant {} is out of range", index),
            span,
        )),
        _ => Ok((segment, index)),
    }
}

fn name_arg(fields: &[&str], span: Span) -> Result<String, Diagnostic> {
    arity(fields, 2, span)?;
    Ok(fields[1].to_string())
}

fn name_and_count(fields: &[&str], span: Span) -> Result<(String, u16), Diagnostic> {
    arity(fields, 3, span)?;
    let n: u16 = fields[2].parse().map_err(|_| {
        Diagnostic::parse(format!("invalid count '{}'", fields[2]), span)
    })?;
    Ok((fields[1].to_string(), n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        let commands = parse_unit("push constant 7\npush constant 8\nadd\npop temp 0\n").unwrap();
        assert_eq!(
            commands,
            vec![
                VmCommand::Push(Segment::Constant, 7),
                VmCommand::Push(Segment::Constant, 8),
                VmCommand::Add,
                VmCommand::Pop(Segment::Temp, 0),
            ]
        );
    }

    #[test]
    fn test_blank_lines_and_comments_skipped() {
        let commands =
            parse_unit("// whole-line comment\n\n  push local 2  // trailing\n\nreturn\n").unwrap();
        assert_eq!(
            commands,
            vec![VmCommand::Push(Segment::Local, 2), VmCommand::Return]
        );
    }

    #[test]
    fn test_parse_function_protocol() {
        let commands = parse_unit("function Main.main 2\ncall Math.multiply 2\nreturn\n").unwrap();
        assert_eq!(
            commands,
            vec![
                VmCommand::Function("Main.main".into(), 2),
                VmCommand::Call("Math.multiply".into(), 2),
                VmCommand::Return,
            ]
        );
    }

    #[test]
    fn test_parse_branching() {
        let commands = parse_unit("label L1\nif-goto L2\ngoto L1\n").unwrap();
        assert_eq!(
            commands,
            vec![
                VmCommand::Label("L1".into()),
                VmCommand::IfGoto("L2".into()),
                VmCommand::Goto("L1".into()),
            ]
        );
    }

    #[test]
    fn test_display_parse_round_trip() {
        let text = "push argument 1\npop static 3\nsub\nneg\nnot\nlabel W1\ngoto W1\n";
        let commands = parse_unit(text).unwrap();
        assert_eq!(crate::vm::to_text(&commands), text);
    }

    #[test]
    fn test_error_unknown_command() {
        let d = parse_unit("shove constant 7\n").unwrap_err();
        assert_eq!(d.kind, crate::diagnostic::ErrorKind::Parse);
        assert!(d.message.contains("unknown VM command 'shove'"));
    }

    #[test]
    fn test_error_unknown_segment() {
        let d = parse_unit("push heap 0\n").unwrap_err();
        assert!(d.message.contains("unknown segment 'heap'"));
    }

    #[test]
    fn test_error_pop_constant() {
        let d = parse_unit("pop constant 7\n").unwrap_err();
        assert!(d.message.contains("cannot pop to the constant segment"));
    }

    #[test]
    fn test_error_pointer_index() {
        let d = parse_unit("push pointer 2\n").unwrap_err();
        assert!(d.message.contains("pointer index must be 0 or 1"));
    }

    #[test]
    fn test_error_missing_argument() {
        let d = parse_unit("push constant\n").unwrap_err();
        assert!(d.message.contains("takes 2 argument(s)"));
    }

    #[test]
    fn test_error_span_points_at_line() {
        let source = "add\nbogus\n";
        let d = parse_unit(source).unwrap_err();
        assert_eq!(d.span.start, 4);
        assert_eq!(d.span.end, 9);
    }
}
