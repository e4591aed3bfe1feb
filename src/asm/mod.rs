//! Two-pass, table-driven Hack assembler.
//!
//! Pass one collects `(label)` definitions as ROM addresses; pass two
//! encodes instructions, allocating previously unseen variables from RAM
//! address 16 upward. Output is one 16-bit word per instruction,
//! formatted as 16 ASCII '0'/'1' characters.

use std::collections::HashMap;

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// Largest value an A-instruction immediate may take (15 bits).
const MAX_ADDRESS: u32 = 32767;

/// First RAM address handed out to variables.
const VARIABLE_BASE: u16 = 16;

pub fn assemble(source: &str) -> Result<Vec<String>, Diagnostic> {
    let lines = significant_lines(source);

    // Pass 1: label definitions → ROM addresses
    let mut symbols: HashMap<String, u16> = predefined_symbols();
    let mut rom_address: u16 = 0;
    for (code, span) in &lines {
        if let Some(name) = label_name(code, *span)? {
            if symbols.insert(name.to_string(), rom_address).is_some() {
                return Err(Diagnostic::symbol(
                    format!("label '{}' is defined twice", name),
                    *span,
                ));
            }
        } else {
            rom_address += 1;
        }
    }

    // Pass 2: encode, allocating variables as they first appear
    let mut words = Vec::new();
    let mut next_variable = VARIABLE_BASE;
    for (code, span) in &lines {
        if label_name(code, *span)?.is_some() {
            continue;
        }
        let word = if let Some(operand) = code.strip_prefix('@') {
            encode_a(operand, *span, &mut symbols, &mut next_variable)?
        } else {
            encode_c(code, *span)?
        };
        words.push(word);
    }

    Ok(words)
}

/// Strip comments and blanks; keep byte spans for diagnostics.
fn significant_lines(source: &str) -> Vec<(&str, Span)> {
    let mut lines = Vec::new();
    let mut offset = 0usize;
    for line in source.split('\n') {
        let span = Span::new(offset as u32, (offset + line.len()) as u32);
        offset += line.len() + 1;
        let code = line.split("//").next().unwrap_or("").trim();
        if !code.is_empty() {
            lines.push((code, span));
        }
    }
    lines
}

fn label_name(code: &str, span: Span) -> Result<Option<&str>, Diagnostic> {
    if let Some(rest) = code.strip_prefix('(') {
        let name = rest.strip_suffix(')').ok_or_else(|| {
            Diagnostic::parse("malformed label: missing ')'".to_string(), span)
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Diagnostic::parse("empty label".to_string(), span));
        }
        return Ok(Some(name));
    }
    Ok(None)
}

// --- A-instructions ---

fn encode_a(
    operand: &str,
    span: Span,
    symbols: &mut HashMap<String, u16>,
    next_variable: &mut u16,
) -> Result<String, Diagnostic> {
    let operand = operand.trim();
    if operand.is_empty() {
        return Err(Diagnostic::parse(
            "'@' without an address or symbol".to_string(),
            span,
        ));
    }

    let value = if operand.bytes().next().unwrap().is_ascii_digit() {
        let n: u32 = operand.parse().map_err(|_| {
            Diagnostic::parse(format!("invalid address '{}'", operand), span)
        })?;
        if n > MAX_ADDRESS {
            return Err(Diagnostic::parse(
                format!("address {} exceeds the 15-bit range", n),
                span,
            ));
        }
        n as u16
    } else {
        if !is_valid_symbol(operand) {
            return Err(Diagnostic::symbol(
                format!("invalid symbol '{}'", operand),
                span,
            ));
        }
        match symbols.get(operand) {
            Some(&value) => value,
            None => {
                let slot = *next_variable;
                *next_variable += 1;
                symbols.insert(operand.to_string(), slot);
                slot
            }
        }
    };

    Ok(format!("0{:015b}", value))
}

fn is_valid_symbol(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':'))
}

fn predefined_symbols() -> HashMap<String, u16> {
    let mut map = HashMap::new();
    for i in 0..16u16 {
        map.insert(format!("R{}", i), i);
    }
    map.insert("SP".to_string(), 0);
    map.insert("LCL".to_string(), 1);
    map.insert("ARG".to_string(), 2);
    map.insert("THIS".to_string(), 3);
    map.insert("THAT".to_string(), 4);
    map.insert("SCREEN".to_string(), 16384);
    map.insert("KBD".to_string(), 24576);
    map
}

// --- C-instructions ---

fn encode_c(code: &str, span: Span) -> Result<String, Diagnostic> {
    let (rest, jump) = match code.split_once(';') {
        Some((rest, jump)) => (rest.trim(), jump_bits(jump.trim(), span)?),
        None => (code, "000"),
    };
    let (dest, comp) = match rest.split_once('=') {
        Some((dest, comp)) => (dest_bits(dest.trim(), span)?, comp.trim()),
        None => ("000".to_string(), rest.trim()),
    };
    let (a, c) = comp_bits(comp, span)?;
    Ok(format!("111{}{}{}{}", a, c, dest, jump))
}

/// dest is a set over {A, D, M}; any letter order is accepted.
fn dest_bits(dest: &str, span: Span) -> Result<String, Diagnostic> {
    let (mut a, mut d, mut m) = (false, false, false);
    for c in dest.chars() {
        let slot = match c {
            'A' => &mut a,
            'D' => &mut d,
            'M' => &mut m,
            _ => {
                return Err(Diagnostic::parse(
                    format!("invalid destination '{}'", dest),
                    span,
                ));
            }
        };
        if *slot {
            return Err(Diagnostic::parse(
                format!("duplicate destination register in '{}'", dest),
                span,
            ));
        }
        *slot = true;
    }
    if !(a || d || m) {
        return Err(Diagnostic::parse("empty destination".to_string(), span));
    }
    Ok(format!("{}{}{}", a as u8, d as u8, m as u8))
}

fn comp_bits(comp: &str, span: Span) -> Result<(u8, &'static str), Diagnostic> {
    let bits = match comp {
        // a = 0
        "0" => (0, "101010"),
        "1" => (0, "111111"),
        "-1" => (0, "111010"),
        "D" => (0, "001100"),
        "A" => (0, "110000"),
        "!D" => (0, "001101"),
        "!A" => (0, "110001"),
        "-D" => (0, "001111"),
        "-A" => (0, "110011"),
        "D+1" => (0, "011111"),
        "A+1" => (0, "110111"),
        "D-1" => (0, "001110"),
        "A-1" => (0, "110010"),
        "D+A" => (0, "000010"),
        "D-A" => (0, "010011"),
        "A-D" => (0, "000111"),
        "D&A" => (0, "000000"),
        "D|A" => (0, "010101"),
        // a = 1
        "M" => (1, "110000"),
        "!M" => (1, "110001"),
        "-M" => (1, "110011"),
        "M+1" => (1, "110111"),
        "M-1" => (1, "110010"),
        "D+M" => (1, "000010"),
        "D-M" => (1, "010011"),
        "M-D" => (1, "000111"),
        "D&M" => (1, "000000"),
        "D|M" => (1, "010101"),
        _ => {
            return Err(Diagnostic::parse(
                format!("unknown computation '{}'", comp),
                span,
            ));
        }
    };
    Ok(bits)
}

fn jump_bits(jump: &str, span: Span) -> Result<&'static str, Diagnostic> {
    let bits = match jump {
        "JGT" => "001",
        "JEQ" => "010",
        "JGE" => "011",
        "JLT" => "100",
        "JNE" => "101",
        "JLE" => "110",
        "JMP" => "111",
        _ => {
            return Err(Diagnostic::parse(
                format!("unknown jump condition '{}'", jump),
                span,
            ));
        }
    };
    Ok(bits)
}
