use super::*;
use crate::vm::parse::parse_unit;

fn lower(text: &str) -> Vec<String> {
    let commands = parse_unit(text).expect("parse error");
    let mut translator = Translator::new(false);
    translator.unit("Test", &commands);
    translator.finish()
}

#[test]
fn test_push_constant() {
    assert_eq!(
        lower("push constant 7\n"),
        vec!["@7", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]
    );
}

#[test]
fn test_push_local_dereferences_base() {
    assert_eq!(
        lower("push local 2\n"),
        vec![
            "@2", "D=A", "@LCL", "A=D+M", "D=M", "@SP", "A=M", "M=D", "@SP", "M=M+1",
        ]
    );
}

#[test]
fn test_pop_argument_parks_address() {
    assert_eq!(
        lower("pop argument 1\n"),
        vec![
            "@1", "D=A", "@ARG", "D=D+M", "@R13", "M=D", "@SP", "AM=M-1", "D=M", "@R13", "A=M",
            "M=D",
        ]
    );
}

#[test]
fn test_constant_only_program_references_no_base_pointer() {
    let out = lower("push constant 1\npush constant 2\npop temp 0\npop temp 1\n");
    for register in ["@LCL", "@ARG", "@THIS", "@THAT"] {
        assert!(
            !out.contains(&register.to_string()),
            "unexpected {} in {:?}",
            register,
            out
        );
    }
}

#[test]
fn test_pointer_maps_to_this_and_that() {
    assert_eq!(
        lower("push pointer 0\n")[0..2],
        ["@THIS".to_string(), "D=M".to_string()]
    );
    assert_eq!(
        lower("pop pointer 1\n"),
        vec!["@SP", "AM=M-1", "D=M", "@THAT", "M=D"]
    );
}

#[test]
fn test_temp_is_fixed_slot() {
    assert_eq!(
        lower("pop temp 3\n"),
        vec!["@SP", "AM=M-1", "D=M", "@8", "M=D"]
    );
}

#[test]
fn test_static_uses_unit_base_name() {
    assert_eq!(
        lower("push static 4\n")[0],
        "@Test.4"
    );
    assert_eq!(
        lower("pop static 0\n"),
        vec!["@SP", "AM=M-1", "D=M", "@Test.0", "M=D"]
    );
}

#[test]
fn test_two_units_namespace_their_statics() {
    let commands = parse_unit("push static 0\n").unwrap();
    let mut translator = Translator::new(false);
    translator.unit("Foo", &commands);
    translator.unit("Bar", &commands);
    let out = translator.finish();
    assert!(out.contains(&"@Foo.0".to_string()));
    assert!(out.contains(&"@Bar.0".to_string()));
}

#[test]
fn test_add_and_sub() {
    assert_eq!(
        lower("add\n"),
        vec!["@SP", "AM=M-1", "D=M", "A=A-1", "M=D+M"]
    );
    // sub computes x - y with y topmost
    assert_eq!(
        lower("sub\n"),
        vec!["@SP", "AM=M-1", "D=M", "A=A-1", "M=M-D"]
    );
}

#[test]
fn test_unary_ops_touch_top_in_place() {
    assert_eq!(lower("neg\n"), vec!["@SP", "A=M-1", "M=-M"]);
    assert_eq!(lower("not\n"), vec!["@SP", "A=M-1", "M=!M"]);
}

#[test]
fn test_comparison_shape() {
    assert_eq!(
        lower("eq\n"),
        vec![
            "@SP", "AM=M-1", "D=M", "A=A-1", "D=M-D", "M=-1", "@CMP1", "D;JEQ", "@SP", "A=M-1",
            "M=0", "(CMP1)",
        ]
    );
}

#[test]
fn test_comparison_labels_are_fresh() {
    let out = lower("eq\ngt\nlt\n");
    let text = out.join("\n");
    assert!(text.contains("D;JEQ"));
    assert!(text.contains("(CMP1)"));
    assert!(text.contains("D;JGT"));
    assert!(text.contains("(CMP2)"));
    assert!(text.contains("D;JLT"));
    assert!(text.contains("(CMP3)"));
}

#[test]
fn test_branching() {
    assert_eq!(lower("label L1\n"), vec!["(L1)"]);
    assert_eq!(lower("goto L1\n"), vec!["@L1", "0;JMP"]);
    assert_eq!(
        lower("if-goto L1\n"),
        vec!["@SP", "AM=M-1", "D=M", "@L1", "D;JNE"]
    );
}

#[test]
fn test_function_allocates_locals() {
    assert_eq!(
        lower("function Main.main 2\n"),
        vec![
            "(Main.main)",
            "@SP",
            "A=M",
            "M=0",
            "@SP",
            "M=M+1",
            "@SP",
            "A=M",
            "M=0",
            "@SP",
            "M=M+1",
        ]
    );
}

#[test]
fn test_call_sequence() {
    assert_eq!(
        lower("call Main.twice 1\n"),
        vec![
            "@RET1", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1", // return address
            "@LCL", "D=M", "@SP", "A=M", "M=D", "@SP", "M=M+1", // saved LCL
            "@ARG", "D=M", "@SP", "A=M", "M=D", "@SP", "M=M+1", // saved ARG
            "@THIS", "D=M", "@SP", "A=M", "M=D", "@SP", "M=M+1", // saved THIS
            "@THAT", "D=M", "@SP", "A=M", "M=D", "@SP", "M=M+1", // saved THAT
            "@SP", "D=M", "@LCL", "M=D", // LCL = SP
            "@6", "D=D-A", "@ARG", "M=D", // ARG = SP - 5 - 1
            "@Main.twice", "0;JMP", "(RET1)",
        ]
    );
}

#[test]
fn test_call_sequence_length_is_fixed() {
    let a = lower("call F.a 0\n").len();
    let b = lower("call G.b 7\n").len();
    assert_eq!(a, b);
}

#[test]
fn test_return_sequence() {
    assert_eq!(
        lower("return\n"),
        vec![
            "@LCL", "D=M", "@R13", "M=D", // FRAME = LCL
            "@5", "A=D-A", "D=M", "@R14", "M=D", // save return address
            "@SP", "AM=M-1", "D=M", "@ARG", "A=M", "M=D", // *ARG = pop()
            "@ARG", "D=M+1", "@SP", "M=D", // SP = ARG + 1
            "@R13", "AM=M-1", "D=M", "@THAT", "M=D", // restore THAT
            "@R13", "AM=M-1", "D=M", "@THIS", "M=D", // restore THIS
            "@R13", "AM=M-1", "D=M", "@ARG", "M=D", // restore ARG
            "@R13", "AM=M-1", "D=M", "@LCL", "M=D", // restore LCL
            "@R14", "A=M", "0;JMP", // jump to return address
        ]
    );
}

#[test]
fn test_return_labels_unique_across_units() {
    let commands = parse_unit("call F.a 0\ncall F.b 0\n").unwrap();
    let mut translator = Translator::new(false);
    translator.unit("Foo", &commands);
    translator.unit("Bar", &commands);
    let out = translator.finish();
    let mut rets: Vec<&String> = out.iter().filter(|l| l.starts_with("(RET")).collect();
    let total = rets.len();
    rets.sort();
    rets.dedup();
    assert_eq!(total, 4);
    assert_eq!(rets.len(), total, "duplicate return label: {:?}", rets);
}

#[test]
fn test_bootstrap_sets_sp_then_calls_sys_init() {
    let mut translator = Translator::new(false);
    translator.bootstrap();
    let out = translator.finish();
    assert_eq!(&out[0..4], &["@256", "D=A", "@SP", "M=D"]);
    assert!(out.contains(&"@Sys.init".to_string()));
    assert_eq!(out.last().unwrap(), "(RET1)");
}

#[test]
fn test_no_bootstrap_no_prologue() {
    let commands = parse_unit("push constant 1\n").unwrap();
    let mut translator = Translator::new(false);
    translator.unit("Main", &commands);
    let out = translator.finish();
    assert_eq!(out[0], "@1");
}

#[test]
fn test_annotation_lines() {
    let commands = parse_unit("push constant 7\nadd\n").unwrap();
    let mut translator = Translator::new(true);
    translator.unit("Main", &commands);
    let out = translator.finish();
    assert_eq!(out[0], "// File: Main");
    assert_eq!(out[1], "// push constant 7");
    assert_eq!(out[2], "@7");
    assert!(out.contains(&"// add".to_string()));
}
