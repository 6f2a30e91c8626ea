use std::io::Cursor;

use slc::{
    ast::Type,
    codegen::{self, EmitOptions},
    error::{CompileError, Diagnostics},
    ir::{Instruction, Program},
    parse::ParserError,
    semantic::SemanticError,
};

fn compile(source: &str) -> Result<Program, CompileError> {
    slc::compile(Cursor::new(source.to_owned()))
}

fn to_c(program: &Program) -> String {
    let mut output = Vec::new();
    codegen::emit(program, EmitOptions::empty(), &mut output).unwrap();

    String::from_utf8(output).unwrap()
}

fn type_of(program: &Program, name: &str) -> Option<Type> {
    program.symbols.get(name).and_then(|binding| binding.ty())
}

fn count<F: Fn(&Instruction) -> bool>(program: &Program, predicate: F) -> usize {
    program
        .instructions
        .iter()
        .filter(|instruction| predicate(instruction))
        .count()
}

#[test]
fn factorial() {
    let program = compile(include_str!("../demos/factorial.sl")).unwrap();

    assert_eq!(type_of(&program, "n"), Some(Type::Int));
    assert!(program.symbols.get("result").unwrap().is_mutable());
    assert!(!program.symbols.get("n").unwrap().is_mutable());

    let c = to_c(&program);
    assert!(c.contains("\tscanf(\"%d\", &v_t1);\n"));
    assert!(c.contains("\tprintf(\"%d! = %d\\n\", v_n, v_result);\n"));
}

#[test]
fn grades() {
    let program = compile(include_str!("../demos/grades.sl")).unwrap();

    let conditions = count(&program, |i| matches!(i, Instruction::JumpIf(..)));
    let prints = program
        .to_string()
        .lines()
        .filter(|line| line.starts_with("call printf"))
        .count();

    assert_eq!(conditions, 3);
    assert_eq!(prints, 4);
}

#[test]
fn halving() {
    let program = compile(include_str!("../demos/halving.sl")).unwrap();

    assert_eq!(type_of(&program, "ratio"), Some(Type::Float));
    assert_eq!(type_of(&program, "count"), Some(Type::Int));
    assert_eq!(type_of(&program, "done"), Some(Type::Bool));

    let c = to_c(&program);
    assert!(c.contains("\tfloat v_ratio;\n"));
    assert!(c.contains("\tbool v_done;\n"));
}

#[test]
fn alphabet() {
    let program = compile(include_str!("../demos/alphabet.sl")).unwrap();

    assert_eq!(type_of(&program, "first"), Some(Type::Char));
    assert_eq!(type_of(&program, "code"), Some(Type::Int));
    assert!(to_c(&program).contains("\tprintf(\"%c\", v_code);\n"));
}

#[test]
fn deferred_if_else_scenario() {
    let source = "let mut x; x = 5; if x > 3 { output \"big\"; } else { output \"small\"; };";
    let program = compile(source).unwrap();

    assert_eq!(type_of(&program, "x"), Some(Type::Int));
    assert_eq!(
        program.to_string(),
        "x = 5\n\
         t1 = x > 3\n\
         if t1 goto L2\n\
         goto L3\n\
         L2:\n\
         param \"big\"\n\
         call printf, 1\n\
         goto L1\n\
         L3:\n\
         param \"small\"\n\
         call printf, 1\n\
         L1:\n"
    );
}

#[test]
fn compilation_is_reproducible() {
    let source = include_str!("../demos/halving.sl");
    assert_eq!(
        compile(source).unwrap().to_string(),
        compile(source).unwrap().to_string()
    );
}

#[test]
fn syntax_errors_are_reported_with_their_line() {
    let source = "let a = 1;\nlet b = ;\n";
    let error = compile(source).unwrap_err();

    match &error {
        CompileError::Syntax(error) => {
            assert_eq!(error.position().line(), 2);
            assert_eq!(error.val().lexeme(), Some(";"));
        }

        other => panic!("unexpected error {:?}", other),
    }

    let report = Diagnostics::new(&error, "bad.sl", source).to_string();
    assert!(report.starts_with("syntax error: "));
    assert!(report.contains(" --> bad.sl:2:9\n"));
    assert!(report.ends_with("Build failed with 1 error\n"));
}

#[test]
fn lexical_errors_are_syntax_errors() {
    let error = compile("let a = 1 @ 2;").unwrap_err();
    assert!(matches!(
        error,
        CompileError::Syntax(ref error) if matches!(error.val(), ParserError::Lexical(_))
    ));
}

#[test]
fn semantic_errors_stop_the_pipeline() {
    let error = compile("let v = 1;\nv = 2;\nv = true;").unwrap_err();

    match error {
        CompileError::Semantic(error) => {
            assert_eq!(error.position().line(), 2);
            assert!(matches!(error.val(), SemanticError::Immutable(_)));
        }

        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn early_errors_release_the_lexer() {
    let mut source = String::from("let = 1;\n");
    for i in 0..1000 {
        source.push_str(&format!("let v{} = {};\n", i, i));
    }

    assert!(matches!(compile(&source), Err(CompileError::Syntax(_))));
}
