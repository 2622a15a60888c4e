//! Full Pipeline Integration Tests
//!
//! Tests the complete flow: source text -> lexer -> parser/type checker ->
//! bytecode generator -> instruction streams in the program containers.

use bytecode::{Opcode, Program};
use core_types::{Primitive, ValueType};

/// Helper to compile AMPL source or panic with the rendered error
fn compile(source: &str) -> Program {
    match compiler::compile(source) {
        Ok(program) => program,
        Err(err) => panic!("compilation failed: {}", err),
    }
}

/// Test: assignment and output become push/store/load/print
#[test]
fn test_pipeline_assign_and_output() {
    let program = compile("program p: main: let x = 5; output x end");

    assert_eq!(program.name, "p");
    assert_eq!(program.subroutines.len(), 1);
    assert_eq!(
        program.subroutine("main").unwrap().instructions,
        vec![
            Opcode::PushConst(5),
            Opcode::StoreLocal(0),
            Opcode::LoadLocal(0),
            Opcode::Print(Primitive::Integer),
            Opcode::Return,
        ]
    );
}

/// Test: a function definition carries its signature into the container
#[test]
fn test_pipeline_function_signature_and_call() {
    let program = compile(
        "program calc: \
         square: takes n as integer returns integer \
           back n * n \
         end \
         main: \
           vars result as integer \
           let result = square(6); \
           output \"answer \" & result \
         end",
    );

    assert_eq!(program.name, "calc");
    assert_eq!(program.subroutines.len(), 2);

    let square = program.subroutine("square").unwrap();
    assert_eq!(square.params, vec![ValueType::Scalar(Primitive::Integer)]);
    assert_eq!(square.returns, Some(Primitive::Integer));
    assert_eq!(
        square.instructions,
        vec![
            Opcode::LoadLocal(0),
            Opcode::LoadLocal(0),
            Opcode::Mul,
            Opcode::ReturnValue,
        ]
    );
    assert_eq!(square.max_stack, 2);
    assert_eq!(square.frame_width, 1);

    let main = program.subroutine("main").unwrap();
    assert_eq!(
        main.instructions,
        vec![
            Opcode::PushConst(6),
            Opcode::Call("square".to_string()),
            Opcode::StoreLocal(0),
            Opcode::PrintString("answer ".to_string()),
            Opcode::LoadLocal(0),
            Opcode::Print(Primitive::Integer),
            Opcode::Return,
        ]
    );
}

/// Test: a counting loop compiles to the full guard/branch/jump shape
#[test]
fn test_pipeline_countdown_loop() {
    use bytecode::{Comparison, Label};

    let program = compile(
        "program p: \
         main: \
           vars i as integer \
           let i = 3; \
           while i > 0: \
             output i; \
             let i = i - 1 \
           end \
         end",
    );

    let main = program.subroutine("main").unwrap();
    assert_eq!(
        main.instructions,
        vec![
            Opcode::PushConst(3),
            Opcode::StoreLocal(0),
            // guard
            Opcode::Label(Label(1)),
            Opcode::LoadLocal(0),
            Opcode::PushConst(0),
            Opcode::Branch(Comparison::Gt, Label(2)),
            Opcode::PushConst(0),
            Opcode::Jump(Label(3)),
            Opcode::Label(Label(2)),
            Opcode::PushConst(1),
            Opcode::Label(Label(3)),
            Opcode::PushConst(1),
            Opcode::Branch(Comparison::Ne, Label(0)),
            // body
            Opcode::LoadLocal(0),
            Opcode::Print(Primitive::Integer),
            Opcode::LoadLocal(0),
            Opcode::PushConst(1),
            Opcode::Neg,
            Opcode::Add,
            Opcode::StoreLocal(0),
            Opcode::Jump(Label(1)),
            Opcode::Label(Label(0)),
            Opcode::Return,
        ]
    );
    assert_eq!(main.max_stack, 2);
    assert_eq!(main.frame_width, 1);
    assert!(main.labels_balanced());
}

/// Test: arrays allocate, fill and read back through element instructions
#[test]
fn test_pipeline_array_fill_and_sum() {
    let program = compile(
        "program p: \
         main: \
           vars a as integer array; i, total as integer \
           let a = array 3; \
           let i = 0; \
           while i < 3: \
             let a[i] = i * 2; \
             let i = i + 1 \
           end; \
           let total = a[0] + a[1] + a[2]; \
           output total \
         end",
    );

    let main = program.subroutine("main").unwrap();
    assert!(main
        .instructions
        .contains(&Opcode::NewArray(Primitive::Integer)));
    assert_eq!(
        main.instructions
            .iter()
            .filter(|op| **op == Opcode::StoreElement)
            .count(),
        1
    );
    assert_eq!(
        main.instructions
            .iter()
            .filter(|op| **op == Opcode::LoadElement)
            .count(),
        3
    );
    // deepest point: reference, index, then the two factors of i * 2
    assert_eq!(main.max_stack, 4);
    assert_eq!(main.frame_width, 3);
    assert!(main.labels_balanced());
}

/// Test: subroutines appear in declaration order with main last
#[test]
fn test_pipeline_main_compiles_last() {
    let program = compile(
        "program p: \
         first: takes n as integer output n end \
         second: takes n as integer output n end \
         main: do first(1); do second(2) end",
    );

    let names: Vec<&str> = program
        .subroutines
        .iter()
        .map(|sub| sub.name.as_str())
        .collect();
    assert_eq!(names, vec!["first", "second", "main"]);
    for sub in &program.subroutines {
        assert!(sub.labels_balanced(), "unbalanced labels in {}", sub.name);
        assert_eq!(sub.instructions.last(), Some(&Opcode::Return));
    }
}

/// Test: a procedure receives its arguments through the call
#[test]
fn test_pipeline_procedure_call() {
    let program = compile(
        "program p: \
         greet: takes times as integer \
           vars i as integer \
           let i = 0; \
           while i < times: \
             output \"hi\"; \
             let i = i + 1 \
           end \
         end \
         main: do greet(2) end",
    );

    let greet = program.subroutine("greet").unwrap();
    assert_eq!(greet.params, vec![ValueType::Scalar(Primitive::Integer)]);
    assert_eq!(greet.returns, None);
    assert_eq!(greet.frame_width, 2);

    let main = program.subroutine("main").unwrap();
    assert_eq!(
        main.instructions,
        vec![
            Opcode::PushConst(2),
            Opcode::Call("greet".to_string()),
            Opcode::Return,
        ]
    );
}

/// Test: boolean input, logic and output use boolean-typed instructions
#[test]
fn test_pipeline_boolean_logic() {
    let program = compile(
        "program p: \
         main: \
           vars f, g as boolean \
           input f; \
           input g; \
           output f and g or not f \
         end",
    );

    let main = program.subroutine("main").unwrap();
    assert_eq!(
        main.instructions,
        vec![
            Opcode::Read(Primitive::Boolean),
            Opcode::StoreLocal(0),
            Opcode::Read(Primitive::Boolean),
            Opcode::StoreLocal(1),
            Opcode::LoadLocal(0),
            Opcode::LoadLocal(1),
            Opcode::And,
            Opcode::LoadLocal(0),
            Opcode::Not,
            Opcode::Or,
            Opcode::Print(Primitive::Boolean),
            Opcode::Return,
        ]
    );
    assert_eq!(main.max_stack, 2);
    assert_eq!(main.frame_width, 2);
}
