//! Unit tests for program containers and encodings

use bytecode::{Comparison, Label, Opcode, Program, Subroutine};
use core_types::{Primitive, ValueType};

fn looping_main() -> Subroutine {
    let mut main = Subroutine::new("main", vec![], None);
    let top = Label(0);
    let exit = Label(1);
    main.instructions = vec![
        Opcode::Label(top),
        Opcode::LoadLocal(0),
        Opcode::PushConst(10),
        Opcode::Branch(Comparison::Ge, exit),
        Opcode::LoadLocal(0),
        Opcode::PushConst(1),
        Opcode::Add,
        Opcode::StoreLocal(0),
        Opcode::Jump(top),
        Opcode::Label(exit),
        Opcode::Return,
    ];
    main.max_stack = 2;
    main.frame_width = 1;
    main
}

#[test]
fn test_loop_labels_are_balanced() {
    assert!(looping_main().labels_balanced());
}

#[test]
fn test_listing_contains_both_directions() {
    let sub = looping_main();
    let listing = sub.to_string();
    // forward branch to the exit label and backward jump to the top
    assert!(listing.contains("    if_ge L1\n"));
    assert!(listing.contains("    goto L0\n"));
    assert!(listing.contains("L0:\n"));
    assert!(listing.contains("L1:\n"));
}

#[test]
fn test_signature_rendering_without_params() {
    let sub = Subroutine::new("main", vec![], None);
    assert!(sub.to_string().starts_with(".sub main\n"));
}

#[test]
fn test_signature_rendering_full() {
    let sub = Subroutine::new(
        "fill",
        vec![
            ValueType::Array(Primitive::Integer),
            ValueType::Scalar(Primitive::Integer),
        ],
        Some(Primitive::Boolean),
    );
    assert!(sub
        .to_string()
        .starts_with(".sub fill takes integer array, integer returns boolean\n"));
}

#[test]
fn test_roundtrip_preserves_program() {
    let mut program = Program::new("loops");
    program.subroutines.push(looping_main());
    let restored = Program::from_bytes(&program.to_bytes()).expect("decode failed");
    assert_eq!(program, restored);
    assert_eq!(restored.name, "loops");
}

#[test]
fn test_roundtrip_preserves_every_opcode() {
    let mut sub = Subroutine::new("omni", vec![], None);
    sub.instructions = vec![
        Opcode::PushConst(i32::MAX),
        Opcode::PushConst(i32::MIN),
        Opcode::LoadLocal(3),
        Opcode::StoreLocal(4),
        Opcode::NewArray(Primitive::Boolean),
        Opcode::LoadElement,
        Opcode::StoreElement,
        Opcode::Add,
        Opcode::Neg,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Rem,
        Opcode::And,
        Opcode::Or,
        Opcode::Not,
        Opcode::Dup,
        Opcode::Swap,
        Opcode::Pop,
        Opcode::Jump(Label(1)),
        Opcode::Branch(Comparison::Le, Label(0)),
        Opcode::Label(Label(0)),
        Opcode::Label(Label(1)),
        Opcode::Print(Primitive::Integer),
        Opcode::PrintString("x \"y\" \\z".to_string()),
        Opcode::Read(Primitive::Boolean),
        Opcode::Call("helper".to_string()),
        Opcode::ReturnValue,
        Opcode::Return,
    ];
    let mut program = Program::new("omni");
    program.subroutines.push(sub);
    let restored = Program::from_bytes(&program.to_bytes()).expect("decode failed");
    assert_eq!(program, restored);
}

#[test]
fn test_decode_reports_byte_offset_for_bad_tag() {
    let mut program = Program::new("p");
    let mut sub = Subroutine::new("main", vec![], None);
    sub.instructions = vec![Opcode::Return];
    program.subroutines.push(sub);
    let mut bytes = program.to_bytes();
    // corrupt the single instruction's tag
    let last = bytes.len() - 1;
    bytes[last] = 250;
    let err = Program::from_bytes(&bytes).unwrap_err();
    assert!(err.contains("unknown opcode tag 250"), "{}", err);
    assert!(err.contains("at byte"), "{}", err);
}

#[test]
fn test_empty_program_roundtrip() {
    let program = Program::new("empty");
    let restored = Program::from_bytes(&program.to_bytes()).expect("decode failed");
    assert!(restored.subroutines.is_empty());
}
