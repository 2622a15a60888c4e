//! Unit tests for the instruction set

use bytecode::{Comparison, Label, Opcode};
use core_types::Primitive;

#[test]
fn test_comparison_mnemonics() {
    assert_eq!(Comparison::Eq.to_string(), "eq");
    assert_eq!(Comparison::Ne.to_string(), "ne");
    assert_eq!(Comparison::Lt.to_string(), "lt");
    assert_eq!(Comparison::Le.to_string(), "le");
    assert_eq!(Comparison::Gt.to_string(), "gt");
    assert_eq!(Comparison::Ge.to_string(), "ge");
}

#[test]
fn test_label_display() {
    assert_eq!(Label(0).to_string(), "L0");
    assert_eq!(Label(17).to_string(), "L17");
}

#[test]
fn test_branch_rendering() {
    let op = Opcode::Branch(Comparison::Ne, Label(2));
    assert_eq!(op.to_string(), "if_ne L2");
    assert_eq!(Opcode::Jump(Label(2)).to_string(), "goto L2");
}

#[test]
fn test_typed_io_rendering() {
    assert_eq!(Opcode::Print(Primitive::Boolean).to_string(), "print boolean");
    assert_eq!(Opcode::Read(Primitive::Integer).to_string(), "read integer");
    assert_eq!(
        Opcode::PrintString("hi\tthere".to_string()).to_string(),
        "print \"hi\\tthere\""
    );
}

#[test]
fn test_negative_constants_render() {
    assert_eq!(Opcode::PushConst(-7).to_string(), "push -7");
}

#[test]
fn test_terminators() {
    assert!(Opcode::Return.is_terminator());
    assert!(Opcode::ReturnValue.is_terminator());
    assert!(Opcode::Jump(Label(1)).is_terminator());
    assert!(!Opcode::Label(Label(1)).is_terminator());
    assert!(!Opcode::Call("f".to_string()).is_terminator());
}

#[test]
fn test_is_return() {
    assert!(Opcode::Return.is_return());
    assert!(Opcode::ReturnValue.is_return());
    assert!(!Opcode::Jump(Label(0)).is_return());
}
