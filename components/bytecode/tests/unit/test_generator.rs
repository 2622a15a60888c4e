//! Unit tests for the emission generator

use bytecode::{Comparison, Generator, Opcode};
use core_types::{Primitive, SymbolProperties, ValueType};

fn procedure_props() -> SymbolProperties {
    SymbolProperties::new(ValueType::Procedure { params: vec![] })
}

#[test]
fn test_program_name_flows_through() {
    let mut gen = Generator::new();
    gen.set_program_name("calc");
    assert_eq!(gen.finish().name, "calc");
}

#[test]
fn test_subroutines_commit_in_close_order() {
    let mut gen = Generator::new();
    for name in ["first", "second", "main"] {
        gen.init_subroutine(name, &procedure_props());
        gen.close_subroutine(0);
    }
    let program = gen.finish();
    let names: Vec<&str> = program.subroutines.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "main"]);
}

#[test]
fn test_metadata_lands_on_the_right_subroutine() {
    let mut gen = Generator::new();
    gen.init_subroutine("a", &procedure_props());
    gen.set_max_stack_depth(7);
    gen.close_subroutine(2);
    gen.init_subroutine("b", &procedure_props());
    gen.set_max_stack_depth(1);
    gen.close_subroutine(5);

    let program = gen.finish();
    let a = program.subroutine("a").expect("missing a");
    let b = program.subroutine("b").expect("missing b");
    assert_eq!((a.max_stack, a.frame_width), (7, 2));
    assert_eq!((b.max_stack, b.frame_width), (1, 5));
}

#[test]
fn test_guard_pattern_labels_balance() {
    // the front end's shape for `if`: guard, push true, branch-on-false
    let mut gen = Generator::new();
    gen.init_subroutine("main", &procedure_props());
    let else_label = gen.get_label();
    let end_label = gen.get_label();
    gen.emit(Opcode::LoadLocal(0));
    gen.emit(Opcode::PushConst(1));
    gen.emit(Opcode::Branch(Comparison::Ne, else_label));
    gen.emit(Opcode::PushConst(1));
    gen.emit(Opcode::StoreLocal(1));
    gen.emit(Opcode::Jump(end_label));
    gen.place_label(else_label);
    gen.place_label(end_label);
    gen.close_subroutine(2);

    let program = gen.finish();
    assert!(program.subroutines[0].labels_balanced());
}

#[test]
fn test_emit_compare_nets_one_value() {
    let mut gen = Generator::new();
    gen.init_subroutine("main", &procedure_props());
    gen.emit(Opcode::LoadLocal(0));
    gen.emit(Opcode::LoadLocal(1));
    gen.emit_compare(Comparison::Eq);
    gen.emit(Opcode::StoreLocal(2));
    gen.close_subroutine(3);

    let program = gen.finish();
    let body = &program.subroutines[0].instructions;
    // two loads, six comparison ops, one store, one appended return
    assert_eq!(body.len(), 10);
    assert!(program.subroutines[0].labels_balanced());
}

#[test]
fn test_function_signature_copied_from_properties() {
    let mut gen = Generator::new();
    let props = SymbolProperties::new(ValueType::Function {
        params: vec![
            ValueType::Scalar(Primitive::Integer),
            ValueType::Array(Primitive::Boolean),
        ],
        returns: Primitive::Integer,
    });
    gen.init_subroutine("f", &props);
    gen.emit(Opcode::PushConst(0));
    gen.emit(Opcode::ReturnValue);
    gen.close_subroutine(2);

    let program = gen.finish();
    let f = program.subroutine("f").expect("missing f");
    assert_eq!(f.params.len(), 2);
    assert_eq!(f.returns, Some(Primitive::Integer));
}
