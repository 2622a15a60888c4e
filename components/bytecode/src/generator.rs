//! The emission interface the compiler front end drives.
//!
//! Instructions are buffered per subroutine and committed to the program
//! only when the subroutine is closed, so a compile error that aborts
//! mid-subroutine never leaves a partial instruction stream behind.

use crate::opcode::{Comparison, Label, Opcode};
use crate::program::{Program, Subroutine};
use core_types::{SymbolProperties, ValueType};

/// Buffered code generator for one program.
///
/// Callers open a subroutine, emit its body, then close it; emission
/// outside an open subroutine is a caller bug. Labels are allocated from a
/// program-wide counter, so every label in a listing is unique.
///
/// # Examples
///
/// ```
/// use bytecode::{Generator, Opcode};
/// use core_types::{SymbolProperties, ValueType};
///
/// let mut gen = Generator::new();
/// gen.set_program_name("p");
/// gen.init_subroutine(
///     "main",
///     &SymbolProperties::new(ValueType::Procedure { params: vec![] }),
/// );
/// gen.emit(Opcode::PushConst(1));
/// gen.emit(Opcode::Pop);
/// gen.close_subroutine(0);
/// assert_eq!(gen.finish().subroutines[0].instructions.len(), 3);
/// ```
pub struct Generator {
    program: Program,
    current: Option<Subroutine>,
    next_label: u32,
}

impl Generator {
    /// Create a generator for an as-yet unnamed program.
    pub fn new() -> Self {
        Self {
            program: Program::new(""),
            current: None,
            next_label: 0,
        }
    }

    /// Record the declared program name.
    pub fn set_program_name(&mut self, name: &str) {
        self.program.name = name.to_string();
    }

    /// Open a fresh instruction buffer for one subroutine.
    ///
    /// The signature is taken from the symbol properties the front end
    /// declared the name with; the main body passes a parameterless
    /// procedure.
    pub fn init_subroutine(&mut self, name: &str, properties: &SymbolProperties) {
        let (params, returns) = match &properties.value_type {
            ValueType::Function { params, returns } => (params.clone(), Some(*returns)),
            ValueType::Procedure { params } => (params.clone(), None),
            _ => (vec![], None),
        };
        self.current = Some(Subroutine::new(name, params, returns));
    }

    /// Append one instruction to the open subroutine.
    pub fn emit(&mut self, op: Opcode) {
        self.current_mut().instructions.push(op);
    }

    /// Allocate a fresh branch target, placeable later.
    pub fn get_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    /// Fix a previously allocated label at the current position.
    pub fn place_label(&mut self, label: Label) {
        self.emit(Opcode::Label(label));
    }

    /// Emit a boolean-producing comparison of the top two integers.
    ///
    /// Pops two values and pushes 1 when the comparison holds, else 0,
    /// using a branch over a constant push.
    pub fn emit_compare(&mut self, cmp: Comparison) {
        let when_true = self.get_label();
        let done = self.get_label();
        self.emit(Opcode::Branch(cmp, when_true));
        self.emit(Opcode::PushConst(0));
        self.emit(Opcode::Jump(done));
        self.place_label(when_true);
        self.emit(Opcode::PushConst(1));
        self.place_label(done);
    }

    /// Record the deepest operand stack the open subroutine reaches.
    pub fn set_max_stack_depth(&mut self, depth: u32) {
        self.current_mut().max_stack = depth;
    }

    /// Finalize the open subroutine and commit it to the program.
    ///
    /// Appends a plain return when the body does not already end in one, so
    /// every emitted subroutine terminates.
    pub fn close_subroutine(&mut self, frame_width: u16) {
        let mut sub = self.current.take().expect("no open subroutine");
        if !sub.instructions.last().is_some_and(|op| op.is_return()) {
            sub.instructions.push(Opcode::Return);
        }
        sub.frame_width = frame_width;
        self.program.subroutines.push(sub);
    }

    /// Hand over the finished program.
    pub fn finish(self) -> Program {
        self.program
    }

    // Invariant: init_subroutine before any emission, enforced by the
    // front end's per-subroutine state machine.
    fn current_mut(&mut self) -> &mut Subroutine {
        self.current.as_mut().expect("no open subroutine")
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}
