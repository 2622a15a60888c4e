//! Instruction set of the abstract stack machine.
//!
//! One frame of numbered local slots per subroutine call, an operand stack,
//! and symbolic branch labels that stay symbolic through the listing. Array
//! values are references; loads and stores on elements expect the reference
//! below the index on the stack.

use core_types::Primitive;
use std::fmt;

/// An opaque branch target, usable in a branch before it is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// The comparison applied by a conditional branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Branch when the two popped values are equal
    Eq,
    /// Branch when they differ
    Ne,
    /// Branch when the second-popped is less than the first
    Lt,
    /// Branch on less-or-equal
    Le,
    /// Branch on greater-than
    Gt,
    /// Branch on greater-or-equal
    Ge,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Comparison::Eq => "eq",
            Comparison::Ne => "ne",
            Comparison::Lt => "lt",
            Comparison::Le => "le",
            Comparison::Gt => "gt",
            Comparison::Ge => "ge",
        };
        write!(f, "{}", name)
    }
}

/// One instruction of the target machine.
///
/// `Label` is a pseudo-instruction marking a branch target; everything else
/// executes. Integer and boolean values share the operand stack (booleans
/// are 0 and 1), so arithmetic and logic need no per-type variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Opcode {
    // Constants and slots
    /// Push an integer constant (booleans push 0 or 1)
    PushConst(i32),
    /// Push the value of a local slot
    LoadLocal(u16),
    /// Pop into a local slot
    StoreLocal(u16),

    // Arrays
    /// Pop a length, push a reference to a fresh zeroed array
    NewArray(Primitive),
    /// Pop index and reference, push the element
    LoadElement,
    /// Pop value, index and reference, store the element
    StoreElement,

    // Integer arithmetic
    /// Pop two, push their sum
    Add,
    /// Negate the top of the stack
    Neg,
    /// Pop two, push their product
    Mul,
    /// Pop divisor then dividend, push the quotient
    Div,
    /// Pop divisor then dividend, push the remainder
    Rem,

    // Boolean logic
    /// Pop two, push their conjunction
    And,
    /// Pop two, push their disjunction
    Or,
    /// Invert the boolean on top of the stack
    Not,

    // Stack shuffling
    /// Duplicate the top of the stack
    Dup,
    /// Exchange the top two values
    Swap,
    /// Discard the top of the stack
    Pop,

    // Control flow
    /// Branch unconditionally
    Jump(Label),
    /// Pop two integers, branch when the comparison holds
    Branch(Comparison, Label),
    /// Place a branch target here
    Label(Label),
    /// Return with no value
    Return,
    /// Pop the return value and return it
    ReturnValue,

    // Statements
    /// Pop a scalar and print it in its source syntax
    Print(Primitive),
    /// Print a string literal
    PrintString(String),
    /// Read a scalar from standard input and push it
    Read(Primitive),
    /// Call a subroutine of the current program by name
    Call(String),
}

impl Opcode {
    /// Check if this opcode ends straight-line execution.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Opcode::Jump(_) | Opcode::Return | Opcode::ReturnValue
        )
    }

    /// Check if this opcode returns from the current subroutine.
    pub fn is_return(&self) -> bool {
        matches!(self, Opcode::Return | Opcode::ReturnValue)
    }

    /// The label this opcode transfers control to, if any.
    pub fn branch_target(&self) -> Option<Label> {
        match self {
            Opcode::Jump(label) | Opcode::Branch(_, label) => Some(*label),
            _ => None,
        }
    }
}

/// Escape a string for the assembly listing.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::PushConst(value) => write!(f, "push {}", value),
            Opcode::LoadLocal(slot) => write!(f, "load {}", slot),
            Opcode::StoreLocal(slot) => write!(f, "store {}", slot),
            Opcode::NewArray(p) => write!(f, "newarray {}", p),
            Opcode::LoadElement => write!(f, "ldelem"),
            Opcode::StoreElement => write!(f, "stelem"),
            Opcode::Add => write!(f, "add"),
            Opcode::Neg => write!(f, "neg"),
            Opcode::Mul => write!(f, "mul"),
            Opcode::Div => write!(f, "div"),
            Opcode::Rem => write!(f, "rem"),
            Opcode::And => write!(f, "and"),
            Opcode::Or => write!(f, "or"),
            Opcode::Not => write!(f, "not"),
            Opcode::Dup => write!(f, "dup"),
            Opcode::Swap => write!(f, "swap"),
            Opcode::Pop => write!(f, "pop"),
            Opcode::Jump(label) => write!(f, "goto {}", label),
            Opcode::Branch(cmp, label) => write!(f, "if_{} {}", cmp, label),
            Opcode::Label(label) => write!(f, "{}:", label),
            Opcode::Return => write!(f, "return"),
            Opcode::ReturnValue => write!(f, "retval"),
            Opcode::Print(p) => write!(f, "print {}", p),
            Opcode::PrintString(s) => write!(f, "print \"{}\"", escape(s)),
            Opcode::Read(p) => write!(f, "read {}", p),
            Opcode::Call(name) => write!(f, "call {}", name),
        }
    }
}
