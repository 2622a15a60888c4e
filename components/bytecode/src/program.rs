//! Compiled program containers and their encodings.
//!
//! A [`Program`] is the complete output of one compilation: one
//! [`Subroutine`] per declared subroutine plus one for the main body. It
//! renders as a deterministic assembly listing via `Display` and round-trips
//! through a compact binary encoding via `to_bytes`/`from_bytes`.

use crate::opcode::{Comparison, Label, Opcode};
use core_types::{Primitive, ValueType};
use std::collections::HashMap;
use std::fmt;

/// One compiled subroutine: signature, frame metadata, instruction stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Subroutine {
    /// Name the subroutine is called by
    pub name: String,
    /// Declared parameter types, in order
    pub params: Vec<ValueType>,
    /// Declared return type, `None` for procedures and the main body
    pub returns: Option<Primitive>,
    /// Emitted instructions in program order
    pub instructions: Vec<Opcode>,
    /// Deepest operand stack the body reaches
    pub max_stack: u32,
    /// Number of local slots the frame needs
    pub frame_width: u16,
}

impl Subroutine {
    /// Create an empty subroutine with the given signature.
    pub fn new(name: impl Into<String>, params: Vec<ValueType>, returns: Option<Primitive>) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
            instructions: Vec::new(),
            max_stack: 0,
            frame_width: 0,
        }
    }

    /// Check that every branch target is placed exactly once.
    pub fn labels_balanced(&self) -> bool {
        let mut placed: HashMap<u32, u32> = HashMap::new();
        for op in &self.instructions {
            if let Opcode::Label(label) = op {
                *placed.entry(label.0).or_insert(0) += 1;
            }
        }
        if placed.values().any(|&count| count > 1) {
            return false;
        }
        self.instructions.iter().all(|op| match op.branch_target() {
            Some(label) => placed.contains_key(&label.0),
            None => true,
        })
    }
}

impl fmt::Display for Subroutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".sub {}", self.name)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
            write!(f, " takes {}", params.join(", "))?;
        }
        if let Some(returns) = self.returns {
            write!(f, " returns {}", returns)?;
        }
        writeln!(f)?;
        writeln!(f, ".stack {}", self.max_stack)?;
        writeln!(f, ".frame {}", self.frame_width)?;
        for op in &self.instructions {
            if matches!(op, Opcode::Label(_)) {
                writeln!(f, "{}", op)?;
            } else {
                writeln!(f, "    {}", op)?;
            }
        }
        writeln!(f, ".end")
    }
}

/// A complete compiled program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Declared program name
    pub name: String,
    /// Compiled subroutines in declaration order, main last
    pub subroutines: Vec<Subroutine>,
}

impl Program {
    /// Create an empty program.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subroutines: Vec::new(),
        }
    }

    /// Look up a compiled subroutine by name.
    pub fn subroutine(&self, name: &str) -> Option<&Subroutine> {
        self.subroutines.iter().find(|s| s.name == name)
    }

    /// Serialize the program to its binary encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        // Magic number and version
        bytes.extend_from_slice(b"AMBC");
        bytes.push(1);

        write_str(&mut bytes, &self.name);
        bytes.extend_from_slice(&(self.subroutines.len() as u16).to_le_bytes());
        for sub in &self.subroutines {
            write_str(&mut bytes, &sub.name);
            bytes.push(sub.params.len() as u8);
            for param in &sub.params {
                bytes.push(type_tag(param));
            }
            bytes.push(match sub.returns {
                None => 0,
                Some(Primitive::Boolean) => 1,
                Some(Primitive::Integer) => 2,
            });
            bytes.extend_from_slice(&sub.max_stack.to_le_bytes());
            bytes.extend_from_slice(&sub.frame_width.to_le_bytes());
            bytes.extend_from_slice(&(sub.instructions.len() as u32).to_le_bytes());
            for op in &sub.instructions {
                encode_opcode(&mut bytes, op);
            }
        }

        bytes
    }

    /// Deserialize a program from its binary encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let mut cursor = Cursor::new(bytes);

        let magic = cursor.take(4)?;
        if magic != b"AMBC" {
            return Err("invalid magic number".to_string());
        }
        let version = cursor.u8()?;
        if version != 1 {
            return Err(format!("unsupported version: {}", version));
        }

        let name = cursor.str()?;
        let sub_count = cursor.u16()? as usize;
        let mut subroutines = Vec::with_capacity(sub_count);
        for _ in 0..sub_count {
            let sub_name = cursor.str()?;
            let param_count = cursor.u8()? as usize;
            let mut params = Vec::with_capacity(param_count);
            for _ in 0..param_count {
                let tag = cursor.u8()?;
                params.push(type_from_tag(tag).ok_or_else(|| {
                    format!("invalid parameter type tag {} at byte {}", tag, cursor.offset - 1)
                })?);
            }
            let returns = match cursor.u8()? {
                0 => None,
                1 => Some(Primitive::Boolean),
                2 => Some(Primitive::Integer),
                tag => {
                    return Err(format!(
                        "invalid return type tag {} at byte {}",
                        tag,
                        cursor.offset - 1
                    ))
                }
            };
            let max_stack = cursor.u32()?;
            let frame_width = cursor.u16()?;
            let inst_count = cursor.u32()? as usize;
            let mut instructions = Vec::with_capacity(inst_count);
            for _ in 0..inst_count {
                instructions.push(decode_opcode(&mut cursor)?);
            }
            subroutines.push(Subroutine {
                name: sub_name,
                params,
                returns,
                instructions,
                max_stack,
                frame_width,
            });
        }

        Ok(Self { name, subroutines })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".program {}", self.name)?;
        for sub in &self.subroutines {
            writeln!(f)?;
            write!(f, "{}", sub)?;
        }
        Ok(())
    }
}

// Signature types are scalars and arrays; a callable-typed entry keeps its
// shape but not its own parameter list.
fn type_tag(vt: &ValueType) -> u8 {
    match vt {
        ValueType::Scalar(Primitive::Boolean) => 0,
        ValueType::Scalar(Primitive::Integer) => 1,
        ValueType::Array(Primitive::Boolean) => 2,
        ValueType::Array(Primitive::Integer) => 3,
        ValueType::Function {
            returns: Primitive::Boolean,
            ..
        } => 4,
        ValueType::Function {
            returns: Primitive::Integer,
            ..
        } => 5,
        ValueType::Procedure { .. } => 6,
    }
}

fn type_from_tag(tag: u8) -> Option<ValueType> {
    match tag {
        0 => Some(ValueType::Scalar(Primitive::Boolean)),
        1 => Some(ValueType::Scalar(Primitive::Integer)),
        2 => Some(ValueType::Array(Primitive::Boolean)),
        3 => Some(ValueType::Array(Primitive::Integer)),
        4 => Some(ValueType::Function {
            params: vec![],
            returns: Primitive::Boolean,
        }),
        5 => Some(ValueType::Function {
            params: vec![],
            returns: Primitive::Integer,
        }),
        6 => Some(ValueType::Procedure { params: vec![] }),
        _ => None,
    }
}

fn primitive_tag(p: Primitive) -> u8 {
    match p {
        Primitive::Boolean => 0,
        Primitive::Integer => 1,
    }
}

fn primitive_from_tag(tag: u8, at: usize) -> Result<Primitive, String> {
    match tag {
        0 => Ok(Primitive::Boolean),
        1 => Ok(Primitive::Integer),
        _ => Err(format!("invalid primitive tag {} at byte {}", tag, at)),
    }
}

fn write_str(bytes: &mut Vec<u8>, s: &str) {
    bytes.extend_from_slice(&(s.len() as u16).to_le_bytes());
    bytes.extend_from_slice(s.as_bytes());
}

fn encode_opcode(bytes: &mut Vec<u8>, op: &Opcode) {
    match op {
        Opcode::PushConst(value) => {
            bytes.push(0);
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        Opcode::LoadLocal(slot) => {
            bytes.push(1);
            bytes.extend_from_slice(&slot.to_le_bytes());
        }
        Opcode::StoreLocal(slot) => {
            bytes.push(2);
            bytes.extend_from_slice(&slot.to_le_bytes());
        }
        Opcode::NewArray(p) => {
            bytes.push(3);
            bytes.push(primitive_tag(*p));
        }
        Opcode::LoadElement => bytes.push(4),
        Opcode::StoreElement => bytes.push(5),
        Opcode::Add => bytes.push(6),
        Opcode::Neg => bytes.push(7),
        Opcode::Mul => bytes.push(8),
        Opcode::Div => bytes.push(9),
        Opcode::Rem => bytes.push(10),
        Opcode::And => bytes.push(11),
        Opcode::Or => bytes.push(12),
        Opcode::Not => bytes.push(13),
        Opcode::Dup => bytes.push(14),
        Opcode::Swap => bytes.push(15),
        Opcode::Pop => bytes.push(16),
        Opcode::Jump(label) => {
            bytes.push(17);
            bytes.extend_from_slice(&label.0.to_le_bytes());
        }
        Opcode::Branch(cmp, label) => {
            bytes.push(18);
            bytes.push(match cmp {
                Comparison::Eq => 0,
                Comparison::Ne => 1,
                Comparison::Lt => 2,
                Comparison::Le => 3,
                Comparison::Gt => 4,
                Comparison::Ge => 5,
            });
            bytes.extend_from_slice(&label.0.to_le_bytes());
        }
        Opcode::Label(label) => {
            bytes.push(19);
            bytes.extend_from_slice(&label.0.to_le_bytes());
        }
        Opcode::Return => bytes.push(20),
        Opcode::ReturnValue => bytes.push(21),
        Opcode::Print(p) => {
            bytes.push(22);
            bytes.push(primitive_tag(*p));
        }
        Opcode::PrintString(s) => {
            bytes.push(23);
            write_str(bytes, s);
        }
        Opcode::Read(p) => {
            bytes.push(24);
            bytes.push(primitive_tag(*p));
        }
        Opcode::Call(name) => {
            bytes.push(25);
            write_str(bytes, name);
        }
    }
}

fn decode_opcode(cursor: &mut Cursor<'_>) -> Result<Opcode, String> {
    let at = cursor.offset;
    let tag = cursor.u8()?;
    let op = match tag {
        0 => Opcode::PushConst(cursor.i32()?),
        1 => Opcode::LoadLocal(cursor.u16()?),
        2 => Opcode::StoreLocal(cursor.u16()?),
        3 => {
            let p = cursor.u8()?;
            Opcode::NewArray(primitive_from_tag(p, cursor.offset - 1)?)
        }
        4 => Opcode::LoadElement,
        5 => Opcode::StoreElement,
        6 => Opcode::Add,
        7 => Opcode::Neg,
        8 => Opcode::Mul,
        9 => Opcode::Div,
        10 => Opcode::Rem,
        11 => Opcode::And,
        12 => Opcode::Or,
        13 => Opcode::Not,
        14 => Opcode::Dup,
        15 => Opcode::Swap,
        16 => Opcode::Pop,
        17 => Opcode::Jump(Label(cursor.u32()?)),
        18 => {
            let cmp = match cursor.u8()? {
                0 => Comparison::Eq,
                1 => Comparison::Ne,
                2 => Comparison::Lt,
                3 => Comparison::Le,
                4 => Comparison::Gt,
                5 => Comparison::Ge,
                other => {
                    return Err(format!(
                        "invalid comparison tag {} at byte {}",
                        other,
                        cursor.offset - 1
                    ))
                }
            };
            Opcode::Branch(cmp, Label(cursor.u32()?))
        }
        19 => Opcode::Label(Label(cursor.u32()?)),
        20 => Opcode::Return,
        21 => Opcode::ReturnValue,
        22 => {
            let p = cursor.u8()?;
            Opcode::Print(primitive_from_tag(p, cursor.offset - 1)?)
        }
        23 => Opcode::PrintString(cursor.str()?),
        24 => {
            let p = cursor.u8()?;
            Opcode::Read(primitive_from_tag(p, cursor.offset - 1)?)
        }
        25 => Opcode::Call(cursor.str()?),
        other => return Err(format!("unknown opcode tag {} at byte {}", other, at)),
    };
    Ok(op)
}

/// Bounds-checked reader over the encoded bytes.
struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], String> {
        if self.offset + n > self.bytes.len() {
            return Err(format!(
                "unexpected end of input at byte {} (wanted {} more)",
                self.bytes.len(),
                self.offset + n - self.bytes.len()
            ));
        }
        let slice = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, String> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, String> {
        let slice = self.take(2)?;
        Ok(u16::from_le_bytes([slice[0], slice[1]]))
    }

    fn u32(&mut self) -> Result<u32, String> {
        let slice = self.take(4)?;
        Ok(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    fn i32(&mut self) -> Result<i32, String> {
        let slice = self.take(4)?;
        Ok(i32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    fn str(&mut self) -> Result<String, String> {
        let len = self.u16()? as usize;
        let at = self.offset;
        let slice = self.take(len)?;
        String::from_utf8(slice.to_vec()).map_err(|e| format!("invalid UTF-8 at byte {}: {}", at, e))
    }
}
