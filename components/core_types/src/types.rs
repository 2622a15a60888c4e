//! The value-type lattice of the source language.
//!
//! AMPL has two scalar types, one-dimensional arrays of each, and two kinds
//! of callable. Types are compared structurally; there is no widening and no
//! subtyping anywhere in the language.

use std::fmt;

/// A scalar base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// `boolean`, the two truth values
    Boolean,
    /// `integer`, a signed 32-bit machine integer
    Integer,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Boolean => write!(f, "boolean"),
            Primitive::Integer => write!(f, "integer"),
        }
    }
}

/// The type of a declared name or an expression.
///
/// Callable signatures live inside the type itself, so a symbol table entry
/// or an expression result is always described by one self-contained value.
///
/// # Examples
///
/// ```
/// use core_types::{Primitive, ValueType};
///
/// let a = ValueType::Array(Primitive::Boolean);
/// assert!(a.is_array());
/// assert!(!a.is_callable());
/// assert_eq!(a.to_string(), "boolean array");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// A scalar variable or expression
    Scalar(Primitive),
    /// A one-dimensional array variable or expression
    Array(Primitive),
    /// A subroutine with a declared return type
    Function {
        /// Declared parameter types, in order
        params: Vec<ValueType>,
        /// Declared return type
        returns: Primitive,
    },
    /// A subroutine without a return type
    Procedure {
        /// Declared parameter types, in order
        params: Vec<ValueType>,
    },
}

impl ValueType {
    /// True for scalars and arrays, the types a variable can have.
    pub fn is_variable(&self) -> bool {
        matches!(self, ValueType::Scalar(_) | ValueType::Array(_))
    }

    /// True for arrays. Callables are never arrays, whatever they return.
    pub fn is_array(&self) -> bool {
        matches!(self, ValueType::Array(_))
    }

    /// True for functions and procedures.
    pub fn is_callable(&self) -> bool {
        matches!(self, ValueType::Function { .. } | ValueType::Procedure { .. })
    }

    /// True exactly for `Scalar(p)`.
    pub fn is_scalar(&self, p: Primitive) -> bool {
        matches!(self, ValueType::Scalar(q) if *q == p)
    }

    /// The declared parameter list of a callable, empty otherwise.
    pub fn params(&self) -> &[ValueType] {
        match self {
            ValueType::Function { params, .. } | ValueType::Procedure { params } => params,
            _ => &[],
        }
    }

    /// The type of the value an expression of this type yields.
    ///
    /// A function call collapses to its scalar return type; every other type
    /// already is its own value. This is the only place a callable tag is
    /// stripped during type checking.
    pub fn result(&self) -> ValueType {
        match self {
            ValueType::Function { returns, .. } => ValueType::Scalar(*returns),
            other => other.clone(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Scalar(p) => write!(f, "{}", p),
            ValueType::Array(p) => write!(f, "{} array", p),
            ValueType::Function { returns, .. } => write!(f, "{} function", returns),
            ValueType::Procedure { .. } => write!(f, "procedure"),
        }
    }
}
