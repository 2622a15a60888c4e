//! Per-name properties stored by the symbol table.

use crate::ValueType;

/// Everything the compiler records about one declared name.
///
/// Variables additionally receive a local slot offset when they are inserted
/// into a scope; callables keep the default of zero, which no emission path
/// reads.
///
/// # Examples
///
/// ```
/// use core_types::{Primitive, SymbolProperties, ValueType};
///
/// let props = SymbolProperties::new(ValueType::Scalar(Primitive::Integer));
/// assert_eq!(props.offset, 0);
/// assert!(props.value_type.is_variable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolProperties {
    /// Declared type of the name
    pub value_type: ValueType,
    /// Local-variable slot for generated code, assigned at insertion
    pub offset: u16,
}

impl SymbolProperties {
    /// Properties for a freshly declared name; the offset is assigned by the
    /// symbol table when the name is inserted.
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            offset: 0,
        }
    }
}
