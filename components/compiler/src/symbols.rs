//! Scoped symbol table for the AMPL compiler.
//!
//! Scopes form an arena with enclosing links: index 0 is the global scope
//! and each subroutine gets a fresh scope chained to it. The table also
//! owns the frame-offset counter, so variable slots are numbered here and
//! nowhere else.

use core_types::SymbolProperties;
use std::collections::HashMap;

struct Scope {
    bindings: HashMap<String, SymbolProperties>,
    enclosing: Option<usize>,
}

/// Symbol table with one scope per subroutine plus the global scope.
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: usize,
    next_offset: u16,
}

impl SymbolTable {
    /// Create a table holding only the empty global scope.
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope {
                bindings: HashMap::new(),
                enclosing: None,
            }],
            current: 0,
            next_offset: 0,
        }
    }

    /// Enter a subroutine definition.
    ///
    /// The name is bound in the current (global) scope first, then a fresh
    /// local scope becomes current and the offset counter restarts at zero.
    /// Returns `false` without opening the scope when the name is already
    /// bound.
    pub fn open_subroutine(&mut self, name: &str, properties: SymbolProperties) -> bool {
        if !self.insert_name(name, properties) {
            return false;
        }
        self.scopes.push(Scope {
            bindings: HashMap::new(),
            enclosing: Some(self.current),
        });
        self.current = self.scopes.len() - 1;
        self.next_offset = 0;
        true
    }

    /// Leave the current subroutine scope, discarding its bindings.
    ///
    /// The offset counter is left untouched so the caller can still read
    /// the finished subroutine's frame width. In the global scope this is
    /// a no-op.
    pub fn close_subroutine(&mut self) {
        if let Some(enclosing) = self.scopes[self.current].enclosing {
            self.scopes.truncate(self.current);
            self.current = enclosing;
        }
    }

    /// Bind a name in the current scope.
    ///
    /// Variables receive the next frame offset; callables do not consume
    /// one. Returns `false` when the name is already bound in the current
    /// scope, leaving the table unchanged.
    pub fn insert_name(&mut self, name: &str, mut properties: SymbolProperties) -> bool {
        if self.scopes[self.current].bindings.contains_key(name) {
            return false;
        }
        if properties.value_type.is_variable() {
            properties.offset = self.next_offset;
            self.next_offset += 1;
        }
        self.scopes[self.current]
            .bindings
            .insert(name.to_string(), properties);
        true
    }

    /// Look up a name from the current scope outward.
    ///
    /// The current scope sees all of its own bindings. An enclosing scope
    /// only supplies callables; a variable found there hides the name
    /// without matching, so subroutine bodies cannot reach another frame's
    /// variables.
    pub fn find_name(&self, name: &str) -> Option<&SymbolProperties> {
        if let Some(properties) = self.scopes[self.current].bindings.get(name) {
            return Some(properties);
        }
        let mut enclosing = self.scopes[self.current].enclosing;
        while let Some(index) = enclosing {
            if let Some(properties) = self.scopes[index].bindings.get(name) {
                return properties.value_type.is_callable().then_some(properties);
            }
            enclosing = self.scopes[index].enclosing;
        }
        None
    }

    /// Number of variable slots handed out since the counter last restarted.
    pub fn variables_width(&self) -> u16 {
        self.next_offset
    }

    /// Restart the offset counter without touching any scope.
    pub fn reset_offsets(&mut self) {
        self.next_offset = 0;
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
