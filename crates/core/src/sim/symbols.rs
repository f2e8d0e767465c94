//! Symbol table.
//!
//! Maps names to 32-bit values. A symbol may be defined once; redefinition
//! is reported to the caller so the assembler can turn it into a
//! diagnostic. Lookup by value supports the disassembly views.

use std::collections::BTreeMap;

/// Error returned when a symbol is defined twice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateSymbol(pub String);

impl std::fmt::Display for DuplicateSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "symbol '{}' is already defined", self.0)
    }
}

impl std::error::Error for DuplicateSymbol {}

/// Name → value mapping with single-definition semantics.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<String, u32>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines `name`; fails if it is already present.
    pub fn define(&mut self, name: &str, value: u32) -> Result<(), DuplicateSymbol> {
        if self.symbols.contains_key(name) {
            return Err(DuplicateSymbol(name.to_string()));
        }
        self.symbols.insert(name.to_string(), value);
        Ok(())
    }

    /// Looks up a symbol by name.
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.symbols.get(name).copied()
    }

    /// Returns whether `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Iterates `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Removes every symbol.
    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    /// Number of defined symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
