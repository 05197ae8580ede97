use std::collections::HashMap;

use crate::intern::Symbol;
use crate::types::{MemQual, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
}

/// One resolved name. `scope_depth` is captured at declaration time and
/// never changes; the escape analyzer compares these depths.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: Symbol,
    pub kind: SymbolKind,
    pub ty: Type,
    pub scope_depth: i32,
    pub is_native_context: bool,
    pub mem_qual: MemQual,
}

impl SymbolEntry {
    pub fn variable(name: Symbol, ty: Type, scope_depth: i32) -> Self {
        SymbolEntry {
            name,
            kind: SymbolKind::Variable,
            ty,
            scope_depth,
            is_native_context: false,
            mem_qual: MemQual::Default,
        }
    }

    pub fn function(name: Symbol, ty: Type, scope_depth: i32) -> Self {
        SymbolEntry {
            name,
            kind: SymbolKind::Function,
            ty,
            scope_depth,
            is_native_context: false,
            mem_qual: MemQual::Default,
        }
    }
}

/// Scoped name table plus the type registry.
///
/// Scopes push and pop in LIFO order mirroring block structure; the global
/// scope (depth 1) is always present. The registry maps declared type
/// names (structs, opaques, function aliases) to their resolved types and
/// is flat: type names are global.
pub struct SymbolTable {
    scopes: Vec<HashMap<Symbol, SymbolEntry>>,
    registry: HashMap<Symbol, Type>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![HashMap::new()],
            registry: HashMap::new(),
        }
    }

    /// Current scope depth; the global scope is depth 1.
    pub fn depth(&self) -> i32 {
        self.scopes.len() as i32
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Insert into the current scope. Returns false when the name is
    /// already declared in this scope (outer shadowing is fine).
    pub fn declare(&mut self, entry: SymbolEntry) -> bool {
        let scope = self.scopes.last_mut().expect("global scope always present");
        if scope.contains_key(&entry.name) {
            return false;
        }
        scope.insert(entry.name, entry);
        true
    }

    /// Innermost-out lookup.
    pub fn lookup(&self, name: Symbol) -> Option<&SymbolEntry> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name))
    }

    pub fn lookup_mut(&mut self, name: Symbol) -> Option<&mut SymbolEntry> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(&name))
    }

    /// Register a declared type name. Registration stores the type as
    /// given; self-referential struct fields are `Named` handles, so this
    /// never recurses. Returns false on a duplicate name.
    pub fn register_type(&mut self, name: Symbol, ty: Type) -> bool {
        if self.registry.contains_key(&name) {
            return false;
        }
        self.registry.insert(name, ty);
        true
    }

    pub fn lookup_type(&self, name: Symbol) -> Option<&Type> {
        self.registry.get(&name)
    }

    pub fn lookup_type_mut(&mut self, name: Symbol) -> Option<&mut Type> {
        self.registry.get_mut(&name)
    }

    /// Resolve one level of `Named` indirection, cloning the registered
    /// type for use in a new AST context. Non-named types clone as-is.
    pub fn resolve_named(&self, ty: &Type) -> Option<Type> {
        match ty {
            Type::Named(name) => self.lookup_type(*name).cloned(),
            other => Some(other.clone()),
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
