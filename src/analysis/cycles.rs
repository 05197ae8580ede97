//! Circular struct dependency detection.
//!
//! A struct that contains itself by value (directly, through other
//! structs, or through an array element) can never be laid out; a pointer
//! field breaks the cycle because the pointee is not stored inline. The
//! walk resolves `Named` field handles through the type registry and
//! carries the current path as a name list, so it terminates on any
//! finite declaration set, self-referential ones included.

use crate::intern::{Interner, Symbol};
use crate::symbols::SymbolTable;
use crate::types::{StructType, Type};

/// Returns true when `ty` participates in a value cycle. On detection the
/// offending path (ending with the repeated name) is left in `chain` for
/// the error message.
pub fn detect_struct_circular_dependency(
    ty: &Type,
    table: &SymbolTable,
    chain: &mut Vec<Symbol>,
) -> bool {
    match ty {
        Type::Struct(st) => walk_struct(st, table, chain),
        Type::Named(name) => match table.lookup_type(*name) {
            Some(resolved) => {
                // Guard against alias loops in the registry itself.
                if chain.contains(name) && resolved.as_struct().is_some() {
                    chain.push(*name);
                    return true;
                }
                detect_struct_circular_dependency(resolved, table, chain)
            }
            None => false,
        },
        Type::Array(elem) => detect_struct_circular_dependency(elem, table, chain),
        // Pointers break value cycles; scalars cannot form them.
        _ => false,
    }
}

fn walk_struct(st: &StructType, table: &SymbolTable, chain: &mut Vec<Symbol>) -> bool {
    if let Some(name) = st.name {
        if chain.contains(&name) {
            chain.push(name);
            return true;
        }
        chain.push(name);
    }
    for field in &st.fields {
        if field_cycles(&field.ty, table, chain) {
            return true;
        }
    }
    if st.name.is_some() {
        chain.pop();
    }
    false
}

fn field_cycles(field_ty: &Type, table: &SymbolTable, chain: &mut Vec<Symbol>) -> bool {
    match field_ty {
        Type::Pointer(_) => false,
        Type::Array(elem) => field_cycles(elem, table, chain),
        Type::Struct(st) => walk_struct(st, table, chain),
        Type::Named(name) => {
            if chain.contains(name) {
                // Only struct names count; a Named handle to an opaque or
                // function alias cannot nest a value.
                if let Some(resolved) = table.lookup_type(*name) {
                    if resolved.as_struct().is_some() {
                        chain.push(*name);
                        return true;
                    }
                }
                return false;
            }
            match table.lookup_type(*name) {
                Some(Type::Struct(st)) => walk_struct(st, table, chain),
                _ => false,
            }
        }
        _ => false,
    }
}

/// Render a detected path as `A -> B -> A`.
pub fn format_dependency_chain(chain: &[Symbol], interner: &Interner) -> String {
    chain
        .iter()
        .map(|sym| interner.resolve(*sym))
        .collect::<Vec<_>>()
        .join(" -> ")
}
