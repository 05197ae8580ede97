//! Struct layout: sizes, alignments, and field offsets.
//!
//! Runs once per struct declaration, after the circular-dependency check
//! has passed, and caches its results on the `StructType` node. `Named`
//! field types are resolved through the symbol table's registry, which is
//! why every function here takes the table.

use crate::symbols::SymbolTable;
use crate::types::{Primitive, StructType, Type};

/// `(n + a - 1) & !(a - 1)`; alignments are always powers of two.
fn round_up(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}

/// Size in bytes of a value of this type. Arrays and strings are
/// fat-pointer headers, `any` is a tagged 16-byte box, structs must have
/// been laid out already.
pub fn get_type_size(ty: &Type, table: &SymbolTable) -> usize {
    match ty {
        Type::Primitive(p) => match p {
            Primitive::Void | Primitive::Nil => 0,
            Primitive::Bool | Primitive::Byte | Primitive::Char => 1,
            Primitive::Int32 | Primitive::Uint32 | Primitive::Float => 4,
            Primitive::Int
            | Primitive::Uint
            | Primitive::Long
            | Primitive::Double
            | Primitive::Str => 8,
            Primitive::Any => 16,
        },
        Type::Pointer(_) | Type::Array(_) | Type::Function(_) => 8,
        Type::Struct(st) => st.size,
        Type::Opaque(_) => 0,
        Type::Named(name) => table
            .lookup_type(*name)
            .map_or(0, |resolved| get_type_size(resolved, table)),
    }
}

/// Natural alignment: equal to size for scalars, pointer-width for
/// reference types, 1 for the zero-sized types.
pub fn get_type_alignment(ty: &Type, table: &SymbolTable) -> usize {
    match ty {
        Type::Primitive(p) => match p {
            Primitive::Void | Primitive::Nil => 1,
            Primitive::Bool | Primitive::Byte | Primitive::Char => 1,
            Primitive::Int32 | Primitive::Uint32 | Primitive::Float => 4,
            Primitive::Int
            | Primitive::Uint
            | Primitive::Long
            | Primitive::Double
            | Primitive::Str => 8,
            Primitive::Any => 8,
        },
        Type::Pointer(_) | Type::Array(_) | Type::Function(_) => 8,
        Type::Struct(st) => st.alignment.max(1),
        Type::Opaque(_) => 1,
        Type::Named(name) => table
            .lookup_type(*name)
            .map_or(1, |resolved| get_type_alignment(resolved, table)),
    }
}

/// Compute `size`, `alignment`, and per-field `offset` in declaration
/// order.
///
/// Packed structs place fields back to back with alignment 1. A
/// `#pragma pack(N)` cap reduces each field's effective alignment to
/// `min(natural, N)`. Empty structs are size 0, alignment 1.
pub fn calculate_struct_layout(st: &mut StructType, table: &SymbolTable) {
    if st.is_packed {
        let mut offset = 0;
        for field in &mut st.fields {
            field.offset = offset;
            offset += get_type_size(&field.ty, table);
        }
        st.size = offset;
        st.alignment = 1;
        return;
    }

    let cap = if st.pack_value > 0 {
        st.pack_value as usize
    } else {
        usize::MAX
    };
    let mut offset = 0;
    let mut max_align = 1;
    for field in &mut st.fields {
        let align = get_type_alignment(&field.ty, table).min(cap);
        offset = round_up(offset, align);
        field.offset = offset;
        offset += get_type_size(&field.ty, table);
        max_align = max_align.max(align);
    }
    st.size = round_up(offset, max_align);
    st.alignment = max_align;
}
