use crate::ast::Expr;
use crate::intern::{Interner, Symbol};

/// Primitive (non-composite) type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Void,
    Nil,
    Bool,
    Byte,
    Char,
    Int,
    Int32,
    Uint,
    Uint32,
    Long,
    Float,
    Double,
    Str,
    Any,
}

/// Memory qualifier on a parameter or variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemQual {
    #[default]
    Default,
    AsVal,
    AsRef,
    Shared,
    Private,
}

/// Function signature type.
#[derive(Debug, Clone)]
pub struct FunctionType {
    pub return_type: Type,
    pub params: Vec<Type>,
    pub param_quals: Vec<MemQual>,
    pub is_native: bool,
    pub is_variadic: bool,
}

impl FunctionType {
    pub fn new(return_type: Type, params: Vec<Type>) -> Self {
        let quals = vec![MemQual::Default; params.len()];
        FunctionType {
            return_type,
            params,
            param_quals: quals,
            is_native: false,
            is_variadic: false,
        }
    }
}

/// One declared struct field. `offset` is written by the layout engine;
/// until then it is 0 and meaningless.
#[derive(Debug, Clone)]
pub struct StructField {
    pub name: Symbol,
    pub ty: Type,
    pub offset: usize,
    pub default_value: Option<Expr>,
    pub c_alias: Option<Symbol>,
}

impl StructField {
    pub fn new(name: Symbol, ty: Type) -> Self {
        StructField {
            name,
            ty,
            offset: 0,
            default_value: None,
            c_alias: None,
        }
    }
}

/// Struct type with its (eventually computed) layout.
///
/// Fields that refer to other user structs hold `Type::Named` handles, so
/// a self-referential declaration like `struct Node => next: Node` is
/// representable without cyclic ownership; the cycle detector and layout
/// engine resolve the handles through the type registry.
#[derive(Debug, Clone)]
pub struct StructType {
    pub name: Option<Symbol>,
    pub fields: Vec<StructField>,
    pub size: usize,
    pub alignment: usize,
    pub is_native: bool,
    pub is_packed: bool,
    /// `#pragma pack(N)` cap; 0 means natural alignment.
    pub pack_value: u8,
}

impl StructType {
    pub fn new(name: Option<Symbol>, fields: Vec<StructField>) -> Self {
        StructType {
            name,
            fields,
            size: 0,
            alignment: 0,
            is_native: false,
            is_packed: false,
            pack_value: 0,
        }
    }

    pub fn field(&self, name: Symbol) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: Symbol) -> i32 {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .map_or(-1, |i| i as i32)
    }
}

/// The type sum.
#[derive(Debug, Clone)]
pub enum Type {
    Primitive(Primitive),
    Array(Box<Type>),
    Pointer(Box<Type>),
    Function(Box<FunctionType>),
    Struct(Box<StructType>),
    /// C-compatible nominal handle with no known structure.
    Opaque(Symbol),
    /// Deferred reference to a registered type, resolved during checking.
    Named(Symbol),
}

impl Type {
    pub const VOID: Type = Type::Primitive(Primitive::Void);
    pub const NIL: Type = Type::Primitive(Primitive::Nil);
    pub const BOOL: Type = Type::Primitive(Primitive::Bool);
    pub const BYTE: Type = Type::Primitive(Primitive::Byte);
    pub const CHAR: Type = Type::Primitive(Primitive::Char);
    pub const INT: Type = Type::Primitive(Primitive::Int);
    pub const INT32: Type = Type::Primitive(Primitive::Int32);
    pub const UINT: Type = Type::Primitive(Primitive::Uint);
    pub const UINT32: Type = Type::Primitive(Primitive::Uint32);
    pub const LONG: Type = Type::Primitive(Primitive::Long);
    pub const FLOAT: Type = Type::Primitive(Primitive::Float);
    pub const DOUBLE: Type = Type::Primitive(Primitive::Double);
    pub const STR: Type = Type::Primitive(Primitive::Str);
    pub const ANY: Type = Type::Primitive(Primitive::Any);

    pub fn array_of(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn pointer_to(base: Type) -> Type {
        Type::Pointer(Box::new(base))
    }

    pub fn function(sig: FunctionType) -> Type {
        Type::Function(Box::new(sig))
    }

    pub fn structure(st: StructType) -> Type {
        Type::Struct(Box::new(st))
    }

    pub fn primitive(kind: Primitive) -> Type {
        Type::Primitive(kind)
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            Type::Struct(st) => Some(st),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut StructType> {
        match self {
            Type::Struct(st) => Some(st),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Void))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Nil))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Bool))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Type::Opaque(_))
    }

    /// Render for diagnostics: `int`, `int[]`, `*char`, `Point`,
    /// `fn(int, str) -> void`, `opaque FILE`.
    pub fn describe(&self, interner: &Interner) -> String {
        match self {
            Type::Primitive(p) => primitive_name(*p).to_string(),
            Type::Array(elem) => format!("{}[]", elem.describe(interner)),
            Type::Pointer(base) => format!("*{}", base.describe(interner)),
            Type::Function(f) => {
                let params: Vec<String> =
                    f.params.iter().map(|p| p.describe(interner)).collect();
                let variadic = if f.is_variadic { ", ..." } else { "" };
                format!(
                    "fn({}{}) -> {}",
                    params.join(", "),
                    variadic,
                    f.return_type.describe(interner)
                )
            }
            Type::Struct(st) => match st.name {
                Some(name) => interner.resolve(name).to_string(),
                None => "struct".to_string(),
            },
            Type::Opaque(name) => format!("opaque {}", interner.resolve(*name)),
            Type::Named(name) => interner.resolve(*name).to_string(),
        }
    }
}

pub fn primitive_name(p: Primitive) -> &'static str {
    match p {
        Primitive::Void => "void",
        Primitive::Nil => "nil",
        Primitive::Bool => "bool",
        Primitive::Byte => "byte",
        Primitive::Char => "char",
        Primitive::Int => "int",
        Primitive::Int32 => "int32",
        Primitive::Uint => "uint",
        Primitive::Uint32 => "uint32",
        Primitive::Long => "long",
        Primitive::Float => "float",
        Primitive::Double => "double",
        Primitive::Str => "str",
        Primitive::Any => "any",
    }
}

/// Structural type equality. Named handles compare by symbol, and a Named
/// handle equals a struct carrying the same name, so comparisons work both
/// before and after registry resolution.
pub fn ast_type_equals(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Primitive(pa), Type::Primitive(pb)) => pa == pb,
        (Type::Array(ea), Type::Array(eb)) => ast_type_equals(ea, eb),
        (Type::Pointer(ba), Type::Pointer(bb)) => ast_type_equals(ba, bb),
        (Type::Function(fa), Type::Function(fb)) => {
            fa.params.len() == fb.params.len()
                && fa.is_variadic == fb.is_variadic
                && ast_type_equals(&fa.return_type, &fb.return_type)
                && fa
                    .params
                    .iter()
                    .zip(fb.params.iter())
                    .all(|(x, y)| ast_type_equals(x, y))
        }
        (Type::Struct(sa), Type::Struct(sb)) => match (sa.name, sb.name) {
            (Some(na), Some(nb)) => na == nb,
            (None, None) => {
                sa.fields.len() == sb.fields.len()
                    && sa
                        .fields
                        .iter()
                        .zip(sb.fields.iter())
                        .all(|(x, y)| x.name == y.name && ast_type_equals(&x.ty, &y.ty))
            }
            _ => false,
        },
        (Type::Opaque(na), Type::Opaque(nb)) => na == nb,
        (Type::Named(na), Type::Named(nb)) => na == nb,
        (Type::Named(n), Type::Struct(st)) | (Type::Struct(st), Type::Named(n)) => {
            st.name == Some(*n)
        }
        (Type::Named(n), Type::Opaque(o)) | (Type::Opaque(o), Type::Named(n)) => n == o,
        _ => false,
    }
}

pub fn ast_type_is_struct(ty: &Type) -> bool {
    matches!(ty, Type::Struct(_))
}

pub fn ast_struct_get_field<'t>(ty: &'t Type, name: Symbol) -> Option<&'t StructField> {
    ty.as_struct().and_then(|st| st.field(name))
}

pub fn ast_struct_get_field_index(ty: &Type, name: Symbol) -> i32 {
    ty.as_struct().map_or(-1, |st| st.field_index(name))
}

/// Numeric types participate in arithmetic and comparisons.
pub fn is_numeric_type(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Primitive(
            Primitive::Byte
                | Primitive::Int
                | Primitive::Int32
                | Primitive::Uint
                | Primitive::Uint32
                | Primitive::Long
                | Primitive::Float
                | Primitive::Double
        )
    )
}

/// Scalar primitives. `str` and `any` are deliberately excluded: `str` is
/// a reference type and `any` is a boxed dynamic.
pub fn is_primitive_type(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Primitive(
            Primitive::Void
                | Primitive::Nil
                | Primitive::Bool
                | Primitive::Byte
                | Primitive::Char
                | Primitive::Int
                | Primitive::Int32
                | Primitive::Uint
                | Primitive::Uint32
                | Primitive::Long
                | Primitive::Float
                | Primitive::Double
        )
    )
}

/// Heap-backed types whose values are handles rather than inline scalars.
pub fn is_reference_type(ty: &Type) -> bool {
    matches!(ty, Type::Primitive(Primitive::Str) | Type::Array(_) | Type::Struct(_))
}

/// Types a value of which can be formatted into an interpolated string.
pub fn is_printable_type(ty: &Type) -> bool {
    match ty {
        Type::Primitive(p) => !matches!(p, Primitive::Void | Primitive::Nil),
        Type::Array(elem) => is_printable_type(elem),
        _ => false,
    }
}

/// Types that may cross a C ABI boundary in a native signature.
pub fn is_c_compatible_type(ty: &Type) -> bool {
    match ty {
        Type::Primitive(p) => !matches!(p, Primitive::Str | Primitive::Any | Primitive::Nil),
        Type::Pointer(_) => true,
        Type::Opaque(_) => true,
        Type::Struct(st) => st.is_native,
        _ => false,
    }
}

/// Extra arguments to a variadic call must be loggable scalars or strings.
pub fn is_variadic_compatible_type(ty: &Type) -> bool {
    match ty {
        Type::Primitive(Primitive::Void) => false,
        Type::Primitive(_) => true,
        _ => false,
    }
}

/// Whether a `private` function may return this type. Reference types must
/// stay inside the private region; every plain primitive may leave.
pub fn can_escape_private(ty: &Type) -> bool {
    is_primitive_type(ty)
}
