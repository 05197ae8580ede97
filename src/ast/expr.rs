use crate::intern::Symbol;
use crate::token::TokenKind;
use crate::types::Type;

use super::stmt::{Parameter, Stmt};

/// Literal payload carried by a literal expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Double(f64),
    Char(u8),
    Bool(bool),
    Str(Symbol),
    Nil,
}

/// Escape-analysis result written onto RHS expressions of field
/// assignments. Drives heap promotion in the code generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscapeInfo {
    pub escapes_scope: bool,
}

/// Checker annotations on a member access node.
///
/// `scope_depth` is the declaration depth of the chain's base variable,
/// propagated so `a.b.c` shares `a`'s depth. `field_index` stays -1 until
/// the field is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberInfo {
    pub scope_depth: i32,
    pub escaped: bool,
    pub field_index: i32,
}

impl Default for MemberInfo {
    fn default() -> Self {
        MemberInfo {
            scope_depth: 0,
            escaped: false,
            field_index: -1,
        }
    }
}

/// A single `name: value` entry in a struct literal.
#[derive(Debug, Clone)]
pub struct FieldInit {
    pub name: Symbol,
    pub value: Expr,
}

/// One segment of an interpolated string: verbatim text or an embedded
/// expression to format.
#[derive(Debug, Clone)]
pub enum InterpolPart {
    Text(Symbol),
    Expr(Expr),
}

/// Lambda bodies come in expression and statement flavors.
#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal {
        value: LiteralValue,
        ty: Type,
    },
    Variable {
        name: Symbol,
        /// Scope depth of the resolved declaration; -1 until checked.
        decl_scope_depth: i32,
    },
    Binary {
        op: TokenKind,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: TokenKind,
        operand: Box<Expr>,
    },
    Assign {
        name: Symbol,
        value: Box<Expr>,
    },
    MemberAccess {
        object: Box<Expr>,
        member: Symbol,
        info: MemberInfo,
    },
    MemberAssign {
        object: Box<Expr>,
        member: Symbol,
        value: Box<Expr>,
        info: MemberInfo,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    ArrayLiteral {
        elements: Vec<Expr>,
    },
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    ArraySlice {
        array: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
        /// Set when the sliced value is a raw pointer, not an array.
        is_from_pointer: bool,
    },
    SizedArrayAlloc {
        element_type: Type,
        size: Box<Expr>,
        default: Option<Box<Expr>>,
    },
    StructLiteral {
        name: Symbol,
        inits: Vec<FieldInit>,
        /// One flag per declared field; allocated by the checker.
        fields_initialized: Option<Vec<bool>>,
        total_field_count: i32,
    },
    InterpolatedString {
        parts: Vec<InterpolPart>,
    },
    Lambda {
        params: Vec<Parameter>,
        return_type: Type,
        body: LambdaBody,
        is_native: bool,
    },
    AsVal {
        operand: Box<Expr>,
        /// True when the operand was already a value (or array); the
        /// conversion compiles to nothing.
        is_noop: bool,
        /// True for `*char as val`, which converts to `str`.
        is_cstr_to_str: bool,
    },
    AsRef {
        operand: Box<Expr>,
    },
}

/// An expression node. `expr_type` is unset until the checker visits it.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: u32,
    pub expr_type: Option<Type>,
    pub escape_info: EscapeInfo,
}

impl Expr {
    pub fn new(kind: ExprKind, line: u32) -> Self {
        Expr {
            kind,
            line,
            expr_type: None,
            escape_info: EscapeInfo::default(),
        }
    }

    pub fn literal(value: LiteralValue, ty: Type, line: u32) -> Self {
        Expr::new(ExprKind::Literal { value, ty }, line)
    }

    pub fn int(value: i64, line: u32) -> Self {
        Expr::literal(LiteralValue::Int(value), Type::INT, line)
    }

    pub fn double(value: f64, line: u32) -> Self {
        Expr::literal(LiteralValue::Double(value), Type::DOUBLE, line)
    }

    pub fn boolean(value: bool, line: u32) -> Self {
        Expr::literal(LiteralValue::Bool(value), Type::BOOL, line)
    }

    pub fn nil(line: u32) -> Self {
        Expr::literal(LiteralValue::Nil, Type::NIL, line)
    }

    pub fn string(value: Symbol, line: u32) -> Self {
        Expr::literal(LiteralValue::Str(value), Type::STR, line)
    }

    pub fn variable(name: Symbol, line: u32) -> Self {
        Expr::new(
            ExprKind::Variable {
                name,
                decl_scope_depth: -1,
            },
            line,
        )
    }

    pub fn binary(op: TokenKind, left: Expr, right: Expr, line: u32) -> Self {
        Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            line,
        )
    }

    pub fn unary(op: TokenKind, operand: Expr, line: u32) -> Self {
        Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            line,
        )
    }

    pub fn assign(name: Symbol, value: Expr, line: u32) -> Self {
        Expr::new(
            ExprKind::Assign {
                name,
                value: Box::new(value),
            },
            line,
        )
    }

    pub fn member_access(object: Expr, member: Symbol, line: u32) -> Self {
        Expr::new(
            ExprKind::MemberAccess {
                object: Box::new(object),
                member,
                info: MemberInfo::default(),
            },
            line,
        )
    }

    pub fn member_assign(object: Expr, member: Symbol, value: Expr, line: u32) -> Self {
        Expr::new(
            ExprKind::MemberAssign {
                object: Box::new(object),
                member,
                value: Box::new(value),
                info: MemberInfo::default(),
            },
            line,
        )
    }

    pub fn call(callee: Expr, args: Vec<Expr>, line: u32) -> Self {
        Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            line,
        )
    }

    pub fn array_literal(elements: Vec<Expr>, line: u32) -> Self {
        Expr::new(ExprKind::ArrayLiteral { elements }, line)
    }

    pub fn array_access(array: Expr, index: Expr, line: u32) -> Self {
        Expr::new(
            ExprKind::ArrayAccess {
                array: Box::new(array),
                index: Box::new(index),
            },
            line,
        )
    }

    pub fn array_slice(
        array: Expr,
        start: Option<Expr>,
        end: Option<Expr>,
        step: Option<Expr>,
        line: u32,
    ) -> Self {
        Expr::new(
            ExprKind::ArraySlice {
                array: Box::new(array),
                start: start.map(Box::new),
                end: end.map(Box::new),
                step: step.map(Box::new),
                is_from_pointer: false,
            },
            line,
        )
    }

    pub fn sized_array_alloc(
        element_type: Type,
        size: Expr,
        default: Option<Expr>,
        line: u32,
    ) -> Self {
        Expr::new(
            ExprKind::SizedArrayAlloc {
                element_type,
                size: Box::new(size),
                default: default.map(Box::new),
            },
            line,
        )
    }

    pub fn struct_literal(name: Symbol, inits: Vec<FieldInit>, line: u32) -> Self {
        Expr::new(
            ExprKind::StructLiteral {
                name,
                inits,
                fields_initialized: None,
                total_field_count: -1,
            },
            line,
        )
    }

    pub fn interpolated(parts: Vec<InterpolPart>, line: u32) -> Self {
        Expr::new(ExprKind::InterpolatedString { parts }, line)
    }

    pub fn lambda(
        params: Vec<Parameter>,
        return_type: Type,
        body: LambdaBody,
        line: u32,
    ) -> Self {
        Expr::new(
            ExprKind::Lambda {
                params,
                return_type,
                body,
                is_native: false,
            },
            line,
        )
    }

    pub fn as_val(operand: Expr, line: u32) -> Self {
        Expr::new(
            ExprKind::AsVal {
                operand: Box::new(operand),
                is_noop: false,
                is_cstr_to_str: false,
            },
            line,
        )
    }

    pub fn as_ref(operand: Expr, line: u32) -> Self {
        Expr::new(
            ExprKind::AsRef {
                operand: Box::new(operand),
            },
            line,
        )
    }

    /// The resolved type, for contexts where checking already succeeded.
    pub fn ty(&self) -> &Type {
        self.expr_type
            .as_ref()
            .expect("expression has not been type-checked")
    }

    /// Checker annotations for a member access or member assign node.
    pub fn member_info(&self) -> Option<&MemberInfo> {
        match &self.kind {
            ExprKind::MemberAccess { info, .. } | ExprKind::MemberAssign { info, .. } => {
                Some(info)
            }
            _ => None,
        }
    }

    /// Memory qualifier helper: whether this node is a variable reference.
    pub fn variable_name(&self) -> Option<Symbol> {
        match &self.kind {
            ExprKind::Variable { name, .. } => Some(*name),
            _ => None,
        }
    }
}
