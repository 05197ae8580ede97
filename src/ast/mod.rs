//! AST for the Arden front-end.
//!
//! Nodes are owned trees; the type checker walks them with `&mut` and
//! writes its annotations (`expr_type`, member-access resolution, escape
//! flags) in place. Identifier text lives in the interner, literal string
//! payloads in the compilation arena.

pub mod expr;
pub mod stmt;

pub use expr::{
    EscapeInfo, Expr, ExprKind, FieldInit, InterpolPart, LambdaBody, LiteralValue, MemberInfo,
};
pub use stmt::{
    FnModifier, ForIterable, FunctionDecl, Module, Parameter, Stmt, StmtKind, StructDecl,
};
