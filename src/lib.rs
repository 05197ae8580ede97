//! Front-end for the Arden systems language: an indentation-sensitive
//! lexer and a type checker with native/regular context rules, struct
//! layout, circular-dependency detection, and scope-based escape
//! analysis.
//!
//! The parser and code generator are external collaborators: the lexer
//! hands them a token stream, the checker consumes the AST they build and
//! annotates it in place.

pub mod analysis;
pub mod arena;
pub mod ast;
pub mod checker;
pub mod diag;
pub mod intern;
pub mod layout;
pub mod lexer;
pub mod style;
pub mod symbols;
pub mod token;
pub mod types;

pub use analysis::{
    analyze_field_assignment, chain_base_depth, detect_struct_circular_dependency,
    format_dependency_chain,
};
pub use arena::Arena;
pub use ast::{Expr, ExprKind, Module, Stmt, StmtKind};
pub use checker::{is_arithmetic_operator, is_comparison_operator, type_check_module, TypeChecker};
pub use diag::{Category, Diagnostic, Diagnostics};
pub use intern::{Interner, Symbol};
pub use layout::{calculate_struct_layout, get_type_alignment, get_type_size};
pub use lexer::Lexer;
pub use style::Style;
pub use symbols::{SymbolEntry, SymbolKind, SymbolTable};
pub use token::{Payload, Token, TokenKind};
pub use types::{
    ast_struct_get_field, ast_struct_get_field_index, ast_type_equals, ast_type_is_struct,
    can_escape_private, is_c_compatible_type, is_numeric_type, is_primitive_type,
    is_printable_type, is_reference_type, is_variadic_compatible_type, MemQual, Primitive, Type,
};
