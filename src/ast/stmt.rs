use crate::intern::Symbol;
use crate::token::TokenKind;
use crate::types::{MemQual, StructField, Type};

use super::expr::Expr;

/// Function parameter. `mem_qual` carries `as val` / `as ref` from the
/// declaration site.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Symbol,
    pub ty: Option<Type>,
    pub mem_qual: MemQual,
}

impl Parameter {
    pub fn new(name: Symbol, ty: Type) -> Self {
        Parameter {
            name,
            ty: Some(ty),
            mem_qual: MemQual::Default,
        }
    }

    pub fn with_qual(name: Symbol, ty: Type, mem_qual: MemQual) -> Self {
        Parameter {
            name,
            ty: Some(ty),
            mem_qual,
        }
    }
}

/// `shared` / `private` function modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FnModifier {
    #[default]
    None,
    Shared,
    Private,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Symbol,
    pub params: Vec<Parameter>,
    pub return_type: Type,
    pub body: Vec<Stmt>,
    pub is_native: bool,
    pub is_variadic: bool,
    pub modifier: FnModifier,
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Symbol,
    pub fields: Vec<StructField>,
    pub is_native: bool,
    pub is_packed: bool,
    /// `#pragma pack(N)` cap in effect at the declaration; 0 = natural.
    pub pack_value: u8,
}

/// What a `for` loop walks: an array expression or an integer range.
#[derive(Debug, Clone)]
pub enum ForIterable {
    Array(Expr),
    Range { start: Expr, end: Expr },
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    VarDecl {
        name: Symbol,
        declared_type: Option<Type>,
        init: Option<Expr>,
        mem_qual: MemQual,
    },
    ExprStmt {
        expr: Expr,
    },
    Return {
        value: Option<Expr>,
    },
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    For {
        var: Symbol,
        iterable: ForIterable,
        body: Vec<Stmt>,
    },
    Break,
    Continue,
    Block {
        body: Vec<Stmt>,
    },
    Function(FunctionDecl),
    StructDecl(StructDecl),
    TypeDecl {
        name: Symbol,
        ty: Type,
        is_native: bool,
    },
    Import {
        path: Symbol,
    },
    Pragma {
        kind: TokenKind,
        argument: Option<Symbol>,
        pack_value: Option<u8>,
    },
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: u32,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: u32) -> Self {
        Stmt { kind, line }
    }

    pub fn var_decl(name: Symbol, declared_type: Option<Type>, init: Option<Expr>, line: u32) -> Self {
        Stmt::new(
            StmtKind::VarDecl {
                name,
                declared_type,
                init,
                mem_qual: MemQual::Default,
            },
            line,
        )
    }

    pub fn expr(expr: Expr, line: u32) -> Self {
        Stmt::new(StmtKind::ExprStmt { expr }, line)
    }

    pub fn ret(value: Option<Expr>, line: u32) -> Self {
        Stmt::new(StmtKind::Return { value }, line)
    }

    pub fn block(body: Vec<Stmt>, line: u32) -> Self {
        Stmt::new(StmtKind::Block { body }, line)
    }

    pub fn function(decl: FunctionDecl, line: u32) -> Self {
        Stmt::new(StmtKind::Function(decl), line)
    }

    pub fn struct_decl(decl: StructDecl, line: u32) -> Self {
        Stmt::new(StmtKind::StructDecl(decl), line)
    }
}

/// A parsed compilation unit: the statement list for one source file.
#[derive(Debug, Clone)]
pub struct Module {
    pub filename: String,
    pub stmts: Vec<Stmt>,
}

impl Module {
    pub fn new(filename: impl Into<String>) -> Self {
        Module {
            filename: filename.into(),
            stmts: Vec::new(),
        }
    }

    pub fn add(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }
}
