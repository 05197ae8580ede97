//! Shared helpers for the integration suites: a bundled checker context
//! and shorthand constructors for the AST shapes the tests build over and
//! over.
#![allow(dead_code)]

use arden::ast::{
    Expr, FnModifier, FunctionDecl, Module, Parameter, Stmt, StructDecl,
};
use arden::diag::Diagnostics;
use arden::intern::{Interner, Symbol};
use arden::symbols::SymbolTable;
use arden::types::{StructField, Type};
use arden::checker::type_check_module;

pub struct Ctx {
    pub interner: Interner,
    pub table: SymbolTable,
    pub diags: Diagnostics,
}

impl Ctx {
    pub fn new() -> Self {
        Ctx {
            interner: Interner::new(),
            table: SymbolTable::new(),
            diags: Diagnostics::new(),
        }
    }

    pub fn sym(&mut self, s: &str) -> Symbol {
        self.interner.intern(s)
    }

    /// Run the checker; true means no errors.
    pub fn check(&mut self, module: &mut Module) -> bool {
        type_check_module(module, &mut self.table, &mut self.interner, &mut self.diags)
    }

    pub fn messages(&self) -> Vec<String> {
        self.diags.iter().map(|d| d.message.clone()).collect()
    }

    pub fn has_message_containing(&self, needle: &str) -> bool {
        self.diags.iter().any(|d| d.message.contains(needle))
    }
}

pub fn module() -> Module {
    Module::new("test.arn")
}

pub fn func(ctx: &mut Ctx, name: &str, return_type: Type, body: Vec<Stmt>) -> Stmt {
    Stmt::function(
        FunctionDecl {
            name: ctx.sym(name),
            params: Vec::new(),
            return_type,
            body,
            is_native: false,
            is_variadic: false,
            modifier: FnModifier::None,
        },
        1,
    )
}

pub fn native_func(ctx: &mut Ctx, name: &str, return_type: Type, body: Vec<Stmt>) -> Stmt {
    Stmt::function(
        FunctionDecl {
            name: ctx.sym(name),
            params: Vec::new(),
            return_type,
            body,
            is_native: true,
            is_variadic: false,
            modifier: FnModifier::None,
        },
        1,
    )
}

pub fn func_with_params(
    ctx: &mut Ctx,
    name: &str,
    params: Vec<(&str, Type)>,
    return_type: Type,
    body: Vec<Stmt>,
    is_native: bool,
) -> Stmt {
    let params = params
        .into_iter()
        .map(|(pname, ty)| Parameter::new(ctx.sym(pname), ty))
        .collect();
    Stmt::function(
        FunctionDecl {
            name: ctx.sym(name),
            params,
            return_type,
            body,
            is_native,
            is_variadic: false,
            modifier: FnModifier::None,
        },
        1,
    )
}

pub fn struct_decl(ctx: &mut Ctx, name: &str, fields: Vec<(&str, Type)>) -> Stmt {
    let fields = fields
        .into_iter()
        .map(|(fname, ty)| StructField::new(ctx.sym(fname), ty))
        .collect();
    Stmt::struct_decl(
        StructDecl {
            name: ctx.sym(name),
            fields,
            is_native: false,
            is_packed: false,
            pack_value: 0,
        },
        1,
    )
}

pub fn native_struct_decl(
    ctx: &mut Ctx,
    name: &str,
    fields: Vec<(&str, Type)>,
    is_packed: bool,
) -> Stmt {
    let fields = fields
        .into_iter()
        .map(|(fname, ty)| StructField::new(ctx.sym(fname), ty))
        .collect();
    Stmt::struct_decl(
        StructDecl {
            name: ctx.sym(name),
            fields,
            is_native: true,
            is_packed,
            pack_value: 0,
        },
        1,
    )
}

pub fn var(ctx: &mut Ctx, name: &str) -> Expr {
    Expr::variable(ctx.sym(name), 1)
}

pub fn var_decl(ctx: &mut Ctx, name: &str, ty: Type, init: Expr) -> Stmt {
    Stmt::var_decl(ctx.sym(name), Some(ty), Some(init), 1)
}

pub fn var_decl_inferred(ctx: &mut Ctx, name: &str, init: Expr) -> Stmt {
    Stmt::var_decl(ctx.sym(name), None, Some(init), 1)
}

/// Registered struct type from the checker's registry, laid out.
pub fn registered(ctx: &Ctx, name: &str) -> Type {
    let sym = ctx
        .interner
        .lookup(name)
        .expect("type name was never interned");
    ctx.table
        .lookup_type(sym)
        .cloned()
        .expect("type was never registered")
}
