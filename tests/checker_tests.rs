//! Core statement and expression rules: declarations, promotion,
//! assignments, arrays, builtins, memory qualifiers, and the
//! shared/private return discipline.

mod common;

use arden::ast::{Expr, FnModifier, FunctionDecl, Parameter, Stmt, StmtKind};
use arden::token::TokenKind;
use arden::types::{MemQual, Type};
use common::*;

fn set_var_qual(stmt: &mut Stmt, qual: MemQual) {
    if let StmtKind::VarDecl { mem_qual, .. } = &mut stmt.kind {
        *mem_qual = qual;
    }
}

/// Type of the expression inside `fn <at>.body[index]`, after checking.
fn expr_type_in(m: &arden::Module, fn_index: usize, body_index: usize) -> Type {
    let StmtKind::Function(decl) = &m.stmts[fn_index].kind else {
        panic!("expected function");
    };
    match &decl.body[body_index].kind {
        StmtKind::ExprStmt { expr } => expr.ty().clone(),
        StmtKind::VarDecl {
            init: Some(init), ..
        } => init.ty().clone(),
        other => panic!("unexpected stmt {other:?}"),
    }
}

// ---- declarations and lookup ----

#[test]
fn var_decl_with_matching_init() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let x = ctx.sym("x");
    let f = func(
        &mut ctx,
        "f",
        Type::VOID,
        vec![Stmt::var_decl(x, Some(Type::INT), Some(Expr::int(42, 1)), 1)],
    );
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn var_decl_type_mismatch() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let init = Expr::string(ctx.sym("nope"), 1);
    let x = ctx.sym("x");
    let f = func(
        &mut ctx,
        "f",
        Type::VOID,
        vec![Stmt::var_decl(x, Some(Type::INT), Some(init), 1)],
    );
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Type mismatch: expected int, got str"));
}

#[test]
fn undefined_variable_is_reported() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let use_missing = Stmt::expr(var(&mut ctx, "ghost"), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![use_missing]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Undefined variable 'ghost'"));
}

#[test]
fn duplicate_declaration_in_same_scope() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let a = Stmt::var_decl(ctx.sym("x"), Some(Type::INT), Some(Expr::int(1, 1)), 1);
    let b = Stmt::var_decl(ctx.sym("x"), Some(Type::INT), Some(Expr::int(2, 1)), 2);
    let f = func(&mut ctx, "f", Type::VOID, vec![a, b]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("already declared"));
}

#[test]
fn shadowing_in_inner_block_is_fine() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let outer = Stmt::var_decl(ctx.sym("x"), Some(Type::INT), Some(Expr::int(1, 1)), 1);
    let inner = Stmt::var_decl(ctx.sym("x"), Some(Type::STR), None, 2);
    let block = Stmt::block(vec![inner], 2);
    let f = func(&mut ctx, "f", Type::VOID, vec![outer, block]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

// ---- numeric promotion ----

#[test]
fn int_plus_double_promotes_to_double() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let sum = Expr::binary(TokenKind::Plus, Expr::int(1, 1), Expr::double(2.5, 1), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(sum, 1)]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
    assert!(arden::ast_type_equals(&expr_type_in(&m, 0, 0), &Type::DOUBLE));
}

#[test]
fn int_plus_int_stays_int() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let sum = Expr::binary(TokenKind::Plus, Expr::int(1, 1), Expr::int(2, 1), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(sum, 1)]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
    assert!(arden::ast_type_equals(&expr_type_in(&m, 0, 0), &Type::INT));
}

#[test]
fn float_plus_double_promotes_to_double() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let lhs = Expr::literal(arden::ast::LiteralValue::Double(1.5), Type::FLOAT, 1);
    let sum = Expr::binary(TokenKind::Plus, lhs, Expr::double(2.5, 1), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(sum, 1)]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
    assert!(arden::ast_type_equals(&expr_type_in(&m, 0, 0), &Type::DOUBLE));
}

#[test]
fn int32_plus_int32_stays_int32() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let a = Expr::literal(arden::ast::LiteralValue::Int(1), Type::INT32, 1);
    let b = Expr::literal(arden::ast::LiteralValue::Int(2), Type::INT32, 1);
    let sum = Expr::binary(TokenKind::Plus, a, b, 1);
    let f = native_func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(sum, 1)]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
    assert!(arden::ast_type_equals(&expr_type_in(&m, 0, 0), &Type::INT32));
}

#[test]
fn int32_plus_uint_is_incompatible() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let a = Expr::literal(arden::ast::LiteralValue::Int(1), Type::INT32, 1);
    let b = Expr::literal(arden::ast::LiteralValue::Int(2), Type::UINT, 1);
    let sum = Expr::binary(TokenKind::Plus, a, b, 1);
    let f = native_func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(sum, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Incompatible numeric types"));
}

#[test]
fn comparison_of_int_and_double_yields_bool() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let cmp = Expr::binary(TokenKind::Less, Expr::int(1, 1), Expr::double(2.0, 1), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(cmp, 1)]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
    assert!(arden::ast_type_equals(&expr_type_in(&m, 0, 0), &Type::BOOL));
}

#[test]
fn string_plus_int_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let sum = Expr::binary(
        TokenKind::Plus,
        Expr::string(ctx.sym("a"), 1),
        Expr::int(1, 1),
        1,
    );
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(sum, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Operands must be numeric"));
}

#[test]
fn logical_ops_require_booleans() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let and = Expr::binary(
        TokenKind::And,
        Expr::boolean(true, 1),
        Expr::int(1, 1),
        1,
    );
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(and, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Operands must be booleans"));
}

// ---- arrays ----

#[test]
fn array_decl_with_matching_literal() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let lit = Expr::array_literal(vec![Expr::int(1, 1), Expr::int(2, 1)], 1);
    let decl = Stmt::var_decl(ctx.sym("xs"), Some(Type::array_of(Type::INT)), Some(lit), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![decl]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn empty_array_literal_fits_any_array_type() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let lit = Expr::array_literal(vec![], 1);
    let decl = Stmt::var_decl(ctx.sym("xs"), Some(Type::array_of(Type::STR)), Some(lit), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![decl]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn heterogeneous_array_literal_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let lit = Expr::array_literal(
        vec![Expr::int(1, 1), Expr::string(ctx.sym("two"), 1)],
        1,
    );
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(lit, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("same type"));
}

#[test]
fn array_element_type_mismatch_on_decl() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let lit = Expr::array_literal(vec![Expr::double(1.0, 1)], 1);
    let decl = Stmt::var_decl(ctx.sym("xs"), Some(Type::array_of(Type::INT)), Some(lit), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![decl]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Type mismatch"));
}

#[test]
fn array_access_yields_element_type() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let arr = Stmt::var_decl(
        ctx.sym("xs"),
        Some(Type::array_of(Type::DOUBLE)),
        Some(Expr::array_literal(vec![Expr::double(1.0, 1)], 1)),
        1,
    );
    let access = Expr::array_access(var(&mut ctx, "xs"), Expr::int(0, 1), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![arr, Stmt::expr(access, 1)]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
    assert!(arden::ast_type_equals(&expr_type_in(&m, 0, 1), &Type::DOUBLE));
}

#[test]
fn indexing_a_non_array_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let n = Stmt::var_decl(ctx.sym("n"), Some(Type::INT), Some(Expr::int(3, 1)), 1);
    let access = Expr::array_access(var(&mut ctx, "n"), Expr::int(0, 1), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![n, Stmt::expr(access, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Cannot index non-array type"));
}

#[test]
fn non_integer_index_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let arr = Stmt::var_decl(
        ctx.sym("xs"),
        Some(Type::array_of(Type::INT)),
        Some(Expr::array_literal(vec![Expr::int(1, 1)], 1)),
        1,
    );
    let access = Expr::array_access(var(&mut ctx, "xs"), Expr::string(ctx.sym("0"), 1), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![arr, Stmt::expr(access, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Array index must be an integer"));
}

#[test]
fn sized_array_alloc_with_int_size() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let alloc = Expr::sized_array_alloc(Type::INT, Expr::int(16, 1), None, 1);
    let decl = Stmt::var_decl(ctx.sym("xs"), Some(Type::array_of(Type::INT)), Some(alloc), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![decl]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn sized_array_alloc_with_default_value() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let alloc = Expr::sized_array_alloc(Type::INT, Expr::int(8, 1), Some(Expr::int(0, 1)), 1);
    let decl = Stmt::var_decl(ctx.sym("xs"), Some(Type::array_of(Type::INT)), Some(alloc), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![decl]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn sized_array_alloc_mismatched_default_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let bad_default = Expr::string(ctx.sym("zero"), 1);
    let alloc = Expr::sized_array_alloc(Type::INT, Expr::int(8, 1), Some(bad_default), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(alloc, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Type mismatch"));
}

#[test]
fn sized_array_alloc_rejects_non_integer_size() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let alloc = Expr::sized_array_alloc(Type::INT, Expr::double(3.5, 1), None, 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(alloc, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Array size must be an integer"));
}

#[test]
fn sized_array_alloc_accepts_long_size() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let size = Expr::literal(arden::ast::LiteralValue::Int(64), Type::LONG, 1);
    let alloc = Expr::sized_array_alloc(Type::BYTE, size, None, 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(alloc, 1)]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

// ---- array and string builtins ----

#[test]
fn array_length_is_int() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let arr = Stmt::var_decl(
        ctx.sym("xs"),
        Some(Type::array_of(Type::INT)),
        Some(Expr::array_literal(vec![Expr::int(1, 1)], 1)),
        1,
    );
    let len = Expr::member_access(var(&mut ctx, "xs"), ctx.sym("length"), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![arr, Stmt::expr(len, 1)]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
    assert!(arden::ast_type_equals(&expr_type_in(&m, 0, 1), &Type::INT));
}

#[test]
fn array_push_pop_clear_concat() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let arr = Stmt::var_decl(
        ctx.sym("xs"),
        Some(Type::array_of(Type::INT)),
        Some(Expr::array_literal(vec![Expr::int(1, 1)], 1)),
        1,
    );
    let push = Expr::call(
        Expr::member_access(var(&mut ctx, "xs"), ctx.sym("push"), 1),
        vec![Expr::int(2, 1)],
        1,
    );
    let pop = Expr::call(
        Expr::member_access(var(&mut ctx, "xs"), ctx.sym("pop"), 1),
        vec![],
        1,
    );
    let clear = Expr::call(
        Expr::member_access(var(&mut ctx, "xs"), ctx.sym("clear"), 1),
        vec![],
        1,
    );
    let concat = Expr::call(
        Expr::member_access(var(&mut ctx, "xs"), ctx.sym("concat"), 1),
        vec![Expr::array_literal(vec![Expr::int(3, 1)], 1)],
        1,
    );
    let f = func(
        &mut ctx,
        "f",
        Type::VOID,
        vec![
            arr,
            Stmt::expr(push, 1),
            Stmt::expr(pop, 1),
            Stmt::expr(clear, 1),
            Stmt::expr(concat, 1),
        ],
    );
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
    // pop() gives back the element type; concat gives back the array.
    assert!(arden::ast_type_equals(&expr_type_in(&m, 0, 2), &Type::INT));
    assert!(arden::ast_type_equals(
        &expr_type_in(&m, 0, 4),
        &Type::array_of(Type::INT)
    ));
}

#[test]
fn unknown_array_member_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let arr = Stmt::var_decl(
        ctx.sym("xs"),
        Some(Type::array_of(Type::INT)),
        Some(Expr::array_literal(vec![Expr::int(1, 1)], 1)),
        1,
    );
    let bad = Expr::member_access(var(&mut ctx, "xs"), ctx.sym("reverse"), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![arr, Stmt::expr(bad, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Unknown array member 'reverse'"));
}

#[test]
fn string_append_builtin() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let s = Stmt::var_decl(
        ctx.sym("s"),
        Some(Type::STR),
        Some(Expr::string(ctx.sym("a"), 1)),
        1,
    );
    let appended = Expr::call(
        Expr::member_access(var(&mut ctx, "s"), ctx.sym("append"), 1),
        vec![Expr::string(ctx.sym("b"), 1)],
        1,
    );
    let f = func(&mut ctx, "f", Type::VOID, vec![s, Stmt::expr(appended, 1)]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
    assert!(arden::ast_type_equals(&expr_type_in(&m, 0, 1), &Type::STR));
}

// ---- functions and calls ----

#[test]
fn call_with_wrong_arity() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let callee = func_with_params(
        &mut ctx,
        "add",
        vec![("a", Type::INT), ("b", Type::INT)],
        Type::INT,
        vec![Stmt::ret(Some(Expr::int(0, 1)), 1)],
        false,
    );
    m.add(callee);
    let bad = Expr::call(var(&mut ctx, "add"), vec![Expr::int(1, 1)], 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(bad, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Function 'add' expects 2 arguments, got 1"));
}

#[test]
fn call_argument_type_mismatch() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let callee = func_with_params(
        &mut ctx,
        "speak",
        vec![("msg", Type::STR)],
        Type::VOID,
        vec![],
        false,
    );
    m.add(callee);
    let bad = Expr::call(var(&mut ctx, "speak"), vec![Expr::int(1, 1)], 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(bad, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Type mismatch: expected str, got int"));
}

#[test]
fn calling_a_non_function_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let n = Stmt::var_decl(ctx.sym("n"), Some(Type::INT), Some(Expr::int(1, 1)), 1);
    let bad = Expr::call(var(&mut ctx, "n"), vec![], 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![n, Stmt::expr(bad, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Cannot call non-function type int"));
}

#[test]
fn recursive_function_resolves_itself() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let recur = Expr::call(var(&mut ctx, "count"), vec![Expr::int(1, 1)], 1);
    let decl = func_with_params(
        &mut ctx,
        "count",
        vec![("n", Type::INT)],
        Type::INT,
        vec![Stmt::ret(Some(recur), 1)],
        false,
    );
    m.add(decl);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn return_type_mismatch() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let no = ctx.sym("no");
    let f = func(
        &mut ctx,
        "f",
        Type::INT,
        vec![Stmt::ret(Some(Expr::string(no, 1)), 1)],
    );
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Type mismatch: expected int, got str"));
}

#[test]
fn bare_return_from_non_void_function() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let f = func(&mut ctx, "f", Type::INT, vec![Stmt::ret(None, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Return value of type int required"));
}

#[test]
fn function_returning_array_checks() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let lit = Expr::array_literal(vec![Expr::int(1, 1)], 1);
    let f = func(
        &mut ctx,
        "make",
        Type::array_of(Type::INT),
        vec![Stmt::ret(Some(lit), 1)],
    );
    m.add(f);
    let make_var = var(&mut ctx, "make");
    let use_it = var_decl(
        &mut ctx,
        "xs",
        Type::array_of(Type::INT),
        Expr::call(make_var, vec![], 1),
    );
    let g = func(&mut ctx, "g", Type::VOID, vec![use_it]);
    m.add(g);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

// ---- shared / private ----

#[test]
fn private_function_may_return_primitives() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let decl = FunctionDecl {
        name: ctx.sym("compute"),
        params: vec![],
        return_type: Type::INT,
        body: vec![Stmt::ret(Some(Expr::int(42, 1)), 1)],
        is_native: false,
        is_variadic: false,
        modifier: FnModifier::Private,
    };
    m.add(Stmt::function(decl, 1));
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn private_function_returning_array_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let decl = FunctionDecl {
        name: ctx.sym("compute"),
        params: vec![],
        return_type: Type::array_of(Type::INT),
        body: vec![Stmt::ret(Some(Expr::array_literal(vec![], 1)), 1)],
        is_native: false,
        is_variadic: false,
        modifier: FnModifier::Private,
    };
    m.add(Stmt::function(decl, 1));
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Private functions cannot return reference types"));
}

#[test]
fn private_function_returning_str_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let decl = FunctionDecl {
        name: ctx.sym("compute"),
        params: vec![],
        return_type: Type::STR,
        body: vec![Stmt::ret(Some(Expr::string(ctx.sym("x"), 1)), 1)],
        is_native: false,
        is_variadic: false,
        modifier: FnModifier::Private,
    };
    m.add(Stmt::function(decl, 1));
    assert!(!ctx.check(&mut m));
}

#[test]
fn shared_function_may_return_reference_types() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let decl = FunctionDecl {
        name: ctx.sym("helper"),
        params: vec![],
        return_type: Type::array_of(Type::INT),
        body: vec![Stmt::ret(Some(Expr::array_literal(vec![], 1)), 1)],
        is_native: false,
        is_variadic: false,
        modifier: FnModifier::Shared,
    };
    m.add(Stmt::function(decl, 1));
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

// ---- memory qualifiers ----

#[test]
fn as_ref_variable_on_primitive_is_fine() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let mut decl = Stmt::var_decl(ctx.sym("x"), Some(Type::INT), Some(Expr::int(42, 1)), 1);
    set_var_qual(&mut decl, MemQual::AsRef);
    let f = func(&mut ctx, "f", Type::VOID, vec![decl]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn as_ref_variable_on_array_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let mut decl = Stmt::var_decl(
        ctx.sym("xs"),
        Some(Type::array_of(Type::INT)),
        Some(Expr::array_literal(vec![], 1)),
        1,
    );
    set_var_qual(&mut decl, MemQual::AsRef);
    let f = func(&mut ctx, "f", Type::VOID, vec![decl]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("'as ref' is only valid on primitive types"));
}

#[test]
fn as_val_variable_on_array_is_fine() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let mut decl = Stmt::var_decl(
        ctx.sym("xs"),
        Some(Type::array_of(Type::INT)),
        Some(Expr::array_literal(vec![Expr::int(1, 1)], 1)),
        1,
    );
    set_var_qual(&mut decl, MemQual::AsVal);
    let f = func(&mut ctx, "f", Type::VOID, vec![decl]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn as_ref_parameter_on_primitive_is_fine() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let param = Parameter::with_qual(ctx.sym("counter"), Type::INT, MemQual::AsRef);
    let decl = FunctionDecl {
        name: ctx.sym("increment"),
        params: vec![param],
        return_type: Type::VOID,
        body: vec![],
        is_native: false,
        is_variadic: false,
        modifier: FnModifier::None,
    };
    m.add(Stmt::function(decl, 1));
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn as_ref_parameter_on_array_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let param = Parameter::with_qual(
        ctx.sym("xs"),
        Type::array_of(Type::INT),
        MemQual::AsRef,
    );
    let decl = FunctionDecl {
        name: ctx.sym("process"),
        params: vec![param],
        return_type: Type::VOID,
        body: vec![],
        is_native: false,
        is_variadic: false,
        modifier: FnModifier::None,
    };
    m.add(Stmt::function(decl, 1));
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("'as ref' is only valid on primitive types"));
}

#[test]
fn as_val_parameter_on_array_is_fine() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let param = Parameter::with_qual(
        ctx.sym("xs"),
        Type::array_of(Type::INT),
        MemQual::AsVal,
    );
    let decl = FunctionDecl {
        name: ctx.sym("process"),
        params: vec![param],
        return_type: Type::VOID,
        body: vec![],
        is_native: false,
        is_variadic: false,
        modifier: FnModifier::None,
    };
    m.add(Stmt::function(decl, 1));
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn as_ref_expression_on_array_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let arr = Stmt::var_decl(
        ctx.sym("xs"),
        Some(Type::array_of(Type::INT)),
        Some(Expr::array_literal(vec![], 1)),
        1,
    );
    let bad = Expr::as_ref(var(&mut ctx, "xs"), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![arr, Stmt::expr(bad, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("'as ref' is only valid on primitive types"));
}

// ---- control flow ----

#[test]
fn if_condition_must_be_boolean() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let stmt = Stmt::new(
        StmtKind::If {
            cond: Expr::int(1, 1),
            then_branch: vec![],
            else_branch: None,
        },
        1,
    );
    let f = func(&mut ctx, "f", Type::VOID, vec![stmt]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Condition must be a boolean"));
}

#[test]
fn while_loop_with_break_and_continue() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let body = vec![
        Stmt::new(StmtKind::Continue, 2),
        Stmt::new(StmtKind::Break, 3),
    ];
    let stmt = Stmt::new(
        StmtKind::While {
            cond: Expr::boolean(true, 1),
            body,
        },
        1,
    );
    let f = func(&mut ctx, "f", Type::VOID, vec![stmt]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn break_outside_a_loop_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::new(StmtKind::Break, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("'break' outside of a loop"));
}

#[test]
fn for_over_array_binds_element_type() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let arr = Stmt::var_decl(
        ctx.sym("xs"),
        Some(Type::array_of(Type::DOUBLE)),
        Some(Expr::array_literal(vec![Expr::double(1.0, 1)], 1)),
        1,
    );
    // for x in xs: x + 1.0
    let use_x = Expr::binary(
        TokenKind::Plus,
        var(&mut ctx, "x"),
        Expr::double(1.0, 1),
        1,
    );
    let stmt = Stmt::new(
        StmtKind::For {
            var: ctx.sym("x"),
            iterable: arden::ast::ForIterable::Array(var(&mut ctx, "xs")),
            body: vec![Stmt::expr(use_x, 2)],
        },
        1,
    );
    let f = func(&mut ctx, "f", Type::VOID, vec![arr, stmt]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn for_over_range_requires_integer_bounds() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let stmt = Stmt::new(
        StmtKind::For {
            var: ctx.sym("i"),
            iterable: arden::ast::ForIterable::Range {
                start: Expr::int(0, 1),
                end: Expr::double(9.5, 1),
            },
            body: vec![],
        },
        1,
    );
    let f = func(&mut ctx, "f", Type::VOID, vec![stmt]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Range bounds must be integers"));
}

// ---- interpolation ----

#[test]
fn interpolated_string_with_printable_parts() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let n = Stmt::var_decl(ctx.sym("n"), Some(Type::INT), Some(Expr::int(3, 1)), 1);
    let text = ctx.sym("count: ");
    let interp = Expr::interpolated(
        vec![
            arden::ast::InterpolPart::Text(text),
            arden::ast::InterpolPart::Expr(var(&mut ctx, "n")),
        ],
        1,
    );
    let f = func(&mut ctx, "f", Type::VOID, vec![n, Stmt::expr(interp, 1)]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
    assert!(arden::ast_type_equals(&expr_type_in(&m, 0, 1), &Type::STR));
}

#[test]
fn interpolating_a_function_value_is_an_error() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let callee = func(&mut ctx, "helper", Type::VOID, vec![]);
    m.add(callee);
    let interp = Expr::interpolated(
        vec![arden::ast::InterpolPart::Expr(var(&mut ctx, "helper"))],
        1,
    );
    let f = func(&mut ctx, "f", Type::VOID, vec![Stmt::expr(interp, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("is not printable"));
}

// ---- assignment ----

#[test]
fn assignment_requires_compatible_types() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let decl = Stmt::var_decl(ctx.sym("x"), Some(Type::INT), Some(Expr::int(0, 1)), 1);
    let bad = Expr::assign(ctx.sym("x"), Expr::string(ctx.sym("no"), 1), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![decl, Stmt::expr(bad, 1)]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Type mismatch: expected int, got str"));
}

#[test]
fn widening_assignment_is_allowed() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let decl = Stmt::var_decl(ctx.sym("x"), Some(Type::DOUBLE), Some(Expr::int(1, 1)), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![decl]);
    m.add(f);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
}

#[test]
fn narrowing_assignment_is_rejected() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let decl = Stmt::var_decl(ctx.sym("x"), Some(Type::INT), Some(Expr::double(1.5, 1)), 1);
    let f = func(&mut ctx, "f", Type::VOID, vec![decl]);
    m.add(f);
    assert!(!ctx.check(&mut m));
    assert!(ctx.has_message_containing("Type mismatch"));
}
