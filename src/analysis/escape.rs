//! Escape analysis for field assignments.
//!
//! On `obj.field = rhs`, a right-hand side declared in a deeper scope
//! than the assignment target's base variable outlives its block through
//! the assignment. The analyzer marks the RHS variable as escaping and
//! flags every member-access node on the LHS chain; the code generator
//! heap-promotes flagged values.
//!
//! Depths compare the *base* variable of the LHS chain (`a` in
//! `a.b.c = x`), never an intermediate node. Same-scope assignments and
//! literal right-hand sides never escape.

use crate::ast::{Expr, ExprKind, MemberInfo};

/// Scope depth of the root variable of a member-access chain, if the
/// chain bottoms out in a checked variable reference.
pub fn chain_base_depth(expr: &Expr) -> Option<i32> {
    match &expr.kind {
        ExprKind::Variable {
            decl_scope_depth, ..
        } => {
            if *decl_scope_depth >= 0 {
                Some(*decl_scope_depth)
            } else {
                None
            }
        }
        ExprKind::MemberAccess { object, .. } => chain_base_depth(object),
        _ => None,
    }
}

fn mark_chain_escaped(expr: &mut Expr) {
    if let ExprKind::MemberAccess { object, info, .. } = &mut expr.kind {
        info.escaped = true;
        mark_chain_escaped(object);
    }
}

/// Run the analysis on one field assignment, already type-checked. The
/// caller passes the assignment's pieces so the AST stays borrow-friendly.
pub fn analyze_field_assignment(object: &mut Expr, info: &mut MemberInfo, value: &mut Expr) {
    let Some(base_depth) = chain_base_depth(object) else {
        return;
    };
    let rhs_depth = match &value.kind {
        ExprKind::Variable {
            decl_scope_depth, ..
        } if *decl_scope_depth >= 0 => *decl_scope_depth,
        _ => return,
    };
    if rhs_depth > base_depth {
        value.escape_info.escapes_scope = true;
        info.escaped = true;
        mark_chain_escaped(object);
    }
}
