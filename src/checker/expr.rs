//! Expression checking.

use crate::ast::{Expr, ExprKind, InterpolPart, LambdaBody};
use crate::symbols::{SymbolEntry, SymbolKind};
use crate::token::TokenKind;
use crate::types::{is_numeric_type, is_printable_type, FunctionType, Primitive, Type};

use super::{is_arithmetic_operator, is_comparison_operator, TypeChecker};

fn is_integer_type(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Primitive(
            Primitive::Byte
                | Primitive::Int
                | Primitive::Int32
                | Primitive::Uint
                | Primitive::Uint32
                | Primitive::Long
        )
    )
}

impl TypeChecker<'_> {
    /// Check one expression, writing `expr_type` and annotations in
    /// place. `None` means a diagnostic was already emitted; callers keep
    /// walking so later errors still surface.
    pub fn check_expr(&mut self, expr: &mut Expr) -> Option<Type> {
        let line = expr.line;
        let ty = match &mut expr.kind {
            ExprKind::Literal { ty, .. } => Some(ty.clone()),

            ExprKind::Variable {
                name,
                decl_scope_depth,
            } => {
                let name = *name;
                match self.table.lookup(name) {
                    Some(entry) => {
                        let entry_depth = entry.scope_depth;
                        let entry_kind = entry.kind;
                        let entry_ty = entry.ty.clone();
                        *decl_scope_depth = entry_depth;
                        if let Some(boundary) = self.native_lambda_boundary {
                            if entry_kind != SymbolKind::Function && entry_depth < boundary {
                                self.error(
                                    line,
                                    "Lambdas in native context cannot capture variables",
                                );
                                return None;
                            }
                        }
                        Some(entry_ty)
                    }
                    None => {
                        let text = self.name(name);
                        self.error(line, format!("Undefined variable '{text}'"));
                        None
                    }
                }
            }

            ExprKind::Binary { op, left, right } => {
                let op = *op;
                let lt = self.check_expr(left);
                let rt = self.check_expr(right);
                match (lt, rt) {
                    (Some(lt), Some(rt)) => self.check_binary(op, &lt, &rt, line),
                    _ => None,
                }
            }

            ExprKind::Unary { op, operand } => {
                let op = *op;
                let operand_ty = self.check_expr(operand)?;
                match op {
                    TokenKind::Bang => {
                        if operand_ty.is_bool() {
                            Some(Type::BOOL)
                        } else {
                            self.error(line, "Operand of '!' must be a boolean");
                            None
                        }
                    }
                    TokenKind::Minus
                    | TokenKind::PlusPlus
                    | TokenKind::MinusMinus => {
                        if is_numeric_type(&operand_ty) {
                            Some(operand_ty)
                        } else {
                            self.error(line, "Operands must be numeric");
                            None
                        }
                    }
                    _ => Some(operand_ty),
                }
            }

            ExprKind::Assign { name, value } => {
                let name = *name;
                let target_ty = match self.table.lookup(name) {
                    Some(entry) => Some(entry.ty.clone()),
                    None => {
                        let text = self.name(name);
                        self.error(line, format!("Undefined variable '{text}'"));
                        None
                    }
                };
                let value_ty = self.check_expr(value);
                let target_ty = target_ty?;
                if let Some(value_ty) = value_ty {
                    if !self.types_compatible(&target_ty, &value_ty) {
                        self.mismatch(line, &target_ty, &value_ty);
                    }
                }
                Some(target_ty)
            }

            ExprKind::MemberAccess {
                object,
                member,
                info,
            } => {
                let member = *member;
                self.check_member_access(object, member, info, line)
            }

            ExprKind::MemberAssign {
                object,
                member,
                value,
                info,
            } => {
                let member = *member;
                self.check_member_assign(object, member, value, info, line)
            }

            ExprKind::Call { callee, args } => self.check_call(callee, args, line),

            ExprKind::ArrayLiteral { elements } => {
                if elements.is_empty() {
                    // Element type is decided by the assignment target.
                    Some(Type::array_of(Type::ANY))
                } else {
                    let mut element_ty: Option<Type> = None;
                    let mut ok = true;
                    for element in elements.iter_mut() {
                        let Some(ty) = self.check_expr(element) else {
                            ok = false;
                            continue;
                        };
                        match &element_ty {
                            None => element_ty = Some(ty),
                            Some(first) => {
                                if !crate::types::ast_type_equals(first, &ty) {
                                    self.error(
                                        line,
                                        "Array literal elements must have the same type",
                                    );
                                    ok = false;
                                    break;
                                }
                            }
                        }
                    }
                    if ok {
                        element_ty.map(Type::array_of)
                    } else {
                        None
                    }
                }
            }

            ExprKind::ArrayAccess { array, index } => {
                let array_ty = self.check_expr(array);
                let index_ty = self.check_expr(index);
                if let Some(index_ty) = &index_ty {
                    if !is_integer_type(index_ty) {
                        self.error(line, "Array index must be an integer");
                    }
                }
                match array_ty {
                    Some(Type::Array(elem)) => Some(self.resolve_type_quiet(&elem)),
                    Some(other) => {
                        let text = other.describe(self.interner);
                        self.error(line, format!("Cannot index non-array type {text}"));
                        None
                    }
                    None => None,
                }
            }

            ExprKind::ArraySlice {
                array,
                start,
                end,
                step,
                is_from_pointer,
            } => {
                let array_ty = self.check_expr(array);
                let has_step = step.is_some();
                for bound in [start, end, step].into_iter().flatten() {
                    if let Some(ty) = self.check_expr(bound) {
                        if !is_integer_type(&ty) {
                            self.error(line, "Slice bounds must be integers");
                        }
                    }
                }
                match array_ty {
                    Some(Type::Array(elem)) => Some(Type::Array(elem)),
                    Some(Type::Pointer(base)) => {
                        if has_step {
                            self.error(line, "Pointer slices do not support a step");
                            None
                        } else if !self.native_context_is_active()
                            && !self.as_val_context_is_active()
                        {
                            self.error(
                                line,
                                "Pointer slices require a native function or 'as val'",
                            );
                            None
                        } else {
                            *is_from_pointer = true;
                            Some(Type::Array(base))
                        }
                    }
                    Some(other) => {
                        let text = other.describe(self.interner);
                        self.error(line, format!("Cannot slice non-array type {text}"));
                        None
                    }
                    None => None,
                }
            }

            ExprKind::SizedArrayAlloc {
                element_type,
                size,
                default,
            } => {
                let element_type = element_type.clone();
                if let Some(size_ty) = self.check_expr(size) {
                    if !matches!(
                        size_ty,
                        Type::Primitive(Primitive::Int | Primitive::Long)
                    ) {
                        self.error(line, "Array size must be an integer");
                    }
                }
                let element_resolved = self.resolve_type_quiet(&element_type);
                if let Some(default) = default {
                    if let Some(default_ty) = self.check_expr(default) {
                        if !self.types_compatible(&element_resolved, &default_ty) {
                            self.mismatch(line, &element_resolved, &default_ty);
                        }
                    }
                }
                Some(Type::array_of(element_resolved))
            }

            ExprKind::StructLiteral {
                name,
                inits,
                fields_initialized,
                total_field_count,
            } => {
                let name = *name;
                self.check_struct_literal(name, inits, fields_initialized, total_field_count, line)
            }

            ExprKind::InterpolatedString { parts } => {
                for part in parts.iter_mut() {
                    if let InterpolPart::Expr(inner) = part {
                        if let Some(ty) = self.check_expr(inner) {
                            if !is_printable_type(&ty) {
                                let text = ty.describe(self.interner);
                                self.diags.type_error(
                                    &self.filename,
                                    inner.line,
                                    format!("Type {text} is not printable"),
                                );
                            }
                        }
                    }
                }
                Some(Type::STR)
            }

            ExprKind::Lambda {
                params,
                return_type,
                body,
                is_native,
            } => {
                let lambda_native = *is_native || self.native_context_is_active();
                *is_native = lambda_native;

                let mut param_types = Vec::with_capacity(params.len());
                let mut quals = Vec::with_capacity(params.len());
                for param in params.iter() {
                    let ty = match &param.ty {
                        Some(ty) => self.resolve_type(ty, line),
                        None => {
                            let text = self.name(param.name);
                            self.error(line, format!("Parameter '{text}' is missing a type"));
                            Type::ANY
                        }
                    };
                    param_types.push(ty);
                    quals.push(param.mem_qual);
                }
                let ret = self.resolve_type(return_type, line);

                self.table.push_scope();
                let lambda_depth = self.table.depth();
                for (param, ty) in params.iter().zip(param_types.iter()) {
                    let mut entry = SymbolEntry::variable(param.name, ty.clone(), lambda_depth);
                    entry.kind = SymbolKind::Parameter;
                    entry.mem_qual = param.mem_qual;
                    self.table.declare(entry);
                }

                let previous_boundary = self.native_lambda_boundary;
                if lambda_native {
                    self.native_lambda_boundary = Some(lambda_depth);
                }
                match body {
                    LambdaBody::Expr(body_expr) => {
                        if let Some(actual) = self.check_expr(body_expr) {
                            if !self.types_compatible(&ret, &actual) {
                                self.mismatch(line, &ret, &actual);
                            }
                        }
                    }
                    LambdaBody::Block(stmts) => {
                        self.return_stack
                            .push((ret.clone(), crate::ast::FnModifier::None));
                        for stmt in stmts.iter_mut() {
                            self.check_stmt(stmt);
                        }
                        self.return_stack.pop();
                    }
                }
                self.native_lambda_boundary = previous_boundary;
                self.table.pop_scope();

                Some(Type::function(FunctionType {
                    return_type: ret,
                    params: param_types,
                    param_quals: quals,
                    is_native: lambda_native,
                    is_variadic: false,
                }))
            }

            ExprKind::AsVal {
                operand,
                is_noop,
                is_cstr_to_str,
            } => {
                self.as_val_context_enter();
                let inner = self.check_expr(operand);
                self.as_val_context_exit();
                let inner = inner?;
                match inner {
                    Type::Pointer(base) => {
                        let base = self.resolve_type_quiet(&base);
                        match base {
                            Type::Opaque(_) => {
                                self.error(line, "Cannot dereference opaque pointer");
                                None
                            }
                            Type::Primitive(Primitive::Char) => {
                                *is_cstr_to_str = true;
                                Some(Type::STR)
                            }
                            other => Some(other),
                        }
                    }
                    ty @ (Type::Array(_) | Type::Struct(_)) => {
                        *is_noop = true;
                        Some(ty)
                    }
                    _ => {
                        self.error(line, "'as val' requires a pointer or array operand");
                        None
                    }
                }
            }

            ExprKind::AsRef { operand } => {
                let inner = self.check_expr(operand)?;
                if crate::types::is_primitive_type(&inner) {
                    Some(inner)
                } else {
                    self.error(line, "'as ref' is only valid on primitive types");
                    None
                }
            }
        };

        expr.expr_type = ty.clone();
        ty
    }

    fn check_binary(
        &mut self,
        op: TokenKind,
        lt: &Type,
        rt: &Type,
        line: u32,
    ) -> Option<Type> {
        if is_arithmetic_operator(op) {
            if lt.is_pointer() || rt.is_pointer() {
                self.error(line, "Pointer arithmetic is not allowed");
                return None;
            }
            return match (lt, rt) {
                (Type::Primitive(a), Type::Primitive(b))
                    if is_numeric_type(lt) && is_numeric_type(rt) =>
                {
                    match Self::promote_numeric(*a, *b) {
                        Some(result) => Some(Type::Primitive(result)),
                        None => {
                            self.error(line, "Incompatible numeric types");
                            None
                        }
                    }
                }
                _ => {
                    self.error(line, "Operands must be numeric");
                    None
                }
            };
        }

        if is_comparison_operator(op) {
            let equality = matches!(op, TokenKind::EqualEqual | TokenKind::BangEqual);
            if lt.is_pointer() || rt.is_pointer() {
                let pointer_pair = lt.is_pointer() && rt.is_pointer();
                let pointer_nil = (lt.is_pointer() && rt.is_nil())
                    || (rt.is_pointer() && lt.is_nil());
                if equality && (pointer_pair || pointer_nil) {
                    return Some(Type::BOOL);
                }
                self.error(line, "Pointers support only '==' and '!=' comparisons");
                return None;
            }
            if is_numeric_type(lt) && is_numeric_type(rt) {
                if let (Type::Primitive(a), Type::Primitive(b)) = (lt, rt) {
                    if Self::promote_numeric(*a, *b).is_some() {
                        return Some(Type::BOOL);
                    }
                }
                self.error(line, "Incompatible numeric types");
                return None;
            }
            if equality && crate::types::ast_type_equals(lt, rt) && !lt.is_void() {
                return Some(Type::BOOL);
            }
            self.error(line, "Operands cannot be compared");
            return None;
        }

        if matches!(op, TokenKind::And | TokenKind::Or) {
            if lt.is_bool() && rt.is_bool() {
                return Some(Type::BOOL);
            }
            self.error(line, "Operands must be booleans");
            return None;
        }

        self.error(line, "Unsupported binary operator");
        None
    }
}
