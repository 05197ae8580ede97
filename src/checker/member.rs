//! Member access and struct literal checking.
//!
//! Struct field resolution writes `field_index` and the base variable's
//! scope depth onto the access node; `a.b.c` shares `a`'s depth through
//! the chain. Arrays and strings expose a small builtin member surface
//! with synthetic function types.

use crate::analysis::analyze_field_assignment;
use crate::ast::{Expr, ExprKind, FieldInit, MemberInfo};
use crate::intern::Symbol;
use crate::types::{FunctionType, StructType, Type};

use super::TypeChecker;

impl TypeChecker<'_> {
    pub(crate) fn check_member_access(
        &mut self,
        object: &mut Expr,
        member: Symbol,
        info: &mut MemberInfo,
        line: u32,
    ) -> Option<Type> {
        let object_ty = self.check_expr(object)?;
        let object_ty = self.resolve_type_quiet(&object_ty);

        match object_ty {
            Type::Struct(st) => self.resolve_struct_field(&st, object, member, info, line),

            Type::Pointer(base) => {
                let base = self.resolve_type_quiet(&base);
                let st = match base {
                    Type::Struct(st) => st,
                    other => {
                        let text = Type::Pointer(Box::new(other)).describe(self.interner);
                        self.error(line, format!("Cannot access member on {text}"));
                        return None;
                    }
                };
                if !self.native_context_is_active() {
                    self.error(line, "Pointer member access requires a native function");
                    return None;
                }
                self.resolve_struct_field(&st, object, member, info, line)
            }

            Type::Array(elem) => {
                let member_name = self.interner.resolve(member).to_string();
                let elem = (*elem).clone();
                match member_name.as_str() {
                    "length" => Some(Type::INT),
                    "push" => Some(Type::function(FunctionType::new(Type::VOID, vec![elem]))),
                    "pop" => Some(Type::function(FunctionType::new(elem, Vec::new()))),
                    "clear" => Some(Type::function(FunctionType::new(Type::VOID, Vec::new()))),
                    "concat" => {
                        let array = Type::array_of(elem);
                        Some(Type::function(FunctionType::new(
                            array.clone(),
                            vec![array],
                        )))
                    }
                    _ => {
                        self.error(line, format!("Unknown array member '{member_name}'"));
                        None
                    }
                }
            }

            Type::Primitive(crate::types::Primitive::Str) => {
                let member_name = self.interner.resolve(member).to_string();
                match member_name.as_str() {
                    "append" => Some(Type::function(FunctionType::new(
                        Type::STR,
                        vec![Type::STR],
                    ))),
                    _ => {
                        self.error(line, format!("Unknown string member '{member_name}'"));
                        None
                    }
                }
            }

            other => {
                let member_name = self.name(member);
                let text = other.describe(self.interner);
                self.error(
                    line,
                    format!("Cannot access member '{member_name}' on {text}"),
                );
                None
            }
        }
    }

    fn resolve_struct_field(
        &mut self,
        st: &StructType,
        object: &Expr,
        member: Symbol,
        info: &mut MemberInfo,
        line: u32,
    ) -> Option<Type> {
        let index = st.field_index(member);
        if index < 0 {
            let member_name = self.name(member);
            let struct_name = st
                .name
                .map(|n| self.name(n))
                .unwrap_or_else(|| "struct".to_string());
            self.error(
                line,
                format!("Unknown field '{member_name}' in struct '{struct_name}'"),
            );
            return None;
        }
        info.field_index = index;
        info.scope_depth = base_scope_depth(object);
        let field_ty = st.fields[index as usize].ty.clone();
        Some(self.resolve_type_quiet(&field_ty))
    }

    pub(crate) fn check_member_assign(
        &mut self,
        object: &mut Expr,
        member: Symbol,
        value: &mut Expr,
        info: &mut MemberInfo,
        line: u32,
    ) -> Option<Type> {
        let field_ty = self.check_member_access(object, member, info, line)?;
        if let Some(value_ty) = self.check_expr(value) {
            if !self.types_compatible(&field_ty, &value_ty) {
                self.mismatch(line, &field_ty, &value_ty);
            }
        }
        analyze_field_assignment(object, info, value);
        Some(field_ty)
    }

    pub(crate) fn check_struct_literal(
        &mut self,
        name: Symbol,
        inits: &mut [FieldInit],
        fields_initialized: &mut Option<Vec<bool>>,
        total_field_count: &mut i32,
        line: u32,
    ) -> Option<Type> {
        let Some(registered) = self.table.lookup_type(name).cloned() else {
            let text = self.name(name);
            self.error(line, format!("Unknown struct '{text}'"));
            return None;
        };
        let Type::Struct(st) = &registered else {
            let text = self.name(name);
            self.error(line, format!("'{text}' is not a struct type"));
            return None;
        };

        if st.is_native && !self.native_context_is_active() {
            self.error(line, "Native struct literals require a native function");
        }

        *total_field_count = st.fields.len() as i32;
        let mut init_flags = vec![false; st.fields.len()];

        for init in inits.iter_mut() {
            let index = st.field_index(init.name);
            if index < 0 {
                let field = self.name(init.name);
                let struct_name = self.name(name);
                self.error(
                    line,
                    format!("Unknown field '{field}' in struct '{struct_name}'"),
                );
                self.check_expr(&mut init.value);
                continue;
            }
            init_flags[index as usize] = true;
            let expected = self.resolve_type_quiet(&st.fields[index as usize].ty);
            if let Some(actual) = self.check_expr(&mut init.value) {
                if !self.types_compatible(&expected, &actual) {
                    let field = self.name(init.name);
                    let expected = expected.describe(self.interner);
                    let actual = actual.describe(self.interner);
                    self.error(
                        line,
                        format!("Field '{field}' expects {expected}, got {actual}"),
                    );
                }
            }
        }

        // Defaults fill whatever the literal left unset.
        for (flag, field) in init_flags.iter_mut().zip(st.fields.iter()) {
            if !*flag && field.default_value.is_some() {
                *flag = true;
            }
        }

        for (flag, field) in init_flags.iter().zip(st.fields.iter()) {
            if !*flag {
                let field_name = self.name(field.name);
                self.error(line, format!("Missing required field '{field_name}'"));
            }
        }

        *fields_initialized = Some(init_flags);
        Some(registered)
    }
}

/// Declaration depth of the chain's base variable, or the propagated
/// depth when the object is itself a member access. Non-variable bases
/// (calls, literals) anchor at depth 0.
fn base_scope_depth(object: &Expr) -> i32 {
    match &object.kind {
        ExprKind::Variable {
            decl_scope_depth, ..
        } => (*decl_scope_depth).max(0),
        ExprKind::MemberAccess { info, .. } => info.scope_depth,
        _ => 0,
    }
}
