//! Call checking: arity, argument types, variadic tails, callbacks, and
//! the pointer-return discipline.

use crate::ast::{Expr, ExprKind};
use crate::types::{ast_type_equals, is_variadic_compatible_type, Type};

use super::TypeChecker;

impl TypeChecker<'_> {
    pub(crate) fn check_call(
        &mut self,
        callee: &mut Expr,
        args: &mut [Expr],
        line: u32,
    ) -> Option<Type> {
        let callee_name = callee.variable_name();
        let callee_ty = self.check_expr(callee)?;
        let callee_ty = self.resolve_type_quiet(&callee_ty);

        let sig = match callee_ty {
            Type::Function(sig) => sig,
            other => {
                let text = other.describe(self.interner);
                self.error(line, format!("Cannot call non-function type {text}"));
                for arg in args.iter_mut() {
                    self.check_expr(arg);
                }
                return None;
            }
        };

        let expected_arity = sig.params.len();
        let arity_ok = if sig.is_variadic {
            args.len() >= expected_arity
        } else {
            args.len() == expected_arity
        };
        if !arity_ok {
            let label = match callee_name {
                Some(name) => format!("Function '{}'", self.name(name)),
                None => "Function".to_string(),
            };
            let at_least = if sig.is_variadic { "at least " } else { "" };
            self.error(
                line,
                format!(
                    "{label} expects {at_least}{expected_arity} arguments, got {}",
                    args.len()
                ),
            );
        }

        for (i, arg) in args.iter_mut().enumerate() {
            if i < expected_arity {
                let expected = self.resolve_type_quiet(&sig.params[i]);
                let pointer_param = expected.is_pointer();
                if pointer_param {
                    self.inline_pointer_depth += 1;
                }
                let actual = self.check_expr(arg);
                if pointer_param {
                    self.inline_pointer_depth -= 1;
                }
                let Some(actual) = actual else { continue };
                self.check_argument(&expected, &actual, arg, i, line);
            } else {
                // Variadic tail.
                let Some(actual) = self.check_expr(arg) else {
                    continue;
                };
                let actual = self.resolve_type_quiet(&actual);
                if !is_variadic_compatible_type(&actual) {
                    let text = actual.describe(self.interner);
                    self.error(
                        line,
                        format!("Argument {} of type {text} is not variadic-compatible", i + 1),
                    );
                }
            }
        }

        let return_type = self.resolve_type_quiet(&sig.return_type);

        // A raw pointer result must be consumed by `as val` outside native
        // code, unless it flows straight into another call's pointer
        // parameter.
        if return_type.is_pointer()
            && !self.native_context_is_active()
            && !self.as_val_context_is_active()
            && self.inline_pointer_depth == 0
        {
            self.error(
                line,
                "Pointer return values require 'as val' outside native functions",
            );
        }

        Some(return_type)
    }

    /// One fixed argument against its parameter. Function-typed
    /// parameters (callbacks) get signature-aware messages, lambdas
    /// included.
    fn check_argument(
        &mut self,
        expected: &Type,
        actual: &Type,
        arg: &Expr,
        index: usize,
        line: u32,
    ) {
        if let (Type::Function(expected_sig), Type::Function(actual_sig)) = (expected, actual) {
            let is_lambda = matches!(arg.kind, ExprKind::Lambda { .. });
            if expected_sig.params.len() != actual_sig.params.len() {
                let (want, got) = (expected_sig.params.len(), actual_sig.params.len());
                let message = if is_lambda {
                    format!("Lambda has {got} parameters, but {want} are expected")
                } else {
                    format!(
                        "Callback argument {} has {got} parameters, but {want} are expected",
                        index + 1
                    )
                };
                self.error(line, message);
                return;
            }
            let params_match = expected_sig
                .params
                .iter()
                .zip(actual_sig.params.iter())
                .all(|(e, a)| {
                    ast_type_equals(&self.resolve_type_quiet(e), &self.resolve_type_quiet(a))
                });
            let returns_match = ast_type_equals(
                &self.resolve_type_quiet(&expected_sig.return_type),
                &self.resolve_type_quiet(&actual_sig.return_type),
            );
            if !params_match || !returns_match {
                self.mismatch(line, expected, actual);
            }
            return;
        }

        if !self.types_compatible(expected, actual) {
            self.mismatch(line, expected, actual);
        }
    }
}
