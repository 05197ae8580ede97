//! Type checker: statement walk, context flags, declaration handling.
//!
//! The checker mutates the AST it walks, resolving every expression's
//! `expr_type` and filling in member-access and escape annotations. Two
//! counted context flags steer the pointer rules: the native context
//! (inside `native fn` bodies) and the `as val` context (while checking
//! the operand of an `as val` expression). Both nest; exits below zero
//! are ignored.

mod call;
mod expr;
mod member;

use crate::analysis::{detect_struct_circular_dependency, format_dependency_chain};
use crate::ast::{FnModifier, ForIterable, FunctionDecl, Module, Stmt, StmtKind, StructDecl};
use crate::diag::Diagnostics;
use crate::intern::{Interner, Symbol};
use crate::layout::calculate_struct_layout;
use crate::symbols::{SymbolEntry, SymbolKind, SymbolTable};
use crate::token::TokenKind;
use crate::types::{
    can_escape_private, is_c_compatible_type, is_primitive_type, FunctionType, MemQual, Primitive,
    StructType, Type,
};

pub fn is_comparison_operator(op: TokenKind) -> bool {
    matches!(
        op,
        TokenKind::EqualEqual
            | TokenKind::BangEqual
            | TokenKind::Less
            | TokenKind::LessEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual
    )
}

pub fn is_arithmetic_operator(op: TokenKind) -> bool {
    matches!(
        op,
        TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
    )
}

/// Check a module against a symbol table. Returns true iff no errors were
/// emitted. The table is left populated with the module's declarations.
pub fn type_check_module(
    module: &mut Module,
    table: &mut SymbolTable,
    interner: &mut Interner,
    diags: &mut Diagnostics,
) -> bool {
    let before = diags.len();
    let mut checker = TypeChecker::new(table, interner, diags, module.filename.clone());
    for stmt in &mut module.stmts {
        checker.check_stmt(stmt);
    }
    diags.len() == before
}

pub struct TypeChecker<'t> {
    pub(crate) table: &'t mut SymbolTable,
    pub(crate) interner: &'t mut Interner,
    pub(crate) diags: &'t mut Diagnostics,
    pub(crate) filename: String,
    native_depth: u32,
    as_val_depth: u32,
    pub(crate) loop_depth: u32,
    /// Return types of enclosing functions, innermost last.
    pub(crate) return_stack: Vec<(Type, FnModifier)>,
    /// While checking a native lambda body: the scope depth of its
    /// parameter scope. Any non-function resolution below this depth is a
    /// capture.
    pub(crate) native_lambda_boundary: Option<i32>,
    /// Depth counter for call arguments whose parameter expects a
    /// pointer; lets a pointer-returning call flow inline into another
    /// call without `as val`.
    pub(crate) inline_pointer_depth: u32,
}

impl<'t> TypeChecker<'t> {
    pub fn new(
        table: &'t mut SymbolTable,
        interner: &'t mut Interner,
        diags: &'t mut Diagnostics,
        filename: String,
    ) -> Self {
        TypeChecker {
            table,
            interner,
            diags,
            filename,
            native_depth: 0,
            as_val_depth: 0,
            loop_depth: 0,
            return_stack: Vec::new(),
            native_lambda_boundary: None,
            inline_pointer_depth: 0,
        }
    }

    // ---- context flags ----

    pub fn native_context_enter(&mut self) {
        self.native_depth += 1;
    }

    pub fn native_context_exit(&mut self) {
        self.native_depth = self.native_depth.saturating_sub(1);
    }

    pub fn native_context_is_active(&self) -> bool {
        self.native_depth > 0
    }

    pub fn as_val_context_enter(&mut self) {
        self.as_val_depth += 1;
    }

    pub fn as_val_context_exit(&mut self) {
        self.as_val_depth = self.as_val_depth.saturating_sub(1);
    }

    pub fn as_val_context_is_active(&self) -> bool {
        self.as_val_depth > 0
    }

    // ---- shared helpers ----

    pub(crate) fn error(&mut self, line: u32, message: impl Into<String>) {
        self.diags.type_error(&self.filename, line, message);
    }

    pub(crate) fn name(&self, sym: Symbol) -> String {
        self.interner.resolve(sym).to_string()
    }

    /// Resolve `Named` handles through the registry. Unknown names are
    /// reported and leave the type untouched.
    pub(crate) fn resolve_type(&mut self, ty: &Type, line: u32) -> Type {
        match ty {
            Type::Named(name) => match self.table.lookup_type(*name) {
                Some(resolved) => resolved.clone(),
                None => {
                    let text = self.name(*name);
                    self.error(line, format!("Unknown type '{text}'"));
                    ty.clone()
                }
            },
            other => other.clone(),
        }
    }

    /// Numeric promotion for a binary operation. `None` means the pair is
    /// incompatible. The general lattice is byte -> int -> long -> double
    /// with float promoting only to double; the fixed-width interop types
    /// combine only with themselves.
    pub(crate) fn promote_numeric(a: Primitive, b: Primitive) -> Option<Primitive> {
        use Primitive::*;
        if a == b {
            return Some(a);
        }
        let rank = |p: Primitive| match p {
            Byte => Some(0),
            Int => Some(1),
            Long => Some(2),
            Double => Some(3),
            _ => None,
        };
        if let (Some(ra), Some(rb)) = (rank(a), rank(b)) {
            let widest = if ra >= rb { a } else { b };
            return Some(widest);
        }
        if matches!((a, b), (Float, Double) | (Double, Float)) {
            return Some(Double);
        }
        None
    }

    /// Assignment compatibility: `actual` may be stored into `expected`.
    pub(crate) fn types_compatible(&self, expected: &Type, actual: &Type) -> bool {
        if crate::types::ast_type_equals(expected, actual) {
            return true;
        }
        match (expected, actual) {
            // `any` absorbs every value.
            (Type::Primitive(Primitive::Any), _) => !actual.is_void(),
            // nil is the null pointer.
            (Type::Pointer(_), Type::Primitive(Primitive::Nil)) => true,
            // Widening numeric conversions.
            (Type::Primitive(pe), Type::Primitive(pa)) => {
                matches!(Self::promote_numeric(*pe, *pa), Some(p) if p == *pe)
            }
            // An empty array literal (element type `any`) fits any array.
            (Type::Array(_), Type::Array(actual_elem)) => {
                matches!(actual_elem.as_ref(), Type::Primitive(Primitive::Any))
            }
            _ => false,
        }
    }

    pub(crate) fn mismatch(&mut self, line: u32, expected: &Type, actual: &Type) {
        let expected = expected.describe(self.interner);
        let actual = actual.describe(self.interner);
        self.error(
            line,
            format!("Type mismatch: expected {expected}, got {actual}"),
        );
    }

    // ---- statements ----

    pub fn check_stmt(&mut self, stmt: &mut Stmt) {
        let line = stmt.line;
        match &mut stmt.kind {
            StmtKind::VarDecl {
                name,
                declared_type,
                init,
                mem_qual,
            } => {
                let (name, mem_qual) = (*name, *mem_qual);
                self.check_var_decl(line, name, declared_type, init, mem_qual);
            }
            StmtKind::ExprStmt { expr } => {
                self.check_expr(expr);
            }
            StmtKind::Return { value } => self.check_return(line, value),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if let Some(ty) = self.check_expr(cond) {
                    if !ty.is_bool() {
                        self.diags.type_error(
                            &self.filename,
                            cond.line,
                            "Condition must be a boolean",
                        );
                    }
                }
                self.check_scoped_block(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_scoped_block(else_branch);
                }
            }
            StmtKind::While { cond, body } => {
                if let Some(ty) = self.check_expr(cond) {
                    if !ty.is_bool() {
                        self.diags.type_error(
                            &self.filename,
                            cond.line,
                            "Condition must be a boolean",
                        );
                    }
                }
                self.loop_depth += 1;
                self.check_scoped_block(body);
                self.loop_depth -= 1;
            }
            StmtKind::For {
                var,
                iterable,
                body,
            } => {
                let var = *var;
                self.check_for(var, iterable, body);
            }
            StmtKind::Break => {
                if self.loop_depth == 0 {
                    self.error(line, "'break' outside of a loop");
                }
            }
            StmtKind::Continue => {
                if self.loop_depth == 0 {
                    self.error(line, "'continue' outside of a loop");
                }
            }
            StmtKind::Block { body } => self.check_scoped_block(body),
            StmtKind::Function(decl) => self.check_function(line, decl),
            StmtKind::StructDecl(decl) => self.check_struct_decl(line, decl),
            StmtKind::TypeDecl { name, ty, is_native } => {
                let (name, is_native) = (*name, *is_native);
                let ty = ty.clone();
                self.check_type_decl(line, name, ty, is_native);
            }
            StmtKind::Import { .. } | StmtKind::Pragma { .. } => {}
        }
    }

    fn check_scoped_block(&mut self, body: &mut [Stmt]) {
        self.table.push_scope();
        for stmt in body {
            self.check_stmt(stmt);
        }
        self.table.pop_scope();
    }

    fn check_var_decl(
        &mut self,
        line: u32,
        name: Symbol,
        declared_type: &Option<Type>,
        init: &mut Option<crate::ast::Expr>,
        mem_qual: MemQual,
    ) {
        let declared = declared_type
            .clone()
            .map(|ty| self.resolve_type(&ty, line));

        if let Some(ty) = &declared {
            if ty.is_pointer() && !self.native_context_is_active() {
                self.error(line, "Pointer variables require a native function");
            }
            if mem_qual == MemQual::AsRef && !is_primitive_type(ty) {
                self.error(line, "'as ref' is only valid on primitive types");
            }
        }

        let init_ty = match init {
            Some(init_expr) => self.check_expr(init_expr),
            None => None,
        };

        let var_ty = match (&declared, &init_ty) {
            (Some(expected), Some(actual)) => {
                if !self.types_compatible(expected, actual) {
                    self.mismatch(line, expected, actual);
                }
                expected.clone()
            }
            (Some(expected), None) => expected.clone(),
            (None, Some(actual)) => actual.clone(),
            (None, None) => {
                self.error(line, "Variable declaration needs a type or an initializer");
                Type::ANY
            }
        };

        let mut entry = SymbolEntry::variable(name, var_ty, self.table.depth());
        entry.is_native_context = self.native_context_is_active();
        entry.mem_qual = mem_qual;
        if !self.table.declare(entry) {
            let text = self.name(name);
            self.error(
                line,
                format!("Variable '{text}' is already declared in this scope"),
            );
        }
    }

    fn check_return(&mut self, line: u32, value: &mut Option<crate::ast::Expr>) {
        let Some((expected, _modifier)) = self.return_stack.last().cloned() else {
            self.error(line, "'return' outside of a function");
            if let Some(value) = value {
                self.check_expr(value);
            }
            return;
        };
        match value {
            Some(value) => {
                if let Some(actual) = self.check_expr(value) {
                    if !self.types_compatible(&expected, &actual) {
                        self.mismatch(line, &expected, &actual);
                    }
                }
            }
            None => {
                if !expected.is_void() {
                    let expected = expected.describe(self.interner);
                    self.error(line, format!("Return value of type {expected} required"));
                }
            }
        }
    }

    fn check_for(&mut self, var: Symbol, iterable: &mut ForIterable, body: &mut [Stmt]) {
        let element_ty = match iterable {
            ForIterable::Range { start, end } => {
                for bound in [start, end] {
                    if let Some(ty) = self.check_expr(bound) {
                        if !matches!(
                            ty,
                            Type::Primitive(Primitive::Int | Primitive::Long)
                        ) {
                            self.diags.type_error(
                                &self.filename,
                                bound.line,
                                "Range bounds must be integers",
                            );
                        }
                    }
                }
                Type::INT
            }
            ForIterable::Array(expr) => match self.check_expr(expr) {
                Some(Type::Array(elem)) => (*elem).clone(),
                Some(other) => {
                    let text = other.describe(self.interner);
                    self.diags.type_error(
                        &self.filename,
                        expr.line,
                        format!("Cannot iterate over {text}"),
                    );
                    Type::ANY
                }
                None => Type::ANY,
            },
        };

        self.table.push_scope();
        let entry = SymbolEntry::variable(var, element_ty, self.table.depth());
        self.table.declare(entry);
        self.loop_depth += 1;
        for stmt in body {
            self.check_stmt(stmt);
        }
        self.loop_depth -= 1;
        self.table.pop_scope();
    }

    fn check_function(&mut self, line: u32, decl: &mut FunctionDecl) {
        let fn_ty = self.function_signature(decl, line);

        // Private functions must not leak reference values.
        if decl.modifier == FnModifier::Private && !can_escape_private(&fn_ty.return_type) {
            self.error(line, "Private functions cannot return reference types");
        }

        // A pointer return type only makes sense against a C ABI.
        if fn_ty.return_type.is_pointer() && !decl.is_native {
            self.error(line, "Pointer return types require a native function");
        }

        // Record the function before the body so recursion resolves.
        let entry = SymbolEntry::function(
            decl.name,
            Type::function(fn_ty.clone()),
            self.table.depth(),
        );
        if !self.table.declare(entry) {
            let text = self.name(decl.name);
            self.error(line, format!("'{text}' is already declared in this scope"));
        }

        self.table.push_scope();
        let param_depth = self.table.depth();
        for param in &decl.params {
            let Some(param_ty) = &param.ty else { continue };
            let resolved = self.resolve_type(param_ty, line);
            let mut entry = SymbolEntry::variable(param.name, resolved, param_depth);
            entry.kind = SymbolKind::Parameter;
            entry.mem_qual = param.mem_qual;
            self.table.declare(entry);
        }

        if decl.is_native {
            self.native_context_enter();
        }
        self.return_stack
            .push((fn_ty.return_type.clone(), decl.modifier));
        for stmt in &mut decl.body {
            self.check_stmt(stmt);
        }
        self.return_stack.pop();
        if decl.is_native {
            self.native_context_exit();
        }
        self.table.pop_scope();
    }

    /// Validate a function declaration's signature and build its type.
    pub(crate) fn function_signature(
        &mut self,
        decl: &FunctionDecl,
        line: u32,
    ) -> FunctionType {
        let mut params = Vec::with_capacity(decl.params.len());
        let mut quals = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let param_ty = match &param.ty {
                Some(ty) => self.resolve_type(ty, line),
                None => {
                    let text = self.name(param.name);
                    self.error(line, format!("Parameter '{text}' is missing a type"));
                    Type::ANY
                }
            };
            if param.mem_qual == MemQual::AsRef && !is_primitive_type(&param_ty) {
                self.error(line, "'as ref' is only valid on primitive types");
            }
            if param_ty.is_pointer() && !decl.is_native {
                self.error(line, "Pointer parameters require a native function");
            }
            params.push(param_ty);
            quals.push(param.mem_qual);
        }
        let return_type = self.resolve_type(&decl.return_type, line);
        FunctionType {
            return_type,
            params,
            param_quals: quals,
            is_native: decl.is_native,
            is_variadic: decl.is_variadic,
        }
    }

    fn check_struct_decl(&mut self, line: u32, decl: &mut StructDecl) {
        self.validate_struct_fields(decl, line);

        let mut st = StructType::new(Some(decl.name), decl.fields.clone());
        st.is_native = decl.is_native;
        st.is_packed = decl.is_packed;
        st.pack_value = decl.pack_value;

        let name = decl.name;
        if !self.table.register_type(name, Type::structure(st)) {
            let text = self.name(name);
            self.error(line, format!("Type '{text}' is already defined"));
            return;
        }

        // Cycle detection must pass before layout can run.
        let Some(registered) = self.table.lookup_type(name).cloned() else {
            return;
        };
        let mut chain = Vec::new();
        if detect_struct_circular_dependency(&registered, self.table, &mut chain) {
            let rendered = format_dependency_chain(&chain, self.interner);
            self.error(line, format!("Circular struct dependency: {rendered}"));
            return;
        }

        // Layout is computed once and cached on the registered node.
        let mut laid_out = registered;
        if let Some(st) = laid_out.as_struct_mut() {
            calculate_struct_layout(st, self.table);
        }
        if let Some(slot) = self.table.lookup_type_mut(name) {
            *slot = laid_out;
        }
    }

    fn validate_struct_fields(&mut self, decl: &mut StructDecl, line: u32) {
        let is_native = decl.is_native;
        let struct_name = decl.name;
        for i in 0..decl.fields.len() {
            let field_ty = decl.fields[i].ty.clone();
            let field_name = decl.fields[i].name;

            if field_ty.is_pointer() && !is_native {
                self.error(line, "Pointer fields require a native struct");
            }

            // Field types must name something real; the struct's own name
            // is legal here (the cycle detector decides if it is sound).
            if let Type::Named(name) = &field_ty {
                if *name != struct_name && self.table.lookup_type(*name).is_none() {
                    let text = self.name(*name);
                    self.error(line, format!("Unknown type '{text}'"));
                }
            }

            if let Some(mut default) = decl.fields[i].default_value.clone() {
                if let Some(actual) = self.check_expr(&mut default) {
                    let expected = self.resolve_type_quiet(&field_ty);
                    if !self.types_compatible(&expected, &actual) {
                        let field = self.name(field_name);
                        let expected = expected.describe(self.interner);
                        let actual = actual.describe(self.interner);
                        self.error(
                            line,
                            format!(
                                "Default value for field '{field}' has type {actual}, expected {expected}"
                            ),
                        );
                    }
                }
                decl.fields[i].default_value = Some(default);
            }
        }
    }

    fn check_type_decl(&mut self, line: u32, name: Symbol, ty: Type, is_native: bool) {
        if let Type::Function(sig) = &ty {
            if is_native || sig.is_native {
                for param in &sig.params {
                    let resolved = self.resolve_type_quiet(param);
                    if !is_c_compatible_type(&resolved) {
                        self.error(
                            line,
                            "Native callback parameters must be C-compatible types",
                        );
                    }
                }
                let ret = self.resolve_type_quiet(&sig.return_type);
                if !is_c_compatible_type(&ret) {
                    self.error(
                        line,
                        "Native callback return types must be C-compatible types",
                    );
                }
            }
        }

        if !self.table.register_type(name, ty) {
            let text = self.name(name);
            self.error(line, format!("Type '{text}' is already defined"));
        }
    }

    /// Registry resolution without the unknown-name diagnostic, for spots
    /// that already reported or tolerate unresolved handles.
    pub(crate) fn resolve_type_quiet(&self, ty: &Type) -> Type {
        match ty {
            Type::Named(name) => self
                .table
                .lookup_type(*name)
                .cloned()
                .unwrap_or_else(|| ty.clone()),
            other => other.clone(),
        }
    }
}
