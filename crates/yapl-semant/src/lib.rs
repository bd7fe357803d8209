
mod tables;
mod types;

pub use tables::{AttributeTable, ClassTable, SymbolTableBuilder, SymbolTables};
pub use types::{InferredType, Scope, TypeName};

use yapl_ast::*;
use yapl_diags::{closest_match, Diagnostic, DiagnosticKind, DiagnosticSink, Diagnostics, Span};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckerConfig {
    /// When set, composite operands carry the type synthesized from their
    /// children instead of `Unknown`.
    pub propagate_composite_types: bool,
    /// When set, attribute and `let` initializers are compared against the
    /// declared type like an assignment. Off by default.
    pub check_initializers: bool,
}

/// Everything a check run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub diagnostics: Diagnostics,
    pub tables: SymbolTables,
}

impl Analysis {
    pub fn mismatch_count(&self) -> usize {
        self.diagnostics.count(DiagnosticKind::TypeMismatch)
    }

    pub fn unrecognized_count(&self) -> usize {
        self.diagnostics.count(DiagnosticKind::UnrecognizedNode)
    }

    pub fn is_well_typed(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Post-order type checker. Declarations are entered into the symbol tables as
/// they are visited, so a feature sees itself and everything declared before it.
pub struct TypeChecker {
    tables: SymbolTables,
    diagnostics: Diagnostics,
    config: CheckerConfig,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            tables: SymbolTables::new(),
            diagnostics: Diagnostics::new(),
            config: CheckerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    /// Check against tables prepared elsewhere, e.g. by `SymbolTableBuilder`.
    pub fn with_tables(mut self, tables: SymbolTables) -> Self {
        self.tables = tables;
        self
    }

    pub fn tables(&self) -> &SymbolTables {
        &self.tables
    }

    pub fn check_program(mut self, program: &Program) -> Analysis {
        for item in &program.items {
            match item {
                Item::Class(class) => self.check_class(class),
                Item::Feature(feature) => self.check_feature(&Scope::TopLevel, feature),
                Item::Error(node) => self.unrecognized(node),
            }
        }

        log::debug!(
            "type checking finished: {} mismatch(es), {} unrecognized node(s)",
            self.diagnostics.count(DiagnosticKind::TypeMismatch),
            self.diagnostics.count(DiagnosticKind::UnrecognizedNode)
        );

        self.finish()
    }

    pub fn finish(self) -> Analysis {
        Analysis {
            diagnostics: self.diagnostics,
            tables: self.tables,
        }
    }

    fn check_class(&mut self, class: &ClassDecl) {
        let scope = self.tables.enter_class(&class.name.name);
        log::trace!("entering {}", scope);

        for feature in &class.features {
            self.check_feature(&scope, feature);
        }

        log::trace!("leaving {}", scope);
    }

    fn check_feature(&mut self, scope: &Scope, feature: &Feature) {
        match feature {
            Feature::Attribute(attr) => {
                self.tables.declare(scope, &attr.name.name, TypeName::new(attr.ty.name.as_str()));
                if let Some(init) = &attr.init {
                    self.check_initializer(scope, &attr.ty, init);
                }
            }
            Feature::Method(method) => {
                self.tables.declare(scope, &method.name.name, TypeName::new(method.return_type.name.as_str()));
                self.check_expression(scope, &method.body);
            }
            Feature::Error(node) => self.unrecognized(node),
        }
    }

    /// `name : T <- init` follows the assignment rule against the declared `T`
    /// when initializer checks are enabled. The initializer is walked either way.
    fn check_initializer(&mut self, scope: &Scope, declared: &Ident, init: &Expression) {
        let found = self.check_expression(scope, init);
        if !self.config.check_initializers {
            return;
        }

        let expected = InferredType::Known(TypeName::new(declared.name.as_str()));

        if expected != found {
            let help = self.suggest_for(scope, init);
            self.mismatch(&expected, &[&found], declared.span.to(init.span()), help);
        }
    }

    /// Checks `expr` and its children, emitting a diagnostic for every broken
    /// rule, and returns the type its parent should see.
    pub fn check_expression(&mut self, scope: &Scope, expr: &Expression) -> InferredType {
        let synthesized = self.synthesize(scope, expr);

        if self.config.propagate_composite_types {
            synthesized
        } else {
            self.infer_type(scope, expr)
        }
    }

    /// Leaf inference: literals and identifiers have a type, anything composite
    /// is `Unknown`.
    pub fn infer_type(&self, scope: &Scope, expr: &Expression) -> InferredType {
        match expr {
            Expression::Literal(Literal::Integer(..)) => InferredType::int(),
            Expression::Literal(Literal::String(..)) => InferredType::string(),
            Expression::Literal(Literal::Bool(..)) => InferredType::boolean(),
            Expression::Identifier(ident) => self.tables.lookup(scope, &ident.name),
            _ => InferredType::Unknown,
        }
    }

    fn synthesize(&mut self, scope: &Scope, expr: &Expression) -> InferredType {
        match expr {
            Expression::Literal(_) => self.infer_type(scope, expr),

            Expression::Identifier(ident) => match self.tables.lookup(scope, &ident.name) {
                InferredType::Unknown if ident.name == "self" => scope
                    .class_name()
                    .map(TypeName::new)
                    .into(),
                ty => ty,
            },

            Expression::Assignment { target, value, .. } => {
                let found = self.check_expression(scope, value);
                let expected = self.tables.lookup(scope, &target.name);

                if expected != found {
                    let help = self
                        .suggest(scope, &target.name)
                        .or_else(|| self.suggest_for(scope, value));
                    self.mismatch(&expected, &[&found], target.span.to(value.span()), help);
                }

                found
            }

            Expression::Binary { left, op, right, span } => {
                let lhs = self.check_expression(scope, left);
                let rhs = self.check_expression(scope, right);

                if op.is_arithmetic() {
                    if !lhs.is(TypeName::INT) || !rhs.is(TypeName::INT) {
                        let help = self.suggest_for(scope, left).or_else(|| self.suggest_for(scope, right));
                        self.mismatch(&InferredType::int(), &[&lhs, &rhs], *span, help);
                    }
                    InferredType::int()
                } else {
                    if lhs != rhs {
                        let help = self.suggest_for(scope, left).or_else(|| self.suggest_for(scope, right));
                        self.mismatch(&lhs, &[&rhs], *span, help);
                    }
                    InferredType::boolean()
                }
            }

            Expression::Not { operand, span } => {
                let ty = self.check_expression(scope, operand);
                if !ty.is(TypeName::BOOLEAN) {
                    let help = self.suggest_for(scope, operand);
                    self.mismatch(&InferredType::boolean(), &[&ty], *span, help);
                }
                InferredType::boolean()
            }

            Expression::Unary { op, operand, .. } => {
                self.check_expression(scope, operand);
                match op {
                    UnaryOp::Complement => InferredType::int(),
                    UnaryOp::IsVoid => InferredType::boolean(),
                }
            }

            Expression::Dispatch { receiver, static_type, method, args, .. } => {
                let receiver_ty = receiver
                    .as_ref()
                    .map(|receiver| self.check_expression(scope, receiver));
                for arg in args {
                    self.check_expression(scope, arg);
                }

                match (receiver_ty, static_type) {
                    (None, _) => self.tables.lookup(scope, &method.name),
                    (Some(_), Some(class)) => self.tables.lookup(&Scope::Class(class.name.clone()), &method.name),
                    (Some(InferredType::Known(class)), None) => {
                        self.tables.lookup(&Scope::Class(class.as_str().to_string()), &method.name)
                    }
                    (Some(InferredType::Unknown), None) => InferredType::Unknown,
                }
            }

            Expression::If { condition, then_branch, else_branch, .. } => {
                self.check_expression(scope, condition);
                let then_ty = self.check_expression(scope, then_branch);
                let else_ty = self.check_expression(scope, else_branch);
                if then_ty == else_ty {
                    then_ty
                } else {
                    InferredType::Unknown
                }
            }

            Expression::While { condition, body, .. } => {
                self.check_expression(scope, condition);
                self.check_expression(scope, body);
                InferredType::Unknown
            }

            Expression::Block { body, .. } => {
                let mut last = InferredType::Unknown;
                for expr in body {
                    last = self.check_expression(scope, expr);
                }
                last
            }

            Expression::Let { bindings, body, .. } => {
                for binding in bindings {
                    if let Some(init) = &binding.init {
                        self.check_initializer(scope, &binding.ty, init);
                    }
                }
                self.check_expression(scope, body)
            }

            Expression::New { ty, .. } => InferredType::Known(TypeName::new(ty.name.as_str())),

            Expression::Paren { inner, .. } => self.check_expression(scope, inner),

            Expression::Error(node) => {
                self.unrecognized(node);
                InferredType::Unknown
            }
        }
    }

    fn mismatch(&mut self, expected: &InferredType, found: &[&InferredType], span: Span, help: Option<String>) {
        let found = found.iter().map(|ty| ty.to_string()).collect();
        let mut diagnostic = Diagnostic::type_mismatch(expected.to_string(), found, span);
        if let Some(help) = help {
            diagnostic = diagnostic.with_help(help);
        }

        log::trace!("{}", diagnostic);
        self.diagnostics.emit(diagnostic);
    }

    fn unrecognized(&mut self, node: &ErrorNode) {
        self.diagnostics.emit(Diagnostic::unrecognized_node(&node.text, node.span));
    }

    /// A "did you mean" note for a name that does not resolve in `scope`.
    fn suggest(&self, scope: &Scope, name: &str) -> Option<String> {
        let table = self.tables.table(scope)?;
        if table.contains(name) {
            return None;
        }

        closest_match(name, table.names()).map(|candidate| format!("did you mean '{}'?", candidate))
    }

    fn suggest_for(&self, scope: &Scope, expr: &Expression) -> Option<String> {
        match expr {
            Expression::Identifier(ident) => self.suggest(scope, &ident.name),
            Expression::Paren { inner, .. } => self.suggest_for(scope, inner),
            _ => None,
        }
    }
}
