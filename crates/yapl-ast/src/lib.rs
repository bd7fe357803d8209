use yapl_lexer::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Class(ClassDecl),
    Feature(Feature), // declared outside any class
    Error(ErrorNode),
}

/// Placeholder left by the parser where it could not make sense of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorNode {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Ident,
    pub parent: Option<Ident>,
    pub features: Vec<Feature>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Attribute(Attribute),
    Method(Method),
    Error(ErrorNode),
}

impl Feature {
    /// The `(name, declared type)` pair, for features that carry both.
    pub fn declaration(&self) -> Option<(&Ident, &Ident)> {
        match self {
            Feature::Attribute(attr) => Some((&attr.name, &attr.ty)),
            Feature::Method(method) => Some((&method.name, &method.return_type)),
            Feature::Error(_) => None,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Feature::Attribute(attr) => attr.span,
            Feature::Method(method) => method.span,
            Feature::Error(node) => node.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: Ident,
    pub ty: Ident,
    pub init: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: Ident,
    pub formals: Vec<Formal>,
    pub return_type: Ident,
    pub body: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Formal {
    pub name: Ident,
    pub ty: Ident,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Identifier(Ident),
    /// Right-nested: `a <- b <- value` is `a <- (b <- value)`.
    Assignment {
        target: Ident,
        value: Box<Expression>,
        span: Span,
    },
    Binary {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
        span: Span,
    },
    Not {
        operand: Box<Expression>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        span: Span,
    },
    Dispatch {
        receiver: Option<Box<Expression>>,
        static_type: Option<Ident>,
        method: Ident,
        args: Vec<Expression>,
        span: Span,
    },
    If {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
        span: Span,
    },
    While {
        condition: Box<Expression>,
        body: Box<Expression>,
        span: Span,
    },
    Block {
        body: Vec<Expression>,
        span: Span,
    },
    Let {
        bindings: Vec<LetBinding>,
        body: Box<Expression>,
        span: Span,
    },
    New {
        ty: Ident,
        span: Span,
    },
    Paren {
        inner: Box<Expression>,
        span: Span,
    },
    Error(ErrorNode),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(lit) => lit.span(),
            Expression::Identifier(ident) => ident.span,
            Expression::Error(node) => node.span,
            Expression::Assignment { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Not { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Dispatch { span, .. }
            | Expression::If { span, .. }
            | Expression::While { span, .. }
            | Expression::Block { span, .. }
            | Expression::Let { span, .. }
            | Expression::New { span, .. }
            | Expression::Paren { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetBinding {
    pub name: Ident,
    pub ty: Ident,
    pub init: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64, Span),
    String(String, Span),
    Bool(bool, Span),
}

impl Literal {
    pub fn span(&self) -> Span {
        match self {
            Literal::Integer(_, span) | Literal::String(_, span) | Literal::Bool(_, span) => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Less,
    LessEqual,
    Equal,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Equal => "=",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide)
    }

    pub fn is_comparison(&self) -> bool {
        !self.is_arithmetic()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Complement,
    IsVoid,
}
