
mod dot;

pub use dot::DotWriter;

use yapl_ast::*;

/// Presentation tree: every syntax node becomes a labelled node, every name or
/// literal a leaf. Both renderers work from this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub label: String,
    pub children: Vec<Node>,
    pub is_leaf: bool,
}

impl Node {
    fn branch(label: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            label: label.into(),
            children,
            is_leaf: false,
        }
    }

    fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
            is_leaf: true,
        }
    }
}

pub fn syntax_tree(program: &Program) -> Node {
    Node::branch("program", program.items.iter().map(item_node).collect())
}

fn item_node(item: &Item) -> Node {
    match item {
        Item::Class(class) => class_node(class),
        Item::Feature(feature) => feature_node(feature),
        Item::Error(node) => error_node(node),
    }
}

fn class_node(class: &ClassDecl) -> Node {
    let mut children = vec![Node::leaf(&class.name.name)];
    if let Some(parent) = &class.parent {
        children.push(Node::branch("inherits", vec![Node::leaf(&parent.name)]));
    }
    children.extend(class.features.iter().map(feature_node));
    Node::branch("class", children)
}

fn feature_node(feature: &Feature) -> Node {
    match feature {
        Feature::Attribute(attr) => {
            let mut children = vec![Node::leaf(&attr.name.name), Node::leaf(&attr.ty.name)];
            children.extend(attr.init.as_ref().map(expression_node));
            Node::branch("attribute", children)
        }
        Feature::Method(method) => {
            let formals = method
                .formals
                .iter()
                .map(|formal| Node::branch("formal", vec![Node::leaf(&formal.name.name), Node::leaf(&formal.ty.name)]))
                .collect();
            Node::branch(
                "method",
                vec![
                    Node::leaf(&method.name.name),
                    Node::branch("formals", formals),
                    Node::leaf(&method.return_type.name),
                    expression_node(&method.body),
                ],
            )
        }
        Feature::Error(node) => error_node(node),
    }
}

fn expression_node(expr: &Expression) -> Node {
    match expr {
        Expression::Literal(Literal::Integer(n, _)) => Node::leaf(n.to_string()),
        Expression::Literal(Literal::String(s, _)) => Node::leaf(format!("{:?}", s)),
        Expression::Literal(Literal::Bool(b, _)) => Node::leaf(b.to_string()),
        Expression::Identifier(ident) => Node::leaf(&ident.name),
        Expression::Assignment { target, value, .. } => {
            Node::branch("<-", vec![Node::leaf(&target.name), expression_node(value)])
        }
        Expression::Binary { left, op, right, .. } => {
            Node::branch(op.symbol(), vec![expression_node(left), expression_node(right)])
        }
        Expression::Not { operand, .. } => Node::branch("not", vec![expression_node(operand)]),
        Expression::Unary { op, operand, .. } => {
            let label = match op {
                UnaryOp::Complement => "~",
                UnaryOp::IsVoid => "isvoid",
            };
            Node::branch(label, vec![expression_node(operand)])
        }
        Expression::Dispatch { receiver, static_type, method, args, .. } => {
            let mut children = Vec::new();
            children.extend(receiver.as_deref().map(expression_node));
            children.extend(static_type.as_ref().map(|ty| Node::leaf(format!("@{}", ty.name))));
            children.push(Node::leaf(&method.name));
            children.push(Node::branch("args", args.iter().map(expression_node).collect()));
            Node::branch("dispatch", children)
        }
        Expression::If { condition, then_branch, else_branch, .. } => Node::branch(
            "if",
            vec![
                expression_node(condition),
                expression_node(then_branch),
                expression_node(else_branch),
            ],
        ),
        Expression::While { condition, body, .. } => {
            Node::branch("while", vec![expression_node(condition), expression_node(body)])
        }
        Expression::Block { body, .. } => Node::branch("block", body.iter().map(expression_node).collect()),
        Expression::Let { bindings, body, .. } => {
            let mut children: Vec<Node> = bindings
                .iter()
                .map(|binding| {
                    let mut parts = vec![Node::leaf(&binding.name.name), Node::leaf(&binding.ty.name)];
                    parts.extend(binding.init.as_ref().map(expression_node));
                    Node::branch("binding", parts)
                })
                .collect();
            children.push(expression_node(body));
            Node::branch("let", children)
        }
        Expression::New { ty, .. } => Node::branch("new", vec![Node::leaf(&ty.name)]),
        Expression::Paren { inner, .. } => Node::branch("paren", vec![expression_node(inner)]),
        Expression::Error(node) => error_node(node),
    }
}

fn error_node(node: &ErrorNode) -> Node {
    Node::branch("error", vec![Node::leaf(&node.text)])
}

/// One-line parenthesized dump: `(label child child ...)`, leaves bare.
pub struct TreePrinter {
    buffer: String,
}

impl TreePrinter {
    pub fn print(program: &Program) -> String {
        let mut printer = Self { buffer: String::new() };
        printer.write_node(&syntax_tree(program));
        printer.buffer
    }

    fn write_node(&mut self, node: &Node) {
        if node.is_leaf {
            self.write(&node.label);
            return;
        }

        self.write("(");
        self.write(&node.label);
        for child in &node.children {
            self.write(" ");
            self.write_node(child);
        }
        self.write(")");
    }

    fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}
