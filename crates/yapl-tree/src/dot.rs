use crate::{syntax_tree, Node};
use yapl_ast::Program;

/// Graphviz export of the syntax tree. Nodes are numbered in pre-order.
pub struct DotWriter {
    buffer: String,
    next_id: usize,
}

impl DotWriter {
    pub fn render(program: &Program) -> String {
        let mut writer = Self {
            buffer: String::new(),
            next_id: 0,
        };

        writer.write_line("digraph \"syntax tree\" {");
        writer.write_line("  node [shape=box];");
        writer.write_node(&syntax_tree(program));
        writer.write_line("}");
        writer.buffer
    }

    fn write_node(&mut self, node: &Node) -> usize {
        let id = self.next_id;
        self.next_id += 1;

        let shape = if node.is_leaf { ", shape=plaintext" } else { "" };
        self.write_line(&format!("  n{} [label=\"{}\"{}];", id, escape_label(&node.label), shape));

        for child in &node.children {
            let child_id = self.write_node(child);
            self.write_line(&format!("  n{} -> n{};", id, child_id));
        }

        id
    }

    fn write_line(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }
}

fn escape_label(label: &str) -> String {
    let mut escaped = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
