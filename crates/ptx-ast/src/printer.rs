//! S-expression dump of a tree, for debugging and test snapshots.

use crate::node::{NodeRef, Scalar, Slot};

pub struct Printer {
    indent: usize,
}

/// Pending output: literal text, or a node still to be laid out
enum Step<'a> {
    Text(String),
    Node(NodeRef<'a>, usize),
}

impl Printer {
    pub fn new() -> Self {
        Self { indent: 2 }
    }

    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }

    pub fn print(&self, node: NodeRef<'_>) -> String {
        let mut result = String::new();
        let mut stack = vec![Step::Node(node, 0)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Text(text) => result.push_str(&text),
                Step::Node(node, _) if self.is_leaf(node) => self.print_leaf(node, &mut result),
                Step::Node(node, depth) => {
                    let steps = self.layout(node, depth);
                    stack.extend(steps.into_iter().rev());
                }
            }
        }

        result
    }

    /// Nodes without children fit on one line
    fn print_leaf(&self, node: NodeRef<'_>, result: &mut String) {
        let kind = node.kind();
        result.push_str(&format!("({}", kind.name));
        for (field, slot) in kind.fields().iter().zip(node.slots()) {
            let value = inline_slot(slot).unwrap_or_else(|| "nil".to_string());
            result.push_str(&format!(" :{} {}", field.name, value));
        }
        result.push(')');
    }

    /// One field per line, children nested one level deeper
    fn layout<'a>(&self, node: NodeRef<'a>, depth: usize) -> Vec<Step<'a>> {
        let ast = node.ast();
        let kind = node.kind();
        let depth = depth + 1;
        let mut steps = vec![Step::Text(format!("({}", kind.name))];

        for (field, slot) in kind.fields().iter().zip(node.slots()) {
            steps.push(Step::Text(format!("\n{}:{} ", self.current_indent(depth), field.name)));

            if let Some(value) = inline_slot(slot) {
                steps.push(Step::Text(value));
                continue;
            }
            match slot {
                Slot::Child(Some(id)) => steps.push(match ast.get(*id) {
                    Ok(child) => Step::Node(child, depth),
                    Err(_) => Step::Text("nil".to_string()),
                }),
                Slot::Children(ids) => {
                    steps.push(Step::Text("(".to_string()));
                    for child in ids.iter().filter_map(|id| ast.get(*id).ok()) {
                        steps.push(Step::Text(format!("\n{}", self.current_indent(depth + 1))));
                        steps.push(Step::Node(child, depth + 1));
                    }
                    steps.push(Step::Text(")".to_string()));
                }
                Slot::Attr(_) | Slot::Child(None) => {}
            }
        }

        steps.push(Step::Text(")".to_string()));
        steps
    }

    fn is_leaf(&self, node: NodeRef<'_>) -> bool {
        node.slots().iter().all(|slot| inline_slot(slot).is_some())
    }

    fn current_indent(&self, depth: usize) -> String {
        " ".repeat(depth * self.indent)
    }
}

/// Text for slots that hold no nodes
fn inline_slot(slot: &Slot) -> Option<String> {
    match slot {
        Slot::Attr(value) => Some(print_scalar(value)),
        Slot::Child(None) => Some("nil".to_string()),
        Slot::Children(ids) if ids.is_empty() => Some("()".to_string()),
        Slot::Child(Some(_)) | Slot::Children(_) => None,
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

fn print_scalar(value: &Scalar) -> String {
    match value {
        Scalar::Str(s) => format!("\"{}\"", escape_string(s)),
        Scalar::Int(n) => n.to_string(),
        Scalar::None => "nil".to_string(),
    }
}

/// Escape special characters in a string
fn escape_string(s: &str) -> String {
    s.chars()
        .flat_map(|ch| match ch {
            '\n' => vec!['\\', 'n'],
            '\t' => vec!['\\', 't'],
            '\r' => vec!['\\', 'r'],
            '\\' => vec!['\\', '\\'],
            '"' => vec!['\\', '"'],
            c => vec![c],
        })
        .collect()
}

/// Convenience function for dumping a node
pub fn print_node(node: NodeRef<'_>) -> String {
    Printer::new().print(node)
}
