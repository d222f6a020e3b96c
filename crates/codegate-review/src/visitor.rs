//! Syntax-tree visitors
//!
//! A small enter/leave fold over the parsed tree. Traversal uses the
//! tree cursor with an explicit loop, and the depth-sensitive visitors
//! carry their own accumulators, so traversal state stays inspectable
//! and is never implicit in the call stack.

use tree_sitter::Node;

/// Enter/leave hooks over a preorder walk
pub trait Visitor {
    /// Called when the walk enters `node`
    fn enter(&mut self, node: Node<'_>);

    /// Called when the walk leaves `node`
    fn leave(&mut self, _node: Node<'_>) {}
}

/// Walk the subtree rooted at `root`, firing enter/leave hooks
pub fn visit<V: Visitor>(root: Node<'_>, visitor: &mut V) {
    let mut cursor = root.walk();
    'outer: loop {
        visitor.enter(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        visitor.leave(cursor.node());
        loop {
            if cursor.goto_next_sibling() {
                continue 'outer;
            }
            if !cursor.goto_parent() {
                break 'outer;
            }
            visitor.leave(cursor.node());
        }
    }
}

fn is_loop(node: Node<'_>) -> bool {
    matches!(node.kind(), "for_statement" | "while_statement")
}

/// Tracks the deepest loop nesting seen
#[derive(Debug, Default)]
struct LoopDepth {
    depth: usize,
    max: usize,
}

impl Visitor for LoopDepth {
    fn enter(&mut self, node: Node<'_>) {
        if is_loop(node) {
            self.depth += 1;
            self.max = self.max.max(self.depth);
        }
    }

    fn leave(&mut self, node: Node<'_>) {
        if is_loop(node) {
            self.depth -= 1;
        }
    }
}

/// Maximum nesting depth of loop constructs under `root`
#[must_use]
pub fn max_loop_depth(root: Node<'_>) -> usize {
    let mut fold = LoopDepth::default();
    visit(root, &mut fold);
    fold.max
}

/// Records the first error or missing node
#[derive(Debug, Default)]
struct FirstError {
    line: Option<usize>,
}

impl Visitor for FirstError {
    fn enter(&mut self, node: Node<'_>) {
        if self.line.is_none() && (node.is_error() || node.is_missing()) {
            self.line = Some(node.start_position().row + 1);
        }
    }
}

/// 1-based line of the first syntax error under `root`, if any
#[must_use]
pub fn first_error_line(root: Node<'_>) -> Option<usize> {
    let mut fold = FirstError::default();
    visit(root, &mut fold);
    fold.line
}

/// Counts function and class definitions
#[derive(Debug, Default)]
pub struct DefinitionCounts {
    /// `def` statements
    pub functions: usize,
    /// `class` statements
    pub classes: usize,
}

impl Visitor for DefinitionCounts {
    fn enter(&mut self, node: Node<'_>) {
        match node.kind() {
            "function_definition" => self.functions += 1,
            "class_definition" => self.classes += 1,
            _ => {}
        }
    }
}

/// Facts about one function definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionFacts {
    /// Declared name, or `<anonymous>` when unreadable
    pub name: String,
    /// 1-based line of the `def`
    pub line: usize,
    /// `end line - start line`, matching the span heuristic
    pub line_span: usize,
    /// Whether the first body statement is a bare string literal
    pub has_docstring: bool,
}

struct FunctionCollector<'s> {
    source: &'s [u8],
    functions: Vec<FunctionFacts>,
}

impl Visitor for FunctionCollector<'_> {
    fn enter(&mut self, node: Node<'_>) {
        if node.kind() != "function_definition" {
            return;
        }
        let name = node
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(self.source).ok())
            .unwrap_or("<anonymous>")
            .to_string();
        self.functions.push(FunctionFacts {
            name,
            line: node.start_position().row + 1,
            line_span: node.end_position().row - node.start_position().row,
            has_docstring: has_docstring(node),
        });
    }
}

fn has_docstring(function: Node<'_>) -> bool {
    let Some(body) = function.child_by_field_name("body") else {
        return false;
    };
    // Comments are extras in the tree but not statements; skip them to
    // find the first real statement, the way an AST would.
    let mut index = 0;
    let first = loop {
        match body.named_child(index) {
            Some(child) if child.kind() == "comment" => index += 1,
            Some(child) => break child,
            None => return false,
        }
    };
    first.kind() == "expression_statement"
        && first
            .named_child(0)
            .is_some_and(|value| value.kind() == "string")
}

/// Every function definition under `root`, in source order
#[must_use]
pub fn collect_functions(root: Node<'_>, source: &[u8]) -> Vec<FunctionFacts> {
    let mut collector = FunctionCollector {
        source,
        functions: Vec::new(),
    };
    visit(root, &mut collector);
    collector.functions
}
