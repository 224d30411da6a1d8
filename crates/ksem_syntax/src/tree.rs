//! Tree snapshot: an arena of nodes with parent links and ordered children.

use crate::common::*;

/// What a node is. The set is closed; anything the resolver does not care
/// about is a `Term`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of every tree.
    File,
    /// `require "path"` statement.
    Require { path: String },
    /// `module NAME ... endmodule`.
    Module { name: Ident },
    /// `syntax Sort` declaration.
    Syntax { sort: Ident },
    /// A regular production. Every label is a declared name.
    Production { labels: Vec<Ident> },
    /// `rule ...`.
    Rule,
    /// The body of a rule, where typed variables live.
    RuleBody,
    /// Typed variable declaration, `X:Sort`. A malformed one may lack its id.
    VarDec {
        id: Option<Ident>,
        sort: Option<Ident>,
    },
    /// Any other node.
    Term { text: String },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Require { .. } => "require",
            NodeKind::Module { .. } => "module",
            NodeKind::Syntax { .. } => "syntax",
            NodeKind::Production { .. } => "production",
            NodeKind::Rule => "rule",
            NodeKind::RuleBody => "rule body",
            NodeKind::VarDec { .. } => "variable declaration",
            NodeKind::Term { .. } => "term",
        }
    }
}

/// A single node in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// One immutable tree. Node 0 is always the `File` root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.node(id).map(|n| n.span)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `id` itself, then each parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        let next = self.node(id).map(|_| id);
        Ancestors { tree: self, next }
    }

    /// Pre-order walk of the subtree rooted at `id`, `id` included.
    /// Pre-order is document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = if self.node(id).is_some() { vec![id] } else { vec![] };
        Descendants { tree: self, stack }
    }

    /// Top-level `require` statements in source order.
    pub fn requires(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.children(self.root()).iter().filter_map(move |&id| match self.kind(id) {
            Some(NodeKind::Require { path }) => Some((id, path.as_str())),
            _ => None,
        })
    }

    /// The body node of a rule, if the rule has one.
    pub fn rule_body(&self, rule: NodeId) -> Option<NodeId> {
        if !matches!(self.kind(rule), Some(NodeKind::Rule)) {
            return None;
        }
        self.children(rule)
            .iter()
            .copied()
            .find(|&c| matches!(self.kind(c), Some(NodeKind::RuleBody)))
    }

    /// Innermost node whose span contains `offset`.
    pub fn node_at(&self, offset: u32) -> Option<NodeId> {
        let mut current = self.root();
        if !self.node(current)?.span.contains(offset) {
            return None;
        }
        'descend: loop {
            for &child in self.children(current) {
                if self.nodes[child.index()].span.contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }
}

/// Iterator returned by [`SyntaxTree::ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors<'t> {
    tree: &'t SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Iterator returned by [`SyntaxTree::descendants`]. Cloning restarts from
/// the same point.
#[derive(Debug, Clone)]
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}

/// A parsed file: its handle, its URI and the tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub id: FileId,
    pub uri: String,
    pub tree: SyntaxTree,
}

impl SourceFile {
    pub fn new(id: FileId, uri: impl Into<String>, tree: SyntaxTree) -> Self {
        Self {
            id,
            uri: uri.into(),
            tree,
        }
    }

    pub fn requires(&self) -> impl Iterator<Item = &str> + '_ {
        self.tree.requires().map(|(_, path)| path)
    }

    pub fn has_requires(&self) -> bool {
        self.tree.requires().next().is_some()
    }
}
