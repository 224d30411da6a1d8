//! Tree construction for collaborators that already parsed a file.
//!
//! Two layers: `open`/`leaf`/`close` take explicit spans, for callers that
//! convert a real parse tree. The named helpers (`module`, `rule`, ...) lay
//! nodes out one after another with synthetic spans, which keeps fixtures
//! short while preserving document order.

use crate::common::*;
use crate::tree::{Node, NodeKind, SyntaxTree};

#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    open: Vec<NodeId>,
    cursor: u32,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Start a tree with its `File` root open.
    pub fn new() -> Self {
        let root = Node {
            kind: NodeKind::File,
            span: Span::new(0, 0),
            parent: None,
            children: vec![],
        };
        Self {
            nodes: vec![root],
            open: vec![NodeId(0)],
            cursor: 0,
        }
    }

    // ---- Explicit spans ----

    /// Open a container node starting at `start`.
    pub fn open(&mut self, kind: NodeKind, start: u32) -> NodeId {
        let id = self.push(kind, Span::new(start, start));
        self.open.push(id);
        id
    }

    /// Add a childless node.
    pub fn leaf(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.cursor = self.cursor.max(span.end);
        self.push(kind, span)
    }

    /// Close the innermost open container at `end`. The root is closed by
    /// [`finish`](Self::finish) only.
    pub fn close(&mut self, end: u32) {
        if self.open.len() <= 1 {
            return;
        }
        if let Some(id) = self.open.pop() {
            self.cursor = self.cursor.max(end);
            let node = &mut self.nodes[id.index()];
            node.span.end = end.max(node.span.start);
        }
    }

    /// Close every open node and hand out the snapshot.
    pub fn finish(mut self) -> SyntaxTree {
        let end = self.cursor;
        while self.open.len() > 1 {
            self.close(end);
        }
        self.nodes[0].span.end = end;
        SyntaxTree::from_nodes(self.nodes)
    }

    // ---- Synthetic spans ----

    pub fn require(&mut self, path: &str) -> NodeId {
        // require "path"
        let span = self.advance(path.len() as u32 + 10);
        self.leaf(
            NodeKind::Require {
                path: path.to_string(),
            },
            span,
        )
    }

    pub fn module(&mut self, name: &str, body: impl FnOnce(&mut Self)) -> NodeId {
        let start = self.cursor;
        let ident = Ident::new(name, self.advance_from(start + 7, name.len() as u32));
        let id = self.open(NodeKind::Module { name: ident }, start);
        body(self);
        let end = self.advance(9).end;
        self.close(end);
        id
    }

    pub fn syntax(&mut self, sort: &str) -> NodeId {
        let start = self.cursor;
        let ident = Ident::new(sort, self.advance_from(start + 7, sort.len() as u32));
        self.leaf(NodeKind::Syntax { sort: ident }, Span::new(start, self.cursor))
    }

    /// A production declaring every name in `labels`.
    pub fn production(&mut self, labels: &[&str]) -> NodeId {
        let start = self.cursor;
        let labels = labels
            .iter()
            .map(|label| Ident::new(*label, self.advance(label.len() as u32)))
            .collect();
        self.leaf(NodeKind::Production { labels }, Span::new(start, self.cursor))
    }

    /// A rule whose body is filled by `body`.
    pub fn rule(&mut self, body: impl FnOnce(&mut Self)) -> NodeId {
        let start = self.cursor;
        let id = self.open(NodeKind::Rule, start);
        self.advance(5);
        let body_start = self.cursor;
        self.open(NodeKind::RuleBody, body_start);
        body(self);
        let end = self.cursor;
        self.close(end);
        self.close(end);
        id
    }

    /// `name:sort`, or just `name` when the sort is omitted.
    pub fn var_dec(&mut self, name: &str, sort: Option<&str>) -> NodeId {
        let start = self.cursor;
        let id = Ident::new(name, self.advance(name.len() as u32));
        let sort = sort.map(|s| Ident::new(s, self.advance(s.len() as u32)));
        self.leaf(
            NodeKind::VarDec {
                id: Some(id),
                sort,
            },
            Span::new(start, self.cursor),
        )
    }

    /// A variable declaration with no identifier, as left by error recovery.
    pub fn anonymous_var_dec(&mut self, sort: &str) -> NodeId {
        let start = self.cursor;
        let sort = Ident::new(sort, self.advance(sort.len() as u32 + 1));
        self.leaf(
            NodeKind::VarDec {
                id: None,
                sort: Some(sort),
            },
            Span::new(start, self.cursor),
        )
    }

    /// A generic node with `text`, whose children are added by `children`.
    pub fn term(&mut self, text: &str, children: impl FnOnce(&mut Self)) -> NodeId {
        let start = self.cursor;
        let id = self.open(
            NodeKind::Term {
                text: text.to_string(),
            },
            start,
        );
        self.advance(text.len() as u32);
        children(self);
        let end = self.cursor;
        self.close(end);
        id
    }

    /// A reference site: a childless term. Returns its id so tests can
    /// resolve from it.
    pub fn reference(&mut self, text: &str) -> NodeId {
        let span = self.advance(text.len() as u32);
        self.leaf(
            NodeKind::Term {
                text: text.to_string(),
            },
            span,
        )
    }

    // ---- Internals ----

    fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = self.open.last().copied();
        self.nodes.push(Node {
            kind,
            span,
            parent,
            children: vec![],
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    /// Reserve `len` bytes plus a separating space.
    fn advance(&mut self, len: u32) -> Span {
        let start = self.cursor;
        self.advance_from(start, len)
    }

    fn advance_from(&mut self, start: u32, len: u32) -> Span {
        let span = Span::new(start, start + len);
        self.cursor = span.end + 1;
        span
    }
}
