//! Search spaces: where a reference is allowed to find its declaration.

use std::sync::Arc;

use ksem_syntax::{FileId, NodeId, NodeKind, SourceFile, Span, SyntaxTree};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{ImportScopePolicy, ResolverConfig};
use crate::index::{FileIndex, ModuleId};

/// What kind of declaration this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclKind {
    /// Typed variable inside a rule body.
    Variable,
    /// A production, found by one of its names.
    Production,
    /// A production, found through a label.
    Label,
    /// A `syntax` sort declaration.
    Sort,
}

/// A resolved declaration. It points into the snapshot it was read from by
/// handle and is valid only as long as that snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Declaration {
    pub file: FileId,
    pub node: NodeId,
    pub kind: DeclKind,
    pub span: Span,
    /// Every name the node declares. A production may have several labels.
    pub names: Vec<String>,
}

impl Declaration {
    /// Read the declaration at `node`, or `None` if `node` declares nothing
    /// of `kind`.
    pub fn from_node(file: &SourceFile, node: NodeId, kind: DeclKind) -> Option<Self> {
        let n = file.tree.node(node)?;
        let names = declared_names(&n.kind, kind)?;
        Some(Self {
            file: file.id,
            node,
            kind,
            span: n.span,
            names: names.into_iter().map(String::from).collect(),
        })
    }

    pub fn declares(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Names `kind` declares when read as a declaration of `decl`.
pub(crate) fn declared_names(kind: &NodeKind, decl: DeclKind) -> Option<Vec<&str>> {
    match (kind, decl) {
        (NodeKind::VarDec { id, .. }, DeclKind::Variable) => {
            id.as_ref().map(|id| vec![id.as_str()])
        }
        (NodeKind::Production { labels }, DeclKind::Production | DeclKind::Label) => {
            Some(labels.iter().map(|l| l.as_str()).collect())
        }
        (NodeKind::Syntax { sort }, DeclKind::Sort) => Some(vec![sort.as_str()]),
        _ => None,
    }
}

/// The region searched for one reference.
#[derive(Debug, Clone)]
pub enum SearchSpace {
    /// No enclosing rule: nothing can match.
    Empty,
    /// The body of the rule enclosing a variable reference.
    RuleBody { file: Arc<SourceFile>, body: NodeId },
    /// The referencing file alone.
    File(Arc<SourceFile>),
    /// Every file of the referencing file's module, in index order.
    Module { module: ModuleId, files: Vec<FileId> },
}

impl SearchSpace {
    pub fn is_empty(&self) -> bool {
        match self {
            SearchSpace::Empty => true,
            SearchSpace::Module { files, .. } => files.is_empty(),
            _ => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchSpace::Empty => "empty",
            SearchSpace::RuleBody { .. } => "rule",
            SearchSpace::File(_) => "file",
            SearchSpace::Module { .. } => "module",
        }
    }
}

/// Innermost `Rule` around `node`, `node` included. The walk stops at the
/// first module or file boundary.
pub fn enclosing_rule(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.ancestors(node)
        .find(|&id| {
            matches!(
                tree.kind(id),
                Some(NodeKind::Rule | NodeKind::Module { .. } | NodeKind::File)
            )
        })
        .filter(|&id| matches!(tree.kind(id), Some(NodeKind::Rule)))
}

/// Computes search spaces from a file index and the resolver settings.
pub struct ScopeResolver<'a, I: FileIndex + ?Sized> {
    index: &'a I,
    config: &'a ResolverConfig,
}

impl<'a, I: FileIndex + ?Sized> ScopeResolver<'a, I> {
    pub fn new(index: &'a I, config: &'a ResolverConfig) -> Self {
        Self { index, config }
    }

    /// Scope of a variable reference at `node`.
    pub fn rule_scope(&self, file: Arc<SourceFile>, node: NodeId) -> SearchSpace {
        let body = enclosing_rule(&file.tree, node).and_then(|rule| file.tree.rule_body(rule));
        match body {
            Some(body) => SearchSpace::RuleBody { file, body },
            None => {
                trace!(file = ?file.id, node = ?node, "no enclosing rule");
                SearchSpace::Empty
            }
        }
    }

    /// Scope of a production, label or sort reference from `file`. Depends
    /// on the file's `require` statements, never on the reference position.
    pub fn declaration_scope(&self, file: Arc<SourceFile>) -> SearchSpace {
        let module_wide = file.has_requires()
            || (self.config.import_scope == ImportScopePolicy::ModuleWhenRequiredBy
                && self.is_required_in_module(&file));
        if !module_wide {
            trace!(file = ?file.id, "file scope");
            return SearchSpace::File(file);
        }

        match self.index.module_of(file.id) {
            Some(module) => {
                let scope = self.index.content_scope_of(module);
                let files = self.index.files_in_scope(&scope);
                trace!(file = ?file.id, module = ?module, files = files.len(), "module scope");
                SearchSpace::Module { module, files }
            }
            None => {
                trace!(file = ?file.id, "file belongs to no module, falling back to file scope");
                SearchSpace::File(file)
            }
        }
    }

    // Whether another file of the same module names `file` in a `require`.
    fn is_required_in_module(&self, file: &SourceFile) -> bool {
        let Some(module) = self.index.module_of(file.id) else {
            return false;
        };
        let scope = self.index.content_scope_of(module);
        self.index
            .files_in_scope(&scope)
            .into_iter()
            .filter(|&other| other != file.id)
            .filter_map(|other| self.index.parse(other))
            .any(|other| other.requires().any(|path| require_names(path, &file.uri)))
    }
}

/// Whether a `require` path designates the file at `uri`. Leading `./` and
/// `../` segments are ignored and the rest must match whole trailing path
/// segments of the URI.
pub(crate) fn require_names(path: &str, uri: &str) -> bool {
    let mut path = path.trim();
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix("../") {
            path = rest;
        } else {
            break;
        }
    }
    if path.is_empty() || !uri.ends_with(path) {
        return false;
    }
    let head = &uri[..uri.len() - path.len()];
    head.is_empty() || head.ends_with('/')
}
