//! Reference binding: the public entry point that turns a reference
//! occurrence into at most one declaration.

use std::fmt;
use std::sync::Arc;

use ksem_syntax::{FileId, NodeId, SourceFile};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::candidates::Candidates;
use crate::config::ResolverConfig;
use crate::index::{ContentScope, FileIndex, ModuleId};
use crate::matcher::{find_first_match, find_variable_declarations_in_rule};
use crate::scope::{declared_names, DeclKind, Declaration, ScopeResolver, SearchSpace};

/// What is being referred to, with the raw text at the reference site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reference {
    /// A rule variable.
    Variable(String),
    /// A production used as an auxiliary function.
    AuxFunction(String),
    /// A quoted label, normalized before lookup.
    Label(String),
    /// A sort, bound to its `syntax` declaration.
    SortSyntax(String),
}

impl Reference {
    pub fn raw_name(&self) -> &str {
        match self {
            Reference::Variable(name)
            | Reference::AuxFunction(name)
            | Reference::Label(name)
            | Reference::SortSyntax(name) => name,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Reference::Variable(_) => "variable",
            Reference::AuxFunction(_) => "function",
            Reference::Label(_) => "label",
            Reference::SortSyntax(_) => "sort",
        }
    }

    /// Kind of declaration this reference can bind to.
    pub fn target_kind(&self) -> DeclKind {
        match self {
            Reference::Variable(_) => DeclKind::Variable,
            Reference::AuxFunction(_) => DeclKind::Production,
            Reference::Label(_) => DeclKind::Label,
            Reference::SortSyntax(_) => DeclKind::Sort,
        }
    }

    /// Names a declaration may carry to match this reference.
    pub fn candidates(&self, config: &ResolverConfig) -> Candidates {
        match self {
            Reference::Label(raw) => Candidates::label(raw, config.label_separator),
            other => Candidates::single(other.raw_name()),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind_name(), self.raw_name())
    }
}

/// A reference at a position in a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceOccurrence {
    pub file: FileId,
    pub node: NodeId,
    pub reference: Reference,
}

impl ReferenceOccurrence {
    pub fn new(file: FileId, node: NodeId, reference: Reference) -> Self {
        Self {
            file,
            node,
            reference,
        }
    }
}

/// Outcome of resolving one reference: zero or one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolutionResult {
    declaration: Option<Declaration>,
}

impl ResolutionResult {
    pub fn unresolved() -> Self {
        Self { declaration: None }
    }

    pub fn resolved(declaration: Declaration) -> Self {
        Self {
            declaration: Some(declaration),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.declaration.is_some()
    }

    pub fn declaration(&self) -> Option<&Declaration> {
        self.declaration.as_ref()
    }

    pub fn into_declaration(self) -> Option<Declaration> {
        self.declaration
    }

    pub fn len(&self) -> usize {
        usize::from(self.is_resolved())
    }

    pub fn is_empty(&self) -> bool {
        !self.is_resolved()
    }
}

impl From<Option<Declaration>> for ResolutionResult {
    fn from(declaration: Option<Declaration>) -> Self {
        Self { declaration }
    }
}

/// Why a reference did not bind. Logged only; callers see an unresolved
/// result either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissReason {
    NoScope,
    NoMatch,
    StaleHandle,
}

/// Binds references against the files of a [`FileIndex`].
///
/// Holds no state between calls: resolving the same occurrence twice against
/// the same snapshots gives the same result.
pub struct Resolver<'a, I: FileIndex + ?Sized> {
    index: &'a I,
    config: ResolverConfig,
}

impl<'a, I: FileIndex + ?Sized> Resolver<'a, I> {
    pub fn new(index: &'a I) -> Self {
        Self::with_config(index, ResolverConfig::default())
    }

    pub fn with_config(index: &'a I, config: ResolverConfig) -> Self {
        Self { index, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve one reference.
    pub fn resolve(&self, occurrence: &ReferenceOccurrence) -> ResolutionResult {
        let Some(file) = self.index.parse(occurrence.file) else {
            return self.miss(occurrence, MissReason::StaleHandle);
        };

        let space = self.search_space_in(file, occurrence);
        if space.is_empty() {
            return self.miss(occurrence, MissReason::NoScope);
        }

        let reference = &occurrence.reference;
        let candidates = reference.candidates(&self.config);
        match find_first_match(self.index, &space, &candidates, reference.target_kind()) {
            Some(declaration) => {
                debug!(
                    reference = %reference,
                    scope = space.label(),
                    file = ?declaration.file,
                    node = ?declaration.node,
                    "resolved"
                );
                ResolutionResult::resolved(declaration)
            }
            None => self.miss(occurrence, MissReason::NoMatch),
        }
    }

    /// Resolve each occurrence independently, in order.
    pub fn resolve_many<'o>(
        &self,
        occurrences: impl IntoIterator<Item = &'o ReferenceOccurrence>,
    ) -> Vec<ResolutionResult> {
        occurrences.into_iter().map(|o| self.resolve(o)).collect()
    }

    /// The search space `occurrence` would be resolved in, or `None` if its
    /// file has no live tree.
    pub fn search_space(&self, occurrence: &ReferenceOccurrence) -> Option<SearchSpace> {
        let file = self.index.parse(occurrence.file)?;
        Some(self.search_space_in(file, occurrence))
    }

    /// Every variable declaration named `name` in the rule around `element`,
    /// before "first wins" is applied. Useful for duplicate warnings.
    pub fn variable_declarations(
        &self,
        file: FileId,
        element: NodeId,
        name: &str,
    ) -> Vec<Declaration> {
        match self.index.parse(file) {
            Some(source) => find_variable_declarations_in_rule(&source, element, name).collect(),
            None => vec![],
        }
    }

    fn search_space_in(&self, file: Arc<SourceFile>, occurrence: &ReferenceOccurrence) -> SearchSpace {
        let scopes = ScopeResolver::new(self.index, &self.config);
        match occurrence.reference {
            Reference::Variable(_) => scopes.rule_scope(file, occurrence.node),
            Reference::AuxFunction(_) | Reference::Label(_) | Reference::SortSyntax(_) => {
                scopes.declaration_scope(file)
            }
        }
    }

    fn miss(&self, occurrence: &ReferenceOccurrence, reason: MissReason) -> ResolutionResult {
        debug!(
            reference = %occurrence.reference,
            file = ?occurrence.file,
            node = ?occurrence.node,
            reason = ?reason,
            "unresolved"
        );
        ResolutionResult::unresolved()
    }
}

/// Resolve `occurrence` with the default configuration.
pub fn resolve<I: FileIndex + ?Sized>(index: &I, occurrence: &ReferenceOccurrence) -> ResolutionResult {
    Resolver::new(index).resolve(occurrence)
}

/// Every production in the project, or only those declaring `name`.
/// Files are visited in index order, declarations in document order.
pub fn find_syntax_defs<I: FileIndex + ?Sized>(index: &I, name: Option<&str>) -> Vec<Declaration> {
    let mut found = vec![];
    for id in index.files_in_scope(&ContentScope::Project) {
        let Some(file) = index.parse(id) else {
            continue;
        };
        for node in file.tree.descendants(file.tree.root()) {
            let matches = file
                .tree
                .kind(node)
                .and_then(|k| declared_names(k, DeclKind::Production))
                .is_some_and(|names| name.map_or(true, |n| names.contains(&n)));
            if matches {
                found.extend(Declaration::from_node(&file, node, DeclKind::Production));
            }
        }
    }
    found
}

/// Module of `file`, as reported by the index.
pub fn module_of_file<I: FileIndex + ?Sized>(index: &I, file: FileId) -> Option<ModuleId> {
    index.module_of(file)
}
