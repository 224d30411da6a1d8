//! Diagnostics derived from resolution.
//!
//! Resolution itself never fails loudly; these are for callers that want to
//! warn about duplicate rule variables or report a reference that did not
//! bind.

use std::collections::HashSet;

use ksem_syntax::{NodeId, NodeKind, SourceFile, Span};

use crate::matcher::find_variable_declarations_in_rule;
use crate::resolver::Reference;

/// A resolution diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub span: Span,
}

impl ResolveError {
    pub fn new(kind: ResolveErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ResolveErrorKind::DuplicateVariable {
                name,
                previous_span,
            } => {
                write!(
                    f,
                    "[{}..{}] variable `{}` is declared again, first declared at [{}..{}]",
                    self.span.start, self.span.end, name, previous_span.start, previous_span.end,
                )
            }
            ResolveErrorKind::UnresolvedReference { reference } => {
                write!(
                    f,
                    "[{}..{}] cannot resolve {}",
                    self.span.start, self.span.end, reference
                )
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Specific kind of resolve diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveErrorKind {
    /// A rule declares the same variable more than once. References bind to
    /// the first declaration.
    DuplicateVariable { name: String, previous_span: Span },

    /// A reference bound to nothing.
    UnresolvedReference { reference: Reference },
}

/// One diagnostic per variable declaration in `rule` that repeats a name
/// already declared earlier in the same rule, in document order.
pub fn duplicate_variables(file: &SourceFile, rule: NodeId) -> Vec<ResolveError> {
    let Some(body) = file.tree.rule_body(rule) else {
        return vec![];
    };

    let mut seen = HashSet::new();
    let mut errors = vec![];
    for node in file.tree.descendants(body) {
        let Some(NodeKind::VarDec { id: Some(id), .. }) = file.tree.kind(node) else {
            continue;
        };
        if !seen.insert(id.as_str()) {
            continue;
        }

        let mut decls = find_variable_declarations_in_rule(file, body, id.as_str());
        let Some(first) = decls.next() else {
            continue;
        };
        for repeat in decls {
            errors.push(ResolveError::new(
                ResolveErrorKind::DuplicateVariable {
                    name: id.name.clone(),
                    previous_span: first.span,
                },
                repeat.span,
            ));
        }
    }

    errors.sort_by_key(|e| e.span.start);
    errors
}

/// Diagnostic for a reference at `span` that did not bind.
pub fn unresolved(reference: &Reference, span: Span) -> ResolveError {
    ResolveError::new(
        ResolveErrorKind::UnresolvedReference {
            reference: reference.clone(),
        },
        span,
    )
}
