//! Name matching: walk the declarations of a search space in order and stop
//! at the first one declaring a candidate name.

use ksem_syntax::{NodeId, SourceFile};
use tracing::trace;

use crate::candidates::Candidates;
use crate::index::FileIndex;
use crate::scope::{declared_names, enclosing_rule, DeclKind, Declaration, SearchSpace};

/// First declaration of `kind` in `space` that declares any of `candidates`.
///
/// Files are visited in the order the space lists them; inside a file,
/// declarations are visited in document order. Files whose handle no
/// longer yields a tree are skipped.
pub fn find_first_match<I: FileIndex + ?Sized>(
    index: &I,
    space: &SearchSpace,
    candidates: &Candidates,
    kind: DeclKind,
) -> Option<Declaration> {
    if candidates.is_empty() {
        return None;
    }
    match space {
        SearchSpace::Empty => None,
        SearchSpace::RuleBody { file, body } => first_in_subtree(file, *body, candidates, kind),
        SearchSpace::File(file) => first_in_subtree(file, file.tree.root(), candidates, kind),
        SearchSpace::Module { files, .. } => files.iter().find_map(|&id| match index.parse(id) {
            Some(file) => first_in_subtree(&file, file.tree.root(), candidates, kind),
            None => {
                trace!(file = ?id, "skipping stale file handle");
                None
            }
        }),
    }
}

fn first_in_subtree(
    file: &SourceFile,
    root: NodeId,
    candidates: &Candidates,
    kind: DeclKind,
) -> Option<Declaration> {
    file.tree
        .descendants(root)
        .find(|&id| {
            file.tree
                .kind(id)
                .and_then(|k| declared_names(k, kind))
                .is_some_and(|names| candidates.matches_any(names))
        })
        .and_then(|id| Declaration::from_node(file, id, kind))
}

/// Every variable declaration named exactly `name` in the rule enclosing
/// `element`, in document order. Empty when `element` is outside any rule.
///
/// The iterator is lazy; clone it to walk the same list again.
pub fn find_variable_declarations_in_rule<'a>(
    file: &'a SourceFile,
    element: NodeId,
    name: &'a str,
) -> impl Iterator<Item = Declaration> + Clone + 'a {
    let body = enclosing_rule(&file.tree, element).and_then(|rule| file.tree.rule_body(rule));
    body.into_iter()
        .flat_map(move |body| file.tree.descendants(body))
        .filter(move |&id| {
            file.tree
                .kind(id)
                .and_then(|k| declared_names(k, DeclKind::Variable))
                .is_some_and(|names| names.contains(&name))
        })
        .filter_map(move |id| Declaration::from_node(file, id, DeclKind::Variable))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ksem_syntax::{FileId, TreeBuilder};

    use super::*;
    use crate::index::{MemoryIndex, ModuleId};

    #[test]
    fn test_empty_candidates_never_match() {
        let mut b = TreeBuilder::new();
        b.production(&["f"]);
        let file = Arc::new(SourceFile::new(FileId(0), "file:///a.k", b.finish()));
        let index = MemoryIndex::new();
        let space = SearchSpace::File(file);
        assert!(find_first_match(&index, &space, &Candidates::default(), DeclKind::Production).is_none());
    }

    #[test]
    fn test_kind_filter() {
        let mut b = TreeBuilder::new();
        b.syntax("Exp");
        b.production(&["Exp"]);
        let file = Arc::new(SourceFile::new(FileId(0), "file:///a.k", b.finish()));
        let index = MemoryIndex::new();
        let space = SearchSpace::File(file);
        let names = Candidates::single("Exp");

        let sort = find_first_match(&index, &space, &names, DeclKind::Sort).unwrap();
        let prod = find_first_match(&index, &space, &names, DeclKind::Production).unwrap();
        assert_eq!(sort.kind, DeclKind::Sort);
        assert_eq!(prod.kind, DeclKind::Production);
        assert_ne!(sort.node, prod.node);
        assert!(find_first_match(&index, &space, &names, DeclKind::Variable).is_none());
    }

    #[test]
    fn test_any_label_matches() {
        let mut b = TreeBuilder::new();
        let prod = b.production(&["_+_", "plus", "add"]);
        let file = Arc::new(SourceFile::new(FileId(0), "file:///a.k", b.finish()));
        let index = MemoryIndex::new();
        let space = SearchSpace::File(file);

        let found = find_first_match(&index, &space, &Candidates::single("add"), DeclKind::Label);
        assert_eq!(found.map(|d| d.node), Some(prod));
    }

    #[test]
    fn test_module_skips_stale_and_keeps_order() {
        let mut index = MemoryIndex::new();
        let m = index.add_module("m");
        let mut b = TreeBuilder::new();
        b.production(&["g"]);
        let stale = index.add_file("file:///m/stale.k", Some(m), b.finish());
        let mut b = TreeBuilder::new();
        b.production(&["g"]);
        let first_live = index.add_file("file:///m/one.k", Some(m), b.finish());
        let mut b = TreeBuilder::new();
        b.production(&["g"]);
        let second_live = index.add_file("file:///m/two.k", Some(m), b.finish());
        index.invalidate(stale);

        let space = SearchSpace::Module {
            module: m,
            files: vec![stale, first_live, second_live],
        };
        let found = find_first_match(&index, &space, &Candidates::single("g"), DeclKind::Production);
        assert_eq!(found.map(|d| d.file), Some(first_live));
    }

    #[test]
    fn test_unknown_handle_in_module_is_skipped() {
        let index = MemoryIndex::new();
        let space = SearchSpace::Module {
            module: ModuleId(0),
            files: vec![FileId(77)],
        };
        assert!(find_first_match(&index, &space, &Candidates::single("g"), DeclKind::Production).is_none());
    }

    #[test]
    fn test_variable_declarations_in_rule_lists_all() {
        let mut b = TreeBuilder::new();
        let mut site = NodeId(0);
        let mut first = NodeId(0);
        let mut second = NodeId(0);
        b.rule(|b| {
            first = b.var_dec("X", Some("Int"));
            b.var_dec("Y", Some("Int"));
            b.term("+", |b| {
                second = b.var_dec("X", Some("Int"));
                site = b.reference("X");
            });
        });
        let file = SourceFile::new(FileId(0), "file:///a.k", b.finish());

        let decls = find_variable_declarations_in_rule(&file, site, "X");
        let nodes: Vec<_> = decls.clone().map(|d| d.node).collect();
        assert_eq!(nodes, vec![first, second]);
        assert_eq!(decls.count(), 2);
    }

    #[test]
    fn test_variable_declarations_outside_rule() {
        let mut b = TreeBuilder::new();
        b.var_dec("X", Some("Int"));
        let site = b.reference("X");
        let file = SourceFile::new(FileId(0), "file:///a.k", b.finish());
        assert_eq!(find_variable_declarations_in_rule(&file, site, "X").count(), 0);
    }

    #[test]
    fn test_variable_names_are_exact() {
        let mut b = TreeBuilder::new();
        let mut site = NodeId(0);
        b.rule(|b| {
            b.var_dec("Xs", Some("List"));
            b.var_dec("x", Some("Int"));
            b.anonymous_var_dec("Int");
            site = b.reference("X");
        });
        let file = SourceFile::new(FileId(0), "file:///a.k", b.finish());
        assert_eq!(find_variable_declarations_in_rule(&file, site, "X").count(), 0);
    }
}
