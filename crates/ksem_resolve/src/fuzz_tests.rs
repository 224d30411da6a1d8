// Property tests for resolution.
//
// Random rule bodies and label tokens; checks first-wins binding, label
// normalization and that repeated resolution is stable.

use ksem_syntax::{NodeId, TreeBuilder};
use proptest::prelude::*;

use crate::candidates::Candidates;
use crate::index::MemoryIndex;
use crate::resolver::{resolve, Reference, ReferenceOccurrence, Resolver};

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z_+*-]{1,8}"
}

fn var_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["X", "Y", "Z", "Xs", "Rest"]).prop_map(String::from)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn label_with_separator_yields_three(
        quote in prop::sample::select(vec!['`', '\'', '#']),
        head in segment(),
        tail in segment(),
    ) {
        let raw = format!("{}{}`{}", quote, head, tail);
        let candidates = Candidates::label(&raw, '`');
        let names: Vec<_> = candidates.iter().collect();
        prop_assert_eq!(names.len(), 3);
        prop_assert_eq!(names[0], raw.as_str());
        prop_assert_eq!(names[1], &raw[quote.len_utf8()..]);
        prop_assert_eq!(names[2], head.as_str());
    }

    #[test]
    fn label_without_separator_yields_two(head in segment()) {
        let raw = format!("'{}", head);
        let candidates = Candidates::label(&raw, '`');
        prop_assert_eq!(candidates.len(), 2);
        prop_assert!(candidates.contains(&head));
    }

    #[test]
    fn variable_binds_to_first_in_document_order(
        names in prop::collection::vec(var_name(), 0..12),
        wanted in var_name(),
    ) {
        let mut b = TreeBuilder::new();
        let mut decls = vec![];
        let mut site = NodeId(0);
        b.rule(|b| {
            for name in &names {
                decls.push(b.var_dec(name, Some("K")));
            }
            site = b.reference(&wanted);
        });
        let mut index = MemoryIndex::new();
        let f = index.add_file("file:///p.k", None, b.finish());

        let occurrence = ReferenceOccurrence::new(f, site, Reference::Variable(wanted.clone()));
        let expected = names.iter().position(|n| *n == wanted).map(|i| decls[i]);
        let result = resolve(&index, &occurrence);
        prop_assert_eq!(result.declaration().map(|d| d.node), expected);

        let all = Resolver::new(&index).variable_declarations(f, site, &wanted);
        prop_assert_eq!(all.len(), names.iter().filter(|n| **n == wanted).count());
    }

    #[test]
    fn resolution_is_stable_and_names_a_candidate(
        labels in prop::collection::vec(segment(), 1..6),
        pick in any::<prop::sample::Index>(),
        suffix in segment(),
    ) {
        let mut b = TreeBuilder::new();
        let site = b.reference("site");
        for label in &labels {
            b.production(&[label.as_str()]);
        }
        let mut index = MemoryIndex::new();
        let f = index.add_file("file:///p.k", None, b.finish());

        let target = pick.get(&labels);
        let raw = format!("`{}`{}", target, suffix);
        let occurrence = ReferenceOccurrence::new(f, site, Reference::Label(raw.clone()));

        let first = resolve(&index, &occurrence);
        let second = resolve(&index, &occurrence);
        prop_assert_eq!(&first, &second);

        let found = first.into_declaration();
        prop_assert!(found.is_some());
        let candidates = Candidates::label(&raw, '`');
        let found = found.unwrap();
        prop_assert!(found.names.iter().any(|n| candidates.contains(n)));
    }
}
