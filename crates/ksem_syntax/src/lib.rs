//! K syntax trees: immutable per-snapshot views of parsed definition files.
//!
//! This crate holds no parsing logic. A collaborator parses `.k` files and
//! hands the result over as a [`SourceFile`], either by building one with
//! [`TreeBuilder`] or by converting its own tree. Every other crate in the
//! workspace only reads these snapshots.

pub mod builder;
pub mod common;
pub mod tree;

pub use builder::TreeBuilder;
pub use common::{FileId, Ident, NodeId, Span};
pub use tree::{Ancestors, Descendants, Node, NodeKind, SourceFile, SyntaxTree};
