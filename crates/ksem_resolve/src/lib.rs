//! K name resolution: links references in `.k` files to their declarations.
//!
//! Each reference kind has its own scope rule. Rule variables are looked up in
//! the body of the enclosing rule. Productions, labels and sorts are looked up
//! in the referencing file when it has no `require`, and in every file of its
//! module otherwise. The first declaration found wins.

pub mod candidates;
pub mod config;
pub mod errors;
pub mod index;
pub mod matcher;
pub mod resolver;
pub mod scope;

pub use candidates::Candidates;
pub use config::{ConfigError, ImportScopePolicy, ResolverConfig};
pub use errors::{duplicate_variables, unresolved, ResolveError, ResolveErrorKind};
pub use index::{ContentScope, FileIndex, MemoryIndex, ModuleId};
pub use matcher::{find_first_match, find_variable_declarations_in_rule};
pub use resolver::{
    find_syntax_defs, module_of_file, resolve, Reference, ReferenceOccurrence, ResolutionResult,
    Resolver,
};
pub use scope::{enclosing_rule, DeclKind, Declaration, ScopeResolver, SearchSpace};

#[cfg(test)]
mod fuzz_tests;
