//! File index: the project-wide collaborator the resolver asks for files.
//!
//! The resolver never discovers files or modules itself. It receives a
//! [`FileIndex`] and asks it three things: the tree of a file, the files in a
//! content scope, and the module a file belongs to.

use std::fmt;
use std::sync::Arc;

use ksem_syntax::{FileId, SourceFile, SyntaxTree};
use serde::{Deserialize, Serialize};

/// Handle of a module (a named group of files from the build configuration).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(pub u32);

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

/// A set of files, as understood by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentScope {
    /// Files belonging to one module.
    Module(ModuleId),
    /// Every K file the index knows about.
    Project,
}

/// Capability the resolver is built on.
///
/// Implementations must be side-effect free from the resolver's point of
/// view. Enumeration order is up to the implementation but must be stable
/// for a given snapshot; the resolver always takes the first match in it.
pub trait FileIndex {
    /// The current tree of `file`, or `None` when the handle no longer maps
    /// to a live tree.
    fn parse(&self, file: FileId) -> Option<Arc<SourceFile>>;

    /// Files in `scope`, in the index's iteration order.
    fn files_in_scope(&self, scope: &ContentScope) -> Vec<FileId>;

    /// Module `file` belongs to, if any.
    fn module_of(&self, file: FileId) -> Option<ModuleId>;

    fn content_scope_of(&self, module: ModuleId) -> ContentScope {
        ContentScope::Module(module)
    }
}

impl<T: FileIndex + ?Sized> FileIndex for &T {
    fn parse(&self, file: FileId) -> Option<Arc<SourceFile>> {
        (**self).parse(file)
    }

    fn files_in_scope(&self, scope: &ContentScope) -> Vec<FileId> {
        (**self).files_in_scope(scope)
    }

    fn module_of(&self, file: FileId) -> Option<ModuleId> {
        (**self).module_of(file)
    }

    fn content_scope_of(&self, module: ModuleId) -> ContentScope {
        (**self).content_scope_of(module)
    }
}

#[derive(Debug)]
struct IndexedFile {
    uri: String,
    module: Option<ModuleId>,
    source: Option<Arc<SourceFile>>,
}

/// In-memory [`FileIndex`] over trees the caller already holds. Files are
/// enumerated in insertion order.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    files: Vec<IndexedFile>,
    modules: Vec<String>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module and return its handle.
    pub fn add_module(&mut self, name: impl Into<String>) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(name.into());
        id
    }

    pub fn module_name(&self, module: ModuleId) -> Option<&str> {
        self.modules.get(module.0 as usize).map(|s| s.as_str())
    }

    /// Register a file with its first snapshot.
    pub fn add_file(
        &mut self,
        uri: impl Into<String>,
        module: Option<ModuleId>,
        tree: SyntaxTree,
    ) -> FileId {
        let id = FileId(self.files.len() as u32);
        let uri = uri.into();
        let source = Arc::new(SourceFile::new(id, uri.clone(), tree));
        self.files.push(IndexedFile {
            uri,
            module,
            source: Some(source),
        });
        id
    }

    /// Install a new snapshot for `file`. Snapshots handed out earlier stay
    /// valid for whoever holds them.
    pub fn replace_tree(&mut self, file: FileId, tree: SyntaxTree) -> bool {
        match self.files.get_mut(file.index()) {
            Some(entry) => {
                entry.source = Some(Arc::new(SourceFile::new(file, entry.uri.clone(), tree)));
                true
            }
            None => false,
        }
    }

    /// Drop the tree of `file` but keep listing it, leaving a stale handle.
    pub fn invalidate(&mut self, file: FileId) -> bool {
        match self.files.get_mut(file.index()) {
            Some(entry) => {
                entry.source = None;
                true
            }
            None => false,
        }
    }

    pub fn uri(&self, file: FileId) -> Option<&str> {
        self.files.get(file.index()).map(|f| f.uri.as_str())
    }

    /// Number of registered files, stale ones included.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileIndex for MemoryIndex {
    fn parse(&self, file: FileId) -> Option<Arc<SourceFile>> {
        self.files.get(file.index())?.source.clone()
    }

    fn files_in_scope(&self, scope: &ContentScope) -> Vec<FileId> {
        self.files
            .iter()
            .enumerate()
            .filter(|(_, f)| match scope {
                ContentScope::Module(module) => f.module == Some(*module),
                ContentScope::Project => true,
            })
            .map(|(i, _)| FileId(i as u32))
            .collect()
    }

    fn module_of(&self, file: FileId) -> Option<ModuleId> {
        self.files.get(file.index())?.module
    }
}
