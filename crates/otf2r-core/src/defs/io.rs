//! I/O paradigms, files, directories and handles.
//!
//! Regular files and directories share the [`IoFileRef`] namespace.

use super::{impl_kind, impl_parent_chain, Comm, StringDef, SystemTreeNode};
use crate::definition::Def;
use crate::enums::{IoHandleFlags, IoParadigmClass, IoParadigmFlags};
use crate::reference::{IoFileRef, IoHandleRef, IoParadigmRef};

/// An I/O interface (POSIX, MPI-IO, ISO C, ...).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IoParadigm {
    /// Short identification (e.g. `POSIX`).
    pub identification: Def<StringDef>,
    /// Display name.
    pub name: Def<StringDef>,
    /// Serial or parallel.
    pub io_class: IoParadigmClass,
    /// Flags.
    pub flags: IoParadigmFlags,
}

/// A regular file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IoRegularFile {
    /// Path.
    pub name: Def<StringDef>,
    /// System tree node the path is valid on.
    pub scope: Def<SystemTreeNode>,
}

/// A directory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IoDirectory {
    /// Path.
    pub name: Def<StringDef>,
    /// System tree node the path is valid on.
    pub scope: Def<SystemTreeNode>,
}

/// An I/O file reference resolved to a regular file or a directory.
#[derive(Clone, Debug, PartialEq)]
pub enum IoFile {
    /// A regular file.
    Regular(Def<IoRegularFile>),
    /// A directory.
    Directory(Def<IoDirectory>),
}

impl IoFile {
    /// The shared-namespace reference.
    #[must_use]
    pub fn reference(&self) -> IoFileRef {
        match self {
            Self::Regular(d) => d.reference(),
            Self::Directory(d) => d.reference(),
        }
    }

    /// Whether the underlying definition is defined.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Regular(d) => d.is_valid(),
            Self::Directory(d) => d.is_valid(),
        }
    }

    /// Path of the file or directory.
    #[must_use]
    pub fn name(&self) -> Def<StringDef> {
        match self {
            Self::Regular(d) => d.data().map(|f| f.name.clone()).unwrap_or_default(),
            Self::Directory(d) => d.data().map(|f| f.name.clone()).unwrap_or_default(),
        }
    }
}

impl Default for IoFile {
    fn default() -> Self {
        Self::Regular(Def::undefined())
    }
}

impl From<Def<IoRegularFile>> for IoFile {
    fn from(d: Def<IoRegularFile>) -> Self {
        Self::Regular(d)
    }
}

impl From<Def<IoDirectory>> for IoFile {
    fn from(d: Def<IoDirectory>) -> Self {
        Self::Directory(d)
    }
}

/// An open handle (file descriptor, `FILE*`, MPI file handle, ...).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IoHandle {
    /// Name.
    pub name: Def<StringDef>,
    /// File or directory behind the handle.
    pub file: IoFile,
    /// Paradigm the handle belongs to.
    pub io_paradigm: Def<IoParadigm>,
    /// Flags.
    pub flags: IoHandleFlags,
    /// Communicator for collective handles.
    pub comm: Def<Comm>,
    /// Handle this one was derived from (e.g. `fdopen`).
    pub parent: Def<IoHandle>,
}

impl_kind! {
    IoParadigm => IoParadigmRef, "io_paradigm";
    IoRegularFile => IoFileRef, "io_regular_file";
    IoDirectory => IoFileRef, "io_directory";
    IoHandle => IoHandleRef, "io_handle";
}

impl_parent_chain!(IoHandle);
