//! Groups and communicators.

use super::{impl_kind, impl_parent_chain, StringDef};
use crate::definition::Def;
use crate::enums::{GroupFlags, GroupType, Paradigm};
use crate::reference::{CommRef, GroupRef};

/// A group of locations, regions, metrics or communicator ranks.
///
/// Members stay raw: their namespace depends on `group_type` (locations for
/// `Locations`/`CommLocations`, ranks for `CommGroup`, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    /// Name.
    pub name: Def<StringDef>,
    /// Kind of group.
    pub group_type: GroupType,
    /// Paradigm.
    pub paradigm: Paradigm,
    /// Flags.
    pub flags: GroupFlags,
    /// Raw member ids.
    pub members: Vec<u64>,
}

/// A communicator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Comm {
    /// Name (e.g. `MPI_COMM_WORLD`).
    pub name: Def<StringDef>,
    /// Communicator group.
    pub group: Def<Group>,
    /// Parent communicator; undefined for roots.
    pub parent: Def<Comm>,
}

impl_kind! {
    Group => GroupRef, "group";
    Comm => CommRef, "comm";
}

impl_parent_chain!(Comm);
