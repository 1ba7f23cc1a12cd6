//! System tree, location groups and locations.

use super::{impl_kind, impl_parent_chain, StringDef};
use crate::definition::Def;
use crate::enums::{LocationGroupType, LocationType};
use crate::reference::{LocationGroupRef, LocationRef, SystemTreeNodeRef};

/// A node of the machine hierarchy (machine, node, socket, ...).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SystemTreeNode {
    /// Name (e.g. `node42`).
    pub name: Def<StringDef>,
    /// Class name (e.g. `node`).
    pub class_name: Def<StringDef>,
    /// Parent node; undefined for the root.
    pub parent: Def<SystemTreeNode>,
}

impl SystemTreeNode {
    /// Node under `parent` (pass the undefined value for a root).
    #[must_use]
    pub const fn new(name: Def<StringDef>, class_name: Def<StringDef>, parent: Def<Self>) -> Self {
        Self { name, class_name, parent }
    }
}

/// A group of locations, usually one process.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationGroup {
    /// Name (e.g. `MPI Rank 0`).
    pub name: Def<StringDef>,
    /// Kind of group.
    pub group_type: LocationGroupType,
    /// System tree node the group runs on.
    pub system_tree_parent: Def<SystemTreeNode>,
}

/// One event timeline (thread, GPU stream, metric source).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Location {
    /// Name.
    pub name: Def<StringDef>,
    /// Kind of location.
    pub location_type: LocationType,
    /// Number of events recorded for this location.
    pub number_of_events: u64,
    /// Owning group.
    pub location_group: Def<LocationGroup>,
}

impl Location {
    /// Location with no events recorded yet.
    #[must_use]
    pub const fn new(
        name: Def<StringDef>,
        location_type: LocationType,
        location_group: Def<LocationGroup>,
    ) -> Self {
        Self { name, location_type, number_of_events: 0, location_group }
    }
}

impl_kind! {
    SystemTreeNode => SystemTreeNodeRef, "system_tree_node";
    LocationGroup => LocationGroupRef, "location_group";
    Location => LocationRef, "location";
}

impl_parent_chain!(SystemTreeNode);
