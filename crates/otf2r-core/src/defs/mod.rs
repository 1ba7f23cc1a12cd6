//! Definition kinds.
//!
//! Each kind is a plain field struct implementing [`Kind`]; the registry
//! wraps it in a [`Def`]. Cross-references are stored as resolved `Def`
//! values of the referenced kind, never as raw integers. Optional references
//! (e.g. "no parent") hold the referenced kind's undefined value.

use std::fmt;

use crate::definition::{Def, Kind};
use crate::enums::AttributeValue;

mod code;
mod comm;
mod io;
mod metric;
mod system;

pub use code::*;
pub use comm::*;
pub use io::*;
pub use metric::*;
pub use system::*;

macro_rules! impl_kind {
    ($($t:ty => $r:ty, $name:literal;)+) => {$(
        impl $crate::definition::Kind for $t {
            type Ref = $r;
            const NAME: &'static str = $name;
        }
    )+};
}
pub(crate) use impl_kind;

/// Accessors shared by kinds that may name a parent of their own kind
/// through a `parent` field.
macro_rules! impl_parent_chain {
    ($($t:ty),+ $(,)?) => {$(
        impl $crate::definition::Def<$t> {
            /// Whether a parent is set.
            #[must_use]
            pub fn has_parent(&self) -> bool {
                self.data().is_some_and(|d| d.parent.is_valid())
            }

            /// The parent, or the undefined value for roots (and for undefined `self`).
            #[must_use]
            pub fn parent(&self) -> $crate::definition::Def<$t> {
                self.data().map(|d| d.parent.clone()).unwrap_or_default()
            }

            /// Parents from the nearest to the root.
            pub fn ancestors(&self) -> impl Iterator<Item = $crate::definition::Def<$t>> {
                std::iter::successors(Some(self.parent()), |d| Some(d.parent()))
                    .take_while($crate::definition::Def::<$t>::is_valid)
            }
        }
    )+};
}
pub(crate) use impl_parent_chain;

/// Timer properties of the whole trace. Singleton; carries no reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockProperties {
    /// Ticks per second.
    pub timer_resolution: u64,
    /// Timestamp of the trace start.
    pub global_offset: u64,
    /// Trace duration in ticks.
    pub trace_length: u64,
}

/// A named, typed value attached to a definition of kind `O`.
///
/// Properties have no reference of their own; containers key them by
/// position.
pub struct Property<O: Kind> {
    /// Definition the property annotates.
    pub owner: Def<O>,
    /// Property name.
    pub name: Def<StringDef>,
    /// Property value.
    pub value: AttributeValue,
}

impl<O: Kind> Property<O> {
    /// Construct a property.
    #[must_use]
    pub const fn new(owner: Def<O>, name: Def<StringDef>, value: AttributeValue) -> Self {
        Self { owner, name, value }
    }
}

impl<O: Kind> Clone for Property<O> {
    fn clone(&self) -> Self {
        Self { owner: self.owner.clone(), name: self.name.clone(), value: self.value.clone() }
    }
}

impl<O: Kind + PartialEq> PartialEq for Property<O> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.name == other.name && self.value == other.value
    }
}

impl<O: Kind + fmt::Debug> fmt::Debug for Property<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("owner", &self.owner.reference())
            .field("name", &self.name.as_str())
            .field("value", &self.value)
            .finish()
    }
}

/// Property of a system tree node.
pub type SystemTreeNodeProperty = Property<SystemTreeNode>;
/// Property of a location group.
pub type LocationGroupProperty = Property<LocationGroup>;
/// Property of a location.
pub type LocationProperty = Property<Location>;
/// Property of a calling context.
pub type CallingContextProperty = Property<CallingContext>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{IoFileRef, MetricRef, Reference, SystemTreeNodeRef};

    fn name_of<K: Kind>() -> &'static str {
        K::NAME
    }

    #[test]
    fn every_kind_names_its_namespace() {
        assert_eq!(name_of::<StringDef>(), "string");
        assert_eq!(name_of::<Comm>(), "comm");
        assert_eq!(name_of::<IoDirectory>(), "io_directory");
        assert_eq!(name_of::<MetricInstance>(), "metric_instance");
        assert_eq!(name_of::<Location>(), "location");
        // Sibling kinds share one reference type.
        let _: fn(<IoRegularFile as Kind>::Ref) -> IoFileRef = |r| r;
        let _: fn(<MetricClass as Kind>::Ref) -> MetricRef = |r| r;
    }

    #[test]
    fn undefined_nodes_have_no_parent() {
        let node = Def::<SystemTreeNode>::undefined();
        assert!(!node.has_parent());
        assert!(!node.parent().is_valid());
        assert_eq!(node.ancestors().count(), 0);
        assert_eq!(node.reference(), SystemTreeNodeRef::UNDEFINED);
    }
}
