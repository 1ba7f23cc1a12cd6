//! Metric members, classes and instances.
//!
//! Classes and instances share the [`MetricRef`] namespace; [`Metric`] is
//! the "either" view used wherever a metric reference may name both.

use super::{impl_kind, Group, Location, LocationGroup, StringDef, SystemTreeNode};
use crate::definition::Def;
use crate::enums::{
    Base, MetricMode, MetricOccurrence, MetricScopeType, MetricType, RecorderKind, Type,
};
use crate::reference::{MetricMemberRef, MetricRef};

/// One counter within a metric class.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricMember {
    /// Name.
    pub name: Def<StringDef>,
    /// Description.
    pub description: Def<StringDef>,
    /// Source of the counter.
    pub metric_type: MetricType,
    /// Value semantics and timing.
    pub mode: MetricMode,
    /// Type of samples (`Int64`, `UInt64` or `Double`).
    pub value_type: Type,
    /// Base of `exponent`.
    pub base: Base,
    /// Values are scaled by `base^exponent`.
    pub exponent: i64,
    /// Unit (e.g. `bytes`).
    pub unit: Def<StringDef>,
}

/// An ordered set of members sampled together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricClass {
    /// Members, in sample order.
    pub members: Vec<Def<MetricMember>>,
    /// When samples occur.
    pub occurrence: MetricOccurrence,
    /// Kind of recorder.
    pub recorder_kind: RecorderKind,
}

/// Where a metric instance applies.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricScope {
    /// A location.
    Location(Def<Location>),
    /// A location group.
    LocationGroup(Def<LocationGroup>),
    /// A system tree node.
    SystemTreeNode(Def<SystemTreeNode>),
    /// A group.
    Group(Def<Group>),
}

impl MetricScope {
    /// Discriminant as written to the format.
    #[must_use]
    pub const fn scope_type(&self) -> MetricScopeType {
        match self {
            Self::Location(_) => MetricScopeType::Location,
            Self::LocationGroup(_) => MetricScopeType::LocationGroup,
            Self::SystemTreeNode(_) => MetricScopeType::SystemTreeNode,
            Self::Group(_) => MetricScopeType::Group,
        }
    }

    /// Raw reference of the scope widened to `u64`.
    #[must_use]
    pub fn raw(&self) -> u64 {
        match self {
            Self::Location(d) => d.raw(),
            Self::LocationGroup(d) => d.raw(),
            Self::SystemTreeNode(d) => d.raw(),
            Self::Group(d) => d.raw(),
        }
    }
}

/// A metric class recorded by a specific location for a specific scope.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricInstance {
    /// Class being instantiated.
    pub metric_class: Def<MetricClass>,
    /// Location that records the samples.
    pub recorder: Def<Location>,
    /// Scope the samples describe.
    pub scope: MetricScope,
}

impl_kind! {
    MetricMember => MetricMemberRef, "metric_member";
    MetricClass => MetricRef, "metric_class";
    MetricInstance => MetricRef, "metric_instance";
}

/// A metric reference resolved to a class or an instance.
#[derive(Clone, Debug, PartialEq)]
pub enum Metric {
    /// A metric class.
    Class(Def<MetricClass>),
    /// A metric instance.
    Instance(Def<MetricInstance>),
}

impl Metric {
    /// The shared-namespace reference.
    #[must_use]
    pub fn reference(&self) -> MetricRef {
        match self {
            Self::Class(d) => d.reference(),
            Self::Instance(d) => d.reference(),
        }
    }

    /// Whether the underlying definition is defined.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Class(d) => d.is_valid(),
            Self::Instance(d) => d.is_valid(),
        }
    }

    /// The class, following an instance to the class it instantiates.
    #[must_use]
    pub fn class(&self) -> Def<MetricClass> {
        match self {
            Self::Class(d) => d.clone(),
            Self::Instance(d) => d.data().map(|i| i.metric_class.clone()).unwrap_or_default(),
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Self::Class(Def::undefined())
    }
}

impl From<Def<MetricClass>> for Metric {
    fn from(d: Def<MetricClass>) -> Self {
        Self::Class(d)
    }
}

impl From<Def<MetricInstance>> for Metric {
    fn from(d: Def<MetricInstance>) -> Self {
        Self::Instance(d)
    }
}
