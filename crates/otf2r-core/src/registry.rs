//! The aggregate registry: one holder per definition kind, the shared
//! generator set, the property containers and the clock singleton.
//!
//! Generic entry points (`create`, `get`, `resolve`, ...) are selected by the
//! kind type parameter through [`Holds`]:
//!
//! ```rust
//! use otf2r_core::prelude::*;
//!
//! let mut registry = Registry::new();
//! let root_name = registry.create(StringDef::new("machine"))?;
//! let root = registry.create(SystemTreeNode::new(root_name.clone(), root_name, Def::undefined()))?;
//! assert!(!root.has_parent());
//! assert_eq!(registry.count::<SystemTreeNode>(), 1);
//! # Ok::<(), otf2r_core::RegistryError>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::container::PropertyContainer;
use crate::definition::{Def, Kind};
use crate::defs::{
    Attribute, CallingContext, ClockProperties, Comm, Group, InterruptGenerator, IoDirectory,
    IoFile, IoHandle, IoParadigm, IoRegularFile, Location, LocationGroup, Marker, Metric,
    MetricClass, MetricInstance, MetricMember, Parameter, Property, Region, SourceCodeLocation,
    StringDef, SystemTreeNode,
};
use crate::error::{RegistryError, Result};
use crate::generator::{GeneratorFor, ReferenceGenerator, ReferenceGenerators};
use crate::holder::DefinitionHolder;
use crate::reference::{IoFileRef, MetricRef, RawRef, Reference};

/// What to do when a reference is defined twice.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the first definition and return it (logged at debug level).
    #[default]
    KeepFirst,
    /// Fail with [`RegistryError::DuplicateReference`].
    Reject,
}

/// What to do when a cross-reference names an unknown definition.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingPolicy {
    /// Substitute the kind's undefined value (logged at warn level).
    #[default]
    Undefined,
    /// Fail with [`RegistryError::UndefinedReference`].
    Reject,
}

/// Registry behaviour knobs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RegistryOptions {
    /// Duplicate definitions.
    pub duplicates: DuplicatePolicy,
    /// Dangling cross-references.
    pub missing: MissingPolicy,
}

impl RegistryOptions {
    /// Reject duplicates and dangling references.
    #[must_use]
    pub const fn strict() -> Self {
        Self { duplicates: DuplicatePolicy::Reject, missing: MissingPolicy::Reject }
    }
}

/// Kinds stored in a [`Registry`].
pub trait Holds<K: Kind> {
    /// Holder of `K`.
    fn holder(&self) -> &DefinitionHolder<K>;

    /// Holder of `K` together with the generator of its namespace.
    fn holder_and_generator_mut(&mut self) -> (&mut DefinitionHolder<K>, &mut ReferenceGenerator<K::Ref>);

    /// Whether another kind of the same namespace already defines `reference`.
    fn sibling_contains(&self, _reference: K::Ref) -> bool {
        false
    }
}

/// Owner kinds that carry properties in a [`Registry`].
pub trait HoldsProperties<O: Kind> {
    /// Properties of `O`.
    fn property_container(&self) -> &PropertyContainer<O>;
    /// Mutable properties of `O`.
    fn property_container_mut(&mut self) -> &mut PropertyContainer<O>;
}

macro_rules! registry {
    (
        holders { $($kind:ty => $field:ident $(| $sibling:ident)?;)+ }
        properties { $($owner:ty => $pfield:ident;)+ }
    ) => {
        /// Every definition of one trace, keyed by typed reference.
        #[derive(Clone, Debug, Default)]
        pub struct Registry {
            options: RegistryOptions,
            generators: ReferenceGenerators,
            clock_properties: Option<ClockProperties>,
            $($field: DefinitionHolder<$kind>,)+
            $($pfield: PropertyContainer<$owner>,)+
        }

        $(
            impl Holds<$kind> for Registry {
                #[inline]
                fn holder(&self) -> &DefinitionHolder<$kind> {
                    &self.$field
                }

                #[inline]
                fn holder_and_generator_mut(
                    &mut self,
                ) -> (&mut DefinitionHolder<$kind>, &mut ReferenceGenerator<<$kind as Kind>::Ref>) {
                    (
                        &mut self.$field,
                        GeneratorFor::<<$kind as Kind>::Ref>::generator_mut(&mut self.generators),
                    )
                }

                $(
                    fn sibling_contains(&self, reference: <$kind as Kind>::Ref) -> bool {
                        self.$sibling.contains(reference)
                    }
                )?
            }
        )+

        $(
            impl HoldsProperties<$owner> for Registry {
                #[inline]
                fn property_container(&self) -> &PropertyContainer<$owner> {
                    &self.$pfield
                }

                #[inline]
                fn property_container_mut(&mut self) -> &mut PropertyContainer<$owner> {
                    &mut self.$pfield
                }
            }
        )+
    };
}

registry! {
    holders {
        StringDef => strings;
        Attribute => attributes;
        SystemTreeNode => system_tree_nodes;
        LocationGroup => location_groups;
        Location => locations;
        Region => regions;
        Group => groups;
        Comm => comms;
        IoParadigm => io_paradigms;
        IoRegularFile => io_regular_files | io_directories;
        IoDirectory => io_directories | io_regular_files;
        IoHandle => io_handles;
        Parameter => parameters;
        SourceCodeLocation => source_code_locations;
        CallingContext => calling_contexts;
        InterruptGenerator => interrupt_generators;
        MetricMember => metric_members;
        MetricClass => metric_classes | metric_instances;
        MetricInstance => metric_instances | metric_classes;
        Marker => markers;
    }
    properties {
        SystemTreeNode => system_tree_node_properties;
        LocationGroup => location_group_properties;
        Location => location_properties;
        CallingContext => calling_context_properties;
    }
}

impl Registry {
    /// Empty registry with default (lenient) options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry with `options`.
    #[must_use]
    pub fn with_options(options: RegistryOptions) -> Self {
        Self { options, ..Self::default() }
    }

    /// Active options.
    #[must_use]
    pub const fn options(&self) -> RegistryOptions {
        self.options
    }

    /// Create a definition under the next free reference of its namespace.
    pub fn create<K: Kind>(&mut self, data: K) -> Result<Def<K>>
    where
        Self: Holds<K>,
    {
        let (holder, generator) = <Self as Holds<K>>::holder_and_generator_mut(self);
        holder.create(generator, data)
    }

    /// Create a definition under `reference`, registering it so later
    /// automatic allocations never collide with it.
    ///
    /// Fails on the sentinel. Duplicates follow [`RegistryOptions::duplicates`];
    /// a collision with the other kind of a shared namespace always fails.
    pub fn create_with_ref<K: Kind>(&mut self, reference: K::Ref, data: K) -> Result<Def<K>>
    where
        Self: Holds<K>,
    {
        if <Self as Holds<K>>::sibling_contains(self, reference) {
            return Err(RegistryError::DuplicateReference { kind: K::NAME, raw: reference.to_u64() });
        }
        let policy = self.options.duplicates;
        let (holder, generator) = <Self as Holds<K>>::holder_and_generator_mut(self);
        holder.create_with_ref(generator, reference, data, policy)
    }

    /// Stored definition, or the undefined value for the sentinel and for
    /// unknown references.
    #[must_use]
    pub fn get<K: Kind>(&self, reference: K::Ref) -> Def<K>
    where
        Self: Holds<K>,
    {
        <Self as Holds<K>>::holder(self).get(reference)
    }

    /// [`get`](Self::get) from a raw integer. Values wider than the
    /// namespace are unknown.
    #[must_use]
    pub fn get_raw<K: Kind>(&self, raw: u64) -> Def<K>
    where
        Self: Holds<K>,
    {
        narrow::<K::Ref>(raw).map(|r| self.get::<K>(r)).unwrap_or_default()
    }

    /// Resolve a cross-reference under [`RegistryOptions::missing`].
    ///
    /// The sentinel always resolves to the undefined value. An unknown
    /// reference is either substituted by the undefined value or rejected.
    pub fn resolve<K: Kind>(&self, reference: K::Ref) -> Result<Def<K>>
    where
        Self: Holds<K>,
    {
        if reference.is_undefined() {
            return Ok(Def::undefined());
        }
        let def = self.get::<K>(reference);
        if def.is_valid() {
            return Ok(def);
        }
        self.missing(K::NAME, reference.to_u64())?;
        Ok(def)
    }

    /// [`resolve`](Self::resolve) from a raw integer.
    pub fn resolve_raw<K: Kind>(&self, raw: u64) -> Result<Def<K>>
    where
        Self: Holds<K>,
    {
        match narrow::<K::Ref>(raw) {
            Some(r) => self.resolve::<K>(r),
            None => {
                self.missing(K::NAME, raw)?;
                Ok(Def::undefined())
            }
        }
    }

    /// Definitions of kind `K` in insertion order.
    pub fn definitions<K: Kind>(&self) -> impl ExactSizeIterator<Item = &Def<K>> + '_
    where
        Self: Holds<K>,
    {
        <Self as Holds<K>>::holder(self).iter()
    }

    /// Number of definitions of kind `K`.
    #[must_use]
    pub fn count<K: Kind>(&self) -> usize
    where
        Self: Holds<K>,
    {
        <Self as Holds<K>>::holder(self).len()
    }

    /// Whether `reference` is defined as a `K`.
    #[must_use]
    pub fn contains<K: Kind>(&self, reference: K::Ref) -> bool
    where
        Self: Holds<K>,
    {
        <Self as Holds<K>>::holder(self).contains(reference)
    }

    /// Mark `reference` as used in its namespace without defining anything.
    pub fn register_reference<R: Reference>(&mut self, reference: R)
    where
        ReferenceGenerators: GeneratorFor<R>,
    {
        self.generators.register_reference(reference);
    }

    /// Next free reference of namespace `R` (not reserved).
    pub fn next_reference<R: Reference>(&self) -> Result<R>
    where
        ReferenceGenerators: GeneratorFor<R>,
    {
        self.generators.next()
    }

    /// Generator set.
    #[must_use]
    pub const fn generators(&self) -> &ReferenceGenerators {
        &self.generators
    }

    /// The metric class or instance behind `reference`.
    #[must_use]
    pub fn metric(&self, reference: MetricRef) -> Option<Metric> {
        if let Some(d) = self.metric_classes.container().find(reference) {
            return Some(Metric::Class(d.clone()));
        }
        self.metric_instances.container().find(reference).cloned().map(Metric::Instance)
    }

    /// [`metric`](Self::metric) under [`RegistryOptions::missing`].
    pub fn resolve_metric(&self, reference: MetricRef) -> Result<Metric> {
        if reference.is_undefined() {
            return Ok(Metric::default());
        }
        match self.metric(reference) {
            Some(m) => Ok(m),
            None => {
                self.missing("metric", reference.to_u64())?;
                Ok(Metric::default())
            }
        }
    }

    /// The regular file or directory behind `reference`.
    #[must_use]
    pub fn io_file(&self, reference: IoFileRef) -> Option<IoFile> {
        if let Some(d) = self.io_regular_files.container().find(reference) {
            return Some(IoFile::Regular(d.clone()));
        }
        self.io_directories.container().find(reference).cloned().map(IoFile::Directory)
    }

    /// [`io_file`](Self::io_file) under [`RegistryOptions::missing`].
    pub fn resolve_io_file(&self, reference: IoFileRef) -> Result<IoFile> {
        if reference.is_undefined() {
            return Ok(IoFile::default());
        }
        match self.io_file(reference) {
            Some(f) => Ok(f),
            None => {
                self.missing("io_file", reference.to_u64())?;
                Ok(IoFile::default())
            }
        }
    }

    /// Append a property and return its position.
    ///
    /// An undefined owner is subject to [`RegistryOptions::missing`].
    pub fn add_property<O: Kind>(&mut self, property: Property<O>) -> Result<usize>
    where
        Self: HoldsProperties<O>,
    {
        if !property.owner.is_valid() {
            self.missing(O::NAME, property.owner.raw())?;
        }
        Ok(<Self as HoldsProperties<O>>::property_container_mut(self).add(property))
    }

    /// Properties attached to kind `O`, in insertion order.
    #[must_use]
    pub fn properties<O: Kind>(&self) -> &PropertyContainer<O>
    where
        Self: HoldsProperties<O>,
    {
        <Self as HoldsProperties<O>>::property_container(self)
    }

    /// Set the clock singleton. A second call replaces the first.
    pub fn set_clock_properties(&mut self, clock: ClockProperties) {
        self.clock_properties = Some(clock);
    }

    /// Clock singleton, if set.
    #[must_use]
    pub const fn clock_properties(&self) -> Option<ClockProperties> {
        self.clock_properties
    }

    /// Per-kind counts, in write (dependency) order.
    #[must_use]
    pub fn summary(&self) -> Vec<(&'static str, usize)> {
        vec![
            (StringDef::NAME, self.strings.len()),
            (Attribute::NAME, self.attributes.len()),
            (SystemTreeNode::NAME, self.system_tree_nodes.len()),
            ("system_tree_node_property", self.system_tree_node_properties.len()),
            (LocationGroup::NAME, self.location_groups.len()),
            ("location_group_property", self.location_group_properties.len()),
            (Location::NAME, self.locations.len()),
            ("location_property", self.location_properties.len()),
            (Region::NAME, self.regions.len()),
            (Group::NAME, self.groups.len()),
            (Comm::NAME, self.comms.len()),
            (IoParadigm::NAME, self.io_paradigms.len()),
            (IoRegularFile::NAME, self.io_regular_files.len()),
            (IoDirectory::NAME, self.io_directories.len()),
            (IoHandle::NAME, self.io_handles.len()),
            (Parameter::NAME, self.parameters.len()),
            (SourceCodeLocation::NAME, self.source_code_locations.len()),
            (CallingContext::NAME, self.calling_contexts.len()),
            ("calling_context_property", self.calling_context_properties.len()),
            (InterruptGenerator::NAME, self.interrupt_generators.len()),
            (MetricMember::NAME, self.metric_members.len()),
            (MetricClass::NAME, self.metric_classes.len()),
            (MetricInstance::NAME, self.metric_instances.len()),
            (Marker::NAME, self.markers.len()),
        ]
    }

    /// Total number of definitions and properties.
    #[must_use]
    pub fn total(&self) -> usize {
        self.summary().iter().map(|(_, n)| n).sum()
    }

    fn missing(&self, kind: &'static str, raw: u64) -> Result<()> {
        match self.options.missing {
            MissingPolicy::Reject => Err(RegistryError::UndefinedReference { kind, raw }),
            MissingPolicy::Undefined => {
                warn!(kind, reference = raw, "dangling reference resolved to undefined");
                Ok(())
            }
        }
    }
}

/// Narrow `raw` to `R`, or `None` when it does not fit. `u64::MAX` maps to
/// the sentinel of every width.
fn narrow<R: Reference>(raw: u64) -> Option<R> {
    if raw == u64::MAX {
        return Some(R::UNDEFINED);
    }
    let narrowed = <R::Raw as RawRef>::from_u64_truncating(raw);
    (narrowed.to_u64() == raw).then(|| R::from_raw(narrowed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{AttributeValue, MetricOccurrence, Paradigm, RecorderKind, RegionRole};
    use crate::reference::{LocationRef, RegionRef, StringRef, SystemTreeNodeRef};

    fn name(r: &mut Registry, s: &str) -> Def<StringDef> {
        r.create(StringDef::new(s)).unwrap()
    }

    #[test]
    fn create_then_get() {
        let mut r = Registry::new();
        let n = name(&mut r, "main");
        let region = r.create(Region::new(n.clone(), RegionRole::Function, Paradigm::User)).unwrap();
        assert_eq!(region.reference(), RegionRef::new(0));
        let again = r.get::<Region>(RegionRef::new(0));
        assert!(again.ptr_eq(&region));
        assert!(again.data().unwrap().name.ptr_eq(&n));
        assert!(!r.get::<Region>(RegionRef::new(1)).is_valid());
    }

    #[test]
    fn get_raw_handles_width_and_sentinel() {
        let mut r = Registry::new();
        r.create_with_ref(StringRef::new(3), StringDef::new("x")).unwrap();
        assert!(r.get_raw::<StringDef>(3).is_valid());
        assert!(!r.get_raw::<StringDef>(u64::from(u32::MAX)).is_valid());
        assert!(!r.get_raw::<StringDef>(u64::MAX).is_valid());
        // Would alias 3 if truncated.
        assert!(!r.get_raw::<StringDef>((1 << 32) + 3).is_valid());
    }

    #[test]
    fn resolve_follows_the_missing_policy() {
        let lenient = Registry::new();
        assert!(!lenient.resolve::<StringDef>(StringRef::new(9)).unwrap().is_valid());
        assert!(!lenient.resolve::<StringDef>(StringRef::UNDEFINED).unwrap().is_valid());

        let strict = Registry::with_options(RegistryOptions::strict());
        assert_eq!(
            strict.resolve::<StringDef>(StringRef::new(9)),
            Err(RegistryError::UndefinedReference { kind: "string", raw: 9 })
        );
        // The sentinel is "none", not a dangling reference.
        assert!(strict.resolve::<StringDef>(StringRef::UNDEFINED).is_ok());
        assert!(strict.resolve_raw::<StringDef>(1 << 40).is_err());
    }

    #[test]
    fn strict_registry_rejects_duplicates() {
        let mut r = Registry::with_options(RegistryOptions::strict());
        r.create_with_ref(StringRef::new(1), StringDef::new("a")).unwrap();
        assert_eq!(
            r.create_with_ref(StringRef::new(1), StringDef::new("b")),
            Err(RegistryError::DuplicateReference { kind: "string", raw: 1 })
        );
    }

    #[test]
    fn shared_metric_namespace() {
        let mut r = Registry::new();
        let class = r
            .create(MetricClass {
                members: Vec::new(),
                occurrence: MetricOccurrence::Synchronous,
                recorder_kind: RecorderKind::Abstract,
            })
            .unwrap();
        let loc_name = name(&mut r, "thread 0");
        let location = r
            .create_with_ref(LocationRef::new(0), Location { name: loc_name, ..Location::default() })
            .unwrap();
        let instance = r
            .create(MetricInstance {
                metric_class: class.clone(),
                recorder: location.clone(),
                scope: crate::defs::MetricScope::Location(location),
            })
            .unwrap();
        assert_eq!(class.reference(), MetricRef::new(0));
        assert_eq!(instance.reference(), MetricRef::new(1));

        assert!(matches!(r.metric(MetricRef::new(0)), Some(Metric::Class(_))));
        assert!(matches!(r.metric(MetricRef::new(1)), Some(Metric::Instance(_))));
        assert!(r.metric(MetricRef::new(2)).is_none());
        assert!(r.resolve_metric(MetricRef::new(1)).unwrap().class().ptr_eq(&class));

        // The other kind already owns reference 0.
        assert!(matches!(
            r.create_with_ref(MetricRef::new(0), MetricInstance {
                metric_class: class.clone(),
                recorder: Def::undefined(),
                scope: crate::defs::MetricScope::Location(Def::undefined()),
            }),
            Err(RegistryError::DuplicateReference { kind: "metric_instance", raw: 0 })
        ));
    }

    #[test]
    fn properties_and_clock() {
        let mut r = Registry::new();
        let n = name(&mut r, "node");
        let node = r.create(SystemTreeNode::new(n.clone(), n.clone(), Def::undefined())).unwrap();
        let idx = r.add_property(Property::new(node, n, AttributeValue::UInt64(4))).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(r.properties::<SystemTreeNode>().of(SystemTreeNodeRef::new(0)).count(), 1);

        let strict = &mut Registry::with_options(RegistryOptions::strict());
        assert!(strict
            .add_property(Property::<Location>::new(Def::undefined(), Def::undefined(), AttributeValue::UInt8(0)))
            .is_err());

        assert_eq!(r.clock_properties(), None);
        let clock = ClockProperties { timer_resolution: 1_000_000_000, global_offset: 0, trace_length: 10 };
        r.set_clock_properties(clock);
        assert_eq!(r.clock_properties(), Some(clock));
    }

    #[test]
    fn summary_lists_every_kind_in_write_order() {
        let mut r = Registry::new();
        name(&mut r, "a");
        let s = r.summary();
        assert_eq!(s.first(), Some(&("string", 1)));
        assert_eq!(s.last().map(|e| e.0), Some("marker"));
        assert_eq!(s.len(), 24);
        assert_eq!(r.total(), 1);
    }

    #[test]
    fn options_parse_from_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            registry: RegistryOptions,
        }
        let w: Wrapper = serde_json::from_str(r#"{"registry":{"duplicates":"reject"}}"#).unwrap();
        assert_eq!(w.registry.duplicates, DuplicatePolicy::Reject);
        assert_eq!(w.registry.missing, MissingPolicy::Undefined);
    }
}
