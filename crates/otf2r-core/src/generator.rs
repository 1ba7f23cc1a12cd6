//! Per-namespace reference generators.
//!
//! A generator only remembers the largest reference registered so far and
//! hands out `max + 1`. That is enough for uniqueness because every
//! definition, whether created with an explicit reference or parsed from a
//! file, is registered before an application can observe gaps.

use std::fmt;
use std::marker::PhantomData;

use crate::error::{RegistryError, Result};
use crate::reference::{
    AttributeRef, CallingContextRef, CommRef, GroupRef, InterruptGeneratorRef, IoFileRef,
    IoHandleRef, IoParadigmRef, LocationGroupRef, LocationRef, MarkerRef, MetricMemberRef,
    MetricRef, ParameterRef, RawRef, Reference, RegionRef, SourceCodeLocationRef, StringRef,
    SystemTreeNodeRef,
};

/// Running-max allocator for one reference namespace.
pub struct ReferenceGenerator<R: Reference> {
    /// `R::Raw::UNDEFINED` until the first registration.
    current_max: R::Raw,
    _namespace: PhantomData<R>,
}

impl<R: Reference> ReferenceGenerator<R> {
    /// Generator with nothing registered.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { current_max: <R::Raw as RawRef>::UNDEFINED, _namespace: PhantomData }
    }

    /// Record `r` as used. Registering the sentinel is a no-op.
    #[inline]
    pub fn register_reference(&mut self, r: R) {
        let raw = r.raw();
        if raw == R::Raw::UNDEFINED {
            return;
        }
        if self.current_max == R::Raw::UNDEFINED || raw > self.current_max {
            self.current_max = raw;
        }
    }

    /// Next free reference (`max + 1`, or zero when empty). Does not register it.
    ///
    /// Fails with [`RegistryError::Exhausted`] when `max + 1` would be the sentinel.
    pub fn next(&self) -> Result<R> {
        if self.current_max == R::Raw::UNDEFINED {
            return Ok(R::from_raw(R::Raw::ZERO));
        }
        match self.current_max.checked_succ() {
            Some(raw) if raw != R::Raw::UNDEFINED => Ok(R::from_raw(raw)),
            _ => Err(RegistryError::Exhausted { namespace: R::NAMESPACE }),
        }
    }

    /// [`next`](Self::next) followed by [`register_reference`](Self::register_reference).
    pub fn allocate(&mut self) -> Result<R> {
        let r = self.next()?;
        self.register_reference(r);
        Ok(r)
    }

    /// Largest registered reference, if any.
    #[inline]
    #[must_use]
    pub fn current_max(&self) -> Option<R> {
        (self.current_max != R::Raw::UNDEFINED).then(|| R::from_raw(self.current_max))
    }
}

impl<R: Reference> Default for ReferenceGenerator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Reference> Clone for ReferenceGenerator<R> {
    fn clone(&self) -> Self {
        Self { current_max: self.current_max, _namespace: PhantomData }
    }
}

impl<R: Reference> fmt::Debug for ReferenceGenerator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceGenerator")
            .field("namespace", &R::NAMESPACE)
            .field("current_max", &self.current_max())
            .finish()
    }
}

/// Access to the generator of namespace `R` inside a [`ReferenceGenerators`] set.
pub trait GeneratorFor<R: Reference> {
    /// Shared access.
    fn generator(&self) -> &ReferenceGenerator<R>;
    /// Exclusive access.
    fn generator_mut(&mut self) -> &mut ReferenceGenerator<R>;
}

macro_rules! generator_set {
    ($($field:ident: $r:ty),+ $(,)?) => {
        /// One generator per reference namespace.
        ///
        /// Kinds that share a namespace (metric class/instance, I/O regular
        /// file/directory) share the generator stored here.
        #[derive(Clone, Debug, Default)]
        pub struct ReferenceGenerators {
            $($field: ReferenceGenerator<$r>,)+
        }

        $(
            impl GeneratorFor<$r> for ReferenceGenerators {
                #[inline]
                fn generator(&self) -> &ReferenceGenerator<$r> {
                    &self.$field
                }

                #[inline]
                fn generator_mut(&mut self) -> &mut ReferenceGenerator<$r> {
                    &mut self.$field
                }
            }
        )+
    };
}

generator_set! {
    string: StringRef,
    attribute: AttributeRef,
    system_tree_node: SystemTreeNodeRef,
    location_group: LocationGroupRef,
    location: LocationRef,
    region: RegionRef,
    group: GroupRef,
    comm: CommRef,
    parameter: ParameterRef,
    source_code_location: SourceCodeLocationRef,
    calling_context: CallingContextRef,
    interrupt_generator: InterruptGeneratorRef,
    metric_member: MetricMemberRef,
    metric: MetricRef,
    io_paradigm: IoParadigmRef,
    io_file: IoFileRef,
    io_handle: IoHandleRef,
    marker: MarkerRef,
}

impl ReferenceGenerators {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `r` with the generator of its namespace.
    #[inline]
    pub fn register_reference<R: Reference>(&mut self, r: R)
    where
        Self: GeneratorFor<R>,
    {
        <Self as GeneratorFor<R>>::generator_mut(self).register_reference(r);
    }

    /// Next free reference of namespace `R`.
    #[inline]
    pub fn next<R: Reference>(&self) -> Result<R>
    where
        Self: GeneratorFor<R>,
    {
        <Self as GeneratorFor<R>>::generator(self).next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_generator_starts_at_zero() {
        let g = ReferenceGenerator::<StringRef>::new();
        assert_eq!(g.current_max(), None);
        assert_eq!(g.next().unwrap(), StringRef::new(0));
    }

    #[test]
    fn next_follows_the_running_max() {
        let mut g = ReferenceGenerator::<RegionRef>::new();
        g.register_reference(RegionRef::new(5));
        g.register_reference(RegionRef::new(2));
        assert_eq!(g.next().unwrap(), RegionRef::new(6));
        // `next` is a peek.
        assert_eq!(g.next().unwrap(), RegionRef::new(6));
        assert_eq!(g.allocate().unwrap(), RegionRef::new(6));
        assert_eq!(g.next().unwrap(), RegionRef::new(7));
    }

    #[test]
    fn registering_the_sentinel_is_ignored() {
        let mut g = ReferenceGenerator::<CommRef>::new();
        g.register_reference(CommRef::new(3));
        g.register_reference(CommRef::UNDEFINED);
        assert_eq!(g.current_max(), Some(CommRef::new(3)));
    }

    #[test]
    fn exhaustion_never_yields_the_sentinel() {
        let mut g = ReferenceGenerator::<IoParadigmRef>::new();
        g.register_reference(IoParadigmRef::new(u8::MAX - 1));
        assert_eq!(
            g.next(),
            Err(RegistryError::Exhausted { namespace: "io_paradigm" })
        );
        assert!(g.allocate().is_err());
    }

    #[test]
    fn set_keeps_namespaces_apart() {
        let mut set = ReferenceGenerators::new();
        set.register_reference(StringRef::new(3));
        assert_eq!(set.next::<StringRef>().unwrap(), StringRef::new(4));
        assert_eq!(set.next::<RegionRef>().unwrap(), RegionRef::new(0));
    }
}
