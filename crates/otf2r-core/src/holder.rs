//! Per-kind holder: one container plus creation against a generator.
//!
//! The generator is passed in rather than owned, because kinds that share a
//! namespace (metric class/instance, I/O file/directory) must allocate from
//! the same generator while keeping separate containers.

use tracing::debug;

use crate::container::DefinitionContainer;
use crate::definition::{Def, Kind};
use crate::error::{RegistryError, Result};
use crate::generator::ReferenceGenerator;
use crate::reference::Reference;
use crate::registry::DuplicatePolicy;

/// Definitions of kind `K`.
pub struct DefinitionHolder<K: Kind> {
    container: DefinitionContainer<K>,
}

impl<K: Kind> DefinitionHolder<K> {
    /// Empty holder.
    #[must_use]
    pub fn new() -> Self {
        Self { container: DefinitionContainer::new() }
    }

    /// Create a definition under a freshly allocated reference.
    pub fn create(&mut self, generator: &mut ReferenceGenerator<K::Ref>, data: K) -> Result<Def<K>> {
        let reference = generator.allocate()?;
        Ok(self.container.emplace(reference, data))
    }

    /// Create a definition under `reference` and register it with `generator`.
    ///
    /// With [`DuplicatePolicy::KeepFirst`] a duplicate returns the stored
    /// definition unchanged; with [`DuplicatePolicy::Reject`] it fails.
    pub fn create_with_ref(
        &mut self,
        generator: &mut ReferenceGenerator<K::Ref>,
        reference: K::Ref,
        data: K,
        policy: DuplicatePolicy,
    ) -> Result<Def<K>> {
        if reference.is_undefined() {
            return Err(RegistryError::SentinelReference { kind: K::NAME });
        }
        if let Some(existing) = self.container.find(reference) {
            return match policy {
                DuplicatePolicy::KeepFirst => {
                    debug!(kind = K::NAME, reference = reference.to_u64(), "duplicate definition ignored");
                    Ok(existing.clone())
                }
                DuplicatePolicy::Reject => Err(RegistryError::DuplicateReference {
                    kind: K::NAME,
                    raw: reference.to_u64(),
                }),
            };
        }
        generator.register_reference(reference);
        Ok(self.container.emplace(reference, data))
    }

    /// Stored definition, or the undefined value.
    #[must_use]
    pub fn get(&self, reference: K::Ref) -> Def<K> {
        self.container.get(reference)
    }

    /// Whether `reference` is defined in this holder.
    #[must_use]
    pub fn contains(&self, reference: K::Ref) -> bool {
        self.container.contains(reference)
    }

    /// Definitions in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Def<K>> + '_ {
        self.container.iter()
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.container.len()
    }

    /// Whether the holder is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.container.is_empty()
    }

    /// Underlying container.
    #[must_use]
    pub const fn container(&self) -> &DefinitionContainer<K> {
        &self.container
    }
}

impl<K: Kind> Default for DefinitionHolder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kind> Clone for DefinitionHolder<K> {
    fn clone(&self) -> Self {
        Self { container: self.container.clone() }
    }
}

impl<K: Kind> std::fmt::Debug for DefinitionHolder<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionHolder").field("container", &self.container).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::StringDef;
    use crate::reference::StringRef;

    #[test]
    fn explicit_reference_is_registered() {
        let mut g = ReferenceGenerator::<StringRef>::new();
        let mut h = DefinitionHolder::<StringDef>::new();
        let d = h
            .create_with_ref(&mut g, StringRef::new(42), StringDef::new("x"), DuplicatePolicy::KeepFirst)
            .unwrap();
        assert_eq!(d.reference(), StringRef::new(42));
        let next = h.create(&mut g, StringDef::new("y")).unwrap();
        assert_eq!(next.reference(), StringRef::new(43));
    }

    #[test]
    fn sentinel_cannot_be_created() {
        let mut g = ReferenceGenerator::<StringRef>::new();
        let mut h = DefinitionHolder::<StringDef>::new();
        let err = h
            .create_with_ref(&mut g, StringRef::UNDEFINED, StringDef::new("x"), DuplicatePolicy::KeepFirst)
            .unwrap_err();
        assert_eq!(err, RegistryError::SentinelReference { kind: "string" });
        assert!(h.is_empty());
    }

    #[test]
    fn duplicates_follow_the_policy() {
        let mut g = ReferenceGenerator::<StringRef>::new();
        let mut h = DefinitionHolder::<StringDef>::new();
        let r = StringRef::new(7);
        h.create_with_ref(&mut g, r, StringDef::new("first"), DuplicatePolicy::KeepFirst).unwrap();

        let kept = h.create_with_ref(&mut g, r, StringDef::new("second"), DuplicatePolicy::KeepFirst).unwrap();
        assert_eq!(kept.as_str(), Some("first"));

        let err = h.create_with_ref(&mut g, r, StringDef::new("third"), DuplicatePolicy::Reject).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateReference { kind: "string", raw: 7 });
        assert_eq!(h.len(), 1);
        assert_eq!(h.get(r).as_str(), Some("first"));
    }
}
