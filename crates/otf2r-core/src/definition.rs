//! `Def<K>`: an immutable definition value.
//!
//! A `Def` bundles a reference with the kind's fields. The fields live behind
//! an `Arc`, so copies are cheap and every copy observes the same data. A
//! `Def` never points back into the registry that created it; it stays valid
//! after the registry is dropped.
//!
//! Each kind has one canonical undefined value ([`Def::undefined`]): the
//! sentinel reference with no data. Lookups of absent or optional
//! references return it instead of failing, so callers check
//! [`Def::is_valid`] (or use [`Def::data`] / [`Def::try_data`]) before
//! reading fields.

use std::fmt;
use std::sync::Arc;

use crate::error::{RegistryError, Result};
use crate::reference::Reference;

/// A definition kind: the field set stored behind a [`Def`].
pub trait Kind: Sized + Send + Sync + 'static {
    /// Reference namespace of this kind.
    type Ref: Reference;

    /// Kind name used in logs and errors.
    const NAME: &'static str;
}

/// Immutable, shareable definition value of kind `K`.
pub struct Def<K: Kind> {
    reference: K::Ref,
    data: Option<Arc<K>>,
}

impl<K: Kind> Def<K> {
    /// The canonical undefined value of this kind.
    #[inline]
    #[must_use]
    pub const fn undefined() -> Self {
        Self { reference: <K::Ref as Reference>::UNDEFINED, data: None }
    }

    /// Bundle `reference` with `data`. Only containers mint definitions.
    #[inline]
    pub(crate) fn new(reference: K::Ref, data: K) -> Self {
        Self { reference, data: Some(Arc::new(data)) }
    }

    /// The definition's reference (the sentinel when undefined).
    #[inline]
    #[must_use]
    pub fn reference(&self) -> K::Ref {
        self.reference
    }

    /// Raw reference value widened to `u64`.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> u64 {
        self.reference.to_u64()
    }

    /// Whether this is a real definition (not the undefined value).
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.data.is_some()
    }

    /// Fields, if defined.
    #[inline]
    #[must_use]
    pub fn data(&self) -> Option<&K> {
        self.data.as_deref()
    }

    /// Fields, or [`RegistryError::UndefinedReference`].
    #[inline]
    pub fn try_data(&self) -> Result<&K> {
        self.data.as_deref().ok_or(RegistryError::UndefinedReference {
            kind: K::NAME,
            raw: self.reference.to_u64(),
        })
    }

    /// Whether both values share the same stored fields.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => self.reference == other.reference,
            _ => false,
        }
    }
}

impl<K: Kind> Clone for Def<K> {
    #[inline]
    fn clone(&self) -> Self {
        Self { reference: self.reference, data: self.data.clone() }
    }
}

impl<K: Kind> Default for Def<K> {
    #[inline]
    fn default() -> Self {
        Self::undefined()
    }
}

impl<K: Kind + PartialEq> PartialEq for Def<K> {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
            && match (&self.data, &other.data) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b) || **a == **b,
                (None, None) => true,
                _ => false,
            }
    }
}

impl<K: Kind + Eq> Eq for Def<K> {}

impl<K: Kind + fmt::Debug> fmt::Debug for Def<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => f
                .debug_struct(K::NAME)
                .field("ref", &self.reference)
                .field("data", data)
                .finish(),
            None => write!(f, "{}(undefined)", K::NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::StringDef;
    use crate::reference::StringRef;

    #[test]
    fn undefined_is_invalid_and_uses_the_sentinel() {
        let d = Def::<StringDef>::undefined();
        assert!(!d.is_valid());
        assert!(d.reference().is_undefined());
        assert!(d.data().is_none());
        assert_eq!(
            d.try_data(),
            Err(RegistryError::UndefinedReference { kind: "string", raw: u64::from(u32::MAX) })
        );
        assert_eq!(d, Def::default());
    }

    #[test]
    fn copies_share_their_fields() {
        let d = Def::new(StringRef::new(1), StringDef::new("x"));
        let e = d.clone();
        assert!(d.ptr_eq(&e));
        assert_eq!(d, e);

        // Equal content under the same reference compares equal.
        let f = Def::new(StringRef::new(1), StringDef::new("x"));
        assert!(!d.ptr_eq(&f));
        assert_eq!(d, f);
    }

    #[test]
    fn outlives_its_source() {
        let d = {
            let source = vec![Def::new(StringRef::new(9), StringDef::new("kept"))];
            source[0].clone()
        };
        assert_eq!(d.as_str(), Some("kept"));
    }
}
