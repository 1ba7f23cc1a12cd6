//! Insertion-ordered definition storage.
//!
//! Iteration follows insertion order, not numeric reference order: the
//! write phase needs a dependency-respecting order, and insertion order is
//! one by construction (a definition can only name definitions that were
//! inserted before it).

use indexmap::IndexMap;

use crate::definition::{Def, Kind};
use crate::defs::Property;
use crate::reference::Reference;

/// Outcome of inserting a definition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertAction {
    /// Reference was new; definition inserted.
    InsertedNew,
    /// Reference existed; the existing definition was kept.
    KeptExisting,
}

/// Map from reference to definition for one kind.
pub struct DefinitionContainer<K: Kind> {
    defs: IndexMap<K::Ref, Def<K>>,
}

impl<K: Kind> DefinitionContainer<K> {
    /// Empty container.
    #[must_use]
    pub fn new() -> Self {
        Self { defs: IndexMap::new() }
    }

    /// Insert `def` under its own reference.
    ///
    /// A duplicate reference keeps the existing entry (emplace semantics)
    /// and reports [`InsertAction::KeptExisting`]. Undefined values are never
    /// stored and also report `KeptExisting`.
    pub fn add_definition(&mut self, def: Def<K>) -> InsertAction {
        if !def.is_valid() {
            return InsertAction::KeptExisting;
        }
        match self.defs.entry(def.reference()) {
            indexmap::map::Entry::Occupied(_) => InsertAction::KeptExisting,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(def);
                InsertAction::InsertedNew
            }
        }
    }

    /// Construct a definition from `data` under `reference` and insert it.
    ///
    /// Returns a copy of the stored value, which is the pre-existing one when
    /// `reference` was already present.
    pub fn emplace(&mut self, reference: K::Ref, data: K) -> Def<K> {
        self.defs.entry(reference).or_insert_with(|| Def::new(reference, data)).clone()
    }

    /// Stored value for `reference`, or the undefined value when
    /// `reference` is the sentinel or unknown.
    #[must_use]
    pub fn get(&self, reference: K::Ref) -> Def<K> {
        if reference.is_undefined() {
            return Def::undefined();
        }
        self.defs.get(&reference).cloned().unwrap_or_default()
    }

    /// Borrow the stored value, if any.
    #[must_use]
    pub fn find(&self, reference: K::Ref) -> Option<&Def<K>> {
        self.defs.get(&reference)
    }

    /// Whether `reference` is stored.
    #[must_use]
    pub fn contains(&self, reference: K::Ref) -> bool {
        self.defs.contains_key(&reference)
    }

    /// `1` if `reference` is stored, else `0`.
    #[must_use]
    pub fn count(&self, reference: K::Ref) -> usize {
        usize::from(self.contains(reference))
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the container is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Def<K>> + '_ {
        self.defs.values()
    }

    /// References in insertion order.
    pub fn references(&self) -> impl ExactSizeIterator<Item = K::Ref> + '_ {
        self.defs.keys().copied()
    }
}

impl<K: Kind> Default for DefinitionContainer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kind> Clone for DefinitionContainer<K> {
    fn clone(&self) -> Self {
        Self { defs: self.defs.clone() }
    }
}

impl<K: Kind> std::fmt::Debug for DefinitionContainer<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionContainer")
            .field("kind", &K::NAME)
            .field("len", &self.defs.len())
            .finish()
    }
}

impl<'a, K: Kind> IntoIterator for &'a DefinitionContainer<K> {
    type Item = &'a Def<K>;
    type IntoIter = indexmap::map::Values<'a, K::Ref, Def<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.defs.values()
    }
}

/// Sequence of properties attached to definitions of kind `O`.
///
/// Properties have no reference; position is the key.
pub struct PropertyContainer<O: Kind> {
    props: Vec<Property<O>>,
}

impl<O: Kind> PropertyContainer<O> {
    /// Empty container.
    #[must_use]
    pub const fn new() -> Self {
        Self { props: Vec::new() }
    }

    /// Append a property and return its position.
    pub fn add(&mut self, property: Property<O>) -> usize {
        self.props.push(property);
        self.props.len() - 1
    }

    /// Property at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Property<O>> {
        self.props.get(index)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Whether the container is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Properties in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Property<O>> {
        self.props.iter()
    }

    /// Properties attached to `owner`, in insertion order.
    pub fn of(&self, owner: O::Ref) -> impl Iterator<Item = &Property<O>> + '_ {
        self.props.iter().filter(move |p| p.owner.reference() == owner)
    }
}

impl<O: Kind> Default for PropertyContainer<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Kind> Clone for PropertyContainer<O> {
    fn clone(&self) -> Self {
        Self { props: self.props.clone() }
    }
}

impl<O: Kind> std::fmt::Debug for PropertyContainer<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyContainer")
            .field("owner", &O::NAME)
            .field("len", &self.props.len())
            .finish()
    }
}

impl<'a, O: Kind> IntoIterator for &'a PropertyContainer<O> {
    type Item = &'a Property<O>;
    type IntoIter = std::slice::Iter<'a, Property<O>>;

    fn into_iter(self) -> Self::IntoIter {
        self.props.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{StringDef, SystemTreeNode};
    use crate::enums::AttributeValue;
    use crate::reference::{StringRef, SystemTreeNodeRef};

    fn strings(refs: &[u32]) -> DefinitionContainer<StringDef> {
        let mut c = DefinitionContainer::new();
        for &r in refs {
            c.emplace(StringRef::new(r), StringDef::new(format!("s{r}")));
        }
        c
    }

    #[test]
    fn iterates_in_insertion_order() {
        let c = strings(&[5, 2, 9]);
        let order: Vec<u32> = c.iter().map(|d| d.reference().get()).collect();
        assert_eq!(order, vec![5, 2, 9]);
        // Restartable.
        let again: Vec<u32> = c.references().map(StringRef::get).collect();
        assert_eq!(again, order);
    }

    #[test]
    fn lookup_of_sentinel_or_absent_is_undefined() {
        let c = strings(&[1]);
        assert!(!c.get(StringRef::UNDEFINED).is_valid());
        assert!(!c.get(StringRef::new(77)).is_valid());
        assert_eq!(c.get(StringRef::new(1)).as_str(), Some("s1"));
    }

    // Duplicate insertion is tolerated: the first definition wins.
    #[test]
    fn duplicate_emplace_keeps_the_first() {
        let mut c = strings(&[3]);
        let kept = c.emplace(StringRef::new(3), StringDef::new("other"));
        assert_eq!(kept.as_str(), Some("s3"));
        assert_eq!(c.len(), 1);

        let dup = Def::new(StringRef::new(3), StringDef::new("again"));
        assert_eq!(c.add_definition(dup), InsertAction::KeptExisting);
        assert_eq!(c.get(StringRef::new(3)).as_str(), Some("s3"));
        assert_eq!(c.count(StringRef::new(3)), 1);
        assert_eq!(c.count(StringRef::new(4)), 0);
    }

    #[test]
    fn undefined_values_are_not_stored() {
        let mut c = DefinitionContainer::<StringDef>::new();
        assert_eq!(c.add_definition(Def::undefined()), InsertAction::KeptExisting);
        assert!(c.is_empty());
    }

    #[test]
    fn properties_are_positional() {
        let node = Def::new(SystemTreeNodeRef::new(0), SystemTreeNode::default());
        let other = Def::new(SystemTreeNodeRef::new(1), SystemTreeNode::default());
        let name = Def::new(StringRef::new(0), StringDef::new("cores"));

        let mut props = PropertyContainer::new();
        assert_eq!(props.add(Property::new(node.clone(), name.clone(), AttributeValue::UInt32(8))), 0);
        assert_eq!(props.add(Property::new(other, name.clone(), AttributeValue::UInt32(4))), 1);
        assert_eq!(props.add(Property::new(node, name, AttributeValue::UInt32(16))), 2);

        let values: Vec<_> = props.of(SystemTreeNodeRef::new(0)).map(|p| p.value.clone()).collect();
        assert_eq!(values, vec![AttributeValue::UInt32(8), AttributeValue::UInt32(16)]);
        assert_eq!(props.get(1).map(|p| p.owner.reference()), Some(SystemTreeNodeRef::new(1)));
    }
}
