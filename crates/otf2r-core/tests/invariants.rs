//! Invariants for reference allocation and registry storage.
//!
//! These tests treat:
//! - the **generator** as the sole authority on uniqueness within a
//!   namespace, whatever mix of explicit and automatic references is used,
//! - the **registry** as insertion-ordered storage whose definitions stay
//!   readable after it is dropped.

use std::collections::HashSet;

use otf2r_core::prelude::*;
use otf2r_core::ReferenceGenerator;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Register(u32),
    Allocate,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..10_000).prop_map(Op::Register),
        Just(Op::Allocate),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64, // good CI/runtime balance
        .. ProptestConfig::default()
    })]

    // Property: `next()` never returns a reference that was registered or
    // allocated before.
    #[test]
    fn next_is_always_fresh(ops in prop::collection::vec(op(), 1..200)) {
        let mut g = ReferenceGenerator::<RegionRef>::new();
        let mut used = HashSet::new();
        for op in ops {
            match op {
                Op::Register(raw) => {
                    g.register_reference(RegionRef::new(raw));
                    used.insert(raw);
                }
                Op::Allocate => {
                    let r = g.next().unwrap();
                    prop_assert!(!used.contains(&r.get()));
                    prop_assert!(!r.is_undefined());
                    g.register_reference(r);
                    used.insert(r.get());
                }
            }
        }
    }

    // Property: explicit references survive a registry round trip and
    // iteration yields them in insertion order.
    #[test]
    fn explicit_references_round_trip(raws in prop::collection::hash_set(0u32..1_000_000, 1..64)) {
        let raws: Vec<u32> = raws.into_iter().collect();
        let mut registry = Registry::new();
        for &raw in &raws {
            let d = registry.create_with_ref(StringRef::new(raw), StringDef::new(raw.to_string())).unwrap();
            prop_assert_eq!(d.reference().get(), raw);
        }
        for &raw in &raws {
            let d = registry.get::<StringDef>(StringRef::new(raw));
            let expected = raw.to_string();
            prop_assert_eq!(d.as_str(), Some(expected.as_str()));
        }
        let order: Vec<u32> = registry.definitions::<StringDef>().map(|d| d.reference().get()).collect();
        prop_assert_eq!(order, raws.clone());

        let fresh = registry.create(StringDef::new("fresh")).unwrap();
        prop_assert_eq!(Some(fresh.reference().get()), raws.iter().max().map(|m| m + 1));
    }
}

#[test]
fn narrow_namespace_is_exhausted_without_yielding_the_sentinel() {
    let mut registry = Registry::new();
    for i in 0..u8::MAX {
        let d = registry
            .create(IoParadigm { io_class: IoParadigmClass::Serial, ..IoParadigm::default() })
            .unwrap();
        assert_eq!(d.reference(), IoParadigmRef::new(i));
    }
    assert_eq!(registry.count::<IoParadigm>(), 255);
    assert_eq!(
        registry.create(IoParadigm::default()).unwrap_err(),
        RegistryError::Exhausted { namespace: "io_paradigm" }
    );
}

#[test]
fn namespaces_are_independent() {
    let mut registry = Registry::new();
    registry.create_with_ref(StringRef::new(500), StringDef::new("x")).unwrap();
    assert_eq!(registry.next_reference::<StringRef>().unwrap(), StringRef::new(501));
    assert_eq!(registry.next_reference::<RegionRef>().unwrap(), RegionRef::new(0));
    assert_eq!(registry.next_reference::<LocationRef>().unwrap(), LocationRef::new(0));
}

#[test]
fn definitions_outlive_the_registry() {
    let region = {
        let mut registry = Registry::new();
        let name = registry.create(StringDef::new("solve")).unwrap();
        registry.create(Region::new(name, RegionRole::Function, Paradigm::Compiler)).unwrap()
    };
    let data = region.data().unwrap();
    assert_eq!(data.name.as_str(), Some("solve"));
    assert_eq!(data.role, RegionRole::Function);
}

#[test]
fn explicit_reference_is_retrievable() {
    let mut registry = Registry::new();
    registry.create_with_ref(StringRef::new(42), StringDef::new("answer")).unwrap();
    let d = registry.get::<StringDef>(StringRef::new(42));
    assert_eq!(d.as_str(), Some("answer"));
    assert_eq!(d.reference(), StringRef::new(42));
}

#[test]
fn automatic_references_increase() {
    let mut registry = Registry::new();
    let refs: Vec<StringRef> = ["a", "b", "c"]
        .into_iter()
        .map(|s| registry.create(StringDef::new(s)).unwrap().reference())
        .collect();
    assert!(refs.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn automatic_references_never_collide_with_an_explicit_one() {
    let mut registry = Registry::new();
    registry.create_with_ref(StringRef::new(42), StringDef::new("answer")).unwrap();
    let mut seen = HashSet::with_capacity(100_000);
    for i in 0..100_000u32 {
        let r = registry.create(StringDef::new(i.to_string())).unwrap().reference();
        assert_ne!(r, StringRef::new(42));
        assert!(seen.insert(r));
    }
    assert_eq!(registry.count::<StringDef>(), 100_001);
}

#[test]
fn parent_chain() {
    let mut registry = Registry::new();
    let name = registry.create(StringDef::new("machine")).unwrap();
    let class = registry.create(StringDef::new("node")).unwrap();
    let root = registry
        .create(SystemTreeNode::new(name.clone(), class.clone(), Def::undefined()))
        .unwrap();
    let child = registry.create(SystemTreeNode::new(name, class, root.clone())).unwrap();

    assert!(child.has_parent());
    assert_eq!(child.parent(), root);
    assert!(!root.has_parent());
    assert!(!root.parent().is_valid());
    assert_eq!(child.ancestors().count(), 1);
}

#[test]
fn shared_io_file_namespace() {
    let mut registry = Registry::new();
    let path = registry.create(StringDef::new("/tmp")).unwrap();
    let file = registry
        .create_with_ref(IoFileRef::new(3), IoRegularFile { name: path.clone(), scope: Def::undefined() })
        .unwrap();
    let dir = registry
        .create_with_ref(IoFileRef::new(7), IoDirectory { name: path, scope: Def::undefined() })
        .unwrap();

    let taken = [file.reference(), dir.reference()];
    for _ in 0..4 {
        let next = registry.create(IoRegularFile::default()).unwrap().reference();
        assert!(!taken.contains(&next));
        let next = registry.create(IoDirectory::default()).unwrap().reference();
        assert!(!taken.contains(&next));
    }
    assert!(matches!(registry.io_file(IoFileRef::new(3)), Some(IoFile::Regular(_))));
    assert!(matches!(registry.io_file(IoFileRef::new(7)), Some(IoFile::Directory(_))));
}
