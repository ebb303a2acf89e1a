//! Roblox's binary model/place format: a chunked, columnar, LZ4-compressed
//! encoding of a `WeakDom` instance tree.
//!
//! Property types are not looked up in a reflection schema here; a
//! property's wire type is inferred from the first value observed for it
//! across the instances being serialized, and a later mismatch is a hard
//! error. See [`to_writer`] and [`from_reader`].

mod chunk;
mod core;
mod deserializer;
mod error;
mod serializer;
mod types;

pub use deserializer::{decode as from_reader, DecodeOptions, DecodeResult};
pub use error::{DecodeWarning, Error};
pub use serializer::encode as to_writer;

#[cfg(test)]
mod test {
    use super::*;

    use rbx_dom_weak::{InstanceBuilder, WeakDom};
    use rbx_types::{Variant, Vector3};

    fn round_trip(dom: &WeakDom, refs: &[rbx_types::Ref]) -> WeakDom {
        let mut buffer = Vec::new();
        to_writer(dom, refs, &mut buffer).expect("encode should succeed");

        let result = from_reader(buffer.as_slice()).expect("decode should succeed");
        assert!(
            result.warnings.is_empty(),
            "unexpected decode warnings: {:?}",
            result.warnings
        );
        result.dom
    }

    #[test]
    fn empty_tree_round_trips() {
        let dom = WeakDom::new(InstanceBuilder::new("DataModel"));
        let result = round_trip(&dom, &[]);
        assert_eq!(result.root().children().len(), 0);
    }

    #[test]
    fn single_instance_round_trips() {
        let mut dom = WeakDom::new(InstanceBuilder::new("DataModel"));
        let root_ref = dom.root_ref();
        let part = dom.insert(
            root_ref,
            InstanceBuilder::new("Part").with_name("MyPart"),
        );

        let result = round_trip(&dom, &[part]);
        let children = result.root().children();
        assert_eq!(children.len(), 1);

        let instance = result.get_by_ref(children[0]).unwrap();
        assert_eq!(instance.class, "Part");
        assert_eq!(instance.name, "MyPart");
    }

    #[test]
    fn nested_tree_preserves_parentage() {
        let mut dom = WeakDom::new(InstanceBuilder::new("DataModel"));
        let root_ref = dom.root_ref();
        let folder = dom.insert(root_ref, InstanceBuilder::new("Folder").with_name("Stuff"));
        let part = dom.insert(folder, InstanceBuilder::new("Part").with_name("Child"));

        let result = round_trip(&dom, &[folder, part]);

        let folder_children = result.root().children();
        assert_eq!(folder_children.len(), 1);

        let folder_instance = result.get_by_ref(folder_children[0]).unwrap();
        assert_eq!(folder_instance.class, "Folder");
        assert_eq!(folder_instance.children().len(), 1);

        let part_instance = result.get_by_ref(folder_instance.children()[0]).unwrap();
        assert_eq!(part_instance.class, "Part");
        assert_eq!(part_instance.name, "Child");
    }

    #[test]
    fn property_values_round_trip() {
        let mut dom = WeakDom::new(InstanceBuilder::new("DataModel"));
        let root_ref = dom.root_ref();
        let part = dom.insert(
            root_ref,
            InstanceBuilder::new("Part").with_properties(vec![
                ("Position".to_owned(), Variant::Vector3(Vector3::new(1.0, 2.0, 3.0))),
                ("Transparency".to_owned(), Variant::Float32(0.5)),
                ("Anchored".to_owned(), Variant::Bool(true)),
            ]),
        );

        let result = round_trip(&dom, &[part]);
        let instance = result.get_by_ref(result.root().children()[0]).unwrap();

        assert_eq!(
            instance.properties.get("Position"),
            Some(&Variant::Vector3(Vector3::new(1.0, 2.0, 3.0)))
        );
        assert_eq!(
            instance.properties.get("Transparency"),
            Some(&Variant::Float32(0.5))
        );
        assert_eq!(instance.properties.get("Anchored"), Some(&Variant::Bool(true)));
    }

    #[test]
    fn cross_references_round_trip() {
        let mut dom = WeakDom::new(InstanceBuilder::new("DataModel"));
        let root_ref = dom.root_ref();
        let target = dom.insert(root_ref, InstanceBuilder::new("Part").with_name("Target"));
        let pointer = dom.insert(
            root_ref,
            InstanceBuilder::new("ObjectValue")
                .with_name("Pointer")
                .with_property("Value", Variant::Ref(target)),
        );

        let result = round_trip(&dom, &[target, pointer]);

        let mut pointer_instance = None;
        for child in result.root().children() {
            let instance = result.get_by_ref(*child).unwrap();
            if instance.class == "ObjectValue" {
                pointer_instance = Some(instance);
            }
        }
        let pointer_instance = pointer_instance.expect("ObjectValue instance should exist");

        let resolved_target_ref = match pointer_instance.properties.get("Value") {
            Some(Variant::Ref(referent)) => *referent,
            other => panic!("expected a Ref property, got {:?}", other),
        };

        let resolved_target = result.get_by_ref(resolved_target_ref).unwrap();
        assert_eq!(resolved_target.name, "Target");
    }

    #[test]
    fn unresolved_reference_becomes_warning() {
        // A Ref property pointing at an instance that isn't part of the
        // encoded subtree decodes to null with a warning rather than an
        // error.
        let mut dom = WeakDom::new(InstanceBuilder::new("DataModel"));
        let root_ref = dom.root_ref();
        let excluded = dom.insert(root_ref, InstanceBuilder::new("Part"));
        let pointer = dom.insert(
            root_ref,
            InstanceBuilder::new("ObjectValue").with_property("Value", Variant::Ref(excluded)),
        );

        let mut buffer = Vec::new();
        to_writer(&dom, &[pointer], &mut buffer).unwrap();

        let result = from_reader(buffer.as_slice()).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            result.warnings[0],
            DecodeWarning::UnresolvedReference { .. }
        ));
    }

    #[test]
    fn shared_strings_deduplicate() {
        use rbx_types::SharedString;

        let mut dom = WeakDom::new(InstanceBuilder::new("DataModel"));
        let root_ref = dom.root_ref();
        let shared = SharedString::new(b"hello world".to_vec());

        let a = dom.insert(
            root_ref,
            InstanceBuilder::new("Script")
                .with_property("Source", Variant::SharedString(shared.clone())),
        );
        let b = dom.insert(
            root_ref,
            InstanceBuilder::new("Script").with_property("Source", Variant::SharedString(shared)),
        );

        let result = round_trip(&dom, &[a, b]);
        for child in result.root().children() {
            let instance = result.get_by_ref(*child).unwrap();
            match instance.properties.get("Source") {
                Some(Variant::SharedString(value)) => {
                    assert_eq!(value.data(), b"hello world");
                }
                other => panic!("expected a SharedString property, got {:?}", other),
            }
        }
    }

    #[test]
    fn rejects_property_type_mismatch() {
        let mut dom = WeakDom::new(InstanceBuilder::new("DataModel"));
        let root_ref = dom.root_ref();
        let a = dom.insert(
            root_ref,
            InstanceBuilder::new("Part").with_property("Foo", Variant::Bool(true)),
        );
        let b = dom.insert(
            root_ref,
            InstanceBuilder::new("Part").with_property("Foo", Variant::Float32(1.0)),
        );

        let mut buffer = Vec::new();
        let err = to_writer(&dom, &[a, b], &mut buffer).unwrap_err();
        assert!(format!("{}", err).contains("Foo"));
    }
}
