//! A weakly-typed implementation of Roblox's instance tree.
//!
//! `WeakDom` owns every `Instance` in a tree inside one arena, keyed by the
//! stable, randomly-generated [`Ref`] handles that `rbx_types` hands out.
//! Instances refer to their parent and children by `Ref` rather than by Rust
//! reference, which is what makes the "weak" in the name: there's no
//! lifetime tying an `Instance` to its tree, only a handle that's only valid
//! as long as the owning `WeakDom` is alive and hasn't dropped it.

mod error;
mod instance;

pub use error::CycleError;
pub use instance::{Instance, InstanceBuilder};

pub use rbx_types as types;

use std::collections::{HashMap, HashSet};

use rbx_types::{Ref, Variant};

/// An owning arena of `Instance`s, with one instance acting as the root of
/// the document (spec.md's "Root"). The root holds the document's
/// string-to-string metadata; its children are the document's top-level
/// instances.
#[derive(Debug)]
pub struct WeakDom {
    instances: HashMap<Ref, Instance>,
    root_ref: Ref,
    metadata: HashMap<String, String>,
}

impl WeakDom {
    /// Create a new `WeakDom` whose root instance is built from `builder`.
    /// The builder's own properties and name become the root's; in practice
    /// the root is usually an invisible container like `DataModel` whose
    /// *children* are the meaningful top-level instances.
    pub fn new(builder: InstanceBuilder) -> WeakDom {
        let mut dom = WeakDom {
            instances: HashMap::new(),
            root_ref: builder.referent(),
            metadata: HashMap::new(),
        };

        dom.insert_builder(Ref::none(), builder);
        dom
    }

    pub fn root_ref(&self) -> Ref {
        self.root_ref
    }

    pub fn root(&self) -> &Instance {
        self.get_by_ref(self.root_ref).unwrap()
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.metadata
    }

    pub fn get_by_ref(&self, referent: Ref) -> Option<&Instance> {
        self.instances.get(&referent)
    }

    pub fn get_by_ref_mut(&mut self, referent: Ref) -> Option<&mut Instance> {
        self.instances.get_mut(&referent)
    }

    /// Inserts the subtree described by `builder` as a new child of
    /// `parent_ref`, returning the referent assigned to its root. Panics if
    /// `parent_ref` does not name an existing instance in this dom.
    pub fn insert(&mut self, parent_ref: Ref, builder: InstanceBuilder) -> Ref {
        assert!(
            self.instances.contains_key(&parent_ref),
            "parent_ref did not refer to an instance in this WeakDom"
        );

        let referent = builder.referent();
        self.insert_builder(parent_ref, builder);
        referent
    }

    fn insert_builder(&mut self, parent_ref: Ref, builder: InstanceBuilder) {
        let InstanceBuilder {
            referent,
            name,
            class,
            properties,
            children,
        } = builder;

        self.instances.insert(
            referent,
            Instance {
                referent,
                children: Vec::new(),
                parent: parent_ref,
                name,
                class,
                properties,
            },
        );

        if let Some(parent) = self.instances.get_mut(&parent_ref) {
            parent.children.push(referent);
        }

        for child in children {
            self.insert_builder(referent, child);
        }
    }

    /// Removes `referent` and every descendant of it from the dom. Has no
    /// effect if `referent` doesn't exist (consistent with "a root is
    /// destroyed by dropping it; all descendants go with it"). If any
    /// surviving instance held a `Ref` property pointing into the destroyed
    /// subtree, that reference is now dangling; this is logged via
    /// `log::warn!` rather than treated as an error, since `WeakDom` doesn't
    /// track reverse references and can't reject the destroy without one.
    pub fn destroy(&mut self, referent: Ref) {
        let instance = match self.instances.remove(&referent) {
            Some(instance) => instance,
            None => return,
        };

        if let Some(parent) = self.instances.get_mut(&instance.parent) {
            parent.children.retain(|&child| child != referent);
        }

        let mut removed = HashSet::new();
        removed.insert(referent);

        for child in instance.children {
            self.destroy_subtree(child, &mut removed);
        }

        self.warn_dangling_references(&removed);
    }

    fn destroy_subtree(&mut self, referent: Ref, removed: &mut HashSet<Ref>) {
        if let Some(instance) = self.instances.remove(&referent) {
            removed.insert(referent);

            for child in instance.children {
                self.destroy_subtree(child, removed);
            }
        }
    }

    /// Scans every surviving instance's properties for a `Ref` pointing at
    /// something in `removed`, logging a warning for each one found.
    fn warn_dangling_references(&self, removed: &HashSet<Ref>) {
        for instance in self.instances.values() {
            for (prop_name, value) in &instance.properties {
                if let Variant::Ref(target) = value {
                    if removed.contains(target) {
                        log::warn!(
                            "destroying a subtree left {}.{} on instance {} dangling",
                            instance.class,
                            prop_name,
                            instance.referent
                        );
                    }
                }
            }
        }
    }

    /// Returns `true` if `descendant` is `ancestor` or is nested anywhere
    /// underneath it.
    fn is_self_or_descendant(&self, ancestor: Ref, descendant: Ref) -> bool {
        let mut current = descendant;

        loop {
            if current == ancestor {
                return true;
            }

            match self.instances.get(&current) {
                Some(instance) if instance.parent.is_some() => current = instance.parent,
                _ => return false,
            }
        }
    }

    /// Re-parents `referent` under `new_parent`. A no-op if `new_parent` is
    /// already its parent. Fails with [`CycleError`] if `new_parent` is
    /// `referent` itself or a descendant of it.
    pub fn set_parent(&mut self, referent: Ref, new_parent: Ref) -> Result<(), CycleError> {
        let current_parent = match self.instances.get(&referent) {
            Some(instance) => instance.parent,
            None => return Ok(()),
        };

        if current_parent == new_parent {
            return Ok(());
        }

        if self.is_self_or_descendant(referent, new_parent) {
            return Err(CycleError {
                subject: referent,
                new_parent,
            });
        }

        if let Some(old_parent) = self.instances.get_mut(&current_parent) {
            old_parent.children.retain(|&child| child != referent);
        }

        if let Some(new_parent_instance) = self.instances.get_mut(&new_parent) {
            new_parent_instance.children.push(referent);
        }

        if let Some(instance) = self.instances.get_mut(&referent) {
            instance.parent = new_parent;
        }

        Ok(())
    }

    /// Appends `builder` as a new last child of `parent_ref`.
    pub fn add_child(&mut self, parent_ref: Ref, builder: InstanceBuilder) -> Ref {
        self.insert(parent_ref, builder)
    }

    /// Inserts `builder` as a child of `parent_ref` at `index`, clamping an
    /// out-of-range index to `[0, len]`.
    pub fn add_child_at(&mut self, parent_ref: Ref, index: usize, builder: InstanceBuilder) -> Ref {
        let referent = self.insert(parent_ref, builder);

        if let Some(parent) = self.instances.get_mut(&parent_ref) {
            let last = parent.children.len() - 1;
            let index = index.min(last);
            parent.children.remove(last);
            parent.children.insert(index, referent);
        }

        referent
    }

    /// Removes `index`th child of `parent_ref` from its children list and
    /// sets its parent to none, without dropping it. Does nothing if
    /// `index` is out of range.
    pub fn remove_child_at(&mut self, parent_ref: Ref, index: usize) -> Option<Ref> {
        let child = {
            let parent = self.instances.get_mut(&parent_ref)?;
            if index >= parent.children.len() {
                return None;
            }
            parent.children.remove(index)
        };

        if let Some(instance) = self.instances.get_mut(&child) {
            instance.parent = Ref::none();
        }

        Some(child)
    }

    /// Removes `child` from `parent_ref`'s children, if present, without
    /// dropping it.
    pub fn remove_child(&mut self, parent_ref: Ref, child: Ref) {
        if let Some(parent) = self.instances.get_mut(&parent_ref) {
            if let Some(index) = parent.children.iter().position(|&c| c == child) {
                parent.children.remove(index);
            } else {
                return;
            }
        } else {
            return;
        }

        if let Some(instance) = self.instances.get_mut(&child) {
            instance.parent = Ref::none();
        }
    }

    /// Unparents every child of `parent_ref` without destroying them.
    pub fn remove_all(&mut self, parent_ref: Ref) {
        let children = match self.instances.get_mut(&parent_ref) {
            Some(parent) => std::mem::take(&mut parent.children),
            None => return,
        };

        for child in children {
            if let Some(instance) = self.instances.get_mut(&child) {
                instance.parent = Ref::none();
            }
        }
    }

    /// Scans `parent_ref`'s children in order for one whose `Name` matches.
    /// When `recursive` is set, searches pre-order depth-first instead and
    /// stops at the first match anywhere in the subtree.
    pub fn find_first_child(&self, parent_ref: Ref, name: &str, recursive: bool) -> Option<Ref> {
        let parent = self.instances.get(&parent_ref)?;

        if recursive {
            self.find_first_child_recursive(&parent.children, name)
        } else {
            parent
                .children
                .iter()
                .copied()
                .find(|&child| self.name_of(child) == name)
        }
    }

    fn find_first_child_recursive(&self, children: &[Ref], name: &str) -> Option<Ref> {
        for &child in children {
            if self.name_of(child) == name {
                return Some(child);
            }

            if let Some(instance) = self.instances.get(&child) {
                if let Some(found) = self.find_first_child_recursive(&instance.children, name) {
                    return Some(found);
                }
            }
        }

        None
    }

    fn name_of(&self, referent: Ref) -> &str {
        self.instances
            .get(&referent)
            .map(|instance| instance.name.as_str())
            .unwrap_or("")
    }

    /// Walks up from `referent` to the root, joining each ancestor's Name
    /// (self last) with `.`. Does not stop at service boundaries; see
    /// DESIGN.md's Open Question (a).
    pub fn full_name(&self, referent: Ref) -> String {
        let mut components = Vec::new();
        let mut current = referent;

        while let Some(instance) = self.instances.get(&current) {
            components.push(instance.name.as_str());
            if instance.parent.is_none() {
                break;
            }
            current = instance.parent;
        }

        components.reverse();
        components.join(".")
    }

    /// Renders a `Variant` the way spec.md's "tostring" rule for `Reference`
    /// values describes: `<nil>` for a null reference, otherwise the
    /// target's `Name` (or `ClassName` if `Name` is unset or empty).
    pub fn display_value(&self, value: &Variant) -> String {
        match value {
            Variant::Ref(referent) if referent.is_none() => "<nil>".to_owned(),
            Variant::Ref(referent) => match self.instances.get(referent) {
                Some(instance) if !instance.name.is_empty() => instance.name.clone(),
                Some(instance) => instance.class.clone(),
                None => "<nil>".to_owned(),
            },
            other => other.to_string(),
        }
    }

    /// Deep-copies the subtree rooted at `referent` into this same dom,
    /// returning the referent of the new root. Any `Reference` property
    /// inside the subtree that pointed to another instance inside the
    /// subtree is rewritten to point at the corresponding clone; a
    /// `Reference` pointing outside the subtree is left unchanged, so it
    /// keeps pointing at the original instance.
    pub fn clone_instance(&mut self, referent: Ref) -> Ref {
        let mut ref_map = HashMap::new();
        let new_parent = self
            .instances
            .get(&referent)
            .map(|instance| instance.parent)
            .unwrap_or_else(Ref::none);

        let new_root = self.clone_subtree_into(referent, new_parent, &mut ref_map);
        self.rewrite_cloned_references(&ref_map);
        new_root
    }

    fn clone_subtree_into(
        &mut self,
        source: Ref,
        new_parent: Ref,
        ref_map: &mut HashMap<Ref, Ref>,
    ) -> Ref {
        let (name, class, properties, children) = {
            let instance = self.instances.get(&source).expect("source must exist");
            (
                instance.name.clone(),
                instance.class.clone(),
                instance.properties.clone(),
                instance.children.clone(),
            )
        };

        let new_referent = Ref::new();
        ref_map.insert(source, new_referent);

        self.instances.insert(
            new_referent,
            Instance {
                referent: new_referent,
                children: Vec::new(),
                parent: new_parent,
                name,
                class,
                properties,
            },
        );

        if let Some(parent) = self.instances.get_mut(&new_parent) {
            parent.children.push(new_referent);
        }

        for child in children {
            self.clone_subtree_into(child, new_referent, ref_map);
        }

        new_referent
    }

    fn rewrite_cloned_references(&mut self, ref_map: &HashMap<Ref, Ref>) {
        for &new_referent in ref_map.values() {
            let instance = match self.instances.get_mut(&new_referent) {
                Some(instance) => instance,
                None => continue,
            };

            for value in instance.properties.values_mut() {
                if let Variant::Ref(target) = value {
                    if let Some(&rewritten) = ref_map.get(target) {
                        *target = rewritten;
                    }
                    // Otherwise: the reference pointed outside the cloned
                    // subtree. Leave it as-is so it keeps pointing at the
                    // original instance.
                }
            }
        }
    }

    /// Iterates every instance in the dom in unspecified order, including
    /// the root.
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn dom_with_root() -> (WeakDom, Ref) {
        let dom = WeakDom::new(InstanceBuilder::new("DataModel"));
        let root = dom.root_ref();
        (dom, root)
    }

    #[test]
    fn new_instance_has_unique_nonempty_referent() {
        let (dom, root) = dom_with_root();
        assert!(root.is_some());
        assert!(!dom.root().referent().to_string().is_empty());
    }

    #[test]
    fn set_parent_rejects_cycle_on_self() {
        let (mut dom, root) = dom_with_root();
        let child = dom.insert(root, InstanceBuilder::new("Part"));

        assert!(dom.set_parent(child, child).is_err());
    }

    #[test]
    fn set_parent_rejects_cycle_into_descendant() {
        let (mut dom, root) = dom_with_root();
        let p = dom.insert(root, InstanceBuilder::new("Model"));
        let c = dom.insert(p, InstanceBuilder::new("Model"));
        let g = dom.insert(c, InstanceBuilder::new("Model"));

        let before = dom.get_by_ref(p).unwrap().parent();
        assert!(dom.set_parent(p, g).is_err());
        assert_eq!(dom.get_by_ref(p).unwrap().parent(), before);
    }

    #[test]
    fn set_parent_is_idempotent() {
        let (mut dom, root) = dom_with_root();
        let child = dom.insert(root, InstanceBuilder::new("Part"));

        assert!(dom.set_parent(child, root).is_ok());
        assert_eq!(dom.root().children(), &[child]);
    }

    #[test]
    fn find_first_child_non_recursive() {
        let (mut dom, root) = dom_with_root();
        dom.insert(root, InstanceBuilder::new("Part").with_name("A"));
        let target = dom.insert(root, InstanceBuilder::new("Part").with_name("B"));

        assert_eq!(dom.find_first_child(root, "B", false), Some(target));
        assert_eq!(dom.find_first_child(root, "Missing", false), None);
    }

    #[test]
    fn find_first_child_recursive_preorder() {
        let (mut dom, root) = dom_with_root();
        let a = dom.insert(root, InstanceBuilder::new("Model").with_name("A"));
        let target = dom.insert(a, InstanceBuilder::new("Part").with_name("Target"));

        assert_eq!(dom.find_first_child(root, "Target", true), Some(target));
    }

    #[test]
    fn full_name_joins_ancestor_names() {
        let (mut dom, root) = dom_with_root();
        dom.get_by_ref_mut(root).unwrap().name = "Game".to_owned();
        let a = dom.insert(root, InstanceBuilder::new("Model").with_name("A"));
        let b = dom.insert(a, InstanceBuilder::new("Part").with_name("B"));

        assert_eq!(dom.full_name(b), "Game.A.B");
    }

    #[test]
    fn clone_is_structurally_equal_and_independent() {
        let (mut dom, root) = dom_with_root();
        let a = dom.insert(
            root,
            InstanceBuilder::new("Part")
                .with_name("A")
                .with_property("Size", Variant::Float32(2.0)),
        );

        let cloned = dom.clone_instance(a);
        assert_ne!(cloned, a);
        assert_eq!(dom.get_by_ref(cloned).unwrap().name, "A");
        assert_eq!(
            dom.get_by_ref(cloned).unwrap().properties.get("Size"),
            Some(&Variant::Float32(2.0))
        );

        dom.get_by_ref_mut(cloned)
            .unwrap()
            .properties
            .insert("Size".to_owned(), Variant::Float32(99.0));

        assert_eq!(
            dom.get_by_ref(a).unwrap().properties.get("Size"),
            Some(&Variant::Float32(2.0))
        );
    }

    #[test]
    fn clone_rewrites_internal_references_but_not_external() {
        let (mut dom, root) = dom_with_root();
        let outside = dom.insert(root, InstanceBuilder::new("Part").with_name("Outside"));
        let group = dom.insert(root, InstanceBuilder::new("Model").with_name("Group"));
        let inner_a = dom.insert(group, InstanceBuilder::new("Part").with_name("A"));
        let inner_b = dom.insert(
            group,
            InstanceBuilder::new("Part")
                .with_name("B")
                .with_property("Sibling", Variant::Ref(inner_a))
                .with_property("External", Variant::Ref(outside)),
        );
        let _ = inner_b;

        let cloned_group = dom.clone_instance(group);
        let cloned_b = dom.find_first_child(cloned_group, "B", false).unwrap();
        let cloned_a = dom.find_first_child(cloned_group, "A", false).unwrap();

        let props = &dom.get_by_ref(cloned_b).unwrap().properties;
        assert_eq!(props.get("Sibling"), Some(&Variant::Ref(cloned_a)));
        assert_eq!(props.get("External"), Some(&Variant::Ref(outside)));
    }

    #[test]
    fn destroy_drops_whole_subtree() {
        let (mut dom, root) = dom_with_root();
        let a = dom.insert(root, InstanceBuilder::new("Model"));
        let b = dom.insert(a, InstanceBuilder::new("Part"));

        dom.destroy(a);

        assert!(dom.get_by_ref(a).is_none());
        assert!(dom.get_by_ref(b).is_none());
        assert!(dom.root().children().is_empty());
    }
}
