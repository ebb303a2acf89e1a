use std::{
    borrow::{Borrow, Cow},
    collections::{BTreeMap, HashMap},
    convert::TryInto,
    io::Write,
};

use byteorder::WriteBytesExt;
use rbx_dom_weak::WeakDom;
use rbx_types::{
    Axes, BinaryString, BrickColor, CFrame, Color3, Color3uint8, Content, Enum, Faces, Matrix3,
    NumberRange, PhysicalProperties, ProtectedString, Ray, Rect, Ref, SharedString,
    SharedStringHash, UDim, UDim2, Variant, VariantType, Vector2, Vector2int16, Vector3,
    Vector3int16,
};

use crate::{
    chunk::{ChunkBuilder, ChunkCompression},
    core::{RbxWriteExt, FILE_MAGIC_HEADER, FILE_SIGNATURE, FILE_VERSION},
    error::{Error, InnerError},
    types::{self, Type},
};

static FILE_FOOTER: &[u8] = b"</roblox>";

/// Serializes the subtree rooted at each of `refs` from `dom` into Roblox's
/// binary model format.
pub fn encode<W: Write>(dom: &WeakDom, refs: &[Ref], writer: W) -> Result<(), Error> {
    let mut serializer = BinarySerializer::new(dom, writer);

    serializer.add_instances(refs)?;

    log::debug!("type info discovered: {:#?}", serializer.type_infos);

    serializer.generate_referents();
    serializer.generate_shared_string_table();

    log::trace!("referents constructed: {:#?}", serializer.id_to_referent);

    serializer.write_header()?;
    serializer.serialize_metadata()?;
    serializer.serialize_instances()?;
    serializer.serialize_properties()?;
    serializer.serialize_parents()?;
    serializer.serialize_shared_strings()?;
    serializer.serialize_end()?;

    Ok(())
}

struct BinarySerializer<'a, W> {
    dom: &'a WeakDom,
    output: W,
    relevant_instances: Vec<Ref>,
    id_to_referent: HashMap<Ref, i32>,
    type_infos: BTreeMap<String, TypeInfo>,
    next_type_id: u32,
    shared_strings: Vec<SharedString>,
    shared_string_indices: HashMap<SharedStringHash, u32>,
}

#[derive(Debug)]
struct TypeInfo {
    type_id: u32,
    object_refs: Vec<Ref>,
    properties: BTreeMap<String, PropInfo>,
}

#[derive(Debug)]
struct PropInfo {
    prop_type: Type,
    default_value: Cow<'static, Variant>,
}

impl<'a, W: Write> BinarySerializer<'a, W> {
    fn new(dom: &'a WeakDom, output: W) -> Self {
        BinarySerializer {
            dom,
            output,
            relevant_instances: Vec::new(),
            id_to_referent: HashMap::new(),
            type_infos: BTreeMap::new(),
            next_type_id: 0,
            shared_strings: Vec::new(),
            shared_string_indices: HashMap::new(),
        }
    }

    /// Walks the instances reachable from `referents` in pre-order (a node
    /// before any of its descendants, each root before the next), so that
    /// `relevant_instances`/`id_to_referent` order matches spec.md §4.F's
    /// "first-encounter order"/"walk order" requirements.
    fn add_instances(&mut self, referents: &[Ref]) -> Result<(), InnerError> {
        let mut to_visit: Vec<Ref> = referents.iter().rev().copied().collect();

        while let Some(referent) = to_visit.pop() {
            self.relevant_instances.push(referent);
            self.collect_type_info(referent)?;

            let instance = self
                .dom
                .get_by_ref(referent)
                .ok_or(InnerError::InvalidInstanceId { referent })?;
            to_visit.extend(instance.children().iter().rev().copied());
        }

        Ok(())
    }

    /// Builds up `type_infos` from the instances reachable from the roots
    /// passed to `encode`. A property's `data_type` is picked from the first
    /// non-empty value observed for it, per spec.md's typing rule, since
    /// this workspace carries no class/property reflection database.
    fn collect_type_info(&mut self, referent: Ref) -> Result<(), InnerError> {
        let instance = self
            .dom
            .get_by_ref(referent)
            .ok_or(InnerError::InvalidInstanceId { referent })?;

        let class = instance.class.clone();
        let properties: Vec<(String, VariantType)> = instance
            .properties
            .iter()
            .map(|(name, value)| (name.clone(), value.ty()))
            .collect();

        // Resolved before `get_or_create_type_info` takes a `&mut self`
        // borrow, since `full_name` needs its own (shared) access to `self`.
        let full_name = self.dom.full_name(referent);

        let type_info = self.get_or_create_type_info(&class);
        type_info.object_refs.push(referent);

        for (prop_name, observed_ty) in properties {
            match type_info.properties.get(&prop_name) {
                Some(prop_info)
                    if prop_info.prop_type != Type::from_variant_type(observed_ty).unwrap() =>
                {
                    return Err(InnerError::PropTypeMismatch {
                        type_name: class.clone(),
                        prop_name,
                        valid_type_names: "the type of the property's first-seen value",
                        actual_type_name: format!("{:?}", observed_ty),
                        instance_full_name: full_name,
                    });
                }
                Some(_) => {}
                None => {
                    let prop_type = Type::from_variant_type(observed_ty).ok_or_else(|| {
                        InnerError::UnsupportedPropType {
                            type_name: class.clone(),
                            prop_name: prop_name.clone(),
                            prop_type: format!("{:?}", observed_ty),
                        }
                    })?;

                    type_info.properties.insert(
                        prop_name,
                        PropInfo {
                            prop_type,
                            default_value: Cow::Owned(default_value_for(observed_ty)),
                        },
                    );
                }
            }
        }

        Ok(())
    }

    fn get_or_create_type_info(&mut self, class: &str) -> &mut TypeInfo {
        if !self.type_infos.contains_key(class) {
            let type_id = self.next_type_id;
            self.next_type_id += 1;

            let mut properties = BTreeMap::new();

            // `Name` is stored outside of `Instance::properties`, but is
            // serialized as an ordinary property alongside the rest.
            properties.insert(
                "Name".to_owned(),
                PropInfo {
                    prop_type: Type::String,
                    default_value: Cow::Owned(Variant::String(String::new())),
                },
            );

            self.type_infos.insert(
                class.to_owned(),
                TypeInfo {
                    type_id,
                    object_refs: Vec::new(),
                    properties,
                },
            );
        }

        self.type_infos.get_mut(class).unwrap()
    }

    fn generate_referents(&mut self) {
        self.id_to_referent.reserve(self.relevant_instances.len());

        for (next_referent, id) in self.relevant_instances.iter().enumerate() {
            self.id_to_referent
                .insert(*id, next_referent.try_into().unwrap());
        }
    }

    /// Collects every distinct `SharedString` used by a relevant instance,
    /// assigning indices in hash-sorted order per spec.md §4.F step 5.
    fn generate_shared_string_table(&mut self) {
        let mut seen: BTreeMap<SharedStringHash, SharedString> = BTreeMap::new();

        for &referent in &self.relevant_instances {
            let instance = self.dom.get_by_ref(referent).unwrap();
            for value in instance.properties.values() {
                if let Variant::SharedString(shared) = value {
                    seen.insert(shared.hash(), shared.clone());
                }
            }
        }

        for (index, (hash, shared)) in seen.into_iter().enumerate() {
            self.shared_string_indices.insert(hash, index as u32);
            self.shared_strings.push(shared);
        }
    }

    fn write_header(&mut self) -> Result<(), InnerError> {
        log::trace!("writing header");

        self.output.write_all(FILE_MAGIC_HEADER)?;
        self.output.write_all(FILE_SIGNATURE)?;
        self.output.write_le_u16(FILE_VERSION)?;
        self.output.write_le_u32(self.type_infos.len() as u32)?;
        self.output
            .write_le_u32(self.relevant_instances.len() as u32)?;
        self.output.write_all(&[0; 8])?;

        Ok(())
    }

    fn serialize_metadata(&mut self) -> Result<(), InnerError> {
        let metadata = self.dom.metadata();
        if metadata.is_empty() {
            return Ok(());
        }

        log::trace!("writing metadata ({} entries)", metadata.len());

        let mut chunk = ChunkBuilder::new(b"META", ChunkCompression::Compressed);
        chunk.write_le_u32(metadata.len() as u32)?;

        for (key, value) in metadata {
            chunk.write_string(key)?;
            chunk.write_string(value)?;
        }

        chunk.dump(&mut self.output)?;
        Ok(())
    }

    fn serialize_instances(&mut self) -> Result<(), InnerError> {
        log::trace!("writing instance chunks");

        for (type_name, type_info) in &self.type_infos {
            log::trace!(
                "writing chunk for {} ({} instances)",
                type_name,
                type_info.object_refs.len()
            );

            let mut chunk = ChunkBuilder::new(b"INST", ChunkCompression::Compressed);

            chunk.write_le_u32(type_info.type_id)?;
            chunk.write_string(type_name)?;
            chunk.write_bool(false)?; // is_service: not modeled in this workspace
            chunk.write_le_u32(type_info.object_refs.len() as u32)?;

            chunk.write_referents(
                type_info
                    .object_refs
                    .iter()
                    .map(|id| self.id_to_referent[id]),
            )?;

            chunk.dump(&mut self.output)?;
        }

        Ok(())
    }

    fn serialize_properties(&mut self) -> Result<(), InnerError> {
        log::trace!("writing properties");

        for (type_name, type_info) in &self.type_infos {
            for (prop_name, prop_info) in &type_info.properties {
                log::trace!(
                    "writing property {}.{} (type {:?})",
                    type_name,
                    prop_name,
                    prop_info.prop_type
                );

                let mut chunk = ChunkBuilder::new(b"PROP", ChunkCompression::Compressed);

                chunk.write_le_u32(type_info.type_id)?;
                chunk.write_string(prop_name)?;
                chunk.write_u8(prop_info.prop_type as u8)?;

                let dom: &WeakDom = self.dom;
                let values: Vec<(usize, Cow<Variant>)> = type_info
                    .object_refs
                    .iter()
                    .map(|id| {
                        let instance = dom.get_by_ref(*id).unwrap();

                        if prop_name == "Name" {
                            return Cow::Owned(Variant::String(instance.name.clone()));
                        }

                        instance
                            .properties
                            .get(prop_name.as_str())
                            .map(Cow::Borrowed)
                            .unwrap_or_else(|| Cow::Borrowed(prop_info.default_value.borrow()))
                    })
                    .enumerate()
                    .collect();

                self.write_property_column(&mut chunk, type_name, prop_name, type_info, prop_info, values)?;

                chunk.dump(&mut self.output)?;
            }
        }

        Ok(())
    }

    fn write_property_column(
        &self,
        chunk: &mut ChunkBuilder,
        type_name: &str,
        prop_name: &str,
        type_info: &TypeInfo,
        prop_info: &PropInfo,
        values: Vec<(usize, Cow<Variant>)>,
    ) -> Result<(), InnerError> {
        let type_mismatch = |i: usize, bad_value: &Variant, valid: &'static str| {
            Err(InnerError::PropTypeMismatch {
                type_name: type_name.to_owned(),
                prop_name: prop_name.to_owned(),
                valid_type_names: valid,
                actual_type_name: format!("{:?}", bad_value.ty()),
                instance_full_name: self.full_name_for(type_info.object_refs[i]),
            })
        };

        macro_rules! collect_or_mismatch {
            ($values:expr, $pattern:pat => $extract:expr, $name:expr) => {{
                let mut buf = Vec::with_capacity($values.len());
                for (i, value) in $values {
                    match value.as_ref() {
                        $pattern => buf.push($extract),
                        other => return type_mismatch(i, other, $name),
                    }
                }
                buf
            }};
        }

        match prop_info.prop_type {
            Type::String => {
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::String(s) => chunk.write_string(s)?,
                        other => return type_mismatch(i, other, "String"),
                    }
                }
            }
            Type::BinaryString => {
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::BinaryString(s) => chunk.write_binary_string(s)?,
                        other => return type_mismatch(i, other, "BinaryString"),
                    }
                }
            }
            Type::ProtectedString => {
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::ProtectedString(s) => chunk.write_string(&s.0)?,
                        other => return type_mismatch(i, other, "ProtectedString"),
                    }
                }
            }
            Type::Content => {
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::Content(c) => chunk.write_string(c.0.as_deref().unwrap_or(""))?,
                        other => return type_mismatch(i, other, "Content"),
                    }
                }
            }
            Type::Bool => {
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::Bool(b) => chunk.write_bool(*b)?,
                        other => return type_mismatch(i, other, "Bool"),
                    }
                }
            }
            Type::Int32 => {
                let buf = collect_or_mismatch!(values, Variant::Int32(v) => *v, "Int32");
                chunk.write_interleaved_i32_array(buf.into_iter())?;
            }
            Type::Int64 => {
                let buf = collect_or_mismatch!(values, Variant::Int64(v) => *v, "Int64");
                chunk.write_interleaved_i64_array(buf.into_iter())?;
            }
            Type::Float32 => {
                let buf = collect_or_mismatch!(values, Variant::Float32(v) => *v, "Float32");
                chunk.write_interleaved_f32_array(buf.into_iter())?;
            }
            Type::Float64 => {
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::Float64(v) => chunk.write_le_f64(*v)?,
                        other => return type_mismatch(i, other, "Float64"),
                    }
                }
            }
            Type::BrickColor => {
                let buf = collect_or_mismatch!(values, Variant::BrickColor(v) => v.0 as i32, "BrickColor");
                chunk.write_interleaved_i32_array(buf.into_iter())?;
            }
            Type::Enum => {
                let buf = collect_or_mismatch!(values, Variant::Enum(v) => v.to_u32(), "Enum");
                chunk.write_interleaved_u32_array(&buf)?;
            }
            Type::UDim => {
                let mut scale = Vec::with_capacity(values.len());
                let mut offset = Vec::with_capacity(values.len());
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::UDim(v) => {
                            scale.push(v.scale);
                            offset.push(v.offset);
                        }
                        other => return type_mismatch(i, other, "UDim"),
                    }
                }
                chunk.write_interleaved_f32_array(scale.into_iter())?;
                chunk.write_interleaved_i32_array(offset.into_iter())?;
            }
            Type::UDim2 => {
                let (mut sx, mut sy, mut ox, mut oy) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::UDim2(v) => {
                            sx.push(v.x.scale);
                            sy.push(v.y.scale);
                            ox.push(v.x.offset);
                            oy.push(v.y.offset);
                        }
                        other => return type_mismatch(i, other, "UDim2"),
                    }
                }
                chunk.write_interleaved_f32_array(sx.into_iter())?;
                chunk.write_interleaved_f32_array(sy.into_iter())?;
                chunk.write_interleaved_i32_array(ox.into_iter())?;
                chunk.write_interleaved_i32_array(oy.into_iter())?;
            }
            Type::Ray => {
                let rays = collect_or_mismatch!(values, Variant::Ray(v) => *v, "Ray");
                for value in &rays {
                    chunk.write_le_f32(value.origin.x)?;
                }
                for value in &rays {
                    chunk.write_le_f32(value.origin.y)?;
                }
                for value in &rays {
                    chunk.write_le_f32(value.origin.z)?;
                }
                for value in &rays {
                    chunk.write_le_f32(value.direction.x)?;
                }
                for value in &rays {
                    chunk.write_le_f32(value.direction.y)?;
                }
                for value in &rays {
                    chunk.write_le_f32(value.direction.z)?;
                }
            }
            Type::Faces => {
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::Faces(v) => chunk.write_u8(v.bits())?,
                        other => return type_mismatch(i, other, "Faces"),
                    }
                }
            }
            Type::Axes => {
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::Axes(v) => chunk.write_u8(v.bits())?,
                        other => return type_mismatch(i, other, "Axes"),
                    }
                }
            }
            Type::Color3 => {
                let (mut r, mut g, mut b) = (Vec::new(), Vec::new(), Vec::new());
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::Color3(v) => {
                            r.push(v.r);
                            g.push(v.g);
                            b.push(v.b);
                        }
                        other => return type_mismatch(i, other, "Color3"),
                    }
                }
                chunk.write_interleaved_f32_array(r.into_iter())?;
                chunk.write_interleaved_f32_array(g.into_iter())?;
                chunk.write_interleaved_f32_array(b.into_iter())?;
            }
            Type::Color3uint8 => {
                let colors = collect_or_mismatch!(values, Variant::Color3uint8(v) => *v, "Color3uint8");
                for value in &colors {
                    chunk.write_u8(value.r)?;
                }
                for value in &colors {
                    chunk.write_u8(value.g)?;
                }
                for value in &colors {
                    chunk.write_u8(value.b)?;
                }
            }
            Type::Vector2 => {
                let (mut x, mut y) = (Vec::new(), Vec::new());
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::Vector2(v) => {
                            x.push(v.x);
                            y.push(v.y);
                        }
                        other => return type_mismatch(i, other, "Vector2"),
                    }
                }
                chunk.write_interleaved_f32_array(x.into_iter())?;
                chunk.write_interleaved_f32_array(y.into_iter())?;
            }
            Type::Vector2int16 => {
                let vecs = collect_or_mismatch!(values, Variant::Vector2int16(v) => *v, "Vector2int16");
                for value in &vecs {
                    chunk.write_le_i16(value.x)?;
                }
                for value in &vecs {
                    chunk.write_le_i16(value.y)?;
                }
            }
            Type::Vector3 => {
                let (mut x, mut y, mut z) = (Vec::new(), Vec::new(), Vec::new());
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::Vector3(v) => {
                            x.push(v.x);
                            y.push(v.y);
                            z.push(v.z);
                        }
                        other => return type_mismatch(i, other, "Vector3"),
                    }
                }
                chunk.write_interleaved_f32_array(x.into_iter())?;
                chunk.write_interleaved_f32_array(y.into_iter())?;
                chunk.write_interleaved_f32_array(z.into_iter())?;
            }
            Type::Vector3int16 => {
                let vecs = collect_or_mismatch!(values, Variant::Vector3int16(v) => *v, "Vector3int16");
                for value in &vecs {
                    chunk.write_le_i16(value.x)?;
                }
                for value in &vecs {
                    chunk.write_le_i16(value.y)?;
                }
                for value in &vecs {
                    chunk.write_le_i16(value.z)?;
                }
            }
            Type::CFrame => {
                let cframes = collect_or_mismatch!(values, Variant::CFrame(v) => *v, "CFrame");

                for value in &cframes {
                    match types::cframe_rotation_tag(&value.orientation) {
                        Some(tag) => chunk.write_u8(tag)?,
                        None => {
                            chunk.write_u8(0)?;
                            for component in value.orientation.to_array().iter() {
                                chunk.write_le_f32(*component)?;
                            }
                        }
                    }
                }

                chunk.write_interleaved_f32_array(cframes.iter().map(|v| v.position.x))?;
                chunk.write_interleaved_f32_array(cframes.iter().map(|v| v.position.y))?;
                chunk.write_interleaved_f32_array(cframes.iter().map(|v| v.position.z))?;
            }
            Type::NumberSequence => {
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::NumberSequence(v) => {
                            chunk.write_le_u32(v.keypoints.len() as u32)?;
                            for keypoint in &v.keypoints {
                                chunk.write_le_f32(keypoint.time)?;
                                chunk.write_le_f32(keypoint.value)?;
                                chunk.write_le_f32(keypoint.envelope)?;
                            }
                        }
                        other => return type_mismatch(i, other, "NumberSequence"),
                    }
                }
            }
            Type::ColorSequence => {
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::ColorSequence(v) => {
                            chunk.write_le_u32(v.keypoints.len() as u32)?;
                            for keypoint in &v.keypoints {
                                chunk.write_le_f32(keypoint.time)?;
                                chunk.write_le_f32(keypoint.color.r)?;
                                chunk.write_le_f32(keypoint.color.g)?;
                                chunk.write_le_f32(keypoint.color.b)?;
                                chunk.write_le_f32(keypoint.envelope)?;
                            }
                        }
                        other => return type_mismatch(i, other, "ColorSequence"),
                    }
                }
            }
            Type::NumberRange => {
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::NumberRange(v) => {
                            chunk.write_le_f32(v.min)?;
                            chunk.write_le_f32(v.max)?;
                        }
                        other => return type_mismatch(i, other, "NumberRange"),
                    }
                }
            }
            Type::Rect => {
                let (mut min_x, mut min_y, mut max_x, mut max_y) =
                    (Vec::new(), Vec::new(), Vec::new(), Vec::new());
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::Rect(v) => {
                            min_x.push(v.min.x);
                            min_y.push(v.min.y);
                            max_x.push(v.max.x);
                            max_y.push(v.max.y);
                        }
                        other => return type_mismatch(i, other, "Rect"),
                    }
                }
                chunk.write_interleaved_f32_array(min_x.into_iter())?;
                chunk.write_interleaved_f32_array(min_y.into_iter())?;
                chunk.write_interleaved_f32_array(max_x.into_iter())?;
                chunk.write_interleaved_f32_array(max_y.into_iter())?;
            }
            Type::PhysicalProperties => {
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::PhysicalProperties(v) => {
                            if v.custom {
                                chunk.write_u8(1)?;
                                chunk.write_le_f32(v.density)?;
                                chunk.write_le_f32(v.friction)?;
                                chunk.write_le_f32(v.elasticity)?;
                                chunk.write_le_f32(v.friction_weight)?;
                                chunk.write_le_f32(v.elasticity_weight)?;
                            } else {
                                chunk.write_u8(0)?;
                            }
                        }
                        other => return type_mismatch(i, other, "PhysicalProperties"),
                    }
                }
            }
            Type::Ref => {
                let mut referents = Vec::with_capacity(values.len());
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::Ref(target) => {
                            let id = if target.is_none() {
                                -1
                            } else {
                                self.id_to_referent.get(target).copied().unwrap_or(-1)
                            };
                            referents.push(id);
                        }
                        other => return type_mismatch(i, other, "Ref"),
                    }
                }
                chunk.write_referents(referents.into_iter())?;
            }
            Type::SharedString => {
                let mut indices = Vec::with_capacity(values.len());
                for (i, value) in values {
                    match value.as_ref() {
                        Variant::SharedString(shared) => {
                            let index = *self
                                .shared_string_indices
                                .get(&shared.hash())
                                .expect("shared string table built before properties");
                            indices.push(index as i32);
                        }
                        other => return type_mismatch(i, other, "SharedString"),
                    }
                }
                chunk.write_interleaved_i32_array(indices.into_iter())?;
            }
        }

        Ok(())
    }

    fn serialize_parents(&mut self) -> Result<(), InnerError> {
        log::trace!("writing parent relationships");

        let mut chunk = ChunkBuilder::new(b"PRNT", ChunkCompression::Compressed);

        chunk.write_u8(0)?;
        chunk.write_le_u32(self.relevant_instances.len() as u32)?;

        let object_referents = self
            .relevant_instances
            .iter()
            .map(|id| self.id_to_referent[id]);

        let parent_referents = self.relevant_instances.iter().map(|id| {
            let instance = self.dom.get_by_ref(*id).unwrap();

            if instance.parent().is_some() {
                self.id_to_referent
                    .get(&instance.parent())
                    .copied()
                    .unwrap_or(-1)
            } else {
                -1
            }
        });

        chunk.write_referents(object_referents)?;
        chunk.write_referents(parent_referents)?;

        chunk.dump(&mut self.output)?;
        Ok(())
    }

    fn serialize_shared_strings(&mut self) -> Result<(), InnerError> {
        if self.shared_strings.is_empty() {
            return Ok(());
        }

        log::trace!("writing {} shared strings", self.shared_strings.len());

        let mut chunk = ChunkBuilder::new(b"SSTR", ChunkCompression::Compressed);
        chunk.write_le_u32(0)?; // version
        chunk.write_le_u32(self.shared_strings.len() as u32)?;

        for shared in &self.shared_strings {
            chunk.write_all(shared.hash().as_bytes())?;
            chunk.write_binary_string(shared.data())?;
        }

        chunk.dump(&mut self.output)?;
        Ok(())
    }

    fn serialize_end(&mut self) -> Result<(), InnerError> {
        log::trace!("writing file end");

        let mut end = ChunkBuilder::new(b"END\0", ChunkCompression::Uncompressed);
        end.write_all(FILE_FOOTER)?;
        end.dump(&mut self.output)?;

        Ok(())
    }

    /// Equivalent to `Instance:GetFullName()`.
    fn full_name_for(&self, subject_ref: Ref) -> String {
        self.dom.full_name(subject_ref)
    }
}

fn default_value_for(ty: VariantType) -> Variant {
    match ty {
        VariantType::String => Variant::String(String::new()),
        VariantType::BinaryString => Variant::BinaryString(BinaryString::new()),
        VariantType::ProtectedString => Variant::ProtectedString(ProtectedString::from(String::new())),
        VariantType::Content => Variant::Content(Content::none()),
        VariantType::Bool => Variant::Bool(false),
        VariantType::Int32 => Variant::Int32(0),
        VariantType::Int64 => Variant::Int64(0),
        VariantType::Float32 => Variant::Float32(0.0),
        VariantType::Float64 => Variant::Float64(0.0),
        VariantType::BrickColor => Variant::BrickColor(BrickColor(0)),
        VariantType::Enum => Variant::Enum(Enum::from_u32(0)),
        VariantType::UDim => Variant::UDim(UDim::new(0.0, 0)),
        VariantType::UDim2 => Variant::UDim2(UDim2::new(UDim::new(0.0, 0), UDim::new(0.0, 0))),
        VariantType::Ray => Variant::Ray(Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0))),
        VariantType::Faces => Variant::Faces(Faces::from_bits(0).unwrap()),
        VariantType::Axes => Variant::Axes(Axes::from_bits(0).unwrap()),
        VariantType::Color3 => Variant::Color3(Color3::new(0.0, 0.0, 0.0)),
        VariantType::Color3uint8 => Variant::Color3uint8(Color3uint8::new(0, 0, 0)),
        VariantType::Vector2 => Variant::Vector2(Vector2::new(0.0, 0.0)),
        VariantType::Vector2int16 => Variant::Vector2int16(Vector2int16::new(0, 0)),
        VariantType::Vector3 => Variant::Vector3(Vector3::new(0.0, 0.0, 0.0)),
        VariantType::Vector3int16 => Variant::Vector3int16(Vector3int16::new(0, 0, 0)),
        VariantType::CFrame => Variant::CFrame(CFrame::new(Vector3::new(0.0, 0.0, 0.0), Matrix3::identity())),
        VariantType::NumberSequence => Variant::NumberSequence(rbx_types::NumberSequence {
            keypoints: Vec::new(),
        }),
        VariantType::ColorSequence => Variant::ColorSequence(rbx_types::ColorSequence {
            keypoints: Vec::new(),
        }),
        VariantType::NumberRange => Variant::NumberRange(NumberRange::new(0.0, 0.0)),
        VariantType::Rect => Variant::Rect(Rect::new(Vector2::new(0.0, 0.0), Vector2::new(0.0, 0.0))),
        VariantType::PhysicalProperties => Variant::PhysicalProperties(PhysicalProperties::default()),
        VariantType::Ref => Variant::Ref(Ref::none()),
        VariantType::SharedString => Variant::SharedString(SharedString::new(Vec::new())),
    }
}
