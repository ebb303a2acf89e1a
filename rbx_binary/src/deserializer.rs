use std::{
    collections::HashMap,
    convert::TryFrom,
    io::{self, Read},
};

use rbx_dom_weak::{InstanceBuilder, WeakDom};
use rbx_types::{
    Axes, CFrame, Color3, Color3uint8, Content, Enum, Faces, Matrix3, NumberRange, NumberSequence,
    NumberSequenceKeypoint, PhysicalProperties, ProtectedString, Ray, Rect, Ref, SharedString,
    UDim, UDim2, Variant, Vector2, Vector2int16, Vector3, Vector3int16, ColorSequence,
    ColorSequenceKeypoint,
};

use crate::{
    chunk::{Chunk, DEFAULT_MAX_DECOMPRESSED_CHUNK_SIZE},
    core::{RbxReadExt, FILE_MAGIC_HEADER, FILE_SIGNATURE, FILE_VERSION},
    error::{DecodeWarning, Error, InnerError},
    types::{self, Type},
};

static FILE_FOOTER: &[u8] = b"</roblox>";

/// The decoded dom plus any non-fatal issues encountered while decoding.
#[derive(Debug)]
pub struct DecodeResult {
    pub dom: WeakDom,
    pub warnings: Vec<DecodeWarning>,
}

/// Decodes `reader` using the default decompression-bomb guard.
pub fn decode<R: Read>(reader: R) -> Result<DecodeResult, Error> {
    DecodeOptions::new().decode(reader)
}

/// Configures how `decode` reads a binary model/place file.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    max_decompressed_chunk_size: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            max_decompressed_chunk_size: DEFAULT_MAX_DECOMPRESSED_CHUNK_SIZE,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the ceiling on any single chunk's decompressed size. See
    /// [`crate::chunk::DEFAULT_MAX_DECOMPRESSED_CHUNK_SIZE`].
    pub fn max_decompressed_chunk_size(mut self, value: u64) -> Self {
        self.max_decompressed_chunk_size = value;
        self
    }

    pub fn decode<R: Read>(&self, mut reader: R) -> Result<DecodeResult, Error> {
        let header = FileHeader::decode(&mut reader)?;
        log::debug!("decoding binary model: {:?}", header);

        let mut state = BinaryDeserializer {
            dom: WeakDom::new(InstanceBuilder::new("DataModel")),
            warnings: Vec::new(),
            classes: HashMap::new(),
            file_id_to_ref: HashMap::new(),
            shared_strings: Vec::new(),
        };

        loop {
            let chunk =
                match Chunk::decode_with_limit(&mut reader, self.max_decompressed_chunk_size) {
                    Ok(chunk) => chunk,
                    Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                        return Err(InnerError::TruncatedInput.into());
                    }
                    Err(err) => return Err(err.into()),
                };

            log::trace!(
                "read chunk {:?} ({} bytes decompressed)",
                String::from_utf8_lossy(&chunk.name),
                chunk.data.len()
            );

            match &chunk.name {
                b"META" => state.decode_meta(&chunk.data)?,
                b"SSTR" => state.decode_sstr(&chunk.data)?,
                b"INST" => state.decode_inst(&chunk.data)?,
                b"PROP" => state.decode_prop(&chunk.data)?,
                b"PRNT" => state.decode_prnt(&chunk.data)?,
                b"END\0" => {
                    verify_footer(&chunk.data)?;
                    break;
                }
                other => {
                    log::warn!(
                        "skipping unrecognized chunk {:?}",
                        String::from_utf8_lossy(other)
                    );
                }
            }
        }

        let mut trailing = Vec::new();
        reader.read_to_end(&mut trailing)?;
        if !trailing.is_empty() {
            state.warnings.push(DecodeWarning::TrailingData {
                count: trailing.len(),
            });
        }

        Ok(DecodeResult {
            dom: state.dom,
            warnings: state.warnings,
        })
    }
}

#[derive(Debug)]
struct FileHeader {
    #[allow(dead_code)]
    version: u16,
    #[allow(dead_code)]
    class_count: u32,
    #[allow(dead_code)]
    instance_count: u32,
}

impl FileHeader {
    fn decode<R: Read>(reader: &mut R) -> Result<FileHeader, InnerError> {
        let mut magic = [0u8; 16];
        reader.read_exact(&mut magic)?;

        let mut expected = [0u8; 16];
        expected[..8].copy_from_slice(FILE_MAGIC_HEADER);
        expected[8..].copy_from_slice(FILE_SIGNATURE);

        if magic != expected {
            return Err(InnerError::InvalidMagic);
        }

        let version = reader.read_le_u16()?;
        if version != FILE_VERSION {
            return Err(InnerError::UnsupportedVersion { version });
        }

        let class_count = reader.read_le_u32()?;
        let instance_count = reader.read_le_u32()?;

        let mut reserved = [0u8; 8];
        reader.read_exact(&mut reserved)?;

        Ok(FileHeader {
            version,
            class_count,
            instance_count,
        })
    }
}

fn verify_footer(data: &[u8]) -> Result<(), InnerError> {
    if data != FILE_FOOTER {
        return Err(InnerError::MalformedFooter);
    }
    Ok(())
}

struct ClassInfo {
    name: String,
    refs: Vec<Ref>,
}

struct BinaryDeserializer {
    dom: WeakDom,
    warnings: Vec<DecodeWarning>,
    classes: HashMap<u32, ClassInfo>,
    file_id_to_ref: HashMap<i32, Ref>,
    shared_strings: Vec<SharedString>,
}

impl BinaryDeserializer {
    fn set_property(&mut self, referent: Ref, prop_name: &str, value: Variant) {
        let instance = match self.dom.get_by_ref_mut(referent) {
            Some(instance) => instance,
            None => return,
        };

        if prop_name == "Name" {
            if let Variant::String(name) = value {
                instance.name = name;
            }
        } else {
            instance.properties.insert(prop_name.to_owned(), value);
        }
    }

    fn decode_meta(&mut self, data: &[u8]) -> Result<(), InnerError> {
        let mut r = data;
        let count = r.read_le_u32()? as usize;

        for _ in 0..count {
            let key = r.read_string()?;
            let value = r.read_string()?;
            self.dom.metadata_mut().insert(key, value);
        }

        Ok(())
    }

    fn decode_sstr(&mut self, data: &[u8]) -> Result<(), InnerError> {
        let mut r = data;
        let _version = r.read_le_u32()?;
        let count = r.read_le_u32()? as usize;

        for _ in 0..count {
            let mut hash = [0u8; 16];
            r.read_exact(&mut hash)?;
            let payload = r.read_binary_string()?;
            self.shared_strings.push(SharedString::new(payload));
        }

        Ok(())
    }

    fn decode_inst(&mut self, data: &[u8]) -> Result<(), InnerError> {
        let mut r = data;
        let class_id = r.read_le_u32()?;
        let class_name = r.read_string()?;
        let _is_service = r.read_bool()?;
        let count = r.read_le_u32()? as usize;

        let mut file_ids = vec![0i32; count];
        r.read_referent_array(&mut file_ids)?;

        let root_ref = self.dom.root_ref();
        let mut refs = Vec::with_capacity(count);

        for &file_id in &file_ids {
            let referent = self
                .dom
                .insert(root_ref, InstanceBuilder::new(class_name.clone()));
            self.file_id_to_ref.insert(file_id, referent);
            refs.push(referent);
        }

        self.classes.insert(
            class_id,
            ClassInfo {
                name: class_name,
                refs,
            },
        );

        Ok(())
    }

    fn decode_prnt(&mut self, data: &[u8]) -> Result<(), InnerError> {
        let mut r = data;
        let _version = r.read_u8()?;
        let count = r.read_le_u32()? as usize;

        let mut object_ids = vec![0i32; count];
        r.read_referent_array(&mut object_ids)?;
        let mut parent_ids = vec![0i32; count];
        r.read_referent_array(&mut parent_ids)?;

        let root_ref = self.dom.root_ref();

        for (object_id, parent_id) in object_ids.into_iter().zip(parent_ids) {
            let referent = match self.file_id_to_ref.get(&object_id) {
                Some(&referent) => referent,
                None => continue,
            };

            let parent_ref = if parent_id == -1 {
                root_ref
            } else {
                self.file_id_to_ref
                    .get(&parent_id)
                    .copied()
                    .unwrap_or(root_ref)
            };

            // A cycle here would mean the file itself is malformed; leaving
            // the instance parented under the root (its default from
            // `decode_inst`) is a safe fallback.
            if self.dom.set_parent(referent, parent_ref).is_err() {
                self.warnings.push(DecodeWarning::IgnoredParentCycle { referent });
            }
        }

        Ok(())
    }

    fn decode_prop(&mut self, data: &[u8]) -> Result<(), InnerError> {
        let mut r = data;
        let class_id = r.read_le_u32()?;
        let prop_name = r.read_string()?;
        let data_type_byte = r.read_u8()?;

        let (class_name, refs) = match self.classes.get(&class_id) {
            Some(info) => (info.name.clone(), info.refs.clone()),
            None => return Ok(()),
        };
        let count = refs.len();

        let data_type = match Type::try_from(data_type_byte) {
            Ok(ty) => ty,
            Err(()) => {
                self.warnings.push(DecodeWarning::UnknownPropType {
                    class_name,
                    prop_name,
                    data_type: data_type_byte,
                });
                return Ok(());
            }
        };

        match data_type {
            Type::String => {
                for &referent in &refs {
                    let value = r.read_string()?;
                    self.set_property(referent, &prop_name, Variant::String(value));
                }
            }
            Type::BinaryString => {
                for &referent in &refs {
                    let value = r.read_binary_string()?;
                    self.set_property(referent, &prop_name, Variant::BinaryString(value));
                }
            }
            Type::ProtectedString => {
                for &referent in &refs {
                    let value = r.read_string()?;
                    self.set_property(
                        referent,
                        &prop_name,
                        Variant::ProtectedString(ProtectedString(value)),
                    );
                }
            }
            Type::Content => {
                for &referent in &refs {
                    let value = r.read_string()?;
                    let content = if value.is_empty() {
                        Content::none()
                    } else {
                        Content::from_uri(value)
                    };
                    self.set_property(referent, &prop_name, Variant::Content(content));
                }
            }
            Type::Bool => {
                for &referent in &refs {
                    let value = r.read_bool()?;
                    self.set_property(referent, &prop_name, Variant::Bool(value));
                }
            }
            Type::Int32 => {
                let mut values = vec![0i32; count];
                r.read_interleaved_i32_array(&mut values)?;
                for (&referent, value) in refs.iter().zip(values) {
                    self.set_property(referent, &prop_name, Variant::Int32(value));
                }
            }
            Type::Int64 => {
                let mut values = vec![0i64; count];
                r.read_interleaved_i64_array(&mut values)?;
                for (&referent, value) in refs.iter().zip(values) {
                    self.set_property(referent, &prop_name, Variant::Int64(value));
                }
            }
            Type::Float32 => {
                let mut values = vec![0f32; count];
                r.read_interleaved_f32_array(&mut values)?;
                for (&referent, value) in refs.iter().zip(values) {
                    self.set_property(referent, &prop_name, Variant::Float32(value));
                }
            }
            Type::Float64 => {
                for &referent in &refs {
                    let value = r.read_le_f64()?;
                    self.set_property(referent, &prop_name, Variant::Float64(value));
                }
            }
            Type::BrickColor => {
                let mut values = vec![0i32; count];
                r.read_interleaved_i32_array(&mut values)?;
                for (&referent, value) in refs.iter().zip(values) {
                    self.set_property(
                        referent,
                        &prop_name,
                        Variant::BrickColor(rbx_types::BrickColor(value as u32)),
                    );
                }
            }
            Type::Enum => {
                let mut values = vec![0u32; count];
                r.read_interleaved_u32_array(&mut values)?;
                for (&referent, value) in refs.iter().zip(values) {
                    self.set_property(referent, &prop_name, Variant::Enum(Enum::from_u32(value)));
                }
            }
            Type::UDim => {
                let mut scale = vec![0f32; count];
                r.read_interleaved_f32_array(&mut scale)?;
                let mut offset = vec![0i32; count];
                r.read_interleaved_i32_array(&mut offset)?;

                for i in 0..count {
                    let value = UDim::new(scale[i], offset[i]);
                    self.set_property(refs[i], &prop_name, Variant::UDim(value));
                }
            }
            Type::UDim2 => {
                let mut sx = vec![0f32; count];
                r.read_interleaved_f32_array(&mut sx)?;
                let mut sy = vec![0f32; count];
                r.read_interleaved_f32_array(&mut sy)?;
                let mut ox = vec![0i32; count];
                r.read_interleaved_i32_array(&mut ox)?;
                let mut oy = vec![0i32; count];
                r.read_interleaved_i32_array(&mut oy)?;

                for i in 0..count {
                    let value = UDim2::new(UDim::new(sx[i], ox[i]), UDim::new(sy[i], oy[i]));
                    self.set_property(refs[i], &prop_name, Variant::UDim2(value));
                }
            }
            Type::Ray => {
                let ox = read_f32_column(&mut r, count)?;
                let oy = read_f32_column(&mut r, count)?;
                let oz = read_f32_column(&mut r, count)?;
                let dx = read_f32_column(&mut r, count)?;
                let dy = read_f32_column(&mut r, count)?;
                let dz = read_f32_column(&mut r, count)?;

                for i in 0..count {
                    let value = Ray::new(
                        Vector3::new(ox[i], oy[i], oz[i]),
                        Vector3::new(dx[i], dy[i], dz[i]),
                    );
                    self.set_property(refs[i], &prop_name, Variant::Ray(value));
                }
            }
            Type::Faces => {
                for &referent in &refs {
                    let bits = r.read_u8()?;
                    let value = Faces::from_bits(bits).unwrap_or_else(Faces::empty);
                    self.set_property(referent, &prop_name, Variant::Faces(value));
                }
            }
            Type::Axes => {
                for &referent in &refs {
                    let bits = r.read_u8()?;
                    let value = Axes::from_bits(bits).unwrap_or_else(Axes::empty);
                    self.set_property(referent, &prop_name, Variant::Axes(value));
                }
            }
            Type::Color3 => {
                let red = read_f32_column_interleaved(&mut r, count)?;
                let green = read_f32_column_interleaved(&mut r, count)?;
                let blue = read_f32_column_interleaved(&mut r, count)?;

                for i in 0..count {
                    let value = Color3::new(red[i], green[i], blue[i]);
                    self.set_property(refs[i], &prop_name, Variant::Color3(value));
                }
            }
            Type::Color3uint8 => {
                let red = read_u8_column(&mut r, count)?;
                let green = read_u8_column(&mut r, count)?;
                let blue = read_u8_column(&mut r, count)?;

                for i in 0..count {
                    let value = Color3uint8::new(red[i], green[i], blue[i]);
                    self.set_property(refs[i], &prop_name, Variant::Color3uint8(value));
                }
            }
            Type::Vector2 => {
                let xs = read_f32_column_interleaved(&mut r, count)?;
                let ys = read_f32_column_interleaved(&mut r, count)?;

                for i in 0..count {
                    let value = Vector2::new(xs[i], ys[i]);
                    self.set_property(refs[i], &prop_name, Variant::Vector2(value));
                }
            }
            Type::Vector2int16 => {
                let xs = read_i16_column(&mut r, count)?;
                let ys = read_i16_column(&mut r, count)?;

                for i in 0..count {
                    let value = Vector2int16::new(xs[i], ys[i]);
                    self.set_property(refs[i], &prop_name, Variant::Vector2int16(value));
                }
            }
            Type::Vector3 => {
                let xs = read_f32_column_interleaved(&mut r, count)?;
                let ys = read_f32_column_interleaved(&mut r, count)?;
                let zs = read_f32_column_interleaved(&mut r, count)?;

                for i in 0..count {
                    let value = Vector3::new(xs[i], ys[i], zs[i]);
                    self.set_property(refs[i], &prop_name, Variant::Vector3(value));
                }
            }
            Type::Vector3int16 => {
                let xs = read_i16_column(&mut r, count)?;
                let ys = read_i16_column(&mut r, count)?;
                let zs = read_i16_column(&mut r, count)?;

                for i in 0..count {
                    let value = Vector3int16::new(xs[i], ys[i], zs[i]);
                    self.set_property(refs[i], &prop_name, Variant::Vector3int16(value));
                }
            }
            Type::CFrame => {
                let mut orientations = Vec::with_capacity(count);
                for _ in 0..count {
                    let tag = r.read_u8()?;
                    let orientation = if tag == 0 {
                        let mut raw = [0f32; 9];
                        for slot in raw.iter_mut() {
                            *slot = r.read_le_f32()?;
                        }
                        Matrix3::from_array(raw)
                    } else {
                        types::cframe_rotation_from_tag(tag).unwrap_or_else(Matrix3::identity)
                    };
                    orientations.push(orientation);
                }

                let xs = read_f32_column_interleaved(&mut r, count)?;
                let ys = read_f32_column_interleaved(&mut r, count)?;
                let zs = read_f32_column_interleaved(&mut r, count)?;

                for i in 0..count {
                    let value = CFrame::new(Vector3::new(xs[i], ys[i], zs[i]), orientations[i]);
                    self.set_property(refs[i], &prop_name, Variant::CFrame(value));
                }
            }
            Type::NumberSequence => {
                for &referent in &refs {
                    let keypoint_count = r.read_le_u32()? as usize;
                    let mut keypoints = Vec::with_capacity(keypoint_count);
                    for _ in 0..keypoint_count {
                        let time = r.read_le_f32()?;
                        let value = r.read_le_f32()?;
                        let envelope = r.read_le_f32()?;
                        keypoints.push(NumberSequenceKeypoint::new(time, value, envelope));
                    }
                    self.set_property(
                        referent,
                        &prop_name,
                        Variant::NumberSequence(NumberSequence { keypoints }),
                    );
                }
            }
            Type::ColorSequence => {
                for &referent in &refs {
                    let keypoint_count = r.read_le_u32()? as usize;
                    let mut keypoints = Vec::with_capacity(keypoint_count);
                    for _ in 0..keypoint_count {
                        let time = r.read_le_f32()?;
                        let r_channel = r.read_le_f32()?;
                        let g_channel = r.read_le_f32()?;
                        let b_channel = r.read_le_f32()?;
                        let envelope = r.read_le_f32()?;
                        keypoints.push(ColorSequenceKeypoint::new(
                            time,
                            Color3::new(r_channel, g_channel, b_channel),
                            envelope,
                        ));
                    }
                    self.set_property(
                        referent,
                        &prop_name,
                        Variant::ColorSequence(ColorSequence { keypoints }),
                    );
                }
            }
            Type::NumberRange => {
                for &referent in &refs {
                    let min = r.read_le_f32()?;
                    let max = r.read_le_f32()?;
                    self.set_property(
                        referent,
                        &prop_name,
                        Variant::NumberRange(NumberRange::new(min, max)),
                    );
                }
            }
            Type::Rect => {
                let min_x = read_f32_column_interleaved(&mut r, count)?;
                let min_y = read_f32_column_interleaved(&mut r, count)?;
                let max_x = read_f32_column_interleaved(&mut r, count)?;
                let max_y = read_f32_column_interleaved(&mut r, count)?;

                for i in 0..count {
                    let value = Rect::new(
                        Vector2::new(min_x[i], min_y[i]),
                        Vector2::new(max_x[i], max_y[i]),
                    );
                    self.set_property(refs[i], &prop_name, Variant::Rect(value));
                }
            }
            Type::PhysicalProperties => {
                for &referent in &refs {
                    let custom = r.read_bool()?;
                    let value = if custom {
                        PhysicalProperties {
                            custom: true,
                            density: r.read_le_f32()?,
                            friction: r.read_le_f32()?,
                            elasticity: r.read_le_f32()?,
                            friction_weight: r.read_le_f32()?,
                            elasticity_weight: r.read_le_f32()?,
                        }
                    } else {
                        PhysicalProperties::default_non_custom()
                    };
                    self.set_property(referent, &prop_name, Variant::PhysicalProperties(value));
                }
            }
            Type::Ref => {
                let mut ids = vec![0i32; count];
                r.read_referent_array(&mut ids)?;

                for (i, id) in ids.into_iter().enumerate() {
                    let referent = refs[i];
                    let target = if id == -1 {
                        Ref::none()
                    } else {
                        match self.file_id_to_ref.get(&id) {
                            Some(&target) => target,
                            None => {
                                self.warnings
                                    .push(DecodeWarning::UnresolvedReference { referent });
                                Ref::none()
                            }
                        }
                    };
                    self.set_property(referent, &prop_name, Variant::Ref(target));
                }
            }
            Type::SharedString => {
                let mut indices = vec![0i32; count];
                r.read_interleaved_i32_array(&mut indices)?;

                for (i, index) in indices.into_iter().enumerate() {
                    let referent = refs[i];
                    match self.shared_strings.get(index as usize) {
                        Some(shared) => {
                            self.set_property(
                                referent,
                                &prop_name,
                                Variant::SharedString(shared.clone()),
                            );
                        }
                        None => {
                            self.warnings.push(DecodeWarning::InvalidProperty {
                                class_name: class_name.clone(),
                                prop_name: prop_name.clone(),
                                referent,
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn read_f32_column<R: Read>(r: &mut R, count: usize) -> io::Result<Vec<f32>> {
    let mut buffer = vec![0f32; count];
    for slot in buffer.iter_mut() {
        *slot = r.read_le_f32()?;
    }
    Ok(buffer)
}

fn read_f32_column_interleaved<R: Read>(r: &mut R, count: usize) -> io::Result<Vec<f32>> {
    let mut buffer = vec![0f32; count];
    r.read_interleaved_f32_array(&mut buffer)?;
    Ok(buffer)
}

fn read_u8_column<R: Read>(r: &mut R, count: usize) -> io::Result<Vec<u8>> {
    let mut buffer = vec![0u8; count];
    r.read_exact(&mut buffer)?;
    Ok(buffer)
}

fn read_i16_column<R: Read>(r: &mut R, count: usize) -> io::Result<Vec<i16>> {
    let mut buffer = vec![0i16; count];
    for slot in buffer.iter_mut() {
        *slot = r.read_le_i16()?;
    }
    Ok(buffer)
}
