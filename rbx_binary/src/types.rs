//! Bit-level primitives (zig-zag, interleave, rotated-sign float) and the
//! binary format's `data_type` tag, kept as its own enum rather than reused
//! from `rbx_types::VariantType` because the wire tag is a serialization
//! detail, not part of this workspace's value model.

use std::{
    convert::TryFrom,
    io::{self, Read, Write},
};

use byteorder::WriteBytesExt;
use lazy_static::lazy_static;
use rbx_types::{Matrix3, Vector3, VariantType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Type {
    String = 0x01,
    BinaryString = 0x02,
    ProtectedString = 0x03,
    Content = 0x04,
    Bool = 0x05,
    Int32 = 0x06,
    Int64 = 0x07,
    Float32 = 0x08,
    Float64 = 0x09,
    BrickColor = 0x0A,
    Enum = 0x0B,
    UDim = 0x0C,
    UDim2 = 0x0D,
    Ray = 0x0E,
    Faces = 0x0F,
    Axes = 0x10,
    Color3 = 0x11,
    Color3uint8 = 0x12,
    Vector2 = 0x13,
    Vector2int16 = 0x14,
    Vector3 = 0x15,
    Vector3int16 = 0x16,
    CFrame = 0x17,
    NumberSequence = 0x18,
    ColorSequence = 0x19,
    NumberRange = 0x1A,
    Rect = 0x1B,
    PhysicalProperties = 0x1C,
    Ref = 0x1D,
    SharedString = 0x1E,
}

impl Type {
    pub fn from_variant_type(ty: VariantType) -> Option<Type> {
        Some(match ty {
            VariantType::String => Type::String,
            VariantType::BinaryString => Type::BinaryString,
            VariantType::ProtectedString => Type::ProtectedString,
            VariantType::Content => Type::Content,
            VariantType::Bool => Type::Bool,
            VariantType::Int32 => Type::Int32,
            VariantType::Int64 => Type::Int64,
            VariantType::Float32 => Type::Float32,
            VariantType::Float64 => Type::Float64,
            VariantType::BrickColor => Type::BrickColor,
            VariantType::Enum => Type::Enum,
            VariantType::UDim => Type::UDim,
            VariantType::UDim2 => Type::UDim2,
            VariantType::Ray => Type::Ray,
            VariantType::Faces => Type::Faces,
            VariantType::Axes => Type::Axes,
            VariantType::Color3 => Type::Color3,
            VariantType::Color3uint8 => Type::Color3uint8,
            VariantType::Vector2 => Type::Vector2,
            VariantType::Vector2int16 => Type::Vector2int16,
            VariantType::Vector3 => Type::Vector3,
            VariantType::Vector3int16 => Type::Vector3int16,
            VariantType::CFrame => Type::CFrame,
            VariantType::NumberSequence => Type::NumberSequence,
            VariantType::ColorSequence => Type::ColorSequence,
            VariantType::NumberRange => Type::NumberRange,
            VariantType::Rect => Type::Rect,
            VariantType::PhysicalProperties => Type::PhysicalProperties,
            VariantType::Ref => Type::Ref,
            VariantType::SharedString => Type::SharedString,
        })
    }
}

impl TryFrom<u8> for Type {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x01 => Type::String,
            0x02 => Type::BinaryString,
            0x03 => Type::ProtectedString,
            0x04 => Type::Content,
            0x05 => Type::Bool,
            0x06 => Type::Int32,
            0x07 => Type::Int64,
            0x08 => Type::Float32,
            0x09 => Type::Float64,
            0x0A => Type::BrickColor,
            0x0B => Type::Enum,
            0x0C => Type::UDim,
            0x0D => Type::UDim2,
            0x0E => Type::Ray,
            0x0F => Type::Faces,
            0x10 => Type::Axes,
            0x11 => Type::Color3,
            0x12 => Type::Color3uint8,
            0x13 => Type::Vector2,
            0x14 => Type::Vector2int16,
            0x15 => Type::Vector3,
            0x16 => Type::Vector3int16,
            0x17 => Type::CFrame,
            0x18 => Type::NumberSequence,
            0x19 => Type::ColorSequence,
            0x1A => Type::NumberRange,
            0x1B => Type::Rect,
            0x1C => Type::PhysicalProperties,
            0x1D => Type::Ref,
            0x1E => Type::SharedString,
            _ => return Err(()),
        })
    }
}

// --- zig-zag ----------------------------------------------------------

pub fn encode_zigzag_i32(value: i32) -> i32 {
    (value << 1) ^ (value >> 31)
}

pub fn decode_zigzag_i32(value: i32) -> i32 {
    ((value as u32) >> 1) as i32 ^ -(value & 1)
}

pub fn encode_zigzag_i64(value: i64) -> i64 {
    (value << 1) ^ (value >> 63)
}

pub fn decode_zigzag_i64(value: i64) -> i64 {
    ((value as u64) >> 1) as i64 ^ -(value & 1)
}

// --- rotated-sign float -------------------------------------------------

pub fn encode_rotated_float(value: f32) -> u32 {
    value.to_bits().rotate_left(1)
}

pub fn decode_rotated_float(bits: u32) -> f32 {
    f32::from_bits(bits.rotate_right(1))
}

// --- interleave ----------------------------------------------------------

/// Writes `values` (big-endian `group_size`-byte words) in column-major
/// order: all most-significant bytes, then the next, and so on.
/// `group_size` is always 4 here (`Int32`, `Float32`, `Enum`/`Token`).
pub(crate) fn write_interleaved_bytes<W, I>(
    output: &mut W,
    values: I,
    group_size: usize,
) -> io::Result<()>
where
    W: Write + ?Sized,
    I: Iterator<Item = u32> + Clone,
{
    for col in 0..group_size {
        let shift = (group_size - 1 - col) * 8;
        for value in values.clone() {
            output.write_u8((value >> shift) as u8)?;
        }
    }
    Ok(())
}

pub(crate) fn read_interleaved_bytes<R>(
    source: &mut R,
    count: usize,
    group_size: usize,
) -> io::Result<Vec<u32>>
where
    R: Read + ?Sized,
{
    let mut buffer = vec![0u8; count * group_size];
    source.read_exact(&mut buffer)?;

    let mut output = vec![0u32; count];
    for col in 0..group_size {
        let shift = (group_size - 1 - col) * 8;
        for row in 0..count {
            let byte = buffer[col * count + row];
            output[row] |= (byte as u32) << shift;
        }
    }
    Ok(output)
}

pub(crate) fn write_interleaved_bytes_u64<W, I>(
    output: &mut W,
    values: I,
    group_size: usize,
) -> io::Result<()>
where
    W: Write + ?Sized,
    I: Iterator<Item = u64> + Clone,
{
    for col in 0..group_size {
        let shift = (group_size - 1 - col) * 8;
        for value in values.clone() {
            output.write_u8((value >> shift) as u8)?;
        }
    }
    Ok(())
}

pub(crate) fn read_interleaved_bytes_u64<R>(
    source: &mut R,
    count: usize,
    group_size: usize,
) -> io::Result<Vec<u64>>
where
    R: Read + ?Sized,
{
    let mut buffer = vec![0u8; count * group_size];
    source.read_exact(&mut buffer)?;

    let mut output = vec![0u64; count];
    for col in 0..group_size {
        let shift = (group_size - 1 - col) * 8;
        for row in 0..count {
            let byte = buffer[col * count + row];
            output[row] |= (byte as u64) << shift;
        }
    }
    Ok(output)
}

// --- CFrame axis-aligned rotation table ---------------------------------

/// The 24 proper rotations (signed permutation matrices with determinant
/// +1) that a CFrame's orientation can take on without needing to spell out
/// all nine floats. Tag `0x00` always means "write the full matrix"; tags
/// `0x01..=0x18` index this table.
fn axis_aligned_rotations() -> [Matrix3; 24] {
    const PERMUTATIONS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    fn permutation_sign(p: [usize; 3]) -> i32 {
        let mut inversions = 0;
        for i in 0..3 {
            for j in (i + 1)..3 {
                if p[i] > p[j] {
                    inversions += 1;
                }
            }
        }
        if inversions % 2 == 0 {
            1
        } else {
            -1
        }
    }

    let mut rotations = Vec::with_capacity(24);

    for p in PERMUTATIONS.iter().copied() {
        let sign_p = permutation_sign(p);

        for s0 in [-1i32, 1].iter().copied() {
            for s1 in [-1i32, 1].iter().copied() {
                for s2 in [-1i32, 1].iter().copied() {
                    if sign_p * s0 * s1 * s2 != 1 {
                        continue;
                    }

                    let signs = [s0, s1, s2];
                    let mut rows = [[0.0f32; 3]; 3];
                    for (i, &col) in p.iter().enumerate() {
                        rows[i][col] = signs[i] as f32;
                    }

                    rotations.push(Matrix3::new(
                        Vector3::new(rows[0][0], rows[0][1], rows[0][2]),
                        Vector3::new(rows[1][0], rows[1][1], rows[1][2]),
                        Vector3::new(rows[2][0], rows[2][1], rows[2][2]),
                    ));
                }
            }
        }
    }

    let mut table = [Matrix3::identity(); 24];
    table.copy_from_slice(&rotations[0..24]);
    table
}

lazy_static! {
    static ref CFRAME_ROTATIONS: [Matrix3; 24] = axis_aligned_rotations();
}

/// Returns the 1-based table tag for `matrix`, if it's one of the 24
/// axis-aligned rotations.
pub fn cframe_rotation_tag(matrix: &Matrix3) -> Option<u8> {
    CFRAME_ROTATIONS
        .iter()
        .position(|candidate| candidate == matrix)
        .map(|index| (index + 1) as u8)
}

/// Looks up the matrix for a nonzero rotation tag written by the encoder.
pub fn cframe_rotation_from_tag(tag: u8) -> Option<Matrix3> {
    if tag == 0 {
        return None;
    }

    CFRAME_ROTATIONS.get((tag - 1) as usize).copied()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zigzag_round_trips() {
        for value in [0, 1, -1, 2, -2, i32::MAX, i32::MIN] {
            assert_eq!(decode_zigzag_i32(encode_zigzag_i32(value)), value);
        }
    }

    #[test]
    fn zigzag_i64_round_trips() {
        for value in [0i64, 1, -1, i64::MAX, i64::MIN] {
            assert_eq!(decode_zigzag_i64(encode_zigzag_i64(value)), value);
        }
    }

    #[test]
    fn rotated_float_round_trips() {
        for value in [0.0f32, 1.0, -1.0, 3.14159, -2.71828] {
            let bits = encode_rotated_float(value).to_bits();
            assert_eq!(decode_rotated_float(bits), value);
        }
    }

    #[test]
    fn interleave_round_trips() {
        let values = vec![1i32, -2, 3, i32::MIN, i32::MAX];
        let mut buffer = Vec::new();

        write_interleaved_bytes(&mut buffer, values.iter().map(|&v| v as u32), 4).unwrap();

        let decoded = read_interleaved_bytes(&mut buffer.as_slice(), values.len(), 4).unwrap();
        let decoded: Vec<i32> = decoded.into_iter().map(|v| v as i32).collect();

        assert_eq!(decoded, values);
    }

    #[test]
    fn rotation_table_has_24_unique_proper_rotations() {
        let table = axis_aligned_rotations();
        for matrix in table.iter() {
            let det = matrix.x.x * (matrix.y.y * matrix.z.z - matrix.y.z * matrix.z.y)
                - matrix.x.y * (matrix.y.x * matrix.z.z - matrix.y.z * matrix.z.x)
                + matrix.x.z * (matrix.y.x * matrix.z.y - matrix.y.y * matrix.z.x);
            assert!((det - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn rotation_tag_round_trips() {
        let matrix = CFRAME_ROTATIONS[5];
        let tag = cframe_rotation_tag(&matrix).unwrap();
        assert_eq!(cframe_rotation_from_tag(tag).unwrap(), matrix);
    }
}
