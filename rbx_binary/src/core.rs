//! Low-level byte-stream primitives shared by the serializer and
//! deserializer: the file magic, and the `Read`/`Write` extension traits
//! that every chunk codec in `types.rs` builds on.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// First 8 bytes of every binary model/place file.
pub const FILE_MAGIC_HEADER: &[u8] = b"<roblox!";

/// Remaining 8 bytes of the 16-byte magic: a binary marker borrowed from the
/// PNG signature (so a shell mistaking the file for text stops at `\x1a`)
/// plus two reserved bytes.
pub const FILE_SIGNATURE: &[u8] = b"\x89\xff\r\n\x1a\n\0\0";

pub const FILE_VERSION: u16 = 0;

/// `Write` extension methods used by every chunk codec to lay out the
/// little/big-endian primitives and packed columns spec.md describes.
pub trait RbxWriteExt: Write {
    fn write_le_u16(&mut self, value: u16) -> io::Result<()> {
        self.write_u16::<LittleEndian>(value)
    }

    fn write_le_u32(&mut self, value: u32) -> io::Result<()> {
        self.write_u32::<LittleEndian>(value)
    }

    fn write_le_i32(&mut self, value: i32) -> io::Result<()> {
        self.write_i32::<LittleEndian>(value)
    }

    fn write_le_i16(&mut self, value: i16) -> io::Result<()> {
        self.write_i16::<LittleEndian>(value)
    }

    fn write_le_f32(&mut self, value: f32) -> io::Result<()> {
        self.write_f32::<LittleEndian>(value)
    }

    fn write_le_f64(&mut self, value: f64) -> io::Result<()> {
        self.write_f64::<LittleEndian>(value)
    }

    fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.write_u8(value as u8)
    }

    /// Writes a u32-le-length-prefixed string. Used for `String`,
    /// `BinaryString`, `ProtectedString`, and `Content` columns alike, plus
    /// every other length-prefixed name/string in the format (class names,
    /// property names, META entries).
    fn write_string(&mut self, value: &str) -> io::Result<()> {
        self.write_binary_string(value.as_bytes())
    }

    fn write_binary_string(&mut self, value: &[u8]) -> io::Result<()> {
        self.write_le_u32(value.len() as u32)?;
        self.write_all(value)
    }

    /// `count` big-endian zig-zagged i32s, interleaved with group size 4.
    fn write_interleaved_i32_array<I>(&mut self, values: I) -> io::Result<()>
    where
        I: Iterator<Item = i32> + Clone,
    {
        crate::types::write_interleaved_bytes(
            self,
            values.map(|value| crate::types::encode_zigzag_i32(value) as u32),
            4,
        )
    }

    /// `count` big-endian zig-zagged i64s, interleaved with group size 8.
    fn write_interleaved_i64_array<I>(&mut self, values: I) -> io::Result<()>
    where
        I: Iterator<Item = i64> + Clone,
    {
        crate::types::write_interleaved_bytes_u64(
            self,
            values.map(|value| crate::types::encode_zigzag_i64(value) as u64),
            8,
        )
    }

    /// Token/Enum columns: same shape as `Int32`, but the payload is an
    /// unsigned `u32` reinterpreted through the zig-zag transform.
    fn write_interleaved_u32_array(&mut self, values: &[u32]) -> io::Result<()> {
        crate::types::write_interleaved_bytes(
            self,
            values
                .iter()
                .map(|&value| crate::types::encode_zigzag_i32(value as i32) as u32),
            4,
        )
    }

    /// `count` rotated-sign f32s, big-endian, interleaved with group size 4.
    fn write_interleaved_f32_array<I>(&mut self, values: I) -> io::Result<()>
    where
        I: Iterator<Item = f32> + Clone,
    {
        crate::types::write_interleaved_bytes(
            self,
            values.map(crate::types::encode_rotated_float),
            4,
        )
    }

    /// Referent/instance-id columns: deltas from the previous value, then
    /// the same interleave as `Int32`.
    fn write_referents<I>(&mut self, values: I) -> io::Result<()>
    where
        I: Iterator<Item = i32> + Clone,
    {
        let mut last = 0i32;
        let deltas: Vec<i32> = values
            .map(|value| {
                let delta = value.wrapping_sub(last);
                last = value;
                delta
            })
            .collect();

        self.write_interleaved_i32_array(deltas.into_iter())
    }
}

impl<W: Write + ?Sized> RbxWriteExt for W {}

pub trait RbxReadExt: Read {
    fn read_le_u16(&mut self) -> io::Result<u16> {
        self.read_u16::<LittleEndian>()
    }

    fn read_le_u32(&mut self) -> io::Result<u32> {
        self.read_u32::<LittleEndian>()
    }

    fn read_le_i32(&mut self) -> io::Result<i32> {
        self.read_i32::<LittleEndian>()
    }

    fn read_le_i16(&mut self) -> io::Result<i16> {
        self.read_i16::<LittleEndian>()
    }

    fn read_le_f32(&mut self) -> io::Result<f32> {
        self.read_f32::<LittleEndian>()
    }

    fn read_le_f64(&mut self) -> io::Result<f64> {
        self.read_f64::<LittleEndian>()
    }

    fn read_string(&mut self) -> io::Result<String> {
        let bytes = self.read_binary_string()?;
        String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    fn read_binary_string(&mut self) -> io::Result<Vec<u8>> {
        let length = self.read_u32::<LittleEndian>()?;
        let mut buffer = vec![0; length as usize];
        self.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn read_bool(&mut self) -> io::Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    fn read_interleaved_i32_array(&mut self, output: &mut [i32]) -> io::Result<()> {
        let decoded = crate::types::read_interleaved_bytes(self, output.len(), 4)?;
        for (slot, value) in output.iter_mut().zip(decoded) {
            *slot = crate::types::decode_zigzag_i32(value as i32);
        }
        Ok(())
    }

    fn read_interleaved_i64_array(&mut self, output: &mut [i64]) -> io::Result<()> {
        let decoded = crate::types::read_interleaved_bytes_u64(self, output.len(), 8)?;
        for (slot, value) in output.iter_mut().zip(decoded) {
            *slot = crate::types::decode_zigzag_i64(value as i64);
        }
        Ok(())
    }

    fn read_interleaved_u32_array(&mut self, output: &mut [u32]) -> io::Result<()> {
        let decoded = crate::types::read_interleaved_bytes(self, output.len(), 4)?;
        for (slot, value) in output.iter_mut().zip(decoded) {
            *slot = crate::types::decode_zigzag_i32(value as i32) as u32;
        }
        Ok(())
    }

    fn read_interleaved_f32_array(&mut self, output: &mut [f32]) -> io::Result<()> {
        let decoded = crate::types::read_interleaved_bytes(self, output.len(), 4)?;
        for (slot, value) in output.iter_mut().zip(decoded) {
            *slot = crate::types::decode_rotated_float(value as u32);
        }
        Ok(())
    }

    fn read_referent_array(&mut self, output: &mut [i32]) -> io::Result<()> {
        self.read_interleaved_i32_array(output)?;
        let mut last = 0i32;
        for slot in output.iter_mut() {
            *slot = slot.wrapping_add(last);
            last = *slot;
        }
        Ok(())
    }
}

impl<R: Read + ?Sized> RbxReadExt for R {}
