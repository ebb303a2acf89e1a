//! Chunk framing: the 4-byte signature plus LZ4 sub-header every chunk
//! record is wrapped in, regardless of what's inside (`META`, `SSTR`,
//! `INST`, `PROP`, `PRNT`, `END\0`).

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Default ceiling on a single chunk's decompressed size, guarding against a
/// maliciously small `compressed_len`/huge `decompressed_len` pair forcing
/// an enormous allocation before any of it has been validated.
pub const DEFAULT_MAX_DECOMPRESSED_CHUNK_SIZE: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkCompression {
    Compressed,
    Uncompressed,
}

/// A decoded chunk record: its 4-byte signature and fully decompressed
/// payload, ready for a type-specific decoder to parse.
#[derive(Debug)]
pub struct Chunk {
    pub name: [u8; 4],
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn decode<R: Read>(reader: R) -> io::Result<Chunk> {
        Self::decode_with_limit(reader, DEFAULT_MAX_DECOMPRESSED_CHUNK_SIZE)
    }

    pub fn decode_with_limit<R: Read>(mut reader: R, max_decompressed_size: u64) -> io::Result<Chunk> {
        let mut name = [0; 4];
        reader.read_exact(&mut name)?;

        let compressed_len = reader.read_u32::<LittleEndian>()?;
        let decompressed_len = reader.read_u32::<LittleEndian>()?;
        let mut reserved = [0; 4];
        reader.read_exact(&mut reserved)?;

        if decompressed_len as u64 > max_decompressed_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "chunk {:?} claims a decompressed size of {} bytes, exceeding the configured limit of {} bytes",
                    String::from_utf8_lossy(&name),
                    decompressed_len,
                    max_decompressed_size
                ),
            ));
        }

        let data = if compressed_len == 0 {
            let mut data = vec![0; decompressed_len as usize];
            reader.read_exact(&mut data)?;
            data
        } else {
            let mut compressed = vec![0; compressed_len as usize];
            reader.read_exact(&mut compressed)?;

            lz4::block::decompress(&compressed, Some(decompressed_len as i32)).map_err(|err| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("could not decompress chunk {:?}: {}", String::from_utf8_lossy(&name), err),
                )
            })?
        };

        Ok(Chunk { name, data })
    }
}

/// Accumulates a chunk's payload in memory; `dump` compresses (or not) and
/// writes the finished record, signature and sub-header included.
pub struct ChunkBuilder {
    name: [u8; 4],
    compression: ChunkCompression,
    data: Vec<u8>,
}

impl ChunkBuilder {
    pub fn new(name: &[u8; 4], compression: ChunkCompression) -> Self {
        ChunkBuilder {
            name: *name,
            compression,
            data: Vec::new(),
        }
    }

    pub fn dump<W: Write>(self, mut output: W) -> io::Result<()> {
        output.write_all(&self.name)?;

        match self.compression {
            ChunkCompression::Uncompressed => {
                output.write_u32::<LittleEndian>(0)?;
                output.write_u32::<LittleEndian>(self.data.len() as u32)?;
                output.write_u32::<LittleEndian>(0)?;
                output.write_all(&self.data)?;
            }
            ChunkCompression::Compressed => {
                let compressed = lz4::block::compress(&self.data, None, false)?;

                output.write_u32::<LittleEndian>(compressed.len() as u32)?;
                output.write_u32::<LittleEndian>(self.data.len() as u32)?;
                output.write_u32::<LittleEndian>(0)?;
                output.write_all(&compressed)?;
            }
        }

        Ok(())
    }
}

impl Write for ChunkBuilder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn uncompressed_round_trip() {
        let mut chunk = ChunkBuilder::new(b"META", ChunkCompression::Uncompressed);
        chunk.write_all(b"hello").unwrap();

        let mut buffer = Vec::new();
        chunk.dump(&mut buffer).unwrap();

        let decoded = Chunk::decode(buffer.as_slice()).unwrap();
        assert_eq!(&decoded.name, b"META");
        assert_eq!(decoded.data, b"hello");
    }

    #[test]
    fn compressed_round_trip() {
        let mut chunk = ChunkBuilder::new(b"INST", ChunkCompression::Compressed);
        chunk.write_all(&vec![7u8; 512]).unwrap();

        let mut buffer = Vec::new();
        chunk.dump(&mut buffer).unwrap();

        let decoded = Chunk::decode(buffer.as_slice()).unwrap();
        assert_eq!(&decoded.name, b"INST");
        assert_eq!(decoded.data, vec![7u8; 512]);
    }

    #[test]
    fn oversized_decompressed_len_is_rejected() {
        let mut chunk = ChunkBuilder::new(b"INST", ChunkCompression::Compressed);
        chunk.write_all(&vec![1u8; 64]).unwrap();

        let mut buffer = Vec::new();
        chunk.dump(&mut buffer).unwrap();

        let err = Chunk::decode_with_limit(buffer.as_slice(), 8).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
