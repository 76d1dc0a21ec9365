//! # Chunk File Format
//!
//! One file per chunk, named `<identifier>.chunk`. All integers are little-endian.
//!
//! ```text
//! u32 magic       = 0xDEADBEEF
//! u32 version     = 1
//! u64 block_count = CHUNK_SIZE
//! u8[block_count] voxels, index = x + z * S + y * S * S
//! i32 x, i32 y, i32 z   chunk coordinate, checked on load but never fatal
//! ```

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ChunkCoord;
use crate::engine_state::voxels::block::BlockId;

/// Leading magic number of every chunk file.
pub const MAGIC: u32 = 0xDEAD_BEEF;
/// Current chunk file version.
pub const VERSION: u32 = 1;
/// Extension of chunk files.
pub const CHUNK_FILE_EXTENSION: &str = "chunk";

/// Error type for chunk persistence.
#[derive(Debug, Error)]
pub enum ChunkIoError {
    /// Underlying read or write failure, including truncated files.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// No file exists at the expected location.
    #[error("chunk file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The file does not start with [`MAGIC`].
    #[error("invalid magic number {0:#010x}")]
    InvalidMagicNumber(u32),
    /// The file was written by an unsupported format version.
    #[error("unsupported chunk file version {0}")]
    InvalidVersion(u32),
    /// The file holds a different number of voxels than this build's chunks.
    #[error("chunk file holds {found} blocks, expected {expected}")]
    BlockCountMismatch {
        /// Block count this build expects
        expected: u64,
        /// Block count stored in the file
        found: u64,
    },
}

/// Decoded contents of a chunk file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFile {
    /// Raw voxel array in storage order
    pub blocks: Vec<BlockId>,
    /// Coordinate recorded when the chunk was saved
    pub coord: ChunkCoord,
}

/// Location of a chunk's file inside `base_dir`.
pub fn chunk_file_path(base_dir: &Path, identifier: &str) -> PathBuf {
    base_dir.join(format!("{}.{}", identifier, CHUNK_FILE_EXTENSION))
}

/// Writes `blocks` and `coord` to `path`, creating parent directories as needed.
pub fn write_chunk_file(path: &Path, blocks: &[BlockId], coord: ChunkCoord) -> Result<(), ChunkIoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&MAGIC.to_le_bytes())?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&(blocks.len() as u64).to_le_bytes())?;
    writer.write_all(blocks)?;
    writer.write_all(&coord.x.to_le_bytes())?;
    writer.write_all(&coord.y.to_le_bytes())?;
    writer.write_all(&coord.z.to_le_bytes())?;
    writer.flush()?;

    Ok(())
}

/// Reads and validates the chunk file at `path`.
///
/// The whole file is validated before anything is returned, so a caller never sees
/// a partially decoded voxel array.
pub fn read_chunk_file(path: &Path, expected_blocks: usize) -> Result<ChunkFile, ChunkIoError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ChunkIoError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    let mut reader = BufReader::new(file);

    let magic = read_u32(&mut reader)?;
    if magic != MAGIC {
        return Err(ChunkIoError::InvalidMagicNumber(magic));
    }

    let version = read_u32(&mut reader)?;
    if version != VERSION {
        return Err(ChunkIoError::InvalidVersion(version));
    }

    let mut count_bytes = [0u8; 8];
    reader.read_exact(&mut count_bytes)?;
    let block_count = u64::from_le_bytes(count_bytes);
    if block_count != expected_blocks as u64 {
        return Err(ChunkIoError::BlockCountMismatch {
            expected: expected_blocks as u64,
            found: block_count,
        });
    }

    let mut blocks = vec![0u8; expected_blocks];
    reader.read_exact(&mut blocks)?;

    let x = read_i32(&mut reader)?;
    let y = read_i32(&mut reader)?;
    let z = read_i32(&mut reader)?;

    Ok(ChunkFile {
        blocks,
        coord: ChunkCoord::new(x, y, z),
    })
}

fn read_u32(reader: &mut impl Read) -> io::Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_i32(reader: &mut impl Read) -> io::Result<i32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(i32::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("voxel_world_chunk_io_{}", name));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_write_and_read_chunk_file() {
        let dir = scratch_dir("round_trip");
        let path = chunk_file_path(&dir, "1f0");
        let blocks: Vec<BlockId> = (0..64u32).map(|n| (n % 5) as BlockId).collect();

        write_chunk_file(&path, &blocks, ChunkCoord::new(1, -1, 0)).unwrap();
        let file = read_chunk_file(&path, blocks.len()).unwrap();
        assert_eq!(file.blocks, blocks);
        assert_eq!(file.coord, ChunkCoord::new(1, -1, 0));

        let raw = fs::read(&path).unwrap();
        assert_eq!(&raw[..4], &[0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(raw.len(), 4 + 4 + 8 + 64 + 12);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_rejects_bad_headers() {
        let dir = scratch_dir("bad_headers");
        fs::create_dir_all(&dir).unwrap();

        let bad_magic = dir.join("magic.chunk");
        fs::write(&bad_magic, [0u8; 32]).unwrap();
        assert!(matches!(
            read_chunk_file(&bad_magic, 8),
            Err(ChunkIoError::InvalidMagicNumber(0))
        ));

        let bad_version = dir.join("version.chunk");
        let mut bytes = MAGIC.to_le_bytes().to_vec();
        bytes.extend_from_slice(&7u32.to_le_bytes());
        fs::write(&bad_version, &bytes).unwrap();
        assert!(matches!(
            read_chunk_file(&bad_version, 8),
            Err(ChunkIoError::InvalidVersion(7))
        ));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_rejects_size_mismatch_and_truncation() {
        let dir = scratch_dir("size");
        let path = chunk_file_path(&dir, "small");
        write_chunk_file(&path, &[1, 2, 3, 4], ChunkCoord::new(0, 0, 0)).unwrap();

        assert!(matches!(
            read_chunk_file(&path, 8),
            Err(ChunkIoError::BlockCountMismatch {
                expected: 8,
                found: 4
            })
        ));

        let raw = fs::read(&path).unwrap();
        fs::write(&path, &raw[..raw.len() - 6]).unwrap();
        assert!(matches!(read_chunk_file(&path, 4), Err(ChunkIoError::Io(_))));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file() {
        let dir = scratch_dir("missing");
        let path = chunk_file_path(&dir, "nothing");
        assert!(matches!(
            read_chunk_file(&path, 8),
            Err(ChunkIoError::NotFound(_))
        ));
    }
}
