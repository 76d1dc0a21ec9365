//! # Chunk Path Module
//!
//! A [`ChunkPath`] addresses a chunk in the world hierarchy the way a file path addresses
//! a file: it starts at the root and records one child selection per level. Unlike a
//! player-relative position, a path never changes as the player moves.
//!
//! ## Step Encoding
//!
//! Each level is a single byte holding a signed offset triple:
//!
//! | axis | range     | bits |
//! |------|-----------|------|
//! | x    | `-4..=3`  | 3    |
//! | y    | `-4..=3`  | 3    |
//! | z    | `-2..=1`  | 2    |
//!
//! packed as `(x << 5) | (y << 2) | z` after biasing each axis into its unsigned range.
//! Values outside a range wrap (are masked) instead of being rejected.
//!
//! ## String Form
//!
//! Every step renders as three hex digits, one per axis, each holding the axis value as a
//! signed 4-bit nibble (`-1` is `f`, `-4` is `c`). Steps are joined with `_`, and the root
//! path renders as `ROOT`. For example `ChunkPath` steps `(1, -1, 0)` then `(0, 2, -2)`
//! render as `1f0_02e`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Literal string form of the root path.
pub const ROOT_TOKEN: &str = "ROOT";

const X_BIAS: i32 = 4;
const Y_BIAS: i32 = 4;
const Z_BIAS: i32 = 2;

/// Inclusive range of the x offset of one step.
pub const STEP_X_RANGE: (i32, i32) = (-4, 3);
/// Inclusive range of the y offset of one step.
pub const STEP_Y_RANGE: (i32, i32) = (-4, 3);
/// Inclusive range of the z offset of one step.
pub const STEP_Z_RANGE: (i32, i32) = (-2, 1);

/// Hierarchical address of a chunk: an append-only sequence of encoded steps.
///
/// Equality and ordering are structural (byte-by-byte), never hash based.
///
/// # Examples
///
/// ```
/// use voxel_world::ChunkPath;
///
/// let mut path = ChunkPath::root();
/// path.append(1, -1, 0);
/// path.append(0, 2, -2);
///
/// assert_eq!(path.to_hex_string(), "1f0_02e");
/// assert_eq!(ChunkPath::from_hex_string("1f0_02e"), path);
/// assert_eq!(path.parent().depth(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPath {
    steps: Vec<u8>,
}

impl ChunkPath {
    /// The root path (no steps).
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path from already encoded steps.
    pub fn from_steps(steps: Vec<u8>) -> Self {
        Self { steps }
    }

    /// Encodes one `(x, y, z)` offset triple into a step byte.
    ///
    /// Out-of-range values wrap into their bit field; callers that need strictness
    /// must validate against [`STEP_X_RANGE`], [`STEP_Y_RANGE`] and [`STEP_Z_RANGE`].
    pub fn encode_triple(x: i32, y: i32, z: i32) -> u8 {
        let x = (x + X_BIAS) & 0x7;
        let y = (y + Y_BIAS) & 0x7;
        let z = (z + Z_BIAS) & 0x3;

        ((x << 5) | (y << 2) | z) as u8
    }

    /// Decodes a step byte back into its `(x, y, z)` offset triple.
    pub fn decode_triple(encoded: u8) -> (i32, i32, i32) {
        let encoded = encoded as i32;
        (
            ((encoded >> 5) & 0x7) - X_BIAS,
            ((encoded >> 2) & 0x7) - Y_BIAS,
            (encoded & 0x3) - Z_BIAS,
        )
    }

    /// Returns `true` if the triple lies inside the step ranges and encodes without wrapping.
    pub fn is_valid_triple(x: i32, y: i32, z: i32) -> bool {
        (STEP_X_RANGE.0..=STEP_X_RANGE.1).contains(&x)
            && (STEP_Y_RANGE.0..=STEP_Y_RANGE.1).contains(&y)
            && (STEP_Z_RANGE.0..=STEP_Z_RANGE.1).contains(&z)
    }

    /// Descends one level by appending the child selected by `(x, y, z)`.
    pub fn append(&mut self, x: i32, y: i32, z: i32) {
        self.steps.push(Self::encode_triple(x, y, z));
    }

    /// Descends one level by appending an already encoded step.
    pub fn append_encoded(&mut self, encoded: u8) {
        self.steps.push(encoded);
    }

    /// Returns a new path one level below this one.
    pub fn child(&self, x: i32, y: i32, z: i32) -> Self {
        let mut child = self.clone();
        child.append(x, y, z);
        child
    }

    /// The path one level up. The parent of the root is the root.
    pub fn parent(&self) -> Self {
        match self.steps.split_last() {
            Some((_, rest)) => Self::from_steps(rest.to_vec()),
            None => Self::root(),
        }
    }

    /// Number of levels below the root.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// The raw encoded steps, root first.
    pub fn steps(&self) -> &[u8] {
        &self.steps
    }

    /// Iterates the decoded `(x, y, z)` offsets, root first.
    pub fn decoded_steps(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        self.steps.iter().map(|&step| Self::decode_triple(step))
    }

    /// Order-sensitive polynomial hash (`hash = hash * 31 + step`, seeded at 0).
    ///
    /// This is a 32-bit non-cryptographic hash: distinct paths can collide (for
    /// instance `[0, 31]` and `[1, 0]`). It is suitable as a lookup key only when the
    /// full path is compared as well, which [`ChunkRegistry`](crate::ChunkRegistry) does.
    pub fn hash(&self) -> u32 {
        self.steps
            .iter()
            .fold(0u32, |hash, &step| hash.wrapping_mul(31).wrapping_add(step as u32))
    }

    /// Renders the path in its `xyz_xyz` hex form, or `ROOT`.
    pub fn to_hex_string(&self) -> String {
        if self.is_root() {
            return ROOT_TOKEN.to_string();
        }

        self.decoded_steps()
            .map(|(x, y, z)| format!("{:x}{:x}{:x}", x & 0xf, y & 0xf, z & 0xf))
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Parses the hex form produced by [`to_hex_string`](Self::to_hex_string).
    ///
    /// Parsing is lenient: any `_`-separated group that is not exactly three hex
    /// digits is skipped rather than failing the whole parse.
    pub fn from_hex_string(hex: &str) -> Self {
        let mut path = Self::root();
        if hex == ROOT_TOKEN {
            return path;
        }

        for token in hex.split('_') {
            if let Some((x, y, z)) = parse_step_token(token) {
                path.append(x, y, z);
            }
        }

        path
    }
}

/// Parses one three-digit step group into signed offsets.
fn parse_step_token(token: &str) -> Option<(i32, i32, i32)> {
    if token.len() != 3 {
        return None;
    }

    let mut nibbles = [0i32; 3];
    for (nibble, c) in nibbles.iter_mut().zip(token.chars()) {
        let value = c.to_digit(16)? as i32;
        *nibble = if value >= 8 { value - 16 } else { value };
    }

    Some((nibbles[0], nibbles[1], nibbles[2]))
}

impl fmt::Display for ChunkPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

impl FromStr for ChunkPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_hex_string(s))
    }
}
