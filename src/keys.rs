//! AES key schedule.
//!
//! A raw 128-, 192- or 256-bit key is expanded once into `rounds + 1` round
//! keys, each one [`Block`]. The round count depends only on the key size:
//!
//! | Key size | Words (n) | Rounds |
//! |----------|-----------|--------|
//! | 128 bit  | 4         | 10     |
//! | 192 bit  | 6         | 12     |
//! | 256 bit  | 8         | 14     |
//!
//! A [`Key`] is immutable once built and can be cloned into as many cipher
//! contexts as needed.

use crate::block::{BLOCK_SIZE, Block};
use crate::crypto::aes::SBOX;
use crate::{Error, Result};

/// Largest round count (AES-256).
pub const MAX_ROUNDS: usize = 14;

// Round constants: successive doublings of 1 in GF(2^8). Entry 0 is never used because the
// first word that needs a constant has index n, and i / n starts at 1.
const RCON: [u8; 11] = [0x8D, 0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1B, 0x36];

/// Supported AES key sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySize {
    /// 128-bit key, 10 rounds.
    Aes128,
    /// 192-bit key, 12 rounds.
    Aes192,
    /// 256-bit key, 14 rounds.
    Aes256,
}

impl KeySize {
    /// Key length in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }

    /// Key length in bits.
    pub const fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }

    /// Number of rounds the transform runs with this key size.
    pub const fn rounds(self) -> usize {
        self.bytes() / 4 + 6
    }

    /// Pick the key size matching a raw key length in bytes.
    pub fn from_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(Self::Aes128),
            24 => Ok(Self::Aes192),
            32 => Ok(Self::Aes256),
            _ => Err(Error::KeySize(len)),
        }
    }
}

impl TryFrom<u32> for KeySize {
    type Error = Error;

    /// Convert a key-bit count (128, 192 or 256).
    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            128 => Ok(Self::Aes128),
            192 => Ok(Self::Aes192),
            256 => Ok(Self::Aes256),
            _ => Err(Error::KeySize(bits as usize / 8)),
        }
    }
}

/// An expanded AES key.
#[derive(Clone, PartialEq, Eq)]
pub struct Key {
    size: KeySize,
    round_keys: [Block; MAX_ROUNDS + 1],
}

// Round keys stay out of debug output.
impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key").field("size", &self.size).finish_non_exhaustive()
    }
}

impl Key {
    /// Expand a raw key. The key size is taken from `raw.len()`.
    pub fn new(raw: &[u8]) -> Result<Self> {
        let size = KeySize::from_len(raw.len())?;
        Ok(Self::expand(size, raw))
    }

    /// Expand a raw key of an explicitly requested size.
    ///
    /// Fails with [`Error::KeySize`] when `bits` is not 128/192/256 or
    /// `raw` is not exactly `bits / 8` bytes long.
    pub fn with_bits(bits: u32, raw: &[u8]) -> Result<Self> {
        let size = KeySize::try_from(bits)?;
        if raw.len() != size.bytes() {
            return Err(Error::KeySize(raw.len()));
        }
        Ok(Self::expand(size, raw))
    }

    /// Decode a hex-encoded key (32, 48 or 64 hex digits) and expand it.
    ///
    /// Surrounding whitespace is ignored; either letter case is accepted.
    pub fn from_hex(text: &str) -> Result<Self> {
        let raw = hex::decode(text.trim())?;
        Self::new(&raw)
    }

    /// The key size this schedule was built from.
    pub fn size(&self) -> KeySize {
        self.size
    }

    /// Number of rounds (10, 12 or 14).
    pub fn rounds(&self) -> usize {
        self.size.rounds()
    }

    /// The `rounds + 1` round keys, first one being the raw key prefix.
    pub fn round_keys(&self) -> &[Block] {
        &self.round_keys[..=self.rounds()]
    }

    // Expand the key one 4-byte word at a time. Each new word is the word n positions back XORed
    // with the previous word, which is first transformed on every n-th word (RotWord, SubWord and a
    // round constant) and, for 256-bit keys only, half-way between (SubWord alone).
    // https://en.wikipedia.org/wiki/AES_key_schedule
    fn expand(size: KeySize, raw: &[u8]) -> Self {
        let n = size.bytes() / 4;
        let total = 4 * (size.rounds() + 1);
        let mut w = [0u8; (MAX_ROUNDS + 1) * BLOCK_SIZE];
        w[..raw.len()].copy_from_slice(raw);

        for i in n..total {
            let mut t = [w[(i - 1) * 4], w[(i - 1) * 4 + 1], w[(i - 1) * 4 + 2], w[(i - 1) * 4 + 3]];
            if i % n == 0 {
                t = [
                    SBOX[t[1] as usize] ^ RCON[i / n],
                    SBOX[t[2] as usize],
                    SBOX[t[3] as usize],
                    SBOX[t[0] as usize],
                ];
            } else if n > 6 && i % n == 4 {
                t = t.map(|b| SBOX[b as usize]);
            }
            for j in 0..4 {
                w[i * 4 + j] = w[(i - n) * 4 + j] ^ t[j];
            }
        }

        let mut round_keys = [Block::ZERO; MAX_ROUNDS + 1];
        for (rk, chunk) in round_keys.iter_mut().zip(w.chunks_exact(BLOCK_SIZE)) {
            *rk = Block::from_slice(chunk);
        }
        Self { size, round_keys }
    }
}
