//! The 16-byte AES block.
//!
//! AES operates on a 4x4 matrix of bytes called the "state", stored here as a
//! flat 16-byte array in column-major order: bytes `[0..4]` are column 0,
//! bytes `[4..8]` are column 1, and so on.
//!
//! Besides the byte view, a block can be read as four little-endian `u32`
//! words. Chaining registers and round keys are XORed a word at a time; the
//! conversion is explicit ([`Block::words`] / [`Block::from_words`]) rather
//! than a reinterpreting cast.

use std::ops::{BitXor, BitXorAssign, Index, IndexMut};

/// Block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// One 16-byte cipher block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Block(pub [u8; BLOCK_SIZE]);

impl Block {
    /// The all-zero block.
    pub const ZERO: Block = Block([0; BLOCK_SIZE]);

    /// Build a block from the first 16 bytes of `bytes`.
    ///
    /// Panics if `bytes` is shorter than 16 bytes; callers slice
    /// block-aligned buffers before calling.
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut b = [0u8; BLOCK_SIZE];
        b.copy_from_slice(&bytes[..BLOCK_SIZE]);
        Block(b)
    }

    /// Build a block from up to 16 bytes, zero-padding the tail.
    #[inline]
    pub fn zero_padded(bytes: &[u8]) -> Self {
        let mut b = [0u8; BLOCK_SIZE];
        let n = bytes.len().min(BLOCK_SIZE);
        b[..n].copy_from_slice(&bytes[..n]);
        Block(b)
    }

    /// Borrow the byte view.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.0
    }

    /// Mutably borrow the byte view.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8; BLOCK_SIZE] {
        &mut self.0
    }

    /// The word view: four little-endian `u32`s.
    #[inline]
    pub fn words(&self) -> [u32; 4] {
        let b = &self.0;
        [
            u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            u32::from_le_bytes([b[4], b[5], b[6], b[7]]),
            u32::from_le_bytes([b[8], b[9], b[10], b[11]]),
            u32::from_le_bytes([b[12], b[13], b[14], b[15]]),
        ]
    }

    /// Inverse of [`Block::words`].
    #[inline]
    pub fn from_words(w: [u32; 4]) -> Self {
        let mut b = [0u8; BLOCK_SIZE];
        for (chunk, word) in b.chunks_exact_mut(4).zip(w) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Block(b)
    }

    /// Increment the block as one 128-bit big-endian integer.
    ///
    /// The carry runs from the last byte toward the first; an all-ones block
    /// wraps to all zeros.
    #[inline]
    pub fn increment(&mut self) {
        for b in self.0.iter_mut().rev() {
            *b = b.wrapping_add(1);
            if *b != 0 {
                break;
            }
        }
    }

    /// XOR the block into the first 16 bytes of `buf`.
    #[inline]
    pub fn xor_into(&self, buf: &mut [u8]) {
        for (d, k) in buf.iter_mut().zip(self.0.iter()) {
            *d ^= k;
        }
    }
}

impl From<[u8; BLOCK_SIZE]> for Block {
    fn from(b: [u8; BLOCK_SIZE]) -> Self {
        Block(b)
    }
}

impl From<Block> for [u8; BLOCK_SIZE] {
    fn from(b: Block) -> Self {
        b.0
    }
}

impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Index<usize> for Block {
    type Output = u8;

    #[inline]
    fn index(&self, i: usize) -> &u8 {
        &self.0[i]
    }
}

impl IndexMut<usize> for Block {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut u8 {
        &mut self.0[i]
    }
}

impl BitXorAssign for Block {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Block) {
        let (a, b) = (self.words(), rhs.words());
        *self = Block::from_words([a[0] ^ b[0], a[1] ^ b[1], a[2] ^ b[2], a[3] ^ b[3]]);
    }
}

impl BitXor for Block {
    type Output = Block;

    #[inline]
    fn bitxor(mut self, rhs: Block) -> Block {
        self ^= rhs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_little_endian() {
        let b = Block(core::array::from_fn(|i| i as u8));
        assert_eq!(b.words()[0], 0x0302_0100);
        assert_eq!(b.words()[3], 0x0F0E_0D0C);
        assert_eq!(Block::from_words(b.words()), b);
    }

    #[test]
    fn increment_carries_toward_first_byte() {
        let mut b = Block::ZERO;
        b[14] = 0x01;
        b[15] = 0xFF;
        b.increment();
        assert_eq!(b[14], 0x02);
        assert_eq!(b[15], 0x00);
    }

    #[test]
    fn increment_wraps_full_register() {
        let mut b = Block([0xFF; BLOCK_SIZE]);
        b.increment();
        assert_eq!(b, Block::ZERO);
    }

    #[test]
    fn xor_matches_bytewise() {
        let a = Block([0xA5; BLOCK_SIZE]);
        let b = Block(core::array::from_fn(|i| i as u8));
        let x = a ^ b;
        for i in 0..BLOCK_SIZE {
            assert_eq!(x[i], 0xA5 ^ i as u8);
        }
    }

    #[test]
    fn zero_padded_short_input() {
        let b = Block::zero_padded(&[1, 2, 3]);
        assert_eq!(&b.0[..4], &[1, 2, 3, 0]);
        assert_eq!(b.0[15], 0);
    }
}
