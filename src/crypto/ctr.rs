//! Streaming counter-mode keystream.
//!
//! CTR mode converts the block cipher into a stream cipher by encrypting a
//! counter value and XORing the resulting keystream with the data. The
//! counter register is one whole [`Block`] read as a 128-bit big-endian
//! integer.
//!
//! [`Keystream`] caches the unused tail of the last keystream block, so a
//! stream can be processed in pieces of any size: applying it to 5 bytes and
//! then 11 bytes gives the same output as applying it to 16 bytes at once.
//!
//! <https://en.wikipedia.org/wiki/Block_cipher_mode_of_operation#Counter_(CTR)>

use crate::block::{BLOCK_SIZE, Block};
use crate::crypto::aes;
use crate::keys::Key;

/// One block of cached keystream plus the number of bytes not yet used.
#[derive(Clone, Default)]
pub struct Keystream {
    pad: Block,
    remaining: usize,
}

// The cached pad stays out of debug output.
impl std::fmt::Debug for Keystream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keystream")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

impl Keystream {
    /// An empty cache; the next byte triggers a block encryption.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any cached keystream bytes.
    #[inline]
    pub fn reset(&mut self) {
        self.remaining = 0;
    }

    /// Number of cached keystream bytes still available.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// XOR keystream into `data` in place.
    ///
    /// When the cache runs dry, `counter` is encrypted into the cache and
    /// then incremented, so after the call it holds the next unused counter
    /// value. Encryption and decryption are the same operation.
    pub fn apply(&mut self, key: &Key, counter: &mut Block, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.remaining == 0 {
                self.pad = *counter;
                aes::encrypt_block(&mut self.pad, key);
                counter.increment();
                self.remaining = BLOCK_SIZE;
            }
            *byte ^= self.pad[BLOCK_SIZE - self.remaining];
            self.remaining -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    fn key() -> Key {
        Key::new(&hex!("2b7e151628aed2a6abf7158809cf4f3c")).unwrap()
    }

    const COUNTER: [u8; 16] = hex!("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff");

    #[test]
    fn split_calls_match_single_call() {
        let key = key();
        let mut whole = [0u8; 16];
        let mut ctr = Block(COUNTER);
        Keystream::new().apply(&key, &mut ctr, &mut whole);

        let mut split = [0u8; 16];
        let mut ctr2 = Block(COUNTER);
        let mut ks = Keystream::new();
        let (a, b) = split.split_at_mut(5);
        ks.apply(&key, &mut ctr2, a);
        assert_eq!(ks.remaining(), 11);
        ks.apply(&key, &mut ctr2, b);
        assert_eq!(ks.remaining(), 0);

        assert_eq!(whole, split);
        assert_eq!(ctr, ctr2);
    }

    #[test]
    fn counter_advances_once_per_block() {
        let key = key();
        let mut ctr = Block(COUNTER);
        let mut buf = [0u8; 33];
        Keystream::new().apply(&key, &mut ctr, &mut buf);
        let mut expected = Block(COUNTER);
        for _ in 0..3 {
            expected.increment();
        }
        assert_eq!(ctr, expected);
    }

    #[test]
    fn counter_wraps_at_all_ones() {
        let key = key();
        let mut ctr = Block([0xFF; 16]);
        let mut buf = [0u8; 17];
        Keystream::new().apply(&key, &mut ctr, &mut buf);
        let mut one = Block::ZERO;
        one[15] = 1;
        assert_eq!(ctr, one);
        assert_eq!(buf[16], aes::encrypt(&[0u8; 16], &key)[0]);
    }

    #[test]
    fn reset_drops_cached_bytes() {
        let key = key();
        let mut ctr = Block(COUNTER);
        let mut ks = Keystream::new();
        ks.apply(&key, &mut ctr, &mut [0u8; 3]);
        ks.reset();
        let mut buf = [0u8; 1];
        ks.apply(&key, &mut ctr, &mut buf);
        let mut second = Block(COUNTER);
        second.increment();
        assert_eq!(buf[0], aes::encrypt(&second.0, &key)[0]);
    }

    #[test]
    fn debug_hides_cached_pad() {
        let mut ks = Keystream::new();
        ks.apply(&key(), &mut Block(COUNTER), &mut [0u8; 3]);
        let shown = format!("{ks:?}");
        assert_eq!(shown, "Keystream { remaining: 13, .. }");
    }
}
