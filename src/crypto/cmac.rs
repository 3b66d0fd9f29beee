//! CMAC (NIST SP 800-38B), a CBC-MAC variant that is safe for messages of
//! any length.
//!
//! Two subkeys are derived from `L = E(0)` by doubling in GF(2^128)
//! (reduction constant 0x87). The last message block is XORed with `K1` when
//! it is complete, or padded with `0x80 00..` and XORed with `K2` when it is
//! not (this includes the empty message).
//!
//! [`Cmac`] is incremental: feed data with [`Cmac::update`] in pieces of any
//! size and finish with [`Cmac::finalize`] or [`Cmac::verify`].

use subtle::ConstantTimeEq;

use crate::block::{BLOCK_SIZE, Block};
use crate::crypto::aes;
use crate::keys::Key;
use crate::{Error, Result};

// Multiply by x in GF(2^128), block read big-endian. The reduction is masked in, not branched on.
fn dbl(b: &Block) -> Block {
    let mut out = Block::ZERO;
    let carry = b[0] >> 7;
    for i in 0..BLOCK_SIZE - 1 {
        out[i] = (b[i] << 1) | (b[i + 1] >> 7);
    }
    out[BLOCK_SIZE - 1] = (b[BLOCK_SIZE - 1] << 1) ^ (0x87 & 0u8.wrapping_sub(carry));
    out
}

/// Incremental AES-CMAC state.
#[derive(Clone)]
pub struct Cmac {
    key: Key,
    k1: Block,
    k2: Block,
    mac: Block,
    buf: Block,
    filled: usize,
}

impl std::fmt::Debug for Cmac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cmac")
            .field("key", &self.key)
            .field("filled", &self.filled)
            .finish_non_exhaustive()
    }
}

impl Cmac {
    /// Start a MAC computation under `key`.
    pub fn new(key: &Key) -> Self {
        let mut l = Block::ZERO;
        aes::encrypt_block(&mut l, key);
        let k1 = dbl(&l);
        let k2 = dbl(&k1);
        Self {
            key: key.clone(),
            k1,
            k2,
            mac: Block::ZERO,
            buf: Block::ZERO,
            filled: 0,
        }
    }

    /// Absorb more message bytes.
    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            // The final block is held back until finalize, so only flush a full
            // buffer once more input is known to follow it.
            if self.filled == BLOCK_SIZE {
                self.mac ^= self.buf;
                aes::encrypt_block(&mut self.mac, &self.key);
                self.filled = 0;
            }
            let take = (BLOCK_SIZE - self.filled).min(data.len());
            self.buf.0[self.filled..self.filled + take].copy_from_slice(&data[..take]);
            self.filled += take;
            data = &data[take..];
        }
    }

    /// Finish and return the full 16-byte tag.
    pub fn finalize(self) -> Block {
        let mut last = Block::zero_padded(&self.buf.0[..self.filled]);
        if self.filled == BLOCK_SIZE {
            last ^= self.k1;
        } else {
            last[self.filled] = 0x80;
            last ^= self.k2;
        }
        let mut mac = self.mac ^ last;
        aes::encrypt_block(&mut mac, &self.key);
        mac
    }

    /// Finish and write the leading `out.len()` bytes of the tag (1 to 16).
    pub fn finalize_into(self, out: &mut [u8]) -> Result<()> {
        check_tag_len(out.len())?;
        let tag = self.finalize();
        out.copy_from_slice(&tag.0[..out.len()]);
        Ok(())
    }

    /// Finish and compare against a (possibly truncated) tag in constant
    /// time.
    pub fn verify(self, tag: &[u8]) -> Result<()> {
        check_tag_len(tag.len())?;
        let expected = self.finalize();
        if expected.0[..tag.len()].ct_eq(tag).unwrap_u8() != 1 {
            return Err(Error::Mac);
        }
        Ok(())
    }
}

fn check_tag_len(len: usize) -> Result<()> {
    if !(1..=BLOCK_SIZE).contains(&len) {
        return Err(Error::Parameter("CMAC tag length must be 1 to 16"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    fn key() -> Key {
        Key::new(&hex!("2b7e151628aed2a6abf7158809cf4f3c")).unwrap()
    }

    #[test]
    fn subkeys_sp800_38b_d1() {
        let mac = Cmac::new(&key());
        assert_eq!(mac.k1.0, hex!("fbeed618357133667c85e08f7236a8de"));
        assert_eq!(mac.k2.0, hex!("f7ddac306ae266ccf90bc11ee46d513b"));
    }

    #[test]
    fn piecewise_update_matches_single_update() {
        let msg = [0x3Cu8; 40];
        let mut one = Cmac::new(&key());
        one.update(&msg);
        let mut many = Cmac::new(&key());
        for piece in msg.chunks(7) {
            many.update(piece);
        }
        many.update(&[]);
        assert_eq!(one.finalize(), many.finalize());
    }

    #[test]
    fn exact_block_boundary_uses_k1() {
        // 16 bytes in two pieces must not flush the only block early.
        let msg = hex!("6bc1bee22e409f96e93d7e117393172a");
        let mut mac = Cmac::new(&key());
        mac.update(&msg[..16]);
        mac.update(&[]);
        assert_eq!(mac.finalize().0, hex!("070a16b46b4d4144f79bdd9dd04a287c"));
    }

    #[test]
    fn truncated_verify() {
        let mut mac = Cmac::new(&key());
        mac.update(b"abc");
        let full = mac.clone().finalize();
        mac.clone().verify(&full.0[..8]).unwrap();
        let mut bad = full.0;
        bad[0] ^= 0x80;
        assert_eq!(mac.clone().verify(&bad), Err(Error::Mac));
        assert!(mac.verify(&[]).is_err());
    }
}
