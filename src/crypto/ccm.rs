//! CCM: counter mode with CBC-MAC (NIST SP 800-38C).
//!
//! A CCM message is authenticated with a CBC-MAC over a formatted header
//! block `B0`, the length-prefixed associated data and the payload, then
//! both the tag and the payload are encrypted in counter mode. Counter block
//! `A0` encrypts the tag; the payload starts at `A1`.
//!
//! The associated-data length prefix is always MACed, so an empty AAD still
//! contributes a zero block. SP 800-38C omits that block, which means tags for
//! messages without associated data differ from NIST's.
//!
//! ## Register layout
//!
//! The 16-byte IV register carries the nonce right-aligned: with a counter
//! field of `L` bytes, the nonce is the last `15 - L` bytes of the register.
//! After every successful message the whole register is incremented as a
//! big-endian integer, which advances the nonce for the next message.
//! [`nonce_iv`] builds such a register from a bare nonce.
//!
//! ```text
//! IV register  [ ignored (L+1 bytes) | nonce (15-L bytes) ]
//! B0           [ flags | nonce | message length (L bytes, BE) ]
//! A0           [ L-1   | nonce | 0 ... 0 (L bytes)        ]
//! ```
//!
//! ## Buffer layout
//!
//! The encrypted tag travels right after the ciphertext: a sealed message is
//! `ciphertext || tag`, `tag_len` bytes longer than the plaintext.

use log::debug;
use subtle::ConstantTimeEq;

use crate::block::{BLOCK_SIZE, Block};
use crate::crypto::aes;
use crate::crypto::cbc::cbc_mac;
use crate::crypto::ctr::Keystream;
use crate::keys::Key;
use crate::{Error, Result};

/// Associated data lengths at or above this use the 6-byte length prefix.
const SHORT_AAD_LIMIT: usize = 0xFF00;

/// Counter-field and tag sizes for a CCM context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcmParams {
    counter_len: usize,
    tag_len: usize,
}

impl Default for CcmParams {
    /// A 4-byte counter field (11-byte nonce) and a full 16-byte tag.
    fn default() -> Self {
        Self {
            counter_len: 4,
            tag_len: 16,
        }
    }
}

impl CcmParams {
    /// Validate and build a parameter set.
    ///
    /// `counter_len` (L) must be 1 to 8; `tag_len` must be even and 4 to 16.
    pub fn new(counter_len: usize, tag_len: usize) -> Result<Self> {
        Ok(Self::default()
            .with_counter_len(counter_len)?
            .with_tag_len(tag_len)?)
    }

    /// Parameters for a nonce of `nonce_len` bytes (7 to 14).
    pub fn for_nonce(nonce_len: usize, tag_len: usize) -> Result<Self> {
        if !(7..=14).contains(&nonce_len) {
            return Err(Error::Parameter("CCM nonce must be 7 to 14 bytes"));
        }
        Self::new(15 - nonce_len, tag_len)
    }

    /// Replace the counter-field length.
    pub fn with_counter_len(mut self, counter_len: usize) -> Result<Self> {
        if !(1..=8).contains(&counter_len) {
            return Err(Error::Parameter("CCM counter length must be 1 to 8"));
        }
        self.counter_len = counter_len;
        Ok(self)
    }

    /// Replace the tag length.
    pub fn with_tag_len(mut self, tag_len: usize) -> Result<Self> {
        if !(4..=16).contains(&tag_len) || tag_len % 2 != 0 {
            return Err(Error::Parameter("CCM tag length must be even and 4 to 16"));
        }
        self.tag_len = tag_len;
        Ok(self)
    }

    /// Counter-field length L in bytes.
    pub fn counter_len(&self) -> usize {
        self.counter_len
    }

    /// Tag length in bytes.
    pub fn tag_len(&self) -> usize {
        self.tag_len
    }

    /// Nonce length in bytes (`15 - L`).
    pub fn nonce_len(&self) -> usize {
        15 - self.counter_len
    }
}

/// Build an IV register carrying `nonce` right-aligned.
///
/// The nonce must be 7 to 14 bytes; use a context whose counter length is
/// `15 - nonce.len()`.
pub fn nonce_iv(nonce: &[u8]) -> Result<[u8; BLOCK_SIZE]> {
    if !(7..=14).contains(&nonce.len()) {
        return Err(Error::Parameter("CCM nonce must be 7 to 14 bytes"));
    }
    let mut iv = [0u8; BLOCK_SIZE];
    iv[BLOCK_SIZE - nonce.len()..].copy_from_slice(nonce);
    Ok(iv)
}

/// One CCM invocation: a key, its parameters and the associated data.
#[derive(Debug, Clone, Copy)]
pub struct Ccm<'k, 'a> {
    key: &'k Key,
    params: CcmParams,
    aad: &'a [u8],
}

impl<'k, 'a> Ccm<'k, 'a> {
    /// Bind a key, parameters and associated data.
    pub fn new(key: &'k Key, params: CcmParams, aad: &'a [u8]) -> Self {
        Self { key, params, aad }
    }

    /// Check that a message of `msg_len` bytes and the associated data both
    /// fit their length fields.
    pub fn check_lengths(&self, msg_len: usize) -> Result<()> {
        let bits = 8 * self.params.counter_len as u32;
        if bits < u64::BITS && (msg_len as u64) >> bits != 0 {
            debug!(
                "{msg_len}-byte CCM message does not fit a {}-byte length field",
                self.params.counter_len
            );
            return Err(Error::Length);
        }
        if u32::try_from(self.aad.len()).is_err() {
            debug!("{}-byte associated data exceeds the CCM limit", self.aad.len());
            return Err(Error::Length);
        }
        Ok(())
    }

    /// Compute the unencrypted CBC-MAC tag over `msg` for the nonce held in
    /// `iv`. The first `tag_len` bytes of the result are the tag.
    pub fn cbcmac_tag(&self, iv: &Block, msg: &[u8]) -> Result<Block> {
        self.check_lengths(msg.len())?;
        let l = self.params.counter_len;

        let mut b0 = Block::ZERO;
        b0[0] = (if self.aad.is_empty() { 0 } else { 0x40 })
            | (((self.params.tag_len / 2 - 1) as u8) << 3)
            | (l - 1) as u8;
        b0.0[1..BLOCK_SIZE - l].copy_from_slice(&iv.0[l + 1..]);
        let len = (msg.len() as u64).to_be_bytes();
        b0.0[BLOCK_SIZE - l..].copy_from_slice(&len[8 - l..]);

        let mut mac = b0;
        aes::encrypt_block(&mut mac, self.key);

        // The length prefix block is MACed even for empty associated data; only
        // the Adata flag in B0 reflects its absence.
        let mut blk = Block::ZERO;
        let prefix = if self.aad.len() < SHORT_AAD_LIMIT {
            blk.0[..2].copy_from_slice(&(self.aad.len() as u16).to_be_bytes());
            2
        } else {
            // Already bounded by check_lengths.
            let n = self.aad.len() as u32;
            blk[0] = 0xFF;
            blk[1] = 0xFE;
            blk.0[2..6].copy_from_slice(&n.to_be_bytes());
            6
        };
        let head = self.aad.len().min(BLOCK_SIZE - prefix);
        blk.0[prefix..prefix + head].copy_from_slice(&self.aad[..head]);
        mac ^= blk;
        aes::encrypt_block(&mut mac, self.key);
        cbc_mac(self.key, &mut mac, &self.aad[head..]);

        cbc_mac(self.key, &mut mac, msg);
        Ok(mac)
    }

    // A0: flags byte L-1, the nonce, and a zeroed counter field.
    fn counter_block(&self, iv: &Block) -> Block {
        let l = self.params.counter_len;
        let mut a0 = Block::ZERO;
        a0[0] = (l - 1) as u8;
        a0.0[1..BLOCK_SIZE - l].copy_from_slice(&iv.0[l + 1..]);
        a0
    }

    /// Counter-mode transform of the tag (at `A0`) and payload (from `A1`).
    /// The register is restored afterwards.
    fn apply_counter(&self, iv: &mut Block, ks: &mut Keystream, tag: &mut [u8], payload: &mut [u8]) {
        let saved = *iv;
        *iv = self.counter_block(&saved);
        ks.reset();
        ks.apply(self.key, iv, tag);
        ks.reset();
        ks.apply(self.key, iv, payload);
        *iv = saved;
        ks.reset();
    }

    /// Authenticate and encrypt `payload` in place, writing the encrypted
    /// tag into `tag` (exactly `tag_len` bytes).
    ///
    /// On success the register is advanced by one. On error nothing has
    /// been modified.
    pub fn seal(&self, iv: &mut Block, ks: &mut Keystream, payload: &mut [u8], tag: &mut [u8]) -> Result<()> {
        self.check_tag_buffer(tag.len())?;
        let mac = self.cbcmac_tag(iv, payload)?;
        tag.copy_from_slice(&mac.0[..self.params.tag_len]);
        self.apply_counter(iv, ks, tag, payload);
        iv.increment();
        Ok(())
    }

    /// Decrypt `payload` in place and verify it against the encrypted `tag`.
    ///
    /// On [`Error::Mac`] the decrypted bytes are still in `payload` and must
    /// be discarded by the caller; the register is not advanced. Length
    /// errors are reported before anything is decrypted.
    pub fn open(&self, iv: &mut Block, ks: &mut Keystream, payload: &mut [u8], tag: &[u8]) -> Result<()> {
        self.check_tag_buffer(tag.len())?;
        self.check_lengths(payload.len())?;
        let tag_len = self.params.tag_len;

        let mut received = [0u8; BLOCK_SIZE];
        received[..tag_len].copy_from_slice(tag);
        self.apply_counter(iv, ks, &mut received[..tag_len], payload);

        let expected = self.cbcmac_tag(iv, payload)?;
        if expected.0[..tag_len].ct_eq(&received[..tag_len]).unwrap_u8() != 1 {
            debug!("CCM tag verification failed for {}-byte message", payload.len());
            return Err(Error::Mac);
        }
        iv.increment();
        Ok(())
    }

    fn check_tag_buffer(&self, len: usize) -> Result<()> {
        if len != self.params.tag_len {
            return Err(Error::BufferSize {
                expected: self.params.tag_len,
                actual: len,
            });
        }
        Ok(())
    }
}
