//! The cipher context: one key, one mode, one running IV register.
//!
//! [`Aes`] is the entry point most callers need. It is created once per
//! (key, mode, IV) and then driven with [`Aes::encrypt`] / [`Aes::decrypt`]
//! (separate source and destination) or their `_in_place` variants. Every
//! call advances the context: the CBC chaining register, the CTR counter and
//! keystream cache, or the CCM nonce.
//!
//! ## Buffer sizes
//!
//! | Mode    | `encrypt(dst, src)`                | `decrypt(dst, src)`                |
//! |---------|------------------------------------|------------------------------------|
//! | ECB/CBC | `dst.len() == src.len()`, multiple of 16 | same                         |
//! | CTR     | `dst.len() == src.len()`           | same                               |
//! | CCM     | `dst.len() == src.len() + tag_len` | `src` is `ciphertext \|\| tag`, `dst.len() == src.len() - tag_len` |
//!
//! A context mutates itself on every call and takes `&mut self`; sharing one
//! across threads needs external locking.

use log::trace;

use crate::block::{BLOCK_SIZE, Block};
use crate::crypto::cbc;
use crate::crypto::ccm::{Ccm, CcmParams};
use crate::crypto::ctr::Keystream;
use crate::keys::Key;
use crate::{Error, Result};

/// Operating mode, fixed when the context is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Electronic codebook: independent blocks, no IV.
    Ecb,
    /// Cipher block chaining.
    Cbc,
    /// Counter mode, byte-granular across calls.
    Ctr,
    /// Counter with CBC-MAC authenticated encryption.
    Ccm,
}

/// An AES cipher context.
///
/// The lifetime `'a` is that of the CCM associated data, which the context
/// borrows rather than copies.
#[derive(Debug, Clone)]
pub struct Aes<'a> {
    mode: Mode,
    key: Key,
    iv: Block,
    keystream: Keystream,
    ccm: CcmParams,
    aad: &'a [u8],
}

impl<'a> Aes<'a> {
    /// Create a context from an already expanded key.
    ///
    /// Every mode except ECB needs an IV and fails with [`Error::Iv`]
    /// without one. ECB ignores the IV.
    pub fn new(mode: Mode, key: &Key, iv: Option<&[u8; BLOCK_SIZE]>) -> Result<Self> {
        let iv = match (mode, iv) {
            (_, Some(iv)) => Block(*iv),
            (Mode::Ecb, None) => Block::ZERO,
            (_, None) => return Err(Error::Iv),
        };
        trace!("new {mode:?} context, {} rounds", key.rounds());
        Ok(Self {
            mode,
            key: key.clone(),
            iv,
            keystream: Keystream::new(),
            ccm: CcmParams::default(),
            aad: &[],
        })
    }

    /// Expand a raw key of `key_bits` bits and create a context.
    pub fn init(mode: Mode, key_bits: u32, key: &[u8], iv: Option<&[u8; BLOCK_SIZE]>) -> Result<Self> {
        let key = Key::with_bits(key_bits, key)?;
        Self::new(mode, &key, iv)
    }

    /// The mode chosen at construction.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current IV / counter register.
    pub fn iv(&self) -> &[u8; BLOCK_SIZE] {
        self.iv.as_bytes()
    }

    /// The expanded key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// CCM counter-field and tag sizes.
    pub fn ccm_params(&self) -> CcmParams {
        self.ccm
    }

    /// CCM tag length in bytes (16 unless changed).
    pub fn tag_len(&self) -> usize {
        self.ccm.tag_len()
    }

    fn require_ccm(&self) -> Result<()> {
        if self.mode != Mode::Ccm {
            return Err(Error::Parameter("CCM setting on a non-CCM context"));
        }
        Ok(())
    }

    /// Replace both CCM parameters at once.
    pub fn set_ccm_params(&mut self, params: CcmParams) -> Result<()> {
        self.require_ccm()?;
        trace!(
            "CCM counter length {}, tag length {}",
            params.counter_len(),
            params.tag_len()
        );
        self.ccm = params;
        Ok(())
    }

    /// Set the CCM counter-field length L (1 to 8 bytes).
    pub fn set_counter_len(&mut self, counter_len: usize) -> Result<()> {
        self.set_ccm_params(self.ccm.with_counter_len(counter_len)?)
    }

    /// Set the CCM tag length (even, 4 to 16 bytes).
    pub fn set_tag_len(&mut self, tag_len: usize) -> Result<()> {
        self.set_ccm_params(self.ccm.with_tag_len(tag_len)?)
    }

    /// Set the associated data authenticated by following CCM calls.
    pub fn set_associated_data(&mut self, aad: &'a [u8]) -> Result<()> {
        self.require_ccm()?;
        self.aad = aad;
        Ok(())
    }

    /// Encrypt `src` into `dst`.
    ///
    /// For CCM the encrypted tag is written to `dst[src.len()..]`. The
    /// contents of `dst` are unspecified when an error is returned.
    pub fn encrypt(&mut self, dst: &mut [u8], src: &[u8]) -> Result<()> {
        let extra = if self.mode == Mode::Ccm { self.tag_len() } else { 0 };
        check_buffer(dst.len(), src.len() + extra)?;
        if self.mode == Mode::Ccm {
            Ccm::new(&self.key, self.ccm, self.aad).check_lengths(src.len())?;
        }
        dst[..src.len()].copy_from_slice(src);
        self.encrypt_in_place(dst)
    }

    /// Decrypt `src` into `dst`.
    ///
    /// For CCM, `src` is the ciphertext followed by the encrypted tag. On
    /// [`Error::Mac`] the unauthenticated plaintext is left in `dst` and must
    /// not be used.
    pub fn decrypt(&mut self, dst: &mut [u8], src: &[u8]) -> Result<()> {
        if self.mode == Mode::Ccm {
            let tag_len = self.tag_len();
            let len = src.len().checked_sub(tag_len).ok_or(Error::Length)?;
            check_buffer(dst.len(), len)?;
            let ccm = Ccm::new(&self.key, self.ccm, self.aad);
            ccm.check_lengths(len)?;
            dst.copy_from_slice(&src[..len]);
            return ccm.open(&mut self.iv, &mut self.keystream, dst, &src[len..]);
        }
        check_buffer(dst.len(), src.len())?;
        dst.copy_from_slice(src);
        self.decrypt_in_place(dst)
    }

    /// Encrypt `buf` in place.
    ///
    /// For CCM, `buf` is the plaintext followed by `tag_len` bytes of room
    /// for the tag; a shorter buffer is an [`Error::Length`].
    pub fn encrypt_in_place(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.mode {
            Mode::Ecb => cbc::ecb_encrypt(&self.key, buf),
            Mode::Cbc => cbc::cbc_encrypt(&self.key, &mut self.iv, buf),
            Mode::Ctr => {
                self.keystream.apply(&self.key, &mut self.iv, buf);
                Ok(())
            }
            Mode::Ccm => {
                let len = buf.len().checked_sub(self.tag_len()).ok_or(Error::Length)?;
                let (payload, tag) = buf.split_at_mut(len);
                Ccm::new(&self.key, self.ccm, self.aad).seal(&mut self.iv, &mut self.keystream, payload, tag)
            }
        }
    }

    /// Decrypt `buf` in place.
    ///
    /// For CCM, `buf` is the ciphertext followed by the encrypted tag; the
    /// plaintext ends up in the leading `buf.len() - tag_len` bytes.
    pub fn decrypt_in_place(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.mode {
            Mode::Ecb => cbc::ecb_decrypt(&self.key, buf),
            Mode::Cbc => cbc::cbc_decrypt(&self.key, &mut self.iv, buf),
            Mode::Ctr => {
                self.keystream.apply(&self.key, &mut self.iv, buf);
                Ok(())
            }
            Mode::Ccm => {
                let len = buf.len().checked_sub(self.tag_len()).ok_or(Error::Length)?;
                let (payload, tag) = buf.split_at_mut(len);
                Ccm::new(&self.key, self.ccm, self.aad).open(&mut self.iv, &mut self.keystream, payload, tag)
            }
        }
    }
}

fn check_buffer(actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(Error::BufferSize { expected, actual });
    }
    Ok(())
}
