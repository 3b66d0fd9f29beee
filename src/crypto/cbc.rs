//! Block-aligned modes: ECB, CBC and the raw CBC-MAC used by CCM.
//!
//! ECB applies the block cipher to every block independently; identical
//! plaintext blocks give identical ciphertext blocks. CBC XORs each
//! plaintext block with the previous ciphertext block (the IV for the first
//! one) before encrypting, and the chaining register always ends up holding
//! the last ciphertext block, for encryption and decryption alike.
//!
//! ECB and CBC take a buffer whose length is a positive multiple of 16 and
//! transform it in place. A misaligned buffer is rejected with
//! [`Error::Length`] before anything, including the IV, is touched.
//!
//! <https://en.wikipedia.org/wiki/Block_cipher_mode_of_operation#Cipher_block_chaining_(CBC)>

use log::debug;

use crate::block::{BLOCK_SIZE, Block};
use crate::crypto::aes;
use crate::keys::Key;
use crate::{Error, Result};

fn check_aligned(len: usize) -> Result<()> {
    if len == 0 || len % BLOCK_SIZE != 0 {
        debug!("rejecting {len}-byte buffer for a block-aligned mode");
        return Err(Error::Length);
    }
    Ok(())
}

/// Encrypt `data` in place with ECB.
pub fn ecb_encrypt(key: &Key, data: &mut [u8]) -> Result<()> {
    check_aligned(data.len())?;
    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let mut blk = Block::from_slice(chunk);
        aes::encrypt_block(&mut blk, key);
        chunk.copy_from_slice(blk.as_bytes());
    }
    Ok(())
}

/// Decrypt `data` in place with ECB.
pub fn ecb_decrypt(key: &Key, data: &mut [u8]) -> Result<()> {
    check_aligned(data.len())?;
    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let mut blk = Block::from_slice(chunk);
        aes::decrypt_block(&mut blk, key);
        chunk.copy_from_slice(blk.as_bytes());
    }
    Ok(())
}

/// Encrypt `data` in place with CBC, leaving the last ciphertext block in
/// `iv`.
pub fn cbc_encrypt(key: &Key, iv: &mut Block, data: &mut [u8]) -> Result<()> {
    check_aligned(data.len())?;
    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let mut blk = Block::from_slice(chunk) ^ *iv;
        aes::encrypt_block(&mut blk, key);
        *iv = blk;
        chunk.copy_from_slice(blk.as_bytes());
    }
    Ok(())
}

/// Decrypt `data` in place with CBC, leaving the last ciphertext block in
/// `iv`.
pub fn cbc_decrypt(key: &Key, iv: &mut Block, data: &mut [u8]) -> Result<()> {
    check_aligned(data.len())?;
    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let ct = Block::from_slice(chunk);
        let mut blk = ct;
        aes::decrypt_block(&mut blk, key);
        blk ^= *iv;
        *iv = ct;
        chunk.copy_from_slice(blk.as_bytes());
    }
    Ok(())
}

/// Fold `data` into the CBC-MAC accumulator `mac`.
///
/// Each full block is XORed into `mac`, which is then encrypted. A trailing
/// partial block is zero-padded first. Empty input leaves `mac` unchanged.
pub fn cbc_mac(key: &Key, mac: &mut Block, data: &[u8]) {
    for chunk in data.chunks(BLOCK_SIZE) {
        *mac ^= Block::zero_padded(chunk);
        aes::encrypt_block(mac, key);
    }
}
