//! **aeskit** - a from-scratch AES engine with the classic block-cipher modes.
//!
//! # Supported modes
//! | Mode | Module | Standard |
//! |------|--------|----------|
//! | ECB  | [`crypto::cbc`]  | SP 800-38A |
//! | CBC  | [`crypto::cbc`]  | SP 800-38A |
//! | CTR  | [`crypto::ctr`]  | SP 800-38A |
//! | CCM  | [`crypto::ccm`]  | SP 800-38C |
//! | CMAC | [`crypto::cmac`] | SP 800-38B |
//!
//! All three AES key sizes (128, 192 and 256 bit) are supported. The block
//! transform and key schedule follow FIPS-197.
//!
//! # Example
//! ```
//! use aeskit::{Aes, Mode};
//!
//! let key = [0x2bu8; 16];
//! let iv = [0u8; 16];
//! let mut ctx = Aes::init(Mode::Cbc, 128, &key, Some(&iv))?;
//! let mut ct = [0u8; 32];
//! ctx.encrypt(&mut ct, &[0x11; 32])?;
//!
//! let mut ctx = Aes::init(Mode::Cbc, 128, &key, Some(&iv))?;
//! let mut pt = [0u8; 32];
//! ctx.decrypt(&mut pt, &ct)?;
//! assert_eq!(pt, [0x11; 32]);
//! # Ok::<(), aeskit::Error>(())
//! ```

pub mod block;
pub mod context;
pub mod crypto;
pub mod error;
pub mod keys;

pub use block::{BLOCK_SIZE, Block};
pub use context::{Aes, Mode};
pub use crypto::ccm::CcmParams;
pub use crypto::cmac::Cmac;
pub use error::{Error, Result};
pub use keys::{Key, KeySize};
