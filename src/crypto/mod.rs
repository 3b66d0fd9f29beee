//! The cipher engine, leaves first.
//!
//! Everything here works on caller-supplied buffers and an expanded
//! [`crate::keys::Key`]; nothing allocates. Most callers go through
//! [`crate::context::Aes`] instead of using these modules directly.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `gf`     | GF(2^8) doubling and branchless constant multiplication |
//! | [`aes`]  | Block transform: forward and inverse rounds, S-boxes |
//! | [`ctr`]  | Streaming counter-mode keystream with a one-block cache |
//! | [`cbc`]  | ECB and CBC drivers, raw CBC-MAC |
//! | [`ccm`]  | CCM authenticated encryption (SP 800-38C) |
//! | [`cmac`] | CMAC message authentication (SP 800-38B) |
//!
//! ## Side channels
//!
//! MixColumns and InvMixColumns never branch on state bytes: products are
//! assembled from a chain of doublings selected by arithmetic masks. The
//! S-box is still a 256-entry table indexed by state bytes, so the transform
//! as a whole is not constant-time on platforms with data caches. Tag
//! comparisons in [`ccm`] and [`cmac`] are constant-time.

pub mod aes;
pub mod cbc;
pub mod ccm;
pub mod cmac;
pub mod ctr;
pub(crate) mod gf;
