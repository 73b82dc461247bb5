//! Cryptographic primitives behind the derivation core.
//!
//! Provides the slow key-stretching step and the fast seekable keystream;
//! both wrap vetted RustCrypto implementations.

pub mod kdf;
pub mod keystream;

pub use kdf::derive_key;
pub use keystream::Keystream;

/// Length of the derived key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the keystream nonce (8 bytes, the little-endian increment).
pub const NONCE_LEN: usize = 8;
/// Length of one ChaCha20 keystream block (64 bytes).
pub const BLOCK_LEN: usize = 64;
