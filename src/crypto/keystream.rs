use chacha20::ChaCha20Legacy;
use chacha20::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use zeroize::Zeroizing;

use super::{BLOCK_LEN, KEY_LEN, NONCE_LEN};
use crate::error::DeriveError;

/// Seekable ChaCha20 keystream over a derived key.
///
/// Uses the original 64-bit-nonce construction; the nonce is the increment
/// counter encoded little-endian, so bumping the increment yields an
/// unrelated stream (and therefore an unrelated password) under the same
/// key.
pub struct Keystream {
    cipher: ChaCha20Legacy,
}

impl Keystream {
    /// Keys the cipher and fixes the nonce for this derivation.
    pub fn new(key: &[u8; KEY_LEN], increment: u64) -> Self {
        let nonce: [u8; NONCE_LEN] = increment.to_le_bytes();

        Self {
            cipher: ChaCha20Legacy::new(key.into(), (&nonce).into()),
        }
    }

    /// Produces the 64-byte keystream block at `counter`.
    ///
    /// Equivalent to encrypting a zeroed buffer at that block position:
    /// XOR against zero leaves the raw keystream.
    pub fn block(&mut self, counter: u64) -> Result<Zeroizing<[u8; BLOCK_LEN]>, DeriveError> {
        let position = counter.checked_mul(BLOCK_LEN as u64).ok_or_else(|| {
            DeriveError::PrimitiveFailure("keystream block counter out of range".to_string())
        })?;

        self.cipher.try_seek(position).map_err(|_| {
            DeriveError::PrimitiveFailure("keystream position not reachable".to_string())
        })?;

        let mut block = Zeroizing::new([0u8; BLOCK_LEN]);
        self.cipher.apply_keystream(&mut *block);

        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LEN] = [7u8; KEY_LEN];

    #[test]
    fn blocks_are_deterministic() {
        let b1 = Keystream::new(&KEY, 0).block(3).unwrap();
        let b2 = Keystream::new(&KEY, 0).block(3).unwrap();
        assert_eq!(*b1, *b2);
    }

    #[test]
    fn seeking_back_reproduces_a_block() {
        let mut stream = Keystream::new(&KEY, 0);
        let first = stream.block(0).unwrap();
        stream.block(5).unwrap();
        let again = stream.block(0).unwrap();
        assert_eq!(*first, *again);
    }

    #[test]
    fn blocks_match_a_contiguous_stream() {
        let mut stream = Keystream::new(&KEY, 0);
        let b0 = stream.block(0).unwrap();
        let b1 = stream.block(1).unwrap();

        let nonce = 0u64.to_le_bytes();
        let mut contiguous = ChaCha20Legacy::new((&KEY).into(), (&nonce).into());
        let mut buf = [0u8; 2 * BLOCK_LEN];
        contiguous.apply_keystream(&mut buf);

        assert_eq!(&buf[..BLOCK_LEN], &b0[..]);
        assert_eq!(&buf[BLOCK_LEN..], &b1[..]);
    }

    #[test]
    fn increment_changes_the_stream() {
        let b0 = Keystream::new(&KEY, 0).block(0).unwrap();
        let b1 = Keystream::new(&KEY, 1).block(0).unwrap();
        assert_ne!(*b0, *b1);
    }

    #[test]
    fn key_changes_the_stream() {
        let other = [8u8; KEY_LEN];
        let b0 = Keystream::new(&KEY, 0).block(0).unwrap();
        let b1 = Keystream::new(&other, 0).block(0).unwrap();
        assert_ne!(*b0, *b1);
    }
}
