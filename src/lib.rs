//! Deterministic, stateless password derivation.
//!
//! A password is a pure function of the master password, the site name, the
//! increment counter, and the schema parameters. Nothing is ever stored:
//! the same inputs regenerate the same password on every run.

mod alphabet;
mod crypto;
mod error;
mod schema;

pub use crate::alphabet::{Alphabet, MAX_SYMBOLS};
pub use crate::error::DeriveError;
pub use crate::schema::{MAX_COUNT, Schema, default_config_path, load_schema};

use crate::crypto::Keystream;

/// Derives the password for `site` under the given schema.
///
/// The master password is stretched with bcrypt_pbkdf (salted by the site
/// name) into a 256-bit key, which keys a ChaCha20 stream with the
/// increment counter as nonce. Keystream bytes are masked down to the
/// character-set index range and accepted only when they land inside the
/// set; everything else is rejected, so each output symbol is exactly
/// uniform over the set.
///
/// # Errors
///
/// [`DeriveError::InvalidParameter`] if master or site is empty or the
/// round count is zero; [`DeriveError::PrimitiveFailure`] if a primitive
/// fails internally. The character set is validated when it is built.
pub fn derive_password(
    master: &[u8],
    site: &[u8],
    schema: &Schema,
) -> Result<String, DeriveError> {
    let set = schema.set();
    let mask = set.mask();

    // the slow step always runs, even for a zero-length request
    let key = crypto::derive_key(master, site, schema.rounds())?;

    if schema.count() == 0 {
        return Ok(String::new());
    }

    let mut stream = Keystream::new(&key, schema.increment());
    drop(key);

    let mut result = String::with_capacity(schema.count());
    let mut generated = 0;
    let mut counter = 0u64;

    loop {
        let block = stream.block(counter)?;
        counter += 1;

        for &byte in block.iter() {
            let index = usize::from(byte & mask);

            // rejection sampling: indices past the end of the set are
            // skipped, never reduced modulo the set size, which would
            // overweight the low symbols
            if index < set.len() {
                result.push(set.symbol(index));
                generated += 1;

                if generated == schema.count() {
                    return Ok(result);
                }
            }
        }
    }
}
