use std::fmt;

/// Errors produced by the derivation core.
///
/// None of the variants ever carry the master password, the derived key,
/// or keystream bytes.
#[derive(Debug)]
pub enum DeriveError {
    /// The character set is empty, larger than 256 symbols, or contains
    /// a repeated symbol.
    InvalidAlphabet(String),
    /// A request parameter (or a constraint reported by one of the
    /// cryptographic primitives) is out of range.
    InvalidParameter(String),
    /// A cryptographic primitive failed internally.
    PrimitiveFailure(String),
}

impl fmt::Display for DeriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeriveError::InvalidAlphabet(msg) => write!(f, "invalid character set: {msg}"),
            DeriveError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            DeriveError::PrimitiveFailure(msg) => write!(f, "crypto primitive failed: {msg}"),
        }
    }
}

impl std::error::Error for DeriveError {}
