//! Character sets for generated passwords.
//!
//! An [`Alphabet`] is an ordered sequence of distinct symbols. Password
//! bytes are mapped onto it with a bit mask and rejection sampling, so the
//! set size is capped at 256 (one masked byte indexes the whole set).

use crate::error::DeriveError;
use std::collections::HashSet;

/// Largest number of symbols a set may hold (a masked byte must be able to
/// index every symbol).
pub const MAX_SYMBOLS: usize = 256;

/// Printable ASCII spans ' ' (0x20) through '~' (0x7e).
const PRINTABLE_SPAN: usize = 95;

/// An ordered set of 1 to 256 distinct symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Builds an alphabet from the given symbols, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`DeriveError::InvalidAlphabet`] if the sequence is empty,
    /// holds more than 256 symbols, or repeats a symbol. A repeated symbol
    /// would silently double that symbol's selection probability, so it is
    /// rejected instead of collapsed.
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Result<Self, DeriveError> {
        let symbols: Vec<char> = symbols.into_iter().collect();

        if symbols.is_empty() {
            return Err(DeriveError::InvalidAlphabet(
                "character set must contain at least one symbol".to_string(),
            ));
        }

        if symbols.len() > MAX_SYMBOLS {
            return Err(DeriveError::InvalidAlphabet(format!(
                "character set holds {} symbols; the maximum is {MAX_SYMBOLS}",
                symbols.len()
            )));
        }

        let mut seen = HashSet::with_capacity(symbols.len());
        for &symbol in &symbols {
            if !seen.insert(symbol) {
                return Err(DeriveError::InvalidAlphabet(format!(
                    "symbol '{}' appears more than once",
                    symbol.escape_default()
                )));
            }
        }

        Ok(Self { symbols })
    }

    /// The 94 printable ASCII symbols from '!' through '~'.
    pub fn printable() -> Self {
        Self {
            symbols: ('!'..='~').collect(),
        }
    }

    /// Parses a set specification: literal printable ASCII characters,
    /// `a-z` style ranges, and backslash escapes for `-`, `\` and space.
    ///
    /// The produced set is in ascending character order and repeated
    /// characters collapse, matching the configuration file syntax.
    pub fn parse(spec: &str) -> Result<Self, DeriveError> {
        let (alphabet, consumed) = parse_set_spec(spec.as_bytes())?;

        if consumed != spec.len() {
            return Err(DeriveError::InvalidAlphabet(
                "unexpected space in character set; escape it with a backslash".to_string(),
            ));
        }

        Ok(alphabet)
    }

    /// Number of symbols in the set.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// The smallest bit mask of the form 2^k - 1 covering every symbol
    /// index, i.e. the smallest such value >= len - 1.
    ///
    /// ANDing a uniformly random byte with this mask yields a uniform value
    /// in [0, mask]; indices >= len are then rejected rather than reduced,
    /// which keeps the symbol distribution exactly uniform.
    pub fn mask(&self) -> u8 {
        let bits = usize::BITS - (self.symbols.len() - 1).leading_zeros();
        ((1u32 << bits) - 1) as u8
    }

    /// Symbol at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`; the derivation loop only passes indices
    /// it has already accepted.
    pub(crate) fn symbol(&self, index: usize) -> char {
        self.symbols[index]
    }

    /// The symbols in order.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::printable()
    }
}

fn ensure_printable(c: u8) -> Result<(), DeriveError> {
    if c < b' ' || c > b'~' {
        return Err(DeriveError::InvalidAlphabet(format!(
            "expected printable ASCII but found '\\x{c:02x}'"
        )));
    }
    Ok(())
}

/// Parses a set specification from `input`, stopping at the first unescaped
/// space or at the end. Returns the alphabet and the number of bytes
/// consumed, so configuration-line parsing can continue after the field.
pub(crate) fn parse_set_spec(input: &[u8]) -> Result<(Alphabet, usize), DeriveError> {
    let mut present = [false; PRINTABLE_SPAN];
    let mut last: Option<u8> = None;
    let mut i = 0;

    while i < input.len() {
        let c = input[i];

        if c == b' ' {
            break;
        }

        if c == b'\\' {
            i += 1;
            let escaped = *input.get(i).ok_or_else(|| {
                DeriveError::InvalidAlphabet(
                    "expected escaped character, but found end of line".to_string(),
                )
            })?;
            ensure_printable(escaped)?;
            present[(escaped - b' ') as usize] = true;
            last = Some(escaped);
            i += 1;
            continue;
        }

        ensure_printable(c)?;

        if c == b'-' {
            let start = last.take().ok_or_else(|| {
                DeriveError::InvalidAlphabet(
                    "found hyphen range with no starting character".to_string(),
                )
            })?;

            i += 1;
            let mut end = input.get(i).copied();
            if end == Some(b'\\') {
                i += 1;
                end = input.get(i).copied();
            } else if end == Some(b' ') {
                end = None;
            }

            let end = end.ok_or_else(|| {
                DeriveError::InvalidAlphabet(
                    "found hyphen range with no ending character".to_string(),
                )
            })?;
            ensure_printable(end)?;

            if end < start {
                return Err(DeriveError::InvalidAlphabet(format!(
                    "empty range {}-{}",
                    start as char, end as char
                )));
            }

            for b in start..=end {
                present[(b - b' ') as usize] = true;
            }
            i += 1;
        } else {
            present[(c - b' ') as usize] = true;
            last = Some(c);
            i += 1;
        }
    }

    let symbols: Vec<char> = present
        .iter()
        .enumerate()
        .filter(|&(_, &in_set)| in_set)
        .map(|(offset, _)| (b' ' + offset as u8) as char)
        .collect();

    if symbols.len() < 2 {
        return Err(DeriveError::InvalidAlphabet(
            "character set must contain at least two characters".to_string(),
        ));
    }

    Ok((Alphabet { symbols }, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(n: usize) -> Alphabet {
        // distinct chars well away from any surrogate range
        Alphabet::new((0..n).map(|i| char::from_u32(0x100 + i as u32).unwrap())).unwrap()
    }

    #[test]
    fn mask_covers_reference_sizes() {
        assert_eq!(sized(1).mask(), 0);
        assert_eq!(sized(2).mask(), 1);
        assert_eq!(sized(95).mask(), 127);
        assert_eq!(sized(256).mask(), 255);
    }

    #[test]
    fn mask_is_tight_for_powers_of_two() {
        assert_eq!(sized(16).mask(), 15);
        assert_eq!(sized(64).mask(), 63);
        assert_eq!(sized(128).mask(), 127);
    }

    #[test]
    fn printable_set_has_94_symbols() {
        let set = Alphabet::printable();
        assert_eq!(set.len(), 94);
        assert_eq!(set.symbol(0), '!');
        assert_eq!(set.symbol(93), '~');
        assert_eq!(set.mask(), 127);
    }

    #[test]
    fn empty_set_rejected() {
        assert!(Alphabet::new(std::iter::empty()).is_err());
    }

    #[test]
    fn oversized_set_rejected() {
        assert!(Alphabet::new((0..257).map(|i| char::from_u32(0x100 + i as u32).unwrap())).is_err());
    }

    #[test]
    fn duplicate_symbol_rejected() {
        let err = Alphabet::new("abca".chars()).unwrap_err();
        assert!(matches!(err, DeriveError::InvalidAlphabet(_)));
    }

    #[test]
    fn parse_ranges() {
        let set = Alphabet::parse("a-z0-9").unwrap();
        assert_eq!(set.len(), 36);
        assert_eq!(set.symbol(0), '0');
        assert_eq!(set.symbol(35), 'z');
    }

    #[test]
    fn parse_sorts_and_collapses() {
        let set = Alphabet::parse("cabac").unwrap();
        assert_eq!(set.symbols(), &['a', 'b', 'c']);
    }

    #[test]
    fn parse_escaped_hyphen_and_space() {
        let set = Alphabet::parse("\\-\\ a").unwrap();
        assert_eq!(set.symbols(), &[' ', '-', 'a']);
    }

    #[test]
    fn parse_escaped_range_end() {
        let set = Alphabet::parse("Z-\\\\").unwrap();
        assert_eq!(set.symbols(), &['Z', '[', '\\']);
    }

    #[test]
    fn parse_backwards_range_rejected() {
        let err = Alphabet::parse("z-a").unwrap_err();
        assert!(err.to_string().contains("empty range z-a"));
    }

    #[test]
    fn parse_range_without_start_rejected() {
        assert!(Alphabet::parse("-a").unwrap_err().to_string().contains("no starting character"));
    }

    #[test]
    fn parse_dangling_escape_rejected() {
        assert!(Alphabet::parse("ab\\").unwrap_err().to_string().contains("end of line"));
    }

    #[test]
    fn parse_non_printable_rejected() {
        assert!(Alphabet::parse("a\tb").unwrap_err().to_string().contains("printable ASCII"));
    }

    #[test]
    fn parse_single_symbol_rejected() {
        assert!(Alphabet::parse("a").is_err());
    }

    #[test]
    fn parse_unescaped_space_rejected() {
        assert!(Alphabet::parse("ab cd").is_err());
    }
}
