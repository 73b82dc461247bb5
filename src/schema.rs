//! Per-site derivation parameters and the configuration file.
//!
//! A schema is the non-secret half of a derivation request: how many
//! characters, from which set, at what KDF cost, and at which increment.
//! Schemas layer: built-in defaults, then the `default` line of the
//! configuration file, then the line matching the site name, then any
//! command-line overrides.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use crate::alphabet::{self, Alphabet};

/// Upper bound on the generated character count, enforced at the
/// configuration layer only; the derivation core itself has no limit.
pub const MAX_COUNT: usize = 1024;

const DEFAULT_COUNT: usize = 20;
const DEFAULT_ROUNDS: u32 = 200;

/// Derivation parameters for one site.
#[derive(Debug, Clone)]
pub struct Schema {
    count: usize,
    rounds: u32,
    increment: u64,
    set: Alphabet,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            rounds: DEFAULT_ROUNDS,
            increment: 0,
            set: Alphabet::printable(),
        }
    }
}

impl Schema {
    /// Builds a schema directly, bypassing the configuration layer.
    ///
    /// No bounds apply here: a zero count is the degenerate empty-password
    /// request and large counts simply run longer. The configuration file
    /// and command line enforce their own 1..=[`MAX_COUNT`] range.
    pub fn new(count: usize, rounds: u32, increment: u64, set: Alphabet) -> Self {
        Self {
            count,
            rounds,
            increment,
            set,
        }
    }

    /// Number of characters to generate.
    pub fn count(&self) -> usize {
        self.count
    }

    /// bcrypt_pbkdf round count.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Revision counter; bump it to rotate the password for a site.
    pub fn increment(&self) -> u64 {
        self.increment
    }

    /// The character set to draw symbols from.
    pub fn set(&self) -> &Alphabet {
        &self.set
    }

    pub fn set_count(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            bail!("character count must be greater than 0");
        }
        if count > MAX_COUNT {
            bail!("character count must be at most {MAX_COUNT}");
        }
        self.count = count;
        Ok(())
    }

    pub fn set_rounds(&mut self, rounds: u32) -> Result<()> {
        if rounds == 0 {
            bail!("number of rounds must be at least 1");
        }
        self.rounds = rounds;
        Ok(())
    }

    pub fn set_increment(&mut self, increment: u64) {
        self.increment = increment;
    }

    pub fn set_charset(&mut self, set: Alphabet) {
        self.set = set;
    }

    /// Strength of a password generated under this schema, in bits.
    pub fn entropy_bits(&self) -> f64 {
        self.count as f64 * (self.set.len() as f64).log2()
    }
}

/// Location of the configuration file: `~/.nosepass`.
pub fn default_config_path() -> Result<PathBuf> {
    let base = directories::BaseDirs::new().context("could not determine home directory")?;
    Ok(base.home_dir().join(".nosepass"))
}

/// Reads the configuration file and resolves the schema for `site`.
///
/// The `default` line is applied first, then the first line whose name
/// equals the site name. A site without a line keeps the defaults.
pub fn load_schema(path: &Path, site: &str) -> Result<Schema> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file {}", path.display()))?;

    let mut schema = Schema::default();
    apply_named_line(&text, "default", &mut schema)?;
    apply_named_line(&text, site, &mut schema)?;

    Ok(schema)
}

/// Finds the first line starting with `name` followed by a space (or
/// nothing) and applies its settings. Comment and blank lines are skipped.
fn apply_named_line(text: &str, name: &str, schema: &mut Schema) -> Result<()> {
    for line in text.lines() {
        if line.starts_with('#') || line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(name) {
            if rest.is_empty() {
                // name alone: keep the current values
                return Ok(());
            }
            if rest.starts_with(' ') {
                return parse_schema_line(rest, schema)
                    .with_context(|| format!("bad configuration line for '{name}'"));
            }
        }
    }

    Ok(())
}

/// Parses the space-separated `key=value` fields after a line's name.
fn parse_schema_line(mut rest: &str, schema: &mut Schema) -> Result<()> {
    let mut has_count = false;
    let mut has_set = false;
    let mut has_rounds = false;
    let mut has_increment = false;

    while !rest.is_empty() {
        let Some(field) = rest.strip_prefix(' ') else {
            bail!("expected space, but found '{rest}' instead");
        };

        if let Some(value) = field.strip_prefix("count=") {
            if has_count {
                bail!("multiple settings for character count");
            }
            has_count = true;

            let (count, tail) =
                parse_number(value).with_context(|| format!("expected count in '{field}'"))?;
            schema.set_count(usize::try_from(count).unwrap_or(usize::MAX))?;
            rest = tail;
        } else if let Some(value) = field.strip_prefix("set=") {
            if has_set {
                bail!("multiple settings for character set");
            }
            has_set = true;

            let (set, consumed) = alphabet::parse_set_spec(value.as_bytes())?;
            schema.set = set;
            rest = &value[consumed..];
        } else if let Some(value) = field.strip_prefix("rounds=") {
            if has_rounds {
                bail!("multiple settings for rounds");
            }
            has_rounds = true;

            let (rounds, tail) = parse_number(value)
                .with_context(|| format!("expected number of rounds in '{field}'"))?;
            let rounds = u32::try_from(rounds)
                .map_err(|_| anyhow::anyhow!("number of rounds must be at most {}", u32::MAX))?;
            schema.set_rounds(rounds)?;
            rest = tail;
        } else if let Some(value) = field.strip_prefix("increment=") {
            if has_increment {
                bail!("multiple settings for increment");
            }
            has_increment = true;

            let (increment, tail) =
                parse_number(value).with_context(|| format!("expected increment in '{field}'"))?;
            schema.set_increment(increment);
            rest = tail;
        } else {
            bail!("expected one of count=, set=, rounds=, or increment=, but found '{field}' instead");
        }
    }

    Ok(())
}

/// Parses an unsigned decimal number, stopping at a space or the end.
/// Returns the value and the unconsumed remainder.
fn parse_number(input: &str) -> Result<(u64, &str)> {
    let end = input.find(' ').unwrap_or(input.len());
    let digits = &input[..end];

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        bail!("'{digits}' is not a number");
    }

    let value = digits.parse::<u64>().context("number out of range")?;
    Ok((value, &input[end..]))
}
